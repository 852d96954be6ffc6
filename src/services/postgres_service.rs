use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use crate::models::account::Account;
use crate::models::trader::Trader;
use crate::models::types::{TraderAccountView, TraderId};
use crate::services::trader_account_service::{
    validate_new_trader, validate_positive_amount, ServiceError, TraderAccountService,
};

const UNIQUE_VIOLATION: &str = "23505";

/// Account service backed by the `trader`, `account` and `security_order`
/// tables (see `sql/schema.sql`).
pub struct PgTraderAccountService {
    pool: PgPool,
}

impl PgTraderAccountService {
    pub fn new(pool: PgPool) -> Self {
        PgTraderAccountService { pool }
    }
}

fn internal(err: sqlx::Error) -> ServiceError {
    log::error!("Database error: {}", err);
    ServiceError::Internal(err.to_string())
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
        _ => false,
    }
}

/// Explains why a conditional withdrawal updated no row. `balance` is the
/// account's current balance, or `None` when there is no such account.
fn failed_withdrawal(
    trader_id: TraderId,
    balance: Option<BigDecimal>,
    requested: BigDecimal,
) -> ServiceError {
    match balance {
        Some(balance) => ServiceError::InsufficientFunds {
            id: trader_id,
            balance,
            requested,
        },
        None => ServiceError::TraderNotFound(trader_id),
    }
}

fn account_from_row(row: &PgRow) -> Result<Account, sqlx::Error> {
    Ok(Account {
        id: row.try_get("id")?,
        trader_id: row.try_get("trader_id")?,
        amount: row.try_get("amount")?,
    })
}

#[async_trait]
impl TraderAccountService for PgTraderAccountService {
    async fn create_trader_account(&self, trader: Trader) -> Result<TraderAccountView, ServiceError> {
        validate_new_trader(&trader)?;

        let mut tx = self.pool.begin().await.map_err(internal)?;

        let inserted = sqlx::query(
            r#"
            INSERT INTO trader (first_name, last_name, email, country, dob)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&trader.first_name)
        .bind(&trader.last_name)
        .bind(&trader.email)
        .bind(&trader.country)
        .bind(trader.dob)
        .fetch_one(&mut tx)
        .await;

        let id: TraderId = match inserted {
            Ok(row) => row.try_get("id").map_err(internal)?,
            Err(err) if is_unique_violation(&err) => {
                return Err(ServiceError::EmailInUse(trader.email));
            }
            Err(err) => return Err(internal(err)),
        };

        let row = sqlx::query(
            r#"
            INSERT INTO account (id, trader_id, amount)
            VALUES ($1, $1, $2)
            RETURNING id, trader_id, amount
            "#,
        )
        .bind(id)
        .bind(Account::opened_for(id).amount)
        .fetch_one(&mut tx)
        .await
        .map_err(internal)?;
        let account = account_from_row(&row).map_err(internal)?;

        tx.commit().await.map_err(internal)?;

        log::info!("Created trader {} with an empty account", id);
        Ok(TraderAccountView::new(trader.with_id(id), account))
    }

    async fn delete_trader_by_id(&self, trader_id: TraderId) -> Result<(), ServiceError> {
        let mut tx = self.pool.begin().await.map_err(internal)?;

        // Row lock keeps deposits and withdrawals out until commit.
        let balance: BigDecimal = sqlx::query("SELECT amount FROM account WHERE id = $1 FOR UPDATE")
            .bind(trader_id)
            .fetch_optional(&mut tx)
            .await
            .map_err(internal)?
            .ok_or(ServiceError::TraderNotFound(trader_id))?
            .try_get("amount")
            .map_err(internal)?;
        if !balance.is_zero() {
            return Err(ServiceError::NonZeroBalance { id: trader_id, balance });
        }

        let count: i64 = sqlx::query(
            "SELECT COUNT(*) AS count FROM security_order WHERE account_id = $1 AND status = 'OPEN'",
        )
        .bind(trader_id)
        .fetch_one(&mut tx)
        .await
        .map_err(internal)?
        .try_get("count")
        .map_err(internal)?;
        if count > 0 {
            return Err(ServiceError::OpenOrders { id: trader_id, count });
        }

        // No OPEN orders remain, so only filled or cancelled history is left;
        // it references the account and has to go first.
        for statement in [
            "DELETE FROM security_order WHERE account_id = $1",
            "DELETE FROM account WHERE id = $1",
            "DELETE FROM trader WHERE id = $1",
        ] {
            sqlx::query(statement)
                .bind(trader_id)
                .execute(&mut tx)
                .await
                .map_err(internal)?;
        }

        tx.commit().await.map_err(internal)?;
        log::info!("Deleted trader {} and their account", trader_id);
        Ok(())
    }

    async fn deposit(&self, trader_id: TraderId, amount: BigDecimal) -> Result<Account, ServiceError> {
        validate_positive_amount(&amount)?;

        let row = sqlx::query(
            r#"
            UPDATE account SET amount = amount + $1
            WHERE id = $2
            RETURNING id, trader_id, amount
            "#,
        )
        .bind(&amount)
        .bind(trader_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?
        .ok_or(ServiceError::TraderNotFound(trader_id))?;

        account_from_row(&row).map_err(internal)
    }

    async fn withdraw(&self, trader_id: TraderId, amount: BigDecimal) -> Result<Account, ServiceError> {
        validate_positive_amount(&amount)?;

        let updated = sqlx::query(
            r#"
            UPDATE account SET amount = amount - $1
            WHERE id = $2 AND amount >= $1
            RETURNING id, trader_id, amount
            "#,
        )
        .bind(&amount)
        .bind(trader_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal)?;

        if let Some(row) = updated {
            return account_from_row(&row).map_err(internal);
        }

        // Nothing updated: either the account is missing or the balance is short.
        let balance: Option<BigDecimal> = sqlx::query("SELECT amount FROM account WHERE id = $1")
            .bind(trader_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(internal)?
            .map(|row| row.try_get::<BigDecimal, _>("amount"))
            .transpose()
            .map_err(internal)?;

        Err(failed_withdrawal(trader_id, balance, amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn failed_withdrawal_tells_missing_from_short() {
        assert_eq!(
            failed_withdrawal(5, None, dec("1.00")),
            ServiceError::TraderNotFound(5)
        );
        assert_eq!(
            failed_withdrawal(5, Some(dec("0.50")), dec("1.00")),
            ServiceError::InsufficientFunds {
                id: 5,
                balance: dec("0.50"),
                requested: dec("1.00"),
            }
        );
    }

    #[test]
    fn only_database_errors_can_be_unique_violations() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(!is_unique_violation(&sqlx::Error::PoolTimedOut));
    }

    #[test]
    fn driver_errors_become_internal() {
        assert!(matches!(internal(sqlx::Error::PoolClosed), ServiceError::Internal(_)));
    }
}
