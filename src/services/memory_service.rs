use std::collections::HashMap;
use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use tokio::sync::Mutex;
use crate::models::account::Account;
use crate::models::trader::Trader;
use crate::models::types::{TraderAccountView, TraderId};
use crate::services::trader_account_service::{
    validate_new_trader, validate_positive_amount, ServiceError, TraderAccountService,
};

#[derive(Default)]
struct Store {
    traders: HashMap<TraderId, Trader>,
    accounts: HashMap<TraderId, Account>,
    open_orders: HashMap<TraderId, i64>,
    last_id: TraderId,
}

impl Store {
    fn account_mut(&mut self, trader_id: TraderId) -> Result<&mut Account, ServiceError> {
        self.accounts
            .get_mut(&trader_id)
            .ok_or(ServiceError::TraderNotFound(trader_id))
    }
}

/// Account service kept entirely in process memory.
///
/// Every operation runs under one lock, so the delete preconditions and the
/// removal itself cannot interleave with a deposit or withdrawal.
#[derive(Default)]
pub struct InMemoryTraderAccountService {
    store: Mutex<Store>,
}

impl InMemoryTraderAccountService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of outstanding orders tied to a trader's account.
    pub async fn record_open_orders(&self, trader_id: TraderId, count: i64) -> Result<(), ServiceError> {
        let mut store = self.store.lock().await;
        if !store.accounts.contains_key(&trader_id) {
            return Err(ServiceError::TraderNotFound(trader_id));
        }
        store.open_orders.insert(trader_id, count);
        Ok(())
    }

    pub async fn account(&self, trader_id: TraderId) -> Option<Account> {
        self.store.lock().await.accounts.get(&trader_id).cloned()
    }
}

#[async_trait]
impl TraderAccountService for InMemoryTraderAccountService {
    async fn create_trader_account(&self, trader: Trader) -> Result<TraderAccountView, ServiceError> {
        validate_new_trader(&trader)?;

        let mut store = self.store.lock().await;
        let email = trader.email.trim().to_lowercase();
        if store
            .traders
            .values()
            .any(|existing| existing.email.trim().to_lowercase() == email)
        {
            return Err(ServiceError::EmailInUse(trader.email));
        }

        store.last_id += 1;
        let id = store.last_id;
        let trader = trader.with_id(id);
        let account = Account::opened_for(id);
        store.traders.insert(id, trader.clone());
        store.accounts.insert(id, account.clone());

        log::info!("Created trader {} with an empty account", id);
        Ok(TraderAccountView::new(trader, account))
    }

    async fn delete_trader_by_id(&self, trader_id: TraderId) -> Result<(), ServiceError> {
        let mut store = self.store.lock().await;
        let balance = store.account_mut(trader_id)?.amount.clone();
        if !balance.is_zero() {
            return Err(ServiceError::NonZeroBalance { id: trader_id, balance });
        }
        let count = store.open_orders.get(&trader_id).copied().unwrap_or(0);
        if count > 0 {
            return Err(ServiceError::OpenOrders { id: trader_id, count });
        }

        store.accounts.remove(&trader_id);
        store.traders.remove(&trader_id);
        store.open_orders.remove(&trader_id);
        log::info!("Deleted trader {} and their account", trader_id);
        Ok(())
    }

    async fn deposit(&self, trader_id: TraderId, amount: BigDecimal) -> Result<Account, ServiceError> {
        validate_positive_amount(&amount)?;
        let mut store = self.store.lock().await;
        let account = store.account_mut(trader_id)?;
        account.amount = account.amount.clone() + amount;
        Ok(account.clone())
    }

    async fn withdraw(&self, trader_id: TraderId, amount: BigDecimal) -> Result<Account, ServiceError> {
        validate_positive_amount(&amount)?;
        let mut store = self.store.lock().await;
        let account = store.account_mut(trader_id)?;
        if amount > account.amount {
            return Err(ServiceError::InsufficientFunds {
                id: trader_id,
                balance: account.amount.clone(),
                requested: amount,
            });
        }
        account.amount = account.amount.clone() - amount;
        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn trader(email: &str) -> Trader {
        Trader::new(
            "First".to_string(),
            "Last".to_string(),
            email.to_string(),
            "CA".to_string(),
            NaiveDate::from_ymd_opt(1994, 5, 11).unwrap(),
        )
    }

    #[tokio::test]
    async fn create_assigns_matching_ids() {
        let service = InMemoryTraderAccountService::new();
        let first = service.create_trader_account(trader("a@email.org")).await.unwrap();
        let second = service.create_trader_account(trader("b@email.org").with_id(99)).await.unwrap();

        assert_eq!(first.trader.id, Some(first.account.id));
        assert_eq!(first.account.trader_id, first.account.id);
        assert_eq!(second.trader.id, Some(2));
        assert_eq!(second.account.amount, dec("0.00"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_case_insensitively() {
        let service = InMemoryTraderAccountService::new();
        service.create_trader_account(trader("flast@email.org")).await.unwrap();
        let err = service
            .create_trader_account(trader("FLast@Email.org"))
            .await
            .unwrap_err();
        assert_eq!(err, ServiceError::EmailInUse("FLast@Email.org".to_string()));
    }

    #[tokio::test]
    async fn blank_profile_fields_are_rejected() {
        let service = InMemoryTraderAccountService::new();
        let mut blank = trader("x@email.org");
        blank.first_name = " ".to_string();
        assert!(matches!(
            service.create_trader_account(blank).await,
            Err(ServiceError::InvalidTrader(_))
        ));
    }

    #[tokio::test]
    async fn withdraw_cannot_overdraw() {
        let service = InMemoryTraderAccountService::new();
        let id = service.create_trader_account(trader("w@email.org")).await.unwrap().account.id;
        service.deposit(id, dec("10.00")).await.unwrap();

        let err = service.withdraw(id, dec("10.01")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InsufficientFunds { .. }));

        let account = service.withdraw(id, dec("10.00")).await.unwrap();
        assert_eq!(account.amount, dec("0"));
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let service = InMemoryTraderAccountService::new();
        let id = service.create_trader_account(trader("n@email.org")).await.unwrap().account.id;
        for raw in ["0", "-1.00"] {
            assert!(matches!(service.deposit(id, dec(raw)).await, Err(ServiceError::InvalidAmount(_))));
            assert!(matches!(service.withdraw(id, dec(raw)).await, Err(ServiceError::InvalidAmount(_))));
        }
    }

    #[tokio::test]
    async fn delete_checks_balance_and_orders() {
        let service = InMemoryTraderAccountService::new();
        let id = service.create_trader_account(trader("d@email.org")).await.unwrap().account.id;

        service.deposit(id, dec("1.00")).await.unwrap();
        assert!(matches!(
            service.delete_trader_by_id(id).await,
            Err(ServiceError::NonZeroBalance { .. })
        ));

        service.withdraw(id, dec("1.00")).await.unwrap();
        service.record_open_orders(id, 2).await.unwrap();
        assert_eq!(
            service.delete_trader_by_id(id).await,
            Err(ServiceError::OpenOrders { id, count: 2 })
        );

        service.record_open_orders(id, 0).await.unwrap();
        service.delete_trader_by_id(id).await.unwrap();
        assert_eq!(service.delete_trader_by_id(id).await, Err(ServiceError::TraderNotFound(id)));
        assert!(service.account(id).await.is_none());
    }
}
