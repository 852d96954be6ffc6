use std::sync::Arc;
use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use crate::errors::ApiError;
use crate::models::money::{parse_amount, truncate_to_cents};
use crate::models::trader::{parse_dob, Trader};
use crate::models::types::TraderId;
use crate::services::TraderAccountService;

pub struct AppState {
    pub service: Arc<dyn TraderAccountService>,
}

pub fn initialize_app_state(service: Arc<dyn TraderAccountService>) -> AppState {
    AppState { service }
}

/// Query string of `POST /trader/create`.
#[derive(Deserialize, Debug)]
pub struct CreateTraderParams {
    pub firstname: String,
    pub lastname: String,
    pub email: String,
    pub country: String,
    pub birthdate: String, // yyyy-MM-dd
}

#[derive(Deserialize, Debug)]
pub struct AmountParams {
    pub amount: String,
}

fn parse_trader_id(raw: &str) -> Result<TraderId, ApiError> {
    match raw.parse::<TraderId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::Validation(format!(
            "trader id must be a positive integer, got '{}'",
            raw
        ))),
    }
}

/// Parses the amount and drops fractional cents. Sign and magnitude are left
/// for the account service to judge.
fn normalized_amount(raw: &str) -> Result<BigDecimal, ApiError> {
    let amount = parse_amount(raw).map_err(ApiError::Validation)?;
    Ok(truncate_to_cents(&amount))
}

// Both create routes end up here so they answer identically for the same trader.
async fn open_account(app_state: &AppState, mut trader: Trader) -> Result<HttpResponse, ApiError> {
    trader.id = None;
    let view = app_state.service.create_trader_account(trader).await?;
    Ok(HttpResponse::Created().json(view))
}

pub async fn create_trader_account(
    params: web::Query<CreateTraderParams>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let params = params.into_inner();
    let dob = parse_dob(&params.birthdate).map_err(|_| {
        ApiError::Validation(format!(
            "birthdate '{}' is not a valid yyyy-MM-dd date",
            params.birthdate
        ))
    })?;

    let trader = Trader::new(params.firstname, params.lastname, params.email, params.country, dob);
    open_account(&app_state, trader).await
}

pub async fn create_prebuilt_trader_account(
    trader: web::Json<Trader>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    open_account(&app_state, trader.into_inner()).await
}

pub async fn delete_trader_account(
    trader_id: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let trader_id = parse_trader_id(&trader_id)?;
    app_state.service.delete_trader_by_id(trader_id).await?;
    Ok(HttpResponse::Ok().finish())
}

pub async fn deposit_funds(
    trader_id: web::Path<String>,
    params: web::Query<AmountParams>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let trader_id = parse_trader_id(&trader_id)?;
    let amount = normalized_amount(&params.amount)?;
    log::debug!("Deposit of {} requested for trader {}", amount, trader_id);

    let account = app_state.service.deposit(trader_id, amount).await?;
    Ok(HttpResponse::Ok().json(account))
}

pub async fn withdraw_funds(
    trader_id: web::Path<String>,
    params: web::Query<AmountParams>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, ApiError> {
    let trader_id = parse_trader_id(&trader_id)?;
    let amount = normalized_amount(&params.amount)?;
    log::debug!("Withdrawal of {} requested for trader {}", amount, trader_id);

    let account = app_state.service.withdraw(trader_id, amount).await?;
    Ok(HttpResponse::Ok().json(account))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn trader_ids_must_be_positive_integers() {
        assert_eq!(parse_trader_id("42").unwrap(), 42);
        assert!(parse_trader_id("0").is_err());
        assert!(parse_trader_id("-3").is_err());
        assert!(parse_trader_id("abc").is_err());
        assert!(parse_trader_id("99999999999").is_err());
    }

    #[test]
    fn deposit_and_withdraw_share_normalization() {
        let amount = normalized_amount("1745.239").unwrap();
        assert_eq!(amount, BigDecimal::from_str("1745.23").unwrap());
        assert_eq!(normalized_amount("-5.999").unwrap(), BigDecimal::from_str("-6.00").unwrap());
        assert!(matches!(normalized_amount("12,50"), Err(ApiError::Validation(_))));
    }
}
