use async_trait::async_trait;
use bigdecimal::{BigDecimal, Zero};
use thiserror::Error;
use crate::models::account::Account;
use crate::models::trader::Trader;
use crate::models::types::{TraderAccountView, TraderId};

/// Failures the account service can report. Every variant is a distinct
/// business outcome; the HTTP layer maps them without inspecting messages.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error("invalid trader: {0}")]
    InvalidTrader(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("email {0} is already in use")]
    EmailInUse(String),

    #[error("trader {0} not found")]
    TraderNotFound(TraderId),

    #[error("trader {id} still has a balance of {balance}")]
    NonZeroBalance { id: TraderId, balance: BigDecimal },

    #[error("trader {id} has {count} open order(s)")]
    OpenOrders { id: TraderId, count: i64 },

    #[error("insufficient funds for trader {id}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        id: TraderId,
        balance: BigDecimal,
        requested: BigDecimal,
    },

    #[error("internal service error: {0}")]
    Internal(String),
}

/// Business operations behind the `/trader` routes.
#[async_trait]
pub trait TraderAccountService: Send + Sync {
    /// Creates a trader and their empty account under one new id.
    /// Any id already set on `trader` is ignored.
    async fn create_trader_account(&self, trader: Trader) -> Result<TraderAccountView, ServiceError>;

    /// Removes a trader and their account. Only allowed with a zero balance
    /// and no open orders.
    async fn delete_trader_by_id(&self, trader_id: TraderId) -> Result<(), ServiceError>;

    async fn deposit(&self, trader_id: TraderId, amount: BigDecimal) -> Result<Account, ServiceError>;

    async fn withdraw(&self, trader_id: TraderId, amount: BigDecimal) -> Result<Account, ServiceError>;
}

pub(crate) fn validate_new_trader(trader: &Trader) -> Result<(), ServiceError> {
    match trader.blank_field() {
        Some(field) => Err(ServiceError::InvalidTrader(format!("{} must not be blank", field))),
        None => Ok(()),
    }
}

pub(crate) fn validate_positive_amount(amount: &BigDecimal) -> Result<(), ServiceError> {
    if amount <= &BigDecimal::zero() {
        return Err(ServiceError::InvalidAmount(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    Ok(())
}
