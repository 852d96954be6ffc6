use serde::{Deserialize, Serialize};
use bigdecimal::BigDecimal;
use crate::models::money::zero_cents;
use crate::models::types::TraderId;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: TraderId,
    pub trader_id: TraderId, // always equal to `id`
    pub amount: BigDecimal,
}

impl Account {
    /// A fresh, empty account for a newly created trader.
    pub fn opened_for(trader_id: TraderId) -> Self {
        Account {
            id: trader_id,
            trader_id,
            amount: zero_cents(),
        }
    }
}
