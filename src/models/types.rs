use serde::{Serialize, Deserialize};
use crate::models::account::Account;
use crate::models::trader::Trader;

pub type TraderId = i32; // Shared by a trader and their account

/// Trader profile and account returned together after creation.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TraderAccountView {
    pub trader: Trader,
    pub account: Account,
}

impl TraderAccountView {
    pub fn new(trader: Trader, account: Account) -> Self {
        TraderAccountView { trader, account }
    }
}
