pub mod account;
pub mod money;
pub mod trader;
pub mod types;
