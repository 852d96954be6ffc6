pub mod memory_service;
pub mod postgres_service;
pub mod trader_account_service;

pub use memory_service::InMemoryTraderAccountService;
pub use postgres_service::PgTraderAccountService;
pub use trader_account_service::{ServiceError, TraderAccountService};
