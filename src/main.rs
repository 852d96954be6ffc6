use std::sync::Arc;
use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use dotenv::dotenv;
use trader_account_gateway::config::Config;
use trader_account_gateway::db;
use trader_account_gateway::routes::{self, initialize_app_state};
use trader_account_gateway::services::{
    InMemoryTraderAccountService, PgTraderAccountService, TraderAccountService,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;

    let service: Arc<dyn TraderAccountService> = match &config.database_url {
        Some(url) => {
            let db_pool = db::pool::create_pool(url)
                .await
                .context("failed to connect to DATABASE_URL")?;
            log::info!("Using Postgres account store");
            Arc::new(PgTraderAccountService::new(db_pool))
        }
        None => {
            log::warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(InMemoryTraderAccountService::new())
        }
    };

    let app_state = web::Data::new(initialize_app_state(service));
    let json_limit = config.json_limit;

    log::info!("Listening on {}", config.bind_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(Cors::permissive())
            .app_data(app_state.clone()) // Pass the application state
            .configure(routes::configure(json_limit))
    })
    .bind(config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await
    .context("server terminated with an error")
}
