use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, Error, HttpRequest};
use crate::errors::ApiError;

pub mod trader_routes;

pub use trader_routes::{initialize_app_state, AppState};

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> Error {
    ApiError::Validation(format!("invalid query string: {}", err)).into()
}

fn path_error(err: PathError, _req: &HttpRequest) -> Error {
    ApiError::Validation(format!("invalid path: {}", err)).into()
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    ApiError::Validation(format!("invalid trader document: {}", err)).into()
}

/// Mounts the `/trader` routes. Extractor failures are reported with the same
/// error body as every other rejection.
pub fn configure(json_limit: usize) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::QueryConfig::default().error_handler(query_error))
            .app_data(web::PathConfig::default().error_handler(path_error))
            .app_data(web::JsonConfig::default().limit(json_limit).error_handler(json_error))
            .service(
                web::scope("/trader")
                    .route("/create", web::post().to(trader_routes::create_trader_account))
                    .route("/create/prebuilt", web::post().to(trader_routes::create_prebuilt_trader_account))
                    .route("/delete/{trader_id}", web::delete().to(trader_routes::delete_trader_account))
                    .route("/deposit/{trader_id}", web::put().to(trader_routes::deposit_funds))
                    .route("/withdraw/{trader_id}", web::put().to(trader_routes::withdraw_funds)),
            );
    }
}
