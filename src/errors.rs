use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::services::ServiceError;

/// Everything a `/trader` route can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request rejected before the account service was called.
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ErrorResponse {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Service(err) => match err {
                ServiceError::InvalidTrader(_) | ServiceError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
                ServiceError::TraderNotFound(_) => StatusCode::NOT_FOUND,
                ServiceError::EmailInUse(_)
                | ServiceError::NonZeroBalance { .. }
                | ServiceError::OpenOrders { .. }
                | ServiceError::InsufficientFunds { .. } => StatusCode::CONFLICT,
                ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            log::error!("Request failed: {}", self);
        } else {
            log::warn!("Request rejected ({}): {}", status.as_u16(), self);
        }

        HttpResponse::build(status).json(ErrorResponse {
            status: status.as_u16(),
            error: status.canonical_reason().unwrap_or("Unknown").to_string(),
            message: self.to_string(),
        })
    }
}
