//! HTTP gateway for the rate limit service.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::FloodgateError;
use crate::ratelimit::FixedWindowLimiter;
use crate::store::CounterStore;

mod auth;
mod server;
mod service;

pub use auth::ClientId;
pub use server::{router, HttpServer};
pub use service::{CheckLimitRequest, CheckLimitResponse, LimitStatus, SetConfigRequest};

/// Shared state handed to every request handler.
pub struct AppState<S: CounterStore> {
    /// The decision engine
    pub limiter: Arc<FixedWindowLimiter<S>>,
    /// API key callers must present on the rate endpoints
    pub api_key: String,
}

impl<S: CounterStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            limiter: Arc::clone(&self.limiter),
            api_key: self.api_key.clone(),
        }
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status code, repeated in the body
    pub code: u16,
    /// Human-readable cause
    pub message: String,
}

impl IntoResponse for FloodgateError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            FloodgateError::Validation(message) => (StatusCode::BAD_REQUEST, message),
            // Store details are logged, not echoed to callers.
            err => {
                error!(error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorBody {
            code: status.as_u16(),
            message,
        });

        (status, body).into_response()
    }
}
