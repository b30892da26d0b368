//! API-key and client-identity authentication for the rate endpoints.
//!
//! The client identity is only ever taken from the authenticated
//! `x-client-id` header, never from request payloads, so handlers can trust
//! the [`ClientId`] extension unconditionally.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::warn;

use super::{AppState, ErrorBody};
use crate::store::CounterStore;

/// Verified client identity, injected as a request extension.
#[derive(Debug, Clone)]
pub struct ClientId(pub String);

/// Reject requests lacking a valid API key or a non-empty client identity
/// before the core is invoked.
pub async fn authenticate<S: CounterStore + 'static>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Response {
    let client_id = request
        .headers()
        .get("x-client-id")
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string);

    let Some(client_id) = client_id else {
        warn!("Rejected request without client identity");
        return unauthorized("client identity is required");
    };

    let api_key = request
        .headers()
        .get("api-key")
        .and_then(|value| value.to_str().ok());

    // An unconfigured key closes the endpoints rather than opening them.
    if state.api_key.is_empty() || api_key != Some(state.api_key.as_str()) {
        warn!(client_id = %client_id, "Rejected request with invalid API key");
        return unauthorized("invalid API key");
    }

    request.extensions_mut().insert(ClientId(client_id));
    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorBody {
            code: StatusCode::UNAUTHORIZED.as_u16(),
            message: message.to_string(),
        }),
    )
        .into_response()
}
