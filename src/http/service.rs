//! Request handlers and wire shapes for the rate endpoints.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::auth::ClientId;
use super::AppState;
use crate::error::FloodgateError;
use crate::ratelimit::{ClientRouteConfig, RateLimitDecision};
use crate::store::CounterStore;

/// Body of a quota check request. The client identity comes from the
/// authenticated headers, not from this payload.
#[derive(Debug, Deserialize)]
pub struct CheckLimitRequest {
    /// The protected operation being requested
    pub route: String,
}

/// Transport-level rendering of a decision's allow/deny bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LimitStatus {
    Ok,
    Limited,
}

/// Body returned for every quota check, allowed or not. A denied request is
/// data, not a transport error, so both cases ride an HTTP 200.
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckLimitResponse {
    pub status: LimitStatus,
    pub limit: u64,
    pub remaining: u64,
    pub reset_in_seconds: u64,
}

impl From<RateLimitDecision> for CheckLimitResponse {
    fn from(decision: RateLimitDecision) -> Self {
        Self {
            status: if decision.allowed {
                LimitStatus::Ok
            } else {
                LimitStatus::Limited
            },
            limit: decision.limit,
            remaining: decision.remaining,
            reset_in_seconds: decision.reset_in_seconds,
        }
    }
}

/// Body of a quota override request.
#[derive(Debug, Deserialize)]
pub struct SetConfigRequest {
    /// The protected operation the quota applies to
    pub route: String,
    /// Requests per window; zero or omitted falls back to the process default
    #[serde(default)]
    pub limit: u64,
    /// Window length in seconds; zero or omitted falls back to the process
    /// default
    #[serde(default)]
    pub window: u64,
}

/// Service name and version, usable as a liveness probe.
pub async fn service_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Count a request against the caller's quota and report the decision.
pub async fn check_limit<S: CounterStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(ClientId(client_id)): Extension<ClientId>,
    Json(payload): Json<CheckLimitRequest>,
) -> Result<Json<CheckLimitResponse>, FloodgateError> {
    let decision = state.limiter.check(&client_id, &payload.route).await?;
    Ok(Json(decision.into()))
}

/// Persist an explicit quota for the caller and route.
pub async fn set_config<S: CounterStore + 'static>(
    State(state): State<AppState<S>>,
    Extension(ClientId(client_id)): Extension<ClientId>,
    Json(payload): Json<SetConfigRequest>,
) -> Result<Json<ClientRouteConfig>, FloodgateError> {
    let config = state
        .limiter
        .set_config(&client_id, &payload.route, payload.limit, payload.window)
        .await?;
    Ok(Json(config))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::ratelimit::{FixedWindowLimiter, QuotaDefaults};
    use crate::store::InMemoryCounterStore;

    fn test_state() -> AppState<InMemoryCounterStore> {
        AppState {
            limiter: Arc::new(FixedWindowLimiter::new(
                Arc::new(InMemoryCounterStore::new()),
                QuotaDefaults {
                    limit: 3,
                    window_secs: 60,
                },
            )),
            api_key: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_check_limit_reports_decision() {
        let state = test_state();

        let Json(response) = check_limit(
            State(state),
            Extension(ClientId("c1".to_string())),
            Json(CheckLimitRequest {
                route: "/a".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status, LimitStatus::Ok);
        assert_eq!(response.limit, 3);
        assert_eq!(response.remaining, 2);
    }

    #[tokio::test]
    async fn test_check_limit_reports_limited_once_exhausted() {
        let state = test_state();

        for _ in 0..3 {
            check_limit(
                State(state.clone()),
                Extension(ClientId("c1".to_string())),
                Json(CheckLimitRequest {
                    route: "/a".to_string(),
                }),
            )
            .await
            .unwrap();
        }

        let Json(response) = check_limit(
            State(state),
            Extension(ClientId("c1".to_string())),
            Json(CheckLimitRequest {
                route: "/a".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.status, LimitStatus::Limited);
        assert_eq!(response.remaining, 0);
    }

    #[tokio::test]
    async fn test_set_config_persists_and_applies() {
        let state = test_state();

        let Json(config) = set_config(
            State(state.clone()),
            Extension(ClientId("c1".to_string())),
            Json(SetConfigRequest {
                route: "/orders".to_string(),
                limit: 5,
                window: 30,
            }),
        )
        .await
        .unwrap();

        assert_eq!(config.limit, 5);
        assert_eq!(config.window, 30);

        let Json(response) = check_limit(
            State(state),
            Extension(ClientId("c1".to_string())),
            Json(CheckLimitRequest {
                route: "/orders".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(response.limit, 5);
        assert_eq!(response.remaining, 4);
    }

    #[tokio::test]
    async fn test_set_config_rejects_empty_route() {
        let state = test_state();

        let err = set_config(
            State(state),
            Extension(ClientId("c1".to_string())),
            Json(SetConfigRequest {
                route: String::new(),
                limit: 5,
                window: 30,
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, FloodgateError::Validation(_)));
    }

    #[test]
    fn test_limit_status_wire_format() {
        assert_eq!(serde_json::to_string(&LimitStatus::Ok).unwrap(), "\"OK\"");
        assert_eq!(
            serde_json::to_string(&LimitStatus::Limited).unwrap(),
            "\"LIMITED\""
        );
    }
}
