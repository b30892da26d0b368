//! Fixed-window rate limiting decision engine.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, trace};

use super::resolver::{ClientRouteConfig, ConfigResolver, QuotaDefaults};
use super::window;
use crate::error::{FloodgateError, Result};
use crate::store::CounterStore;

/// The outcome of one quota decision. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    /// Whether the request fits within the quota
    pub allowed: bool,
    /// The limit in force for this (client, route) pair
    pub limit: u64,
    /// Requests left in the current window, never negative
    pub remaining: u64,
    /// Live TTL of the window bucket at decision time, in seconds
    pub reset_in_seconds: u64,
}

/// The fixed-window decision engine.
///
/// Holds no in-process mutable state; all cross-request coordination goes
/// through the store's atomic increment, so instances can be shared freely
/// across concurrent request handlers.
pub struct FixedWindowLimiter<S: CounterStore> {
    store: Arc<S>,
    resolver: ConfigResolver<S>,
}

impl<S: CounterStore> FixedWindowLimiter<S> {
    /// Create a new limiter over the shared store with the given process
    /// defaults.
    pub fn new(store: Arc<S>, defaults: QuotaDefaults) -> Self {
        let resolver = ConfigResolver::new(Arc::clone(&store), defaults);
        Self { store, resolver }
    }

    /// Decide whether a request from `client_id` against `route` fits within
    /// the pair's quota, counting it in the process.
    ///
    /// The increment is the only atomic step; arming the bucket expiry and
    /// re-reading the TTL are separate round trips. A failure at any step
    /// aborts the whole decision with an error, though an increment that
    /// already succeeded has been consumed.
    pub async fn check(&self, client_id: &str, route: &str) -> Result<RateLimitDecision> {
        // The gateway authenticates the client before calling in, but an
        // empty identity would silently merge callers into one bucket.
        if client_id.is_empty() {
            return Err(FloodgateError::Validation(
                "client_id is required".to_string(),
            ));
        }
        if route.is_empty() {
            return Err(FloodgateError::Validation("route is required".to_string()));
        }

        let config = self.resolver.get_or_create(client_id, route).await?;

        let now = Utc::now().timestamp();
        let window_start = window::window_start(now, config.window);
        let key = window::counter_key(client_id, route, window_start);

        trace!(
            key = %key,
            limit = config.limit,
            window = config.window,
            "Checking rate limit"
        );

        let count = self.store.incr(&key).await?;

        // This increment created the bucket: arm its expiry for the rest of
        // the window so it self-destructs at the boundary.
        if count == 1 {
            let ttl = Duration::from_secs(window::seconds_until_reset(now, config.window));
            debug!(key = %key, ttl_secs = ttl.as_secs(), "Created window bucket");
            self.store.expire(&key, ttl).await?;
        }

        // Marginally stale relative to the increment, acceptable for a
        // user-facing "seconds until reset" hint.
        let reset_in_seconds = self
            .store
            .ttl(&key)
            .await?
            .unwrap_or(Duration::ZERO)
            .as_secs();

        if count as u64 > config.limit {
            debug!(
                key = %key,
                count = count,
                limit = config.limit,
                "Rate limit exceeded"
            );
            return Ok(RateLimitDecision {
                allowed: false,
                limit: config.limit,
                remaining: 0,
                reset_in_seconds,
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            limit: config.limit,
            remaining: config.limit - count as u64,
            reset_in_seconds,
        })
    }

    /// Persist an explicit quota for a (client, route) pair.
    ///
    /// Thin pass-through to [`ConfigResolver::upsert`] with the same
    /// identity check as [`check`](Self::check).
    pub async fn set_config(
        &self,
        client_id: &str,
        route: &str,
        limit: u64,
        window_secs: u64,
    ) -> Result<ClientRouteConfig> {
        if client_id.is_empty() {
            return Err(FloodgateError::Validation(
                "client_id is required".to_string(),
            ));
        }
        self.resolver.upsert(client_id, route, limit, window_secs).await
    }
}
