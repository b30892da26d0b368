//! Per-client, per-route quota configuration resolution.
//!
//! Config records live in the shared store under
//! `fixed-window-config:{client}:{route}` as JSON, retained for 24 hours from
//! the last write. A pair that goes unused for a day reverts to the process
//! defaults, even if previously customized; that trade-off keeps the store
//! self-cleaning without any deletion logic here.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::window;
use crate::error::{FloodgateError, Result};
use crate::store::CounterStore;

/// Retention for persisted config records, refreshed on every write.
pub const CONFIG_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Quota policy for one (client, route) pair.
///
/// A `limit` of zero never leaves this module through [`ConfigResolver`]:
/// lazy creation uses the process defaults and upsert coalesces zero to
/// them. A zero read back from the store (written out-of-band) is honored
/// as a zero quota, denying every request for the pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRouteConfig {
    /// Opaque client identifier
    pub client_id: String,
    /// Allowed requests per window
    pub limit: u64,
    /// Window length in seconds
    pub window: u64,
}

/// Process-wide fallback quota, supplied at construction.
#[derive(Debug, Clone, Copy)]
pub struct QuotaDefaults {
    /// Requests allowed per window when no explicit config exists
    pub limit: u64,
    /// Window length in seconds when no explicit config exists
    pub window_secs: u64,
}

impl Default for QuotaDefaults {
    fn default() -> Self {
        Self {
            limit: 100,
            window_secs: 60,
        }
    }
}

/// Resolves the effective quota for a (client, route) pair against the
/// shared store, creating a default record on first access.
pub struct ConfigResolver<S: CounterStore> {
    store: Arc<S>,
    defaults: QuotaDefaults,
}

impl<S: CounterStore> ConfigResolver<S> {
    /// Create a new resolver over the shared store.
    pub fn new(store: Arc<S>, defaults: QuotaDefaults) -> Self {
        Self { store, defaults }
    }

    /// Fetch the config for a pair, creating and persisting one from the
    /// process defaults if none exists.
    ///
    /// A record that exists but fails to parse, or that carries a zero
    /// window, is a store fault and is never replaced with defaults. Read
    /// failures other than not-found propagate unchanged.
    pub async fn get_or_create(&self, client_id: &str, route: &str) -> Result<ClientRouteConfig> {
        let key = window::config_key(client_id, route);

        if let Some(raw) = self.store.get(&key).await? {
            let config: ClientRouteConfig = serde_json::from_str(&raw)?;
            if config.window == 0 {
                return Err(FloodgateError::Store(format!(
                    "config record at {key} has a zero window"
                )));
            }
            return Ok(config);
        }

        let config = ClientRouteConfig {
            client_id: client_id.to_string(),
            limit: self.defaults.limit,
            window: self.defaults.window_secs,
        };
        self.store
            .set(&key, &serde_json::to_string(&config)?, CONFIG_TTL)
            .await?;

        debug!(
            client_id = %client_id,
            route = %route,
            limit = config.limit,
            window = config.window,
            "Created default quota configuration"
        );

        Ok(config)
    }

    /// Persist an explicit quota for a pair, overwriting any prior value.
    ///
    /// A zero `limit` or `window_secs` coalesces to the process default for
    /// that field only.
    pub async fn upsert(
        &self,
        client_id: &str,
        route: &str,
        limit: u64,
        window_secs: u64,
    ) -> Result<ClientRouteConfig> {
        if route.is_empty() {
            return Err(FloodgateError::Validation("route is required".to_string()));
        }

        let config = ClientRouteConfig {
            client_id: client_id.to_string(),
            limit: if limit == 0 { self.defaults.limit } else { limit },
            window: if window_secs == 0 {
                self.defaults.window_secs
            } else {
                window_secs
            },
        };

        let key = window::config_key(client_id, route);
        self.store
            .set(&key, &serde_json::to_string(&config)?, CONFIG_TTL)
            .await?;

        info!(
            client_id = %client_id,
            route = %route,
            limit = config.limit,
            window = config.window,
            "Quota configuration updated"
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryCounterStore;

    fn resolver_with_defaults(limit: u64, window_secs: u64) -> ConfigResolver<InMemoryCounterStore> {
        ConfigResolver::new(
            Arc::new(InMemoryCounterStore::new()),
            QuotaDefaults { limit, window_secs },
        )
    }

    #[tokio::test]
    async fn test_get_or_create_persists_defaults_on_first_access() {
        let store = Arc::new(InMemoryCounterStore::new());
        let resolver = ConfigResolver::new(Arc::clone(&store), QuotaDefaults::default());

        let config = resolver.get_or_create("c1", "/orders").await.unwrap();
        assert_eq!(config.limit, 100);
        assert_eq!(config.window, 60);

        // The record is now readable straight from the store.
        let raw = store
            .get("fixed-window-config:c1:/orders")
            .await
            .unwrap()
            .expect("config record should be persisted");
        let stored: ClientRouteConfig = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored, config);
    }

    #[tokio::test]
    async fn test_get_or_create_returns_existing_record() {
        let store = Arc::new(InMemoryCounterStore::new());
        store
            .set(
                "fixed-window-config:c1:/orders",
                r#"{"client_id":"c1","limit":5,"window":30}"#,
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let resolver = ConfigResolver::new(store, QuotaDefaults::default());
        let config = resolver.get_or_create("c1", "/orders").await.unwrap();

        assert_eq!(config.limit, 5);
        assert_eq!(config.window, 30);
    }

    #[tokio::test]
    async fn test_corrupt_record_is_a_store_error() {
        let store = Arc::new(InMemoryCounterStore::new());
        store
            .set(
                "fixed-window-config:c1:/orders",
                "not json",
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let resolver = ConfigResolver::new(store, QuotaDefaults::default());
        let err = resolver.get_or_create("c1", "/orders").await.unwrap_err();
        assert!(matches!(err, FloodgateError::Store(_)));
    }

    #[tokio::test]
    async fn test_zero_window_record_is_a_store_error() {
        let store = Arc::new(InMemoryCounterStore::new());
        store
            .set(
                "fixed-window-config:c1:/orders",
                r#"{"client_id":"c1","limit":5,"window":0}"#,
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        let resolver = ConfigResolver::new(store, QuotaDefaults::default());
        let err = resolver.get_or_create("c1", "/orders").await.unwrap_err();
        assert!(matches!(err, FloodgateError::Store(_)));
    }

    #[tokio::test]
    async fn test_upsert_requires_route() {
        let resolver = resolver_with_defaults(100, 60);
        let err = resolver.upsert("c1", "", 10, 30).await.unwrap_err();
        assert!(matches!(err, FloodgateError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upsert_coalesces_zero_fields_independently() {
        let resolver = resolver_with_defaults(100, 60);

        let config = resolver.upsert("c1", "/orders", 0, 45).await.unwrap();
        assert_eq!(config.limit, 100);
        assert_eq!(config.window, 45);

        let config = resolver.upsert("c1", "/orders", 7, 0).await.unwrap();
        assert_eq!(config.limit, 7);
        assert_eq!(config.window, 60);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_previous_record() {
        let resolver = resolver_with_defaults(100, 60);

        resolver.upsert("c1", "/orders", 50, 30).await.unwrap();
        resolver.upsert("c1", "/orders", 9, 15).await.unwrap();

        let config = resolver.get_or_create("c1", "/orders").await.unwrap();
        assert_eq!(config.limit, 9);
        assert_eq!(config.window, 15);
    }
}
