//! In-memory counter store implementation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::CounterStore;
use crate::error::{FloodgateError, Result};

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Process-local [`CounterStore`] with lazy expiry.
///
/// Expired entries are evicted on access rather than by a background task,
/// mirroring how the Redis store makes expired keys invisible. Suitable for
/// single-node deployments and as the test double for the limiter.
#[derive(Default)]
pub struct InMemoryCounterStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCounterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn incr(&self, key: &str) -> Result<i64> {
        let now = Instant::now();
        let mut entries = self.entries.lock();

        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }

        let entry = entries.entry(key.to_string()).or_insert_with(|| Entry {
            value: "0".to_string(),
            expires_at: None,
        });
        let count: i64 = entry
            .value
            .parse()
            .map_err(|_| FloodgateError::Store(format!("value at {key} is not an integer")))?;
        let count = count + 1;
        entry.value = count.to_string();
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get_mut(key).filter(|e| !e.is_expired(now)) {
            entry.expires_at = Some(now + ttl);
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>> {
        let now = Instant::now();
        let entries = self.entries.lock();
        Ok(entries
            .get(key)
            .filter(|e| !e.is_expired(now))
            .and_then(|e| e.expires_at)
            .map(|at| at - now))
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if entries.get(key).is_some_and(|e| e.is_expired(now)) {
            entries.remove(key);
        }
        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_incr_creates_at_one_and_increments() {
        let store = InMemoryCounterStore::new();

        assert_eq!(store.incr("counter").await.unwrap(), 1);
        assert_eq!(store.incr("counter").await.unwrap(), 2);
        assert_eq!(store.incr("counter").await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ttl_sentinel_for_missing_and_unarmed_keys() {
        let store = InMemoryCounterStore::new();

        assert_eq!(store.ttl("missing").await.unwrap(), None);

        store.incr("counter").await.unwrap();
        assert_eq!(store.ttl("counter").await.unwrap(), None);

        store
            .expire("counter", Duration::from_secs(60))
            .await
            .unwrap();
        let ttl = store.ttl("counter").await.unwrap().unwrap();
        assert!(ttl <= Duration::from_secs(60));
        assert!(ttl > Duration::from_secs(58));
    }

    #[tokio::test]
    async fn test_expired_counter_restarts_from_one() {
        let store = InMemoryCounterStore::new();

        store.incr("counter").await.unwrap();
        store
            .expire("counter", Duration::from_millis(10))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.ttl("counter").await.unwrap(), None);
        assert_eq!(store.incr("counter").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_get_del_roundtrip() {
        let store = InMemoryCounterStore::new();

        store
            .set("record", r#"{"limit":5}"#, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(
            store.get("record").await.unwrap(),
            Some(r#"{"limit":5}"#.to_string())
        );

        store.del("record").await.unwrap();
        assert_eq!(store.get("record").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_expired_value_is_invisible_to_get() {
        let store = InMemoryCounterStore::new();

        store
            .set("record", "value", Duration::from_millis(10))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert_eq!(store.get("record").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_incr_on_non_integer_value_fails() {
        let store = InMemoryCounterStore::new();

        store
            .set("record", "not-a-number", Duration::from_secs(60))
            .await
            .unwrap();

        let err = store.incr("record").await.unwrap_err();
        assert!(matches!(err, FloodgateError::Store(_)));
    }
}
