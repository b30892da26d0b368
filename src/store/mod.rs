//! Counter store abstraction over shared key/value storage.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

mod memory;
mod redis;

pub use self::memory::InMemoryCounterStore;
pub use self::redis::RedisCounterStore;

/// Capability trait for the shared store the rate limiter coordinates
/// through.
///
/// This trait abstracts over the Redis-backed production store and the
/// in-memory store to allow the limiter and HTTP layer to work with either.
/// The store has no knowledge of rate-limiting semantics; callers own key
/// naming and bucket lifecycle.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically increment the integer at `key`, creating it at 1 if
    /// absent, and return the new value.
    ///
    /// This must be linearizable per key. It is the single primitive the
    /// correctness of concurrent quota decisions rests on.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Arm a time-to-live on an existing key.
    async fn expire(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Return the remaining time-to-live of `key`.
    ///
    /// `None` means the key is missing or carries no TTL, distinct from a
    /// real remaining duration of zero.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>>;

    /// Fetch the serialized value at `key`, or `None` if absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a serialized value at `key` with the given retention.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Delete `key`. Deleting a missing key is not an error.
    async fn del(&self, key: &str) -> Result<()>;
}
