//! Fixed-window arithmetic and store key derivation.
//!
//! Windows are anchored to the Unix epoch, not to a client's first request,
//! so every caller of the same route shares synchronized window boundaries.
//! A bucket is identified by the epoch second its window starts at.

/// Key prefix for window counter buckets.
pub const COUNTER_KEY_PREFIX: &str = "fixed-window";

/// Key prefix for persisted client/route quota configurations.
pub const CONFIG_KEY_PREFIX: &str = "fixed-window-config";

/// Compute the epoch second at which the window containing `epoch_secs`
/// starts.
pub fn window_start(epoch_secs: i64, window_secs: u64) -> i64 {
    epoch_secs - epoch_secs.rem_euclid(window_secs as i64)
}

/// Compute the seconds left in the window containing `epoch_secs`.
///
/// Always in `1..=window_secs`: at an exact boundary a full window remains.
pub fn seconds_until_reset(epoch_secs: i64, window_secs: u64) -> u64 {
    window_secs - epoch_secs.rem_euclid(window_secs as i64) as u64
}

/// Build the counter bucket key for one (client, route, window) triple.
pub fn counter_key(client_id: &str, route: &str, window_start: i64) -> String {
    format!("{COUNTER_KEY_PREFIX}:{client_id}:{route}:{window_start}")
}

/// Build the config record key for a (client, route) pair.
pub fn config_key(client_id: &str, route: &str) -> String {
    format!("{CONFIG_KEY_PREFIX}:{client_id}:{route}")
}
