//! Configuration management for Floodgate.

use std::net::SocketAddr;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{FloodgateError, Result};
use crate::ratelimit::QuotaDefaults;

/// Main configuration for the Floodgate service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FloodgateConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Shared store configuration
    #[serde(default)]
    pub redis: RedisConfig,

    /// Process-wide quota defaults
    #[serde(default)]
    pub quotas: QuotaConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// API key callers must present on the rate endpoints.
    /// Empty means no caller is accepted until one is configured.
    #[serde(default)]
    pub api_key: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            api_key: String::new(),
        }
    }
}

fn default_http_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().unwrap()
}

/// Shared store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    #[serde(default = "default_redis_url")]
    pub url: String,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379/1".to_string()
}

/// Process-wide quota defaults applied when a (client, route) pair has no
/// explicit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Requests allowed per window
    #[serde(default = "default_limit")]
    pub default_limit: u64,

    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub default_window_secs: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_window_secs: default_window_secs(),
        }
    }
}

fn default_limit() -> u64 {
    100
}

fn default_window_secs() -> u64 {
    60
}

impl QuotaConfig {
    /// Convert into the defaults consumed by the limiter.
    pub fn defaults(&self) -> QuotaDefaults {
        QuotaDefaults {
            limit: self.default_limit,
            window_secs: self.default_window_secs,
        }
    }
}

impl FloodgateConfig {
    /// Load configuration from an optional YAML file, then apply environment
    /// overrides on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| FloodgateError::Config(e.to_string()))
    }

    /// Apply environment overrides. Variable names are carried over from the
    /// system this service replaces. Unparsable numeric values keep the
    /// configured fallback with a warning.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("REDIS_URL") {
            self.redis.url = url;
        }
        if let Ok(key) = std::env::var("API_KEY") {
            self.server.api_key = key;
        }
        if let Ok(raw) = std::env::var("APP_PORT") {
            match raw.parse() {
                Ok(port) => self.server.http_addr.set_port(port),
                Err(_) => warn!(value = %raw, "Invalid APP_PORT, keeping configured port"),
            }
        }
        if let Ok(raw) = std::env::var("FIX_WINDOW_DEFAULT_MAX_REQUEST") {
            match raw.parse() {
                Ok(limit) => self.quotas.default_limit = limit,
                Err(_) => warn!(
                    value = %raw,
                    "Invalid FIX_WINDOW_DEFAULT_MAX_REQUEST, keeping configured default"
                ),
            }
        }
        if let Ok(raw) = std::env::var("FIX_WINDOW_DEFAULT_DURATION") {
            match raw.parse() {
                Ok(window) => self.quotas.default_window_secs = window,
                Err(_) => warn!(
                    value = %raw,
                    "Invalid FIX_WINDOW_DEFAULT_DURATION, keeping configured default"
                ),
            }
        }
    }
}
