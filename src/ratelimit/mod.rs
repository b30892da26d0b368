//! Rate limiting logic and quota configuration.

mod limiter;
mod resolver;
pub mod window;

pub use limiter::{FixedWindowLimiter, RateLimitDecision};
pub use resolver::{ClientRouteConfig, ConfigResolver, QuotaDefaults, CONFIG_TTL};
