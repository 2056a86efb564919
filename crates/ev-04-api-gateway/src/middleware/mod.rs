//! Tower middleware for the gateway.
//!
//! Outermost first: CORS, tracing, rate limit, timeout, body limit. The
//! admin router additionally carries [`AdminAuthLayer`].

pub mod auth;
pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod timeout;
pub mod tracing;

pub use auth::{constant_time_compare, AdminAuthLayer};
pub use cors::create_cors_layer;
pub use metrics::GatewayMetrics;
pub use rate_limit::{cleanup_task, RateLimitLayer, RateLimitState};
pub use timeout::TimeoutLayer;
pub use self::tracing::TracingLayer;
