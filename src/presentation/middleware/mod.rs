//! Middleware
//!
//! Tower middleware for request processing.

pub mod auth;
pub mod cors;
pub mod logging;
pub mod rate_limit;
pub mod security;

pub use auth::{admin_middleware, auth_middleware, AuthUser};
pub use rate_limit::{
    rate_limit_api, rate_limit_auth, rate_limit_hub, rate_limit_swipe, EndpointType,
    RateLimitConfig, RateLimitInfo, RateLimiter,
};
pub use security::{hsts_header, security_headers};
