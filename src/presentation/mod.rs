//! Presentation Layer
//!
//! HTTP routes, websocket hub, and middleware.

pub mod http;
pub mod hub;
pub mod middleware;
