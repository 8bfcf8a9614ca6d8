//! Integration Tests Entry Point
//!
//! Tests are organized by module:
//! - `api/` - HTTP surface and wire-format tests
//! - `common/` - Shared test utilities

mod api;
mod common;
