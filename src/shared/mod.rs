//! Shared Utilities
//!
//! Error types, snowflake IDs, and validation helpers used by every layer.

pub mod error;
pub mod snowflake;
pub mod validation;

pub use error::{AppError, ErrorResponse, FieldError};
pub use snowflake::SnowflakeGenerator;
