//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints. Snowflake ids travel as
//! strings in paths and bodies; [`parse_id`] turns them back into i64.

pub mod admin;
pub mod auth;
pub mod discovery;
pub mod health;
pub mod matches;
pub mod message;
pub mod moderation;
pub mod student;
pub mod swipe;

use crate::shared::error::AppError;

/// Parse a string-encoded snowflake id from a path segment or body field
pub(crate) fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::Validation(format!("Invalid id: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_snowflakes() {
        assert_eq!(parse_id("123456789012345678").unwrap(), 123456789012345678);
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(parse_id("abc").is_err());
        assert!(parse_id("").is_err());
    }
}
