//! Swipe entity and repository trait.
//!
//! Maps to the `swipes` table. A swipe is one student's like/pass verdict on
//! another's profile; unique per (swiper_id, swipee_id).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Swipe direction matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Like,
    Pass,
}

impl SwipeDirection {
    /// Convert from database string representation.
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "like" => Self::Like,
            _ => Self::Pass,
        }
    }

    /// Convert to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Pass => "pass",
        }
    }
}

impl std::fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Swipe {
    pub id: i64,
    pub swiper_id: i64,
    pub swipee_id: i64,
    pub direction: SwipeDirection,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Swipe data access operations.
#[async_trait]
pub trait SwipeRepository: Send + Sync {
    /// The swiper's existing verdict on the swipee, if any.
    async fn find_between(
        &self,
        swiper_id: i64,
        swipee_id: i64,
    ) -> Result<Option<Swipe>, AppError>;

    /// Record a swipe. Duplicate (swiper, swipee) pairs are a conflict.
    async fn create(&self, swipe: &Swipe) -> Result<Swipe, AppError>;

    /// Whether the swipee has already liked the swiper (the mutual-like check).
    async fn has_liked(&self, swiper_id: i64, swipee_id: i64) -> Result<bool, AppError>;

    /// Delete `pass` swipes older than the cutoff so those profiles re-enter
    /// discovery. Returns the number of rows removed.
    async fn delete_passes_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_roundtrip() {
        assert_eq!(SwipeDirection::from_str("like"), SwipeDirection::Like);
        assert_eq!(SwipeDirection::from_str("LIKE"), SwipeDirection::Like);
        assert_eq!(SwipeDirection::from_str("pass"), SwipeDirection::Pass);
        // Unknown values degrade to pass, never to like
        assert_eq!(SwipeDirection::from_str("superlike"), SwipeDirection::Pass);
    }

    #[test]
    fn test_direction_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SwipeDirection::Like).unwrap(),
            "\"like\""
        );
    }
}
