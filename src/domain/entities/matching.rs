//! Match entity and repository trait.
//!
//! Maps to the `matches` table. A match exists only after a mutual like and
//! stores its participant pair normalized (student_a_id < student_b_id) so a
//! unique index on the pair makes concurrent creation idempotent.
//!
//! Matches are closed, never deleted: unmatching, blocking, and banning set
//! `closed_at`, and the message history stays attached for moderation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;
use crate::shared::snowflake::ordered_pair;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: i64,
    /// Smaller student id of the pair
    pub student_a_id: i64,
    /// Larger student id of the pair
    pub student_b_id: i64,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl Match {
    /// Whether the given student participates in this match.
    pub fn involves(&self, student_id: i64) -> bool {
        self.student_a_id == student_id || self.student_b_id == student_id
    }

    /// The other participant's id, or None if `student_id` is not a party.
    pub fn other_of(&self, student_id: i64) -> Option<i64> {
        if self.student_a_id == student_id {
            Some(self.student_b_id)
        } else if self.student_b_id == student_id {
            Some(self.student_a_id)
        } else {
            None
        }
    }

    pub fn is_open(&self) -> bool {
        self.closed_at.is_none()
    }

    /// Build a new open match with the pair normalized.
    pub fn new(id: i64, first: i64, second: i64) -> Self {
        let (a, b) = ordered_pair(first, second);
        Self {
            id,
            student_a_id: a,
            student_b_id: b,
            created_at: Utc::now(),
            closed_at: None,
        }
    }
}

/// Repository trait for Match data access operations.
#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Match>, AppError>;

    /// The match (open or closed) between two students, if any.
    async fn find_by_pair(&self, first: i64, second: i64) -> Result<Option<Match>, AppError>;

    /// Open matches for a student, newest first.
    async fn find_open_for_student(&self, student_id: i64) -> Result<Vec<Match>, AppError>;

    /// Insert the match; on a pair conflict returns the existing row instead.
    /// This makes the concurrent mutual-swipe race idempotent.
    async fn create(&self, m: &Match) -> Result<Match, AppError>;

    /// Close the match (idempotent).
    async fn close(&self, id: i64) -> Result<(), AppError>;

    /// Close every open match involving the student (used on ban).
    /// Returns the ids of the matches that were closed.
    async fn close_all_for_student(&self, student_id: i64) -> Result<Vec<i64>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_normalizes_pair() {
        let m = Match::new(1, 42, 7);
        assert_eq!(m.student_a_id, 7);
        assert_eq!(m.student_b_id, 42);
        assert!(m.is_open());
    }

    #[test]
    fn test_involves_and_other_of() {
        let m = Match::new(1, 7, 42);
        assert!(m.involves(7));
        assert!(m.involves(42));
        assert!(!m.involves(8));
        assert_eq!(m.other_of(7), Some(42));
        assert_eq!(m.other_of(42), Some(7));
        assert_eq!(m.other_of(8), None);
    }
}
