//! Interest entity and repository trait.
//!
//! `interests` is a shared vocabulary table; `student_interests` is the N:N
//! join between students and interests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum interests a student may select.
pub const MAX_INTERESTS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interest {
    pub id: i64,
    pub name: String,
}

/// Repository trait for Interest data access operations.
#[async_trait]
pub trait InterestRepository: Send + Sync {
    /// List the full interest vocabulary.
    async fn find_all(&self) -> Result<Vec<Interest>, AppError>;

    /// Interests selected by a student, alphabetical.
    async fn find_by_student(&self, student_id: i64) -> Result<Vec<Interest>, AppError>;

    /// Replace a student's interest set. Unknown interest ids are an error.
    async fn replace_for_student(
        &self,
        student_id: i64,
        interest_ids: &[i64],
    ) -> Result<Vec<Interest>, AppError>;
}
