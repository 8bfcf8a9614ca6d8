//! Photo entity and repository trait.
//!
//! Maps to the `photos` table. A student carries at most [`MAX_PHOTOS`]
//! photos and, whenever any exist, exactly one is primary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum number of photos on a profile.
pub const MAX_PHOTOS: usize = 6;

/// A profile photo. Photos are URL records; storage/upload lives elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub student_id: i64,
    pub url: String,
    /// Display order, 0-based
    pub position: i32,
    pub is_primary: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Photo data access operations.
#[async_trait]
pub trait PhotoRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Photo>, AppError>;

    /// All photos for a student, ordered by position.
    async fn find_by_student(&self, student_id: i64) -> Result<Vec<Photo>, AppError>;

    async fn count_by_student(&self, student_id: i64) -> Result<i64, AppError>;

    async fn create(&self, photo: &Photo) -> Result<Photo, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;

    /// Mark the given photo primary and clear the flag on the student's others.
    async fn set_primary(&self, student_id: i64, photo_id: i64) -> Result<(), AppError>;
}
