//! Discovery Service
//!
//! Builds the swipe feed: candidates that pass the requesting student's
//! settings and whose own preferences accept the requester back.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    DiscoveryFilter, Photo, PhotoRepository, SettingsRepository, Student, StudentRepository,
};

/// Discovery service trait
#[async_trait]
pub trait DiscoveryService: Send + Sync {
    /// Candidate feed for a student. Empty when the student has discovery
    /// disabled.
    async fn feed(&self, student_id: i64, limit: i64) -> Result<Vec<CandidateDto>, DiscoveryError>;
}

/// A feed entry: candidate plus their photos for card rendering
#[derive(Debug, Clone)]
pub struct CandidateDto {
    pub student: Student,
    pub photos: Vec<Photo>,
}

/// Discovery service errors
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Student not found")]
    NotFound,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::shared::error::AppError> for DiscoveryError {
    fn from(e: crate::shared::error::AppError) -> Self {
        DiscoveryError::Internal(e.to_string())
    }
}

/// DiscoveryService implementation
pub struct DiscoveryServiceImpl<St, Ph, Cf>
where
    St: StudentRepository,
    Ph: PhotoRepository,
    Cf: SettingsRepository,
{
    student_repo: Arc<St>,
    photo_repo: Arc<Ph>,
    settings_repo: Arc<Cf>,
    max_feed_size: i64,
}

impl<St, Ph, Cf> DiscoveryServiceImpl<St, Ph, Cf>
where
    St: StudentRepository,
    Ph: PhotoRepository,
    Cf: SettingsRepository,
{
    pub fn new(
        student_repo: Arc<St>,
        photo_repo: Arc<Ph>,
        settings_repo: Arc<Cf>,
        max_feed_size: i64,
    ) -> Self {
        Self {
            student_repo,
            photo_repo,
            settings_repo,
            max_feed_size,
        }
    }
}

#[async_trait]
impl<St, Ph, Cf> DiscoveryService for DiscoveryServiceImpl<St, Ph, Cf>
where
    St: StudentRepository + 'static,
    Ph: PhotoRepository + 'static,
    Cf: SettingsRepository + 'static,
{
    async fn feed(&self, student_id: i64, limit: i64) -> Result<Vec<CandidateDto>, DiscoveryError> {
        let student = self
            .student_repo
            .find_by_id(student_id)
            .await?
            .ok_or(DiscoveryError::NotFound)?;

        let settings = self
            .settings_repo
            .find_by_student(student_id)
            .await?
            .ok_or(DiscoveryError::NotFound)?;

        // A hidden student sees nobody and is seen by nobody
        if !settings.discovery_enabled {
            return Ok(Vec::new());
        }

        let filter = DiscoveryFilter {
            student_id,
            seeking: settings.show_me,
            gender: student.gender,
            min_age: settings.min_age,
            max_age: settings.max_age,
            limit: limit.clamp(1, self.max_feed_size),
        };

        let candidates = self.student_repo.find_discovery_candidates(&filter).await?;

        let mut feed = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let photos = self.photo_repo.find_by_student(candidate.id).await?;
            feed.push(CandidateDto {
                student: candidate,
                photos,
            });
        }

        self.student_repo.touch_last_active(student_id).await?;

        Ok(feed)
    }
}
