//! Match Service
//!
//! Match listing with conversation previews, and unmatching.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{
    Match, MatchRepository, Message, MessageRepository, Photo, PhotoRepository, Student,
    StudentRepository,
};

/// Match service trait
#[async_trait]
pub trait MatchService: Send + Sync {
    /// Open matches for a student with the other participant's preview,
    /// newest match first.
    async fn list_matches(&self, student_id: i64) -> Result<Vec<MatchPreviewDto>, MatchError>;

    /// A single match; participants only.
    async fn get_match(&self, match_id: i64, student_id: i64) -> Result<Match, MatchError>;

    /// Close the match. Idempotent for an already-closed match.
    /// Returns the other participant's id so the caller can notify them.
    async fn unmatch(&self, match_id: i64, student_id: i64) -> Result<i64, MatchError>;
}

/// A match list entry
#[derive(Debug, Clone)]
pub struct MatchPreviewDto {
    pub match_record: Match,
    pub other: Student,
    pub other_primary_photo: Option<Photo>,
    pub last_message: Option<Message>,
    pub unread_count: i64,
}

/// Match service errors
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    #[error("Match not found")]
    NotFound,

    #[error("Not a participant of this match")]
    Forbidden,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::shared::error::AppError> for MatchError {
    fn from(e: crate::shared::error::AppError) -> Self {
        MatchError::Internal(e.to_string())
    }
}

/// MatchService implementation
pub struct MatchServiceImpl<Ma, St, Ph, Me>
where
    Ma: MatchRepository,
    St: StudentRepository,
    Ph: PhotoRepository,
    Me: MessageRepository,
{
    match_repo: Arc<Ma>,
    student_repo: Arc<St>,
    photo_repo: Arc<Ph>,
    message_repo: Arc<Me>,
}

impl<Ma, St, Ph, Me> MatchServiceImpl<Ma, St, Ph, Me>
where
    Ma: MatchRepository,
    St: StudentRepository,
    Ph: PhotoRepository,
    Me: MessageRepository,
{
    pub fn new(
        match_repo: Arc<Ma>,
        student_repo: Arc<St>,
        photo_repo: Arc<Ph>,
        message_repo: Arc<Me>,
    ) -> Self {
        Self {
            match_repo,
            student_repo,
            photo_repo,
            message_repo,
        }
    }

    async fn participant_match(&self, match_id: i64, student_id: i64) -> Result<Match, MatchError> {
        let m = self
            .match_repo
            .find_by_id(match_id)
            .await?
            .ok_or(MatchError::NotFound)?;

        if !m.involves(student_id) {
            return Err(MatchError::Forbidden);
        }

        Ok(m)
    }
}

#[async_trait]
impl<Ma, St, Ph, Me> MatchService for MatchServiceImpl<Ma, St, Ph, Me>
where
    Ma: MatchRepository + 'static,
    St: StudentRepository + 'static,
    Ph: PhotoRepository + 'static,
    Me: MessageRepository + 'static,
{
    async fn list_matches(&self, student_id: i64) -> Result<Vec<MatchPreviewDto>, MatchError> {
        let matches = self.match_repo.find_open_for_student(student_id).await?;

        let mut previews = Vec::with_capacity(matches.len());
        for m in matches {
            let other_id = match m.other_of(student_id) {
                Some(id) => id,
                None => continue,
            };

            // Skip previews whose counterpart row disappeared
            let other = match self.student_repo.find_by_id(other_id).await? {
                Some(s) => s,
                None => continue,
            };

            let other_primary_photo = self
                .photo_repo
                .find_by_student(other_id)
                .await?
                .into_iter()
                .find(|p| p.is_primary);

            let last_message = self.message_repo.find_latest(m.id).await?;
            let unread_count = self.message_repo.count_unread(m.id, student_id).await?;

            previews.push(MatchPreviewDto {
                match_record: m,
                other,
                other_primary_photo,
                last_message,
                unread_count,
            });
        }

        Ok(previews)
    }

    async fn get_match(&self, match_id: i64, student_id: i64) -> Result<Match, MatchError> {
        self.participant_match(match_id, student_id).await
    }

    async fn unmatch(&self, match_id: i64, student_id: i64) -> Result<i64, MatchError> {
        let m = self.participant_match(match_id, student_id).await?;

        self.match_repo.close(m.id).await?;

        tracing::info!(match_id = m.id, by = student_id, "Match closed");

        // other_of cannot fail here: participant_match verified membership
        Ok(m.other_of(student_id).unwrap_or_default())
    }
}
