//! Message Service
//!
//! Sending and reading chat messages within a match.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{Match, MatchRepository, Message, MessageRepository, MAX_MESSAGE_LENGTH};
use crate::shared::SnowflakeGenerator;

/// Message service trait
#[async_trait]
pub trait MessageService: Send + Sync {
    /// Persist a message from `sender_id` into `match_id`.
    async fn send_message(
        &self,
        match_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<Message, MessageError>;

    /// Messages in a match, newest first, keyset-paginated on message id.
    async fn list_messages(
        &self,
        match_id: i64,
        student_id: i64,
        before: Option<i64>,
        limit: i32,
    ) -> Result<Vec<Message>, MessageError>;

    /// Mark all messages addressed to `reader_id` as read.
    /// Returns the number of rows updated.
    async fn mark_read(&self, match_id: i64, reader_id: i64) -> Result<u64, MessageError>;
}

/// Message service errors
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    #[error("Match not found")]
    MatchNotFound,

    #[error("Not a participant of this match")]
    Forbidden,

    #[error("Match is closed")]
    MatchClosed,

    #[error("Message must not be empty")]
    EmptyMessage,

    #[error("Message exceeds {MAX_MESSAGE_LENGTH} characters")]
    MessageTooLong,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::shared::error::AppError> for MessageError {
    fn from(e: crate::shared::error::AppError) -> Self {
        MessageError::Internal(e.to_string())
    }
}

/// MessageService implementation
pub struct MessageServiceImpl<Me, Ma>
where
    Me: MessageRepository,
    Ma: MatchRepository,
{
    message_repo: Arc<Me>,
    match_repo: Arc<Ma>,
    snowflake: Arc<SnowflakeGenerator>,
}

impl<Me, Ma> MessageServiceImpl<Me, Ma>
where
    Me: MessageRepository,
    Ma: MatchRepository,
{
    pub fn new(message_repo: Arc<Me>, match_repo: Arc<Ma>, snowflake: Arc<SnowflakeGenerator>) -> Self {
        Self {
            message_repo,
            match_repo,
            snowflake,
        }
    }

    async fn participant_match(
        &self,
        match_id: i64,
        student_id: i64,
    ) -> Result<Match, MessageError> {
        let m = self
            .match_repo
            .find_by_id(match_id)
            .await?
            .ok_or(MessageError::MatchNotFound)?;

        if !m.involves(student_id) {
            return Err(MessageError::Forbidden);
        }

        Ok(m)
    }
}

#[async_trait]
impl<Me, Ma> MessageService for MessageServiceImpl<Me, Ma>
where
    Me: MessageRepository + 'static,
    Ma: MatchRepository + 'static,
{
    async fn send_message(
        &self,
        match_id: i64,
        sender_id: i64,
        content: &str,
    ) -> Result<Message, MessageError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(MessageError::EmptyMessage);
        }
        if content.chars().count() > MAX_MESSAGE_LENGTH {
            return Err(MessageError::MessageTooLong);
        }

        let m = self.participant_match(match_id, sender_id).await?;
        if !m.is_open() {
            return Err(MessageError::MatchClosed);
        }

        let message = Message {
            id: self.snowflake.generate(),
            match_id: m.id,
            sender_id,
            content: content.to_string(),
            read_at: None,
            created_at: Utc::now(),
        };

        let saved = self.message_repo.create(&message).await?;

        tracing::debug!(
            message_id = saved.id,
            match_id = m.id,
            sender_id,
            "Message stored"
        );

        Ok(saved)
    }

    async fn list_messages(
        &self,
        match_id: i64,
        student_id: i64,
        before: Option<i64>,
        limit: i32,
    ) -> Result<Vec<Message>, MessageError> {
        self.participant_match(match_id, student_id).await?;

        let limit = limit.clamp(1, 100);
        Ok(self.message_repo.find_by_match(match_id, before, limit).await?)
    }

    async fn mark_read(&self, match_id: i64, reader_id: i64) -> Result<u64, MessageError> {
        self.participant_match(match_id, reader_id).await?;
        Ok(self.message_repo.mark_read(match_id, reader_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::error::AppError;
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        MessageRepo {}

        #[async_trait]
        impl MessageRepository for MessageRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError>;
            async fn find_by_match(
                &self,
                match_id: i64,
                before: Option<i64>,
                limit: i32,
            ) -> Result<Vec<Message>, AppError>;
            async fn find_latest(&self, match_id: i64) -> Result<Option<Message>, AppError>;
            async fn create(&self, message: &Message) -> Result<Message, AppError>;
            async fn mark_read(&self, match_id: i64, reader_id: i64) -> Result<u64, AppError>;
            async fn count_unread(&self, match_id: i64, reader_id: i64) -> Result<i64, AppError>;
        }
    }

    mock! {
        MatchRepo {}

        #[async_trait]
        impl MatchRepository for MatchRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Match>, AppError>;
            async fn find_by_pair(&self, a: i64, b: i64) -> Result<Option<Match>, AppError>;
            async fn find_open_for_student(&self, student_id: i64) -> Result<Vec<Match>, AppError>;
            async fn create(&self, record: &Match) -> Result<Match, AppError>;
            async fn close(&self, id: i64) -> Result<(), AppError>;
            async fn close_all_for_student(&self, student_id: i64) -> Result<Vec<i64>, AppError>;
        }
    }

    fn open_match(id: i64, a: i64, b: i64) -> Match {
        Match {
            id,
            student_a_id: a.min(b),
            student_b_id: a.max(b),
            created_at: Utc::now(),
            closed_at: None,
        }
    }

    fn service(
        message_repo: MockMessageRepo,
        match_repo: MockMatchRepo,
    ) -> MessageServiceImpl<MockMessageRepo, MockMatchRepo> {
        MessageServiceImpl::new(
            Arc::new(message_repo),
            Arc::new(match_repo),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    #[tokio::test]
    async fn empty_message_rejected() {
        let svc = service(MockMessageRepo::new(), MockMatchRepo::new());
        let err = svc.send_message(1, 10, "   ").await.unwrap_err();
        assert!(matches!(err, MessageError::EmptyMessage));
    }

    #[tokio::test]
    async fn overlong_message_rejected() {
        let svc = service(MockMessageRepo::new(), MockMatchRepo::new());
        let long = "a".repeat(MAX_MESSAGE_LENGTH + 1);
        let err = svc.send_message(1, 10, &long).await.unwrap_err();
        assert!(matches!(err, MessageError::MessageTooLong));
    }

    #[tokio::test]
    async fn non_participant_cannot_send() {
        let mut match_repo = MockMatchRepo::new();
        match_repo
            .expect_find_by_id()
            .with(eq(1))
            .returning(|_| Ok(Some(open_match(1, 10, 20))));

        let svc = service(MockMessageRepo::new(), match_repo);
        let err = svc.send_message(1, 99, "hi").await.unwrap_err();
        assert!(matches!(err, MessageError::Forbidden));
    }

    #[tokio::test]
    async fn closed_match_rejects_messages() {
        let mut match_repo = MockMatchRepo::new();
        match_repo.expect_find_by_id().returning(|_| {
            let mut m = open_match(1, 10, 20);
            m.closed_at = Some(Utc::now());
            Ok(Some(m))
        });

        let svc = service(MockMessageRepo::new(), match_repo);
        let err = svc.send_message(1, 10, "hi").await.unwrap_err();
        assert!(matches!(err, MessageError::MatchClosed));
    }

    #[tokio::test]
    async fn send_trims_and_stores() {
        let mut match_repo = MockMatchRepo::new();
        match_repo
            .expect_find_by_id()
            .returning(|_| Ok(Some(open_match(1, 10, 20))));

        let mut message_repo = MockMessageRepo::new();
        message_repo
            .expect_create()
            .withf(|m| m.content == "hello" && m.sender_id == 10)
            .returning(|m| Ok(m.clone()));

        let svc = service(message_repo, match_repo);
        let saved = svc.send_message(1, 10, "  hello  ").await.unwrap();
        assert_eq!(saved.content, "hello");
        assert!(saved.read_at.is_none());
    }
}
