//! Message entity and repository trait.
//!
//! Maps to the `messages` table. A message belongs to exactly one match and
//! its sender is always one of the match participants.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum message content length.
pub const MAX_MESSAGE_LENGTH: usize = 2000;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Snowflake ID; also the keyset-pagination cursor
    pub id: i64,
    pub match_id: i64,
    pub sender_id: i64,
    pub content: String,
    /// Set when the recipient marks the conversation read
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// Repository trait for Message data access operations.
#[async_trait]
pub trait MessageRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError>;

    /// Messages in a match with cursor-based pagination, newest first.
    /// `before` restricts to messages with a smaller id.
    async fn find_by_match(
        &self,
        match_id: i64,
        before: Option<i64>,
        limit: i32,
    ) -> Result<Vec<Message>, AppError>;

    /// Most recent message of a match, for conversation previews.
    async fn find_latest(&self, match_id: i64) -> Result<Option<Message>, AppError>;

    async fn create(&self, message: &Message) -> Result<Message, AppError>;

    /// Mark every unread message in the match NOT sent by `reader_id` as
    /// read. Returns the number of messages affected.
    async fn mark_read(&self, match_id: i64, reader_id: i64) -> Result<u64, AppError>;

    /// Unread incoming count for badge display.
    async fn count_unread(&self, match_id: i64, reader_id: i64) -> Result<i64, AppError>;
}
