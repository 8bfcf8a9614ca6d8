//! Typing Indicator Cache
//!
//! Redis-based caching for typing indicators within a match conversation.
//! Entries expire on their own; stop-typing frames just delete early.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::keys;
use crate::shared::error::AppError;

/// Typing indicator cache service
#[derive(Clone)]
pub struct TypingCacheService {
    redis: ConnectionManager,
    typing_ttl: u64,
}

impl TypingCacheService {
    pub fn new(redis: ConnectionManager, typing_ttl: u64) -> Self {
        Self { redis, typing_ttl }
    }

    /// Mark a student as typing in a match conversation.
    pub async fn set_typing(&self, match_id: i64, student_id: i64) -> Result<(), AppError> {
        let key = format!("{}{}:{}", keys::TYPING, match_id, student_id);
        let timestamp = chrono::Utc::now().timestamp();

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, timestamp, self.typing_ttl)
            .await?;

        Ok(())
    }

    /// Clear the typing flag before its TTL runs out.
    pub async fn clear_typing(&self, match_id: i64, student_id: i64) -> Result<(), AppError> {
        let key = format!("{}{}:{}", keys::TYPING, match_id, student_id);

        let mut conn = self.redis.clone();
        conn.del::<_, ()>(&key).await?;

        Ok(())
    }

    pub async fn is_typing(&self, match_id: i64, student_id: i64) -> Result<bool, AppError> {
        let key = format!("{}{}:{}", keys::TYPING, match_id, student_id);

        let mut conn = self.redis.clone();
        let exists: bool = conn.exists(&key).await?;

        Ok(exists)
    }
}
