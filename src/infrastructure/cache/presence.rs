//! Presence Cache
//!
//! Redis-backed online presence for hub connections. A key with a TTL is
//! refreshed on every heartbeat, so presence expires by itself if a
//! connection dies without a clean disconnect.

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::keys;
use crate::shared::error::AppError;

/// Online presence cache service
#[derive(Clone)]
pub struct PresenceCacheService {
    redis: ConnectionManager,
    presence_ttl: u64,
}

impl PresenceCacheService {
    pub fn new(redis: ConnectionManager, presence_ttl: u64) -> Self {
        Self {
            redis,
            presence_ttl,
        }
    }

    /// Mark a student online, refreshing the TTL.
    pub async fn mark_online(&self, student_id: i64) -> Result<(), AppError> {
        let key = format!("{}{}", keys::PRESENCE, student_id);
        let timestamp = chrono::Utc::now().timestamp();

        let mut conn = self.redis.clone();
        conn.set_ex::<_, _, ()>(&key, timestamp, self.presence_ttl)
            .await?;

        Ok(())
    }

    /// Drop presence immediately on a clean disconnect.
    pub async fn mark_offline(&self, student_id: i64) -> Result<(), AppError> {
        let key = format!("{}{}", keys::PRESENCE, student_id);

        let mut conn = self.redis.clone();
        conn.del::<_, ()>(&key).await?;

        Ok(())
    }

    pub async fn is_online(&self, student_id: i64) -> Result<bool, AppError> {
        let key = format!("{}{}", keys::PRESENCE, student_id);

        let mut conn = self.redis.clone();
        let exists: bool = conn.exists(&key).await?;

        Ok(exists)
    }
}
