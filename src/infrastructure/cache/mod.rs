//! Cache Module
//!
//! Redis connection management and caching utilities.
//!
//! Provides the connection manager factory plus the presence and typing
//! caches backing the realtime hub. Both caches rely on key TTLs so
//! state disappears on its own when a client goes away uncleanly.

mod presence;
mod typing;

pub use presence::PresenceCacheService;
pub use typing::TypingCacheService;

use redis::aio::ConnectionManager;
use redis::Client;
use tracing::{info, instrument};

use crate::config::RedisSettings;

/// Creates a Redis connection manager with automatic reconnection.
#[instrument(skip(settings), fields(url = %settings.url))]
pub async fn create_redis_client(
    settings: &RedisSettings,
) -> Result<ConnectionManager, redis::RedisError> {
    info!("Connecting to Redis...");
    let client = Client::open(settings.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;
    info!("Redis connection established");
    Ok(manager)
}

/// Cache key prefixes for different data types.
pub mod keys {
    /// Student presence: `presence:{student_id}`
    pub const PRESENCE: &str = "presence:";

    /// Typing indicator: `typing:{match_id}:{student_id}`
    pub const TYPING: &str = "typing:";

    /// Rate limit window: `rate_limit:{bucket}:{key}`
    pub const RATE_LIMIT: &str = "rate_limit:";
}
