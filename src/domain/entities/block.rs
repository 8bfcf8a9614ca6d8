//! Block entity and repository trait.
//!
//! Maps to the `blocks` table, unique per (blocker_id, blocked_id).
//! A block in either direction hides both students from each other's
//! discovery feed; establishing one closes any open match between the pair.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    pub blocker_id: i64,
    pub blocked_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Block data access operations.
#[async_trait]
pub trait BlockRepository: Send + Sync {
    /// Whether a block exists in either direction between the two students.
    async fn exists_between(&self, first: i64, second: i64) -> Result<bool, AppError>;

    /// Students the blocker has blocked, newest first.
    async fn find_by_blocker(&self, blocker_id: i64) -> Result<Vec<Block>, AppError>;

    /// Record a block; duplicates are a conflict.
    async fn create(&self, block: &Block) -> Result<Block, AppError>;

    /// Remove the block from blocker to blocked.
    async fn delete(&self, blocker_id: i64, blocked_id: i64) -> Result<(), AppError>;
}
