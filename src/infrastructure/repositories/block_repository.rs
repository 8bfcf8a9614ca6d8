//! Block Repository Implementation
//!
//! PostgreSQL implementation of the BlockRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Block, BlockRepository};
use crate::shared::error::AppError;

/// Database row representation matching the blocks table schema.
#[derive(Debug, sqlx::FromRow)]
struct BlockRow {
    blocker_id: i64,
    blocked_id: i64,
    created_at: DateTime<Utc>,
}

impl BlockRow {
    fn into_block(self) -> Block {
        Block {
            blocker_id: self.blocker_id,
            blocked_id: self.blocked_id,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL block repository implementation.
#[derive(Clone)]
pub struct PgBlockRepository {
    pool: PgPool,
}

impl PgBlockRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BlockRepository for PgBlockRepository {
    async fn exists_between(&self, first: i64, second: i64) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM blocks
                WHERE (blocker_id = $1 AND blocked_id = $2)
                   OR (blocker_id = $2 AND blocked_id = $1)
            )
            "#,
        )
        .bind(first)
        .bind(second)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn find_by_blocker(&self, blocker_id: i64) -> Result<Vec<Block>, AppError> {
        let rows = sqlx::query_as::<_, BlockRow>(
            r#"
            SELECT blocker_id, blocked_id, created_at
            FROM blocks
            WHERE blocker_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(blocker_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_block()).collect())
    }

    async fn create(&self, block: &Block) -> Result<Block, AppError> {
        let row = sqlx::query_as::<_, BlockRow>(
            r#"
            INSERT INTO blocks (blocker_id, blocked_id)
            VALUES ($1, $2)
            RETURNING blocker_id, blocked_id, created_at
            "#,
        )
        .bind(block.blocker_id)
        .bind(block.blocked_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Student is already blocked".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_block())
    }

    async fn delete(&self, blocker_id: i64, blocked_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM blocks WHERE blocker_id = $1 AND blocked_id = $2")
            .bind(blocker_id)
            .bind(blocked_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
