//! Message Repository Implementation
//!
//! PostgreSQL implementation of the MessageRepository trait with
//! keyset pagination over snowflake message ids.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Message, MessageRepository};
use crate::shared::error::AppError;

/// Database row representation matching the messages table schema.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: i64,
    match_id: i64,
    sender_id: i64,
    content: String,
    read_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl MessageRow {
    fn into_message(self) -> Message {
        Message {
            id: self.id,
            match_id: self.match_id,
            sender_id: self.sender_id,
            content: self.content,
            read_at: self.read_at,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL message repository implementation.
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, match_id, sender_id, content, read_at, created_at
            FROM messages
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    async fn find_by_match(
        &self,
        match_id: i64,
        before: Option<i64>,
        limit: i32,
    ) -> Result<Vec<Message>, AppError> {
        // Snowflake ids are time-ordered, so id < cursor is the time cursor
        let rows = match before {
            Some(cursor) => {
                sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, match_id, sender_id, content, read_at, created_at
                    FROM messages
                    WHERE match_id = $1 AND id < $2
                    ORDER BY id DESC
                    LIMIT $3
                    "#,
                )
                .bind(match_id)
                .bind(cursor)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MessageRow>(
                    r#"
                    SELECT id, match_id, sender_id, content, read_at, created_at
                    FROM messages
                    WHERE match_id = $1
                    ORDER BY id DESC
                    LIMIT $2
                    "#,
                )
                .bind(match_id)
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_message()).collect())
    }

    async fn find_latest(&self, match_id: i64) -> Result<Option<Message>, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            SELECT id, match_id, sender_id, content, read_at, created_at
            FROM messages
            WHERE match_id = $1
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_message()))
    }

    async fn create(&self, message: &Message) -> Result<Message, AppError> {
        let row = sqlx::query_as::<_, MessageRow>(
            r#"
            INSERT INTO messages (id, match_id, sender_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, match_id, sender_id, content, read_at, created_at
            "#,
        )
        .bind(message.id)
        .bind(message.match_id)
        .bind(message.sender_id)
        .bind(&message.content)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_message())
    }

    async fn mark_read(&self, match_id: i64, reader_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET read_at = NOW()
            WHERE match_id = $1 AND sender_id != $2 AND read_at IS NULL
            "#,
        )
        .bind(match_id)
        .bind(reader_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn count_unread(&self, match_id: i64, reader_id: i64) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE match_id = $1 AND sender_id != $2 AND read_at IS NULL
            "#,
        )
        .bind(match_id)
        .bind(reader_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count.0)
    }
}
