//! Session Repository Implementation
//!
//! PostgreSQL implementation of the SessionRepository trait.
//! Handles refresh-token sessions; tokens are stored only as hashes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Session, SessionRepository};
use crate::shared::error::AppError;

/// Database row representation matching the sessions table schema.
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    student_id: i64,
    refresh_token_hash: String,
    device_info: Option<String>,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
    last_used_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            student_id: self.student_id,
            refresh_token_hash: self.refresh_token_hash,
            device_info: self.device_info,
            expires_at: self.expires_at,
            created_at: self.created_at,
            last_used_at: self.last_used_at,
            revoked_at: self.revoked_at,
        }
    }
}

const SESSION_COLUMNS: &str = "id, student_id, refresh_token_hash, device_info, expires_at, \
     created_at, last_used_at, revoked_at";

/// PostgreSQL session repository implementation.
#[derive(Clone)]
pub struct PgSessionRepository {
    pool: PgPool,
}

impl PgSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn find_by_token_hash(&self, token_hash: &str) -> Result<Option<Session>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE refresh_token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            INSERT INTO sessions (id, student_id, refresh_token_hash, device_info, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(session.id)
        .bind(session.student_id)
        .bind(&session.refresh_token_hash)
        .bind(&session.device_info)
        .bind(session.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_session())
    }

    async fn update_token_hash(
        &self,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE sessions
            SET refresh_token_hash = $2, expires_at = $3, last_used_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revoke(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn revoke_all_for_student(&self, student_id: i64) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = NOW() WHERE student_id = $1 AND revoked_at IS NULL",
        )
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM sessions WHERE expires_at < NOW() OR revoked_at IS NOT NULL")
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_sessions_table_keys_by_uuid() {
        // Session ids are Uuid v4 in the entity; the DDL must agree or every
        // insert fails at bind time.
        let ddl = include_str!("../../../migrations/20240901000004_create_sessions.sql");
        assert!(ddl.contains("id UUID PRIMARY KEY"));
    }
}
