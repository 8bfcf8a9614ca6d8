//! Match Repository Implementation
//!
//! PostgreSQL implementation of the MatchRepository trait. The matches
//! table stores normalized pairs with a unique index, which makes the
//! concurrent mutual-swipe race resolve to a single row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Match, MatchRepository};
use crate::shared::error::AppError;
use crate::shared::snowflake::ordered_pair;

/// Database row representation matching the matches table schema.
#[derive(Debug, sqlx::FromRow)]
struct MatchRow {
    id: i64,
    student_a_id: i64,
    student_b_id: i64,
    created_at: DateTime<Utc>,
    closed_at: Option<DateTime<Utc>>,
}

impl MatchRow {
    fn into_match(self) -> Match {
        Match {
            id: self.id,
            student_a_id: self.student_a_id,
            student_b_id: self.student_b_id,
            created_at: self.created_at,
            closed_at: self.closed_at,
        }
    }
}

/// PostgreSQL match repository implementation.
#[derive(Clone)]
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Match>, AppError> {
        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT id, student_a_id, student_b_id, created_at, closed_at
            FROM matches
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_match()))
    }

    async fn find_by_pair(&self, first: i64, second: i64) -> Result<Option<Match>, AppError> {
        let (a, b) = ordered_pair(first, second);
        let row = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT id, student_a_id, student_b_id, created_at, closed_at
            FROM matches
            WHERE student_a_id = $1 AND student_b_id = $2
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_match()))
    }

    async fn find_open_for_student(&self, student_id: i64) -> Result<Vec<Match>, AppError> {
        let rows = sqlx::query_as::<_, MatchRow>(
            r#"
            SELECT id, student_a_id, student_b_id, created_at, closed_at
            FROM matches
            WHERE (student_a_id = $1 OR student_b_id = $1) AND closed_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_match()).collect())
    }

    /// Insert-or-fetch on the unique pair index. Two simultaneous mutual
    /// swipes both land here; the loser of the insert race gets the
    /// winner's row back.
    async fn create(&self, m: &Match) -> Result<Match, AppError> {
        let inserted = sqlx::query_as::<_, MatchRow>(
            r#"
            INSERT INTO matches (id, student_a_id, student_b_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_a_id, student_b_id) DO NOTHING
            RETURNING id, student_a_id, student_b_id, created_at, closed_at
            "#,
        )
        .bind(m.id)
        .bind(m.student_a_id)
        .bind(m.student_b_id)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = inserted {
            return Ok(row.into_match());
        }

        self.find_by_pair(m.student_a_id, m.student_b_id)
            .await?
            .ok_or_else(|| AppError::Internal("Match insert conflict with no row".to_string()))
    }

    async fn close(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE matches SET closed_at = NOW() WHERE id = $1 AND closed_at IS NULL")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn close_all_for_student(&self, student_id: i64) -> Result<Vec<i64>, AppError> {
        let ids: Vec<(i64,)> = sqlx::query_as(
            r#"
            UPDATE matches SET closed_at = NOW()
            WHERE (student_a_id = $1 OR student_b_id = $1) AND closed_at IS NULL
            RETURNING id
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }
}
