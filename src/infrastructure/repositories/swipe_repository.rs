//! Swipe Repository Implementation
//!
//! PostgreSQL implementation of the SwipeRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Swipe, SwipeDirection, SwipeRepository};
use crate::shared::error::AppError;

/// Database row representation matching the swipes table schema.
#[derive(Debug, sqlx::FromRow)]
struct SwipeRow {
    id: i64,
    swiper_id: i64,
    swipee_id: i64,
    direction: String,
    created_at: DateTime<Utc>,
}

impl SwipeRow {
    fn into_swipe(self) -> Swipe {
        Swipe {
            id: self.id,
            swiper_id: self.swiper_id,
            swipee_id: self.swipee_id,
            direction: SwipeDirection::from_str(&self.direction),
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL swipe repository implementation.
#[derive(Clone)]
pub struct PgSwipeRepository {
    pool: PgPool,
}

impl PgSwipeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SwipeRepository for PgSwipeRepository {
    async fn find_between(
        &self,
        swiper_id: i64,
        swipee_id: i64,
    ) -> Result<Option<Swipe>, AppError> {
        let row = sqlx::query_as::<_, SwipeRow>(
            r#"
            SELECT id, swiper_id, swipee_id, direction, created_at
            FROM swipes
            WHERE swiper_id = $1 AND swipee_id = $2
            "#,
        )
        .bind(swiper_id)
        .bind(swipee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_swipe()))
    }

    async fn create(&self, swipe: &Swipe) -> Result<Swipe, AppError> {
        let row = sqlx::query_as::<_, SwipeRow>(
            r#"
            INSERT INTO swipes (id, swiper_id, swipee_id, direction)
            VALUES ($1, $2, $3, $4)
            RETURNING id, swiper_id, swipee_id, direction, created_at
            "#,
        )
        .bind(swipe.id)
        .bind(swipe.swiper_id)
        .bind(swipe.swipee_id)
        .bind(swipe.direction.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Already swiped on this student".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(row.into_swipe())
    }

    async fn has_liked(&self, swiper_id: i64, swipee_id: i64) -> Result<bool, AppError> {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM swipes
                WHERE swiper_id = $1 AND swipee_id = $2 AND direction = 'like'
            )
            "#,
        )
        .bind(swiper_id)
        .bind(swipee_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists.0)
    }

    async fn delete_passes_before(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM swipes WHERE direction = 'pass' AND created_at < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected())
    }
}
