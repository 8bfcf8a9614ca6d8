//! Photo Repository Implementation
//!
//! PostgreSQL implementation of the PhotoRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Photo, PhotoRepository};
use crate::shared::error::AppError;

/// Database row representation matching the photos table schema.
#[derive(Debug, sqlx::FromRow)]
struct PhotoRow {
    id: i64,
    student_id: i64,
    url: String,
    position: i32,
    is_primary: bool,
    created_at: DateTime<Utc>,
}

impl PhotoRow {
    fn into_photo(self) -> Photo {
        Photo {
            id: self.id,
            student_id: self.student_id,
            url: self.url,
            position: self.position,
            is_primary: self.is_primary,
            created_at: self.created_at,
        }
    }
}

/// PostgreSQL photo repository implementation.
#[derive(Clone)]
pub struct PgPhotoRepository {
    pool: PgPool,
}

impl PgPhotoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PhotoRepository for PgPhotoRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Photo>, AppError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, student_id, url, position, is_primary, created_at
            FROM photos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_photo()))
    }

    async fn find_by_student(&self, student_id: i64) -> Result<Vec<Photo>, AppError> {
        let rows = sqlx::query_as::<_, PhotoRow>(
            r#"
            SELECT id, student_id, url, position, is_primary, created_at
            FROM photos
            WHERE student_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_photo()).collect())
    }

    async fn count_by_student(&self, student_id: i64) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM photos WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    async fn create(&self, photo: &Photo) -> Result<Photo, AppError> {
        let row = sqlx::query_as::<_, PhotoRow>(
            r#"
            INSERT INTO photos (id, student_id, url, position, is_primary)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, student_id, url, position, is_primary, created_at
            "#,
        )
        .bind(photo.id)
        .bind(photo.student_id)
        .bind(&photo.url)
        .bind(photo.position)
        .bind(photo.is_primary)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_photo())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM photos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Flips the primary flag atomically within the student's photo set.
    async fn set_primary(&self, student_id: i64, photo_id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE photos SET is_primary = FALSE WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE photos SET is_primary = TRUE WHERE id = $1 AND student_id = $2")
            .bind(photo_id)
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
