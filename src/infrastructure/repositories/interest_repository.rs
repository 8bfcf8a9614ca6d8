//! Interest Repository Implementation
//!
//! PostgreSQL implementation of the InterestRepository trait. The interest
//! vocabulary is seeded by migration; students pick from it via a join table.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{Interest, InterestRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct InterestRow {
    id: i64,
    name: String,
}

impl InterestRow {
    fn into_interest(self) -> Interest {
        Interest {
            id: self.id,
            name: self.name,
        }
    }
}

/// PostgreSQL interest repository implementation.
#[derive(Clone)]
pub struct PgInterestRepository {
    pool: PgPool,
}

impl PgInterestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InterestRepository for PgInterestRepository {
    async fn find_all(&self) -> Result<Vec<Interest>, AppError> {
        let rows = sqlx::query_as::<_, InterestRow>(
            "SELECT id, name FROM interests ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_interest()).collect())
    }

    async fn find_by_student(&self, student_id: i64) -> Result<Vec<Interest>, AppError> {
        let rows = sqlx::query_as::<_, InterestRow>(
            r#"
            SELECT i.id, i.name
            FROM interests i
            JOIN student_interests si ON si.interest_id = i.id
            WHERE si.student_id = $1
            ORDER BY i.name ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_interest()).collect())
    }

    async fn replace_for_student(
        &self,
        student_id: i64,
        interest_ids: &[i64],
    ) -> Result<Vec<Interest>, AppError> {
        let mut tx = self.pool.begin().await?;

        let known: Vec<(i64,)> =
            sqlx::query_as("SELECT id FROM interests WHERE id = ANY($1)")
                .bind(interest_ids)
                .fetch_all(&mut *tx)
                .await?;
        if known.len() != interest_ids.len() {
            return Err(AppError::Validation("Unknown interest id".to_string()));
        }

        sqlx::query("DELETE FROM student_interests WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *tx)
            .await?;

        for interest_id in interest_ids {
            sqlx::query(
                "INSERT INTO student_interests (student_id, interest_id) VALUES ($1, $2)",
            )
            .bind(student_id)
            .bind(interest_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_by_student(student_id).await
    }
}
