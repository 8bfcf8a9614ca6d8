//! Prompt Repository Implementation
//!
//! PostgreSQL implementation of the PromptRepository trait. The prompt
//! catalogue is seeded by migration; answers are unique per student/prompt.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Prompt, PromptAnswer, PromptRepository};
use crate::shared::error::AppError;

#[derive(Debug, sqlx::FromRow)]
struct PromptRow {
    id: i64,
    question: String,
}

impl PromptRow {
    fn into_prompt(self) -> Prompt {
        Prompt {
            id: self.id,
            question: self.question,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AnswerRow {
    student_id: i64,
    prompt_id: i64,
    answer: String,
    updated_at: DateTime<Utc>,
    question: String,
}

/// PostgreSQL prompt repository implementation.
#[derive(Clone)]
pub struct PgPromptRepository {
    pool: PgPool,
}

impl PgPromptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PromptRepository for PgPromptRepository {
    async fn find_all(&self) -> Result<Vec<Prompt>, AppError> {
        let rows = sqlx::query_as::<_, PromptRow>(
            "SELECT id, question FROM prompts ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_prompt()).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Prompt>, AppError> {
        let row = sqlx::query_as::<_, PromptRow>(
            "SELECT id, question FROM prompts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_prompt()))
    }

    async fn find_answers(
        &self,
        student_id: i64,
    ) -> Result<Vec<(Prompt, PromptAnswer)>, AppError> {
        let rows = sqlx::query_as::<_, AnswerRow>(
            r#"
            SELECT pa.student_id, pa.prompt_id, pa.answer, pa.updated_at, p.question
            FROM prompt_answers pa
            JOIN prompts p ON p.id = pa.prompt_id
            WHERE pa.student_id = $1
            ORDER BY pa.prompt_id ASC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| {
                (
                    Prompt {
                        id: r.prompt_id,
                        question: r.question,
                    },
                    PromptAnswer {
                        student_id: r.student_id,
                        prompt_id: r.prompt_id,
                        answer: r.answer,
                        updated_at: r.updated_at,
                    },
                )
            })
            .collect())
    }

    async fn upsert_answer(&self, answer: &PromptAnswer) -> Result<PromptAnswer, AppError> {
        #[derive(sqlx::FromRow)]
        struct Row {
            student_id: i64,
            prompt_id: i64,
            answer: String,
            updated_at: DateTime<Utc>,
        }

        let row = sqlx::query_as::<_, Row>(
            r#"
            INSERT INTO prompt_answers (student_id, prompt_id, answer)
            VALUES ($1, $2, $3)
            ON CONFLICT (student_id, prompt_id)
            DO UPDATE SET answer = EXCLUDED.answer, updated_at = NOW()
            RETURNING student_id, prompt_id, answer, updated_at
            "#,
        )
        .bind(answer.student_id)
        .bind(answer.prompt_id)
        .bind(&answer.answer)
        .fetch_one(&self.pool)
        .await?;

        Ok(PromptAnswer {
            student_id: row.student_id,
            prompt_id: row.prompt_id,
            answer: row.answer,
            updated_at: row.updated_at,
        })
    }

    async fn delete_answer(&self, student_id: i64, prompt_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM prompt_answers WHERE student_id = $1 AND prompt_id = $2")
            .bind(student_id)
            .bind(prompt_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
