//! Prompt and PromptAnswer entities.
//!
//! Prompts are editorial questions ("My ideal Sunday is…"); students answer
//! up to one per prompt. Maps to `prompts` and `prompt_answers`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Maximum length of a prompt answer.
pub const MAX_ANSWER_LENGTH: usize = 300;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: i64,
    pub question: String,
}

/// A student's answer to a prompt. Unique per (student_id, prompt_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptAnswer {
    pub student_id: i64,
    pub prompt_id: i64,
    pub answer: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository trait for Prompt data access operations.
#[async_trait]
pub trait PromptRepository: Send + Sync {
    /// List the prompt catalogue.
    async fn find_all(&self) -> Result<Vec<Prompt>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Prompt>, AppError>;

    /// A student's answers with their prompt questions, in prompt order.
    async fn find_answers(&self, student_id: i64)
        -> Result<Vec<(Prompt, PromptAnswer)>, AppError>;

    /// Insert or update the student's answer to a prompt.
    async fn upsert_answer(&self, answer: &PromptAnswer) -> Result<PromptAnswer, AppError>;

    /// Remove the student's answer to a prompt.
    async fn delete_answer(&self, student_id: i64, prompt_id: i64) -> Result<(), AppError>;
}
