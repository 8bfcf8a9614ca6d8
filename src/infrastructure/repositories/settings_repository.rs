//! Settings Repository Implementation
//!
//! PostgreSQL implementation of the SettingsRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{Seeking, SettingsRepository, StudentSettings};
use crate::shared::error::AppError;

/// Database row representation matching the student_settings table schema.
#[derive(Debug, sqlx::FromRow)]
struct SettingsRow {
    student_id: i64,
    discovery_enabled: bool,
    min_age: i32,
    max_age: i32,
    show_me: String,
    notify_matches: bool,
    notify_messages: bool,
    updated_at: DateTime<Utc>,
}

impl SettingsRow {
    fn into_settings(self) -> StudentSettings {
        StudentSettings {
            student_id: self.student_id,
            discovery_enabled: self.discovery_enabled,
            min_age: self.min_age,
            max_age: self.max_age,
            show_me: Seeking::from_str(&self.show_me),
            notify_matches: self.notify_matches,
            notify_messages: self.notify_messages,
            updated_at: self.updated_at,
        }
    }
}

const SETTINGS_COLUMNS: &str = "student_id, discovery_enabled, min_age, max_age, show_me, \
     notify_matches, notify_messages, updated_at";

/// PostgreSQL settings repository implementation.
#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn find_by_student(
        &self,
        student_id: i64,
    ) -> Result<Option<StudentSettings>, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            "SELECT {SETTINGS_COLUMNS} FROM student_settings WHERE student_id = $1"
        ))
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_settings()))
    }

    async fn create(&self, settings: &StudentSettings) -> Result<StudentSettings, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            r#"
            INSERT INTO student_settings
                (student_id, discovery_enabled, min_age, max_age, show_me,
                 notify_matches, notify_messages)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(settings.student_id)
        .bind(settings.discovery_enabled)
        .bind(settings.min_age)
        .bind(settings.max_age)
        .bind(settings.show_me.as_str())
        .bind(settings.notify_matches)
        .bind(settings.notify_messages)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_settings())
    }

    async fn update(&self, settings: &StudentSettings) -> Result<StudentSettings, AppError> {
        let row = sqlx::query_as::<_, SettingsRow>(&format!(
            r#"
            UPDATE student_settings
            SET discovery_enabled = $2, min_age = $3, max_age = $4, show_me = $5,
                notify_matches = $6, notify_messages = $7, updated_at = NOW()
            WHERE student_id = $1
            RETURNING {SETTINGS_COLUMNS}
            "#
        ))
        .bind(settings.student_id)
        .bind(settings.discovery_enabled)
        .bind(settings.min_age)
        .bind(settings.max_age)
        .bind(settings.show_me.as_str())
        .bind(settings.notify_matches)
        .bind(settings.notify_messages)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_settings())
    }
}
