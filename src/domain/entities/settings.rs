//! Per-student settings entity and repository trait.
//!
//! Maps to the `student_settings` table (1:1 with students, created at
//! registration).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

use super::student::Seeking;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSettings {
    pub student_id: i64,

    /// When false the student is hidden from every feed and their own feed
    /// is empty
    pub discovery_enabled: bool,

    /// Candidate age window
    pub min_age: i32,
    pub max_age: i32,

    /// Which genders appear in the feed
    pub show_me: Seeking,

    pub notify_matches: bool,
    pub notify_messages: bool,

    pub updated_at: DateTime<Utc>,
}

impl StudentSettings {
    /// Defaults applied at registration.
    pub fn defaults(student_id: i64) -> Self {
        Self {
            student_id,
            discovery_enabled: true,
            min_age: 18,
            max_age: 30,
            show_me: Seeking::Everyone,
            notify_matches: true,
            notify_messages: true,
            updated_at: Utc::now(),
        }
    }
}

/// Repository trait for settings data access operations.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn find_by_student(&self, student_id: i64)
        -> Result<Option<StudentSettings>, AppError>;

    async fn create(&self, settings: &StudentSettings) -> Result<StudentSettings, AppError>;

    async fn update(&self, settings: &StudentSettings) -> Result<StudentSettings, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_adult_window() {
        let s = StudentSettings::defaults(1);
        assert!(s.discovery_enabled);
        assert_eq!(s.min_age, 18);
        assert!(s.max_age >= s.min_age);
        assert_eq!(s.show_me, Seeking::Everyone);
    }
}
