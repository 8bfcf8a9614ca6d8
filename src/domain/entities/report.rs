//! Report entity and repository trait.
//!
//! Maps to the `reports` table. Reports feed the admin moderation queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::AppError;

/// Reason a student was reported, matching database VARCHAR constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportReason {
    InappropriateContent,
    Harassment,
    FakeProfile,
    Spam,
    Underage,
    Other,
}

impl ReportReason {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "inappropriate_content" => Self::InappropriateContent,
            "harassment" => Self::Harassment,
            "fake_profile" => Self::FakeProfile,
            "spam" => Self::Spam,
            "underage" => Self::Underage,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InappropriateContent => "inappropriate_content",
            Self::Harassment => "harassment",
            Self::FakeProfile => "fake_profile",
            Self::Spam => "spam",
            Self::Underage => "underage",
            Self::Other => "other",
        }
    }
}

/// Moderation state of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    #[default]
    Open,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "resolved" => Self::Resolved,
            "dismissed" => Self::Dismissed,
            _ => Self::Open,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Resolved => "resolved",
            Self::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    pub reporter_id: i64,
    pub reported_id: i64,
    pub reason: ReportReason,
    pub details: Option<String>,
    pub status: ReportStatus,
    /// Admin who closed the report
    pub resolved_by: Option<i64>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for Report data access operations.
#[async_trait]
pub trait ReportRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, AppError>;

    /// Reports filtered by status, newest first.
    async fn find_by_status(
        &self,
        status: Option<ReportStatus>,
        limit: i32,
    ) -> Result<Vec<Report>, AppError>;

    async fn create(&self, report: &Report) -> Result<Report, AppError>;

    /// Transition the report out of `open`.
    async fn set_status(
        &self,
        id: i64,
        status: ReportStatus,
        resolved_by: i64,
    ) -> Result<(), AppError>;
}

/// An admin action recorded for auditability. Maps to `activity_log`.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub admin_id: i64,
    pub action: String,
    pub target_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Repository trait for activity-log writes.
#[async_trait]
pub trait ActivityLogRepository: Send + Sync {
    async fn record(&self, entry: &ActivityLogEntry) -> Result<(), AppError>;

    async fn find_recent(&self, limit: i32) -> Result<Vec<ActivityLogEntry>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_roundtrip() {
        for r in [
            ReportReason::InappropriateContent,
            ReportReason::Harassment,
            ReportReason::FakeProfile,
            ReportReason::Spam,
            ReportReason::Underage,
            ReportReason::Other,
        ] {
            assert_eq!(ReportReason::from_str(r.as_str()), r);
        }
        assert_eq!(ReportReason::from_str("nonsense"), ReportReason::Other);
    }

    #[test]
    fn test_status_roundtrip() {
        for s in [ReportStatus::Open, ReportStatus::Resolved, ReportStatus::Dismissed] {
            assert_eq!(ReportStatus::from_str(s.as_str()), s);
        }
        assert_eq!(ReportStatus::default(), ReportStatus::Open);
    }
}
