//! Report and Activity Log Repository Implementations
//!
//! PostgreSQL implementations backing the admin moderation queue.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::{
    ActivityLogEntry, ActivityLogRepository, Report, ReportReason, ReportRepository, ReportStatus,
};
use crate::shared::error::AppError;

/// Database row representation matching the reports table schema.
#[derive(Debug, sqlx::FromRow)]
struct ReportRow {
    id: i64,
    reporter_id: i64,
    reported_id: i64,
    reason: String,
    details: Option<String>,
    status: String,
    resolved_by: Option<i64>,
    resolved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl ReportRow {
    fn into_report(self) -> Report {
        Report {
            id: self.id,
            reporter_id: self.reporter_id,
            reported_id: self.reported_id,
            reason: ReportReason::from_str(&self.reason),
            details: self.details,
            status: ReportStatus::from_str(&self.status),
            resolved_by: self.resolved_by,
            resolved_at: self.resolved_at,
            created_at: self.created_at,
        }
    }
}

const REPORT_COLUMNS: &str =
    "id, reporter_id, reported_id, reason, details, status, resolved_by, resolved_at, created_at";

/// PostgreSQL report repository implementation.
#[derive(Clone)]
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Report>, AppError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_report()))
    }

    async fn find_by_status(
        &self,
        status: Option<ReportStatus>,
        limit: i32,
    ) -> Result<Vec<Report>, AppError> {
        let rows = match status {
            Some(s) => {
                sqlx::query_as::<_, ReportRow>(&format!(
                    r#"
                    SELECT {REPORT_COLUMNS} FROM reports
                    WHERE status = $1
                    ORDER BY created_at DESC
                    LIMIT $2
                    "#
                ))
                .bind(s.as_str())
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ReportRow>(&format!(
                    "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC LIMIT $1"
                ))
                .bind(limit as i64)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(|r| r.into_report()).collect())
    }

    async fn create(&self, report: &Report) -> Result<Report, AppError> {
        let row = sqlx::query_as::<_, ReportRow>(&format!(
            r#"
            INSERT INTO reports (id, reporter_id, reported_id, reason, details)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(report.id)
        .bind(report.reporter_id)
        .bind(report.reported_id)
        .bind(report.reason.as_str())
        .bind(&report.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_report())
    }

    async fn set_status(
        &self,
        id: i64,
        status: ReportStatus,
        resolved_by: i64,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE reports
            SET status = $2, resolved_by = $3, resolved_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(resolved_by)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Database row representation matching the activity_log table schema.
#[derive(Debug, sqlx::FromRow)]
struct ActivityRow {
    id: i64,
    admin_id: i64,
    action: String,
    target_id: Option<i64>,
    created_at: DateTime<Utc>,
}

/// PostgreSQL activity log repository implementation.
#[derive(Clone)]
pub struct PgActivityLogRepository {
    pool: PgPool,
}

impl PgActivityLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLogRepository for PgActivityLogRepository {
    async fn record(&self, entry: &ActivityLogEntry) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO activity_log (id, admin_id, action, target_id) VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id)
        .bind(entry.admin_id)
        .bind(&entry.action)
        .bind(entry.target_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_recent(&self, limit: i32) -> Result<Vec<ActivityLogEntry>, AppError> {
        let rows = sqlx::query_as::<_, ActivityRow>(
            r#"
            SELECT id, admin_id, action, target_id, created_at
            FROM activity_log
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| ActivityLogEntry {
                id: r.id,
                admin_id: r.admin_id,
                action: r.action,
                target_id: r.target_id,
                created_at: r.created_at,
            })
            .collect())
    }
}
