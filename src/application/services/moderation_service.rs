//! Moderation Service
//!
//! Member-facing reports and blocks, plus the admin moderation queue
//! (report resolution, bans, audit log).

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    ActivityLogEntry, ActivityLogRepository, Block, BlockRepository, MatchRepository, Report,
    ReportReason, ReportRepository, ReportStatus, SessionRepository, StudentRepository,
};
use crate::shared::SnowflakeGenerator;

/// Moderation service trait
#[async_trait]
pub trait ModerationService: Send + Sync {
    /// File a report against another student.
    async fn report_student(
        &self,
        reporter_id: i64,
        reported_id: i64,
        reason: ReportReason,
        details: Option<String>,
    ) -> Result<Report, ModerationError>;

    /// Block a student. Closes any open match between the pair and
    /// returns the closed match id, if one existed.
    async fn block_student(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<Option<i64>, ModerationError>;

    /// Lift a block previously placed by `blocker_id`.
    async fn unblock_student(&self, blocker_id: i64, blocked_id: i64)
        -> Result<(), ModerationError>;

    /// Students the caller has blocked.
    async fn list_blocks(&self, blocker_id: i64) -> Result<Vec<Block>, ModerationError>;

    /// Admin: reports filtered by status, newest first.
    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        limit: i32,
    ) -> Result<Vec<Report>, ModerationError>;

    /// Admin: close a report as resolved or dismissed.
    async fn resolve_report(
        &self,
        admin_id: i64,
        report_id: i64,
        status: ReportStatus,
    ) -> Result<(), ModerationError>;

    /// Admin: ban a student. Closes all their open matches and revokes
    /// their sessions; returns the closed match ids for hub notification.
    async fn ban_student(&self, admin_id: i64, student_id: i64)
        -> Result<Vec<i64>, ModerationError>;
}

/// Moderation service errors
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Student not found")]
    StudentNotFound,

    #[error("Report not found")]
    ReportNotFound,

    #[error("Cannot report yourself")]
    SelfReport,

    #[error("Cannot block yourself")]
    SelfBlock,

    #[error("Student is already blocked")]
    AlreadyBlocked,

    #[error("No such block")]
    BlockNotFound,

    #[error("Report is already closed")]
    ReportClosed,

    #[error("Invalid report resolution")]
    InvalidResolution,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<crate::shared::error::AppError> for ModerationError {
    fn from(e: crate::shared::error::AppError) -> Self {
        ModerationError::Internal(e.to_string())
    }
}

/// ModerationService implementation
pub struct ModerationServiceImpl<Re, Bl, St, Ma, Se, Al>
where
    Re: ReportRepository,
    Bl: BlockRepository,
    St: StudentRepository,
    Ma: MatchRepository,
    Se: SessionRepository,
    Al: ActivityLogRepository,
{
    report_repo: Arc<Re>,
    block_repo: Arc<Bl>,
    student_repo: Arc<St>,
    match_repo: Arc<Ma>,
    session_repo: Arc<Se>,
    activity_repo: Arc<Al>,
    snowflake: Arc<SnowflakeGenerator>,
}

impl<Re, Bl, St, Ma, Se, Al> ModerationServiceImpl<Re, Bl, St, Ma, Se, Al>
where
    Re: ReportRepository,
    Bl: BlockRepository,
    St: StudentRepository,
    Ma: MatchRepository,
    Se: SessionRepository,
    Al: ActivityLogRepository,
{
    pub fn new(
        report_repo: Arc<Re>,
        block_repo: Arc<Bl>,
        student_repo: Arc<St>,
        match_repo: Arc<Ma>,
        session_repo: Arc<Se>,
        activity_repo: Arc<Al>,
        snowflake: Arc<SnowflakeGenerator>,
    ) -> Self {
        Self {
            report_repo,
            block_repo,
            student_repo,
            match_repo,
            session_repo,
            activity_repo,
            snowflake,
        }
    }

    async fn require_student(&self, id: i64) -> Result<(), ModerationError> {
        self.student_repo
            .find_by_id(id)
            .await?
            .ok_or(ModerationError::StudentNotFound)?;
        Ok(())
    }

    async fn audit(&self, admin_id: i64, action: &str, target_id: Option<i64>) {
        let entry = ActivityLogEntry {
            id: self.snowflake.generate(),
            admin_id,
            action: action.to_string(),
            target_id,
            created_at: Utc::now(),
        };
        if let Err(e) = self.activity_repo.record(&entry).await {
            // Audit failure must not fail the admin action itself
            tracing::error!(error = %e, action, "Failed to record activity log entry");
        }
    }
}

#[async_trait]
impl<Re, Bl, St, Ma, Se, Al> ModerationService for ModerationServiceImpl<Re, Bl, St, Ma, Se, Al>
where
    Re: ReportRepository + 'static,
    Bl: BlockRepository + 'static,
    St: StudentRepository + 'static,
    Ma: MatchRepository + 'static,
    Se: SessionRepository + 'static,
    Al: ActivityLogRepository + 'static,
{
    async fn report_student(
        &self,
        reporter_id: i64,
        reported_id: i64,
        reason: ReportReason,
        details: Option<String>,
    ) -> Result<Report, ModerationError> {
        if reporter_id == reported_id {
            return Err(ModerationError::SelfReport);
        }
        self.require_student(reported_id).await?;

        let report = Report {
            id: self.snowflake.generate(),
            reporter_id,
            reported_id,
            reason,
            details,
            status: ReportStatus::Open,
            resolved_by: None,
            resolved_at: None,
            created_at: Utc::now(),
        };

        let saved = self.report_repo.create(&report).await?;
        tracing::info!(
            report_id = saved.id,
            reported_id,
            reason = reason.as_str(),
            "Report filed"
        );
        Ok(saved)
    }

    async fn block_student(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<Option<i64>, ModerationError> {
        if blocker_id == blocked_id {
            return Err(ModerationError::SelfBlock);
        }
        self.require_student(blocked_id).await?;

        let already = self
            .block_repo
            .find_by_blocker(blocker_id)
            .await?
            .iter()
            .any(|b| b.blocked_id == blocked_id);
        if already {
            return Err(ModerationError::AlreadyBlocked);
        }

        let block = Block {
            blocker_id,
            blocked_id,
            created_at: Utc::now(),
        };
        self.block_repo.create(&block).await?;

        // Blocking severs any live conversation between the pair
        let mut closed = None;
        if let Some(m) = self.match_repo.find_by_pair(blocker_id, blocked_id).await? {
            if m.is_open() {
                self.match_repo.close(m.id).await?;
                closed = Some(m.id);
            }
        }

        tracing::info!(blocker_id, blocked_id, closed_match = ?closed, "Student blocked");
        Ok(closed)
    }

    async fn unblock_student(
        &self,
        blocker_id: i64,
        blocked_id: i64,
    ) -> Result<(), ModerationError> {
        let exists = self
            .block_repo
            .find_by_blocker(blocker_id)
            .await?
            .iter()
            .any(|b| b.blocked_id == blocked_id);
        if !exists {
            return Err(ModerationError::BlockNotFound);
        }

        self.block_repo.delete(blocker_id, blocked_id).await?;
        Ok(())
    }

    async fn list_blocks(&self, blocker_id: i64) -> Result<Vec<Block>, ModerationError> {
        Ok(self.block_repo.find_by_blocker(blocker_id).await?)
    }

    async fn list_reports(
        &self,
        status: Option<ReportStatus>,
        limit: i32,
    ) -> Result<Vec<Report>, ModerationError> {
        Ok(self.report_repo.find_by_status(status, limit).await?)
    }

    async fn resolve_report(
        &self,
        admin_id: i64,
        report_id: i64,
        status: ReportStatus,
    ) -> Result<(), ModerationError> {
        if status == ReportStatus::Open {
            return Err(ModerationError::InvalidResolution);
        }

        let report = self
            .report_repo
            .find_by_id(report_id)
            .await?
            .ok_or(ModerationError::ReportNotFound)?;
        if report.status != ReportStatus::Open {
            return Err(ModerationError::ReportClosed);
        }

        self.report_repo.set_status(report_id, status, admin_id).await?;
        self.audit(
            admin_id,
            match status {
                ReportStatus::Resolved => "report.resolve",
                _ => "report.dismiss",
            },
            Some(report_id),
        )
        .await;

        Ok(())
    }

    async fn ban_student(
        &self,
        admin_id: i64,
        student_id: i64,
    ) -> Result<Vec<i64>, ModerationError> {
        self.require_student(student_id).await?;

        self.student_repo.set_banned(student_id, true).await?;
        let closed = self.match_repo.close_all_for_student(student_id).await?;
        self.session_repo.revoke_all_for_student(student_id).await?;

        self.audit(admin_id, "student.ban", Some(student_id)).await;
        tracing::warn!(student_id, admin_id, closed = closed.len(), "Student banned");

        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiscoveryFilter, Match, Session, Student};
    use crate::shared::error::AppError;
    use mockall::mock;
    use uuid::Uuid;

    mock! {
        ReportRepo {}

        #[async_trait]
        impl ReportRepository for ReportRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Report>, AppError>;
            async fn find_by_status(
                &self,
                status: Option<ReportStatus>,
                limit: i32,
            ) -> Result<Vec<Report>, AppError>;
            async fn create(&self, report: &Report) -> Result<Report, AppError>;
            async fn set_status(
                &self,
                id: i64,
                status: ReportStatus,
                resolved_by: i64,
            ) -> Result<(), AppError>;
        }
    }

    mock! {
        BlockRepo {}

        #[async_trait]
        impl BlockRepository for BlockRepo {
            async fn exists_between(&self, first: i64, second: i64) -> Result<bool, AppError>;
            async fn find_by_blocker(&self, blocker_id: i64) -> Result<Vec<Block>, AppError>;
            async fn create(&self, block: &Block) -> Result<Block, AppError>;
            async fn delete(&self, blocker_id: i64, blocked_id: i64) -> Result<(), AppError>;
        }
    }

    mock! {
        StudentRepo {}

        #[async_trait]
        impl StudentRepository for StudentRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Student>, AppError>;
            async fn find_by_email(&self, email: &str) -> Result<Option<Student>, AppError>;
            async fn create(&self, student: &Student) -> Result<Student, AppError>;
            async fn update(&self, student: &Student) -> Result<Student, AppError>;
            async fn email_exists(&self, email: &str) -> Result<bool, AppError>;
            async fn touch_last_active(&self, id: i64) -> Result<(), AppError>;
            async fn set_banned(&self, id: i64, banned: bool) -> Result<(), AppError>;
            async fn find_discovery_candidates(
                &self,
                filter: &DiscoveryFilter,
            ) -> Result<Vec<Student>, AppError>;
        }
    }

    mock! {
        MatchRepo {}

        #[async_trait]
        impl MatchRepository for MatchRepo {
            async fn find_by_id(&self, id: i64) -> Result<Option<Match>, AppError>;
            async fn find_by_pair(&self, a: i64, b: i64) -> Result<Option<Match>, AppError>;
            async fn find_open_for_student(&self, student_id: i64) -> Result<Vec<Match>, AppError>;
            async fn create(&self, record: &Match) -> Result<Match, AppError>;
            async fn close(&self, id: i64) -> Result<(), AppError>;
            async fn close_all_for_student(&self, student_id: i64) -> Result<Vec<i64>, AppError>;
        }
    }

    mock! {
        SessionRepo {}

        #[async_trait]
        impl SessionRepository for SessionRepo {
            async fn find_by_token_hash(&self, hash: &str) -> Result<Option<Session>, AppError>;
            async fn create(&self, session: &Session) -> Result<Session, AppError>;
            async fn update_token_hash(
                &self,
                id: Uuid,
                hash: &str,
                expires_at: chrono::DateTime<Utc>,
            ) -> Result<(), AppError>;
            async fn revoke(&self, id: Uuid) -> Result<(), AppError>;
            async fn revoke_all_for_student(&self, student_id: i64) -> Result<u64, AppError>;
            async fn delete_expired(&self) -> Result<u64, AppError>;
        }
    }

    mock! {
        ActivityRepo {}

        #[async_trait]
        impl ActivityLogRepository for ActivityRepo {
            async fn record(&self, entry: &ActivityLogEntry) -> Result<(), AppError>;
            async fn find_recent(&self, limit: i32) -> Result<Vec<ActivityLogEntry>, AppError>;
        }
    }

    struct Repos {
        report: MockReportRepo,
        block: MockBlockRepo,
        student: MockStudentRepo,
        match_: MockMatchRepo,
        session: MockSessionRepo,
        activity: MockActivityRepo,
    }

    impl Default for Repos {
        fn default() -> Self {
            Self {
                report: MockReportRepo::new(),
                block: MockBlockRepo::new(),
                student: MockStudentRepo::new(),
                match_: MockMatchRepo::new(),
                session: MockSessionRepo::new(),
                activity: MockActivityRepo::new(),
            }
        }
    }

    fn service(
        r: Repos,
    ) -> ModerationServiceImpl<
        MockReportRepo,
        MockBlockRepo,
        MockStudentRepo,
        MockMatchRepo,
        MockSessionRepo,
        MockActivityRepo,
    > {
        ModerationServiceImpl::new(
            Arc::new(r.report),
            Arc::new(r.block),
            Arc::new(r.student),
            Arc::new(r.match_),
            Arc::new(r.session),
            Arc::new(r.activity),
            Arc::new(SnowflakeGenerator::new(1, 1)),
        )
    }

    fn student(id: i64) -> Student {
        Student {
            id,
            email: format!("s{id}@campus.edu"),
            password_hash: String::new(),
            name: format!("Student {id}"),
            bio: None,
            birthdate: chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap(),
            gender: crate::domain::Gender::Unspecified,
            seeking: crate::domain::Seeking::Everyone,
            campus: None,
            program: None,
            graduation_year: None,
            verified: false,
            banned: false,
            is_admin: false,
            last_active_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn self_report_rejected() {
        let svc = service(Repos::default());
        let err = svc
            .report_student(5, 5, ReportReason::Spam, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::SelfReport));
    }

    #[tokio::test]
    async fn block_closes_open_match() {
        let mut r = Repos::default();
        r.student
            .expect_find_by_id()
            .returning(|id| Ok(Some(student(id))));
        r.block.expect_find_by_blocker().returning(|_| Ok(vec![]));
        r.block.expect_create().returning(|b| Ok(b.clone()));
        r.match_.expect_find_by_pair().returning(|a, b| {
            Ok(Some(Match::new(77, a, b)))
        });
        r.match_.expect_close().times(1).returning(|_| Ok(()));

        let svc = service(r);
        let closed = svc.block_student(10, 20).await.unwrap();
        assert_eq!(closed, Some(77));
    }

    #[tokio::test]
    async fn double_block_rejected() {
        let mut r = Repos::default();
        r.student
            .expect_find_by_id()
            .returning(|id| Ok(Some(student(id))));
        r.block.expect_find_by_blocker().returning(|_| {
            Ok(vec![Block {
                blocker_id: 10,
                blocked_id: 20,
                created_at: Utc::now(),
            }])
        });

        let svc = service(r);
        let err = svc.block_student(10, 20).await.unwrap_err();
        assert!(matches!(err, ModerationError::AlreadyBlocked));
    }

    #[tokio::test]
    async fn resolve_requires_open_report() {
        let mut r = Repos::default();
        r.report.expect_find_by_id().returning(|id| {
            Ok(Some(Report {
                id,
                reporter_id: 1,
                reported_id: 2,
                reason: ReportReason::Spam,
                details: None,
                status: ReportStatus::Resolved,
                resolved_by: Some(99),
                resolved_at: Some(Utc::now()),
                created_at: Utc::now(),
            }))
        });

        let svc = service(r);
        let err = svc
            .resolve_report(99, 1, ReportStatus::Dismissed)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::ReportClosed));
    }

    #[tokio::test]
    async fn resolving_to_open_is_invalid() {
        let svc = service(Repos::default());
        let err = svc
            .resolve_report(99, 1, ReportStatus::Open)
            .await
            .unwrap_err();
        assert!(matches!(err, ModerationError::InvalidResolution));
    }

    #[tokio::test]
    async fn ban_closes_matches_and_revokes_sessions() {
        let mut r = Repos::default();
        r.student
            .expect_find_by_id()
            .returning(|id| Ok(Some(student(id))));
        r.student
            .expect_set_banned()
            .times(1)
            .returning(|_, _| Ok(()));
        r.match_
            .expect_close_all_for_student()
            .times(1)
            .returning(|_| Ok(vec![5, 6]));
        r.session
            .expect_revoke_all_for_student()
            .times(1)
            .returning(|_| Ok(3));
        r.activity.expect_record().returning(|_| Ok(()));

        let svc = service(r);
        let closed = svc.ban_student(99, 10).await.unwrap();
        assert_eq!(closed, vec![5, 6]);
    }
}
