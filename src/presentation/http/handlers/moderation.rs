//! Moderation Handlers
//!
//! Student-facing reports and blocks. Admin-only report resolution and
//! bans live in the admin handler.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{CreateBlockRequest, CreateReportRequest};
use crate::application::dto::response::{BlockResponse, ReportResponse};
use crate::application::services::{ModerationError, ModerationService, ModerationServiceImpl};
use crate::domain::ReportReason;
use crate::infrastructure::repositories::{
    PgActivityLogRepository, PgBlockRepository, PgMatchRepository, PgReportRepository,
    PgSessionRepository, PgStudentRepository,
};
use crate::presentation::hub::ServerFrame;
use crate::presentation::http::handlers::parse_id;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

pub(super) type ModerationSvc = ModerationServiceImpl<
    PgReportRepository,
    PgBlockRepository,
    PgStudentRepository,
    PgMatchRepository,
    PgSessionRepository,
    PgActivityLogRepository,
>;

pub(super) fn moderation_service(state: &AppState) -> ModerationSvc {
    ModerationServiceImpl::new(
        Arc::new(PgReportRepository::new(state.db.clone())),
        Arc::new(PgBlockRepository::new(state.db.clone())),
        Arc::new(PgStudentRepository::new(state.db.clone())),
        Arc::new(PgMatchRepository::new(state.db.clone())),
        Arc::new(PgSessionRepository::new(state.db.clone())),
        Arc::new(PgActivityLogRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

pub(super) fn map_moderation_error(e: ModerationError) -> AppError {
    match e {
        ModerationError::StudentNotFound => AppError::NotFound("Student not found".into()),
        ModerationError::ReportNotFound => AppError::NotFound("Report not found".into()),
        ModerationError::SelfReport => AppError::Validation("Cannot report yourself".into()),
        ModerationError::SelfBlock => AppError::Validation("Cannot block yourself".into()),
        ModerationError::AlreadyBlocked => {
            AppError::Conflict("Student is already blocked".into())
        }
        ModerationError::BlockNotFound => AppError::NotFound("No such block".into()),
        ModerationError::ReportClosed => AppError::Conflict("Report is already closed".into()),
        ModerationError::InvalidResolution => {
            AppError::Validation("Invalid report resolution".into())
        }
        ModerationError::Internal(msg) => AppError::Internal(msg),
    }
}

/// File a report against another student
pub async fn create_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let reported_id = parse_id(&body.reported_id)?;
    let reason = ReportReason::from_str(&body.reason);

    let report = moderation_service(&state)
        .report_student(auth.student_id, reported_id, reason, body.details)
        .await
        .map_err(map_moderation_error)?;

    Ok((StatusCode::CREATED, Json(ReportResponse::from(report))))
}

/// Block a student; closes any open match between the pair
pub async fn create_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateBlockRequest>,
) -> Result<StatusCode, AppError> {
    let blocked_id = parse_id(&body.blocked_id)?;

    let closed_match = moderation_service(&state)
        .block_student(auth.student_id, blocked_id)
        .await
        .map_err(map_moderation_error)?;

    if let Some(match_id) = closed_match {
        state.hub.send_to_pair(
            auth.student_id,
            blocked_id,
            ServerFrame::MatchClosed {
                match_id: match_id.to_string(),
            },
        );
    }

    Ok(StatusCode::CREATED)
}

/// Lift a block
pub async fn remove_block(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(blocked_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let blocked_id = parse_id(&blocked_id)?;

    moderation_service(&state)
        .unblock_student(auth.student_id, blocked_id)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Students the caller has blocked
pub async fn list_blocks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<BlockResponse>>, AppError> {
    let blocks = moderation_service(&state)
        .list_blocks(auth.student_id)
        .await
        .map_err(map_moderation_error)?;

    Ok(Json(blocks.into_iter().map(Into::into).collect()))
}
