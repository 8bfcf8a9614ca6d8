//! Admin Handlers
//!
//! Report queue management and bans. All routes sit behind the admin
//! middleware, so `AuthUser.is_admin` is already verified here.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::ReportQuery;
use crate::application::dto::response::ReportResponse;
use crate::application::services::ModerationService;
use crate::domain::{MatchRepository, ReportStatus};
use crate::infrastructure::repositories::PgMatchRepository;
use crate::presentation::http::handlers::moderation::{map_moderation_error, moderation_service};
use crate::presentation::http::handlers::parse_id;
use crate::presentation::hub::ServerFrame;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Report queue, newest first, optionally filtered by status
pub async fn list_reports(
    State(state): State<AppState>,
    Extension(_auth): Extension<AuthUser>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<ReportResponse>>, AppError> {
    let status = query.status.as_deref().map(ReportStatus::from_str);
    let limit = query.limit.unwrap_or(50);

    let reports = moderation_service(&state)
        .list_reports(status, limit)
        .await
        .map_err(map_moderation_error)?;

    Ok(Json(reports.into_iter().map(Into::into).collect()))
}

/// Close a report as resolved
pub async fn resolve_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<String>,
) -> Result<StatusCode, AppError> {
    close_report(&state, auth.student_id, &report_id, ReportStatus::Resolved).await
}

/// Close a report as dismissed
pub async fn dismiss_report(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(report_id): Path<String>,
) -> Result<StatusCode, AppError> {
    close_report(&state, auth.student_id, &report_id, ReportStatus::Dismissed).await
}

async fn close_report(
    state: &AppState,
    admin_id: i64,
    report_id: &str,
    status: ReportStatus,
) -> Result<StatusCode, AppError> {
    let report_id = parse_id(report_id)?;

    moderation_service(state)
        .resolve_report(admin_id, report_id, status)
        .await
        .map_err(map_moderation_error)?;

    Ok(StatusCode::NO_CONTENT)
}

/// Ban a student: closes their open matches and revokes their sessions
pub async fn ban_student(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(student_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let student_id = parse_id(&student_id)?;

    let closed_matches = moderation_service(&state)
        .ban_student(auth.student_id, student_id)
        .await
        .map_err(map_moderation_error)?;

    // The banned student's sessions are revoked; only the other
    // participant of each closed match needs the push.
    let match_repo = PgMatchRepository::new(state.db.clone());
    for match_id in closed_matches {
        if let Ok(Some(m)) = match_repo.find_by_id(match_id).await {
            if let Some(other_id) = m.other_of(student_id) {
                state.hub.send_to_student(
                    other_id,
                    ServerFrame::MatchClosed {
                        match_id: match_id.to_string(),
                    },
                );
            }
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
