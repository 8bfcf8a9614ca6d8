//! Match Handlers
//!
//! Match list with previews, single-match lookup, and unmatching.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::response::{MatchDetailResponse, MatchResponse};
use crate::application::services::{MatchError, MatchService, MatchServiceImpl};
use crate::infrastructure::cache::PresenceCacheService;
use crate::infrastructure::repositories::{
    PgMatchRepository, PgMessageRepository, PgPhotoRepository, PgStudentRepository,
};
use crate::presentation::hub::ServerFrame;
use crate::presentation::http::handlers::parse_id;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

type MatchSvc = MatchServiceImpl<
    PgMatchRepository,
    PgStudentRepository,
    PgPhotoRepository,
    PgMessageRepository,
>;

fn match_service(state: &AppState) -> MatchSvc {
    MatchServiceImpl::new(
        Arc::new(PgMatchRepository::new(state.db.clone())),
        Arc::new(PgStudentRepository::new(state.db.clone())),
        Arc::new(PgPhotoRepository::new(state.db.clone())),
        Arc::new(PgMessageRepository::new(state.db.clone())),
    )
}

fn map_match_error(e: MatchError) -> AppError {
    match e {
        MatchError::NotFound => AppError::NotFound("Match not found".into()),
        MatchError::Forbidden => AppError::Forbidden("Not a participant of this match".into()),
        MatchError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Open matches for the caller, newest first, with previews
pub async fn list_matches(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<MatchResponse>>, AppError> {
    let previews = match_service(&state)
        .list_matches(auth.student_id)
        .await
        .map_err(map_match_error)?;

    let presence = PresenceCacheService::new(
        state.redis.clone(),
        state.settings.hub.presence_ttl_secs,
    );

    let mut responses = Vec::with_capacity(previews.len());
    for preview in previews {
        let other_id = preview.other.id;
        let mut response = MatchResponse::from(preview);
        response.online = presence.is_online(other_id).await.unwrap_or(false);
        responses.push(response);
    }

    Ok(Json(responses))
}

/// Single match by id, participants only
pub async fn get_match(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(match_id): Path<String>,
) -> Result<Json<MatchDetailResponse>, AppError> {
    let match_id = parse_id(&match_id)?;

    let m = match_service(&state)
        .get_match(match_id, auth.student_id)
        .await
        .map_err(map_match_error)?;

    Ok(Json(MatchDetailResponse::from(m)))
}

/// Unmatch: close the match and tell the other side
pub async fn unmatch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(match_id): Path<String>,
) -> Result<StatusCode, AppError> {
    let match_id = parse_id(&match_id)?;

    let other_id = match_service(&state)
        .unmatch(match_id, auth.student_id)
        .await
        .map_err(map_match_error)?;

    state.hub.send_to_student(
        other_id,
        ServerFrame::MatchClosed {
            match_id: match_id.to_string(),
        },
    );

    Ok(StatusCode::NO_CONTENT)
}
