//! Swipe Handler
//!
//! Records likes and passes. A mutual like creates the match and pushes
//! `NewMatch` to both students' hub sessions.

use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};

use crate::application::dto::request::CreateSwipeRequest;
use crate::application::dto::response::SwipeResponse;
use crate::application::services::{SwipeError, SwipeService, SwipeServiceImpl};
use crate::domain::SwipeDirection;
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{
    PgBlockRepository, PgMatchRepository, PgStudentRepository, PgSwipeRepository,
};
use crate::presentation::hub::{MatchPayload, ServerFrame};
use crate::presentation::http::handlers::parse_id;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Record a like or pass
pub async fn create_swipe(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateSwipeRequest>,
) -> Result<(StatusCode, Json<SwipeResponse>), AppError> {
    let swipee_id = parse_id(&body.swipee_id)?;
    let direction = match body.direction.as_str() {
        "like" => SwipeDirection::Like,
        "pass" => SwipeDirection::Pass,
        other => {
            return Err(AppError::Validation(format!(
                "Unknown swipe direction: {other}"
            )))
        }
    };

    let service = SwipeServiceImpl::new(
        Arc::new(PgSwipeRepository::new(state.db.clone())),
        Arc::new(PgMatchRepository::new(state.db.clone())),
        Arc::new(PgStudentRepository::new(state.db.clone())),
        Arc::new(PgBlockRepository::new(state.db.clone())),
        state.snowflake.clone(),
    );

    let outcome = service
        .swipe(auth.student_id, swipee_id, direction)
        .await
        .map_err(|e| match e {
            SwipeError::StudentNotFound => AppError::NotFound("Student not found".into()),
            SwipeError::SelfSwipe => AppError::Validation("Cannot swipe on yourself".into()),
            SwipeError::AlreadySwiped => {
                AppError::Conflict("Already swiped on this student".into())
            }
            SwipeError::Blocked => AppError::Forbidden("Swipe not allowed".into()),
            SwipeError::Internal(msg) => AppError::Internal(msg),
        })?;

    metrics::record_swipe(direction.as_str(), outcome.new_match.is_some());

    if let Some(ref new_match) = outcome.new_match {
        // Each side learns the other participant's id
        state.hub.send_to_student(
            new_match.student_a_id,
            ServerFrame::NewMatch(MatchPayload {
                match_id: new_match.id.to_string(),
                other_student_id: new_match.student_b_id.to_string(),
                created_at: new_match.created_at.to_rfc3339(),
            }),
        );
        state.hub.send_to_student(
            new_match.student_b_id,
            ServerFrame::NewMatch(MatchPayload {
                match_id: new_match.id.to_string(),
                other_student_id: new_match.student_a_id.to_string(),
                created_at: new_match.created_at.to_rfc3339(),
            }),
        );
    }

    let response = SwipeResponse {
        swipe_id: outcome.swipe.id.to_string(),
        direction: outcome.swipe.direction.as_str().to_string(),
        matched: outcome.new_match.is_some(),
        match_id: outcome.new_match.map(|m| m.id.to_string()),
    };

    Ok((StatusCode::CREATED, Json(response)))
}
