//! Message Handlers
//!
//! REST access to match conversations. Sends persist through the same
//! message service as the hub and fan out to hub sessions afterwards.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::application::dto::request::{MessageQuery, SendMessageRequest};
use crate::application::dto::response::MessageResponse;
use crate::application::services::{MessageError, MessageService, MessageServiceImpl};
use crate::domain::MatchRepository;
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{PgMatchRepository, PgMessageRepository};
use crate::presentation::hub::{MessagePayload, ServerFrame};
use crate::presentation::http::handlers::parse_id;
use crate::presentation::middleware::AuthUser;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn message_service(
    state: &AppState,
) -> MessageServiceImpl<PgMessageRepository, PgMatchRepository> {
    MessageServiceImpl::new(
        Arc::new(PgMessageRepository::new(state.db.clone())),
        Arc::new(PgMatchRepository::new(state.db.clone())),
        state.snowflake.clone(),
    )
}

fn map_message_error(e: MessageError) -> AppError {
    match e {
        MessageError::MatchNotFound => AppError::NotFound("Match not found".into()),
        MessageError::Forbidden => AppError::Forbidden("Not a participant of this match".into()),
        MessageError::MatchClosed => AppError::BusinessRule("Match is closed".into()),
        MessageError::EmptyMessage => AppError::Validation("Message must not be empty".into()),
        MessageError::MessageTooLong => AppError::Validation("Message too long".into()),
        MessageError::Internal(msg) => AppError::Internal(msg),
    }
}

/// Message history, newest first, keyset-paginated by message id
pub async fn list_messages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(match_id): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<Json<Vec<MessageResponse>>, AppError> {
    let match_id = parse_id(&match_id)?;
    let before = query.before.as_deref().map(parse_id).transpose()?;
    let limit = query.limit.unwrap_or(50);

    let messages = message_service(&state)
        .list_messages(match_id, auth.student_id, before, limit)
        .await
        .map_err(map_message_error)?;

    Ok(Json(messages.into_iter().map(Into::into).collect()))
}

/// Send a message over REST
pub async fn send_message(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(match_id): Path<String>,
    Json(body): Json<SendMessageRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    body.validate().map_err(validation_error)?;

    let match_id = parse_id(&match_id)?;

    let message = message_service(&state)
        .send_message(match_id, auth.student_id, &body.content)
        .await
        .map_err(map_message_error)?;

    metrics::record_message("rest");

    // Sender membership was verified by the service
    let match_repo = PgMatchRepository::new(state.db.clone());
    if let Ok(Some(m)) = match_repo.find_by_id(match_id).await {
        if let Some(other_id) = m.other_of(auth.student_id) {
            state.hub.send_to_student(
                other_id,
                ServerFrame::ReceiveMessage(MessagePayload::from(&message)),
            );
        }
    }

    Ok((StatusCode::CREATED, Json(MessageResponse::from(message))))
}

/// Mark the caller's incoming messages in a match as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(match_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let match_id = parse_id(&match_id)?;

    let updated = message_service(&state)
        .mark_read(match_id, auth.student_id)
        .await
        .map_err(map_message_error)?;

    let match_repo = PgMatchRepository::new(state.db.clone());
    if let Ok(Some(m)) = match_repo.find_by_id(match_id).await {
        if let Some(other_id) = m.other_of(auth.student_id) {
            state.hub.send_to_student(
                other_id,
                ServerFrame::MessagesRead {
                    match_id: match_id.to_string(),
                    reader_id: auth.student_id.to_string(),
                },
            );
        }
    }

    Ok(Json(serde_json::json!({ "updated": updated })))
}
