//! Hub Connection Handler
//!
//! Upgrades `/chathub` websocket connections and runs the per-connection
//! frame loop. Authentication happens before the upgrade via the
//! `access_token` query parameter, so an invalid token is rejected with
//! a plain 401 instead of an open-then-close dance.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::interval;
use uuid::Uuid;

use super::messages::{ClientFrame, MatchPayload, MessagePayload, ServerFrame};
use crate::application::services::{
    decode_access_token, MessageError, MessageService, MessageServiceImpl,
};
use crate::domain::MatchRepository;
use crate::infrastructure::cache::{PresenceCacheService, TypingCacheService};
use crate::infrastructure::metrics;
use crate::infrastructure::repositories::{PgMatchRepository, PgMessageRepository};
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Hub handshake query parameters
#[derive(Debug, Deserialize)]
pub struct HubAuthQuery {
    pub access_token: String,
}

/// Websocket upgrade handler for `/chathub`
pub async fn hub_handler(
    State(state): State<AppState>,
    Query(query): Query<HubAuthQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let claims = decode_access_token(&query.access_token, &state.settings.jwt.secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired access token".into()))?;

    let student_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::Unauthorized("Invalid token claims".into()))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, student_id)))
}

/// Per-connection loop: register, pump frames, clean up.
async fn handle_socket(socket: WebSocket, state: AppState, student_id: i64) {
    let connection_id = Uuid::new_v4().to_string();

    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerFrame>();

    // Writer task: the only place that touches the socket's write half
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            let text = match serde_json::to_string(&frame) {
                Ok(t) => t,
                Err(e) => {
                    tracing::error!("Failed to serialize hub frame: {}", e);
                    continue;
                }
            };
            if ws_sender.send(WsMessage::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    state.hub.register(connection_id.clone(), student_id, tx.clone());

    let presence = PresenceCacheService::new(
        state.redis.clone(),
        state.settings.hub.presence_ttl_secs,
    );
    if let Err(e) = presence.mark_online(student_id).await {
        tracing::warn!(student_id, error = %e, "Failed to mark student online");
    }

    let mut heartbeat = interval(Duration::from_millis(
        state.settings.hub.heartbeat_interval_ms,
    ));
    heartbeat.tick().await;

    loop {
        tokio::select! {
            msg = ws_receiver.next() => {
                match msg {
                    Some(Ok(WsMessage::Text(text))) => {
                        dispatch_frame(&text, student_id, &tx, &state).await;
                    }
                    Some(Ok(WsMessage::Close(_))) | None => {
                        tracing::debug!(connection_id = %connection_id, "Hub connection closed");
                        break;
                    }
                    Some(Ok(WsMessage::Ping(_))) => {
                        // Pong is handled by axum
                    }
                    Some(Err(e)) => {
                        tracing::debug!(connection_id = %connection_id, error = %e, "Websocket error");
                        break;
                    }
                    _ => {}
                }
            }

            // Presence is TTL-based; refresh while the socket lives
            _ = heartbeat.tick() => {
                if let Err(e) = presence.mark_online(student_id).await {
                    tracing::warn!(student_id, error = %e, "Presence refresh failed");
                }
            }
        }
    }

    let last_connection = state.hub.unregister(&connection_id);
    if last_connection {
        if let Err(e) = presence.mark_offline(student_id).await {
            tracing::warn!(student_id, error = %e, "Failed to mark student offline");
        }
    }
    writer_task.abort();
}

/// Parse and handle one client frame. Failures are reported back on the
/// same connection; they never terminate it.
async fn dispatch_frame(
    text: &str,
    student_id: i64,
    tx: &mpsc::UnboundedSender<ServerFrame>,
    state: &AppState,
) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            send_error(tx, "invalid_frame", &format!("Unparseable frame: {}", e));
            return;
        }
    };

    let result = match frame {
        ClientFrame::SendMessage { match_id, content } => {
            handle_send_message(&match_id, &content, student_id, state).await
        }
        ClientFrame::SendTypingIndicator {
            match_id,
            is_typing,
        } => handle_typing(&match_id, is_typing, student_id, state).await,
        ClientFrame::NotifyMessagesRead { match_id } => {
            handle_messages_read(&match_id, student_id, state).await
        }
        ClientFrame::NotifyMatch { match_id } => {
            handle_notify_match(&match_id, student_id, state).await
        }
        ClientFrame::Ping => {
            let _ = tx.send(ServerFrame::Pong);
            Ok(())
        }
    };

    if let Err((code, message)) = result {
        send_error(tx, code, &message);
    }
}

type FrameResult = Result<(), (&'static str, String)>;

fn send_error(tx: &mpsc::UnboundedSender<ServerFrame>, code: &str, message: &str) {
    let _ = tx.send(ServerFrame::Error {
        code: code.to_string(),
        message: message.to_string(),
    });
}

fn parse_id(raw: &str) -> Result<i64, (&'static str, String)> {
    raw.parse::<i64>()
        .map_err(|_| ("invalid_frame", format!("Invalid id: {raw}")))
}

fn message_error(e: MessageError) -> (&'static str, String) {
    let code = match e {
        MessageError::MatchNotFound => "match_not_found",
        MessageError::Forbidden => "not_participant",
        MessageError::MatchClosed => "match_closed",
        MessageError::EmptyMessage | MessageError::MessageTooLong => "invalid_message",
        MessageError::Internal(_) => "internal_error",
    };
    let message = match &e {
        MessageError::Internal(_) => "Internal error".to_string(),
        other => other.to_string(),
    };
    (code, message)
}

async fn handle_send_message(
    match_id: &str,
    content: &str,
    sender_id: i64,
    state: &AppState,
) -> FrameResult {
    let match_id = parse_id(match_id)?;

    let match_repo = Arc::new(PgMatchRepository::new(state.db.clone()));
    let message_service = MessageServiceImpl::new(
        Arc::new(PgMessageRepository::new(state.db.clone())),
        match_repo.clone(),
        state.snowflake.clone(),
    );

    let message = message_service
        .send_message(match_id, sender_id, content)
        .await
        .map_err(message_error)?;

    metrics::record_message("hub");

    // Participants are known to exist: send_message verified membership
    if let Ok(Some(m)) = match_repo.find_by_id(match_id).await {
        state.hub.send_to_pair(
            m.student_a_id,
            m.student_b_id,
            ServerFrame::ReceiveMessage(MessagePayload::from(&message)),
        );
    }

    Ok(())
}

async fn handle_typing(
    match_id: &str,
    is_typing: bool,
    student_id: i64,
    state: &AppState,
) -> FrameResult {
    let match_id = parse_id(match_id)?;

    let match_repo = PgMatchRepository::new(state.db.clone());
    let m = match_repo
        .find_by_id(match_id)
        .await
        .map_err(|_| ("internal_error", "Internal error".to_string()))?
        .ok_or(("match_not_found", "Match not found".to_string()))?;

    let other_id = m
        .other_of(student_id)
        .ok_or(("not_participant", "Not a participant of this match".to_string()))?;

    let typing = TypingCacheService::new(state.redis.clone(), state.settings.hub.typing_ttl_secs);
    let cache_result = if is_typing {
        typing.set_typing(match_id, student_id).await
    } else {
        typing.clear_typing(match_id, student_id).await
    };
    if let Err(e) = cache_result {
        tracing::warn!(match_id, student_id, error = %e, "Typing cache update failed");
    }

    state.hub.send_to_student(
        other_id,
        ServerFrame::TypingIndicator {
            match_id: match_id.to_string(),
            student_id: student_id.to_string(),
            is_typing,
        },
    );

    Ok(())
}

async fn handle_messages_read(match_id: &str, reader_id: i64, state: &AppState) -> FrameResult {
    let match_id = parse_id(match_id)?;

    let match_repo = Arc::new(PgMatchRepository::new(state.db.clone()));
    let message_service = MessageServiceImpl::new(
        Arc::new(PgMessageRepository::new(state.db.clone())),
        match_repo.clone(),
        state.snowflake.clone(),
    );

    message_service
        .mark_read(match_id, reader_id)
        .await
        .map_err(message_error)?;

    if let Ok(Some(m)) = match_repo.find_by_id(match_id).await {
        if let Some(other_id) = m.other_of(reader_id) {
            state.hub.send_to_student(
                other_id,
                ServerFrame::MessagesRead {
                    match_id: match_id.to_string(),
                    reader_id: reader_id.to_string(),
                },
            );
        }
    }

    Ok(())
}

async fn handle_notify_match(match_id: &str, student_id: i64, state: &AppState) -> FrameResult {
    let match_id = parse_id(match_id)?;

    let match_repo = PgMatchRepository::new(state.db.clone());
    let m = match_repo
        .find_by_id(match_id)
        .await
        .map_err(|_| ("internal_error", "Internal error".to_string()))?
        .ok_or(("match_not_found", "Match not found".to_string()))?;

    let other_id = m
        .other_of(student_id)
        .ok_or(("not_participant", "Not a participant of this match".to_string()))?;

    if !m.is_open() {
        return Err(("match_closed", "Match is closed".to_string()));
    }

    state.hub.send_to_student(
        other_id,
        ServerFrame::NewMatch(MatchPayload {
            match_id: m.id.to_string(),
            other_student_id: student_id.to_string(),
            created_at: m.created_at.to_rfc3339(),
        }),
    );

    Ok(())
}
