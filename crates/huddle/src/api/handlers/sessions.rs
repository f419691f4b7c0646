//! Session and message handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::store::{Message, MessageKind, Session, Store};

/// Default number of messages returned by the history endpoint.
const DEFAULT_MESSAGE_LIMIT: i64 = 100;

/// Request to create a new session.
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Mood persona for the session.
    pub mood: String,
}

/// Request to post a message to a session.
#[derive(Debug, Deserialize)]
pub struct PostMessageRequest {
    /// Text content.
    pub content: String,
    /// Message kind; defaults to `user`.
    #[serde(default)]
    pub kind: MessageKind,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    pub limit: Option<i64>,
}

/// Create a new session with the given mood.
#[instrument(skip(state))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> ApiResult<(StatusCode, Json<Session>)> {
    let session = state.store.create_session(&request.mood).await?;
    info!(session_id = %session.id, mood = %session.mood, "created session");
    Ok((StatusCode::CREATED, Json(session)))
}

/// Get a session by ID.
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Session>> {
    if let Some(session) = state.store.get_session(&session_id).await? {
        return Ok(Json(session));
    }

    Err(ApiError::not_found(format!(
        "Session {} not found",
        session_id
    )))
}

/// List a session's messages in creation order.
#[instrument(skip(state))]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> ApiResult<Json<Vec<Message>>> {
    if state.store.get_session(&session_id).await?.is_none() {
        return Err(ApiError::not_found(format!(
            "Session {} not found",
            session_id
        )));
    }

    let limit = query.limit.unwrap_or(DEFAULT_MESSAGE_LIMIT);
    let messages = state.store.list_messages(&session_id, limit).await?;
    Ok(Json(messages))
}

/// Post a message to a session.
///
/// User messages trigger a completion; the reply (ai, or system on provider
/// failure) is what comes back. Other kinds echo the stored message.
#[instrument(skip(state, request), fields(kind = %request.kind))]
pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<PostMessageRequest>,
) -> ApiResult<Json<Message>> {
    let message = state
        .engine
        .handle_inbound(&session_id, request.kind, request.content)
        .await?;
    info!(session_id = %session_id, message_id = %message.id, kind = %message.kind, "handled message");
    Ok(Json(message))
}
