//! Chat channel: per-session WebSocket relay.
//!
//! A chat channel binds its session at connect time and holds it for the
//! socket's lifetime. Inbound text frames are relayed verbatim to the other
//! chat channels of the session and, when they decode as a chat frame, fed
//! to the relay engine; engine output comes back through the registry as
//! serialized events.

use axum::{
    extract::{
        Path, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::events::{ChatFrame, Outbound, WsEvent};
use crate::registry::{ChannelKind, SessionRegistry};
use crate::store::Store;

/// Chat WebSocket upgrade handler.
///
/// GET /api/sessions/{session_id}/chat
pub async fn chat_ws_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    if state.store.get_session(&session_id).await?.is_none() {
        return Err(ApiError::not_found(format!(
            "Session {} not found",
            session_id
        )));
    }

    Ok(ws.on_upgrade(move |socket| handle_chat_socket(socket, state, session_id)))
}

async fn handle_chat_socket(socket: WebSocket, state: AppState, session_id: String) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = SessionRegistry::channel();
    let channel = state
        .registry
        .join(&session_id, ChannelKind::Chat, tx)
        .await;

    let connected = match serde_json::to_string(&WsEvent::Connected) {
        Ok(json) => json,
        Err(e) => {
            warn!(session_id = %session_id, error = %e, "failed to serialize connected event");
            state.registry.leave(&session_id, channel).await;
            return;
        }
    };
    if sender.send(Message::Text(connected.into())).await.is_err() {
        state.registry.leave(&session_id, channel).await;
        return;
    }

    // Drain the registry queue into the socket. Peer frames go out verbatim;
    // events are serialized here.
    let writer_session = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let text = match outbound {
                Outbound::Frame(frame) => frame,
                Outbound::Event(event) => match serde_json::to_string(&event) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(session_id = %writer_session, error = %e, "failed to serialize event");
                        continue;
                    }
                },
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let text = text.to_string();

                // Peers see the frame exactly as sent, before any engine work.
                state
                    .registry
                    .broadcast(&session_id, Outbound::Frame(text.clone()), Some(channel))
                    .await;

                match serde_json::from_str::<ChatFrame>(&text) {
                    Ok(frame) => {
                        if let Err(e) = state
                            .engine
                            .handle_inbound(&session_id, frame.kind, frame.text)
                            .await
                        {
                            warn!(session_id = %session_id, error = %e, "failed to relay chat frame");
                        }
                    }
                    Err(e) => {
                        debug!(session_id = %session_id, error = %e, "relayed undecodable chat frame");
                    }
                }
            }
            Ok(Message::Binary(_)) => {
                debug!(session_id = %session_id, "ignoring binary frame on chat channel");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!(session_id = %session_id, channel = channel, "chat channel closed by peer");
                break;
            }
            Err(e) => {
                warn!(session_id = %session_id, channel = channel, error = %e, "chat channel error");
                break;
            }
        }
    }

    send_task.abort();
    state.registry.leave(&session_id, channel).await;
}
