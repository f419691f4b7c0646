//! Signal channel: room-based passthrough for peer signaling.
//!
//! Unlike the chat channel, a signal socket is not bound to a session at
//! connect time; it joins and leaves rooms with explicit commands, holding
//! at most one membership at a time. Signal payloads bypass persistence and
//! the completion provider entirely.

use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::state::AppState;
use crate::events::{Outbound, SignalCommand, WsEvent};
use crate::registry::{ChannelId, ChannelKind, SessionRegistry};

/// Signal WebSocket upgrade handler.
///
/// GET /api/signal
pub async fn signal_ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| handle_signal_socket(socket, state))
}

async fn handle_signal_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = SessionRegistry::channel();

    let connected = match serde_json::to_string(&WsEvent::Connected) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "failed to serialize connected event");
            return;
        }
    };
    if sender.send(Message::Text(connected.into())).await.is_err() {
        return;
    }

    // Signal sockets only speak events; verbatim chat frames are not part of
    // this wire protocol.
    let send_task = tokio::spawn(async move {
        while let Some(outbound) = rx.recv().await {
            let event = match outbound {
                Outbound::Event(event) => event,
                Outbound::Frame(_) => continue,
            };
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    warn!(error = %e, "failed to serialize event");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    // At most one room at a time; a join replaces the previous membership.
    let mut membership: Option<(String, ChannelId)> = None;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<SignalCommand>(&text) {
                Ok(command) => {
                    handle_command(&state, &tx, &mut membership, command).await;
                }
                Err(e) => {
                    warn!(error = %e, "unparseable signal command");
                    let _ = tx
                        .send(Outbound::Event(WsEvent::Error {
                            message: format!("invalid command: {}", e),
                        }))
                        .await;
                }
            },
            Ok(Message::Binary(_)) => {
                debug!("ignoring binary frame on signal channel");
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
            Ok(Message::Close(_)) => {
                info!("signal channel closed by peer");
                break;
            }
            Err(e) => {
                warn!(error = %e, "signal channel error");
                break;
            }
        }
    }

    send_task.abort();
    if let Some((session_id, channel)) = membership {
        state.registry.leave(&session_id, channel).await;
    }
}

async fn handle_command(
    state: &AppState,
    tx: &mpsc::Sender<Outbound>,
    membership: &mut Option<(String, ChannelId)>,
    command: SignalCommand,
) {
    match command {
        SignalCommand::Join { session_id } => {
            if let Some((old_session, old_channel)) = membership.take() {
                state.registry.leave(&old_session, old_channel).await;
            }
            let channel = state
                .registry
                .join(&session_id, ChannelKind::Signal, tx.clone())
                .await;
            *membership = Some((session_id, channel));

            let _ = tx
                .send(Outbound::Event(WsEvent::Status {
                    message: "Joined session".to_string(),
                }))
                .await;
        }

        SignalCommand::Leave { session_id } => {
            let ours = matches!(membership.as_ref(), Some((current, _)) if *current == session_id);
            if ours {
                if let Some((session, channel)) = membership.take() {
                    state.registry.leave(&session, channel).await;
                }
            }
        }

        SignalCommand::Signal {
            session_id,
            payload,
        } => {
            // Exclude the sender only when it is actually a member of the
            // target room; a non-member's signal reaches every device there.
            let sender = membership
                .as_ref()
                .filter(|(current, _)| *current == session_id)
                .map(|(_, channel)| *channel);
            state
                .engine
                .handle_raw_signal(&session_id, payload, sender)
                .await;
        }
    }
}
