//! WebSocket message types for the relay protocol.
//!
//! These types define the protocol between devices and the relay over both
//! channel kinds (chat and signal).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{Message, MessageKind};

// ============================================================================
// Events (Server -> Client)
// ============================================================================

/// Events sent from the relay to connected devices.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsEvent {
    /// Channel established.
    Connected,

    /// Acknowledgement or informational notice.
    Status { message: String },

    /// A new message was appended to the session log.
    NewMessage { session_id: String, message: Message },

    /// Opaque peer-signaling payload relayed from another device.
    Signal { payload: Value },

    /// A command could not be handled.
    Error { message: String },
}

/// Payload handed to a channel's outbound queue.
///
/// `Frame` carries a peer's chat frame verbatim; only chat sockets emit it.
/// Everything else is a [`WsEvent`] serialized at the socket.
#[derive(Debug, Clone)]
pub enum Outbound {
    Event(WsEvent),
    Frame(String),
}

// ============================================================================
// Commands (Client -> Server)
// ============================================================================

/// Commands accepted on the signal channel.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalCommand {
    /// Join a session's signal room, replacing any prior membership.
    Join { session_id: String },

    /// Leave a session's signal room.
    Leave { session_id: String },

    /// Fan an opaque payload out to the other devices in the session.
    Signal { session_id: String, payload: Value },
}

/// An inbound chat frame, as devices send it on the chat channel.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatFrame {
    /// Message kind; devices normally omit this and default to `user`.
    #[serde(default)]
    pub kind: MessageKind,
    /// Text content.
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ws_event_serializes_tagged() {
        let json = serde_json::to_value(WsEvent::Status {
            message: "Joined session".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["message"], "Joined session");
    }

    #[test]
    fn signal_command_parses_join() {
        let cmd: SignalCommand =
            serde_json::from_str(r#"{"type":"join","session_id":"s1"}"#).unwrap();
        assert!(matches!(cmd, SignalCommand::Join { session_id } if session_id == "s1"));
    }

    #[test]
    fn chat_frame_kind_defaults_to_user() {
        let frame: ChatFrame = serde_json::from_str(r#"{"text":"hello"}"#).unwrap();
        assert_eq!(frame.kind, MessageKind::User);
        assert_eq!(frame.text, "hello");
    }
}
