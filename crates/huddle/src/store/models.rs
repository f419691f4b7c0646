//! Session and message data models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

/// Kind of a relayed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Typed by a device in the session.
    User,
    /// Generated by the completion provider.
    Ai,
    /// Produced by the relay itself (e.g. a failed completion).
    System,
}

impl Default for MessageKind {
    fn default() -> Self {
        Self::User
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Ai => write!(f, "ai"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "ai" => Ok(Self::Ai),
            "system" => Ok(Self::System),
            _ => Err(format!("unknown message kind: {}", s)),
        }
    }
}

// Implement conversion from String for SQLx
impl TryFrom<String> for MessageKind {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A relay session shared by multiple devices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session ID.
    pub id: String,
    /// Persona name selected at creation. Immutable afterwards.
    pub mood: String,
    /// When the session was created (RFC 3339).
    pub created_at: String,
    /// Whether the session is active.
    pub is_active: bool,
    /// Number of currently connected devices. Never negative.
    pub connected_devices: i64,
}

/// A message stored in a session's append-only log.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Unique message ID.
    pub id: String,
    /// Session this message belongs to.
    pub session_id: String,
    /// Message kind (user, ai, system).
    #[sqlx(try_from = "String")]
    pub kind: MessageKind,
    /// Text content.
    pub content: String,
    /// When the message was written (RFC 3339).
    pub created_at: String,
    /// Persona name copied from the session at write time.
    pub mood: Option<String>,
}

/// Input for appending a message to a session's log.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub session_id: String,
    pub kind: MessageKind,
    pub content: String,
    pub mood: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_kind_round_trips_through_strings() {
        for kind in [MessageKind::User, MessageKind::Ai, MessageKind::System] {
            let parsed: MessageKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, kind);
        }
    }

    #[test]
    fn message_kind_rejects_unknown() {
        assert!("robot".parse::<MessageKind>().is_err());
    }

    #[test]
    fn message_kind_defaults_to_user() {
        assert_eq!(MessageKind::default(), MessageKind::User);
    }
}
