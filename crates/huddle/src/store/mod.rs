//! Durable storage for sessions and their message logs.
//!
//! The relay consumes storage through the [`Store`] trait so the engine and
//! registry can be exercised against lightweight test doubles. The shipped
//! implementation is [`SqliteStore`].

mod models;
mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

pub use models::{Message, MessageKind, NewMessage, Session};
pub use sqlite::SqliteStore;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Interface to durable session/message storage.
///
/// Messages are append-only; the device counter on a session is the only
/// mutable field and is clamped at zero by implementations.
#[async_trait]
pub trait Store: Send + Sync {
    /// Create a new session with the given mood.
    async fn create_session(&self, mood: &str) -> StoreResult<Session>;

    /// Look up a session by ID.
    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>>;

    /// Append a message to a session's log.
    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message>;

    /// List messages for a session in creation order.
    async fn list_messages(&self, session_id: &str, limit: i64) -> StoreResult<Vec<Message>>;

    /// Adjust a session's connected-device counter by `delta`.
    ///
    /// The stored value never drops below zero, even when decrements
    /// outnumber increments.
    async fn increment_device_count(&self, session_id: &str, delta: i64) -> StoreResult<()>;
}
