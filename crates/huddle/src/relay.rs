//! Relay engine: the per-message state machine.
//!
//! Every inbound chat message moves through persist → complete (user kind
//! only) → broadcast. The completion call is the single suspension point;
//! it runs on the submitting channel's task and never blocks other channels
//! or sessions. A failed completion degrades into a stored and broadcast
//! `system` message — it is terminal for that inbound message but never for
//! the session.

use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use crate::completion::CompletionProvider;
use crate::events::{Outbound, WsEvent};
use crate::persona::PersonaRegistry;
use crate::registry::{ChannelId, SessionRegistry};
use crate::store::{Message, MessageKind, NewMessage, Store, StoreError};

/// Errors surfaced to callers of the relay engine.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The target session does not exist; nothing was persisted.
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Per-session relay logic, shared by the HTTP and WebSocket boundaries.
pub struct RelayEngine {
    store: Arc<dyn Store>,
    registry: Arc<SessionRegistry>,
    personas: Arc<PersonaRegistry>,
    completion: Arc<dyn CompletionProvider>,
}

impl RelayEngine {
    /// Create a new engine over its injected collaborators.
    pub fn new(
        store: Arc<dyn Store>,
        registry: Arc<SessionRegistry>,
        personas: Arc<PersonaRegistry>,
        completion: Arc<dyn CompletionProvider>,
    ) -> Self {
        Self {
            store,
            registry,
            personas,
            completion,
        }
    }

    /// Accept an inbound chat message for a session.
    ///
    /// The message is persisted with the session's mood. For `user` messages
    /// the completion provider is consulted and its reply (or a `system`
    /// message describing the failure) is persisted and broadcast to every
    /// channel in the session; that second message is returned. Other kinds
    /// are persisted and returned without a completion call or broadcast.
    pub async fn handle_inbound(
        &self,
        session_id: &str,
        kind: MessageKind,
        text: String,
    ) -> Result<Message, RelayError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or_else(|| RelayError::SessionNotFound(session_id.to_string()))?;

        let inbound = self
            .store
            .insert_message(NewMessage {
                session_id: session_id.to_string(),
                kind,
                content: text,
                mood: Some(session.mood.clone()),
            })
            .await?;

        if kind != MessageKind::User {
            debug!(session_id = %session_id, kind = %kind, "stored non-user message without relay");
            return Ok(inbound);
        }

        let persona = self.personas.lookup(&session.mood);
        let reply = match self
            .completion
            .complete(&persona.prompt, &inbound.content)
            .await
        {
            Ok(text) => NewMessage {
                session_id: session_id.to_string(),
                kind: MessageKind::Ai,
                content: text,
                mood: Some(session.mood.clone()),
            },
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "completion failed, degrading to system message");
                NewMessage {
                    session_id: session_id.to_string(),
                    kind: MessageKind::System,
                    content: format!("Error generating reply: {}", e),
                    mood: Some(session.mood),
                }
            }
        };

        let reply = self.store.insert_message(reply).await?;

        // Every device gets the reply, the submitter included.
        self.registry
            .broadcast(
                session_id,
                Outbound::Event(WsEvent::NewMessage {
                    session_id: session_id.to_string(),
                    message: reply.clone(),
                }),
                None,
            )
            .await;

        Ok(reply)
    }

    /// Fan an opaque signaling payload out to the other devices in a session.
    ///
    /// No persistence, no completion call; dead peers are pruned by the
    /// registry during delivery.
    pub async fn handle_raw_signal(
        &self,
        session_id: &str,
        payload: serde_json::Value,
        sender: Option<ChannelId>,
    ) {
        self.registry
            .broadcast(
                session_id,
                Outbound::Event(WsEvent::Signal { payload }),
                sender,
            )
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::{CompletionError, CompletionResult};
    use crate::db::Database;
    use crate::registry::ChannelKind;
    use crate::store::SqliteStore;
    use async_trait::async_trait;

    struct FixedCompletion(&'static str);

    #[async_trait]
    impl CompletionProvider for FixedCompletion {
        async fn complete(&self, _prompt: &str, _text: &str) -> CompletionResult<String> {
            Ok(self.0.to_string())
        }
    }

    struct FailingCompletion;

    #[async_trait]
    impl CompletionProvider for FailingCompletion {
        async fn complete(&self, _prompt: &str, _text: &str) -> CompletionResult<String> {
            Err(CompletionError::Empty)
        }
    }

    async fn engine_with(
        completion: Arc<dyn CompletionProvider>,
    ) -> (Arc<dyn Store>, Arc<SessionRegistry>, RelayEngine) {
        let db = Database::in_memory().await.unwrap();
        let store: Arc<dyn Store> = Arc::new(SqliteStore::new(&db));
        let registry = Arc::new(SessionRegistry::new(store.clone()));
        let engine = RelayEngine::new(
            store.clone(),
            registry.clone(),
            Arc::new(PersonaRegistry::builtin()),
            completion,
        );
        (store, registry, engine)
    }

    #[tokio::test]
    async fn user_message_yields_user_then_ai() {
        let (store, _registry, engine) = engine_with(Arc::new(FixedCompletion("sure thing"))).await;
        let session = store.create_session("calm").await.unwrap();

        let reply = engine
            .handle_inbound(&session.id, MessageKind::User, "Hello".to_string())
            .await
            .unwrap();

        assert_eq!(reply.kind, MessageKind::Ai);
        assert_eq!(reply.content, "sure thing");
        assert_eq!(reply.mood.as_deref(), Some("calm"));

        let messages = store.list_messages(&session.id, 100).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].kind, MessageKind::User);
        assert_eq!(messages[0].content, "Hello");
        assert_eq!(messages[1].id, reply.id);
    }

    #[tokio::test]
    async fn completion_failure_degrades_to_system_message() {
        let (store, _registry, engine) = engine_with(Arc::new(FailingCompletion)).await;
        let session = store.create_session("wise").await.unwrap();

        let reply = engine
            .handle_inbound(&session.id, MessageKind::User, "Hello".to_string())
            .await
            .unwrap();

        assert_eq!(reply.kind, MessageKind::System);
        assert!(!reply.content.is_empty());

        let messages = store.list_messages(&session.id, 100).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].kind, MessageKind::System);
    }

    #[tokio::test]
    async fn unknown_session_leaves_store_untouched() {
        let (store, _registry, engine) = engine_with(Arc::new(FixedCompletion("hi"))).await;

        let err = engine
            .handle_inbound("ghost", MessageKind::User, "Hello".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, RelayError::SessionNotFound(_)));

        let messages = store.list_messages("ghost", 100).await.unwrap();
        assert!(messages.is_empty());
    }

    #[tokio::test]
    async fn non_user_kind_is_persisted_without_reply_or_broadcast() {
        let (store, registry, engine) = engine_with(Arc::new(FixedCompletion("hi"))).await;
        let session = store.create_session("happy").await.unwrap();

        let (tx, mut rx) = SessionRegistry::channel();
        registry.join(&session.id, ChannelKind::Chat, tx).await;

        let stored = engine
            .handle_inbound(&session.id, MessageKind::System, "maintenance".to_string())
            .await
            .unwrap();

        assert_eq!(stored.kind, MessageKind::System);
        assert_eq!(stored.content, "maintenance");

        let messages = store.list_messages(&session.id, 100).await.unwrap();
        assert_eq!(messages.len(), 1);
        // Caller owns any fan-out for non-user kinds; nothing was broadcast.
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn reply_is_broadcast_to_all_channels_including_none_excluded() {
        let (store, registry, engine) = engine_with(Arc::new(FixedCompletion("pong"))).await;
        let session = store.create_session("calm").await.unwrap();

        let (tx_a, mut rx_a) = SessionRegistry::channel();
        let (tx_b, mut rx_b) = SessionRegistry::channel();
        registry.join(&session.id, ChannelKind::Chat, tx_a).await;
        registry.join(&session.id, ChannelKind::Signal, tx_b).await;

        engine
            .handle_inbound(&session.id, MessageKind::User, "ping".to_string())
            .await
            .unwrap();

        for rx in [&mut rx_a, &mut rx_b] {
            match rx.try_recv() {
                Ok(Outbound::Event(WsEvent::NewMessage { message, .. })) => {
                    assert_eq!(message.kind, MessageKind::Ai);
                    assert_eq!(message.content, "pong");
                }
                other => panic!("expected NewMessage broadcast, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn raw_signal_skips_persistence_and_sender() {
        let (store, registry, engine) = engine_with(Arc::new(FixedCompletion("hi"))).await;
        let session = store.create_session("calm").await.unwrap();

        let (tx_a, mut rx_a) = SessionRegistry::channel();
        let (tx_b, mut rx_b) = SessionRegistry::channel();
        let a = registry.join(&session.id, ChannelKind::Signal, tx_a).await;
        registry.join(&session.id, ChannelKind::Signal, tx_b).await;

        engine
            .handle_raw_signal(&session.id, serde_json::json!({"ice": 1}), Some(a))
            .await;

        assert!(matches!(
            rx_b.try_recv(),
            Ok(Outbound::Event(WsEvent::Signal { .. }))
        ));
        assert!(rx_a.try_recv().is_err());

        let messages = store.list_messages(&session.id, 100).await.unwrap();
        assert!(messages.is_empty());
    }
}
