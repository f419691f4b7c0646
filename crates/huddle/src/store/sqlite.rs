//! SQLite-backed store implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::Database;

use super::models::{Message, NewMessage, Session};
use super::{Store, StoreResult};

/// Store adapter over a SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Create a new store over an opened database.
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }

    async fn fetch_session(&self, id: &str) -> StoreResult<Session> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, mood, created_at, is_active, connected_devices FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(session)
    }

    async fn fetch_message(&self, id: &str) -> StoreResult<Message> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, session_id, kind, content, created_at, mood FROM messages WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(message)
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn create_session(&self, mood: &str) -> StoreResult<Session> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO sessions (id, mood, created_at, is_active, connected_devices)
            VALUES (?, ?, ?, 1, 0)
            "#,
        )
        .bind(&id)
        .bind(mood)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        self.fetch_session(&id).await
    }

    async fn get_session(&self, id: &str) -> StoreResult<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            "SELECT id, mood, created_at, is_active, connected_devices FROM sessions WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(session)
    }

    async fn insert_message(&self, message: NewMessage) -> StoreResult<Message> {
        let id = Uuid::new_v4().to_string();
        let created_at = Utc::now().to_rfc3339();
        let kind = message.kind.to_string();

        sqlx::query(
            r#"
            INSERT INTO messages (id, session_id, kind, content, created_at, mood)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&message.session_id)
        .bind(&kind)
        .bind(&message.content)
        .bind(&created_at)
        .bind(&message.mood)
        .execute(&self.pool)
        .await?;

        self.fetch_message(&id).await
    }

    async fn list_messages(&self, session_id: &str, limit: i64) -> StoreResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, session_id, kind, content, created_at, mood
            FROM messages
            WHERE session_id = ?
            ORDER BY created_at ASC, rowid ASC
            LIMIT ?
            "#,
        )
        .bind(session_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn increment_device_count(&self, session_id: &str, delta: i64) -> StoreResult<()> {
        sqlx::query(
            "UPDATE sessions SET connected_devices = MAX(0, connected_devices + ?) WHERE id = ?",
        )
        .bind(delta)
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MessageKind;

    async fn setup() -> SqliteStore {
        let db = Database::in_memory().await.unwrap();
        SqliteStore::new(&db)
    }

    #[tokio::test]
    async fn create_session_starts_inactive_counter() {
        let store = setup().await;

        let session = store.create_session("calm").await.unwrap();
        assert_eq!(session.mood, "calm");
        assert_eq!(session.connected_devices, 0);
        assert!(session.is_active);

        let fetched = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, session.id);
        assert_eq!(fetched.mood, "calm");
    }

    #[tokio::test]
    async fn get_session_unknown_id_is_none() {
        let store = setup().await;
        assert!(store.get_session("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn messages_listed_in_insertion_order() {
        let store = setup().await;
        let session = store.create_session("wise").await.unwrap();

        for i in 0..3 {
            store
                .insert_message(NewMessage {
                    session_id: session.id.clone(),
                    kind: MessageKind::User,
                    content: format!("msg {}", i),
                    mood: Some(session.mood.clone()),
                })
                .await
                .unwrap();
        }

        let messages = store.list_messages(&session.id, 100).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "msg 0");
        assert_eq!(messages[2].content, "msg 2");
        assert_eq!(messages[0].kind, MessageKind::User);
        assert_eq!(messages[0].mood.as_deref(), Some("wise"));
    }

    #[tokio::test]
    async fn list_messages_respects_limit_and_session() {
        let store = setup().await;
        let a = store.create_session("happy").await.unwrap();
        let b = store.create_session("calm").await.unwrap();

        for session in [&a, &b] {
            store
                .insert_message(NewMessage {
                    session_id: session.id.clone(),
                    kind: MessageKind::System,
                    content: "hello".to_string(),
                    mood: None,
                })
                .await
                .unwrap();
        }

        let messages = store.list_messages(&a.id, 100).await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].session_id, a.id);

        let limited = store.list_messages(&a.id, 0).await.unwrap();
        assert!(limited.is_empty());
    }

    #[tokio::test]
    async fn device_counter_never_goes_negative() {
        let store = setup().await;
        let session = store.create_session("energetic").await.unwrap();

        store.increment_device_count(&session.id, 1).await.unwrap();
        store.increment_device_count(&session.id, 1).await.unwrap();
        store.increment_device_count(&session.id, -1).await.unwrap();
        let fetched = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.connected_devices, 1);

        // Extra leaves clamp at zero instead of underflowing.
        store.increment_device_count(&session.id, -1).await.unwrap();
        store.increment_device_count(&session.id, -1).await.unwrap();
        let fetched = store.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(fetched.connected_devices, 0);
    }
}
