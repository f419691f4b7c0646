//! Test utilities and common setup.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;

use huddle::api::{self, AppState};
use huddle::completion::{CompletionError, CompletionProvider, CompletionResult};
use huddle::db::Database;
use huddle::store::SqliteStore;

/// Completion double that replies with a fixed string.
pub struct FixedCompletion(pub &'static str);

#[async_trait]
impl CompletionProvider for FixedCompletion {
    async fn complete(&self, _prompt: &str, _text: &str) -> CompletionResult<String> {
        Ok(self.0.to_string())
    }
}

/// Completion double that always fails.
pub struct FailingCompletion;

#[async_trait]
impl CompletionProvider for FailingCompletion {
    async fn complete(&self, _prompt: &str, _text: &str) -> CompletionResult<String> {
        Err(CompletionError::Api {
            status: 503,
            message: "provider overloaded".to_string(),
        })
    }
}

/// Application state over an in-memory database.
pub async fn test_state(completion: Arc<dyn CompletionProvider>) -> AppState {
    let db = Database::in_memory().await.unwrap();
    let store = Arc::new(SqliteStore::new(&db));
    AppState::new(store, completion)
}

/// Router with a well-behaved completion provider.
pub async fn test_app() -> Router {
    api::create_router(test_state(Arc::new(FixedCompletion("all good"))).await)
}

/// Router whose completion provider always fails.
pub async fn test_app_failing_provider() -> Router {
    api::create_router(test_state(Arc::new(FailingCompletion)).await)
}
