//! Completion provider client module.
//!
//! Provides an async client for the external text-generation service that
//! produces persona replies.

mod client;
mod error;
mod types;

use async_trait::async_trait;

pub use client::{ChatCompletionsClient, CompletionConfig};
pub use error::{CompletionError, CompletionResult};
pub use types::*;

/// Minimal completion abstraction for testability.
///
/// Given a persona prompt and the user's text, return generated reply text.
/// Failures are typed; callers decide how to degrade (the relay engine turns
/// them into stored `system` messages).
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, persona_prompt: &str, user_text: &str) -> CompletionResult<String>;
}
