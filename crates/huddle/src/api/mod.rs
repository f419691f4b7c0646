//! HTTP API module.
//!
//! REST endpoints for sessions, messages and personas, plus the two
//! WebSocket channels (chat and signal).

mod error;
pub mod handlers;
mod routes;
mod state;
mod ws_chat;
mod ws_signal;

pub use error::{ApiError, ApiResult, ErrorResponse};
pub use routes::{create_router, create_router_with_config};
pub use state::AppState;
