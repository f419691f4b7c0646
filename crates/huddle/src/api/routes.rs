//! API route definitions.

use axum::http::HeaderValue;
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::AppState;
use super::ws_chat;
use super::ws_signal;

/// Create the application router with a permissive CORS policy.
pub fn create_router(state: AppState) -> Router {
    create_router_with_config(state, &[])
}

/// Create the application router with the given allowed CORS origins.
///
/// An empty origin list means permissive CORS.
pub fn create_router_with_config(state: AppState, cors_origins: &[String]) -> Router {
    let cors = build_cors_layer(cors_origins);

    // Tracing layer with request timing
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let api_routes = Router::new()
        .route("/", get(handlers::service_banner))
        // Session management
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{session_id}", get(handlers::get_session))
        .route(
            "/sessions/{session_id}/messages",
            get(handlers::list_messages).post(handlers::post_message),
        )
        // Persona discovery
        .route("/moods", get(handlers::list_moods))
        // Real-time channels
        .route("/sessions/{session_id}/chat", get(ws_chat::chat_ws_handler))
        .route("/signal", get(ws_signal::signal_ws_handler));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes)
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
