//! Persona discovery handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::api::state::AppState;

/// A persona as exposed to clients.
#[derive(Debug, Serialize)]
pub struct MoodInfo {
    pub name: String,
    pub color: String,
    pub glyph: String,
    pub description: String,
}

/// List available mood personas in registration order.
#[instrument(skip(state))]
pub async fn list_moods(State(state): State<AppState>) -> Json<Vec<MoodInfo>> {
    let moods = state
        .personas
        .list()
        .iter()
        .map(|p| MoodInfo {
            name: p.name.clone(),
            color: p.color.clone(),
            glyph: p.glyph.clone(),
            description: p.prompt.clone(),
        })
        .collect();
    Json(moods)
}
