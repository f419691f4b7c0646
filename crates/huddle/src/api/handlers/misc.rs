//! Health and service banner handlers.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub version: &'static str,
}

/// Service health.
pub async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
pub struct Banner {
    pub message: &'static str,
}

/// Service banner at the API root.
pub async fn service_banner() -> Json<Banner> {
    Json(Banner {
        message: "huddle relay API",
    })
}
