//! Health check handlers
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

/// Liveness probe
#[utoipa::path(
    get,
    path = "/api/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive", body = String, content_type = "text/plain")
    )
)]
pub async fn healthz() -> &'static str {
    "OK"
}

/// Build and uptime details
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    pub platform: String,
    pub uptime_seconds: u64,
}

pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        platform: format!("{:?}", state.config.server.platform).to_lowercase(),
        uptime_seconds: state.uptime_secs(),
    })
}
