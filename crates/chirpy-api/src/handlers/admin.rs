//! Admin handlers
//!
//! Author: hephaex@gmail.com

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::State,
    response::{Html, IntoResponse},
};
use std::sync::Arc;

/// Render the admin metrics page
pub fn metrics_page(hits: u64) -> String {
    format!(
        r#"<html>
  <body>
    <h1>Welcome, Chirpy Admin</h1>
    <p>Chirpy has been visited {hits} times!</p>
  </body>
</html>"#
    )
}

/// File server hit count
#[utoipa::path(
    get,
    path = "/admin/metrics",
    tag = "admin",
    responses(
        (status = 200, description = "HTML page with the hit count", body = String, content_type = "text/html")
    )
)]
pub async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(metrics_page(state.hits()))
}

/// Reset the hit counter and delete every user
///
/// Deleting users cascades to their chirps and refresh tokens. Only allowed
/// on the dev platform.
#[utoipa::path(
    post,
    path = "/admin/reset",
    tag = "admin",
    responses(
        (status = 200, description = "State reset", body = String, content_type = "text/plain"),
        (status = 403, description = "Not running on the dev platform", body = crate::error::ApiError),
    )
)]
pub async fn reset(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    if !state.config.server.platform.is_dev() {
        return Err(AppError::Forbidden(
            "Reset is only allowed in dev environment".to_string(),
        ));
    }

    state.reset_hits();
    state.store.delete_all_users().await?;
    tracing::warn!("Hit counter and database reset");

    Ok("Hits reset to 0 and database reset to initial state")
}
