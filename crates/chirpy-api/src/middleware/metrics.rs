//! File server hit counting
//!
//! Author: hephaex@gmail.com

use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Count every request that reaches the static file server
///
/// The hit is recorded before the file is served, so misses count too.
pub async fn count_fileserver_hits(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let previous = state.increment_hits();
    tracing::trace!(path = %request.uri().path(), hits = previous + 1, "File server hit");

    next.run(request).await
}
