//! API route definitions
//!
//! Author: hephaex@gmail.com

use crate::handlers::{admin, auth, chirps, health, polka, users};
use crate::middleware::count_fileserver_hits;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::services::ServeDir;

/// Routes mounted under `/api`
///
/// Handlers that need a caller take an `AuthenticatedUser` argument, so
/// public and protected methods can share a path.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/version", get(health::version))
        // Accounts and sessions
        .route("/users", post(users::create_user).put(users::update_user))
        .route("/login", post(auth::login_handler))
        .route("/refresh", post(auth::refresh_handler))
        .route("/revoke", post(auth::revoke_handler))
        // Chirps
        .route("/chirps", post(chirps::create_chirp).get(chirps::list_chirps))
        .route(
            "/chirps/:chirp_id",
            get(chirps::get_chirp).delete(chirps::delete_chirp),
        )
        // Partner webhooks
        .route("/polka/webhooks", post(polka::polka_webhook))
}

/// Routes mounted under `/admin`
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/metrics", get(admin::metrics))
        .route("/reset", post(admin::reset))
}

/// Static files under `/app`, counted by the hit counter
pub fn fileserver_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let root = state.config.server.fileserver_root.clone();

    Router::new()
        .nest_service("/app", ServeDir::new(root))
        .layer(middleware::from_fn_with_state(state, count_fileserver_hits))
}
