//! Chirpy API - REST server
//!
//! Short-message service with password login, JWT access tokens and
//! revocable refresh tokens.

pub mod audit;
pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::Router;
use chirpy_core::{AppConfig, AuthConfig, MemoryStore, Platform};
use openapi::ApiDoc;
use state::AppState;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Access token secret used by [`create_router_for_testing`]
pub const TEST_JWT_SECRET: &str = "chirpy-test-secret";

/// Partner API key used by [`create_router_for_testing`]
pub const TEST_POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

/// Build the full application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", routes::api_routes())
        .nest("/admin", routes::admin_routes())
        .merge(routes::fileserver_routes(state.clone()))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}

/// In-memory state with fixed secrets, for tests
pub fn testing_state(platform: Platform) -> Arc<AppState> {
    testing_state_with_store(platform, Arc::new(MemoryStore::new()))
}

/// Like [`testing_state`] over a caller-held store, so tests can seed it
pub fn testing_state_with_store(platform: Platform, store: Arc<MemoryStore>) -> Arc<AppState> {
    let mut config = AppConfig {
        auth: AuthConfig::new(TEST_JWT_SECRET, TEST_POLKA_KEY),
        ..Default::default()
    };
    config.server.platform = platform;
    config.server.fileserver_root = concat!(env!("CARGO_MANIFEST_DIR"), "/assets").into();

    Arc::new(AppState::new(config, store))
}

/// Router over [`testing_state`] on the dev platform
pub fn create_router_for_testing() -> Router {
    create_router(testing_state(Platform::Dev))
}
