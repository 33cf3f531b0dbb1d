//! Chirpy API Server
//!
//! Author: hephaex@gmail.com

use chirpy_api::{create_router, state::AppState};
use chirpy_core::config::{AppConfig, LoggingConfig};
use chirpy_core::{MemoryStore, PgStore};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("chirpy_api={},chirpy_core={},tower_http=debug", logging.level, logging.level)
            .into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("CHIRPY_CONFIG") {
        Ok(path) => AppConfig::from_file(path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_config()?;
    init_tracing(&config.logging);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        platform = ?config.server.platform,
        fileserver_root = %config.server.fileserver_root.display(),
        "Configuration loaded"
    );

    // Create application state
    let state = match config.database.url.clone() {
        Some(url) => {
            let store = PgStore::new(&url, config.database.max_connections).await?;
            store.migrate().await?;
            tracing::info!("Connected to PostgreSQL");
            AppState::new(config, Arc::new(store))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; data will not survive a restart");
            AppState::new(config, Arc::new(MemoryStore::new()))
        }
    };

    // Create router
    let app = create_router(Arc::new(state));

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Chirpy API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
