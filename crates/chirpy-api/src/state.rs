//! Application state management
//!
//! Author: hephaex@gmail.com

use crate::auth::SessionManager;
use chirpy_core::config::AppConfig;
use chirpy_core::Store;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
pub struct AppState {
    /// Application configuration
    pub config: AppConfig,
    /// Users, chirps and refresh tokens
    pub store: Arc<dyn Store>,
    /// Login, refresh and revocation
    pub sessions: SessionManager,
    /// Server start time
    pub start_time: Instant,
    /// Requests served from `/app`
    pub fileserver_hits: AtomicU64,
}

impl AppState {
    /// Create new application state over `store`
    pub fn new<S: Store + 'static>(config: AppConfig, store: Arc<S>) -> Self {
        let sessions = SessionManager::new(store.clone(), store.clone(), config.auth.clone());

        Self {
            config,
            store,
            sessions,
            start_time: Instant::now(),
            fileserver_hits: AtomicU64::new(0),
        }
    }

    /// Count one file server hit
    pub fn increment_hits(&self) -> u64 {
        self.fileserver_hits.fetch_add(1, Ordering::SeqCst)
    }

    /// Total file server hits since start or last reset
    pub fn hits(&self) -> u64 {
        self.fileserver_hits.load(Ordering::SeqCst)
    }

    pub fn reset_hits(&self) {
        self.fileserver_hits.store(0, Ordering::SeqCst);
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
