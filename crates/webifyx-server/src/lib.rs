//! Webifyx site API
//!
//! HTTP persistence for sites edited with `webifyx-core`:
//!
//! - `GET    /api/sites`       list site ids
//! - `GET    /api/sites/{id}`  fetch a site
//! - `PUT    /api/sites/{id}`  update name, content or publish state
//! - `DELETE /api/sites/{id}`  delete a site
//! - `GET    /health`          liveness check

pub mod config;
pub mod error;
pub mod response;
pub mod routes;
pub mod seed;

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use webifyx_core::{FileStorage, MemoryStorage, Storage, StorageResult};

use crate::config::ServerConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Pick the storage backend from the configuration.
    pub fn from_config(config: &ServerConfig) -> StorageResult<Self> {
        let storage: Arc<dyn Storage> = match &config.storage_dir {
            Some(dir) => {
                tracing::info!("Storing sites in {}", dir.display());
                Arc::new(FileStorage::new(dir.clone())?)
            }
            None => {
                tracing::info!("Storing sites in memory");
                Arc::new(MemoryStorage::with_sites(seed::sample_sites()))
            }
        };
        Ok(Self::new(storage))
    }
}

/// Build the application router with CORS and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::router())
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check
async fn health() -> &'static str {
    "ok"
}
