//! Webifyx API Server
//!
//! Serves site records over HTTP. Configuration comes from `HOST`, `PORT`
//! and `STORAGE_DIR`; see [`ServerConfig::from_env`].

use tracing::info;
use webifyx_server::config::ServerConfig;
use webifyx_server::{AppState, build_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "webifyx_server=info,webifyx_core=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState::from_config(&config)?;
    let app = build_router(state);

    let addr = config.socket_addr()?;
    info!("Webifyx API server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
