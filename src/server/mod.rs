// src/server/mod.rs
//! Recipe book HTTP server
//!
//! Serves the recipe API over JSON. Repository calls are blocking SQLite
//! work and are moved off the async executor with `spawn_blocking`.

mod handlers;
mod routes;

pub use handlers::ApiError;
pub use routes::create_router;

use crate::db::{self, Backend, Repo};
use anyhow::Result;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,
    /// Path to the recipe database
    pub db_path: PathBuf,
    /// CORS allowed origins (empty = any origin)
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            db_path: PathBuf::from(db::paths::DEFAULT_DB_PATH),
            cors_allowed_origins: Vec::new(),
        }
    }
}

/// Shared server state
pub struct ServerState {
    pub config: ServerConfig,
    pub repo: Arc<dyn Repo>,
}

impl ServerState {
    /// Open (and if needed create) the configured database
    pub fn new(config: ServerConfig) -> crate::Result<Self> {
        let repo = db::create_repo(Backend::Sqlite, &config.db_path)?;
        Ok(Self::with_repo(config, repo))
    }

    /// Build state around an existing repository
    pub fn with_repo(config: ServerConfig, repo: Arc<dyn Repo>) -> Self {
        Self { config, repo }
    }
}

/// Start the recipe server and run until Ctrl-C
pub async fn run_server(config: ServerConfig) -> Result<()> {
    tracing::info!("Starting recipe book server on {}", config.bind_addr);
    tracing::info!("Database: {:?}", config.db_path);

    let bind_addr = config.bind_addr;
    let state = tokio::task::spawn_blocking(move || ServerState::new(config)).await??;
    let app = create_router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Ready to serve recipes");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown requested");
}
