//! Pokédex HTTP server
//!
//! Serves the record service over a JSON API built with warp:
//! - `/api/pokemon` catalog routes (see [`routes`])
//! - `/api/upload` image uploads stored under the configured directory
//! - `/uploads/*` static serving of those images
//!
//! # Example
//!
//! ```rust,ignore
//! use dex_server::{ServerConfig, run};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::new().with_data_file("data/catalog.json");
//! run(config).await
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod telemetry;
pub mod upload;

pub use config::{ConfigError, LogFormat, ServerConfig};
pub use error::{ApiError, ErrorBody};
pub use routes::routes;
pub use upload::{ImageStore, UploadError, UploadedImage};

use anyhow::Context;
use dex_core::RecordService;
use dex_store::{DocumentStore, MemoryStore, StoreResult};
use std::sync::Arc;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub(crate) service: RecordService,
    pub(crate) images: ImageStore,
    pub(crate) config: Arc<ServerConfig>,
}

impl AppState {
    /// Build state around an existing service
    #[must_use]
    pub fn new(service: RecordService, config: ServerConfig) -> Self {
        Self {
            service,
            images: ImageStore::new(config.upload_dir.clone()),
            config: Arc::new(config),
        }
    }

    /// Open the configured store and build state around it
    ///
    /// # Errors
    /// Snapshot loading failures.
    pub async fn open(config: ServerConfig) -> StoreResult<Self> {
        let store: Arc<dyn DocumentStore> = match &config.data_file {
            Some(path) => Arc::new(MemoryStore::open(path.clone()).await?),
            None => {
                tracing::warn!("no data file configured; catalog is memory only");
                Arc::new(MemoryStore::new())
            }
        };
        let service = RecordService::new(store, config.service);
        Ok(Self::new(service, config))
    }

    /// Record service
    #[must_use]
    pub fn service(&self) -> &RecordService {
        &self.service
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Serve until Ctrl-C
///
/// # Errors
/// Store opening or socket binding failures.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let bind = config.bind;
    let state = AppState::open(config)
        .await
        .context("failed to open catalog store")?;

    tokio::fs::create_dir_all(state.images.dir())
        .await
        .with_context(|| format!("failed to create upload dir {}", state.images.dir().display()))?;

    let (addr, server) = warp::serve(routes(state))
        .try_bind_with_graceful_shutdown(bind, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .with_context(|| format!("failed to bind {bind}"))?;

    tracing::info!(%addr, "pokédex server listening");
    server.await;
    tracing::info!("server stopped");
    Ok(())
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
