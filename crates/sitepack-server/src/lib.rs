//! HTTP boundary for sitepack.
//!
//! Serves `GET /cgi/static/ssg/{name}`: the name is resolved to a published
//! build through a [`BuildStore`], the site is generated and the archive is
//! returned as a ZIP download.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use sitepack_server::{ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         builds_dir: PathBuf::from("builds"),
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```

mod app;
mod error;
mod handlers;
mod middleware;
mod state;
mod store;
#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use sitepack_export::{ArchiveOptions, BuildConfig, ComponentRegistry, StaticSiteBuilder};
use state::AppState;

pub use error::ServerError;
pub use store::{BuildStore, FsBuildStore, MemoryBuildStore, SCAN_LIMIT, StoreError};

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory holding build records.
    pub builds_dir: PathBuf,
    /// Generation options applied to every export.
    pub build: BuildConfig,
    /// Component registry extension document.
    pub registry: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 7980,
            builds_dir: PathBuf::from("builds"),
            build: BuildConfig::default(),
            registry: None,
        }
    }
}

/// Run the server.
///
/// # Errors
///
/// Returns an error if the component registry cannot be loaded or the
/// server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = ComponentRegistry::new();
    if let Some(path) = &config.registry {
        registry = registry.extend_from_file(path)?;
    }
    let builder = StaticSiteBuilder::new(config.build.clone()).with_registry(registry);

    let state = Arc::new(AppState {
        store: Arc::new(FsBuildStore::new(config.builds_dir.clone())),
        builder,
    });
    let app = app::create_router(state);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(address = %addr, builds_dir = %config.builds_dir.display(), "Starting server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from sitepack config.
#[must_use]
pub fn server_config_from_config(config: &sitepack_config::Config) -> ServerConfig {
    let mut archive =
        ArchiveOptions::default().with_compression_level(config.export.compression_level);
    archive.root_folder.clone_from(&config.export.root_folder);

    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        builds_dir: config.store_resolved.builds_dir.clone(),
        build: BuildConfig::default()
            .with_asset_base_url(config.export.asset_base_url.clone())
            .with_archive(archive),
        registry: config.components_resolved.registry.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_config() {
        let mut config = sitepack_config::Config::default();
        config.server.port = 9000;
        config.export.root_folder = Some("acme".to_owned());
        config.export.compression_level = 9;

        let server = server_config_from_config(&config);

        assert_eq!(server.port, 9000);
        assert_eq!(server.build.asset_base_url, "/assets/");
        assert_eq!(server.build.archive.root_folder.as_deref(), Some("acme"));
        assert_eq!(server.build.archive.compression_level, 9);
        assert!(server.registry.is_none());
    }
}
