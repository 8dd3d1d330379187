//! HTTP serving for Folio sites.
//!
//! - [`serve`] serves an already built output directory under `base_url`,
//!   falling back to the site's `404.html`.
//! - [`start`] is the dev server: it builds the site (drafts included) into
//!   `.folio/dev`, serves it, and rebuilds whenever the docs directory, the
//!   sidebar file or the config file change.
//!
//! # Quick Start
//!
//! ```ignore
//! use folio_config::Config;
//! use folio_server::{ServeOptions, serve};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(None, None)?;
//!     let options = ServeOptions::from_config(&config, config.paths.out_dir.clone());
//!     serve(options).await?;
//!     Ok(())
//! }
//! ```

mod app;
mod debouncer;
mod dev;
mod middleware;

use std::io;
use std::path::PathBuf;

use folio_config::Config;
use tokio::net::TcpListener;

pub use dev::start;

/// Error returned by [`serve`] and [`start`].
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Site directory not found: {} (run `folio build` first)", .0.display())]
    SiteNotFound(PathBuf),
    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },
    #[error("Server error: {0}")]
    Io(#[from] io::Error),
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
    #[error("Build task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// What to serve and where.
#[derive(Clone, Debug)]
pub struct ServeOptions {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Built site directory.
    pub site_dir: PathBuf,
    /// URL prefix the site is served under.
    pub base_url: String,
}

impl ServeOptions {
    /// Options for serving `site_dir` with the configured address and base URL.
    #[must_use]
    pub fn from_config(config: &Config, site_dir: PathBuf) -> Self {
        Self {
            host: config.server.host.clone(),
            port: config.server.port,
            site_dir,
            base_url: config.base_url.clone(),
        }
    }

    /// Browser URL of the site root.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, self.base_url)
    }
}

/// Serve a built site until Ctrl+C.
///
/// # Errors
///
/// Returns an error if the site directory doesn't exist, the address can't
/// be bound, or the server fails.
pub async fn serve(options: ServeOptions) -> Result<(), ServeError> {
    if !options.site_dir.is_dir() {
        return Err(ServeError::SiteNotFound(options.site_dir));
    }
    let listener = bind(&options).await?;
    let router = app::create_router(&options.site_dir, &options.base_url);
    run(listener, router).await
}

async fn bind(options: &ServeOptions) -> Result<TcpListener, ServeError> {
    TcpListener::bind((options.host.as_str(), options.port))
        .await
        .map_err(|source| ServeError::Bind {
            address: format!("{}:{}", options.host, options.port),
            source,
        })
}

async fn run(listener: TcpListener, router: axum::Router) -> Result<(), ServeError> {
    let address = listener.local_addr()?;
    tracing::info!(address = %address, "Starting server");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_options_from_config() {
        let config = Config::from_toml_str(
            r#"
title = "Tutorials"
url = "https://example.github.io"
base_url = "/tutorials/"

[server]
port = 4000
"#,
            Path::new("/project"),
        )
        .unwrap();
        let options = ServeOptions::from_config(&config, PathBuf::from("/project/build"));
        assert_eq!(options.url(), "http://127.0.0.1:4000/tutorials/");
        assert_eq!(options.site_dir, PathBuf::from("/project/build"));
    }

    #[tokio::test]
    async fn test_serve_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let options = ServeOptions {
            host: "127.0.0.1".to_owned(),
            port: 0,
            site_dir: dir.path().join("build"),
            base_url: "/".to_owned(),
        };
        let err = serve(options).await.unwrap_err();
        assert!(matches!(err, ServeError::SiteNotFound(_)));
    }
}
