//! CLI error types.

use folio_config::ConfigError;
use folio_server::ServeError;
use folio_site::{BuildError, DeployError};

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Serve(#[from] ServeError),

    #[error("{0}")]
    Deploy(#[from] DeployError),
}
