use std::io;
use std::path::PathBuf;

use block_contract::RegistryError;
use thiserror::Error;

/// Startup failures of the dashboard server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested `host:port`.
        addr: String,
        /// Underlying socket error.
        source: io::Error,
    },
    /// The configuration document could not be read.
    #[error("failed to read config {}: {source}", path.display())]
    ConfigRead {
        /// Document path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The configuration document is not valid YAML for the dashboard schema.
    #[error("failed to parse config {}: {source}", path.display())]
    ConfigParse {
        /// Document path.
        path: PathBuf,
        /// Parser error.
        source: serde_yaml::Error,
    },
    /// The built-in block registry could not be assembled.
    #[error(transparent)]
    Registry(#[from] RegistryError),
    /// Any other socket failure while serving.
    #[error(transparent)]
    Io(#[from] io::Error),
}
