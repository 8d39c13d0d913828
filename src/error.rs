//! Error types shared across the server.

use std::io;
use std::net::AddrParseError;
use std::path::{Path, PathBuf};

/// Why a static resource could not be served.
///
/// Every variant ends the static handling for the request; the dispatcher
/// then falls back to the not-found document.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("request path '{0}' does not resolve inside the static root")]
    Unresolvable(String),

    #[error("resource '{}' not found", path.display())]
    NotFound { path: PathBuf },

    #[error("resource '{}' is not a regular file", path.display())]
    NotAFile { path: PathBuf },

    #[error("failed to read '{}': {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

impl ResourceError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }

    /// Missing or unresolvable resources are routine 404s, not failures
    pub const fn is_routine(&self) -> bool {
        matches!(self, Self::Unresolvable(_) | Self::NotFound { .. })
    }
}

/// Errors that stop the server before it starts accepting connections.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    Address {
        addr: String,
        source: AddrParseError,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: io::Error,
    },

    #[error("failed to open log file: {0}")]
    Logger(io::Error),
}
