//! Error taxonomy shared by every deployment step.

use std::path::PathBuf;

use crate::contract::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    /// Reading the local tree failed (missing root, unreadable file, broken symlink).
    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// Object keys are strings, so every path component must be valid UTF-8.
    #[error("path {} is not valid UTF-8", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("{} is not below the sync root", .0.display())]
    OutsideRoot(PathBuf),

    #[error("invalid domain name {0:?}")]
    InvalidDomain(String),

    #[error("no hosted zone matches {0}")]
    ZoneNotFound(String),

    #[error("no S3 website endpoint is known for region {0}")]
    UnknownRegion(String),

    /// The provider rejected a call. The underlying error is passed through untouched.
    #[error("{operation} failed: {source}")]
    Provider {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl DeployError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| DeployError::Io { path, source }
    }

    pub(crate) fn provider(operation: &'static str) -> impl FnOnce(ProviderError) -> Self {
        move |source| DeployError::Provider { operation, source }
    }
}
