use std::io;
use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

use super::remote::RemoteError;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("read directory {}: {source}", dir.display())]
    ReadDirectory {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("get books: {0}")]
    RemoteListing(#[source] RemoteError),
    #[error("download {name:?}: {source}")]
    Transfer {
        name: String,
        #[source]
        source: RemoteError,
    },
    #[error("call sync: {0}")]
    Cycle(#[source] Box<SyncError>),
    #[error("context done: operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Status code of the remote failure behind this error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            SyncError::RemoteListing(source) | SyncError::Transfer { source, .. } => {
                source.status()
            }
            SyncError::Cycle(inner) => inner.status(),
            SyncError::ReadDirectory { .. } | SyncError::Cancelled => None,
        }
    }

    /// The remote service failed (status >= 500) rather than the request.
    pub fn is_transient(&self) -> bool {
        self.status().is_some_and(|status| status.as_u16() >= 500)
    }

    pub fn is_cancelled(&self) -> bool {
        match self {
            SyncError::Cancelled => true,
            SyncError::RemoteListing(source) | SyncError::Transfer { source, .. } => {
                matches!(source, RemoteError::Cancelled)
            }
            SyncError::Cycle(inner) => inner.is_cancelled(),
            SyncError::ReadDirectory { .. } => false,
        }
    }
}
