//! Contracts for the two remote collaborators of the sync engine: something
//! that lists the books available in the cloud and something that fetches a
//! single book to disk.

use std::io;
use std::path::Path;

use async_trait::async_trait;
use pbcloud_core::PbCloudError;
use reqwest::StatusCode;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// A remote item as listed for the current cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub name: String,
    pub link: String,
}

impl Book {
    pub fn new(name: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: link.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("{operation}: {source}")]
    Cloud {
        operation: &'static str,
        #[source]
        source: PbCloudError,
    },
    #[error("http status code: {0}")]
    Status(StatusCode),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("book name {0:?} is not a plain file name")]
    InvalidName(String),
    #[error("operation cancelled")]
    Cancelled,
}

impl RemoteError {
    pub fn cloud(operation: &'static str) -> impl FnOnce(PbCloudError) -> Self {
        move |source| RemoteError::Cloud { operation, source }
    }

    /// Status code returned by the remote service, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RemoteError::Cloud { source, .. } => source.status(),
            RemoteError::Status(status) => Some(*status),
            _ => None,
        }
    }
}

/// Remote Lister: returns the current set of books, in listing order.
#[async_trait]
pub trait BookLister: Send + Sync {
    async fn books(&self, cancel: &CancellationToken) -> Result<Vec<Book>, RemoteError>;
}

/// Item Transfer: materializes `url` at `destination` or fails.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(
        &self,
        cancel: &CancellationToken,
        url: &str,
        destination: &Path,
    ) -> Result<(), RemoteError>;
}
