use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::error::SyncError;
use super::manifest::{LocalManifest, normalize_name};
use super::remote::{BookLister, Downloader, RemoteError};

/// Single-run contract shared by the engine and the daemon wrapping it.
#[async_trait]
pub trait Synchronizer: Send + Sync {
    async fn sync(&self, cancel: &CancellationToken) -> Result<(), SyncError>;
}

#[async_trait]
impl<S: Synchronizer + ?Sized> Synchronizer for Box<S> {
    async fn sync(&self, cancel: &CancellationToken) -> Result<(), SyncError> {
        (**self).sync(cancel).await
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub processed: usize,
    pub skipped: usize,
}

/// Downloads every listed book whose name is not yet present in `dir`.
pub struct SyncEngine<L, D> {
    lister: L,
    downloader: D,
    dir: PathBuf,
}

impl<L, D> SyncEngine<L, D>
where
    L: BookLister,
    D: Downloader,
{
    pub fn new(lister: L, downloader: D, dir: impl Into<PathBuf>) -> Self {
        Self {
            lister,
            downloader,
            dir: dir.into(),
        }
    }

    /// One pass: manifest, listing, then transfers in listing order.
    /// The first failed transfer aborts the pass.
    pub async fn sync_once(&self, cancel: &CancellationToken) -> Result<SyncReport, SyncError> {
        let manifest = LocalManifest::build(&self.dir).await?;
        debug!(
            dir = %self.dir.display(),
            existing = manifest.len(),
            "local manifest built"
        );

        let books = self
            .lister
            .books(cancel)
            .await
            .map_err(SyncError::RemoteListing)?;
        let mut report = SyncReport::default();
        if books.is_empty() {
            debug!("remote listing is empty");
            return Ok(report);
        }

        // The manifest is a snapshot; names fetched during this pass are
        // tracked separately so a repeated name is only fetched once.
        let mut fetched = HashSet::new();
        for book in &books {
            let normalized = normalize_name(&book.name);
            if manifest.contains_normalized(&normalized) || fetched.contains(&normalized) {
                debug!(book = %book.name, "already present, skipping");
                report.skipped += 1;
                continue;
            }

            if !is_plain_file_name(&book.name) {
                return Err(SyncError::Transfer {
                    name: book.name.clone(),
                    source: RemoteError::InvalidName(book.name.clone()),
                });
            }
            let destination = self.dir.join(&book.name);
            debug!(
                book = %book.name,
                link = %book.link,
                destination = %destination.display(),
                "downloading"
            );
            self.downloader
                .download(cancel, &book.link, &destination)
                .await
                .map_err(|source| SyncError::Transfer {
                    name: book.name.clone(),
                    source,
                })?;
            fetched.insert(normalized);
            report.processed += 1;
        }

        info!(
            processed = report.processed,
            skipped = report.skipped,
            "sync finished"
        );
        Ok(report)
    }
}

/// Exactly one normal component, so joining it stays inside the directory.
fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[async_trait]
impl<L, D> Synchronizer for SyncEngine<L, D>
where
    L: BookLister,
    D: Downloader,
{
    async fn sync(&self, cancel: &CancellationToken) -> Result<(), SyncError> {
        self.sync_once(cancel).await.map(|_| ())
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
