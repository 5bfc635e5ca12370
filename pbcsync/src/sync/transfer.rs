use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::remote::{Downloader, RemoteError};

/// Fetches a book over HTTP into `<destination>.partial`, renaming it into
/// place only once the body has been fully written.
#[derive(Clone, Default)]
pub struct HttpDownloader {
    http: Client,
}

impl HttpDownloader {
    pub fn new() -> Self {
        Self::default()
    }

    async fn download_to_path(&self, href: &str, target: &Path) -> Result<(), RemoteError> {
        let url = Url::parse(href)?;
        let response = self.http.get(url).send().await?;
        if response.status() != StatusCode::OK {
            return Err(RemoteError::Status(response.status()));
        }

        let partial = partial_path(target);
        let mut file = tokio::fs::File::create(&partial).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        file.sync_all().await?;

        tokio::fs::rename(partial, target).await?;
        Ok(())
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(
        &self,
        cancel: &CancellationToken,
        url: &str,
        destination: &Path,
    ) -> Result<(), RemoteError> {
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(RemoteError::Cancelled),
            result = self.download_to_path(url, destination) => result,
        };
        if result.is_err() {
            let _ = tokio::fs::remove_file(partial_path(destination)).await;
        }
        result
    }
}

fn partial_path(target: &Path) -> PathBuf {
    target.with_extension(format!(
        "{}partial",
        target
            .extension()
            .map(|ext| format!("{}.", ext.to_string_lossy()))
            .unwrap_or_default()
    ))
}
