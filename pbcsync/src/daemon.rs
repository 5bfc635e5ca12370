//! Re-runs a [`Synchronizer`] forever on a fixed interval.
//!
//! Failures whose remote status is >= 500 are logged and the loop carries on
//! to the next tick. Any other failure stops the loop, as does cancellation
//! while waiting.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::sync::{SyncError, Synchronizer};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DaemonError {
    #[error("daemon interval must be greater than zero")]
    ZeroInterval,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DaemonConfig {
    interval: Duration,
}

impl DaemonConfig {
    pub fn new(interval: Duration) -> Result<Self, DaemonError> {
        if interval.is_zero() {
            return Err(DaemonError::ZeroInterval);
        }
        Ok(Self { interval })
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

pub struct Daemon<S> {
    config: DaemonConfig,
    inner: S,
}

impl<S: Synchronizer> Daemon<S> {
    pub fn new(config: DaemonConfig, inner: S) -> Self {
        Self { config, inner }
    }
}

#[async_trait]
impl<S: Synchronizer> Synchronizer for Daemon<S> {
    async fn sync(&self, cancel: &CancellationToken) -> Result<(), SyncError> {
        let mut cycle = 0u64;
        loop {
            cycle += 1;
            debug!(cycle, "sync cycle started");
            if let Err(err) = self.inner.sync(cancel).await {
                if !err.is_transient() {
                    return Err(SyncError::Cycle(Box::new(err)));
                }
                error!(cycle, error = %err, "server error");
            }

            debug!(interval = ?self.config.interval, "waiting for next cycle");
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SyncError::Cancelled),
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "daemon_tests.rs"]
mod tests;
