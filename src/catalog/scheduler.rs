//! Periodic catalog refresh.
//!
//! The scheduler runs one refresh as soon as it starts, then waits
//! `update_interval` after a success or `retry_interval` after a failure.
//! Waiting goes through a [`Clock`] so tests can drive time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;

use super::fetcher::CatalogFetcher;

#[async_trait]
pub trait Clock: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Wall clock backed by the tokio timer
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct CatalogScheduler {
    fetcher: Arc<CatalogFetcher>,
    clock: Arc<dyn Clock>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CatalogScheduler {
    pub fn new(fetcher: Arc<CatalogFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            task: Mutex::new(None),
        }
    }

    /// Spawn the refresh loop on the current tokio runtime.
    /// Returns false when it is already running.
    pub fn start(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if task.as_ref().is_some_and(|handle| !handle.is_finished()) {
            return false;
        }

        let fetcher = Arc::clone(&self.fetcher);
        let clock = Arc::clone(&self.clock);
        *task = Some(tokio::spawn(run_updates(fetcher, clock)));
        log::info!("Catalog auto-update started");
        true
    }

    /// Returns false when it was not running.
    pub fn stop(&self) -> bool {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        match task.take() {
            Some(handle) => {
                handle.abort();
                log::info!("Catalog auto-update stopped");
                true
            }
            None => false,
        }
    }

    pub fn is_running(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        task.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for CatalogScheduler {
    fn drop(&mut self) {
        if let Ok(mut task) = self.task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
            }
        }
    }
}

async fn run_updates(fetcher: Arc<CatalogFetcher>, clock: Arc<dyn Clock>) {
    loop {
        let delay = match fetcher.refresh().await {
            Ok(catalog) => {
                log::info!("Scheduled catalog update finished ({} securities)", catalog.len());
                fetcher.config().update_interval()
            }
            Err(e) => {
                log::error!("Scheduled catalog update failed: {}", e);
                fetcher.config().retry_interval()
            }
        };
        clock.sleep(delay).await;
    }
}
