// Installer.
// Opens the worker's cache and pre-populates it with the configured assets.

use crate::cache::{self, Cache, CacheStorage};
use crate::error::{Result, WorkerError};
use crate::http::Fetcher;

use super::{ServiceWorker, ServiceWorkerState};

/// What an install attempt achieved.
#[derive(Debug)]
pub enum InstallOutcome {
    /// Every asset was fetched and stored.
    Populated { assets: usize },
    /// The cache could not be opened; nothing was fetched.
    OpenFailed(WorkerError),
    /// The cache opened but the bulk add failed; nothing was stored.
    PopulateFailed(WorkerError),
}

impl InstallOutcome {
    pub fn is_populated(&self) -> bool {
        matches!(self, Self::Populated { .. })
    }

    pub fn error(&self) -> Option<&WorkerError> {
        match self {
            Self::Populated { .. } => None,
            Self::OpenFailed(err) | Self::PopulateFailed(err) => Some(err),
        }
    }

    pub fn into_result(self) -> Result<usize> {
        match self {
            Self::Populated { assets } => Ok(assets),
            Self::OpenFailed(err) | Self::PopulateFailed(err) => Err(err),
        }
    }
}

impl<S: CacheStorage, F: Fetcher> ServiceWorker<S, F> {
    /// Handle the install event.
    ///
    /// Failures are logged and reported in the outcome; the install itself
    /// always completes. A fresh or installed worker ends `Installed`; an
    /// activated or redundant one refreshes its cache and keeps its state.
    pub async fn on_install(&self) -> InstallOutcome {
        let transitions = self.state().await.resets_on_install();
        if transitions {
            self.set_state(ServiceWorkerState::Installing).await;
        }
        let outcome = self.run_install().await;
        if transitions {
            self.set_state(ServiceWorkerState::Installed).await;
        }
        outcome
    }

    /// Install, returning the first failure as an error.
    pub async fn install(&self) -> Result<usize> {
        self.on_install().await.into_result()
    }

    async fn run_install(&self) -> InstallOutcome {
        let name = &self.config.cache_name;

        let cache = match self.storage.open(name).await {
            Ok(cache) => cache,
            Err(err) => {
                log::error!("Error opening cache {}: {}", name, err);
                return InstallOutcome::OpenFailed(err);
            }
        };
        log::info!("Cache {} opened.", cache.name());

        let populated = match self.config.asset_requests() {
            Ok(requests) => cache::add_all(&cache, &self.fetcher, &requests).await,
            Err(err) => Err(err),
        };

        match populated {
            Ok(assets) => {
                log::info!("Cache assets downloaded ({} assets)", assets);
                InstallOutcome::Populated { assets }
            }
            Err(err) => {
                log::error!("Error caching item: {}", err);
                InstallOutcome::PopulateFailed(err)
            }
        }
    }
}
