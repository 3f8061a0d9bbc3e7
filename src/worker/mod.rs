// Worker module.
// The service worker: one named cache, an installer and a fetch interceptor.

pub mod install;
pub mod intercept;
pub mod state;

use tokio::sync::RwLock;

use crate::cache::{Cache, CacheStorage};
use crate::config::WorkerConfig;
use crate::error::{Result, WorkerError};
use crate::http::{Fetcher, Request, Response};

pub use install::InstallOutcome;
pub use intercept::{FetchOutcome, ResponseSource};
pub use state::ServiceWorkerState;

/// A cache-first worker bound to the cache named by its config.
///
/// The host drives it: `on_install` once per installation, `activate` when the
/// host promotes it, then `on_fetch` for every request it routes through.
pub struct ServiceWorker<S, F> {
    config: WorkerConfig,
    storage: S,
    fetcher: F,
    state: RwLock<ServiceWorkerState>,
}

impl<S: CacheStorage, F: Fetcher> ServiceWorker<S, F> {
    pub fn new(config: WorkerConfig, storage: S, fetcher: F) -> Self {
        Self {
            config,
            storage,
            fetcher,
            state: RwLock::new(ServiceWorkerState::default()),
        }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn cache_name(&self) -> &str {
        &self.config.cache_name
    }

    pub async fn state(&self) -> ServiceWorkerState {
        *self.state.read().await
    }

    async fn set_state(&self, state: ServiceWorkerState) {
        *self.state.write().await = state;
    }

    /// Promote an installed worker. Old caches are left in place.
    pub async fn activate(&self) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.can_activate() {
            return Err(WorkerError::State(format!(
                "cannot activate a worker that is {}",
                *state
            )));
        }
        *state = ServiceWorkerState::Activated;
        log::info!("Worker for cache {} activated", self.config.cache_name);
        Ok(())
    }

    /// Mark the worker as replaced. Its cache is left in place.
    pub async fn retire(&self) {
        self.set_state(ServiceWorkerState::Redundant).await;
        log::info!("Worker for cache {} is redundant", self.config.cache_name);
    }

    /// Look a request up in the worker's cache without creating the cache.
    async fn lookup(&self, request: &Request) -> Result<Option<Response>> {
        let name = &self.config.cache_name;
        if !self.storage.has(name).await.map_err(as_lookup_error)? {
            return Ok(None);
        }
        let cache = self.storage.open(name).await.map_err(as_lookup_error)?;
        cache.match_request(request).await.map_err(as_lookup_error)
    }
}

fn as_lookup_error(err: WorkerError) -> WorkerError {
    match err {
        WorkerError::CacheLookup(_) => err,
        other => WorkerError::CacheLookup(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheStorage;
    use crate::testing::ScriptedFetcher;

    fn worker() -> ServiceWorker<MemoryCacheStorage, ScriptedFetcher> {
        let config = WorkerConfig::new().with_assets(Vec::<String>::new());
        ServiceWorker::new(config, MemoryCacheStorage::new(), ScriptedFetcher::new())
    }

    #[tokio::test]
    async fn test_activate_requires_install() {
        let worker = worker();
        assert_eq!(worker.state().await, ServiceWorkerState::Parsed);

        let err = worker.activate().await.unwrap_err();
        assert!(matches!(err, WorkerError::State(_)));
        assert_eq!(worker.state().await, ServiceWorkerState::Parsed);
    }

    #[tokio::test]
    async fn test_install_then_activate() {
        let worker = worker();
        worker.on_install().await;
        assert_eq!(worker.state().await, ServiceWorkerState::Installed);

        worker.activate().await.unwrap();
        assert_eq!(worker.state().await, ServiceWorkerState::Activated);
    }

    #[tokio::test]
    async fn test_retired_worker_cannot_activate() {
        let worker = worker();
        worker.on_install().await;
        worker.retire().await;

        assert_eq!(worker.state().await, ServiceWorkerState::Redundant);
        assert!(matches!(worker.activate().await, Err(WorkerError::State(_))));
    }

    #[tokio::test]
    async fn test_lookup_does_not_create_cache() {
        let worker = worker();
        let found = worker
            .lookup(&Request::get("http://localhost:8000/app.css"))
            .await
            .unwrap();

        assert!(found.is_none());
        assert!(!worker.storage().has("v2").await.unwrap());
    }
}
