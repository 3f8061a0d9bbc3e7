// Fetch interceptor.
// Answers requests from the worker's cache, falling back to the network.

use crate::cache::CacheStorage;
use crate::error::Result;
use crate::http::{Fetcher, Request, Response};

use super::ServiceWorker;

/// Where a response handed to the host came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Cache,
    Network,
    /// Synthetic response produced because the cache could not be read.
    Fallback,
}

/// A response together with its source.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

impl FetchOutcome {
    fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }

    pub fn is_from_cache(&self) -> bool {
        self.source == ResponseSource::Cache
    }
}

impl<S: CacheStorage, F: Fetcher> ServiceWorker<S, F> {
    /// Handle a fetch event.
    ///
    /// Always resolves once the cache has been consulted: a cache hit, the
    /// network's response on a miss, or a synthetic 503 if the lookup failed.
    /// Network failures on a miss are returned as errors.
    pub async fn on_fetch(&self, request: &Request) -> Result<FetchOutcome> {
        match self.lookup(request).await {
            Ok(Some(response)) => Ok(FetchOutcome::new(response, ResponseSource::Cache)),
            Ok(None) => self.fetch_network(request).await,
            Err(err) => {
                log::error!("Cache fetch error: {}", err);
                Ok(FetchOutcome::new(Response::fallback(), ResponseSource::Fallback))
            }
        }
    }

    /// Like `on_fetch`, but a failed cache lookup is returned as an error.
    pub async fn intercept(&self, request: &Request) -> Result<FetchOutcome> {
        match self.lookup(request).await? {
            Some(response) => Ok(FetchOutcome::new(response, ResponseSource::Cache)),
            None => self.fetch_network(request).await,
        }
    }

    async fn fetch_network(&self, request: &Request) -> Result<FetchOutcome> {
        log::debug!("Cache miss for {} {}", request.method, request.url);
        let response = self.fetcher.fetch(request).await?;
        Ok(FetchOutcome::new(response, ResponseSource::Network))
    }
}
