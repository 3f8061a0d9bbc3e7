// Cache module.
// Named request/response stores and the bulk add used to pre-populate them.

pub mod memory;
pub mod paths;
pub mod store;

use async_trait::async_trait;

use crate::error::{Result, WorkerError};
use crate::http::{Fetcher, Request, Response};

pub use memory::{MemoryCache, MemoryCacheStorage};
pub use store::{CacheEntry, CachedData, DiskCache, DiskCacheStorage};

/// The collection of named caches available to a worker.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    type Cache: Cache;

    /// Open a cache by name, creating it if absent.
    async fn open(&self, name: &str) -> Result<Self::Cache>;

    async fn has(&self, name: &str) -> Result<bool>;

    /// Delete a cache and all its entries. Returns whether it existed.
    async fn delete(&self, name: &str) -> Result<bool>;

    /// Names of all caches, sorted.
    async fn keys(&self) -> Result<Vec<String>>;
}

/// A single named store mapping requests to responses.
///
/// Only `GET` requests are stored or matched.
#[async_trait]
pub trait Cache: Send + Sync {
    fn name(&self) -> &str;

    async fn match_request(&self, request: &Request) -> Result<Option<Response>>;

    async fn put(&self, request: &Request, response: Response) -> Result<()>;

    async fn delete(&self, request: &Request) -> Result<bool>;

    async fn keys(&self) -> Result<Vec<Request>>;

    /// Store several entries. Backends that can commit in one step override this.
    async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()> {
        for (request, response) in entries {
            self.put(&request, response).await?;
        }
        Ok(())
    }
}

/// Fetch every request and store the responses.
///
/// Nothing is written unless every fetch succeeds with a 2xx status.
/// Returns the number of entries stored.
pub async fn add_all<C, F>(cache: &C, fetcher: &F, requests: &[Request]) -> Result<usize>
where
    C: Cache + ?Sized,
    F: Fetcher + ?Sized,
{
    let mut fetched = Vec::with_capacity(requests.len());

    for request in requests {
        let response = fetcher
            .fetch(request)
            .await
            .map_err(|e| WorkerError::AddAll {
                url: request.url.clone(),
                reason: e.to_string(),
            })?;

        if !response.is_ok() {
            return Err(WorkerError::AddAll {
                url: request.url.clone(),
                reason: format!("HTTP {}", response.status),
            });
        }

        fetched.push((request.clone(), response));
    }

    let count = fetched.len();
    cache.put_all(fetched).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedFetcher;

    fn requests(paths: &[&str]) -> Vec<Request> {
        paths
            .iter()
            .map(|p| Request::get(format!("http://localhost:8000/{}", p)))
            .collect()
    }

    #[tokio::test]
    async fn test_add_all_stores_every_response() {
        let fetcher = ScriptedFetcher::new()
            .respond("http://localhost:8000/app.css", Response::new(200, "css"))
            .respond("http://localhost:8000/index.html", Response::new(200, "html"));
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("v2").await.unwrap();

        let stored = add_all(&cache, &fetcher, &requests(&["app.css", "index.html"]))
            .await
            .unwrap();

        assert_eq!(stored, 2);
        assert_eq!(cache.len().await, 2);
        assert_eq!(fetcher.calls(), 2);
    }

    #[tokio::test]
    async fn test_add_all_is_all_or_nothing() {
        let fetcher = ScriptedFetcher::new()
            .respond("http://localhost:8000/app.css", Response::new(200, "css"))
            .respond("http://localhost:8000/missing.png", Response::new(404, ""));
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("v2").await.unwrap();

        let err = add_all(&cache, &fetcher, &requests(&["app.css", "missing.png"]))
            .await
            .unwrap_err();

        match err {
            WorkerError::AddAll { url, reason } => {
                assert_eq!(url, "http://localhost:8000/missing.png");
                assert_eq!(reason, "HTTP 404");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_all_network_failure() {
        // Unscripted URLs fail like an unreachable host.
        let fetcher = ScriptedFetcher::new();
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("v2").await.unwrap();

        let err = add_all(&cache, &fetcher, &requests(&["app.css"]))
            .await
            .unwrap_err();
        assert!(matches!(err, WorkerError::AddAll { .. }));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_add_all_empty_list() {
        let fetcher = ScriptedFetcher::new();
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("v2").await.unwrap();

        assert_eq!(add_all(&cache, &fetcher, &[]).await.unwrap(), 0);
        assert_eq!(fetcher.calls(), 0);
    }
}
