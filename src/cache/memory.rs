// In-memory cache storage.
// Same contract as the disk backend, without persistence.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, WorkerError};
use crate::http::{Request, Response};

use super::{Cache, CacheStorage};

type Entries = Arc<RwLock<HashMap<String, (Request, Response)>>>;

/// Named caches held in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    caches: Arc<RwLock<HashMap<String, Entries>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    type Cache = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache> {
        let mut caches = self.caches.write().await;
        let entries = caches.entry(name.to_string()).or_default().clone();
        Ok(MemoryCache {
            name: name.to_string(),
            entries,
        })
    }

    async fn has(&self, name: &str) -> Result<bool> {
        Ok(self.caches.read().await.contains_key(name))
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.caches.write().await.remove(name).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.caches.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Handle to one in-memory cache.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    name: String,
    entries: Entries,
}

impl MemoryCache {
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }
        let entries = self.entries.read().await;
        Ok(entries
            .get(&request.cache_key())
            .map(|(_, response)| response.clone()))
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        if !request.is_get() {
            return Err(WorkerError::UnsupportedMethod(request.method.clone()));
        }
        self.entries
            .write()
            .await
            .insert(request.cache_key(), (request.clone(), response));
        Ok(())
    }

    async fn delete(&self, request: &Request) -> Result<bool> {
        Ok(self
            .entries
            .write()
            .await
            .remove(&request.cache_key())
            .is_some())
    }

    async fn keys(&self) -> Result<Vec<Request>> {
        let mut requests: Vec<Request> = self
            .entries
            .read()
            .await
            .values()
            .map(|(request, _)| request.clone())
            .collect();
        requests.sort_by(|a, b| a.url.cmp(&b.url));
        Ok(requests)
    }

    async fn put_all(&self, entries: Vec<(Request, Response)>) -> Result<()> {
        if let Some((request, _)) = entries.iter().find(|(request, _)| !request.is_get()) {
            return Err(WorkerError::UnsupportedMethod(request.method.clone()));
        }
        let mut map = self.entries.write().await;
        for (request, response) in entries {
            map.insert(request.cache_key(), (request, response));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_is_idempotent() {
        let storage = MemoryCacheStorage::new();
        let first = storage.open("v2").await.unwrap();
        first
            .put(&Request::get("http://localhost/app.css"), Response::new(200, "a"))
            .await
            .unwrap();

        let second = storage.open("v2").await.unwrap();
        assert_eq!(second.len().await, 1);
        assert_eq!(storage.keys().await.unwrap(), vec!["v2"]);
    }

    #[tokio::test]
    async fn test_caches_are_isolated_by_name() {
        let storage = MemoryCacheStorage::new();
        let v1 = storage.open("v1").await.unwrap();
        let v2 = storage.open("v2").await.unwrap();

        let request = Request::get("http://localhost/index.html");
        v1.put(&request, Response::new(200, "old")).await.unwrap();

        assert!(v2.match_request(&request).await.unwrap().is_none());
        assert!(v2.is_empty().await);
    }

    #[tokio::test]
    async fn test_put_all_rejects_non_get_atomically() {
        let storage = MemoryCacheStorage::new();
        let cache = storage.open("v2").await.unwrap();

        let err = cache
            .put_all(vec![
                (Request::get("http://localhost/a"), Response::new(200, "")),
                (Request::new("PUT", "http://localhost/b"), Response::new(200, "")),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, WorkerError::UnsupportedMethod(_)));
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_delete_cache() {
        let storage = MemoryCacheStorage::new();
        storage.open("v2").await.unwrap();
        assert!(storage.has("v2").await.unwrap());
        assert!(storage.delete("v2").await.unwrap());
        assert!(!storage.has("v2").await.unwrap());
    }
}
