// Test doubles for the worker's collaborators.
// A scripted network and a cache storage that fails on demand.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::cache::{Cache, CacheStorage, MemoryCache, MemoryCacheStorage};
use crate::error::{Result, WorkerError};
use crate::http::{Fetcher, Request, Response};

/// Fetcher answering from a fixed table and counting calls.
/// URLs missing from the table fail like an unreachable host.
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: HashMap<String, Response>,
    calls: AtomicUsize,
    requested: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, response: Response) -> Self {
        self.responses.insert(url.to_string(), response);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(request.url.clone());

        self.responses
            .get(&request.url)
            .cloned()
            .ok_or_else(|| WorkerError::Other(format!("connection refused: {}", request.url)))
    }
}

/// Memory storage whose open and lookup steps can be made to fail.
#[derive(Clone, Default)]
pub struct FailingStorage {
    inner: MemoryCacheStorage,
    fail_open: Arc<AtomicBool>,
    fail_lookup: Arc<AtomicBool>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    pub fn fail_lookup(&self, fail: bool) {
        self.fail_lookup.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStorage for FailingStorage {
    type Cache = FailingCache;

    async fn open(&self, name: &str) -> Result<FailingCache> {
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(WorkerError::CacheOpen {
                name: name.to_string(),
                reason: "quota exceeded".to_string(),
            });
        }
        Ok(FailingCache {
            inner: self.inner.open(name).await?,
            fail_lookup: self.fail_lookup.clone(),
        })
    }

    async fn has(&self, name: &str) -> Result<bool> {
        self.inner.has(name).await
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        self.inner.delete(name).await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }
}

pub struct FailingCache {
    inner: MemoryCache,
    fail_lookup: Arc<AtomicBool>,
}

#[async_trait]
impl Cache for FailingCache {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn match_request(&self, request: &Request) -> Result<Option<Response>> {
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(WorkerError::CacheLookup("storage unavailable".to_string()));
        }
        self.inner.match_request(request).await
    }

    async fn put(&self, request: &Request, response: Response) -> Result<()> {
        self.inner.put(request, response).await
    }

    async fn delete(&self, request: &Request) -> Result<bool> {
        self.inner.delete(request).await
    }

    async fn keys(&self) -> Result<Vec<Request>> {
        self.inner.keys().await
    }
}
