//! Cache-first request interception with install-time asset pre-caching.
//!
//! A [`ServiceWorker`] owns one named cache. On install it fetches a fixed list
//! of static assets and stores them; afterwards every request it sees is served
//! from that cache when possible and from the network otherwise.

pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod worker;

#[cfg(test)]
mod testing;

pub use cache::{Cache, CacheStorage, DiskCacheStorage, MemoryCacheStorage};
pub use config::{StorageConfig, WorkerConfig};
pub use error::{Result, WorkerError};
pub use http::{Fetcher, HttpFetcher, Request, Response};
pub use worker::{FetchOutcome, InstallOutcome, ResponseSource, ServiceWorker, ServiceWorkerState};
