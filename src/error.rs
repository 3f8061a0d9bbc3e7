// Error types for the precache worker.
// Covers cache storage, bulk population, lookups, and network failures.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to open cache {name}: {reason}")]
    CacheOpen { name: String, reason: String },

    #[error("Failed to cache {url}: {reason}")]
    AddAll { url: String, reason: String },

    #[error("Cache lookup failed: {0}")]
    CacheLookup(String),

    #[error("Request method {0} is not cacheable")]
    UnsupportedMethod(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid worker state: {0}")]
    State(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, WorkerError>;
