// HTTP module.
// Request/response values and the network fetcher used on cache misses.

pub mod client;
pub mod types;

pub use client::{Fetcher, HttpFetcher};
pub use types::{FALLBACK_STATUS, Request, Response};
