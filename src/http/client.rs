// Network access for the worker.
// Defines the Fetcher seam and its reqwest-backed implementation.

use async_trait::async_trait;
use reqwest::{
    Client, Method, Url,
    header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT},
};

use crate::error::{Result, WorkerError};

use super::types::{Request, Response};

const DEFAULT_USER_AGENT: &str = concat!("precache-worker/", env!("CARGO_PKG_VERSION"));

/// Performs a live network fetch for a request.
///
/// Any response the server produces, including 4xx/5xx statuses, is returned
/// as `Ok`. Only transport failures are errors.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// HTTP fetcher backed by a shared reqwest client.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with the default user agent.
    pub fn new() -> Result<Self> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a fetcher sending the given user agent.
    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).map_err(|e| WorkerError::Other(e.to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(WorkerError::Network)?;

        Ok(Self { client })
    }

    /// Build the reqwest request for a worker request.
    fn build(&self, request: &Request) -> Result<reqwest::Request> {
        let url = Url::parse(&request.url).map_err(|e| WorkerError::InvalidUrl {
            url: request.url.clone(),
            reason: e.to_string(),
        })?;
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| WorkerError::UnsupportedMethod(request.method.clone()))?;

        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| WorkerError::Other(e.to_string()))?;
            let value =
                HeaderValue::from_str(value).map_err(|e| WorkerError::Other(e.to_string()))?;
            builder = builder.header(name, value);
        }

        builder.build().map_err(WorkerError::Network)
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        let built = self.build(request)?;
        let response = self.client.execute(built).await.map_err(WorkerError::Network)?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(WorkerError::Network)?;

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body: body.to_vec(),
        })
    }
}
