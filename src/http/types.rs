// Request and response types.
// Plain values describing one HTTP exchange, serializable for the disk cache.

use serde::{Deserialize, Serialize};

/// Status used for the synthetic response when the cache cannot be read.
pub const FALLBACK_STATUS: u16 = 503;

/// An outgoing request observed by the worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub method: String,
    /// Absolute URL.
    pub url: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn is_get(&self) -> bool {
        self.method == "GET"
    }

    /// Key used to identify the request inside a cache.
    /// Headers do not take part in matching.
    pub fn cache_key(&self) -> String {
        format!("{} {}", self.method, self.url)
    }
}

/// A response snapshot, either live from the network or read back from a cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
    #[serde(with = "body_base64")]
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            status_text: String::new(),
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = text.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Synthetic response handed back when the cache lookup itself fails.
    pub fn fallback() -> Self {
        Self::new(FALLBACK_STATUS, "Service Unavailable")
            .with_status_text("Service Unavailable")
            .with_header("content-type", "text/plain; charset=utf-8")
    }

    /// True for 2xx statuses.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

mod body_base64 {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_normalized() {
        let request = Request::new("get", "http://localhost/app.css");
        assert!(request.is_get());
        assert_eq!(request.cache_key(), "GET http://localhost/app.css");
    }

    #[test]
    fn test_headers_do_not_affect_key() {
        let plain = Request::get("http://localhost/index.html");
        let with_header = plain.clone().with_header("accept", "text/html");
        assert_eq!(plain.cache_key(), with_header.cache_key());
    }

    #[test]
    fn test_fallback_response() {
        let response = Response::fallback();
        assert_eq!(response.status, FALLBACK_STATUS);
        assert!(!response.is_ok());
        assert_eq!(
            response.header("Content-Type"),
            Some("text/plain; charset=utf-8")
        );
    }

    #[test]
    fn test_body_is_base64_in_json() {
        let response = Response::new(200, vec![0u8, 159, 146, 150]);
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["body"], "AJ+Slg==");

        let parsed: Response = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, response);
    }
}
