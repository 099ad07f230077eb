//! Request descriptors and the pure builder that turns them into sendable requests.

use reqwest::header::{
    AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT as USER_AGENT_HEADER,
};
use reqwest::{Method, Url};
use serde::Serialize;
use std::borrow::Cow;

use crate::config::ClientConfig;
use crate::error::{Error, Result};

/// Identifier sent as `User-Agent` on every request.
pub const USER_AGENT: &str = concat!("blackroad-rust/", env!("CARGO_PKG_VERSION"));

/// Query parameters with unique keys, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Sets `key` only when `value` is present.
    pub fn insert_opt<V: ToString>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

/// What a caller wants to send, before addressing and authentication.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSpec {
    method: Method,
    path: String,
    query: QueryParams,
    body: Option<serde_json::Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: QueryParams::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    /// Attaches a JSON body. Fails with [`Error::Connection`] if `body`
    /// cannot be represented as JSON.
    pub fn with_json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body)
            .map_err(|e| Error::connection(format!("failed to serialize request body: {}", e)))?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// A fully addressed, authenticated request ready for a [`Transport`](super::Transport).
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

/// Percent-encodes one path segment, so ids containing `/`, `?` or `#`
/// stay inside their segment.
pub fn path_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::encode(segment)
}

/// Builds the request for `spec` against `config`. Performs no I/O.
pub fn build_request(spec: &RequestSpec, config: &ClientConfig) -> Result<PreparedRequest> {
    let address = format!(
        "{}/{}",
        config.base_url(),
        spec.path().trim_start_matches('/')
    );
    let mut url = Url::parse(&address)
        .map_err(|e| Error::connection(format!("invalid request URL {}: {}", address, e)))?;

    if !spec.query().is_empty() {
        url.query_pairs_mut().extend_pairs(spec.query().iter());
    }

    let body = spec
        .body()
        .map(serde_json::to_vec)
        .transpose()
        .map_err(|e| Error::connection(format!("failed to serialize request body: {}", e)))?;

    let mut auth_value = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
        .map_err(|_| Error::Authentication("API key is not a valid header value".to_string()))?;
    auth_value.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth_value);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(USER_AGENT_HEADER, HeaderValue::from_static(USER_AGENT));

    Ok(PreparedRequest {
        method: spec.method().clone(),
        url,
        headers,
        body,
    })
}
