//! Request context handed to route handlers.
//!
//! # Responsibilities
//! - Buffer the request body (bounded by the configured limit)
//! - Expose method, path, query and headers to handlers
//! - Offer the small parsing helpers handlers rely on (segments, JSON)
//!
//! # Design Decisions
//! - One `ApiRequest` per request, owned by whoever handles it
//! - Body buffered only after the auth gate passed
//! - JSON parse errors are returned raw so handlers pick their own message

use axum::{
    body::{Body, Bytes},
    http::{request::Parts, HeaderMap, Method, Uri},
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl ApiRequest {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            method,
            uri,
            headers,
            body: body.into(),
        }
    }

    /// Buffer `body` (at most `limit` bytes) and assemble the context.
    pub async fn from_parts(parts: Parts, body: Body, limit: usize) -> Result<Self, ApiError> {
        let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            ApiError::bad_request("Failed to read request body")
        })?;

        Ok(Self::new(parts.method, parts.uri, parts.headers, body))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The `index`-th `/`-delimited segment of the path, if non-empty.
    ///
    /// Index 0 is the empty segment before the leading slash, so for
    /// `/api/products/abc` index 3 is `abc`.
    pub fn segment(&self, index: usize) -> Option<&str> {
        self.path().split('/').nth(index).filter(|s| !s.is_empty())
    }

    /// Parse the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Correlation id set by the request-id layer, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
