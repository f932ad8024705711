//! Response envelopes.
//!
//! # Responsibilities
//! - Build the `{ success, data?, message?, error? }` JSON envelope
//! - Attach the status code the envelope is sent with
//! - Build the fixed CORS preflight response
//!
//! # Design Decisions
//! - Pure and stateless: no request data flows in here
//! - Success responses always carry `data` (possibly `null`)
//! - Error responses never carry `data`

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Wire format shared by every non-preflight response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A status code plus envelope, ready to be sent.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    status: StatusCode,
    envelope: Envelope,
}

impl ApiResponse {
    /// 200 with `data` set to the serialized value.
    pub fn success<T: Serialize>(data: T) -> Result<Self, ApiError> {
        let data = serde_json::to_value(data)
            .map_err(|e| ApiError::internal(format!("failed to serialize response data: {}", e)))?;

        Ok(Self {
            status: StatusCode::OK,
            envelope: Envelope {
                success: true,
                data: Some(data),
                message: None,
                error: None,
            },
        })
    }

    /// 200 with `data: null`.
    pub fn empty() -> Self {
        Self {
            status: StatusCode::OK,
            envelope: Envelope {
                success: true,
                data: Some(Value::Null),
                message: None,
                error: None,
            },
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.envelope.message = Some(message.into());
        self
    }

    pub fn error(message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            status,
            envelope: Envelope {
                success: false,
                data: None,
                message: None,
                error: Some(message.into()),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::error(message, StatusCode::NOT_FOUND)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Fixed answer to any `OPTIONS` request.
pub fn preflight() -> Response {
    let mut response = Response::new(Body::empty());
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    response
}
