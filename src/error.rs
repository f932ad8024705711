//! Error taxonomy shared by handlers and the dispatcher.
//!
//! Handlers return `Err(ApiError)` for every failure case; the dispatcher is
//! the only place that turns an `ApiError` into a wire response.

use axum::http::StatusCode;

use crate::auth::ProviderError;
use crate::http::response::ApiResponse;
use crate::store::StoreError;

/// Result type produced by every route handler.
pub type HandlerResult = Result<ApiResponse, ApiError>;

/// Message sent to clients for any internal failure.
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// No route, or the addressed entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid bearer token.
    #[error("{0}")]
    Unauthorized(String),

    /// Unparseable body or invalid data.
    #[error("{0}")]
    BadRequest(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Anything else. The detail is logged, never sent to the client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    /// HTTP status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message placed in the envelope's `error` field.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Internal(_) => INTERNAL_SERVER_ERROR.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ApiError::Internal(_))
    }

    /// Build the error envelope for this error.
    pub fn to_response(&self) -> ApiResponse {
        ApiResponse::error(self.public_message(), self.status())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

/// Account-management failures are the caller's fault, except signing.
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Signing(detail) => ApiError::Internal(detail),
            other => ApiError::BadRequest(other.to_string()),
        }
    }
}
