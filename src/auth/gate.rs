//! Auth gate policy.
//!
//! Decides whether a protected route may be entered without a verified
//! identity, and turns an `Authorization` header into a subject id.

use axum::http::{header::AUTHORIZATION, HeaderMap};

use crate::auth::identity::{IdentityVerifier, SubjectId};
use crate::error::ApiError;
use crate::observability::metrics;

/// Path suffixes that skip the auth gate even on protected routes.
pub const AUTH_EXEMPT_SUFFIXES: [&str; 2] = ["/api/auth/signup", "/api/auth/login"];

pub const NO_TOKEN: &str = "No token provided";
pub const INVALID_TOKEN: &str = "Invalid token";

const BEARER_PREFIX: &str = "Bearer ";

/// True if `path` ends with one of the exempt suffixes.
pub fn is_exempt(path: &str) -> bool {
    AUTH_EXEMPT_SUFFIXES
        .iter()
        .any(|suffix| path.ends_with(suffix))
}

/// Extract the token from a `Bearer <token>` authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| ApiError::unauthorized(NO_TOKEN))
}

/// Run the bearer token through the verifier.
///
/// Every verifier failure is reported as "Invalid token"; the cause is only
/// logged.
pub async fn authenticate(
    verifier: &dyn IdentityVerifier,
    headers: &HeaderMap,
) -> Result<SubjectId, ApiError> {
    let token = match bearer_token(headers) {
        Ok(token) => token,
        Err(err) => {
            metrics::record_auth_failure("missing_token");
            return Err(err);
        }
    };

    verifier.verify(token).await.map_err(|e| {
        tracing::warn!(error = %e, "Token verification failed");
        metrics::record_auth_failure(e.reason());
        ApiError::unauthorized(INVALID_TOKEN)
    })
}
