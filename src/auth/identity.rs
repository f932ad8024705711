//! Identity verification contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subject identifier vouched for by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SubjectId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SubjectId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Why a credential was rejected.
///
/// Callers only ever see "Invalid token"; the variants exist for logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("token expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("token revoked")]
    Revoked,

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

impl VerificationError {
    /// Short label used for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            VerificationError::Expired => "expired",
            VerificationError::Malformed(_) => "malformed",
            VerificationError::Rejected(_) => "rejected",
            VerificationError::Revoked => "revoked",
            VerificationError::UnknownSubject(_) => "unknown_subject",
            VerificationError::Unavailable(_) => "unavailable",
        }
    }
}

/// Verifies raw bearer credentials.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<SubjectId, VerificationError>;
}
