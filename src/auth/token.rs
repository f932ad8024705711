//! Signed bearer tokens (HS256 JWT).
//!
//! # Responsibilities
//! - Issue tokens for a subject with a fixed lifetime
//! - Check signature, issuer, audience and expiry on the way back in
//! - Carry the account's session epoch so revocation can be enforced
//!
//! # Design Decisions
//! - `jsonwebtoken` does all cryptographic work
//! - Expiry gets its own error variant; every other decode failure is
//!   reported as malformed or rejected

use std::time::Duration;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, get_current_timestamp, Algorithm, DecodingKey,
    EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::auth::identity::{SubjectId, VerificationError};
use crate::config::AuthConfig;

/// Claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub iat: u64,
    pub exp: u64,
    /// Session epoch of the account when the token was issued.
    pub epoch: u64,
}

pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(
        secret: &[u8],
        issuer: impl Into<String>,
        audience: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        let issuer = issuer.into();
        let audience = audience.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[issuer.as_str()]);
        validation.set_audience(&[audience.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            issuer,
            audience,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            config.issuer.clone(),
            config.audience.clone(),
            Duration::from_secs(config.token_ttl_secs),
        )
    }

    /// Issue a token for `subject` valid for the configured lifetime.
    pub fn issue(
        &self,
        subject: &SubjectId,
        epoch: u64,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = get_current_timestamp();
        let claims = Claims {
            sub: subject.as_str().to_string(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            iat: now,
            exp: now + self.ttl.as_secs(),
            epoch,
        };
        self.encode(&claims)
    }

    /// Sign arbitrary claims with this codec's key.
    pub fn encode(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
    }

    /// Verify a token and return its claims.
    pub fn decode(&self, token: &str) -> Result<Claims, VerificationError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => VerificationError::Expired,
                ErrorKind::InvalidToken
                | ErrorKind::Base64(_)
                | ErrorKind::Json(_)
                | ErrorKind::Utf8(_) => VerificationError::Malformed(e.to_string()),
                _ => VerificationError::Rejected(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
