//! Identity provider: account management plus token verification.
//!
//! # Responsibilities
//! - Create accounts (email + password) and assign subject ids
//! - Authenticate email/password pairs
//! - Issue bearer tokens and revoke every token issued so far
//! - Verify bearer tokens for the dispatcher's auth gate
//!
//! # Design Decisions
//! - `LocalIdentityProvider` keeps accounts in memory (`DashMap`)
//! - Passwords are stored as salted SHA-256 digests, never in clear. One
//!   hash round and a plain comparison: fit for an in-process stand-in, not
//!   for real credential storage
//! - Revocation bumps a per-account session epoch; tokens carrying an older
//!   epoch stop verifying

use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::identity::{IdentityVerifier, SubjectId, VerificationError};
use crate::auth::token::TokenCodec;
use crate::config::AuthConfig;

/// Account-management failures, worded for clients.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("Email is already registered")]
    EmailAlreadyExists,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Password should be at least {0} characters")]
    WeakPassword(usize),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredential,

    /// Token signing failed; not the caller's fault.
    #[error("Authentication failed: {0}")]
    Signing(String),
}

/// Public view of a provider account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub uid: SubjectId,
    pub email: String,
}

/// Account management operations used by the auth handler.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, ProviderError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, ProviderError>;

    async fn issue_token(&self, uid: &SubjectId) -> Result<String, ProviderError>;

    /// Invalidate every token issued to `uid` so far.
    async fn revoke_sessions(&self, uid: &SubjectId) -> Result<(), ProviderError>;
}

#[derive(Debug, Clone)]
struct Credential {
    email: String,
    salt: String,
    password_hash: String,
    epoch: u64,
}

/// In-process identity provider signing HS256 tokens.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    accounts: DashMap<SubjectId, Credential>,
    by_email: DashMap<String, SubjectId>,
    tokens: TokenCodec,
    min_password_len: usize,
}

impl LocalIdentityProvider {
    pub fn new(tokens: TokenCodec, min_password_len: usize) -> Self {
        Self {
            accounts: DashMap::new(),
            by_email: DashMap::new(),
            tokens,
            min_password_len,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(TokenCodec::from_config(config), config.min_password_len)
    }

    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Single-round salted digest. Not a password KDF; swap in a slow hash
/// before storing real credentials.
fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn create_account(&self, email: &str, password: &str) -> Result<Account, ProviderError> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ProviderError::InvalidEmail);
        }
        if password.chars().count() < self.min_password_len {
            return Err(ProviderError::WeakPassword(self.min_password_len));
        }

        let uid = match self.by_email.entry(email.clone()) {
            Entry::Occupied(_) => return Err(ProviderError::EmailAlreadyExists),
            Entry::Vacant(slot) => {
                let uid = SubjectId::new(Uuid::new_v4().simple().to_string());
                let salt = Uuid::new_v4().simple().to_string();
                self.accounts.insert(
                    uid.clone(),
                    Credential {
                        email: email.clone(),
                        password_hash: hash_password(&salt, password),
                        salt,
                        epoch: 0,
                    },
                );
                slot.insert(uid.clone());
                uid
            }
        };

        tracing::info!(uid = %uid, "Account created");
        Ok(Account { uid, email })
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Account, ProviderError> {
        let email = normalize_email(email);
        let uid = self
            .by_email
            .get(&email)
            .map(|entry| entry.value().clone())
            .ok_or(ProviderError::UserNotFound)?;

        let credential = self
            .accounts
            .get(&uid)
            .map(|entry| entry.value().clone())
            .ok_or(ProviderError::UserNotFound)?;

        if hash_password(&credential.salt, password) != credential.password_hash {
            return Err(ProviderError::InvalidCredential);
        }

        Ok(Account {
            uid,
            email: credential.email,
        })
    }

    async fn issue_token(&self, uid: &SubjectId) -> Result<String, ProviderError> {
        let epoch = self
            .accounts
            .get(uid)
            .map(|entry| entry.epoch)
            .ok_or(ProviderError::UserNotFound)?;

        self.tokens
            .issue(uid, epoch)
            .map_err(|e| ProviderError::Signing(e.to_string()))
    }

    async fn revoke_sessions(&self, uid: &SubjectId) -> Result<(), ProviderError> {
        let mut credential = self
            .accounts
            .get_mut(uid)
            .ok_or(ProviderError::UserNotFound)?;
        credential.epoch += 1;

        tracing::info!(uid = %uid, epoch = credential.epoch, "Sessions revoked");
        Ok(())
    }
}

#[async_trait]
impl IdentityVerifier for LocalIdentityProvider {
    async fn verify(&self, token: &str) -> Result<SubjectId, VerificationError> {
        let claims = self.tokens.decode(token)?;
        let uid = SubjectId::new(claims.sub);

        let epoch = self
            .accounts
            .get(&uid)
            .map(|entry| entry.epoch)
            .ok_or_else(|| VerificationError::UnknownSubject(uid.to_string()))?;

        if claims.epoch != epoch {
            return Err(VerificationError::Revoked);
        }
        Ok(uid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn provider() -> LocalIdentityProvider {
        let codec = TokenCodec::new(b"test-secret", "api-gateway", "clients", Duration::from_secs(600));
        LocalIdentityProvider::new(codec, 6)
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let provider = provider();
        let account = provider.create_account("Ada@Example.com", "hunter22").await.unwrap();
        assert_eq!(account.email, "ada@example.com");

        let again = provider.authenticate("ada@example.com", "hunter22").await.unwrap();
        assert_eq!(again.uid, account.uid);

        assert_eq!(
            provider.authenticate("ada@example.com", "wrong-pass").await.unwrap_err(),
            ProviderError::InvalidCredential
        );
        assert_eq!(
            provider.authenticate("nobody@example.com", "hunter22").await.unwrap_err(),
            ProviderError::UserNotFound
        );
    }

    #[tokio::test]
    async fn test_account_rules() {
        let provider = provider();
        assert_eq!(
            provider.create_account("not-an-email", "hunter22").await.unwrap_err(),
            ProviderError::InvalidEmail
        );
        let weak = provider.create_account("a@b.co", "123").await.unwrap_err();
        assert_eq!(weak.to_string(), "Password should be at least 6 characters");

        provider.create_account("a@b.co", "hunter22").await.unwrap();
        assert_eq!(
            provider.create_account("A@B.CO", "hunter22").await.unwrap_err(),
            ProviderError::EmailAlreadyExists
        );
        assert_eq!(provider.account_count(), 1);
    }

    #[tokio::test]
    async fn test_issued_token_verifies() {
        let provider = provider();
        let account = provider.create_account("a@b.co", "hunter22").await.unwrap();
        let token = provider.issue_token(&account.uid).await.unwrap();

        assert_eq!(provider.verify(&token).await.unwrap(), account.uid);
    }

    #[tokio::test]
    async fn test_revocation_invalidates_old_tokens() {
        let provider = provider();
        let account = provider.create_account("a@b.co", "hunter22").await.unwrap();
        let old = provider.issue_token(&account.uid).await.unwrap();

        provider.revoke_sessions(&account.uid).await.unwrap();
        assert_eq!(provider.verify(&old).await.unwrap_err(), VerificationError::Revoked);

        let fresh = provider.issue_token(&account.uid).await.unwrap();
        assert_eq!(provider.verify(&fresh).await.unwrap(), account.uid);
    }

    #[tokio::test]
    async fn test_token_for_unknown_subject() {
        let codec = TokenCodec::new(b"test-secret", "api-gateway", "clients", Duration::from_secs(600));
        let token = codec.issue(&SubjectId::from("ghost"), 0).unwrap();

        let err = provider().verify(&token).await.unwrap_err();
        assert_eq!(err, VerificationError::UnknownSubject("ghost".into()));
    }

    #[tokio::test]
    async fn test_same_password_stores_distinct_digests() {
        let provider = provider();
        let a = provider.create_account("a@example.com", "shared-pass").await.unwrap();
        let b = provider.create_account("b@example.com", "shared-pass").await.unwrap();

        let digest_a = provider.accounts.get(&a.uid).unwrap().password_hash.clone();
        let digest_b = provider.accounts.get(&b.uid).unwrap().password_hash.clone();
        assert_ne!(digest_a, digest_b);
        assert_ne!(digest_a, "shared-pass");
    }
}
