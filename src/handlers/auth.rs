//! `/api/auth`: signup, login, logout.
//!
//! Mounted as a protected route. Signup and login are reached through the
//! auth gate's exempt suffixes; logout needs a bearer token and acts on the
//! verified subject.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::{IdentityProvider, SubjectId};
use crate::error::{ApiError, HandlerResult};
use crate::handlers::{ProtectedHandler, RESOURCE_NOT_FOUND};
use crate::http::{ApiRequest, ApiResponse};
use crate::store::{User, UserStore};

pub const SIGNUP_PATH: &str = "/api/auth/signup";
pub const LOGIN_PATH: &str = "/api/auth/login";
pub const LOGOUT_PATH: &str = "/api/auth/logout";

#[derive(Debug, Deserialize)]
struct SignupRequest {
    email: String,
    password: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginPayload {
    token: String,
    user: User,
}

pub struct AuthHandler {
    identity: Arc<dyn IdentityProvider>,
    users: Arc<dyn UserStore>,
}

impl AuthHandler {
    pub fn new(identity: Arc<dyn IdentityProvider>, users: Arc<dyn UserStore>) -> Self {
        Self { identity, users }
    }

    fn body<T: serde::de::DeserializeOwned>(req: &ApiRequest) -> Result<T, ApiError> {
        req.json().map_err(|_| ApiError::bad_request("Invalid request body"))
    }

    async fn signup(&self, req: &ApiRequest) -> HandlerResult {
        let body: SignupRequest = Self::body(req)?;

        let account = self
            .identity
            .create_account(&body.email, &body.password)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Signup rejected"))?;

        let user = self
            .users
            .insert(User::new(account.uid.as_str(), body.name, account.email))
            .await?;

        Ok(ApiResponse::success(user)?.with_message("Signup successful"))
    }

    async fn login(&self, req: &ApiRequest) -> HandlerResult {
        let body: LoginRequest = Self::body(req)?;

        let account = self
            .identity
            .authenticate(&body.email, &body.password)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Login rejected"))?;

        let user = self
            .users
            .find_by_uid(account.uid.as_str())
            .await?
            .ok_or_else(|| ApiError::bad_request("Authentication failed: User data not found"))?;

        let token = self.identity.issue_token(&account.uid).await?;

        Ok(ApiResponse::success(LoginPayload { token, user })?.with_message("Login successful"))
    }

    async fn logout(&self, subject: &SubjectId) -> HandlerResult {
        self.identity.revoke_sessions(subject).await?;
        self.users.record_logout(subject.as_str(), Utc::now()).await?;

        tracing::info!(uid = %subject, "Logged out");
        Ok(ApiResponse::empty().with_message("Logout successful"))
    }
}

fn require_post(req: &ApiRequest) -> Result<(), ApiError> {
    if *req.method() == Method::POST {
        Ok(())
    } else {
        Err(ApiError::MethodNotAllowed)
    }
}

#[async_trait]
impl ProtectedHandler for AuthHandler {
    async fn handle(&self, req: ApiRequest, subject: SubjectId) -> HandlerResult {
        match req.path() {
            LOGOUT_PATH => {
                require_post(&req)?;
                self.logout(&subject).await
            }
            _ => Err(ApiError::not_found(RESOURCE_NOT_FOUND)),
        }
    }

    async fn handle_unverified(&self, req: ApiRequest) -> HandlerResult {
        match req.path() {
            SIGNUP_PATH => {
                require_post(&req)?;
                self.signup(&req).await
            }
            LOGIN_PATH => {
                require_post(&req)?;
                self.login(&req).await
            }
            _ => Err(ApiError::not_found(RESOURCE_NOT_FOUND)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::HeaderMap;

    use crate::auth::{IdentityVerifier, LocalIdentityProvider, TokenCodec};
    use crate::store::InMemoryUserStore;

    struct Fixture {
        handler: AuthHandler,
        provider: Arc<LocalIdentityProvider>,
        users: Arc<InMemoryUserStore>,
    }

    fn fixture() -> Fixture {
        let codec = TokenCodec::new(b"test-secret", "api-gateway", "clients", Duration::from_secs(600));
        let provider = Arc::new(LocalIdentityProvider::new(codec, 6));
        let users = Arc::new(InMemoryUserStore::new());
        Fixture {
            handler: AuthHandler::new(provider.clone(), users.clone()),
            provider,
            users,
        }
    }

    fn post(path: &str, body: &str) -> ApiRequest {
        ApiRequest::new(Method::POST, path.parse().unwrap(), HeaderMap::new(), body.to_string())
    }

    async fn signup(fx: &Fixture) -> String {
        let resp = fx
            .handler
            .handle_unverified(post(SIGNUP_PATH, r#"{"email":"ada@example.com","password":"hunter22","name":"Ada"}"#))
            .await
            .unwrap();
        assert_eq!(resp.envelope().message.as_deref(), Some("Signup successful"));
        resp.envelope().data.as_ref().unwrap()["uid"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_signup_creates_profile() {
        let fx = fixture();
        let uid = signup(&fx).await;

        let user = fx.users.find_by_uid(&uid).await.unwrap().unwrap();
        assert_eq!(user.name, "Ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn test_signup_errors_are_bad_requests() {
        let fx = fixture();
        signup(&fx).await;

        let err = fx
            .handler
            .handle_unverified(post(SIGNUP_PATH, r#"{"email":"ada@example.com","password":"hunter22","name":"Ada"}"#))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::bad_request("Email is already registered"));

        let err = fx
            .handler
            .handle_unverified(post(SIGNUP_PATH, r#"{"email":"x@y.z"}"#))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::bad_request("Invalid request body"));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let fx = fixture();
        let uid = signup(&fx).await;

        let resp = fx
            .handler
            .handle_unverified(post(LOGIN_PATH, r#"{"email":"ada@example.com","password":"hunter22"}"#))
            .await
            .unwrap();
        let data = resp.envelope().data.clone().unwrap();
        assert_eq!(data["user"]["uid"], uid.as_str());

        let token = data["token"].as_str().unwrap();
        assert_eq!(fx.provider.verify(token).await.unwrap().as_str(), uid);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let fx = fixture();
        signup(&fx).await;

        let err = fx
            .handler
            .handle_unverified(post(LOGIN_PATH, r#"{"email":"ada@example.com","password":"nope-nope"}"#))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::bad_request("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_logout_revokes_tokens() {
        let fx = fixture();
        let uid = SubjectId::new(signup(&fx).await);
        let token = fx.provider.issue_token(&uid).await.unwrap();

        let resp = fx.handler.handle(post(LOGOUT_PATH, ""), uid.clone()).await.unwrap();
        assert_eq!(resp.envelope().message.as_deref(), Some("Logout successful"));

        assert!(fx.provider.verify(&token).await.is_err());
        let user = fx.users.find_by_uid(uid.as_str()).await.unwrap().unwrap();
        assert!(user.last_logout.is_some());
    }

    #[tokio::test]
    async fn test_method_and_path_checks() {
        let fx = fixture();
        let get_login = ApiRequest::new(Method::GET, LOGIN_PATH.parse().unwrap(), HeaderMap::new(), "");
        assert_eq!(
            fx.handler.handle_unverified(get_login).await.unwrap_err(),
            ApiError::MethodNotAllowed
        );

        let err = fx
            .handler
            .handle(post("/api/auth/refresh", ""), SubjectId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::not_found("Resource not found"));
    }
}
