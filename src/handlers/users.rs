//! `/api/users`: the caller's own profile.

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::Method;

use crate::auth::SubjectId;
use crate::error::{ApiError, HandlerResult};
use crate::handlers::{ProtectedHandler, RESOURCE_NOT_FOUND};
use crate::http::{ApiRequest, ApiResponse};
use crate::store::{UserPatch, UserStore};

pub const USERS_PATH: &str = "/api/users";

const USER_NOT_FOUND: &str = "User not found";

pub struct UsersHandler {
    users: Arc<dyn UserStore>,
}

impl UsersHandler {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    async fn profile(&self, uid: &SubjectId) -> HandlerResult {
        let user = self
            .users
            .find_by_uid(uid.as_str())
            .await?
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
        ApiResponse::success(user)
    }

    async fn update_profile(&self, uid: &SubjectId, req: &ApiRequest) -> HandlerResult {
        let patch: UserPatch = req
            .json()
            .map_err(|_| ApiError::bad_request("Invalid user data"))?;

        let user = self
            .users
            .update(uid.as_str(), patch)
            .await?
            .ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))?;
        Ok(ApiResponse::success(user)?.with_message("Profile updated successfully"))
    }

    async fn delete(&self, uid: &SubjectId) -> HandlerResult {
        if !self.users.delete(uid.as_str()).await? {
            return Err(ApiError::not_found(USER_NOT_FOUND));
        }
        tracing::info!(uid = %uid, "User deleted");
        Ok(ApiResponse::empty().with_message("User deleted successfully"))
    }
}

#[async_trait]
impl ProtectedHandler for UsersHandler {
    async fn handle(&self, req: ApiRequest, subject: SubjectId) -> HandlerResult {
        if req.path() != USERS_PATH {
            return Err(ApiError::not_found(RESOURCE_NOT_FOUND));
        }

        match *req.method() {
            Method::GET => self.profile(&subject).await,
            Method::PUT => self.update_profile(&subject, &req).await,
            Method::DELETE => self.delete(&subject).await,
            _ => Err(ApiError::MethodNotAllowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderMap, StatusCode};
    use serde_json::json;

    use crate::store::{InMemoryUserStore, User};

    async fn handler_with_ada() -> UsersHandler {
        let store = Arc::new(InMemoryUserStore::new());
        store.insert(User::new("u1", "Ada", "ada@example.com")).await.unwrap();
        UsersHandler::new(store)
    }

    fn request(method: Method, path: &str, body: &'static str) -> ApiRequest {
        ApiRequest::new(method, path.parse().unwrap(), HeaderMap::new(), body)
    }

    #[tokio::test]
    async fn test_get_own_profile() {
        let handler = handler_with_ada().await;
        let resp = handler
            .handle(request(Method::GET, "/api/users", ""), SubjectId::from("u1"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.envelope().data.as_ref().unwrap()["name"], "Ada");
    }

    #[tokio::test]
    async fn test_unknown_subject_is_not_found() {
        let handler = handler_with_ada().await;
        let err = handler
            .handle(request(Method::GET, "/api/users", ""), SubjectId::from("u2"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::not_found("User not found"));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let handler = handler_with_ada().await;
        let resp = handler
            .handle(request(Method::PUT, "/api/users", r#"{"bio":"mathematician"}"#), SubjectId::from("u1"))
            .await
            .unwrap();

        let envelope = resp.envelope();
        assert_eq!(envelope.message.as_deref(), Some("Profile updated successfully"));
        assert_eq!(envelope.data.as_ref().unwrap()["bio"], json!("mathematician"));

        let err = handler
            .handle(request(Method::PUT, "/api/users", "{oops"), SubjectId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::bad_request("Invalid user data"));
    }

    #[tokio::test]
    async fn test_delete_then_missing() {
        let handler = handler_with_ada().await;
        let resp = handler
            .handle(request(Method::DELETE, "/api/users", ""), SubjectId::from("u1"))
            .await
            .unwrap();
        assert_eq!(resp.envelope().data, Some(serde_json::Value::Null));

        let err = handler
            .handle(request(Method::DELETE, "/api/users", ""), SubjectId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_secondary_dispatch() {
        let handler = handler_with_ada().await;

        let err = handler
            .handle(request(Method::POST, "/api/users", ""), SubjectId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::MethodNotAllowed);

        let err = handler
            .handle(request(Method::GET, "/api/users/u1", ""), SubjectId::from("u1"))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::not_found("Resource not found"));
    }
}
