//! Resource handlers.
//!
//! # Data Flow
//! ```text
//! Dispatcher (route matched, auth gate passed)
//!     → RouteHandler::Public    → handle(request)
//!     → RouteHandler::Protected → handle(request, subject)
//!                               → handle_unverified(request)   (exempt paths)
//!     → secondary dispatch by method / path segment
//!     → store + identity provider calls
//!     → Result<ApiResponse, ApiError>
//! ```
//!
//! # Design Decisions
//! - The handler shape is a sum type fixed at registration
//! - Handlers never build error responses themselves; they return `ApiError`

pub mod auth;
pub mod products;
pub mod users;

use std::sync::Arc;

use async_trait::async_trait;

use crate::auth::gate::NO_TOKEN;
use crate::auth::SubjectId;
use crate::error::{ApiError, HandlerResult};
use crate::http::ApiRequest;

pub use auth::AuthHandler;
pub use products::ProductsHandler;
pub use users::UsersHandler;

/// Default message for paths a handler does not serve.
pub const RESOURCE_NOT_FOUND: &str = "Resource not found";

/// Handler for routes that do not require a verified identity.
#[async_trait]
pub trait PublicHandler: Send + Sync {
    async fn handle(&self, req: ApiRequest) -> HandlerResult;
}

/// Handler for routes behind the auth gate.
#[async_trait]
pub trait ProtectedHandler: Send + Sync {
    /// Called with the subject the identity verifier vouched for.
    async fn handle(&self, req: ApiRequest, subject: SubjectId) -> HandlerResult;

    /// Called for paths the auth gate exempts (login, signup).
    async fn handle_unverified(&self, _req: ApiRequest) -> HandlerResult {
        Err(ApiError::unauthorized(NO_TOKEN))
    }
}

/// A registered handler together with its calling convention.
#[derive(Clone)]
pub enum RouteHandler {
    Public(Arc<dyn PublicHandler>),
    Protected(Arc<dyn ProtectedHandler>),
}

impl RouteHandler {
    pub fn public(handler: impl PublicHandler + 'static) -> Self {
        RouteHandler::Public(Arc::new(handler))
    }

    pub fn protected(handler: impl ProtectedHandler + 'static) -> Self {
        RouteHandler::Protected(Arc::new(handler))
    }

    pub fn requires_auth(&self) -> bool {
        matches!(self, RouteHandler::Protected(_))
    }
}

impl std::fmt::Debug for RouteHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteHandler::Public(_) => f.write_str("RouteHandler::Public"),
            RouteHandler::Protected(_) => f.write_str("RouteHandler::Protected"),
        }
    }
}
