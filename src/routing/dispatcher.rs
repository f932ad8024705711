//! Request dispatch.
//!
//! # Responsibilities
//! - Answer `OPTIONS` preflights without touching the route table
//! - Find the first matching route, or answer 404 "Route not found"
//! - Apply the auth gate for protected routes
//! - Invoke the handler with the calling convention of its route
//! - Translate every handler failure (errors, panics, timeouts) into a response
//!
//! # Design Decisions
//! - The only place `ApiError` becomes a wire response
//! - Internal error detail is logged, never sent
//! - No shared mutable state is held across await points
//! - Body is buffered after the auth gate, so unauthenticated callers never
//!   make the gateway read their payload

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{Method, Request},
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;

use crate::auth::{gate, IdentityVerifier};
use crate::error::{ApiError, HandlerResult};
use crate::handlers::RouteHandler;
use crate::http::response::preflight;
use crate::http::{ApiRequest, ApiResponse};
use crate::observability::metrics;
use crate::routing::router::{Route, RouteTable};

pub const ROUTE_NOT_FOUND: &str = "Route not found";

/// Default cap on buffered request bodies (2 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 2 * 1024 * 1024;

/// Default bound on gate plus handler time.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Routes requests to handlers behind the auth gate.
pub struct Dispatcher {
    routes: RouteTable,
    verifier: Arc<dyn IdentityVerifier>,
    max_body_size: usize,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(routes: RouteTable, verifier: Arc<dyn IdentityVerifier>) -> Self {
        Self {
            routes,
            verifier,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Handle one request end to end.
    pub async fn dispatch(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let method = request.method().clone();

        if method == Method::OPTIONS {
            metrics::record_request(method.as_str(), 200, "preflight", start_time);
            return preflight();
        }

        let path = request.uri().path().to_string();
        let request_id = crate::http::request::request_id(request.headers()).to_string();

        let Some(route) = self.routes.match_path(&path) else {
            tracing::debug!(request_id = %request_id, method = %method, path = %path, "No route matched");
            metrics::record_request(method.as_str(), 404, "none", start_time);
            return ApiResponse::not_found(ROUTE_NOT_FOUND).into_response();
        };

        tracing::debug!(
            request_id = %request_id,
            method = %method,
            path = %path,
            route = %route.pattern(),
            "Dispatching request"
        );

        let outcome = tokio::time::timeout(self.request_timeout, self.invoke(route, request))
            .await
            .unwrap_or_else(|_| {
                Err(ApiError::internal(format!(
                    "request timed out after {:?}",
                    self.request_timeout
                )))
            });

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                if err.is_internal() {
                    tracing::error!(
                        request_id = %request_id,
                        path = %path,
                        error = %err,
                        "Route handler error"
                    );
                }
                err.to_response()
            }
        };

        metrics::record_request(
            method.as_str(),
            response.status().as_u16(),
            route.pattern(),
            start_time,
        );
        response.into_response()
    }

    /// Auth gate plus handler call, in the shape the route was registered with.
    async fn invoke(&self, route: &Route, request: Request<Body>) -> HandlerResult {
        let (parts, body) = request.into_parts();

        match route.handler() {
            RouteHandler::Public(handler) => {
                let req = ApiRequest::from_parts(parts, body, self.max_body_size).await?;
                guarded(handler.handle(req)).await
            }
            RouteHandler::Protected(handler) => {
                if gate::is_exempt(parts.uri.path()) {
                    let req = ApiRequest::from_parts(parts, body, self.max_body_size).await?;
                    return guarded(handler.handle_unverified(req)).await;
                }

                let subject = gate::authenticate(self.verifier.as_ref(), &parts.headers).await?;
                let req = ApiRequest::from_parts(parts, body, self.max_body_size).await?;
                guarded(handler.handle(req, subject)).await
            }
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.routes)
            .field("max_body_size", &self.max_body_size)
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Run a handler future, turning a panic into an internal error.
async fn guarded<F>(handler: F) -> HandlerResult
where
    F: Future<Output = HandlerResult>,
{
    match AssertUnwindSafe(handler).catch_unwind().await {
        Ok(result) => result,
        Err(panic) => Err(ApiError::internal(format!(
            "handler panicked: {}",
            panic_message(panic.as_ref())
        ))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
