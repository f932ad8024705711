//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with the dispatcher as its only handler
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Stop accepting on shutdown and drain in-flight requests

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::config::GatewayConfig;
use crate::http::request::request_id;
use crate::routing::Dispatcher;

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server in front of `dispatcher`.
    pub fn new(config: GatewayConfig, dispatcher: Arc<Dispatcher>) -> Self {
        let router = Self::build_router(dispatcher);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// Layers run outermost first: request ID is assigned before tracing
    /// opens its span, and propagated back onto the response. Body limit and
    /// timeout live in the dispatcher so every answer stays an envelope.
    fn build_router(dispatcher: Arc<Dispatcher>) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for serving or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            request_timeout_secs = self.config.timeouts.request_secs,
            max_body_size = self.config.security.max_body_size,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Per-request span carrying the correlation id.
fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        method = %request.method(),
        uri = %request.uri(),
        request_id = %request_id(request.headers()),
    )
}

/// Hands every request to the dispatcher.
async fn dispatch_handler(
    State(dispatcher): State<Arc<Dispatcher>>,
    request: Request<Body>,
) -> Response {
    dispatcher.dispatch(request).await
}
