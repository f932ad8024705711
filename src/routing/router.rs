//! Route table.
//!
//! # Responsibilities
//! - Store registered routes in registration order
//! - Look up the first route matching a request path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Write-once: filled during startup, read-only while serving (no locks)
//! - O(n) scan (acceptable for typical route counts)
//! - Duplicate patterns allowed; the first registered shadows the rest

use std::sync::Arc;

use crate::handlers::{ProtectedHandler, PublicHandler, RouteHandler};
use crate::routing::matcher::{self, Matcher};

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route pattern must not be empty")]
    EmptyPattern,
}

/// A registered route.
#[derive(Debug)]
pub struct Route {
    pattern: String,
    matcher: Box<dyn Matcher>,
    handler: RouteHandler,
}

impl Route {
    /// The pattern as registered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn handler(&self) -> &RouteHandler {
        &self.handler
    }

    pub fn requires_auth(&self) -> bool {
        self.handler.requires_auth()
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matcher.matches(path)
    }
}

/// Ordered collection of routes.
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route.
    pub fn register(
        &mut self,
        pattern: impl Into<String>,
        handler: RouteHandler,
    ) -> Result<(), RouteError> {
        let pattern = pattern.into();
        if pattern.is_empty() {
            return Err(RouteError::EmptyPattern);
        }

        tracing::debug!(
            pattern = %pattern,
            requires_auth = handler.requires_auth(),
            "Route registered"
        );

        self.routes.push(Route {
            matcher: matcher::compile(&pattern),
            pattern,
            handler,
        });
        Ok(())
    }

    /// Append a route reachable without a verified identity.
    pub fn public(
        &mut self,
        pattern: impl Into<String>,
        handler: Arc<dyn PublicHandler>,
    ) -> Result<(), RouteError> {
        self.register(pattern, RouteHandler::Public(handler))
    }

    /// Append a route behind the auth gate.
    pub fn protected(
        &mut self,
        pattern: impl Into<String>,
        handler: Arc<dyn ProtectedHandler>,
    ) -> Result<(), RouteError> {
        self.register(pattern, RouteHandler::Protected(handler))
    }

    /// First route (in registration order) matching `path`.
    pub fn match_path(&self, path: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.matches(path))
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
