//! Composition root: stores, identity, route table, dispatcher.
//!
//! Route order is the whole priority scheme: the first registered pattern
//! that matches wins, so `/api/products/:id` goes before its prefix.

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{IdentityProvider, IdentityVerifier, LocalIdentityProvider};
use crate::config::{AuthConfig, GatewayConfig};
use crate::handlers::{AuthHandler, ProductsHandler, UsersHandler};
use crate::routing::{Dispatcher, RouteError, RouteTable};
use crate::store::{InMemoryProductStore, InMemoryUserStore, ProductStore, UserStore};

/// Backing services shared by every handler.
#[derive(Clone)]
pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
    pub identity: Arc<LocalIdentityProvider>,
}

impl AppServices {
    /// In-process stores and a locally signing identity provider.
    pub fn in_memory(auth: &AuthConfig) -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            products: Arc::new(InMemoryProductStore::new()),
            identity: Arc::new(LocalIdentityProvider::from_config(auth)),
        }
    }

    fn provider(&self) -> Arc<dyn IdentityProvider> {
        self.identity.clone()
    }

    fn verifier(&self) -> Arc<dyn IdentityVerifier> {
        self.identity.clone()
    }
}

/// The gateway's route table.
pub fn build_routes(services: &AppServices) -> Result<RouteTable, RouteError> {
    let auth = Arc::new(AuthHandler::new(services.provider(), services.users.clone()));
    let users = Arc::new(UsersHandler::new(services.users.clone()));
    let products = Arc::new(ProductsHandler::new(services.products.clone()));

    let mut routes = RouteTable::new();
    routes.protected("/api/auth", auth)?;
    routes.protected("/api/users", users)?;
    routes.protected("/api/products/:id", products.clone())?;
    routes.protected("/api/products", products)?;
    Ok(routes)
}

/// Route table plus auth gate, sized by `config`.
pub fn build_dispatcher(
    config: &GatewayConfig,
    services: &AppServices,
) -> Result<Dispatcher, RouteError> {
    let routes = build_routes(services)?;
    tracing::info!(routes = routes.len(), "Route table built");

    Ok(Dispatcher::new(routes, services.verifier())
        .with_max_body_size(config.security.max_body_size)
        .with_request_timeout(Duration::from_secs(config.timeouts.request_secs)))
}
