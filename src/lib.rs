//! JSON API gateway library.
//!
//! A single HTTP entry point that answers CORS preflights, matches request
//! paths against an ordered route table, enforces bearer-token auth on
//! protected routes, and hands requests to the users, products and auth
//! handlers.

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod store;

pub use app::{build_dispatcher, build_routes, AppServices};
pub use config::GatewayConfig;
pub use error::{ApiError, HandlerResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::Dispatcher;
