//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, headers)
//!     → dispatcher.rs (CORS short-circuit, route lookup, auth gate)
//!     → router.rs (first matching route in registration order)
//!     → matcher.rs (prefix or segment match)
//!     → handler invocation, error translation
//!
//! Route Registration (at startup):
//!     pattern + RouteHandler
//!     → compile matcher
//!     → append to RouteTable
//!     → freeze inside Dispatcher
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod dispatcher;
pub mod matcher;
pub mod router;

pub use dispatcher::Dispatcher;
pub use router::{Route, RouteError, RouteTable};
