//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tower-http layers, request ID)
//!     → routing::Dispatcher (preflight, route match, auth gate)
//!     → request.rs (buffered ApiRequest for the handler)
//!     → response.rs (JSON envelope)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ApiRequest, X_REQUEST_ID};
pub use response::{preflight, ApiResponse, Envelope};
pub use server::HttpServer;
