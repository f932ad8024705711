//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build services → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C → Shutdown::trigger → server stops accepting → in-flight drain → Exit
//! ```

pub mod shutdown;

pub use shutdown::{ctrl_c, Shutdown};
