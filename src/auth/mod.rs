//! Authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Authorization: Bearer <token>
//!     → gate.rs (exempt suffix check, header extraction)
//!     → IdentityVerifier::verify (identity.rs)
//!         → LocalIdentityProvider (provider.rs)
//!         → TokenCodec (token.rs: signature, issuer, audience, expiry)
//!         → session epoch check (revocation)
//!     → SubjectId handed to the protected handler
//! ```
//!
//! # Design Decisions
//! - Verification is a black box behind a trait; the gate owns the policy
//! - All verification failures look the same to clients
//! - Account management (signup, login, logout) is a separate trait so the
//!   verifier can be swapped for an external provider on its own

pub mod gate;
pub mod identity;
pub mod provider;
pub mod token;

pub use identity::{IdentityVerifier, SubjectId, VerificationError};
pub use provider::{Account, IdentityProvider, LocalIdentityProvider, ProviderError};
pub use token::{Claims, TokenCodec};
