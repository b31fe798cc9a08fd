//! OAuth 1.0a subsystem.
//!
//! # Data Flow
//! ```text
//! ConsumerSecret (process-wide) + CredentialPair (per session)
//!     → signer.rs (base string, HMAC-SHA1, Authorization header)
//!     → every outbound provider request
//!
//! Web authorization:
//!     flow.rs: request token → authorize URL → verifier → access token
//! ```
//!
//! # Security Constraints
//! - Secrets are never logged or serialized
//! - Nonce and timestamp are fresh per request unless a source is injected

pub mod credentials;
pub mod flow;
pub mod signer;

pub use credentials::{ConsumerSecret, CredentialPair};
pub use flow::{OAuthEndpoints, OAuthFlow};
pub use signer::{FixedNonceSource, NonceSource, SignError, Signer, SystemNonceSource};
