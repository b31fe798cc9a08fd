//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → handlers.rs (/mcp: decode envelope, resolve credentials, dispatch)
//!     → oauth.rs (/oauth/start, /oauth/callback)
//!     → request.rs (X-User-Id → stored credential pair)
//!     → response.rs (plain-text errors, JSON-RPC bodies)
//! ```

pub mod handlers;
pub mod oauth;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_USER_ID;
pub use server::{AppState, HttpServer};
