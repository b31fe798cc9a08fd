//! TripIt MCP server library.
//!
//! Exposes the TripIt v1 REST API to tool-calling clients over JSON-RPC.
//!
//! ```text
//! caller → http → mcp::Dispatcher → tools::TripItTools
//!        → client::ResilientClient (throttle, retry) → oauth::Signer → TripIt
//! ```

// Core
pub mod client;
pub mod mcp;
pub mod oauth;
pub mod tools;

// Surfaces
pub mod http;
pub mod store;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use client::{ResilientClient, TripItError};
pub use config::AppConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use mcp::Dispatcher;
