//! Model Context Protocol surface.
//!
//! # Data Flow
//! ```text
//! POST /mcp body
//!     → protocol.rs (decode RpcRequest; -32700 on failure, done by the HTTP layer)
//!     → dispatcher.rs (Method enum → behavior)
//!     → tools (tools/call only)
//!     → RpcResponse with the request's id
//! ```

pub mod dispatcher;
pub mod protocol;

pub use dispatcher::{Dispatcher, Method, ServerIdentity, PROTOCOL_VERSION};
pub use protocol::{RequestId, RpcError, RpcRequest, RpcResponse};
