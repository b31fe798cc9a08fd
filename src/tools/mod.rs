//! Tool catalog and invocation.
//!
//! # Data Flow
//! ```text
//! tools/call {name, arguments}
//!     → registry.rs (name → Tool, descriptor + schema)
//!     → handlers.rs (typed arguments → TripItSession operation)
//!     → render.rs (payload or error → text content)
//!     → ToolResult {content, isError}
//! ```
//!
//! # Design Decisions
//! - `invoke` never fails; every error becomes an `isError` result
//! - Unknown tool names are answered the same way, not as protocol errors

pub mod handlers;
pub mod registry;
pub mod render;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::oauth::CredentialPair;

pub use handlers::TripItTools;
pub use registry::Tool;
pub use render::ToolError;

/// Public description of one tool, as listed by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// One block of tool output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }
}

/// Outcome of a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResult {
    pub content: Vec<ContentBlock>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentBlock::text(text)],
            is_error: true,
        }
    }

    /// All text blocks joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Resolves named tool invocations to handlers.
#[async_trait]
pub trait ToolRouter: Send + Sync {
    /// Descriptors in a stable order.
    fn list_descriptors(&self) -> Vec<ToolDescriptor>;

    /// Run `name` with `arguments` on behalf of `credentials`.
    async fn invoke(
        &self,
        name: &str,
        arguments: Value,
        credentials: Option<&CredentialPair>,
    ) -> ToolResult;
}
