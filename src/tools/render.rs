//! User-facing rendering of tool outcomes.

use serde_json::Value;
use thiserror::Error;

use crate::client::TripItError;
use crate::tools::ToolResult;

/// Why a tool invocation did not produce a payload.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: &'static str, message: String },

    #[error("No TripIt account connected")]
    NotConnected,

    #[error("{error}")]
    Api {
        error: TripItError,
        /// Identifier the call was about, for not-found messages.
        resource: Option<String>,
    },
}

impl ToolError {
    pub fn api(error: TripItError, resource: Option<&str>) -> Self {
        ToolError::Api {
            error,
            resource: resource.map(str::to_string),
        }
    }

    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool(_) => "unknown_tool",
            ToolError::InvalidArguments { .. } => "invalid_arguments",
            ToolError::NotConnected => "not_connected",
            ToolError::Api { error, .. } => error.kind(),
        }
    }
}

const REAUTHORIZE: &str = "Visit /oauth/start to connect your TripIt account.";

/// Render an error as an `isError` result. The cause is always named.
pub fn render_error(error: &ToolError) -> ToolResult {
    let text = match error {
        ToolError::UnknownTool(_) | ToolError::InvalidArguments { .. } => error.to_string(),
        ToolError::NotConnected => format!("No TripIt account is connected. {}", REAUTHORIZE),
        ToolError::Api { error, resource } => match error {
            TripItError::Authentication => format!(
                "TripIt authentication failed; the authorization may have expired or been revoked. {}",
                REAUTHORIZE
            ),
            TripItError::NotFound => match resource {
                Some(id) => format!("Not found: no TripIt resource with ID '{}'.", id),
                None => "Not found: the requested TripIt resource does not exist.".to_string(),
            },
            TripItError::ProRequired(message) => {
                format!("{}. This feature is only available to TripIt Pro subscribers.", message)
            }
            TripItError::InvalidInput(message) => format!("{}.", message),
            other => format!("An unexpected error occurred while calling TripIt: {}", other),
        },
    };
    ToolResult::error(text)
}

/// Render a successful payload as pretty-printed JSON.
pub fn render_payload(payload: &Value) -> ToolResult {
    match serde_json::to_string_pretty(payload) {
        Ok(text) => ToolResult::success(text),
        Err(e) => ToolResult::error(format!("An unexpected error occurred while rendering the result: {}", e)),
    }
}
