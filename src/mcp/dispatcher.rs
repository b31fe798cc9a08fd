//! Stateless method router.
//!
//! Each request is handled independently against a fixed method set. Every
//! request yields exactly one response echoing its identifier; failures,
//! including panics inside tool handlers, become error responses.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::str::FromStr;
use std::sync::Arc;

use futures_util::FutureExt;
use serde_json::{json, Value};

use crate::mcp::protocol::{RpcError, RpcRequest, RpcResponse};
use crate::oauth::CredentialPair;
use crate::observability::metrics;
use crate::tools::ToolRouter;

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Methods this server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    Initialized,
    Ping,
    ToolsList,
    ToolsCall,
    ResourcesList,
    PromptsList,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::Initialized => "notifications/initialized",
            Method::Ping => "ping",
            Method::ToolsList => "tools/list",
            Method::ToolsCall => "tools/call",
            Method::ResourcesList => "resources/list",
            Method::PromptsList => "prompts/list",
        }
    }
}

impl FromStr for Method {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialize" => Ok(Method::Initialize),
            "initialized" | "notifications/initialized" => Ok(Method::Initialized),
            "ping" => Ok(Method::Ping),
            "tools/list" => Ok(Method::ToolsList),
            "tools/call" => Ok(Method::ToolsCall),
            "resources/list" => Ok(Method::ResourcesList),
            "prompts/list" => Ok(Method::PromptsList),
            _ => Err(()),
        }
    }
}

/// Name and version reported by `initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    pub name: String,
    pub version: String,
}

impl Default for ServerIdentity {
    fn default() -> Self {
        Self {
            name: "tripit-mcp".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct Dispatcher {
    tools: Arc<dyn ToolRouter>,
    identity: ServerIdentity,
}

impl Dispatcher {
    pub fn new(tools: Arc<dyn ToolRouter>) -> Self {
        Self::with_identity(tools, ServerIdentity::default())
    }

    pub fn with_identity(tools: Arc<dyn ToolRouter>, identity: ServerIdentity) -> Self {
        Self { tools, identity }
    }

    /// Handle one request. Never panics and never fails.
    pub async fn dispatch(&self, request: RpcRequest, credentials: Option<&CredentialPair>) -> RpcResponse {
        let id = request.id.clone();
        let method = request.method.parse::<Method>().ok();
        let label = method.map(|m| m.as_str()).unwrap_or("unknown");

        let outcome = AssertUnwindSafe(self.handle(method, request, credentials))
            .catch_unwind()
            .await;

        let response = match outcome {
            Ok(Ok(result)) => RpcResponse::success(id, result),
            Ok(Err(error)) => {
                tracing::debug!(method = label, code = error.code, "RPC request rejected");
                RpcResponse::failure(id, error)
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(method = label, error = %message, "RPC handler panicked");
                RpcResponse::failure(id, RpcError::internal(message))
            }
        };

        metrics::record_rpc(label, if response.is_error() { "error" } else { "success" });
        response
    }

    async fn handle(
        &self,
        method: Option<Method>,
        request: RpcRequest,
        credentials: Option<&CredentialPair>,
    ) -> Result<Value, RpcError> {
        let Some(method) = method else {
            return Err(RpcError::method_not_found(&request.method));
        };

        match method {
            Method::Initialize => Ok(json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": { "listChanged": false } },
                "serverInfo": {
                    "name": self.identity.name,
                    "version": self.identity.version,
                },
            })),
            Method::Initialized | Method::Ping => Ok(json!({})),
            Method::ToolsList => Ok(json!({ "tools": self.tools.list_descriptors() })),
            Method::ToolsCall => {
                let params = request.params.unwrap_or(Value::Null);
                let name = params
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| RpcError::invalid_params("Missing required parameter: name"))?;
                let arguments = params.get("arguments").cloned().unwrap_or_else(|| json!({}));

                tracing::info!(tool = %name, "Tool call");
                let result = self.tools.invoke(name, arguments, credentials).await;
                serde_json::to_value(result).map_err(|e| RpcError::internal(e.to_string()))
            }
            Method::ResourcesList => Ok(json!({ "resources": [] })),
            Method::PromptsList => Ok(json!({ "prompts": [] })),
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "Internal error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcp::protocol::{RequestId, INTERNAL_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND};
    use crate::tools::{ToolDescriptor, ToolResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRouter {
        calls: Mutex<Vec<(String, Value, bool)>>,
    }

    #[async_trait]
    impl ToolRouter for RecordingRouter {
        fn list_descriptors(&self) -> Vec<ToolDescriptor> {
            vec![
                ToolDescriptor {
                    name: "first".into(),
                    description: "one".into(),
                    input_schema: json!({"type": "object"}),
                },
                ToolDescriptor {
                    name: "second".into(),
                    description: "two".into(),
                    input_schema: json!({"type": "object"}),
                },
            ]
        }

        async fn invoke(&self, name: &str, arguments: Value, credentials: Option<&CredentialPair>) -> ToolResult {
            self.calls
                .lock()
                .unwrap()
                .push((name.to_string(), arguments, credentials.is_some()));
            ToolResult::success(format!("ran {}", name))
        }
    }

    struct PanickingRouter;

    #[async_trait]
    impl ToolRouter for PanickingRouter {
        fn list_descriptors(&self) -> Vec<ToolDescriptor> {
            Vec::new()
        }

        async fn invoke(&self, _name: &str, _arguments: Value, _credentials: Option<&CredentialPair>) -> ToolResult {
            panic!("handler exploded")
        }
    }

    fn request(id: Option<RequestId>, method: &str, params: Option<Value>) -> RpcRequest {
        RpcRequest::new(id, method, params)
    }

    #[tokio::test]
    async fn test_ping() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        let response = dispatcher.dispatch(request(Some(9i64.into()), "ping", None), None).await;
        assert_eq!(response.id, Some(RequestId::from(9i64)));
        assert_eq!(response.result, Some(json!({})));
        assert!(response.error.is_none());
    }

    #[tokio::test]
    async fn test_initialize_reports_identity() {
        let dispatcher = Dispatcher::with_identity(
            Arc::new(RecordingRouter::default()),
            ServerIdentity { name: "tripit".into(), version: "9.9.9".into() },
        );
        let response = dispatcher
            .dispatch(request(Some("init".into()), "initialize", Some(json!({}))), None)
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "tripit");
        assert!(result["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_both_initialized_spellings() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        for method in ["initialized", "notifications/initialized"] {
            let response = dispatcher.dispatch(request(None, method, None), None).await;
            assert_eq!(response.result, Some(json!({})));
        }
    }

    #[tokio::test]
    async fn test_tools_list_keeps_order() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        let response = dispatcher.dispatch(request(Some(1i64.into()), "tools/list", None), None).await;
        let tools = response.result.unwrap()["tools"].clone();
        assert_eq!(tools[0]["name"], "first");
        assert_eq!(tools[1]["name"], "second");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_tools_call_delegates() {
        let router = Arc::new(RecordingRouter::default());
        let dispatcher = Dispatcher::new(router.clone());
        let credentials = CredentialPair::new("t", "s");

        let response = dispatcher
            .dispatch(
                request(
                    Some(3i64.into()),
                    "tools/call",
                    Some(json!({"name": "first", "arguments": {"include_past": true}})),
                ),
                Some(&credentials),
            )
            .await;

        assert!(response.error.is_none());
        assert_eq!(
            response.result.unwrap(),
            json!({"content": [{"type": "text", "text": "ran first"}], "isError": false})
        );
        let calls = router.calls.lock().unwrap();
        assert_eq!(calls[0], ("first".to_string(), json!({"include_past": true}), true));
    }

    #[tokio::test]
    async fn test_tools_call_defaults_arguments() {
        let router = Arc::new(RecordingRouter::default());
        let dispatcher = Dispatcher::new(router.clone());
        dispatcher
            .dispatch(request(Some(4i64.into()), "tools/call", Some(json!({"name": "second"}))), None)
            .await;
        assert_eq!(router.calls.lock().unwrap()[0].1, json!({}));
    }

    #[tokio::test]
    async fn test_tools_call_without_name() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        for params in [None, Some(json!({})), Some(json!({"name": 7}))] {
            let response = dispatcher
                .dispatch(request(Some(5i64.into()), "tools/call", params), None)
                .await;
            assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
            assert_eq!(response.id, Some(RequestId::from(5i64)));
        }
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        let response = dispatcher
            .dispatch(request(Some("x".into()), "unknown/method", None), None)
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert!(error.message.contains("Method not found"));
        assert!(error.message.contains("unknown/method"));
        assert_eq!(response.id, Some(RequestId::from("x")));
    }

    #[tokio::test]
    async fn test_unimplemented_features_are_empty() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        let resources = dispatcher.dispatch(request(Some(1i64.into()), "resources/list", None), None).await;
        assert_eq!(resources.result, Some(json!({"resources": []})));
        let prompts = dispatcher.dispatch(request(Some(2i64.into()), "prompts/list", None), None).await;
        assert_eq!(prompts.result, Some(json!({"prompts": []})));
    }

    #[tokio::test]
    async fn test_handler_panic_becomes_internal_error() {
        let dispatcher = Dispatcher::new(Arc::new(PanickingRouter));
        let response = dispatcher
            .dispatch(request(Some(11i64.into()), "tools/call", Some(json!({"name": "boom"}))), None)
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, INTERNAL_ERROR);
        assert_eq!(error.message, "handler exploded");
        assert_eq!(response.id, Some(RequestId::from(11i64)));
    }

    #[tokio::test]
    async fn test_null_id_is_echoed() {
        let dispatcher = Dispatcher::new(Arc::new(RecordingRouter::default()));
        let response = dispatcher.dispatch(request(None, "ping", None), None).await;
        assert_eq!(response.id, None);
        assert_eq!(serde_json::to_value(&response).unwrap()["id"], Value::Null);
    }
}
