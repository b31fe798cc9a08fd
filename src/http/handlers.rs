//! `/mcp` and `/health` handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::Response;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::http::request::resolve_credentials;
use crate::http::response::rpc;
use crate::http::server::AppState;
use crate::mcp::protocol::INVALID_REQUEST;
use crate::mcp::{RequestId, RpcError, RpcRequest, RpcResponse};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// One JSON-RPC request per POST.
///
/// Undecodable bodies get -32700 and structurally invalid envelopes -32600,
/// both before the dispatcher is involved.
pub async fn mcp(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Undecodable RPC body");
            return rpc(
                StatusCode::BAD_REQUEST,
                RpcResponse::failure(None, RpcError::parse_error(format!("Parse error: {}", e))),
            );
        }
    };

    let request: RpcRequest = match serde_json::from_value(value.clone()) {
        Ok(request) => request,
        Err(e) => {
            let id = value
                .get("id")
                .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
            return rpc(
                StatusCode::BAD_REQUEST,
                RpcResponse::failure(id, RpcError::new(INVALID_REQUEST, format!("Invalid request: {}", e))),
            );
        }
    };

    let credentials = resolve_credentials(&state, &headers).await;
    let response = state.dispatcher.dispatch(request, credentials.as_ref()).await;
    rpc(StatusCode::OK, response)
}
