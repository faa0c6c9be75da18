use serde::{Deserialize, Serialize};
use futures::future::BoxFuture;
use serde_json::Value;

use crate::core;
use crate::error::Result;
use crate::geometry::Point;

// Define handler type using Box<dyn Fn> to allow storing async functions
// This avoids type issues with different impl Future types
pub type MethodHandler = Box<
    dyn Fn(crate::PathServerState, Option<Value>) -> BoxFuture<'static, Result<Value>>
        + Send
        + Sync,
>;

// Function to box the handlers properly to match the type
fn box_handler<F, Fut>(f: F) -> MethodHandler
where
    F: Fn(crate::PathServerState, Option<Value>) -> Fut + Send + Sync + 'static,
    Fut: futures::Future<Output = Result<Value>> + Send + 'static,
{
    Box::new(move |state, value| Box::pin(f(state, value)))
}

// === JSON-RPC framing ===

pub const JSONRPC_VERSION: &str = "2.0";
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

#[derive(Debug, Clone, PartialEq)]
pub struct RpcRequest {
    pub id: Value,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RpcError {
    pub id: Value,
    pub code: i32,
    pub message: String,
}

/// Parses one request line. `Ok(None)` for blank lines.
pub fn parse_request(line: &str) -> std::result::Result<Option<RpcRequest>, RpcError> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let request: Value = serde_json::from_str(trimmed).map_err(|e| RpcError {
        id: Value::Null,
        code: PARSE_ERROR,
        message: format!("Invalid JSON: {}", e),
    })?;

    let obj = request.as_object().ok_or_else(|| RpcError {
        id: Value::Null,
        code: INVALID_REQUEST,
        message: "Request must be a JSON object".to_string(),
    })?;

    let id = obj.get("id").cloned().unwrap_or(Value::Null);
    let invalid = |message: &str| RpcError {
        id: id.clone(),
        code: INVALID_REQUEST,
        message: message.to_string(),
    };

    if let Some(version) = obj.get("jsonrpc") {
        if version != JSONRPC_VERSION {
            return Err(invalid("Only JSON-RPC 2.0 is supported"));
        }
    }

    let method = obj
        .get("method")
        .ok_or_else(|| invalid("Missing 'method' field"))?
        .as_str()
        .ok_or_else(|| invalid("'method' must be a string"))?
        .to_string();

    Ok(Some(RpcRequest {
        id,
        method,
        params: obj.get("params").cloned(),
    }))
}

pub fn result_envelope(id: Value, result: Value) -> Value {
    serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "result": result,
    })
}

pub fn error_envelope(id: Value, code: i32, message: String, data: Option<Value>) -> Value {
    let mut error = serde_json::json!({
        "code": code,
        "message": message,
    });
    if let Some(data) = data {
        error["data"] = data;
    }
    serde_json::json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": error,
    })
}

// === Request Parameters ===

#[derive(Deserialize, Debug)]
pub struct PatternParams {
    pub query: String, // "pattern:star, x:300, y:200, size:50"
}

#[derive(Deserialize, Debug, Default)]
pub struct GetPromptParams {
    pub pattern: Option<String>,
}

// === Response Payloads ===

#[derive(Serialize, Debug)]
pub struct VersionResponse {
    pub status: String,
    pub protocol_version: String,
    pub server_version: String,
}

#[derive(Serialize, Debug)]
pub struct ShapeInfo {
    pub name: String,
    pub closed: bool,
    pub deterministic: bool,
}

#[derive(Serialize, Debug)]
pub struct ListShapesResponse {
    pub status: String,
    pub shapes: Vec<ShapeInfo>,
    pub click_patterns: Vec<String>,
}

#[derive(Serialize, Debug)]
pub struct PathResponse {
    pub status: String,
    pub shape: String,
    pub closed: bool,
    /// "drag" for paths, "clicks" for dot grids.
    pub stroke: String,
    pub points: Vec<Point>,
}

#[derive(Serialize, Debug)]
pub struct DrawResponse {
    pub status: String,
    pub shape: String,
    pub points_drawn: usize,
}

#[derive(Serialize, Debug)]
pub struct PromptResponse {
    pub status: String,
    pub prompt: String,
}

// === Utility ===

// Map of method names to handler functions
pub fn get_method_handler(method: &str) -> Option<MethodHandler> {
    match method {
        "get_version" => Some(box_handler(core::handle_get_version)),
        "list_shapes" => Some(box_handler(core::handle_list_shapes)),
        "get_prompt" => Some(box_handler(core::handle_get_prompt)),
        // Path generation
        "generate_path" => Some(box_handler(core::handle_generate_path)),
        "generate_pattern" => Some(box_handler(core::handle_generate_pattern)),
        // Drawing
        "draw_shape" => Some(box_handler(core::handle_draw_shape)),
        "draw_pattern" => Some(box_handler(core::handle_draw_pattern)),
        // Unknown method
        _ => None,
    }
}
