//! MCP Server implementation

use std::collections::BTreeMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use async_trait::async_trait;
use futures::FutureExt;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::mcp::protocol::{
    JsonRpcRequest, JsonRpcResponse, McpToolCall, McpToolDefinition, McpToolResult, error_codes,
};
use crate::{Error, Result};

/// Protocol revisions this server speaks, newest first
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 2] = ["2025-03-26", "2024-11-05"];

/// Trait for MCP tools
#[async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (must be unique)
    fn name(&self) -> &str;

    /// Tool description
    fn description(&self) -> &str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> Value;

    /// Execute the tool with given arguments.
    ///
    /// Return `Error::InvalidParams` for malformed arguments; any other error
    /// becomes an error-flagged tool result.
    async fn execute(&self, arguments: Value) -> Result<McpToolResult>;
}

/// Outcome of dispatching one message with handler panics contained
#[derive(Debug)]
pub enum Dispatch {
    /// A response to write back
    Reply(JsonRpcResponse),
    /// A notification was accepted; nothing to write
    Accepted,
    /// The handler panicked
    Crashed { id: Option<Value> },
}

/// MCP Server that manages tools and handles requests
pub struct McpServer {
    tools: RwLock<BTreeMap<String, Arc<dyn McpTool>>>,
    server_name: String,
    server_version: String,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tools: RwLock::new(BTreeMap::new()),
            server_name: name.into(),
            server_version: version.into(),
        }
    }

    /// Register a tool
    pub async fn register_tool(&self, tool: Arc<dyn McpTool>) {
        let mut tools = self.tools.write().await;
        tools.insert(tool.name().to_string(), tool);
    }

    /// Dispatch a message, converting a handler panic into [`Dispatch::Crashed`].
    pub async fn dispatch(&self, request: JsonRpcRequest) -> Dispatch {
        let id = request.id.clone();
        let method = request.method.clone();
        match AssertUnwindSafe(self.handle_message(request))
            .catch_unwind()
            .await
        {
            Ok(Some(response)) => Dispatch::Reply(response),
            Ok(None) => Dispatch::Accepted,
            Err(_) => {
                error!(%method, "MCP handler panicked");
                Dispatch::Crashed { id }
            }
        }
    }

    /// Handle a request or notification. Notifications produce no response.
    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            debug!(method = %request.method, "MCP notification");
            return None;
        }
        Some(self.handle_request(request).await)
    }

    /// Handle an incoming JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(method = %request.method, "MCP request");
        match request.method.as_str() {
            "initialize" => self.handle_initialize(request.id, request.params),
            "ping" => JsonRpcResponse::success(request.id, serde_json::json!({})),
            "tools/list" => self.handle_list_tools(request.id).await,
            "tools/call" => self.handle_call_tool(request.id, request.params).await,
            _ => JsonRpcResponse::error(
                request.id,
                error_codes::METHOD_NOT_FOUND,
                format!("Unknown method: {}", request.method),
            ),
        }
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let requested = params
            .as_ref()
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);
        let protocol_version = requested
            .filter(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(v))
            .unwrap_or(SUPPORTED_PROTOCOL_VERSIONS[0]);

        JsonRpcResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": protocol_version,
                "capabilities": {
                    "tools": {}
                },
                "serverInfo": {
                    "name": self.server_name,
                    "version": self.server_version
                }
            }),
        )
    }

    async fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let tools = self.tools.read().await;
        let tool_defs: Vec<McpToolDefinition> = tools
            .values()
            .map(|t| McpToolDefinition {
                name: t.name().to_string(),
                description: t.description().to_string(),
                input_schema: t.input_schema(),
            })
            .collect();

        JsonRpcResponse::success(id, serde_json::json!({ "tools": tool_defs }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let Some(params) = params else {
            return JsonRpcResponse::error(
                id,
                error_codes::INVALID_PARAMS,
                "Missing params for tools/call",
            );
        };

        let call: McpToolCall = match serde_json::from_value(params) {
            Ok(c) => c,
            Err(e) => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Invalid tool call params: {}", e),
                );
            }
        };

        let tools = self.tools.read().await;
        let tool = match tools.get(&call.name) {
            Some(t) => Arc::clone(t),
            None => {
                return JsonRpcResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    format!("Unknown tool: {}", call.name),
                );
            }
        };

        // Release lock before executing tool
        drop(tools);

        debug!(tool = %call.name, "Executing MCP tool");
        let result = match tool.execute(call.arguments).await {
            Ok(result) => result,
            Err(Error::InvalidParams(message)) => {
                return JsonRpcResponse::error(id, error_codes::INVALID_PARAMS, message);
            }
            Err(e) => McpToolResult::error(e.to_string()),
        };

        match serde_json::to_value(result) {
            Ok(v) => JsonRpcResponse::success(id, v),
            Err(e) => JsonRpcResponse::error(
                id,
                error_codes::INTERNAL_ERROR,
                format!("Failed to serialize tool result: {}", e),
            ),
        }
    }
}
