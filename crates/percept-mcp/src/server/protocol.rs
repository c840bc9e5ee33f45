//! MCP protocol implementation: JSON-RPC request/response handling and
//! tool dispatch (§6 "Transport (agent tool protocol)").
//!
//! # Protocol flow
//!
//! 1. Client sends `initialize`
//! 2. Server responds with capabilities
//! 3. Client sends `initialized` (notification, no response)
//! 4. Client calls `tools/list` and `tools/call`

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use super::error::ServerError;
use super::types::ServerConfig;
use crate::browser::BrowserState;
use crate::tools::{ToolRegistry, register_all_tools};

/// JSON-RPC request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request id, `None` for notifications
    #[serde(default)]
    pub id: Option<Value>,

    /// Method name
    pub method: String,

    /// Method parameters
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn success(id: Value, result: Value) -> Self {
        Self { jsonrpc: "2.0", id, result: Some(result), error: None }
    }

    #[must_use]
    pub fn error(id: Value, code: i32, message: String) -> Self {
        Self { jsonrpc: "2.0", id, result: None, error: Some(JsonRpcError { code, message, data: None }) }
    }

    #[must_use]
    pub fn from_error(id: Value, err: &ServerError) -> Self {
        Self::error(id, err.error_code(), err.to_string())
    }
}

/// MCP server capabilities.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerCapabilities {
    pub tools: ToolCapabilities,
}

/// Tool-related capabilities.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCapabilities {
    pub list_changed: bool,
}

/// Result of the `initialize` handshake.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

/// Server identity reported during initialization.
#[derive(Debug, Serialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// A single tool's definition, as listed via `tools/list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Params of a `tools/call` request.
#[derive(Debug, Deserialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

/// A single content item in a tool result.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentItem {
    /// Text content
    #[serde(rename = "text")]
    Text { text: String },
}

impl ContentItem {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text { text: s.into() }
    }
}

/// Output from a successful tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: Vec<ContentItem>,
}

impl ToolOutput {
    #[must_use]
    pub fn text(s: impl Into<String>) -> Self {
        Self { content: vec![ContentItem::text(s)] }
    }
}

/// The wire shape of a `tools/call` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

/// The MCP server: owns the tool registry and the browser session, and
/// dispatches JSON-RPC requests from either transport.
pub struct McpServer {
    config: ServerConfig,
    tools: ToolRegistry,
    browser: Arc<Mutex<BrowserState>>,
    initialized: bool,
}

impl McpServer {
    /// Create a new server from its configuration.
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        let mut tools = ToolRegistry::new();
        register_all_tools(&mut tools);

        let browser = BrowserState::new(config.browser.clone());

        Self { config, tools, browser: Arc::new(Mutex::new(browser)), initialized: false }
    }

    /// Handle one JSON-RPC request and return its `result` value.
    ///
    /// # Errors
    ///
    /// Returns an error if the method is unknown, the params don't parse,
    /// or the underlying tool/browser call fails.
    pub async fn handle_request(&mut self, request: &JsonRpcRequest) -> Result<Value, ServerError> {
        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "initialized" => Ok(Value::Null),
            "tools/list" => Ok(self.handle_tools_list()),
            "tools/call" => self.handle_tools_call(&request.params).await,
            other => Err(ServerError::MethodNotFound(other.to_string())),
        }
    }

    fn handle_initialize(&mut self) -> Value {
        self.initialized = true;
        let result = InitializeResult {
            protocol_version: "2024-11-05".to_string(),
            capabilities: ServerCapabilities { tools: ToolCapabilities { list_changed: false } },
            server_info: ServerInfo { name: self.config.name.clone(), version: self.config.version.clone() },
        };
        serde_json::to_value(result).unwrap_or(Value::Null)
    }

    fn handle_tools_list(&self) -> Value {
        let tools: Vec<ToolDefinition> = self
            .tools
            .list()
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool.input_schema(),
            })
            .collect();
        serde_json::json!({ "tools": tools })
    }

    async fn handle_tools_call(&self, params: &Value) -> Result<Value, ServerError> {
        let call_params: ToolCallParams =
            serde_json::from_value(params.clone()).map_err(|e| ServerError::InvalidParams(e.to_string()))?;

        let tool = self
            .tools
            .get(&call_params.name)
            .ok_or_else(|| ServerError::MethodNotFound(call_params.name.clone()))?
            .clone();

        let mut browser = self.browser.lock().await;
        let result = tool.execute(&call_params.arguments, &mut browser).await;

        let call_result = match result {
            Ok(output) => ToolCallResult { content: output.content, is_error: false },
            Err(e) => ToolCallResult { content: vec![ContentItem::text(e.to_string())], is_error: true },
        };

        Ok(serde_json::to_value(call_result)?)
    }

    /// A handle to the shared browser state, for the transport layer to
    /// drive a graceful shutdown.
    #[must_use]
    pub fn browser_state(&self) -> Arc<Mutex<BrowserState>> {
        Arc::clone(&self.browser)
    }
}
