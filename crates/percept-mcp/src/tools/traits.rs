//! The `Tool` trait all MCP tools implement.

use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolError;
use crate::browser::BrowserState;
use crate::server::protocol::ToolOutput;

/// The result of executing a tool.
pub type ToolResult = Result<ToolOutput, ToolError>;

/// A single callable MCP tool.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's name, as advertised in `tools/list` and dispatched on in
    /// `tools/call`.
    fn name(&self) -> &str;

    /// A human-readable description shown to the calling agent.
    fn description(&self) -> &str;

    /// The JSON Schema describing this tool's input arguments.
    fn input_schema(&self) -> Value;

    /// Run the tool against the current browser state.
    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult;
}
