//! The MCP JSON-RPC server: protocol handling, capability negotiation, and
//! tool dispatch (§6).

mod error;
pub mod protocol;
mod types;

pub use error::ServerError;
pub use protocol::{ContentItem, JsonRpcRequest, JsonRpcResponse, McpServer, ToolOutput};
pub use types::ServerConfig;

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;
