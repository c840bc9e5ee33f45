//! Server error types

use thiserror::Error;

use crate::browser::BrowserError;
use crate::tools::ToolError;

/// Errors that can occur while handling a JSON-RPC request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The requested method isn't implemented.
    #[error("method not found: {0}")]
    MethodNotFound(String),

    /// The request params didn't match the expected shape.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// A tool call failed.
    #[error(transparent)]
    Tool(#[from] ToolError),

    /// The browser session failed.
    #[error(transparent)]
    Browser(#[from] BrowserError),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    /// The JSON-RPC error code for this error, following the standard
    /// reserved ranges plus an application range for tool/browser failures.
    #[must_use]
    pub const fn error_code(&self) -> i32 {
        match self {
            Self::MethodNotFound(_) => -32601,
            Self::InvalidParams(_) => -32602,
            Self::Json(_) => -32700,
            Self::Tool(_) | Self::Browser(_) => -32000,
        }
    }
}
