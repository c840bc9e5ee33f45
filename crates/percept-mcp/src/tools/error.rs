//! Tool error types

use thiserror::Error;

/// Errors that can occur while executing a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool's input arguments didn't match its schema.
    #[error("invalid params: {0}")]
    InvalidParams(String),

    /// The tool ran but failed.
    #[error("execution failed: {0}")]
    ExecutionFailed(String),

    /// No browser session is available.
    #[error("browser not available: {0}")]
    BrowserNotAvailable(String),

    /// The requested element couldn't be located.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    /// The operation exceeded its deadline.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<crate::browser::BrowserError> for ToolError {
    fn from(err: crate::browser::BrowserError) -> Self {
        Self::BrowserNotAvailable(err.to_string())
    }
}

impl From<percept_core::PerceptionError> for ToolError {
    fn from(err: percept_core::PerceptionError) -> Self {
        Self::ExecutionFailed(err.to_string())
    }
}
