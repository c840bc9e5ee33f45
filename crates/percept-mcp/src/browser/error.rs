//! Browser error types

use thiserror::Error;

/// Errors that can occur during browser session management.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// Browser launch failed
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    /// Connection to CDP endpoint failed
    #[error("Failed to connect to CDP endpoint: {0}")]
    ConnectionFailed(String),

    /// Browser not running
    #[error("Browser not running")]
    NotRunning,

    /// Page not found
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// Navigation failed
    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    /// A raw capture failed or timed out
    #[error(transparent)]
    Capture(#[from] percept_core::PerceptionError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
