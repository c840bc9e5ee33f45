//! Browser session management.
//!
//! This module owns the browser lifecycle and the per-page state (the
//! [`percept_core::SnapshotStore`] and [`percept_core::observation`]
//! buffers) across MCP tool calls.

pub mod actions;
mod cdp_source;
mod config;
mod error;
mod state;

pub use cdp_source::PageCdpSource;
pub use config::{BrowserConfig, ViewportSize};
pub use error::BrowserError;
pub use state::{BrowserState, PageHandle};

/// Result type for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;
