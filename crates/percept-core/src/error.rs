//! Error taxonomy for the perception and delta engine.

use thiserror::Error;

/// Errors produced while building, diffing, or rendering a perception
/// response.
///
/// Compile, EID, diff, and render stages are infallible over well-typed
/// inputs by construction; the variants below cover the capture boundary
/// and the target-resolution boundary, the two places external state can
/// make a call fail.
#[derive(Debug, Error)]
pub enum PerceptionError {
    /// The raw CDP capture failed outright (primary DOM tree unavailable,
    /// or the capture timed out).
    #[error("capture failed: {0}")]
    CaptureFailed(String),

    /// The capture timed out before the configured deadline.
    #[error("capture timed out after {0:?}")]
    CaptureTimedOut(std::time::Duration),

    /// A target descriptor's `eid` did not resolve to any node in the
    /// latest snapshot for the page.
    #[error("unknown element id '{0}'")]
    UnknownEid(String),

    /// The page has no snapshot yet (perceive was called before any
    /// capture completed).
    #[error("no snapshot available for this page")]
    NoSnapshot,

    /// A query or configuration value failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for perception-engine operations.
pub type PerceptionResult<T> = Result<T, PerceptionError>;

/// Result alias specific to the raw-capture boundary (C1).
pub type RawCaptureResult<T> = Result<T, PerceptionError>;
