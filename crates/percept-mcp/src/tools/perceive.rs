//! Shared plumbing every tool uses to drive one perception cycle: capture
//! through the page's [`PageCdpSource`], compile/diff/render through
//! `percept-core`, and hand back the rendered XML payload (§6).

use std::time::{SystemTime, UNIX_EPOCH};

use percept_core::config::PerceiveConfig;
use percept_core::raw::{CdpSource, FrameScope};

use crate::browser::{BrowserState, PageCdpSource, PageHandle};
use crate::tools::error::ToolError;

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// Run one capture -> compile -> diff -> render cycle against the given
/// page handle and return the XML payload.
///
/// # Errors
///
/// Returns an error if the capture times out or fails.
pub async fn perceive_page(
    browser: &BrowserState,
    handle: &PageHandle,
    config: &PerceiveConfig,
) -> Result<String, ToolError> {
    let source = PageCdpSource::new(handle.page(), browser.cdp_timeout());
    let capture = source.capture_raw(FrameScope::AllFrames).await?;

    let mut store = handle.store().await;
    let snapshot_id = format!("snap-{}", now_ms());
    let payload = percept_core::perceive(&mut store, &capture, snapshot_id, now_ms(), config);
    Ok(payload.xml)
}
