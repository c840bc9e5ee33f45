//! `browser_scroll`: scrolls an element into view, or the page by a pixel
//! delta, and reports the resulting perception delta.

use async_trait::async_trait;
use percept_core::config::PerceiveConfig;
use serde::Deserialize;
use serde_json::{Value, json};

use super::perceive::perceive_page;
use super::traits::{Tool, ToolResult};
use crate::browser::{actions, BrowserState};
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Scrolls an element into view, or the page by `(dx, dy)` when no `eid` is
/// given.
pub struct BrowserScrollTool;

impl BrowserScrollTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserScrollTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize, Default)]
struct BrowserScrollInput {
    eid: Option<String>,
    #[serde(default)]
    dx: f64,
    #[serde(default)]
    dy: f64,
}

#[async_trait]
impl Tool for BrowserScrollTool {
    fn name(&self) -> &str {
        "browser_scroll"
    }

    fn description(&self) -> &str {
        "Scroll an element identified by `eid` into view, or scroll the page \
         by (dx, dy) pixels when no eid is given."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "eid": {
                    "type": "string",
                    "description": "Element identity to scroll into view; omit to scroll the page"
                },
                "dx": { "type": "number", "default": 0, "description": "Horizontal page scroll in pixels" },
                "dy": { "type": "number", "default": 0, "description": "Vertical page scroll in pixels" }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserScrollInput =
            serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        browser.initialize().await?;
        let handle = browser.active_page()?;

        if let Some(eid) = &input.eid {
            let backend_id = {
                let store = handle.store().await;
                let snapshot = store
                    .previous()
                    .ok_or_else(|| ToolError::ElementNotFound("no snapshot has been taken yet".to_string()))?;
                snapshot
                    .find(eid)
                    .map(|n| n.backend_node_id)
                    .ok_or_else(|| ToolError::ElementNotFound(format!("eid '{eid}' not in current snapshot")))?
            };
            actions::scroll_into_view(handle.page(), backend_id).await?;
        } else {
            let js = format!("() => window.scrollBy({}, {})", input.dx, input.dy);
            handle
                .page()
                .evaluate(&js)
                .await
                .map_err(|e| ToolError::ExecutionFailed(format!("scroll failed: {e}")))?;
        }

        let xml = perceive_page(browser, handle, &PerceiveConfig::default()).await?;
        Ok(ToolOutput::text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_scroll() {
        let input: BrowserScrollInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.dx, 0.0);
        assert_eq!(input.dy, 0.0);
        assert!(input.eid.is_none());
    }
}
