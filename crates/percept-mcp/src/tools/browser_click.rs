//! `browser_click`: clicks an element by its stable identity (§4.3) and
//! reports the resulting perception delta.

use async_trait::async_trait;
use percept_core::config::PerceiveConfig;
use serde::Deserialize;
use serde_json::{Value, json};

use super::perceive::perceive_page;
use super::traits::{Tool, ToolResult};
use crate::browser::{actions, BrowserState};
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Clicks the element identified by `eid` in the last perceived snapshot.
pub struct BrowserClickTool;

impl BrowserClickTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserClickTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BrowserClickInput {
    eid: String,
    #[serde(default)]
    double_click: bool,
}

#[async_trait]
impl Tool for BrowserClickTool {
    fn name(&self) -> &str {
        "browser_click"
    }

    fn description(&self) -> &str {
        "Click an element identified by the `eid` attribute from a prior \
         browser_perceive call. Rejects if the eid isn't in the current \
         snapshot — re-perceive and pick a fresh eid in that case."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["eid"],
            "properties": {
                "eid": {
                    "type": "string",
                    "description": "Element identity from the last browser_perceive payload"
                },
                "doubleClick": {
                    "type": "boolean",
                    "default": false,
                    "description": "Double-click instead of a single click"
                }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserClickInput =
            serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        browser.initialize().await?;
        let handle = browser.active_page()?;

        let backend_id = {
            let store = handle.store().await;
            let snapshot = store
                .previous()
                .ok_or_else(|| ToolError::ElementNotFound("no snapshot has been taken yet".to_string()))?;
            snapshot
                .find(&input.eid)
                .map(|n| n.backend_node_id)
                .ok_or_else(|| ToolError::ElementNotFound(format!("eid '{}' not in current snapshot", input.eid)))?
        };

        actions::click(handle.page(), backend_id, input.double_click).await?;

        let xml = perceive_page(browser, handle, &PerceiveConfig::default()).await?;
        Ok(ToolOutput::text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_eid() {
        let tool = BrowserClickTool::new();
        let schema = tool.input_schema();
        assert!(schema["required"].as_array().unwrap().contains(&json!("eid")));
    }
}
