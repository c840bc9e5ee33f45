//! `browser_type`: fills an editable element's value by its stable identity
//! and reports the resulting perception delta.

use async_trait::async_trait;
use percept_core::config::PerceiveConfig;
use serde::Deserialize;
use serde_json::{Value, json};

use super::perceive::perceive_page;
use super::traits::{Tool, ToolResult};
use crate::browser::{actions, BrowserState};
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Types text into the element identified by `eid`, optionally submitting.
pub struct BrowserTypeTool;

impl BrowserTypeTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserTypeTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct BrowserTypeInput {
    eid: String,
    text: String,
    #[serde(default)]
    submit: bool,
}

#[async_trait]
impl Tool for BrowserTypeTool {
    fn name(&self) -> &str {
        "browser_type"
    }

    fn description(&self) -> &str {
        "Type text into an editable element identified by `eid`. Set `submit` \
         to press Enter afterward."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["eid", "text"],
            "properties": {
                "eid": {
                    "type": "string",
                    "description": "Element identity from the last browser_perceive payload"
                },
                "text": {
                    "type": "string",
                    "description": "Text to type into the element"
                },
                "submit": {
                    "type": "boolean",
                    "default": false,
                    "description": "Press Enter after typing"
                }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserTypeInput =
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

        actions::fill(handle.page(), backend_id, &input.text).await?;

        if input.submit {
            handle
                .page()
                .keyboard()
                .press("Enter")
                .await
                .map_err(|e| ToolError::ExecutionFailed(format!("failed to press Enter: {e}")))?;
        }

        let xml = perceive_page(browser, handle, &PerceiveConfig::default()).await?;
        Ok(ToolOutput::text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_eid_and_text() {
        let tool = BrowserTypeTool::new();
        let schema = tool.input_schema();
        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&json!("eid")));
        assert!(required.contains(&json!("text")));
    }
}
