//! `browser_press_key`: sends a keyboard key (or combination) to the active
//! page and reports the resulting perception delta.

use async_trait::async_trait;
use percept_core::config::PerceiveConfig;
use serde::Deserialize;
use serde_json::{Value, json};

use super::perceive::perceive_page;
use super::traits::{Tool, ToolResult};
use crate::browser::BrowserState;
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Presses a keyboard key on the active page.
pub struct BrowserPressKeyTool;

impl BrowserPressKeyTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserPressKeyTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct BrowserPressKeyInput {
    key: String,
}

#[async_trait]
impl Tool for BrowserPressKeyTool {
    fn name(&self) -> &str {
        "browser_press_key"
    }

    fn description(&self) -> &str {
        "Press a keyboard key on the active page, e.g. 'Enter', 'Tab', \
         'Escape', 'ArrowLeft', or a combination like 'Control+a'."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["key"],
            "properties": {
                "key": {
                    "type": "string",
                    "description": "Key name or combination to send, e.g. 'Enter' or 'Control+a'"
                }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserPressKeyInput =
            serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        if input.key.is_empty() {
            return Err(ToolError::InvalidParams("key cannot be empty".to_string()));
        }

        browser.initialize().await?;
        let handle = browser.active_page()?;

        handle
            .page()
            .keyboard()
            .press(&input.key)
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("failed to press key '{}': {e}", input.key)))?;

        let xml = perceive_page(browser, handle, &PerceiveConfig::default()).await?;
        Ok(ToolOutput::text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_key() {
        let tool = BrowserPressKeyTool::new();
        let schema = tool.input_schema();
        assert!(schema["required"].as_array().unwrap().contains(&json!("key")));
    }
}
