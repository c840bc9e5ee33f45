//! `browser_navigate`: navigates the active page and reports the resulting
//! perception delta (§6 "act-* ... the core is responsible for wrapping the
//! action in an observation window and returning the resulting delta").

use async_trait::async_trait;
use percept_core::config::PerceiveConfig;
use serde::Deserialize;
use serde_json::{Value, json};

use super::perceive::perceive_page;
use super::traits::{Tool, ToolResult};
use crate::browser::BrowserState;
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Navigates the active page to a URL.
pub struct BrowserNavigateTool;

impl BrowserNavigateTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserNavigateTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct BrowserNavigateInput {
    url: String,
}

#[async_trait]
impl Tool for BrowserNavigateTool {
    fn name(&self) -> &str {
        "browser_navigate"
    }

    fn description(&self) -> &str {
        "Navigate the active page to a URL, waiting for the load event, then \
         return the resulting perception payload for the new page."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "required": ["url"],
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to navigate to"
                }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserNavigateInput =
            serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        browser.initialize().await?;
        let handle = browser.active_page()?;

        handle
            .page()
            .goto(&input.url)
            .goto()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("navigation failed: {e}")))?;

        let xml = perceive_page(browser, handle, &PerceiveConfig::default()).await?;
        Ok(ToolOutput::text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_url() {
        let tool = BrowserNavigateTool::new();
        assert_eq!(tool.name(), "browser_navigate");
        let schema = tool.input_schema();
        assert!(schema["required"].as_array().unwrap().contains(&json!("url")));
    }

    #[test]
    fn parses_input() {
        let input: BrowserNavigateInput = serde_json::from_value(json!({ "url": "https://example.com" })).unwrap();
        assert_eq!(input.url, "https://example.com");
    }
}
