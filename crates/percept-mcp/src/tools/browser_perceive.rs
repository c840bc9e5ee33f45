//! `browser_perceive`: returns the current page's XML perception payload.

use async_trait::async_trait;
use percept_core::config::{BudgetProfile, PerceiveConfig};
use serde::Deserialize;
use serde_json::{Value, json};

use super::perceive::perceive_page;
use super::traits::{Tool, ToolResult};
use crate::browser::BrowserState;
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Returns the current page's state as the renderer's XML payload,
/// including the diff against the last emitted snapshot for that page.
pub struct BrowserPerceiveTool;

impl BrowserPerceiveTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserPerceiveTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BrowserPerceiveInput {
    /// Use the compact budget profile instead of the standard one.
    #[serde(default)]
    compact: bool,
}

#[async_trait]
impl Tool for BrowserPerceiveTool {
    fn name(&self) -> &str {
        "browser_perceive"
    }

    fn description(&self) -> &str {
        "Capture the current page's visible state as a compact XML payload: \
         actionable elements, what changed since the last perceive call, and \
         recent observations. Call this first on a new page and after any \
         action whose effect you need to see."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "compact": {
                    "type": "boolean",
                    "default": false,
                    "description": "Use a tighter token budget, trading detail for brevity"
                }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserPerceiveInput =
            serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        browser.initialize().await?;

        let config = PerceiveConfig {
            budget: if input.compact { BudgetProfile::Compact } else { BudgetProfile::Standard },
            ..PerceiveConfig::default()
        };

        let handle = browser.active_page()?;
        let xml = perceive_page(browser, handle, &config).await?;
        Ok(ToolOutput::text(xml))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_no_required_fields() {
        let tool = BrowserPerceiveTool::new();
        assert_eq!(tool.name(), "browser_perceive");
        assert!(tool.input_schema()["required"].is_null());
    }
}
