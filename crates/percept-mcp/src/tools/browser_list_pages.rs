//! `browser_list_pages`: returns the set of open page handles (§6
//! "list-pages: returns the set of page handles").

use async_trait::async_trait;
use serde_json::{Value, json};

use super::traits::{Tool, ToolResult};
use crate::browser::BrowserState;
use crate::server::protocol::ToolOutput;

/// Lists every page handle currently open, marking the active one.
pub struct BrowserListPagesTool;

impl BrowserListPagesTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserListPagesTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for BrowserListPagesTool {
    fn name(&self) -> &str {
        "browser_list_pages"
    }

    fn description(&self) -> &str {
        "List the ids of every open page, marking which one is active."
    }

    fn input_schema(&self) -> Value {
        json!({ "type": "object", "properties": {} })
    }

    async fn execute(&self, _args: &Value, browser: &mut BrowserState) -> ToolResult {
        browser.initialize().await?;

        let active = browser.active_page_id().map(ToString::to_string);
        let pages: Vec<Value> = browser
            .page_ids()
            .into_iter()
            .map(|id| {
                let is_active = Some(id.as_str()) == active.as_deref();
                json!({ "pageId": id, "active": is_active })
            })
            .collect();

        Ok(ToolOutput::text(serde_json::to_string_pretty(&json!({ "pages": pages })).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_no_required_input() {
        let tool = BrowserListPagesTool::new();
        assert_eq!(tool.name(), "browser_list_pages");
        assert!(tool.input_schema()["required"].is_null());
    }
}
