//! `browser_find`: runs a find request against the current snapshot (§4.4),
//! without driving a new capture.

use async_trait::async_trait;
use percept_core::query::{FindRequest, LabelMatch, StateFilter};
use serde::Deserialize;
use serde_json::{Value, json};

use super::traits::{Tool, ToolResult};
use crate::browser::BrowserState;
use crate::server::protocol::ToolOutput;
use crate::tools::error::ToolError;

/// Searches the most recent perceived snapshot for elements matching a
/// label, without re-capturing the page.
pub struct BrowserFindTool;

impl BrowserFindTool {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Default for BrowserFindTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize, Default)]
struct BrowserFindInput {
    label: Option<String>,
    #[serde(default)]
    exact: bool,
    #[serde(default = "default_limit")]
    limit: usize,
}

const fn default_limit() -> usize {
    20
}

#[async_trait]
impl Tool for BrowserFindTool {
    fn name(&self) -> &str {
        "browser_find"
    }

    fn description(&self) -> &str {
        "Search the most recently perceived snapshot for elements whose \
         label matches the given text, without re-capturing the page. Run \
         browser_perceive first if no snapshot has been taken yet."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "label": {
                    "type": "string",
                    "description": "Text to match against element labels (fuzzy by default)"
                },
                "exact": {
                    "type": "boolean",
                    "default": false,
                    "description": "Require an exact label match instead of fuzzy matching"
                },
                "limit": {
                    "type": "integer",
                    "default": 20,
                    "description": "Maximum number of matches to return"
                }
            }
        })
    }

    async fn execute(&self, args: &Value, browser: &mut BrowserState) -> ToolResult {
        let input: BrowserFindInput =
            serde_json::from_value(args.clone()).map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        browser.initialize().await?;
        let handle = browser.active_page()?;
        let store = handle.store().await;
        let snapshot = store
            .previous()
            .ok_or_else(|| ToolError::ElementNotFound("no snapshot has been taken yet".to_string()))?;

        let request = FindRequest {
            label: input.label.map(|l| (l, if input.exact { LabelMatch::Exact } else { LabelMatch::Fuzzy })),
            state: StateFilter::default(),
            limit: input.limit,
            ..FindRequest::default()
        };

        let result = percept_core::query::find(snapshot, &request);

        let matches: Vec<Value> = result
            .matches
            .iter()
            .map(|m| {
                json!({
                    "eid": m.node.node_id,
                    "kind": format!("{:?}", m.node.kind),
                    "label": m.node.label,
                    "score": m.score,
                })
            })
            .collect();

        let body = json!({ "matches": matches, "ambiguous": result.ambiguous });
        Ok(ToolOutput::text(serde_json::to_string_pretty(&body).unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limit_is_twenty() {
        let input: BrowserFindInput = serde_json::from_value(json!({})).unwrap();
        assert_eq!(input.limit, 20);
    }
}
