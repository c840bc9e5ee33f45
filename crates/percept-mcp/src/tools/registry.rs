//! Tool registration and lookup.

use std::collections::HashMap;
use std::sync::Arc;

use super::traits::Tool;

/// Holds every tool the server can dispatch `tools/call` to.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { tools: HashMap::new() }
    }

    /// Register a tool, keyed by its own reported name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Look up a tool by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// All registered tools, in no particular order.
    #[must_use]
    pub fn list(&self) -> Vec<&Arc<dyn Tool>> {
        self.tools.values().collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use super::*;
    use crate::browser::BrowserState;
    use crate::server::protocol::ToolOutput;
    use crate::tools::error::ToolError;

    struct PingTool;

    #[async_trait]
    impl Tool for PingTool {
        fn name(&self) -> &str {
            "ping"
        }
        fn description(&self) -> &str {
            "replies pong"
        }
        fn input_schema(&self) -> Value {
            json!({ "type": "object" })
        }
        async fn execute(&self, _args: &Value, _browser: &mut BrowserState) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text("pong"))
        }
    }

    #[test]
    fn registers_and_looks_up_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(PingTool));
        assert!(registry.get("ping").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.list().len(), 1);
    }
}
