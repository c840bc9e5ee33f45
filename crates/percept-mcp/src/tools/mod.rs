//! MCP tool definitions (§6): each tool is one agent-facing operation,
//! wrapping the perception engine's capture/compile/diff/render cycle or an
//! action executed against the live page.

mod browser_click;
mod browser_find;
mod browser_list_pages;
mod browser_navigate;
mod browser_perceive;
mod browser_press_key;
mod browser_scroll;
mod browser_type;
pub mod error;
mod perceive;
mod registry;
mod traits;

pub use browser_click::BrowserClickTool;
pub use browser_find::BrowserFindTool;
pub use browser_list_pages::BrowserListPagesTool;
pub use browser_navigate::BrowserNavigateTool;
pub use browser_perceive::BrowserPerceiveTool;
pub use browser_press_key::BrowserPressKeyTool;
pub use browser_scroll::BrowserScrollTool;
pub use browser_type::BrowserTypeTool;
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use traits::{Tool, ToolResult};

use std::sync::Arc;

/// Register every tool this server exposes.
pub fn register_all_tools(registry: &mut ToolRegistry) {
    registry.register(Arc::new(BrowserPerceiveTool::new()));
    registry.register(Arc::new(BrowserNavigateTool::new()));
    registry.register(Arc::new(BrowserClickTool::new()));
    registry.register(Arc::new(BrowserTypeTool::new()));
    registry.register(Arc::new(BrowserPressKeyTool::new()));
    registry.register(Arc::new(BrowserScrollTool::new()));
    registry.register(Arc::new(BrowserFindTool::new()));
    registry.register(Arc::new(BrowserListPagesTool::new()));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_all_eight_tools() {
        let mut registry = ToolRegistry::new();
        register_all_tools(&mut registry);
        assert_eq!(registry.list().len(), 8);
        assert!(registry.get("browser_perceive").is_some());
        assert!(registry.get("browser_list_pages").is_some());
    }
}
