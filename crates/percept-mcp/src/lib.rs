//! `percept-mcp`: the ambient stack around the perception engine — an MCP
//! server that drives a live Chromium session through `percept-core`'s
//! capture/compile/diff/render pipeline instead of a raw accessibility-tree
//! dump.

pub mod browser;
pub mod server;
pub mod tools;
pub mod transport;

pub use server::{McpServer, ServerConfig};
