//! Percept MCP CLI
//!
//! Command-line interface for the Percept MCP server.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use percept_mcp::browser::{BrowserConfig, ViewportSize};
use percept_mcp::transport::{SseConfig, SseTransport, StdioTransport};
use percept_mcp::{McpServer, ServerConfig};
use tracing_subscriber::EnvFilter;

/// Percept MCP Server - page perception for browser-automation agents
#[derive(Parser, Debug)]
#[command(name = "percept-mcp")]
#[command(version)]
#[command(about = "MCP server exposing a page perception and delta engine")]
struct Args {
    /// Run browser in headless mode
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Viewport size (`WxH` format, e.g., "1280x720")
    #[arg(long, value_name = "WxH")]
    viewport_size: Option<String>,

    /// Connect to an existing browser via CDP endpoint
    #[arg(long, value_name = "URL")]
    cdp_endpoint: Option<String>,

    /// User data directory for browser profile persistence
    #[arg(long, value_name = "PATH")]
    user_data_dir: Option<PathBuf>,

    /// Per-CDP-call timeout in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 2000)]
    cdp_timeout_ms: u64,

    /// Port for SSE transport (enables SSE mode instead of stdio)
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// API key for SSE authentication (auto-generated if not provided)
    #[arg(long, value_name = "KEY")]
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).with_target(false).init();

    let args = Args::parse();

    let viewport = args.viewport_size.map(|s| {
        ViewportSize::parse(&s).unwrap_or_else(|e| {
            eprintln!("warning: {e}, using default viewport");
            ViewportSize::new(1280, 800)
        })
    });

    let browser_config = BrowserConfig {
        headless: args.headless,
        viewport,
        cdp_endpoint: args.cdp_endpoint,
        user_data_dir: args.user_data_dir,
        cdp_timeout_ms: args.cdp_timeout_ms,
    };

    let server_config = ServerConfig { browser: browser_config, ..Default::default() };

    let server = McpServer::new(server_config);

    if let Some(port) = args.port {
        let sse_config = match args.api_key {
            Some(key) => SseConfig::with_api_key(port, key),
            None => {
                let config = SseConfig::new(port);
                eprintln!("generated API key: {}", config.api_key);
                config
            }
        };

        let transport = SseTransport::new(server, sse_config);
        transport.run().await?;
    } else {
        if args.api_key.is_some() {
            tracing::warn!("--api-key is ignored in stdio mode");
        }

        let transport = StdioTransport::new(server);
        transport.run().await?;
    }

    Ok(())
}
