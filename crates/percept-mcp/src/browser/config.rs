//! Browser configuration types

use std::path::PathBuf;

/// Browser launch/connect configuration.
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,

    /// Viewport size applied to newly created pages
    pub viewport: Option<ViewportSize>,

    /// CDP endpoint to connect to (instead of launching a browser)
    pub cdp_endpoint: Option<String>,

    /// User data directory for a persistent profile
    pub user_data_dir: Option<PathBuf>,

    /// Per-CDP-call timeout in milliseconds (§5)
    pub cdp_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: false,
            viewport: None,
            cdp_endpoint: None,
            user_data_dir: None,
            cdp_timeout_ms: percept_core::config::DEFAULT_CDP_TIMEOUT_MS,
        }
    }
}

/// Viewport size configuration.
#[derive(Debug, Clone, Copy)]
pub struct ViewportSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ViewportSize {
    /// Create a new viewport size.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Parse a viewport size from `WxH` format.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is invalid.
    pub fn parse(s: &str) -> Result<Self, String> {
        let (w, h) = s
            .split_once('x')
            .ok_or_else(|| format!("Invalid viewport format: {s}. Expected WxH"))?;
        let width = w.parse().map_err(|_| format!("Invalid width: {w}"))?;
        let height = h.parse().map_err(|_| format!("Invalid height: {h}"))?;
        Ok(Self { width, height })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wxh() {
        let size = ViewportSize::parse("1280x800").unwrap();
        assert_eq!(size.width, 1280);
        assert_eq!(size.height, 800);
    }

    #[test]
    fn rejects_missing_separator() {
        assert!(ViewportSize::parse("1280").is_err());
    }
}
