//! Browser and page lifecycle management.

use std::collections::HashMap;
use std::time::Duration;

use percept_core::SnapshotStore;
use tokio::sync::Mutex;
use viewpoint_core::{Browser, BrowserContext, Page};

use super::config::BrowserConfig;
use super::error::BrowserError;

/// A single open page together with the perception state scoped to it.
///
/// §5 requires per-page operations to be serialized by a page-level mutex;
/// wrapping the [`SnapshotStore`] (rather than the whole handle) in the
/// mutex is enough, since the `Page` handle itself is already safe to use
/// concurrently and every suspension point lives in the `CdpSource` call,
/// not in store access.
pub struct PageHandle {
    page: Page,
    store: Mutex<SnapshotStore>,
}

impl PageHandle {
    fn new(page: Page) -> Self {
        Self { page, store: Mutex::new(SnapshotStore::new()) }
    }

    /// The underlying Viewpoint page.
    #[must_use]
    pub const fn page(&self) -> &Page {
        &self.page
    }

    /// Lock this page's snapshot store for the duration of one tool call.
    pub async fn store(&self) -> tokio::sync::MutexGuard<'_, SnapshotStore> {
        self.store.lock().await
    }
}

/// Manages a single browser instance, its one implicit context, and the
/// set of open pages.
///
/// Mirrors the teacher's `BrowserState`/`ContextState` split, but collapses
/// multi-context support: the tool surface this server exposes
/// (`browser_perceive`/`browser_navigate`/... — §6) has no context-management
/// tools, so a single context is sufficient.
pub struct BrowserState {
    config: BrowserConfig,
    initialized: bool,
    browser: Option<Browser>,
    context: Option<BrowserContext>,
    pages: HashMap<String, PageHandle>,
    active_page_id: Option<String>,
}

impl std::fmt::Debug for BrowserState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserState")
            .field("initialized", &self.initialized)
            .field("pages", &self.pages.keys().collect::<Vec<_>>())
            .field("active_page_id", &self.active_page_id)
            .finish_non_exhaustive()
    }
}

impl BrowserState {
    /// Create a new, uninitialized browser state manager.
    #[must_use]
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            initialized: false,
            browser: None,
            context: None,
            pages: HashMap::new(),
            active_page_id: None,
        }
    }

    /// The configured per-CDP-call timeout (§5).
    #[must_use]
    pub fn cdp_timeout(&self) -> Duration {
        Duration::from_millis(self.config.cdp_timeout_ms)
    }

    /// Lazily launch (or connect to) the browser and open its first page.
    ///
    /// # Errors
    ///
    /// Returns an error if browser launch, connection, or context/page
    /// creation fails.
    pub async fn initialize(&mut self) -> super::Result<()> {
        if self.initialized {
            return Ok(());
        }

        tracing::info!(
            headless = self.config.headless,
            cdp_endpoint = ?self.config.cdp_endpoint,
            "initializing browser"
        );

        let browser = if let Some(endpoint) = &self.config.cdp_endpoint {
            if endpoint.starts_with("ws://") || endpoint.starts_with("wss://") {
                Browser::connect(endpoint)
                    .await
                    .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?
            } else {
                Browser::connect_over_cdp(endpoint)
                    .connect()
                    .await
                    .map_err(|e| BrowserError::ConnectionFailed(e.to_string()))?
            }
        } else {
            let mut launcher = Browser::launch().headless(self.config.headless);
            if let Some(user_data_dir) = &self.config.user_data_dir {
                launcher = launcher.user_data_dir(user_data_dir);
            }
            launcher.launch().await.map_err(|e| BrowserError::LaunchFailed(e.to_string()))?
        };

        let context = browser
            .new_context()
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        self.browser = Some(browser);
        self.context = Some(context);
        self.initialized = true;

        self.new_page().await?;
        Ok(())
    }

    /// Shut down the browser and drop all page state.
    pub async fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        tracing::info!("shutting down browser");
        self.pages.clear();
        self.active_page_id = None;
        self.context = None;
        if let Some(browser) = self.browser.take() {
            let _ = browser.close().await;
        }
        self.initialized = false;
    }

    /// Open a new page in the implicit context and make it active.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser hasn't been initialized or page
    /// creation fails.
    pub async fn new_page(&mut self) -> super::Result<String> {
        let context = self.context.as_mut().ok_or(BrowserError::NotRunning)?;
        let page = context
            .new_page()
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let id = page.target_id().to_string();
        self.pages.insert(id.clone(), PageHandle::new(page));
        self.active_page_id = Some(id.clone());
        Ok(id)
    }

    /// The currently active page.
    ///
    /// Callers must have already run [`Self::initialize`] (tools do this as
    /// their first step, per the teacher's convention) — this takes `&self`
    /// so a caller can hold the returned handle alongside other `&self`
    /// accessors like [`Self::cdp_timeout`].
    ///
    /// # Errors
    ///
    /// Returns an error if the browser hasn't been initialized.
    pub fn active_page(&self) -> super::Result<&PageHandle> {
        let id = self.active_page_id.as_deref().ok_or(BrowserError::NotRunning)?;
        self.pages.get(id).ok_or_else(|| BrowserError::PageNotFound(id.to_string()))
    }

    /// Look up a page by its handle id.
    ///
    /// # Errors
    ///
    /// Returns an error if no page with that id is open.
    pub fn page(&self, id: &str) -> super::Result<&PageHandle> {
        self.pages.get(id).ok_or_else(|| BrowserError::PageNotFound(id.to_string()))
    }

    /// Switch the active page.
    ///
    /// # Errors
    ///
    /// Returns an error if no page with that id is open.
    pub fn switch_active(&mut self, id: &str) -> super::Result<()> {
        if !self.pages.contains_key(id) {
            return Err(BrowserError::PageNotFound(id.to_string()));
        }
        self.active_page_id = Some(id.to_string());
        Ok(())
    }

    /// The handle ids of all open pages, in insertion order.
    #[must_use]
    pub fn page_ids(&self) -> Vec<String> {
        self.pages.keys().cloned().collect()
    }

    /// The active page's handle id, if any.
    #[must_use]
    pub fn active_page_id(&self) -> Option<&str> {
        self.active_page_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_not_initialized() {
        let state = BrowserState::new(BrowserConfig::default());
        assert!(!state.initialized);
        assert!(state.active_page_id().is_none());
    }
}
