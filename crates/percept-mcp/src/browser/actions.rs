//! Resolves a stable element identity back to the live element an action
//! tool needs to drive, using the same `window.__perceptById` map
//! [`super::cdp_source`] populates during capture.

use percept_core::model::BackendNodeId;
use serde_json::Value;
use viewpoint_core::Page;

use super::error::BrowserError;

async fn run(page: &Page, js: &str) -> Result<Value, BrowserError> {
    page.evaluate(js).await.map_err(|e| BrowserError::NavigationFailed(e.to_string()))
}

/// Click the element with the given id.
///
/// # Errors
///
/// Returns an error if the element can't be found or the click fails.
pub async fn click(page: &Page, id: BackendNodeId, double: bool) -> Result<(), BrowserError> {
    let method = if double { "dblclick" } else { "click" };
    let js = format!(
        "(() => {{ const el = window.__perceptById && window.__perceptById.get({id}); \
         if (!el) return false; el.scrollIntoView({{block: 'center', inline: 'center'}}); \
         el.{method}(); return true; }})()"
    );
    let result = run(page, &js).await?;
    if result == Value::Bool(true) {
        Ok(())
    } else {
        Err(BrowserError::PageNotFound(format!("element {id} not found")))
    }
}

/// Fill an editable element's value and dispatch `input`/`change` events.
///
/// # Errors
///
/// Returns an error if the element can't be found or isn't editable.
pub async fn fill(page: &Page, id: BackendNodeId, text: &str) -> Result<(), BrowserError> {
    let encoded = serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string());
    let js = format!(
        "(() => {{ const el = window.__perceptById && window.__perceptById.get({id}); \
         if (!el) return false; \
         el.focus(); \
         if ('value' in el) {{ el.value = {encoded}; }} else {{ el.textContent = {encoded}; }} \
         el.dispatchEvent(new Event('input', {{ bubbles: true }})); \
         el.dispatchEvent(new Event('change', {{ bubbles: true }})); \
         return true; }})()"
    );
    let result = run(page, &js).await?;
    if result == Value::Bool(true) {
        Ok(())
    } else {
        Err(BrowserError::PageNotFound(format!("element {id} not found")))
    }
}

/// Scroll the element with the given id into view.
///
/// # Errors
///
/// Returns an error if the element can't be found.
pub async fn scroll_into_view(page: &Page, id: BackendNodeId) -> Result<(), BrowserError> {
    let js = format!(
        "(() => {{ const el = window.__perceptById && window.__perceptById.get({id}); \
         if (!el) return false; el.scrollIntoView({{block: 'center', inline: 'center'}}); \
         return true; }})()"
    );
    let result = run(page, &js).await?;
    if result == Value::Bool(true) {
        Ok(())
    } else {
        Err(BrowserError::PageNotFound(format!("element {id} not found")))
    }
}
