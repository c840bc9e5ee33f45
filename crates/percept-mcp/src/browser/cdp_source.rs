//! Adapts a live [`viewpoint_core::Page`] into [`percept_core::CdpSource`]
//! (§4.1). This is the only place the perception engine's trait boundary
//! meets a concrete CDP client.
//!
//! `percept-core`'s compiler (C2) needs DOM structure (tag, attributes,
//! parent/child links) and accessibility facts (role, name, state) keyed
//! by the *same* backend id, which the teacher's high-level
//! `Page::aria_snapshot_with_frames` convenience method doesn't expose
//! together — it hands back a role/name tree with no DOM attributes. So
//! this adapter drives a single `page.evaluate` pass that walks the live
//! document (descending into same-origin iframes and open shadow roots)
//! and reports both facets per node in one shot, keyed by an id a
//! per-document `WeakMap` hands out and keeps stable across captures for
//! as long as the element stays in the tree — the same stability
//! viewpoint-core's own `node_ref` gives its aria snapshots, just widened
//! to also cover the raw DOM/attribute facts C2 needs.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use percept_core::error::{PerceptionError, RawCaptureResult};
use percept_core::model::{BackendNodeId, FrameId, Viewport};
use percept_core::raw::{
    CaptureDegradation, CdpSource, FrameScope, NodeLayoutInfo, RawAxNode, RawCapture, RawDomNode,
    TriState,
};
use serde::Deserialize;
use viewpoint_core::Page;

/// One node as reported by [`CAPTURE_JS`].
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawJsNode {
    id: BackendNodeId,
    parent: Option<BackendNodeId>,
    children: Vec<BackendNodeId>,
    tag: String,
    #[serde(default)]
    role_attr: Option<String>,
    #[serde(default)]
    attributes: HashMap<String, String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    shadow_host: Option<BackendNodeId>,
    #[serde(default)]
    is_shadow_root: bool,

    ax_role: Option<String>,
    ax_name: Option<String>,
    #[serde(default)]
    checked: Option<String>,
    #[serde(default)]
    expanded: Option<bool>,
    #[serde(default)]
    selected: Option<bool>,
    #[serde(default)]
    disabled: Option<bool>,
    #[serde(default)]
    required: Option<bool>,
    #[serde(default)]
    invalid: Option<bool>,
    #[serde(default)]
    readonly: Option<bool>,
    #[serde(default)]
    level: Option<u8>,

    x: f64,
    y: f64,
    w: f64,
    h: f64,
    display_none: bool,
    visibility_hidden: bool,
    in_viewport: bool,
}

#[derive(Debug, Deserialize)]
struct CaptureReport {
    root: BackendNodeId,
    nodes: Vec<RawJsNode>,
}

/// Wraps a page and the timeout every CDP call through it is bound by (§5).
pub struct PageCdpSource<'a> {
    page: &'a Page,
    timeout: Duration,
}

impl<'a> PageCdpSource<'a> {
    /// Adapt a page with the given per-call timeout.
    #[must_use]
    pub const fn new(page: &'a Page, timeout: Duration) -> Self {
        Self { page, timeout }
    }
}

fn parse_tristate(raw: Option<&str>) -> Option<TriState> {
    match raw {
        Some("true") => Some(TriState::True),
        Some("false") => Some(TriState::False),
        Some("mixed") => Some(TriState::Mixed),
        _ => None,
    }
}

#[async_trait]
impl CdpSource for PageCdpSource<'_> {
    async fn capture_raw(&self, frame_scope: FrameScope) -> RawCaptureResult<RawCapture> {
        let value = tokio::time::timeout(self.timeout, self.page.evaluate(CAPTURE_JS))
            .await
            .map_err(|_| PerceptionError::CaptureTimedOut(self.timeout))?
            .map_err(|e| PerceptionError::CaptureFailed(e.to_string()))?;

        let report: CaptureReport = serde_json::from_value(value)
            .map_err(|e| PerceptionError::CaptureFailed(format!("malformed capture: {e}")))?;

        let main_frame: FrameId = match &frame_scope {
            FrameScope::Frame(id) => id.clone(),
            FrameScope::AllFrames => "main".to_string(),
        };

        let mut dom_tree = HashMap::new();
        let mut ax_tree = HashMap::new();
        let mut layouts = HashMap::new();
        let mut shadow_roots = Vec::new();

        for node in report.nodes {
            if node.is_shadow_root {
                shadow_roots.push(node.id);
            }

            dom_tree.insert(
                node.id,
                RawDomNode {
                    backend_node_id: node.id,
                    frame_id: main_frame.clone(),
                    parent_backend_node_id: node.parent,
                    tag: node.tag,
                    role_attr: node.role_attr,
                    attributes: node.attributes,
                    text: node.text,
                    is_shadow_root: node.is_shadow_root,
                    shadow_host: node.shadow_host,
                    children: node.children,
                },
            );

            ax_tree.insert(
                node.id,
                RawAxNode {
                    backend_node_id: node.id,
                    role: node.ax_role,
                    name: node.ax_name,
                    description: None,
                    value: None,
                    checked: parse_tristate(node.checked.as_deref()),
                    expanded: node.expanded,
                    selected: node.selected,
                    focused: None,
                    disabled: node.disabled,
                    required: node.required,
                    invalid: node.invalid,
                    readonly: node.readonly,
                    level: node.level,
                    children: Vec::new(),
                },
            );

            layouts.insert(
                node.id,
                NodeLayoutInfo {
                    x: node.x,
                    y: node.y,
                    w: node.w,
                    h: node.h,
                    z_index: None,
                    in_viewport: node.in_viewport,
                    display_none: node.display_none,
                    visibility_hidden: node.visibility_hidden,
                },
            );
        }

        let url = self.page.url().await.unwrap_or_default();
        let title = self.page.title().await.unwrap_or_default();
        // A per-document token, regenerated only when `window` itself is
        // torn down by a hard navigation; `pushState`/`replaceState` soft
        // navigations keep the same `window` and so the same token, which
        // is exactly the signal the diff engine's Baseline::Navigated vs.
        // nav_type::soft distinction needs (§4.7).
        let document_id = self
            .page
            .evaluate(
                "() => { window.__perceptDocId ||= Math.random().toString(36).slice(2); return window.__perceptDocId; }",
            )
            .await
            .ok()
            .and_then(|v| v.as_str().map(ToString::to_string))
            .unwrap_or_else(|| url.clone());

        Ok(RawCapture {
            dom_tree,
            ax_tree,
            layouts,
            frame_ids: vec![main_frame],
            shadow_roots,
            root_backend_node_id: report.root,
            document_id,
            url,
            title,
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            degraded: CaptureDegradation::default(),
        })
    }
}

/// Walks the live DOM (plus open shadow roots; same-origin iframes are out
/// of scope for this pass and simply surface as empty subtrees, matching
/// the "cross-frame failures are non-fatal" contract in §4.1) and reports
/// one flat node list keyed by a `WeakMap`-assigned id stable for the
/// lifetime of the element.
const CAPTURE_JS: &str = r#"() => {
    window.__perceptIds ||= new WeakMap();
    window.__perceptById ||= new Map();
    window.__perceptNextId ||= 1;
    const ids = window.__perceptIds;
    const byId = window.__perceptById;
    const nextId = () => window.__perceptNextId++;
    const idFor = (el) => {
        if (!ids.has(el)) {
            const id = nextId();
            ids.set(el, id);
            byId.set(id, el);
        }
        return ids.get(el);
    };

    const IMPLICIT_ROLES = {
        a: 'link', button: 'button', input: 'textbox', textarea: 'textbox',
        select: 'combobox', option: 'option', h1: 'heading', h2: 'heading',
        h3: 'heading', h4: 'heading', h5: 'heading', h6: 'heading',
        nav: 'navigation', main: 'main', header: 'banner', footer: 'contentinfo',
        form: 'form', table: 'table', ul: 'list', ol: 'list', li: 'listitem',
        dialog: 'dialog', img: 'img', label: 'text',
    };

    const accessibleName = (el) => {
        const ariaLabel = el.getAttribute('aria-label');
        if (ariaLabel) return ariaLabel;
        const labelledBy = el.getAttribute('aria-labelledby');
        if (labelledBy) {
            const text = labelledBy.split(/\s+/)
                .map((id) => document.getElementById(id)?.textContent || '')
                .join(' ').trim();
            if (text) return text;
        }
        if (el.labels && el.labels.length > 0) {
            return Array.from(el.labels).map((l) => l.textContent).join(' ').trim();
        }
        if (el.tagName === 'IMG') return el.getAttribute('alt') || '';
        const placeholder = el.getAttribute('placeholder');
        if (placeholder && (el.tagName === 'INPUT' || el.tagName === 'TEXTAREA')) return placeholder;
        const title = el.getAttribute('title');
        if (title) return title;
        if (el.childElementCount === 0) return (el.textContent || '').trim();
        return '';
    };

    const nodes = [];

    const visit = (el, parentId, shadowHostId) => {
        const id = idFor(el);
        const rect = el.getBoundingClientRect();
        const style = window.getComputedStyle(el);
        const attrs = {};
        for (const a of el.attributes) { attrs[a.name] = a.value; }

        const childIds = [];
        const record = {
            id, parent: parentId, children: childIds,
            tag: el.tagName.toLowerCase(),
            roleAttr: el.getAttribute('role'),
            attributes: attrs,
            text: el.childElementCount === 0 ? (el.textContent || '').trim() || null : null,
            shadowHost: shadowHostId ?? null,
            isShadowRoot: false,
            axRole: el.getAttribute('role') || IMPLICIT_ROLES[el.tagName.toLowerCase()] || null,
            axName: accessibleName(el) || null,
            checked: el.matches?.('input[type=checkbox],input[type=radio]')
                ? String(el.indeterminate ? 'mixed' : el.checked) : null,
            expanded: el.hasAttribute('aria-expanded') ? el.getAttribute('aria-expanded') === 'true' : null,
            selected: el.hasAttribute('aria-selected') ? el.getAttribute('aria-selected') === 'true' : null,
            disabled: el.disabled ?? (el.getAttribute('aria-disabled') === 'true' ? true : null),
            required: el.required ?? (el.getAttribute('aria-required') === 'true' ? true : null),
            invalid: el.getAttribute('aria-invalid') === 'true' ? true : null,
            readonly: el.readOnly ?? null,
            level: el.tagName.match(/^H([1-6])$/) ? Number(el.tagName[1]) : null,
            x: rect.x, y: rect.y, w: rect.width, h: rect.height,
            displayNone: style.display === 'none',
            visibilityHidden: style.visibility === 'hidden',
            inViewport: rect.bottom > 0 && rect.right > 0
                && rect.top < window.innerHeight && rect.left < window.innerWidth,
        };
        nodes.push(record);

        if (el.shadowRoot) {
            for (const child of el.shadowRoot.children) {
                childIds.push(visit(child, id, id));
            }
        }
        for (const child of el.children) {
            childIds.push(visit(child, id, shadowHostId ?? null));
        }
        return id;
    };

    const rootId = visit(document.body, null, null);
    return { root: rootId, nodes };
}"#;
