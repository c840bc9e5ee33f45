//! Snapshot Compiler (C2): fuses the raw DOM/AX/layout trees produced by
//! C1 into a flat, DOM-ordered `Vec<ReadableNode>` (§4.2).
//!
//! The compiler makes a single preorder pass over the fused DOM tree,
//! carrying down the ancestor state each step needs (region, group path,
//! heading context) rather than materializing a cross-linked node graph,
//! per the "shared, cycle-prone structures" design note.

pub mod classify;
pub mod region;
pub mod sanitize;

use std::collections::HashMap;

use crate::eid::{self, EidIdentity};
use crate::model::{
    Attributes, BBox, BaseSnapshot, Layout, NodeKind, NodeState, ReadableNode, ScreenZone,
    SemanticRegion, Viewport, Where,
};
use crate::raw::{RawCapture, RawDomNode};

/// Roles/kinds whose text content is readable node content rather than a
/// label (headings, paragraphs, plain text): label falls back to trimmed
/// visible text for these (§4.2 step 2).
fn label_falls_back_to_text(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Heading | NodeKind::Paragraph | NodeKind::Text | NodeKind::Link)
}

/// Counters produced as a side effect of compilation (§4.2 "Failure
/// semantics").
#[derive(Debug, Clone, Copy, Default)]
pub struct CompileStats {
    pub skipped_nodes: usize,
}

struct Walker<'a> {
    capture: &'a RawCapture,
    out: Vec<ReadableNode>,
    stats: CompileStats,
    /// Per-(region,group,kind,label) bucket ordinal counters, assigned in
    /// document order as the EID scheme's tie-breaker (§4.3).
    bucket_counters: HashMap<(SemanticRegion, Option<String>, NodeKind, String), u32>,
}

impl<'a> Walker<'a> {
    fn new(capture: &'a RawCapture) -> Self {
        Self {
            capture,
            out: Vec::new(),
            stats: CompileStats::default(),
            bucket_counters: HashMap::new(),
        }
    }

    fn shadow_path(&self, node: &RawDomNode) -> Vec<i64> {
        let mut path = Vec::new();
        let mut cursor = node.shadow_host;
        // Walk outward through nested shadow hosts; reverse for
        // outermost-first ordering.
        while let Some(host_id) = cursor {
            path.push(host_id);
            cursor = self
                .capture
                .dom_tree
                .get(&host_id)
                .and_then(|host| host.shadow_host);
        }
        path.reverse();
        path
    }

    fn next_ordinal(
        &mut self,
        region: SemanticRegion,
        group_id: Option<&str>,
        kind: NodeKind,
        label: &str,
    ) -> u32 {
        let key = (region, group_id.map(str::to_string), kind, label.to_string());
        let counter = self.bucket_counters.entry(key).or_insert(0);
        let ordinal = *counter;
        *counter += 1;
        ordinal
    }

    /// Resolve the region/group_path/heading_context a node inherits, by
    /// walking its ancestor chain (capped at `MAX_ANCESTOR_WALK`), plus the
    /// innermost group id computed from the nearest grouping ancestor.
    fn where_for(&self, node: &RawDomNode, inherited_heading: Option<&str>) -> Where {
        let mut region = region::region_for_node(
            self.ax_role(node.backend_node_id),
            node.role_attr.as_deref(),
            &node.tag,
        );
        let mut group_path = Vec::new();
        let mut innermost_group: Option<String> = None;

        let mut cursor = node.parent_backend_node_id;
        let mut depth = 0;
        while let Some(id) = cursor {
            if depth >= region::MAX_ANCESTOR_WALK {
                break;
            }
            let Some(ancestor) = self.capture.dom_tree.get(&id) else {
                break;
            };
            let ax_role = self.ax_role(id);

            if region.is_none() {
                region = region::region_for_node(ax_role, ancestor.role_attr.as_deref(), &ancestor.tag);
            }

            if region::is_grouping_container(ax_role, ancestor.role_attr.as_deref(), &ancestor.tag) {
                let role = ax_role
                    .or(ancestor.role_attr.as_deref())
                    .unwrap_or(&ancestor.tag);
                let name = self
                    .ax_name(id)
                    .or_else(|| inherited_heading.map(str::to_string))
                    .unwrap_or_else(|| id.to_string());
                let group_id = region::group_id_for(role, &name);
                if innermost_group.is_none() {
                    innermost_group = Some(group_id.clone());
                }
                group_path.push(group_id);
            }

            cursor = ancestor.parent_backend_node_id;
            depth += 1;
        }

        group_path.reverse();

        Where {
            region: region.unwrap_or(SemanticRegion::Unknown),
            group_id: innermost_group,
            group_path,
            heading_context: inherited_heading.map(str::to_string),
        }
    }

    fn ax_role(&self, id: i64) -> Option<&str> {
        self.capture.ax_tree.get(&id).and_then(|ax| ax.role.as_deref())
    }

    fn ax_name(&self, id: i64) -> Option<String> {
        self.capture.ax_tree.get(&id).and_then(|ax| ax.name.clone())
    }

    fn state_for(&self, node: &RawDomNode, kind: NodeKind) -> NodeState {
        let ax = self.capture.ax_tree.get(&node.backend_node_id);
        let layout = self.capture.layouts.get(&node.backend_node_id);

        let visible = layout.is_none_or(|l| !l.display_none && !l.visibility_hidden);
        let dom_disabled = node.attributes.contains_key("disabled");
        let enabled = ax
            .and_then(|ax| ax.disabled)
            .map_or(!dom_disabled, |disabled| !disabled);

        let dom_bool = |key: &str| node.attributes.get(key).is_some();
        let aria_bool = |key: &str| {
            node.attributes
                .get(key)
                .map(|v| v == "true")
        };

        NodeState {
            visible,
            enabled,
            checked: ax.and_then(|ax| ax.checked).and_then(|c| c.to_option_bool()),
            expanded: ax.and_then(|ax| ax.expanded).or_else(|| aria_bool("aria-expanded")),
            selected: ax.and_then(|ax| ax.selected).or_else(|| aria_bool("aria-selected")),
            focused: ax.and_then(|ax| ax.focused),
            required: ax
                .and_then(|ax| ax.required)
                .or_else(|| Some(dom_bool("required")))
                .filter(|_| matches!(kind, NodeKind::Input | NodeKind::Textbox | NodeKind::Select | NodeKind::Textarea | NodeKind::Checkbox | NodeKind::Radio)),
            invalid: ax.and_then(|ax| ax.invalid).or_else(|| aria_bool("aria-invalid")),
            readonly: ax
                .and_then(|ax| ax.readonly)
                .or_else(|| Some(dom_bool("readonly")))
                .filter(|_| matches!(kind, NodeKind::Input | NodeKind::Textbox | NodeKind::Textarea)),
        }
    }

    fn attributes_for(&self, node: &RawDomNode, kind: NodeKind) -> Attributes {
        let input_type = node.attributes.get("type").cloned();
        let value = sanitize::sanitize_input_value(input_type.as_deref(), node.attributes.get("value").map(String::as_str));
        let href = matches!(kind, NodeKind::Link)
            .then(|| node.attributes.get("href").map(|h| sanitize::sanitize_href(h)))
            .flatten();
        let heading_level = matches!(kind, NodeKind::Heading)
            .then(|| node.tag.strip_prefix('h').and_then(|n| n.parse().ok()))
            .flatten();

        Attributes {
            input_type,
            placeholder: node.attributes.get("placeholder").cloned(),
            value,
            href,
            alt: node.attributes.get("alt").cloned(),
            src: matches!(kind, NodeKind::Image).then(|| node.attributes.get("src").cloned()).flatten(),
            heading_level,
            action: matches!(kind, NodeKind::Form).then(|| node.attributes.get("action").cloned()).flatten(),
            method: matches!(kind, NodeKind::Form).then(|| node.attributes.get("method").cloned()).flatten(),
            autocomplete: node.attributes.get("autocomplete").cloned(),
            test_id: node
                .attributes
                .get("data-testid")
                .or_else(|| node.attributes.get("data-test"))
                .cloned(),
            role: node.role_attr.clone(),
        }
    }

    fn label_for(&self, node: &RawDomNode, kind: NodeKind) -> String {
        if let Some(name) = self.ax_name(node.backend_node_id).filter(|n| !n.trim().is_empty()) {
            return name;
        }
        if let Some(aria_label) = node.attributes.get("aria-label").filter(|v| !v.trim().is_empty()) {
            return aria_label.clone();
        }
        if label_falls_back_to_text(kind) {
            if let Some(text) = node.text.as_deref() {
                return text.trim().to_string();
            }
        }
        String::new()
    }

    fn layout_for(&self, node: &RawDomNode, viewport: Viewport) -> Layout {
        let Some(info) = self.capture.layouts.get(&node.backend_node_id) else {
            return Layout::default();
        };
        let bbox = BBox {
            x: info.x,
            y: info.y,
            w: info.w,
            h: info.h,
        };
        let screen_zone = if info.y + info.h <= 0.0 {
            None
        } else if info.y >= f64::from(viewport.h) {
            Some(ScreenZone::BelowFold)
        } else if info.y < f64::from(viewport.h) && info.y + info.h > f64::from(viewport.h) {
            Some(ScreenZone::Center)
        } else {
            Some(ScreenZone::AboveFold)
        };
        Layout {
            bbox,
            display: info.display_none.then(|| "none".to_string()),
            visibility: info.visibility_hidden.then(|| "hidden".to_string()),
            z_index: info.z_index,
            screen_zone,
        }
    }

    /// §4.2 step 8: drop purely decorative nodes (no label, no state
    /// signal, no interactive role, no structural function).
    fn is_decorative(node: &ReadableNode) -> bool {
        if node.kind.is_interactive() {
            return false;
        }
        if matches!(
            node.kind,
            NodeKind::Heading
                | NodeKind::Form
                | NodeKind::Dialog
                | NodeKind::Navigation
                | NodeKind::List
                | NodeKind::Table
        ) {
            return false;
        }
        if !node.label.is_empty() {
            return false;
        }
        node.state.checked.is_none()
            && node.state.expanded.is_none()
            && node.attributes.alt.is_none()
            && node.attributes.src.is_none()
    }

    fn walk(&mut self, id: i64, viewport: Viewport, depth: usize, heading_stack: &mut Vec<Option<String>>) {
        heading_stack.truncate(depth);
        let Some(node) = self.capture.dom_tree.get(&id).cloned() else {
            self.stats.skipped_nodes += 1;
            return;
        };

        let inherited_heading = heading_stack.last().cloned().flatten();
        let input_type = node.attributes.get("type").cloned();
        let kind = classify::classify(
            self.ax_role(id),
            node.role_attr.as_deref(),
            &node.tag,
            input_type.as_deref(),
        );

        let label = self.label_for(&node, kind);
        let own_heading = matches!(kind, NodeKind::Heading).then(|| label.clone());

        let mut where_ = self.where_for(&node, inherited_heading.as_deref());
        let state = self.state_for(&node, kind);
        let attributes = self.attributes_for(&node, kind);
        let layout = self.layout_for(&node, viewport);
        let shadow_path = self.shadow_path(&node);

        let ordinal = self.next_ordinal(where_.region, where_.group_id.as_deref(), kind, &label);
        let node_id = eid::compute(EidIdentity {
            kind,
            label: &label,
            frame_id: &node.frame_id,
            region: where_.region,
            group_id: where_.group_id.as_deref(),
            heading_context: where_.heading_context.as_deref(),
            shadow_path: &shadow_path,
            ordinal,
        });

        if where_.heading_context.is_none() {
            where_.heading_context = inherited_heading;
        }

        let readable = ReadableNode {
            node_id,
            backend_node_id: id,
            frame_id: node.frame_id.clone(),
            kind,
            label,
            r#where: where_,
            layout,
            state,
            attributes,
        };

        let keep = !Self::is_decorative(&readable);
        if keep {
            self.out.push(readable);
        }

        heading_stack.push(own_heading.clone().or(inherited_heading.clone()));
        for child in &node.children {
            self.walk(*child, viewport, depth + 1, heading_stack);
        }
        heading_stack.truncate(depth);
        heading_stack.push(own_heading.or(inherited_heading));
    }
}

/// Compile a raw capture into a flat, DOM-ordered list of `ReadableNode`s
/// plus compile-time statistics (§4.2).
#[must_use]
pub fn compile(capture: &RawCapture) -> (Vec<ReadableNode>, CompileStats) {
    let mut walker = Walker::new(capture);
    let mut heading_stack = Vec::new();
    walker.walk(capture.root_backend_node_id, capture.viewport, 0, &mut heading_stack);
    (walker.out, walker.stats)
}

/// Compile a raw capture directly into an immutable [`BaseSnapshot`].
#[must_use]
pub fn compile_snapshot(
    capture: &RawCapture,
    snapshot_id: String,
    captured_at_ms: u64,
) -> BaseSnapshot {
    let (nodes, stats) = compile(capture);
    BaseSnapshot::new(
        snapshot_id,
        capture.document_id.clone(),
        capture.url.clone(),
        capture.title.clone(),
        captured_at_ms,
        capture.viewport,
        nodes,
        capture.degraded.is_degraded() || stats.skipped_nodes > 0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{CaptureDegradation, NodeLayoutInfo, RawAxNode};
    use std::collections::HashMap;

    fn node(id: i64, parent: Option<i64>, tag: &str, children: Vec<i64>) -> RawDomNode {
        RawDomNode {
            backend_node_id: id,
            frame_id: "main".to_string(),
            parent_backend_node_id: parent,
            tag: tag.to_string(),
            role_attr: None,
            attributes: HashMap::new(),
            text: None,
            is_shadow_root: false,
            shadow_host: None,
            children,
        }
    }

    /// A minimal page: <body><h1>Title</h1><button>Go</button></body>
    fn simple_capture() -> RawCapture {
        let mut dom_tree = HashMap::new();
        dom_tree.insert(1, node(1, None, "body", vec![2, 3]));
        let mut heading = node(2, Some(1), "h1", vec![]);
        heading.text = Some("Title".to_string());
        dom_tree.insert(2, heading);
        dom_tree.insert(3, node(3, Some(1), "button", vec![]));

        let mut ax_tree = HashMap::new();
        ax_tree.insert(
            3,
            RawAxNode {
                backend_node_id: 3,
                role: Some("button".to_string()),
                name: Some("Go".to_string()),
                ..Default::default()
            },
        );

        let mut layouts = HashMap::new();
        layouts.insert(2, NodeLayoutInfo { x: 0.0, y: 0.0, w: 100.0, h: 40.0, in_viewport: true, ..Default::default() });
        layouts.insert(3, NodeLayoutInfo { x: 0.0, y: 50.0, w: 80.0, h: 30.0, in_viewport: true, ..Default::default() });

        RawCapture {
            dom_tree,
            ax_tree,
            layouts,
            frame_ids: vec!["main".to_string()],
            shadow_roots: vec![],
            root_backend_node_id: 1,
            document_id: "doc-1".to_string(),
            url: "https://example.com/".to_string(),
            title: "Example".to_string(),
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            degraded: CaptureDegradation::default(),
        }
    }

    #[test]
    fn compiles_button_and_heading() {
        let capture = simple_capture();
        let (nodes, stats) = compile(&capture);
        assert_eq!(stats.skipped_nodes, 0);
        assert!(nodes.iter().any(|n| n.kind == NodeKind::Button && n.label == "Go"));
        assert!(nodes.iter().any(|n| n.kind == NodeKind::Heading && n.label == "Title"));
    }

    #[test]
    fn button_inherits_preceding_heading_context() {
        let capture = simple_capture();
        let (nodes, _) = compile(&capture);
        let button = nodes.iter().find(|n| n.kind == NodeKind::Button).unwrap();
        assert_eq!(button.r#where.heading_context.as_deref(), Some("Title"));
    }

    #[test]
    fn bare_wrapper_div_is_dropped() {
        let mut capture = simple_capture();
        capture.dom_tree.get_mut(&1).unwrap().children.push(4);
        capture.dom_tree.insert(4, node(4, Some(1), "div", vec![]));
        let (nodes, _) = compile(&capture);
        assert!(!nodes.iter().any(|n| n.backend_node_id == 4));
    }

    #[test]
    fn repeated_identical_rows_get_distinct_eids() {
        let mut dom_tree = HashMap::new();
        dom_tree.insert(1, node(1, None, "ul", vec![2, 3]));
        dom_tree.insert(2, node(2, Some(1), "li", vec![]));
        dom_tree.insert(3, node(3, Some(1), "li", vec![]));
        let mut ax_tree = HashMap::new();
        for id in [2, 3] {
            ax_tree.insert(
                id,
                RawAxNode {
                    backend_node_id: id,
                    role: Some("listitem".to_string()),
                    name: Some("Item".to_string()),
                    ..Default::default()
                },
            );
        }
        let capture = RawCapture {
            dom_tree,
            ax_tree,
            layouts: HashMap::new(),
            frame_ids: vec!["main".to_string()],
            shadow_roots: vec![],
            root_backend_node_id: 1,
            document_id: "doc-1".to_string(),
            url: "https://example.com/".to_string(),
            title: "Example".to_string(),
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            degraded: CaptureDegradation::default(),
        };
        let (nodes, _) = compile(&capture);
        let ids: Vec<_> = nodes.iter().filter(|n| n.label == "Item").map(|n| n.node_id.clone()).collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
    }

    #[test]
    fn node_straddling_fold_is_center() {
        let mut capture = simple_capture();
        // Viewport is 800 tall; a hero banner from y=600 to y=1000 starts
        // above the fold and ends below it.
        capture.layouts.insert(3, NodeLayoutInfo { x: 0.0, y: 600.0, w: 80.0, h: 400.0, in_viewport: true, ..Default::default() });
        let (nodes, _) = compile(&capture);
        let button = nodes.iter().find(|n| n.kind == NodeKind::Button).unwrap();
        assert_eq!(button.layout.screen_zone, Some(ScreenZone::Center));
    }

    #[test]
    fn node_fully_above_fold_stays_above_fold() {
        let capture = simple_capture();
        let (nodes, _) = compile(&capture);
        let button = nodes.iter().find(|n| n.kind == NodeKind::Button).unwrap();
        assert_eq!(button.layout.screen_zone, Some(ScreenZone::AboveFold));
    }

    #[test]
    fn node_fully_below_fold_is_below_fold() {
        let mut capture = simple_capture();
        capture.layouts.insert(3, NodeLayoutInfo { x: 0.0, y: 900.0, w: 80.0, h: 30.0, in_viewport: true, ..Default::default() });
        let (nodes, _) = compile(&capture);
        let button = nodes.iter().find(|n| n.kind == NodeKind::Button).unwrap();
        assert_eq!(button.layout.screen_zone, Some(ScreenZone::BelowFold));
    }
}
