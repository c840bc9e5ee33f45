//! Diff Engine (C7): computes per-page incremental diffs between
//! successive snapshots (§4.7). Pure over two already-resolved
//! `BaseSnapshot`s; never suspends (§5).

use std::collections::{BTreeSet, HashMap};

use crate::model::{
    Atom, BackendNodeId, BaselineReason, ChangedField, Diff, DiffResponse, DocTransition,
    LayerTransition, NavType, NodeKind, ReadableNode, StatusAppeared, TextChanged,
};

/// Roles treated as status-bearing for `mutations.statusAppeared` /
/// `textChanged` tracking (§4.7).
const STATUS_ROLES: &[&str] = &["status", "alert", "log", "progressbar"];

fn is_status_like(node: &ReadableNode) -> bool {
    node.attributes
        .role
        .as_deref()
        .is_some_and(|role| STATUS_ROLES.contains(&role))
}

/// Extract `url`'s pathname, falling back to the whole string on parse
/// failure (hrefs in this system are always absolute by the time they
/// reach the diff engine).
fn pathname(url: &str) -> &str {
    let after_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let after_host = after_scheme.split_once('/').map_or("", |(_, rest)| rest);
    let path_only = after_host.split(['?', '#']).next().unwrap_or("");
    path_only
}

/// Compute the logical layer stack for a snapshot: `["main"]`, or
/// `["main", "modal"]` if any visible `aria-modal` dialog is present.
fn layer_stack(snapshot_nodes: &[ReadableNode]) -> Vec<String> {
    let has_visible_dialog = snapshot_nodes
        .iter()
        .any(|n| n.kind == NodeKind::Dialog && n.state.visible);
    if has_visible_dialog {
        vec!["main".to_string(), "modal".to_string()]
    } else {
        vec!["main".to_string()]
    }
}

fn changed_fields(prev: &ReadableNode, curr: &ReadableNode) -> Vec<ChangedField> {
    let mut changes = Vec::new();
    let eid = curr.node_id.clone();

    macro_rules! field_change {
        ($code:literal, $field:ident) => {
            if prev.state.$field != curr.state.$field {
                changes.push(ChangedField {
                    eid: eid.clone(),
                    code: $code,
                    from: format_opt_bool(prev.state.$field),
                    to: format_opt_bool(curr.state.$field),
                });
            }
        };
    }

    if prev.state.enabled != curr.state.enabled {
        changes.push(ChangedField {
            eid: eid.clone(),
            code: "ena",
            from: prev.state.enabled.to_string(),
            to: curr.state.enabled.to_string(),
        });
    }
    field_change!("chk", checked);
    field_change!("sel", selected);
    field_change!("exp", expanded);
    field_change!("foc", focused);
    field_change!("inv", invalid);

    if prev.attributes.value != curr.attributes.value {
        changes.push(ChangedField {
            eid,
            code: "val",
            from: prev.attributes.value.clone().unwrap_or_default(),
            to: curr.attributes.value.clone().unwrap_or_default(),
        });
    }

    changes
}

fn format_opt_bool(v: Option<bool>) -> String {
    v.map_or_else(|| "undefined".to_string(), |b| b.to_string())
}

/// Compute the diff between two successive snapshots, or `Baseline` when
/// there is no meaningful prior state to compare against (§4.7).
#[must_use]
pub fn diff(
    prev: Option<&crate::model::BaseSnapshot>,
    curr: &crate::model::BaseSnapshot,
) -> DiffResponse {
    let Some(prev) = prev else {
        return DiffResponse::Baseline { reason: BaselineReason::First };
    };
    if prev.document_id != curr.document_id {
        return DiffResponse::Baseline { reason: BaselineReason::Navigated };
    }

    let prev_eids: BTreeSet<&str> = prev
        .nodes
        .iter()
        .filter(|n| n.is_actionable())
        .map(|n| n.node_id.as_str())
        .collect();
    let curr_eids: BTreeSet<&str> = curr
        .nodes
        .iter()
        .filter(|n| n.is_actionable())
        .map(|n| n.node_id.as_str())
        .collect();

    let mut added: Vec<String> = curr_eids.difference(&prev_eids).map(|s| (*s).to_string()).collect();
    let mut removed: Vec<String> = prev_eids.difference(&curr_eids).map(|s| (*s).to_string()).collect();
    added.sort();
    removed.sort();

    let prev_by_eid = prev.by_eid();
    let curr_by_eid = curr.by_eid();

    let mut changed: Vec<ChangedField> = Vec::new();
    for eid in prev_eids.intersection(&curr_eids) {
        if let (Some(prev_node), Some(curr_node)) = (prev_by_eid.get(eid), curr_by_eid.get(eid)) {
            changed.extend(changed_fields(prev_node, curr_node));
        }
    }
    changed.sort_by(|a, b| a.eid.cmp(&b.eid).then(a.code.cmp(b.code)));

    // EID hashes the node's label (eid.rs), so a node whose text actually
    // changes gets a different EID across captures; matching status-like
    // nodes by EID would always miss and misreport every real text change
    // as a brand-new element. Match on `backend_node_id` instead, which
    // identifies the same live element across captures regardless of label.
    let prev_by_backend_id: HashMap<BackendNodeId, &ReadableNode> =
        prev.nodes.iter().map(|n| (n.backend_node_id, n)).collect();

    let mut text_changed: Vec<TextChanged> = Vec::new();
    let mut status_appeared: Vec<StatusAppeared> = Vec::new();
    for curr_node in &curr.nodes {
        if !is_status_like(curr_node) {
            continue;
        }
        match prev_by_backend_id.get(&curr_node.backend_node_id) {
            Some(prev_node) => {
                if prev_node.label != curr_node.label {
                    text_changed.push(TextChanged {
                        eid: curr_node.node_id.clone(),
                        from: truncate(&prev_node.label),
                        to: truncate(&curr_node.label),
                    });
                }
            }
            None => {
                status_appeared.push(StatusAppeared {
                    eid: curr_node.node_id.clone(),
                    role: curr_node.attributes.role.clone().unwrap_or_default(),
                    text: truncate(&curr_node.label),
                });
            }
        }
    }
    text_changed.sort_by(|a, b| a.eid.cmp(&b.eid));
    status_appeared.sort_by(|a, b| a.eid.cmp(&b.eid));

    let doc = (prev.url != curr.url || prev.title != curr.title).then(|| DocTransition {
        from_url: prev.url.clone(),
        from_title: prev.title.clone(),
        to_url: curr.url.clone(),
        to_title: curr.title.clone(),
        nav_type: if pathname(&prev.url) != pathname(&curr.url) {
            NavType::Hard
        } else {
            NavType::Soft
        },
    });

    let prev_layers = layer_stack(&prev.nodes);
    let curr_layers = layer_stack(&curr.nodes);
    let layer = (prev_layers != curr_layers).then(|| LayerTransition {
        from: prev_layers,
        to: curr_layers,
    });

    let mut atoms = Vec::new();
    if prev.viewport.w != curr.viewport.w {
        atoms.push(Atom { key: "viewport.w", from: i64::from(prev.viewport.w), to: i64::from(curr.viewport.w) });
    }
    if prev.viewport.h != curr.viewport.h {
        atoms.push(Atom { key: "viewport.h", from: i64::from(prev.viewport.h), to: i64::from(curr.viewport.h) });
    }

    let diff = Diff { added, removed, changed, text_changed, status_appeared, doc, layer, atoms };
    DiffResponse::Diff { diff }
}

/// Truncate a mutation value for rendering; mirrors the observation
/// accumulator's text cap (§4.7: "values are truncated").
fn truncate(s: &str) -> String {
    const CAP: usize = crate::config::OBSERVATION_TEXT_CAP;
    if s.chars().count() <= CAP {
        return s.to_string();
    }
    let truncated: String = s.chars().take(CAP).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        Attributes, BaseSnapshot, Layout, NodeState, ReadableNode, SemanticRegion, SnapshotMeta,
        Viewport, Where,
    };

    fn button(eid: &str, label: &str, expanded: Option<bool>) -> ReadableNode {
        ReadableNode {
            node_id: eid.to_string(),
            backend_node_id: 1,
            frame_id: "main".to_string(),
            kind: NodeKind::Button,
            label: label.to_string(),
            r#where: Where { region: SemanticRegion::Main, group_id: None, group_path: vec![], heading_context: None },
            layout: Layout::default(),
            state: NodeState { expanded, ..NodeState::default_visible_enabled() },
            attributes: Attributes::default(),
        }
    }

    fn status_node(eid: &str, backend_node_id: BackendNodeId, label: &str, role: &str) -> ReadableNode {
        let mut node = button(eid, label, None);
        node.backend_node_id = backend_node_id;
        node.attributes.role = Some(role.to_string());
        node
    }

    fn snapshot(document_id: &str, url: &str, nodes: Vec<ReadableNode>) -> BaseSnapshot {
        BaseSnapshot {
            snapshot_id: "s".to_string(),
            document_id: document_id.to_string(),
            url: url.to_string(),
            title: "Example".to_string(),
            captured_at_ms: 0,
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            meta: SnapshotMeta { node_count: nodes.len(), interactive_count: nodes.len() },
            nodes,
            degraded: false,
        }
    }

    #[test]
    fn first_capture_is_baseline_first() {
        let curr = snapshot("d1", "https://example.com/", vec![button("button-1", "Go", None)]);
        let response = diff(None, &curr);
        assert!(matches!(response, DiffResponse::Baseline { reason: BaselineReason::First }));
    }

    #[test]
    fn document_change_is_baseline_navigated() {
        let prev = snapshot("d1", "https://example.com/", vec![]);
        let curr = snapshot("d2", "https://example.com/other", vec![]);
        let response = diff(Some(&prev), &curr);
        assert!(matches!(response, DiffResponse::Baseline { reason: BaselineReason::Navigated }));
    }

    #[test]
    fn identical_snapshots_produce_empty_diff() {
        let nodes = vec![button("button-1", "Go", None)];
        let prev = snapshot("d1", "https://example.com/", nodes.clone());
        let curr = snapshot("d1", "https://example.com/", nodes);
        let response = diff(Some(&prev), &curr);
        let DiffResponse::Diff { diff } = response else { panic!("expected diff mode") };
        assert!(diff.is_empty());
    }

    #[test]
    fn expanded_toggle_emits_single_changed_entry() {
        let prev = snapshot("d1", "https://example.com/", vec![button("button-1", "Show more", Some(false))]);
        let curr = snapshot("d1", "https://example.com/", vec![button("button-1", "Show more", Some(true))]);
        let response = diff(Some(&prev), &curr);
        let DiffResponse::Diff { diff } = response else { panic!("expected diff mode") };
        assert_eq!(diff.changed.len(), 1);
        assert_eq!(diff.changed[0].code, "exp");
        assert_eq!(diff.changed[0].from, "false");
        assert_eq!(diff.changed[0].to, "true");
        assert!(diff.added.is_empty() && diff.removed.is_empty());
        assert!(!diff.is_empty());
    }

    #[test]
    fn added_and_removed_are_symmetric_under_swap() {
        let prev = snapshot("d1", "https://example.com/", vec![button("button-1", "A", None)]);
        let curr = snapshot("d1", "https://example.com/", vec![button("button-2", "B", None)]);
        let forward = diff(Some(&prev), &curr);
        let backward = diff(Some(&curr), &prev);
        let DiffResponse::Diff { diff: forward } = forward else { panic!() };
        let DiffResponse::Diff { diff: backward } = backward else { panic!() };
        assert_eq!(forward.added, backward.removed);
        assert_eq!(forward.removed, backward.added);
    }

    #[test]
    fn soft_nav_on_same_pathname() {
        let prev = snapshot("d1", "https://example.com/page#a", vec![]);
        let curr = snapshot("d1", "https://example.com/page#b", vec![]);
        let response = diff(Some(&prev), &curr);
        let DiffResponse::Diff { diff } = response else { panic!() };
        assert_eq!(diff.doc.unwrap().nav_type, NavType::Soft);
    }

    #[test]
    fn dialog_appearing_emits_layer_transition() {
        let prev = snapshot("d1", "https://example.com/", vec![]);
        let mut dialog = button("dialog-1", "Cookie notice", None);
        dialog.kind = NodeKind::Dialog;
        let curr = snapshot("d1", "https://example.com/", vec![dialog]);
        let response = diff(Some(&prev), &curr);
        let DiffResponse::Diff { diff } = response else { panic!() };
        let layer = diff.layer.expect("expected a layer transition");
        assert_eq!(layer.from, vec!["main".to_string()]);
        assert_eq!(layer.to, vec!["main".to_string(), "modal".to_string()]);
    }

    #[test]
    fn status_label_change_is_text_changed_not_status_appeared() {
        // Same live element (backend_node_id 7) across captures, but its
        // label changes, which also changes its EID (eid.rs hashes the
        // label). Matching on EID alone would never find the prior node
        // here and would misreport this as a brand-new status element.
        let prev = snapshot(
            "d1",
            "https://example.com/",
            vec![status_node("status-a", 7, "Saving...", "status")],
        );
        let curr = snapshot(
            "d1",
            "https://example.com/",
            vec![status_node("status-b", 7, "Saved", "status")],
        );
        let response = diff(Some(&prev), &curr);
        let DiffResponse::Diff { diff } = response else { panic!("expected diff mode") };
        assert_eq!(diff.text_changed.len(), 1);
        assert_eq!(diff.text_changed[0].eid, "status-b");
        assert_eq!(diff.text_changed[0].from, "Saving...");
        assert_eq!(diff.text_changed[0].to, "Saved");
        assert!(diff.status_appeared.is_empty());
    }

    #[test]
    fn status_new_backend_node_is_status_appeared() {
        let prev = snapshot("d1", "https://example.com/", vec![]);
        let curr = snapshot(
            "d1",
            "https://example.com/",
            vec![status_node("status-a", 9, "Upload failed", "alert")],
        );
        let response = diff(Some(&prev), &curr);
        let DiffResponse::Diff { diff } = response else { panic!("expected diff mode") };
        assert!(diff.text_changed.is_empty());
        assert_eq!(diff.status_appeared.len(), 1);
        assert_eq!(diff.status_appeared[0].eid, "status-a");
        assert_eq!(diff.status_appeared[0].role, "alert");
    }
}
