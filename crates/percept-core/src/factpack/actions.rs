//! Action selector (§4.5 #4): ranks visible, enabled actionables by
//! category signals and emits a bounded top-N plus a designated primary
//! call to action.

use crate::model::{BaseSnapshot, NodeKind, ReadableNode};

/// The category an actionable's label/kind suggests it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCategory {
    PrimaryCta,
    CartAction,
    Auth,
    FormSubmit,
    Generic,
}

/// A single ranked, categorized action.
#[derive(Debug, Clone)]
pub struct RankedAction {
    pub eid: String,
    pub category: ActionCategory,
    pub score: f64,
}

/// The bounded result of action selection.
#[derive(Debug, Clone)]
pub struct ActionSelection {
    pub top: Vec<RankedAction>,
    pub primary: Option<String>,
}

const MAX_ACTIONS: usize = 10;

const PRIMARY_CTA_KEYWORDS: &[&str] = &["buy now", "get started", "sign up", "start free trial", "subscribe"];
const CART_KEYWORDS: &[&str] = &["add to cart", "add to bag", "checkout", "view cart"];
const AUTH_KEYWORDS: &[&str] = &["log in", "sign in", "log out", "sign out"];
const FORM_SUBMIT_KEYWORDS: &[&str] = &["submit", "save", "continue", "next", "confirm", "place order"];

fn categorize(node: &ReadableNode) -> (ActionCategory, f64) {
    let label = node.label.to_lowercase();
    if PRIMARY_CTA_KEYWORDS.iter().any(|k| label.contains(k)) {
        return (ActionCategory::PrimaryCta, 1.0);
    }
    if CART_KEYWORDS.iter().any(|k| label.contains(k)) {
        return (ActionCategory::CartAction, 0.85);
    }
    if AUTH_KEYWORDS.iter().any(|k| label.contains(k)) {
        return (ActionCategory::Auth, 0.7);
    }
    if FORM_SUBMIT_KEYWORDS.iter().any(|k| label.contains(k)) {
        return (ActionCategory::FormSubmit, 0.6);
    }
    (ActionCategory::Generic, 0.3)
}

/// Select and rank the actionables worth surfacing as candidate next
/// steps (§4.5 #4). Visibility/enabled-ness is already implied by
/// `is_actionable`; screen position breaks ties toward above-the-fold
/// elements.
#[must_use]
pub fn select_actions(snapshot: &BaseSnapshot) -> ActionSelection {
    let mut ranked: Vec<RankedAction> = snapshot
        .nodes
        .iter()
        .filter(|n| n.is_actionable() && n.kind != NodeKind::Dialog)
        .map(|n| {
            let (category, base_score) = categorize(n);
            let above_fold_bonus = if matches!(n.layout.screen_zone, Some(crate::model::ScreenZone::AboveFold)) {
                0.05
            } else {
                0.0
            };
            RankedAction { eid: n.node_id.clone(), category, score: base_score + above_fold_bonus }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal).then(a.eid.cmp(&b.eid)));
    let primary = ranked
        .iter()
        .find(|a| a.category == ActionCategory::PrimaryCta)
        .or_else(|| ranked.first())
        .map(|a| a.eid.clone());

    ranked.truncate(MAX_ACTIONS);

    ActionSelection { top: ranked, primary }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Layout, NodeState, SemanticRegion, SnapshotMeta, Viewport, Where};

    fn button(eid: &str, label: &str) -> ReadableNode {
        ReadableNode {
            node_id: eid.to_string(),
            backend_node_id: 1,
            frame_id: "main".to_string(),
            kind: NodeKind::Button,
            label: label.to_string(),
            r#where: Where { region: SemanticRegion::Main, group_id: None, group_path: vec![], heading_context: None },
            layout: Layout::default(),
            state: NodeState::default_visible_enabled(),
            attributes: Attributes::default(),
        }
    }

    fn snapshot(nodes: Vec<ReadableNode>) -> BaseSnapshot {
        BaseSnapshot {
            snapshot_id: "s".into(),
            document_id: "d".into(),
            url: "https://example.com".into(),
            title: "Example".into(),
            captured_at_ms: 0,
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            meta: SnapshotMeta::default(),
            nodes,
            degraded: false,
        }
    }

    #[test]
    fn primary_cta_outranks_generic_buttons() {
        let snap = snapshot(vec![button("button-1", "Learn more"), button("button-2", "Get Started")]);
        let selection = select_actions(&snap);
        assert_eq!(selection.primary.as_deref(), Some("button-2"));
        assert_eq!(selection.top[0].eid, "button-2");
    }

    #[test]
    fn no_actionables_returns_empty_with_no_primary() {
        let snap = snapshot(vec![]);
        let selection = select_actions(&snap);
        assert!(selection.top.is_empty());
        assert!(selection.primary.is_none());
    }

    #[test]
    fn dialogs_are_excluded_from_action_ranking() {
        let mut dialog = button("dialog-1", "Accept");
        dialog.kind = NodeKind::Dialog;
        let snap = snapshot(vec![dialog]);
        assert!(select_actions(&snap).top.is_empty());
    }
}
