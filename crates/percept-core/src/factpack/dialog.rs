//! Dialog detector (§4.5 #1): locates `role=dialog` / `aria-modal`
//! elements and classifies them by keyword/region heuristics.

use crate::model::{BaseSnapshot, NodeKind, SemanticRegion};

/// The kind of dialog a detected dialog most likely is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogCategory {
    CookieConsent,
    Auth,
    Error,
    Generic,
}

/// A single detected dialog element and its classification.
#[derive(Debug, Clone)]
pub struct DetectedDialog {
    pub eid: String,
    pub category: DialogCategory,
    pub confidence: f64,
}

const COOKIE_KEYWORDS: &[&str] = &["cookie", "consent", "gdpr", "privacy preferences"];
const AUTH_KEYWORDS: &[&str] = &["sign in", "log in", "login", "sign up", "register", "password"];
const ERROR_KEYWORDS: &[&str] = &["error", "something went wrong", "failed", "oops"];

/// Classify a dialog's label text into a category, with a confidence
/// reflecting how distinctive the matched keyword was.
fn classify_label(label: &str) -> (DialogCategory, f64) {
    let lower = label.to_lowercase();
    if let Some(kw) = COOKIE_KEYWORDS.iter().find(|k| lower.contains(*k)) {
        return (DialogCategory::CookieConsent, keyword_confidence(kw));
    }
    if let Some(kw) = AUTH_KEYWORDS.iter().find(|k| lower.contains(*k)) {
        return (DialogCategory::Auth, keyword_confidence(kw));
    }
    if let Some(kw) = ERROR_KEYWORDS.iter().find(|k| lower.contains(*k)) {
        return (DialogCategory::Error, keyword_confidence(kw));
    }
    (DialogCategory::Generic, 0.3)
}

fn keyword_confidence(keyword: &str) -> f64 {
    // Longer, more specific keywords carry higher confidence than short
    // generic ones.
    (0.5 + (keyword.len() as f64 / 40.0)).min(0.95)
}

/// Detect every dialog-kind node and classify it, scanning its own label
/// plus (when it carries no distinctive label of its own) the labels of
/// its grouped descendants via `group_id`, to handle dialogs whose
/// heading is a separate child node.
#[must_use]
pub fn detect_dialogs(snapshot: &BaseSnapshot) -> Vec<DetectedDialog> {
    snapshot
        .nodes
        .iter()
        .filter(|n| n.kind == NodeKind::Dialog || n.r#where.region == SemanticRegion::Dialog)
        .map(|dialog| {
            let mut search_text = dialog.label.clone();
            if search_text.trim().is_empty() {
                if let Some(group_id) = dialog.r#where.group_id.as_deref() {
                    let child_labels: Vec<&str> = snapshot
                        .nodes
                        .iter()
                        .filter(|n| n.r#where.group_id.as_deref() == Some(group_id) && !n.label.is_empty())
                        .map(|n| n.label.as_str())
                        .collect();
                    search_text = child_labels.join(" ");
                }
            }
            let (category, confidence) = classify_label(&search_text);
            DetectedDialog { eid: dialog.node_id.clone(), category, confidence }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Layout, NodeState, ReadableNode, SnapshotMeta, Viewport, Where};

    fn dialog_node(eid: &str, label: &str) -> ReadableNode {
        ReadableNode {
            node_id: eid.to_string(),
            backend_node_id: 1,
            frame_id: "main".to_string(),
            kind: NodeKind::Dialog,
            label: label.to_string(),
            r#where: Where { region: SemanticRegion::Dialog, group_id: None, group_path: vec![], heading_context: None },
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
            meta: SnapshotMeta { node_count: nodes.len(), interactive_count: 0 },
            nodes,
            degraded: false,
        }
    }

    #[test]
    fn classifies_cookie_banner() {
        let snap = snapshot(vec![dialog_node("dialog-1", "We use cookies to improve your experience")]);
        let dialogs = detect_dialogs(&snap);
        assert_eq!(dialogs.len(), 1);
        assert_eq!(dialogs[0].category, DialogCategory::CookieConsent);
    }

    #[test]
    fn unrecognized_label_is_generic_with_low_confidence() {
        let snap = snapshot(vec![dialog_node("dialog-1", "Subscribe to our newsletter")]);
        let dialogs = detect_dialogs(&snap);
        assert_eq!(dialogs[0].category, DialogCategory::Generic);
        assert!(dialogs[0].confidence < 0.5);
    }

    #[test]
    fn no_dialogs_returns_empty_not_error() {
        let snap = snapshot(vec![]);
        assert!(detect_dialogs(&snap).is_empty());
    }
}
