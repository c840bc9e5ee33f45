//! Form detector (§4.5 #2): identifies form regions (explicit `<form>`,
//! structural, or implicit input clusters) and extracts field semantics.

use crate::model::{BaseSnapshot, NodeKind, ReadableNode, SemanticRegion};

/// Tuning for implicit input-cluster detection, resolving the §9 Open
/// Question about the cluster-distance threshold: configurable rather
/// than hard-coded, default 24px.
#[derive(Debug, Clone, Copy)]
pub struct FormDetectorConfig {
    pub cluster_gap_px: f64,
}

impl Default for FormDetectorConfig {
    fn default() -> Self {
        Self { cluster_gap_px: 24.0 }
    }
}

/// The inferred semantic purpose of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SemanticType {
    Email,
    Password,
    CardNumber,
    CardExpiry,
    CardCvc,
    Name,
    Phone,
    Address,
    PostalCode,
    Search,
    Unknown,
}

/// A single field within a detected form.
#[derive(Debug, Clone)]
pub struct DetectedField {
    pub eid: String,
    pub semantic_type: SemanticType,
    pub required: bool,
    pub filled: bool,
    pub invalid: bool,
}

/// Completion and validity summary for a detected form.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormCompletion {
    pub completion_pct: f64,
    pub error_count: usize,
    pub can_submit: bool,
    pub dirty: bool,
    pub required_count: usize,
    pub filled_required_count: usize,
}

/// A detected form region and its extracted fields.
#[derive(Debug, Clone)]
pub struct DetectedForm {
    pub group_id: Option<String>,
    pub fields: Vec<DetectedField>,
    pub submit_eid: Option<String>,
    pub completion: FormCompletion,
}

/// Infer a field's semantic type via the priority ladder: input type,
/// then autocomplete, then label/placeholder keywords, then naming
/// patterns, then kind fallback (§4.5 #2).
fn infer_semantic_type(node: &ReadableNode) -> SemanticType {
    if let Some(input_type) = node.attributes.input_type.as_deref() {
        match input_type {
            "email" => return SemanticType::Email,
            "password" => return SemanticType::Password,
            "tel" => return SemanticType::Phone,
            "search" => return SemanticType::Search,
            _ => {}
        }
    }

    if let Some(autocomplete) = node.attributes.autocomplete.as_deref() {
        match autocomplete {
            "email" => return SemanticType::Email,
            "current-password" | "new-password" => return SemanticType::Password,
            "cc-number" => return SemanticType::CardNumber,
            "cc-exp" => return SemanticType::CardExpiry,
            "cc-csc" => return SemanticType::CardCvc,
            "name" | "given-name" | "family-name" => return SemanticType::Name,
            "tel" => return SemanticType::Phone,
            "street-address" | "address-line1" => return SemanticType::Address,
            "postal-code" => return SemanticType::PostalCode,
            _ => {}
        }
    }

    let haystack = format!(
        "{} {}",
        node.label.to_lowercase(),
        node.attributes.placeholder.clone().unwrap_or_default().to_lowercase()
    );
    let keyword_matches: &[(&str, SemanticType)] = &[
        ("card number", SemanticType::CardNumber),
        ("card num", SemanticType::CardNumber),
        ("cvc", SemanticType::CardCvc),
        ("cvv", SemanticType::CardCvc),
        ("expiry", SemanticType::CardExpiry),
        ("exp date", SemanticType::CardExpiry),
        ("email", SemanticType::Email),
        ("password", SemanticType::Password),
        ("phone", SemanticType::Phone),
        ("zip", SemanticType::PostalCode),
        ("postal", SemanticType::PostalCode),
        ("address", SemanticType::Address),
        ("name", SemanticType::Name),
        ("search", SemanticType::Search),
    ];
    for (keyword, semantic) in keyword_matches {
        if haystack.contains(keyword) {
            return *semantic;
        }
    }

    match node.kind {
        NodeKind::Searchbox => SemanticType::Search,
        _ => SemanticType::Unknown,
    }
}

fn is_field_kind(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Input
            | NodeKind::Textbox
            | NodeKind::Searchbox
            | NodeKind::Textarea
            | NodeKind::Select
            | NodeKind::Combobox
            | NodeKind::Checkbox
            | NodeKind::Radio
    )
}

fn is_submit_like(node: &ReadableNode) -> bool {
    node.kind == NodeKind::Button
        && {
            let label = node.label.to_lowercase();
            label.contains("submit") || label.contains("continue") || label.contains("next")
                || label.contains("sign up") || label.contains("sign in") || label.contains("save")
                || label.contains("checkout") || label.contains("pay") || label.contains("confirm")
        }
}

fn build_form(group_id: Option<&str>, members: &[&ReadableNode]) -> DetectedForm {
    let fields: Vec<DetectedField> = members
        .iter()
        .filter(|n| is_field_kind(n.kind))
        .map(|n| DetectedField {
            eid: n.node_id.clone(),
            semantic_type: infer_semantic_type(n),
            required: n.state.required.unwrap_or(false),
            filled: n.attributes.value.as_deref().is_some_and(|v| !v.is_empty())
                || n.state.checked == Some(true),
            invalid: n.state.invalid.unwrap_or(false),
        })
        .collect();

    let submit_eid = members.iter().find(|n| is_submit_like(n)).map(|n| n.node_id.clone());

    let required_count = fields.iter().filter(|f| f.required).count();
    let filled_required_count = fields.iter().filter(|f| f.required && f.filled).count();
    let error_count = fields.iter().filter(|f| f.invalid).count();
    let dirty = fields.iter().any(|f| f.filled);
    let completion_pct = if required_count == 0 {
        if fields.is_empty() { 0.0 } else { fields.iter().filter(|f| f.filled).count() as f64 / fields.len() as f64 }
    } else {
        filled_required_count as f64 / required_count as f64
    };
    let can_submit = error_count == 0 && filled_required_count == required_count && submit_eid.is_some();

    DetectedForm {
        group_id: group_id.map(str::to_string),
        fields,
        submit_eid,
        completion: FormCompletion { completion_pct, error_count, can_submit, dirty, required_count, filled_required_count },
    }
}

/// Detect forms: explicit `<form>`/semantic-form groups first (by
/// `group_id`), falling back to clustering ungrouped fields by vertical
/// proximity (`cluster_gap_px`) when no explicit grouping exists.
#[must_use]
pub fn detect_forms(snapshot: &BaseSnapshot, config: &FormDetectorConfig) -> Vec<DetectedForm> {
    let mut grouped: std::collections::BTreeMap<&str, Vec<&ReadableNode>> = std::collections::BTreeMap::new();
    let mut ungrouped: Vec<&ReadableNode> = Vec::new();

    for node in &snapshot.nodes {
        if !is_field_kind(node.kind) && !is_submit_like(node) {
            continue;
        }
        match node.r#where.group_id.as_deref() {
            Some(group_id) if node.r#where.region == SemanticRegion::Form || is_form_group(node) => {
                grouped.entry(group_id).or_default().push(node);
            }
            _ => ungrouped.push(node),
        }
    }

    let mut forms: Vec<DetectedForm> = grouped
        .into_iter()
        .map(|(group_id, members)| build_form(Some(group_id), &members))
        .collect();

    if !ungrouped.is_empty() {
        forms.extend(cluster_ungrouped(&ungrouped, config));
    }

    forms
}

fn is_form_group(node: &ReadableNode) -> bool {
    node.r#where
        .group_id
        .as_deref()
        .is_some_and(|g| g.starts_with("form-"))
}

/// Cluster ungrouped fields into implicit forms by vertical gap: a new
/// cluster starts whenever consecutive fields (sorted by `y`) are farther
/// apart than `cluster_gap_px`.
fn cluster_ungrouped<'a>(fields: &[&'a ReadableNode], config: &FormDetectorConfig) -> Vec<DetectedForm> {
    let mut sorted: Vec<&'a ReadableNode> = fields.to_vec();
    sorted.sort_by(|a, b| a.layout.bbox.y.partial_cmp(&b.layout.bbox.y).unwrap_or(std::cmp::Ordering::Equal));

    let mut clusters: Vec<Vec<&ReadableNode>> = Vec::new();
    let mut current: Vec<&ReadableNode> = Vec::new();
    let mut last_bottom: Option<f64> = None;

    for node in sorted {
        let top = node.layout.bbox.y;
        if let Some(bottom) = last_bottom {
            if top - bottom > config.cluster_gap_px {
                clusters.push(std::mem::take(&mut current));
            }
        }
        last_bottom = Some(node.layout.bbox.y + node.layout.bbox.h);
        current.push(node);
    }
    if !current.is_empty() {
        clusters.push(current);
    }

    clusters.into_iter().map(|members| build_form(None, &members)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, BBox, Layout, NodeState, SnapshotMeta, Viewport, Where};

    fn field(eid: &str, kind: NodeKind, y: f64, group_id: Option<&str>, input_type: Option<&str>) -> ReadableNode {
        ReadableNode {
            node_id: eid.to_string(),
            backend_node_id: 1,
            frame_id: "main".to_string(),
            kind,
            label: String::new(),
            r#where: Where {
                region: if group_id.is_some() { SemanticRegion::Form } else { SemanticRegion::Unknown },
                group_id: group_id.map(str::to_string),
                group_path: vec![],
                heading_context: None,
            },
            layout: Layout { bbox: BBox { x: 0.0, y, w: 200.0, h: 20.0 }, ..Layout::default() },
            state: NodeState::default_visible_enabled(),
            attributes: Attributes { input_type: input_type.map(str::to_string), ..Attributes::default() },
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
    fn semantic_type_from_input_type() {
        let node = field("input-1", NodeKind::Input, 0.0, None, Some("email"));
        assert_eq!(infer_semantic_type(&node), SemanticType::Email);
    }

    #[test]
    fn explicit_form_group_detected() {
        let nodes = vec![
            field("input-1", NodeKind::Input, 0.0, Some("form-login"), Some("email")),
            field("input-2", NodeKind::Input, 40.0, Some("form-login"), Some("password")),
        ];
        let snap = snapshot(nodes);
        let forms = detect_forms(&snap, &FormDetectorConfig::default());
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].fields.len(), 2);
    }

    #[test]
    fn ungrouped_fields_cluster_by_gap() {
        let nodes = vec![
            field("input-1", NodeKind::Input, 0.0, None, None),
            field("input-2", NodeKind::Input, 30.0, None, None),
            field("input-3", NodeKind::Input, 500.0, None, None),
        ];
        let snap = snapshot(nodes);
        let forms = detect_forms(&snap, &FormDetectorConfig::default());
        assert_eq!(forms.len(), 2, "a large vertical gap should start a new cluster");
    }

    #[test]
    fn empty_snapshot_returns_no_forms() {
        let snap = snapshot(vec![]);
        assert!(detect_forms(&snap, &FormDetectorConfig::default()).is_empty());
    }
}
