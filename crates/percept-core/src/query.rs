//! Query Engine (C4): an in-memory filter/score index over a snapshot's
//! nodes, consumed by the tool layer's `find-elements` surface and by the
//! FactPack extractors (§4.4).

use crate::model::{BaseSnapshot, NodeKind, NodeState, ReadableNode, SemanticRegion};

/// How a label filter matches candidate labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    Exact,
    Contains,
    Fuzzy,
}

/// State constraints a candidate must satisfy.
#[derive(Debug, Clone, Default)]
pub struct StateFilter {
    pub visible: Option<bool>,
    pub enabled: Option<bool>,
    pub checked: Option<bool>,
}

impl StateFilter {
    fn matches(&self, state: &NodeState) -> bool {
        self.visible.is_none_or(|v| state.visible == v)
            && self.enabled.is_none_or(|v| state.enabled == v)
            && self.checked.is_none_or(|v| state.checked == Some(v))
    }
}

/// A `find` request against a snapshot.
#[derive(Debug, Clone)]
pub struct FindRequest {
    pub kinds: Vec<NodeKind>,
    pub label: Option<(String, LabelMatch)>,
    pub regions: Vec<SemanticRegion>,
    pub state: StateFilter,
    pub group_id: Option<String>,
    pub heading_context: Option<String>,
    pub limit: usize,
    pub min_score: f64,
    pub sort_by_relevance: bool,
}

impl Default for FindRequest {
    fn default() -> Self {
        Self {
            kinds: Vec::new(),
            label: None,
            regions: Vec::new(),
            state: StateFilter::default(),
            group_id: None,
            heading_context: None,
            limit: 20,
            min_score: 0.0,
            sort_by_relevance: true,
        }
    }
}

/// A single scored match.
#[derive(Debug, Clone)]
pub struct FindMatch<'a> {
    pub node: &'a ReadableNode,
    pub score: f64,
}

/// The result of a `find` call: the matches plus, when the top matches are
/// close in score, disambiguation hints for the caller.
#[derive(Debug, Clone)]
pub struct FindResult<'a> {
    pub matches: Vec<FindMatch<'a>>,
    pub ambiguous: bool,
}

const WEIGHT_KIND: f64 = 1.0;
const WEIGHT_REGION: f64 = 1.0;
const WEIGHT_STATE: f64 = 0.5;
const WEIGHT_GROUP: f64 = 0.5;
const WEIGHT_HEADING: f64 = 0.5;
const WEIGHT_LABEL_EXACT: f64 = 2.0;
const WEIGHT_LABEL_CONTAINS: f64 = 1.5;
const WEIGHT_LABEL_FUZZY_BASE: f64 = 1.5;

/// Normalize a label into lowercase whitespace-collapsed tokens for fuzzy
/// comparison.
fn normalize_tokens(s: &str) -> Vec<String> {
    s.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Levenshtein edit distance between two token strings, used as the fuzzy
/// match's quality measure.
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Fuzzy match quality in `0.0..=1.0`: prefix matches score highest,
/// otherwise normalized edit-distance similarity over the closest token.
fn fuzzy_quality(query: &str, label: &str) -> f64 {
    let query = query.to_lowercase();
    let label_tokens = normalize_tokens(label);
    if label_tokens.is_empty() {
        return 0.0;
    }

    label_tokens
        .iter()
        .map(|token| {
            if token.starts_with(&query) || query.starts_with(token.as_str()) {
                return 0.9;
            }
            let dist = levenshtein(&query, token);
            let max_len = query.len().max(token.len()).max(1);
            1.0 - (dist as f64 / max_len as f64)
        })
        .fold(0.0, f64::max)
}

fn label_score(label: &str, query: &str, mode: LabelMatch) -> Option<f64> {
    let label_lower = label.to_lowercase();
    let query_lower = query.to_lowercase();
    match mode {
        LabelMatch::Exact => (label_lower == query_lower).then_some(WEIGHT_LABEL_EXACT),
        LabelMatch::Contains => label_lower.contains(&query_lower).then_some(WEIGHT_LABEL_CONTAINS),
        LabelMatch::Fuzzy => {
            let quality = fuzzy_quality(&query_lower, &label_lower);
            (quality > 0.4).then_some(WEIGHT_LABEL_FUZZY_BASE * quality)
        }
    }
}

fn score_node(node: &ReadableNode, request: &FindRequest) -> Option<f64> {
    let mut score = 0.0;
    let mut max_possible = 0.0;

    if !request.kinds.is_empty() {
        if !request.kinds.contains(&node.kind) {
            return None;
        }
        score += WEIGHT_KIND;
        max_possible += WEIGHT_KIND;
    }

    if !request.regions.is_empty() {
        if !request.regions.contains(&node.r#where.region) {
            return None;
        }
        score += WEIGHT_REGION;
        max_possible += WEIGHT_REGION;
    }

    if let Some(ref group_id) = request.group_id {
        if node.r#where.group_id.as_deref() != Some(group_id.as_str()) {
            return None;
        }
        score += WEIGHT_GROUP;
        max_possible += WEIGHT_GROUP;
    }

    if let Some(ref heading) = request.heading_context {
        if node.r#where.heading_context.as_deref() != Some(heading.as_str()) {
            return None;
        }
        score += WEIGHT_HEADING;
        max_possible += WEIGHT_HEADING;
    }

    if !request.state.matches(&node.state) {
        return None;
    }
    max_possible += WEIGHT_STATE;
    score += WEIGHT_STATE;

    if let Some((ref query, mode)) = request.label {
        max_possible += WEIGHT_LABEL_EXACT.max(WEIGHT_LABEL_FUZZY_BASE);
        match label_score(&node.label, query, mode) {
            Some(s) => score += s,
            None => return None,
        }
    }

    if max_possible <= 0.0 {
        return Some(1.0);
    }
    Some(score / max_possible)
}

/// Run a find request against a compiled snapshot. Pure: no I/O, no
/// suspension (§4.4, §5).
#[must_use]
pub fn find<'a>(snapshot: &'a BaseSnapshot, request: &FindRequest) -> FindResult<'a> {
    let mut matches: Vec<FindMatch<'a>> = snapshot
        .nodes
        .iter()
        .filter_map(|node| {
            let score = score_node(node, request)?;
            (score >= request.min_score).then_some(FindMatch { node, score })
        })
        .collect();

    if request.sort_by_relevance {
        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    }
    matches.truncate(request.limit.max(1));

    let ambiguous = matches.len() > 1
        && (matches[0].score - matches[1].score).abs() < 0.05;

    FindResult { matches, ambiguous }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attributes, Layout, SnapshotMeta, Viewport};

    fn make_node(eid: &str, kind: NodeKind, label: &str, region: SemanticRegion) -> ReadableNode {
        ReadableNode {
            node_id: eid.to_string(),
            backend_node_id: 1,
            frame_id: "main".to_string(),
            kind,
            label: label.to_string(),
            r#where: crate::model::Where { region, group_id: None, group_path: vec![], heading_context: None },
            layout: Layout::default(),
            state: NodeState::default_visible_enabled(),
            attributes: Attributes::default(),
        }
    }

    fn snapshot(nodes: Vec<ReadableNode>) -> BaseSnapshot {
        BaseSnapshot {
            snapshot_id: "s1".to_string(),
            document_id: "d1".to_string(),
            url: "https://example.com".to_string(),
            title: "Example".to_string(),
            captured_at_ms: 0,
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            meta: SnapshotMeta { node_count: nodes.len(), interactive_count: nodes.len() },
            nodes,
            degraded: false,
        }
    }

    #[test]
    fn exact_label_match_outranks_fuzzy() {
        let snap = snapshot(vec![
            make_node("button-1", NodeKind::Button, "Submit", SemanticRegion::Form),
            make_node("button-2", NodeKind::Button, "Submit Now", SemanticRegion::Form),
        ]);
        let request = FindRequest {
            label: Some(("Submit".to_string(), LabelMatch::Exact)),
            ..FindRequest::default()
        };
        let result = find(&snap, &request);
        assert_eq!(result.matches[0].node.node_id, "button-1");
    }

    #[test]
    fn kind_filter_excludes_other_kinds() {
        let snap = snapshot(vec![
            make_node("button-1", NodeKind::Button, "Go", SemanticRegion::Main),
            make_node("link-1", NodeKind::Link, "Go", SemanticRegion::Main),
        ]);
        let request = FindRequest { kinds: vec![NodeKind::Link], ..FindRequest::default() };
        let result = find(&snap, &request);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].node.kind, NodeKind::Link);
    }

    #[test]
    fn fuzzy_match_tolerates_typos() {
        let snap = snapshot(vec![make_node("button-1", NodeKind::Button, "Checkout", SemanticRegion::Form)]);
        let request = FindRequest {
            label: Some(("checkot".to_string(), LabelMatch::Fuzzy)),
            ..FindRequest::default()
        };
        let result = find(&snap, &request);
        assert_eq!(result.matches.len(), 1);
    }

    #[test]
    fn close_scores_are_flagged_ambiguous() {
        let snap = snapshot(vec![
            make_node("button-1", NodeKind::Button, "Next", SemanticRegion::Main),
            make_node("button-2", NodeKind::Button, "Next", SemanticRegion::Main),
        ]);
        let request = FindRequest { kinds: vec![NodeKind::Button], ..FindRequest::default() };
        let result = find(&snap, &request);
        assert!(result.ambiguous);
    }
}
