//! Element Identity (C3): stable, content-addressed element ids.
//!
//! Generalizes the teacher's reference-hashing scheme (`id` > `testid` >
//! `name` > role+name+path priority ladder, `DefaultHasher`, truncated hex)
//! from a 4-input fallback ladder to the 8-field semantic identity tuple
//! §4.3 requires: an EID must be stable across scroll, minor mutations, and
//! benign re-captures, yet distinct for structurally distinct elements.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::model::{NodeKind, SemanticRegion};

/// The identity tuple an EID is computed from. Deliberately excludes
/// `backend_node_id`, scroll offsets, pixel positions, and transient text
/// (§4.3 rule).
#[derive(Debug, Clone, Copy)]
pub struct EidIdentity<'a> {
    pub kind: NodeKind,
    pub label: &'a str,
    pub frame_id: &'a str,
    pub region: SemanticRegion,
    pub group_id: Option<&'a str>,
    pub heading_context: Option<&'a str>,
    /// Outermost-first sequence of shadow-host backend ids, so two
    /// shadow-scoped elements with identical labels never collide.
    pub shadow_path: &'a [i64],
    /// Position within the same (region, group, kind, label) bucket, in
    /// document order; disambiguates repeated identical rows.
    pub ordinal: u32,
}

/// Normalize a label before hashing: trim and collapse internal whitespace,
/// so formatting-only differences between captures never change identity.
#[must_use]
pub fn normalize_label(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Compute the stable EID for a node's identity tuple.
///
/// Readable-content kinds (text, paragraph) use the `rd-` prefix rather
/// than their tag name, per §4.3 ("readable-content variants use a
/// separate prefix"); everything else is prefixed by its kind's tag name
/// for readability.
#[must_use]
pub fn compute(identity: EidIdentity<'_>) -> String {
    let mut hasher = DefaultHasher::new();

    identity.kind.hash(&mut hasher);
    normalize_label(identity.label).hash(&mut hasher);
    identity.frame_id.hash(&mut hasher);
    identity.region.hash(&mut hasher);
    identity.group_id.unwrap_or("").hash(&mut hasher);
    identity.heading_context.unwrap_or("").hash(&mut hasher);
    identity.shadow_path.hash(&mut hasher);
    identity.ordinal.hash(&mut hasher);

    let prefix = match identity.kind {
        NodeKind::Text | NodeKind::Paragraph => "rd",
        other => other.tag_name(),
    };

    format!("{prefix}-{}", format_hash(hasher.finish()))
}

/// Truncate a 64-bit hash to an 8-hex-char prefix (§4.3: "truncated to a
/// short prefix, e.g., 8 hex chars").
fn format_hash(hash: u64) -> String {
    let short_hash = hash & 0xFFFF_FFFF;
    format!("{short_hash:08x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_identity() -> EidIdentity<'static> {
        EidIdentity {
            kind: NodeKind::Button,
            label: "Submit",
            frame_id: "frame-1",
            region: SemanticRegion::Form,
            group_id: Some("form-checkout"),
            heading_context: None,
            shadow_path: &[],
            ordinal: 0,
        }
    }

    #[test]
    fn stable_across_repeated_computation() {
        // P1: two captures with identical identity yield identical EIDs.
        let a = compute(base_identity());
        let b = compute(base_identity());
        assert_eq!(a, b);
    }

    #[test]
    fn prefixed_by_kind() {
        let eid = compute(base_identity());
        assert!(eid.starts_with("button-"));
    }

    #[test]
    fn readable_content_uses_rd_prefix() {
        let mut identity = base_identity();
        identity.kind = NodeKind::Text;
        let eid = compute(identity);
        assert!(eid.starts_with("rd-"));
    }

    #[test]
    fn differs_on_shadow_path() {
        let a = compute(base_identity());
        let mut identity = base_identity();
        identity.shadow_path = &[42];
        let b = compute(identity);
        assert_ne!(a, b, "shadow-scoped elements must not collide");
    }

    #[test]
    fn differs_on_ordinal() {
        let a = compute(base_identity());
        let mut identity = base_identity();
        identity.ordinal = 1;
        let b = compute(identity);
        assert_ne!(a, b, "repeated identical rows must not collide");
    }

    #[test]
    fn whitespace_normalization_does_not_change_identity() {
        let mut identity = base_identity();
        identity.label = "  Submit   Order ";
        let a = compute(identity);
        identity.label = "Submit Order";
        let b = compute(identity);
        assert_eq!(a, b);
    }

    #[test]
    fn label_text_changes_identity() {
        let a = compute(base_identity());
        let mut identity = base_identity();
        identity.label = "Cancel";
        let b = compute(identity);
        assert_ne!(a, b);
    }
}
