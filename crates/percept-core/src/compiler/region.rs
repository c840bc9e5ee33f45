//! Region resolution and grouping (§4.2 steps 3-4): mapping AX landmark
//! roles, DOM `role` attributes, and HTML5 sectioning tags to
//! [`SemanticRegion`], and identifying the grouping containers a node's
//! `group_id`/`group_path` are derived from.

use crate::model::SemanticRegion;

/// Resolve a semantic region from an AX landmark role.
fn region_from_ax_role(role: &str) -> Option<SemanticRegion> {
    Some(match role {
        "banner" => SemanticRegion::Header,
        "navigation" => SemanticRegion::Nav,
        "main" => SemanticRegion::Main,
        "complementary" => SemanticRegion::Aside,
        "contentinfo" => SemanticRegion::Footer,
        "dialog" | "alertdialog" => SemanticRegion::Dialog,
        "form" => SemanticRegion::Form,
        "search" => SemanticRegion::Search,
        _ => return None,
    })
}

/// Resolve a semantic region from an HTML5 sectioning tag, used as a
/// fallback when neither an AX landmark role nor a DOM `role` attribute is
/// present (§4.2 step 3: "HTML5 sectioning tag" ranks below both roles).
fn region_from_tag(tag: &str) -> Option<SemanticRegion> {
    Some(match tag {
        "header" => SemanticRegion::Header,
        "nav" => SemanticRegion::Nav,
        "main" => SemanticRegion::Main,
        "aside" => SemanticRegion::Aside,
        "footer" => SemanticRegion::Footer,
        "dialog" => SemanticRegion::Dialog,
        "form" => SemanticRegion::Form,
        _ => return None,
    })
}

/// Maximum ancestor chain depth walked while resolving a region or a
/// group (§4.2 step 3: "capped at 50 levels").
pub const MAX_ANCESTOR_WALK: usize = 50;

/// Resolve the region a single node carries directly, trying AX role, then
/// the DOM `role` attribute, then the sectioning tag, in that priority.
#[must_use]
pub fn region_for_node(ax_role: Option<&str>, dom_role_attr: Option<&str>, tag: &str) -> Option<SemanticRegion> {
    ax_role
        .and_then(region_from_ax_role)
        .or_else(|| dom_role_attr.and_then(region_from_ax_role))
        .or_else(|| region_from_tag(tag))
}

/// Roles/tags that form a grouping boundary for `group_id`/`group_path`
/// (§4.2 step 4's fixed set).
const GROUPING_ROLES: &[&str] = &[
    "form",
    "list",
    "menu",
    "navigation",
    "table",
    "tablist",
    "radiogroup",
    "fieldset",
    "article",
    "region",
];

/// Tags that are treated as grouping containers even without an explicit
/// role, mirroring the HTML elements that imply the roles above.
const GROUPING_TAGS: &[&str] = &[
    "form", "ul", "ol", "menu", "nav", "table", "fieldset", "article", "section",
];

/// Whether a node (identified by AX role, DOM role attribute, or tag) is a
/// grouping container.
#[must_use]
pub fn is_grouping_container(ax_role: Option<&str>, dom_role_attr: Option<&str>, tag: &str) -> bool {
    let role_match = |role: &str| GROUPING_ROLES.contains(&role);
    ax_role.is_some_and(role_match)
        || dom_role_attr.is_some_and(role_match)
        || GROUPING_TAGS.contains(&tag)
}

/// Maximum length of a slugified group id (§4.2 step 4: "truncated to 40
/// chars").
const GROUP_ID_MAX_LEN: usize = 40;

/// Build a `group_id` as `role-slug(name)` for a single grouping ancestor,
/// using its role, its computed name (falling back to the nearest heading
/// context, then to its backend id) as the slug source.
#[must_use]
pub fn group_id_for(role: &str, name_or_heading_or_id: &str) -> String {
    let slug = slugify(name_or_heading_or_id);
    let mut id = format!("{role}-{slug}");
    if id.len() > GROUP_ID_MAX_LEN {
        id.truncate(GROUP_ID_MAX_LEN);
    }
    id
}

fn slugify(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_was_dash = false;
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash && !out.is_empty() {
            out.push('-');
            last_was_dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ax_role_resolves_region() {
        assert_eq!(region_for_node(Some("main"), None, "div"), Some(SemanticRegion::Main));
    }

    #[test]
    fn tag_fallback_when_no_roles() {
        assert_eq!(region_for_node(None, None, "footer"), Some(SemanticRegion::Footer));
    }

    #[test]
    fn no_match_returns_none() {
        assert_eq!(region_for_node(None, None, "div"), None);
    }

    #[test]
    fn group_id_is_slugified_and_capped() {
        let id = group_id_for("form", "Checkout: Shipping & Billing Details");
        assert!(id.starts_with("form-checkout-shipping"));
        assert!(id.len() <= GROUP_ID_MAX_LEN);
    }

    #[test]
    fn grouping_container_detects_fixed_set() {
        assert!(is_grouping_container(Some("form"), None, "div"));
        assert!(is_grouping_container(None, None, "table"));
        assert!(!is_grouping_container(None, None, "span"));
    }
}
