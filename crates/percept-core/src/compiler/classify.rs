//! Kind classification: AX role, DOM tag, and DOM `role` attribute fused
//! into a single [`NodeKind`], generalizing the teacher's three-tier
//! interactive/contextual/structural role table into the closed `NodeKind`
//! sum (§4.2 step 1).

use crate::model::NodeKind;

/// Roles that map directly to a `NodeKind`, tried before any tag-based
/// fallback (AX role wins, §4.2 step 1).
fn kind_from_role(role: &str) -> Option<NodeKind> {
    Some(match role {
        "button" => NodeKind::Button,
        "link" => NodeKind::Link,
        "textbox" => NodeKind::Textbox,
        "searchbox" => NodeKind::Searchbox,
        "combobox" => NodeKind::Combobox,
        "listbox" | "select" => NodeKind::Select,
        "checkbox" => NodeKind::Checkbox,
        "radio" => NodeKind::Radio,
        "switch" => NodeKind::Switch,
        "slider" | "spinbutton" => NodeKind::Slider,
        "menuitem" | "menuitemcheckbox" | "menuitemradio" => NodeKind::Menuitem,
        "option" => NodeKind::Option,
        "tab" => NodeKind::Tab,
        "textarea" => NodeKind::Textarea,
        "heading" => NodeKind::Heading,
        "paragraph" => NodeKind::Paragraph,
        "text" | "statictext" => NodeKind::Text,
        "img" | "image" | "figure" => NodeKind::Image,
        "list" => NodeKind::List,
        "listitem" => NodeKind::Listitem,
        "table" | "grid" => NodeKind::Table,
        "form" => NodeKind::Form,
        "dialog" | "alertdialog" => NodeKind::Dialog,
        "navigation" => NodeKind::Navigation,
        _ => return None,
    })
}

/// Tag-based fallback used when the AX role is absent or unmapped.
fn kind_from_tag(tag: &str) -> Option<NodeKind> {
    Some(match tag {
        "button" => NodeKind::Button,
        "a" => NodeKind::Link,
        "textarea" => NodeKind::Textarea,
        "select" => NodeKind::Select,
        "input" => NodeKind::Input,
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => NodeKind::Heading,
        "p" => NodeKind::Paragraph,
        "img" => NodeKind::Image,
        "ul" | "ol" | "menu" => NodeKind::List,
        "li" => NodeKind::Listitem,
        "table" => NodeKind::Table,
        "form" => NodeKind::Form,
        "dialog" => NodeKind::Dialog,
        "nav" => NodeKind::Navigation,
        _ => return None,
    })
}

/// `<input type=...>` refines the generic `input` kind into a more
/// specific interactive kind.
fn kind_from_input_type(input_type: &str) -> NodeKind {
    match input_type {
        "checkbox" => NodeKind::Checkbox,
        "radio" => NodeKind::Radio,
        "range" => NodeKind::Slider,
        "search" => NodeKind::Searchbox,
        _ => NodeKind::Textbox,
    }
}

/// Classify a node given its AX role, DOM tag, DOM `role` attribute, and
/// (if the tag is `input`) its `type` attribute.
///
/// AX role wins; the DOM `role` attribute and tag are fallbacks in that
/// order; nodes that match none of the tables fall back to `Generic`, kept
/// only as a region/group carrier per §4.2 step 1.
#[must_use]
pub fn classify(
    ax_role: Option<&str>,
    dom_role_attr: Option<&str>,
    tag: &str,
    input_type: Option<&str>,
) -> NodeKind {
    if let Some(role) = ax_role {
        if let Some(kind) = kind_from_role(role) {
            return kind;
        }
    }
    if let Some(role) = dom_role_attr {
        if let Some(kind) = kind_from_role(role) {
            return kind;
        }
    }
    if let Some(kind) = kind_from_tag(tag) {
        if matches!(kind, NodeKind::Input) {
            return input_type.map_or(NodeKind::Textbox, kind_from_input_type);
        }
        return kind;
    }
    NodeKind::Generic
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ax_role_wins_over_tag() {
        // A <div role=button> styled control: tag says nothing, AX role
        // (propagated from the explicit role attribute into the AX tree
        // in a real capture) drives classification.
        let kind = classify(Some("button"), None, "div", None);
        assert_eq!(kind, NodeKind::Button);
    }

    #[test]
    fn tag_fallback_when_no_role() {
        let kind = classify(None, None, "a", None);
        assert_eq!(kind, NodeKind::Link);
    }

    #[test]
    fn input_type_refines_generic_input() {
        let kind = classify(None, None, "input", Some("checkbox"));
        assert_eq!(kind, NodeKind::Checkbox);
    }

    #[test]
    fn unmatched_role_and_tag_is_generic() {
        let kind = classify(Some("presentation"), None, "div", None);
        assert_eq!(kind, NodeKind::Generic);
    }

    #[test]
    fn plain_text_input_defaults_to_textbox() {
        let kind = classify(None, None, "input", Some("text"));
        assert_eq!(kind, NodeKind::Textbox);
    }
}
