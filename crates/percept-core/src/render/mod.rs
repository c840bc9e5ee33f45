//! XML Renderer and Budgeter (C8): serializes state/diff/observations
//! into a compact, token-budgeted XML payload (§4.8). Pure function of
//! its inputs; no internal state.

pub mod budget;
pub mod xml;

use crate::config::BudgetProfile;
use crate::factpack::FactPack;
use crate::factpack::actions::ActionCategory;
use crate::factpack::dialog::DialogCategory;
use crate::factpack::page_classifier::PageType;
use crate::model::{
    BaseSnapshot, BaselineReason, Diff, DiffResponse, DomObservation, NavType, ReadableNode,
};
use xml::Attr;

/// The rendered payload and whether the budget forced a truncation.
#[derive(Debug, Clone)]
pub struct RenderedPayload {
    pub xml: String,
    pub was_truncated: bool,
}

fn render_node_state_attrs(node: &ReadableNode) -> Vec<Attr> {
    let mut attrs = Vec::new();
    if !node.state.visible {
        attrs.push(Attr("visible", "false".to_string()));
    }
    if !node.state.enabled {
        attrs.push(Attr("enabled", "false".to_string()));
    }
    if let Some(checked) = node.state.checked {
        attrs.push(Attr("checked", checked.to_string()));
    }
    if let Some(expanded) = node.state.expanded {
        attrs.push(Attr("expanded", expanded.to_string()));
    }
    if let Some(selected) = node.state.selected {
        attrs.push(Attr("selected", selected.to_string()));
    }
    if let Some(focused) = node.state.focused {
        attrs.push(Attr("focused", focused.to_string()));
    }
    if let Some(required) = node.state.required {
        attrs.push(Attr("required", required.to_string()));
    }
    if let Some(invalid) = node.state.invalid {
        attrs.push(Attr("invalid", invalid.to_string()));
    }
    attrs
}

fn render_node(node: &ReadableNode) -> String {
    let mut attrs = vec![Attr("eid", node.node_id.clone())];
    if node.r#where.region != crate::model::SemanticRegion::Unknown {
        attrs.push(Attr("region", format!("{:?}", node.r#where.region).to_lowercase()));
    }
    if let Some(group) = &node.r#where.group_id {
        attrs.push(Attr("group", group.clone()));
    }
    if !node.r#where.group_path.is_empty() {
        attrs.push(Attr("path", node.r#where.group_path.join(">")));
    }
    if let Some(heading) = &node.r#where.heading_context {
        attrs.push(Attr("heading", heading.clone()));
    }

    let (x, y, w, h) = node.layout.bbox.rounded();
    if x != 0 || y != 0 || w != 0 || h != 0 {
        attrs.push(Attr("x", x.to_string()));
        attrs.push(Attr("y", y.to_string()));
        attrs.push(Attr("w", w.to_string()));
        attrs.push(Attr("h", h.to_string()));
    }
    if let Some(zone) = node.layout.screen_zone {
        attrs.push(Attr("zone", format!("{zone:?}").to_lowercase()));
    }
    if let Some(display) = &node.layout.display {
        attrs.push(Attr("display", display.clone()));
    }

    attrs.extend(render_node_state_attrs(node));

    if let Some(href) = &node.attributes.href {
        attrs.push(Attr("href", href.clone()));
    }
    if let Some(placeholder) = &node.attributes.placeholder {
        attrs.push(Attr("placeholder", placeholder.clone()));
    }
    if let Some(value) = &node.attributes.value {
        attrs.push(Attr("value", value.clone()));
    }

    xml::tag(node.kind.tag_name(), &attrs, Some(&node.label))
}

fn render_actionables(nodes: &[ReadableNode]) -> Vec<String> {
    nodes.iter().filter(|n| n.is_actionable()).map(render_node).collect()
}

fn render_diff(diff: &Diff) -> String {
    let mut inner = String::new();
    if !diff.added.is_empty() || !diff.removed.is_empty() || !diff.changed.is_empty() {
        let mut added = String::new();
        for eid in &diff.added {
            added.push_str(&xml::tag("added", &[Attr("eid", eid.clone())], None));
        }
        let mut removed = String::new();
        for eid in &diff.removed {
            removed.push_str(&xml::tag("removed", &[Attr("eid", eid.clone())], None));
        }
        let mut changed = String::new();
        for change in &diff.changed {
            changed.push_str(&xml::tag(
                "changed",
                &[
                    Attr("eid", change.eid.clone()),
                    Attr("k", change.code.to_string()),
                    Attr("from", change.from.clone()),
                    Attr("to", change.to.clone()),
                ],
                None,
            ));
        }
        inner.push_str(&added);
        inner.push_str(&removed);
        inner.push_str(&changed);
    }
    if let Some(doc) = &diff.doc {
        let nav_type = match doc.nav_type {
            NavType::Hard => "hard",
            NavType::Soft => "soft",
        };
        inner.push_str(&xml::tag(
            "doc",
            &[
                Attr("from", doc.from_url.clone()),
                Attr("to", doc.to_url.clone()),
                Attr("nav_type", nav_type.to_string()),
            ],
            None,
        ));
    }
    if let Some(layer) = &diff.layer {
        inner.push_str(&xml::tag(
            "layer",
            &[Attr("from", layer.from.join(",")), Attr("to", layer.to.join(","))],
            None,
        ));
    }
    for atom in &diff.atoms {
        inner.push_str(&xml::tag(
            "atom",
            &[Attr("k", atom.key.to_string()), Attr("from", atom.from.to_string()), Attr("to", atom.to.to_string())],
            None,
        ));
    }
    format!("<diff>{inner}</diff>")
}

fn render_mutations(diff: &Diff) -> Vec<String> {
    let mut out = Vec::new();
    for tc in &diff.text_changed {
        out.push(xml::tag(
            "text-changed",
            &[Attr("eid", tc.eid.clone()), Attr("from", tc.from.clone()), Attr("to", tc.to.clone())],
            None,
        ));
    }
    for sa in &diff.status_appeared {
        out.push(xml::tag(
            "status",
            &[Attr("eid", sa.eid.clone()), Attr("role", sa.role.clone())],
            Some(&sa.text),
        ));
    }
    out
}

fn render_observations(observations: &[DomObservation]) -> Vec<String> {
    observations
        .iter()
        .map(|obs| {
            let kind = match obs.r#type {
                crate::model::ObservationType::Appeared => "appeared",
                crate::model::ObservationType::Disappeared => "disappeared",
            };
            xml::tag(
                "observation",
                &[
                    Attr("type", kind.to_string()),
                    Attr("tag", obs.content.tag.clone()),
                    Attr("significance", obs.significance.to_string()),
                ],
                Some(&obs.content.text),
            )
        })
        .collect()
}

fn dialog_category_str(category: DialogCategory) -> &'static str {
    match category {
        DialogCategory::CookieConsent => "cookie-consent",
        DialogCategory::Auth => "auth",
        DialogCategory::Error => "error",
        DialogCategory::Generic => "generic",
    }
}

fn page_type_str(page_type: PageType) -> &'static str {
    match page_type {
        PageType::Login => "login",
        PageType::Signup => "signup",
        PageType::Cart => "cart",
        PageType::Checkout => "checkout",
        PageType::Product => "product",
        PageType::Article => "article",
        PageType::SearchResults => "search-results",
        PageType::Unknown => "unknown",
    }
}

fn action_category_str(category: ActionCategory) -> &'static str {
    match category {
        ActionCategory::PrimaryCta => "primary-cta",
        ActionCategory::CartAction => "cart-action",
        ActionCategory::Auth => "auth",
        ActionCategory::FormSubmit => "form-submit",
        ActionCategory::Generic => "generic",
    }
}

fn render_facts(facts: &FactPack) -> String {
    let mut inner = String::new();

    inner.push_str(&xml::tag(
        "page",
        &[
            Attr("type", page_type_str(facts.page_type.page_type).to_string()),
            Attr("score", format!("{:.2}", facts.page_type.score)),
        ],
        None,
    ));

    for dialog in &facts.dialogs {
        inner.push_str(&xml::tag(
            "dialog",
            &[
                Attr("eid", dialog.eid.clone()),
                Attr("category", dialog_category_str(dialog.category).to_string()),
                Attr("confidence", format!("{:.2}", dialog.confidence)),
            ],
            None,
        ));
    }

    for form in &facts.forms {
        let mut fields = String::new();
        for field in &form.fields {
            fields.push_str(&xml::tag(
                "field",
                &[
                    Attr("eid", field.eid.clone()),
                    Attr("type", format!("{:?}", field.semantic_type).to_lowercase()),
                    Attr("required", field.required.to_string()),
                    Attr("filled", field.filled.to_string()),
                    Attr("invalid", field.invalid.to_string()),
                ],
                None,
            ));
        }
        let mut form_attrs = Vec::new();
        if let Some(group) = &form.group_id {
            form_attrs.push(Attr("group", group.clone()));
        }
        if let Some(submit_eid) = &form.submit_eid {
            form_attrs.push(Attr("submit", submit_eid.clone()));
        }
        form_attrs.push(Attr("completion", format!("{:.2}", form.completion.completion_pct)));
        form_attrs.push(Attr("errors", form.completion.error_count.to_string()));
        form_attrs.push(Attr("can_submit", form.completion.can_submit.to_string()));
        inner.push_str(&xml::wrap("form", &form_attrs, &fields));
    }

    for action in &facts.actions.top {
        let is_primary = facts.actions.primary.as_deref() == Some(action.eid.as_str());
        let mut attrs = vec![
            Attr("eid", action.eid.clone()),
            Attr("category", action_category_str(action.category).to_string()),
            Attr("score", format!("{:.2}", action.score)),
        ];
        if is_primary {
            attrs.push(Attr("primary", "true".to_string()));
        }
        inner.push_str(&xml::tag("action", &attrs, None));
    }

    xml::wrap("facts", &[], &inner)
}

fn assemble(
    state: &str,
    header: &str,
    facts: &str,
    actionables: &[String],
    mutations: &[String],
    observations: &[String],
) -> String {
    let mut out = String::new();
    out.push_str("<response>");
    out.push_str(state);
    out.push_str(header);
    out.push_str(facts);
    if !mutations.is_empty() {
        out.push_str("<mutations>");
        for m in mutations {
            out.push_str(m);
        }
        out.push_str("</mutations>");
    }
    if !observations.is_empty() {
        out.push_str("<observations>");
        for o in observations {
            out.push_str(o);
        }
        out.push_str("</observations>");
    }
    out.push_str("<actionables>");
    for a in actionables {
        out.push_str(a);
    }
    out.push_str("</actionables>");
    out.push_str("</response>");
    out
}

/// Render a complete perception response under a token budget (§4.8).
///
/// Truncation priority, lowest first: observations, then mutations, then
/// the tail of the actionables list. `was_truncated` is set whenever any
/// section had to be dropped or trimmed to fit.
#[must_use]
pub fn render(
    snapshot: &BaseSnapshot,
    diff_response: &DiffResponse,
    observations: &[DomObservation],
    facts: &FactPack,
    profile: BudgetProfile,
) -> RenderedPayload {
    let mut state_attrs = vec![Attr("url", snapshot.url.clone()), Attr("title", snapshot.title.clone())];
    if snapshot.degraded {
        state_attrs.push(Attr("limitations", "partial-capture".to_string()));
    }
    let state = xml::tag("state", &state_attrs, None);

    let header = match diff_response {
        DiffResponse::Baseline { reason } => {
            let reason_str = match reason {
                BaselineReason::First => "first",
                BaselineReason::Navigated => "navigated",
            };
            xml::tag("baseline", &[Attr("reason", reason_str.to_string())], None)
        }
        DiffResponse::Diff { diff } => render_diff(diff),
    };

    let mutations = match diff_response {
        DiffResponse::Diff { diff } => render_mutations(diff),
        DiffResponse::Baseline { .. } => Vec::new(),
    };
    let facts_xml = render_facts(facts);
    let mut actionables = render_actionables(&snapshot.nodes);
    let mut observation_tags = render_observations(observations);
    let mut mutation_tags = mutations;

    let cap = budget::cap_for(profile);
    let mut was_truncated = false;

    let mut rendered = assemble(&state, &header, &facts_xml, &actionables, &mutation_tags, &observation_tags);
    if budget::estimate_tokens(&rendered) > cap && !observation_tags.is_empty() {
        observation_tags.clear();
        was_truncated = true;
        rendered = assemble(&state, &header, &facts_xml, &actionables, &mutation_tags, &observation_tags);
    }
    if budget::estimate_tokens(&rendered) > cap && !mutation_tags.is_empty() {
        mutation_tags.clear();
        was_truncated = true;
        rendered = assemble(&state, &header, &facts_xml, &actionables, &mutation_tags, &observation_tags);
    }
    while budget::estimate_tokens(&rendered) > cap && !actionables.is_empty() {
        actionables.pop();
        was_truncated = true;
        rendered = assemble(&state, &header, &facts_xml, &actionables, &mutation_tags, &observation_tags);
    }

    RenderedPayload { xml: rendered, was_truncated }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factpack::actions::ActionSelection;
    use crate::factpack::page_classifier::{PageClassification, PageType};
    use crate::model::{Attributes, Layout, NodeKind, NodeState, SemanticRegion, SnapshotMeta, Viewport, Where};

    fn empty_facts() -> FactPack {
        FactPack {
            dialogs: Vec::new(),
            forms: Vec::new(),
            page_type: PageClassification { page_type: PageType::Unknown, score: 0.0 },
            actions: ActionSelection { top: Vec::new(), primary: None },
        }
    }

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
    fn baseline_renders_reason_attribute() {
        let snap = snapshot(vec![button("button-1", "Go")]);
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Standard);
        assert!(payload.xml.contains("<baseline reason=\"first\"/>"));
        assert!(!payload.was_truncated);
    }

    #[test]
    fn escapes_special_characters_in_label() {
        let snap = snapshot(vec![button("button-1", "A & B")]);
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Standard);
        assert!(payload.xml.contains("A &amp; B"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let snap = snapshot(vec![button("button-1", "Go")]);
        let diff_response = DiffResponse::Baseline { reason: BaselineReason::First };
        let a = render(&snap, &diff_response, &[], &empty_facts(), BudgetProfile::Standard);
        let b = render(&snap, &diff_response, &[], &empty_facts(), BudgetProfile::Standard);
        assert_eq!(a.xml, b.xml);
    }

    #[test]
    fn degraded_snapshot_emits_limitations_attribute() {
        let mut snap = snapshot(vec![button("button-1", "Go")]);
        snap.degraded = true;
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Standard);
        assert!(payload.xml.contains("limitations="));
    }

    #[test]
    fn clean_snapshot_has_no_limitations_attribute() {
        let snap = snapshot(vec![button("button-1", "Go")]);
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Standard);
        assert!(!payload.xml.contains("limitations="));
    }

    #[test]
    fn hidden_by_display_node_emits_display_attribute() {
        let mut node = button("button-1", "Go");
        node.layout.display = Some("none".to_string());
        let snap = snapshot(vec![node]);
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Standard);
        assert!(payload.xml.contains("display=\"none\""));
    }

    #[test]
    fn baseline_always_carries_a_facts_section() {
        let snap = snapshot(vec![button("button-1", "Go")]);
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Standard);
        assert!(payload.xml.contains("<facts>"));
        assert!(payload.xml.contains("<page type=\"unknown\""));
    }

    #[test]
    fn primary_action_is_flagged_in_facts() {
        let snap = snapshot(vec![button("button-1", "Go")]);
        let facts = FactPack {
            dialogs: Vec::new(),
            forms: Vec::new(),
            page_type: PageClassification { page_type: PageType::Checkout, score: 0.8 },
            actions: ActionSelection {
                top: vec![crate::factpack::actions::RankedAction {
                    eid: "button-1".to_string(),
                    category: crate::factpack::actions::ActionCategory::PrimaryCta,
                    score: 1.0,
                }],
                primary: Some("button-1".to_string()),
            },
        };
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &facts, BudgetProfile::Standard);
        assert!(payload.xml.contains("<page type=\"checkout\" score=\"0.80\"/>"));
        assert!(payload.xml.contains("category=\"primary-cta\""));
        assert!(payload.xml.contains("primary=\"true\""));
    }

    #[test]
    fn compact_budget_truncates_large_actionable_sets() {
        let nodes: Vec<_> = (0..500).map(|i| button(&format!("button-{i}"), "A reasonably long button label for budget pressure")).collect();
        let snap = snapshot(nodes);
        let payload = render(&snap, &DiffResponse::Baseline { reason: BaselineReason::First }, &[], &empty_facts(), BudgetProfile::Compact);
        assert!(payload.was_truncated);
        assert!(budget::estimate_tokens(&payload.xml) <= budget::cap_for(BudgetProfile::Compact) + 1);
    }
}
