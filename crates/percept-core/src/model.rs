//! The data model shared by every stage of the perception pipeline.
//!
//! [`ReadableNode`] is the atomic unit of perception: the normalized, fused
//! representation of a page element that the compiler produces and every
//! downstream stage (query, factpack, diff, render) consumes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Opaque CDP backend node handle. Stable only within a single capture;
/// never used as an identity key across captures.
pub type BackendNodeId = i64;

/// Identifier of the frame a node belongs to.
pub type FrameId = String;

/// The stable, content-addressed element identifier computed by the EID
/// scheme (`crate::eid`).
pub type Eid = String;

/// The closed set of element kinds the compiler can classify a node as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Button,
    Link,
    Input,
    Textbox,
    Searchbox,
    Combobox,
    Select,
    Checkbox,
    Radio,
    Switch,
    Slider,
    Menuitem,
    Option,
    Tab,
    Textarea,
    Heading,
    Paragraph,
    Text,
    Image,
    List,
    Listitem,
    Table,
    Form,
    Dialog,
    Navigation,
    /// A landmark or grouping container kept only as a region/group carrier,
    /// never an actionable.
    Generic,
}

impl NodeKind {
    /// Whether nodes of this kind are ever considered *actionable*
    /// (interactive) when visible and enabled.
    ///
    /// `Dialog` is included alongside the classically clickable kinds: a
    /// modal surface appearing or disappearing is itself an interaction
    /// event the diff engine must surface in `actionables`, even though a
    /// dialog element has no click target of its own.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(
            self,
            Self::Button
                | Self::Link
                | Self::Input
                | Self::Textbox
                | Self::Searchbox
                | Self::Combobox
                | Self::Select
                | Self::Checkbox
                | Self::Radio
                | Self::Switch
                | Self::Slider
                | Self::Menuitem
                | Self::Option
                | Self::Tab
                | Self::Textarea
                | Self::Dialog
        )
    }

    /// The XML tag name this kind renders as (§4.8: kind is the tag name).
    #[must_use]
    pub const fn tag_name(self) -> &'static str {
        match self {
            Self::Button => "button",
            Self::Link => "link",
            Self::Input => "input",
            Self::Textbox => "textbox",
            Self::Searchbox => "searchbox",
            Self::Combobox => "combobox",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Switch => "switch",
            Self::Slider => "slider",
            Self::Menuitem => "menuitem",
            Self::Option => "option",
            Self::Tab => "tab",
            Self::Textarea => "textarea",
            Self::Heading => "heading",
            Self::Paragraph => "paragraph",
            Self::Text => "text",
            Self::Image => "image",
            Self::List => "list",
            Self::Listitem => "listitem",
            Self::Table => "table",
            Self::Form => "form",
            Self::Dialog => "dialog",
            Self::Navigation => "navigation",
            Self::Generic => "generic",
        }
    }
}

/// The closed set of semantic page regions a node can be resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SemanticRegion {
    Header,
    Nav,
    Main,
    Aside,
    Footer,
    Dialog,
    Form,
    Search,
    Unknown,
}

impl Default for SemanticRegion {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Region, grouping, and heading placement of a node within the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Where {
    pub region: SemanticRegion,
    pub group_id: Option<String>,
    pub group_path: Vec<String>,
    pub heading_context: Option<String>,
}

/// Axis-aligned bounding box in CSS pixels, post-scroll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl BBox {
    /// Round each coordinate to the nearest integer, as required for
    /// emitted layout (§4.7: "numeric coordinates ... rounded to integers").
    #[must_use]
    pub fn rounded(self) -> (i64, i64, i64, i64) {
        (
            self.x.round() as i64,
            self.y.round() as i64,
            self.w.round() as i64,
            self.h.round() as i64,
        )
    }
}

/// Coarse viewport placement, used to prioritize actionables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScreenZone {
    AboveFold,
    BelowFold,
    Center,
}

/// Layout facts attached to a node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Layout {
    pub bbox: BBox,
    pub display: Option<String>,
    pub visibility: Option<String>,
    pub z_index: Option<i64>,
    pub screen_zone: Option<ScreenZone>,
}

/// Sparse boolean state record. `None` means "not applicable to this kind",
/// distinct from `Some(false)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub visible: bool,
    pub enabled: bool,
    pub checked: Option<bool>,
    pub expanded: Option<bool>,
    pub selected: Option<bool>,
    pub focused: Option<bool>,
    pub required: Option<bool>,
    pub invalid: Option<bool>,
    pub readonly: Option<bool>,
}

impl NodeState {
    /// Default visible+enabled state, used when no AX/DOM evidence says
    /// otherwise (§4.2 step 6: "absent layout defaults to visible").
    #[must_use]
    pub const fn default_visible_enabled() -> Self {
        Self {
            visible: true,
            enabled: true,
            checked: None,
            expanded: None,
            selected: None,
            focused: None,
            required: None,
            invalid: None,
            readonly: None,
        }
    }
}

/// Bounded, sanitized attribute record. Every field here has already passed
/// through the sanitation policy (§6): sensitive values redacted, hrefs
/// query-scrubbed and length-capped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    pub input_type: Option<String>,
    pub placeholder: Option<String>,
    pub value: Option<String>,
    pub href: Option<String>,
    pub alt: Option<String>,
    pub src: Option<String>,
    pub heading_level: Option<u8>,
    pub action: Option<String>,
    pub method: Option<String>,
    pub autocomplete: Option<String>,
    pub test_id: Option<String>,
    pub role: Option<String>,
}

/// The atomic unit of perception: a single fused, normalized page element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadableNode {
    /// Stable content-addressed identifier (§4.3).
    pub node_id: Eid,
    /// Opaque CDP handle; valid only for the capture that produced it.
    pub backend_node_id: BackendNodeId,
    pub frame_id: FrameId,
    pub kind: NodeKind,
    pub label: String,
    pub r#where: Where,
    pub layout: Layout,
    pub state: NodeState,
    pub attributes: Attributes,
}

impl ReadableNode {
    /// A node is *actionable* iff it is of an interactive kind, visible, and
    /// enabled (glossary: "Actionable").
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.kind.is_interactive() && self.state.visible && self.state.enabled
    }
}

/// Viewport dimensions and device pixel ratio at capture time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Viewport {
    pub w: u32,
    pub h: u32,
    pub dpr: f64,
}

/// Summary counters attached to a snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SnapshotMeta {
    pub node_count: usize,
    pub interactive_count: usize,
}

/// An immutable, fully compiled view of a page at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseSnapshot {
    pub snapshot_id: String,
    /// Identifies the current document; a change between captures means the
    /// page navigated (§4.7: baseline vs diff mode selection).
    pub document_id: String,
    pub url: String,
    pub title: String,
    pub captured_at_ms: u64,
    pub viewport: Viewport,
    pub nodes: Vec<ReadableNode>,
    pub meta: SnapshotMeta,
    /// Set when an auxiliary tree (AX or layout) degraded during capture;
    /// carried through to the rendered `limitations` attribute (§7).
    pub degraded: bool,
}

impl BaseSnapshot {
    /// Build a snapshot from a fully-classified node list, computing
    /// `meta` from the nodes themselves.
    #[must_use]
    pub fn new(
        snapshot_id: String,
        document_id: String,
        url: String,
        title: String,
        captured_at_ms: u64,
        viewport: Viewport,
        nodes: Vec<ReadableNode>,
        degraded: bool,
    ) -> Self {
        let interactive_count = nodes.iter().filter(|n| n.is_actionable()).count();
        let meta = SnapshotMeta {
            node_count: nodes.len(),
            interactive_count,
        };
        Self {
            snapshot_id,
            document_id,
            url,
            title,
            captured_at_ms,
            viewport,
            nodes,
            meta,
            degraded,
        }
    }

    /// Lookup a node by its EID.
    #[must_use]
    pub fn find(&self, eid: &str) -> Option<&ReadableNode> {
        self.nodes.iter().find(|n| n.node_id == eid)
    }

    /// Index nodes by EID for repeated lookups (used by the diff engine).
    #[must_use]
    pub fn by_eid(&self) -> HashMap<&str, &ReadableNode> {
        self.nodes.iter().map(|n| (n.node_id.as_str(), n)).collect()
    }
}

/// A single field change within `actionables.changed` (§3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangedField {
    pub eid: Eid,
    /// Short change-kind code: `ena|chk|sel|exp|foc|inv|val`.
    pub code: &'static str,
    pub from: String,
    pub to: String,
}

/// A text mutation on a non-interactive, status-bearing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChanged {
    pub eid: Eid,
    pub from: String,
    pub to: String,
}

/// A status-like node present in the current snapshot but not the previous.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusAppeared {
    pub eid: Eid,
    pub role: String,
    pub text: String,
}

/// Navigation kind for a `doc` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavType {
    Hard,
    Soft,
}

/// A document identity transition (url/title changed).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocTransition {
    pub from_url: String,
    pub from_title: String,
    pub to_url: String,
    pub to_title: String,
    pub nav_type: NavType,
}

/// A layer-stack transition (e.g. `[main] -> [main, modal]`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerTransition {
    pub from: Vec<String>,
    pub to: Vec<String>,
}

/// A scalar viewport change (`viewport.w` or `viewport.h`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub key: &'static str,
    pub from: i64,
    pub to: i64,
}

/// The body of a `diff`-mode response (§3).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diff {
    pub added: Vec<Eid>,
    pub removed: Vec<Eid>,
    pub changed: Vec<ChangedField>,
    pub text_changed: Vec<TextChanged>,
    pub status_appeared: Vec<StatusAppeared>,
    pub doc: Option<DocTransition>,
    pub layer: Option<LayerTransition>,
    pub atoms: Vec<Atom>,
}

impl Diff {
    /// §3 I2 / §4.7 `isEmpty`: true iff nothing observable changed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.removed.is_empty()
            && self.changed.is_empty()
            && self.text_changed.is_empty()
            && self.status_appeared.is_empty()
            && self.doc.is_none()
            && self.layer.is_none()
            && self.atoms.is_empty()
    }
}

/// The reason a response is in baseline mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineReason {
    First,
    Navigated,
}

/// The emitted delta for a single tool call: either a full baseline or an
/// incremental diff against the previously emitted snapshot (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiffResponse {
    Baseline { reason: BaselineReason },
    Diff { diff: Diff },
}

/// Observation kind: a subtree appeared or disappeared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObservationType {
    Appeared,
    Disappeared,
}

/// The twelve raw signals a single observation carries (§3), grouped the
/// way the accumulator scores them: semantic, visual, structural, temporal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSignals {
    // semantic
    pub has_alert_role: bool,
    pub has_aria_live: bool,
    pub is_dialog: bool,
    // visual
    pub is_fixed_or_sticky: bool,
    pub has_high_z_index: bool,
    pub covers_significant_viewport: bool,
    // structural
    pub is_body_direct_child: bool,
    pub contains_interactive_elements: bool,
    pub is_visible_in_viewport: bool,
    pub has_non_trivial_text: bool,
    // temporal
    pub appeared_after_delay: bool,
    pub was_short_lived: bool,
}

/// The tag/role/text content of an observed subtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservationContent {
    pub tag: String,
    pub role: Option<String>,
    pub text: String,
    pub has_interactives: bool,
}

/// A single transient DOM observation accumulated by C6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomObservation {
    pub r#type: ObservationType,
    pub significance: u8,
    pub signals: ObservationSignals,
    pub content: ObservationContent,
    pub timestamp_ms: u64,
    pub age_ms: Option<u64>,
    pub duration_ms: Option<u64>,
    pub reported: bool,
}
