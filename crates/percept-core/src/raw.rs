//! Raw CDP Reader (C1): the trait boundary `percept-core` expresses its
//! only external dependency through.
//!
//! `percept-core` never talks to a browser directly. It is driven through
//! [`CdpSource`], which an ambient crate implements by adapting a concrete
//! CDP client. This keeps the perception pipeline testable against
//! hand-built fixtures.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::RawCaptureResult;
use crate::model::{BackendNodeId, FrameId, Viewport};

/// Which frames a capture should cover.
#[derive(Debug, Clone, Default)]
pub enum FrameScope {
    /// The page's main frame and every same-origin or cross-origin child
    /// frame discoverable at capture time.
    #[default]
    AllFrames,
    /// A single frame, identified by its CDP frame id.
    Frame(FrameId),
}

/// Tri-state boolean, as the accessibility tree reports `checked` on a
/// checkbox/radio (`true`/`false`/"mixed").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriState {
    True,
    False,
    Mixed,
}

impl TriState {
    /// AX tristate maps to `Option<bool>`; `Mixed` collapses to `None`
    /// (§4.2 step 6: "mixed -> undefined").
    #[must_use]
    pub const fn to_option_bool(self) -> Option<bool> {
        match self {
            Self::True => Some(true),
            Self::False => Some(false),
            Self::Mixed => None,
        }
    }
}

/// A single DOM node from the raw tree.
#[derive(Debug, Clone, Default)]
pub struct RawDomNode {
    pub backend_node_id: BackendNodeId,
    pub frame_id: FrameId,
    pub parent_backend_node_id: Option<BackendNodeId>,
    pub tag: String,
    /// The DOM `role` attribute, distinct from the AX-computed role.
    pub role_attr: Option<String>,
    pub attributes: HashMap<String, String>,
    /// Directly-owned text content, not including descendant elements.
    pub text: Option<String>,
    /// Present when this node hosts a shadow root; names the host itself.
    pub is_shadow_root: bool,
    /// The backend id of the shadow host, for nodes that live inside a
    /// shadow tree (used to build the EID shadow path).
    pub shadow_host: Option<BackendNodeId>,
    pub children: Vec<BackendNodeId>,
}

/// A single accessibility-tree node from the raw tree.
#[derive(Debug, Clone, Default)]
pub struct RawAxNode {
    pub backend_node_id: BackendNodeId,
    pub role: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub value: Option<String>,
    pub checked: Option<TriState>,
    pub expanded: Option<bool>,
    pub selected: Option<bool>,
    pub focused: Option<bool>,
    pub disabled: Option<bool>,
    pub required: Option<bool>,
    pub invalid: Option<bool>,
    pub readonly: Option<bool>,
    /// Heading level, `aria-level`, or tree depth for landmark nesting.
    pub level: Option<u8>,
    pub children: Vec<BackendNodeId>,
}

/// Computed layout facts for a single node, as recomputed from computed
/// style plus a viewport intersection test.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeLayoutInfo {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub z_index: Option<i64>,
    pub in_viewport: bool,
    pub display_none: bool,
    pub visibility_hidden: bool,
}

/// Degradation markers for a single capture, carried through to the
/// snapshot's `degraded` flag and the rendered `limitations` attribute.
#[derive(Debug, Clone, Default)]
pub struct CaptureDegradation {
    /// Frame ids whose accessibility tree could not be retrieved in time.
    pub ax_failed_frames: Vec<FrameId>,
    /// Whether the layout pass timed out and was skipped for some nodes.
    pub layout_timed_out: bool,
}

impl CaptureDegradation {
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        !self.ax_failed_frames.is_empty() || self.layout_timed_out
    }
}

/// The full result of a single raw capture (C1's contract, §4.1).
#[derive(Debug, Clone, Default)]
pub struct RawCapture {
    pub dom_tree: HashMap<BackendNodeId, RawDomNode>,
    pub ax_tree: HashMap<BackendNodeId, RawAxNode>,
    pub layouts: HashMap<BackendNodeId, NodeLayoutInfo>,
    pub frame_ids: Vec<FrameId>,
    pub shadow_roots: Vec<BackendNodeId>,
    pub root_backend_node_id: BackendNodeId,
    /// Identifies the current document; changes across a navigation.
    pub document_id: String,
    pub url: String,
    pub title: String,
    pub viewport: Viewport,
    pub degraded: CaptureDegradation,
}

/// The only dependency `percept-core` has on a concrete browser driver.
///
/// Implementations own CDP domain auto-enable (at most once per session,
/// skipping domains that do not support `enable`) and must degrade rather
/// than fail when an auxiliary tree (AX for a frame, layout for a node)
/// is unavailable; only a primary-DOM-tree failure should return `Err`.
#[async_trait]
pub trait CdpSource: Send + Sync {
    /// Capture the raw DOM/AX/layout trees for the given frame scope.
    async fn capture_raw(&self, frame_scope: FrameScope) -> RawCaptureResult<RawCapture>;
}
