//! The Page Perception and Delta Engine.
//!
//! Turns a raw Chrome DevTools Protocol capture into a stable, semantic,
//! token-budgeted view of a web page, and the incremental delta between
//! successive captures of the same page. This crate has no dependency on
//! any concrete CDP client or transport: it is driven entirely through the
//! [`raw::CdpSource`] trait, so the whole pipeline can be exercised against
//! hand-built fixtures without a browser.
//!
//! Pipeline, per tool call: [`raw`] (C1, external) -> [`compiler`] (C2) ->
//! [`eid`] (C3, folded into compilation) -> [`query`]/[`factpack`]/[`diff`]
//! (C4/C5/C7) + [`observation`] (C6) -> [`render`] (C8).

pub mod compiler;
pub mod config;
pub mod diff;
pub mod eid;
pub mod error;
pub mod factpack;
pub mod model;
pub mod observation;
pub mod query;
pub mod raw;
pub mod render;
pub mod store;

pub use error::{PerceptionError, PerceptionResult};
pub use model::{BaseSnapshot, DiffResponse, ReadableNode};
pub use raw::{CdpSource, FrameScope, RawCapture};
pub use store::SnapshotStore;

use config::PerceiveConfig;
use render::RenderedPayload;

/// Run the full pipeline for a single tool call: compile the raw capture,
/// diff it against the store's previous snapshot, extract its FactPack,
/// surface due observations, and render the result under the configured
/// budget — then replace the store's snapshot (I4: only after the
/// response is built).
pub fn perceive(
    store: &mut store::SnapshotStore,
    capture: &raw::RawCapture,
    snapshot_id: String,
    captured_at_ms: u64,
    config: &PerceiveConfig,
) -> RenderedPayload {
    let curr = compiler::compile_snapshot(capture, snapshot_id, captured_at_ms);
    let diff_response = diff::diff(store.previous(), &curr);
    let facts = factpack::extract(&curr, &config.form_detector);

    let floor = config::DEFAULT_SIGNIFICANCE_FLOOR;
    let observations = store.observations.surface(floor);
    store.observations.close_action_window();

    let payload = render::render(&curr, &diff_response, &observations, &facts, config.budget);
    store.replace(curr);
    payload
}
