//! Per-page Snapshot Store (§2, §5, §9): holds the last emitted snapshot
//! and the observation accumulator for a single page.
//!
//! Global state is scoped per page, not process-wide (§9 "Global state"),
//! so a page's store can be constructed and disposed without touching any
//! shared registry; concurrency for a given page is the caller's
//! responsibility (§5: a page-level mutex serializes access).

use crate::model::BaseSnapshot;
use crate::observation::ObservationAccumulator;

/// The per-page state the perception pipeline reads and replaces once per
/// tool call.
#[derive(Default)]
pub struct SnapshotStore {
    previous: Option<BaseSnapshot>,
    pub observations: ObservationAccumulator,
}

impl SnapshotStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshot emitted by the previous tool call on this page, if
    /// any. Read at the start of a diff (I4).
    #[must_use]
    pub fn previous(&self) -> Option<&BaseSnapshot> {
        self.previous.as_ref()
    }

    /// Replace the stored snapshot. Called only after the response for the
    /// current call has been fully constructed (I4: "the previous
    /// snapshot is only replaced after the response is constructed").
    pub fn replace(&mut self, snapshot: BaseSnapshot) {
        self.previous = Some(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{SnapshotMeta, Viewport};

    fn snapshot(id: &str) -> BaseSnapshot {
        BaseSnapshot {
            snapshot_id: id.to_string(),
            document_id: "d".into(),
            url: "https://example.com".into(),
            title: "Example".into(),
            captured_at_ms: 0,
            viewport: Viewport { w: 1280, h: 800, dpr: 1.0 },
            meta: SnapshotMeta::default(),
            nodes: vec![],
            degraded: false,
        }
    }

    #[test]
    fn fresh_store_has_no_previous_snapshot() {
        let store = SnapshotStore::new();
        assert!(store.previous().is_none());
    }

    #[test]
    fn replace_is_visible_to_subsequent_reads() {
        let mut store = SnapshotStore::new();
        store.replace(snapshot("s1"));
        assert_eq!(store.previous().unwrap().snapshot_id, "s1");
        store.replace(snapshot("s2"));
        assert_eq!(store.previous().unwrap().snapshot_id, "s2");
    }
}
