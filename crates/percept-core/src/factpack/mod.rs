//! FactPack Extractors (C5): higher-level semantic facts derived from a
//! compiled snapshot (§4.5). Each extractor returns a useful result even
//! when no pattern in its heuristic table matches; low confidence is a
//! valid outcome, never an error.

pub mod actions;
pub mod dialog;
pub mod form;
pub mod page_classifier;

use crate::model::BaseSnapshot;

/// The aggregate of every page-level semantic extraction for a snapshot
/// (glossary: "FactPack").
#[derive(Debug, Clone)]
pub struct FactPack {
    pub dialogs: Vec<dialog::DetectedDialog>,
    pub forms: Vec<form::DetectedForm>,
    pub page_type: page_classifier::PageClassification,
    pub actions: actions::ActionSelection,
}

/// Run every extractor over a snapshot and assemble its FactPack.
#[must_use]
pub fn extract(snapshot: &BaseSnapshot, config: &form::FormDetectorConfig) -> FactPack {
    FactPack {
        dialogs: dialog::detect_dialogs(snapshot),
        forms: form::detect_forms(snapshot, config),
        page_type: page_classifier::classify_page(snapshot),
        actions: actions::select_actions(snapshot),
    }
}
