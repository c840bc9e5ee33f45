//! Observation Accumulator (C6): collects transient DOM mutations reported
//! by an in-page observer across action boundaries and scores their
//! significance (§3, §4.6).

use std::collections::VecDeque;

use crate::config::{DEFAULT_SIGNIFICANCE_FLOOR, OBSERVATION_TEXT_CAP};
use crate::model::{DomObservation, ObservationSignals};

/// Maximum number of observations retained per buffer before the oldest
/// are dropped, bounding the `duringAction` buffer by count (§5).
const BUFFER_CAPACITY: usize = 64;

/// Score a single observation's significance by summing its signal groups
/// (§3/§4.6: "assigns an integer significance score summed across signal
/// groups"). Each signal contributes 1 point; the maximum is 12.
#[must_use]
pub fn score(signals: &ObservationSignals) -> u8 {
    let flags = [
        signals.has_alert_role,
        signals.has_aria_live,
        signals.is_dialog,
        signals.is_fixed_or_sticky,
        signals.has_high_z_index,
        signals.covers_significant_viewport,
        signals.is_body_direct_child,
        signals.contains_interactive_elements,
        signals.is_visible_in_viewport,
        signals.has_non_trivial_text,
        signals.appeared_after_delay,
        signals.was_short_lived,
    ];
    flags.iter().filter(|f| **f).count() as u8
}

/// Truncate observation text to the configured cap, with an ellipsis
/// marker when truncated.
#[must_use]
pub fn truncate_text(text: &str) -> String {
    if text.chars().count() <= OBSERVATION_TEXT_CAP {
        return text.to_string();
    }
    let truncated: String = text.chars().take(OBSERVATION_TEXT_CAP).collect();
    format!("{truncated}...")
}

/// A bounded, dedup-aware rolling buffer of observations for a single
/// window (either `duringAction` or `sincePrevious`).
#[derive(Debug, Default)]
pub struct ObservationBuffer {
    entries: VecDeque<DomObservation>,
}

impl ObservationBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new observation, deduping by `(tag, text)` to absorb
    /// wrapper-node noise (§4.6).
    pub fn push(&mut self, mut observation: DomObservation) {
        observation.content.text = truncate_text(&observation.content.text);
        observation.significance = score(&observation.signals);

        let duplicate = self.entries.iter().any(|existing| {
            existing.content.tag == observation.content.tag
                && existing.content.text == observation.content.text
                && existing.r#type == observation.r#type
        });
        if duplicate {
            return;
        }

        if self.entries.len() >= BUFFER_CAPACITY {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    /// Observations at or above the significance floor, marking them
    /// `reported = true` as they are drained for rendering. Below-floor
    /// observations are retained (not reported) to support later
    /// age/duration updates.
    pub fn drain_reportable(&mut self, floor: u8) -> Vec<DomObservation> {
        let mut reportable = Vec::new();
        for observation in &mut self.entries {
            if observation.significance >= floor && !observation.reported {
                observation.reported = true;
                reportable.push(observation.clone());
            }
        }
        reportable
    }

    /// Clear observations that have already been reported, called once a
    /// response carrying them has been emitted (§3 lifecycle).
    pub fn clear_reported(&mut self) {
        self.entries.retain(|o| !o.reported);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The two rolling buffers tracked per page (§3, §4.6).
#[derive(Debug, Default)]
pub struct ObservationAccumulator {
    pub during_action: ObservationBuffer,
    pub since_previous: ObservationBuffer,
}

impl ObservationAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observations surfaced in the next response: everything in
    /// `duringAction` (the action just completed) plus anything in
    /// `sincePrevious` that clears the significance floor.
    pub fn surface(&mut self, floor: u8) -> Vec<DomObservation> {
        let mut out = self.during_action.drain_reportable(0);
        out.extend(self.since_previous.drain_reportable(floor));
        out
    }

    /// Called at the end of a tool call: the `duringAction` window closes
    /// and folds into `sincePrevious` for the next call's boundary.
    pub fn close_action_window(&mut self) {
        self.during_action.clear_reported();
        while let Some(observation) = self.during_action.entries.pop_front() {
            self.since_previous.push(observation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ObservationContent, ObservationType};

    fn observation(tag: &str, text: &str, signals: ObservationSignals) -> DomObservation {
        DomObservation {
            r#type: ObservationType::Appeared,
            significance: 0,
            signals,
            content: ObservationContent { tag: tag.to_string(), role: None, text: text.to_string(), has_interactives: false },
            timestamp_ms: 0,
            age_ms: None,
            duration_ms: None,
            reported: false,
        }
    }

    #[test]
    fn significance_sums_true_signals() {
        let signals = ObservationSignals { has_alert_role: true, is_dialog: true, ..Default::default() };
        assert_eq!(score(&signals), 2);
    }

    #[test]
    fn dedupes_by_tag_and_text() {
        let mut buffer = ObservationBuffer::new();
        buffer.push(observation("div", "Saved", ObservationSignals::default()));
        buffer.push(observation("div", "Saved", ObservationSignals::default()));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn long_text_is_truncated_with_ellipsis() {
        let long_text = "x".repeat(150);
        let mut buffer = ObservationBuffer::new();
        buffer.push(observation("div", &long_text, ObservationSignals::default()));
        let reportable = buffer.drain_reportable(0);
        assert!(reportable[0].content.text.ends_with("..."));
        assert!(reportable[0].content.text.len() <= OBSERVATION_TEXT_CAP + 3);
    }

    #[test]
    fn below_floor_observations_are_retained_unreported() {
        let mut buffer = ObservationBuffer::new();
        buffer.push(observation("div", "minor", ObservationSignals::default()));
        let reportable = buffer.drain_reportable(DEFAULT_SIGNIFICANCE_FLOOR);
        assert!(reportable.is_empty());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn high_significance_observation_is_reported_once() {
        let signals = ObservationSignals {
            has_alert_role: true,
            is_dialog: true,
            has_high_z_index: true,
            covers_significant_viewport: true,
            ..Default::default()
        };
        let mut buffer = ObservationBuffer::new();
        buffer.push(observation("div", "Cookie notice", signals));
        let first = buffer.drain_reportable(DEFAULT_SIGNIFICANCE_FLOOR);
        assert_eq!(first.len(), 1);
        let second = buffer.drain_reportable(DEFAULT_SIGNIFICANCE_FLOOR);
        assert!(second.is_empty(), "an observation is reported only once");
    }
}
