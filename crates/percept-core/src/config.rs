//! Dynamically typed configuration (§9 "Dynamically typed configuration").
//!
//! Tool-layer callers pass a loose JSON object; recognized keys are
//! validated into [`PerceiveConfig`] and unknown keys are rejected, the
//! same shape the teacher uses to parse a `capabilities` string into
//! `Capability` values via `FromStr`.

use serde_json::Value;

use crate::error::{PerceptionError, PerceptionResult};
use crate::factpack::form::FormDetectorConfig;

/// The budget profile a render pass targets (§4.8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BudgetProfile {
    Compact,
    Standard,
}

impl Default for BudgetProfile {
    fn default() -> Self {
        Self::Standard
    }
}

impl BudgetProfile {
    fn parse(s: &str) -> PerceptionResult<Self> {
        match s {
            "compact" => Ok(Self::Compact),
            "standard" => Ok(Self::Standard),
            other => Err(PerceptionError::InvalidConfig(format!(
                "unknown budget profile '{other}', expected 'compact' or 'standard'"
            ))),
        }
    }
}

/// Recognized per-call perception options (§9).
#[derive(Debug, Clone)]
pub struct PerceiveConfig {
    pub include_disabled_fields: bool,
    pub budget: BudgetProfile,
    pub min_action_score: f64,
    pub max_actions: usize,
    pub include_state: bool,
    pub form_detector: FormDetectorConfig,
}

impl Default for PerceiveConfig {
    fn default() -> Self {
        Self {
            include_disabled_fields: false,
            budget: BudgetProfile::default(),
            min_action_score: 0.0,
            max_actions: 10,
            include_state: true,
            form_detector: FormDetectorConfig::default(),
        }
    }
}

const RECOGNIZED_KEYS: &[&str] = &[
    "include_disabled_fields",
    "budget",
    "min_action_score",
    "max_actions",
    "include_state",
    "form_cluster_gap_px",
];

impl TryFrom<&Value> for PerceiveConfig {
    type Error = PerceptionError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        let mut config = Self::default();

        let Value::Object(map) = value else {
            return Err(PerceptionError::InvalidConfig(
                "config must be a JSON object".to_string(),
            ));
        };

        for key in map.keys() {
            if !RECOGNIZED_KEYS.contains(&key.as_str()) {
                return Err(PerceptionError::InvalidConfig(format!(
                    "unrecognized config key '{key}'"
                )));
            }
        }

        if let Some(v) = map.get("include_disabled_fields") {
            config.include_disabled_fields = v.as_bool().ok_or_else(|| {
                PerceptionError::InvalidConfig("include_disabled_fields must be a bool".into())
            })?;
        }
        if let Some(v) = map.get("budget") {
            let s = v.as_str().ok_or_else(|| {
                PerceptionError::InvalidConfig("budget must be a string".into())
            })?;
            config.budget = BudgetProfile::parse(s)?;
        }
        if let Some(v) = map.get("min_action_score") {
            let score = v.as_f64().ok_or_else(|| {
                PerceptionError::InvalidConfig("min_action_score must be a number".into())
            })?;
            if !(0.0..=1.0).contains(&score) {
                return Err(PerceptionError::InvalidConfig(
                    "min_action_score must be in 0..=1".into(),
                ));
            }
            config.min_action_score = score;
        }
        if let Some(v) = map.get("max_actions") {
            config.max_actions = v.as_u64().ok_or_else(|| {
                PerceptionError::InvalidConfig("max_actions must be an integer".into())
            })? as usize;
        }
        if let Some(v) = map.get("include_state") {
            config.include_state = v.as_bool().ok_or_else(|| {
                PerceptionError::InvalidConfig("include_state must be a bool".into())
            })?;
        }
        if let Some(v) = map.get("form_cluster_gap_px") {
            config.form_detector.cluster_gap_px = v.as_f64().ok_or_else(|| {
                PerceptionError::InvalidConfig("form_cluster_gap_px must be a number".into())
            })?;
        }

        Ok(config)
    }
}

/// Query parameter names stripped from every emitted `href` (§4.2 step 7,
/// §6 "URL sanitation policy").
pub const SENSITIVE_QUERY_PARAMS: &[&str] = &[
    "token",
    "api_key",
    "access_token",
    "auth",
    "key",
    "password",
    "secret",
];

/// Maximum length an emitted href may reach before `...` elision (§6).
pub const MAX_HREF_LEN: usize = 200;

/// Input types whose value is always redacted, never emitted verbatim (I5).
pub const SENSITIVE_INPUT_TYPES: &[&str] = &["password"];

/// Text truncation cap for observation content (§3, "(e.g., 100, with
/// trailing ellipsis)").
pub const OBSERVATION_TEXT_CAP: usize = 100;

/// Default significance floor an observation must clear to be surfaced.
pub const DEFAULT_SIGNIFICANCE_FLOOR: u8 = 3;

/// Default per-CDP-request timeout (§5).
pub const DEFAULT_CDP_TIMEOUT_MS: u64 = 2000;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_when_empty() {
        let config = PerceiveConfig::try_from(&json!({})).unwrap();
        assert_eq!(config.max_actions, 10);
        assert_eq!(config.budget, BudgetProfile::Standard);
    }

    #[test]
    fn rejects_unknown_keys() {
        let err = PerceiveConfig::try_from(&json!({"bogus": true})).unwrap_err();
        assert!(matches!(err, PerceptionError::InvalidConfig(_)));
    }

    #[test]
    fn parses_recognized_keys() {
        let config = PerceiveConfig::try_from(&json!({
            "budget": "compact",
            "max_actions": 5,
            "min_action_score": 0.5,
        }))
        .unwrap();
        assert_eq!(config.budget, BudgetProfile::Compact);
        assert_eq!(config.max_actions, 5);
        assert!((config.min_action_score - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_score() {
        let err = PerceiveConfig::try_from(&json!({"min_action_score": 2.0})).unwrap_err();
        assert!(matches!(err, PerceptionError::InvalidConfig(_)));
    }

    #[test]
    fn parses_form_cluster_gap_px() {
        let config = PerceiveConfig::try_from(&json!({"form_cluster_gap_px": 40.0})).unwrap();
        assert!((config.form_detector.cluster_gap_px - 40.0).abs() < f64::EPSILON);
    }
}
