//! Token budgeting (§4.8): a simple char-to-token heuristic and the
//! section-priority truncation policy.

/// Characters-per-token heuristic used to estimate a rendered payload's
/// token count without a real tokenizer.
const CHARS_PER_TOKEN: f64 = 4.0;

/// Estimate the token count of a rendered string.
#[must_use]
pub fn estimate_tokens(rendered: &str) -> usize {
    ((rendered.chars().count() as f64) / CHARS_PER_TOKEN).ceil() as usize
}

/// The token cap for a given budget profile.
#[must_use]
pub const fn cap_for(profile: crate::config::BudgetProfile) -> usize {
    match profile {
        crate::config::BudgetProfile::Compact => 1_200,
        crate::config::BudgetProfile::Standard => 4_000,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimate_scales_with_length() {
        let short = estimate_tokens("hello");
        let long = estimate_tokens(&"hello ".repeat(100));
        assert!(long > short);
    }

    #[test]
    fn compact_cap_is_smaller_than_standard() {
        assert!(cap_for(crate::config::BudgetProfile::Compact) < cap_for(crate::config::BudgetProfile::Standard));
    }
}
