//! Attribute sanitation: value redaction for sensitive inputs and
//! query-parameter scrubbing for hrefs (§4.2 step 7, §6, invariant I5).

use crate::config::{MAX_HREF_LEN, SENSITIVE_INPUT_TYPES, SENSITIVE_QUERY_PARAMS};

/// The literal value emitted in place of a sensitive input's real value.
pub const REDACTED_VALUE: &str = "********";

/// Redact an input's value if its `type` is in the sensitive set,
/// unconditionally (I5: "sensitive input values are never emitted
/// verbatim").
#[must_use]
pub fn sanitize_input_value(input_type: Option<&str>, value: Option<&str>) -> Option<String> {
    let value = value?;
    if input_type.is_some_and(|t| SENSITIVE_INPUT_TYPES.contains(&t)) {
        Some(REDACTED_VALUE.to_string())
    } else {
        Some(value.to_string())
    }
}

/// Strip sensitive query parameters from a URL and cap its length.
///
/// Matching is case-insensitive on the parameter name (§6: "case-insensitive").
/// Malformed URLs are returned with a best-effort manual scrub rather than
/// dropped, since hrefs are free text from the page and must not abort
/// compilation.
#[must_use]
pub fn sanitize_href(href: &str) -> String {
    let scrubbed = match href.split_once('?') {
        Some((base, query)) => {
            let (query_part, fragment) = match query.split_once('#') {
                Some((q, f)) => (q, Some(f)),
                None => (query, None),
            };
            let kept: Vec<&str> = query_part
                .split('&')
                .filter(|pair| {
                    let name = pair.split_once('=').map_or(*pair, |(k, _)| k);
                    !SENSITIVE_QUERY_PARAMS
                        .iter()
                        .any(|sensitive| sensitive.eq_ignore_ascii_case(name))
                })
                .collect();
            let mut result = base.to_string();
            if !kept.is_empty() {
                result.push('?');
                result.push_str(&kept.join("&"));
            }
            if let Some(fragment) = fragment {
                result.push('#');
                result.push_str(fragment);
            }
            result
        }
        None => href.to_string(),
    };

    truncate_href(&scrubbed)
}

fn truncate_href(href: &str) -> String {
    if href.chars().count() <= MAX_HREF_LEN {
        return href.to_string();
    }
    let truncated: String = href.chars().take(MAX_HREF_LEN.saturating_sub(3)).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_password_value() {
        let v = sanitize_input_value(Some("password"), Some("hunter2"));
        assert_eq!(v.as_deref(), Some(REDACTED_VALUE));
    }

    #[test]
    fn passes_through_non_sensitive_value() {
        let v = sanitize_input_value(Some("text"), Some("hello"));
        assert_eq!(v.as_deref(), Some("hello"));
    }

    #[test]
    fn strips_sensitive_query_params() {
        let href = sanitize_href("https://example.com/login?user=bob&token=abc123&ok=1");
        assert_eq!(href, "https://example.com/login?user=bob&ok=1");
    }

    #[test]
    fn strips_case_insensitively() {
        let href = sanitize_href("https://example.com/x?Token=abc&API_KEY=def");
        assert_eq!(href, "https://example.com/x");
    }

    #[test]
    fn preserves_fragment_after_scrub() {
        let href = sanitize_href("https://example.com/p?token=a#section");
        assert_eq!(href, "https://example.com/p#section");
    }

    #[test]
    fn leaves_non_sensitive_hrefs_untouched() {
        let href = sanitize_href("https://example.com/about?tab=team");
        assert_eq!(href, "https://example.com/about?tab=team");
    }

    #[test]
    fn truncates_long_hrefs() {
        let long = format!("https://example.com/{}", "a".repeat(300));
        let href = sanitize_href(&long);
        assert!(href.len() <= MAX_HREF_LEN);
        assert!(href.ends_with("..."));
    }
}
