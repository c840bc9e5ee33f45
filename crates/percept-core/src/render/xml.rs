//! XML escaping and minimal builder helpers (§4.8).

/// Escape XML special characters in text content or attribute values.
#[must_use]
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

/// A single rendered XML attribute, already escaped.
pub struct Attr(pub &'static str, pub String);

/// Render an opening tag with the given attributes, self-closed if
/// `content` is `None`.
#[must_use]
pub fn tag(name: &str, attrs: &[Attr], content: Option<&str>) -> String {
    let mut out = format!("<{name}");
    for Attr(key, value) in attrs {
        out.push_str(&format!(" {key}=\"{}\"", escape(value)));
    }
    match content {
        Some(text) if !text.is_empty() => {
            out.push('>');
            out.push_str(&escape(text));
            out.push_str(&format!("</{name}>"));
        }
        Some(_) => out.push_str("/>"),
        None => out.push_str("/>"),
    }
    out
}

/// Wrap already-rendered child markup in an opening/closing tag with the
/// given attributes; unlike [`tag`], `inner` is inserted verbatim rather
/// than escaped as text content.
#[must_use]
pub fn wrap(name: &str, attrs: &[Attr], inner: &str) -> String {
    let mut out = format!("<{name}");
    for Attr(key, value) in attrs {
        out.push_str(&format!(" {key}=\"{}\"", escape(value)));
    }
    out.push('>');
    out.push_str(inner);
    out.push_str(&format!("</{name}>"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five_special_characters() {
        assert_eq!(escape("a & b < c > d \" e ' f"), "a &amp; b &lt; c &gt; d &quot; e &apos; f");
    }

    #[test]
    fn tag_with_content_and_attrs() {
        let rendered = tag("button", &[Attr("x", "10".to_string())], Some("Go"));
        assert_eq!(rendered, "<button x=\"10\">Go</button>");
    }

    #[test]
    fn self_closes_when_no_content() {
        let rendered = tag("input", &[], None);
        assert_eq!(rendered, "<input/>");
    }
}
