//! HTML escaping for placeholder attributes.
//!
//! Directive values are author-controlled free text (heights, units, ids)
//! and end up inside double-quoted attribute values.

/// Escape a string for use inside a double-quoted HTML attribute value.
///
/// Replaces `&`, `<`, `>`, `"` and `'` with their entity equivalents.
#[must_use]
pub fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Slugify a directive id into a value safe for an HTML `id` attribute.
///
/// # Rules
/// 1. Replace whitespace with `-`
/// 2. Keep ASCII alphanumerics, `-`, `_`, `:` and `.`
/// 3. Strip everything else
/// 4. If the result is empty, use `map`
#[must_use]
pub fn slugify_id(id: &str) -> String {
    let slug: String = id
        .trim()
        .chars()
        .filter_map(|c| {
            if c.is_whitespace() {
                Some('-')
            } else if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.') {
                Some(c)
            } else {
                None
            }
        })
        .collect();

    if slug.is_empty() {
        "map".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_attribute() {
        assert_eq!(
            escape_attribute(r#"500px;" onload="x"#),
            "500px;&quot; onload=&quot;x"
        );
        assert_eq!(escape_attribute("<b>&'"), "&lt;b&gt;&amp;&#39;");
    }

    #[test]
    fn test_escape_attribute_plain_passthrough() {
        assert_eq!(escape_attribute("/_Assets/a%20b/c"), "/_Assets/a%20b/c");
    }

    #[test]
    fn test_slugify_id() {
        assert_eq!(slugify_id("world"), "world");
        assert_eq!(slugify_id("North Sea"), "North-Sea");
        assert_eq!(slugify_id("a<b>\"c"), "abc");
        assert_eq!(slugify_id("  "), "map");
        assert_eq!(slugify_id("région"), "rgion");
    }
}
