//! Blanket input sanitiser applied before validation.
//!
//! Every string in the request input is HTML-escaped and stripped of control
//! characters. Object keys starting with `$` are removed so operator
//! documents never reach the catalogue store. The pass is idempotent: an `&`
//! that already begins one of the entities emitted here is left alone.

use serde_json::{Map, Value};

const ENTITIES: [&str; 5] = ["&amp;", "&lt;", "&gt;", "&quot;", "&#x27;"];

/// Escape HTML-significant characters and drop control characters.
///
/// # Examples
/// ```
/// use storefront::domain::sanitize::sanitize_text;
///
/// let once = sanitize_text("<b>Rye & Caraway</b>");
/// assert_eq!(once, "&lt;b&gt;Rye &amp; Caraway&lt;/b&gt;");
/// assert_eq!(sanitize_text(&once), once);
/// ```
#[must_use]
pub fn sanitize_text(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    for (index, ch) in input.char_indices() {
        match ch {
            '&' => {
                let escaped = input
                    .get(index..)
                    .is_some_and(|rest| ENTITIES.iter().any(|entity| rest.starts_with(entity)));
                if escaped {
                    output.push('&');
                } else {
                    output.push_str("&amp;");
                }
            }
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            '\t' | '\n' | '\r' => output.push(ch),
            c if c.is_control() => {}
            c => output.push(c),
        }
    }
    output
}

/// Sanitise every string inside a JSON value.
#[must_use]
pub fn sanitize_value(value: Value) -> Value {
    match value {
        Value::String(text) => Value::String(sanitize_text(&text)),
        Value::Array(items) => Value::Array(items.into_iter().map(sanitize_value).collect()),
        Value::Object(map) => Value::Object(sanitize_map(map)),
        other => other,
    }
}

/// Sanitise a field map, dropping operator keys.
#[must_use]
pub fn sanitize_map(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, _)| !key.starts_with('$'))
        .map(|(key, value)| (key, sanitize_value(value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("plain text", "plain text")]
    #[case("<script>alert(1)</script>", "&lt;script&gt;alert(1)&lt;/script&gt;")]
    #[case("Baker's \"best\"", "Baker&#x27;s &quot;best&quot;")]
    #[case("fish & chips", "fish &amp; chips")]
    #[case("already &amp; escaped", "already &amp; escaped")]
    #[case("&ampersand", "&amp;ampersand")]
    #[case("crème & brûlée", "crème &amp; brûlée")]
    #[case("bell\u{7}tab\tnl\n", "belltab\tnl\n")]
    #[case("ümlaut ✓", "ümlaut ✓")]
    fn escapes_html_significant_characters(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(sanitize_text(input), expected);
    }

    #[rstest]
    #[case("<>&\"'")]
    #[case("&lt;&gt;&amp;&quot;&#x27;")]
    #[case("&\u{0}amp;")]
    #[case("&l\u{1}t;")]
    #[case("&&&;;<<")]
    #[case("&#x27")]
    #[case("")]
    fn sanitising_is_idempotent(#[case] input: &str) {
        let once = sanitize_text(input);
        assert_eq!(sanitize_text(&once), once);
    }

    #[rstest]
    fn walks_nested_values_and_drops_operator_keys() {
        let input = json!({
            "name": "<i>Focaccia</i>",
            "$where": "1 == 1",
            "filters": { "$gt": 0, "tag": "a&b" },
            "tags": ["<x>", 3, true]
        });
        let Value::Object(map) = input else {
            panic!("object fixture");
        };
        let cleaned = Value::Object(sanitize_map(map));
        assert_eq!(
            cleaned,
            json!({
                "name": "&lt;i&gt;Focaccia&lt;/i&gt;",
                "filters": { "tag": "a&amp;b" },
                "tags": ["&lt;x&gt;", 3, true]
            })
        );
    }
}
