//! Plain-text view of rich-text (HTML) descriptions.

use regex::{Captures, Regex};
use std::sync::LazyLock;

static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static RE_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").unwrap());

/// Returns the text content of an HTML fragment.
///
/// Tags are removed without inserting separators (`<p>a</p><p>b</p>` is `ab`),
/// and character references are decoded. Unknown named entities are kept verbatim.
pub fn strip_html(html: &str) -> String {
    let without_tags = RE_TAG.replace_all(html, "");
    RE_ENTITY
        .replace_all(&without_tags, |caps: &Captures| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(name: &str) -> Option<String> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code).map(String::from);
    }

    let decoded = match name {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => "\u{a0}",
        _ => return None,
    };
    Some(decoded.to_string())
}
