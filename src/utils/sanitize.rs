//! Input sanitization for imported text.
//!
//! - [`check_plain`] escapes HTML special characters for plain-text values
//!   such as user names and e-mail addresses.
//! - [`strip_tags`] removes all markup from single-line fields.
//! - [`strip_unsafe_markup`] keeps formatting markup but drops active content.

use regex::Regex;
use std::sync::LazyLock;

static SCRIPT_BLOCK_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>").unwrap()
});

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

static EVENT_HANDLER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap()
});

static JS_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)(href|src)\s*=\s*(["']?)\s*javascript:[^"'\s>]*"#).unwrap());

/// Escapes `&`, `<`, `>`, `"` and `'` so the value renders as plain text.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(check_plain("<b>dave</b>"), "&lt;b&gt;dave&lt;/b&gt;");
/// ```
pub fn check_plain(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());

    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Removes script/style blocks and every remaining tag.
pub fn strip_tags(value: &str) -> String {
    let without_blocks = SCRIPT_BLOCK_REGEX.replace_all(value, "");
    TAG_REGEX.replace_all(&without_blocks, "").into_owned()
}

/// Removes script/style blocks, inline event handlers and `javascript:` URLs
/// while leaving ordinary formatting tags in place.
pub fn strip_unsafe_markup(value: &str) -> String {
    let without_blocks = SCRIPT_BLOCK_REGEX.replace_all(value, "");
    let without_handlers = EVENT_HANDLER_REGEX.replace_all(&without_blocks, "");
    JS_URL_REGEX
        .replace_all(&without_handlers, "$1=$2#")
        .into_owned()
}
