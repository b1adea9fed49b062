// src/normalize.rs
//! Text normalization for provider output: markup-tag stripping and
//! whitespace collapsing.
//!
//! HTML entities (`&amp;`, `&nbsp;`, ...) are NOT decoded; they pass through
//! literally. Provider snippets wrap match terms in `<b>` tags and that is
//! the only markup we care about removing.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Remove every `<...>` substring, collapse whitespace runs, trim.
/// Pure and infallible.
pub fn strip_tags(text: &str) -> String {
    static RE_TAGS: OnceCell<Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| Regex::new(r"<[^>]*>").unwrap());
    let out = re_tags.replace_all(text, "");

    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").unwrap());
    re_ws.replace_all(&out, " ").trim().to_string()
}
