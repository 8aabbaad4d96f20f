// src/util/text.rs
use std::sync::LazyLock;

use html_escape::decode_html_entities;
use regex::Regex;

static BLOCK_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</?(p|div|br|li|h[1-6])[^>]*>").unwrap());
static ANY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Render an Anki field value as a single line of plain text.
///
/// This function:
/// 1. Turns block-level tags into line breaks
/// 2. Removes all remaining HTML tags
/// 3. Decodes HTML entities (e.g., &amp; → &)
/// 4. Joins the non-empty, trimmed lines with a single space
///
/// # Examples
///
/// ```
/// use ankirubi::util::text::to_plain_text;
///
/// assert_eq!(to_plain_text("<b>話す</b>"), "話す");
/// assert_eq!(to_plain_text("はなす<br>かたる"), "はなす かたる");
/// ```
pub fn to_plain_text(html: &str) -> String {
    let with_newlines = BLOCK_TAG.replace_all(html, "\n");
    let no_tags = ANY_TAG.replace_all(&with_newlines, "");
    let decoded = decode_html_entities(&no_tags).replace('\u{a0}', " ");

    decoded
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
