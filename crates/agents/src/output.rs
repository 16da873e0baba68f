//! Handling of untrusted model output.
//!
//! Models wrap JSON in prose, echo routing decisions into answers and pad
//! replies with blank lines. Nothing here panics on bad input.

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

/// Key that marks an object as a routing decision.
const ROUTING_MARKER: &str = "\"selectedAgent\"";

static EXCESS_BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n(?:[ \t]*\n)+").expect("valid regex"));

static QUICK_ACTION_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[\s*_#>-]*quick action\s*:").expect("valid regex"));

/// End (exclusive) of the brace-balanced object opening at `start`.
///
/// Braces inside string literals are ignored.
fn balanced_end(text: &str, start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(start + i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_json_object(candidate: &str) -> bool {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(candidate).is_ok()
}

/// Next valid JSON object at or after byte offset `from`.
fn next_json_object(text: &str, from: usize) -> Option<Range<usize>> {
    let mut pos = from;
    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_end(text, start) {
            Some(end) if is_json_object(&text[start..end]) => return Some(start..end),
            _ => pos = start + 1,
        }
    }
    None
}

/// Byte ranges of every top-level JSON object embedded in `text`.
pub fn json_object_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut pos = 0;
    while let Some(span) = next_json_object(text, pos) {
        pos = span.end;
        spans.push(span);
    }
    spans
}

/// The first JSON object found anywhere in `text`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    next_json_object(text, 0).map(|span| &text[span])
}

/// The first JSON object carrying a `selectedAgent` field, else the first
/// JSON object of any shape.
pub fn extract_routing_object(text: &str) -> Option<&str> {
    json_object_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .find(|json| json.contains(ROUTING_MARKER))
        .or_else(|| extract_json_object(text))
}

/// Whether `text` carries an echoed routing decision.
pub fn contains_routing_json(text: &str) -> bool {
    json_object_spans(text)
        .into_iter()
        .any(|span| text[span].contains(ROUTING_MARKER))
}

/// Remove routing artifacts from a complete agent reply.
///
/// Strips embedded routing-decision objects and a trailing "Quick Action:"
/// line, then collapses runs of blank lines to a single one.
pub fn clean_response(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    let mut last = 0;
    for span in json_object_spans(text) {
        if text[span.clone()].contains(ROUTING_MARKER) {
            cleaned.push_str(&text[last..span.start]);
            last = span.end;
        }
    }
    cleaned.push_str(&text[last..]);

    let trimmed = cleaned.trim_end();
    let without_action = match trimmed.rfind('\n') {
        Some(pos) if QUICK_ACTION_LINE.is_match(&trimmed[pos + 1..]) => &trimmed[..pos],
        None if QUICK_ACTION_LINE.is_match(trimmed) => "",
        _ => trimmed,
    };

    EXCESS_BLANK_LINES
        .replace_all(without_action, "\n\n")
        .trim()
        .to_string()
}
