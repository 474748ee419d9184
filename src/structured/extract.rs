//! Locating the JSON object inside free-form model output.
//!
//! Models asked for "JSON only" still wrap answers in markdown fences or add a
//! sentence of prose. Extraction is ordered, first success wins:
//!
//! 1. strip fence markers,
//! 2. parse the cleaned text directly,
//! 3. parse the greedy `{ ... }` span (first `{` through last `}`).

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;

use crate::{Error, ErrorContext, Result};

static FENCE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"```[A-Za-z0-9_+-]*").expect("fence pattern is valid"));

const SNIPPET_CHARS: usize = 100;

/// Remove every markdown code-fence marker (```` ``` ```` with an optional language tag) and trim.
pub fn strip_code_fences(raw: &str) -> Cow<'_, str> {
    if raw.contains("```") {
        Cow::Owned(FENCE_MARKER.replace_all(raw, "").trim().to_string())
    } else {
        Cow::Borrowed(raw.trim())
    }
}

/// The span from the first `{` through the last `}`, if both exist in that order.
pub fn outer_braces(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse `text` only if it is a JSON object.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Run the extraction ladder and return the top-level JSON object.
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>> {
    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        return Err(Error::response_format_with_context(
            "empty response from AI service",
            ErrorContext::new().with_source("response_normalizer"),
        ));
    }

    if let Some(map) = parse_object(&cleaned) {
        return Ok(map);
    }

    tracing::debug!("direct JSON parse failed, trying outer-brace extraction");
    if let Some(map) = outer_braces(&cleaned).and_then(parse_object) {
        return Ok(map);
    }

    Err(Error::response_format_with_context(
        "no JSON object found in AI response",
        ErrorContext::new()
            .with_details(snippet(&cleaned))
            .with_source("response_normalizer"),
    ))
}

fn snippet(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(SNIPPET_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}
