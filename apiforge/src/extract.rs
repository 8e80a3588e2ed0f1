//! Pulling JSON objects out of free-form model output.

use regex::Regex;
use serde_json::{Map, Value};

const FENCED_BLOCK: &str = r"```(?:json)?\s*([\s\S]*?)```";

/// Find a JSON object in `text`.
///
/// Tries, in order: each fenced code block, the whole text, and the span
/// from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<Map<String, Value>> {
    if let Ok(re) = Regex::new(FENCED_BLOCK) {
        for caps in re.captures_iter(text) {
            if let Some(obj) = caps.get(1).and_then(|m| parse_object(m.as_str())) {
                return Some(obj);
            }
        }
    }

    if let Some(obj) = parse_object(text) {
        return Some(obj);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    parse_object(&text[start..=end])
}

fn parse_object(s: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(s.trim()) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
