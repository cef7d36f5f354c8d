//! Lenient extraction of a JSON candidate from raw LLM text.
//!
//! Models wrap their answer in markdown fences, add a sentence of preamble
//! or leave a trailing comma behind. This module recovers the JSON object
//! and nothing more: deciding whether the candidate is a legal action is
//! the validator's job.

use serde_json::Value;

use crate::error::RunnerError;

/// Recover a JSON object from a response.
///
/// Strategies, in order, each also retried with trailing commas removed:
/// 1. The whole trimmed text
/// 2. The body of the first markdown code block
/// 3. The span from the first `{` to the last `}`
pub fn parse_response(raw: &str) -> Result<Value, RunnerError> {
    let trimmed = raw.trim();
    let candidates = [Some(trimmed), fenced_block(trimmed), brace_span(trimmed)];
    for candidate in candidates.into_iter().flatten() {
        if let Some(value) = object(candidate).or_else(|| object(&strip_trailing_commas(candidate))) {
            return Ok(value);
        }
    }
    let preview: String = trimmed.chars().take(120).collect();
    Err(RunnerError::Parse(format!("no JSON object in response: {preview}")))
}

fn object(text: &str) -> Option<Value> {
    serde_json::from_str::<Value>(text).ok().filter(Value::is_object)
}

/// Body of the first ```` ``` ```` block, skipping any language tag.
fn fenced_block(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after_fence = text.get(open.checked_add(3)?..)?;
    let body_start = after_fence.find('\n').map_or(0, |nl| nl.saturating_add(1));
    let body = after_fence.get(body_start..)?;
    let close = body.find("```")?;
    body.get(..close).map(str::trim)
}

fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| text.get(start..=end)).flatten()
}

/// Drop commas that directly precede `}` or `]`, ignoring whitespace.
/// Commas inside string literals are left alone.
fn strip_trailing_commas(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            out.push(c);
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let rest = chars.clone().find(|n| !n.is_whitespace());
                if !matches!(rest, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn clean_json_passes_through() {
        let value = parse_response(r#"{"action": "search", "reasoning": "Orders."}"#).unwrap();
        assert_eq!(value, json!({"action": "search", "reasoning": "Orders."}));
    }

    #[test]
    fn fenced_json_is_recovered() {
        let raw = "Here is my move:\n\n```json\n{\"action\": \"move\", \"target\": \"storage\"}\n```\nStay frosty.";
        let value = parse_response(raw).unwrap();
        assert_eq!(value.get("target"), Some(&json!("storage")));
    }

    #[test]
    fn plain_fence_and_trailing_comma() {
        let raw = "```\n{\"action\": \"report\", \"speech\": \"All clear, over.\",}\n```";
        let value = parse_response(raw).unwrap();
        assert_eq!(value.get("speech"), Some(&json!("All clear, over.")));
    }

    #[test]
    fn preamble_without_fence() {
        let raw = "I will hide. {\"action\": \"hide\"} That is all.";
        assert_eq!(parse_response(raw).unwrap(), json!({"action": "hide"}));
    }

    #[test]
    fn commas_inside_strings_survive() {
        assert_eq!(
            strip_trailing_commas(r#"{"speech": "wait, }", "list": [1, 2,],}"#),
            r#"{"speech": "wait, }", "list": [1, 2]}"#
        );
    }

    #[test]
    fn prose_and_arrays_are_rejected() {
        assert!(parse_response("I think I should search the room.").is_err());
        assert!(parse_response("[\"search\"]").is_err());
        assert!(parse_response("").is_err());
    }
}
