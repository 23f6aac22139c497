//! Decoding the JSON objects generation models return.
//!
//! Models are asked for bare JSON but regularly wrap it in a markdown fence
//! or add a sentence of preamble.

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};

/// Peel leading ```` ```json ```` / ```` ``` ```` fences and trailing
/// ```` ``` ```` fences until none remain, trimming as it goes.
///
/// Idempotent, and the identity (after trimming) on unfenced input: a JSON
/// document can never begin or end with a backtick.
pub fn strip_json_fences(text: &str) -> &str {
    let mut cleaned = text.trim();
    loop {
        let next = strip_one_fence(cleaned);
        if next.len() == cleaned.len() {
            return cleaned;
        }
        cleaned = next;
    }
}

fn strip_one_fence(text: &str) -> &str {
    let mut cleaned = text;
    if let Some(rest) = cleaned.strip_prefix("```json") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```JSON") {
        cleaned = rest;
    } else if let Some(rest) = cleaned.strip_prefix("```") {
        cleaned = rest;
    }
    if let Some(rest) = cleaned.strip_suffix("```") {
        cleaned = rest;
    }
    cleaned.trim()
}

/// Outermost `{ ... }` span, for responses with chatter around the object.
fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a model response into a JSON object.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>> {
    let cleaned = strip_json_fences(text);
    if cleaned.is_empty() {
        bail!("empty response from generation service");
    }

    let value: Value = match serde_json::from_str(cleaned) {
        Ok(v) => v,
        Err(first_err) => {
            let span = outer_object(cleaned)
                .ok_or(first_err)
                .context("response is not JSON")?;
            serde_json::from_str(span).context("response is not valid JSON")?
        }
    };

    match value {
        Value::Object(map) => Ok(map),
        other => bail!("expected a JSON object, got {}", json_kind(&other)),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fence() {
        assert_eq!(strip_json_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_plain_fence() {
        assert_eq!(strip_json_fences("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_strip_unfenced_is_identity() {
        let raw = "{\"name\": \"Paris\", \"note\": \"uses ``` inside\"}";
        assert_eq!(strip_json_fences(raw), raw);
    }

    #[test]
    fn test_strip_is_idempotent() {
        for input in [
            "```json\n{\"a\": 1}\n```",
            "```\n```json\n{}\n```\n```",
            "  {\"b\": [1, 2]}  ",
            "```json```",
            "",
        ] {
            let once = strip_json_fences(input);
            assert_eq!(strip_json_fences(once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_parse_with_preamble() {
        let map = parse_json_object("Sure! Here is the answer:\n{\"name\": \"Lyon\"}\nHope it helps")
            .unwrap();
        assert_eq!(map["name"], "Lyon");
    }

    #[test]
    fn test_parse_rejects_arrays() {
        let err = parse_json_object("[1, 2, 3]").unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_parse_rejects_prose() {
        assert!(parse_json_object("I am not sure who this is.").is_err());
        assert!(parse_json_object("```json\n```").is_err());
    }
}
