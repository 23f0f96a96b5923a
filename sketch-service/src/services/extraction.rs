//! Turning raw model text into a JSON value.
//!
//! Models are asked for bare JSON but still wrap it in code fences or prose
//! from time to time. Extraction runs in three steps:
//!
//! 1. trim and strip a surrounding code fence, then parse strictly;
//! 2. otherwise parse the span from the first `{` to the last `}`;
//! 3. otherwise report why nothing could be decoded.
//!
//! The brace span is a last resort. It gives up on text holding more than one
//! object-like span and on prose containing stray braces after the payload.

use serde_json::Value;
use thiserror::Error;

const FENCE: &str = "```";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("model returned an empty response")]
    Empty,

    #[error("model response contains no JSON object")]
    NoJsonObject,

    #[error("model response is not valid JSON: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// Which step produced the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Direct,
    Fenced,
    BraceSpan,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMethod::Direct => "direct",
            ExtractionMethod::Fenced => "fenced",
            ExtractionMethod::BraceSpan => "brace_span",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub value: Value,
    pub method: ExtractionMethod,
}

/// Trim whitespace and remove a surrounding code fence with optional language tag.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    // An info string such as `json` may follow the opening fence.
    let tag_len = rest
        .find(|c: char| c == '\n' || c == '{' || c == '[')
        .unwrap_or(rest.len());
    let tag = rest[..tag_len].trim();
    let body = if tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '+' || c == '_')
    {
        &rest[tag_len..]
    } else {
        rest
    };

    let body = body.trim_end();
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

/// Byte range from the first `{` to the last `}`, inclusive.
pub fn brace_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Decode a JSON object from model output.
pub fn extract_json(text: &str) -> Result<Extracted, ExtractionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractionError::Empty);
    }

    let stripped = strip_code_fence(trimmed);
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(stripped) {
        let method = if stripped.len() == trimmed.len() {
            ExtractionMethod::Direct
        } else {
            ExtractionMethod::Fenced
        };
        return Ok(Extracted { value, method });
    }

    let span = brace_span(trimmed).ok_or(ExtractionError::NoJsonObject)?;
    let value = serde_json::from_str::<Value>(span).map_err(ExtractionError::Malformed)?;

    Ok(Extracted {
        value,
        method: ExtractionMethod::BraceSpan,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN: &str = r#"{"screen_name":"Login","layout":"single-column","sections":[{"title":"Form","elements":[{"type":"heading","label":"Login"},{"type":"input","label":"Username"}]}]}"#;

    #[test]
    fn plain_json_is_returned_unchanged() {
        let extracted = extract_json(LOGIN).unwrap();
        assert_eq!(extracted.method, ExtractionMethod::Direct);
        assert_eq!(
            extracted.value,
            serde_json::from_str::<Value>(LOGIN).unwrap()
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let extracted = extract_json(&format!("\n\n  {}  \n", LOGIN)).unwrap();
        assert_eq!(extracted.method, ExtractionMethod::Direct);
        assert_eq!(extracted.value["screen_name"], "Login");
    }

    #[test]
    fn fenced_json_parses_like_unfenced() {
        let plain = extract_json(LOGIN).unwrap().value;

        for wrapped in [
            format!("```json\n{}\n```", LOGIN),
            format!("```\n{}\n```", LOGIN),
            format!("```JSON\n{}```", LOGIN),
            format!("  ```json{}```  ", LOGIN),
        ] {
            let extracted = extract_json(&wrapped).unwrap();
            assert_eq!(extracted.method, ExtractionMethod::Fenced, "{}", wrapped);
            assert_eq!(extracted.value, plain);
        }
    }

    #[test]
    fn prose_around_json_falls_back_to_brace_span() {
        let text = format!("Sure, here you go: {} Hope that helps!", LOGIN);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(extracted.method, ExtractionMethod::BraceSpan);
        assert_eq!(extracted.value["sections"][0]["elements"][1]["label"], "Username");
    }

    #[test]
    fn fence_inside_prose_falls_back_to_brace_span() {
        let text = format!("Here is the UI:\n```json\n{}\n```\nLet me know!", LOGIN);
        let extracted = extract_json(&text).unwrap();
        assert_eq!(extracted.method, ExtractionMethod::BraceSpan);
        assert_eq!(extracted.value["layout"], "single-column");
    }

    #[test]
    fn text_without_braces_is_no_json_object() {
        let err = extract_json("I could not read the sketch, sorry.").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJsonObject));
    }

    #[test]
    fn reversed_braces_are_no_json_object() {
        let err = extract_json("} nothing here {").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJsonObject));
    }

    #[test]
    fn empty_text_is_empty() {
        assert!(matches!(extract_json("   \n").unwrap_err(), ExtractionError::Empty));
    }

    #[test]
    fn truncated_json_is_malformed() {
        let err = extract_json(r#"{"screen_name": "Login", "sections": [{"#).unwrap_err();
        assert!(matches!(err, ExtractionError::NoJsonObject | ExtractionError::Malformed(_)));

        let err = extract_json(r#"{"screen_name": "Login", "layout": } trailing"#).unwrap_err();
        assert!(matches!(err, ExtractionError::Malformed(_)));
    }

    #[test]
    fn bare_scalars_are_not_accepted_as_objects() {
        let err = extract_json("\"just a string\"").unwrap_err();
        assert!(matches!(err, ExtractionError::NoJsonObject));
    }

    #[test]
    fn braces_inside_string_values_survive_the_span() {
        let text = r#"Result: {"screen_name": "Curly {braces}", "layout": "two-column", "sections": []} done"#;
        let extracted = extract_json(text).unwrap();
        assert_eq!(extracted.value["screen_name"], "Curly {braces}");
    }

    // Known limits of the brace-span heuristic: both cases give up instead of
    // guessing which object was meant.
    #[test]
    fn two_objects_in_prose_are_not_recovered() {
        let text = r#"First {"a": 1} and then {"b": 2}"#;
        assert!(matches!(
            extract_json(text).unwrap_err(),
            ExtractionError::Malformed(_)
        ));
    }

    #[test]
    fn stray_brace_after_payload_is_not_recovered() {
        let text = r#"{"a": 1} (see section {x})"#;
        assert!(matches!(
            extract_json(text).unwrap_err(),
            ExtractionError::Malformed(_)
        ));
    }

    #[test]
    fn strip_code_fence_leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fence("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(strip_code_fence("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fence("```\n[1, 2]\n```"), "[1, 2]");
    }

    #[test]
    fn brace_span_covers_outermost_braces() {
        assert_eq!(brace_span("x {a {b} c} y"), Some("{a {b} c}"));
        assert_eq!(brace_span("no braces"), None);
    }
}
