// src/classify/parse.rs
//! Decoding of the LLM's free-text batch response into per-article
//! classification objects. A fallible decode with a tagged error — never a
//! panic, never a partial batch.

use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Deserialize;

/// One classification object as returned by the model. Missing fields decode
/// to defaults so a sloppy-but-shaped response still parses.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RawClassification {
    #[serde(default)]
    pub is_relevant: bool,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub content_type: String,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchParseError {
    /// No JSON array could be decoded from the response at all.
    Unparseable,
    /// An array was decoded but its length does not match the batch.
    LengthMismatch { expected: usize, got: usize },
}

impl std::fmt::Display for BatchParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparseable => write!(f, "no classification list found in response"),
            Self::LengthMismatch { expected, got } => {
                write!(f, "classification list length {got} != batch size {expected}")
            }
        }
    }
}

impl std::error::Error for BatchParseError {}

/// Extract the per-article classification list from a response.
///
/// Strict path: the whole response is a JSON array of the expected length.
/// Fallback: the first bracket-delimited `[{...}]` substring is parsed
/// instead (models often wrap the array in prose or code fences). Both
/// paths require the decoded length to equal `expected_count` — accepting a
/// short list would silently misalign classifications to articles.
pub fn parse_batch_response(
    text: &str,
    expected_count: usize,
) -> Result<Vec<RawClassification>, BatchParseError> {
    if let Ok(list) = serde_json::from_str::<Vec<RawClassification>>(text) {
        return check_len(list, expected_count);
    }

    static RE_ARRAY: OnceCell<Regex> = OnceCell::new();
    let re = RE_ARRAY.get_or_init(|| Regex::new(r"(?s)\[\s*\{.*\}\s*\]").unwrap());

    if let Some(m) = re.find(text) {
        if let Ok(list) = serde_json::from_str::<Vec<RawClassification>>(m.as_str()) {
            return check_len(list, expected_count);
        }
    }
    Err(BatchParseError::Unparseable)
}

fn check_len(
    list: Vec<RawClassification>,
    expected: usize,
) -> Result<Vec<RawClassification>, BatchParseError> {
    if list.len() == expected {
        Ok(list)
    } else {
        Err(BatchParseError::LengthMismatch {
            expected,
            got: list.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO: &str = r#"[
        {"is_relevant": true, "region": "India", "content_type": "general", "reasoning": "on topic"},
        {"is_relevant": false, "region": "Global", "content_type": "sensitive", "reasoning": "off topic"}
    ]"#;

    #[test]
    fn strict_parse_accepts_exact_length() {
        let list = parse_batch_response(TWO, 2).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list[0].is_relevant);
        assert_eq!(list[1].region, "Global");
    }

    #[test]
    fn strict_parse_rejects_wrong_length() {
        let err = parse_batch_response(TWO, 3).unwrap_err();
        assert_eq!(
            err,
            BatchParseError::LengthMismatch {
                expected: 3,
                got: 2
            }
        );
    }

    #[test]
    fn fallback_extracts_array_wrapped_in_prose() {
        let wrapped = format!("Here are the classifications:\n```json\n{TWO}\n```\nDone.");
        let list = parse_batch_response(&wrapped, 2).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].content_type, "general");
    }

    #[test]
    fn fallback_still_requires_length_match() {
        let wrapped = format!("prose {TWO} trailer");
        let err = parse_batch_response(&wrapped, 5).unwrap_err();
        assert!(matches!(err, BatchParseError::LengthMismatch { got: 2, .. }));
    }

    #[test]
    fn garbage_is_unparseable() {
        assert_eq!(
            parse_batch_response("not json", 1).unwrap_err(),
            BatchParseError::Unparseable
        );
        assert_eq!(
            parse_batch_response("", 1).unwrap_err(),
            BatchParseError::Unparseable
        );
    }

    #[test]
    fn missing_fields_default() {
        let list = parse_batch_response(r#"[{"is_relevant": true}]"#, 1).unwrap();
        assert!(list[0].is_relevant);
        assert_eq!(list[0].region, "");
        assert_eq!(list[0].reasoning, "");
    }
}
