// ============================================================
// Layer 3 — Raw Example Domain Type
// ============================================================
// One input example as the caller hands it over, before any
// tokenisation or padding. Two shapes are legal:
//
//   Text   — a single untokenized string; the external
//            tokenizer splits it into wordpiece tokens.
//   Tokens — an already-tokenized flat list of token strings.
//
// Anything else (in particular a list of token LISTS, i.e. a
// multi-segment input) is rejected: this model works on single
// sequences only, unlike the two-segment classifier variants.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::PipelineError;

/// A raw, un-encoded input example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawExample {
    /// An untokenized sentence
    Text(String),

    /// A single pre-tokenized sequence
    Tokens(Vec<String>),
}

impl RawExample {
    /// Parse one untyped JSON value into a RawExample.
    ///
    /// `tokenized` tells us which shape the caller claims to be
    /// sending; the value is validated against that claim so a
    /// nested list like `[["a","b"],["c"]]` fails loudly instead
    /// of silently flattening.
    pub fn from_value(value: &Value, tokenized: bool) -> Result<Self, PipelineError> {
        if !tokenized {
            if let Value::String(s) = value {
                return Ok(RawExample::Text(s.clone()));
            }
        } else if let Value::Array(items) = value {
            if items.iter().all(|v| v.is_string()) {
                let tokens = items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect();
                return Ok(RawExample::Tokens(tokens));
            }
            // A list of lists is a multi-segment input
            return Err(PipelineError::invalid_input(format!(
                "'{value}' has multiple segments; only single sequence inputs are supported",
            )));
        }
        Err(PipelineError::invalid_input(format!(
            "wrong input format: '{value}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untokenized_string_accepted() {
        let ex = RawExample::from_value(&json!("hello world"), false).unwrap();
        assert!(matches!(ex, RawExample::Text(_)));
    }

    #[test]
    fn test_tokenized_flat_list_accepted() {
        let ex = RawExample::from_value(&json!(["hello", "world"]), true).unwrap();
        match ex {
            RawExample::Tokens(t) => assert_eq!(t, vec!["hello", "world"]),
            _ => panic!("expected Tokens"),
        }
    }

    #[test]
    fn test_multi_segment_rejected() {
        let err = RawExample::from_value(&json!([["a", "b"], ["c"]]), true).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
        assert!(err.to_string().contains("single sequence"));
    }

    #[test]
    fn test_number_rejected() {
        let err = RawExample::from_value(&json!(42), false).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput(_)));
    }
}
