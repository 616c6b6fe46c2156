// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: GPL-3.0-only

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::domain::{CandidateSet, CommitCandidate, CommitType, MAX_CANDIDATES, MAX_SUBJECT_CHARS};
use crate::error::{ParseError, Result};

/// Turns raw model output into a validated [`CandidateSet`].
///
/// Two separable stages: [`ResponseParser::parse_json`] finds a JSON value
/// in the text, [`ResponseParser::validate`] checks it against the
/// candidate schema. Nothing is coerced; any violation rejects the whole
/// response.
pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(raw: &str) -> Result<CandidateSet> {
        let value = Self::parse_json(raw)?;
        let set = Self::validate(&value)?;
        debug!(candidates = set.len(), "model response accepted");
        Ok(set)
    }

    /// Stage 1: raw text to a generic JSON value.
    ///
    /// Accepts bare JSON, JSON in a ```` ```json ```` or plain fence, or the
    /// first balanced object embedded in surrounding prose.
    pub fn parse_json(raw: &str) -> std::result::Result<Value, ParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ParseError::Malformed("empty response".into()));
        }

        let direct_err = match serde_json::from_str::<Value>(trimmed) {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        if let Some(fenced) = Self::fenced_block(trimmed)
            && let Ok(value) = serde_json::from_str::<Value>(fenced)
        {
            return Ok(value);
        }

        for (start, _) in trimmed.match_indices('{') {
            if let Some(object) = Self::balanced_object(&trimmed[start..])
                && let Ok(value) = serde_json::from_str::<Value>(object)
            {
                return Ok(value);
            }
        }

        Err(ParseError::Malformed(direct_err.to_string()))
    }

    fn fenced_block(text: &str) -> Option<&str> {
        if let Some(start) = text.find("```json") {
            let after = &text[start + 7..];
            return after.find("```").map(|end| after[..end].trim());
        }

        let start = text.find("```")?;
        let after = &text[start + 3..];
        let end = after.find("```")?;
        Some(after[..end].trim())
    }

    /// Slice from the leading `{` to its matching `}`, skipping braces
    /// inside string literals.
    fn balanced_object(text: &str) -> Option<&str> {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escape_next = false;

        for (idx, ch) in text.char_indices() {
            if escape_next {
                escape_next = false;
                continue;
            }

            match ch {
                '\\' if in_string => escape_next = true,
                '"' => in_string = !in_string,
                '{' if !in_string => depth += 1,
                '}' if !in_string => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(&text[..=idx]);
                    }
                }
                _ => {}
            }
        }

        None
    }

    /// Stage 2: generic JSON value to a strongly typed candidate set.
    ///
    /// Arrays longer than [`MAX_CANDIDATES`] are clipped before validation.
    pub fn validate(value: &Value) -> std::result::Result<CandidateSet, ParseError> {
        let options = value
            .get("options")
            .and_then(Value::as_array)
            .ok_or(ParseError::MissingOptions)?;

        if options.len() > MAX_CANDIDATES {
            warn!(
                returned = options.len(),
                kept = MAX_CANDIDATES,
                "model returned too many options, clipping"
            );
        }

        let candidates = options
            .iter()
            .take(MAX_CANDIDATES)
            .enumerate()
            .map(|(i, option)| Self::validate_option(i + 1, option))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        CandidateSet::new(candidates).ok_or(ParseError::Empty)
    }

    fn validate_option(
        index: usize,
        option: &Value,
    ) -> std::result::Result<CommitCandidate, ParseError> {
        let field_error = |field: &'static str, problem: &str| ParseError::Field {
            index,
            field,
            problem: problem.to_string(),
        };

        let object = option
            .as_object()
            .ok_or_else(|| field_error("option", "must be an object"))?;

        let raw_type = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| field_error("type", "must be a string"))?;
        let commit_type =
            CommitType::parse(raw_type).ok_or_else(|| ParseError::UnknownType {
                index,
                value: raw_type.to_string(),
            })?;

        let scope = optional_text(object, "scope")
            .map_err(|problem| field_error("scope", problem))?;

        let subject = object
            .get("subject")
            .and_then(Value::as_str)
            .map(str::trim)
            .ok_or_else(|| field_error("subject", "must be a string"))?;
        if subject.is_empty() {
            return Err(field_error("subject", "must not be empty"));
        }
        let len = subject.chars().count();
        if len > MAX_SUBJECT_CHARS {
            return Err(ParseError::SubjectTooLong {
                index,
                len,
                max: MAX_SUBJECT_CHARS,
            });
        }

        let body =
            optional_text(object, "body").map_err(|problem| field_error("body", problem))?;

        let confidence = object
            .get("confidence")
            .and_then(Value::as_f64)
            .ok_or_else(|| field_error("confidence", "must be a number"))?;
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ParseError::Confidence {
                index,
                value: confidence,
            });
        }

        Ok(CommitCandidate::new(
            commit_type,
            scope,
            subject.to_string(),
            body,
            confidence,
        ))
    }
}

/// Absent, `null` and blank strings all mean "not provided".
fn optional_text(
    object: &Map<String, Value>,
    key: &str,
) -> std::result::Result<Option<String>, &'static str> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err("must be a string or null"),
    }
}

/// Machine-readable description of the response schema, substituted into
/// the system prompt as `{format_instructions}`.
pub fn format_instructions() -> String {
    let types = CommitType::ALL
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"The output must be a single JSON object matching this schema, with no text before or after it:

{{"options": [{{"type": string, "scope": string | null, "subject": string, "body": string | null, "confidence": number}}]}}

Field rules:
- "options": array with at least 1 and at most {max} items
- "type": exactly one of {types}
- "scope": short lowercase area name such as "parser", or null
- "subject": imperative summary line, at most {subject} characters
- "body": explanation wrapped at 72 columns, or null
- "confidence": number from 0.0 to 1.0

Example:
{{"options": [{{"type": "fix", "scope": "parser", "subject": "handle empty input", "body": null, "confidence": 0.9}}]}}"#,
        max = MAX_CANDIDATES,
        subject = MAX_SUBJECT_CHARS,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_object_ignores_braces_in_strings() {
        let text = r#"{"a": "use { and } carefully"} trailing"#;
        assert_eq!(
            ResponseParser::balanced_object(text),
            Some(r#"{"a": "use { and } carefully"}"#)
        );
    }

    #[test]
    fn unbalanced_object_is_none() {
        assert_eq!(ResponseParser::balanced_object(r#"{"a": {"#), None);
    }

    #[test]
    fn format_instructions_list_every_type() {
        let text = format_instructions();
        for t in CommitType::ALL {
            assert!(text.contains(&format!("\"{t}\"")));
        }
        assert!(text.contains("at most 5 items"));
    }
}
