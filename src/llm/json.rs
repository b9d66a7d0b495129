// ABOUTME: Tolerant extraction of a JSON object from free-form model output
// ABOUTME: Tries the raw text, fenced code blocks, then the outermost brace span
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Meal Planner Contributors

use serde_json::{Map, Value};

/// Find the first JSON object in a model reply
///
/// Candidates are tried in order: the trimmed text, every segment between
/// triple backticks (a leading `json` language tag is dropped), then the span
/// from the first `{` to the last `}`. Arrays and scalars are skipped.
#[must_use]
pub fn extract_json_object(raw: &str) -> Option<Map<String, Value>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut candidates: Vec<&str> = vec![trimmed];
    if trimmed.contains("```") {
        for segment in trimmed.split("```") {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let segment = match segment.get(..4) {
                Some(tag) if tag.eq_ignore_ascii_case("json") => segment[4..].trim(),
                _ => segment,
            };
            candidates.push(segment);
        }
    }
    if let (Some(first), Some(last)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if last > first {
            candidates.push(&trimmed[first..=last]);
        }
    }

    candidates
        .into_iter()
        .find_map(|candidate| match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
}
