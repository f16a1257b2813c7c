//! Generated practice problems and the sanitization layer that keeps them
//! well-formed regardless of backend drift.
//!
//! Invariant: every leaf value of a [`GeneratedProblem`] is a string. The
//! prompt asks the backend for pre-stringified JSON, but models drift, so
//! [`deep_stringify`] flattens whatever comes back. A malformed (unparseable)
//! payload is the one failure that is absorbed rather than surfaced: it
//! yields [`fallback_problem`] instead of an error.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Requested difficulty of a generated problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }

    pub fn capitalized(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Intermediate => "Intermediate",
            Difficulty::Advanced => "Advanced",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Difficulty::Beginner),
            "intermediate" => Some(Difficulty::Intermediate),
            "advanced" => Some(Difficulty::Advanced),
            _ => None,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One worked example attached to a problem. All fields are display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkedExample {
    pub input: String,
    pub output: String,
    pub explanation: String,
}

/// A coding problem produced by the AI gateway (or its canned fallback).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedProblem {
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub examples: Vec<WorkedExample>,
    pub constraints: Vec<String>,
    pub hints: Vec<String>,
}

/// Turns the raw generation text into a problem: strip optional code fences,
/// parse as JSON, sanitize. Parse failure falls back to the canned problem
/// for the requested difficulty; it never raises.
pub(crate) fn problem_from_response_text(text: &str, requested: Difficulty) -> GeneratedProblem {
    let stripped = strip_code_fences(text);
    match serde_json::from_str::<Value>(stripped) {
        Ok(value) => sanitize_problem(&value, requested),
        Err(error) => {
            warn!(%error, "generated problem JSON did not parse, using fallback problem");
            fallback_problem(requested)
        }
    }
}

/// Recursive conversion of any JSON value to its textual form.
///
/// Null becomes the empty string, strings pass through, objects and arrays
/// are pretty-printed, everything else uses its JSON representation.
pub fn deep_stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

/// Coerces a parsed payload into the [`GeneratedProblem`] shape, flattening
/// nested structures so only string leaves remain.
pub(crate) fn sanitize_problem(value: &Value, requested: Difficulty) -> GeneratedProblem {
    let difficulty = value
        .get("difficulty")
        .and_then(Value::as_str)
        .and_then(Difficulty::from_label)
        .unwrap_or(requested);

    let examples = value
        .get("examples")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .map(|entry| WorkedExample {
                    input: stringify_field(entry, "input"),
                    output: stringify_field(entry, "output"),
                    explanation: stringify_field(entry, "explanation"),
                })
                .collect()
        })
        .unwrap_or_default();

    GeneratedProblem {
        title: stringify_field_or(value, "title", "Coding Challenge"),
        description: stringify_field_or(value, "description", "Solve this problem"),
        difficulty,
        examples,
        constraints: stringify_list(value, "constraints"),
        hints: stringify_list(value, "hints"),
    }
}

fn stringify_field(value: &Value, key: &str) -> String {
    deep_stringify(value.get(key).unwrap_or(&Value::Null))
}

fn stringify_field_or(value: &Value, key: &str, default: &str) -> String {
    let text = stringify_field(value, key);
    if text.is_empty() {
        default.to_string()
    } else {
        text
    }
}

fn stringify_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|entries| entries.iter().map(deep_stringify).collect())
        .unwrap_or_default()
}

/// Canned problem used when the backend's JSON cannot be parsed at all.
pub fn fallback_problem(difficulty: Difficulty) -> GeneratedProblem {
    GeneratedProblem {
        title: format!("{} Coding Challenge", difficulty.capitalized()),
        description: "Solve this algorithmic problem using optimal time and space complexity."
            .to_string(),
        difficulty,
        examples: vec![WorkedExample {
            input: "arr = [1, 2, 3, 4, 5]".to_string(),
            output: "result".to_string(),
            explanation: "Process the array according to the problem requirements.".to_string(),
        }],
        constraints: vec![
            "1 <= arr.length <= 1000".to_string(),
            "Values are integers".to_string(),
        ],
        hints: vec![
            "Consider edge cases".to_string(),
            "Think about time complexity".to_string(),
        ],
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences the model sometimes
/// wraps around its JSON output.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let text = text.trim();
    let body = if let Some(stripped) = text.strip_prefix("```json") {
        stripped
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
    } else {
        return text;
    };
    let body = body.trim_start();
    body.strip_suffix("```").map(str::trim_end).unwrap_or(body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn strip_code_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn strip_code_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn strip_code_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_code_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn deep_stringify_scalars() {
        assert_eq!(deep_stringify(&Value::Null), "");
        assert_eq!(deep_stringify(&json!("text")), "text");
        assert_eq!(deep_stringify(&json!(42)), "42");
        assert_eq!(deep_stringify(&json!(true)), "true");
    }

    #[test]
    fn deep_stringify_is_idempotent() {
        let inputs = vec![
            json!(null),
            json!("already a string"),
            json!(3.5),
            json!({"n": 5, "edges": [[0, 1], [1, 2]]}),
            json!([1, "two", null, {"three": 3}]),
        ];
        for input in inputs {
            let once = deep_stringify(&input);
            let twice = deep_stringify(&Value::String(once.clone()));
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn sanitize_flattens_nested_example_fields_to_strings() {
        let payload = json!({
            "title": "Graph Connectivity",
            "description": "Decide whether the graph is connected.",
            "difficulty": "intermediate",
            "examples": [{
                "input": {"n": 5, "edges": [[0, 1], [1, 2]]},
                "output": false,
                "explanation": null
            }],
            "constraints": [{"max_n": 1000}, "n >= 1"],
            "hints": [["dfs", "bfs"], "use a visited set"]
        });

        let problem = sanitize_problem(&payload, Difficulty::Beginner);

        assert_eq!(problem.difficulty, Difficulty::Intermediate);
        assert_eq!(problem.examples.len(), 1);
        // Nested object flattened to its pretty-printed text.
        assert!(problem.examples[0].input.contains("\"n\": 5"));
        assert_eq!(problem.examples[0].output, "false");
        assert_eq!(problem.examples[0].explanation, "");
        assert!(problem.constraints[0].contains("\"max_n\": 1000"));
        assert_eq!(problem.constraints[1], "n >= 1");
        assert!(problem.hints[0].contains("dfs"));
        assert_eq!(problem.hints[1], "use a visited set");
    }

    #[test]
    fn sanitize_fills_missing_fields_with_defaults() {
        let payload = json!({"difficulty": "not-a-real-level"});
        let problem = sanitize_problem(&payload, Difficulty::Advanced);

        assert_eq!(problem.title, "Coding Challenge");
        assert_eq!(problem.description, "Solve this problem");
        // Unrecognized difficulty label falls back to the requested one.
        assert_eq!(problem.difficulty, Difficulty::Advanced);
        assert!(problem.examples.is_empty());
        assert!(problem.constraints.is_empty());
        assert!(problem.hints.is_empty());
    }

    #[test]
    fn malformed_json_returns_fallback_for_requested_difficulty() {
        let problem = problem_from_response_text("{title: 'X'", Difficulty::Intermediate);
        assert_eq!(problem.title, "Intermediate Coding Challenge");
        assert_eq!(problem.difficulty, Difficulty::Intermediate);
        assert!(!problem.examples.is_empty());
    }

    #[test]
    fn fenced_valid_json_is_parsed_not_fallback() {
        let text = "```json\n{\"title\": \"Two Pointers\", \"difficulty\": \"beginner\"}\n```";
        let problem = problem_from_response_text(text, Difficulty::Beginner);
        assert_eq!(problem.title, "Two Pointers");
    }

    #[test]
    fn difficulty_serde_uses_lowercase_labels() {
        assert_eq!(
            serde_json::to_string(&Difficulty::Beginner).unwrap(),
            "\"beginner\""
        );
        let parsed: Difficulty = serde_json::from_str("\"advanced\"").unwrap();
        assert_eq!(parsed, Difficulty::Advanced);
    }
}
