//! Turn raw model text into a JSON object
//!
//! Models sometimes wrap their JSON in markdown code fences even when told
//! not to. Fences are stripped first; the remainder must parse as a single
//! JSON object or the whole extraction fails with the raw text attached.

use crate::errors::{AppError, Result};
use regex_lite::Regex;
use serde_json::{Map, Value};
use std::sync::OnceLock;

fn fence_pattern() -> &'static Regex {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```(?:json)?\n?").expect("fence pattern is valid"))
}

/// Remove every ```` ```json ```` / ```` ``` ```` fence marker and trim
pub fn strip_code_fences(text: &str) -> String {
    fence_pattern().replace_all(text, "").trim().to_string()
}

/// Parse model output into a JSON object.
///
/// On failure the returned [`AppError::ModelOutput`] carries `raw` exactly as
/// received.
pub fn parse_model_output(raw: &str) -> Result<Map<String, Value>> {
    let cleaned = strip_code_fences(raw);

    let value: Value = serde_json::from_str(&cleaned).map_err(|e| AppError::ModelOutput {
        message: e.to_string(),
        raw: raw.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        other => Err(AppError::ModelOutput {
            message: format!("expected a JSON object, got {}", json_kind(&other)),
            raw: raw.to_string(),
        }),
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
