//! Normalisation of generative model responses.
//!
//! The model service does not promise a stable response shape, so the raw JSON
//! is matched against a closed set of known shapes, one matcher per shape,
//! tried in a fixed order:
//!
//! 1. `DirectText`: a top-level `text` string.
//! 2. `CandidateParts`: `candidates[0].content` holding a `parts` array of text
//!    fragments (or, in older payloads, a bare string or a `text` field).
//! 3. `NestedFallback`: best-effort, depth-bounded search for any `text` or
//!    `content` string longer than 100 characters. This last matcher can pick
//!    up the wrong field on exotic payloads and carries no correctness
//!    guarantee beyond "non-empty text".

use serde_json::Value;

pub const NESTED_SEARCH_MAX_DEPTH: usize = 5;
pub const NESTED_SEARCH_MIN_CHARS: usize = 100;
const SHAPE_PREVIEW_CHARS: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    DirectText(String),
    CandidateParts(Vec<String>),
    NestedFallback(String),
}

type Matcher = fn(&Value) -> Option<ModelResponse>;

const MATCHERS: [Matcher; 3] = [match_direct_text, match_candidate_parts, match_nested_fallback];

impl ModelResponse {
    /// First matching shape, or `None` if no shape yields non-empty text.
    pub fn parse(value: &Value) -> Option<Self> {
        MATCHERS.iter().find_map(|matcher| matcher(value))
    }

    pub fn shape(&self) -> &'static str {
        match self {
            ModelResponse::DirectText(_) => "direct-text",
            ModelResponse::CandidateParts(_) => "candidate-parts",
            ModelResponse::NestedFallback(_) => "nested-fallback",
        }
    }

    pub fn into_text(self) -> String {
        match self {
            ModelResponse::DirectText(text) | ModelResponse::NestedFallback(text) => text,
            ModelResponse::CandidateParts(parts) => parts.concat(),
        }
    }
}

fn non_empty(text: &str) -> Option<String> {
    (!text.trim().is_empty()).then(|| text.to_string())
}

fn match_direct_text(value: &Value) -> Option<ModelResponse> {
    value
        .get("text")
        .and_then(Value::as_str)
        .and_then(non_empty)
        .map(ModelResponse::DirectText)
}

fn match_candidate_parts(value: &Value) -> Option<ModelResponse> {
    let content = value.get("candidates")?.as_array()?.first()?.get("content")?;

    let parts: Vec<String> = if let Some(parts) = content.get("parts").and_then(Value::as_array) {
        parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    } else if let Some(text) = content.as_str() {
        vec![text.to_string()]
    } else if let Some(text) = content.get("text").and_then(Value::as_str) {
        vec![text.to_string()]
    } else {
        Vec::new()
    };

    if parts.iter().all(|p| p.trim().is_empty()) {
        return None;
    }
    Some(ModelResponse::CandidateParts(parts))
}

fn match_nested_fallback(value: &Value) -> Option<ModelResponse> {
    find_long_text(value, 0).map(|text| ModelResponse::NestedFallback(text.to_string()))
}

fn find_long_text(value: &Value, depth: usize) -> Option<&str> {
    if depth > NESTED_SEARCH_MAX_DEPTH {
        return None;
    }
    match value {
        Value::Object(map) => map.iter().find_map(|(key, child)| {
            let direct = (key == "text" || key == "content")
                .then(|| child.as_str())
                .flatten()
                .filter(|s| s.chars().count() > NESTED_SEARCH_MIN_CHARS);
            direct.or_else(|| find_long_text(child, depth + 1))
        }),
        Value::Array(items) => items.iter().find_map(|item| find_long_text(item, depth + 1)),
        _ => None,
    }
}

/// Short description of an unrecognised response, for error messages.
pub fn describe_shape(value: &Value) -> String {
    let keys = match value {
        Value::Object(map) => map.keys().cloned().collect::<Vec<_>>().join(", "),
        Value::Array(items) => format!("<array of {}>", items.len()),
        other => format!("<{}>", type_name(other)),
    };
    let body = serde_json::to_string(value).unwrap_or_default();
    let preview: String = body.chars().take(SHAPE_PREVIEW_CHARS).collect();
    format!("keys=[{}] body={}", keys, preview)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
