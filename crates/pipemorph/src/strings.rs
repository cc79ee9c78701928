//! Elementwise string operations.
//!
//! All of these expect string elements and pass any other kind through
//! unmodified, except `template`, which expects objects.

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::{PipelineError, PipelineErrorKind};
use crate::path::get_dot_path;
use crate::pipeline::{CancellationToken, map_elements};

/// Render a value as display text (not JSON): strings stay unquoted,
/// containers serialize to JSON text.
pub(crate) fn stringify(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Number(n) => n.to_string(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Null => "null".to_string(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_string(),
    }
}

fn map_strings<F>(
    input: Vec<JsonValue>,
    token: &CancellationToken,
    f: F,
) -> Result<Vec<JsonValue>, PipelineError>
where
    F: Fn(&str) -> JsonValue,
{
    map_elements(input, token, |element| match &element {
        JsonValue::String(s) => f(s),
        _ => element,
    })
}

/// Char-based substring with clamped bounds: `start` past the end yields
/// `""`, `length` is clamped to the remaining characters.
pub(crate) fn substring(
    start: usize,
    length: Option<usize>,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_strings(input, token, |s| {
        let taken: String = match length {
            Some(length) => s.chars().skip(start).take(length).collect(),
            None => s.chars().skip(start).collect(),
        };
        JsonValue::String(taken)
    })
}

pub(crate) fn replace(
    old_value: &str,
    new_value: &str,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_strings(input, token, |s| {
        JsonValue::String(s.replace(old_value, new_value))
    })
}

/// Split each string element into an array of its delimiter-separated
/// parts. The delimiter must be non-empty (validated at construction).
pub(crate) fn split(
    delimiter: &str,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    if delimiter.is_empty() {
        return Err(PipelineError::new(
            PipelineErrorKind::InvalidOperation,
            "split delimiter must not be empty",
        ));
    }
    map_strings(input, token, |s| {
        JsonValue::Array(
            s.split(delimiter)
                .map(|part| JsonValue::String(part.to_string()))
                .collect(),
        )
    })
}

pub(crate) fn trim(
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_strings(input, token, |s| JsonValue::String(s.trim().to_string()))
}

pub(crate) fn uppercase(
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_strings(input, token, |s| JsonValue::String(s.to_uppercase()))
}

pub(crate) fn lowercase(
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_strings(input, token, |s| JsonValue::String(s.to_lowercase()))
}

pub(crate) const PLACEHOLDER_PATTERN: &str = r"\{([^{}]+)\}";

/// Render `{path}` placeholders against each object element using the
/// dot-path dialect, replacing the element with the rendered string.
/// Unresolved placeholders are left verbatim; non-object elements pass
/// through unmodified.
pub(crate) fn template(
    template: &str,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    let placeholder = Regex::new(PLACEHOLDER_PATTERN).map_err(|err| {
        PipelineError::new(
            PipelineErrorKind::InvalidOperation,
            format!("template placeholder pattern: {}", err),
        )
    })?;
    map_elements(input, token, |element| match &element {
        JsonValue::Object(_) => {
            let rendered = placeholder.replace_all(template, |caps: &regex::Captures<'_>| {
                match get_dot_path(&element, caps[1].trim()) {
                    Some(value) => stringify(value),
                    None => caps[0].to_string(),
                }
            });
            JsonValue::String(rendered.into_owned())
        }
        _ => element,
    })
}
