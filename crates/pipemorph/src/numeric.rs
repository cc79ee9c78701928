//! Elementwise numeric operations.
//!
//! All of these expect number elements and pass any other kind through
//! unmodified. Results are produced as 64-bit floats.

use serde_json::Value as JsonValue;

use crate::error::{PipelineError, PipelineErrorKind};
use crate::pipeline::{CancellationToken, map_elements};

fn map_numbers<F>(
    input: Vec<JsonValue>,
    token: &CancellationToken,
    f: F,
) -> Result<Vec<JsonValue>, PipelineError>
where
    F: Fn(f64) -> f64,
{
    map_elements(input, token, |element| match &element {
        JsonValue::Number(n) => match n.as_f64() {
            Some(value) => match serde_json::Number::from_f64(f(value)) {
                Some(result) => JsonValue::Number(result),
                // Non-finite result; keep the original value.
                None => element,
            },
            None => element,
        },
        _ => element,
    })
}

pub(crate) fn abs(
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_numbers(input, token, f64::abs)
}

pub(crate) fn ceil(
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_numbers(input, token, f64::ceil)
}

pub(crate) fn floor(
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_numbers(input, token, f64::floor)
}

pub(crate) fn round(
    decimals: i32,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    let factor = 10f64.powi(decimals);
    map_numbers(input, token, move |value| (value * factor).round() / factor)
}

pub(crate) fn scale(
    factor: f64,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_numbers(input, token, move |value| value * factor)
}

pub(crate) fn clamp(
    min: f64,
    max: f64,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    if min > max {
        return Err(PipelineError::new(
            PipelineErrorKind::InvalidOperation,
            format!("clamp bounds inverted: min {} > max {}", min, max),
        ));
    }
    map_numbers(input, token, move |value| value.clamp(min, max))
}

pub(crate) fn percentage(
    total: f64,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    if total == 0.0 {
        return Err(PipelineError::new(
            PipelineErrorKind::InvalidOperation,
            "percentage total must be non-zero",
        ));
    }
    map_numbers(input, token, move |value| value / total * 100.0)
}
