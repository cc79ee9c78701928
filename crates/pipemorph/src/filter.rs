//! Filtering and slicing operations.

use std::collections::HashSet;

use serde_json::Value as JsonValue;

use crate::error::PipelineError;
use crate::model::FilterOperator;
use crate::path::{get_path, parse_path};

/// Numeric equality tolerance for the filter operation.
const NUMERIC_EPSILON: f64 = 1e-4;

/// Keep elements whose `field` passes the comparison.
///
/// Unlike the elementwise operators, a kind mismatch (or a missing field)
/// fails the condition and excludes the element; nothing passes through.
pub(crate) fn filter(
    field: &str,
    operator: FilterOperator,
    expected: &JsonValue,
    input: Vec<JsonValue>,
) -> Result<Vec<JsonValue>, PipelineError> {
    let tokens = parse_path(field)?;
    Ok(input
        .into_iter()
        .filter(|element| {
            get_path(element, &tokens)
                .map(|actual| matches_condition(actual, operator, expected))
                .unwrap_or(false)
        })
        .collect())
}

fn matches_condition(actual: &JsonValue, operator: FilterOperator, expected: &JsonValue) -> bool {
    match operator {
        FilterOperator::Eq => values_equal(actual, expected),
        FilterOperator::Ne => {
            // Kind mismatch still fails the condition rather than counting
            // as "not equal".
            comparable_kinds(actual, expected) && !values_equal(actual, expected)
        }
        FilterOperator::Gt => ordering(actual, expected)
            .map(|ord| ord == std::cmp::Ordering::Greater)
            .unwrap_or(false),
        FilterOperator::Gte => ordering(actual, expected)
            .map(|ord| ord != std::cmp::Ordering::Less)
            .unwrap_or(false),
        FilterOperator::Lt => ordering(actual, expected)
            .map(|ord| ord == std::cmp::Ordering::Less)
            .unwrap_or(false),
        FilterOperator::Lte => ordering(actual, expected)
            .map(|ord| ord != std::cmp::Ordering::Greater)
            .unwrap_or(false),
        FilterOperator::Contains => match (actual, expected) {
            (JsonValue::String(a), JsonValue::String(e)) => a.contains(e.as_str()),
            _ => false,
        },
        FilterOperator::StartsWith => match (actual, expected) {
            (JsonValue::String(a), JsonValue::String(e)) => a.starts_with(e.as_str()),
            _ => false,
        },
        FilterOperator::EndsWith => match (actual, expected) {
            (JsonValue::String(a), JsonValue::String(e)) => a.ends_with(e.as_str()),
            _ => false,
        },
    }
}

fn comparable_kinds(actual: &JsonValue, expected: &JsonValue) -> bool {
    matches!(
        (actual, expected),
        (JsonValue::Number(_), JsonValue::Number(_))
            | (JsonValue::String(_), JsonValue::String(_))
            | (JsonValue::Bool(_), JsonValue::Bool(_))
            | (JsonValue::Null, JsonValue::Null)
    )
}

fn values_equal(actual: &JsonValue, expected: &JsonValue) -> bool {
    match (actual, expected) {
        (JsonValue::Number(a), JsonValue::Number(e)) => match (a.as_f64(), e.as_f64()) {
            (Some(a), Some(e)) => (a - e).abs() < NUMERIC_EPSILON,
            _ => false,
        },
        (JsonValue::String(a), JsonValue::String(e)) => a == e,
        (JsonValue::Bool(a), JsonValue::Bool(e)) => a == e,
        (JsonValue::Null, JsonValue::Null) => true,
        _ => false,
    }
}

fn ordering(actual: &JsonValue, expected: &JsonValue) -> Option<std::cmp::Ordering> {
    match (actual, expected) {
        (JsonValue::Number(a), JsonValue::Number(e)) => {
            a.as_f64()?.partial_cmp(&e.as_f64()?)
        }
        (JsonValue::String(a), JsonValue::String(e)) => Some(a.cmp(e)),
        _ => None,
    }
}

pub(crate) fn first(input: Vec<JsonValue>) -> Vec<JsonValue> {
    input.into_iter().take(1).collect()
}

pub(crate) fn last(mut input: Vec<JsonValue>) -> Vec<JsonValue> {
    match input.pop() {
        Some(element) => vec![element],
        None => Vec::new(),
    }
}

pub(crate) fn nth(index: usize, mut input: Vec<JsonValue>) -> Vec<JsonValue> {
    if index < input.len() {
        vec![input.swap_remove(index)]
    } else {
        Vec::new()
    }
}

pub(crate) fn limit(count: usize, mut input: Vec<JsonValue>) -> Vec<JsonValue> {
    input.truncate(count);
    input
}

pub(crate) fn skip(count: usize, input: Vec<JsonValue>) -> Vec<JsonValue> {
    input.into_iter().skip(count).collect()
}

/// Dedup by the exact serialized JSON text of each element, keeping the
/// first occurrence. Two structurally-equal objects with keys in different
/// order serialize differently and are therefore kept as distinct.
pub(crate) fn unique(input: Vec<JsonValue>) -> Vec<JsonValue> {
    let mut seen = HashSet::new();
    input
        .into_iter()
        .filter(|element| seen.insert(element.to_string()))
        .collect()
}

/// Split the array into sub-arrays of `size`; the last chunk may be
/// shorter. A non-positive size yields an empty result.
pub(crate) fn chunk(size: i64, input: Vec<JsonValue>) -> Vec<JsonValue> {
    if size <= 0 {
        return Vec::new();
    }
    input
        .chunks(size as usize)
        .map(|chunk| JsonValue::Array(chunk.to_vec()))
        .collect()
}

/// Pair element *i* of the input with element *i* of `with_array` into a
/// two-element array; the shorter side truncates the output.
pub(crate) fn zip(with_array: &[JsonValue], input: Vec<JsonValue>) -> Vec<JsonValue> {
    input
        .into_iter()
        .zip(with_array.iter().cloned())
        .map(|(left, right)| JsonValue::Array(vec![left, right]))
        .collect()
}

pub(crate) fn reverse(mut input: Vec<JsonValue>) -> Vec<JsonValue> {
    input.reverse();
    input
}
