//! Selection and reshaping operations: select, map, enrich, flatMap,
//! flatten, concat.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use crate::error::PipelineError;
use crate::path::{PathToken, get_path, parse_path};
use crate::pipeline::{CancellationToken, map_elements};
use crate::strings::stringify;

fn compile_fields(
    fields: &IndexMap<String, String>,
) -> Result<Vec<(&str, Vec<PathToken>)>, PipelineError> {
    fields
        .iter()
        .map(|(name, path)| Ok((name.as_str(), parse_path(path)?)))
        .collect()
}

/// Build a new object per element from named path lookups; a missing match
/// omits the key. Output key order follows definition order. Backs both the
/// `select` and `map` operations, which share one contract.
pub(crate) fn project(
    fields: &IndexMap<String, String>,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    let compiled = compile_fields(fields)?;
    map_elements(input, token, |element| {
        let mut projected = Map::new();
        for (name, tokens) in &compiled {
            if let Some(value) = get_path(&element, tokens) {
                projected.insert((*name).to_string(), value.clone());
            }
        }
        JsonValue::Object(projected)
    })
}

/// Like `project`, but merges the computed fields into the existing object
/// instead of replacing it. Non-object elements pass through unmodified.
pub(crate) fn enrich(
    fields: &IndexMap<String, String>,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    let compiled = compile_fields(fields)?;
    map_elements(input, token, |element| {
        let mut computed = Vec::new();
        for (name, tokens) in &compiled {
            if let Some(value) = get_path(&element, tokens) {
                computed.push(((*name).to_string(), value.clone()));
            }
        }
        match element {
            JsonValue::Object(mut object) => {
                for (name, value) in computed {
                    object.insert(name, value);
                }
                JsonValue::Object(object)
            }
            other => other,
        }
    })
}

/// Evaluate `path` per element and splice every matched array into one
/// output array. Elements whose path is missing or non-array contribute
/// nothing.
pub(crate) fn flat_map(path: &str, input: Vec<JsonValue>) -> Result<Vec<JsonValue>, PipelineError> {
    let tokens = parse_path(path)?;
    let mut output = Vec::new();
    for element in &input {
        if let Some(JsonValue::Array(items)) = get_path(element, &tokens) {
            output.extend(items.iter().cloned());
        }
    }
    Ok(output)
}

/// One level of flattening: array elements are spliced into the output,
/// everything else passes through as-is.
pub(crate) fn flatten(input: Vec<JsonValue>) -> Vec<JsonValue> {
    let mut output = Vec::new();
    for element in input {
        match element {
            JsonValue::Array(items) => output.extend(items),
            other => output.push(other),
        }
    }
    output
}

/// Join the stringified items of each array element with `delimiter`.
/// Non-array elements pass through unmodified.
pub(crate) fn concat(
    delimiter: &str,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    map_elements(input, token, |element| match &element {
        JsonValue::Array(items) => {
            let joined = items
                .iter()
                .map(stringify)
                .collect::<Vec<String>>()
                .join(delimiter);
            JsonValue::String(joined)
        }
        _ => element,
    })
}
