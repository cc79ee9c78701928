//! Aggregation, grouping, sorting, and joining.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};

use crate::error::{PipelineError, PipelineErrorKind};
use crate::model::{AggregateFunction, Aggregation, JoinType, SortOrder};
use crate::path::{PathToken, get_path, parse_path};

struct CompiledAggregation<'a> {
    name: &'a str,
    function: AggregateFunction,
    field: Option<Vec<PathToken>>,
}

fn compile_aggregations(
    aggregations: &IndexMap<String, Aggregation>,
) -> Result<Vec<CompiledAggregation<'_>>, PipelineError> {
    aggregations
        .iter()
        .map(|(name, aggregation)| {
            let field = match &aggregation.field {
                Some(path) => Some(parse_path(path)?),
                None => {
                    if aggregation.function != AggregateFunction::Count {
                        return Err(PipelineError::new(
                            PipelineErrorKind::InvalidOperation,
                            format!("aggregation {:?} requires a field", name),
                        ));
                    }
                    None
                }
            };
            Ok(CompiledAggregation {
                name: name.as_str(),
                function: aggregation.function,
                field,
            })
        })
        .collect()
}

fn number_from_f64(value: f64) -> JsonValue {
    serde_json::Number::from_f64(value)
        .map(JsonValue::Number)
        .unwrap_or(JsonValue::Null)
}

/// Evaluate every compiled aggregation over `elements` into one row.
///
/// Non-numeric and missing field values are excluded from the numeric set;
/// an empty numeric set evaluates to 0. `count` counts all elements
/// regardless of extractability.
fn evaluate_aggregations(
    compiled: &[CompiledAggregation<'_>],
    elements: &[JsonValue],
) -> Map<String, JsonValue> {
    let mut row = Map::new();
    for aggregation in compiled {
        let value = match aggregation.function {
            AggregateFunction::Count => JsonValue::from(elements.len()),
            function => {
                let tokens = aggregation.field.as_deref().unwrap_or(&[]);
                let numbers: Vec<f64> = elements
                    .iter()
                    .filter_map(|element| get_path(element, tokens))
                    .filter_map(JsonValue::as_f64)
                    .collect();
                let result = if numbers.is_empty() {
                    0.0
                } else {
                    match function {
                        AggregateFunction::Sum => numbers.iter().sum(),
                        AggregateFunction::Avg => {
                            numbers.iter().sum::<f64>() / numbers.len() as f64
                        }
                        AggregateFunction::Min => {
                            numbers.iter().copied().fold(f64::INFINITY, f64::min)
                        }
                        AggregateFunction::Max => {
                            numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max)
                        }
                        AggregateFunction::Count => unreachable!("handled above"),
                    }
                };
                number_from_f64(result)
            }
        };
        row.insert(aggregation.name.to_string(), value);
    }
    row
}

/// Collapse the whole input into one row, one field per aggregation.
pub(crate) fn aggregate(
    aggregations: &IndexMap<String, Aggregation>,
    input: Vec<JsonValue>,
) -> Result<Vec<JsonValue>, PipelineError> {
    let compiled = compile_aggregations(aggregations)?;
    Ok(vec![JsonValue::Object(evaluate_aggregations(
        &compiled, &input,
    ))])
}

/// Group elements by the serialized value at `key`, then aggregate each
/// group into one row `{key, ...aggregations}`.
///
/// Elements without the key are excluded from all groups. Group emission
/// order follows hash-map iteration and is not contractual; sort afterward
/// when determinism is needed.
pub(crate) fn group_by(
    key: &str,
    aggregations: &IndexMap<String, Aggregation>,
    input: Vec<JsonValue>,
) -> Result<Vec<JsonValue>, PipelineError> {
    let tokens = parse_path(key)?;
    let compiled = compile_aggregations(aggregations)?;

    let mut groups: HashMap<String, (JsonValue, Vec<JsonValue>)> = HashMap::new();
    for element in input {
        let Some(key_value) = get_path(&element, &tokens) else {
            continue;
        };
        let serialized = key_value.to_string();
        let key_value = key_value.clone();
        groups
            .entry(serialized)
            .or_insert_with(|| (key_value, Vec::new()))
            .1
            .push(element);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (_, (key_value, members)) in groups {
        let mut row = Map::new();
        row.insert("key".to_string(), key_value);
        row.extend(evaluate_aggregations(&compiled, &members));
        rows.push(JsonValue::Object(row));
    }
    Ok(rows)
}

enum SortKey {
    Number(f64),
    Text(String),
}

fn sort_key(element: &JsonValue, tokens: &[PathToken]) -> Option<SortKey> {
    match get_path(element, tokens)? {
        JsonValue::Number(n) => n.as_f64().map(SortKey::Number),
        JsonValue::String(s) => Some(SortKey::Text(s.clone())),
        _ => None,
    }
}

fn compare_keys(a: &Option<SortKey>, b: &Option<SortKey>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(SortKey::Number(a)), Some(SortKey::Number(b))) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        (Some(SortKey::Text(a)), Some(SortKey::Text(b))) => a.cmp(b),
        (Some(SortKey::Number(_)), Some(SortKey::Text(_))) => Ordering::Less,
        (Some(SortKey::Text(_)), Some(SortKey::Number(_))) => Ordering::Greater,
    }
}

/// Stable sort on a Number-or-String key; elements of any other kind get a
/// null key and sort lowest. Equal and null keys keep their original
/// relative order.
pub(crate) fn sort_by(
    field: &str,
    order: SortOrder,
    input: Vec<JsonValue>,
) -> Result<Vec<JsonValue>, PipelineError> {
    let tokens = parse_path(field)?;
    let mut decorated: Vec<(Option<SortKey>, JsonValue)> = input
        .into_iter()
        .map(|element| (sort_key(&element, &tokens), element))
        .collect();
    match order {
        SortOrder::Asc => decorated.sort_by(|a, b| compare_keys(&a.0, &b.0)),
        SortOrder::Desc => decorated.sort_by(|a, b| compare_keys(&b.0, &a.0)),
    }
    Ok(decorated.into_iter().map(|(_, element)| element).collect())
}

/// Hash join against `right_data`.
///
/// The lookup is keyed by the serialized `right_key` value (duplicate keys
/// resolve last-wins). On a hit the left and right object fields merge with
/// the right side overwriting name conflicts; on a miss, `inner` drops the
/// left element and `left` emits it unmodified.
pub(crate) fn join(
    left_key: &str,
    right_key: &str,
    right_data: &[JsonValue],
    join_type: JoinType,
    input: Vec<JsonValue>,
) -> Result<Vec<JsonValue>, PipelineError> {
    let left_tokens = parse_path(left_key)?;
    let right_tokens = parse_path(right_key)?;

    let mut lookup: HashMap<String, &JsonValue> = HashMap::new();
    for right in right_data {
        if let Some(key_value) = get_path(right, &right_tokens) {
            lookup.insert(key_value.to_string(), right);
        }
    }

    let mut output = Vec::with_capacity(input.len());
    for left in input {
        let matched = get_path(&left, &left_tokens)
            .map(|key_value| key_value.to_string())
            .and_then(|key| lookup.get(&key).copied());
        match matched {
            Some(right) => {
                let mut merged = match &left {
                    JsonValue::Object(object) => object.clone(),
                    // Only objects carry fields to merge.
                    _ => {
                        output.push(left);
                        continue;
                    }
                };
                if let JsonValue::Object(right_object) = right {
                    for (name, value) in right_object {
                        merged.insert(name.clone(), value.clone());
                    }
                }
                output.push(JsonValue::Object(merged));
            }
            None => {
                if join_type == JoinType::Left {
                    output.push(left);
                }
            }
        }
    }
    Ok(output)
}
