//! Pipeline runner.
//!
//! Operations execute strictly in declaration order; the output of stage
//! *i* is the exact input of stage *i+1*. No reordering or fusion: later
//! stages may depend on the complete result of earlier ones, and pipelines
//! must behave identically across runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::Value as JsonValue;
use tracing::debug;

use crate::error::{PipelineError, PipelineErrorKind};
use crate::model::{Operation, TransformPipelineDefinition};
use crate::{aggregate, filter, numeric, random, select, strings};

/// Cooperative cancellation signal for a pipeline run.
///
/// Checked at every stage boundary and periodically inside elementwise
/// loops. Cancellation yields a [`PipelineErrorKind::Cancelled`] error,
/// never a truncated output array.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// How often elementwise loops poll the cancellation token.
pub(crate) const CANCEL_CHECK_INTERVAL: usize = 1024;

/// Apply `f` to every element, polling the token between batches.
pub(crate) fn map_elements<F>(
    input: Vec<JsonValue>,
    token: &CancellationToken,
    mut f: F,
) -> Result<Vec<JsonValue>, PipelineError>
where
    F: FnMut(JsonValue) -> JsonValue,
{
    let mut output = Vec::with_capacity(input.len());
    for (index, element) in input.into_iter().enumerate() {
        if index % CANCEL_CHECK_INTERVAL == 0 && token.is_cancelled() {
            return Err(PipelineError::cancelled());
        }
        output.push(f(element));
    }
    Ok(output)
}

/// Run a pipeline to completion.
pub fn run(
    definition: &TransformPipelineDefinition,
    input: Vec<JsonValue>,
) -> Result<Vec<JsonValue>, PipelineError> {
    run_with_token(definition, input, &CancellationToken::new())
}

/// Run a pipeline with a caller-owned cancellation token.
///
/// The run owns one default random generator; randomized operations without
/// an explicit seed draw from it, so unseeded randomness is scoped to the
/// invocation rather than hidden process-wide state.
pub fn run_with_token(
    definition: &TransformPipelineDefinition,
    input: Vec<JsonValue>,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    let mut default_rng = StdRng::from_entropy();
    let mut data = input;

    for (stage, operation) in definition.pipeline.iter().enumerate() {
        if token.is_cancelled() {
            return Err(PipelineError::cancelled().with_stage(stage));
        }
        let input_len = data.len();
        data = execute_operation(operation, data, &mut default_rng, token)
            .map_err(|err| err.with_stage(stage))?;
        debug!(
            stage,
            operation = operation.name(),
            input_len,
            output_len = data.len(),
            "stage complete"
        );
    }

    Ok(data)
}

fn execute_operation(
    operation: &Operation,
    input: Vec<JsonValue>,
    default_rng: &mut StdRng,
    token: &CancellationToken,
) -> Result<Vec<JsonValue>, PipelineError> {
    match operation {
        Operation::Select { fields } => select::project(fields, input, token),
        Operation::Map { mappings } => select::project(mappings, input, token),
        Operation::Enrich { fields } => select::enrich(fields, input, token),
        Operation::FlatMap { path } => select::flat_map(path, input),
        Operation::Flatten => Ok(select::flatten(input)),
        Operation::Concat { delimiter } => select::concat(delimiter, input, token),
        Operation::Filter {
            field,
            operator,
            value,
        } => filter::filter(field, *operator, value, input),
        Operation::First => Ok(filter::first(input)),
        Operation::Last => Ok(filter::last(input)),
        Operation::Nth { index } => Ok(filter::nth(*index, input)),
        Operation::Limit { count } => Ok(filter::limit(*count, input)),
        Operation::Skip { count } => Ok(filter::skip(*count, input)),
        Operation::Unique => Ok(filter::unique(input)),
        Operation::Chunk { size } => Ok(filter::chunk(*size, input)),
        Operation::Zip { with_array } => Ok(filter::zip(with_array, input)),
        Operation::Reverse => Ok(filter::reverse(input)),
        Operation::Aggregate { aggregations } => aggregate::aggregate(aggregations, input),
        Operation::GroupBy { key, aggregations } => {
            aggregate::group_by(key, aggregations, input)
        }
        Operation::SortBy { field, order } => aggregate::sort_by(field, *order, input),
        Operation::Join {
            left_key,
            right_key,
            right_data,
            join_type,
        } => aggregate::join(left_key, right_key, right_data, *join_type, input),
        Operation::Substring { start, length } => {
            strings::substring(*start, *length, input, token)
        }
        Operation::Replace {
            old_value,
            new_value,
        } => strings::replace(old_value, new_value, input, token),
        Operation::Split { delimiter } => strings::split(delimiter, input, token),
        Operation::Trim => strings::trim(input, token),
        Operation::Uppercase => strings::uppercase(input, token),
        Operation::Lowercase => strings::lowercase(input, token),
        Operation::Template { template } => strings::template(template, input, token),
        Operation::Abs => numeric::abs(input, token),
        Operation::Ceil => numeric::ceil(input, token),
        Operation::Floor => numeric::floor(input, token),
        Operation::Round { decimals } => numeric::round(*decimals, input, token),
        Operation::Scale { factor } => numeric::scale(*factor, input, token),
        Operation::Clamp { min, max } => numeric::clamp(*min, *max, input, token),
        Operation::Percentage { total } => numeric::percentage(*total, input, token),
        Operation::Shuffle { seed } => Ok(random::shuffle(*seed, input, default_rng)),
        Operation::RandomOne { seed } => Ok(random::random_one(*seed, input, default_rng)),
        Operation::RandomN { count, seed } => {
            Ok(random::random_n(*count, *seed, input, default_rng))
        }
    }
}
