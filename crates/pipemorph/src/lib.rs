mod aggregate;
mod cache;
mod error;
mod filter;
mod model;
mod numeric;
mod path;
mod pipeline;
mod random;
mod select;
mod strings;
mod validator;

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use error::{
    DefinitionError, ErrorCode, PipelineError, PipelineErrorKind, ValidationResult,
};
pub use model::{
    AggregateFunction, Aggregation, FilterOperator, JoinType, Operation, SortOrder,
    TransformPipelineDefinition,
};
pub use path::{PathError, PathToken, get_dot_path, get_path, parse_path};
pub use pipeline::{CancellationToken, run, run_with_token};
pub use validator::validate_pipeline;

use std::sync::{Mutex, OnceLock};

use cache::LruCache;

const DEFINITION_CACHE_CAPACITY: usize = 128;

fn definition_cache() -> &'static Mutex<LruCache<String, TransformPipelineDefinition>> {
    static DEFINITION_CACHE: OnceLock<Mutex<LruCache<String, TransformPipelineDefinition>>> =
        OnceLock::new();
    DEFINITION_CACHE.get_or_init(|| Mutex::new(LruCache::new(DEFINITION_CACHE_CAPACITY)))
}

fn cached_definition(source: &str) -> Option<TransformPipelineDefinition> {
    let mut cache = definition_cache()
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    cache.get_cloned(&source.to_string())
}

fn cache_definition(source: &str, definition: &TransformPipelineDefinition) {
    let mut cache = definition_cache()
        .lock()
        .unwrap_or_else(|err| err.into_inner());
    cache.insert(source.to_string(), definition.clone());
}

/// Parse a pipeline definition from its JSON transport form.
///
/// Unknown operation kinds and malformed required parameters are rejected
/// here, before any element is processed. Run [`validate_pipeline`] for the
/// checks serde cannot express (path syntax, parameter coherence).
pub fn parse_pipeline_json(json: &str) -> Result<TransformPipelineDefinition, serde_json::Error> {
    if let Some(definition) = cached_definition(json) {
        return Ok(definition);
    }
    let definition: TransformPipelineDefinition = serde_json::from_str(json)?;
    cache_definition(json, &definition);
    Ok(definition)
}

/// Parse a pipeline definition embedded in a YAML task-configuration
/// document. Same shape and rejection rules as [`parse_pipeline_json`].
pub fn parse_pipeline_yaml(yaml: &str) -> Result<TransformPipelineDefinition, serde_yaml::Error> {
    if let Some(definition) = cached_definition(yaml) {
        return Ok(definition);
    }
    let definition: TransformPipelineDefinition = serde_yaml::from_str(yaml)?;
    cache_definition(yaml, &definition);
    Ok(definition)
}
