use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;

/// A versioned, ordered list of transform operations.
///
/// Definitions are immutable once constructed and safe to reuse across
/// concurrent runs with different input arrays.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct TransformPipelineDefinition {
    pub version: String,
    pub pipeline: Vec<Operation>,
}

fn default_concat_delimiter() -> String {
    ",".to_string()
}

/// The closed operation catalog.
///
/// Each variant carries only the fields relevant to that kind; the
/// `operation` discriminator selects the variant, and unknown discriminators
/// are rejected when the definition is deserialized.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "operation", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Operation {
    Select {
        fields: IndexMap<String, String>,
    },
    Map {
        mappings: IndexMap<String, String>,
    },
    Enrich {
        fields: IndexMap<String, String>,
    },
    FlatMap {
        path: String,
    },
    Flatten,
    Concat {
        #[serde(default = "default_concat_delimiter")]
        delimiter: String,
    },
    Filter {
        field: String,
        operator: FilterOperator,
        value: JsonValue,
    },
    First,
    Last,
    Nth {
        index: usize,
    },
    Limit {
        count: usize,
    },
    Skip {
        count: usize,
    },
    Unique,
    Chunk {
        size: i64,
    },
    Zip {
        with_array: Vec<JsonValue>,
    },
    Reverse,
    Aggregate {
        aggregations: IndexMap<String, Aggregation>,
    },
    GroupBy {
        key: String,
        #[serde(default)]
        aggregations: IndexMap<String, Aggregation>,
    },
    SortBy {
        field: String,
        #[serde(default)]
        order: SortOrder,
    },
    Join {
        left_key: String,
        right_key: String,
        right_data: Vec<JsonValue>,
        #[serde(default)]
        join_type: JoinType,
    },
    Substring {
        start: usize,
        #[serde(default)]
        length: Option<usize>,
    },
    Replace {
        old_value: String,
        new_value: String,
    },
    Split {
        delimiter: String,
    },
    Trim,
    Uppercase,
    Lowercase,
    Template {
        template: String,
    },
    Abs,
    Ceil,
    Floor,
    Round {
        decimals: i32,
    },
    Scale {
        factor: f64,
    },
    Clamp {
        min: f64,
        max: f64,
    },
    Percentage {
        total: f64,
    },
    Shuffle {
        #[serde(default)]
        seed: Option<u64>,
    },
    RandomOne {
        #[serde(default)]
        seed: Option<u64>,
    },
    RandomN {
        count: usize,
        #[serde(default)]
        seed: Option<u64>,
    },
}

impl Operation {
    /// Wire name of the operation, as it appears in the `operation` field.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Select { .. } => "select",
            Operation::Map { .. } => "map",
            Operation::Enrich { .. } => "enrich",
            Operation::FlatMap { .. } => "flatMap",
            Operation::Flatten => "flatten",
            Operation::Concat { .. } => "concat",
            Operation::Filter { .. } => "filter",
            Operation::First => "first",
            Operation::Last => "last",
            Operation::Nth { .. } => "nth",
            Operation::Limit { .. } => "limit",
            Operation::Skip { .. } => "skip",
            Operation::Unique => "unique",
            Operation::Chunk { .. } => "chunk",
            Operation::Zip { .. } => "zip",
            Operation::Reverse => "reverse",
            Operation::Aggregate { .. } => "aggregate",
            Operation::GroupBy { .. } => "groupBy",
            Operation::SortBy { .. } => "sortBy",
            Operation::Join { .. } => "join",
            Operation::Substring { .. } => "substring",
            Operation::Replace { .. } => "replace",
            Operation::Split { .. } => "split",
            Operation::Trim => "trim",
            Operation::Uppercase => "uppercase",
            Operation::Lowercase => "lowercase",
            Operation::Template { .. } => "template",
            Operation::Abs => "abs",
            Operation::Ceil => "ceil",
            Operation::Floor => "floor",
            Operation::Round { .. } => "round",
            Operation::Scale { .. } => "scale",
            Operation::Clamp { .. } => "clamp",
            Operation::Percentage { .. } => "percentage",
            Operation::Shuffle { .. } => "shuffle",
            Operation::RandomOne { .. } => "randomOne",
            Operation::RandomN { .. } => "randomN",
        }
    }
}

/// Comparison operator used by the filter operation.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum FilterOperator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl Default for SortOrder {
    fn default() -> Self {
        SortOrder::Asc
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum JoinType {
    Inner,
    Left,
}

impl Default for JoinType {
    fn default() -> Self {
        JoinType::Inner
    }
}

/// A named reduction over a field path across a set of elements.
///
/// `field` is required for every function except `count`, which counts
/// elements regardless of extractability.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Aggregation {
    #[serde(default)]
    pub field: Option<String>,
    pub function: AggregateFunction,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunction {
    Sum,
    Avg,
    Min,
    Max,
    Count,
}
