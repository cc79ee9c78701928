//! Construction-time validation of pipeline definitions.
//!
//! Everything caught here fails before any element is processed; data-time
//! issues (kind mismatches, unresolved paths) are deliberately not errors.

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value as JsonValue;

use crate::error::{DefinitionError, ErrorCode, ValidationResult};
use crate::model::{
    AggregateFunction, Aggregation, FilterOperator, Operation, TransformPipelineDefinition,
};
use crate::path::parse_path;
use crate::strings::PLACEHOLDER_PATTERN;

const SUPPORTED_VERSION: &str = "1.0";

struct ValidationCtx {
    errors: Vec<DefinitionError>,
}

impl ValidationCtx {
    fn new() -> Self {
        Self { errors: Vec::new() }
    }

    fn push(&mut self, code: ErrorCode, message: impl Into<String>, path: impl Into<String>) {
        self.errors
            .push(DefinitionError::new(code, message).with_path(path));
    }

    fn finish(self) -> ValidationResult {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// Validate a parsed definition, accumulating every defect found.
pub fn validate_pipeline(definition: &TransformPipelineDefinition) -> ValidationResult {
    let mut ctx = ValidationCtx::new();

    if definition.version != SUPPORTED_VERSION {
        ctx.push(
            ErrorCode::UnsupportedVersion,
            format!(
                "unsupported version {:?}, expected {:?}",
                definition.version, SUPPORTED_VERSION
            ),
            "version",
        );
    }

    for (index, operation) in definition.pipeline.iter().enumerate() {
        validate_operation(operation, index, &mut ctx);
    }

    ctx.finish()
}

fn validate_operation(operation: &Operation, index: usize, ctx: &mut ValidationCtx) {
    let base = format!("pipeline[{}]", index);
    match operation {
        Operation::Select { fields } | Operation::Enrich { fields } => {
            validate_field_paths(fields, &format!("{}.fields", base), ctx);
        }
        Operation::Map { mappings } => {
            validate_field_paths(mappings, &format!("{}.mappings", base), ctx);
        }
        Operation::FlatMap { path } => {
            validate_path(path, &format!("{}.path", base), ctx);
        }
        Operation::Filter {
            field,
            operator,
            value,
        } => {
            validate_path(field, &format!("{}.field", base), ctx);
            validate_filter_value(*operator, value, &base, ctx);
        }
        Operation::Aggregate { aggregations } => {
            validate_aggregations(aggregations, &format!("{}.aggregations", base), ctx);
        }
        Operation::GroupBy { key, aggregations } => {
            validate_path(key, &format!("{}.key", base), ctx);
            validate_aggregations(aggregations, &format!("{}.aggregations", base), ctx);
        }
        Operation::SortBy { field, .. } => {
            validate_path(field, &format!("{}.field", base), ctx);
        }
        Operation::Join {
            left_key,
            right_key,
            ..
        } => {
            validate_path(left_key, &format!("{}.leftKey", base), ctx);
            validate_path(right_key, &format!("{}.rightKey", base), ctx);
        }
        Operation::Split { delimiter } => {
            if delimiter.is_empty() {
                ctx.push(
                    ErrorCode::InvalidDelimiterLength,
                    "split delimiter must not be empty",
                    format!("{}.delimiter", base),
                );
            }
        }
        Operation::Template { template } => {
            validate_template(template, &format!("{}.template", base), ctx);
        }
        Operation::Clamp { min, max } => {
            if min > max {
                ctx.push(
                    ErrorCode::InvalidClampBounds,
                    format!("clamp min {} exceeds max {}", min, max),
                    base,
                );
            }
        }
        Operation::Percentage { total } => {
            if *total == 0.0 {
                ctx.push(
                    ErrorCode::InvalidPercentageTotal,
                    "percentage total must be non-zero",
                    format!("{}.total", base),
                );
            }
        }
        // The remaining operations have no statically checkable parameters.
        _ => {}
    }
}

fn validate_path(path: &str, location: &str, ctx: &mut ValidationCtx) {
    if let Err(err) = parse_path(path) {
        ctx.push(ErrorCode::InvalidPath, err.message, location);
    }
}

fn validate_field_paths(
    fields: &IndexMap<String, String>,
    location: &str,
    ctx: &mut ValidationCtx,
) {
    for (name, path) in fields {
        validate_path(path, &format!("{}.{}", location, name), ctx);
    }
}

fn validate_aggregations(
    aggregations: &IndexMap<String, Aggregation>,
    location: &str,
    ctx: &mut ValidationCtx,
) {
    for (name, aggregation) in aggregations {
        let agg_location = format!("{}.{}", location, name);
        match &aggregation.field {
            Some(path) => validate_path(path, &format!("{}.field", agg_location), ctx),
            None => {
                if aggregation.function != AggregateFunction::Count {
                    ctx.push(
                        ErrorCode::MissingAggregationField,
                        format!("aggregation {:?} requires a field", name),
                        agg_location,
                    );
                }
            }
        }
    }
}

fn validate_filter_value(
    operator: FilterOperator,
    value: &JsonValue,
    base: &str,
    ctx: &mut ValidationCtx,
) {
    let location = format!("{}.value", base);
    match operator {
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            if !value.is_string() {
                ctx.push(
                    ErrorCode::InvalidFilterValue,
                    "string operators require a string value",
                    location,
                );
            }
        }
        FilterOperator::Gt | FilterOperator::Gte | FilterOperator::Lt | FilterOperator::Lte => {
            if !value.is_number() && !value.is_string() {
                ctx.push(
                    ErrorCode::InvalidFilterValue,
                    "ordering operators require a number or string value",
                    location,
                );
            }
        }
        FilterOperator::Eq | FilterOperator::Ne => {}
    }
}

fn validate_template(template: &str, location: &str, ctx: &mut ValidationCtx) {
    let Ok(placeholder) = Regex::new(PLACEHOLDER_PATTERN) else {
        return;
    };
    for captures in placeholder.captures_iter(template) {
        let path = captures[1].trim();
        if path.is_empty() || path.split('.').any(str::is_empty) {
            ctx.push(
                ErrorCode::InvalidTemplatePlaceholder,
                format!("malformed placeholder {:?}", &captures[0]),
                location,
            );
        }
    }
}

#[cfg(test)]
mod validator_tests {
    use super::*;
    use serde_json::json;

    fn definition(pipeline: serde_json::Value) -> TransformPipelineDefinition {
        serde_json::from_value(json!({"version": "1.0", "pipeline": pipeline}))
            .expect("definition should deserialize")
    }

    fn codes(result: ValidationResult) -> Vec<&'static str> {
        match result {
            Ok(()) => Vec::new(),
            Err(errors) => errors.iter().map(|err| err.code.as_str()).collect(),
        }
    }

    #[test]
    fn valid_definition_passes() {
        let def = definition(json!([
            {"operation": "filter", "field": "$.status", "operator": "eq", "value": "active"},
            {"operation": "select", "fields": {"id": "$.id"}},
            {"operation": "groupBy", "key": "$.cat", "aggregations": {
                "total": {"field": "$.amt", "function": "sum"},
                "rows": {"function": "count"}
            }},
            {"operation": "template", "template": "{a.b} ok"}
        ]));
        assert_eq!(validate_pipeline(&def), Ok(()));
    }

    #[test]
    fn unsupported_version_is_reported() {
        let def: TransformPipelineDefinition =
            serde_json::from_value(json!({"version": "2.0", "pipeline": []}))
                .expect("definition should deserialize");
        assert_eq!(codes(validate_pipeline(&def)), vec!["UnsupportedVersion"]);
    }

    #[test]
    fn malformed_paths_are_reported_with_location() {
        let def = definition(json!([
            {"operation": "sortBy", "field": "$.a."},
            {"operation": "select", "fields": {"x": "a..b"}}
        ]));
        let errors = validate_pipeline(&def).expect_err("validation should fail");
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].code, ErrorCode::InvalidPath);
        assert_eq!(errors[0].path.as_deref(), Some("pipeline[0].field"));
        assert_eq!(errors[1].path.as_deref(), Some("pipeline[1].fields.x"));
    }

    #[test]
    fn missing_aggregation_field_is_reported() {
        let def = definition(json!([
            {"operation": "aggregate", "aggregations": {"total": {"function": "sum"}}}
        ]));
        assert_eq!(
            codes(validate_pipeline(&def)),
            vec!["MissingAggregationField"]
        );
    }

    #[test]
    fn filter_value_kind_is_checked() {
        let def = definition(json!([
            {"operation": "filter", "field": "$.v", "operator": "contains", "value": 5},
            {"operation": "filter", "field": "$.v", "operator": "gt", "value": true}
        ]));
        assert_eq!(
            codes(validate_pipeline(&def)),
            vec!["InvalidFilterValue", "InvalidFilterValue"]
        );
    }

    #[test]
    fn clamp_and_percentage_params_are_checked() {
        let def = definition(json!([
            {"operation": "clamp", "min": 10.0, "max": 1.0},
            {"operation": "percentage", "total": 0.0}
        ]));
        assert_eq!(
            codes(validate_pipeline(&def)),
            vec!["InvalidClampBounds", "InvalidPercentageTotal"]
        );
    }

    #[test]
    fn split_delimiter_must_be_non_empty() {
        let def = definition(json!([{"operation": "split", "delimiter": ""}]));
        assert_eq!(
            codes(validate_pipeline(&def)),
            vec!["InvalidDelimiterLength"]
        );
    }

    #[test]
    fn template_placeholders_are_checked() {
        let def = definition(json!([
            {"operation": "template", "template": "{a..b} and { }"}
        ]));
        assert_eq!(
            codes(validate_pipeline(&def)),
            vec![
                "InvalidTemplatePlaceholder",
                "InvalidTemplatePlaceholder"
            ]
        );
    }
}
