use pipemorph::{parse_pipeline_json, run};
use serde_json::{Value as JsonValue, json};

fn run_pipeline(pipeline: &str, input: Vec<JsonValue>) -> Vec<JsonValue> {
    let definition = parse_pipeline_json(&format!(
        r#"{{"version": "1.0", "pipeline": {}}}"#,
        pipeline
    ))
    .expect("definition should parse");
    run(&definition, input).expect("run should succeed")
}

#[test]
fn aggregate_collapses_to_one_row() {
    let output = run_pipeline(
        r#"[{"operation": "aggregate", "aggregations": {
            "total": {"field": "$.amt", "function": "sum"},
            "rows": {"function": "count"}
        }}]"#,
        vec![
            json!({"amt": 10}),
            json!({"amt": 20}),
            json!({"amt": "bad"}),
        ],
    );
    assert_eq!(output, vec![json!({"total": 30.0, "rows": 3})]);
}

#[test]
fn group_by_then_sort_by_gives_deterministic_rows() {
    // Group emission order is unordered by contract; sortBy pins it down.
    let output = run_pipeline(
        r#"[
            {"operation": "groupBy", "key": "$.cat", "aggregations": {
                "total": {"field": "$.amt", "function": "sum"}
            }},
            {"operation": "sortBy", "field": "$.key", "order": "asc"}
        ]"#,
        vec![
            json!({"cat": "a", "amt": 10}),
            json!({"cat": "a", "amt": 20}),
            json!({"cat": "b", "amt": 5}),
        ],
    );
    assert_eq!(
        output,
        vec![
            json!({"key": "a", "total": 30.0}),
            json!({"key": "b", "total": 5.0}),
        ]
    );
}

#[test]
fn group_by_excludes_elements_missing_the_key() {
    let output = run_pipeline(
        r#"[
            {"operation": "groupBy", "key": "$.cat", "aggregations": {
                "rows": {"function": "count"}
            }},
            {"operation": "sortBy", "field": "$.key", "order": "asc"}
        ]"#,
        vec![
            json!({"cat": "a"}),
            json!({"other": true}),
            json!({"cat": "a"}),
        ],
    );
    assert_eq!(output, vec![json!({"key": "a", "rows": 2})]);
}

#[test]
fn sort_by_is_stable() {
    let output = run_pipeline(
        r#"[{"operation": "sortBy", "field": "$.k", "order": "asc"}]"#,
        vec![json!({"k": 1, "id": "x"}), json!({"k": 1, "id": "y"})],
    );
    assert_eq!(
        output,
        vec![json!({"k": 1, "id": "x"}), json!({"k": 1, "id": "y"})]
    );
}

#[test]
fn join_left_vs_inner() {
    let input = vec![json!({"id": 1}), json!({"id": 2})];
    let output = run_pipeline(
        r#"[{"operation": "join", "leftKey": "$.id", "rightKey": "$.id",
             "rightData": [{"id": 1, "v": "A"}], "joinType": "left"}]"#,
        input.clone(),
    );
    assert_eq!(output, vec![json!({"id": 1, "v": "A"}), json!({"id": 2})]);

    let output = run_pipeline(
        r#"[{"operation": "join", "leftKey": "$.id", "rightKey": "$.id",
             "rightData": [{"id": 1, "v": "A"}], "joinType": "inner"}]"#,
        input,
    );
    assert_eq!(output, vec![json!({"id": 1, "v": "A"})]);
}

#[test]
fn join_merges_with_right_precedence() {
    let output = run_pipeline(
        r#"[{"operation": "join", "leftKey": "$.sku", "rightKey": "$.sku",
             "rightData": [{"sku": "x", "price": 9, "source": "right"}]}]"#,
        vec![json!({"sku": "x", "qty": 2, "source": "left"})],
    );
    assert_eq!(
        output,
        vec![json!({"sku": "x", "qty": 2, "source": "right", "price": 9})]
    );
}

#[test]
fn full_reporting_pipeline() {
    // filter -> groupBy -> sortBy -> limit, the common reporting shape.
    let output = run_pipeline(
        r#"[
            {"operation": "filter", "field": "$.amt", "operator": "gt", "value": 0},
            {"operation": "groupBy", "key": "$.cat", "aggregations": {
                "total": {"field": "$.amt", "function": "sum"},
                "avg": {"field": "$.amt", "function": "avg"}
            }},
            {"operation": "sortBy", "field": "$.total", "order": "desc"},
            {"operation": "limit", "count": 1}
        ]"#,
        vec![
            json!({"cat": "a", "amt": 10}),
            json!({"cat": "b", "amt": 50}),
            json!({"cat": "a", "amt": 30}),
            json!({"cat": "c", "amt": -1}),
        ],
    );
    assert_eq!(output, vec![json!({"key": "b", "total": 50.0, "avg": 50.0})]);
}
