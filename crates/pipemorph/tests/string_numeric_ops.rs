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
fn substring_bounds_are_clamped() {
    let output = run_pipeline(
        r#"[{"operation": "substring", "start": 5}]"#,
        vec![json!("hi")],
    );
    assert_eq!(output, vec![json!("")]);

    let output = run_pipeline(
        r#"[{"operation": "substring", "start": 1, "length": 10}]"#,
        vec![json!("hello")],
    );
    assert_eq!(output, vec![json!("ello")]);
}

#[test]
fn split_then_flatten_explodes_csv_fields() {
    let output = run_pipeline(
        r#"[
            {"operation": "split", "delimiter": ","},
            {"operation": "flatten"},
            {"operation": "trim"}
        ]"#,
        vec![json!("a, b"), json!("c")],
    );
    assert_eq!(output, vec![json!("a"), json!("b"), json!("c")]);
}

#[test]
fn case_and_replace_chain() {
    let output = run_pipeline(
        r#"[
            {"operation": "replace", "oldValue": "-", "newValue": " "},
            {"operation": "uppercase"}
        ]"#,
        vec![json!("unit-price"), json!(12)],
    );
    assert_eq!(output, vec![json!("UNIT PRICE"), json!(12)]);
}

#[test]
fn template_renders_per_element() {
    let output = run_pipeline(
        r#"[{"operation": "template", "template": "{name}: {stats.score} pts"}]"#,
        vec![
            json!({"name": "ada", "stats": {"score": 9}}),
            json!({"name": "bob"}),
        ],
    );
    assert_eq!(
        output,
        vec![json!("ada: 9 pts"), json!("bob: {stats.score} pts")]
    );
}

#[test]
fn numeric_chain_rounds_scaled_values() {
    let output = run_pipeline(
        r#"[
            {"operation": "scale", "factor": 1.21},
            {"operation": "round", "decimals": 1}
        ]"#,
        vec![json!(10), json!(3.3)],
    );
    assert_eq!(output, vec![json!(12.1), json!(4.0)]);
}

#[test]
fn clamp_then_percentage() {
    let output = run_pipeline(
        r#"[
            {"operation": "clamp", "min": 0.0, "max": 100.0},
            {"operation": "percentage", "total": 200.0}
        ]"#,
        vec![json!(-10), json!(50), json!(400)],
    );
    assert_eq!(output, vec![json!(0.0), json!(25.0), json!(50.0)]);
}

#[test]
fn type_guards_leave_mixed_arrays_intact() {
    let input = vec![json!("text"), json!(-3), json!(null), json!([1])];
    let output = run_pipeline(r#"[{"operation": "abs"}]"#, input.clone());
    assert_eq!(
        output,
        vec![json!("text"), json!(3.0), json!(null), json!([1])]
    );

    let output = run_pipeline(r#"[{"operation": "trim"}]"#, input.clone());
    assert_eq!(output, input);
}
