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

fn numbers(n: usize) -> Vec<JsonValue> {
    (0..n).map(|i| json!(i)).collect()
}

#[test]
fn seeded_shuffle_is_identical_across_runs() {
    let pipeline = r#"[{"operation": "shuffle", "seed": 42}]"#;
    let first = run_pipeline(pipeline, numbers(25));
    let second = run_pipeline(pipeline, numbers(25));
    assert_eq!(first, second);

    // Still a permutation of the input.
    let mut sorted = first;
    sorted.sort_by_key(|v| v.as_u64());
    assert_eq!(sorted, numbers(25));
}

#[test]
fn seeded_random_n_is_identical_across_runs() {
    let pipeline = r#"[{"operation": "randomN", "count": 3, "seed": 42}]"#;
    let first = run_pipeline(pipeline, numbers(25));
    let second = run_pipeline(pipeline, numbers(25));
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn random_n_draws_distinct_elements() {
    let output = run_pipeline(
        r#"[{"operation": "randomN", "count": 10, "seed": 7}]"#,
        numbers(10),
    );
    let mut sorted = output;
    sorted.sort_by_key(|v| v.as_u64());
    assert_eq!(sorted, numbers(10));
}

#[test]
fn random_n_count_beyond_length_returns_everything() {
    let output = run_pipeline(
        r#"[{"operation": "randomN", "count": 50, "seed": 7}]"#,
        numbers(4),
    );
    assert_eq!(output.len(), 4);
}

#[test]
fn random_one_returns_one_input_element() {
    let input = numbers(8);
    let output = run_pipeline(r#"[{"operation": "randomOne"}]"#, input.clone());
    assert_eq!(output.len(), 1);
    assert!(input.contains(&output[0]));
}

#[test]
fn seeded_random_one_is_stable() {
    let pipeline = r#"[{"operation": "randomOne", "seed": 9}]"#;
    assert_eq!(
        run_pipeline(pipeline, numbers(8)),
        run_pipeline(pipeline, numbers(8))
    );
}

#[test]
fn shuffle_of_single_element_is_identity() {
    let output = run_pipeline(r#"[{"operation": "shuffle"}]"#, vec![json!("only")]);
    assert_eq!(output, vec![json!("only")]);
}

#[test]
fn unseeded_operations_still_permute() {
    let mut output = run_pipeline(r#"[{"operation": "shuffle"}]"#, numbers(30));
    output.sort_by_key(|v| v.as_u64());
    assert_eq!(output, numbers(30));
}
