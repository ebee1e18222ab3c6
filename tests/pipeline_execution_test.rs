/*!
End-to-end pipeline execution tests.

Covers the full orchestration path: validated spec in, transformed dataset
out, with the fixed stage order and fail-fast semantics.
*/

use rowflow::{Dataset, FieldValue, PipelineEngine, PipelineError, SpecValidator};
use serde_json::json;

fn clicks_dataset() -> Dataset {
    Dataset::from_json_rows(&json!([
        {"page": "/a", "clicks": 10},
        {"page": "/a", "clicks": 5},
        {"page": "/b", "clicks": 20}
    ]))
    .unwrap()
}

#[test]
fn test_group_sort_head_scenario() {
    let spec = SpecValidator::new()
        .validate_pipeline(&json!({
            "group_by": "page",
            "aggregate": "sum:clicks",
            "sort": "sum_clicks DESC",
            "head": 1
        }))
        .unwrap();

    let result = PipelineEngine::execute(&clicks_dataset(), &spec).unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result.columns, vec!["page", "sum_clicks"]);
    assert_eq!(
        result.rows[0].get("page"),
        Some(&FieldValue::String("/b".to_string()))
    );
    assert_eq!(
        result.rows[0].get("sum_clicks"),
        Some(&FieldValue::Integer(20))
    );
}

#[test]
fn test_all_six_stages_in_order() {
    let data = Dataset::from_json_rows(&json!([
        {"url": "https://x/a?utm=1", "day": "20260115", "clicks": 10},
        {"url": "https://x/a?utm=2", "day": "20260115", "clicks": 7},
        {"url": "https://x/b?utm=3", "day": "20260116", "clicks": 2},
        {"url": "https://x/c?utm=4", "day": "20260116", "clicks": 50}
    ]))
    .unwrap();

    let spec = SpecValidator::new()
        .validate_pipeline(&json!({
            "transform": "url:path_only,day:date_format",
            "where": "clicks > 2",
            "group_by": "url",
            "aggregate": "sum:clicks,count:clicks",
            "sort": "sum_clicks DESC",
            "columns": "url,sum_clicks",
            "head": 2
        }))
        .unwrap();

    let result = PipelineEngine::execute(&data, &spec).unwrap();

    assert_eq!(result.columns, vec!["url", "sum_clicks"]);
    assert_eq!(result.len(), 2);
    assert_eq!(
        result.rows[0].get("url"),
        Some(&FieldValue::String("/c".to_string()))
    );
    assert_eq!(
        result.rows[0].get("sum_clicks"),
        Some(&FieldValue::Integer(50))
    );
    assert_eq!(
        result.rows[1].get("url"),
        Some(&FieldValue::String("/a".to_string()))
    );
    assert_eq!(
        result.rows[1].get("sum_clicks"),
        Some(&FieldValue::Integer(17))
    );
}

#[test]
fn test_sort_stability_preserved_through_engine() {
    let data = Dataset::from_json_rows(&json!([
        {"k": 1, "v": "a"},
        {"k": 1, "v": "b"}
    ]))
    .unwrap();

    let spec = SpecValidator::new()
        .validate_pipeline(&json!({"sort": "k ASC"}))
        .unwrap();

    let result = PipelineEngine::execute(&data, &spec).unwrap();
    assert_eq!(
        result.rows[0].get("v"),
        Some(&FieldValue::String("a".to_string()))
    );
    assert_eq!(
        result.rows[1].get("v"),
        Some(&FieldValue::String("b".to_string()))
    );
}

#[test]
fn test_duplicate_aggregate_outputs_fail_at_execution() {
    let spec = SpecValidator::new()
        .validate_pipeline(&json!({
            "group_by": "page",
            "aggregate": "sum:clicks,sum:clicks"
        }))
        .unwrap();

    let err = PipelineEngine::execute(&clicks_dataset(), &spec).unwrap_err();
    match err {
        PipelineError::StageError { stage, message } => {
            assert_eq!(stage, "group");
            assert!(message.contains("sum_clicks"), "{}", message);
        }
        other => panic!("expected StageError, got {:?}", other),
    }
}

#[test]
fn test_failure_identifies_stage_and_cause() {
    let spec = SpecValidator::new()
        .validate_pipeline(&json!({
            "transform": "missing:url_decode",
            "head": 1
        }))
        .unwrap();

    let err = PipelineEngine::execute(&clicks_dataset(), &spec).unwrap_err();
    let text = err.to_string();
    assert!(text.contains("transform"), "{}", text);
    assert!(text.contains("missing"), "{}", text);
}

#[test]
fn test_input_reusable_after_run() {
    let data = clicks_dataset();
    let spec = SpecValidator::new()
        .validate_pipeline(&json!({"where": "clicks >= 10", "head": 1}))
        .unwrap();

    let first = PipelineEngine::execute(&data, &spec).unwrap();
    assert_eq!(first.len(), 1);
    // the caller's dataset is untouched and a second run is identical
    assert_eq!(data.len(), 3);
    let second = PipelineEngine::execute(&data, &spec).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_head_idempotent_on_own_output() {
    let data = clicks_dataset();
    let spec = SpecValidator::new()
        .validate_pipeline(&json!({"head": 2}))
        .unwrap();

    let once = PipelineEngine::execute(&data, &spec).unwrap();
    let twice = PipelineEngine::execute(&once, &spec).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_filter_contains_predicate() {
    let data = Dataset::from_json_rows(&json!([
        {"page": "/blog/a", "clicks": 1},
        {"page": "/docs/b", "clicks": 2}
    ]))
    .unwrap();

    let spec = SpecValidator::new()
        .validate_pipeline(&json!({"where": "contains(page, '/blog/')"}))
        .unwrap();

    let result = PipelineEngine::execute(&data, &spec).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(
        result.rows[0].get("page"),
        Some(&FieldValue::String("/blog/a".to_string()))
    );
}
