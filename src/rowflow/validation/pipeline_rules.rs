//! Pipeline specification grammar.
//!
//! Checks a raw, untyped specification object against the pipeline grammar
//! and produces either a normalized [`PipelineSpec`] or the complete list
//! of violations. Fields are checked in grammar order so the error list is
//! deterministic.

use serde_json::Value;

use super::result_types::{json_type_name, ErrorCode, ValidationError};
use crate::rowflow::pipeline::PipelineSpec;

/// The exact set of keys the pipeline grammar allows
pub const PIPELINE_KEYS: &[&str] = &[
    "transform",
    "where",
    "group_by",
    "aggregate",
    "sort",
    "columns",
    "head",
];

const STRING_KEYS: &[&str] = &[
    "transform",
    "where",
    "group_by",
    "aggregate",
    "sort",
    "columns",
];

/// Validate a raw pipeline object, accumulating every violation
pub fn validate_pipeline(raw: &Value) -> Result<PipelineSpec, Vec<ValidationError>> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(vec![ValidationError::new(
                ErrorCode::InvalidType,
                "$.pipeline",
                format!("pipeline must be an object, got {}", json_type_name(raw)),
            )]);
        }
    };

    let mut errors = Vec::new();

    // String-typed stage fields, in grammar order.
    for &key in STRING_KEYS {
        if let Some(value) = obj.get(key) {
            if !value.is_string() {
                errors.push(ValidationError::new(
                    ErrorCode::InvalidType,
                    format!("$.pipeline.{}", key),
                    format!("'{}' must be a string, got {}", key, json_type_name(value)),
                ));
            }
        }
    }

    if let Some(value) = obj.get("head") {
        match value {
            // serde_json booleans are not numbers, but spell the rule out:
            // a boolean head is a type error, not 0/1.
            Value::Bool(_) => errors.push(
                ValidationError::new(
                    ErrorCode::InvalidType,
                    "$.pipeline.head",
                    "'head' must be an integer, got boolean",
                )
                .with_hint("use a row count such as 10"),
            ),
            Value::Number(n) => match n.as_i64() {
                Some(head) if head >= 1 => {}
                Some(head) => errors.push(
                    ValidationError::new(
                        ErrorCode::OutOfRange,
                        "$.pipeline.head",
                        format!("'head' must be >= 1, got {}", head),
                    )
                    .with_hint("use a positive row count"),
                ),
                None => errors.push(ValidationError::new(
                    ErrorCode::InvalidType,
                    "$.pipeline.head",
                    format!("'head' must be an integer, got {}", n),
                )),
            },
            other => errors.push(ValidationError::new(
                ErrorCode::InvalidType,
                "$.pipeline.head",
                format!("'head' must be an integer, got {}", json_type_name(other)),
            )),
        }
    }

    // group_by and aggregate only make sense together.
    let has_group = obj.contains_key("group_by");
    let has_aggregate = obj.contains_key("aggregate");
    if has_group != has_aggregate {
        let (present, missing) = if has_group {
            ("group_by", "aggregate")
        } else {
            ("aggregate", "group_by")
        };
        errors.push(
            ValidationError::new(
                ErrorCode::InvalidPipeline,
                "$.pipeline",
                format!("'{}' given without '{}'", present, missing),
            )
            .with_hint(format!("provide '{}' as well, or drop '{}'", missing, present)),
        );
    }

    // Unknown keys last, deterministically ordered.
    for key in obj.keys() {
        if !PIPELINE_KEYS.contains(&key.as_str()) {
            errors.push(
                ValidationError::new(
                    ErrorCode::UnknownField,
                    format!("$.pipeline.{}", key),
                    format!("unknown pipeline field '{}'", key),
                )
                .with_hint(format!("allowed fields: {}", PIPELINE_KEYS.join(", "))),
            );
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    let string_field = |key: &str| {
        obj.get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    Ok(PipelineSpec {
        transform: string_field("transform"),
        where_: string_field("where"),
        group_by: string_field("group_by"),
        aggregate: string_field("aggregate"),
        sort: string_field("sort"),
        columns: string_field("columns"),
        head: obj.get("head").and_then(Value::as_i64),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_pipeline_normalizes() {
        let raw = json!({
            "group_by": "page",
            "aggregate": "sum:clicks",
            "sort": "sum_clicks DESC",
            "head": 5
        });
        let spec = validate_pipeline(&raw).unwrap();
        assert_eq!(spec.group_by.as_deref(), Some("page"));
        assert_eq!(spec.head, Some(5));
        assert!(spec.transform.is_none());
    }

    #[test]
    fn test_group_by_without_aggregate() {
        let raw = json!({"group_by": "page"});
        let errors = validate_pipeline(&raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::InvalidPipeline);
    }

    #[test]
    fn test_aggregate_without_group_by() {
        let raw = json!({"aggregate": "sum:clicks"});
        let errors = validate_pipeline(&raw).unwrap_err();
        assert_eq!(errors[0].code, ErrorCode::InvalidPipeline);
    }

    #[test]
    fn test_head_boolean_rejected() {
        let raw = json!({"head": true});
        let errors = validate_pipeline(&raw).unwrap_err();
        assert_eq!(errors[0].code, ErrorCode::InvalidType);
        assert_eq!(errors[0].path, "$.pipeline.head");
    }

    #[test]
    fn test_head_zero_out_of_range() {
        let raw = json!({"head": 0});
        let errors = validate_pipeline(&raw).unwrap_err();
        assert_eq!(errors[0].code, ErrorCode::OutOfRange);
    }

    #[test]
    fn test_errors_accumulate() {
        let raw = json!({
            "transform": 3,
            "head": -1,
            "group_by": "page",
            "banana": "x"
        });
        let errors = validate_pipeline(&raw).unwrap_err();
        let codes: Vec<_> = errors.iter().map(|e| e.code).collect();
        assert!(codes.contains(&ErrorCode::InvalidType));
        assert!(codes.contains(&ErrorCode::OutOfRange));
        assert!(codes.contains(&ErrorCode::InvalidPipeline));
        assert!(codes.contains(&ErrorCode::UnknownField));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_non_object_input() {
        let errors = validate_pipeline(&json!("nope")).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, "$.pipeline");
    }

    #[test]
    fn test_empty_object_is_valid_noop_pipeline() {
        let spec = validate_pipeline(&json!({})).unwrap();
        assert!(spec.is_empty());
    }
}
