//! Pipeline orchestration.
//!
//! [`PipelineEngine::execute`] runs the stages whose fields are present in
//! the specification, in a fixed order:
//!
//! ```text
//! transform -> filter -> group/aggregate -> sort -> projection -> limit
//! ```
//!
//! Each stage receives the previous stage's output. The first failure
//! aborts the whole run with an error naming the stage; no partial dataset
//! is ever returned. Execution is pure: the input dataset is never
//! mutated, and running the same spec twice over the same input yields the
//! same result.

use log::debug;
use serde::{Deserialize, Serialize};

use super::error::{PipelineError, PipelineResult};
use super::parser::{
    parse_aggregate_expr, parse_column_list, parse_sort_expr, parse_transform_expr,
};
use super::processors::{
    FilterProcessor, GroupProcessor, LimitProcessor, OrderProcessor, ProjectProcessor,
    TransformProcessor,
};
use super::types::Dataset;

/// A validated pipeline specification.
///
/// All fields are optional; an absent field simply skips its stage.
/// `group_by` and `aggregate` are co-required — the validator enforces
/// this up front and the engine re-checks it defensively at run time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSpec {
    /// Transform expression: `column:function[:args](,segment)*`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,
    /// Row filter predicate
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_: Option<String>,
    /// Comma-separated group key columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<String>,
    /// Aggregate expression: `function:column(,function:column)*`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<String>,
    /// Sort expression: `column [ASC|DESC](, ...)*`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    /// Comma-separated projection column list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<String>,
    /// Row limit, must be >= 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<i64>,
}

impl PipelineSpec {
    /// True when no stage is configured
    pub fn is_empty(&self) -> bool {
        self.transform.is_none()
            && self.where_.is_none()
            && self.group_by.is_none()
            && self.aggregate.is_none()
            && self.sort.is_none()
            && self.columns.is_none()
            && self.head.is_none()
    }
}

/// The pipeline orchestrator
pub struct PipelineEngine;

impl PipelineEngine {
    /// Run `spec` over `dataset`, returning the transformed dataset
    pub fn execute(dataset: &Dataset, spec: &PipelineSpec) -> PipelineResult<Dataset> {
        let mut current = dataset.clone();

        if let Some(expr) = &spec.transform {
            current = run_stage("transform", || {
                let directives = parse_transform_expr(expr)?;
                TransformProcessor::process(&current, &directives)
            })?;
            debug!("transform stage: {} rows", current.len());
        }

        if let Some(expr) = &spec.where_ {
            current = run_stage("filter", || FilterProcessor::process(&current, expr))?;
            debug!("filter stage: {} rows", current.len());
        }

        match (&spec.group_by, &spec.aggregate) {
            (Some(group_expr), Some(agg_expr)) => {
                current = run_stage("group", || {
                    let group_by = parse_column_list(group_expr)?;
                    let aggregates = parse_aggregate_expr(agg_expr)?;
                    GroupProcessor::process(&current, &group_by, &aggregates)
                })?;
                debug!("group stage: {} groups", current.len());
            }
            (None, None) => {}
            _ => {
                return Err(PipelineError::StageError {
                    stage: "group".to_string(),
                    message: "group_by and aggregate must be given together".to_string(),
                });
            }
        }

        if let Some(expr) = &spec.sort {
            current = run_stage("sort", || {
                let directives = parse_sort_expr(expr)?;
                OrderProcessor::process(&current, &directives)
            })?;
        }

        if let Some(expr) = &spec.columns {
            current = run_stage("project", || {
                let columns = parse_column_list(expr)?;
                ProjectProcessor::process(&current, &columns)
            })?;
        }

        if let Some(n) = spec.head {
            current = run_stage("limit", || LimitProcessor::process(&current, n))?;
        }

        Ok(current)
    }
}

fn run_stage(
    stage: &str,
    f: impl FnOnce() -> PipelineResult<Dataset>,
) -> PipelineResult<Dataset> {
    f().map_err(|e| PipelineError::stage_error(stage, &e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowflow::pipeline::types::{FieldValue, Row};

    fn dataset() -> Dataset {
        let rows = [("/a", 10), ("/a", 5), ("/b", 20)]
            .iter()
            .map(|(page, clicks)| {
                let mut row = Row::new();
                row.insert(
                    "page".to_string(),
                    FieldValue::String((*page).to_string()),
                );
                row.insert("clicks".to_string(), FieldValue::Integer(*clicks));
                row
            })
            .collect();
        Dataset::new(vec!["page".to_string(), "clicks".to_string()], rows)
    }

    #[test]
    fn test_end_to_end_group_sort_head() {
        let spec = PipelineSpec {
            group_by: Some("page".to_string()),
            aggregate: Some("sum:clicks".to_string()),
            sort: Some("sum_clicks DESC".to_string()),
            head: Some(1),
            ..Default::default()
        };

        let out = PipelineEngine::execute(&dataset(), &spec).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out.rows[0].get("page"),
            Some(&FieldValue::String("/b".to_string()))
        );
        assert_eq!(out.rows[0].get("sum_clicks"), Some(&FieldValue::Integer(20)));
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let ds = dataset();
        let out = PipelineEngine::execute(&ds, &PipelineSpec::default()).unwrap();
        assert_eq!(out, ds);
    }

    #[test]
    fn test_error_names_failing_stage() {
        let spec = PipelineSpec {
            sort: Some("missing ASC".to_string()),
            ..Default::default()
        };
        let err = PipelineEngine::execute(&dataset(), &spec).unwrap_err();
        match err {
            PipelineError::StageError { stage, .. } => assert_eq!(stage, "sort"),
            other => panic!("expected StageError, got {:?}", other),
        }
    }

    #[test]
    fn test_group_without_aggregate_rejected() {
        let spec = PipelineSpec {
            group_by: Some("page".to_string()),
            ..Default::default()
        };
        assert!(PipelineEngine::execute(&dataset(), &spec).is_err());
    }

    #[test]
    fn test_execution_is_repeatable_and_non_mutating() {
        let ds = dataset();
        let spec = PipelineSpec {
            where_: Some("clicks > 5".to_string()),
            sort: Some("clicks DESC".to_string()),
            ..Default::default()
        };
        let first = PipelineEngine::execute(&ds, &spec).unwrap();
        let second = PipelineEngine::execute(&ds, &spec).unwrap();
        assert_eq!(first, second);
        assert_eq!(ds.len(), 3);
    }
}
