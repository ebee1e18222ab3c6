//! Row filter processor.
//!
//! Evaluates one boolean predicate against every row and keeps the rows it
//! matches. Any parse or evaluation failure — malformed expression,
//! unknown column, non-boolean result — is reported as an invalid-filter
//! error carrying the expression and the underlying cause.

use super::super::error::{PipelineError, PipelineResult};
use super::super::expression::{evaluate_predicate, parse_predicate};
use super::super::types::Dataset;

/// Processor for the filter stage
pub struct FilterProcessor;

impl FilterProcessor {
    /// Keep the rows matching `expression`, preserving input order
    pub fn process(dataset: &Dataset, expression: &str) -> PipelineResult<Dataset> {
        let predicate = parse_predicate(expression)
            .map_err(|e| PipelineError::filter_error(expression, e.to_string()))?;

        let mut rows = Vec::new();
        for row in &dataset.rows {
            let keep = evaluate_predicate(&predicate, row)
                .map_err(|e| PipelineError::filter_error(expression, e.to_string()))?;
            if keep {
                rows.push(row.clone());
            }
        }

        Ok(Dataset::new(dataset.columns.clone(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowflow::pipeline::types::FieldValue;
    use std::collections::HashMap;

    fn dataset() -> Dataset {
        let rows = [("/a", 10), ("/b", 3), ("/c", 25)]
            .iter()
            .map(|(page, clicks)| {
                let mut row = HashMap::new();
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
    fn test_filter_keeps_matching_rows_in_order() {
        let out = FilterProcessor::process(&dataset(), "clicks >= 10").unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(
            out.rows[0].get("page"),
            Some(&FieldValue::String("/a".to_string()))
        );
        assert_eq!(
            out.rows[1].get("page"),
            Some(&FieldValue::String("/c".to_string()))
        );
    }

    #[test]
    fn test_filter_malformed_expression() {
        let err = FilterProcessor::process(&dataset(), "clicks >").unwrap_err();
        match err {
            PipelineError::FilterError { expression, .. } => {
                assert_eq!(expression, "clicks >");
            }
            other => panic!("expected FilterError, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_unknown_column_reports_cause() {
        let err = FilterProcessor::process(&dataset(), "views > 1").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("views"), "{}", text);
    }
}
