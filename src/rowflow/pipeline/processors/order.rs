//! Sort processor.
//!
//! Orders rows by one or more sort keys with per-key direction. The sort
//! is stable: rows that compare equal on every key keep their relative
//! input order. Null sorts smallest; integers and floats compare
//! numerically across variants.

use std::cmp::Ordering;

use super::super::directive::{SortDirection, SortDirective};
use super::super::error::{PipelineError, PipelineResult};
use super::super::types::{Dataset, FieldValue, Row};

/// Processor for the sort stage
pub struct OrderProcessor;

impl OrderProcessor {
    /// Sort rows according to `directives`, primary key first
    pub fn process(dataset: &Dataset, directives: &[SortDirective]) -> PipelineResult<Dataset> {
        for directive in directives {
            if !dataset.has_column(&directive.column) {
                return Err(PipelineError::schema_error(
                    "unknown sort column",
                    Some(directive.column.clone()),
                ));
            }
        }

        let mut rows = dataset.rows.clone();
        // Vec::sort_by is stable, which is exactly the contract here.
        rows.sort_by(|a, b| compare_rows(a, b, directives).unwrap_or(Ordering::Equal));

        Ok(Dataset::new(dataset.columns.clone(), rows))
    }
}

fn compare_rows(
    left: &Row,
    right: &Row,
    directives: &[SortDirective],
) -> PipelineResult<Ordering> {
    for directive in directives {
        let lhs = left.get(&directive.column).unwrap_or(&FieldValue::Null);
        let rhs = right.get(&directive.column).unwrap_or(&FieldValue::Null);

        let ordering = lhs.compare(rhs)?;
        if ordering != Ordering::Equal {
            return Ok(match directive.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            });
        }
    }
    Ok(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowflow::pipeline::parser::parse_sort_expr;

    fn row(k: i64, v: &str) -> Row {
        let mut row = Row::new();
        row.insert("k".to_string(), FieldValue::Integer(k));
        row.insert("v".to_string(), FieldValue::String(v.to_string()));
        row
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::new(vec!["k".to_string(), "v".to_string()], rows)
    }

    #[test]
    fn test_sort_asc_desc() {
        let ds = dataset(vec![row(2, "b"), row(1, "a"), row(3, "c")]);
        let out =
            OrderProcessor::process(&ds, &parse_sort_expr("k DESC").unwrap()).unwrap();
        let keys: Vec<_> = out
            .rows
            .iter()
            .map(|r| r.get("k").unwrap().clone())
            .collect();
        assert_eq!(
            keys,
            vec![
                FieldValue::Integer(3),
                FieldValue::Integer(2),
                FieldValue::Integer(1)
            ]
        );
    }

    #[test]
    fn test_sort_is_stable() {
        let ds = dataset(vec![row(1, "a"), row(1, "b")]);
        let out = OrderProcessor::process(&ds, &parse_sort_expr("k ASC").unwrap()).unwrap();
        assert_eq!(
            out.rows[0].get("v"),
            Some(&FieldValue::String("a".to_string()))
        );
        assert_eq!(
            out.rows[1].get("v"),
            Some(&FieldValue::String("b".to_string()))
        );
    }

    #[test]
    fn test_sort_multi_key() {
        let ds = dataset(vec![row(1, "z"), row(2, "a"), row(1, "a")]);
        let out =
            OrderProcessor::process(&ds, &parse_sort_expr("k ASC, v DESC").unwrap()).unwrap();
        assert_eq!(
            out.rows[0].get("v"),
            Some(&FieldValue::String("z".to_string()))
        );
        assert_eq!(
            out.rows[1].get("v"),
            Some(&FieldValue::String("a".to_string()))
        );
        assert_eq!(out.rows[2].get("k"), Some(&FieldValue::Integer(2)));
    }

    #[test]
    fn test_sort_nulls_smallest() {
        let mut null_row = Row::new();
        null_row.insert("k".to_string(), FieldValue::Null);
        null_row.insert("v".to_string(), FieldValue::String("n".to_string()));
        let ds = dataset(vec![row(1, "a"), null_row]);

        let out = OrderProcessor::process(&ds, &parse_sort_expr("k").unwrap()).unwrap();
        assert_eq!(out.rows[0].get("k"), Some(&FieldValue::Null));
    }

    #[test]
    fn test_sort_unknown_column() {
        let ds = dataset(vec![row(1, "a")]);
        let err = OrderProcessor::process(&ds, &parse_sort_expr("missing").unwrap())
            .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaError { .. }));
    }
}
