//! Group/aggregate processor.
//!
//! Collapses rows into one output row per distinct group-key combination.
//! Output columns are the group keys followed by the aggregate outputs in
//! directive order; groups appear in first-seen input order so repeated
//! runs are deterministic.
//!
//! Null handling follows SQL conventions: a null group-key value forms its
//! own group (rows are never silently dropped), and aggregates ignore null
//! inputs — `count` counts non-null values of its source column.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};

use super::super::directive::{AggregateDirective, AggregateFn};
use super::super::error::{PipelineError, PipelineResult};
use super::super::types::{Dataset, FieldValue, Row};

/// One group's key values, hashable so groups can be bucketed.
///
/// Equality and hashing delegate to the field values (floats by bit
/// pattern, null by discriminant).
#[derive(Debug, Clone)]
struct GroupKey {
    values: Vec<FieldValue>,
}

impl GroupKey {
    fn new(values: Vec<FieldValue>) -> Self {
        GroupKey { values }
    }
}

impl PartialEq for GroupKey {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
    }
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.values {
            value.hash(state);
        }
    }
}

/// Processor for the group/aggregate stage
pub struct GroupProcessor;

impl GroupProcessor {
    /// Group `dataset` by `group_by` and compute `aggregates` per group
    pub fn process(
        dataset: &Dataset,
        group_by: &[String],
        aggregates: &[AggregateDirective],
    ) -> PipelineResult<Dataset> {
        for column in group_by {
            if !dataset.has_column(column) {
                return Err(PipelineError::schema_error(
                    "unknown group_by column",
                    Some(column.clone()),
                ));
            }
        }
        for directive in aggregates {
            if !dataset.has_column(&directive.column) {
                return Err(PipelineError::schema_error(
                    format!(
                        "unknown source column in aggregate '{}:{}'",
                        directive.function, directive.column
                    ),
                    Some(directive.column.clone()),
                ));
            }
        }

        // Duplicate named outputs would silently overwrite each other;
        // reject them before any computation.
        let mut outputs = HashSet::new();
        for directive in aggregates {
            let name = directive.output_column();
            if !outputs.insert(name.clone()) {
                return Err(PipelineError::schema_error(
                    "duplicate aggregate output column",
                    Some(name),
                ));
            }
        }

        let mut order: Vec<GroupKey> = Vec::new();
        let mut buckets: HashMap<GroupKey, Vec<usize>> = HashMap::new();

        for (index, row) in dataset.rows.iter().enumerate() {
            let key = GroupKey::new(
                group_by
                    .iter()
                    .map(|c| row.get(c).cloned().unwrap_or(FieldValue::Null))
                    .collect(),
            );
            match buckets.get_mut(&key) {
                Some(members) => members.push(index),
                None => {
                    order.push(key.clone());
                    buckets.insert(key, vec![index]);
                }
            }
        }

        let mut rows = Vec::with_capacity(order.len());
        for key in &order {
            let members = &buckets[key];
            let mut out = Row::with_capacity(group_by.len() + aggregates.len());
            for (column, value) in group_by.iter().zip(&key.values) {
                out.insert(column.clone(), value.clone());
            }
            for directive in aggregates {
                let value = compute_aggregate(directive, members, &dataset.rows)?;
                out.insert(directive.output_column(), value);
            }
            rows.push(out);
        }

        let mut columns: Vec<String> = group_by.to_vec();
        columns.extend(aggregates.iter().map(AggregateDirective::output_column));

        Ok(Dataset::new(columns, rows))
    }
}

fn compute_aggregate(
    directive: &AggregateDirective,
    members: &[usize],
    rows: &[Row],
) -> PipelineResult<FieldValue> {
    let values = members
        .iter()
        .filter_map(|&i| rows[i].get(&directive.column))
        .filter(|v| !v.is_null());

    match directive.function {
        AggregateFn::Count => Ok(FieldValue::Integer(values.count() as i64)),

        AggregateFn::Sum => {
            // Integer inputs keep an integer sum; any float input widens
            // the whole result.
            let mut int_sum: i64 = 0;
            let mut float_sum: f64 = 0.0;
            let mut all_integer = true;
            for value in values {
                match value {
                    FieldValue::Integer(i) => {
                        int_sum += i;
                        float_sum += *i as f64;
                    }
                    FieldValue::Float(f) => {
                        all_integer = false;
                        float_sum += f;
                    }
                    other => return Err(numeric_error(directive, other)),
                }
            }
            if all_integer {
                Ok(FieldValue::Integer(int_sum))
            } else {
                Ok(FieldValue::Float(float_sum))
            }
        }

        AggregateFn::Mean => {
            let mut sum = 0.0;
            let mut count = 0usize;
            for value in values {
                sum += value
                    .as_f64()
                    .ok_or_else(|| numeric_error(directive, value))?;
                count += 1;
            }
            if count == 0 {
                Ok(FieldValue::Null)
            } else {
                Ok(FieldValue::Float(sum / count as f64))
            }
        }

        AggregateFn::Median => {
            let mut numbers = Vec::new();
            for value in values {
                numbers.push(
                    value
                        .as_f64()
                        .ok_or_else(|| numeric_error(directive, value))?,
                );
            }
            if numbers.is_empty() {
                return Ok(FieldValue::Null);
            }
            numbers.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = numbers.len() / 2;
            let median = if numbers.len() % 2 == 1 {
                numbers[mid]
            } else {
                (numbers[mid - 1] + numbers[mid]) / 2.0
            };
            Ok(FieldValue::Float(median))
        }

        AggregateFn::Min | AggregateFn::Max => {
            let mut best: Option<FieldValue> = None;
            for value in values {
                best = Some(match best {
                    None => value.clone(),
                    Some(current) => {
                        let ordering = value.compare(&current)?;
                        let replace = match directive.function {
                            AggregateFn::Min => ordering == std::cmp::Ordering::Less,
                            _ => ordering == std::cmp::Ordering::Greater,
                        };
                        if replace {
                            value.clone()
                        } else {
                            current
                        }
                    }
                });
            }
            Ok(best.unwrap_or(FieldValue::Null))
        }
    }
}

fn numeric_error(directive: &AggregateDirective, value: &FieldValue) -> PipelineError {
    PipelineError::schema_error(
        format!(
            "aggregate '{}' requires numeric values, got {} '{}'",
            directive.output_column(),
            value.type_name(),
            value
        ),
        Some(directive.column.clone()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowflow::pipeline::parser::parse_aggregate_expr;

    fn row(page: Option<&str>, clicks: Option<i64>) -> Row {
        let mut row = Row::new();
        row.insert(
            "page".to_string(),
            page.map(|p| FieldValue::String(p.to_string()))
                .unwrap_or(FieldValue::Null),
        );
        row.insert(
            "clicks".to_string(),
            clicks.map(FieldValue::Integer).unwrap_or(FieldValue::Null),
        );
        row
    }

    fn dataset(rows: Vec<Row>) -> Dataset {
        Dataset::new(vec!["page".to_string(), "clicks".to_string()], rows)
    }

    #[test]
    fn test_group_sum_first_seen_order() {
        let ds = dataset(vec![
            row(Some("/a"), Some(10)),
            row(Some("/b"), Some(20)),
            row(Some("/a"), Some(5)),
        ]);
        let aggregates = parse_aggregate_expr("sum:clicks").unwrap();
        let out = GroupProcessor::process(&ds, &["page".to_string()], &aggregates).unwrap();

        assert_eq!(out.columns, vec!["page", "sum_clicks"]);
        assert_eq!(out.len(), 2);
        assert_eq!(
            out.rows[0].get("page"),
            Some(&FieldValue::String("/a".to_string()))
        );
        assert_eq!(out.rows[0].get("sum_clicks"), Some(&FieldValue::Integer(15)));
        assert_eq!(out.rows[1].get("sum_clicks"), Some(&FieldValue::Integer(20)));
    }

    #[test]
    fn test_null_key_forms_own_group() {
        let ds = dataset(vec![
            row(Some("/a"), Some(1)),
            row(None, Some(2)),
            row(None, Some(3)),
        ]);
        let aggregates = parse_aggregate_expr("count:clicks").unwrap();
        let out = GroupProcessor::process(&ds, &["page".to_string()], &aggregates).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[1].get("page"), Some(&FieldValue::Null));
        assert_eq!(
            out.rows[1].get("count_clicks"),
            Some(&FieldValue::Integer(2))
        );
    }

    #[test]
    fn test_count_skips_nulls() {
        let ds = dataset(vec![row(Some("/a"), Some(1)), row(Some("/a"), None)]);
        let aggregates = parse_aggregate_expr("count:clicks").unwrap();
        let out = GroupProcessor::process(&ds, &["page".to_string()], &aggregates).unwrap();
        assert_eq!(
            out.rows[0].get("count_clicks"),
            Some(&FieldValue::Integer(1))
        );
    }

    #[test]
    fn test_duplicate_output_rejected() {
        let ds = dataset(vec![row(Some("/a"), Some(1))]);
        let aggregates = parse_aggregate_expr("sum:clicks,sum:clicks").unwrap();
        let err =
            GroupProcessor::process(&ds, &["page".to_string()], &aggregates).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("sum_clicks"), "{}", text);
    }

    #[test]
    fn test_same_column_different_functions_allowed() {
        let ds = dataset(vec![row(Some("/a"), Some(1)), row(Some("/a"), Some(3))]);
        let aggregates = parse_aggregate_expr("sum:clicks,count:clicks").unwrap();
        let out = GroupProcessor::process(&ds, &["page".to_string()], &aggregates).unwrap();
        assert_eq!(out.rows[0].get("sum_clicks"), Some(&FieldValue::Integer(4)));
        assert_eq!(
            out.rows[0].get("count_clicks"),
            Some(&FieldValue::Integer(2))
        );
    }

    #[test]
    fn test_mean_and_median() {
        let ds = dataset(vec![
            row(Some("/a"), Some(1)),
            row(Some("/a"), Some(2)),
            row(Some("/a"), Some(6)),
        ]);
        let aggregates = parse_aggregate_expr("mean:clicks,median:clicks").unwrap();
        let out = GroupProcessor::process(&ds, &["page".to_string()], &aggregates).unwrap();
        assert_eq!(out.rows[0].get("mean_clicks"), Some(&FieldValue::Float(3.0)));
        assert_eq!(
            out.rows[0].get("median_clicks"),
            Some(&FieldValue::Float(2.0))
        );
    }

    #[test]
    fn test_min_max_strings() {
        let mut r1 = Row::new();
        r1.insert("k".to_string(), FieldValue::Integer(1));
        r1.insert("name".to_string(), FieldValue::String("beta".to_string()));
        let mut r2 = Row::new();
        r2.insert("k".to_string(), FieldValue::Integer(1));
        r2.insert("name".to_string(), FieldValue::String("alpha".to_string()));
        let ds = Dataset::new(vec!["k".to_string(), "name".to_string()], vec![r1, r2]);

        let aggregates = parse_aggregate_expr("min:name,max:name").unwrap();
        let out = GroupProcessor::process(&ds, &["k".to_string()], &aggregates).unwrap();
        assert_eq!(
            out.rows[0].get("min_name"),
            Some(&FieldValue::String("alpha".to_string()))
        );
        assert_eq!(
            out.rows[0].get("max_name"),
            Some(&FieldValue::String("beta".to_string()))
        );
    }

    #[test]
    fn test_sum_non_numeric_is_error() {
        let mut r = Row::new();
        r.insert("k".to_string(), FieldValue::Integer(1));
        r.insert("name".to_string(), FieldValue::String("x".to_string()));
        let ds = Dataset::new(vec!["k".to_string(), "name".to_string()], vec![r]);
        let aggregates = parse_aggregate_expr("sum:name").unwrap();
        assert!(GroupProcessor::process(&ds, &["k".to_string()], &aggregates).is_err());
    }

    #[test]
    fn test_unknown_columns_rejected() {
        let ds = dataset(vec![row(Some("/a"), Some(1))]);
        let aggregates = parse_aggregate_expr("sum:clicks").unwrap();
        assert!(GroupProcessor::process(&ds, &["nope".to_string()], &aggregates).is_err());

        let aggregates = parse_aggregate_expr("sum:nope").unwrap();
        assert!(GroupProcessor::process(&ds, &["page".to_string()], &aggregates).is_err());
    }
}
