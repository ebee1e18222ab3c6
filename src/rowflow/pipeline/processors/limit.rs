//! Row-limit processor.
//!
//! Truncates the dataset to its first N rows. Idempotent: re-running with
//! the same N on its own output changes nothing.

use super::super::error::{PipelineError, PipelineResult};
use super::super::types::Dataset;

/// Processor for the row-limit stage
pub struct LimitProcessor;

impl LimitProcessor {
    /// Keep the first `n` rows
    pub fn process(dataset: &Dataset, n: i64) -> PipelineResult<Dataset> {
        if n <= 0 {
            return Err(PipelineError::parse_error(
                format!("row limit must be positive, got {}", n),
                None,
            ));
        }

        let rows = dataset.rows.iter().take(n as usize).cloned().collect();
        Ok(Dataset::new(dataset.columns.clone(), rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rowflow::pipeline::types::{FieldValue, Row};

    fn dataset(n: usize) -> Dataset {
        let rows = (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("i".to_string(), FieldValue::Integer(i as i64));
                row
            })
            .collect();
        Dataset::new(vec!["i".to_string()], rows)
    }

    #[test]
    fn test_limit_truncates() {
        let out = LimitProcessor::process(&dataset(5), 2).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out.rows[1].get("i"), Some(&FieldValue::Integer(1)));
    }

    #[test]
    fn test_limit_larger_than_dataset() {
        let out = LimitProcessor::process(&dataset(2), 10).unwrap();
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_limit_idempotent() {
        let once = LimitProcessor::process(&dataset(5), 3).unwrap();
        let twice = LimitProcessor::process(&once, 3).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_limit_zero_rejected() {
        assert!(LimitProcessor::process(&dataset(5), 0).is_err());
        assert!(LimitProcessor::process(&dataset(5), -1).is_err());
    }
}
