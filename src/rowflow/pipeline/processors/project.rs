//! Projection processor.
//!
//! Selects and reorders a subset of columns. The output column order
//! follows the projection list, not the dataset's original order.

use super::super::error::{PipelineError, PipelineResult};
use super::super::types::{Dataset, FieldValue, Row};

/// Processor for the projection stage
pub struct ProjectProcessor;

impl ProjectProcessor {
    /// Keep only `columns`, in the order given
    pub fn process(dataset: &Dataset, columns: &[String]) -> PipelineResult<Dataset> {
        if columns.is_empty() {
            return Err(PipelineError::parse_error("empty projection list", None));
        }
        for column in columns {
            if !dataset.has_column(column) {
                return Err(PipelineError::schema_error(
                    "unknown projection column",
                    Some(column.clone()),
                ));
            }
        }

        let rows = dataset
            .rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|c| {
                        (
                            c.clone(),
                            row.get(c).cloned().unwrap_or(FieldValue::Null),
                        )
                    })
                    .collect::<Row>()
            })
            .collect();

        Ok(Dataset::new(columns.to_vec(), rows))
    }
}
