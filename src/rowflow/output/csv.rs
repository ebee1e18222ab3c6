//! CSV artifact writer.
//!
//! Renders a dataset to a CSV file: header row from the dataset's column
//! order, values via their display form, nulls as empty cells.

use std::path::Path;

use crate::rowflow::pipeline::{Dataset, FieldValue};

/// Write `dataset` to `path` as CSV
pub fn write_csv(dataset: &Dataset, path: &Path) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record(&dataset.columns)?;
    for row in &dataset.rows {
        let record: Vec<String> = dataset
            .columns
            .iter()
            .map(|c| row.get(c).unwrap_or(&FieldValue::Null).to_string())
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
