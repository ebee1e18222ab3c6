//! Specification validation.
//!
//! Checks raw, untyped pipeline and save specification objects against
//! their grammars before anything executes. Unlike the pipeline engine,
//! validation never fails fast: every violation found — unknown fields,
//! missing required fields, wrong types, invalid enum values, out-of-range
//! values, cross-field inconsistencies — is accumulated and returned in
//! one structured list, so callers can report all problems at once.
//!
//! The entry point is [`SpecValidator`]; the per-grammar rule sets live in
//! [`pipeline_rules`] and [`save_rules`], and date-range handling in
//! [`dates`].

use chrono::{NaiveDate, Utc};
use serde_json::Value;

pub mod dates;
pub mod pipeline_rules;
pub mod result_types;
pub mod save_rules;

pub use dates::{resolve_date_expr, DateRange};
pub use result_types::{ErrorCode, ValidationError};
pub use save_rules::{SaveMode, SaveSpec, SaveTarget};

use crate::rowflow::pipeline::PipelineSpec;

/// Validator for pipeline and save specifications.
///
/// Carries the reference date used to resolve relative date expressions;
/// inject a fixed one in tests for determinism.
#[derive(Debug, Clone)]
pub struct SpecValidator {
    today: NaiveDate,
}

impl Default for SpecValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecValidator {
    /// Create a validator resolving relative dates against the current day
    pub fn new() -> Self {
        SpecValidator {
            today: Utc::now().date_naive(),
        }
    }

    /// Create a validator with a fixed reference date
    pub fn with_today(today: NaiveDate) -> Self {
        SpecValidator { today }
    }

    /// Validate a raw pipeline specification.
    ///
    /// Returns the normalized spec, or the complete ordered list of
    /// violations.
    pub fn validate_pipeline(&self, raw: &Value) -> Result<PipelineSpec, Vec<ValidationError>> {
        pipeline_rules::validate_pipeline(raw)
    }

    /// Validate a raw save specification
    pub fn validate_save(&self, raw: &Value) -> Result<SaveSpec, Vec<ValidationError>> {
        save_rules::validate_save(raw)
    }

    /// Validate one date field, resolving relative expressions
    pub fn validate_date(&self, path: &str, value: &Value) -> Result<NaiveDate, ValidationError> {
        dates::validate_date(path, value, self.today)
    }

    /// Validate a start/end date pair, accumulating errors from both
    pub fn validate_date_range(
        &self,
        start: &Value,
        end: &Value,
    ) -> Result<DateRange, Vec<ValidationError>> {
        dates::validate_date_range(start, end, self.today)
    }
}
