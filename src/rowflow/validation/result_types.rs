//! Result types for specification validation.
//!
//! Validation never fails fast: every rule violation becomes one
//! [`ValidationError`] and callers receive the complete ordered list, so a
//! UI or CLI can show every problem in one response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// A key outside the grammar's allowed set
    UnknownField,
    /// A required field is absent
    MissingField,
    /// A field has the wrong JSON type
    InvalidType,
    /// A field has the right type but an unacceptable value
    InvalidValue,
    /// A numeric field outside its allowed range
    OutOfRange,
    /// Cross-field pipeline inconsistency (group_by/aggregate pairing)
    InvalidPipeline,
    /// `to` is missing or not a supported save target
    InvalidSaveTarget,
    /// `mode` is not supported, or not supported for this target
    InvalidSaveMode,
    /// A date field is neither an ISO date nor a known relative expression
    InvalidDate,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::UnknownField => "UNKNOWN_FIELD",
            ErrorCode::MissingField => "MISSING_FIELD",
            ErrorCode::InvalidType => "INVALID_TYPE",
            ErrorCode::InvalidValue => "INVALID_VALUE",
            ErrorCode::OutOfRange => "OUT_OF_RANGE",
            ErrorCode::InvalidPipeline => "INVALID_PIPELINE",
            ErrorCode::InvalidSaveTarget => "INVALID_SAVE_TARGET",
            ErrorCode::InvalidSaveMode => "INVALID_SAVE_MODE",
            ErrorCode::InvalidDate => "INVALID_DATE",
        };
        write!(f, "{}", name)
    }
}

/// One structured validation error.
///
/// `path` is a root-relative locator (`$.pipeline.head`) pointing at the
/// exact offending field; `hint` carries an actionable suggestion when one
/// exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(rename = "error_code")]
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ValidationError {
    /// Create an error without a hint
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.code, self.path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {})", hint)?;
        }
        Ok(())
    }
}

/// JSON type name for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
