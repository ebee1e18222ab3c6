//! Save specification grammar.
//!
//! A save specification names an output target (`csv`, `sheets`,
//! `bigquery`) plus a write mode and target-specific fields. The grammar
//! is checked in full and every violation reported, with one exception: a
//! missing or unsupported `to` short-circuits the target-specific checks,
//! since none of them are meaningful without a target.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::result_types::{json_type_name, ErrorCode, ValidationError};

/// All keys a save specification may carry, across every target
pub const SAVE_KEYS: &[&str] = &[
    "to",
    "mode",
    "path",
    "sheet_url",
    "sheet_name",
    "project_id",
    "dataset",
    "table",
    "keys",
];

/// Write mode for a save target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveMode {
    #[default]
    Overwrite,
    Append,
    Upsert,
}

impl SaveMode {
    fn parse(word: &str) -> Option<Self> {
        match word {
            "overwrite" => Some(SaveMode::Overwrite),
            "append" => Some(SaveMode::Append),
            "upsert" => Some(SaveMode::Upsert),
            _ => None,
        }
    }
}

/// A validated save target with its required fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "lowercase")]
pub enum SaveTarget {
    Csv {
        path: String,
    },
    Sheets {
        sheet_url: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        sheet_name: Option<String>,
    },
    Bigquery {
        project_id: String,
        dataset: String,
        table: String,
    },
}

/// A normalized save specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveSpec {
    #[serde(flatten)]
    pub target: SaveTarget,
    pub mode: SaveMode,
    /// Upsert key columns; empty unless provided
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
}

/// Validate a raw save object, accumulating every violation
pub fn validate_save(raw: &Value) -> Result<SaveSpec, Vec<ValidationError>> {
    let obj = match raw.as_object() {
        Some(obj) => obj,
        None => {
            return Err(vec![ValidationError::new(
                ErrorCode::InvalidType,
                "$.save",
                format!("save must be an object, got {}", json_type_name(raw)),
            )]);
        }
    };

    let mut errors = Vec::new();

    for key in obj.keys() {
        if !SAVE_KEYS.contains(&key.as_str()) {
            errors.push(
                ValidationError::new(
                    ErrorCode::UnknownField,
                    format!("$.save.{}", key),
                    format!("unknown save field '{}'", key),
                )
                .with_hint(format!("allowed fields: {}", SAVE_KEYS.join(", "))),
            );
        }
    }

    // Target first: nothing else is checkable without one.
    let target_name = match obj.get("to") {
        None => {
            errors.push(
                ValidationError::new(ErrorCode::MissingField, "$.save.to", "'to' is required")
                    .with_hint("one of: csv, sheets, bigquery"),
            );
            return Err(errors);
        }
        Some(Value::String(s)) if matches!(s.as_str(), "csv" | "sheets" | "bigquery") => {
            s.clone()
        }
        Some(other) => {
            let shown = match other {
                Value::String(s) => s.clone(),
                v => json_type_name(v).to_string(),
            };
            errors.push(
                ValidationError::new(
                    ErrorCode::InvalidSaveTarget,
                    "$.save.to",
                    format!("unsupported save target '{}'", shown),
                )
                .with_hint("one of: csv, sheets, bigquery"),
            );
            return Err(errors);
        }
    };

    let mode = match obj.get("mode") {
        None => SaveMode::Overwrite,
        Some(Value::String(s)) => match SaveMode::parse(s) {
            Some(mode) => mode,
            None => {
                errors.push(
                    ValidationError::new(
                        ErrorCode::InvalidSaveMode,
                        "$.save.mode",
                        format!("unsupported save mode '{}'", s),
                    )
                    .with_hint("one of: overwrite, append, upsert"),
                );
                SaveMode::Overwrite
            }
        },
        Some(other) => {
            errors.push(ValidationError::new(
                ErrorCode::InvalidType,
                "$.save.mode",
                format!("'mode' must be a string, got {}", json_type_name(other)),
            ));
            SaveMode::Overwrite
        }
    };

    let keys = validate_keys(obj.get("keys"), &mut errors);

    let target = match target_name.as_str() {
        "csv" => {
            if mode == SaveMode::Upsert {
                errors.push(
                    ValidationError::new(
                        ErrorCode::InvalidSaveMode,
                        "$.save.mode",
                        "mode 'upsert' is not supported for csv",
                    )
                    .with_hint("use overwrite or append"),
                );
            }
            required_string(obj, "path", &mut errors).map(|path| SaveTarget::Csv { path })
        }
        "sheets" => {
            if mode == SaveMode::Upsert && keys.is_empty() {
                errors.push(
                    ValidationError::new(
                        ErrorCode::MissingField,
                        "$.save.keys",
                        "mode 'upsert' requires a non-empty 'keys' list",
                    )
                    .with_hint("list the columns identifying a row"),
                );
            }
            let sheet_name = optional_string(obj, "sheet_name", &mut errors);
            required_string(obj, "sheet_url", &mut errors).map(|sheet_url| SaveTarget::Sheets {
                sheet_url,
                sheet_name,
            })
        }
        _ => {
            if mode == SaveMode::Upsert {
                errors.push(
                    ValidationError::new(
                        ErrorCode::InvalidSaveMode,
                        "$.save.mode",
                        "mode 'upsert' is not yet supported for bigquery",
                    )
                    .with_hint("use overwrite or append"),
                );
            }
            let project_id = required_string(obj, "project_id", &mut errors);
            let dataset = required_string(obj, "dataset", &mut errors);
            let table = required_string(obj, "table", &mut errors);
            match (project_id, dataset, table) {
                (Some(project_id), Some(dataset), Some(table)) => Some(SaveTarget::Bigquery {
                    project_id,
                    dataset,
                    table,
                }),
                _ => None,
            }
        }
    };

    match (target, errors.is_empty()) {
        (Some(target), true) => Ok(SaveSpec { target, mode, keys }),
        _ => Err(errors),
    }
}

fn required_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.push(ValidationError::new(
                ErrorCode::InvalidType,
                format!("$.save.{}", key),
                format!("'{}' must be a string, got {}", key, json_type_name(other)),
            ));
            None
        }
        None => {
            errors.push(ValidationError::new(
                ErrorCode::MissingField,
                format!("$.save.{}", key),
                format!("'{}' is required", key),
            ));
            None
        }
    }
}

fn optional_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            errors.push(ValidationError::new(
                ErrorCode::InvalidType,
                format!("$.save.{}", key),
                format!("'{}' must be a string, got {}", key, json_type_name(other)),
            ));
            None
        }
        None => None,
    }
}

fn validate_keys(value: Option<&Value>, errors: &mut Vec<ValidationError>) -> Vec<String> {
    let Some(value) = value else {
        return Vec::new();
    };

    let items = match value.as_array() {
        Some(items) => items,
        None => {
            errors.push(ValidationError::new(
                ErrorCode::InvalidType,
                "$.save.keys",
                format!("'keys' must be a list, got {}", json_type_name(value)),
            ));
            return Vec::new();
        }
    };

    if items.is_empty() {
        errors.push(ValidationError::new(
            ErrorCode::InvalidValue,
            "$.save.keys",
            "'keys' must not be empty",
        ));
        return Vec::new();
    }

    let mut keys = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match item.as_str() {
            Some(s) if !s.is_empty() => keys.push(s.to_string()),
            Some(_) => errors.push(ValidationError::new(
                ErrorCode::InvalidValue,
                format!("$.save.keys[{}]", index),
                "key columns must be non-empty strings",
            )),
            None => errors.push(ValidationError::new(
                ErrorCode::InvalidType,
                format!("$.save.keys[{}]", index),
                format!("key must be a string, got {}", json_type_name(item)),
            )),
        }
    }
    keys
}
