//! Core tabular data types.
//!
//! This module contains the value and dataset types that flow through the
//! pipeline:
//! - [`FieldValue`] - the scalar value type for row fields
//! - [`Dataset`] - an ordered sequence of uniform rows plus column order
//!
//! Stages never mutate their input; every stage consumes a `&Dataset` and
//! allocates a fresh one, so callers may reuse the original dataset after a
//! pipeline run.

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::PipelineError;

/// A scalar value in a row field.
///
/// Mirrors the JSON scalar types a query result arrives as. Arithmetic-free
/// by itself; comparison and coercion rules live with the consumers
/// (sorting, filtering, aggregation).
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Missing / null value
    Null,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => write!(f, ""),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(s) => write!(f, "{}", s),
            FieldValue::Boolean(b) => write!(f, "{}", b),
        }
    }
}

/// Hash implementation so values can form group keys.
///
/// Floats hash by bit representation (handles -0.0 and infinities
/// deterministically); Null hashes as its discriminant alone.
impl Hash for FieldValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FieldValue::Integer(i) => i.hash(state),
            FieldValue::Float(f) => f.to_bits().hash(state),
            FieldValue::String(s) => s.hash(state),
            FieldValue::Boolean(b) => b.hash(state),
            FieldValue::Null => {}
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            FieldValue::Integer(i) => serializer.serialize_i64(*i),
            FieldValue::Float(v) => serializer.serialize_f64(*v),
            FieldValue::String(s) => serializer.serialize_str(s),
            FieldValue::Boolean(b) => serializer.serialize_bool(*b),
            FieldValue::Null => serializer.serialize_none(),
        }
    }
}

impl FieldValue {
    /// Name of this value's type, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldValue::Integer(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::String(_) => "string",
            FieldValue::Boolean(_) => "boolean",
            FieldValue::Null => "null",
        }
    }

    /// True for [`FieldValue::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Numeric view of the value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert a JSON scalar into a field value.
    ///
    /// Arrays and objects have no place in a flat row; they come back as a
    /// type error naming the JSON type.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PipelineError> {
        match value {
            serde_json::Value::Null => Ok(FieldValue::Null),
            serde_json::Value::Bool(b) => Ok(FieldValue::Boolean(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(FieldValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(FieldValue::Float(f))
                } else {
                    Err(PipelineError::type_error(
                        "integer or float",
                        "number",
                        Some(n.to_string()),
                    ))
                }
            }
            serde_json::Value::String(s) => Ok(FieldValue::String(s.clone())),
            other => Err(PipelineError::type_error(
                "scalar",
                json_type_name(other),
                None,
            )),
        }
    }

    /// Convert back into a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Integer(i) => serde_json::Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            FieldValue::String(s) => serde_json::Value::String(s.clone()),
            FieldValue::Boolean(b) => serde_json::Value::Bool(*b),
            FieldValue::Null => serde_json::Value::Null,
        }
    }

    /// Total order used by sorting and min/max aggregation.
    ///
    /// Null sorts smallest; integers and floats compare numerically across
    /// the two variants. Values of unrelated types are incomparable and
    /// produce a type error rather than an arbitrary order.
    pub fn compare(&self, other: &FieldValue) -> Result<Ordering, PipelineError> {
        use FieldValue::*;

        match (self, other) {
            (Null, Null) => Ok(Ordering::Equal),
            (Null, _) => Ok(Ordering::Less),
            (_, Null) => Ok(Ordering::Greater),

            (Integer(a), Integer(b)) => Ok(a.cmp(b)),
            (String(a), String(b)) => Ok(a.cmp(b)),
            (Boolean(a), Boolean(b)) => Ok(a.cmp(b)),

            (Float(a), Float(b)) => Ok(total_float_cmp(*a, *b)),
            (Integer(a), Float(b)) => Ok(total_float_cmp(*a as f64, *b)),
            (Float(a), Integer(b)) => Ok(total_float_cmp(*a, *b as f64)),

            _ => Err(PipelineError::type_error(
                self.type_name(),
                other.type_name(),
                Some(other.to_string()),
            )),
        }
    }
}

fn total_float_cmp(a: f64, b: f64) -> Ordering {
    if a < b {
        Ordering::Less
    } else if a > b {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// One row: a mapping from column name to scalar value
pub type Row = HashMap<String, FieldValue>;

/// An ordered sequence of uniform rows flowing through the pipeline.
///
/// `columns` carries the presentation order; rows themselves are unordered
/// maps. A well-formed dataset has every row sharing the column set.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Column names in presentation order
    pub columns: Vec<String>,
    /// Rows in input order
    pub rows: Vec<Row>,
}

impl Dataset {
    /// Create a dataset from explicit column order and rows
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Dataset { columns, rows }
    }

    /// An empty dataset with no columns
    pub fn empty() -> Self {
        Dataset {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True when the dataset holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether a column is present
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Build a dataset from an array of JSON objects.
    ///
    /// Column order is taken from the first row's key order; later rows may
    /// omit keys (missing values become null) but may not introduce new
    /// ones.
    pub fn from_json_rows(value: &serde_json::Value) -> Result<Self, PipelineError> {
        let records = value.as_array().ok_or_else(|| {
            PipelineError::type_error("array of objects", json_type_name(value), None)
        })?;

        let mut columns: Vec<String> = Vec::new();
        let mut rows = Vec::with_capacity(records.len());

        for record in records {
            let obj = record.as_object().ok_or_else(|| {
                PipelineError::type_error("object", json_type_name(record), None)
            })?;

            if columns.is_empty() && rows.is_empty() {
                columns = obj.keys().cloned().collect();
            }

            let mut row = Row::with_capacity(obj.len());
            for (key, val) in obj {
                if !columns.iter().any(|c| c == key) {
                    return Err(PipelineError::schema_error(
                        "row introduces a column missing from the first row",
                        Some(key.clone()),
                    ));
                }
                row.insert(key.clone(), FieldValue::from_json(val)?);
            }
            for col in &columns {
                row.entry(col.clone()).or_insert(FieldValue::Null);
            }
            rows.push(row);
        }

        Ok(Dataset { columns, rows })
    }

    /// Render as an array of JSON objects, columns in presentation order
    pub fn to_json_rows(&self) -> serde_json::Value {
        let rows: Vec<serde_json::Value> = self
            .rows
            .iter()
            .map(|row| {
                let mut obj = serde_json::Map::with_capacity(self.columns.len());
                for col in &self.columns {
                    let value = row.get(col).map(FieldValue::to_json).unwrap_or(
                        serde_json::Value::Null,
                    );
                    obj.insert(col.clone(), value);
                }
                serde_json::Value::Object(obj)
            })
            .collect();
        serde_json::Value::Array(rows)
    }
}

/// Serializes the dataset as its JSON-rows form
impl Serialize for Dataset {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(&OrderedRow {
                columns: &self.columns,
                row,
            })?;
        }
        seq.end()
    }
}

struct OrderedRow<'a> {
    columns: &'a [String],
    row: &'a Row,
}

impl Serialize for OrderedRow<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for col in self.columns {
            match self.row.get(col) {
                Some(value) => map.serialize_entry(col, value)?,
                None => map.serialize_entry(col, &FieldValue::Null)?,
            }
        }
        map.end()
    }
}
