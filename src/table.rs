/// ClubTable Records and Schema
///
/// A `Schema` describes the fields an entity is expected to carry and which
/// field identifies a record. Raw JSON coming back from the record source is
/// checked against the schema once, in `Schema::validate_all`, and turned
/// into immutable `Record`s. A `RecordSet` owns the ordered collection and is
/// always replaced wholesale.

use crate::column::{ColumnType, ColumnValue};
use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;

/// Stable identity of a record, taken from the schema's key column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordKey {
    Int(i64),
    Text(String),
}

impl RecordKey {
    pub fn from_value(value: &ColumnValue) -> Option<RecordKey> {
        match value {
            ColumnValue::Int(v) => Some(RecordKey::Int(*v)),
            ColumnValue::String(v) => Some(RecordKey::Text(v.clone())),
            _ => None,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            RecordKey::Int(v) => JsonValue::Number((*v).into()),
            RecordKey::Text(v) => JsonValue::String(v.clone()),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Int(v) => write!(f, "{}", v),
            RecordKey::Text(v) => f.write_str(v),
        }
    }
}

impl From<i64> for RecordKey {
    fn from(v: i64) -> Self {
        RecordKey::Int(v)
    }
}

impl From<&str> for RecordKey {
    fn from(v: &str) -> Self {
        RecordKey::Text(v.to_string())
    }
}

/// Schema definition with field names, types and nullability.
///
/// # Examples
///
/// ```
/// use clubtable::{ColumnType, Schema};
/// use serde_json::json;
///
/// let schema = Schema::new("student_id", vec![
///     ("student_id".to_string(), ColumnType::Int, false),
///     ("first_name".to_string(), ColumnType::String, false),
///     ("email".to_string(), ColumnType::String, true),
/// ]);
///
/// let records = schema
///     .validate_all(&json!([{"student_id": 1, "first_name": "Ann"}]))
///     .unwrap();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].get("first_name").unwrap().as_string(), Some("Ann"));
/// assert!(records[0].get("email").unwrap().is_null());
/// ```
#[derive(Debug, Clone)]
pub struct Schema {
    key: String,
    columns: Vec<(String, ColumnType, bool)>, // (name, type, nullable)
}

impl Schema {
    /// Creates a new schema.
    ///
    /// # Arguments
    ///
    /// * `key` - Name of the column that identifies a record
    /// * `columns` - Vector of tuples: (column_name, column_type, is_nullable)
    pub fn new(key: impl Into<String>, columns: Vec<(String, ColumnType, bool)>) -> Self {
        Schema {
            key: key.into(),
            columns,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn key_column(&self) -> &str {
        &self.key
    }

    pub fn get_column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _, _)| name.as_str()).collect()
    }

    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|(n, _, _)| n == name)
    }

    pub fn get_column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, ty, _)| *ty)
    }

    pub fn is_column_nullable(&self, name: &str) -> Option<bool> {
        self.columns
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, _, nullable)| *nullable)
    }

    /// Validate a JSON array of rows.
    pub fn validate_all(&self, raw: &JsonValue) -> Result<Vec<Record>, SchemaError> {
        let rows = raw.as_array().ok_or(SchemaError::NotAnArray)?;
        rows.iter()
            .enumerate()
            .map(|(index, row)| self.validate(index, row))
            .collect()
    }

    /// Validate one JSON row; `index` is only used for error reporting.
    pub fn validate(&self, index: usize, raw: &JsonValue) -> Result<Record, SchemaError> {
        let object = raw.as_object().ok_or(SchemaError::NotAnObject { index })?;

        // Unknown fields are carried along untyped
        let mut fields: HashMap<String, ColumnValue> = object
            .iter()
            .filter(|(name, _)| self.get_column_index(name).is_none())
            .map(|(name, value)| (name.clone(), ColumnValue::from_json(value)))
            .collect();

        for (name, column_type, nullable) in &self.columns {
            let value = object
                .get(name)
                .map(ColumnValue::from_json)
                .unwrap_or(ColumnValue::Null);

            let value = if value.is_null() {
                if !*nullable {
                    return Err(SchemaError::MissingField {
                        index,
                        field: name.clone(),
                    });
                }
                ColumnValue::Null
            } else {
                Self::coerce(index, name, *column_type, value)?
            };
            fields.insert(name.clone(), value);
        }

        let key = fields
            .get(&self.key)
            .and_then(RecordKey::from_value)
            .ok_or_else(|| SchemaError::InvalidKey {
                index,
                field: self.key.clone(),
            })?;

        Ok(Record { key, fields })
    }

    fn coerce(
        index: usize,
        field: &str,
        expected: ColumnType,
        value: ColumnValue,
    ) -> Result<ColumnValue, SchemaError> {
        match (expected, value) {
            (ColumnType::Int, v @ ColumnValue::Int(_)) => Ok(v),
            (ColumnType::Float, v @ ColumnValue::Float(_)) => Ok(v),
            (ColumnType::Float, ColumnValue::Int(i)) => Ok(ColumnValue::Float(i as f64)),
            (ColumnType::String, v @ ColumnValue::String(_)) => Ok(v),
            // Phone numbers, rooms and grades sometimes come back as numbers
            (ColumnType::String, v @ (ColumnValue::Int(_) | ColumnValue::Float(_))) => {
                Ok(ColumnValue::String(v.to_string()))
            }
            (ColumnType::Bool, v @ ColumnValue::Bool(_)) => Ok(v),
            (ColumnType::List, v @ ColumnValue::List(_)) => Ok(v),
            (expected, found) => Err(SchemaError::TypeMismatch {
                index,
                field: field.to_string(),
                expected,
                found: found.kind_name().to_string(),
            }),
        }
    }
}

/// One immutable student, teacher or club.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: RecordKey,
    fields: HashMap<String, ColumnValue>,
}

impl Record {
    pub fn new(key: RecordKey, fields: HashMap<String, ColumnValue>) -> Self {
        Record { key, fields }
    }

    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    pub fn get(&self, field: &str) -> Option<&ColumnValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &HashMap<String, ColumnValue> {
        &self.fields
    }

    /// Field value rendered as plain text; missing fields render empty.
    pub fn text(&self, field: &str) -> String {
        self.fields.get(field).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn to_json(&self) -> serde_json::Map<String, JsonValue> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

/// The fetched collection for one entity table.
///
/// Rows are never patched in place: every successful fetch replaces the whole
/// collection and bumps the generation.
#[derive(Debug, Clone, Default)]
pub struct RecordSet {
    rows: Vec<Record>,
    generation: u64,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, rows: Vec<Record>) {
        self.rows = rows;
        self.generation += 1;
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get_row(&self, index: usize) -> Result<&Record, String> {
        self.rows
            .get(index)
            .ok_or_else(|| format!("Index {} out of range [0, {})", index, self.len()))
    }

    pub fn find(&self, key: &RecordKey) -> Option<&Record> {
        self.rows.iter().find(|r| r.key() == key)
    }

    pub fn contains_key(&self, key: &RecordKey) -> bool {
        self.find(key).is_some()
    }
}
