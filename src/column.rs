/// ClubTable Column Values
///
/// A record is a mapping from field name to `ColumnValue`. Values arrive as
/// JSON from the record source and are converted once at the schema boundary;
/// everything downstream (filters, sort, grouping) works on `ColumnValue`.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Column data types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Int,
    Float,
    String,
    Bool,
    List,
}

/// Column value enum to support multiple types
///
/// `Map` only appears inside `List` values produced by grouping, where each
/// nested teacher or class keeps its own fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    List(Vec<ColumnValue>),
    Map(BTreeMap<String, ColumnValue>),
    Null,
}

impl ColumnValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ColumnValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Float(v) => Some(*v),
            ColumnValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ColumnValue]> {
        match self {
            ColumnValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, ColumnValue>> {
        match self {
            ColumnValue::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Name of the JSON-level kind, used in schema error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            ColumnValue::Int(_) => "integer",
            ColumnValue::Float(_) => "float",
            ColumnValue::String(_) => "string",
            ColumnValue::Bool(_) => "bool",
            ColumnValue::List(_) => "list",
            ColumnValue::Map(_) => "object",
            ColumnValue::Null => "null",
        }
    }

    /// Lowercased text that text filters match against.
    ///
    /// Scalars only: lists, maps and nulls never match a substring query.
    pub fn search_text(&self) -> Option<String> {
        match self {
            ColumnValue::Int(_) | ColumnValue::Float(_) | ColumnValue::Bool(_) => {
                Some(self.to_string())
            }
            ColumnValue::String(s) => Some(s.to_lowercase()),
            _ => None,
        }
    }

    /// Ordering used by the sort stage.
    ///
    /// A total preorder: values are bucketed by kind (numbers, strings,
    /// booleans, lists, maps, null) and buckets keep that order, so nulls
    /// come last. Within a bucket strings compare case-insensitively and
    /// integers and floats compare numerically with each other. Lists and
    /// maps compare equal among themselves.
    pub fn sort_cmp(&self, other: &ColumnValue) -> Ordering {
        match (self, other) {
            (ColumnValue::Int(a), ColumnValue::Int(b)) => a.cmp(b),
            (ColumnValue::String(a), ColumnValue::String(b)) => {
                a.to_lowercase().cmp(&b.to_lowercase())
            }
            (ColumnValue::Bool(a), ColumnValue::Bool(b)) => a.cmp(b),
            (ColumnValue::Float(_), ColumnValue::Float(_) | ColumnValue::Int(_))
            | (ColumnValue::Int(_), ColumnValue::Float(_)) => {
                match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a.total_cmp(&b),
                    _ => Ordering::Equal,
                }
            }
            _ => self.sort_rank().cmp(&other.sort_rank()),
        }
    }

    fn sort_rank(&self) -> u8 {
        match self {
            ColumnValue::Int(_) | ColumnValue::Float(_) => 0,
            ColumnValue::String(_) => 1,
            ColumnValue::Bool(_) => 2,
            ColumnValue::List(_) => 3,
            ColumnValue::Map(_) => 4,
            ColumnValue::Null => 5,
        }
    }

    /// Convert a JSON value into a column value without any type checking.
    pub fn from_json(value: &JsonValue) -> ColumnValue {
        match value {
            JsonValue::Null => ColumnValue::Null,
            JsonValue::Bool(b) => ColumnValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ColumnValue::Int(i)
                } else {
                    n.as_f64().map(ColumnValue::Float).unwrap_or(ColumnValue::Null)
                }
            }
            JsonValue::String(s) => ColumnValue::String(s.clone()),
            JsonValue::Array(items) => {
                ColumnValue::List(items.iter().map(ColumnValue::from_json).collect())
            }
            JsonValue::Object(map) => ColumnValue::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), ColumnValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert back to JSON. Non-finite floats become `null`.
    pub fn to_json(&self) -> JsonValue {
        match self {
            ColumnValue::Int(v) => JsonValue::Number((*v).into()),
            ColumnValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            ColumnValue::String(v) => JsonValue::String(v.clone()),
            ColumnValue::Bool(v) => JsonValue::Bool(*v),
            ColumnValue::List(items) => {
                JsonValue::Array(items.iter().map(ColumnValue::to_json).collect())
            }
            ColumnValue::Map(map) => JsonValue::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            ColumnValue::Null => JsonValue::Null,
        }
    }
}

impl fmt::Display for ColumnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnValue::Int(v) => write!(f, "{}", v),
            ColumnValue::Float(v) => write!(f, "{}", v),
            ColumnValue::String(v) => f.write_str(v),
            ColumnValue::Bool(v) => write!(f, "{}", v),
            ColumnValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            ColumnValue::Map(map) => {
                let parts: Vec<String> = map.values().map(|v| v.to_string()).collect();
                f.write_str(&parts.join(" "))
            }
            ColumnValue::Null => Ok(()),
        }
    }
}

impl<'de> Deserialize<'de> for ColumnValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        JsonValue::deserialize(deserializer).map(|v| ColumnValue::from_json(&v))
    }
}

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::String(v)
    }
}

impl From<i64> for ColumnValue {
    fn from(v: i64) -> Self {
        ColumnValue::Int(v)
    }
}
