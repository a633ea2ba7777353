/// Filter stage.
///
/// Two kinds of filters are supported:
/// - text filters: case-insensitive substring search over one or more fields,
///   or over several fields joined together (`"first last"`)
/// - categorical filters: exact match on one field, optionally nested under a
///   parent categorical filter (class → room)
///
/// All confirmed filters compose with logical AND.

use crate::column::ColumnValue;
use crate::table::Record;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// One way a text filter can look at a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldMatcher {
    /// A single field
    Field(String),
    /// Several fields joined with a separator before matching
    Concat { fields: Vec<String>, separator: String },
}

impl FieldMatcher {
    pub fn field(name: impl Into<String>) -> Self {
        FieldMatcher::Field(name.into())
    }

    /// Fields joined by a single space, e.g. a full name.
    pub fn joined(fields: &[&str]) -> Self {
        FieldMatcher::Concat {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            separator: " ".to_string(),
        }
    }

    /// `needle` must already be lowercased.
    fn matches(&self, record: &Record, needle: &str) -> bool {
        match self {
            FieldMatcher::Field(name) => record
                .get(name)
                .and_then(ColumnValue::search_text)
                .map(|text| text.contains(needle))
                .unwrap_or(false),
            FieldMatcher::Concat { fields, separator } => {
                let mut parts = Vec::with_capacity(fields.len());
                for name in fields {
                    match record.get(name).and_then(ColumnValue::search_text) {
                        Some(text) => parts.push(text),
                        None => return false,
                    }
                }
                parts.join(separator).contains(needle)
            }
        }
    }
}

/// A named free-text filter; matches if ANY of its matchers contain the query.
#[derive(Debug, Clone)]
pub struct TextFilterSpec {
    pub name: String,
    pub label: String,
    pub matchers: Vec<FieldMatcher>,
}

impl TextFilterSpec {
    pub fn new(name: impl Into<String>, label: impl Into<String>, matchers: Vec<FieldMatcher>) -> Self {
        TextFilterSpec {
            name: name.into(),
            label: label.into(),
            matchers,
        }
    }

    /// Empty queries match everything.
    pub fn matches(&self, record: &Record, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.matchers.iter().any(|m| m.matches(record, &needle))
    }
}

/// An exact-match filter on one field.
#[derive(Debug, Clone)]
pub struct CategoricalSpec {
    pub field: String,
    pub label: String,
    /// Field of the parent categorical filter, if this one is nested
    pub parent: Option<String>,
}

impl CategoricalSpec {
    pub fn new(field: impl Into<String>, label: impl Into<String>) -> Self {
        CategoricalSpec {
            field: field.into(),
            label: label.into(),
            parent: None,
        }
    }

    pub fn child_of(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }
}

/// Value chosen for a categorical filter.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum Choice {
    /// The "no filter" sentinel
    #[default]
    Any,
    Exact(String),
}

impl Choice {
    pub fn from_option(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Choice::Exact(v),
            _ => Choice::Any,
        }
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Choice::Any)
    }

    pub fn matches(&self, record: &Record, field: &str) -> bool {
        match self {
            Choice::Any => true,
            Choice::Exact(wanted) => record
                .get(field)
                .map(|v| !v.is_null() && v.to_string() == *wanted)
                .unwrap_or(false),
        }
    }
}

/// Filter specs for one entity table.
#[derive(Debug, Clone, Default)]
pub struct FilterSpecs {
    pub text: Vec<TextFilterSpec>,
    pub categorical: Vec<CategoricalSpec>,
}

impl FilterSpecs {
    pub fn text_filter(&self, name: &str) -> Option<&TextFilterSpec> {
        self.text.iter().find(|s| s.name == name)
    }

    pub fn categorical_filter(&self, field: &str) -> Option<&CategoricalSpec> {
        self.categorical.iter().find(|s| s.field == field)
    }

    /// Categorical filters nested directly under `parent`.
    pub fn children_of<'a>(&'a self, parent: &'a str) -> impl Iterator<Item = &'a CategoricalSpec> + 'a {
        self.categorical
            .iter()
            .filter(move |s| s.parent.as_deref() == Some(parent))
    }
}

/// Confirmed filter values. Missing entries mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSet {
    pub text: BTreeMap<String, String>,
    pub categorical: BTreeMap<String, Choice>,
}

impl FilterSet {
    pub fn text_query(&self, name: &str) -> &str {
        self.text.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn choice(&self, field: &str) -> Choice {
        self.categorical.get(field).cloned().unwrap_or_default()
    }

    /// True when no text query and no categorical choice is active.
    pub fn is_empty(&self) -> bool {
        self.text.values().all(|q| q.is_empty())
            && self.categorical.values().all(Choice::is_any)
    }

    pub fn matches(&self, specs: &FilterSpecs, record: &Record) -> bool {
        specs
            .text
            .iter()
            .all(|spec| spec.matches(record, self.text_query(&spec.name)))
            && specs
                .categorical
                .iter()
                .all(|spec| self.choice(&spec.field).matches(record, &spec.field))
    }
}

/// Apply confirmed filters, preserving input order.
pub fn filter_records<'a>(records: &'a [Record], specs: &FilterSpecs, filters: &FilterSet) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|record| filters.matches(specs, record))
        .collect()
}

/// Distinct non-empty display values of `field`, in first-seen order.
pub fn distinct_values<'a, I>(records: I, field: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut seen = HashSet::new();
    let mut values = Vec::new();
    for record in records {
        if let Some(value) = record.get(field).filter(|v| !v.is_null()) {
            let text = value.to_string();
            if seen.insert(text.clone()) {
                values.push(text);
            }
        }
    }
    values
}

/// Valid values for a child filter given the parent's current choice.
///
/// With the parent on "no filter" the child is disabled and has no options.
pub fn child_options(records: &[Record], parent_field: &str, parent_choice: &Choice, child_field: &str) -> Vec<String> {
    if parent_choice.is_any() {
        return Vec::new();
    }
    distinct_values(
        records.iter().filter(|r| parent_choice.matches(r, parent_field)),
        child_field,
    )
}
