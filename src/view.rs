/// ClubTable View Pipeline
///
/// A view is computed from the fetched records in three stages:
/// filter → sort → paginate. Every stage is a pure function of its input and
/// the view parameters, so the whole pipeline can be recomputed after any
/// action without tracking what changed.

use crate::column::ColumnValue;
use crate::filter::{filter_records, FilterSet, FilterSpecs};
use crate::pagination::{paginate, PageWindow};
use crate::table::Record;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Sort order specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending order (smallest first)
    Ascending,
    /// Descending order (largest first)
    Descending,
}

impl SortOrder {
    pub fn flipped(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// A sort key: column name and direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Column name to sort by
    pub column: String,
    /// Sort order (ascending or descending)
    pub order: SortOrder,
}

impl SortKey {
    pub fn ascending(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            order: SortOrder::Ascending,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        SortKey {
            column: column.into(),
            order: SortOrder::Descending,
        }
    }

    /// Key after the user clicks `column`.
    ///
    /// Clicking the active column flips its direction; clicking any other
    /// column starts over in ascending order.
    pub fn toggle(current: Option<&SortKey>, column: &str) -> SortKey {
        match current {
            Some(key) if key.column == column => SortKey {
                column: key.column.clone(),
                order: key.order.flipped(),
            },
            _ => SortKey::ascending(column),
        }
    }

    /// Compare two records according to this key.
    ///
    /// Records whose field is missing or null sort after every other record
    /// in both directions and keep their fetch order among themselves.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match (self.value_of(a), self.value_of(b)) {
            (Some(va), Some(vb)) => match self.order {
                SortOrder::Ascending => va.sort_cmp(vb),
                SortOrder::Descending => vb.sort_cmp(va),
            },
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    fn value_of<'a>(&self, record: &'a Record) -> Option<&'a ColumnValue> {
        record.get(&self.column).filter(|v| !v.is_null())
    }
}

/// Sort in place. Without a key the existing (fetch) order is kept.
///
/// The sort is stable, so records with equal keys keep their relative order.
pub fn sort_records(records: &mut [&Record], key: Option<&SortKey>) {
    if let Some(key) = key {
        records.sort_by(|a, b| key.compare(a, b));
    }
}

/// Confirmed parameters the pipeline is computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewParameters {
    pub filters: FilterSet,
    pub sort: Option<SortKey>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ViewParameters {
    fn default() -> Self {
        ViewParameters {
            filters: FilterSet::default(),
            sort: None,
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filtered and sorted records, before pagination.
pub fn ordered_records<'a>(records: &'a [Record], specs: &FilterSpecs, params: &ViewParameters) -> Vec<&'a Record> {
    let mut rows = filter_records(records, specs, &params.filters);
    sort_records(&mut rows, params.sort.as_ref());
    rows
}

/// Run the whole pipeline and return the visible page.
///
/// # Examples
///
/// ```
/// use clubtable::{compute_page, ColumnType, FilterSpecs, Schema, SortKey, ViewParameters};
/// use serde_json::json;
///
/// let schema = Schema::new("id", vec![
///     ("id".to_string(), ColumnType::Int, false),
///     ("name".to_string(), ColumnType::String, false),
/// ]);
/// let records = schema
///     .validate_all(&json!([{"id": 1, "name": "bob"}, {"id": 2, "name": "Alice"}]))
///     .unwrap();
///
/// let params = ViewParameters {
///     sort: Some(SortKey::ascending("name")),
///     ..ViewParameters::default()
/// };
/// let page = compute_page(&records, &FilterSpecs::default(), &params);
/// assert_eq!(page.total_items, 2);
/// assert_eq!(page.visible[0].text("name"), "Alice");
/// ```
pub fn compute_page<'a>(records: &'a [Record], specs: &FilterSpecs, params: &ViewParameters) -> PageWindow<&'a Record> {
    let rows = ordered_records(records, specs, params);
    PageWindow {
        total_items: rows.len(),
        page_size: params.page_size,
        current_page: params.page,
        visible: paginate(&rows, params.page, params.page_size).to_vec(),
    }
}
