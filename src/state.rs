/// View state and reducer
///
/// All user-controlled view parameters live in one `ViewState` value. Each
/// user action produces a new state through `reduce`; nothing else mutates it.
/// The reducer reads (but never changes) the current records so that actions
/// such as "select all" or "next page" can look at what is on screen.

use crate::entity::TableConfig;
use crate::filter::{child_options, Choice, FilterSet};
use crate::pagination::total_pages;
use crate::selection::Selection;
use crate::table::{Record, RecordKey};
use crate::view::{compute_page, ordered_records, SortKey, ViewParameters};
use std::collections::{BTreeMap, HashSet};

/// Read-only inputs the reducer may consult.
#[derive(Debug, Clone, Copy)]
pub struct ReduceContext<'a> {
    pub config: &'a TableConfig,
    pub records: &'a [Record],
}

/// User actions on a table view.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Update in-progress text input; not applied until confirmed
    SetTextFilter { field: String, value: String },
    /// Apply all in-progress text inputs
    ConfirmFilters,
    SetCategoricalFilter { field: String, choice: Choice },
    SetSort { column: String },
    GotoPage { page: usize },
    PreviousPage,
    NextPage,
    SetPageSize { page_size: usize },
    ToggleSelect { key: RecordKey, checked: bool },
    ToggleSelectAll { checked: bool },
    RequestDelete { keys: Vec<RecordKey> },
    CancelDelete,
    ClearSelection,
    /// The record collection was replaced by a fresh fetch
    RecordsReplaced,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    /// In-progress text input, keyed by text filter name
    pub drafts: BTreeMap<String, String>,
    /// Confirmed filters
    pub filters: FilterSet,
    /// Valid values of nested categorical filters, keyed by child field
    pub child_options: BTreeMap<String, Vec<String>>,
    pub sort: Option<SortKey>,
    pub page: usize,
    pub page_size: usize,
    pub selection: Selection,
    /// Keys awaiting delete confirmation
    pub pending_delete: Option<Vec<RecordKey>>,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        ViewState {
            drafts: BTreeMap::new(),
            filters: FilterSet::default(),
            child_options: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
            selection: Selection::new(),
            pending_delete: None,
        }
    }

    pub fn params(&self) -> ViewParameters {
        ViewParameters {
            filters: self.filters.clone(),
            sort: self.sort.clone(),
            page: self.page,
            page_size: self.page_size,
        }
    }

    /// Keys of the records on the current page.
    pub fn visible_keys(&self, ctx: &ReduceContext<'_>) -> Vec<RecordKey> {
        compute_page(ctx.records, &ctx.config.filters, &self.params())
            .visible
            .into_iter()
            .map(|r| r.key().clone())
            .collect()
    }

    pub fn total_pages(&self, ctx: &ReduceContext<'_>) -> usize {
        let filtered = ordered_records(ctx.records, &ctx.config.filters, &self.params()).len();
        total_pages(filtered, self.page_size)
    }

    /// A nested categorical filter is enabled only once its parent has a value.
    pub fn is_enabled(&self, ctx: &ReduceContext<'_>, field: &str) -> bool {
        match ctx
            .config
            .filters
            .categorical_filter(field)
            .and_then(|s| s.parent.as_ref())
        {
            Some(parent) => !self.filters.choice(parent).is_any(),
            None => true,
        }
    }

    fn refresh_child_options(&mut self, ctx: &ReduceContext<'_>, parent: &str) {
        let parent_choice = self.filters.choice(parent);
        for child in ctx.config.filters.children_of(parent) {
            let options = child_options(ctx.records, parent, &parent_choice, &child.field);
            self.child_options.insert(child.field.clone(), options);
        }
    }
}

/// Compute the state that follows `action`.
pub fn reduce(state: &ViewState, ctx: &ReduceContext<'_>, action: Action) -> ViewState {
    let mut next = state.clone();
    let specs = &ctx.config.filters;

    match action {
        Action::SetTextFilter { field, value } => {
            if specs.text_filter(&field).is_none() {
                log::warn!("ignoring unknown text filter '{}' on {}", field, ctx.config.kind);
                return next;
            }
            next.drafts.insert(field, value);
        }

        Action::ConfirmFilters => {
            next.filters.text = specs
                .text
                .iter()
                .map(|spec| {
                    let query = next.drafts.get(&spec.name).cloned().unwrap_or_default();
                    (spec.name.clone(), query)
                })
                .collect();
            next.page = 1;
        }

        Action::SetCategoricalFilter { field, choice } => {
            if specs.categorical_filter(&field).is_none() {
                log::warn!("ignoring unknown categorical filter '{}' on {}", field, ctx.config.kind);
                return next;
            }
            if !state.is_enabled(ctx, &field) {
                log::debug!("categorical filter '{}' is disabled until its parent is set", field);
                return next;
            }
            next.filters.categorical.insert(field.clone(), choice);
            let children: Vec<String> = specs.children_of(&field).map(|c| c.field.clone()).collect();
            for child in children {
                next.filters.categorical.insert(child, Choice::Any);
            }
            next.refresh_child_options(ctx, &field);
            next.page = 1;
        }

        Action::SetSort { column } => {
            if !ctx.config.is_sortable(&column) {
                log::warn!("column '{}' of {} is not sortable", column, ctx.config.kind);
                return next;
            }
            next.sort = Some(SortKey::toggle(state.sort.as_ref(), &column));
        }

        Action::GotoPage { page } => {
            if page >= 1 {
                next.page = page;
            }
        }

        Action::PreviousPage => {
            if state.page > 1 {
                next.page = state.page - 1;
            }
        }

        Action::NextPage => {
            if state.page < state.total_pages(ctx) {
                next.page = state.page + 1;
            }
        }

        Action::SetPageSize { page_size } => {
            if page_size >= 1 {
                next.page_size = page_size;
                next.page = 1;
            }
        }

        Action::ToggleSelect { key, checked } => {
            next.selection.toggle(key, checked);
        }

        Action::ToggleSelectAll { checked } => {
            let visible = state.visible_keys(ctx);
            next.selection.toggle_all(&visible, checked);
        }

        Action::RequestDelete { keys } => {
            if !keys.is_empty() {
                next.pending_delete = Some(keys);
            }
        }

        Action::CancelDelete => {
            next.pending_delete = None;
        }

        Action::ClearSelection => {
            next.selection.clear();
        }

        Action::RecordsReplaced => {
            let existing: HashSet<&RecordKey> = ctx.records.iter().map(Record::key).collect();
            next.selection.retain(|k| existing.contains(k));
            let parents: Vec<String> = specs
                .categorical
                .iter()
                .filter_map(|s| s.parent.clone())
                .collect();
            for parent in parents {
                next.refresh_child_options(ctx, &parent);
            }
        }
    }

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn students(n: i64) -> Vec<Record> {
        let rows: Vec<serde_json::Value> = (1..=n)
            .map(|i| {
                json!({
                    "student_id": i,
                    "card_code": format!("11037{:05}", i),
                    "first_name": if i % 3 == 0 { "Somchai" } else { "Malee" },
                    "last_name": format!("Family{}", i),
                    "class_name": if i <= n / 2 { "M1" } else { "M2" },
                    "room_name": format!("{}", i % 3 + 1),
                })
            })
            .collect();
        TableConfig::students()
            .schema
            .validate_all(&serde_json::Value::Array(rows))
            .unwrap()
    }

    fn run(state: &ViewState, config: &TableConfig, records: &[Record], actions: Vec<Action>) -> ViewState {
        let ctx = ReduceContext { config, records };
        actions.into_iter().fold(state.clone(), |s, a| reduce(&s, &ctx, a))
    }

    #[test]
    fn test_text_filters_apply_only_when_confirmed() {
        let config = TableConfig::students();
        let records = students(30);
        let state = ViewState::new(10);

        let typed = run(
            &state,
            &config,
            &records,
            vec![Action::SetTextFilter {
                field: "name".to_string(),
                value: "somchai".to_string(),
            }],
        );
        assert_eq!(typed.filters, FilterSet::default());
        assert_eq!(typed.drafts["name"], "somchai");

        let confirmed = run(&typed, &config, &records, vec![Action::ConfirmFilters]);
        assert_eq!(confirmed.filters.text_query("name"), "somchai");
        assert_eq!(confirmed.filters.text_query("card_code"), "");
        let ctx = ReduceContext { config: &config, records: &records };
        assert_eq!(confirmed.total_pages(&ctx), 1);
    }

    #[test]
    fn test_confirm_resets_page() {
        let config = TableConfig::students();
        let records = students(30);
        let state = run(
            &ViewState::new(10),
            &config,
            &records,
            vec![Action::GotoPage { page: 3 }, Action::ConfirmFilters],
        );
        assert_eq!(state.page, 1);
    }

    #[test]
    fn test_unknown_text_filter_is_ignored() {
        let config = TableConfig::teachers();
        let state = ViewState::new(10);
        let next = run(
            &state,
            &config,
            &[],
            vec![Action::SetTextFilter {
                field: "shoe_size".to_string(),
                value: "9".to_string(),
            }],
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_hierarchical_categorical_filters() {
        let config = TableConfig::students();
        let records = students(12);
        let state = ViewState::new(10);

        // Room is disabled until a class is chosen
        let blocked = run(
            &state,
            &config,
            &records,
            vec![Action::SetCategoricalFilter {
                field: "room_name".to_string(),
                choice: Choice::Exact("1".to_string()),
            }],
        );
        assert_eq!(blocked.filters.choice("room_name"), Choice::Any);

        let with_class = run(
            &state,
            &config,
            &records,
            vec![
                Action::GotoPage { page: 2 },
                Action::SetCategoricalFilter {
                    field: "class_name".to_string(),
                    choice: Choice::Exact("M1".to_string()),
                },
                Action::SetCategoricalFilter {
                    field: "room_name".to_string(),
                    choice: Choice::Exact("2".to_string()),
                },
            ],
        );
        assert_eq!(with_class.page, 1);
        assert_eq!(with_class.child_options["room_name"], vec!["2", "3", "1"]);
        let ctx = ReduceContext { config: &config, records: &records };
        // students 1..=6 in M1, room = i % 3 + 1 == 2 for i in {1, 4}
        assert_eq!(with_class.visible_keys(&ctx), vec![RecordKey::Int(1), RecordKey::Int(4)]);

        // Clearing the parent resets and disables the child
        let cleared = run(
            &with_class,
            &config,
            &records,
            vec![Action::SetCategoricalFilter {
                field: "class_name".to_string(),
                choice: Choice::Any,
            }],
        );
        assert_eq!(cleared.filters.choice("room_name"), Choice::Any);
        assert!(cleared.child_options["room_name"].is_empty());
        assert!(!cleared.is_enabled(&ctx, "room_name"));
    }

    #[test]
    fn test_sort_toggles_and_rejects_unsortable() {
        let config = TableConfig::students();
        let state = run(
            &ViewState::new(10),
            &config,
            &[],
            vec![
                Action::SetSort { column: "first_name".to_string() },
                Action::SetSort { column: "first_name".to_string() },
                Action::SetSort { column: "email".to_string() },
            ],
        );
        assert_eq!(state.sort, Some(SortKey::descending("first_name")));
    }

    #[test]
    fn test_previous_and_next_stop_at_edges() {
        let config = TableConfig::students();
        let records = students(25);
        let state = run(&ViewState::new(10), &config, &records, vec![Action::PreviousPage]);
        assert_eq!(state.page, 1);

        let state = run(
            &state,
            &config,
            &records,
            vec![Action::NextPage, Action::NextPage, Action::NextPage],
        );
        assert_eq!(state.page, 3);

        let state = run(&state, &config, &records, vec![Action::GotoPage { page: 0 }]);
        assert_eq!(state.page, 3);
    }

    #[test]
    fn test_goto_past_the_end_shows_empty_page() {
        let config = TableConfig::students();
        let records = students(5);
        let state = run(&ViewState::new(10), &config, &records, vec![Action::GotoPage { page: 4 }]);
        let ctx = ReduceContext { config: &config, records: &records };
        assert_eq!(state.page, 4);
        assert!(state.visible_keys(&ctx).is_empty());
    }

    #[test]
    fn test_select_all_per_page() {
        let config = TableConfig::students();
        let records = students(30);
        let ctx = ReduceContext { config: &config, records: &records };

        let page1 = run(&ViewState::new(10), &config, &records, vec![Action::ToggleSelectAll { checked: true }]);
        assert_eq!(page1.selection.len(), 10);
        assert!(page1.selection.all_selected(&page1.visible_keys(&ctx)));

        let page2 = run(
            &page1,
            &config,
            &records,
            vec![Action::NextPage, Action::ToggleSelectAll { checked: true }],
        );
        assert_eq!(page2.selection.len(), 20);
        assert!(page2.selection.all_selected(&page2.visible_keys(&ctx)));

        let back = run(&page2, &config, &records, vec![Action::PreviousPage]);
        assert!(back.selection.all_selected(&back.visible_keys(&ctx)));

        let page3 = run(&page2, &config, &records, vec![Action::NextPage]);
        assert!(!page3.selection.all_selected(&page3.visible_keys(&ctx)));

        let unselected = run(&back, &config, &records, vec![Action::ToggleSelectAll { checked: false }]);
        assert_eq!(unselected.selection.len(), 10);
        assert!(!unselected.selection.contains(&RecordKey::Int(1)));
        assert!(unselected.selection.contains(&RecordKey::Int(11)));
    }

    #[test]
    fn test_request_and_cancel_delete() {
        let config = TableConfig::students();
        let state = run(
            &ViewState::new(10),
            &config,
            &[],
            vec![Action::RequestDelete { keys: Vec::new() }],
        );
        assert_eq!(state.pending_delete, None);

        let state = run(
            &state,
            &config,
            &[],
            vec![Action::RequestDelete { keys: vec![RecordKey::Int(3)] }],
        );
        assert_eq!(state.pending_delete, Some(vec![RecordKey::Int(3)]));

        let state = run(&state, &config, &[], vec![Action::CancelDelete]);
        assert_eq!(state.pending_delete, None);
    }

    #[test]
    fn test_records_replaced_prunes_selection() {
        let config = TableConfig::students();
        let records = students(10);
        let state = run(
            &ViewState::new(10),
            &config,
            &records,
            vec![
                Action::ToggleSelect { key: RecordKey::Int(2), checked: true },
                Action::ToggleSelect { key: RecordKey::Int(9), checked: true },
            ],
        );
        let fewer = students(5);
        let state = run(&state, &config, &fewer, vec![Action::RecordsReplaced]);
        assert_eq!(state.selection.keys(), vec![RecordKey::Int(2)]);
    }
}
