/// Table controller
///
/// Owns everything one table view needs: the entity configuration, the fetched
/// records, the current `ViewState` and a queue of notifications. The core is
/// synchronous so that an actor can drive it from completed futures; the async
/// methods at the bottom wrap the common request/response flows over a
/// `RecordSource`.
///
/// Writes never refetch on their own. Each successful write returns a
/// `FollowUp` that the caller runs, typically with `follow_up`.

use crate::entity::{ColumnSpec, EntityKind, TableConfig};
use crate::error::{SourceError, ViewError};
use crate::filter::{distinct_values, Choice, FilterSet};
use crate::group::{attach_counts, group_by};
use crate::notify::Notification;
use crate::pagination::PageControls;
use crate::source::{DeleteTarget, JsonMap, RecordSource};
use crate::state::{reduce, Action, ReduceContext, ViewState};
use crate::table::{Record, RecordKey, RecordSet};
use crate::view::{compute_page, SortKey};
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// What the caller must do after a successful write.
#[must_use = "a successful write leaves the table stale until it is refetched"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowUp {
    Refetch,
    RefetchAndClearSelection,
}

/// The kind of write a notification or follow-up refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    Create,
    Update,
    Delete { count: usize },
    Import,
}

impl WriteKind {
    fn describe(&self, entity: EntityKind) -> String {
        match self {
            WriteKind::Create => format!("Added {}", entity),
            WriteKind::Update => format!("Updated {}", entity),
            WriteKind::Delete { count: 1 } => format!("Deleted 1 {}", entity),
            WriteKind::Delete { count } => format!("Deleted {} {}s", count, entity),
            WriteKind::Import => format!("Imported {}s", entity),
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            WriteKind::Create => "add",
            WriteKind::Update => "update",
            WriteKind::Delete { .. } => "delete",
            WriteKind::Import => "import",
        }
    }
}

/// Shown in place of rows when the visible page is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyHint {
    /// Nothing is filtered; the table itself is empty
    NoQuery,
    /// Filters are active and nothing matches
    NoMatches,
    /// Records match but the current page lies past the last one
    PastLastPage,
}

/// Dropdown state of one categorical filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoricalOptions {
    pub field: String,
    pub label: String,
    pub choice: Choice,
    pub options: Vec<String>,
    pub enabled: bool,
}

/// Read-only picture of the view handed to presentation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewSnapshot {
    pub entity: EntityKind,
    pub loading: bool,
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<JsonMap>,
    pub total_records: usize,
    pub total_matching: usize,
    pub pagination: PageControls,
    pub selected: Vec<RecordKey>,
    pub all_selected: bool,
    pub drafts: BTreeMap<String, String>,
    pub filters: FilterSet,
    pub categorical: Vec<CategoricalOptions>,
    pub sort: Option<SortKey>,
    /// Number of records awaiting delete confirmation
    pub pending_delete: Option<usize>,
    pub empty_hint: Option<EmptyHint>,
}

#[derive(Debug)]
pub struct TableController {
    config: TableConfig,
    records: RecordSet,
    state: ViewState,
    notifications: Vec<Notification>,
    latest_ticket: u64,
    loading: bool,
}

impl TableController {
    pub fn new(config: TableConfig) -> Self {
        let state = ViewState::new(config.page_size);
        TableController {
            config,
            records: RecordSet::new(),
            state,
            notifications: Vec::new(),
            latest_ticket: 0,
            loading: false,
        }
    }

    pub fn for_entity(entity: EntityKind) -> Self {
        Self::new(entity.config())
    }

    pub fn entity(&self) -> EntityKind {
        self.config.kind
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn dispatch(&mut self, action: Action) {
        log::debug!("{}: {:?}", self.config.kind, action);
        let ctx = ReduceContext {
            config: &self.config,
            records: self.records.rows(),
        };
        self.state = reduce(&self.state, &ctx, action);
    }

    /// Start a fetch. Only the result carrying the latest ticket is applied.
    pub fn begin_fetch(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.loading = true;
        self.latest_ticket
    }

    /// Apply a fetch result.
    ///
    /// Returns `Ok(false)` when `ticket` was superseded by a later fetch; the
    /// rows are then discarded. A payload that fails validation leaves the
    /// current records in place and queues an error notification.
    pub fn load_rows(&mut self, ticket: u64, rows: Vec<JsonValue>, counts: Vec<JsonValue>) -> Result<bool, ViewError> {
        if ticket != self.latest_ticket {
            log::debug!(
                "{}: discarding fetch {} superseded by {}",
                self.config.kind,
                ticket,
                self.latest_ticket
            );
            return Ok(false);
        }
        self.loading = false;

        let records = match self.build_records(rows, counts) {
            Ok(records) => records,
            Err(err) => {
                log::error!("{}: rejected payload: {}", self.config.kind, err);
                self.notifications.push(Notification::error(
                    format!("Could not load {}s", self.config.kind),
                    err.to_string(),
                ));
                return Err(err);
            }
        };

        log::info!("{}: loaded {} records", self.config.kind, records.len());
        self.records.replace(records);
        self.dispatch(Action::RecordsReplaced);
        Ok(true)
    }

    fn build_records(&self, rows: Vec<JsonValue>, counts: Vec<JsonValue>) -> Result<Vec<Record>, ViewError> {
        let records = self.config.schema.validate_all(&JsonValue::Array(rows))?;
        let Some(grouping) = &self.config.grouping else {
            return Ok(records);
        };
        let grouped = group_by(&records, grouping);
        match (&self.config.count_schema, &self.config.count_field) {
            (Some(schema), Some(field)) => {
                let counts = schema.validate_all(&JsonValue::Array(counts))?;
                Ok(attach_counts(grouped, &counts, field))
            }
            _ => Ok(grouped),
        }
    }

    /// Record a failed fetch. Existing records stay on screen.
    pub fn load_failed(&mut self, ticket: u64, err: &SourceError) {
        if ticket != self.latest_ticket {
            return;
        }
        self.loading = false;
        log::error!("{}: fetch failed: {}", self.config.kind, err);
        self.notifications.push(Notification::error(
            format!("Could not load {}s", self.config.kind),
            err.to_string(),
        ));
    }

    /// Ask for confirmation before deleting `keys`.
    ///
    /// Returns false and queues a warning when `keys` is empty.
    pub fn request_delete(&mut self, keys: Vec<RecordKey>) -> bool {
        if keys.is_empty() {
            self.notifications.push(Notification::warning(
                "Nothing selected",
                format!("Select at least one {} to delete", self.config.kind),
            ));
            return false;
        }
        self.dispatch(Action::RequestDelete { keys });
        true
    }

    pub fn request_delete_selected(&mut self) -> bool {
        let keys = self.state.selection.keys();
        self.request_delete(keys)
    }

    pub fn cancel_delete(&mut self) {
        self.dispatch(Action::CancelDelete);
    }

    /// Take the confirmed delete target, clearing the pending prompt.
    pub fn take_pending_delete(&mut self) -> Result<DeleteTarget, ViewError> {
        let keys = self.state.pending_delete.clone().ok_or(ViewError::NothingPending)?;
        self.dispatch(Action::CancelDelete);
        Ok(DeleteTarget::from_keys(keys))
    }

    pub fn write_succeeded(&mut self, kind: WriteKind) -> FollowUp {
        log::info!("{}: {} succeeded", self.config.kind, kind.verb());
        self.notifications
            .push(Notification::success("Success", kind.describe(self.config.kind)));
        match kind {
            WriteKind::Delete { count } if count > 1 => FollowUp::RefetchAndClearSelection,
            _ => FollowUp::Refetch,
        }
    }

    pub fn write_failed(&mut self, kind: WriteKind, err: &SourceError) {
        log::error!("{}: {} failed: {}", self.config.kind, kind.verb(), err);
        self.notifications.push(Notification::error(
            format!("Could not {} {}", kind.verb(), self.config.kind),
            err.to_string(),
        ));
    }

    /// Apply the local half of a follow-up. The caller still refetches.
    pub fn prepare_follow_up(&mut self, follow_up: FollowUp) {
        if follow_up == FollowUp::RefetchAndClearSelection {
            self.dispatch(Action::ClearSelection);
        }
    }

    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn snapshot(&self) -> ViewSnapshot {
        let rows = self.records.rows();
        let params = self.state.params();
        let page = compute_page(rows, &self.config.filters, &params);
        let pagination = page.controls();
        let visible_keys: Vec<&RecordKey> = page.visible.iter().map(|r| r.key()).collect();
        let all_selected = self.state.selection.all_selected(visible_keys.iter().copied());

        let ctx = ReduceContext {
            config: &self.config,
            records: rows,
        };
        let categorical = self
            .config
            .filters
            .categorical
            .iter()
            .map(|spec| {
                let options = match &spec.parent {
                    Some(_) => self.state.child_options.get(&spec.field).cloned().unwrap_or_default(),
                    None => distinct_values(rows, &spec.field),
                };
                CategoricalOptions {
                    field: spec.field.clone(),
                    label: spec.label.clone(),
                    choice: self.state.filters.choice(&spec.field),
                    options,
                    enabled: self.state.is_enabled(&ctx, &spec.field),
                }
            })
            .collect();

        let empty_hint = if !page.visible.is_empty() {
            None
        } else if page.total_items > 0 {
            Some(EmptyHint::PastLastPage)
        } else if self.state.filters.is_empty() {
            Some(EmptyHint::NoQuery)
        } else {
            Some(EmptyHint::NoMatches)
        };

        ViewSnapshot {
            entity: self.config.kind,
            loading: self.loading,
            columns: self.config.columns.clone(),
            rows: page.visible.iter().map(|r| self.display_row(r)).collect(),
            total_records: rows.len(),
            total_matching: page.total_items,
            pagination,
            selected: self.state.selection.keys(),
            all_selected,
            drafts: self.state.drafts.clone(),
            filters: self.state.filters.clone(),
            categorical,
            sort: self.state.sort.clone(),
            pending_delete: self.state.pending_delete.as_ref().map(Vec::len),
            empty_hint,
        }
    }

    /// Record as JSON, plus `<list>_display` text for each grouped list.
    fn display_row(&self, record: &Record) -> JsonMap {
        let mut row = record.to_json();
        if let Some(grouping) = &self.config.grouping {
            for nested in &grouping.nested {
                if let Some(list) = record.get(&nested.name) {
                    row.insert(
                        format!("{}_display", nested.name),
                        JsonValue::String(nested.display_text(list)),
                    );
                }
            }
        }
        row
    }
}

/// Fetch the rows of `entity`, plus member counts when the entity has them.
pub async fn fetch_rows(
    source: &dyn RecordSource,
    entity: EntityKind,
) -> Result<(Vec<JsonValue>, Vec<JsonValue>), SourceError> {
    let rows = source.fetch_all(entity).await?;
    let counts = match entity.endpoints().counts {
        Some(_) => source.fetch_member_counts().await?,
        None => Vec::new(),
    };
    Ok((rows, counts))
}

impl TableController {
    pub async fn refresh(&mut self, source: &dyn RecordSource) -> Result<(), ViewError> {
        let ticket = self.begin_fetch();
        match fetch_rows(source, self.entity()).await {
            Ok((rows, counts)) => self.load_rows(ticket, rows, counts).map(|_| ()),
            Err(err) => {
                self.load_failed(ticket, &err);
                Err(err.into())
            }
        }
    }

    pub async fn create(&mut self, source: &dyn RecordSource, fields: &JsonMap) -> Result<FollowUp, ViewError> {
        let result = source.create(self.entity(), fields).await;
        self.finish_write(WriteKind::Create, result)
    }

    pub async fn update(
        &mut self,
        source: &dyn RecordSource,
        key: &RecordKey,
        fields: &JsonMap,
    ) -> Result<FollowUp, ViewError> {
        let result = source.update(self.entity(), key, fields).await;
        self.finish_write(WriteKind::Update, result)
    }

    /// Delete the pending target after the user confirmed.
    pub async fn confirm_delete(&mut self, source: &dyn RecordSource) -> Result<FollowUp, ViewError> {
        let target = self.take_pending_delete()?;
        let result = source.delete(self.entity(), &target).await;
        self.finish_write(WriteKind::Delete { count: target.len() }, result)
    }

    pub async fn import(
        &mut self,
        source: &dyn RecordSource,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<FollowUp, ViewError> {
        let result = source.bulk_import(self.entity(), file_name, bytes).await;
        self.finish_write(WriteKind::Import, result)
    }

    pub async fn follow_up(&mut self, source: &dyn RecordSource, follow_up: FollowUp) -> Result<(), ViewError> {
        self.prepare_follow_up(follow_up);
        self.refresh(source).await
    }

    fn finish_write(&mut self, kind: WriteKind, result: Result<(), SourceError>) -> Result<FollowUp, ViewError> {
        match result {
            Ok(()) => Ok(self.write_succeeded(kind)),
            Err(err) => {
                self.write_failed(kind, &err);
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Level;
    use crate::source::MemorySource;
    use serde_json::json;

    fn student_rows(n: i64) -> Vec<JsonValue> {
        (1..=n)
            .map(|i| {
                json!({
                    "student_id": i,
                    "card_code": format!("{:013}", i),
                    "first_name": format!("First{}", i),
                    "last_name": format!("Last{}", i),
                    "class_name": if i % 2 == 0 { "M1" } else { "M2" },
                    "room_name": "1",
                })
            })
            .collect()
    }

    fn club_rows() -> Vec<JsonValue> {
        vec![
            json!({"club_id": 1, "club_name": "Chess", "teacher_id": 7, "first_name": "A", "last_name": "B",
                   "class_id": 1, "class_name": "M1", "open_to_receive": 10, "number_of_member": 3}),
            json!({"club_id": 1, "club_name": "Chess", "teacher_id": 7, "first_name": "A", "last_name": "B",
                   "class_id": 2, "class_name": "M2", "open_to_receive": 10, "number_of_member": 3}),
            json!({"club_id": 1, "club_name": "Chess", "teacher_id": 8, "first_name": "C", "last_name": "D",
                   "class_id": 1, "class_name": "M1", "open_to_receive": 10, "number_of_member": 3}),
            json!({"club_id": 2, "club_name": "Art", "teacher_id": null, "first_name": null, "last_name": null,
                   "class_id": null, "class_name": null, "open_to_receive": null, "number_of_member": null}),
        ]
    }

    #[tokio::test]
    async fn test_refresh_loads_and_paginates() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(23));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.total_records, 23);
        assert_eq!(snapshot.rows.len(), 10);
        assert_eq!(snapshot.pagination.total_pages, 3);
        assert_eq!(snapshot.pagination.buttons, vec![1, 2, 3]);
        assert!(!snapshot.pagination.has_previous);
        assert!(snapshot.pagination.has_next);
        assert!(!snapshot.loading);
        assert_eq!(snapshot.empty_hint, None);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_rows_and_notifies() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(4));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        source.fail_requests(true);
        assert!(controller.refresh(&source).await.is_err());
        assert_eq!(controller.records().len(), 4);

        let notes = controller.take_notifications();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].level, Level::Error);
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_payload_keeps_rows() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(2));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();
        let generation = controller.records().generation();

        source.set_rows(EntityKind::Student, vec![json!({"student_id": "x"})]);
        let result = controller.refresh(&source).await;
        assert!(matches!(result, Err(ViewError::Schema(_))));
        assert_eq!(controller.records().generation(), generation);
        assert_eq!(controller.take_notifications()[0].level, Level::Error);
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut controller = TableController::for_entity(EntityKind::Student);
        let first = controller.begin_fetch();
        let second = controller.begin_fetch();

        assert!(controller.load_rows(second, student_rows(3), Vec::new()).unwrap());
        assert!(!controller.load_rows(first, student_rows(8), Vec::new()).unwrap());
        assert_eq!(controller.records().len(), 3);

        controller.load_failed(first, &SourceError::Unavailable("late".to_string()));
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_text_filter_and_empty_hints() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(12));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        controller.dispatch(Action::SetTextFilter {
            field: "name".to_string(),
            value: "first1".to_string(),
        });
        assert_eq!(controller.snapshot().total_matching, 12);

        controller.dispatch(Action::ConfirmFilters);
        // First1, First10, First11, First12
        assert_eq!(controller.snapshot().total_matching, 4);

        controller.dispatch(Action::SetTextFilter {
            field: "name".to_string(),
            value: "nobody".to_string(),
        });
        controller.dispatch(Action::ConfirmFilters);
        assert_eq!(controller.snapshot().empty_hint, Some(EmptyHint::NoMatches));

        let empty = TableController::for_entity(EntityKind::Teacher);
        assert_eq!(empty.snapshot().empty_hint, Some(EmptyHint::NoQuery));
    }

    #[tokio::test]
    async fn test_categorical_options_in_snapshot() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(6));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.categorical[0].field, "class_name");
        assert_eq!(snapshot.categorical[0].options, vec!["M2", "M1"]);
        assert!(!snapshot.categorical[1].enabled);
        assert!(snapshot.categorical[1].options.is_empty());

        controller.dispatch(Action::SetCategoricalFilter {
            field: "class_name".to_string(),
            choice: Choice::Exact("M1".to_string()),
        });
        let snapshot = controller.snapshot();
        assert!(snapshot.categorical[1].enabled);
        assert_eq!(snapshot.categorical[1].options, vec!["1"]);
        assert_eq!(snapshot.total_matching, 3);
    }

    #[tokio::test]
    async fn test_clubs_are_grouped_with_counts() {
        let source = MemorySource::with_rows(EntityKind::Club, club_rows());
        source.set_member_counts(vec![json!({"club_id": 1, "student_count": 12})]);
        let mut controller = TableController::for_entity(EntityKind::Club);
        controller.refresh(&source).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.total_records, 2);
        let chess = &snapshot.rows[0];
        assert_eq!(chess["club_name"], json!("Chess"));
        assert_eq!(chess["teachers_display"], json!("A B, C D"));
        assert_eq!(chess["classes_display"], json!("M1, M2"));
        assert_eq!(chess["student_count"], json!(12));

        let art = &snapshot.rows[1];
        assert_eq!(art["teachers_display"], json!(""));
        assert_eq!(art["student_count"], json!(0));
        assert_eq!(source.calls(), vec!["fetch club", "fetch counts"]);
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(5));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        assert!(!controller.request_delete_selected());
        assert_eq!(controller.take_notifications()[0].level, Level::Warning);
        assert!(matches!(
            controller.confirm_delete(&source).await,
            Err(ViewError::NothingPending)
        ));

        assert!(controller.request_delete(vec![RecordKey::Int(2)]));
        assert_eq!(controller.snapshot().pending_delete, Some(1));
        controller.cancel_delete();
        assert_eq!(controller.snapshot().pending_delete, None);
        assert_eq!(source.rows(EntityKind::Student).len(), 5);
        assert!(controller.take_notifications().is_empty());
    }

    #[tokio::test]
    async fn test_bulk_delete_clears_selection() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(5));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        controller.dispatch(Action::ToggleSelect { key: RecordKey::Int(1), checked: true });
        controller.dispatch(Action::ToggleSelect { key: RecordKey::Int(4), checked: true });
        assert!(controller.request_delete_selected());

        let follow_up = controller.confirm_delete(&source).await.unwrap();
        assert_eq!(follow_up, FollowUp::RefetchAndClearSelection);
        assert_eq!(controller.records().len(), 5);

        controller.follow_up(&source, follow_up).await.unwrap();
        assert_eq!(controller.records().len(), 3);
        assert!(controller.state().selection.is_empty());
        assert_eq!(controller.take_notifications()[0].text, "Deleted 2 students");
    }

    #[tokio::test]
    async fn test_single_delete_prunes_selection_on_reload() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(5));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        controller.dispatch(Action::ToggleSelect { key: RecordKey::Int(3), checked: true });
        controller.dispatch(Action::ToggleSelect { key: RecordKey::Int(5), checked: true });
        controller.request_delete(vec![RecordKey::Int(3)]);
        let follow_up = controller.confirm_delete(&source).await.unwrap();
        assert_eq!(follow_up, FollowUp::Refetch);

        controller.follow_up(&source, follow_up).await.unwrap();
        assert_eq!(controller.state().selection.keys(), vec![RecordKey::Int(5)]);
        assert_eq!(source.calls()[1], "delete student 3");
    }

    #[tokio::test]
    async fn test_failed_write_notifies_without_follow_up() {
        let source = MemorySource::with_rows(EntityKind::Teacher, Vec::new());
        let mut controller = TableController::for_entity(EntityKind::Teacher);

        let result = controller.update(&source, &RecordKey::Int(9), &JsonMap::new()).await;
        assert!(matches!(result, Err(ViewError::Source(SourceError::Status { status: 404, .. }))));
        let notes = controller.take_notifications();
        assert_eq!(notes[0].level, Level::Error);
        assert_eq!(notes[0].title, "Could not update teacher");
    }

    #[tokio::test]
    async fn test_create_then_refetch() {
        let source = MemorySource::new();
        let mut controller = TableController::for_entity(EntityKind::Teacher);
        let mut fields = JsonMap::new();
        fields.insert("teacher_id".to_string(), json!(1));
        fields.insert("first_name".to_string(), json!("Anong"));
        fields.insert("last_name".to_string(), json!("Dee"));

        let follow_up = controller.create(&source, &fields).await.unwrap();
        assert!(controller.records().is_empty());
        controller.follow_up(&source, follow_up).await.unwrap();
        assert_eq!(controller.records().len(), 1);
        assert_eq!(controller.take_notifications()[0].level, Level::Success);
    }

    #[tokio::test]
    async fn test_import_rows() {
        let source = MemorySource::new();
        let mut controller = TableController::for_entity(EntityKind::Student);
        let file = serde_json::to_vec(&student_rows(3)).unwrap();

        let follow_up = controller.import(&source, "students.json", file).await.unwrap();
        controller.follow_up(&source, follow_up).await.unwrap();
        assert_eq!(controller.snapshot().total_records, 3);
    }

    #[tokio::test]
    async fn test_emptied_last_page_is_not_reported_as_empty_table() {
        let source = MemorySource::with_rows(EntityKind::Student, student_rows(12));
        let mut controller = TableController::for_entity(EntityKind::Student);
        controller.refresh(&source).await.unwrap();

        controller.dispatch(Action::NextPage);
        controller.dispatch(Action::ToggleSelectAll { checked: true });
        assert!(controller.request_delete_selected());
        let follow_up = controller.confirm_delete(&source).await.unwrap();
        controller.follow_up(&source, follow_up).await.unwrap();

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.total_records, 10);
        assert_eq!(snapshot.pagination.current_page, 2);
        assert!(snapshot.rows.is_empty());
        assert_eq!(snapshot.empty_hint, Some(EmptyHint::PastLastPage));
        assert_eq!(
            serde_json::to_value(snapshot.empty_hint).unwrap(),
            json!("past_last_page")
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let controller = TableController::for_entity(EntityKind::Club);
        let value = serde_json::to_value(controller.snapshot()).unwrap();
        assert_eq!(value["entity"], json!("club"));
        assert_eq!(value["empty_hint"], json!("no_query"));
        assert_eq!(value["pagination"]["total_pages"], json!(0));
    }
}
