/// Remote record source
///
/// The server owns all storage. `RecordSource` is the only way the engine
/// reads or writes records: list everything, create, update, delete one or
/// many, and bulk import a spreadsheet. Payloads are plain JSON; the engine
/// validates them against the entity schema after they arrive.

use crate::entity::EntityKind;
use crate::error::SourceError;
use crate::table::RecordKey;
use async_trait::async_trait;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Mutex;

pub type JsonMap = Map<String, JsonValue>;

/// What a delete request targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteTarget {
    One(RecordKey),
    Many(Vec<RecordKey>),
}

impl DeleteTarget {
    pub fn from_keys(mut keys: Vec<RecordKey>) -> Self {
        if keys.len() == 1 {
            DeleteTarget::One(keys.remove(0))
        } else {
            DeleteTarget::Many(keys)
        }
    }

    pub fn len(&self) -> usize {
        match self {
            DeleteTarget::One(_) => 1,
            DeleteTarget::Many(keys) => keys.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &RecordKey) -> bool {
        match self {
            DeleteTarget::One(k) => k == key,
            DeleteTarget::Many(keys) => keys.contains(key),
        }
    }
}

#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Every row of `entity`, in server order.
    async fn fetch_all(&self, entity: EntityKind) -> Result<Vec<JsonValue>, SourceError>;

    /// Per-club member counts merged into grouped club rows.
    async fn fetch_member_counts(&self) -> Result<Vec<JsonValue>, SourceError> {
        Ok(Vec::new())
    }

    async fn create(&self, entity: EntityKind, fields: &JsonMap) -> Result<(), SourceError>;

    async fn update(&self, entity: EntityKind, key: &RecordKey, fields: &JsonMap) -> Result<(), SourceError>;

    async fn delete(&self, entity: EntityKind, target: &DeleteTarget) -> Result<(), SourceError>;

    /// Upload a spreadsheet; parsing happens on the server.
    async fn bulk_import(&self, entity: EntityKind, file_name: &str, bytes: Vec<u8>) -> Result<(), SourceError>;
}

/// In-process record source.
///
/// Used by tests and demos. Rows are stored as JSON exactly as an HTTP
/// server would return them. `bulk_import` expects the file to be a JSON
/// array of rows. `fail_requests(true)` makes every call fail until reset.
#[derive(Debug, Default)]
pub struct MemorySource {
    tables: Mutex<HashMap<EntityKind, Vec<JsonValue>>>,
    counts: Mutex<Vec<JsonValue>>,
    failing: Mutex<bool>,
    calls: Mutex<Vec<String>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rows(entity: EntityKind, rows: Vec<JsonValue>) -> Self {
        let source = Self::new();
        source.set_rows(entity, rows);
        source
    }

    pub fn set_rows(&self, entity: EntityKind, rows: Vec<JsonValue>) {
        self.lock_tables().insert(entity, rows);
    }

    pub fn set_member_counts(&self, counts: Vec<JsonValue>) {
        *self.counts.lock().unwrap_or_else(|e| e.into_inner()) = counts;
    }

    pub fn rows(&self, entity: EntityKind) -> Vec<JsonValue> {
        self.lock_tables().get(&entity).cloned().unwrap_or_default()
    }

    pub fn fail_requests(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(|e| e.into_inner()) = failing;
    }

    /// Operations received so far, e.g. `"delete student 3"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn lock_tables(&self) -> std::sync::MutexGuard<'_, HashMap<EntityKind, Vec<JsonValue>>> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn begin(&self, call: String) -> Result<(), SourceError> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).push(call);
        if *self.failing.lock().unwrap_or_else(|e| e.into_inner()) {
            return Err(SourceError::Unavailable("memory source set to fail".to_string()));
        }
        Ok(())
    }

    fn key_of(entity: EntityKind, row: &JsonValue) -> Option<JsonValue> {
        let config = entity.config();
        row.get(config.schema.key_column()).cloned()
    }
}

#[async_trait]
impl RecordSource for MemorySource {
    async fn fetch_all(&self, entity: EntityKind) -> Result<Vec<JsonValue>, SourceError> {
        self.begin(format!("fetch {}", entity))?;
        Ok(self.rows(entity))
    }

    async fn fetch_member_counts(&self) -> Result<Vec<JsonValue>, SourceError> {
        self.begin("fetch counts".to_string())?;
        Ok(self.counts.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }

    async fn create(&self, entity: EntityKind, fields: &JsonMap) -> Result<(), SourceError> {
        self.begin(format!("create {}", entity))?;
        self.lock_tables()
            .entry(entity)
            .or_default()
            .push(JsonValue::Object(fields.clone()));
        Ok(())
    }

    async fn update(&self, entity: EntityKind, key: &RecordKey, fields: &JsonMap) -> Result<(), SourceError> {
        self.begin(format!("update {} {}", entity, key))?;
        let wanted = key.to_json();
        let mut tables = self.lock_tables();
        let rows = tables.entry(entity).or_default();
        let mut found = false;
        for row in rows.iter_mut() {
            if Self::key_of(entity, row).as_ref() == Some(&wanted) {
                if let JsonValue::Object(existing) = row {
                    for (name, value) in fields {
                        existing.insert(name.clone(), value.clone());
                    }
                }
                found = true;
            }
        }
        if found {
            Ok(())
        } else {
            Err(SourceError::Status {
                status: 404,
                body: format!("{} {} not found", entity, key),
            })
        }
    }

    async fn delete(&self, entity: EntityKind, target: &DeleteTarget) -> Result<(), SourceError> {
        let label = match target {
            DeleteTarget::One(key) => key.to_string(),
            DeleteTarget::Many(keys) => format!("{} rows", keys.len()),
        };
        self.begin(format!("delete {} {}", entity, label))?;
        let mut tables = self.lock_tables();
        if let Some(rows) = tables.get_mut(&entity) {
            rows.retain(|row| {
                let key = Self::key_of(entity, row)
                    .as_ref()
                    .map(crate::column::ColumnValue::from_json)
                    .and_then(|v| RecordKey::from_value(&v));
                !key.map(|k| target.contains(&k)).unwrap_or(false)
            });
        }
        Ok(())
    }

    async fn bulk_import(&self, entity: EntityKind, file_name: &str, bytes: Vec<u8>) -> Result<(), SourceError> {
        self.begin(format!("import {} {}", entity, file_name))?;
        if entity.config().endpoints.import.is_none() {
            return Err(SourceError::Unsupported {
                operation: "bulk import",
                entity: entity.to_string(),
            });
        }
        let rows: Vec<JsonValue> = serde_json::from_slice(&bytes)?;
        self.lock_tables().entry(entity).or_default().extend(rows);
        Ok(())
    }
}
