/// Regrouping of denormalised join rows.
///
/// The club listing comes back as one row per club × teacher × class. Before
/// display it is folded into one record per club, with the distinct teachers
/// and classes collected into nested lists.

use crate::column::ColumnValue;
use crate::table::{Record, RecordKey};
use std::collections::{BTreeMap, HashMap, HashSet};

/// How one nested list of a group is built.
#[derive(Debug, Clone)]
pub struct NestedSpec {
    /// Name of the list field on the grouped record
    pub name: String,
    /// Row fields copied into each nested entry
    pub fields: Vec<String>,
    /// Fields whose concatenation identifies an entry within its group
    pub identity: Vec<String>,
    /// Fields joined with a space when rendering one entry for display
    pub display: Vec<String>,
}

impl NestedSpec {
    pub fn new(name: &str, fields: &[&str], identity: &[&str], display: &[&str]) -> Self {
        NestedSpec {
            name: name.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            identity: identity.iter().map(|f| f.to_string()).collect(),
            display: display.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Identity of the nested entry carried by `row`, or None when every
    /// identity field is empty (an outer-join row with nothing to add).
    fn identity_of(&self, row: &Record) -> Option<String> {
        let parts: Vec<String> = self.identity.iter().map(|f| row.text(f)).collect();
        if parts.iter().all(String::is_empty) {
            None
        } else {
            Some(parts.join(" "))
        }
    }

    fn entry_of(&self, row: &Record) -> ColumnValue {
        let entry: BTreeMap<String, ColumnValue> = self
            .fields
            .iter()
            .map(|f| (f.clone(), row.get(f).cloned().unwrap_or(ColumnValue::Null)))
            .collect();
        ColumnValue::Map(entry)
    }

    /// Render a nested list as "A B, C D".
    pub fn display_text(&self, list: &ColumnValue) -> String {
        let items = list.as_list().unwrap_or(&[]);
        join_display(items, |item| {
            let map = item.as_map();
            self.display
                .iter()
                .map(|f| map.and_then(|m| m.get(f)).map(|v| v.to_string()).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(" ")
        })
    }
}

/// How rows fold into grouped records.
#[derive(Debug, Clone)]
pub struct GroupSpec {
    /// Field whose value identifies a group
    pub key: String,
    /// Fields copied from the first row of each group
    pub carried: Vec<String>,
    pub nested: Vec<NestedSpec>,
}

struct Group {
    fields: HashMap<String, ColumnValue>,
    seen: Vec<HashSet<String>>,
    lists: Vec<Vec<ColumnValue>>,
}

/// Fold rows into one record per distinct group key.
///
/// Groups keep the order in which their key first appears. Rows whose group
/// key is missing or not a valid key are skipped.
pub fn group_by(rows: &[Record], spec: &GroupSpec) -> Vec<Record> {
    let mut order: Vec<RecordKey> = Vec::new();
    let mut groups: HashMap<RecordKey, Group> = HashMap::new();

    for row in rows {
        let Some(key) = row.get(&spec.key).and_then(RecordKey::from_value) else {
            log::debug!("skipping row without group key '{}'", spec.key);
            continue;
        };

        let group = groups.entry(key.clone()).or_insert_with(|| {
            order.push(key.clone());
            let mut fields = HashMap::new();
            fields.insert(spec.key.clone(), row.get(&spec.key).cloned().unwrap_or(ColumnValue::Null));
            for name in &spec.carried {
                fields.insert(name.clone(), row.get(name).cloned().unwrap_or(ColumnValue::Null));
            }
            Group {
                fields,
                seen: vec![HashSet::new(); spec.nested.len()],
                lists: vec![Vec::new(); spec.nested.len()],
            }
        });

        for (i, nested) in spec.nested.iter().enumerate() {
            if let Some(identity) = nested.identity_of(row) {
                if group.seen[i].insert(identity) {
                    group.lists[i].push(nested.entry_of(row));
                }
            }
        }
    }

    order
        .into_iter()
        .filter_map(|key| {
            let group = groups.remove(&key)?;
            let mut fields = group.fields;
            for (nested, list) in spec.nested.iter().zip(group.lists) {
                fields.insert(nested.name.clone(), ColumnValue::List(list));
            }
            Some(Record::new(key, fields))
        })
        .collect()
}

/// Copy a count column from `counts` onto grouped records by key.
///
/// Records with no matching count row get 0.
pub fn attach_counts(groups: Vec<Record>, counts: &[Record], count_field: &str) -> Vec<Record> {
    let by_key: HashMap<&RecordKey, &ColumnValue> = counts
        .iter()
        .filter_map(|c| c.get(count_field).map(|v| (c.key(), v)))
        .collect();

    groups
        .into_iter()
        .map(|record| {
            let count = by_key
                .get(record.key())
                .map(|v| (*v).clone())
                .unwrap_or(ColumnValue::Int(0));
            let key = record.key().clone();
            let mut fields = record.fields().clone();
            fields.insert(count_field.to_string(), count);
            Record::new(key, fields)
        })
        .collect()
}

/// Join rendered items with ", " and no trailing separator.
pub fn join_display<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    let mut out = String::new();
    for (i, item) in items.iter().enumerate() {
        out.push_str(&render(item));
        if i != items.len() - 1 {
            out.push_str(", ");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn join_row(club: i64, club_name: &str, teacher: Option<(&str, &str)>, class: Option<&str>) -> Record {
        let mut fields = HashMap::new();
        fields.insert("club_id".to_string(), ColumnValue::Int(club));
        fields.insert("club_name".to_string(), ColumnValue::from(club_name));
        match teacher {
            Some((first, last)) => {
                fields.insert("first_name".to_string(), ColumnValue::from(first));
                fields.insert("last_name".to_string(), ColumnValue::from(last));
            }
            None => {
                fields.insert("first_name".to_string(), ColumnValue::Null);
                fields.insert("last_name".to_string(), ColumnValue::Null);
            }
        }
        fields.insert(
            "class_name".to_string(),
            class.map(ColumnValue::from).unwrap_or(ColumnValue::Null),
        );
        Record::new(RecordKey::Int(club), fields)
    }

    fn spec() -> GroupSpec {
        GroupSpec {
            key: "club_id".to_string(),
            carried: vec!["club_name".to_string()],
            nested: vec![
                NestedSpec::new(
                    "teachers",
                    &["first_name", "last_name"],
                    &["first_name", "last_name"],
                    &["first_name", "last_name"],
                ),
                NestedSpec::new("classes", &["class_name"], &["class_name"], &["class_name"]),
            ],
        }
    }

    #[test]
    fn test_duplicate_teachers_collapse() {
        let rows = vec![
            join_row(1, "Chess", Some(("A", "X")), Some("M1")),
            join_row(1, "Chess", Some(("A", "X")), Some("M2")),
            join_row(1, "Chess", Some(("B", "Y")), Some("M1")),
        ];
        let grouped = group_by(&rows, &spec());
        assert_eq!(grouped.len(), 1);

        let spec = spec();
        let club = &grouped[0];
        assert_eq!(club.text("club_name"), "Chess");
        assert_eq!(spec.nested[0].display_text(club.get("teachers").unwrap()), "A X, B Y");
        assert_eq!(spec.nested[1].display_text(club.get("classes").unwrap()), "M1, M2");
    }

    #[test]
    fn test_groups_keep_first_occurrence_order() {
        let rows = vec![
            join_row(3, "Music", Some(("C", "Z")), Some("M3")),
            join_row(1, "Chess", Some(("A", "X")), Some("M1")),
            join_row(3, "Music", Some(("D", "W")), Some("M3")),
        ];
        let grouped = group_by(&rows, &spec());
        let keys: Vec<&RecordKey> = grouped.iter().map(Record::key).collect();
        assert_eq!(keys, vec![&RecordKey::Int(3), &RecordKey::Int(1)]);
        assert_eq!(grouped[0].get("teachers").unwrap().as_list().unwrap().len(), 2);
        assert_eq!(grouped[0].get("classes").unwrap().as_list().unwrap().len(), 1);
    }

    #[test]
    fn test_outer_join_rows_add_no_empty_entries() {
        let rows = vec![join_row(5, "Robotics", None, None)];
        let grouped = group_by(&rows, &spec());
        assert_eq!(grouped.len(), 1);
        assert!(grouped[0].get("teachers").unwrap().as_list().unwrap().is_empty());
        assert_eq!(spec().nested[0].display_text(grouped[0].get("teachers").unwrap()), "");
    }

    #[test]
    fn test_attach_counts_defaults_to_zero() {
        let rows = vec![
            join_row(1, "Chess", Some(("A", "X")), Some("M1")),
            join_row(2, "Art", Some(("B", "Y")), Some("M1")),
        ];
        let mut count_fields = HashMap::new();
        count_fields.insert("club_id".to_string(), ColumnValue::Int(2));
        count_fields.insert("student_count".to_string(), ColumnValue::Int(17));
        let counts = vec![Record::new(RecordKey::Int(2), count_fields)];

        let grouped = attach_counts(group_by(&rows, &spec()), &counts, "student_count");
        assert_eq!(grouped[0].get("student_count"), Some(&ColumnValue::Int(0)));
        assert_eq!(grouped[1].get("student_count"), Some(&ColumnValue::Int(17)));
    }

    #[test]
    fn test_join_display() {
        assert_eq!(join_display(&["a", "b", "c"], |s| s.to_string()), "a, b, c");
        assert_eq!(join_display(&["only"], |s| s.to_string()), "only");
        assert_eq!(join_display::<&str>(&[], |s| s.to_string()), "");
    }
}
