/// Per-entity table configuration
///
/// Students, teachers and clubs share one engine; what differs between the
/// three tables is captured here: the row schema, which columns are shown and
/// sortable, which filters exist, whether rows need regrouping, and where the
/// REST endpoints live.

use crate::column::ColumnType;
use crate::filter::{CategoricalSpec, FieldMatcher, FilterSpecs, TextFilterSpec};
use crate::group::{GroupSpec, NestedSpec};
use crate::table::Schema;
use crate::view::DEFAULT_PAGE_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Student,
    Teacher,
    Club,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Student, EntityKind::Teacher, EntityKind::Club];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Student => "student",
            EntityKind::Teacher => "teacher",
            EntityKind::Club => "club",
        }
    }

    pub fn config(&self) -> TableConfig {
        match self {
            EntityKind::Student => TableConfig::students(),
            EntityKind::Teacher => TableConfig::teachers(),
            EntityKind::Club => TableConfig::clubs(),
        }
    }

    /// REST endpoints of this entity.
    pub fn endpoints(&self) -> Endpoints {
        match self {
            EntityKind::Student => Endpoints {
                list: "all_students",
                create: "add_student",
                update: "edit_student/{id}",
                delete_one: "delete_student/{id}",
                delete_many: "delete_students",
                delete_many_field: "studentIds",
                import: Some("upload_excel"),
                counts: None,
            },
            EntityKind::Teacher => Endpoints {
                list: "all_teachers",
                create: "add_teacher",
                update: "edit_teacher/{id}",
                delete_one: "delete_teacher/{id}",
                delete_many: "delete_teachers",
                delete_many_field: "teacherIds",
                import: Some("add_teachers_excel"),
                counts: None,
            },
            EntityKind::Club => Endpoints {
                list: "all_clubs",
                create: "add_club",
                update: "edit_club/{id}",
                delete_one: "delete_club/{id}",
                delete_many: "delete_clubs",
                delete_many_field: "clubIds",
                import: None,
                counts: Some("count_students_club"),
            },
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column shown in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnSpec {
    pub field: String,
    pub label: String,
    pub sortable: bool,
}

impl ColumnSpec {
    fn new(field: &str, label: &str, sortable: bool) -> Self {
        ColumnSpec {
            field: field.to_string(),
            label: label.to_string(),
            sortable,
        }
    }
}

/// REST paths, relative to the API base URL. `{id}` is replaced by the key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub list: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete_one: &'static str,
    pub delete_many: &'static str,
    /// Body field carrying the key array for `delete_many`
    pub delete_many_field: &'static str,
    pub import: Option<&'static str>,
    /// Extra listing merged into grouped rows (member counts)
    pub counts: Option<&'static str>,
}

impl Endpoints {
    pub fn update_path(&self, key: &str) -> String {
        self.update.replace("{id}", key)
    }

    pub fn delete_one_path(&self, key: &str) -> String {
        self.delete_one.replace("{id}", key)
    }
}

/// Everything the engine needs to know about one entity table.
#[derive(Debug, Clone)]
pub struct TableConfig {
    pub kind: EntityKind,
    /// Schema of the rows as the record source returns them
    pub schema: Schema,
    pub columns: Vec<ColumnSpec>,
    pub filters: FilterSpecs,
    pub page_size: usize,
    /// Set when source rows are a join that must be folded per entity
    pub grouping: Option<GroupSpec>,
    /// Schema of the count rows merged into grouped records
    pub count_schema: Option<Schema>,
    pub count_field: Option<String>,
    pub endpoints: Endpoints,
}

impl TableConfig {
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn is_sortable(&self, field: &str) -> bool {
        self.columns.iter().any(|c| c.field == field && c.sortable)
    }

    pub fn students() -> Self {
        TableConfig {
            kind: EntityKind::Student,
            schema: Schema::new(
                "student_id",
                vec![
                    ("student_id".to_string(), ColumnType::Int, false),
                    ("card_code".to_string(), ColumnType::String, false),
                    ("first_name".to_string(), ColumnType::String, false),
                    ("last_name".to_string(), ColumnType::String, false),
                    ("phone_number".to_string(), ColumnType::String, true),
                    ("email".to_string(), ColumnType::String, true),
                    ("class_name".to_string(), ColumnType::String, true),
                    ("room_name".to_string(), ColumnType::String, true),
                ],
            ),
            columns: vec![
                ColumnSpec::new("student_id", "Student ID", true),
                ColumnSpec::new("card_code", "National ID", true),
                ColumnSpec::new("first_name", "First name", true),
                ColumnSpec::new("last_name", "Last name", true),
                ColumnSpec::new("phone_number", "Phone", false),
                ColumnSpec::new("email", "Email", false),
                ColumnSpec::new("class_name", "Class", true),
                ColumnSpec::new("room_name", "Room", true),
            ],
            filters: FilterSpecs {
                text: vec![
                    TextFilterSpec::new(
                        "name",
                        "Name",
                        vec![
                            FieldMatcher::field("first_name"),
                            FieldMatcher::field("last_name"),
                            FieldMatcher::joined(&["first_name", "last_name"]),
                        ],
                    ),
                    TextFilterSpec::new("student_id", "Student ID", vec![FieldMatcher::field("student_id")]),
                    TextFilterSpec::new("card_code", "National ID", vec![FieldMatcher::field("card_code")]),
                ],
                categorical: vec![
                    CategoricalSpec::new("class_name", "Class"),
                    CategoricalSpec::new("room_name", "Room").child_of("class_name"),
                ],
            },
            page_size: DEFAULT_PAGE_SIZE,
            grouping: None,
            count_schema: None,
            count_field: None,
            endpoints: EntityKind::Student.endpoints(),
        }
    }

    pub fn teachers() -> Self {
        TableConfig {
            kind: EntityKind::Teacher,
            schema: Schema::new(
                "teacher_id",
                vec![
                    ("teacher_id".to_string(), ColumnType::Int, false),
                    ("first_name".to_string(), ColumnType::String, false),
                    ("last_name".to_string(), ColumnType::String, false),
                    ("email".to_string(), ColumnType::String, true),
                    ("phone_number".to_string(), ColumnType::String, true),
                    ("role_name".to_string(), ColumnType::String, true),
                ],
            ),
            columns: vec![
                ColumnSpec::new("first_name", "First name", true),
                ColumnSpec::new("last_name", "Last name", true),
                ColumnSpec::new("email", "Email", true),
                ColumnSpec::new("phone_number", "Phone", false),
                ColumnSpec::new("role_name", "Role", true),
            ],
            filters: FilterSpecs {
                text: vec![TextFilterSpec::new(
                    "name",
                    "Full name",
                    vec![FieldMatcher::joined(&["first_name", "last_name"])],
                )],
                categorical: Vec::new(),
            },
            page_size: DEFAULT_PAGE_SIZE,
            grouping: None,
            count_schema: None,
            count_field: None,
            endpoints: EntityKind::Teacher.endpoints(),
        }
    }

    pub fn clubs() -> Self {
        TableConfig {
            kind: EntityKind::Club,
            schema: Schema::new(
                "club_id",
                vec![
                    ("club_id".to_string(), ColumnType::Int, false),
                    ("club_name".to_string(), ColumnType::String, false),
                    ("teacher_id".to_string(), ColumnType::Int, true),
                    ("first_name".to_string(), ColumnType::String, true),
                    ("last_name".to_string(), ColumnType::String, true),
                    ("class_id".to_string(), ColumnType::Int, true),
                    ("class_name".to_string(), ColumnType::String, true),
                    ("open_to_receive".to_string(), ColumnType::Int, true),
                    ("number_of_member".to_string(), ColumnType::Int, true),
                ],
            ),
            columns: vec![
                ColumnSpec::new("club_name", "Club", true),
                ColumnSpec::new("teachers", "Advisors", false),
                ColumnSpec::new("classes", "Open to classes", false),
                ColumnSpec::new("student_count", "Members", true),
            ],
            filters: FilterSpecs {
                text: vec![TextFilterSpec::new("name", "Club name", vec![FieldMatcher::field("club_name")])],
                categorical: Vec::new(),
            },
            page_size: DEFAULT_PAGE_SIZE,
            grouping: Some(GroupSpec {
                key: "club_id".to_string(),
                carried: vec!["club_name".to_string()],
                nested: vec![
                    NestedSpec::new(
                        "teachers",
                        &["teacher_id", "first_name", "last_name"],
                        &["first_name", "last_name"],
                        &["first_name", "last_name"],
                    ),
                    NestedSpec::new(
                        "classes",
                        &["class_id", "class_name", "open_to_receive", "number_of_member"],
                        &["class_name"],
                        &["class_name"],
                    ),
                ],
            }),
            count_schema: Some(Schema::new(
                "club_id",
                vec![
                    ("club_id".to_string(), ColumnType::Int, false),
                    ("student_count".to_string(), ColumnType::Int, false),
                ],
            )),
            count_field: Some("student_count".to_string()),
            endpoints: EntityKind::Club.endpoints(),
        }
    }
}
