/// WebSocket message types for client-server communication
use serde::{Deserialize, Serialize};

use crate::controller::ViewSnapshot;
use crate::entity::EntityKind;
use crate::filter::Choice;
use crate::notify::Notification;
use crate::source::JsonMap;
use crate::state::Action;
use crate::table::RecordKey;

/// Messages sent from client to server
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Show a table and fetch its rows
    Open { entity: EntityKind },

    /// Refetch the open table
    Refresh,

    SetTextFilter { field: String, value: String },
    ConfirmFilters,
    /// `value: null` clears the filter
    SetCategoricalFilter { field: String, value: Option<String> },
    SetSort { column: String },
    GotoPage { page: usize },
    PreviousPage,
    NextPage,
    SetPageSize { page_size: usize },
    ToggleSelect { key: RecordKey, checked: bool },
    ToggleSelectAll { checked: bool },
    ClearSelection,

    /// Ask to delete `keys`, or the current selection when omitted
    RequestDelete {
        #[serde(default)]
        keys: Option<Vec<RecordKey>>,
    },
    ConfirmDelete,
    CancelDelete,

    Create { fields: JsonMap },
    Update { key: RecordKey, fields: JsonMap },

    /// The next binary frame is a spreadsheet to import
    BeginImport { file_name: String },
}

impl ClientMessage {
    /// The view action this message maps to, if it is a pure view change.
    pub fn into_action(self) -> Option<Action> {
        let action = match self {
            ClientMessage::SetTextFilter { field, value } => Action::SetTextFilter { field, value },
            ClientMessage::ConfirmFilters => Action::ConfirmFilters,
            ClientMessage::SetCategoricalFilter { field, value } => Action::SetCategoricalFilter {
                field,
                choice: Choice::from_option(value),
            },
            ClientMessage::SetSort { column } => Action::SetSort { column },
            ClientMessage::GotoPage { page } => Action::GotoPage { page },
            ClientMessage::PreviousPage => Action::PreviousPage,
            ClientMessage::NextPage => Action::NextPage,
            ClientMessage::SetPageSize { page_size } => Action::SetPageSize { page_size },
            ClientMessage::ToggleSelect { key, checked } => Action::ToggleSelect { key, checked },
            ClientMessage::ToggleSelectAll { checked } => Action::ToggleSelectAll { checked },
            ClientMessage::ClearSelection => Action::ClearSelection,
            ClientMessage::CancelDelete => Action::CancelDelete,
            _ => return None,
        };
        Some(action)
    }
}

/// Messages sent from server to client
#[derive(Debug, Serialize, Clone)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Current state of the open table
    View { view: Box<ViewSnapshot> },

    /// Popup for the user
    Notify { notification: Notification },

    /// Deletion awaits confirmation
    ConfirmDelete { entity: EntityKind, count: usize },

    /// Error occurred
    Error { message: String },
}
