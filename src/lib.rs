/// ClubTable - list management for club registration admin tables
///
/// Students, teachers and clubs are fetched from a remote record source and
/// shown through one pipeline: filter, stable sort, paginate. Selection,
/// grouped club rows and delete confirmation sit on top of that pipeline,
/// driven by a pure reducer over an immutable view state.

pub mod column;
pub mod table;
pub mod filter;
pub mod view;
pub mod pagination;
pub mod selection;
pub mod group;
pub mod entity;
pub mod state;
pub mod notify;
pub mod source;
pub mod controller;
pub mod config;
pub mod error;

pub use column::{ColumnType, ColumnValue};
pub use table::{Record, RecordKey, RecordSet, Schema};
pub use filter::{Choice, FilterSet, FilterSpecs};
pub use view::{compute_page, SortKey, SortOrder, ViewParameters};
pub use pagination::{PageControls, PageWindow};
pub use selection::Selection;
pub use entity::{EntityKind, TableConfig};
pub use state::{reduce, Action, ViewState};
pub use notify::{Level, Notification};
pub use source::{DeleteTarget, MemorySource, RecordSource};
pub use controller::{FollowUp, TableController, ViewSnapshot};
pub use config::Config;
pub use error::{ConfigError, SchemaError, SourceError, ViewError};

// REST record source - only when http feature is enabled
#[cfg(feature = "http")]
pub mod http;
#[cfg(feature = "http")]
pub use http::HttpSource;

// WebSocket server modules - only when server feature is enabled
#[cfg(feature = "server")]
pub mod messages;
#[cfg(feature = "server")]
pub mod websocket;
#[cfg(feature = "server")]
pub mod server;
