//! Tree and Table adapters over a native row-id host.
//!
//! The adapters decide when to call into the [`rowmap`] identity table in
//! response to public API calls and native host callbacks:
//!
//! - [`Tree`] - hierarchical items, host ids are identity ids
//! - [`Table`] - flat rows, host ids are positional and follow the sort
//! - [`Display`] - routes callbacks to widgets by native handle
//! - [`RecordingHost`] - an in-memory [`NativeHost`] for tests and demos
//!
//! Application code reacts to [`TreeEvent`]s and [`TableEvent`]s through
//! listeners registered per [`EventKind`]. Listeners run with no internal
//! state borrowed, so they may call back into the widget, change item
//! counts, or dispose it.

pub mod config;
pub mod display;
pub mod error;
pub mod events;
pub mod host;
pub mod selection;
pub mod table;
pub mod tree;

pub use config::WidgetConfig;
pub use display::{Display, Widget};
pub use error::{Error, Result};
pub use events::{EventKind, Listener, NativeCallbacks, TableEvent, TreeEvent};
pub use host::{HostCall, HostError, NativeHandle, NativeHost, Notification, RecordingHost};
pub use selection::{Selection, SelectionMode};
pub use table::{Table, TableId};
pub use tree::{Tree, TreeId};

pub use rowmap;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::{
        Display, EventKind, NativeCallbacks, NativeHandle, NativeHost, Notification,
        RecordingHost, SelectionMode, Table, TableEvent, Tree, TreeEvent, Widget, WidgetConfig,
    };
    pub use rowmap::{ItemId, NavKey, Property, PropertyValue, SortDirection, TableConfig};
}
