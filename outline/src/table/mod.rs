//! Table widget: flat rows over the root container.
//!
//! The host sees positional row ids (`1..=count`, reversed when sorted
//! descending) while every logical row keeps its own stable identity id.
//! Selection is tracked by logical index and follows rows across inserts
//! and removals.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//!
//! use outline::prelude::*;
//!
//! let host = Rc::new(RecordingHost::new());
//! let table = Table::with_config(host.clone(), WidgetConfig::on_demand());
//! table.add_listener(EventKind::SetData, |table: &Table, event: &TableEvent| {
//!     if let TableEvent::SetData { index, .. } = *event {
//!         table.set_text(index, 0, format!("row {index}")).unwrap();
//!     }
//! });
//! table.set_item_count(1000).unwrap();
//!
//! let row = table.row_id(42).unwrap();
//! let text = table.item_data(row.get(), Property::Text(0));
//! assert_eq!(text, Some(PropertyValue::Text("row 42".into())));
//! ```

mod events;
mod state;

pub use state::{Table, TableId};
