//! Sparse virtualized id allocation and identity resolution for tree and
//! table views.
//!
//! A native list or outline control identifies rows by small positive
//! integers. This crate keeps those ids dense and stable while items are
//! created lazily, recycled after removal, and reordered by sorting:
//!
//! - [`IdentityTable`] - id allocation, recycling and lazy materialization
//! - [`ChildSlots`] - the per-container slot array
//! - [`RowOrder`] - sort-direction aware index/row id translation
//! - [`SelectionAnchor`] - keyboard anchor that survives inserts and removals
//!
//! # Example
//!
//! ```
//! use rowmap::{IdentityTable, TableConfig};
//!
//! let mut table = IdentityTable::with_config(TableConfig::on_demand());
//! table.set_child_count(None, 100, false).unwrap();
//!
//! let id = table.resolve(None, 50).unwrap();
//! assert_eq!(table.resolve(None, 50).unwrap(), id);
//! assert_eq!(table.materialized_count(), 1);
//! ```

pub mod anchor;
pub mod config;
pub mod error;
pub mod id;
pub mod item;
pub mod slots;
pub mod sort;
pub mod table;

pub use anchor::{AnchorState, NavKey, SelectionAnchor};
pub use config::TableConfig;
pub use error::{Error, Result};
pub use id::ItemId;
pub use item::{ItemData, LogicalItem, Property, PropertyValue};
pub use slots::ChildSlots;
pub use sort::{RowOrder, SortDirection};
pub use table::{CountChange, IdentityTable, Removed};
