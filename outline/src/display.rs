//! The widget table: routes native callbacks to widgets by native handle.
//!
//! Widgets are registered explicitly when their native control is created
//! and unregistered when it is destroyed. Callbacks for handles that are not
//! registered (late callbacks for destroyed controls) are dropped.

use std::cmp::Ordering;
use std::collections::HashMap;

use log::{debug, trace};
use rowmap::{ItemId, NavKey, Property, PropertyValue};

use crate::error::{Error, Result};
use crate::events::NativeCallbacks;
use crate::host::{NativeHandle, Notification};
use crate::table::Table;
use crate::tree::Tree;

/// A widget owned by the display.
#[derive(Debug, Clone)]
pub enum Widget {
    Tree(Tree),
    Table(Table),
}

impl Widget {
    fn callbacks(&self) -> &dyn NativeCallbacks {
        match self {
            Widget::Tree(tree) => tree,
            Widget::Table(table) => table,
        }
    }

    /// Dispose the underlying widget.
    pub fn dispose(&self) {
        match self {
            Widget::Tree(tree) => tree.dispose(),
            Widget::Table(table) => table.dispose(),
        }
    }

    /// Check if the underlying widget was disposed.
    pub fn is_disposed(&self) -> bool {
        match self {
            Widget::Tree(tree) => tree.is_disposed(),
            Widget::Table(table) => table.is_disposed(),
        }
    }
}

impl From<Tree> for Widget {
    fn from(tree: Tree) -> Self {
        Widget::Tree(tree)
    }
}

impl From<Table> for Widget {
    fn from(table: Table) -> Self {
        Widget::Table(table)
    }
}

/// Map from native handle to the widget owning it.
#[derive(Debug, Default)]
pub struct Display {
    widgets: HashMap<NativeHandle, Widget>,
}

impl Display {
    /// Create an empty display.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a widget under its native handle.
    pub fn register(&mut self, handle: NativeHandle, widget: impl Into<Widget>) -> Result<()> {
        if self.widgets.contains_key(&handle) {
            return Err(Error::DuplicateHandle(handle));
        }
        self.widgets.insert(handle, widget.into());
        debug!("registered widget {}", handle);
        Ok(())
    }

    /// Unregister and dispose the widget under `handle`.
    pub fn unregister(&mut self, handle: NativeHandle) -> Option<Widget> {
        let widget = self.widgets.remove(&handle)?;
        widget.dispose();
        debug!("unregistered widget {}", handle);
        Some(widget)
    }

    /// The widget under `handle`.
    pub fn get(&self, handle: NativeHandle) -> Option<&Widget> {
        self.widgets.get(&handle)
    }

    /// Number of registered widgets.
    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    /// Check if no widget is registered.
    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    fn route(&self, handle: NativeHandle) -> Option<Widget> {
        let widget = self.widgets.get(&handle).cloned();
        if widget.is_none() {
            trace!("callback for unknown handle {}", handle);
        }
        widget
    }

    /// Route a data request.
    pub fn item_data(
        &self,
        handle: NativeHandle,
        raw_id: u32,
        property: Property,
    ) -> Option<PropertyValue> {
        self.route(handle)?.callbacks().item_data(raw_id, property)
    }

    /// Route a row notification.
    pub fn item_notification(&self, handle: NativeHandle, raw_id: u32, notification: Notification) {
        if let Some(widget) = self.route(handle) {
            widget.callbacks().item_notification(raw_id, notification);
        }
    }

    /// Route a compare request. Unknown handles compare raw ids.
    pub fn compare(&self, handle: NativeHandle, raw_a: u32, raw_b: u32) -> Ordering {
        match self.route(handle) {
            Some(widget) => widget.callbacks().compare(raw_a, raw_b),
            None => raw_a.cmp(&raw_b),
        }
    }

    /// Route an arrow key.
    pub fn navigate(&self, handle: NativeHandle, key: NavKey) -> Option<ItemId> {
        self.route(handle)?.callbacks().navigate(key)
    }
}
