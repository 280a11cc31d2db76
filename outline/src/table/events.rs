//! Native callbacks for the Table widget.

use std::cmp::Ordering;

use log::trace;
use rowmap::{ItemId, NavKey, Property, PropertyValue};

use crate::error::{Error, Result};
use crate::events::{NativeCallbacks, TableEvent};
use crate::host::Notification;
use crate::selection::SelectionMode;

use super::state::Table;

impl Table {
    /// Deliver an event to the matching listeners.
    ///
    /// Returns false if a listener disposed the table; remaining listeners
    /// are skipped.
    pub(super) fn emit(&self, event: TableEvent) -> bool {
        let listeners = self.listeners.borrow().matching(event.kind());
        for listener in listeners {
            if self.is_disposed() {
                break;
            }
            listener(self, &event);
        }
        !self.is_disposed()
    }

    /// Resolve the row at `index`, raising `SetData` first if it is a
    /// virtual row whose data was never supplied.
    pub(super) fn ensure_data(&self, index: usize) -> Result<ItemId> {
        let (id, populate) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.rows.resolve(None, index)?;
            let virtual_items = inner.rows.is_virtual();
            match inner.rows.get_mut(id) {
                Some(item) if virtual_items && !item.is_cached() => {
                    // Marked before dispatch so a reentrant request does not
                    // populate twice.
                    item.set_cached(true);
                    (id, true)
                }
                _ => (id, false),
            }
        };
        if populate {
            trace!("{}: populating {} at {}", self.id(), id, index);
            if !self.emit(TableEvent::SetData { item: id, index }) {
                return Err(Error::Disposed);
            }
        }
        Ok(id)
    }

    /// Logical index for a raw host row id, `None` if stale.
    fn index_for_row(&self, raw_id: u32) -> Option<usize> {
        if self.is_disposed() {
            return None;
        }
        let index = self.row_index(raw_id);
        if index.is_none() {
            trace!("{}: ignoring stale row {}", self.id(), raw_id);
        }
        index
    }

    fn on_selected(&self, index: usize) {
        let item = {
            let mut inner = self.inner.borrow_mut();
            let mode = inner.selection_mode;
            if mode == SelectionMode::None {
                return;
            }
            inner.selection.select(index, mode);
            inner.anchor.disarm();
            inner.rows.resolve(None, index)
        };
        if let Ok(item) = item {
            self.emit(TableEvent::Selection { item, index });
        }
    }

    fn on_deselected(&self, index: usize) {
        let mut inner = self.inner.borrow_mut();
        if inner.selection.deselect(index) && inner.selection.is_empty() {
            trace!("{}: anchor armed at {}", self.id(), index);
            inner.anchor.arm(index);
        }
    }
}

impl NativeCallbacks for Table {
    fn item_data(&self, raw_id: u32, property: Property) -> Option<PropertyValue> {
        let index = self.index_for_row(raw_id)?;
        let id = self.ensure_data(index).ok()?;
        let inner = self.inner.borrow();
        // A SetData listener may have removed the row.
        inner.rows.get(id).map(|item| item.property(property))
    }

    fn item_notification(&self, raw_id: u32, notification: Notification) {
        let Some(index) = self.index_for_row(raw_id) else {
            return;
        };
        match notification {
            Notification::Selected => self.on_selected(index),
            Notification::Deselected => self.on_deselected(index),
            Notification::DoubleClicked => {
                let item = self.inner.borrow_mut().rows.resolve(None, index);
                if let Ok(item) = item {
                    self.emit(TableEvent::DefaultSelection { item, index });
                }
            }
            Notification::ContainerOpening
            | Notification::ContainerClosing
            | Notification::ContainerOpened
            | Notification::ContainerClosed => {
                trace!("{}: {:?} ignored on flat rows", self.id(), notification);
            }
        }
    }

    fn compare(&self, raw_a: u32, raw_b: u32) -> Ordering {
        let inner = self.inner.borrow();
        match (ItemId::new(raw_a), ItemId::new(raw_b)) {
            (Some(a), Some(b)) => inner.order.compare(a, b, inner.count()),
            _ => raw_a.cmp(&raw_b),
        }
    }

    fn navigate(&self, key: NavKey) -> Option<ItemId> {
        if self.is_disposed() {
            return None;
        }
        let (item, index) = {
            let mut inner = self.inner.borrow_mut();
            let mode = inner.selection_mode;
            if !inner.selection.is_empty() || mode == SelectionMode::None {
                return None;
            }
            // Arrow keys move through presented rows, which run backwards
            // when sorted descending.
            let key = if inner.order.direction().is_descending() {
                key.reversed()
            } else {
                key
            };
            let index = inner.anchor.next(key, inner.count())?;
            let item = inner.rows.resolve(None, index).ok()?;
            inner.selection.select(index, mode);
            inner.anchor.disarm();
            (item, index)
        };
        trace!("{}: navigated to {}", self.id(), index);
        self.emit(TableEvent::Selection { item, index });
        Some(item)
    }
}
