//! Native callbacks for the Tree widget.

use std::cmp::Ordering;

use log::{trace, warn};
use rowmap::{ItemId, NavKey, Property, PropertyValue};

use crate::error::{Error, Result};
use crate::events::{NativeCallbacks, TreeEvent};
use crate::host::Notification;
use crate::selection::SelectionMode;

use super::state::Tree;

impl Tree {
    /// Deliver an event to the matching listeners.
    ///
    /// Returns false if a listener disposed the tree; remaining listeners
    /// are skipped.
    pub(super) fn emit(&self, event: TreeEvent) -> bool {
        let listeners = self.listeners.borrow().matching(event.kind());
        for listener in listeners {
            if self.is_disposed() {
                break;
            }
            listener(self, &event);
        }
        !self.is_disposed()
    }

    /// Raise `SetData` for a virtual item whose data was never supplied.
    pub(super) fn ensure_data(&self, item: ItemId) -> Result<()> {
        let populate = {
            let mut inner = self.inner.borrow_mut();
            let virtual_items = inner.items.is_virtual();
            let node = inner
                .items
                .get(item)
                .ok_or(rowmap::Error::InvalidItem(item))?;
            if !virtual_items || node.is_cached() {
                None
            } else {
                let parent = node.parent();
                let index = inner.items.index_of(item)?;
                if let Some(node) = inner.items.get_mut(item) {
                    node.set_cached(true);
                }
                Some((parent, index))
            }
        };
        if let Some((parent, index)) = populate {
            trace!("{}: populating {} at {:?}/{}", self.id(), item, parent, index);
            if !self.emit(TreeEvent::SetData {
                item,
                parent,
                index,
            }) {
                return Err(Error::Disposed);
            }
        }
        Ok(())
    }

    /// Map a raw host id to a tracked item, building it if only reserved.
    fn lookup(&self, raw_id: u32) -> Option<ItemId> {
        if self.is_disposed() {
            return None;
        }
        let item = ItemId::new(raw_id).and_then(|id| self.inner.borrow_mut().items.resolve_by_id(id));
        if item.is_none() {
            trace!("{}: ignoring stale id {}", self.id(), raw_id);
        }
        item
    }

    fn on_selected(&self, item: ItemId) {
        {
            let mut inner = self.inner.borrow_mut();
            let mode = inner.selection_mode;
            if mode == SelectionMode::None {
                return;
            }
            inner.selection.select(item, mode);
            inner.anchor.disarm();
        }
        self.emit(TreeEvent::Selection { item });
    }

    fn on_deselected(&self, item: ItemId) {
        let mut inner = self.inner.borrow_mut();
        if inner.selection.deselect(item) && inner.selection.is_empty() {
            inner.arm_at(item);
            trace!("{}: anchor armed at {:?}", self.id(), inner.anchor.index());
        }
    }

    fn on_opening(&self, item: ItemId) {
        if !self.emit(TreeEvent::Expand { item }) {
            return;
        }
        // The listener may have removed the item it was asked to expand.
        if !self.inner.borrow().items.is_materialized(item) {
            trace!("{}: {} vanished while expanding", self.id(), item);
            return;
        }
        if let Err(err) = self.open(item) {
            warn!("{}: could not expand {}: {}", self.id(), item, err);
        }
    }

    fn on_closed(&self, item: ItemId) {
        if let Err(err) = self.close(item) {
            warn!("{}: could not collapse {}: {}", self.id(), item, err);
        }
    }
}

impl NativeCallbacks for Tree {
    fn item_data(&self, raw_id: u32, property: Property) -> Option<PropertyValue> {
        let item = self.lookup(raw_id)?;
        self.ensure_data(item).ok()?;
        let inner = self.inner.borrow();
        inner.items.get(item).map(|node| node.property(property))
    }

    fn item_notification(&self, raw_id: u32, notification: Notification) {
        let Some(item) = self.lookup(raw_id) else {
            return;
        };
        match notification {
            Notification::Selected => self.on_selected(item),
            Notification::Deselected => self.on_deselected(item),
            Notification::DoubleClicked => {
                self.emit(TreeEvent::DefaultSelection { item });
            }
            Notification::ContainerOpening => self.on_opening(item),
            Notification::ContainerOpened => {
                trace!("{}: {} opened", self.id(), item);
            }
            Notification::ContainerClosing => {
                self.emit(TreeEvent::Collapse { item });
            }
            Notification::ContainerClosed => self.on_closed(item),
        }
    }

    fn compare(&self, raw_a: u32, raw_b: u32) -> Ordering {
        if self.is_disposed() {
            return raw_a.cmp(&raw_b);
        }
        let (Some(a), Some(b)) = (ItemId::new(raw_a), ItemId::new(raw_b)) else {
            return raw_a.cmp(&raw_b);
        };
        // Sorting reads positions only; items are built when data is asked for.
        let inner = self.inner.borrow();
        match (inner.items.position_of(a), inner.items.position_of(b)) {
            (Some((parent_a, index_a)), Some((parent_b, index_b))) if parent_a == parent_b => {
                let ordering = index_a.cmp(&index_b);
                if inner.order.direction().is_descending() {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            _ => a.cmp(&b),
        }
    }

    fn navigate(&self, key: NavKey) -> Option<ItemId> {
        if self.is_disposed() {
            return None;
        }
        let (parent, index, key) = {
            let inner = self.inner.borrow();
            if !inner.selection.is_empty() || inner.selection_mode == SelectionMode::None {
                return None;
            }
            let key = if inner.order.direction().is_descending() {
                key.reversed()
            } else {
                key
            };
            let parent = inner.anchor_parent;
            if !inner.is_shown(parent) {
                return None;
            }
            let count = inner.items.child_count(parent).ok()?;
            (parent, inner.anchor.next(key, count)?, key)
        };
        let item = self.item(parent, index).ok()?;
        {
            let mut inner = self.inner.borrow_mut();
            let mode = inner.selection_mode;
            inner.selection.select(item, mode);
            inner.anchor.disarm();
        }
        trace!("{}: navigated {:?} to {}", self.id(), key, item);
        self.emit(TreeEvent::Selection { item });
        Some(item)
    }
}
