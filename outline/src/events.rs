//! Widget events, listener tables and the native callback trait.

use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

use rowmap::{ItemId, NavKey, Property, PropertyValue};

use crate::host::Notification;

// =============================================================================
// Event Types
// =============================================================================

/// Identifies which listeners an event is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A virtual item needs its data
    SetData,
    /// Selection changed
    Selection,
    /// Item activated (double-click, Enter)
    DefaultSelection,
    /// Tree node about to expand
    Expand,
    /// Tree node about to collapse
    Collapse,
}

/// Events raised by a [`Tree`](crate::Tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEvent {
    /// Populate `item`, the `index`-th child of `parent`.
    SetData {
        item: ItemId,
        parent: Option<ItemId>,
        index: usize,
    },
    Selection {
        item: ItemId,
    },
    DefaultSelection {
        item: ItemId,
    },
    /// Fired before the children are handed to the host, so listeners can
    /// still set the child count.
    Expand {
        item: ItemId,
    },
    Collapse {
        item: ItemId,
    },
}

impl TreeEvent {
    /// The kind used for listener lookup.
    pub fn kind(&self) -> EventKind {
        match self {
            TreeEvent::SetData { .. } => EventKind::SetData,
            TreeEvent::Selection { .. } => EventKind::Selection,
            TreeEvent::DefaultSelection { .. } => EventKind::DefaultSelection,
            TreeEvent::Expand { .. } => EventKind::Expand,
            TreeEvent::Collapse { .. } => EventKind::Collapse,
        }
    }
}

/// Events raised by a [`Table`](crate::Table). `index` is the logical row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableEvent {
    SetData { item: ItemId, index: usize },
    Selection { item: ItemId, index: usize },
    DefaultSelection { item: ItemId, index: usize },
}

impl TableEvent {
    /// The kind used for listener lookup.
    pub fn kind(&self) -> EventKind {
        match self {
            TableEvent::SetData { .. } => EventKind::SetData,
            TableEvent::Selection { .. } => EventKind::Selection,
            TableEvent::DefaultSelection { .. } => EventKind::DefaultSelection,
        }
    }
}

// =============================================================================
// Listener Table
// =============================================================================

/// A registered listener.
pub type Listener<W, E> = Rc<dyn Fn(&W, &E)>;

/// Listeners of one widget, keyed by event kind.
pub(crate) struct Listeners<W, E> {
    entries: Vec<(EventKind, Listener<W, E>)>,
}

impl<W, E> Listeners<W, E> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub(crate) fn add(&mut self, kind: EventKind, listener: Listener<W, E>) {
        self.entries.push((kind, listener));
    }

    /// Snapshot of the listeners for `kind`, in registration order.
    ///
    /// Dispatch iterates the snapshot so listeners may register more
    /// listeners without invalidating the iteration.
    pub(crate) fn matching(&self, kind: EventKind) -> Vec<Listener<W, E>> {
        self.entries
            .iter()
            .filter(|(entry, _)| *entry == kind)
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<W, E> fmt::Debug for Listeners<W, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(kind, _)| kind))
            .finish()
    }
}

// =============================================================================
// Native Callbacks
// =============================================================================

/// Callbacks the native host makes into a widget.
///
/// Raw ids are the integers the host holds; `0` and ids the widget no longer
/// tracks are ignored. None of these ever fail: late callbacks for rows that
/// were just removed are normal.
pub trait NativeCallbacks {
    /// Value of `property` for the row `raw_id`.
    ///
    /// Virtual items are populated through a `SetData` event the first time
    /// their data is requested.
    fn item_data(&self, raw_id: u32, property: Property) -> Option<PropertyValue>;

    /// A user action or expansion step on the row `raw_id`.
    fn item_notification(&self, raw_id: u32, notification: Notification);

    /// Order two rows for presentation.
    fn compare(&self, raw_a: u32, raw_b: u32) -> Ordering;

    /// Arrow key pressed with focus in the widget.
    ///
    /// With an empty selection, selects the row next to the remembered
    /// anchor and returns it. Returns `None` when the host should handle the
    /// key itself.
    fn navigate(&self, key: NavKey) -> Option<ItemId>;
}
