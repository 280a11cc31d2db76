//! Tree widget state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::{debug, warn};
use rowmap::{IdentityTable, ItemId, RowOrder, SelectionAnchor, SortDirection};

use crate::config::WidgetConfig;
use crate::error::{Error, Result};
use crate::events::{EventKind, Listeners, TreeEvent};
use crate::host::NativeHost;
use crate::selection::{Selection, SelectionMode};

/// Unique identifier for a Tree widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeId(usize);

impl TreeId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TreeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__tree_{}", self.0)
    }
}

/// Internal state for the Tree widget.
#[derive(Debug)]
pub(super) struct TreeInner {
    pub items: IdentityTable,
    pub selection: Selection<ItemId>,
    pub selection_mode: SelectionMode,
    /// Navigation anchor, an index into `anchor_parent`'s children.
    pub anchor: SelectionAnchor,
    pub anchor_parent: Option<ItemId>,
    pub order: RowOrder,
    pub redraw: bool,
}

impl TreeInner {
    /// Whether the host currently holds the children of `container`: the
    /// root always, an item while it and all its ancestors are expanded.
    pub fn is_shown(&self, container: Option<ItemId>) -> bool {
        let mut current = container;
        while let Some(id) = current {
            match self.items.get(id) {
                Some(item) if item.is_expanded() => current = item.parent(),
                _ => return false,
            }
        }
        true
    }

    /// Drop released ids from the selection and the anchor.
    pub fn forget(&mut self, released: &[ItemId]) {
        self.selection.retain(|id| !released.contains(&id));
        if let Some(parent) = self.anchor_parent
            && released.contains(&parent)
        {
            self.anchor.disarm();
            self.anchor_parent = None;
        }
    }

    /// Whether `container` is `ancestor` or lies somewhere below it.
    pub fn is_within(&self, container: Option<ItemId>, ancestor: ItemId) -> bool {
        let mut current = container;
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.items.parent_of(id).ok().flatten();
        }
        false
    }

    /// Remember the position of `item` as the navigation anchor.
    pub fn arm_at(&mut self, item: ItemId) {
        if let Ok(parent) = self.items.parent_of(item)
            && let Ok(index) = self.items.index_of(item)
        {
            self.anchor.arm(index);
            self.anchor_parent = parent;
        }
    }
}

/// A virtualized tree widget over a native outline host.
///
/// Clones share state: every clone is a handle to the same widget.
#[derive(Clone)]
pub struct Tree {
    id: TreeId,
    pub(super) inner: Rc<RefCell<TreeInner>>,
    pub(super) listeners: Rc<RefCell<Listeners<Tree, TreeEvent>>>,
    pub(super) disposed: Rc<Cell<bool>>,
    /// Set when a host update was skipped while redraw was off.
    pub(super) dirty: Rc<Cell<bool>>,
    pub(super) host: Rc<dyn NativeHost>,
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Tree {
    /// Create an empty tree with default configuration.
    pub fn new(host: Rc<dyn NativeHost>) -> Self {
        Self::with_config(host, WidgetConfig::default())
    }

    /// Create an empty tree.
    pub fn with_config(host: Rc<dyn NativeHost>, config: WidgetConfig) -> Self {
        Self {
            id: TreeId::new(),
            inner: Rc::new(RefCell::new(TreeInner {
                items: IdentityTable::with_config(config.table),
                selection: Selection::new(),
                selection_mode: config.selection_mode,
                anchor: SelectionAnchor::new(),
                anchor_parent: None,
                order: RowOrder::default(),
                redraw: true,
            })),
            listeners: Rc::new(RefCell::new(Listeners::new())),
            disposed: Rc::new(Cell::new(false)),
            dirty: Rc::new(Cell::new(false)),
            host,
        }
    }

    /// Get the unique ID.
    pub fn id(&self) -> TreeId {
        self.id
    }

    /// Whether items are created on demand.
    pub fn is_virtual(&self) -> bool {
        self.inner.borrow().items.is_virtual()
    }

    /// Number of items built so far.
    pub fn materialized_count(&self) -> usize {
        self.inner.borrow().items.materialized_count()
    }

    pub(super) fn check_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    pub(super) fn refresh(&self) {
        let redraw = self.inner.borrow().redraw;
        if redraw {
            self.host.update_items();
        } else {
            self.dirty.set(true);
        }
    }

    // -------------------------------------------------------------------------
    // Items
    // -------------------------------------------------------------------------

    /// Create an item under `parent` at `index`, appending when `None`.
    pub fn create_item(&self, parent: Option<ItemId>, index: Option<usize>) -> Result<ItemId> {
        self.check_live()?;
        let (id, index, count, shown) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.items.insert(parent, index)?;
            let count = inner.items.child_count(parent)?;
            (id, index.unwrap_or(count - 1), count, inner.is_shown(parent))
        };
        if shown && let Err(err) = self.host.add_items(parent, &[id]) {
            self.inner.borrow_mut().items.remove_child(parent, index)?;
            return Err(Error::ItemNotAdded(err));
        }
        {
            let mut inner = self.inner.borrow_mut();
            if inner.anchor_parent == parent {
                inner.anchor.on_insert(index, count);
            }
        }
        debug!("{}: created {} under {:?} at {}", self.id, id, parent, index);
        self.refresh();
        Ok(id)
    }

    /// The `index`-th child of `parent`, building it if needed.
    ///
    /// If the host refuses a newly built item in a shown container, the slot
    /// is left unallocated again and [`Error::ItemNotAdded`] is returned.
    pub fn item(&self, parent: Option<ItemId>, index: usize) -> Result<ItemId> {
        self.check_live()?;
        let (id, fresh, shown) = {
            let mut inner = self.inner.borrow_mut();
            let fresh = inner.items.child_slot(parent, index)?.is_none();
            let id = inner.items.resolve(parent, index)?;
            (id, fresh, inner.is_shown(parent))
        };
        if fresh
            && shown
            && let Err(err) = self.host.add_items(parent, &[id])
        {
            warn!("{}: host did not take {}: {}", self.id, id, err);
            self.inner.borrow_mut().items.vacate(parent, index)?;
            return Err(Error::ItemNotAdded(err));
        }
        Ok(id)
    }

    /// Every child of `parent`, building them as needed.
    pub fn items(&self, parent: Option<ItemId>) -> Result<Vec<ItemId>> {
        let count = self.item_count(parent)?;
        (0..count).map(|index| self.item(parent, index)).collect()
    }

    /// Number of children of `parent`.
    pub fn item_count(&self, parent: Option<ItemId>) -> Result<usize> {
        Ok(self.inner.borrow().items.child_count(parent)?)
    }

    /// Set the number of children of `parent`.
    ///
    /// In a shown container new ids are reserved and handed to the host
    /// straight away; elsewhere virtual trees leave the slots unallocated
    /// until the container opens.
    pub fn set_item_count(&self, parent: Option<ItemId>, count: usize) -> Result<()> {
        self.check_live()?;
        let (old, shown) = {
            let inner = self.inner.borrow();
            (inner.items.child_count(parent)?, inner.is_shown(parent))
        };
        if count > old {
            let change = self
                .inner
                .borrow_mut()
                .items
                .set_child_count(parent, count, shown)?;
            if shown
                && !change.added.is_empty()
                && let Err(err) = self.host.add_items(parent, &change.added)
            {
                self.inner
                    .borrow_mut()
                    .items
                    .set_child_count(parent, old, false)?;
                return Err(Error::ItemNotAdded(err));
            }
        } else if count < old {
            let trailing: Vec<ItemId> = {
                let inner = self.inner.borrow();
                let slots = inner.items.children(parent)?;
                slots.as_slice()[count..].iter().flatten().copied().collect()
            };
            if shown && !trailing.is_empty() {
                self.host
                    .remove_items(parent, &trailing)
                    .map_err(Error::ItemNotRemoved)?;
            }
            let mut inner = self.inner.borrow_mut();
            let change = inner.items.set_child_count(parent, count, false)?;
            inner.forget(&change.removed);
            if inner.anchor_parent == parent {
                for index in (count..old).rev() {
                    inner.anchor.on_remove(index, index);
                }
            }
        } else {
            return Ok(());
        }
        debug!("{}: item count of {:?} {} -> {}", self.id, parent, old, count);
        self.refresh();
        Ok(())
    }

    /// Index of an item within its parent.
    pub fn index_of(&self, item: ItemId) -> Result<usize> {
        Ok(self.inner.borrow().items.index_of(item)?)
    }

    /// Parent of an item, `None` for root items.
    pub fn parent_item(&self, item: ItemId) -> Result<Option<ItemId>> {
        Ok(self.inner.borrow().items.parent_of(item)?)
    }

    /// Remove an item and its subtree.
    pub fn remove(&self, item: ItemId) -> Result<()> {
        self.check_live()?;
        let (parent, index, shown) = {
            let inner = self.inner.borrow();
            let parent = inner.items.parent_of(item)?;
            (parent, inner.items.index_of(item)?, inner.is_shown(parent))
        };
        if shown {
            self.host
                .remove_items(parent, &[item])
                .map_err(Error::ItemNotRemoved)?;
        }
        {
            let mut inner = self.inner.borrow_mut();
            let removed = inner.items.remove_child(parent, index)?;
            inner.forget(&removed.released);
            if inner.anchor_parent == parent {
                let remaining = inner.items.child_count(parent)?;
                inner.anchor.on_remove(index, remaining);
            }
            debug!("{}: removed {} ({} ids released)", self.id, item, removed.released.len());
        }
        self.refresh();
        Ok(())
    }

    /// Remove every item.
    pub fn remove_all(&self) -> Result<()> {
        self.check_live()?;
        let roots: Vec<ItemId> = self.inner.borrow().items.children(None)?.ids().collect();
        if !roots.is_empty() {
            self.host
                .remove_items(None, &roots)
                .map_err(Error::ItemNotRemoved)?;
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.items.remove_all(None)?;
            inner.selection.clear();
            inner.anchor.on_clear();
            inner.anchor_parent = None;
        }
        self.refresh();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Reset the `index`-th child of `parent` (and its subtree with `all`)
    /// so its data is requested again.
    pub fn clear(&self, parent: Option<ItemId>, index: usize, all: bool) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(id) = inner.items.child_slot(parent, index)?
                && inner.items.is_materialized(id)
            {
                inner.items.clear(id, all)?;
            }
        }
        self.refresh();
        Ok(())
    }

    /// Reset every child of `parent`.
    pub fn clear_all(&self, parent: Option<ItemId>, all: bool) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            let children: Vec<ItemId> = inner.items.children(parent)?.ids().collect();
            for id in children {
                if inner.items.is_materialized(id) {
                    inner.items.clear(id, all)?;
                }
            }
        }
        self.refresh();
        Ok(())
    }

    /// Set the text of one column.
    pub fn set_text(&self, item: ItemId, column: usize, text: impl Into<String>) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            let node = inner
                .items
                .get_mut(item)
                .ok_or(rowmap::Error::InvalidItem(item))?;
            node.data.set_text(column, text);
            node.set_cached(true);
        }
        self.refresh();
        Ok(())
    }

    /// Text of one column, populating a virtual item first.
    pub fn text(&self, item: ItemId, column: usize) -> Result<String> {
        self.check_live()?;
        self.ensure_data(item)?;
        let inner = self.inner.borrow();
        let node = inner.items.get(item).ok_or(rowmap::Error::InvalidItem(item))?;
        Ok(node.data.text(column).to_string())
    }

    /// Set the check box state of an item.
    pub fn set_checked(&self, item: ItemId, checked: bool) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            let node = inner
                .items
                .get_mut(item)
                .ok_or(rowmap::Error::InvalidItem(item))?;
            node.data.checked = checked;
        }
        self.refresh();
        Ok(())
    }

    /// Check box state of an item, populating a virtual item first.
    pub fn checked(&self, item: ItemId) -> Result<bool> {
        self.check_live()?;
        self.ensure_data(item)?;
        let inner = self.inner.borrow();
        Ok(inner.items.get(item).is_some_and(|node| node.data.checked))
    }

    // -------------------------------------------------------------------------
    // Expansion
    // -------------------------------------------------------------------------

    /// Expand or collapse an item without raising events.
    pub fn set_expanded(&self, item: ItemId, expanded: bool) -> Result<()> {
        self.check_live()?;
        if expanded {
            self.open(item)
        } else {
            self.close(item)
        }
    }

    /// Check if an item is expanded.
    pub fn expanded(&self, item: ItemId) -> Result<bool> {
        let inner = self.inner.borrow();
        let node = inner.items.get(item).ok_or(rowmap::Error::InvalidItem(item))?;
        Ok(node.is_expanded())
    }

    /// Mark `item` expanded and hand its children to the host if it is in a
    /// shown container.
    pub(super) fn open(&self, item: ItemId) -> Result<()> {
        let (shown, expanded) = {
            let inner = self.inner.borrow();
            let node = inner.items.get(item).ok_or(rowmap::Error::InvalidItem(item))?;
            (inner.is_shown(node.parent()), node.is_expanded())
        };
        if expanded {
            return Ok(());
        }
        if shown {
            self.reveal(item)?;
        }
        self.inner.borrow_mut().items.set_expanded(item, true)?;
        debug!("{}: expanded {}", self.id, item);
        Ok(())
    }

    /// Reserve ids for the children of `container` and add them to the
    /// host, then do the same for children that were left expanded.
    fn reveal(&self, container: ItemId) -> Result<()> {
        let children: Vec<ItemId> = {
            let mut inner = self.inner.borrow_mut();
            inner.items.reserve_unallocated(Some(container))?;
            inner.items.children(Some(container))?.ids().collect()
        };
        if !children.is_empty()
            && let Err(err) = self.host.add_items(Some(container), &children)
        {
            self.inner
                .borrow_mut()
                .items
                .drop_reservations(Some(container))?;
            return Err(Error::ItemNotAdded(err));
        }
        let nested: Vec<ItemId> = {
            let inner = self.inner.borrow();
            children
                .into_iter()
                .filter(|id| inner.items.get(*id).is_some_and(|node| node.is_expanded()))
                .collect()
        };
        for child in nested {
            if let Err(err) = self.reveal(child) {
                warn!("{}: could not show children of {}: {}", self.id, child, err);
                self.inner.borrow_mut().items.set_expanded(child, false)?;
            }
        }
        Ok(())
    }

    /// Mark `item` collapsed, take its children back from the host and give
    /// up ids that were only reserved.
    pub(super) fn close(&self, item: ItemId) -> Result<()> {
        let (shown, children) = {
            let inner = self.inner.borrow();
            let node = inner.items.get(item).ok_or(rowmap::Error::InvalidItem(item))?;
            if !node.is_expanded() {
                return Ok(());
            }
            let children: Vec<ItemId> = node.children().ids().collect();
            (inner.is_shown(node.parent()), children)
        };
        if shown && !children.is_empty() {
            self.host
                .remove_items(Some(item), &children)
                .map_err(Error::ItemNotRemoved)?;
        }
        let mut inner = self.inner.borrow_mut();
        inner.items.set_expanded(item, false)?;
        let dropped = conceal(&mut inner.items, item)?;
        inner.forget(&dropped);
        // Rows under a collapsed item are off screen; resume from the item.
        if inner.anchor.is_armed() && inner.is_within(inner.anchor_parent, item) {
            inner.arm_at(item);
        }
        debug!("{}: collapsed {} ({} reservations dropped)", self.id, item, dropped.len());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// Get the selection mode.
    pub fn selection_mode(&self) -> SelectionMode {
        self.inner.borrow().selection_mode
    }

    /// Set the selection mode. Clears the selection.
    pub fn set_selection_mode(&self, mode: SelectionMode) {
        let mut inner = self.inner.borrow_mut();
        inner.selection_mode = mode;
        inner.selection.clear();
    }

    /// Select an item. Does not raise events.
    pub fn select(&self, item: ItemId) -> Result<()> {
        self.check_live()?;
        let mut inner = self.inner.borrow_mut();
        if !inner.items.is_materialized(item) {
            return Err(rowmap::Error::InvalidItem(item).into());
        }
        let mode = inner.selection_mode;
        if inner.selection.select(item, mode) {
            inner.anchor.disarm();
        }
        Ok(())
    }

    /// Deselect an item, anchoring at it if the selection became empty.
    pub fn deselect(&self, item: ItemId) -> Result<()> {
        self.check_live()?;
        let mut inner = self.inner.borrow_mut();
        if !inner.items.is_materialized(item) {
            return Err(rowmap::Error::InvalidItem(item).into());
        }
        if inner.selection.deselect(item) && inner.selection.is_empty() {
            inner.arm_at(item);
        }
        Ok(())
    }

    /// Deselect every item, anchoring at the most recently selected one.
    pub fn deselect_all(&self) {
        let mut inner = self.inner.borrow_mut();
        let last = inner
            .selection
            .focus()
            .filter(|focus| inner.selection.is_selected(*focus))
            .or_else(|| inner.selection.selected().last().copied());
        inner.selection.clear();
        if let Some(item) = last {
            inner.arm_at(item);
        }
    }

    /// Selected items in id order.
    pub fn selection(&self) -> Vec<ItemId> {
        self.inner.borrow().selection.selected()
    }

    /// Check if an item is selected.
    pub fn is_selected(&self, item: ItemId) -> bool {
        self.inner.borrow().selection.is_selected(item)
    }

    /// Number of selected items.
    pub fn selection_count(&self) -> usize {
        self.inner.borrow().selection.len()
    }

    /// The remembered navigation anchor as `(parent, index)`.
    pub fn anchor(&self) -> Option<(Option<ItemId>, usize)> {
        let inner = self.inner.borrow();
        inner.anchor.index().map(|index| (inner.anchor_parent, index))
    }

    // -------------------------------------------------------------------------
    // Sorting & lifecycle
    // -------------------------------------------------------------------------

    /// Set the sort direction. Siblings compare reversed when descending.
    pub fn set_sort_direction(&self, direction: SortDirection) {
        let changed = self.inner.borrow_mut().order.set_direction(direction);
        if changed {
            debug!("{}: sort direction {:?}", self.id, direction);
            self.refresh();
        }
    }

    /// Get the sort direction.
    pub fn sort_direction(&self) -> SortDirection {
        self.inner.borrow().order.direction()
    }

    /// Suspend or resume host updates.
    pub fn set_redraw(&self, redraw: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.redraw = redraw;
            if redraw && inner.items.config().trim_on_redraw {
                inner.items.trim();
            }
        }
        if redraw && self.dirty.replace(false) {
            self.host.update_items();
        }
    }

    /// Release every item and drop all listeners. Later calls fail with
    /// [`Error::Disposed`].
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.listeners.borrow_mut().clear();
        let mut inner = self.inner.borrow_mut();
        let _ = inner.items.remove_all(None);
        inner.selection.clear();
        inner.anchor.on_clear();
        inner.anchor_parent = None;
        debug!("{}: disposed", self.id);
    }

    /// Check if the tree was disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Register a listener for one event kind.
    pub fn add_listener(&self, kind: EventKind, listener: impl Fn(&Tree, &TreeEvent) + 'static) {
        self.listeners.borrow_mut().add(kind, Rc::new(listener));
    }
}

/// Drop unmaterialized reservations under `container` and under every
/// expanded descendant. Returns the dropped ids.
fn conceal(items: &mut IdentityTable, container: ItemId) -> rowmap::Result<Vec<ItemId>> {
    let mut dropped = items.drop_reservations(Some(container))?;
    let nested: Vec<ItemId> = items
        .children(Some(container))?
        .ids()
        .filter(|id| items.get(*id).is_some_and(|node| node.is_expanded()))
        .collect();
    for child in nested {
        dropped.extend(conceal(items, child)?);
    }
    Ok(dropped)
}
