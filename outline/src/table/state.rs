//! Table widget state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::ops::Range;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::debug;
use rowmap::{IdentityTable, ItemId, RowOrder, SelectionAnchor, SortDirection};

use crate::config::WidgetConfig;
use crate::error::{Error, Result};
use crate::events::{EventKind, Listeners, TableEvent};
use crate::host::NativeHost;
use crate::selection::{Selection, SelectionMode};

/// Unique identifier for a Table widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableId(usize);

impl TableId {
    fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        Self(COUNTER.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "__table_{}", self.0)
    }
}

/// Positional row ids for the rows at `positions`.
pub(super) fn row_labels(positions: Range<usize>) -> Vec<ItemId> {
    positions.map(ItemId::from_index).collect()
}

/// Internal state for the Table widget.
#[derive(Debug)]
pub(super) struct TableInner {
    /// Identity of every logical row (children of the root).
    pub rows: IdentityTable,
    /// Selected logical indices.
    pub selection: Selection<usize>,
    pub selection_mode: SelectionMode,
    /// Where keyboard navigation resumes after the selection emptied.
    pub anchor: SelectionAnchor,
    pub order: RowOrder,
    /// Whether host updates are sent immediately.
    pub redraw: bool,
}

impl TableInner {
    pub fn count(&self) -> usize {
        self.rows.child_count(None).unwrap_or_default()
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        let count = self.count();
        if index < count {
            Ok(())
        } else {
            Err(rowmap::Error::range(index, count).into())
        }
    }
}

/// A table widget over a native row-id host.
///
/// Clones share state: every clone is a handle to the same widget.
#[derive(Clone)]
pub struct Table {
    id: TableId,
    pub(super) inner: Rc<RefCell<TableInner>>,
    pub(super) listeners: Rc<RefCell<Listeners<Table, TableEvent>>>,
    pub(super) disposed: Rc<Cell<bool>>,
    /// Set when a host update was skipped while redraw was off.
    pub(super) dirty: Rc<Cell<bool>>,
    pub(super) host: Rc<dyn NativeHost>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("count", &self.item_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

impl Table {
    /// Create an empty table with default configuration.
    pub fn new(host: Rc<dyn NativeHost>) -> Self {
        Self::with_config(host, WidgetConfig::default())
    }

    /// Create an empty table.
    pub fn with_config(host: Rc<dyn NativeHost>, config: WidgetConfig) -> Self {
        Self {
            id: TableId::new(),
            inner: Rc::new(RefCell::new(TableInner {
                rows: IdentityTable::with_config(config.table),
                selection: Selection::new(),
                selection_mode: config.selection_mode,
                anchor: SelectionAnchor::new(),
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
    pub fn id(&self) -> TableId {
        self.id
    }

    /// Whether rows are created on demand.
    pub fn is_virtual(&self) -> bool {
        self.inner.borrow().rows.is_virtual()
    }

    /// Number of items built so far.
    pub fn materialized_count(&self) -> usize {
        self.inner.borrow().rows.materialized_count()
    }

    pub(super) fn check_live(&self) -> Result<()> {
        if self.is_disposed() {
            Err(Error::Disposed)
        } else {
            Ok(())
        }
    }

    /// Ask the host to resync, or remember to once redraw is back on.
    pub(super) fn refresh(&self) {
        let redraw = self.inner.borrow().redraw;
        if redraw {
            self.host.update_items();
        } else {
            self.dirty.set(true);
        }
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Create a row at `index`, appending when `None`.
    pub fn create_item(&self, index: Option<usize>) -> Result<ItemId> {
        self.check_live()?;
        let (id, index, count) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.rows.insert(None, index)?;
            let count = inner.count();
            (id, index.unwrap_or(count - 1), count)
        };
        if let Err(err) = self.host.add_items(None, &row_labels(count - 1..count)) {
            self.inner.borrow_mut().rows.remove_child(None, index)?;
            return Err(Error::ItemNotAdded(err));
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.selection.on_insert(index);
            inner.anchor.on_insert(index, count);
        }
        debug!("{}: created {} at {}", self.id, id, index);
        self.refresh();
        Ok(id)
    }

    /// The row at `index`, building it if it does not exist yet.
    ///
    /// Does not populate virtual rows; see [`text`](Self::text).
    pub fn item(&self, index: usize) -> Result<ItemId> {
        self.check_live()?;
        Ok(self.inner.borrow_mut().rows.resolve(None, index)?)
    }

    /// Number of rows.
    pub fn item_count(&self) -> usize {
        self.inner.borrow().count()
    }

    /// Set the number of rows.
    ///
    /// Virtual tables only grow the slot array; rows are built when the host
    /// asks for them.
    pub fn set_item_count(&self, count: usize) -> Result<()> {
        self.check_live()?;
        let old = self.item_count();
        if count > old {
            self.inner
                .borrow_mut()
                .rows
                .set_child_count(None, count, false)?;
            if let Err(err) = self.host.add_items(None, &row_labels(old..count)) {
                self.inner
                    .borrow_mut()
                    .rows
                    .set_child_count(None, old, false)?;
                return Err(Error::ItemNotAdded(err));
            }
        } else if count < old {
            self.host
                .remove_items(None, &row_labels(count..old))
                .map_err(Error::ItemNotRemoved)?;
            let mut inner = self.inner.borrow_mut();
            inner.rows.set_child_count(None, count, false)?;
            inner.selection.truncate(count);
            for index in (count..old).rev() {
                inner.anchor.on_remove(index, index);
            }
        } else {
            return Ok(());
        }
        debug!("{}: item count {} -> {}", self.id, old, count);
        self.refresh();
        Ok(())
    }

    /// Index of a row item.
    pub fn index_of(&self, item: ItemId) -> Result<usize> {
        Ok(self.inner.borrow().rows.index_of(item)?)
    }

    /// Remove the row at `index`.
    pub fn remove(&self, index: usize) -> Result<()> {
        self.remove_sorted(vec![index])
    }

    /// Remove the rows `start..=end`. Does nothing when `start > end`.
    pub fn remove_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Ok(());
        }
        self.remove_sorted((start..=end).rev().collect())
    }

    /// Remove the rows at `indices` (any order, duplicates allowed).
    pub fn remove_indices(&self, indices: &[usize]) -> Result<()> {
        let mut indices = indices.to_vec();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        self.remove_sorted(indices)
    }

    /// Remove rows given distinct indices in descending order.
    fn remove_sorted(&self, indices: Vec<usize>) -> Result<()> {
        self.check_live()?;
        let count = {
            let inner = self.inner.borrow();
            for index in &indices {
                inner.check_index(*index)?;
            }
            inner.count()
        };
        if indices.is_empty() {
            return Ok(());
        }
        self.host
            .remove_items(None, &row_labels(count - indices.len()..count))
            .map_err(Error::ItemNotRemoved)?;
        {
            let mut inner = self.inner.borrow_mut();
            for index in &indices {
                inner.rows.remove_child(None, *index)?;
                let remaining = inner.count();
                inner.selection.on_remove(*index);
                inner.anchor.on_remove(*index, remaining);
            }
        }
        debug!("{}: removed {} rows", self.id, indices.len());
        self.refresh();
        Ok(())
    }

    /// Remove every row.
    pub fn remove_all(&self) -> Result<()> {
        self.check_live()?;
        let count = self.item_count();
        if count > 0 {
            self.host
                .remove_items(None, &row_labels(0..count))
                .map_err(Error::ItemNotRemoved)?;
        }
        {
            let mut inner = self.inner.borrow_mut();
            inner.rows.remove_all(None)?;
            inner.selection.clear();
            inner.anchor.on_clear();
        }
        self.refresh();
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Data
    // -------------------------------------------------------------------------

    /// Reset the row at `index` so its data is requested again.
    pub fn clear(&self, index: usize) -> Result<()> {
        self.clear_rows(&[index])
    }

    /// Reset the rows `start..=end`.
    pub fn clear_range(&self, start: usize, end: usize) -> Result<()> {
        if start > end {
            return Ok(());
        }
        self.clear_rows(&(start..=end).collect::<Vec<_>>())
    }

    /// Reset the rows at `indices`.
    pub fn clear_indices(&self, indices: &[usize]) -> Result<()> {
        self.clear_rows(indices)
    }

    /// Reset every row.
    pub fn clear_all(&self) -> Result<()> {
        let count = self.item_count();
        self.clear_rows(&(0..count).collect::<Vec<_>>())
    }

    fn clear_rows(&self, indices: &[usize]) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            for index in indices {
                inner.check_index(*index)?;
            }
            for index in indices {
                // Rows that were never built have nothing to reset.
                if let Some(id) = inner.rows.child_slot(None, *index)?
                    && inner.rows.is_materialized(id)
                {
                    inner.rows.clear(id, false)?;
                }
            }
        }
        self.refresh();
        Ok(())
    }

    /// Set the text of one column.
    pub fn set_text(&self, index: usize, column: usize, text: impl Into<String>) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            let id = inner.rows.resolve(None, index)?;
            if let Some(item) = inner.rows.get_mut(id) {
                item.data.set_text(column, text);
                item.set_cached(true);
            }
        }
        self.refresh();
        Ok(())
    }

    /// Text of one column, populating a virtual row first.
    pub fn text(&self, index: usize, column: usize) -> Result<String> {
        self.check_live()?;
        let id = self.ensure_data(index)?;
        let inner = self.inner.borrow();
        let item = inner.rows.get(id).ok_or(rowmap::Error::InvalidItem(id))?;
        Ok(item.data.text(column).to_string())
    }

    /// Set the check box state of a row.
    pub fn set_checked(&self, index: usize, checked: bool) -> Result<()> {
        self.check_live()?;
        {
            let mut inner = self.inner.borrow_mut();
            let id = inner.rows.resolve(None, index)?;
            if let Some(item) = inner.rows.get_mut(id) {
                item.data.checked = checked;
            }
        }
        self.refresh();
        Ok(())
    }

    /// Check box state of a row, populating a virtual row first.
    pub fn checked(&self, index: usize) -> Result<bool> {
        self.check_live()?;
        let id = self.ensure_data(index)?;
        let inner = self.inner.borrow();
        Ok(inner.rows.get(id).is_some_and(|item| item.data.checked))
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

    /// Select the row at `index`. Does not raise events.
    pub fn select(&self, index: usize) -> Result<()> {
        self.check_live()?;
        let mut inner = self.inner.borrow_mut();
        inner.check_index(index)?;
        let mode = inner.selection_mode;
        if inner.selection.select(index, mode) {
            inner.anchor.disarm();
        }
        Ok(())
    }

    /// Select `start..=end`. Outside multiple mode only a single row can be
    /// selected this way.
    pub fn select_range(&self, start: usize, end: usize) -> Result<()> {
        self.check_live()?;
        let mut inner = self.inner.borrow_mut();
        if start > end {
            return Ok(());
        }
        inner.check_index(end)?;
        let mode = inner.selection_mode;
        if mode != SelectionMode::Multiple && start != end {
            return Ok(());
        }
        for index in start..=end {
            inner.selection.select(index, mode);
        }
        inner.anchor.disarm();
        Ok(())
    }

    /// Deselect the row at `index`.
    ///
    /// Deselecting the last selected row remembers it as the navigation
    /// anchor.
    pub fn deselect(&self, index: usize) -> Result<()> {
        self.check_live()?;
        let mut inner = self.inner.borrow_mut();
        inner.check_index(index)?;
        if inner.selection.deselect(index) && inner.selection.is_empty() {
            inner.anchor.arm(index);
        }
        Ok(())
    }

    /// Deselect every row, anchoring at the most recently selected one.
    pub fn deselect_all(&self) {
        let mut inner = self.inner.borrow_mut();
        let last = inner
            .selection
            .focus()
            .filter(|focus| inner.selection.is_selected(*focus))
            .or_else(|| inner.selection.selected().last().copied());
        inner.selection.clear();
        if let Some(index) = last {
            inner.anchor.arm(index);
        }
    }

    /// Selected logical indices in ascending order.
    pub fn selection_indices(&self) -> Vec<usize> {
        self.inner.borrow().selection.selected()
    }

    /// Check if the row at `index` is selected.
    pub fn is_selected(&self, index: usize) -> bool {
        self.inner.borrow().selection.is_selected(index)
    }

    /// Number of selected rows.
    pub fn selection_count(&self) -> usize {
        self.inner.borrow().selection.len()
    }

    /// The remembered navigation anchor, if any.
    pub fn anchor(&self) -> Option<usize> {
        self.inner.borrow().anchor.index()
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Set the sort direction. Rows are presented reversed when descending.
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

    /// The host row id presenting logical row `index`.
    pub fn row_id(&self, index: usize) -> Option<ItemId> {
        let inner = self.inner.borrow();
        inner.order.get_id(index, inner.count())
    }

    /// The logical row presented under a raw host row id.
    pub fn row_index(&self, raw_id: u32) -> Option<usize> {
        let inner = self.inner.borrow();
        inner.order.get_index(ItemId::new(raw_id)?, inner.count())
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Suspend or resume host updates.
    ///
    /// Resuming trims spare capacity (if configured) and sends one update if
    /// anything changed in between.
    pub fn set_redraw(&self, redraw: bool) {
        {
            let mut inner = self.inner.borrow_mut();
            inner.redraw = redraw;
            if redraw && inner.rows.config().trim_on_redraw {
                inner.rows.trim();
            }
        }
        if redraw && self.dirty.replace(false) {
            self.host.update_items();
        }
    }

    /// Release every row and drop all listeners. Later calls fail with
    /// [`Error::Disposed`].
    pub fn dispose(&self) {
        if self.disposed.replace(true) {
            return;
        }
        self.listeners.borrow_mut().clear();
        let mut inner = self.inner.borrow_mut();
        let _ = inner.rows.remove_all(None);
        inner.selection.clear();
        inner.anchor.on_clear();
        debug!("{}: disposed", self.id);
    }

    /// Check if the table was disposed.
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Register a listener for one event kind.
    pub fn add_listener(&self, kind: EventKind, listener: impl Fn(&Table, &TableEvent) + 'static) {
        self.listeners.borrow_mut().add(kind, Rc::new(listener));
    }
}
