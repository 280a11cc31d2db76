//! The identity table.
//!
//! Owns the dense `items` array (indexed by `id - 1`) and the root
//! container's child slots. Every materialized item owns the slot array of
//! its own children, so the live containers are the root plus every entry
//! in `items`.

use std::iter;

use log::{debug, trace};

use crate::config::TableConfig;
use crate::error::{Error, Result};
use crate::id::ItemId;
use crate::item::LogicalItem;
use crate::slots::{ChildSlots, rounded_capacity};

/// Outcome of removing one child from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// The container the child was removed from.
    pub parent: Option<ItemId>,
    /// The child's index before removal.
    pub index: usize,
    /// The id the slot held, `None` if it was unallocated.
    pub id: Option<ItemId>,
    /// Every id that left the table, descendants included.
    pub released: Vec<ItemId>,
}

/// Outcome of changing a container's child count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountChange {
    /// Ids created or reserved for the new trailing children.
    pub added: Vec<ItemId>,
    /// Ids released with the dropped trailing children.
    pub removed: Vec<ItemId>,
}

/// Sparse, virtualization-aware mapping between native ids and items.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    items: Vec<Option<LogicalItem>>,
    root: ChildSlots,
    config: TableConfig,
}

impl IdentityTable {
    /// Create an empty table with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty table.
    pub fn with_config(config: TableConfig) -> Self {
        Self {
            items: Vec::new(),
            root: ChildSlots::new(),
            config,
        }
    }

    /// The table configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Whether items are created on demand.
    pub fn is_virtual(&self) -> bool {
        self.config.virtual_items
    }

    // -------------------------------------------------------------------------
    // Lookup
    // -------------------------------------------------------------------------

    /// The materialized item owning `id`.
    pub fn get(&self, id: ItemId) -> Option<&LogicalItem> {
        self.items.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutable access to the materialized item owning `id`.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut LogicalItem> {
        self.items.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Check if a `LogicalItem` has been built for `id`.
    pub fn is_materialized(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Check if `id` is in use: materialized, or held by a live container slot.
    pub fn is_reserved(&self, id: ItemId) -> bool {
        self.is_materialized(id) || self.containers().any(|slots| slots.contains(id))
    }

    /// Number of materialized items.
    pub fn materialized_count(&self) -> usize {
        self.items.iter().flatten().count()
    }

    /// Iterate over every materialized item.
    pub fn iter(&self) -> impl Iterator<Item = &LogicalItem> {
        self.items.iter().flatten()
    }

    /// Length of the dense `items` array.
    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    /// The child slots of a container (`None` is the root).
    pub fn children(&self, parent: Option<ItemId>) -> Result<&ChildSlots> {
        match parent {
            None => Ok(&self.root),
            Some(id) => self
                .get(id)
                .map(|item| &item.children)
                .ok_or(Error::InvalidItem(id)),
        }
    }

    fn children_mut(&mut self, parent: Option<ItemId>) -> Result<&mut ChildSlots> {
        match parent {
            None => Ok(&mut self.root),
            Some(id) => self
                .get_mut(id)
                .map(|item| &mut item.children)
                .ok_or(Error::InvalidItem(id)),
        }
    }

    /// Number of children of a container.
    pub fn child_count(&self, parent: Option<ItemId>) -> Result<usize> {
        self.children(parent).map(ChildSlots::len)
    }

    /// The raw slot at `index`: `Some(id)` if allocated, `None` if not.
    pub fn child_slot(&self, parent: Option<ItemId>, index: usize) -> Result<Option<ItemId>> {
        let slots = self.children(parent)?;
        slots.get(index).ok_or(Error::range(index, slots.len()))
    }

    /// The parent of a materialized item.
    pub fn parent_of(&self, id: ItemId) -> Result<Option<ItemId>> {
        self.get(id).map(LogicalItem::parent).ok_or(Error::InvalidItem(id))
    }

    /// Index of a materialized item within its parent.
    pub fn index_of(&self, id: ItemId) -> Result<usize> {
        let parent = self.parent_of(id)?;
        self.children(parent)?
            .position(id)
            .ok_or(Error::InvalidItem(id))
    }

    /// Find the container and index holding `id`, materialized or not.
    ///
    /// Never builds an item, so host sort passes can call it freely.
    pub fn position_of(&self, id: ItemId) -> Option<(Option<ItemId>, usize)> {
        if let Some(item) = self.get(id) {
            let parent = item.parent;
            return self
                .children(parent)
                .ok()?
                .position(id)
                .map(|index| (parent, index));
        }
        if let Some(index) = self.root.position(id) {
            return Some((None, index));
        }
        self.iter().find_map(|item| {
            item.children
                .position(id)
                .map(|index| (Some(item.id), index))
        })
    }

    /// The root container followed by every materialized item's container.
    fn containers(&self) -> impl Iterator<Item = &ChildSlots> {
        iter::once(&self.root).chain(self.items.iter().flatten().map(|item| &item.children))
    }

    // -------------------------------------------------------------------------
    // Allocation
    // -------------------------------------------------------------------------

    /// Occupancy of the id space: materialized items plus every id held by a
    /// live container slot.
    fn reserved_set(&self) -> Vec<bool> {
        let max_slot = self
            .containers()
            .flat_map(ChildSlots::ids)
            .map(|id| id.index() + 1)
            .max()
            .unwrap_or(0);
        let mut reserved = vec![false; self.items.len().max(max_slot)];
        for (index, item) in self.items.iter().enumerate() {
            reserved[index] = item.is_some();
        }
        for id in self.containers().flat_map(ChildSlots::ids) {
            reserved[id.index()] = true;
        }
        reserved
    }

    /// Hand out `count` ids that collide with no live or reserved id.
    ///
    /// Free ids below the current maximum are recycled first; the id space
    /// grows past it only when none are left. The ids stay free until they
    /// are stored in a slot or materialized, so callers store them before
    /// allocating again.
    ///
    /// Each call rebuilds the occupancy set from every live container, which
    /// is O(n) in the id space. [`resolve`](Self::resolve) allocates one id
    /// per call, so building n rows one at a time costs O(n^2) overall;
    /// prefer [`reserve_unallocated`](Self::reserve_unallocated) or
    /// [`set_child_count`](Self::set_child_count) for bulk reservation.
    pub fn allocate(&self, count: usize) -> Vec<ItemId> {
        let reserved = self.reserved_set();
        let mut ids: Vec<ItemId> = reserved
            .iter()
            .enumerate()
            .filter(|(_, taken)| !**taken)
            .map(|(index, _)| ItemId::from_index(index))
            .take(count)
            .collect();
        let recycled = ids.len();
        let mut next = reserved.len();
        while ids.len() < count {
            ids.push(ItemId::from_index(next));
            next += 1;
        }
        debug!(
            "allocated {} ids ({} recycled, id space {})",
            count,
            recycled,
            reserved.len()
        );
        ids
    }

    fn allocate_one(&self) -> ItemId {
        self.allocate(1)
            .pop()
            .unwrap_or_else(|| ItemId::from_index(self.items.len()))
    }

    /// Build the `LogicalItem` for an id that has a slot in `parent`.
    fn materialize(&mut self, id: ItemId, parent: Option<ItemId>) -> &mut LogicalItem {
        let index = id.index();
        if index >= self.items.len() {
            let len = rounded_capacity(index + 1, self.config.chunk());
            self.items.resize_with(len, || None);
        }
        let cached = !self.config.virtual_items;
        trace!("materialized {} under {:?}", id, parent);
        self.items[index].insert(LogicalItem::new(id, parent, cached))
    }

    // -------------------------------------------------------------------------
    // Resolution
    // -------------------------------------------------------------------------

    /// The item at `(parent, index)`, reserving and building it on first use.
    ///
    /// Repeated calls without an intervening structural change return the
    /// same id.
    pub fn resolve(&mut self, parent: Option<ItemId>, index: usize) -> Result<ItemId> {
        let id = match self.child_slot(parent, index)? {
            Some(id) => id,
            None => {
                let id = self.allocate_one();
                self.children_mut(parent)?.set(index, Some(id));
                id
            }
        };
        if !self.is_materialized(id) {
            self.materialize(id, parent);
        }
        Ok(id)
    }

    /// Resolve an id handed back by the native host.
    ///
    /// Materializes the item if the id is only reserved in some container.
    /// Returns `None` for ids that are not tracked anywhere (stale ids).
    pub fn resolve_by_id(&mut self, id: ItemId) -> Option<ItemId> {
        if self.is_materialized(id) {
            return Some(id);
        }
        let Some((parent, _)) = self.position_of(id) else {
            trace!("stale id {}", id);
            return None;
        };
        self.materialize(id, parent);
        Some(id)
    }

    // -------------------------------------------------------------------------
    // Structural edits
    // -------------------------------------------------------------------------

    /// Create an item at `index` (appending when `None`).
    pub fn insert(&mut self, parent: Option<ItemId>, index: Option<usize>) -> Result<ItemId> {
        let count = self.child_count(parent)?;
        let index = index.unwrap_or(count);
        if index > count {
            return Err(Error::range(index, count));
        }
        let id = self.allocate_one();
        let chunk = self.config.chunk();
        self.children_mut(parent)?.insert(index, Some(id), chunk);
        // Explicitly created items carry their own data.
        self.materialize(id, parent).cached = true;
        Ok(id)
    }

    /// Change a container's child count.
    ///
    /// Shrinking releases the trailing children. Growing creates items
    /// eagerly for non-virtual tables; virtual tables reserve ids when
    /// `reserve` is set (the container is visible to the host) and otherwise
    /// leave the new slots unallocated.
    pub fn set_child_count(
        &mut self,
        parent: Option<ItemId>,
        count: usize,
        reserve: bool,
    ) -> Result<CountChange> {
        let old = self.child_count(parent)?;
        let chunk = self.config.chunk();
        let mut change = CountChange::default();
        if count < old {
            let dropped = self.children_mut(parent)?.resize(count, chunk);
            for id in dropped {
                self.release_subtree(id, &mut change.removed);
            }
        } else if count > old {
            let eager = !self.config.virtual_items;
            let ids = if eager || reserve {
                self.allocate(count - old)
            } else {
                Vec::new()
            };
            let slots = self.children_mut(parent)?;
            slots.resize(count, chunk);
            for (offset, id) in ids.iter().enumerate() {
                slots.set(old + offset, Some(*id));
            }
            if eager {
                for id in &ids {
                    self.materialize(*id, parent);
                }
            }
            change.added = ids;
        }
        debug!(
            "child count of {:?}: {} -> {} (+{} -{})",
            parent,
            old,
            count,
            change.added.len(),
            change.removed.len()
        );
        Ok(change)
    }

    /// Reserve ids for every unallocated slot of a container.
    ///
    /// Returns the newly reserved ids.
    pub fn reserve_unallocated(&mut self, parent: Option<ItemId>) -> Result<Vec<ItemId>> {
        let open: Vec<usize> = self.children(parent)?.unallocated().collect();
        let ids = self.allocate(open.len());
        let slots = self.children_mut(parent)?;
        for (index, id) in open.into_iter().zip(&ids) {
            slots.set(index, Some(*id));
        }
        Ok(ids)
    }

    /// Turn reserved-but-unmaterialized slots back into unallocated slots.
    ///
    /// Returns the ids that were given up.
    pub fn drop_reservations(&mut self, parent: Option<ItemId>) -> Result<Vec<ItemId>> {
        let pending: Vec<(usize, ItemId)> = self
            .children(parent)?
            .as_slice()
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|id| (index, id)))
            .filter(|(_, id)| !self.is_materialized(*id))
            .collect();
        let slots = self.children_mut(parent)?;
        for (index, _) in &pending {
            slots.set(*index, None);
        }
        Ok(pending.into_iter().map(|(_, id)| id).collect())
    }

    /// Remove the child at `index`, releasing its subtree.
    pub fn remove_child(&mut self, parent: Option<ItemId>, index: usize) -> Result<Removed> {
        let count = self.child_count(parent)?;
        if index >= count {
            return Err(Error::range(index, count));
        }
        let id = self.children_mut(parent)?.remove(index);
        let mut released = Vec::new();
        if let Some(id) = id {
            self.release_subtree(id, &mut released);
        }
        Ok(Removed {
            parent,
            index,
            id,
            released,
        })
    }

    /// Undo a [`resolve`](Self::resolve) that filled an unallocated slot:
    /// the slot becomes unallocated again and the item is dropped.
    ///
    /// Returns the id that was given up, `None` if the slot was empty.
    pub fn vacate(&mut self, parent: Option<ItemId>, index: usize) -> Result<Option<ItemId>> {
        let Some(id) = self.child_slot(parent, index)? else {
            return Ok(None);
        };
        self.children_mut(parent)?.set(index, None);
        let mut released = Vec::new();
        self.release_subtree(id, &mut released);
        trace!("vacated {} under {:?} ({} ids)", id, parent, released.len());
        Ok(Some(id))
    }

    /// Release an id wherever it lives, compacting its parent's slots.
    pub fn release(&mut self, id: ItemId) -> Result<Removed> {
        let (parent, index) = self.position_of(id).ok_or(Error::InvalidItem(id))?;
        self.remove_child(parent, index)
    }

    /// Release every child of a container. Returns all released ids.
    pub fn remove_all(&mut self, parent: Option<ItemId>) -> Result<Vec<ItemId>> {
        let ids = self.children_mut(parent)?.clear();
        let mut released = Vec::new();
        for id in ids {
            self.release_subtree(id, &mut released);
        }
        debug!("removed all {} ids under {:?}", released.len(), parent);
        Ok(released)
    }

    fn release_subtree(&mut self, id: ItemId, out: &mut Vec<ItemId>) {
        out.push(id);
        let Some(item) = self.items.get_mut(id.index()).and_then(Option::take) else {
            return;
        };
        for child in item.children.ids() {
            self.release_subtree(child, out);
        }
    }

    /// Reset an item's data so it is requested again, optionally for the
    /// whole materialized subtree.
    pub fn clear(&mut self, id: ItemId, all: bool) -> Result<()> {
        let virtual_items = self.config.virtual_items;
        let item = self.get_mut(id).ok_or(Error::InvalidItem(id))?;
        item.data = Default::default();
        item.cached = !virtual_items;
        if all {
            let children: Vec<ItemId> = item.children.ids().collect();
            for child in children {
                if self.is_materialized(child) {
                    self.clear(child, true)?;
                }
            }
        }
        Ok(())
    }

    /// Record the expanded state of an item.
    pub fn set_expanded(&mut self, id: ItemId, expanded: bool) -> Result<()> {
        self.get_mut(id)
            .map(|item| item.set_expanded(expanded))
            .ok_or(Error::InvalidItem(id))
    }

    /// Shrink spare capacity of `items` and of every container.
    pub fn trim(&mut self) {
        let chunk = self.config.chunk();
        let used = self
            .items
            .iter()
            .rposition(Option::is_some)
            .map_or(0, |last| last + 1);
        let wanted = rounded_capacity(used, chunk);
        if wanted < self.items.len() {
            self.items.truncate(wanted);
            self.items.shrink_to_fit();
        }
        self.root.trim(chunk);
        for item in self.items.iter_mut().flatten() {
            item.children.trim(chunk);
        }
        debug!("trimmed id table to {}", self.items.len());
    }
}
