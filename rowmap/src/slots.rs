//! Dense child slot arrays.
//!
//! Every container (the root of a tree or table, or any materialized item)
//! owns a [`ChildSlots`]. A slot holds either an id or `None`, meaning the
//! row exists count-wise but no id has been reserved for it yet.

use std::cell::Cell;

use crate::id::ItemId;

/// Round `count` up to a multiple of `chunk`, never below one chunk.
pub(crate) fn rounded_capacity(count: usize, chunk: usize) -> usize {
    let chunk = chunk.max(1);
    chunk.max(count.div_ceil(chunk) * chunk)
}

/// The child slot array of one container.
///
/// Invariant: slots at positions `>= len()` are always `None`.
#[derive(Debug, Clone, Default)]
pub struct ChildSlots {
    slots: Vec<Option<ItemId>>,
    count: usize,
    /// Last index returned by `position`, checked first on the next lookup.
    last_hit: Cell<usize>,
}

impl ChildSlots {
    /// Create an empty slot array.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of logical children (allocated or not).
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the container has no children.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Current backing capacity.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// The slot at `index`, or `None` if `index >= len()`.
    pub fn get(&self, index: usize) -> Option<Option<ItemId>> {
        self.as_slice().get(index).copied()
    }

    /// Overwrite the slot at `index`. Returns false if out of range.
    pub fn set(&mut self, index: usize, slot: Option<ItemId>) -> bool {
        if index >= self.count {
            return false;
        }
        self.slots[index] = slot;
        true
    }

    /// The live part of the slot array.
    pub fn as_slice(&self) -> &[Option<ItemId>] {
        &self.slots[..self.count]
    }

    /// All allocated ids, in child order.
    pub fn ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.as_slice().iter().flatten().copied()
    }

    /// Indices of slots with no id yet.
    pub fn unallocated(&self) -> impl Iterator<Item = usize> + '_ {
        self.as_slice()
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_none())
            .map(|(index, _)| index)
    }

    /// Insert a slot at `index`, shifting later slots right.
    ///
    /// `index` must be `<= len()`; callers validate the range.
    pub fn insert(&mut self, index: usize, slot: Option<ItemId>, chunk: usize) {
        debug_assert!(index <= self.count);
        if self.count == self.slots.len() {
            let grown = self.slots.len() + chunk.max(1);
            self.slots.resize(grown, None);
        }
        self.slots[index..=self.count].rotate_right(1);
        self.slots[index] = slot;
        self.count += 1;
    }

    /// Remove the slot at `index`, compacting the array.
    pub fn remove(&mut self, index: usize) -> Option<ItemId> {
        if index >= self.count {
            return None;
        }
        let removed = self.slots[index];
        self.slots[index..self.count].rotate_left(1);
        self.count -= 1;
        self.slots[self.count] = None;
        removed
    }

    /// Change the logical child count.
    ///
    /// Growing adds unallocated slots. Shrinking drops the trailing slots and
    /// returns the ids they held, last child first.
    pub fn resize(&mut self, count: usize, chunk: usize) -> Vec<ItemId> {
        let mut dropped = Vec::new();
        if count < self.count {
            for index in (count..self.count).rev() {
                if let Some(id) = self.slots[index].take() {
                    dropped.push(id);
                }
            }
        }
        let needed = rounded_capacity(count, chunk);
        if needed > self.slots.len() {
            self.slots.resize(needed, None);
        }
        self.count = count;
        dropped
    }

    /// Drop every slot, returning the ids that were allocated.
    pub fn clear(&mut self) -> Vec<ItemId> {
        let ids = self.ids().collect();
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.count = 0;
        self.last_hit.set(0);
        ids
    }

    /// Shrink spare capacity down to the rounded child count.
    pub fn trim(&mut self, chunk: usize) {
        let wanted = rounded_capacity(self.count, chunk);
        if wanted < self.slots.len() {
            self.slots.truncate(wanted);
            self.slots.shrink_to_fit();
        }
    }

    /// Index of the child holding `id`.
    ///
    /// Checks the neighbourhood of the previous hit first, then scans from
    /// whichever end is closer to it.
    pub fn position(&self, id: ItemId) -> Option<usize> {
        let slots = self.as_slice();
        let hint = self.last_hit.get();
        if 1 <= hint && hint + 1 < slots.len() {
            for candidate in [hint, hint + 1, hint - 1] {
                if slots[candidate] == Some(id) {
                    self.last_hit.set(candidate);
                    return Some(candidate);
                }
            }
        }
        let found = if hint < slots.len() / 2 {
            slots.iter().position(|slot| *slot == Some(id))
        } else {
            slots.iter().rposition(|slot| *slot == Some(id))
        };
        if let Some(index) = found {
            self.last_hit.set(index);
        }
        found
    }

    /// Check if `id` occupies one of the slots.
    pub fn contains(&self, id: ItemId) -> bool {
        self.as_slice().contains(&Some(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u32) -> ItemId {
        ItemId::new(raw).unwrap()
    }

    #[test]
    fn test_insert_grows_by_chunk() {
        let mut slots = ChildSlots::new();
        for n in 1..=5 {
            slots.insert(slots.len(), Some(id(n)), 4);
        }
        assert_eq!(slots.len(), 5);
        assert_eq!(slots.capacity(), 8);
        assert_eq!(slots.ids().map(ItemId::get).collect::<Vec<_>>(), [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_insert_in_middle_shifts_right() {
        let mut slots = ChildSlots::new();
        slots.insert(0, Some(id(1)), 4);
        slots.insert(1, Some(id(3)), 4);
        slots.insert(1, Some(id(2)), 4);
        assert_eq!(slots.as_slice(), &[Some(id(1)), Some(id(2)), Some(id(3))]);
    }

    #[test]
    fn test_remove_compacts() {
        let mut slots = ChildSlots::new();
        slots.resize(3, 4);
        slots.set(0, Some(id(7)));
        slots.set(2, Some(id(9)));
        assert_eq!(slots.remove(0), Some(id(7)));
        assert_eq!(slots.as_slice(), &[None, Some(id(9))]);
        assert_eq!(slots.remove(5), None);
        assert_eq!(slots.capacity(), 4);
    }

    #[test]
    fn test_resize_shrink_returns_trailing_ids() {
        let mut slots = ChildSlots::new();
        slots.resize(4, 4);
        slots.set(1, Some(id(2)));
        slots.set(3, Some(id(4)));
        let dropped = slots.resize(1, 4);
        assert_eq!(dropped, vec![id(4), id(2)]);
        assert_eq!(slots.len(), 1);
        // Growing again exposes clean, unallocated slots.
        slots.resize(4, 4);
        assert_eq!(slots.unallocated().collect::<Vec<_>>(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_position_uses_hint_and_both_directions() {
        let mut slots = ChildSlots::new();
        for n in 1..=10 {
            slots.insert(slots.len(), Some(id(n)), 4);
        }
        assert_eq!(slots.position(id(8)), Some(7));
        assert_eq!(slots.position(id(9)), Some(8));
        assert_eq!(slots.position(id(2)), Some(1));
        assert_eq!(slots.position(id(42)), None);
    }

    #[test]
    fn test_trim_keeps_rounded_capacity() {
        let mut slots = ChildSlots::new();
        slots.resize(20, 4);
        slots.resize(5, 4);
        assert_eq!(slots.capacity(), 20);
        slots.trim(4);
        assert_eq!(slots.capacity(), 8);
        assert_eq!(rounded_capacity(0, 4), 4);
    }
}
