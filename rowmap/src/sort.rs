//! Sort-direction aware translation between logical indices and row ids.
//!
//! Row ids are positional labels recomputed on every call, never stored per
//! item, so flipping the direction only needs a resync of the host.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::id::ItemId;

/// Direction of the active sort indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    /// No sort indicator; rows appear in creation order.
    #[default]
    None,
    /// Ascending.
    Up,
    /// Descending; rows appear in reverse creation order.
    Down,
}

impl SortDirection {
    /// Whether rows are presented reversed.
    pub fn is_descending(self) -> bool {
        self == SortDirection::Down
    }
}

/// Translates positions for a flat row set of `count` rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowOrder {
    direction: SortDirection,
}

impl RowOrder {
    /// Create a translator for a sort direction.
    pub fn new(direction: SortDirection) -> Self {
        Self { direction }
    }

    /// The active direction.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Change the active direction. Returns true if it changed.
    pub fn set_direction(&mut self, direction: SortDirection) -> bool {
        let changed = self.direction != direction;
        self.direction = direction;
        changed
    }

    /// Row id for a logical index, `None` if `index >= count`.
    ///
    /// Ascending or unsorted: `index + 1`. Descending: `count - index`.
    pub fn get_id(&self, index: usize, count: usize) -> Option<ItemId> {
        if index >= count {
            return None;
        }
        let raw = if self.direction.is_descending() {
            count - index
        } else {
            index + 1
        };
        ItemId::new(u32::try_from(raw).ok()?)
    }

    /// Logical index for a row id; the exact inverse of [`get_id`](Self::get_id).
    ///
    /// Returns `None` for ids outside `1..=count`.
    pub fn get_index(&self, id: ItemId, count: usize) -> Option<usize> {
        let raw = id.get() as usize;
        if raw > count {
            return None;
        }
        Some(if self.direction.is_descending() {
            count - raw
        } else {
            raw - 1
        })
    }

    /// Order two row ids by their logical index.
    ///
    /// Ids that do not map to a row sort after every valid row.
    pub fn compare(&self, a: ItemId, b: ItemId, count: usize) -> Ordering {
        match (self.get_index(a, count), self.get_index(b, count)) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(&b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inverse_law_both_directions() {
        for direction in [SortDirection::None, SortDirection::Up, SortDirection::Down] {
            let order = RowOrder::new(direction);
            for count in 1..=17 {
                for index in 0..count {
                    let id = order.get_id(index, count).unwrap();
                    assert_eq!(order.get_index(id, count), Some(index));
                }
            }
        }
    }

    #[test]
    fn test_out_of_range() {
        let order = RowOrder::new(SortDirection::Down);
        assert_eq!(order.get_id(3, 3), None);
        assert_eq!(order.get_index(ItemId::new(4).unwrap(), 3), None);
    }
}
