//! Selection state shared by Tree and Table.
//!
//! Trees select by item id. Tables select by logical row index, which has to
//! follow rows as they are inserted and removed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Selection mode for widgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionMode {
    /// No selection allowed
    None,
    /// Single item selection
    #[default]
    Single,
    /// Multiple items can be selected
    Multiple,
}

/// Selected keys plus the most recently selected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<K> {
    selected: BTreeSet<K>,
    focus: Option<K>,
}

impl<K> Default for Selection<K> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
            focus: None,
        }
    }
}

impl<K: Ord + Copy> Selection<K> {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// All selected keys in ascending order.
    pub fn selected(&self) -> Vec<K> {
        self.selected.iter().copied().collect()
    }

    /// Check if a key is selected.
    pub fn is_selected(&self, key: K) -> bool {
        self.selected.contains(&key)
    }

    /// Get the number of selected keys.
    pub fn len(&self) -> usize {
        self.selected.len()
    }

    /// Check if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// The most recently selected key.
    pub fn focus(&self) -> Option<K> {
        self.focus
    }

    /// Apply a selection under `mode`. Returns true if anything changed.
    ///
    /// `Single` replaces the selection, `Multiple` extends it.
    pub fn select(&mut self, key: K, mode: SelectionMode) -> bool {
        match mode {
            SelectionMode::None => false,
            SelectionMode::Single => {
                let changed = self.selected.len() != 1 || !self.selected.contains(&key);
                self.selected.clear();
                self.selected.insert(key);
                self.focus = Some(key);
                changed
            }
            SelectionMode::Multiple => {
                self.focus = Some(key);
                self.selected.insert(key)
            }
        }
    }

    /// Deselect a key. Returns true if it was selected.
    pub fn deselect(&mut self, key: K) -> bool {
        self.selected.remove(&key)
    }

    /// Clear all selection.
    /// Returns the keys that were deselected.
    pub fn clear(&mut self) -> Vec<K> {
        let removed = self.selected();
        self.selected.clear();
        self.focus = None;
        removed
    }

    /// Keep only the keys for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(K) -> bool) {
        self.selected.retain(|key| keep(*key));
        if self.focus.is_some_and(|focus| !keep(focus)) {
            self.focus = None;
        }
    }
}

impl Selection<usize> {
    /// A row was inserted at `index`; later rows move down by one.
    pub fn on_insert(&mut self, index: usize) {
        let shift = |key: usize| if key >= index { key + 1 } else { key };
        self.selected = self.selected.iter().map(|key| shift(*key)).collect();
        self.focus = self.focus.map(shift);
    }

    /// The row at `index` was removed; later rows move up by one.
    pub fn on_remove(&mut self, index: usize) {
        let shift = |key: usize| if key > index { key - 1 } else { key };
        self.selected = self
            .selected
            .iter()
            .filter(|key| **key != index)
            .map(|key| shift(*key))
            .collect();
        self.focus = self.focus.filter(|focus| *focus != index).map(shift);
    }

    /// Drop indices at or past `count`.
    pub fn truncate(&mut self, count: usize) {
        self.retain(|index| index < count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_replaces() {
        let mut selection = Selection::new();
        assert!(selection.select(3, SelectionMode::Single));
        assert!(selection.select(5, SelectionMode::Single));
        assert!(!selection.select(5, SelectionMode::Single));
        assert_eq!(selection.selected(), vec![5]);
        assert!(!selection.select(1, SelectionMode::None));
    }

    #[test]
    fn test_multiple_extends() {
        let mut selection = Selection::new();
        selection.select(3, SelectionMode::Multiple);
        selection.select(1, SelectionMode::Multiple);
        assert_eq!(selection.selected(), vec![1, 3]);
        assert_eq!(selection.focus(), Some(1));
    }

    #[test]
    fn test_indices_follow_rows() {
        let mut selection = Selection::new();
        selection.select(2, SelectionMode::Multiple);
        selection.select(6, SelectionMode::Multiple);

        selection.on_insert(4);
        assert_eq!(selection.selected(), vec![2, 7]);

        selection.on_remove(2);
        assert_eq!(selection.selected(), vec![6]);
        assert_eq!(selection.focus(), Some(6));

        selection.truncate(6);
        assert!(selection.is_empty());
        assert_eq!(selection.focus(), None);
    }
}
