//! Selection anchor kept across structural edits.
//!
//! When the last selected row is deselected, its index is remembered so
//! keyboard navigation resumes from there instead of restarting at the top.

use serde::{Deserialize, Serialize};

/// Arrow keys that move the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavKey {
    Up,
    Down,
}

impl NavKey {
    /// The key moving the other way.
    pub fn reversed(self) -> Self {
        match self {
            NavKey::Up => NavKey::Down,
            NavKey::Down => NavKey::Up,
        }
    }
}

/// Anchor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorState {
    /// No anchor remembered.
    #[default]
    Idle,
    /// Selection became empty while the row at `index` was selected.
    Armed { index: usize },
}

/// Remembered navigation anchor for one container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionAnchor {
    state: AnchorState,
}

impl SelectionAnchor {
    /// Create an idle anchor.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state.
    pub fn state(&self) -> AnchorState {
        self.state
    }

    /// The remembered index, if armed.
    pub fn index(&self) -> Option<usize> {
        match self.state {
            AnchorState::Idle => None,
            AnchorState::Armed { index } => Some(index),
        }
    }

    /// Check if an anchor is remembered.
    pub fn is_armed(&self) -> bool {
        self.index().is_some()
    }

    /// Remember `index`; called when the selection count drops to zero.
    pub fn arm(&mut self, index: usize) {
        self.state = AnchorState::Armed { index };
    }

    /// Forget the anchor; called whenever any row becomes selected.
    pub fn disarm(&mut self) {
        self.state = AnchorState::Idle;
    }

    /// A row was inserted at `index`; `count` is the row count afterwards.
    pub fn on_insert(&mut self, index: usize, count: usize) {
        if let AnchorState::Armed { index: anchor } = self.state
            && index <= anchor
        {
            let shifted = (anchor + 1).min(count.saturating_sub(1));
            self.state = AnchorState::Armed { index: shifted };
        }
    }

    /// The row at `index` was removed; `count` is the row count afterwards.
    ///
    /// Removing the anchor row itself re-arms at the nearest survivor.
    pub fn on_remove(&mut self, index: usize, count: usize) {
        let AnchorState::Armed { index: anchor } = self.state else {
            return;
        };
        if count == 0 {
            self.state = AnchorState::Idle;
        } else if index < anchor {
            self.state = AnchorState::Armed { index: anchor - 1 };
        } else if index == anchor {
            self.state = AnchorState::Armed {
                index: anchor.min(count - 1),
            };
        }
    }

    /// All rows were removed.
    pub fn on_clear(&mut self) {
        self.state = AnchorState::Idle;
    }

    /// Row to select when `key` is pressed with an empty selection.
    ///
    /// Returns `None` when idle or when there are no rows.
    pub fn next(&self, key: NavKey, count: usize) -> Option<usize> {
        let anchor = self.index()?;
        if count == 0 {
            return None;
        }
        let last = count - 1;
        Some(match key {
            NavKey::Down => (anchor + 1).min(last),
            NavKey::Up => anchor.saturating_sub(1).min(last),
        })
    }
}
