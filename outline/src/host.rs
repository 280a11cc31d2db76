//! The native host boundary.
//!
//! A native list or outline control holds one opaque integer per visible
//! row and calls back into the widget to ask for data and report user
//! actions. Structural changes flow the other way through [`NativeHost`].

use std::cell::RefCell;
use std::collections::BTreeMap;

use rowmap::ItemId;

/// Opaque handle of a native control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NativeHandle(pub u64);

impl std::fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// Row notifications delivered by the native host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notification {
    Selected,
    Deselected,
    DoubleClicked,
    ContainerOpening,
    ContainerClosing,
    ContainerOpened,
    ContainerClosed,
}

/// Why the host refused a structural call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    /// The host declined the request.
    #[error("Request refused by host")]
    Refused,

    /// The id is already held by the host.
    #[error("Id {0} is already visible")]
    AlreadyVisible(ItemId),

    /// The id is not held under the given parent.
    #[error("Id {0} is not visible")]
    NotVisible(ItemId),
}

/// Structural primitives offered by the native control.
///
/// `parent` is `None` for the root container. Implementations must not call
/// back into the widget synchronously from these methods.
pub trait NativeHost {
    /// Make `ids` visible as children of `parent`.
    fn add_items(&self, parent: Option<ItemId>, ids: &[ItemId]) -> Result<(), HostError>;

    /// Forget `ids` (and anything nested under them).
    fn remove_items(&self, parent: Option<ItemId>, ids: &[ItemId]) -> Result<(), HostError>;

    /// Resync and repaint every visible row.
    fn update_items(&self);
}

/// A call received by [`RecordingHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Add {
        parent: Option<ItemId>,
        ids: Vec<ItemId>,
    },
    Remove {
        parent: Option<ItemId>,
        ids: Vec<ItemId>,
    },
    Update,
}

#[derive(Debug, Default)]
struct RecordingState {
    calls: Vec<HostCall>,
    visible: BTreeMap<Option<ItemId>, Vec<ItemId>>,
    refuse_add: bool,
    refuse_remove: bool,
}

impl RecordingState {
    fn holds(&self, id: ItemId) -> bool {
        self.visible.values().any(|ids| ids.contains(&id))
    }

    fn forget_nested(&mut self, id: ItemId) {
        if let Some(children) = self.visible.remove(&Some(id)) {
            for child in children {
                self.forget_nested(child);
            }
        }
    }
}

/// In-memory host that records every call and tracks the visible id set.
///
/// Adding an id that is already visible anywhere is refused, so a widget
/// that hands out a colliding id fails loudly.
#[derive(Debug, Default)]
pub struct RecordingHost {
    state: RefCell<RecordingState>,
}

impl RecordingHost {
    /// Create an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every successful call so far.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.borrow().calls.clone()
    }

    /// Drain the recorded calls.
    pub fn take_calls(&self) -> Vec<HostCall> {
        std::mem::take(&mut self.state.borrow_mut().calls)
    }

    /// Number of `update_items` calls recorded.
    pub fn update_count(&self) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|call| **call == HostCall::Update)
            .count()
    }

    /// Ids visible under `parent`, in the order they were added.
    pub fn visible(&self, parent: Option<ItemId>) -> Vec<ItemId> {
        self.state
            .borrow()
            .visible
            .get(&parent)
            .cloned()
            .unwrap_or_default()
    }

    /// Check if the host holds `id` under any parent.
    pub fn is_visible(&self, id: ItemId) -> bool {
        self.state.borrow().holds(id)
    }

    /// Total number of ids the host holds.
    pub fn visible_count(&self) -> usize {
        self.state.borrow().visible.values().map(Vec::len).sum()
    }

    /// Refuse the next `add_items` call.
    pub fn refuse_next_add(&self) {
        self.state.borrow_mut().refuse_add = true;
    }

    /// Refuse the next `remove_items` call.
    pub fn refuse_next_remove(&self) {
        self.state.borrow_mut().refuse_remove = true;
    }
}

impl NativeHost for RecordingHost {
    fn add_items(&self, parent: Option<ItemId>, ids: &[ItemId]) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.refuse_add) {
            return Err(HostError::Refused);
        }
        for (position, id) in ids.iter().enumerate() {
            if state.holds(*id) || ids[..position].contains(id) {
                return Err(HostError::AlreadyVisible(*id));
            }
        }
        state.visible.entry(parent).or_default().extend(ids);
        state.calls.push(HostCall::Add {
            parent,
            ids: ids.to_vec(),
        });
        Ok(())
    }

    fn remove_items(&self, parent: Option<ItemId>, ids: &[ItemId]) -> Result<(), HostError> {
        let mut state = self.state.borrow_mut();
        if std::mem::take(&mut state.refuse_remove) {
            return Err(HostError::Refused);
        }
        let held = state.visible.get(&parent).cloned().unwrap_or_default();
        if let Some(missing) = ids.iter().find(|id| !held.contains(id)) {
            return Err(HostError::NotVisible(*missing));
        }
        if let Some(siblings) = state.visible.get_mut(&parent) {
            siblings.retain(|id| !ids.contains(id));
        }
        for id in ids {
            state.forget_nested(*id);
        }
        state.calls.push(HostCall::Remove {
            parent,
            ids: ids.to_vec(),
        });
        Ok(())
    }

    fn update_items(&self) {
        self.state.borrow_mut().calls.push(HostCall::Update);
    }
}
