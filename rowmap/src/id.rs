//! Native-visible item identifiers.

use std::num::NonZeroU32;

/// A 1-based item id as seen by the native host.
///
/// Raw id `0` means "no item" in native callbacks, so it cannot be
/// represented here. An unallocated child slot is `Option::<ItemId>::None`,
/// which has the same size as the id itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(NonZeroU32);

impl ItemId {
    /// Wrap a raw native id. Returns `None` for `0`.
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    /// The raw native id.
    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Position of this id in the dense `items` array (`id - 1`).
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }

    /// The id stored at a dense `items` position.
    pub fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index + 1).unwrap_or(u32::MAX);
        Self(NonZeroU32::new(raw).unwrap_or(NonZeroU32::MAX))
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<ItemId> for u32 {
    fn from(id: ItemId) -> Self {
        id.get()
    }
}
