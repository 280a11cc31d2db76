//! Error types

use crate::id::ItemId;

/// Errors raised by public identity table operations.
///
/// Every error is produced before the table is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An index fell outside `[0, count)` (or `[0, count]` for inserts).
    #[error("Index {index} out of range (count {count})")]
    InvalidRange {
        /// The offending index.
        index: usize,
        /// The container's item count at the time of the call.
        count: usize,
    },

    /// An item id is not materialized in the table (released or never built).
    #[error("Item {0} is not in the table")]
    InvalidItem(ItemId),
}

impl Error {
    /// Creates a new range error.
    pub fn range(index: usize, count: usize) -> Self {
        Self::InvalidRange { index, count }
    }
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;
