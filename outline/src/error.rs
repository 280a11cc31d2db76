//! Error types

use crate::host::{HostError, NativeHandle};

/// Errors returned by the public widget API.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The identity table rejected the request (bad index or item).
    #[error(transparent)]
    Table(#[from] rowmap::Error),

    /// The native host refused to add ids. Nothing was committed.
    #[error("Item not added: {0}")]
    ItemNotAdded(HostError),

    /// The native host refused to remove ids. Nothing was committed.
    #[error("Item not removed: {0}")]
    ItemNotRemoved(HostError),

    /// The widget was disposed.
    #[error("Widget is disposed")]
    Disposed,

    /// A widget is already registered under this native handle.
    #[error("Native handle {0} is already registered")]
    DuplicateHandle(NativeHandle),
}

/// Convenience result alias.
pub type Result<T> = std::result::Result<T, Error>;
