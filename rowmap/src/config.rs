//! Identity table configuration

use serde::{Deserialize, Serialize};

/// Configuration for an [`IdentityTable`](crate::IdentityTable).
///
/// # Example
///
/// ```
/// use rowmap::TableConfig;
///
/// let config = TableConfig::default()
///     .with_virtual_items(true)
///     .with_growth_chunk(16);
/// assert!(config.virtual_items);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Create items on demand instead of when a row is inserted.
    ///
    /// Default: false
    pub virtual_items: bool,

    /// Granularity used when growing child slot arrays.
    ///
    /// Default: 4
    pub growth_chunk: usize,

    /// Shrink spare capacity when redraw is turned back on.
    ///
    /// Default: true
    pub trim_on_redraw: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            virtual_items: false,
            growth_chunk: 4,
            trim_on_redraw: true,
        }
    }
}

impl TableConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config for on-demand (virtual) items.
    pub fn on_demand() -> Self {
        Self::default().with_virtual_items(true)
    }

    /// Sets on-demand item creation.
    pub fn with_virtual_items(mut self, virtual_items: bool) -> Self {
        self.virtual_items = virtual_items;
        self
    }

    /// Sets the slot growth chunk. Values below 1 are raised to 1.
    pub fn with_growth_chunk(mut self, chunk: usize) -> Self {
        self.growth_chunk = chunk.max(1);
        self
    }

    /// Sets whether capacity is trimmed when redraw is re-enabled.
    pub fn with_trim_on_redraw(mut self, trim: bool) -> Self {
        self.trim_on_redraw = trim;
        self
    }

    /// The growth chunk, never zero even if deserialized as such.
    pub fn chunk(&self) -> usize {
        self.growth_chunk.max(1)
    }
}
