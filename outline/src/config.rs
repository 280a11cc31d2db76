//! Widget configuration

use rowmap::TableConfig;
use serde::{Deserialize, Serialize};

use crate::selection::SelectionMode;

/// Configuration for a [`Tree`](crate::Tree) or [`Table`](crate::Table).
///
/// The identity table settings are flattened into the same JSON object:
///
/// ```
/// use outline::{SelectionMode, WidgetConfig};
///
/// let config: WidgetConfig =
///     serde_json::from_str(r#"{ "virtual_items": true, "selection_mode": "Multiple" }"#).unwrap();
/// assert!(config.table.virtual_items);
/// assert_eq!(config.selection_mode, SelectionMode::Multiple);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Identity table settings.
    #[serde(flatten)]
    pub table: TableConfig,

    /// How rows may be selected.
    ///
    /// Default: Single
    pub selection_mode: SelectionMode,
}

impl WidgetConfig {
    /// Creates a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config for on-demand (virtual) items.
    pub fn on_demand() -> Self {
        Self::default().with_table(TableConfig::on_demand())
    }

    /// Sets the identity table configuration.
    pub fn with_table(mut self, table: TableConfig) -> Self {
        self.table = table;
        self
    }

    /// Sets the selection mode.
    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }
}
