//! Logical items and the display data attached to them.

use crate::id::ItemId;
use crate::slots::ChildSlots;

/// Display data supplied by application code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemData {
    /// Per-column texts. Missing columns read as empty.
    pub texts: Vec<String>,
    /// Check box state.
    pub checked: bool,
    /// Grayed (indeterminate) check state.
    pub grayed: bool,
}

impl ItemData {
    /// Text of a column, empty if never set.
    pub fn text(&self, column: usize) -> &str {
        self.texts.get(column).map(String::as_str).unwrap_or("")
    }

    /// Set the text of a column, padding earlier columns with empty strings.
    pub fn set_text(&mut self, column: usize, text: impl Into<String>) {
        if self.texts.len() <= column {
            self.texts.resize(column + 1, String::new());
        }
        self.texts[column] = text.into();
    }
}

/// A property the native host can ask about a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    /// Display text of a column.
    Text(usize),
    /// Check box state.
    Checked,
    /// Grayed check state.
    Grayed,
    /// Whether the row can be expanded.
    IsContainer,
    /// Number of children.
    ChildCount,
}

/// Value returned for a [`Property`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Text(String),
    Bool(bool),
    Count(usize),
}

/// One materialized row or node.
#[derive(Debug, Clone)]
pub struct LogicalItem {
    pub(crate) id: ItemId,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: ChildSlots,
    pub(crate) cached: bool,
    pub(crate) expanded: bool,
    /// Application display data.
    pub data: ItemData,
}

impl LogicalItem {
    pub(crate) fn new(id: ItemId, parent: Option<ItemId>, cached: bool) -> Self {
        Self {
            id,
            parent,
            children: ChildSlots::new(),
            cached,
            expanded: false,
            data: ItemData::default(),
        }
    }

    /// The id this item owns.
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// The parent item, `None` for roots.
    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    /// The child slot array.
    pub fn children(&self) -> &ChildSlots {
        &self.children
    }

    /// Whether application data has been fetched.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// Mark application data as fetched (or not).
    pub fn set_cached(&mut self, cached: bool) {
        self.cached = cached;
    }

    /// Whether the item is expanded in the host.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub(crate) fn set_expanded(&mut self, expanded: bool) {
        self.expanded = expanded;
    }

    /// Read a property for the native host.
    pub fn property(&self, property: Property) -> PropertyValue {
        match property {
            Property::Text(column) => PropertyValue::Text(self.data.text(column).to_string()),
            Property::Checked => PropertyValue::Bool(self.data.checked),
            Property::Grayed => PropertyValue::Bool(self.data.grayed),
            Property::IsContainer => PropertyValue::Bool(!self.children.is_empty()),
            Property::ChildCount => PropertyValue::Count(self.children.len()),
        }
    }
}
