//! Scripted session driving a virtual table and a lazy tree through the
//! same callbacks a native host would issue.

use std::cell::Cell;
use std::rc::Rc;

use log::{debug, info, warn};
use outline::prelude::*;
use outline::{Result, TableEvent, TreeEvent};
use serde::Serialize;

use crate::config::DemoConfig;

const TABLE_HANDLE: NativeHandle = NativeHandle(0x10);
const TREE_HANDLE: NativeHandle = NativeHandle(0x20);

/// Row the session selects and then deselects to arm the anchor.
const ANCHOR_ROW: usize = 7;

/// What the session observed, printed as JSON when it ends.
#[derive(Debug, Default, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub rows_materialized: usize,
    pub rows_populated: usize,
    /// Text of the first presented row once sorted descending.
    pub first_row_descending: Option<String>,
    /// Logical index the Down key moved to after the anchor was armed.
    pub navigated_index: Option<usize>,
    pub tree_levels_opened: usize,
    pub tree_visible_expanded: usize,
    pub tree_visible_collapsed: usize,
    pub tree_materialized: usize,
    pub host_calls: usize,
}

/// Run the table and tree sessions against in-memory hosts.
pub fn run(config: &DemoConfig) -> Result<Summary> {
    let mut display = Display::new();
    let mut summary = Summary::default();
    run_table(config, &mut display, &mut summary)?;
    run_tree(config, &mut display, &mut summary)?;
    for handle in [TABLE_HANDLE, TREE_HANDLE] {
        display.unregister(handle);
    }
    Ok(summary)
}

fn run_table(config: &DemoConfig, display: &mut Display, summary: &mut Summary) -> Result<()> {
    let host = Rc::new(RecordingHost::new());
    let table = Table::with_config(host.clone(), config.widget.clone());
    let populated = Rc::new(Cell::new(0usize));

    let counter = populated.clone();
    table.add_listener(EventKind::SetData, move |table: &Table, event: &TableEvent| {
        if let TableEvent::SetData { index, .. } = *event {
            counter.set(counter.get() + 1);
            if let Err(err) = table.set_text(index, 0, format!("Row {index}")) {
                warn!("could not fill row {}: {}", index, err);
            }
        }
    });
    table.add_listener(EventKind::Selection, |_: &Table, event: &TableEvent| {
        if let TableEvent::Selection { index, .. } = *event {
            info!("table selected row {}", index);
        }
    });
    display.register(TABLE_HANDLE, table.clone())?;

    table.set_redraw(false);
    table.set_item_count(config.rows)?;
    table.set_redraw(true);
    info!("table holds {} rows", table.item_count());

    // One visible page, as a scrolled list view would request it.
    for raw in 1..=config.page.min(config.rows) as u32 {
        display.item_data(TABLE_HANDLE, raw, Property::Text(0));
    }

    table.set_sort_direction(SortDirection::Down);
    summary.first_row_descending =
        match display.item_data(TABLE_HANDLE, 1, Property::Text(0)) {
            Some(PropertyValue::Text(text)) => Some(text),
            _ => None,
        };

    if config.rows > ANCHOR_ROW
        && let Some(row) = table.row_id(ANCHOR_ROW)
    {
        display.item_notification(TABLE_HANDLE, row.get(), Notification::Selected);
        display.item_notification(TABLE_HANDLE, row.get(), Notification::Deselected);
        table.remove(2)?;
        debug!("anchor after removal: {:?}", table.anchor());
        summary.navigated_index = display
            .navigate(TABLE_HANDLE, NavKey::Down)
            .and_then(|item| table.index_of(item).ok());
    }

    summary.rows = table.item_count();
    summary.rows_materialized = table.materialized_count();
    summary.rows_populated = populated.get();
    summary.host_calls += host.calls().len();
    Ok(())
}

fn run_tree(config: &DemoConfig, display: &mut Display, summary: &mut Summary) -> Result<()> {
    let host = Rc::new(RecordingHost::new());
    let tree = Tree::with_config(host.clone(), config.widget.clone());

    let children = config.children;
    tree.add_listener(EventKind::Expand, move |tree: &Tree, event: &TreeEvent| {
        if let TreeEvent::Expand { item } = *event
            && let Err(err) = tree.set_item_count(Some(item), children)
        {
            warn!("could not fill {}: {}", item, err);
        }
    });
    tree.add_listener(EventKind::SetData, |tree: &Tree, event: &TreeEvent| {
        if let TreeEvent::SetData { item, parent, index } = *event {
            let label = match parent {
                Some(parent) => format!("{parent}/{index}"),
                None => format!("{index}"),
            };
            if let Err(err) = tree.set_text(item, 0, label) {
                warn!("could not label {}: {}", item, err);
            }
        }
    });
    tree.add_listener(EventKind::Collapse, |_: &Tree, event: &TreeEvent| {
        info!("tree collapsing {:?}", event);
    });
    display.register(TREE_HANDLE, tree.clone())?;

    tree.set_item_count(None, children)?;
    if children == 0 {
        summary.host_calls += host.calls().len();
        return Ok(());
    }

    let top = tree.item(None, 0)?;
    let mut folder = top;
    for level in 0..config.depth {
        display.item_notification(TREE_HANDLE, folder.get(), Notification::ContainerOpening);
        display.item_notification(TREE_HANDLE, folder.get(), Notification::ContainerOpened);
        if !tree.expanded(folder)? {
            break;
        }
        summary.tree_levels_opened = level + 1;
        // Labels are requested as the host paints the new rows.
        for child in tree.items(Some(folder))? {
            display.item_data(TREE_HANDLE, child.get(), Property::Text(0));
        }
        if tree.item_count(Some(folder))? == 0 {
            break;
        }
        folder = tree.item(Some(folder), 0)?;
    }
    summary.tree_visible_expanded = host.visible_count();

    display.item_notification(TREE_HANDLE, top.get(), Notification::ContainerClosing);
    display.item_notification(TREE_HANDLE, top.get(), Notification::ContainerClosed);
    summary.tree_visible_collapsed = host.visible_count();
    summary.tree_materialized = tree.materialized_count();
    summary.host_calls += host.calls().len();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> DemoConfig {
        DemoConfig {
            rows: 100,
            page: 10,
            children: 3,
            depth: 2,
            ..DemoConfig::default()
        }
    }

    #[test]
    fn test_session_summary() {
        let summary = run(&small()).unwrap();
        // Row 2 was removed.
        assert_eq!(summary.rows, 99);
        assert_eq!(summary.first_row_descending.as_deref(), Some("Row 99"));
        // Anchor 7 shifts to 6; Down in descending order moves up.
        assert_eq!(summary.navigated_index, Some(5));
        assert_eq!(summary.tree_levels_opened, 2);
        // Root children plus two opened levels.
        assert_eq!(summary.tree_visible_expanded, 9);
        assert_eq!(summary.tree_visible_collapsed, 3);
    }

    #[test]
    fn test_virtual_table_populates_only_requested_rows() {
        let summary = run(&small()).unwrap();
        // Ten visible rows plus the last row once sorted.
        assert_eq!(summary.rows_populated, 11);
        assert!(summary.rows_materialized < 20);
    }
}
