use std::cmp::Ordering;
use std::rc::Rc;

use outline::prelude::*;
use outline::Error;

const TREE: NativeHandle = NativeHandle(0x10);
const TABLE: NativeHandle = NativeHandle(0x20);

fn display_with_widgets(host: &Rc<RecordingHost>) -> (Display, Tree, Table) {
    let tree = Tree::new(host.clone());
    let table = Table::new(host.clone());
    let mut display = Display::new();
    display.register(TREE, tree.clone()).unwrap();
    display.register(TABLE, table.clone()).unwrap();
    (display, tree, table)
}

#[test]
fn test_duplicate_handle_is_rejected() {
    let host = Rc::new(RecordingHost::new());
    let (mut display, _, _) = display_with_widgets(&host);
    let other = Table::new(host.clone());

    assert_eq!(display.register(TABLE, other), Err(Error::DuplicateHandle(TABLE)));
    assert_eq!(display.len(), 2);
}

#[test]
fn test_callbacks_are_routed_by_handle() {
    let host = Rc::new(RecordingHost::new());
    let (display, tree, table) = display_with_widgets(&host);

    let node = tree.create_item(None, None).unwrap();
    tree.set_text(node, 0, "node").unwrap();
    let row = table.create_item(None).unwrap();
    table.set_text(0, 0, "row").unwrap();

    assert_eq!(
        display.item_data(TREE, node.get(), Property::Text(0)),
        Some(PropertyValue::Text("node".into()))
    );
    assert_eq!(
        display.item_data(TABLE, 1, Property::Text(0)),
        Some(PropertyValue::Text("row".into()))
    );

    display.item_notification(TABLE, 1, Notification::Selected);
    assert_eq!(table.selection_indices(), vec![0]);
    assert_eq!(tree.selection_count(), 0);

    display.item_notification(TREE, node.get(), Notification::Selected);
    display.item_notification(TREE, node.get(), Notification::Deselected);
    assert_eq!(display.navigate(TREE, NavKey::Down), Some(node));
    assert_eq!(table.item(0).unwrap(), row);
}

#[test]
fn test_unregister_disposes_and_drops_late_callbacks() {
    let host = Rc::new(RecordingHost::new());
    let (mut display, tree, _) = display_with_widgets(&host);
    let node = tree.create_item(None, None).unwrap();

    let widget = display.unregister(TREE).unwrap();
    assert!(widget.is_disposed());
    assert!(tree.is_disposed());
    assert!(display.get(TREE).is_none());
    assert!(display.unregister(TREE).is_none());

    assert_eq!(display.item_data(TREE, node.get(), Property::Text(0)), None);
    display.item_notification(TREE, node.get(), Notification::Selected);
    assert_eq!(display.compare(TREE, 3, 7), Ordering::Less);
    assert_eq!(display.navigate(TREE, NavKey::Up), None);
}

#[test]
fn test_unknown_handle_is_ignored() {
    let display = Display::new();
    let unknown = NativeHandle(0xdead);
    assert!(display.is_empty());
    assert_eq!(display.item_data(unknown, 1, Property::Checked), None);
    display.item_notification(unknown, 1, Notification::DoubleClicked);
}
