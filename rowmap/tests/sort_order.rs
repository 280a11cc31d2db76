use std::cmp::Ordering;

use rowmap::{ItemId, RowOrder, SortDirection};

fn id(raw: u32) -> ItemId {
    ItemId::new(raw).unwrap()
}

#[test]
fn test_descending_reverses_row_ids() {
    let order = RowOrder::new(SortDirection::Down);
    assert_eq!(order.get_id(0, 5), Some(id(5)));
    assert_eq!(order.get_id(4, 5), Some(id(1)));
    assert_eq!(order.get_index(id(5), 5), Some(0));
}

#[test]
fn test_unsorted_and_ascending_are_positional() {
    for direction in [SortDirection::None, SortDirection::Up] {
        let order = RowOrder::new(direction);
        assert_eq!(order.get_id(0, 5), Some(id(1)));
        assert_eq!(order.get_id(4, 5), Some(id(5)));
    }
}

#[test]
fn test_flipping_direction_keeps_inverse() {
    let mut order = RowOrder::default();
    assert!(order.set_direction(SortDirection::Down));
    assert!(!order.set_direction(SortDirection::Down));
    for count in [1, 2, 7, 64] {
        for index in 0..count {
            let row = order.get_id(index, count).unwrap();
            assert_eq!(order.get_index(row, count), Some(index));
        }
    }
}

#[test]
fn test_compare_follows_logical_index() {
    let order = RowOrder::new(SortDirection::Down);
    // Row 5 is logical index 0 when descending.
    assert_eq!(order.compare(id(5), id(1), 5), Ordering::Less);
    assert_eq!(order.compare(id(2), id(2), 5), Ordering::Equal);
    assert_eq!(order.compare(id(9), id(1), 5), Ordering::Greater);

    let order = RowOrder::new(SortDirection::Up);
    assert_eq!(order.compare(id(5), id(1), 5), Ordering::Greater);
}

#[test]
fn test_empty_row_set_has_no_ids() {
    let order = RowOrder::new(SortDirection::Down);
    assert_eq!(order.get_id(0, 0), None);
    assert_eq!(order.get_index(id(1), 0), None);
}
