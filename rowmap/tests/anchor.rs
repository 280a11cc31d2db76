use rowmap::{AnchorState, NavKey, SelectionAnchor};

#[test]
fn test_remove_before_anchor_then_navigate_down() {
    // Ten rows, row 7 was the last selected row and got deselected.
    let mut anchor = SelectionAnchor::new();
    anchor.arm(7);

    anchor.on_remove(2, 9);
    assert_eq!(anchor.state(), AnchorState::Armed { index: 6 });
    assert_eq!(anchor.next(NavKey::Down, 9), Some(7));
    assert_eq!(anchor.next(NavKey::Up, 9), Some(5));
}

#[test]
fn test_anchor_moves_with_its_row() {
    let mut anchor = SelectionAnchor::new();
    anchor.arm(5);
    anchor.on_remove(2, 9);
    assert_eq!(anchor.index(), Some(4));
    assert_eq!(anchor.next(NavKey::Down, 9), Some(5));
}

#[test]
fn test_remove_after_anchor_keeps_index() {
    let mut anchor = SelectionAnchor::new();
    anchor.arm(3);
    anchor.on_remove(8, 9);
    assert_eq!(anchor.index(), Some(3));
}

#[test]
fn test_navigation_clamps_at_edges() {
    let mut anchor = SelectionAnchor::new();
    anchor.arm(0);
    assert_eq!(anchor.next(NavKey::Up, 3), Some(0));
    anchor.arm(2);
    assert_eq!(anchor.next(NavKey::Down, 3), Some(2));
    assert_eq!(anchor.next(NavKey::Down, 0), None);
}

#[test]
fn test_disarm_and_clear() {
    let mut anchor = SelectionAnchor::new();
    anchor.arm(4);
    anchor.disarm();
    assert_eq!(anchor.next(NavKey::Down, 10), None);

    anchor.arm(4);
    anchor.on_clear();
    assert!(!anchor.is_armed());
}

#[test]
fn test_removing_last_row_resets() {
    let mut anchor = SelectionAnchor::new();
    anchor.arm(0);
    anchor.on_remove(0, 0);
    assert_eq!(anchor.state(), AnchorState::Idle);
}
