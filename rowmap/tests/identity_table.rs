use std::collections::HashSet;

use rowmap::{Error, IdentityTable, ItemId, TableConfig};

fn id(raw: u32) -> ItemId {
    ItemId::new(raw).unwrap()
}

fn raw(ids: &[ItemId]) -> Vec<u32> {
    ids.iter().map(|id| id.get()).collect()
}

/// Every id held by a slot appears once; every materialized item sits in a slot.
fn assert_ids_unique(table: &IdentityTable) {
    let mut seen = HashSet::new();
    for slot_id in table.children(None).unwrap().ids() {
        assert!(seen.insert(slot_id), "duplicate id {slot_id}");
    }
    for item in table.iter() {
        for slot_id in item.children().ids() {
            assert!(seen.insert(slot_id), "duplicate id {slot_id}");
        }
    }
    for item in table.iter() {
        assert!(seen.contains(&item.id()), "orphan item {}", item.id());
        assert_eq!(table.get(item.id()).unwrap().id(), item.id());
    }
}

/// Small deterministic generator for churn tests.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound.max(1)
    }
}

// ============================================================================
// Allocation & Recycling
// ============================================================================

#[test]
fn test_first_allocation_starts_at_one() {
    let table = IdentityTable::new();
    assert_eq!(raw(&table.allocate(3)), [1, 2, 3]);
}

#[test]
fn test_removed_id_is_recycled() {
    let mut table = IdentityTable::new();
    for _ in 0..10 {
        table.insert(None, None).unwrap();
    }
    assert_eq!(raw(&table.children(None).unwrap().ids().collect::<Vec<_>>()), (1..=10).collect::<Vec<_>>());

    let removed = table.remove_child(None, 3).unwrap();
    assert_eq!(removed.id, Some(id(4)));
    assert_eq!(removed.released, vec![id(4)]);

    assert_eq!(raw(&table.allocate(1)), [4]);
}

#[test]
fn test_allocate_skips_reserved_slots() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 4, true).unwrap();
    assert_eq!(table.materialized_count(), 0);
    assert_eq!(raw(&table.allocate(2)), [5, 6]);
}

#[test]
fn test_allocate_release_round_trip() {
    let mut table = IdentityTable::new();
    let first = table.set_child_count(None, 8, false).unwrap().added;
    assert_eq!(first.len(), 8);

    table.insert(None, Some(0)).unwrap();
    let survivor = table.child_slot(None, 0).unwrap().unwrap();
    for _ in 0..8 {
        table.remove_child(None, 1).unwrap();
    }

    let again = table.allocate(8);
    let distinct: HashSet<_> = again.iter().collect();
    assert_eq!(distinct.len(), 8);
    for new_id in &again {
        assert!(!table.is_reserved(*new_id));
        assert_ne!(*new_id, survivor);
    }
}

#[test]
fn test_reservation_deep_in_tree_is_never_recycled() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 1, true).unwrap();
    let a = table.resolve(None, 0).unwrap();
    table.set_child_count(Some(a), 1, true).unwrap();
    let b = table.resolve(Some(a), 0).unwrap();
    let pending = table.set_child_count(Some(b), 2, true).unwrap().added;
    assert_eq!(raw(&pending), [3, 4]);
    assert!(!table.is_materialized(id(3)));

    assert_eq!(raw(&table.allocate(2)), [5, 6]);
}

#[test]
fn test_ids_unique_under_churn() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    let mut rng = Lcg(7);
    for _ in 0..2000 {
        let items: Vec<ItemId> = table.iter().map(|item| item.id()).collect();
        let container = if items.is_empty() || rng.next(3) == 0 {
            None
        } else {
            Some(items[rng.next(items.len())])
        };
        let count = table.child_count(container).unwrap();
        match rng.next(6) {
            0 => {
                table.insert(container, Some(rng.next(count + 1))).unwrap();
            }
            1 if count > 0 => {
                table.remove_child(container, rng.next(count)).unwrap();
            }
            2 => {
                let reserve = rng.next(2) == 0;
                table.set_child_count(container, rng.next(12), reserve).unwrap();
            }
            3 if count > 0 => {
                let index = rng.next(count);
                let first = table.resolve(container, index).unwrap();
                assert_eq!(table.resolve(container, index).unwrap(), first);
            }
            4 if !items.is_empty() => {
                let victim = items[rng.next(items.len())];
                if table.is_materialized(victim) {
                    table.release(victim).unwrap();
                }
            }
            5 => {
                table.reserve_unallocated(container).unwrap();
            }
            _ => {}
        }
        assert_ids_unique(&table);
    }
}

// ============================================================================
// Lazy Materialization
// ============================================================================

#[test]
fn test_virtual_resolve_builds_exactly_one_item() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 100, false).unwrap();
    assert_eq!(table.materialized_count(), 0);

    let item = table.resolve(None, 50).unwrap();
    assert_eq!(table.materialized_count(), 1);
    assert_eq!(table.children(None).unwrap().ids().count(), 1);
    assert_eq!(table.index_of(item).unwrap(), 50);
    assert!(!table.get(item).unwrap().is_cached());
}

#[test]
fn test_resolve_is_idempotent() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 10, false).unwrap();
    let first = table.resolve(None, 3).unwrap();
    let second = table.resolve(None, 3).unwrap();
    assert_eq!(first, second);
    assert_ne!(table.resolve(None, 4).unwrap(), first);
}

#[test]
fn test_resolve_out_of_range() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 2, false).unwrap();
    assert_eq!(
        table.resolve(None, 2),
        Err(Error::InvalidRange { index: 2, count: 2 })
    );
    assert_eq!(table.materialized_count(), 0);
}

#[test]
fn test_resolve_by_id_materializes_reserved_child() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 1, true).unwrap();
    let parent = table.resolve(None, 0).unwrap();
    let reserved = table.set_child_count(Some(parent), 5, true).unwrap().added;
    let target = reserved[3];
    assert!(!table.is_materialized(target));

    assert_eq!(table.resolve_by_id(target), Some(target));
    let item = table.get(target).unwrap();
    assert_eq!(item.parent(), Some(parent));
    assert_eq!(table.index_of(target).unwrap(), 3);
}

#[test]
fn test_position_of_reserved_child_does_not_build() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 1, true).unwrap();
    let parent = table.resolve(None, 0).unwrap();
    let reserved = table.set_child_count(Some(parent), 4, true).unwrap().added;
    let before = table.materialized_count();

    assert_eq!(table.position_of(reserved[2]), Some((Some(parent), 2)));
    assert_eq!(table.position_of(parent), Some((None, 0)));
    assert_eq!(table.position_of(id(99)), None);
    assert_eq!(table.materialized_count(), before);
}

#[test]
fn test_vacate_undoes_resolve() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    table.set_child_count(None, 3, false).unwrap();
    let built = table.resolve(None, 1).unwrap();

    assert_eq!(table.vacate(None, 1).unwrap(), Some(built));
    assert_eq!(table.child_slot(None, 1).unwrap(), None);
    assert!(!table.is_reserved(built));
    assert_eq!(table.materialized_count(), 0);
    assert_eq!(table.child_count(None).unwrap(), 3);

    assert_eq!(table.vacate(None, 1).unwrap(), None);
    assert_eq!(
        table.vacate(None, 3),
        Err(Error::InvalidRange { index: 3, count: 3 })
    );
}

#[test]
fn test_resolve_by_id_stale_returns_none() {
    let mut table = IdentityTable::new();
    let item = table.insert(None, None).unwrap();
    table.release(item).unwrap();
    assert_eq!(table.resolve_by_id(item), None);
    assert_eq!(table.resolve_by_id(id(999)), None);
}

#[test]
fn test_non_virtual_items_are_eager_and_cached() {
    let mut table = IdentityTable::new();
    let change = table.set_child_count(None, 6, false).unwrap();
    assert_eq!(change.added.len(), 6);
    assert_eq!(table.materialized_count(), 6);
    assert!(table.iter().all(|item| item.is_cached()));
}

// ============================================================================
// Structural Edits
// ============================================================================

#[test]
fn test_insert_out_of_range_does_not_mutate() {
    let mut table = IdentityTable::new();
    table.insert(None, None).unwrap();
    assert_eq!(
        table.insert(None, Some(5)),
        Err(Error::InvalidRange { index: 5, count: 1 })
    );
    assert_eq!(table.child_count(None).unwrap(), 1);
    assert_eq!(table.materialized_count(), 1);
}

#[test]
fn test_insert_into_released_parent_fails() {
    let mut table = IdentityTable::new();
    let parent = table.insert(None, None).unwrap();
    table.release(parent).unwrap();
    assert_eq!(table.insert(Some(parent), None), Err(Error::InvalidItem(parent)));
}

#[test]
fn test_release_takes_subtree_with_reservations() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    let parent = table.insert(None, None).unwrap();
    let child = table.insert(Some(parent), None).unwrap();
    let pending = table.set_child_count(Some(child), 2, true).unwrap().added;

    let removed = table.release(parent).unwrap();
    assert_eq!(removed.parent, None);
    assert_eq!(removed.index, 0);
    let mut expected = vec![parent, child];
    expected.extend(&pending);
    assert_eq!(removed.released, expected);
    assert_eq!(table.materialized_count(), 0);
    for gone in expected {
        assert!(!table.is_reserved(gone));
    }
}

#[test]
fn test_release_unmaterialized_reservation() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    let reserved = table.set_child_count(None, 3, true).unwrap().added;
    let removed = table.release(reserved[1]).unwrap();
    assert_eq!(removed.index, 1);
    assert_eq!(table.child_count(None).unwrap(), 2);
    assert_eq!(table.children(None).unwrap().as_slice(), &[Some(reserved[0]), Some(reserved[2])]);
}

#[test]
fn test_shrinking_count_releases_trailing_children() {
    let mut table = IdentityTable::new();
    table.set_child_count(None, 5, false).unwrap();
    let change = table.set_child_count(None, 2, false).unwrap();
    assert_eq!(raw(&change.removed), [5, 4, 3]);
    assert_eq!(table.materialized_count(), 2);
}

#[test]
fn test_reserve_and_drop_reservations() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    let parent = table.insert(None, None).unwrap();
    table.set_child_count(Some(parent), 4, false).unwrap();
    let kept = table.resolve(Some(parent), 1).unwrap();

    let reserved = table.reserve_unallocated(Some(parent)).unwrap();
    assert_eq!(reserved.len(), 3);
    assert_eq!(table.children(Some(parent)).unwrap().unallocated().count(), 0);

    let dropped = table.drop_reservations(Some(parent)).unwrap();
    assert_eq!(dropped, reserved);
    assert_eq!(table.child_slot(Some(parent), 1).unwrap(), Some(kept));
    assert_eq!(table.children(Some(parent)).unwrap().unallocated().collect::<Vec<_>>(), [0, 2, 3]);
}

#[test]
fn test_remove_all() {
    let mut table = IdentityTable::new();
    let parent = table.insert(None, None).unwrap();
    table.set_child_count(Some(parent), 3, false).unwrap();
    let released = table.remove_all(None).unwrap();
    assert_eq!(released.len(), 4);
    assert_eq!(table.child_count(None).unwrap(), 0);
    assert_eq!(table.materialized_count(), 0);
}

#[test]
fn test_clear_resets_data() {
    let mut table = IdentityTable::with_config(TableConfig::on_demand());
    let parent = table.insert(None, None).unwrap();
    let child = table.insert(Some(parent), None).unwrap();
    table.get_mut(parent).unwrap().data.set_text(0, "parent");
    table.get_mut(child).unwrap().data.set_text(1, "child");

    table.clear(parent, false).unwrap();
    assert_eq!(table.get(parent).unwrap().data.text(0), "");
    assert!(!table.get(parent).unwrap().is_cached());
    assert_eq!(table.get(child).unwrap().data.text(1), "child");

    table.clear(parent, true).unwrap();
    assert_eq!(table.get(child).unwrap().data.text(1), "");
}

#[test]
fn test_trim_shrinks_capacity() {
    let mut table = IdentityTable::new();
    table.set_child_count(None, 40, false).unwrap();
    table.set_child_count(None, 3, false).unwrap();
    assert!(table.capacity() >= 40);
    table.trim();
    assert_eq!(table.capacity(), 4);
    assert_eq!(table.children(None).unwrap().capacity(), 4);
}
