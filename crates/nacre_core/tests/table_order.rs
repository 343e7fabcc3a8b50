use nacre_core::{OrderedTable, Visit};

#[test]
fn delete_preserves_order_of_survivors() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("a", 1);
    table.insert("b", 2);
    table.insert("c", 3);
    table.remove(&"b");
    let entries = table.entries();
    assert_eq!(entries, [("a", 1), ("c", 3)]);
}

#[test]
fn growth_preserves_contents_and_order() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in 0..20 {
        table.insert(i, i * 10);
    }
    assert_eq!(table.len(), 20);
    // 20 entries exceed 11 buckets only through lookups staying cheap, not
    // growth (threshold is 55); push far enough to cross two steps.
    for i in 20..200 {
        table.insert(i, i * 10);
    }
    assert!(table.bucket_count() > 11);
    let keys: Vec<_> = table.keys().collect();
    let expected: Vec<i64> = (0..200).collect();
    assert_eq!(keys, expected);
    for i in 0..200 {
        assert_eq!(table.get(&i), Some(i * 10));
    }
}

#[test]
fn clear_then_reinsert_yields_single_fresh_entry() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("k", 1);
    table.clear();
    table.insert("k", 2);
    let entries = table.entries();
    assert_eq!(entries, [("k", 2)]);
    assert_eq!(table.len(), 1);
}

#[test]
fn clear_resets_capacity_and_bumps_generation() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in 0..200 {
        table.insert(i, i);
    }
    let grown = table.bucket_count();
    assert!(grown > 11);
    let generation = table.generation();
    table.clear();
    assert_eq!(table.len(), 0);
    assert_eq!(table.bucket_count(), 11);
    assert_eq!(table.generation(), generation + 1);
    // clearing an empty table is a no-op, including the generation
    table.clear();
    assert_eq!(table.generation(), generation + 1);
}

#[test]
fn reinserted_key_moves_to_tail_overwritten_key_does_not() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("x", 1);
    table.insert("y", 2);
    table.insert("x", 3); // overwrite keeps position
    assert_eq!(table.entries(), [("x", 3), ("y", 2)]);
    table.remove(&"x");
    table.insert("x", 4); // delete + insert moves to tail
    assert_eq!(table.entries(), [("y", 2), ("x", 4)]);
}

#[test]
fn visit_stops_early_on_signal() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in 0..10 {
        table.insert(i, i);
    }
    let mut seen = Vec::new();
    let completed = table.visit(|k, _| {
        seen.push(*k);
        if *k == 3 { Visit::Stop } else { Visit::Continue }
    });
    assert!(!completed);
    assert_eq!(seen, [0, 1, 2, 3]);
}

#[test]
fn try_visit_propagates_callback_errors() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    table.insert(1, 1);
    table.insert(2, 2);
    let result: Result<bool, &'static str> = table.try_visit(|k, _| {
        if *k == 2 { Err("boom") } else { Ok(Visit::Continue) }
    });
    assert_eq!(result, Err("boom"));
}

#[test]
fn visit_callback_may_delete_entries_mid_walk() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in 0..6 {
        table.insert(i, i);
    }
    let mut seen = Vec::new();
    table.visit(|k, _| {
        seen.push(*k);
        // deleting the entry ahead of the walk
        table.remove(&(k + 1));
        Visit::Continue
    });
    assert_eq!(seen, [0, 2, 4]);
    assert_eq!(table.len(), 3);
    assert_eq!(table.keys().collect::<Vec<_>>(), [0, 2, 4]);
}

#[test]
fn visit_callback_may_delete_current_entry() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in 0..4 {
        table.insert(i, i);
    }
    let mut seen = Vec::new();
    table.visit(|k, _| {
        seen.push(*k);
        table.remove(k);
        Visit::Continue
    });
    assert_eq!(seen, [0, 1, 2, 3]);
    assert!(table.is_empty());
}

#[test]
fn duplicate_is_deep_and_order_preserving() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in [5, 1, 9, 3] {
        table.insert(i, i * 2);
    }
    let copy = table.duplicate();
    assert_eq!(copy.entries(), table.entries());
    copy.insert(7, 14);
    table.remove(&5);
    // structures are independent after the copy
    assert_eq!(copy.keys().collect::<Vec<_>>(), [5, 1, 9, 3, 7]);
    assert_eq!(table.keys().collect::<Vec<_>>(), [1, 9, 3]);
}
