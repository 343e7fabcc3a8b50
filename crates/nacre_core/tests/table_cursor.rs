use nacre_core::{OrderedTable, TableError};

#[test]
fn peeked_entry_survives_direct_delete() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("x", 1);
    let mut cursor = table.cursor();
    assert!(cursor.has_next());
    // deleted through a different handle between the peek and the commit
    assert_eq!(table.remove(&"x"), Some(1));
    assert_eq!(cursor.next_pair(), Ok(("x", 1)));
    assert!(!cursor.has_next());
}

#[test]
fn peeked_then_deleted_resumes_at_peek_time_successor() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("a", 1);
    table.insert("b", 2);
    table.insert("c", 3);
    let mut cursor = table.cursor();
    assert_eq!(cursor.next_pair(), Ok(("a", 1)));
    assert!(cursor.has_next()); // peeks "b"
    table.remove(&"b");
    assert_eq!(cursor.next_pair(), Ok(("b", 2)));
    assert_eq!(cursor.next_pair(), Ok(("c", 3)));
    assert!(!cursor.has_next());
}

#[test]
fn repeated_has_next_does_not_skip() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    table.insert(1, 10);
    table.insert(2, 20);
    let mut cursor = table.cursor();
    assert!(cursor.has_next());
    assert!(cursor.has_next());
    assert!(cursor.has_next());
    assert_eq!(cursor.next_pair(), Ok((1, 10)));
    assert_eq!(cursor.next_pair(), Ok((2, 20)));
}

#[test]
fn stale_cursor_resyncs_to_empty_after_clear() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    for i in 0..5 {
        table.insert(i, i);
    }
    let mut cursor = table.cursor();
    assert_eq!(cursor.next_pair(), Ok((0, 0)));
    table.clear();
    assert!(!cursor.has_next());
    assert_eq!(cursor.next_pair(), Err(TableError::ExhaustedIterator));
}

#[test]
fn stale_cursor_sees_entries_inserted_after_clear() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    table.insert(1, 1);
    let mut cursor = table.cursor();
    assert_eq!(cursor.next_pair(), Ok((1, 1)));
    table.clear();
    table.insert(7, 70);
    // resync lands before the first entry of the new epoch
    assert!(cursor.has_next());
    assert_eq!(cursor.next_pair(), Ok((7, 70)));
    assert!(!cursor.has_next());
}

#[test]
fn exhausted_cursor_reports_error_not_stale_data() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    table.insert(1, 1);
    let mut cursor = table.cursor();
    assert_eq!(cursor.next_pair(), Ok((1, 1)));
    assert_eq!(cursor.next_pair(), Err(TableError::ExhaustedIterator));
    assert_eq!(cursor.next_pair(), Err(TableError::ExhaustedIterator));
}

#[test]
fn remove_current_deletes_from_table() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("a", 1);
    table.insert("b", 2);
    table.insert("c", 3);
    let mut cursor = table.cursor();
    // before any next: nothing to remove
    assert_eq!(cursor.remove_current(), None);
    assert_eq!(cursor.next_pair(), Ok(("a", 1)));
    assert_eq!(cursor.next_pair(), Ok(("b", 2)));
    assert_eq!(cursor.remove_current(), Some(2));
    // repeated removal of the same entry is a no-op
    assert_eq!(cursor.remove_current(), None);
    assert_eq!(cursor.next_pair(), Ok(("c", 3)));
    assert_eq!(table.keys().collect::<Vec<_>>(), ["a", "c"]);
}

#[test]
fn insert_during_iteration_is_seen_when_walk_has_not_passed_tail() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    table.insert(1, 1);
    let mut cursor = table.cursor();
    assert_eq!(cursor.next_pair(), Ok((1, 1)));
    table.insert(2, 2);
    assert_eq!(cursor.next_pair(), Ok((2, 2)));
    assert!(!cursor.has_next());
}

#[test]
fn rehash_busy_while_any_cursor_open() {
    let table: OrderedTable<i64, i64> = OrderedTable::new();
    table.insert(1, 1);
    let c1 = table.cursor();
    let c2 = table.cursor();
    assert_eq!(table.rehash(), Err(TableError::Busy));
    drop(c1);
    assert_eq!(table.rehash(), Err(TableError::Busy));
    drop(c2);
    assert_eq!(table.rehash(), Ok(()));
    assert_eq!(table.get(&1), Some(1));
}

#[test]
fn key_and_value_views_project_the_same_entries() {
    let table: OrderedTable<&'static str, i64> = OrderedTable::new();
    table.insert("a", 1);
    table.insert("b", 2);
    table.insert("c", 3);
    assert_eq!(table.keys().collect::<Vec<_>>(), ["a", "b", "c"]);
    assert_eq!(table.values().collect::<Vec<_>>(), [1, 2, 3]);
    assert_eq!(
        table.iter().collect::<Vec<_>>(),
        [("a", 1), ("b", 2), ("c", 3)]
    );
}

#[test]
fn identity_mode_changes_match_predicate_only() {
    let table: OrderedTable<String, i64> = OrderedTable::new();
    table.insert("a".to_string(), 1);
    // String has no reference identity distinct from value equality, so
    // lookups still succeed after the switch; the flag is sticky.
    table.compare_by_identity();
    assert!(table.compares_by_identity());
    assert_eq!(table.get(&"a".to_string()), Some(1));
    let copy = table.duplicate();
    assert!(copy.compares_by_identity());
}
