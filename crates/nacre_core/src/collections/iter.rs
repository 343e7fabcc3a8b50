//! Cursors and view adapters over the insertion-order ring.

use std::rc::Rc;

use super::table::{Node, OrderedTable};
use super::{TableError, TableKey};

/// Traversal cursor over a table.
///
/// `has_next` is peekable: it may be called any number of times without an
/// intervening `next` and never skips entries. Once `has_next` has reported
/// an entry, the following `next` commits to it even if the entry was deleted
/// through another handle in between (deletion preserves the forward ring
/// link). After a bulk clear the cursor detects the bumped generation and
/// resyncs to "before the first entry" instead of touching stale links.
///
/// Opening a cursor marks the table busy for [`OrderedTable::rehash`] until
/// the cursor is dropped.
pub struct TableCursor<'a, K, V> {
    table: &'a OrderedTable<K, V>,
    current: Rc<Node<K, V>>,
    peeked: Option<Rc<Node<K, V>>>,
    generation: u64,
}

impl<'a, K: TableKey, V: Clone> TableCursor<'a, K, V> {
    pub(crate) fn new(table: &'a OrderedTable<K, V>) -> Self {
        table.cursor_opened();
        Self {
            table,
            current: table.ring_sentinel(),
            peeked: None,
            generation: table.generation(),
        }
    }

    fn resync(&mut self) {
        let generation = self.table.generation();
        if self.generation != generation {
            self.generation = generation;
            self.current = self.table.ring_sentinel();
            self.peeked = None;
        }
    }

    /// Walk forward from `node`, skipping dead entries, to the next live
    /// entry; `None` once the sentinel is reached.
    fn advance_from(node: &Rc<Node<K, V>>) -> Option<Rc<Node<K, V>>> {
        let mut next = node.next_in_ring();
        loop {
            if next.is_sentinel() {
                return None;
            }
            if next.is_live() {
                return Some(next);
            }
            next = next.next_in_ring();
        }
    }

    pub fn has_next(&mut self) -> bool {
        self.resync();
        if self.peeked.is_some() {
            return true;
        }
        match Self::advance_from(&self.current) {
            Some(node) => {
                self.peeked = Some(node);
                true
            }
            None => false,
        }
    }

    /// Advance and commit; the committed node may already be dead (peeked,
    /// then deleted elsewhere) and is still returned.
    pub(crate) fn step(&mut self) -> Option<Rc<Node<K, V>>> {
        self.resync();
        let node = match self.peeked.take() {
            Some(node) => node,
            None => Self::advance_from(&self.current)?,
        };
        self.current = node.clone();
        Some(node)
    }

    pub fn next_pair(&mut self) -> Result<(K, V), TableError>
    where
        K: Clone,
    {
        let node = self.step().ok_or(TableError::ExhaustedIterator)?;
        Ok(node.pair())
    }

    pub fn next_key(&mut self) -> Result<K, TableError>
    where
        K: Clone,
    {
        let node = self.step().ok_or(TableError::ExhaustedIterator)?;
        Ok(node.key_clone())
    }

    pub fn next_value(&mut self) -> Result<V, TableError> {
        let node = self.step().ok_or(TableError::ExhaustedIterator)?;
        Ok(node.value_clone())
    }

    /// Deletes the entry last returned by `next`. A no-op returning `None`
    /// before the first `next`, or when the entry is already gone.
    pub fn remove_current(&mut self) -> Option<V> {
        self.table.remove_node(&self.current)
    }
}

impl<K, V> Drop for TableCursor<'_, K, V> {
    fn drop(&mut self) {
        self.table.cursor_closed();
    }
}

/// Entry view: yields (key, value) pairs in insertion order.
pub struct Iter<'a, K, V> {
    cursor: TableCursor<'a, K, V>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(cursor: TableCursor<'a, K, V>) -> Self {
        Self { cursor }
    }
}

impl<K: TableKey + Clone, V: Clone> Iterator for Iter<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.step().map(|node| node.pair())
    }
}

/// Key view over the same entries.
pub struct Keys<'a, K, V> {
    cursor: TableCursor<'a, K, V>,
}

impl<'a, K, V> Keys<'a, K, V> {
    pub(crate) fn new(cursor: TableCursor<'a, K, V>) -> Self {
        Self { cursor }
    }
}

impl<K: TableKey + Clone, V: Clone> Iterator for Keys<'_, K, V> {
    type Item = K;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.step().map(|node| node.key_clone())
    }
}

/// Value view over the same entries.
pub struct Values<'a, K, V> {
    cursor: TableCursor<'a, K, V>,
}

impl<'a, K, V> Values<'a, K, V> {
    pub(crate) fn new(cursor: TableCursor<'a, K, V>) -> Self {
        Self { cursor }
    }
}

impl<K: TableKey, V: Clone> Iterator for Values<'_, K, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.step().map(|node| node.value_clone())
    }
}
