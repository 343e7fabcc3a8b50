//! Table storage: entry nodes, bucket chains, and the insertion-order ring.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};

use super::iter::{Iter, Keys, TableCursor, Values};
use super::{TableError, TableKey, Visit};

/// Bucket capacities: primes just above powers of two, so modulo bucketing
/// stays well distributed. Each step roughly doubles the previous one.
const CAPACITIES: &[usize] = &[
    11, 19, 37, 67, 131, 283, 521, 1033, 2053, 4099, 8219, 16411, 32771, 65537, 131101, 262147,
    524309, 1048583, 2097169, 4194319, 8388617, 16777259, 33554467, 67108879, 134217757,
    268435459, 536870923, 1073741827,
];

pub(crate) const INITIAL_CAPACITY: usize = 11;

/// A chain longer than this on average triggers growth.
const MAX_DENSITY: usize = 5;

#[inline]
fn bucket_index(hash: u64, len: usize) -> usize {
    (hash % len as u64) as usize
}

fn next_capacity(len: usize) -> Option<usize> {
    CAPACITIES.iter().copied().find(|&c| c > len + 1)
}

pub(crate) struct EntryData<K, V> {
    pub(crate) key: K,
    pub(crate) value: RefCell<V>,
}

/// Forward link in the insertion-order ring.
///
/// Live entries hold a weak link (the target is owned by its bucket chain, or
/// is the permanent sentinel). When an entry is unlinked its forward link is
/// pinned strong, so a cursor parked on the now-dead entry can still walk
/// forward into the live list.
pub(crate) enum NextLink<K, V> {
    Ring(Weak<Node<K, V>>),
    Pinned(Rc<Node<K, V>>),
}

pub(crate) struct Node<K, V> {
    /// `None` only for the ring sentinel, which is never matched by lookups
    /// and never counted.
    data: Option<EntryData<K, V>>,
    hash: Cell<u64>,
    bucket_next: RefCell<Option<Rc<Node<K, V>>>>,
    /// `None` marks a dead (unlinked) entry.
    order_prev: RefCell<Option<Weak<Node<K, V>>>>,
    order_next: RefCell<NextLink<K, V>>,
}

impl<K, V> Node<K, V> {
    #[inline]
    pub(crate) fn is_sentinel(&self) -> bool {
        self.data.is_none()
    }

    #[inline]
    pub(crate) fn is_live(&self) -> bool {
        self.order_prev.borrow().is_some()
    }

    pub(crate) fn next_in_ring(&self) -> Rc<Node<K, V>> {
        match &*self.order_next.borrow() {
            NextLink::Ring(weak) => weak.upgrade().expect("order ring link lost"),
            NextLink::Pinned(node) => node.clone(),
        }
    }

    pub(crate) fn data(&self) -> &EntryData<K, V> {
        self.data.as_ref().expect("sentinel carries no entry data")
    }
}

impl<K: Clone, V> Node<K, V> {
    pub(crate) fn key_clone(&self) -> K {
        self.data().key.clone()
    }
}

impl<K, V: Clone> Node<K, V> {
    pub(crate) fn value_clone(&self) -> V {
        self.data().value.borrow().clone()
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    pub(crate) fn pair(&self) -> (K, V) {
        let data = self.data();
        (data.key.clone(), data.value.borrow().clone())
    }
}

/// Hash table with stable insertion-order iteration.
///
/// All operations take `&self`: the table is built for the scripting-runtime
/// pattern where a callback running during iteration mutates the very
/// collection being iterated. See the module docs for the synchronization
/// contract.
pub struct OrderedTable<K, V> {
    buckets: RefCell<Vec<Option<Rc<Node<K, V>>>>>,
    size: Cell<usize>,
    generation: Cell<u64>,
    grow_at: Cell<usize>,
    identity: Cell<bool>,
    active_cursors: Cell<usize>,
    sentinel: Rc<Node<K, V>>,
}

impl<K, V> OrderedTable<K, V> {
    pub fn new() -> Self {
        Self::with_buckets(INITIAL_CAPACITY)
    }

    /// Creates a table that holds `cap` entries without growing.
    pub fn with_capacity(cap: usize) -> Self {
        let len = CAPACITIES
            .iter()
            .copied()
            .find(|&c| cap <= c * MAX_DENSITY)
            .unwrap_or(CAPACITIES[CAPACITIES.len() - 1]);
        Self::with_buckets(len)
    }

    fn with_buckets(len: usize) -> Self {
        Self {
            buckets: RefCell::new(vec![None; len]),
            size: Cell::new(0),
            generation: Cell::new(0),
            grow_at: Cell::new(len * MAX_DENSITY),
            identity: Cell::new(false),
            active_cursors: Cell::new(0),
            sentinel: Self::new_sentinel(),
        }
    }

    fn new_sentinel() -> Rc<Node<K, V>> {
        Rc::new_cyclic(|weak| Node {
            data: None,
            hash: Cell::new(0),
            bucket_next: RefCell::new(None),
            order_prev: RefCell::new(Some(weak.clone())),
            order_next: RefCell::new(NextLink::Ring(weak.clone())),
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.size.get()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.get() == 0
    }

    /// Current bucket-array length (capacity step, not entry count).
    pub fn bucket_count(&self) -> usize {
        self.buckets.borrow().len()
    }

    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Switches key matching from value equality to reference identity for
    /// all subsequent operations. Existing entries keep their bucket
    /// placement; only the match predicate changes. Cannot be unset.
    pub fn compare_by_identity(&self) {
        self.identity.set(true);
    }

    pub fn compares_by_identity(&self) -> bool {
        self.identity.get()
    }

    pub(crate) fn ring_sentinel(&self) -> Rc<Node<K, V>> {
        self.sentinel.clone()
    }

    pub(crate) fn cursor_opened(&self) {
        self.active_cursors.set(self.active_cursors.get() + 1);
    }

    pub(crate) fn cursor_closed(&self) {
        self.active_cursors.set(self.active_cursors.get() - 1);
    }

    /// Drops every entry and resets the bucket array to its initial capacity.
    ///
    /// Structurally O(1): no entry is individually unlinked, and cursors that
    /// are still open detect the bumped generation instead. (The discarded
    /// entries are reclaimed by `Rc` drops; their chains are severed
    /// iteratively first so teardown never recurses deeply.)
    pub fn clear(&self) {
        if self.size.get() == 0 {
            return;
        }
        let old = mem::replace(
            &mut *self.buckets.borrow_mut(),
            vec![None; INITIAL_CAPACITY],
        );
        sever_chains(old);
        let weak = Rc::downgrade(&self.sentinel);
        *self.sentinel.order_next.borrow_mut() = NextLink::Ring(weak.clone());
        *self.sentinel.order_prev.borrow_mut() = Some(weak);
        self.size.set(0);
        self.grow_at.set(INITIAL_CAPACITY * MAX_DENSITY);
        self.generation.set(self.generation.get() + 1);
    }
}

impl<K: TableKey, V: Clone> OrderedTable<K, V> {
    /// Inserts or overwrites. On overwrite the stored key object is kept and
    /// the previous value is returned.
    pub fn insert(&self, key: K, value: V) -> Option<V> {
        let hash = key.hash_code();
        if let Some(node) = self.find_node(&key, hash) {
            let old = mem::replace(&mut *node.data().value.borrow_mut(), value);
            return Some(old);
        }
        self.push_new(key, value, hash);
        None
    }

    /// Insert without the duplicate-check chain walk.
    ///
    /// Precondition: `key` must not already be present. This is a bulk-load
    /// primitive (used by [`OrderedTable::duplicate`], where the source table
    /// guarantees uniqueness); violating the precondition silently leaves two
    /// entries sharing one logical key.
    pub fn insert_unique(&self, key: K, value: V) {
        let hash = key.hash_code();
        self.push_new(key, value, hash);
    }

    pub fn get(&self, key: &K) -> Option<V> {
        let hash = key.hash_code();
        let node = self.find_node(key, hash)?;
        Some(node.data().value.borrow().clone())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let hash = key.hash_code();
        self.find_node(key, hash).is_some()
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        let hash = key.hash_code();
        let node = self.bucket_unlink_match(key, hash)?;
        self.ring_unlink(&node);
        self.size.set(self.size.get() - 1);
        let value = node.data().value.borrow().clone();
        Some(value)
    }

    /// Deletes this exact entry, matching by node identity.
    ///
    /// The hash is recomputed from the entry's current key: a mutable key may
    /// have drifted since insertion, in which case the entry sits in the
    /// chain of its stale cached hash and the walk misses it (the documented
    /// mutable-key hazard; `rehash` repairs the placement).
    pub(crate) fn remove_node(&self, node: &Rc<Node<K, V>>) -> Option<V> {
        if node.is_sentinel() || !node.is_live() {
            return None;
        }
        let hash = node.data().key.hash_code();
        if !self.bucket_unlink_node(node, hash) {
            return None;
        }
        self.ring_unlink(node);
        self.size.set(self.size.get() - 1);
        let value = node.data().value.borrow().clone();
        Some(value)
    }

    /// Recomputes every live entry's cached hash from its current key and
    /// rebuilds the bucket chains at the same capacity. Ring order is
    /// untouched. Fails fast while any cursor is open: this is the one
    /// mutation that cannot be made iterator-safe by construction.
    pub fn rehash(&self) -> Result<(), TableError> {
        if self.active_cursors.get() > 0 {
            return Err(TableError::Busy);
        }
        // Hold strong refs up front: rewiring bucket_next links below would
        // otherwise drop mid-chain entries before they are relinked.
        let nodes = self.ring_nodes();
        let len = self.buckets.borrow().len();
        let mut fresh: Vec<Option<Rc<Node<K, V>>>> = vec![None; len];
        for node in &nodes {
            let hash = node.data().key.hash_code();
            node.hash.set(hash);
            let idx = bucket_index(hash, len);
            *node.bucket_next.borrow_mut() = fresh[idx].take();
            fresh[idx] = Some(node.clone());
        }
        *self.buckets.borrow_mut() = fresh;
        Ok(())
    }

    /// Deep copy: fresh entry nodes, same key/value references, same
    /// comparison mode. Uses the unique-insert fast path; the source table
    /// cannot contain duplicate keys by construction.
    pub fn duplicate(&self) -> Self
    where
        K: Clone,
    {
        let copy = Self::with_capacity(self.len());
        let mut node = self.sentinel.next_in_ring();
        while !node.is_sentinel() {
            let (k, v) = node.pair();
            copy.insert_unique(k, v);
            node = node.next_in_ring();
        }
        copy.identity.set(self.identity.get());
        copy
    }

    pub fn cursor(&self) -> TableCursor<'_, K, V> {
        TableCursor::new(self)
    }

    pub fn iter(&self) -> Iter<'_, K, V>
    where
        K: Clone,
    {
        Iter::new(self.cursor())
    }

    pub fn keys(&self) -> Keys<'_, K, V>
    where
        K: Clone,
    {
        Keys::new(self.cursor())
    }

    pub fn values(&self) -> Values<'_, K, V> {
        Values::new(self.cursor())
    }

    /// Walks every live entry in insertion order, re-checking the generation
    /// at each step exactly as a cursor does. The callback may delete the
    /// current or other entries, or insert new ones (appended at the ring
    /// tail; whether the walk still reaches them is implementation-defined).
    /// Returns `false` if the callback stopped the walk early.
    pub fn visit<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&K, V) -> Visit,
    {
        let mut cursor = self.cursor();
        while let Some(node) = cursor.step() {
            let value = node.data().value.borrow().clone();
            if f(&node.data().key, value) == Visit::Stop {
                return false;
            }
        }
        true
    }

    /// Fallible variant of [`OrderedTable::visit`]: a callback error aborts
    /// the walk and propagates.
    pub fn try_visit<F, E>(&self, mut f: F) -> Result<bool, E>
    where
        F: FnMut(&K, V) -> Result<Visit, E>,
    {
        let mut cursor = self.cursor();
        while let Some(node) = cursor.step() {
            let value = node.data().value.borrow().clone();
            if f(&node.data().key, value)? == Visit::Stop {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Bulk export: the (key, value) pairs in insertion order.
    pub fn entries(&self) -> Vec<(K, V)>
    where
        K: Clone,
    {
        let mut out = Vec::with_capacity(self.len());
        self.visit(|k, v| {
            out.push((k.clone(), v));
            Visit::Continue
        });
        out
    }

    fn key_matches(&self, stored: &K, probe: &K) -> bool {
        stored.identical(probe) || (!self.identity.get() && probe.eql(stored))
    }

    fn find_node(&self, key: &K, hash: u64) -> Option<Rc<Node<K, V>>> {
        let buckets = self.buckets.borrow();
        let idx = bucket_index(hash, buckets.len());
        let mut cur = buckets[idx].clone();
        while let Some(node) = cur {
            if node.hash.get() == hash && self.key_matches(&node.data().key, key) {
                return Some(node);
            }
            let next = node.bucket_next.borrow().clone();
            cur = next;
        }
        None
    }

    fn push_new(&self, key: K, value: V, hash: u64) {
        let node = Rc::new(Node {
            data: Some(EntryData {
                key,
                value: RefCell::new(value),
            }),
            hash: Cell::new(hash),
            bucket_next: RefCell::new(None),
            order_prev: RefCell::new(None),
            order_next: RefCell::new(NextLink::Ring(Weak::new())),
        });
        self.link_tail(&node);
        {
            let mut buckets = self.buckets.borrow_mut();
            let idx = bucket_index(hash, buckets.len());
            *node.bucket_next.borrow_mut() = buckets[idx].take();
            buckets[idx] = Some(node);
        }
        self.size.set(self.size.get() + 1);
        self.maybe_grow();
    }

    /// Splice immediately before the sentinel (ring tail).
    fn link_tail(&self, node: &Rc<Node<K, V>>) {
        let tail = self
            .sentinel
            .order_prev
            .borrow()
            .as_ref()
            .and_then(|w| w.upgrade())
            .expect("order ring tail lost");
        *node.order_prev.borrow_mut() = Some(Rc::downgrade(&tail));
        *node.order_next.borrow_mut() = NextLink::Ring(Rc::downgrade(&self.sentinel));
        *tail.order_next.borrow_mut() = NextLink::Ring(Rc::downgrade(node));
        *self.sentinel.order_prev.borrow_mut() = Some(Rc::downgrade(node));
    }

    /// Unlink from the ring; `order_next` is pinned, not cleared, so cursors
    /// parked on this entry can still advance into the live list.
    fn ring_unlink(&self, node: &Rc<Node<K, V>>) {
        let prev = match node.order_prev.borrow_mut().take() {
            Some(weak) => weak.upgrade().expect("order ring prev lost"),
            None => return, // already dead
        };
        let next = node.next_in_ring();
        *prev.order_next.borrow_mut() = NextLink::Ring(Rc::downgrade(&next));
        *next.order_prev.borrow_mut() = Some(Rc::downgrade(&prev));
        *node.order_next.borrow_mut() = NextLink::Pinned(next);
    }

    fn bucket_unlink_match(&self, key: &K, hash: u64) -> Option<Rc<Node<K, V>>> {
        let mut buckets = self.buckets.borrow_mut();
        let idx = bucket_index(hash, buckets.len());
        let mut prev: Option<Rc<Node<K, V>>> = None;
        let mut cur = buckets[idx].clone();
        while let Some(node) = cur {
            if node.hash.get() == hash && self.key_matches(&node.data().key, key) {
                let next = node.bucket_next.borrow_mut().take();
                match &prev {
                    None => buckets[idx] = next,
                    Some(p) => *p.bucket_next.borrow_mut() = next,
                }
                return Some(node);
            }
            let next = node.bucket_next.borrow().clone();
            prev = Some(node);
            cur = next;
        }
        None
    }

    fn bucket_unlink_node(&self, target: &Rc<Node<K, V>>, hash: u64) -> bool {
        let mut buckets = self.buckets.borrow_mut();
        let idx = bucket_index(hash, buckets.len());
        let mut prev: Option<Rc<Node<K, V>>> = None;
        let mut cur = buckets[idx].clone();
        while let Some(node) = cur {
            if Rc::ptr_eq(&node, target) {
                let next = node.bucket_next.borrow_mut().take();
                match &prev {
                    None => buckets[idx] = next,
                    Some(p) => *p.bucket_next.borrow_mut() = next,
                }
                return true;
            }
            let next = node.bucket_next.borrow().clone();
            prev = Some(node);
            cur = next;
        }
        false
    }

    fn maybe_grow(&self) {
        if self.size.get() <= self.grow_at.get() {
            return;
        }
        let len = self.buckets.borrow().len();
        // Sequence exhausted: skip growth and let chains exceed the density
        // limit rather than fail.
        let Some(new_len) = next_capacity(len) else {
            return;
        };
        self.rebuild(new_len);
    }

    /// Rebuilds bucket chains at `new_len` from cached hashes by draining the
    /// old chains. The insertion-order ring is untouched, so iteration order
    /// is unaffected by growth.
    fn rebuild(&self, new_len: usize) {
        let mut old = mem::take(&mut *self.buckets.borrow_mut());
        let mut fresh: Vec<Option<Rc<Node<K, V>>>> = vec![None; new_len];
        for slot in old.iter_mut() {
            let mut cur = slot.take();
            while let Some(node) = cur {
                cur = node.bucket_next.borrow_mut().take();
                let idx = bucket_index(node.hash.get(), new_len);
                *node.bucket_next.borrow_mut() = fresh[idx].take();
                fresh[idx] = Some(node);
            }
        }
        *self.buckets.borrow_mut() = fresh;
        self.grow_at.set(new_len * MAX_DENSITY);
    }

    fn ring_nodes(&self) -> Vec<Rc<Node<K, V>>> {
        let mut nodes = Vec::with_capacity(self.len());
        let mut node = self.sentinel.next_in_ring();
        while !node.is_sentinel() {
            let next = node.next_in_ring();
            nodes.push(node);
            node = next;
        }
        nodes
    }
}

/// Break bucket links iteratively so dropping a long chain cannot recurse.
fn sever_chains<K, V>(old: Vec<Option<Rc<Node<K, V>>>>) {
    for head in old {
        let mut cur = head;
        while let Some(node) = cur {
            cur = node.bucket_next.borrow_mut().take();
        }
    }
}

impl<K, V> Drop for OrderedTable<K, V> {
    fn drop(&mut self) {
        let old = mem::take(&mut *self.buckets.borrow_mut());
        sever_chains(old);
    }
}

impl<K, V> Default for OrderedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: TableKey + Clone + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug for OrderedTable<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growth_steps_through_capacity_sequence() {
        let table: OrderedTable<i64, i64> = OrderedTable::new();
        assert_eq!(table.bucket_count(), 11);
        for i in 0..56 {
            table.insert(i, i);
        }
        // 56 > 11 * 5 forces one growth step
        assert_eq!(table.bucket_count(), 19);
        assert_eq!(table.len(), 56);
    }

    #[test]
    fn overwrite_keeps_size_and_returns_old() {
        let table: OrderedTable<&'static str, i64> = OrderedTable::new();
        assert_eq!(table.insert("k", 1), None);
        assert_eq!(table.insert("k", 2), Some(1));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&"k"), Some(2));
    }

    #[test]
    fn remove_then_reinsert_moves_to_tail() {
        let table: OrderedTable<&'static str, i64> = OrderedTable::new();
        table.insert("a", 1);
        table.insert("b", 2);
        table.insert("c", 3);
        table.remove(&"a");
        table.insert("a", 9);
        let keys: Vec<_> = table.keys().collect();
        assert_eq!(keys, ["b", "c", "a"]);
    }

    #[test]
    fn rehash_rejected_while_cursor_open() {
        let table: OrderedTable<i64, i64> = OrderedTable::new();
        table.insert(1, 1);
        {
            let _cursor = table.cursor();
            assert_eq!(table.rehash(), Err(TableError::Busy));
        }
        assert_eq!(table.rehash(), Ok(()));
    }
}
