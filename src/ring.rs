//! Arena-indexed circular doubly-linked rings.
//!
//! Every node of the forest belongs to exactly one ring: either the ring of
//! its parent's children or the heap's root ring. Rings are stored inside a
//! [`SlotMap`] arena, with sibling links held as arena keys instead of
//! pointers.
//!
//! In a circular ring:
//! - A single node links to itself (both `next` and `prev`)
//! - There is no head or tail, any member can serve as the entry point
//! - Joining two rings is O(1)
//! - Walking a ring must stop when it returns to its starting member
//!
//! All structural changes of the heap are expressed with the two primitives
//! [`splice_after`] and [`insert_before`], plus the derived [`unlink`] and
//! [`concat`].
//!
//! # Example
//!
//! ```rust
//! use rust_policy_heaps::ring::{self, RingLinks};
//! use slotmap::{DefaultKey, SlotMap};
//!
//! struct Link {
//!     next: DefaultKey,
//!     prev: DefaultKey,
//! }
//!
//! impl RingLinks<DefaultKey> for Link {
//!     fn next(&self) -> DefaultKey { self.next }
//!     fn prev(&self) -> DefaultKey { self.prev }
//!     fn set_next(&mut self, next: DefaultKey) { self.next = next; }
//!     fn set_prev(&mut self, prev: DefaultKey) { self.prev = prev; }
//! }
//!
//! let mut arena = SlotMap::new();
//! let a = arena.insert_with_key(|k| Link { next: k, prev: k });
//! let b = arena.insert_with_key(|k| Link { next: k, prev: k });
//!
//! ring::insert_before(&mut arena, a, b);
//! assert_eq!(ring::len(&arena, a), 2);
//! assert_eq!(arena[a].next(), b);
//! assert_eq!(arena[b].next(), a);
//! ```

use slotmap::{Key, SlotMap};

/// Access to the sibling links embedded in an arena node.
pub trait RingLinks<K> {
    /// The member following this one in its ring
    fn next(&self) -> K;
    /// The member preceding this one in its ring
    fn prev(&self) -> K;
    /// Overwrites the forward link without touching the neighbour
    fn set_next(&mut self, next: K);
    /// Overwrites the backward link without touching the neighbour
    fn set_prev(&mut self, prev: K);
}

/// Turns `node` into a ring of one element (`next == prev == node`).
///
/// The former neighbours are not updated; use [`unlink`] to leave a ring
/// cleanly.
#[inline]
pub fn make_singleton<K: Key, N: RingLinks<K>>(arena: &mut SlotMap<K, N>, node: K) {
    let n = &mut arena[node];
    n.set_next(node);
    n.set_prev(node);
}

/// Makes `b` immediately follow `a` (`a.next = b`, `b.prev = a`).
///
/// Only those two links are written. Joining two rings or excising a run of
/// nodes takes two calls.
#[inline]
pub fn splice_after<K: Key, N: RingLinks<K>>(arena: &mut SlotMap<K, N>, a: K, b: K) {
    arena[a].set_next(b);
    arena[b].set_prev(a);
}

/// Inserts the singleton `node` immediately before `entry` in `entry`'s ring.
#[inline]
pub fn insert_before<K: Key, N: RingLinks<K>>(arena: &mut SlotMap<K, N>, entry: K, node: K) {
    let before = arena[entry].prev();
    splice_after(arena, before, node);
    splice_after(arena, node, entry);
}

/// Removes `node` from its ring and leaves it as a singleton.
///
/// Returns the member that followed `node`, or `None` if `node` was the only
/// member (the ring is now absent).
#[inline]
pub fn unlink<K: Key, N: RingLinks<K>>(arena: &mut SlotMap<K, N>, node: K) -> Option<K> {
    let next = arena[node].next();
    if next == node {
        return None;
    }
    let prev = arena[node].prev();
    splice_after(arena, prev, next);
    make_singleton(arena, node);
    Some(next)
}

/// Joins the ring containing `b` onto the ring containing `a`.
///
/// The members of `b`'s ring end up between `a`'s last member and `a`, in
/// their original order starting at `b`. Both arguments must belong to
/// different rings.
#[inline]
pub fn concat<K: Key, N: RingLinks<K>>(arena: &mut SlotMap<K, N>, a: K, b: K) {
    let a_last = arena[a].prev();
    let b_last = arena[b].prev();
    splice_after(arena, a_last, b);
    splice_after(arena, b_last, a);
}

/// Number of members in the ring containing `entry`, walking it once.
pub fn len<K: Key, N: RingLinks<K>>(arena: &SlotMap<K, N>, entry: K) -> usize {
    iter(arena, entry).count()
}

/// Iterates the ring containing `entry` exactly once, starting at `entry`.
pub fn iter<K: Key, N: RingLinks<K>>(arena: &SlotMap<K, N>, entry: K) -> RingIter<'_, K, N> {
    RingIter {
        arena,
        start: entry,
        current: Some(entry),
    }
}

/// Iterator over one pass of a ring, created by [`iter`].
pub struct RingIter<'a, K: Key, N> {
    arena: &'a SlotMap<K, N>,
    start: K,
    current: Option<K>,
}

impl<K: Key, N: RingLinks<K>> Iterator for RingIter<'_, K, N> {
    type Item = K;

    fn next(&mut self) -> Option<K> {
        let current = self.current?;
        let next = self.arena[current].next();
        self.current = if next == self.start { None } else { Some(next) };
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::DefaultKey;

    struct Link {
        next: DefaultKey,
        prev: DefaultKey,
    }

    impl RingLinks<DefaultKey> for Link {
        fn next(&self) -> DefaultKey {
            self.next
        }
        fn prev(&self) -> DefaultKey {
            self.prev
        }
        fn set_next(&mut self, next: DefaultKey) {
            self.next = next;
        }
        fn set_prev(&mut self, prev: DefaultKey) {
            self.prev = prev;
        }
    }

    fn singleton(arena: &mut SlotMap<DefaultKey, Link>) -> DefaultKey {
        arena.insert_with_key(|k| Link { next: k, prev: k })
    }

    /// Builds a ring of `n` nodes, returned in ring order
    fn ring_of(arena: &mut SlotMap<DefaultKey, Link>, n: usize) -> Vec<DefaultKey> {
        let keys: Vec<_> = (0..n).map(|_| singleton(arena)).collect();
        for &k in &keys[1..] {
            insert_before(arena, keys[0], k);
        }
        keys
    }

    fn assert_consistent(arena: &SlotMap<DefaultKey, Link>, entry: DefaultKey) {
        for k in iter(arena, entry) {
            assert_eq!(arena[arena[k].next].prev, k);
            assert_eq!(arena[arena[k].prev].next, k);
        }
    }

    #[test]
    fn test_singleton_links_to_itself() {
        let mut arena = SlotMap::new();
        let a = singleton(&mut arena);
        assert_eq!(arena[a].next, a);
        assert_eq!(arena[a].prev, a);
        assert_eq!(len(&arena, a), 1);
    }

    #[test]
    fn test_insert_before_preserves_order() {
        let mut arena = SlotMap::new();
        let keys = ring_of(&mut arena, 5);
        let walked: Vec<_> = iter(&arena, keys[0]).collect();
        assert_eq!(walked, keys);
        assert_consistent(&arena, keys[0]);
    }

    #[test]
    fn test_unlink_middle_and_last() {
        let mut arena = SlotMap::new();
        let keys = ring_of(&mut arena, 3);

        assert_eq!(unlink(&mut arena, keys[1]), Some(keys[2]));
        assert_eq!(len(&arena, keys[0]), 2);
        assert_eq!(len(&arena, keys[1]), 1);
        assert_consistent(&arena, keys[0]);

        assert_eq!(unlink(&mut arena, keys[0]), Some(keys[2]));
        assert_eq!(unlink(&mut arena, keys[2]), None);
        assert_eq!(len(&arena, keys[2]), 1);
    }

    #[test]
    fn test_concat_joins_rings_in_order() {
        let mut arena = SlotMap::new();
        let left = ring_of(&mut arena, 3);
        let right = ring_of(&mut arena, 2);

        concat(&mut arena, left[0], right[0]);

        let walked: Vec<_> = iter(&arena, left[0]).collect();
        assert_eq!(walked, vec![left[0], left[1], left[2], right[0], right[1]]);
        assert_consistent(&arena, left[0]);
    }

    #[test]
    fn test_splice_after_excises_run() {
        let mut arena = SlotMap::new();
        let keys = ring_of(&mut arena, 4);

        // Drop keys[1] and keys[2] from the ring
        splice_after(&mut arena, keys[0], keys[3]);

        let walked: Vec<_> = iter(&arena, keys[0]).collect();
        assert_eq!(walked, vec![keys[0], keys[3]]);
        assert_consistent(&arena, keys[0]);
    }
}
