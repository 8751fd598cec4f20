//! Forest heap with switchable meld and decrease-key policies
//!
//! A forest heap is a collection of heap-ordered multiway trees whose roots
//! are linked in a circular doubly-linked ring. The heap keeps a pointer to
//! the root with the smallest key. Two switches fixed at construction decide
//! how much repair work each operation does immediately:
//!
//! - **Lazy melds**: meld (and therefore insert) only splices root rings.
//!   **Eager melds** follow every splice with a full consolidation pass.
//! - **Lazy decrease-keys**: a node whose key drops below its parent's is cut
//!   to the root ring, with cascading cuts through marked ancestors.
//!   **Eager decrease-keys** sift the element up by exchanging it with its
//!   parent, never changing the tree shape.
//!
//! Delete-min always consolidates, so after it the forest holds at most one
//! tree per rank whatever the policy.
//!
//! # Cost counters
//!
//! The heap counts every link, cut, sift-up exchange and mark it performs.
//! The counters only grow, except that deleting the last element replaces
//! the forest with a fresh one and keeps only the link and cut totals.
//!
//! # Storage
//!
//! Nodes live in a [`SlotMap`] arena. Parent, child and sibling references
//! are arena keys, so removing a node can never leave a dangling pointer.
//! Handles follow their element rather than a tree position: when a sift-up
//! exchanges two elements, or a meld moves nodes into another arena, the
//! handles are rebound to wherever their element now lives.

use crate::counters::Counters;
use crate::error::{HeapError, InvariantViolation};
use crate::policy::{HeapKind, Policy};
use crate::rank::{self, Rank};
use crate::ring::{self, RingLinks};
use crate::traits::{DecreaseKeyHeap, Heap};
use crate::Key;
use log::debug;
use slotmap::{new_key_type, SecondaryMap, SlotMap};
use smallvec::{smallvec, SmallVec};
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

new_key_type! {
    /// Arena key of a tree position
    struct NodeKey;
}

/// Distinguishes heaps so handles cannot be used across them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapId(u64);

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(0);

impl HeapId {
    fn fresh() -> Self {
        HeapId(NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where an element currently lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    heap: HeapId,
    node: NodeKey,
}

/// Shared between an element's node and all of its handles. `None` once the
/// element has been removed.
type Binding = Rc<Cell<Option<Location>>>;

/// Handle to an element in a forest heap
///
/// Returned by [`ForestHeap::insert`] and [`ForestHeap::find_min`]. The
/// handle stays bound to its element through sift-up exchanges and melds.
/// Once the element is deleted the handle is dead and every operation given
/// it reports [`HeapError::InvalidHandle`].
#[derive(Clone)]
pub struct NodeHandle {
    binding: Binding,
}

impl NodeHandle {
    /// Returns true while the element is still stored in some heap
    pub fn is_live(&self) -> bool {
        self.binding.get().is_some()
    }
}

impl PartialEq for NodeHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.binding, &other.binding)
    }
}

impl Eq for NodeHandle {}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeHandle")
            .field("live", &self.is_live())
            .finish()
    }
}

/// A tree position holding one element
///
/// - `parent`: absent for roots
/// - `child`: entry point into the child ring, absent when `rank == 0`
/// - `next`/`prev`: siblings in the child ring of `parent`, or in the root ring
/// - `marked`: lost a child since it last became a child itself (lazy
///   decrease-keys only)
struct Node<T> {
    key: Key,
    item: T,
    binding: Binding,
    parent: Option<NodeKey>,
    child: Option<NodeKey>,
    next: NodeKey,
    prev: NodeKey,
    rank: Rank,
    marked: bool,
}

impl<T> RingLinks<NodeKey> for Node<T> {
    #[inline]
    fn next(&self) -> NodeKey {
        self.next
    }

    #[inline]
    fn prev(&self) -> NodeKey {
        self.prev
    }

    #[inline]
    fn set_next(&mut self, next: NodeKey) {
        self.next = next;
    }

    #[inline]
    fn set_prev(&mut self, prev: NodeKey) {
        self.prev = prev;
    }
}

/// Forest heap over integer keys
///
/// # Example
///
/// ```rust
/// use rust_policy_heaps::{ForestHeap, HeapKind};
///
/// let mut heap = ForestHeap::of_kind(HeapKind::Fibonacci);
/// let five = heap.insert(5, "five");
/// heap.insert(3, "three");
///
/// heap.decrease_key(&five, 4).unwrap();
/// assert_eq!(heap.peek(), Some((1, &"five")));
///
/// assert_eq!(heap.delete_min(), Some((1, "five")));
/// assert_eq!(heap.size(), 1);
/// assert!(!five.is_live());
/// ```
pub struct ForestHeap<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
    id: HeapId,
    policy: Policy,
    /// Root with the smallest key, absent iff the heap is empty
    min: Option<NodeKey>,
    /// Entry point into the root ring
    first: Option<NodeKey>,
    size: usize,
    num_trees: usize,
    counters: Counters,
}

impl<T> ForestHeap<T> {
    /// Creates an empty heap with the given policy switches
    pub fn new(lazy_melds: bool, lazy_decrease_keys: bool) -> Self {
        Self::with_policy(Policy::new(lazy_melds, lazy_decrease_keys))
    }

    /// Creates an empty heap with the given policy
    pub fn with_policy(policy: Policy) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            id: HeapId::fresh(),
            policy,
            min: None,
            first: None,
            size: 0,
            num_trees: 0,
            counters: Counters::default(),
        }
    }

    /// Creates an empty heap behaving as the named heap
    pub fn of_kind(kind: HeapKind) -> Self {
        Self::with_policy(kind.policy())
    }

    /// The policy fixed at construction
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// Number of elements in the heap
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns true if the heap holds no elements
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of trees in the forest (length of the root ring)
    pub fn num_trees(&self) -> usize {
        self.num_trees
    }

    /// Number of times a node has been marked by a cascading cut
    pub fn num_marked_nodes(&self) -> u64 {
        self.counters.marked
    }

    /// Total number of links performed
    pub fn total_links(&self) -> u64 {
        self.counters.links
    }

    /// Total number of cuts performed
    pub fn total_cuts(&self) -> u64 {
        self.counters.cuts
    }

    /// Total number of sift-up exchanges performed
    pub fn total_heapify_costs(&self) -> u64 {
        self.counters.heapify_cost
    }

    /// Snapshot of all cost counters
    pub fn counters(&self) -> Counters {
        self.counters
    }

    /// Inserts `item` with `key`, returning a handle to it
    ///
    /// The key must be positive. The new element is spliced into the root
    /// ring as a singleton tree; under eager melds the forest is then
    /// consolidated.
    ///
    /// # Time Complexity
    /// O(1) with lazy melds, O(number of trees) with eager melds.
    pub fn insert(&mut self, key: Key, item: T) -> NodeHandle {
        debug_assert!(key > 0, "keys must be positive, got {key}");

        let binding: Binding = Rc::new(Cell::new(None));
        let node = self.nodes.insert_with_key(|k| Node {
            key,
            item,
            binding: Rc::clone(&binding),
            parent: None,
            child: None,
            next: k,
            prev: k,
            rank: 0,
            marked: false,
        });
        binding.set(Some(Location {
            heap: self.id,
            node,
        }));

        self.splice_roots(node, node);
        self.size += 1;
        self.num_trees += 1;

        if !self.policy.lazy_melds {
            self.consolidate();
        }

        NodeHandle { binding }
    }

    /// Returns a handle to the element with the smallest key, `None` if empty
    pub fn find_min(&self) -> Option<NodeHandle> {
        self.min.map(|m| NodeHandle {
            binding: Rc::clone(&self.nodes[m].binding),
        })
    }

    /// Returns the smallest key and its item without removing them
    pub fn peek(&self) -> Option<(Key, &T)> {
        self.min.map(|m| {
            let node = &self.nodes[m];
            (node.key, &node.item)
        })
    }

    /// Returns the key and item of the handle's element
    pub fn get(&self, handle: &NodeHandle) -> Option<(Key, &T)> {
        let node = &self.nodes[self.resolve(handle).ok()?];
        Some((node.key, &node.item))
    }

    /// Returns the current key of the handle's element
    pub fn key_of(&self, handle: &NodeHandle) -> Option<Key> {
        self.get(handle).map(|(key, _)| key)
    }

    /// Returns true if the handle's element is stored in this heap
    pub fn contains(&self, handle: &NodeHandle) -> bool {
        self.resolve(handle).is_ok()
    }

    /// Handle to the element in the parent position of the handle's element,
    /// `None` for roots and invalid handles
    pub fn parent_of(&self, handle: &NodeHandle) -> Option<NodeHandle> {
        let parent = self.nodes[self.resolve(handle).ok()?].parent?;
        Some(NodeHandle {
            binding: Rc::clone(&self.nodes[parent].binding),
        })
    }

    /// Number of children below the handle's element
    pub fn rank_of(&self, handle: &NodeHandle) -> Option<usize> {
        let node = &self.nodes[self.resolve(handle).ok()?];
        Some(node.rank as usize)
    }

    /// Returns whether the position holding the handle's element is marked
    pub fn is_marked(&self, handle: &NodeHandle) -> Option<bool> {
        let node = &self.nodes[self.resolve(handle).ok()?];
        Some(node.marked)
    }

    /// Removes the element with the smallest key and returns it
    ///
    /// No-op returning `None` on an empty heap. Removing the last element
    /// replaces the forest with a fresh empty one that keeps only the link
    /// and cut totals. Otherwise the minimum's children become roots in its
    /// place and the forest is consolidated.
    ///
    /// # Time Complexity
    /// O(log n) amortized, O(number of trees + rank of the minimum) worst-case.
    pub fn delete_min(&mut self) -> Option<(Key, T)> {
        let min = self.min?;
        if self.size == 1 {
            return self.reset_to_empty(min);
        }

        let (removed_rank, child) = {
            let node = &self.nodes[min];
            (node.rank as usize, node.child)
        };

        if let Some(child) = child {
            self.promote_children(child);
        }

        if self.num_trees == 1 {
            // The children become the whole root ring
            self.first = child;
        } else {
            let rest = ring::unlink(&mut self.nodes, min);
            if self.first == Some(min) {
                self.first = rest;
            }
            if let (Some(rest), Some(child)) = (rest, child) {
                ring::concat(&mut self.nodes, rest, child);
            }
        }

        let removed = self.detach_element(min);
        self.size -= 1;
        self.num_trees = self.num_trees + removed_rank - 1;
        self.min = None;

        self.consolidate();
        self.recompute_min();

        removed
    }

    /// Decreases the key of the handle's element by `diff`
    ///
    /// With lazy decrease-keys a violated heap order is repaired by cutting
    /// the element's subtree to the root ring (cascading through marked
    /// ancestors). With eager decrease-keys the element is exchanged upward
    /// until its parent's key is no larger.
    ///
    /// # Errors
    /// - [`HeapError::InvalidHandle`] if the element is not in this heap
    /// - [`HeapError::NegativeDecrease`] if `diff < 0`
    /// - [`HeapError::KeyUnderflow`] if `diff` exceeds the current key
    ///
    /// Rejected calls leave the heap and its counters untouched.
    pub fn decrease_key(&mut self, handle: &NodeHandle, diff: Key) -> Result<(), HeapError> {
        let node = self.resolve(handle)?;
        if diff < 0 {
            return Err(HeapError::NegativeDecrease { diff });
        }
        let key = self.nodes[node].key;
        if diff > key {
            return Err(HeapError::KeyUnderflow { key, diff });
        }

        let position = self.lower_key(node, key - diff);
        self.offer_min(position);
        Ok(())
    }

    /// Removes the handle's element and returns it with its key
    ///
    /// An element other than the minimum is first driven below every other
    /// key (its key becomes -1, whatever its size) and then removed by
    /// [`delete_min`], so this
    /// has the same cost and consolidation behaviour as delete-min.
    ///
    /// [`delete_min`]: ForestHeap::delete_min
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the element is not in this heap.
    pub fn delete(&mut self, handle: &NodeHandle) -> Result<(Key, T), HeapError> {
        let node = self.resolve(handle)?;
        let key = self.nodes[node].key;

        if self.min != Some(node) {
            // Every stored key is non-negative, so -1 sits below all of them
            let position = self.lower_key(node, -1);
            self.offer_min(position);
        }

        let (_, item) = self.delete_min().ok_or(HeapError::InvalidHandle)?;
        Ok((key, item))
    }

    /// Melds `other` into this heap, consuming it
    ///
    /// Both heaps are expected to share the same policy. Handles issued by
    /// `other` remain valid and now refer to this heap.
    ///
    /// - `other` empty: no-op
    /// - this heap empty: takes over `other`'s forest and counters
    /// - otherwise: root rings are spliced and sizes and counters summed
    ///
    /// With eager melds the result is then consolidated.
    ///
    /// # Time Complexity
    /// O(1) ring splice plus a move of `other`'s nodes into this arena;
    /// eager melds add O(number of trees) consolidation.
    pub fn meld(&mut self, other: ForestHeap<T>) {
        if other.size == 0 {
            return;
        }

        if self.size == 0 {
            debug!(
                "meld into empty heap takes over {} nodes in {} trees",
                other.size, other.num_trees
            );
            let policy = self.policy;
            *self = other;
            self.policy = policy;
        } else {
            self.absorb(other);
        }

        if !self.policy.lazy_melds {
            self.consolidate();
        }
    }

    /// Verifies every structural invariant of the forest
    ///
    /// Checks ring consistency, heap order, ranks against child rings, the
    /// tree count against the root ring, absent parents on roots, that the
    /// minimum pointer names a root with the smallest key, that the size
    /// matches the reachable nodes, and that handles point back at their
    /// nodes. Intended for tests; runs in O(n).
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let Some(first) = self.first else {
            if self.size != 0 || !self.nodes.is_empty() {
                return Err(InvariantViolation::Size {
                    stored: self.size,
                    actual: 0,
                });
            }
            if self.num_trees != 0 {
                return Err(InvariantViolation::TreeCount {
                    stored: self.num_trees,
                    actual: 0,
                });
            }
            if let Some(min) = self.min {
                return Err(InvariantViolation::StaleMin {
                    pointed: self.nodes.get(min).map(|n| n.key),
                    smallest: None,
                });
            }
            return Ok(());
        };

        let roots = self.checked_ring(first)?;
        if roots.len() != self.num_trees {
            return Err(InvariantViolation::TreeCount {
                stored: self.num_trees,
                actual: roots.len(),
            });
        }

        let mut reached = 0;
        for &root in &roots {
            if self.nodes[root].parent.is_some() {
                return Err(InvariantViolation::RootHasParent);
            }
            reached += self.check_tree(root)?;
        }
        if reached != self.size || reached != self.nodes.len() {
            return Err(InvariantViolation::Size {
                stored: self.size,
                actual: reached,
            });
        }

        let smallest = roots.iter().map(|&r| self.nodes[r].key).min();
        let pointed = self.min.map(|m| self.nodes[m].key);
        let min_is_root = self.min.is_some_and(|m| roots.contains(&m));
        if pointed != smallest || !min_is_root {
            return Err(InvariantViolation::StaleMin { pointed, smallest });
        }

        Ok(())
    }

    fn resolve(&self, handle: &NodeHandle) -> Result<NodeKey, HeapError> {
        match handle.binding.get() {
            Some(location) if location.heap == self.id && self.nodes.contains_key(location.node) => {
                Ok(location.node)
            }
            _ => Err(HeapError::InvalidHandle),
        }
    }

    /// Joins a root ring entered at `entry`, whose smallest root is
    /// `ring_min`, onto the end of this heap's root ring
    fn splice_roots(&mut self, entry: NodeKey, ring_min: NodeKey) {
        match self.first {
            None => {
                self.first = Some(entry);
                self.min = Some(ring_min);
            }
            Some(first) => {
                ring::concat(&mut self.nodes, first, entry);
                self.offer_min(ring_min);
            }
        }
    }

    /// Makes `node` the minimum if it is a root with a smaller key
    fn offer_min(&mut self, node: NodeKey) {
        if self.nodes[node].parent.is_some() {
            return;
        }
        let smaller = match self.min {
            None => true,
            Some(min) => self.nodes[node].key < self.nodes[min].key,
        };
        if smaller {
            self.min = Some(node);
        }
    }

    /// Linear scan of the root ring for the smallest key
    fn recompute_min(&mut self) {
        self.min = self.first.and_then(|first| {
            ring::iter(&self.nodes, first).min_by_key(|&root| self.nodes[root].key)
        });
    }

    /// Replaces the forest with a fresh empty one, keeping only the link and
    /// cut totals
    fn reset_to_empty(&mut self, last: NodeKey) -> Option<(Key, T)> {
        let removed = self.detach_element(last);
        debug!(
            "deleting last element resets the forest (links={}, cuts={}, heapify cost {} dropped)",
            self.counters.links, self.counters.cuts, self.counters.heapify_cost
        );

        self.nodes.clear();
        self.min = None;
        self.first = None;
        self.size = 0;
        self.num_trees = 0;
        self.counters = Counters {
            links: self.counters.links,
            cuts: self.counters.cuts,
            ..Counters::default()
        };

        removed
    }

    /// Removes a node from the arena and kills its handles
    fn detach_element(&mut self, node: NodeKey) -> Option<(Key, T)> {
        self.nodes.remove(node).map(|node| {
            node.binding.set(None);
            (node.key, node.item)
        })
    }

    /// Turns every member of a child ring into a root (the ring itself is
    /// left intact)
    fn promote_children(&mut self, child: NodeKey) {
        let mut current = child;
        loop {
            let node = &mut self.nodes[current];
            node.parent = None;
            node.marked = false;
            current = node.next;
            if current == child {
                break;
            }
        }
    }

    /// Links trees of equal rank until at most one tree of each rank remains,
    /// then rebuilds the root ring from highest to lowest rank
    fn consolidate(&mut self) {
        let Some(first) = self.first else {
            return;
        };
        if self.size == 0 || self.num_trees == 0 {
            return;
        }

        let trees_before = self.num_trees;
        let links_before = self.counters.links;

        let mut buckets: SmallVec<[Option<NodeKey>; 64]> =
            smallvec![None; rank::bucket_capacity(self.size)];

        let mut current = first;
        for _ in 0..trees_before {
            let next = self.nodes[current].next;
            ring::make_singleton(&mut self.nodes, current);

            let mut root = current;
            let mut rank = self.recompute_rank(root);
            loop {
                if rank >= buckets.len() {
                    buckets.resize(rank + 1, None);
                }
                match buckets[rank].take() {
                    Some(other) => {
                        root = self.link(root, other);
                        rank = self.nodes[root].rank as usize;
                    }
                    None => break,
                }
            }
            buckets[rank] = Some(root);

            current = next;
        }

        self.rebuild_roots(&buckets);

        debug!(
            "consolidated {} trees into {} with {} links",
            trees_before,
            self.num_trees,
            self.counters.links - links_before
        );
    }

    /// Counts `node`'s children by walking its child ring and stores the
    /// result as its rank
    fn recompute_rank(&mut self, node: NodeKey) -> usize {
        let actual = self.nodes[node]
            .child
            .map_or(0, |child| ring::len(&self.nodes, child));
        let stored = &mut self.nodes[node].rank;
        if *stored as usize != actual {
            debug!("rank drift: stored {} but {} children", stored, actual);
        }
        *stored = Rank::try_from(actual).unwrap_or(rank::MAX_RANK);
        actual
    }

    /// Links two singleton roots: the one with the larger key becomes the
    /// youngest child of the other. Returns the new root.
    fn link(&mut self, x: NodeKey, y: NodeKey) -> NodeKey {
        let (parent, child) = if self.nodes[y].key < self.nodes[x].key {
            (y, x)
        } else {
            (x, y)
        };

        let youngest = self.nodes[parent].child;
        match youngest {
            Some(youngest) => {
                let oldest = self.nodes[youngest].next;
                ring::splice_after(&mut self.nodes, child, oldest);
                ring::splice_after(&mut self.nodes, youngest, child);
            }
            None => ring::make_singleton(&mut self.nodes, child),
        }

        let c = &mut self.nodes[child];
        c.parent = Some(parent);
        c.marked = false;

        let p = &mut self.nodes[parent];
        p.child = Some(child);
        p.rank = rank::checked_increment(p.rank);

        self.counters.links += 1;
        parent
    }

    /// Rebuilds the root ring from rank buckets, highest rank first
    fn rebuild_roots(&mut self, buckets: &[Option<NodeKey>]) {
        self.first = None;
        self.min = None;
        self.num_trees = 0;

        for &root in buckets.iter().rev().flatten() {
            match self.first {
                None => ring::make_singleton(&mut self.nodes, root),
                Some(first) => ring::insert_before(&mut self.nodes, first, root),
            }
            self.first = Some(root);
            self.offer_min(root);
            self.num_trees += 1;
        }
    }

    /// Sets the key to `key`, which must not exceed the current one, and
    /// repairs heap order according to the decrease-key policy without
    /// touching the minimum pointer. Returns the position now holding the
    /// element.
    fn lower_key(&mut self, node: NodeKey, key: Key) -> NodeKey {
        debug_assert!(key <= self.nodes[node].key);
        self.nodes[node].key = key;

        let Some(parent) = self.nodes[node].parent else {
            return node;
        };
        if self.nodes[node].key >= self.nodes[parent].key {
            return node;
        }

        if self.policy.lazy_decrease_keys {
            self.cascading_cut(node);
            node
        } else {
            self.heapify_up(node)
        }
    }

    /// Exchanges the element at `node` with its parent's while the parent's
    /// key is larger. Returns the final position.
    fn heapify_up(&mut self, node: NodeKey) -> NodeKey {
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            if self.nodes[current].key >= self.nodes[parent].key {
                break;
            }
            self.exchange(current, parent);
            current = parent;
            self.counters.heapify_cost += 1;
        }
        current
    }

    /// Swaps the elements held at two positions and rebinds their handles
    fn exchange(&mut self, a: NodeKey, b: NodeKey) {
        let heap = self.id;
        let Some([x, y]) = self.nodes.get_disjoint_mut([a, b]) else {
            unreachable!("sift-up exchange needs two distinct live positions");
        };
        std::mem::swap(&mut x.key, &mut y.key);
        std::mem::swap(&mut x.item, &mut y.item);
        std::mem::swap(&mut x.binding, &mut y.binding);
        x.binding.set(Some(Location { heap, node: a }));
        y.binding.set(Some(Location { heap, node: b }));
    }

    /// Cuts `node`, then keeps cutting up through marked ancestors. The first
    /// unmarked non-root ancestor reached is marked.
    fn cascading_cut(&mut self, node: NodeKey) {
        let mut current = node;
        let mut chain = 0usize;

        while let Some(parent) = self.cut(current) {
            chain += 1;
            if self.nodes[parent].parent.is_none() {
                break;
            }
            if !self.nodes[parent].marked {
                self.nodes[parent].marked = true;
                self.counters.marked += 1;
                break;
            }
            current = parent;
        }

        if chain > 1 {
            debug!("cascading cut moved {chain} subtrees to the root ring");
        }
    }

    /// Moves `node`'s subtree from its parent's child ring to the root ring.
    /// Returns the former parent, or `None` if `node` was already a root.
    fn cut(&mut self, node: NodeKey) -> Option<NodeKey> {
        let parent = self.nodes[node].parent?;

        let rest = ring::unlink(&mut self.nodes, node);
        let p = &mut self.nodes[parent];
        if p.child == Some(node) {
            p.child = rest;
        }
        p.rank = rank::saturating_decrement(p.rank);

        let n = &mut self.nodes[node];
        n.parent = None;
        n.marked = false;
        match self.first {
            Some(first) => ring::insert_before(&mut self.nodes, first, node),
            None => ring::make_singleton(&mut self.nodes, node),
        }
        self.first = Some(node);
        self.num_trees += 1;

        self.counters.cuts += 1;
        Some(parent)
    }

    /// Moves every node of a non-empty `other` into this arena and appends
    /// its root ring to ours
    fn absorb(&mut self, other: ForestHeap<T>) {
        let ForestHeap {
            nodes,
            first,
            min,
            size,
            num_trees,
            counters,
            ..
        } = other;

        let mut moved: SecondaryMap<NodeKey, NodeKey> = SecondaryMap::with_capacity(nodes.len());
        for (old, node) in nodes {
            moved.insert(old, self.nodes.insert(node));
        }

        let heap = self.id;
        for &new in moved.values() {
            let node = &mut self.nodes[new];
            node.next = moved[node.next];
            node.prev = moved[node.prev];
            node.parent = node.parent.map(|p| moved[p]);
            node.child = node.child.map(|c| moved[c]);
            node.binding.set(Some(Location { heap, node: new }));
        }

        if let (Some(first), Some(min)) = (first, min) {
            self.splice_roots(moved[first], moved[min]);
        }
        self.size += size;
        self.num_trees += num_trees;
        self.counters = self.counters + counters;

        debug!("melded {size} nodes in {num_trees} trees (lazy={})", self.policy.lazy_melds);
    }

    /// Walks a ring once, checking link consistency and bounding the walk by
    /// the arena size
    fn checked_ring(&self, entry: NodeKey) -> Result<Vec<NodeKey>, InvariantViolation> {
        let mut members = Vec::new();
        let mut current = entry;
        loop {
            let next = self.nodes.get(current).ok_or(InvariantViolation::BrokenRing)?.next;
            let back = self.nodes.get(next).ok_or(InvariantViolation::BrokenRing)?.prev;
            if back != current || members.len() > self.nodes.len() {
                return Err(InvariantViolation::BrokenRing);
            }
            members.push(current);
            current = next;
            if current == entry {
                return Ok(members);
            }
        }
    }

    /// Checks heap order, ranks, parent links and handle bindings below
    /// `root`. Returns the number of nodes in the tree.
    fn check_tree(&self, root: NodeKey) -> Result<usize, InvariantViolation> {
        let mut stack = vec![root];
        let mut count = 0;

        while let Some(current) = stack.pop() {
            count += 1;
            let node = &self.nodes[current];

            let expected = Some(Location {
                heap: self.id,
                node: current,
            });
            if node.binding.get() != expected {
                return Err(InvariantViolation::UnboundHandle);
            }

            let children = match node.child {
                Some(child) => self.checked_ring(child)?,
                None => Vec::new(),
            };
            if children.len() != node.rank as usize {
                return Err(InvariantViolation::Rank {
                    stored: node.rank as usize,
                    actual: children.len(),
                });
            }
            for child in children {
                let c = &self.nodes[child];
                if c.parent != Some(current) {
                    return Err(InvariantViolation::WrongParent);
                }
                if c.key < node.key {
                    return Err(InvariantViolation::HeapOrder {
                        parent: node.key,
                        child: c.key,
                    });
                }
                stack.push(child);
            }
        }

        Ok(count)
    }
}

impl<T> Heap<T> for ForestHeap<T> {
    fn is_empty(&self) -> bool {
        self.size == 0
    }

    fn len(&self) -> usize {
        self.size
    }

    fn push(&mut self, key: Key, item: T) {
        self.insert(key, item);
    }

    fn peek(&self) -> Option<(Key, &T)> {
        ForestHeap::peek(self)
    }

    fn pop(&mut self) -> Option<(Key, T)> {
        self.delete_min()
    }

    /// Melds `other` in; see [`ForestHeap::meld`]
    fn merge(&mut self, other: Self) {
        self.meld(other);
    }
}

impl<T> DecreaseKeyHeap<T> for ForestHeap<T> {
    type Handle = NodeHandle;

    fn push_with_handle(&mut self, key: Key, item: T) -> NodeHandle {
        self.insert(key, item)
    }

    fn decrease_key(&mut self, handle: &NodeHandle, diff: Key) -> Result<(), HeapError> {
        ForestHeap::decrease_key(self, handle, diff)
    }

    fn delete(&mut self, handle: &NodeHandle) -> Result<(Key, T), HeapError> {
        ForestHeap::delete(self, handle)
    }
}

impl<T> fmt::Debug for ForestHeap<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForestHeap")
            .field("kind", &self.policy.kind())
            .field("size", &self.size)
            .field("num_trees", &self.num_trees)
            .field("min", &self.min.map(|m| self.nodes[m].key))
            .field("counters", &self.counters)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heap(kind: HeapKind) -> ForestHeap<&'static str> {
        ForestHeap::of_kind(kind)
    }

    #[test]
    fn test_basic_operations() {
        for kind in HeapKind::ALL {
            let mut heap = heap(kind);
            assert!(heap.is_empty());
            assert_eq!(heap.size(), 0);
            assert!(heap.find_min().is_none());

            heap.insert(5, "a");
            let b = heap.insert(3, "b");
            heap.insert(7, "c");

            assert_eq!(heap.size(), 3);
            assert_eq!(heap.peek(), Some((3, &"b")));
            assert_eq!(heap.find_min(), Some(b.clone()));

            assert_eq!(heap.delete_min(), Some((3, "b")));
            assert_eq!(heap.peek(), Some((5, &"a")));
            assert!(!b.is_live());
            heap.check_invariants().unwrap();
        }
    }

    #[test]
    fn test_eager_meld_insert_counts_binary_carries() {
        let mut heap = heap(HeapKind::Binomial);
        for key in 1..=8 {
            heap.insert(key, "x");
            heap.check_invariants().unwrap();
        }
        // n inserts cost n - popcount(n) links
        assert_eq!(heap.total_links(), 7);
        assert_eq!(heap.num_trees(), 1);

        heap.insert(9, "x");
        heap.insert(10, "x");
        assert_eq!(heap.total_links(), 8);
        assert_eq!(heap.num_trees(), 2);
    }

    #[test]
    fn test_lazy_meld_insert_never_links() {
        let mut heap = heap(HeapKind::Fibonacci);
        for key in 1..=8 {
            heap.insert(key, "x");
        }
        assert_eq!(heap.total_links(), 0);
        assert_eq!(heap.num_trees(), 8);

        assert_eq!(heap.delete_min(), Some((1, "x")));
        // Seven singletons consolidate into trees of rank 2, 1 and 0
        assert_eq!(heap.total_links(), 4);
        assert_eq!(heap.num_trees(), 3);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_consolidation_recomputes_drifted_rank() {
        let mut heap = heap(HeapKind::LazyBinomial);
        for key in 1..=5 {
            heap.insert(key, "x");
        }
        heap.delete_min();
        let root = heap.first.unwrap();
        let true_rank = heap.nodes[root].rank;
        heap.nodes[root].rank = true_rank + 3;

        heap.consolidate();
        assert_eq!(heap.nodes[root].rank, true_rank);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_consolidate_on_empty_forest_is_noop() {
        let mut heap = heap(HeapKind::Binomial);
        heap.consolidate();
        assert_eq!(heap.num_trees(), 0);
        assert_eq!(heap.counters(), Counters::default());
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_cut_fixes_parent_child_entry() {
        let mut heap = heap(HeapKind::Fibonacci);
        let handles: Vec<_> = (1..=5).map(|k| heap.insert(k, "x")).collect();
        heap.delete_min();
        // Keys 2..=5 form one tree of rank 2
        assert_eq!(heap.num_trees(), 1);

        for handle in &handles[1..] {
            let node = heap.resolve(handle).unwrap();
            if heap.nodes[node].parent.is_some() {
                let parent = heap.nodes[node].parent.unwrap();
                let rank_before = heap.nodes[parent].rank;
                heap.cut(node);
                assert_eq!(heap.nodes[parent].rank, rank_before - 1);
                heap.check_invariants().unwrap_or_else(|e| panic!("{e}"));
            }
        }
        assert_eq!(heap.num_trees(), 4);
    }

    #[test]
    fn test_exchange_rebinds_handles() {
        let mut heap = heap(HeapKind::Binomial);
        let a = heap.insert(10, "a");
        let b = heap.insert(20, "b");
        // Eager meld linked b under a
        assert_eq!(heap.parent_of(&b), Some(a.clone()));

        heap.decrease_key(&b, 15).unwrap();
        assert_eq!(heap.total_heapify_costs(), 1);
        assert_eq!(heap.get(&b), Some((5, &"b")));
        assert_eq!(heap.get(&a), Some((10, &"a")));
        assert_eq!(heap.parent_of(&a), Some(b.clone()));
        assert_eq!(heap.find_min(), Some(b));
        heap.check_invariants().unwrap();
    }

    #[test]
    #[should_panic(expected = "two distinct live positions")]
    fn test_exchange_with_itself_panics() {
        let mut heap = heap(HeapKind::Binomial);
        let a = heap.insert(1, "a");
        let node = heap.resolve(&a).unwrap();
        heap.exchange(node, node);
    }

    #[test]
    fn test_exchange_counts_only_real_swaps() {
        let mut heap = heap(HeapKind::Binomial);
        let handles: Vec<_> = (1..=8).map(|k| heap.insert(k, "x")).collect();
        let deepest = handles
            .iter()
            .max_by_key(|h| {
                let mut depth = 0;
                let mut node = heap.resolve(h).unwrap();
                while let Some(parent) = heap.nodes[node].parent {
                    depth += 1;
                    node = parent;
                }
                depth
            })
            .unwrap()
            .clone();

        heap.decrease_key(&deepest, heap.key_of(&deepest).unwrap()).unwrap();
        assert_eq!(heap.total_heapify_costs(), 3);
        let root = heap.resolve(&deepest).unwrap();
        assert_eq!(heap.nodes[root].parent, None);
        assert_eq!(heap.nodes[root].key, 0);
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_delete_largest_key_does_not_overflow() {
        let mut heap = heap(HeapKind::Binomial);
        heap.insert(1, "small");
        let big = heap.insert(Key::MAX, "big");
        assert!(heap.nodes[heap.resolve(&big).unwrap()].parent.is_some());

        assert_eq!(heap.delete(&big), Ok((Key::MAX, "big")));
        assert_eq!(heap.peek(), Some((1, &"small")));
        heap.check_invariants().unwrap();
    }

    #[test]
    fn test_debug_shows_summary() {
        let mut heap = heap(HeapKind::Fibonacci);
        heap.insert(4, "x");
        let shown = format!("{heap:?}");
        assert!(shown.contains("Fibonacci"));
        assert!(shown.contains("size: 1"));
    }
}
