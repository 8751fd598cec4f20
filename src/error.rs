//! Error types for heap operations and structural checks.

use crate::Key;
use thiserror::Error;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HeapError {
    /// The handle's element was removed, or the handle belongs to another heap
    #[error("handle is no longer valid (element was removed or belongs to another heap)")]
    InvalidHandle,
    /// A decrease-key was asked to increase the key
    #[error("cannot decrease a key by a negative amount ({diff})")]
    NegativeDecrease {
        /// The rejected amount
        diff: Key,
    },
    /// A decrease-key would push the key below zero
    #[error("decreasing key {key} by {diff} would leave the non-negative key domain")]
    KeyUnderflow {
        /// The element's current key
        key: Key,
        /// The rejected amount
        diff: Key,
    },
}

/// A structural invariant found broken by
/// [`ForestHeap::check_invariants`](crate::forest::ForestHeap::check_invariants).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// A child's key is smaller than its parent's key
    #[error("heap order violated: parent key {parent} above child key {child}")]
    HeapOrder {
        /// The parent's key
        parent: Key,
        /// The child's key
        child: Key,
    },
    /// A node's stored rank differs from the length of its child ring
    #[error("stored rank {stored} differs from {actual} children")]
    Rank {
        /// The rank field
        stored: usize,
        /// Children counted by walking the child ring
        actual: usize,
    },
    /// The root ring length differs from the tree count
    #[error("tree count {stored} differs from {actual} roots in the root ring")]
    TreeCount {
        /// The tree counter
        stored: usize,
        /// Roots counted by walking the root ring
        actual: usize,
    },
    /// A node reachable from the root ring has a parent
    #[error("root ring member has a parent")]
    RootHasParent,
    /// A child's parent link does not point at the node owning its ring
    #[error("child ring member points at the wrong parent")]
    WrongParent,
    /// A ring's `next`/`prev` links disagree
    #[error("ring links are not mutually consistent")]
    BrokenRing,
    /// The minimum pointer does not name a root with the smallest key
    #[error("minimum pointer is stale: points at key {pointed:?}, smallest root key is {smallest:?}")]
    StaleMin {
        /// Key under the minimum pointer
        pointed: Option<Key>,
        /// Smallest key found in the root ring
        smallest: Option<Key>,
    },
    /// The size counter differs from the number of reachable nodes
    #[error("size {stored} differs from {actual} reachable nodes")]
    Size {
        /// The size counter
        stored: usize,
        /// Nodes reached by walking every tree
        actual: usize,
    },
    /// A handle cell does not point back at the node holding its element
    #[error("element handle is not bound to the node holding it")]
    UnboundHandle,
}
