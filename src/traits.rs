//! Trait interface shared by priority queues over integer keys.
//!
//! [`Heap`] covers the operations every heap offers. [`DecreaseKeyHeap`]
//! adds the handle-based operations that need to find an element again after
//! it was inserted. Code written against these traits runs unchanged on any
//! of the four [`HeapKind`](crate::HeapKind) policies.

use crate::error::HeapError;
use crate::Key;

/// Basic min-heap over integer keys
///
/// # Example
///
/// ```rust
/// use rust_policy_heaps::{ForestHeap, Heap, HeapKind};
///
/// let mut heap = ForestHeap::of_kind(HeapKind::LazyBinomial);
/// heap.push(3, "three");
/// heap.push(1, "one");
/// heap.push(2, "two");
///
/// assert_eq!(Heap::peek(&heap), Some((1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// assert_eq!(heap.len(), 2);
/// ```
pub trait Heap<T> {
    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given key
    fn push(&mut self, key: Key, item: T);

    /// Returns the minimum key and associated item without removing it
    fn peek(&self) -> Option<(Key, &T)>;

    /// Removes and returns the minimum key and associated item
    fn pop(&mut self) -> Option<(Key, T)>;

    /// Merges another heap into this one, consuming the other heap
    fn merge(&mut self, other: Self)
    where
        Self: Sized;
}

/// Heap whose elements can be reached again through handles
///
/// Keys only ever move down: `decrease_key` takes the amount to subtract,
/// not a new key.
///
/// ```rust
/// use rust_policy_heaps::{DecreaseKeyHeap, ForestHeap, Heap, HeapKind};
///
/// let mut heap = ForestHeap::of_kind(HeapKind::Fibonacci);
/// let handle = heap.push_with_handle(10, "item");
/// heap.push(7, "other");
/// DecreaseKeyHeap::decrease_key(&mut heap, &handle, 5).unwrap();
/// assert_eq!(heap.pop(), Some((5, "item")));
/// ```
pub trait DecreaseKeyHeap<T>: Heap<T> {
    /// Handle type returned by [`push_with_handle`](Self::push_with_handle)
    type Handle;

    /// Inserts an element, returning a handle to it
    fn push_with_handle(&mut self, key: Key, item: T) -> Self::Handle;

    /// Subtracts `diff` from the key of the handle's element
    ///
    /// # Errors
    /// Returns an error if the handle is invalid or `diff` is negative or
    /// larger than the current key.
    fn decrease_key(&mut self, handle: &Self::Handle, diff: Key) -> Result<(), HeapError>;

    /// Removes the handle's element, returning its key and item
    ///
    /// # Errors
    /// Returns [`HeapError::InvalidHandle`] if the handle is invalid.
    fn delete(&mut self, handle: &Self::Handle) -> Result<(Key, T), HeapError>;
}
