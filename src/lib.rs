//! Policy-Switchable Forest Heaps for Rust
//!
//! This crate provides one priority queue over integer keys, built as a forest
//! of heap-ordered multiway trees, with two independent policy switches:
//! lazy or eager melds, and lazy (cut-based) or eager (sift-up) decrease-keys.
//! The four combinations reproduce four classical heaps from a single
//! implementation, so their amortized costs can be compared on identical
//! workloads.
//!
//! # Heaps
//!
//! - **Binomial Heap**: eager melds, eager decrease-keys
//! - **Lazy Binomial Heap**: lazy melds, eager decrease-keys
//! - **Fibonacci Heap**: lazy melds, lazy decrease-keys
//! - **Binomial Heap with Cutoffs**: eager melds, lazy decrease-keys
//!
//! Every heap counts the links, cuts, sift-up exchanges and marks it performs;
//! see [`Counters`]. The [`experiments`] module drives the four heaps through
//! the classic comparison workloads. [`Heap`] and [`DecreaseKeyHeap`] give
//! the same operations behind a trait interface.
//!
//! # Example
//!
//! ```rust
//! use rust_policy_heaps::{ForestHeap, HeapKind};
//!
//! let mut heap = ForestHeap::of_kind(HeapKind::Binomial);
//! let handle1 = heap.insert(5, "item1");
//! heap.insert(3, "item2");
//! heap.decrease_key(&handle1, 4).unwrap();
//! assert_eq!(heap.peek(), Some((1, &"item1")));
//! assert_eq!(heap.total_cuts(), 0);
//! ```

pub mod counters;
pub mod error;
pub mod experiments;
pub mod forest;
pub mod policy;
pub mod rank;
pub mod ring;
pub mod traits;

/// Key type stored by every heap. Callers insert positive keys; keys only
/// ever decrease afterwards.
pub type Key = i64;

pub use counters::Counters;
pub use error::{HeapError, InvariantViolation};
pub use forest::{ForestHeap, NodeHandle};
pub use policy::{HeapKind, Policy};
pub use traits::{DecreaseKeyHeap, Heap};
