//! Rank type and consolidation bucket sizing.
//!
//! # Why u8?
//!
//! A node's rank is the number of its direct children. Linking only ever
//! combines two trees of equal rank, so a root of rank `r` sits on top of at
//! least `F(r+2)` nodes (Fibonacci numbers) even when lazy decrease-keys have
//! cut children away. `u8` therefore covers any heap that fits in memory,
//! and keeps each arena node a few bytes smaller than a `usize` field would.
//!
//! # Bucket sizing
//!
//! Consolidation indexes trees by rank. [`bucket_capacity`] over-provisions
//! the bucket array so that rank sequences produced by mixing eager melds
//! with lazy cuts never run past the end; the consolidation pass still grows
//! the array if a rank ever lands outside it.

/// Type alias for node rank (number of direct children).
pub type Rank = u8;

/// Maximum valid rank value.
pub const MAX_RANK: Rank = u8::MAX;

/// Increment a rank, panicking on overflow.
///
/// # Panics
///
/// Panics if `rank == MAX_RANK`, which would need a heap far larger than
/// addressable memory.
///
/// # Example
///
/// ```rust
/// use rust_policy_heaps::rank::{checked_increment, Rank};
///
/// let rank: Rank = 5;
/// assert_eq!(checked_increment(rank), 6);
/// ```
#[inline]
pub fn checked_increment(rank: Rank) -> Rank {
    rank.checked_add(1).expect(
        "rank overflow: a root of rank 255 would need more than 2^170 nodes below it",
    )
}

/// Decrement a rank, saturating at zero.
///
/// ```rust
/// use rust_policy_heaps::rank::saturating_decrement;
///
/// assert_eq!(saturating_decrement(3), 2);
/// assert_eq!(saturating_decrement(0), 0);
/// ```
#[inline]
pub fn saturating_decrement(rank: Rank) -> Rank {
    rank.saturating_sub(1)
}

/// Number of rank buckets allocated by consolidation for a heap of `size`
/// nodes: `2 * (ceil(log2(max(size, 2))) + 5)`.
///
/// ```rust
/// use rust_policy_heaps::rank::bucket_capacity;
///
/// assert_eq!(bucket_capacity(0), 12);
/// assert_eq!(bucket_capacity(2), 12);
/// assert_eq!(bucket_capacity(1024), 30);
/// assert_eq!(bucket_capacity(1025), 32);
/// ```
pub fn bucket_capacity(size: usize) -> usize {
    let size = size.max(2);
    // ceil(log2(size)) for size >= 2
    let ceil_log2 = (usize::BITS - (size - 1).leading_zeros()) as usize;
    2 * (ceil_log2 + 5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_increment() {
        assert_eq!(checked_increment(0), 1);
        assert_eq!(checked_increment(254), 255);
    }

    #[test]
    #[should_panic(expected = "rank overflow")]
    fn test_checked_increment_overflow() {
        checked_increment(MAX_RANK);
    }

    #[test]
    fn test_saturating_decrement() {
        assert_eq!(saturating_decrement(5), 4);
        assert_eq!(saturating_decrement(1), 0);
        assert_eq!(saturating_decrement(0), 0);
    }

    #[test]
    fn test_bucket_capacity_matches_formula() {
        for size in 0..5000usize {
            let n = size.max(2) as f64;
            let expected = 2 * (n.log2().ceil() as usize + 5);
            assert_eq!(bucket_capacity(size), expected, "size {size}");
        }
    }

    #[test]
    fn test_bucket_capacity_exceeds_binomial_rank() {
        // A binomial forest of n nodes has ranks below floor(log2 n) + 1
        for exp in 1..40u32 {
            let size = 1usize << exp;
            assert!(bucket_capacity(size) > exp as usize + 1);
        }
    }
}
