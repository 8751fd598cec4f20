//! Amortized-cost counters.
//!
//! Each structural primitive of the forest bumps exactly one counter:
//! linking two roots bumps `links`, cutting a subtree to the root ring bumps
//! `cuts`, one sift-up exchange bumps `heapify_cost`, and marking a node that
//! lost its first child bumps `marked`.

use std::ops::Add;

/// A snapshot of a heap's cumulative cost counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Counters {
    /// Number of link operations performed
    pub links: u64,
    /// Number of cut operations performed
    pub cuts: u64,
    /// Number of parent/child exchanges performed by sift-up
    pub heapify_cost: u64,
    /// Number of times a node was marked
    pub marked: u64,
}

impl Counters {
    /// Cost of the work done between `earlier` and `self`, counted as
    /// links + cuts + sift-up exchanges.
    ///
    /// ```rust
    /// use rust_policy_heaps::Counters;
    ///
    /// let before = Counters { links: 3, cuts: 1, heapify_cost: 0, marked: 0 };
    /// let after = Counters { links: 7, cuts: 2, heapify_cost: 5, marked: 1 };
    /// assert_eq!(after.cost_since(&before), 10);
    /// ```
    pub fn cost_since(&self, earlier: &Counters) -> u64 {
        self.links.saturating_sub(earlier.links)
            + self.cuts.saturating_sub(earlier.cuts)
            + self.heapify_cost.saturating_sub(earlier.heapify_cost)
    }

    /// Total cost counted from zero
    pub fn total_cost(&self) -> u64 {
        self.cost_since(&Counters::default())
    }
}

impl Add for Counters {
    type Output = Counters;

    fn add(self, rhs: Counters) -> Counters {
        Counters {
            links: self.links + rhs.links,
            cuts: self.cuts + rhs.cuts,
            heapify_cost: self.heapify_cost + rhs.heapify_cost,
            marked: self.marked + rhs.marked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_ignores_marks() {
        let before = Counters::default();
        let after = Counters {
            links: 0,
            cuts: 0,
            heapify_cost: 0,
            marked: 9,
        };
        assert_eq!(after.cost_since(&before), 0);
    }

    #[test]
    fn test_cost_never_negative() {
        // A single-node reset may drop heapify_cost back to zero
        let before = Counters {
            links: 2,
            cuts: 0,
            heapify_cost: 4,
            marked: 0,
        };
        let after = Counters {
            links: 2,
            cuts: 0,
            heapify_cost: 0,
            marked: 0,
        };
        assert_eq!(after.cost_since(&before), 0);
    }

    #[test]
    fn test_add_sums_fields() {
        let a = Counters {
            links: 1,
            cuts: 2,
            heapify_cost: 3,
            marked: 4,
        };
        assert_eq!(
            a + a,
            Counters {
                links: 2,
                cuts: 4,
                heapify_cost: 6,
                marked: 8
            }
        );
        assert_eq!(a.total_cost(), 6);
    }
}
