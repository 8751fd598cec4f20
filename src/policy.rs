//! Policy switches selecting which classical heap a [`ForestHeap`] behaves as.
//!
//! | `lazy_melds` | `lazy_decrease_keys` | Behaves as                 |
//! |--------------|----------------------|----------------------------|
//! | `false`      | `false`              | Binomial heap              |
//! | `true`       | `false`              | Lazy binomial heap         |
//! | `true`       | `true`               | Fibonacci heap             |
//! | `false`      | `true`               | Binomial heap with cutoffs |
//!
//! [`ForestHeap`]: crate::forest::ForestHeap

use std::fmt;

/// The two independent policy switches of a forest heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Policy {
    /// Meld only splices root rings; consolidation waits for the next delete-min
    pub lazy_melds: bool,
    /// Decrease-key cuts the offending subtree (with cascading cuts) instead
    /// of sifting the element up
    pub lazy_decrease_keys: bool,
}

impl Policy {
    /// Creates a policy from the two switches
    pub const fn new(lazy_melds: bool, lazy_decrease_keys: bool) -> Self {
        Self {
            lazy_melds,
            lazy_decrease_keys,
        }
    }

    /// The named heap this policy reproduces
    pub const fn kind(self) -> HeapKind {
        match (self.lazy_melds, self.lazy_decrease_keys) {
            (false, false) => HeapKind::Binomial,
            (true, false) => HeapKind::LazyBinomial,
            (true, true) => HeapKind::Fibonacci,
            (false, true) => HeapKind::BinomialWithCutoffs,
        }
    }
}

impl From<HeapKind> for Policy {
    fn from(kind: HeapKind) -> Self {
        kind.policy()
    }
}

/// The four named policy combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapKind {
    /// Eager melds, eager decrease-keys
    Binomial,
    /// Lazy melds, eager decrease-keys
    LazyBinomial,
    /// Lazy melds, lazy decrease-keys
    Fibonacci,
    /// Eager melds, lazy decrease-keys
    BinomialWithCutoffs,
}

impl HeapKind {
    /// All four kinds, in the order experiments report them
    pub const ALL: [HeapKind; 4] = [
        HeapKind::Binomial,
        HeapKind::LazyBinomial,
        HeapKind::Fibonacci,
        HeapKind::BinomialWithCutoffs,
    ];

    /// The switches this kind stands for
    pub const fn policy(self) -> Policy {
        match self {
            HeapKind::Binomial => Policy::new(false, false),
            HeapKind::LazyBinomial => Policy::new(true, false),
            HeapKind::Fibonacci => Policy::new(true, true),
            HeapKind::BinomialWithCutoffs => Policy::new(false, true),
        }
    }
}

impl fmt::Display for HeapKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let policy = self.policy();
        let name = match self {
            HeapKind::Binomial => "Binomial Heap",
            HeapKind::LazyBinomial => "Lazy Binomial Heap",
            HeapKind::Fibonacci => "Fibonacci Heap",
            HeapKind::BinomialWithCutoffs => "Binomial with Cutoffs",
        };
        write!(
            f,
            "{name} (lazy melds={}, lazy decrease keys={})",
            policy.lazy_melds, policy.lazy_decrease_keys
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_policy_round_trip() {
        for kind in HeapKind::ALL {
            assert_eq!(kind.policy().kind(), kind);
        }
    }

    #[test]
    fn test_all_switch_combinations_are_named() {
        let mut seen = Vec::new();
        for lazy_melds in [false, true] {
            for lazy_decrease_keys in [false, true] {
                seen.push(Policy::new(lazy_melds, lazy_decrease_keys).kind());
            }
        }
        for kind in HeapKind::ALL {
            assert!(seen.contains(&kind));
        }
    }

    #[test]
    fn test_display_names_switches() {
        assert_eq!(
            HeapKind::Fibonacci.to_string(),
            "Fibonacci Heap (lazy melds=true, lazy decrease keys=true)"
        );
    }
}
