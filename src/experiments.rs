//! Experiment driver comparing the four heap policies
//!
//! Each [`Experiment`] is a scripted workload over a random permutation of
//! the keys `1..=n`. A trial runs one workload on one [`HeapKind`], timing it
//! and recording the heap's cost counters plus the most expensive single
//! operation (links + cuts + sift-up exchanges). [`run_experiment`] repeats
//! trials and averages them.
//!
//! # Example
//!
//! ```rust
//! use rust_policy_heaps::experiments::{run_experiment, random_permutation, Experiment, ExperimentConfig};
//! use rust_policy_heaps::HeapKind;
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = ExperimentConfig { n: 200, trials: 2, ..ExperimentConfig::default() };
//! let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
//! let perm = random_permutation(config.n, &mut rng);
//!
//! let summary = run_experiment(Experiment::InsertThenDeleteMin, HeapKind::Fibonacci, &perm, &config).unwrap();
//! assert_eq!(summary.final_size, 199);
//! ```

use crate::{Counters, ForestHeap, HeapError, HeapKind, Key, NodeHandle};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;
use std::time::{Duration, Instant};

/// Number of keys inserted by the reference experiments
pub const DEFAULT_N: usize = 464_646;

/// Trials averaged per heap kind
pub const DEFAULT_TRIALS: usize = 20;

/// Elements left in the heap by [`Experiment::ShrinkToRemnant`]
pub const DEFAULT_REMNANT: usize = 46;

/// Seed for the key permutation
pub const DEFAULT_SEED: u64 = 0x5EED_F1B0;

/// Keys decreased by 1 in [`Experiment::InsertThenDeleteMin`]
const SMALL_KEY_DECREASES: usize = 1000;

/// Workload parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExperimentConfig {
    /// Number of keys inserted
    pub n: usize,
    /// Trials averaged per heap kind
    pub trials: usize,
    /// Seed for the key permutation
    pub seed: u64,
    /// Final heap size of [`Experiment::ShrinkToRemnant`]
    pub remnant: usize,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            n: DEFAULT_N,
            trials: DEFAULT_TRIALS,
            seed: DEFAULT_SEED,
            remnant: DEFAULT_REMNANT,
        }
    }
}

/// The scripted workloads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Experiment {
    /// Insert all keys, decrease keys `1..=1000` by one, delete the minimum
    InsertThenDeleteMin,
    /// Insert all keys, delete the minimum, decrease the largest keys to zero
    /// and delete minimums until only the remnant is left
    ShrinkToRemnant,
    /// Insert all keys, delete the minimum, decrease the largest tenth of the
    /// keys to zero, delete the minimum again
    DecreaseLargest,
}

impl Experiment {
    /// All workloads, in report order
    pub const ALL: [Experiment; 3] = [
        Experiment::InsertThenDeleteMin,
        Experiment::ShrinkToRemnant,
        Experiment::DecreaseLargest,
    ];

    /// One-based experiment number used in reports and on the command line
    pub fn number(self) -> usize {
        match self {
            Experiment::InsertThenDeleteMin => 1,
            Experiment::ShrinkToRemnant => 2,
            Experiment::DecreaseLargest => 3,
        }
    }

    /// Looks an experiment up by its number
    pub fn from_number(number: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.number() == number)
    }
}

impl fmt::Display for Experiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self {
            Experiment::InsertThenDeleteMin => "Insert Random + Delete Min",
            Experiment::ShrinkToRemnant => "Insert + Delete Min + Delete Max",
            Experiment::DecreaseLargest => "Insert + Delete Min + Decrease Max + Delete Min",
        };
        write!(f, "EXPERIMENT {}: {title}", self.number())
    }
}

/// Shuffled keys `1..=n`
pub fn random_permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Key> {
    let mut keys: Vec<Key> = (1..=n as Key).collect();
    keys.shuffle(rng);
    keys
}

/// Tracks the most expensive single operation on a heap
#[derive(Debug, Clone, Default)]
pub struct OperationMeter {
    max_cost: u64,
}

impl OperationMeter {
    /// Creates a meter that has seen no operations
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `op` on `heap` and records its cost
    pub fn measure<T, R>(&mut self, heap: &mut ForestHeap<T>, op: impl FnOnce(&mut ForestHeap<T>) -> R) -> R {
        let before = heap.counters();
        let result = op(heap);
        self.max_cost = self.max_cost.max(heap.counters().cost_since(&before));
        result
    }

    /// The largest cost recorded so far
    pub fn max_cost(&self) -> u64 {
        self.max_cost
    }
}

/// Outcome of a single trial
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialResult {
    /// Wall-clock time of the whole workload
    pub runtime: Duration,
    /// Counters at the end of the workload
    pub counters: Counters,
    /// Cost of the most expensive single operation
    pub max_operation_cost: u64,
    /// Trees left in the forest
    pub num_trees: usize,
    /// Elements left in the heap
    pub size: usize,
}

/// Runs one workload on one heap kind
///
/// `perm` must be a permutation of `1..=perm.len()`.
pub fn run_trial(
    experiment: Experiment,
    kind: HeapKind,
    perm: &[Key],
    remnant: usize,
) -> Result<TrialResult, HeapError> {
    let n = perm.len();
    let start = Instant::now();

    let mut heap: ForestHeap<Key> = ForestHeap::of_kind(kind);
    let mut meter = OperationMeter::new();

    // handles[k] is the element inserted with key k
    let mut handles: Vec<Option<NodeHandle>> = vec![None; n + 1];
    for &key in perm {
        let handle = meter.measure(&mut heap, |h| h.insert(key, key));
        handles[key as usize] = Some(handle);
    }

    match experiment {
        Experiment::InsertThenDeleteMin => {
            for handle in handles.iter().skip(1).take(SMALL_KEY_DECREASES).flatten() {
                meter.measure(&mut heap, |h| h.decrease_key(handle, 1))?;
            }
            meter.measure(&mut heap, |h| h.delete_min());
        }
        Experiment::ShrinkToRemnant => {
            meter.measure(&mut heap, |h| h.delete_min());
            let decreases = n.saturating_sub(1 + remnant);
            for handle in handles.iter().skip(2).rev().take(decreases).flatten() {
                decrease_to_zero(&mut heap, &mut meter, handle)?;
            }
            while heap.size() > remnant {
                meter.measure(&mut heap, |h| h.delete_min());
            }
        }
        Experiment::DecreaseLargest => {
            meter.measure(&mut heap, |h| h.delete_min());
            let decreases = n.div_ceil(10);
            for handle in handles.iter().skip(2).rev().take(decreases).flatten() {
                decrease_to_zero(&mut heap, &mut meter, handle)?;
            }
            meter.measure(&mut heap, |h| h.delete_min());
        }
    }

    let result = TrialResult {
        runtime: start.elapsed(),
        counters: heap.counters(),
        max_operation_cost: meter.max_cost(),
        num_trees: heap.num_trees(),
        size: heap.size(),
    };
    debug!("{experiment} on {kind}: {result:?}");
    Ok(result)
}

fn decrease_to_zero(
    heap: &mut ForestHeap<Key>,
    meter: &mut OperationMeter,
    handle: &NodeHandle,
) -> Result<(), HeapError> {
    let key = heap.key_of(handle).ok_or(HeapError::InvalidHandle)?;
    meter.measure(heap, |h| h.decrease_key(handle, key))
}

/// `total / count` for any trial count, `Duration::ZERO` when `count` is 0
fn mean_duration(total: Duration, count: usize) -> Duration {
    if count == 0 {
        return Duration::ZERO;
    }
    total.div_f64(count as f64)
}

/// Averages over the trials of one workload on one heap kind
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// The workload
    pub experiment: Experiment,
    /// The heap kind
    pub kind: HeapKind,
    /// Number of trials averaged
    pub trials: usize,
    /// Mean wall-clock time per trial
    pub mean_runtime: Duration,
    /// Mean total links
    pub mean_links: f64,
    /// Mean total cuts
    pub mean_cuts: f64,
    /// Mean total sift-up exchanges
    pub mean_heapify_costs: f64,
    /// Mean of the per-trial most expensive operation
    pub mean_max_operation_cost: f64,
    /// Trees left after the last trial
    pub final_trees: usize,
    /// Elements left after the last trial
    pub final_size: usize,
}

/// Runs `config.trials` trials of `experiment` on `kind` over `perm`
///
/// At least one trial is always run.
pub fn run_experiment(
    experiment: Experiment,
    kind: HeapKind,
    perm: &[Key],
    config: &ExperimentConfig,
) -> Result<Summary, HeapError> {
    let trials = config.trials.max(1);
    let mut runtime = Duration::ZERO;
    let mut totals = Counters::default();
    let mut max_costs = 0u64;
    let mut last = None;

    for trial in 0..trials {
        let result = run_trial(experiment, kind, perm, config.remnant)?;
        debug!("trial {trial} of {experiment} on {kind} took {:?}", result.runtime);
        runtime += result.runtime;
        totals = totals + result.counters;
        max_costs += result.max_operation_cost;
        last = Some(result);
    }

    let (final_trees, final_size) = last.map_or((0, 0), |r| (r.num_trees, r.size));
    let mean = |total: u64| total as f64 / trials as f64;

    Ok(Summary {
        experiment,
        kind,
        trials,
        mean_runtime: mean_duration(runtime, trials),
        mean_links: mean(totals.links),
        mean_cuts: mean(totals.cuts),
        mean_heapify_costs: mean(totals.heapify_cost),
        mean_max_operation_cost: mean(max_costs),
        final_trees,
        final_size,
    })
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.kind)?;
        writeln!(
            f,
            "  Average Runtime: {:.2} ms",
            self.mean_runtime.as_secs_f64() * 1000.0
        )?;
        writeln!(f, "  Average Total Links: {:.0}", self.mean_links)?;
        writeln!(f, "  Average Total Cuts: {:.0}", self.mean_cuts)?;
        writeln!(f, "  Average Heapify Costs: {:.0}", self.mean_heapify_costs)?;
        writeln!(
            f,
            "  Average Max Operation Cost: {:.0}",
            self.mean_max_operation_cost
        )?;
        writeln!(f, "  Number of Trees: {}", self.final_trees)?;
        write!(f, "  Heap Size: {}", self.final_size)
    }
}
