//! Runs the heap comparison experiments and prints a report per heap kind.
//!
//! ```bash
//! cargo run --release -- --experiment 1 --n 100000 --trials 5
//! RUST_LOG=debug cargo run -- --experiment 3 --n 1000 --heap fibonacci
//! ```

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use rust_policy_heaps::experiments::{
    random_permutation, run_experiment, Experiment, ExperimentConfig, DEFAULT_N, DEFAULT_REMNANT,
    DEFAULT_SEED, DEFAULT_TRIALS,
};
use rust_policy_heaps::HeapKind;

/// Heap kinds selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HeapArg {
    Binomial,
    LazyBinomial,
    Fibonacci,
    Cutoffs,
}

impl From<HeapArg> for HeapKind {
    fn from(arg: HeapArg) -> Self {
        match arg {
            HeapArg::Binomial => HeapKind::Binomial,
            HeapArg::LazyBinomial => HeapKind::LazyBinomial,
            HeapArg::Fibonacci => HeapKind::Fibonacci,
            HeapArg::Cutoffs => HeapKind::BinomialWithCutoffs,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Experiment to run (1, 2 or 3); all of them when omitted
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(1..=3))]
    experiment: Option<u8>,

    /// Number of keys inserted
    #[arg(short, long, env = "HEAP_EXPERIMENT_N", default_value_t = DEFAULT_N)]
    n: usize,

    /// Trials averaged per heap kind
    #[arg(short, long, env = "HEAP_EXPERIMENT_TRIALS", default_value_t = DEFAULT_TRIALS)]
    trials: usize,

    /// Seed for the key permutation
    #[arg(long, env = "HEAP_EXPERIMENT_SEED", default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Final heap size of experiment 2
    #[arg(long, default_value_t = DEFAULT_REMNANT)]
    remnant: usize,

    /// Heap kinds to compare; all four when omitted
    #[arg(long = "heap", value_enum)]
    heaps: Vec<HeapArg>,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = ExperimentConfig {
        n: args.n,
        trials: args.trials,
        seed: args.seed,
        remnant: args.remnant,
    };
    let experiments: Vec<Experiment> = match args.experiment {
        Some(number) => Experiment::from_number(number as usize).into_iter().collect(),
        None => Experiment::ALL.to_vec(),
    };
    let kinds: Vec<HeapKind> = if args.heaps.is_empty() {
        HeapKind::ALL.to_vec()
    } else {
        args.heaps.iter().copied().map(HeapKind::from).collect()
    };

    println!("==============================================");
    println!("HEAP EXPERIMENTS");
    println!("==============================================");

    for experiment in experiments {
        println!();
        println!("========================================");
        println!("{experiment}");
        println!("n = {}", config.n);
        println!("Number of trials: {}", config.trials);
        println!("========================================");
        println!();

        // One permutation per experiment, shared by every heap kind
        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let perm = random_permutation(config.n, &mut rng);

        for &kind in &kinds {
            match run_experiment(experiment, kind, &perm, &config) {
                Ok(summary) => println!("{summary}\n"),
                Err(e) => eprintln!("  ERROR: {kind}: {e}\n"),
            }
        }
    }
}
