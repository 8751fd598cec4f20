//! Policy Comparison Benchmarks
//!
//! Times the three comparison workloads on each heap kind, plus the raw
//! insert and decrease-key paths, over one seeded key permutation.
//!
//! ## Running
//!
//! ```bash
//! cargo bench --bench policy_bench
//! cargo bench --bench policy_bench -- decrease_largest
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_policy_heaps::experiments::{random_permutation, run_trial, Experiment, DEFAULT_REMNANT};
use rust_policy_heaps::{ForestHeap, HeapKind, Key};

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn permutation(n: usize) -> Vec<Key> {
    random_permutation(n, &mut ChaCha8Rng::seed_from_u64(0x5EED))
}

fn bench_workloads(c: &mut Criterion) {
    for experiment in Experiment::ALL {
        let mut group = c.benchmark_group(format!("experiment_{}", experiment.number()));
        group.sample_size(10);

        for n in SIZES {
            let perm = permutation(n);
            for kind in HeapKind::ALL {
                group.bench_with_input(BenchmarkId::new(format!("{kind:?}"), n), &perm, |b, perm| {
                    b.iter(|| run_trial(experiment, kind, black_box(perm), DEFAULT_REMNANT))
                });
            }
        }
        group.finish();
    }
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");
    let perm = permutation(10_000);

    for kind in HeapKind::ALL {
        group.bench_function(format!("{kind:?}"), |b| {
            b.iter(|| {
                let mut heap = ForestHeap::of_kind(kind);
                for &key in &perm {
                    heap.insert(black_box(key), ());
                }
                heap
            })
        });
    }
    group.finish();
}

fn bench_decrease_largest(c: &mut Criterion) {
    let mut group = c.benchmark_group("decrease_largest");
    let perm = permutation(10_000);

    for kind in HeapKind::ALL {
        group.bench_function(format!("{kind:?}"), |b| {
            b.iter_batched(
                || {
                    let mut heap = ForestHeap::of_kind(kind);
                    let mut handles: Vec<_> = perm.iter().map(|&k| (k, heap.insert(k, ()))).collect();
                    heap.delete_min();
                    handles.sort_unstable_by_key(|(k, _)| std::cmp::Reverse(*k));
                    handles.truncate(1_000);
                    (heap, handles)
                },
                |(mut heap, handles)| {
                    for (key, handle) in &handles {
                        let _ = heap.decrease_key(handle, *key);
                    }
                    heap.delete_min()
                },
                criterion::BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_workloads, bench_insert, bench_decrease_largest);
criterion_main!(benches);
