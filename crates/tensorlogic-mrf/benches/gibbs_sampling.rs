//! Benchmarks for Gibbs sampling and structural queries
//!
//! This benchmark suite measures:
//! - Full Gibbs runs on chains and grids of increasing size
//! - Evidence reduction
//! - Graph separation queries

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use scirs2_core::random::{SeedableRng, StdRng};
use std::hint::black_box;
use tensorlogic_mrf::{gibbs_sample, Assignment, DenseFactor, GibbsSamplerConfig, MarkovNetwork};

/// Pairwise factor preferring equal neighbors
fn attractive(a: &str, b: &str, card: usize) -> DenseFactor {
    let values: Vec<f64> = (0..card * card)
        .map(|i| if i / card == i % card { 2.0 } else { 1.0 })
        .collect();
    DenseFactor::from_shape_vec(format!("{}-{}", a, b), &[a, b], &[card, card], values).unwrap()
}

/// Create a chain X_0 - X_1 - ... - X_{n-1}
fn create_chain(length: usize, card: usize) -> MarkovNetwork {
    let names: Vec<String> = (0..length).map(|i| format!("X_{}", i)).collect();
    let factors = names
        .windows(2)
        .map(|pair| attractive(&pair[0], &pair[1], card))
        .collect();
    MarkovNetwork::new(factors).unwrap()
}

/// Create a side x side grid
fn create_grid(side: usize) -> MarkovNetwork {
    let name = |r: usize, c: usize| format!("G_{}_{}", r, c);
    let mut factors = Vec::new();
    for r in 0..side {
        for c in 0..side {
            if c + 1 < side {
                factors.push(attractive(&name(r, c), &name(r, c + 1), 2));
            }
            if r + 1 < side {
                factors.push(attractive(&name(r, c), &name(r + 1, c), 2));
            }
        }
    }
    MarkovNetwork::new(factors).unwrap()
}

fn bench_gibbs_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("gibbs_chain");
    let config = GibbsSamplerConfig::new().with_burn_in(10);

    for length in [5, 20, 50] {
        let network = create_chain(length, 3);
        group.throughput(Throughput::Elements(100 * length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &network, |b, network| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(0);
                black_box(gibbs_sample(network, 100, &config, &mut rng).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_gibbs_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("gibbs_grid");
    let config = GibbsSamplerConfig::new()
        .with_burn_in(10)
        .with_thinning(1)
        .with_observation("G_0_0", 1);

    for side in [3, 6] {
        let network = create_grid(side);
        group.bench_with_input(BenchmarkId::from_parameter(side), &network, |b, network| {
            b.iter(|| {
                let mut rng = StdRng::seed_from_u64(0);
                black_box(gibbs_sample(network, 50, &config, &mut rng).unwrap());
            });
        });
    }

    group.finish();
}

fn bench_reduction(c: &mut Criterion) {
    let network = create_chain(50, 3);
    let evidence: Assignment = (0..50)
        .step_by(5)
        .map(|i| (format!("X_{}", i), 1))
        .collect();

    c.bench_function("reduce_chain_50", |b| {
        b.iter(|| black_box(network.reduce(&evidence).unwrap()));
    });
}

fn bench_separation(c: &mut Criterion) {
    let network = create_grid(8);

    c.bench_function("separation_grid_8", |b| {
        b.iter(|| {
            black_box(
                network
                    .is_independent(&["G_0_0"], &["G_7_7"], &["G_3_3", "G_4_4"])
                    .unwrap(),
            )
        });
    });
}

criterion_group!(
    benches,
    bench_gibbs_chain,
    bench_gibbs_grid,
    bench_reduction,
    bench_separation
);
criterion_main!(benches);
