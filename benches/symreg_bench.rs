//! Criterion benchmarks for u-symreg.
//!
//! Synthetic data only: tree evaluation over a dataset, NSGA-II sorting of
//! random objective pairs, and short end-to-end runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::Rng;
use u_symreg::data::Dataset;
use u_symreg::gp::init::initialize_population;
use u_symreg::gp::multi_objective::non_dominated_sort;
use u_symreg::gp::{Evaluator, FunctionSet, Metric, SrConfig, SrRunner, TreeSpace};
use u_symreg::random::create_rng;

// ===========================================================================
// Synthetic data: y = x0^2 - x1 + 0.5 * x2
// ===========================================================================

fn dataset(n_samples: usize) -> Dataset {
    let mut rng = create_rng(7);
    let rows: Vec<Vec<f64>> = (0..n_samples)
        .map(|_| (0..3).map(|_| rng.random_range(-1.0..1.0)).collect())
        .collect();
    let target = rows
        .iter()
        .map(|r| r[0] * r[0] - r[1] + 0.5 * r[2])
        .collect();
    Dataset::new(rows, target).expect("synthetic dataset is well formed")
}

// ===========================================================================
// Benchmarks
// ===========================================================================

fn bench_evaluation(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluation");
    group.sample_size(20);

    let functions = FunctionSet::from_names(&["add", "sub", "mul", "div", "sin", "cos"])
        .expect("built-in names");
    let space = TreeSpace::new(functions.clone(), 3);
    let mut rng = create_rng(42);
    let population = initialize_population(&space, 200, &mut rng).expect("buildable space");

    for &n in &[100usize, 1000] {
        let data = dataset(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            let evaluator = Evaluator::new(data, &functions, Metric::Mse);
            b.iter(|| {
                let mut batch = population.clone();
                black_box(evaluator.evaluate(black_box(&mut batch)))
            })
        });
    }
    group.finish();
}

fn bench_non_dominated_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_dominated_sort");

    for &n in &[200usize, 1000, 2000] {
        let mut rng = create_rng(42);
        let objectives: Vec<[f64; 2]> = (0..n)
            .map(|_| [rng.random_range(0.0..10.0), rng.random_range(1..60) as f64])
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(n), &objectives, |b, objs| {
            b.iter(|| black_box(non_dominated_sort(black_box(objs.as_slice()))))
        });
    }
    group.finish();
}

fn bench_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("run");
    group.sample_size(10);

    let data = dataset(100);
    for (pop, gen) in [(100usize, 10usize), (500, 5)] {
        let config = SrConfig::default()
            .with_population_size(pop)
            .with_max_generations(gen)
            .with_seed(42);
        group.bench_with_input(
            BenchmarkId::new(format!("p{}_g{}", pop, gen), pop),
            &config,
            |b, config| {
                b.iter(|| {
                    let result = SrRunner::run(black_box(&data), black_box(config));
                    black_box(result)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_evaluation, bench_non_dominated_sort, bench_run);
criterion_main!(benches);
