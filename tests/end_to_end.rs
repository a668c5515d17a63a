//! End-to-end regression runs.

use u_symreg::data::Dataset;
use u_symreg::gp::{SrConfig, SrResult, SrRunner};

/// y = 2 * x0 + 1 on 50 evenly spaced points in [-1, 1].
fn linear_dataset() -> Dataset {
    let rows: Vec<Vec<f64>> = (0..50).map(|i| vec![-1.0 + 2.0 * i as f64 / 49.0]).collect();
    let target = rows.iter().map(|r| 2.0 * r[0] + 1.0).collect();
    Dataset::new(rows, target).unwrap()
}

fn linear_config(seed: u64) -> SrConfig {
    SrConfig::default()
        .with_population_size(200)
        .with_max_generations(20)
        .with_functions(&["add", "sub", "mul"])
        .with_const_range(Some((-1.0, 1.0)))
        .with_seed(seed)
}

fn best_error(result: &SrResult) -> f64 {
    result
        .pareto_front
        .iter()
        .map(|ind| ind.fitness.error)
        .fold(f64::INFINITY, f64::min)
}

#[test]
fn test_recovers_linear_formula() {
    let data = linear_dataset();
    let result = SrRunner::run(&data, &linear_config(42)).unwrap();
    let front = &result.pareto_front;

    assert_eq!(result.generations, 20);
    assert!(!front.is_empty());
    for a in front {
        for b in front {
            assert!(
                !a.fitness.dominates(&b.fitness),
                "front member {} dominates {}",
                result.render(a),
                result.render(b)
            );
        }
    }

    let error = best_error(&result);
    assert!(error < 1e-6, "best front error {error:e}");
}

#[test]
fn test_population_stays_diverse() {
    let data = linear_dataset();
    let result = SrRunner::run(&data, &linear_config(42)).unwrap();

    let mut pairs: Vec<(u64, usize)> = result
        .population
        .iter()
        .map(|ind| (ind.fitness.error.to_bits(), ind.fitness.complexity))
        .collect();
    pairs.sort_unstable();
    pairs.dedup();
    // Repeats only survive once distinct pairs run out.
    assert!(pairs.len() > 20, "only {} distinct objective pairs", pairs.len());

    let front_pairs: Vec<(u64, usize)> = result
        .pareto_front
        .iter()
        .map(|ind| (ind.fitness.error.to_bits(), ind.fitness.complexity))
        .collect();
    let mut deduped = front_pairs.clone();
    deduped.dedup();
    assert_eq!(front_pairs, deduped);
}

#[test]
fn test_front_spans_tradeoff() {
    let data = linear_dataset();
    let result = SrRunner::run(&data, &linear_config(42)).unwrap();
    let front = &result.pareto_front;

    // Sorted by complexity; along the front, error never gets worse.
    for w in front.windows(2) {
        assert!(w[0].fitness.complexity <= w[1].fitness.complexity);
        assert!(w[0].fitness.error >= w[1].fitness.error);
        if w[0].fitness.complexity == w[1].fitness.complexity {
            assert_eq!(w[0].fitness.error, w[1].fitness.error);
        }
    }
    assert!(front.iter().all(|ind| ind.rank == 0));
}

#[test]
fn test_identical_seeds_identical_runs() {
    let data = linear_dataset();
    let config = linear_config(5).with_max_generations(15);
    let a = SrRunner::run(&data, &config).unwrap();
    let b = SrRunner::run(&data, &config).unwrap();

    assert_eq!(a.history, b.history);
    assert_eq!(a.evaluations, b.evaluations);
    assert_eq!(a.population.len(), b.population.len());
    for (x, y) in a.population.iter().zip(&b.population) {
        assert_eq!(x.tree, y.tree);
        assert_eq!(x.fitness, y.fitness);
        assert_eq!(x.rank, y.rank);
    }
}

#[test]
fn test_different_seeds_differ() {
    let data = linear_dataset();
    let a = SrRunner::run(&data, &linear_config(1).with_max_generations(3)).unwrap();
    let b = SrRunner::run(&data, &linear_config(2).with_max_generations(3)).unwrap();
    let trees_a: Vec<_> = a.population.iter().map(|i| &i.tree).collect();
    let trees_b: Vec<_> = b.population.iter().map(|i| &i.tree).collect();
    assert_ne!(trees_a, trees_b);
}

#[test]
fn test_csv_to_front() {
    let mut text = String::from("x,noise,y\n");
    for i in 0..30 {
        let x = i as f64 / 10.0;
        text.push_str(&format!("{x},{},{}\n", (i % 3) as f64, x * x));
    }
    let data = Dataset::from_csv_reader(std::io::Cursor::new(text), "y").unwrap();
    assert_eq!(data.feature_names(), &["x".to_string(), "noise".to_string()]);

    let config = SrConfig::default()
        .with_population_size(100)
        .with_max_generations(10)
        .with_seed(3);
    let result = SrRunner::run(&data, &config).unwrap();
    assert_eq!(result.feature_names, data.feature_names());
    for champion in result.front_champions() {
        assert!(!champion.expression.contains("X0"));
        assert!(champion.error.is_finite());
    }
}
