//! Per-generation reporting.
//!
//! After every survival step the runner summarizes the population into a
//! [`GenerationStats`] and hands it to an [`Observer`]. Observers only
//! read; nothing they do feeds back into the search.

use super::functions::FunctionSet;
use super::types::Individual;
use log::{debug, info};

/// A reported individual: its rendered formula and objectives.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Champion {
    /// Prefix rendering, e.g. `add(mul(X0, 2.000), X1)`.
    pub expression: String,
    /// Error objective.
    pub error: f64,
    /// Complexity objective.
    pub complexity: usize,
}

impl Champion {
    pub(crate) fn from_individual(
        ind: &Individual,
        functions: &FunctionSet,
        names: Option<&[String]>,
    ) -> Self {
        Self {
            expression: ind.tree.display(functions, names).to_string(),
            error: ind.fitness.error,
            complexity: ind.fitness.complexity,
        }
    }
}

/// Summary of one generation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Generation number; 0 is the initial population.
    pub generation: usize,
    /// Cumulative fitness evaluations so far.
    pub evaluations: usize,
    /// Valid offspring produced this generation (0 for generation 0).
    pub offspring: usize,
    /// Size of the first Pareto front of the survivors.
    pub front_size: usize,
    /// Lowest-error survivor.
    pub best_error: Champion,
    /// Lowest-complexity survivor, ties broken by lower error.
    pub best_complexity: Champion,
}

impl GenerationStats {
    /// Summarizes a ranked population.
    ///
    /// Returns `None` for an empty population.
    pub fn collect(
        generation: usize,
        evaluations: usize,
        offspring: usize,
        population: &[Individual],
        functions: &FunctionSet,
        feature_names: Option<&[String]>,
    ) -> Option<Self> {
        let best_error = population
            .iter()
            .min_by(|a, b| a.fitness.error.total_cmp(&b.fitness.error))?;
        let best_complexity = population.iter().min_by(|a, b| {
            a.fitness
                .complexity
                .cmp(&b.fitness.complexity)
                .then(a.fitness.error.total_cmp(&b.fitness.error))
        })?;
        Some(Self {
            generation,
            evaluations,
            offspring,
            front_size: population.iter().filter(|ind| ind.rank == 0).count(),
            best_error: Champion::from_individual(best_error, functions, feature_names),
            best_complexity: Champion::from_individual(best_complexity, functions, feature_names),
        })
    }
}

/// Receives a summary after every generation.
pub trait Observer {
    /// Called once for the initial population and once per generation.
    fn on_generation(&mut self, stats: &GenerationStats);
}

/// Logs each generation at `info` level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_generation(&mut self, stats: &GenerationStats) {
        info!(
            "Generation {}, evaluations={}",
            stats.generation, stats.evaluations
        );
        info!(
            "\t- Best fitting: \"{}\", complexity: {}, error: {:.4}",
            stats.best_error.expression, stats.best_error.complexity, stats.best_error.error
        );
        info!(
            "\t- Best complexity: \"{}\", complexity: {}, error: {:.4}",
            stats.best_complexity.expression,
            stats.best_complexity.complexity,
            stats.best_complexity.error
        );
        debug!(
            "Generation {}: {} offspring, first front of {}",
            stats.generation, stats.offspring, stats.front_size
        );
    }
}

impl<F: FnMut(&GenerationStats)> Observer for F {
    fn on_generation(&mut self, stats: &GenerationStats) {
        (*self)(stats)
    }
}
