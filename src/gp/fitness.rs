//! Dual-objective fitness evaluation.
//!
//! Each tree is scored as `(error, complexity)`: the weighted error of its
//! predictions against the target, and its node count. Evaluation is a
//! pure function of the tree and the shared, read-only dataset, so it can
//! run in parallel; results are collected in population order.
//!
//! A non-finite error (from overflow inside an unprotected operator) is
//! clamped to `f64::MAX`. Ranking therefore never sees NaN.

use super::functions::FunctionSet;
use super::tree::ExpressionTree;
use super::types::{Fitness, Individual};
use crate::data::Dataset;
use log::trace;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Error metric, computed as a weighted average over samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Mean squared error.
    #[default]
    Mse,
    /// Mean absolute error.
    Mae,
}

impl Metric {
    /// Computes the weighted metric.
    ///
    /// Slices must have equal length and `weights` a positive sum.
    pub fn compute(&self, target: &[f64], predicted: &[f64], weights: &[f64]) -> f64 {
        debug_assert_eq!(target.len(), predicted.len());
        debug_assert_eq!(target.len(), weights.len());
        let total_weight: f64 = weights.iter().sum();
        let loss = |y: f64, p: f64| match self {
            Metric::Mse => (y - p) * (y - p),
            Metric::Mae => (y - p).abs(),
        };
        let weighted: f64 = target
            .iter()
            .zip(predicted)
            .zip(weights)
            .map(|((&y, &p), &w)| w * loss(y, p))
            .sum();
        weighted / total_weight
    }

    /// Short name used in logs and on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Mse => "mse",
            Metric::Mae => "mae",
        }
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mse" | "mean squared error" => Ok(Metric::Mse),
            "mae" | "mean absolute error" => Ok(Metric::Mae),
            other => Err(format!("unknown metric `{other}`")),
        }
    }
}

/// Scores trees against a dataset.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    dataset: &'a Dataset,
    functions: &'a FunctionSet,
    metric: Metric,
    parallel: bool,
}

impl<'a> Evaluator<'a> {
    /// Creates a sequential evaluator.
    pub fn new(dataset: &'a Dataset, functions: &'a FunctionSet, metric: Metric) -> Self {
        Self {
            dataset,
            functions,
            metric,
            parallel: false,
        }
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Predictions of `tree` for every row.
    pub fn predict(&self, tree: &ExpressionTree) -> Vec<f64> {
        self.dataset
            .rows()
            .map(|row| tree.evaluate(row, self.functions))
            .collect()
    }

    /// The objective pair of `tree`.
    pub fn score(&self, tree: &ExpressionTree) -> Fitness {
        let predicted = self.predict(tree);
        let error = self
            .metric
            .compute(self.dataset.target(), &predicted, self.dataset.weights());
        let error = if error.is_finite() { error } else { f64::MAX };
        Fitness::new(error, tree.node_count())
    }

    /// Scores a batch and attaches the results.
    ///
    /// Returns the number of evaluations performed.
    pub fn evaluate(&self, individuals: &mut [Individual]) -> usize {
        let scores = self.score_all(individuals);
        for (ind, fitness) in individuals.iter_mut().zip(scores) {
            ind.fitness = fitness;
            if log::log_enabled!(log::Level::Trace) {
                trace!(
                    "Individual: \"{}\", complexity: {}, error: {:.4}",
                    ind.tree.display(self.functions, Some(self.dataset.feature_names())),
                    fitness.complexity,
                    fitness.error
                );
            }
        }
        individuals.len()
    }

    #[cfg(feature = "parallel")]
    fn score_all(&self, individuals: &[Individual]) -> Vec<Fitness> {
        if self.parallel {
            individuals.par_iter().map(|ind| self.score(&ind.tree)).collect()
        } else {
            individuals.iter().map(|ind| self.score(&ind.tree)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn score_all(&self, individuals: &[Individual]) -> Vec<Fitness> {
        individuals.iter().map(|ind| self.score(&ind.tree)).collect()
    }
}
