//! Individuals and their objective pair.

use super::tree::ExpressionTree;

/// The two objectives of an individual. Both are minimized.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fitness {
    /// Prediction error under the configured metric.
    pub error: f64,
    /// Node count of the tree.
    pub complexity: usize,
}

impl Fitness {
    /// Creates a fitness pair.
    pub fn new(error: f64, complexity: usize) -> Self {
        Self { error, complexity }
    }

    /// The placeholder carried by unevaluated individuals.
    pub fn worst() -> Self {
        Self {
            error: f64::INFINITY,
            complexity: usize::MAX,
        }
    }

    /// Objectives as a vector for the Pareto utilities.
    pub fn objectives(&self) -> [f64; 2] {
        [self.error, self.complexity as f64]
    }

    /// Whether `self` dominates `other`: no worse on both objectives and
    /// strictly better on at least one.
    pub fn dominates(&self, other: &Fitness) -> bool {
        self.error <= other.error
            && self.complexity <= other.complexity
            && (self.error < other.error || self.complexity < other.complexity)
    }
}

/// A candidate formula with its objectives and NSGA-II bookkeeping.
///
/// `rank` and `crowding` are meaningful only after the individual has
/// passed through a survival step.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Individual {
    /// The expression.
    pub tree: ExpressionTree,
    /// Objective pair, [`Fitness::worst`] until evaluated.
    pub fitness: Fitness,
    /// Pareto front index (0 = non-dominated).
    pub rank: usize,
    /// Crowding distance within its front.
    pub crowding: f64,
}

impl Individual {
    /// Wraps an unevaluated tree.
    pub fn new(tree: ExpressionTree) -> Self {
        Self {
            tree,
            fitness: Fitness::worst(),
            rank: usize::MAX,
            crowding: 0.0,
        }
    }

    /// Whether fitness has been attached.
    pub fn is_evaluated(&self) -> bool {
        self.fitness.complexity != usize::MAX
    }

    /// Crowded-comparison order: lower rank wins, then larger crowding
    /// distance, then lower error.
    pub fn beats(&self, other: &Individual) -> bool {
        if self.rank != other.rank {
            return self.rank < other.rank;
        }
        if self.crowding != other.crowding {
            return self.crowding > other.crowding;
        }
        self.fitness.error < other.fitness.error
    }
}
