//! Parent selection.
//!
//! Tournament selection under the NSGA-II crowded-comparison order: each
//! draw samples `k` distinct individuals and keeps the one that
//! [`beats`](super::types::Individual::beats) the others. Draws are
//! independent, so the same individual may be selected many times.
//!
//! # References
//!
//! - Blickle & Thiele (1996), "A Comparison of Selection Schemes used in
//!   Evolutionary Algorithms"
//! - Deb et al. (2002), crowded-comparison operator

use super::types::Individual;
use rand::seq::index::sample;
use rand::Rng;

/// Tournament selection with a fixed tournament size.
///
/// # Examples
///
/// ```
/// use u_symreg::gp::Tournament;
///
/// // Binary tournament: light selection pressure
/// let tournament = Tournament::new(2);
/// assert_eq!(tournament.size(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tournament {
    size: usize,
}

impl Default for Tournament {
    fn default() -> Self {
        Self::new(2)
    }
}

impl Tournament {
    /// Creates a tournament of `size` contestants (at least 1).
    pub fn new(size: usize) -> Self {
        Self { size: size.max(1) }
    }

    /// Contestants per tournament.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Selects one parent index.
    ///
    /// Contestants are distinct within a tournament; when the population
    /// is smaller than the tournament, everyone competes. Ties keep the
    /// first contestant drawn.
    ///
    /// # Panics
    /// Panics if `population` is empty.
    pub fn select<R: Rng>(&self, population: &[Individual], rng: &mut R) -> usize {
        assert!(
            !population.is_empty(),
            "cannot select from empty population"
        );
        let n = population.len();
        let k = self.size.min(n);

        let mut contestants = sample(rng, n, k).into_iter();
        let mut best = contestants.next().unwrap_or(0);
        for idx in contestants {
            if population[idx].beats(&population[best]) {
                best = idx;
            }
        }
        best
    }

    /// Selects `count` parent indices, in draw order.
    pub fn select_many<R: Rng>(
        &self,
        population: &[Individual],
        count: usize,
        rng: &mut R,
    ) -> Vec<usize> {
        (0..count).map(|_| self.select(population, rng)).collect()
    }
}
