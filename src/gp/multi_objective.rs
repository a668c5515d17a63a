//! Pareto utilities for NSGA-II survival.
//!
//! # Algorithms
//!
//! - [`non_dominated_sort`]: Fast non-dominated sorting (Deb et al., 2002)
//! - [`crowding_distance`]: Crowding distance assignment for diversity preservation
//! - [`survive`]: Front-by-front truncation of a parent+offspring pool,
//!   with repeated objective pairs demoted behind unique ones
//!
//! All objectives are **minimized**.
//!
//! # References
//!
//! - Deb et al. (2002), "A Fast and Elitist Multiobjective Genetic Algorithm: NSGA-II"
//! - IEEE Transactions on Evolutionary Computation, 6(2), 182-197

use super::types::Individual;
use std::cmp::Ordering;
use std::collections::HashSet;

/// Result of non-dominated sorting.
///
/// Each element of `ranks` corresponds to the Pareto rank of the solution
/// at the same index. Rank 0 is the Pareto front (non-dominated solutions).
#[derive(Debug, Clone)]
pub struct NondominatedSortResult {
    /// Pareto rank for each solution (0 = front).
    pub ranks: Vec<usize>,

    /// Indices grouped by front: `fronts[0]` contains rank-0 indices, etc.
    ///
    /// Indices within each front are ascending.
    pub fronts: Vec<Vec<usize>>,
}

/// Fast non-dominated sorting.
///
/// Assigns a Pareto rank to each solution based on dominance relationships.
///
/// # Algorithm (Deb et al., 2002)
///
/// 1. For each pair of solutions, determine dominance
/// 2. Solutions dominated by no other belong to front 0 (rank 0)
/// 3. Remove front 0, repeat to find subsequent fronts
///
/// # Complexity
///
/// O(m * n²) where m = number of objectives, n = number of solutions
///
/// # Arguments
///
/// - `objectives`: One objective vector per solution. All vectors must
///   have the same length.
///
/// # Example
///
/// ```
/// use u_symreg::gp::multi_objective::non_dominated_sort;
///
/// let objectives = vec![
///     [1.0, 5.0],  // Solution A
///     [3.0, 3.0],  // Solution B
///     [5.0, 1.0],  // Solution C
///     [4.0, 4.0],  // Solution D, dominated by B
/// ];
///
/// let result = non_dominated_sort(&objectives);
///
/// assert_eq!(result.ranks, vec![0, 0, 0, 1]);
/// assert_eq!(result.fronts, vec![vec![0, 1, 2], vec![3]]);
/// ```
pub fn non_dominated_sort<O: AsRef<[f64]>>(objectives: &[O]) -> NondominatedSortResult {
    let n = objectives.len();
    if n == 0 {
        return NondominatedSortResult {
            ranks: Vec::new(),
            fronts: Vec::new(),
        };
    }

    let mut domination_count = vec![0usize; n];
    let mut dominated_by: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut ranks = vec![0usize; n];
    let mut front_0 = Vec::new();

    for i in 0..n {
        for j in (i + 1)..n {
            match dominance_cmp(objectives[i].as_ref(), objectives[j].as_ref()) {
                Dominance::Left => {
                    dominated_by[i].push(j);
                    domination_count[j] += 1;
                }
                Dominance::Right => {
                    dominated_by[j].push(i);
                    domination_count[i] += 1;
                }
                Dominance::Neither => {}
            }
        }

        if domination_count[i] == 0 {
            front_0.push(i);
        }
    }

    let mut fronts = vec![front_0];
    loop {
        let Some(current) = fronts.last() else { break };
        let mut next_front = Vec::new();

        for &i in current {
            for &j in &dominated_by[i] {
                domination_count[j] -= 1;
                if domination_count[j] == 0 {
                    ranks[j] = fronts.len();
                    next_front.push(j);
                }
            }
        }

        if next_front.is_empty() {
            break;
        }
        // Discovery order depends on traversal; insertion order is the tie-break.
        next_front.sort_unstable();
        fronts.push(next_front);
    }

    NondominatedSortResult { ranks, fronts }
}

/// Dominance comparison result.
#[derive(Debug, PartialEq)]
enum Dominance {
    /// Left dominates right.
    Left,
    /// Right dominates left.
    Right,
    /// Neither dominates the other.
    Neither,
}

/// Compare two solutions for Pareto dominance (minimization).
fn dominance_cmp(a: &[f64], b: &[f64]) -> Dominance {
    let mut a_better_in_some = false;
    let mut b_better_in_some = false;

    for (&va, &vb) in a.iter().zip(b.iter()) {
        if va < vb {
            a_better_in_some = true;
        } else if vb < va {
            b_better_in_some = true;
        }
    }

    match (a_better_in_some, b_better_in_some) {
        (true, false) => Dominance::Left,
        (false, true) => Dominance::Right,
        _ => Dominance::Neither,
    }
}

/// Whether `a` dominates `b` (minimization).
pub fn dominates(a: &[f64], b: &[f64]) -> bool {
    dominance_cmp(a, b) == Dominance::Left
}

/// Crowding distance assignment for diversity preservation.
///
/// Computes the crowding distance for each solution, measuring how
/// spread out the solutions are in objective space. Higher distance
/// means the solution is more isolated (more diverse).
///
/// Boundary solutions (min/max for any objective) receive `f64::INFINITY`.
/// An objective with zero range contributes nothing to interior solutions.
///
/// # Algorithm (Deb et al., 2002)
///
/// For each objective:
/// 1. Sort solutions by objective value (stable, so equal values keep
///    their input order)
/// 2. Assign infinity to boundary solutions
/// 3. For interior solutions, add normalized distance to neighbors
///
/// # Complexity
///
/// O(m * n * log n) where m = number of objectives, n = number of solutions
///
/// # Example
///
/// ```
/// use u_symreg::gp::multi_objective::crowding_distance;
///
/// let objectives = vec![[1.0, 5.0], [3.0, 3.0], [5.0, 1.0]];
///
/// let distances = crowding_distance(&objectives);
///
/// assert!(distances[0].is_infinite());
/// assert!(distances[2].is_infinite());
/// assert!((distances[1] - 2.0).abs() < 1e-12);
/// ```
pub fn crowding_distance<O: AsRef<[f64]>>(objectives: &[O]) -> Vec<f64> {
    let n = objectives.len();
    if n <= 2 {
        return vec![f64::INFINITY; n];
    }

    let m = objectives[0].as_ref().len();
    let mut distances = vec![0.0f64; n];
    let value = |i: usize, obj: usize| objectives[i].as_ref()[obj];

    for obj_idx in 0..m {
        let mut indices: Vec<usize> = (0..n).collect();
        indices.sort_by(|&a, &b| {
            value(a, obj_idx)
                .partial_cmp(&value(b, obj_idx))
                .unwrap_or(Ordering::Equal)
        });

        distances[indices[0]] = f64::INFINITY;
        distances[indices[n - 1]] = f64::INFINITY;

        let min_val = value(indices[0], obj_idx);
        let max_val = value(indices[n - 1], obj_idx);
        let range = max_val - min_val;

        if range > 0.0 {
            for i in 1..(n - 1) {
                let prev = value(indices[i - 1], obj_idx);
                let next = value(indices[i + 1], obj_idx);
                distances[indices[i]] += (next - prev) / range;
            }
        }
    }

    distances
}

/// NSGA-II survival: keeps `pop_size` individuals from `pool`.
///
/// Individuals whose objective pair repeats an earlier pool member are
/// set aside first; the first occurrence in pool order stays. Unique
/// individuals are ranked and accepted front by front, and only then are
/// the repeats ranked among themselves and appended as trailing fronts.
///
/// Whole fronts are accepted in rank order while they fit. The first
/// front that would overflow is sorted by descending crowding distance
/// (stable, so ties keep pool order) and cut to fill exactly `pop_size`.
/// Survivors come back in acceptance order with `rank` and `crowding`
/// set. A pool no larger than `pop_size` is kept whole (and ranked).
pub fn survive(pool: Vec<Individual>, pop_size: usize) -> Vec<Individual> {
    let objectives: Vec<[f64; 2]> = pool.iter().map(|ind| ind.fitness.objectives()).collect();
    let (unique, repeats) = split_repeats(&objectives);

    let mut slots: Vec<Option<Individual>> = pool.into_iter().map(Some).collect();
    let mut survivors = Vec::with_capacity(pop_size.min(slots.len()));
    let mut rank_offset = 0;

    for group in [unique, repeats] {
        if survivors.len() >= pop_size || group.is_empty() {
            break;
        }
        let group_objectives: Vec<[f64; 2]> = group.iter().map(|&i| objectives[i]).collect();
        let sorted = non_dominated_sort(&group_objectives);

        for (rank, front) in sorted.fronts.iter().enumerate() {
            let remaining = pop_size - survivors.len();
            if remaining == 0 {
                break;
            }

            let front_objectives: Vec<[f64; 2]> =
                front.iter().map(|&k| group_objectives[k]).collect();
            let distances = crowding_distance(&front_objectives);
            let mut members: Vec<(usize, f64)> =
                front.iter().map(|&k| group[k]).zip(distances).collect();

            if members.len() > remaining {
                members.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
                members.truncate(remaining);
            }

            for (idx, crowding) in members {
                if let Some(mut ind) = slots[idx].take() {
                    ind.rank = rank_offset + rank;
                    ind.crowding = crowding;
                    survivors.push(ind);
                }
            }
        }
        rank_offset += sorted.fronts.len();
    }

    survivors
}

/// Splits pool indices into first occurrences and repeats of an
/// objective pair, both in pool order.
fn split_repeats(objectives: &[[f64; 2]]) -> (Vec<usize>, Vec<usize>) {
    let mut seen = HashSet::with_capacity(objectives.len());
    let mut unique = Vec::with_capacity(objectives.len());
    let mut repeats = Vec::new();
    for (i, o) in objectives.iter().enumerate() {
        // +0.0 folds -0.0 into the same key.
        let key = ((o[0] + 0.0).to_bits(), (o[1] + 0.0).to_bits());
        if seen.insert(key) {
            unique.push(i);
        } else {
            repeats.push(i);
        }
    }
    (unique, repeats)
}

// ============================================================================
// Tests
// ============================================================================
