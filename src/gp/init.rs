//! Random tree construction and population initialization.
//!
//! # Construction
//!
//! A tree is built top-down in preorder. A maximum depth `d` is drawn
//! uniformly from `init_depth`; the root is a function whenever `d > 0`.
//! Below the root, a node at depth `< d` is a function when the method is
//! `Full`, or (under `Grow`) when a uniform draw over
//! `functions + terminals` lands on a function. Otherwise it is a
//! terminal. Children are built left to right, so the draw order is
//! fixed and a seeded generator reproduces the same tree.
//!
//! # Initialization
//!
//! [`generate_tree`] retries construction until the tree passes
//! validation, giving up after `max_build_attempts`. Running out means
//! the function/terminal sets cannot produce a valid tree at all, which
//! is a configuration error.

use super::space::{InitMethod, TreeSpace};
use super::tree::{ExpressionTree, Node};
use super::types::Individual;
use crate::error::{Result, SrError};
use rand::Rng;

/// Builds one random tree without validating it.
///
/// Draw order: method (only for `HalfAndHalf`), maximum depth, then the
/// nodes in preorder.
pub fn build_tree<R: Rng>(space: &TreeSpace, rng: &mut R) -> ExpressionTree {
    let method = match space.init_method {
        InitMethod::HalfAndHalf => {
            if rng.random_bool(0.5) {
                InitMethod::Full
            } else {
                InitMethod::Grow
            }
        }
        method => method,
    };
    let (lo, hi) = space.init_depth;
    let max_depth = rng.random_range(lo..=hi);
    ExpressionTree::new(build_node(space, method, 0, max_depth, rng))
}

fn build_node<R: Rng>(
    space: &TreeSpace,
    method: InitMethod,
    depth: usize,
    max_depth: usize,
    rng: &mut R,
) -> Node {
    let n_functions = space.functions.len();
    let n_terminals = space.n_terminals();
    let is_function = if depth >= max_depth || n_functions == 0 {
        false
    } else if depth == 0 || n_terminals == 0 || method == InitMethod::Full {
        true
    } else {
        rng.random_range(0..n_functions + n_terminals) < n_functions
    };

    if !is_function {
        return space.random_terminal(rng);
    }

    let id = rng.random_range(0..n_functions);
    let arity = space.functions.get(id).map_or(0, |p| p.arity);
    let children = (0..arity)
        .map(|_| build_node(space, method, depth + 1, max_depth, rng))
        .collect();
    Node::Function {
        id,
        arity,
        children,
    }
}

/// Builds a tree that passes validation, retrying up to
/// `space.max_build_attempts` times.
pub fn generate_tree<R: Rng>(space: &TreeSpace, rng: &mut R) -> Result<ExpressionTree> {
    for _ in 0..space.max_build_attempts {
        let tree = build_tree(space, rng);
        if tree.is_valid(space) {
            return Ok(tree);
        }
    }
    Err(SrError::InitializationExhausted {
        attempts: space.max_build_attempts,
    })
}

/// Builds `size` unevaluated individuals, one tree at a time.
pub fn initialize_population<R: Rng>(
    space: &TreeSpace,
    size: usize,
    rng: &mut R,
) -> Result<Vec<Individual>> {
    (0..size)
        .map(|_| generate_tree(space, rng).map(Individual::new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::functions::FunctionSet;
    use crate::random::create_rng;

    fn space() -> TreeSpace {
        TreeSpace::new(
            FunctionSet::from_names(&["add", "sub", "mul", "sin"]).unwrap(),
            3,
        )
        .with_init_depth(2, 5)
        .with_depth_limits(0, 8)
    }

    #[test]
    fn test_full_trees_reach_drawn_depth() {
        let sp = space().with_init_method(InitMethod::Full).with_init_depth(3, 3);
        let mut rng = create_rng(42);
        for _ in 0..50 {
            let tree = build_tree(&sp, &mut rng);
            assert_eq!(tree.depth(), 3);
            assert!(tree.is_valid(&sp));
        }
    }

    #[test]
    fn test_grow_trees_respect_max_depth() {
        let sp = space().with_init_method(InitMethod::Grow);
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let tree = build_tree(&sp, &mut rng);
            assert!(tree.depth() >= 1, "root is always a function");
            assert!(tree.depth() <= 5);
            assert!(tree.is_valid(&sp));
        }
    }

    #[test]
    fn test_zero_depth_builds_terminal() {
        let sp = space().with_init_depth(0, 0);
        let mut rng = create_rng(3);
        let tree = build_tree(&sp, &mut rng);
        assert!(tree.root().is_terminal());
    }

    #[test]
    fn test_construction_is_reproducible() {
        let sp = space();
        let mut a = create_rng(99);
        let mut b = create_rng(99);
        for _ in 0..20 {
            assert_eq!(build_tree(&sp, &mut a), build_tree(&sp, &mut b));
        }
    }

    #[test]
    fn test_generate_tree_retries_until_valid() {
        // Grow trees are often shallower than 3; retries must filter them.
        let sp = space()
            .with_init_method(InitMethod::Grow)
            .with_init_depth(2, 5)
            .with_depth_limits(3, 5);
        let mut rng = create_rng(5);
        for _ in 0..30 {
            let tree = generate_tree(&sp, &mut rng).unwrap();
            assert!(tree.depth() >= 3);
        }
    }

    #[test]
    fn test_generate_tree_exhaustion_is_fatal() {
        // Trees are built to depth <= 2 but must have depth >= 4.
        let sp = space()
            .with_init_depth(1, 2)
            .with_depth_limits(4, 6)
            .with_max_build_attempts(25);
        let mut rng = create_rng(5);
        assert!(matches!(
            generate_tree(&sp, &mut rng),
            Err(SrError::InitializationExhausted { attempts: 25 })
        ));
    }

    #[test]
    fn test_initialize_population_size_and_fitness() {
        let sp = space();
        let mut rng = create_rng(11);
        let pop = initialize_population(&sp, 40, &mut rng).unwrap();
        assert_eq!(pop.len(), 40);
        assert!(pop.iter().all(|ind| !ind.is_evaluated()));
        assert!(pop.iter().all(|ind| ind.tree.is_valid(&sp)));
    }
}
