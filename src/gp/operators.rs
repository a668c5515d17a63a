//! Tree-based genetic operators.
//!
//! Every operator is a pure function of its parents, the [`TreeSpace`]
//! and the random source. Parents are never modified; children are fresh
//! trees that may or may not be valid. [`Pipeline::vary`] composes the
//! operators under fixed probability bands and filters out invalid
//! children.
//!
//! # Operators
//!
//! - [`crossover`]: replace a random subtree of the recipient with a
//!   random subtree of the donor
//! - [`subtree_mutation`]: replace a random subtree with a freshly built one
//! - [`hoist_mutation`]: replace a random function subtree with one of its
//!   proper descendants (always shrinks the tree)
//! - [`point_mutation`]: per-node replacement by a same-arity function or a
//!   new terminal
//!
//! # References
//!
//! - Koza (1992), *Genetic Programming*
//! - Kinnear (1994), "Fitness Landscapes and Difficulty in Genetic Programming"
//!   (hoist mutation)
//! - Poli, Langdon & McPhee (2008), *A Field Guide to Genetic Programming*

use super::config::SrConfig;
use super::init::build_tree;
use super::space::TreeSpace;
use super::tree::{ExpressionTree, Node};
use log::trace;
use rand::Rng;

// ============================================================================
// Operators
// ============================================================================

/// Subtree crossover.
///
/// Picks a site uniformly over the recipient's nodes and a donor subtree
/// uniformly over the donor's nodes, and returns the recipient with the
/// site replaced.
///
/// Draw order: recipient site, then donor site.
pub fn crossover<R: Rng>(
    recipient: &ExpressionTree,
    donor: &ExpressionTree,
    rng: &mut R,
) -> ExpressionTree {
    let site = rng.random_range(0..recipient.node_count());
    let donor_site = rng.random_range(0..donor.node_count());
    donor
        .subtree(donor_site)
        .cloned()
        .and_then(|graft| recipient.with_subtree(site, graft))
        .unwrap_or_else(|| recipient.clone())
}

/// Subtree mutation.
///
/// Builds a new random tree with the initialization rules and grafts it
/// at a uniformly chosen site of `parent`.
///
/// Draw order: site, then the construction draws of the new tree.
pub fn subtree_mutation<R: Rng>(
    parent: &ExpressionTree,
    space: &TreeSpace,
    rng: &mut R,
) -> ExpressionTree {
    let site = rng.random_range(0..parent.node_count());
    let fresh = build_tree(space, rng).into_root();
    parent
        .with_subtree(site, fresh)
        .unwrap_or_else(|| parent.clone())
}

/// Hoist mutation.
///
/// Chooses a function node uniformly, then a node strictly below it, and
/// replaces the function node's subtree with that descendant. The child
/// always has fewer nodes than the parent. Returns `None` when the parent
/// is a single terminal.
///
/// Draw order: outer function node, then inner offset.
pub fn hoist_mutation<R: Rng>(parent: &ExpressionTree, rng: &mut R) -> Option<ExpressionTree> {
    let functions = parent.function_indices();
    if functions.is_empty() {
        return None;
    }
    let outer_index = functions[rng.random_range(0..functions.len())];
    let outer = parent.subtree(outer_index)?;
    let size = outer.node_count();
    if size < 2 {
        return None;
    }
    // Offset 0 would be the outer node itself.
    let offset = rng.random_range(1..size);
    let inner = outer.get(offset)?.clone();
    parent.with_subtree(outer_index, inner)
}

/// Point mutation.
///
/// Visits every node in preorder and, with probability `p_replace`,
/// replaces it: a function node gets another function of the same arity
/// (children kept), a terminal gets a fresh random terminal.
///
/// Draw order: per node one uniform draw, followed by the replacement
/// draws when it fires.
pub fn point_mutation<R: Rng>(
    parent: &ExpressionTree,
    space: &TreeSpace,
    p_replace: f64,
    rng: &mut R,
) -> ExpressionTree {
    let mut root = parent.root().clone();
    mutate_points(&mut root, space, p_replace, rng);
    ExpressionTree::new(root)
}

fn mutate_points<R: Rng>(node: &mut Node, space: &TreeSpace, p_replace: f64, rng: &mut R) {
    let replace = rng.random::<f64>() < p_replace;
    match node {
        Node::Function {
            id,
            arity,
            children,
        } => {
            if replace {
                let same_arity = space.functions.ids_with_arity(*arity);
                if !same_arity.is_empty() {
                    *id = same_arity[rng.random_range(0..same_arity.len())];
                }
            }
            for child in children.iter_mut() {
                mutate_points(child, space, p_replace, rng);
            }
        }
        _ => {
            if replace {
                *node = space.random_terminal(rng);
            }
        }
    }
}

// ============================================================================
// Pipeline
// ============================================================================

/// The variation operator applied to a mating pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// [`crossover`] in both directions.
    Crossover,
    /// [`subtree_mutation`] of each parent.
    SubtreeMutation,
    /// [`hoist_mutation`] of each parent.
    HoistMutation,
    /// [`point_mutation`] of each parent.
    PointMutation,
}

/// Operator probability bands for one run.
///
/// The bands partition `[0, 1)` in the order crossover, subtree mutation,
/// hoist mutation, point mutation. A single uniform draw picks the band;
/// a draw past the last band picks nothing and the pair yields no
/// offspring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pipeline {
    /// Crossover band width.
    pub p_crossover: f64,
    /// Subtree mutation band width.
    pub p_subtree_mutation: f64,
    /// Hoist mutation band width.
    pub p_hoist_mutation: f64,
    /// Point mutation band width.
    pub p_point_mutation: f64,
    /// Per-node replacement probability inside point mutation.
    pub p_point_replace: f64,
}

impl Pipeline {
    /// Takes the bands from a configuration.
    pub fn from_config(config: &SrConfig) -> Self {
        Self {
            p_crossover: config.p_crossover,
            p_subtree_mutation: config.p_subtree_mutation,
            p_hoist_mutation: config.p_hoist_mutation,
            p_point_mutation: config.p_point_mutation,
            p_point_replace: config.p_point_replace,
        }
    }

    /// Picks an operator with one uniform draw.
    pub fn choose<R: Rng>(&self, rng: &mut R) -> Option<Operator> {
        let u = rng.random::<f64>();
        let bands = [
            (self.p_crossover, Operator::Crossover),
            (self.p_subtree_mutation, Operator::SubtreeMutation),
            (self.p_hoist_mutation, Operator::HoistMutation),
            (self.p_point_mutation, Operator::PointMutation),
        ];
        let mut upper = 0.0;
        for (width, op) in bands {
            upper += width;
            if u < upper {
                return Some(op);
            }
        }
        None
    }

    /// Produces the offspring of one mating pair.
    ///
    /// Picks the operator, applies it to `parent1` then `parent2`, and
    /// keeps only children that pass validation against `space`. The
    /// result holds zero, one or two trees.
    pub fn vary<R: Rng>(
        &self,
        parent1: &ExpressionTree,
        parent2: &ExpressionTree,
        space: &TreeSpace,
        rng: &mut R,
    ) -> Vec<ExpressionTree> {
        let Some(op) = self.choose(rng) else {
            return Vec::new();
        };
        let children: Vec<ExpressionTree> = match op {
            Operator::Crossover => {
                let first = crossover(parent1, parent2, rng);
                let second = crossover(parent2, parent1, rng);
                vec![first, second]
            }
            Operator::SubtreeMutation => {
                let first = subtree_mutation(parent1, space, rng);
                let second = subtree_mutation(parent2, space, rng);
                vec![first, second]
            }
            Operator::HoistMutation => {
                let first = hoist_mutation(parent1, rng);
                let second = hoist_mutation(parent2, rng);
                first.into_iter().chain(second).collect()
            }
            Operator::PointMutation => {
                let first = point_mutation(parent1, space, self.p_point_replace, rng);
                let second = point_mutation(parent2, space, self.p_point_replace, rng);
                vec![first, second]
            }
        };

        let produced = children.len();
        let accepted: Vec<ExpressionTree> = children
            .into_iter()
            .filter(|child| child.is_valid(space))
            .collect();
        if accepted.len() < produced {
            trace!(
                "{:?} discarded {} invalid children",
                op,
                produced - accepted.len()
            );
        }
        accepted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::functions::FunctionSet;
    use crate::gp::init::generate_tree;
    use crate::random::create_rng;

    fn space() -> TreeSpace {
        TreeSpace::new(
            FunctionSet::from_names(&["add", "sub", "mul", "div", "sin", "cos"]).unwrap(),
            3,
        )
        .with_init_depth(1, 4)
        .with_depth_limits(0, 8)
    }

    /// add(mul(X0, 2.0), sin(X1))
    fn sample() -> ExpressionTree {
        ExpressionTree::new(Node::function(
            0,
            vec![
                Node::function(2, vec![Node::Feature(0), Node::Constant(2.0)]),
                Node::function(4, vec![Node::Feature(1)]),
            ],
        ))
    }

    fn collect_leaves(node: &Node, out: &mut Vec<Node>) {
        match node {
            Node::Function { children, .. } => {
                for child in children {
                    collect_leaves(child, out);
                }
            }
            leaf => out.push(leaf.clone()),
        }
    }

    #[test]
    fn test_crossover_size_bound_and_closure() {
        let sp = space();
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let p1 = generate_tree(&sp, &mut rng).unwrap();
            let p2 = generate_tree(&sp, &mut rng).unwrap();
            let child = crossover(&p1, &p2, &mut rng);
            assert!(child.node_count() <= p1.node_count() + p2.node_count());

            let mut pool = Vec::new();
            collect_leaves(p1.root(), &mut pool);
            collect_leaves(p2.root(), &mut pool);
            let mut leaves = Vec::new();
            collect_leaves(child.root(), &mut leaves);
            for leaf in leaves {
                assert!(pool.contains(&leaf), "leaf {leaf:?} not from a parent");
            }
        }
    }

    #[test]
    fn test_crossover_of_terminals_swaps_root() {
        let a = ExpressionTree::new(Node::Feature(0));
        let b = ExpressionTree::new(Node::Constant(0.25));
        let mut rng = create_rng(1);
        assert_eq!(crossover(&a, &b, &mut rng), b);
    }

    #[test]
    fn test_crossover_leaves_parents_untouched() {
        let p1 = sample();
        let p2 = ExpressionTree::new(Node::Feature(2));
        let mut rng = create_rng(3);
        let _ = crossover(&p1, &p2, &mut rng);
        assert_eq!(p1, sample());
    }

    #[test]
    fn test_subtree_mutation_changes_something() {
        let sp = space();
        let parent = sample();
        let mut rng = create_rng(7);
        let changed = (0..50)
            .map(|_| subtree_mutation(&parent, &sp, &mut rng))
            .filter(|child| *child != parent)
            .count();
        assert!(changed > 0);
    }

    #[test]
    fn test_hoist_strictly_shrinks() {
        let sp = space();
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let parent = generate_tree(&sp, &mut rng).unwrap();
            match hoist_mutation(&parent, &mut rng) {
                Some(child) => assert!(child.node_count() < parent.node_count()),
                None => assert!(parent.root().is_terminal()),
            }
        }
    }

    #[test]
    fn test_hoist_of_terminal_is_none() {
        let mut rng = create_rng(42);
        assert!(hoist_mutation(&ExpressionTree::new(Node::Constant(1.0)), &mut rng).is_none());
    }

    #[test]
    fn test_hoist_of_unary_root() {
        // sin(X1): the only choice is the root, the only descendant is X1.
        let tree = ExpressionTree::new(Node::function(4, vec![Node::Feature(1)]));
        let mut rng = create_rng(0);
        assert_eq!(
            hoist_mutation(&tree, &mut rng),
            Some(ExpressionTree::new(Node::Feature(1)))
        );
    }

    #[test]
    fn test_point_mutation_zero_probability_is_identity() {
        let sp = space();
        let mut rng = create_rng(42);
        assert_eq!(point_mutation(&sample(), &sp, 0.0, &mut rng), sample());
    }

    #[test]
    fn test_point_mutation_preserves_shape() {
        let sp = space();
        let mut rng = create_rng(42);
        for _ in 0..50 {
            let child = point_mutation(&sample(), &sp, 1.0, &mut rng);
            assert!(child.is_valid(&sp));
            assert_eq!(child.node_count(), sample().node_count());
            assert_eq!(child.function_indices(), sample().function_indices());
            match child.subtree(4) {
                Some(Node::Function { id, arity: 1, .. }) => assert!(*id == 4 || *id == 5),
                other => panic!("unary node expected, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_choose_bands() {
        let only_crossover = Pipeline {
            p_crossover: 1.0,
            p_subtree_mutation: 0.0,
            p_hoist_mutation: 0.0,
            p_point_mutation: 0.0,
            p_point_replace: 0.0,
        };
        let nothing = Pipeline {
            p_crossover: 0.0,
            ..only_crossover
        };
        let mut rng = create_rng(42);
        for _ in 0..100 {
            assert_eq!(only_crossover.choose(&mut rng), Some(Operator::Crossover));
            assert_eq!(nothing.choose(&mut rng), None);
        }
    }

    #[test]
    fn test_choose_frequencies() {
        let pipeline = Pipeline::from_config(
            &SrConfig::default().with_operator_probabilities(0.5, 0.2, 0.2, 0.0),
        );
        let mut rng = create_rng(42);
        let mut counts = [0u32; 5];
        let n = 20000;
        for _ in 0..n {
            let slot = match pipeline.choose(&mut rng) {
                Some(Operator::Crossover) => 0,
                Some(Operator::SubtreeMutation) => 1,
                Some(Operator::HoistMutation) => 2,
                Some(Operator::PointMutation) => 3,
                None => 4,
            };
            counts[slot] += 1;
        }
        let freq = |i: usize| counts[i] as f64 / n as f64;
        assert!((freq(0) - 0.5).abs() < 0.02, "counts: {counts:?}");
        assert!((freq(1) - 0.2).abs() < 0.02, "counts: {counts:?}");
        assert!((freq(2) - 0.2).abs() < 0.02, "counts: {counts:?}");
        assert_eq!(counts[3], 0);
        assert!((freq(4) - 0.1).abs() < 0.02, "counts: {counts:?}");
    }

    #[test]
    fn test_vary_children_are_valid() {
        let sp = space().with_depth_limits(0, 5);
        let pipeline = Pipeline::from_config(
            &SrConfig::default().with_operator_probabilities(0.4, 0.2, 0.2, 0.2),
        );
        let mut rng = create_rng(42);
        for _ in 0..200 {
            let p1 = generate_tree(&sp, &mut rng).unwrap();
            let p2 = generate_tree(&sp, &mut rng).unwrap();
            let children = pipeline.vary(&p1, &p2, &sp, &mut rng);
            assert!(children.len() <= 2);
            assert!(children.iter().all(|c| c.is_valid(&sp)));
        }
    }

    #[test]
    fn test_vary_discards_oversize_children() {
        // Depth limit 1 with a depth-2 recipient site: grafting any
        // function subtree below the root exceeds it.
        let sp = space().with_depth_limits(0, 1);
        let pipeline = Pipeline {
            p_crossover: 1.0,
            p_subtree_mutation: 0.0,
            p_hoist_mutation: 0.0,
            p_point_mutation: 0.0,
            p_point_replace: 0.0,
        };
        let deep = sample();
        let mut rng = create_rng(5);
        for _ in 0..50 {
            for child in pipeline.vary(&deep, &deep, &sp, &mut rng) {
                assert!(child.depth() <= 1);
            }
        }
    }

    #[test]
    fn test_vary_is_reproducible() {
        let sp = space();
        let pipeline = Pipeline::from_config(
            &SrConfig::default().with_operator_probabilities(0.4, 0.2, 0.2, 0.2),
        );
        let p1 = sample();
        let p2 = ExpressionTree::new(Node::function(
            1,
            vec![Node::Feature(2), Node::Constant(-0.5)],
        ));
        let mut a = create_rng(11);
        let mut b = create_rng(11);
        for _ in 0..30 {
            assert_eq!(
                pipeline.vary(&p1, &p2, &sp, &mut a),
                pipeline.vary(&p1, &p2, &sp, &mut b)
            );
        }
    }
}
