//! Expression tree representation.
//!
//! A tree is an owned recursive [`Node`]. Every node has exactly one
//! parent by construction, so trees can never share or cycle subtrees.
//!
//! Positions inside a tree are addressed by **preorder index**: the root
//! is 0, then the first child's subtree, then the second child's, and so
//! on. Genetic operators pick sites uniformly over these indices.
//!
//! Depth counts edges: a lone terminal has depth 0, `add(X0, X1)` has
//! depth 1.

use super::functions::{FunctionSet, MAX_ARITY};
use super::space::TreeSpace;
use std::fmt;
use thiserror::Error;

/// A node in an expression tree.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Node {
    /// An operator application. `arity` is stored per node so that
    /// same-arity substitution never needs to consult the set.
    Function {
        /// Index into the [`FunctionSet`].
        id: usize,
        /// Declared arity of the operator.
        arity: usize,
        /// Ordered arguments.
        children: Vec<Node>,
    },
    /// Column `i` of the feature vector.
    Feature(usize),
    /// An ephemeral constant fixed at construction.
    Constant(f64),
}

impl Node {
    /// Creates a function node whose arity is its child count.
    pub fn function(id: usize, children: Vec<Node>) -> Self {
        Node::Function {
            id,
            arity: children.len(),
            children,
        }
    }

    /// Whether this node is a leaf.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Node::Function { .. })
    }

    /// Number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        match self {
            Node::Function { children, .. } => {
                1 + children.iter().map(Node::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }

    /// Longest root-to-leaf path of this subtree, in edges.
    pub fn depth(&self) -> usize {
        match self {
            Node::Function { children, .. } => {
                1 + children.iter().map(Node::depth).max().unwrap_or(0)
            }
            _ => 0,
        }
    }

    /// The node at preorder `index` within this subtree.
    pub fn get(&self, index: usize) -> Option<&Node> {
        if index == 0 {
            return Some(self);
        }
        let Node::Function { children, .. } = self else {
            return None;
        };
        let mut offset = 1;
        for child in children {
            let size = child.node_count();
            if index < offset + size {
                return child.get(index - offset);
            }
            offset += size;
        }
        None
    }

    /// Mutable access to the node at preorder `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        if index == 0 {
            return Some(self);
        }
        let Node::Function { children, .. } = self else {
            return None;
        };
        let mut offset = 1;
        for child in children.iter_mut() {
            let size = child.node_count();
            if index < offset + size {
                return child.get_mut(index - offset);
            }
            offset += size;
        }
        None
    }

    /// Evaluates this subtree on one feature row.
    ///
    /// Never panics, even on a tree that fails [`ExpressionTree::validate`]:
    /// a feature past the end of `row` and an unknown function both read
    /// as 0, missing arguments are 0, and surplus children are ignored.
    pub fn evaluate(&self, row: &[f64], functions: &FunctionSet) -> f64 {
        match self {
            Node::Constant(value) => *value,
            Node::Feature(index) => row.get(*index).copied().unwrap_or(0.0),
            Node::Function { id, children, .. } => {
                let mut args = [0.0; MAX_ARITY];
                for (slot, child) in args.iter_mut().zip(children) {
                    *slot = child.evaluate(row, functions);
                }
                functions.apply(*id, &args)
            }
        }
    }

    fn collect_function_indices(&self, next: &mut usize, out: &mut Vec<usize>) {
        if let Node::Function { children, .. } = self {
            out.push(*next);
            *next += 1;
            for child in children {
                child.collect_function_indices(next, out);
            }
        } else {
            *next += 1;
        }
    }

    fn check(&self, space: &TreeSpace) -> Result<(), TreeViolation> {
        match self {
            Node::Feature(index) if *index >= space.n_features => {
                Err(TreeViolation::FeatureOutOfRange {
                    index: *index,
                    n_features: space.n_features,
                })
            }
            Node::Constant(value) if !value.is_finite() => Err(TreeViolation::NonFiniteConstant),
            Node::Function {
                id,
                arity,
                children,
            } => {
                let primitive = space
                    .functions
                    .get(*id)
                    .ok_or(TreeViolation::UnknownFunction(*id))?;
                if *arity != primitive.arity || children.len() != *arity {
                    return Err(TreeViolation::ArityMismatch {
                        name: primitive.name,
                        expected: primitive.arity,
                        found: children.len(),
                    });
                }
                children.iter().try_for_each(|child| child.check(space))
            }
            _ => Ok(()),
        }
    }
}

/// Reasons a tree fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeViolation {
    /// A function node's child count differs from its arity.
    #[error("`{name}` expects {expected} arguments, found {found}")]
    ArityMismatch {
        /// Primitive name.
        name: &'static str,
        /// Declared arity.
        expected: usize,
        /// Child count.
        found: usize,
    },
    /// Tree depth is outside the configured limits.
    #[error("depth {depth} outside [{min}, {max}]")]
    DepthOutOfBounds {
        /// Actual depth.
        depth: usize,
        /// Lower limit.
        min: usize,
        /// Upper limit.
        max: usize,
    },
    /// A feature terminal refers past the last column.
    #[error("feature X{index} out of range for {n_features} features")]
    FeatureOutOfRange {
        /// Offending index.
        index: usize,
        /// Feature count.
        n_features: usize,
    },
    /// A function id is not in the set.
    #[error("function id {0} not in function set")]
    UnknownFunction(usize),
    /// A constant is NaN or infinite.
    #[error("constant is not finite")]
    NonFiniteConstant,
}

/// A candidate formula: a root node and the subtree it owns.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpressionTree {
    root: Node,
}

impl ExpressionTree {
    /// Wraps a root node.
    pub fn new(root: Node) -> Self {
        Self { root }
    }

    /// The root node.
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Consumes the tree, returning its root.
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Total node count. This is the complexity objective.
    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Depth in edges.
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// The subtree rooted at preorder `index`.
    pub fn subtree(&self, index: usize) -> Option<&Node> {
        self.root.get(index)
    }

    /// Returns a copy with the subtree at `index` replaced by `node`.
    ///
    /// Returns `None` when `index` is out of range.
    pub fn with_subtree(&self, index: usize, node: Node) -> Option<ExpressionTree> {
        let mut tree = self.clone();
        *tree.root.get_mut(index)? = node;
        Some(tree)
    }

    /// Preorder indices of every function node.
    pub fn function_indices(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut next = 0;
        self.root.collect_function_indices(&mut next, &mut out);
        out
    }

    /// Checks structure, feature bounds and depth against `space`.
    ///
    /// Structural checks run first, so an over-deep tree with a bad
    /// arity reports the arity.
    pub fn validate(&self, space: &TreeSpace) -> Result<(), TreeViolation> {
        self.root.check(space)?;
        let depth = self.depth();
        let (min, max) = space.depth_limits;
        if depth < min || depth > max {
            return Err(TreeViolation::DepthOutOfBounds { depth, min, max });
        }
        Ok(())
    }

    /// Boolean form of [`validate`](Self::validate).
    pub fn is_valid(&self, space: &TreeSpace) -> bool {
        self.validate(space).is_ok()
    }

    /// Evaluates the tree on one feature row.
    pub fn evaluate(&self, row: &[f64], functions: &FunctionSet) -> f64 {
        self.root.evaluate(row, functions)
    }

    /// Renders the tree in prefix notation.
    ///
    /// Features print as `X{i}` unless `feature_names` supplies a name.
    pub fn display<'a>(
        &'a self,
        functions: &'a FunctionSet,
        feature_names: Option<&'a [String]>,
    ) -> TreeDisplay<'a> {
        TreeDisplay {
            node: &self.root,
            functions,
            feature_names,
        }
    }
}

impl From<Node> for ExpressionTree {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

/// [`fmt::Display`] adapter returned by [`ExpressionTree::display`].
pub struct TreeDisplay<'a> {
    node: &'a Node,
    functions: &'a FunctionSet,
    feature_names: Option<&'a [String]>,
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node {
            Node::Constant(value) => write!(f, "{value:.3}"),
            Node::Feature(index) => match self.feature_names.and_then(|n| n.get(*index)) {
                Some(name) => f.write_str(name),
                None => write!(f, "X{index}"),
            },
            Node::Function { id, children, .. } => {
                match self.functions.get(*id) {
                    Some(p) => f.write_str(p.name)?,
                    None => write!(f, "f{id}")?,
                }
                f.write_str("(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    let inner = TreeDisplay {
                        node: child,
                        ..*self
                    };
                    write!(f, "{inner}")?;
                }
                f.write_str(")")
            }
        }
    }
}
