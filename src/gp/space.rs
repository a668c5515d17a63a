//! The search space trees are drawn from.
//!
//! [`TreeSpace`] bundles the read-only pieces every tree operation needs:
//! the function set, the feature count, the constant range, the
//! initialization depth and method, and the depth limits that define a
//! valid tree.

use super::config::SrConfig;
use super::functions::FunctionSet;
use super::tree::Node;
use crate::error::{Result, SrError};
use rand::Rng;
use std::str::FromStr;

/// Tree construction method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitMethod {
    /// Every branch reaches the drawn maximum depth.
    Full,
    /// Branches may stop early at a terminal.
    Grow,
    /// Each tree is `Full` or `Grow` with equal probability.
    #[default]
    HalfAndHalf,
}

impl FromStr for InitMethod {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "grow" => Ok(Self::Grow),
            "half and half" | "half-and-half" | "half_and_half" => Ok(Self::HalfAndHalf),
            other => Err(format!("unknown init method `{other}`")),
        }
    }
}

/// Everything needed to build, vary and validate trees.
#[derive(Debug, Clone)]
pub struct TreeSpace {
    /// Operators available to function nodes.
    pub functions: FunctionSet,
    /// Number of feature columns.
    pub n_features: usize,
    /// Bounds for ephemeral constants; `None` disables constants.
    pub const_range: Option<(f64, f64)>,
    /// Range the per-tree maximum depth is drawn from at construction.
    pub init_depth: (usize, usize),
    /// Construction method.
    pub init_method: InitMethod,
    /// `[min_depth, max_depth]` a valid tree must satisfy.
    pub depth_limits: (usize, usize),
    /// Construction attempts before initialization is declared impossible.
    pub max_build_attempts: usize,
}

impl TreeSpace {
    /// Creates a space with default construction parameters.
    pub fn new(functions: FunctionSet, n_features: usize) -> Self {
        let defaults = SrConfig::default();
        Self {
            functions,
            n_features,
            const_range: defaults.const_range,
            init_depth: defaults.init_depth,
            init_method: defaults.init_method,
            depth_limits: defaults.depth_limits,
            max_build_attempts: defaults.max_build_attempts,
        }
    }

    /// Builds the space for a run from its configuration.
    pub fn from_config(config: &SrConfig, n_features: usize) -> Result<Self> {
        let functions = FunctionSet::from_names(&config.functions)?;
        let space = Self {
            functions,
            n_features,
            const_range: config.const_range,
            init_depth: config.init_depth,
            init_method: config.init_method,
            depth_limits: config.depth_limits,
            max_build_attempts: config.max_build_attempts,
        };
        if space.n_terminals() == 0 {
            return Err(SrError::NoTerminals);
        }
        Ok(space)
    }

    /// Sets the constant range.
    pub fn with_const_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.const_range = range;
        self
    }

    /// Sets the initialization depth range.
    pub fn with_init_depth(mut self, min: usize, max: usize) -> Self {
        self.init_depth = (min, max);
        self
    }

    /// Sets the construction method.
    pub fn with_init_method(mut self, method: InitMethod) -> Self {
        self.init_method = method;
        self
    }

    /// Sets the validation depth limits.
    pub fn with_depth_limits(mut self, min: usize, max: usize) -> Self {
        self.depth_limits = (min, max);
        self
    }

    /// Sets the construction retry bound.
    pub fn with_max_build_attempts(mut self, attempts: usize) -> Self {
        self.max_build_attempts = attempts;
        self
    }

    /// Number of distinct terminal kinds: one per feature, plus one for
    /// constants when enabled.
    pub fn n_terminals(&self) -> usize {
        self.n_features + usize::from(self.const_range.is_some())
    }

    /// Draws a leaf: a feature column, or a constant from `const_range`.
    ///
    /// Consumes one draw for the kind, plus one for a constant's value.
    pub fn random_terminal<R: Rng>(&self, rng: &mut R) -> Node {
        let choice = rng.random_range(0..self.n_terminals());
        match self.const_range {
            Some((lo, hi)) if choice == self.n_features => {
                Node::Constant(rng.random_range(lo..=hi))
            }
            _ => Node::Feature(choice),
        }
    }
}
