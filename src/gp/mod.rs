//! Multi-objective genetic programming for symbolic regression.
//!
//! Evolves expression trees against a [`Dataset`](crate::data::Dataset),
//! minimizing prediction error and tree size at the same time, and returns
//! the trade-off (Pareto) front of formulas.
//!
//! # Key Types
//!
//! - [`FunctionSet`]: The primitive operators trees are built from
//! - [`ExpressionTree`]: A candidate formula
//! - [`SrConfig`]: Run parameters (population, operators, depths, metric)
//! - [`SrRunner`]: Executes the evolutionary loop
//! - [`Evolution`]: The loop as an explicit, steppable state machine
//! - [`SrResult`]: Final population, Pareto front and per-generation history
//!
//! # Submodules
//!
//! - [`init`]: Random tree construction (full, grow, half-and-half)
//! - [`operators`]: Crossover, subtree, hoist and point mutation
//! - [`multi_objective`]: Non-dominated sorting, crowding distance, survival
//!
//! # References
//!
//! - Koza (1992), *Genetic Programming: On the Programming of Computers by
//!   Means of Natural Selection*
//! - Deb et al. (2002), *A Fast and Elitist Multiobjective GA: NSGA-II*

mod config;
mod fitness;
mod functions;
pub mod init;
pub mod multi_objective;
mod observer;
pub mod operators;
mod runner;
mod selection;
mod space;
mod tree;
mod types;

pub use config::SrConfig;
pub use fitness::{Evaluator, Metric};
pub use functions::{FunctionSet, Primitive, BUILTINS, MAX_ARITY};
pub use observer::{Champion, GenerationStats, LogObserver, Observer};
pub use runner::{Evolution, SrResult, SrRunner};
pub use selection::Tournament;
pub use space::{InitMethod, TreeSpace};
pub use tree::{ExpressionTree, Node, TreeDisplay, TreeViolation};
pub use types::{Fitness, Individual};
