//! Multi-objective symbolic regression.
//!
//! Searches for closed-form formulas that fit a numeric target from a set
//! of feature columns. Candidate formulas are expression trees evolved by
//! genetic programming; survival uses NSGA-II on two objectives, the
//! prediction error and the number of nodes, so a run returns a Pareto
//! front ranging from tiny rough formulas to large accurate ones.
//!
//! - [`data`]: the input table (in memory or from CSV)
//! - [`gp`]: trees, operators, fitness, NSGA-II survival and the run loop
//! - [`random`]: the seeded generator every stochastic step draws from
//! - [`error`]: startup and configuration errors
//!
//! # Example
//!
//! ```
//! use u_symreg::data::Dataset;
//! use u_symreg::gp::{SrConfig, SrRunner};
//!
//! let rows: Vec<Vec<f64>> = (0..30).map(|i| vec![i as f64 / 15.0 - 1.0]).collect();
//! let target: Vec<f64> = rows.iter().map(|r| 2.0 * r[0] + 1.0).collect();
//! let data = Dataset::new(rows, target)?;
//!
//! let config = SrConfig::default()
//!     .with_population_size(100)
//!     .with_max_generations(5)
//!     .with_functions(&["add", "sub", "mul"])
//!     .with_seed(7);
//! let result = SrRunner::run(&data, &config)?;
//! for ind in &result.pareto_front {
//!     println!("{:>3}  {:.6}  {}", ind.fitness.complexity, ind.fitness.error, result.render(ind));
//! }
//! # Ok::<(), u_symreg::SrError>(())
//! ```
//!
//! # Features
//!
//! - `parallel` (default): evaluate fitness with rayon
//! - `serde`: serialize configuration, trees and reports
//! - `cli`: the `symreg` command-line binary

pub mod data;
pub mod error;
pub mod gp;
pub mod random;

pub use error::{Result, SrError};
