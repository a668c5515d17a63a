//! Crate-wide error type.
//!
//! Every error here is a startup or configuration failure: once a run is
//! under way, numeric problems are absorbed by protected operators and
//! invalid offspring are discarded, so nothing is raised mid-evolution.

use thiserror::Error;

/// Errors reported by dataset loading, configuration and initialization.
#[derive(Debug, Error)]
pub enum SrError {
    /// A configuration parameter is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A function name is not part of the built-in catalog.
    #[error("unknown function `{0}`")]
    UnknownFunction(String),

    /// The same function name was registered twice.
    #[error("function `{0}` is registered more than once")]
    DuplicateFunction(String),

    /// The function set has no entries.
    #[error("function set must not be empty")]
    EmptyFunctionSet,

    /// A primitive declared an arity outside the supported range.
    #[error("function `{name}` has unsupported arity {arity} (expected 1..={max})")]
    InvalidArity {
        /// Primitive name.
        name: &'static str,
        /// Declared arity.
        arity: usize,
        /// Largest supported arity.
        max: usize,
    },

    /// Neither features nor constants are available as leaves.
    #[error("no terminals available: dataset has no features and constants are disabled")]
    NoTerminals,

    /// The initializer could not produce a valid tree.
    #[error(
        "no valid tree after {attempts} attempts; the function and terminal sets \
         cannot satisfy the depth limits"
    )]
    InitializationExhausted {
        /// Number of construction attempts made.
        attempts: usize,
    },

    /// The named target column is absent from the header.
    #[error("target column `{0}` not found in header")]
    MissingTargetColumn(String),

    /// A cell is not a finite number.
    #[error("non-numeric value `{value}` in column `{column}` at data row {row}")]
    NonNumeric {
        /// 1-based data row (header excluded).
        row: usize,
        /// Column name.
        column: String,
        /// Raw cell text.
        value: String,
    },

    /// A row has a different number of cells than the header.
    #[error("data row {row} has {found} cells, header has {expected}")]
    RaggedRow {
        /// 1-based data row (header excluded).
        row: usize,
        /// Header width.
        expected: usize,
        /// Cells found.
        found: usize,
    },

    /// The dataset has no samples.
    #[error("dataset has no samples")]
    EmptyDataset,

    /// Two inputs that must agree in length do not.
    #[error("{what}: expected length {expected}, found {found}")]
    DimensionMismatch {
        /// What was being compared.
        what: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        found: usize,
    },

    /// Sample weights are negative, non-finite, or sum to zero.
    #[error("sample weights must be finite, non-negative and have a positive sum")]
    InvalidWeights,

    /// Underlying I/O failure while reading data.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Shorthand for results carrying [`SrError`].
pub type Result<T> = std::result::Result<T, SrError>;
