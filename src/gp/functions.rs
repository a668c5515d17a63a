//! Primitive operators and the function set.
//!
//! A [`Primitive`] is a named, fixed-arity numeric operator. A
//! [`FunctionSet`] is the ordered dispatch table a run is built from:
//! function nodes store an index into it, and evaluation looks the
//! operator up by that index.
//!
//! # Protected Semantics
//!
//! Every built-in is total over `f64`. Where the plain operation is
//! undefined it returns a fixed sentinel instead:
//!
//! | name   | arity | definition                                   |
//! |--------|-------|----------------------------------------------|
//! | `div`  | 2     | `a / b`, or `1.0` when `|b| <= 0.001`        |
//! | `sqrt` | 1     | `sqrt(|x|)`                                  |
//! | `log`  | 1     | `ln(|x|)`, or `0.0` when `|x| <= 0.001`      |
//! | `inv`  | 1     | `1 / x`, or `0.0` when `|x| <= 0.001`        |
//! | `sin`, `cos`, `tan` | 1 | `0.0` for non-finite input         |
//! | `sig`  | 1     | `1 / (1 + e^-x)`                             |
//!
//! `add`, `sub`, `mul`, `neg`, `abs`, `max`, `min` are unprotected.

use crate::error::{Result, SrError};

/// Largest arity a primitive may declare.
pub const MAX_ARITY: usize = 3;

/// Threshold below which a divisor or log argument counts as zero.
const PROTECTION_EPS: f64 = 0.001;

/// A named operator with fixed arity.
///
/// `op` receives exactly `arity` arguments.
#[derive(Clone, Copy)]
pub struct Primitive {
    /// Name used for lookup and rendering.
    pub name: &'static str,
    /// Number of arguments.
    pub arity: usize,
    /// The operator itself.
    pub op: fn(&[f64]) -> f64,
}

impl std::fmt::Debug for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Primitive")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arity == other.arity
    }
}

impl Primitive {
    /// Creates a custom primitive.
    pub const fn new(name: &'static str, arity: usize, op: fn(&[f64]) -> f64) -> Self {
        Self { name, arity, op }
    }

    /// Looks up a built-in by name.
    pub fn builtin(name: &str) -> Option<Self> {
        BUILTINS.iter().find(|p| p.name == name).copied()
    }

    /// Applies the operator.
    #[inline]
    pub fn apply(&self, args: &[f64]) -> f64 {
        debug_assert_eq!(args.len(), self.arity);
        (self.op)(args)
    }
}

fn add(a: &[f64]) -> f64 {
    a[0] + a[1]
}

fn sub(a: &[f64]) -> f64 {
    a[0] - a[1]
}

fn mul(a: &[f64]) -> f64 {
    a[0] * a[1]
}

fn protected_div(a: &[f64]) -> f64 {
    if a[1].abs() > PROTECTION_EPS {
        a[0] / a[1]
    } else {
        1.0
    }
}

fn protected_sqrt(a: &[f64]) -> f64 {
    a[0].abs().sqrt()
}

fn protected_log(a: &[f64]) -> f64 {
    if a[0].abs() > PROTECTION_EPS {
        a[0].abs().ln()
    } else {
        0.0
    }
}

fn neg(a: &[f64]) -> f64 {
    -a[0]
}

fn protected_inv(a: &[f64]) -> f64 {
    if a[0].abs() > PROTECTION_EPS {
        1.0 / a[0]
    } else {
        0.0
    }
}

fn abs(a: &[f64]) -> f64 {
    a[0].abs()
}

fn max(a: &[f64]) -> f64 {
    a[0].max(a[1])
}

fn min(a: &[f64]) -> f64 {
    a[0].min(a[1])
}

fn protected_sin(a: &[f64]) -> f64 {
    if a[0].is_finite() {
        a[0].sin()
    } else {
        0.0
    }
}

fn protected_cos(a: &[f64]) -> f64 {
    if a[0].is_finite() {
        a[0].cos()
    } else {
        0.0
    }
}

fn protected_tan(a: &[f64]) -> f64 {
    if a[0].is_finite() {
        a[0].tan()
    } else {
        0.0
    }
}

fn sigmoid(a: &[f64]) -> f64 {
    1.0 / (1.0 + (-a[0]).exp())
}

/// The built-in catalog.
pub const BUILTINS: &[Primitive] = &[
    Primitive::new("add", 2, add),
    Primitive::new("sub", 2, sub),
    Primitive::new("mul", 2, mul),
    Primitive::new("div", 2, protected_div),
    Primitive::new("sqrt", 1, protected_sqrt),
    Primitive::new("log", 1, protected_log),
    Primitive::new("neg", 1, neg),
    Primitive::new("inv", 1, protected_inv),
    Primitive::new("abs", 1, abs),
    Primitive::new("max", 2, max),
    Primitive::new("min", 2, min),
    Primitive::new("sin", 1, protected_sin),
    Primitive::new("cos", 1, protected_cos),
    Primitive::new("tan", 1, protected_tan),
    Primitive::new("sig", 1, sigmoid),
];

/// Ordered, read-only catalog of the primitives available to a run.
///
/// # Examples
///
/// ```
/// use u_symreg::gp::FunctionSet;
///
/// let set = FunctionSet::from_names(&["add", "mul", "sin"]).unwrap();
/// assert_eq!(set.len(), 3);
/// assert_eq!(set.get(1).unwrap().name, "mul");
/// assert_eq!(set.ids_with_arity(2), vec![0, 1]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionSet {
    primitives: Vec<Primitive>,
}

impl FunctionSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from built-in names, preserving order.
    ///
    /// Fails on an empty list, an unknown name, or a repeated name.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        if names.is_empty() {
            return Err(SrError::EmptyFunctionSet);
        }
        let mut set = Self::new();
        for name in names {
            let name = name.as_ref().trim();
            let primitive =
                Primitive::builtin(name).ok_or_else(|| SrError::UnknownFunction(name.into()))?;
            set.push(primitive)?;
        }
        Ok(set)
    }

    /// Appends a primitive and returns its id.
    pub fn push(&mut self, primitive: Primitive) -> Result<usize> {
        if primitive.arity == 0 || primitive.arity > MAX_ARITY {
            return Err(SrError::InvalidArity {
                name: primitive.name,
                arity: primitive.arity,
                max: MAX_ARITY,
            });
        }
        if self.primitives.iter().any(|p| p.name == primitive.name) {
            return Err(SrError::DuplicateFunction(primitive.name.into()));
        }
        self.primitives.push(primitive);
        Ok(self.primitives.len() - 1)
    }

    /// Returns the primitive with the given id.
    pub fn get(&self, id: usize) -> Option<&Primitive> {
        self.primitives.get(id)
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Iterates primitives in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.iter()
    }

    /// Ids of all primitives with the given arity, ascending.
    pub fn ids_with_arity(&self, arity: usize) -> Vec<usize> {
        self.primitives
            .iter()
            .enumerate()
            .filter(|(_, p)| p.arity == arity)
            .map(|(id, _)| id)
            .collect()
    }

    /// Applies primitive `id` to the leading arguments it takes.
    ///
    /// An unknown `id` evaluates to 0.
    #[inline]
    pub(crate) fn apply(&self, id: usize, args: &[f64; MAX_ARITY]) -> f64 {
        match self.primitives.get(id) {
            Some(primitive) => primitive.apply(&args[..primitive.arity]),
            None => 0.0,
        }
    }
}
