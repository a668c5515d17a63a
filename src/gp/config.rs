//! Symbolic regression configuration.
//!
//! [`SrConfig`] holds every parameter that controls a run. Values are
//! fixed for the lifetime of the run.

use super::fitness::Metric;
use super::space::InitMethod;

/// Configuration for a symbolic regression run.
///
/// # Defaults
///
/// ```
/// use u_symreg::gp::SrConfig;
///
/// let config = SrConfig::default();
/// assert_eq!(config.population_size, 1000);
/// assert_eq!(config.max_generations, 10);
/// assert_eq!(config.init_depth, (2, 6));
/// ```
///
/// # Builder Pattern
///
/// ```
/// use u_symreg::gp::{Metric, SrConfig};
///
/// let config = SrConfig::default()
///     .with_population_size(200)
///     .with_max_generations(30)
///     .with_functions(&["add", "sub", "mul"])
///     .with_metric(Metric::Mae)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SrConfig {
    /// Number of individuals kept after each survival step.
    pub population_size: usize,

    /// Number of generations to run. There is no early stop.
    pub max_generations: usize,

    /// Random seed for reproducibility.
    ///
    /// `None` draws a seed at startup; the drawn value is logged and
    /// returned in the result.
    pub seed: Option<u64>,

    /// Names of the built-in primitives available to function nodes.
    pub functions: Vec<String>,

    /// Range the per-tree maximum depth is drawn from at construction.
    pub init_depth: (usize, usize),

    /// Tree construction method.
    pub init_method: InitMethod,

    /// `(min_depth, max_depth)` a tree must satisfy to be accepted.
    ///
    /// Applies to the initial population and to every offspring.
    pub depth_limits: (usize, usize),

    /// Bounds for ephemeral constants. `None` disables constants.
    pub const_range: Option<(f64, f64)>,

    /// Error metric.
    pub metric: Metric,

    /// Per-node replacement probability used by point mutation.
    pub p_point_replace: f64,

    /// Probability band for subtree crossover.
    pub p_crossover: f64,

    /// Probability band for subtree mutation.
    pub p_subtree_mutation: f64,

    /// Probability band for hoist mutation.
    pub p_hoist_mutation: f64,

    /// Probability band for point mutation.
    pub p_point_mutation: f64,

    /// Individuals sampled per tournament.
    pub tournament_size: usize,

    /// Parents drawn per generation. `None` means `population_size`.
    pub num_selected: Option<usize>,

    /// Construction attempts per tree before initialization fails.
    pub max_build_attempts: usize,

    /// Whether to evaluate individuals in parallel using rayon.
    ///
    /// Has no effect without the `parallel` feature. Results are
    /// identical either way.
    pub parallel: bool,
}

impl Default for SrConfig {
    fn default() -> Self {
        Self {
            population_size: 1000,
            max_generations: 10,
            seed: None,
            functions: ["add", "sub", "mul", "div", "sin", "cos"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            init_depth: (2, 6),
            init_method: InitMethod::HalfAndHalf,
            depth_limits: (0, 12),
            const_range: Some((-1.0, 1.0)),
            metric: Metric::Mse,
            p_point_replace: 0.01,
            p_crossover: 0.8,
            p_subtree_mutation: 0.01,
            p_hoist_mutation: 0.01,
            p_point_mutation: 0.0,
            tournament_size: 2,
            num_selected: None,
            max_build_attempts: 1000,
            parallel: true,
        }
    }
}

impl SrConfig {
    /// Sets the population size.
    pub fn with_population_size(mut self, n: usize) -> Self {
        self.population_size = n;
        self
    }

    /// Sets the number of generations.
    pub fn with_max_generations(mut self, n: usize) -> Self {
        self.max_generations = n;
        self
    }

    /// Sets the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the function names.
    pub fn with_functions<S: AsRef<str>>(mut self, names: &[S]) -> Self {
        self.functions = names.iter().map(|s| s.as_ref().to_string()).collect();
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

    /// Sets the constant range (`None` disables constants).
    pub fn with_const_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.const_range = range;
        self
    }

    /// Sets the error metric.
    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Sets the point-replacement probability.
    pub fn with_p_point_replace(mut self, p: f64) -> Self {
        self.p_point_replace = p.clamp(0.0, 1.0);
        self
    }

    /// Sets the four operator probability bands.
    pub fn with_operator_probabilities(
        mut self,
        crossover: f64,
        subtree_mutation: f64,
        hoist_mutation: f64,
        point_mutation: f64,
    ) -> Self {
        self.p_crossover = crossover.clamp(0.0, 1.0);
        self.p_subtree_mutation = subtree_mutation.clamp(0.0, 1.0);
        self.p_hoist_mutation = hoist_mutation.clamp(0.0, 1.0);
        self.p_point_mutation = point_mutation.clamp(0.0, 1.0);
        self
    }

    /// Sets the tournament size.
    pub fn with_tournament_size(mut self, k: usize) -> Self {
        self.tournament_size = k;
        self
    }

    /// Sets the number of parents drawn per generation.
    pub fn with_num_selected(mut self, n: usize) -> Self {
        self.num_selected = Some(n);
        self
    }

    /// Sets the construction retry bound.
    pub fn with_max_build_attempts(mut self, n: usize) -> Self {
        self.max_build_attempts = n;
        self
    }

    /// Enables or disables parallel evaluation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parents drawn per generation.
    pub fn parents_per_generation(&self) -> usize {
        self.num_selected.unwrap_or(self.population_size)
    }

    /// Validates the configuration.
    ///
    /// Returns `Err` with a description if any parameter is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.population_size < 2 {
            return Err("population_size must be at least 2".into());
        }
        if self.functions.is_empty() {
            return Err("function set must not be empty".into());
        }
        let (init_min, init_max) = self.init_depth;
        if init_min > init_max {
            return Err(format!(
                "init_depth minimum {init_min} exceeds maximum {init_max}"
            ));
        }
        let (min_depth, max_depth) = self.depth_limits;
        if min_depth > max_depth {
            return Err(format!(
                "depth_limits minimum {min_depth} exceeds maximum {max_depth}"
            ));
        }
        if init_max < min_depth || init_min > max_depth {
            return Err(format!(
                "init_depth ({init_min}, {init_max}) does not overlap depth_limits \
                 ({min_depth}, {max_depth})"
            ));
        }
        if let Some((lo, hi)) = self.const_range {
            if !(lo.is_finite() && hi.is_finite()) || lo > hi {
                return Err(format!("const_range ({lo}, {hi}) is not a finite interval"));
            }
        }
        let bands = [
            ("p_crossover", self.p_crossover),
            ("p_subtree_mutation", self.p_subtree_mutation),
            ("p_hoist_mutation", self.p_hoist_mutation),
            ("p_point_mutation", self.p_point_mutation),
            ("p_point_replace", self.p_point_replace),
        ];
        for (name, p) in bands {
            if !(0.0..=1.0).contains(&p) {
                return Err(format!("{name} must be within [0, 1], got {p}"));
            }
        }
        let total = self.p_crossover
            + self.p_subtree_mutation
            + self.p_hoist_mutation
            + self.p_point_mutation;
        if total > 1.0 + 1e-9 {
            return Err(format!(
                "operator probabilities sum to {total}, which exceeds 1"
            ));
        }
        if self.tournament_size == 0 {
            return Err("tournament_size must be at least 1".into());
        }
        if self.parents_per_generation() == 0 {
            return Err("num_selected must be at least 1".into());
        }
        if self.max_build_attempts == 0 {
            return Err("max_build_attempts must be at least 1".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SrConfig::default();
        assert_eq!(config.population_size, 1000);
        assert_eq!(config.max_generations, 10);
        assert!(config.seed.is_none());
        assert_eq!(
            config.functions,
            vec!["add", "sub", "mul", "div", "sin", "cos"]
        );
        assert_eq!(config.init_method, InitMethod::HalfAndHalf);
        assert_eq!(config.const_range, Some((-1.0, 1.0)));
        assert_eq!(config.metric, Metric::Mse);
        assert!((config.p_crossover - 0.8).abs() < 1e-12);
        assert!((config.p_subtree_mutation - 0.01).abs() < 1e-12);
        assert!((config.p_hoist_mutation - 0.01).abs() < 1e-12);
        assert_eq!(config.p_point_mutation, 0.0);
        assert_eq!(config.tournament_size, 2);
        assert_eq!(config.parents_per_generation(), 1000);
        assert!(config.parallel);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SrConfig::default()
            .with_population_size(200)
            .with_max_generations(25)
            .with_seed(7)
            .with_functions(&["add", "mul"])
            .with_init_depth(1, 3)
            .with_init_method(InitMethod::Grow)
            .with_depth_limits(1, 8)
            .with_const_range(None)
            .with_metric(Metric::Mae)
            .with_tournament_size(4)
            .with_num_selected(50)
            .with_parallel(false);

        assert_eq!(config.population_size, 200);
        assert_eq!(config.max_generations, 25);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.functions, vec!["add", "mul"]);
        assert_eq!(config.init_depth, (1, 3));
        assert_eq!(config.init_method, InitMethod::Grow);
        assert_eq!(config.depth_limits, (1, 8));
        assert!(config.const_range.is_none());
        assert_eq!(config.metric, Metric::Mae);
        assert_eq!(config.tournament_size, 4);
        assert_eq!(config.parents_per_generation(), 50);
        assert!(!config.parallel);
    }

    #[test]
    fn test_validate_ok() {
        assert!(SrConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_population_too_small() {
        assert!(SrConfig::default().with_population_size(1).validate().is_err());
    }

    #[test]
    fn test_validate_zero_generations_allowed() {
        // Zero generations returns the scored initial population.
        assert!(SrConfig::default().with_max_generations(0).validate().is_ok());
    }

    #[test]
    fn test_validate_empty_functions() {
        let empty: [&str; 0] = [];
        assert!(SrConfig::default().with_functions(&empty).validate().is_err());
    }

    #[test]
    fn test_validate_depth_ranges() {
        assert!(SrConfig::default().with_init_depth(5, 2).validate().is_err());
        assert!(SrConfig::default().with_depth_limits(4, 3).validate().is_err());
        assert!(SrConfig::default()
            .with_init_depth(2, 3)
            .with_depth_limits(5, 9)
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_const_range() {
        assert!(SrConfig::default()
            .with_const_range(Some((1.0, -1.0)))
            .validate()
            .is_err());
        assert!(SrConfig::default()
            .with_const_range(Some((f64::NEG_INFINITY, 0.0)))
            .validate()
            .is_err());
    }

    #[test]
    fn test_validate_probability_sum() {
        let config = SrConfig::default().with_operator_probabilities(0.7, 0.2, 0.2, 0.0);
        assert!(config.validate().is_err());

        let config = SrConfig::default().with_operator_probabilities(0.7, 0.1, 0.1, 0.1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_clamp_probabilities() {
        let config = SrConfig::default()
            .with_operator_probabilities(1.5, -0.5, 0.0, 0.0)
            .with_p_point_replace(2.0);
        assert_eq!(config.p_crossover, 1.0);
        assert_eq!(config.p_subtree_mutation, 0.0);
        assert_eq!(config.p_point_replace, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_tournament_and_selection() {
        assert!(SrConfig::default().with_tournament_size(0).validate().is_err());
        assert!(SrConfig::default().with_num_selected(0).validate().is_err());
        assert!(SrConfig::default().with_max_build_attempts(0).validate().is_err());
    }
}
