//! Evolutionary loop execution.
//!
//! [`Evolution`] is the explicit state machine behind a run:
//!
//! ```text
//! Init -> Evaluate -> Rank -> { Select -> Vary -> Evaluate offspring -> Survive -> Observe } x N
//! ```
//!
//! [`SrRunner`] drives it to completion and packages an [`SrResult`].
//!
//! # Random Draw Order
//!
//! All randomness comes from one seeded generator. Initialization draws
//! the trees one after another (see [`init`](super::init)). Each
//! generation then draws, in this order:
//!
//! 1. `num_selected` tournaments, each sampling `tournament_size`
//!    distinct indices;
//! 2. for each consecutive pair of selected parents, one draw for the
//!    operator band followed by the operator's draws for the first child
//!    and then the second.
//!
//! An odd last parent is left unpaired. Evaluation and survival consume no
//! randomness, and evaluation results are stored by population index, so
//! parallel evaluation cannot change the outcome.

use super::config::SrConfig;
use super::fitness::Evaluator;
use super::functions::FunctionSet;
use super::init::initialize_population;
use super::multi_objective::survive;
use super::observer::{Champion, GenerationStats, LogObserver, Observer};
use super::operators::Pipeline;
use super::selection::Tournament;
use super::space::TreeSpace;
use super::types::Individual;
use crate::data::Dataset;
use crate::error::{Result, SrError};
use crate::random::{create_rng, fresh_seed};
use log::{debug, info};
use rand::rngs::StdRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of a symbolic regression run.
#[derive(Debug, Clone)]
pub struct SrResult {
    /// Final population, ranked.
    pub population: Vec<Individual>,

    /// First Pareto front of the final population, sorted by complexity
    /// and then error.
    pub pareto_front: Vec<Individual>,

    /// Number of generations executed after initialization.
    pub generations: usize,

    /// Total fitness evaluations, initial population included.
    pub evaluations: usize,

    /// Whether the run was cancelled externally.
    pub cancelled: bool,

    /// One summary per generation, starting with generation 0.
    pub history: Vec<GenerationStats>,

    /// Function set the trees refer to.
    pub functions: FunctionSet,

    /// Feature column names used when rendering.
    pub feature_names: Vec<String>,

    /// Seed the run used.
    pub seed: u64,
}

impl SrResult {
    /// Renders an individual's tree with the dataset's column names.
    pub fn render(&self, individual: &Individual) -> String {
        individual
            .tree
            .display(&self.functions, Some(&self.feature_names))
            .to_string()
    }

    /// The Pareto front as rendered formulas with their objectives.
    pub fn front_champions(&self) -> Vec<Champion> {
        self.pareto_front
            .iter()
            .map(|ind| Champion::from_individual(ind, &self.functions, Some(&self.feature_names)))
            .collect()
    }
}

/// The evolving state of one run.
///
/// # Examples
///
/// ```
/// use u_symreg::data::Dataset;
/// use u_symreg::gp::{Evolution, SrConfig};
///
/// let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
/// let target: Vec<f64> = (0..10).map(|i| 3.0 * i as f64).collect();
/// let data = Dataset::new(rows, target).unwrap();
/// let config = SrConfig::default()
///     .with_population_size(20)
///     .with_max_generations(3)
///     .with_seed(1);
///
/// let mut evolution = Evolution::new(&data, &config).unwrap();
/// while !evolution.is_finished() {
///     evolution.step();
/// }
/// assert_eq!(evolution.generation(), 3);
/// assert_eq!(evolution.population().len(), 20);
/// ```
pub struct Evolution<'a> {
    dataset: &'a Dataset,
    config: &'a SrConfig,
    space: TreeSpace,
    pipeline: Pipeline,
    tournament: Tournament,
    rng: StdRng,
    seed: u64,
    generation: usize,
    evaluations: usize,
    population: Vec<Individual>,
    history: Vec<GenerationStats>,
}

impl<'a> Evolution<'a> {
    /// Builds, evaluates and ranks the initial population.
    ///
    /// Fails on an invalid configuration, an unknown function name, a
    /// dataset without usable terminals, or when no valid tree can be
    /// built within `max_build_attempts`.
    pub fn new(dataset: &'a Dataset, config: &'a SrConfig) -> Result<Self> {
        config.validate().map_err(SrError::InvalidConfig)?;
        let space = TreeSpace::from_config(config, dataset.n_features())?;

        let seed = config.seed.unwrap_or_else(fresh_seed);
        info!(
            "Starting run: seed {}, population {}, generations {}, functions {:?}",
            seed, config.population_size, config.max_generations, config.functions
        );
        let mut rng = create_rng(seed);

        let mut population = initialize_population(&space, config.population_size, &mut rng)?;
        let evaluations = Evaluator::new(dataset, &space.functions, config.metric)
            .with_parallel(config.parallel)
            .evaluate(&mut population);
        let population = survive(population, config.population_size);

        let mut evolution = Self {
            dataset,
            config,
            pipeline: Pipeline::from_config(config),
            tournament: Tournament::new(config.tournament_size),
            space,
            rng,
            seed,
            generation: 0,
            evaluations,
            population,
            history: Vec::new(),
        };
        evolution.record(0);
        Ok(evolution)
    }

    /// Runs one generation: select, vary, evaluate offspring, survive.
    pub fn step(&mut self) {
        let parents = self.tournament.select_many(
            &self.population,
            self.config.parents_per_generation(),
            &mut self.rng,
        );

        let mut offspring = Vec::with_capacity(parents.len());
        for pair in parents.chunks_exact(2) {
            let children = self.pipeline.vary(
                &self.population[pair[0]].tree,
                &self.population[pair[1]].tree,
                &self.space,
                &mut self.rng,
            );
            offspring.extend(children.into_iter().map(Individual::new));
        }
        let produced = offspring.len();
        if produced < parents.len() {
            debug!(
                "Generation {}: {} offspring from {} parents",
                self.generation + 1,
                produced,
                parents.len()
            );
        }

        self.evaluations += Evaluator::new(self.dataset, &self.space.functions, self.config.metric)
            .with_parallel(self.config.parallel)
            .evaluate(&mut offspring);

        let mut pool = std::mem::take(&mut self.population);
        pool.extend(offspring);
        self.population = survive(pool, self.config.population_size);
        self.generation += 1;
        self.record(produced);
    }

    fn record(&mut self, offspring: usize) {
        if let Some(stats) = GenerationStats::collect(
            self.generation,
            self.evaluations,
            offspring,
            &self.population,
            &self.space.functions,
            Some(self.dataset.feature_names()),
        ) {
            self.history.push(stats);
        }
    }

    /// Whether the generation budget is spent.
    pub fn is_finished(&self) -> bool {
        self.generation >= self.config.max_generations
    }

    /// Generations executed so far.
    pub fn generation(&self) -> usize {
        self.generation
    }

    /// Current ranked population.
    pub fn population(&self) -> &[Individual] {
        &self.population
    }

    /// Summary of the latest generation.
    pub fn latest_stats(&self) -> Option<&GenerationStats> {
        self.history.last()
    }

    /// Seed in use.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Packages the current state.
    pub fn into_result(self, cancelled: bool) -> SrResult {
        let mut pareto_front: Vec<Individual> = self
            .population
            .iter()
            .filter(|ind| ind.rank == 0)
            .cloned()
            .collect();
        pareto_front.sort_by(|a, b| {
            a.fitness
                .complexity
                .cmp(&b.fitness.complexity)
                .then(a.fitness.error.total_cmp(&b.fitness.error))
        });

        SrResult {
            population: self.population,
            pareto_front,
            generations: self.generation,
            evaluations: self.evaluations,
            cancelled,
            history: self.history,
            functions: self.space.functions,
            feature_names: self.dataset.feature_names().to_vec(),
            seed: self.seed,
        }
    }
}

/// Executes a symbolic regression run.
///
/// # Usage
///
/// ```
/// use u_symreg::data::Dataset;
/// use u_symreg::gp::{SrConfig, SrRunner};
///
/// let rows: Vec<Vec<f64>> = (0..20).map(|i| vec![i as f64 / 10.0]).collect();
/// let target: Vec<f64> = rows.iter().map(|r| r[0] * r[0]).collect();
/// let data = Dataset::new(rows, target).unwrap();
///
/// let config = SrConfig::default()
///     .with_population_size(50)
///     .with_max_generations(5)
///     .with_functions(&["add", "sub", "mul"])
///     .with_seed(42);
/// let result = SrRunner::run(&data, &config).unwrap();
/// assert!(!result.pareto_front.is_empty());
/// for ind in &result.pareto_front {
///     println!("{} -> {:.4}", result.render(ind), ind.fitness.error);
/// }
/// ```
pub struct SrRunner;

impl SrRunner {
    /// Runs to completion, logging each generation.
    pub fn run(dataset: &Dataset, config: &SrConfig) -> Result<SrResult> {
        Self::run_with_cancel(dataset, config, None)
    }

    /// Runs to completion, reporting each generation to `observer`.
    pub fn run_with_observer<O: Observer>(
        dataset: &Dataset,
        config: &SrConfig,
        observer: &mut O,
    ) -> Result<SrResult> {
        Self::drive(dataset, config, observer, None)
    }

    /// Runs with an optional cancellation token.
    ///
    /// If `cancel` is `Some` and the flag is set to `true`, the run stops
    /// before the next generation starts and returns the current state.
    pub fn run_with_cancel(
        dataset: &Dataset,
        config: &SrConfig,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SrResult> {
        Self::drive(dataset, config, &mut LogObserver, cancel)
    }

    fn drive<O: Observer>(
        dataset: &Dataset,
        config: &SrConfig,
        observer: &mut O,
        cancel: Option<Arc<AtomicBool>>,
    ) -> Result<SrResult> {
        let mut evolution = Evolution::new(dataset, config)?;
        if let Some(stats) = evolution.latest_stats() {
            observer.on_generation(stats);
        }

        let mut cancelled = false;
        while !evolution.is_finished() {
            if let Some(ref flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    cancelled = true;
                    info!("Run cancelled after {} generations", evolution.generation());
                    break;
                }
            }
            evolution.step();
            if let Some(stats) = evolution.latest_stats() {
                observer.on_generation(stats);
            }
        }

        Ok(evolution.into_result(cancelled))
    }
}

// ============================================================================
// Tests
// ============================================================================
