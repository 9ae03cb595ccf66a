//! Main evolution loop for genetic programming.
//!
//! This module orchestrates the generational process: random initialization,
//! then repeated selection, crossover, mutation and scoring. The previous
//! generation's best program replaces the new worst one when it scores
//! higher. The population size is checked after every operator phase and the
//! wall-clock budget is checked after every generation.
//!
//! ```text
//! Init ─► Score ─► ┌─► Select ─► Crossover ─► Mutate ─► Score ─► Elite ─┐ ─► Done
//!                  └──────────────────────── g < G ─────────────────────┘
//! ```

use crate::error::{ConfigError, EvolutionError};
use crate::gp::crossover::{CrossoverConfig, crossover_population};
use crate::gp::fitness::{Evaluator, FitnessConfig, evaluate_population};
use crate::gp::mutation::{MutationConfig, mutate_population};
use crate::gp::program::Program;
use crate::gp::selection::{SelectionStats, select};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Configuration for the evolution process.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvolutionConfig {
    /// Statements in each initial random program.
    pub statements_per_program: usize,
    /// Number of generations to run.
    pub generations: usize,
    /// Population size, held constant across generations.
    pub population_size: usize,
    /// RNG seed for reproducibility; drawn from entropy when unset.
    pub seed: Option<u64>,
    /// Wall-clock budget for the whole run, in seconds.
    pub time_limit_secs: u64,
    /// Fitness weights.
    pub fitness: FitnessConfig,
    /// Crossover configuration.
    pub crossover: CrossoverConfig,
    /// Mutation configuration.
    pub mutation: MutationConfig,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            statements_per_program: 1,
            generations: 10,
            population_size: 10,
            seed: None,
            time_limit_secs: 3600,
            fitness: FitnessConfig::default(),
            crossover: CrossoverConfig::default(),
            mutation: MutationConfig::default(),
        }
    }
}

impl EvolutionConfig {
    /// Check counts and probabilities before a run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotPositive`] for a zero count and
    /// [`ConfigError::RateOutOfRange`] for a probability outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("statements_per_program", self.statements_per_program),
            ("generations", self.generations),
            ("population_size", self.population_size),
        ] {
            if value == 0 {
                return Err(ConfigError::NotPositive { name });
            }
        }

        let rates = std::iter::once(("crossover.crossover_rate", self.crossover.crossover_rate))
            .chain(self.mutation.rates());
        for (name, value) in rates {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }

    /// The wall-clock budget.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::from_secs(self.time_limit_secs)
    }
}

/// Statistics for a single generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationStats {
    /// Generation number; 0 is the initial population.
    pub generation: usize,
    /// Best score in this generation.
    pub best_score: f64,
    /// Mean score.
    pub mean_score: f64,
    /// Worst score.
    pub worst_score: f64,
    /// Score standard deviation.
    pub score_std: f64,
    /// Programs whose evaluation failed this generation.
    pub evaluation_failures: usize,
}

impl GenerationStats {
    fn new(generation: usize, population: &[Program], evaluation_failures: usize) -> Self {
        let stats = SelectionStats::from_population(population);
        Self {
            generation,
            best_score: stats.best_score,
            mean_score: stats.mean_score,
            worst_score: stats.worst_score,
            score_std: stats.score_std,
            evaluation_failures,
        }
    }
}

/// Overall statistics from an evolution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionStats {
    /// Seed the run used.
    pub seed: u64,
    /// Statistics per generation, starting with the initial population.
    pub generations: Vec<GenerationStats>,
    /// Best score seen in any generation.
    pub best_score: f64,
    /// Generation where the best score was first reached.
    pub best_generation: usize,
    /// Total time in seconds.
    pub elapsed_seconds: f64,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct EvolutionOutcome {
    /// Highest-scoring program of the final generation.
    pub best: Program,
    /// Run statistics.
    pub stats: EvolutionStats,
}

/// Verify that an operator phase kept the population at its target size.
///
/// # Errors
///
/// Returns [`EvolutionError::PopulationTooSmall`] or
/// [`EvolutionError::PopulationTooLarge`] naming the phase.
pub fn check_population_size(
    actual: usize,
    expected: usize,
    phase: &'static str,
) -> Result<(), EvolutionError> {
    match actual.cmp(&expected) {
        Ordering::Less => Err(EvolutionError::PopulationTooSmall {
            phase,
            expected,
            actual,
        }),
        Ordering::Greater => Err(EvolutionError::PopulationTooLarge {
            phase,
            expected,
            actual,
        }),
        Ordering::Equal => Ok(()),
    }
}

/// Put `elite` in place of the worst program when it scores higher.
///
/// `population` must be sorted ascending by score; it stays sorted. The
/// elite keeps its score, so the best score never drops between
/// generations.
fn keep_elite(population: &mut [Program], elite: Program) {
    let Some(worst) = population.first_mut() else {
        return;
    };
    if elite.score() > worst.score() {
        *worst = elite;
        population.sort_by(Program::cmp_score);
    }
}

/// Run the evolution process.
///
/// # Errors
///
/// See [`evolve_with`].
pub fn evolve<E: Evaluator + ?Sized>(
    config: &EvolutionConfig,
    evaluator: &E,
) -> Result<EvolutionOutcome, EvolutionError> {
    evolve_with(config, evaluator, |_| {})
}

/// Run the evolution process, reporting each finished generation.
///
/// `on_generation` is called once per generation, after scoring.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, if an operator phase
/// changes the population size, or if the time budget runs out. Evaluation
/// failures of individual programs are not errors; they are counted in the
/// generation statistics.
pub fn evolve_with<E, F>(
    config: &EvolutionConfig,
    evaluator: &E,
    mut on_generation: F,
) -> Result<EvolutionOutcome, EvolutionError>
where
    E: Evaluator + ?Sized,
    F: FnMut(&GenerationStats),
{
    config.validate()?;
    let start_time = Instant::now();
    let target = config.population_size;

    let seed = config.seed.unwrap_or_else(rand::random);
    let mut rng = SmallRng::seed_from_u64(seed);
    info!(
        seed,
        statements = config.statements_per_program,
        generations = config.generations,
        population = target,
        "starting evolution"
    );

    let mut population: Vec<Program> = (0..target)
        .map(|_| Program::random(&mut rng, config.statements_per_program))
        .collect();
    let summary = evaluate_population(&mut population, evaluator);

    let initial = GenerationStats::new(0, &population, summary.failures);
    let mut best_score = initial.best_score;
    let mut best_generation = 0;
    let mut gen_stats = Vec::with_capacity(config.generations + 1);
    gen_stats.push(initial);

    for generation in 1..=config.generations {
        let elite = population.last().cloned();
        let pool = select(&population, target, &mut rng);
        check_population_size(pool.len(), target, "selection")?;

        let mut children = crossover_population(&pool, &config.crossover, &mut rng);
        check_population_size(children.len(), target, "crossover")?;

        mutate_population(&mut children, &config.mutation, &mut rng);
        check_population_size(children.len(), target, "mutation")?;

        let summary = evaluate_population(&mut children, evaluator);
        if let Some(elite) = elite {
            keep_elite(&mut children, elite);
        }
        check_population_size(children.len(), target, "elitism")?;
        population = children;

        let stats = GenerationStats::new(generation, &population, summary.failures);
        if stats.best_score > best_score {
            best_score = stats.best_score;
            best_generation = generation;
        }
        info!(
            generation,
            best = stats.best_score,
            mean = stats.mean_score,
            std = stats.score_std,
            failures = stats.evaluation_failures,
            "generation complete"
        );
        on_generation(&stats);
        gen_stats.push(stats);

        let elapsed = start_time.elapsed();
        if elapsed > config.time_limit() {
            return Err(EvolutionError::TimeBudgetExceeded {
                limit: config.time_limit(),
                generation,
            });
        }
    }

    // Scoring sorts ascending, so the best program is last.
    let best = population
        .pop()
        .ok_or(EvolutionError::PopulationTooSmall {
            phase: "evolution",
            expected: target,
            actual: 0,
        })?;
    let elapsed_seconds = start_time.elapsed().as_secs_f64();
    debug!(elapsed_seconds, best_score = best.score(), "evolution finished");

    Ok(EvolutionOutcome {
        best,
        stats: EvolutionStats {
            seed,
            generations: gen_stats,
            best_score,
            best_generation,
            elapsed_seconds,
        },
    })
}
