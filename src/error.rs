//! Error types for program evolution.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Invalid run parameters or configuration file.
///
/// Reported before a run starts; no population is built.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A count parameter that must be positive was zero.
    #[error("{name} must be a positive integer")]
    NotPositive {
        /// Parameter name.
        name: &'static str,
    },
    /// A probability parameter was outside `[0, 1]`.
    #[error("{name} must be between 0 and 1, got {value}")]
    RateOutOfRange {
        /// Parameter name.
        name: &'static str,
        /// Offending value.
        value: f64,
    },
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The configuration file was not valid JSON for the expected schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        source: serde_json::Error,
    },
}

/// Failure of the evaluation infrastructure for a single program.
///
/// These are recovered per individual: the program keeps its previous score
/// and diagnostic, and the run continues.
#[derive(Debug, Error)]
pub enum FitnessError {
    /// The scratch directory or source file could not be created or written.
    #[error("failed to write scratch source: {0}")]
    ScratchFile(#[source] std::io::Error),
    /// The compiler process could not be started.
    #[error("failed to launch compiler `{program}`: {source}")]
    CompilerLaunch {
        /// Compiler executable.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The compiler did not finish within its time budget and was killed.
    #[error("compiler exceeded timeout of {0:?}")]
    CompilerTimeout(Duration),
    /// The diagnostic stream could not be read to completion.
    #[error("failed to read compiler diagnostics: {0}")]
    DiagnosticRead(#[source] std::io::Error),
}

/// Fatal conditions that abort an evolution run.
#[derive(Debug, Error)]
pub enum EvolutionError {
    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A genetic operator phase shrank the population.
    #[error("population is too small after {phase}: {actual} < {expected}")]
    PopulationTooSmall {
        /// Phase that produced the population.
        phase: &'static str,
        /// Target population size.
        expected: usize,
        /// Actual population size.
        actual: usize,
    },
    /// A genetic operator phase grew the population.
    #[error("population is too large after {phase}: {actual} > {expected}")]
    PopulationTooLarge {
        /// Phase that produced the population.
        phase: &'static str,
        /// Target population size.
        expected: usize,
        /// Actual population size.
        actual: usize,
    },
    /// The wall-clock budget ran out between generations.
    #[error("exceeded the time limit of {limit:?} after generation {generation}")]
    TimeBudgetExceeded {
        /// Configured limit.
        limit: Duration,
        /// Last completed generation.
        generation: usize,
    },
}

/// A structural edit needed an existing statement but the program had none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("program has no statements")]
pub struct EmptyProgramError;
