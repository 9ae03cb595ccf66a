//! Genetic programming over token-sequence programs.
//!
//! This module provides the complete evolutionary framework: the random
//! grammar, the program representation with its structural edit operations,
//! compiler-backed fitness evaluation, and the generational loop.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Loop              │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │         Fitness Evaluation          │
//! ├─────────────────────────────────────┤
//! │    Program → Compiler diagnostics   │
//! └─────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use gencode::gp::{evolve, EvolutionConfig, ExternalCompiler, FitnessEvaluator};
//!
//! let config = EvolutionConfig::default();
//! let evaluator = FitnessEvaluator::new(ExternalCompiler::default(), config.fitness);
//! let outcome = evolve(&config, &evaluator)?;
//! println!("{}", outcome.best);
//! # Ok::<(), gencode::EvolutionError>(())
//! ```

pub mod grammar;

mod compiler;
mod crossover;
mod evolution;
mod fitness;
mod mutation;
mod program;
mod selection;
mod statement;
mod token;

pub use compiler::{Compiler, CompilerConfig, ExternalCompiler};
pub use crossover::{CrossoverConfig, CrossoverKind, MatePolicy, crossover, crossover_population};
pub use evolution::{
    EvolutionConfig, EvolutionOutcome, EvolutionStats, GenerationStats, check_population_size,
    evolve, evolve_with,
};
pub use fitness::{
    EvaluationSummary, Evaluator, FitnessConfig, FitnessEvaluator, evaluate_population,
    normalize_diagnostic,
};
pub use mutation::{MutationConfig, mutate, mutate_population};
pub use program::{NOT_COMPILED, Program};
pub use selection::{SelectionStats, select, tournament_select};
pub use statement::Statement;
pub use token::Token;
