// Allow unwrap and unreadable literals in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::unreadable_literal))]
//! Gencode: grammar-guided genetic programming over C-like token programs.
//!
//! Candidate programs are flat sequences of statements, each a flat sequence
//! of tokens drawn from a weighted random grammar. Fitness rewards length and
//! lexical diversity and penalises the verbosity of the diagnostics an
//! external compiler emits for the rendered source.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │         Evolution Controller        │
//! ├─────────────────────────────────────┤
//! │  Selection │ Crossover │ Mutation   │
//! ├─────────────────────────────────────┤
//! │  Fitness Evaluator → Compiler (ext) │
//! ├─────────────────────────────────────┤
//! │  Program → Statement → Token        │
//! ├─────────────────────────────────────┤
//! │     Token Grammar Generator         │
//! └─────────────────────────────────────┘
//! ```

pub mod error;
pub mod gp;

pub use error::{ConfigError, EmptyProgramError, EvolutionError, FitnessError};

// Re-export the core representation at crate root for convenience
pub use gp::{Program, Statement, Token};
