//! Mutation operators for genetic programming.
//!
//! Mutations grow programs with fresh grammar statements and duplicate
//! existing ones. Removal, swapping and token-level insertion are available
//! but disabled by default.

use crate::gp::program::Program;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Configuration for mutation operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MutationConfig {
    /// Probability of inserting a batch of random statements.
    pub insert_rate: f64,
    /// Exclusive upper bound on the size of an inserted batch.
    pub max_inserted_statements: usize,
    /// Probability of duplicating a random statement in place.
    pub duplicate_rate: f64,
    /// Probability of removing a random statement.
    pub remove_rate: f64,
    /// Probability of swapping two random statements.
    pub swap_rate: f64,
    /// Probability of inserting a random token into a random statement.
    pub token_insert_rate: f64,
}

impl Default for MutationConfig {
    fn default() -> Self {
        Self {
            insert_rate: 0.3,
            max_inserted_statements: 20,
            duplicate_rate: 0.4,
            remove_rate: 0.0,
            swap_rate: 0.0,
            token_insert_rate: 0.0,
        }
    }
}

impl MutationConfig {
    /// Named probability fields, for validation.
    #[must_use]
    pub fn rates(&self) -> [(&'static str, f64); 5] {
        [
            ("mutation.insert_rate", self.insert_rate),
            ("mutation.duplicate_rate", self.duplicate_rate),
            ("mutation.remove_rate", self.remove_rate),
            ("mutation.swap_rate", self.swap_rate),
            ("mutation.token_insert_rate", self.token_insert_rate),
        ]
    }
}

/// Mutate a program in place.
///
/// Nothing happens unless the program's own mutation probability allows it.
/// Removal never empties a program.
pub fn mutate<R: Rng>(program: &mut Program, config: &MutationConfig, rng: &mut R) {
    if !program.should_mutate(rng) {
        return;
    }

    if rng.gen_bool(config.insert_rate) {
        let count = rng.gen_range(0..config.max_inserted_statements.max(1));
        program.insert_random_statements(rng, count);
        trace!(count, "inserted statements");
    }

    // Duplication needs an existing statement; an empty program is skipped.
    if rng.gen_bool(config.duplicate_rate) && program.duplicate_random_statement(rng).is_ok() {
        trace!("duplicated statement");
    }

    if rng.gen_bool(config.remove_rate) && program.len() > 1 {
        program.remove_random_statement(rng);
    }

    if rng.gen_bool(config.swap_rate) {
        let _ = program.swap_random(rng);
    }

    if rng.gen_bool(config.token_insert_rate) && !program.is_empty() {
        let index = rng.gen_range(0..program.len());
        if let Some(statement) = program.statement_mut(index) {
            statement.insert_random_token(rng);
        }
    }
}

/// Mutate every program of a population in place.
pub fn mutate_population<R: Rng>(population: &mut [Program], config: &MutationConfig, rng: &mut R) {
    for program in population {
        mutate(program, config, rng);
    }
}
