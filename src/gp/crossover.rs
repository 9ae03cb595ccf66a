//! Crossover operators for genetic programming.
//!
//! Crossover combines statements from two parent programs into one child.
//! Every child starts unevaluated; only the statement list is inherited
//! (plus the first parent's operator probabilities).

use crate::gp::program::Program;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the second parent of each child is chosen from the selection pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatePolicy {
    /// Any other member of the pool, uniformly.
    #[default]
    Random,
    /// The next member of the pool, wrapping around.
    Adjacent,
}

/// How two parents are recombined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverKind {
    /// Prefix of the first parent joined to a suffix of the second.
    #[default]
    OnePoint,
    /// Statements alternated between the parents.
    Interleave,
    /// Head of a random split of the first parent joined to the tail of a
    /// random split of the second.
    Split,
}

/// Configuration for crossover operations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossoverConfig {
    /// Probability of recombining (vs. copying the first parent).
    pub crossover_rate: f64,
    /// How mates are paired.
    pub mate_policy: MatePolicy,
    /// Recombination operator.
    pub kind: CrossoverKind,
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            crossover_rate: 0.9,
            mate_policy: MatePolicy::Random,
            kind: CrossoverKind::OnePoint,
        }
    }
}

/// Produce one child from two parents.
///
/// Recombination happens with probability `crossover_rate`, further gated by
/// the first parent's own crossover probability. Otherwise, or when the
/// recombined child would be empty, the child copies the first parent.
#[must_use]
pub fn crossover<R: Rng>(
    parent1: &Program,
    parent2: &Program,
    config: &CrossoverConfig,
    rng: &mut R,
) -> Program {
    if !rng.gen_bool(config.crossover_rate) || !parent1.should_crossover(rng) {
        return parent1.offspring();
    }

    let child = match config.kind {
        CrossoverKind::OnePoint => one_point(parent1, parent2, rng),
        CrossoverKind::Interleave => parent1.with_statements(
            Program::interleave(parent1, parent2).into_statements(),
        ),
        CrossoverKind::Split => {
            let (head, _) = Program::split(parent1, rng);
            let (_, tail) = Program::split(parent2, rng);
            let mut statements = head.into_statements();
            statements.extend(tail.into_statements());
            parent1.with_statements(statements)
        }
    };

    if child.is_empty() {
        parent1.offspring()
    } else {
        child
    }
}

/// One-point crossover on statements.
fn one_point<R: Rng>(parent1: &Program, parent2: &Program, rng: &mut R) -> Program {
    let point1 = rng.gen_range(0..=parent1.len());
    let point2 = rng.gen_range(0..=parent2.len());

    let mut statements = parent1.statements()[..point1].to_vec();
    statements.extend_from_slice(&parent2.statements()[point2..]);
    parent1.with_statements(statements)
}

/// Index of the mate for pool member `index`.
fn mate_index<R: Rng>(index: usize, pool_size: usize, policy: MatePolicy, rng: &mut R) -> usize {
    if pool_size < 2 {
        return index;
    }
    match policy {
        MatePolicy::Adjacent => (index + 1) % pool_size,
        MatePolicy::Random => {
            let other = rng.gen_range(0..pool_size - 1);
            if other >= index { other + 1 } else { other }
        }
    }
}

/// Produce one child per pool member, pairing each with a mate.
///
/// The output has exactly as many programs as the pool.
#[must_use]
pub fn crossover_population<R: Rng>(
    pool: &[Program],
    config: &CrossoverConfig,
    rng: &mut R,
) -> Vec<Program> {
    let children: Vec<Program> = pool
        .iter()
        .enumerate()
        .map(|(i, parent)| {
            let mate = mate_index(i, pool.len(), config.mate_policy, rng);
            crossover(parent, &pool[mate], config, rng)
        })
        .collect();
    debug!(children = children.len(), kind = ?config.kind, "crossover complete");
    children
}
