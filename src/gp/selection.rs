//! Selection operators for genetic programming.
//!
//! Survivors are picked by binary tournaments: two uniform draws with
//! replacement, the fitter one wins. Selection alone never changes the
//! population size.

// Selection uses intentional casts for statistics
#![allow(clippy::cast_precision_loss)]

use crate::gp::program::Program;
use rand::Rng;
use serde::Serialize;

/// Binary tournament: index of the winner of two uniform draws.
///
/// The first draw wins only when its score is strictly greater; ties go to
/// the second. Returns `None` for an empty population.
pub fn tournament_select<R: Rng>(population: &[Program], rng: &mut R) -> Option<usize> {
    if population.is_empty() {
        return None;
    }
    let first = rng.gen_range(0..population.len());
    let second = rng.gen_range(0..population.len());
    if population[first].score() > population[second].score() {
        Some(first)
    } else {
        Some(second)
    }
}

/// Run `n` tournaments and return copies of the winners.
///
/// Winners keep their score and diagnostic.
pub fn select<R: Rng>(population: &[Program], n: usize, rng: &mut R) -> Vec<Program> {
    (0..n)
        .filter_map(|_| tournament_select(population, rng))
        .map(|winner| population[winner].clone())
        .collect()
}

/// Summary of a population's scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SelectionStats {
    /// Mean score.
    pub mean_score: f64,
    /// Best score.
    pub best_score: f64,
    /// Worst score.
    pub worst_score: f64,
    /// Population standard deviation of the scores.
    pub score_std: f64,
}

impl SelectionStats {
    /// Calculate statistics from raw scores; all zero when empty.
    #[must_use]
    pub fn from_scores(scores: &[f64]) -> Self {
        if scores.is_empty() {
            return Self::default();
        }

        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        let best = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let worst = scores.iter().copied().fold(f64::INFINITY, f64::min);
        let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / scores.len() as f64;

        Self {
            mean_score: mean,
            best_score: best,
            worst_score: worst,
            score_std: variance.sqrt(),
        }
    }

    /// Calculate statistics over a population.
    #[must_use]
    pub fn from_population(population: &[Program]) -> Self {
        let scores: Vec<f64> = population.iter().map(Program::score).collect();
        Self::from_scores(&scores)
    }
}
