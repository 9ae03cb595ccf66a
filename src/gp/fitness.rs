//! Fitness evaluation for generated programs.
//!
//! A program earns points for size and token diversity, then loses points
//! for every word the compiler prints about it. Programs that compile
//! cleanly while staying long and varied score highest.

// Token and character counts stay far below 2^52.
#![allow(clippy::cast_precision_loss)]

use crate::error::FitnessError;
use crate::gp::compiler::Compiler;
use crate::gp::program::Program;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Weights of the fitness function.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessConfig {
    /// Weight per diagnostic word; its magnitude is subtracted.
    pub error_word_penalty: f64,
    /// Bonus per distinct whitespace-delimited word of the rendered program.
    pub unique_word_bonus: f64,
    /// Bonus per token.
    pub length_word_bonus: f64,
    /// Bonus per rendered character, ignoring whitespace and `;`.
    pub length_char_bonus: f64,
}

impl Default for FitnessConfig {
    fn default() -> Self {
        Self {
            error_word_penalty: -1.0,
            unique_word_bonus: 2.0,
            length_word_bonus: 1.0,
            length_char_bonus: 0.1,
        }
    }
}

impl FitnessConfig {
    /// Score earned by the rendered program before compiling.
    #[must_use]
    pub fn base_score(&self, program: &Program, rendered: &str) -> f64 {
        let chars = rendered
            .chars()
            .filter(|c| !c.is_whitespace() && *c != ';')
            .count();
        let unique_words: HashSet<&str> = rendered.split_whitespace().collect();

        self.length_word_bonus * program.token_count() as f64
            + self.length_char_bonus * chars as f64
            + self.unique_word_bonus * unique_words.len() as f64
    }

    /// Points lost for a normalized diagnostic.
    #[must_use]
    pub fn penalty(&self, diagnostic: &str) -> f64 {
        self.error_word_penalty.abs() * diagnostic.split_whitespace().count() as f64
    }
}

/// Normalize raw compiler output: trim lines, drop blank ones, join with `\n`.
#[must_use]
pub fn normalize_diagnostic(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Scores a single program.
///
/// The evolution loop depends only on this trait, so tests can substitute a
/// deterministic scorer for the compiler-backed one.
pub trait Evaluator: Sync {
    /// Score `program`, storing the score (and any diagnostic) on it.
    ///
    /// # Errors
    ///
    /// Returns an error when the program could not be evaluated; the program
    /// must then be left unchanged.
    fn evaluate(&self, program: &mut Program) -> Result<f64, FitnessError>;
}

/// Compiler-backed evaluator.
#[derive(Debug, Clone)]
pub struct FitnessEvaluator<C> {
    compiler: C,
    config: FitnessConfig,
}

impl<C: Compiler> FitnessEvaluator<C> {
    /// Create an evaluator from a compiler and fitness weights.
    #[must_use]
    pub fn new(compiler: C, config: FitnessConfig) -> Self {
        Self { compiler, config }
    }

    /// The compiler in use.
    #[must_use]
    pub fn compiler(&self) -> &C {
        &self.compiler
    }

    /// The fitness weights in use.
    #[must_use]
    pub fn config(&self) -> &FitnessConfig {
        &self.config
    }
}

impl<C: Compiler> Evaluator for FitnessEvaluator<C> {
    fn evaluate(&self, program: &mut Program) -> Result<f64, FitnessError> {
        let rendered = program.to_string();
        let base = self.config.base_score(program, &rendered);

        let diagnostic = normalize_diagnostic(&self.compiler.compile(&rendered)?);
        let score = base - self.config.penalty(&diagnostic);
        debug!(score, diagnostic_len = diagnostic.len(), "evaluated program");

        program.set_diagnostic(diagnostic);
        program.set_score(score);
        Ok(score)
    }
}

/// Outcome of scoring a whole population.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationSummary {
    /// Programs scored successfully.
    pub evaluated: usize,
    /// Programs whose evaluation failed and kept their previous state.
    pub failures: usize,
}

/// Score every program in parallel, then sort ascending by score.
///
/// Failures are logged and counted; they never stop the batch. The sort is
/// stable, so programs with equal scores keep their relative order.
pub fn evaluate_population<E: Evaluator + ?Sized>(
    population: &mut [Program],
    evaluator: &E,
) -> EvaluationSummary {
    let failures = population
        .par_iter_mut()
        .map(|program| match evaluator.evaluate(program) {
            Ok(_) => 0,
            Err(e) => {
                warn!(error = %e, "program evaluation failed; keeping previous score");
                1
            }
        })
        .sum::<usize>();

    population.sort_by(Program::cmp_score);

    EvaluationSummary {
        evaluated: population.len() - failures,
        failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gp::program::NOT_COMPILED;
    use crate::gp::statement::Statement;
    use std::io;

    struct FixedCompiler(&'static str);

    impl Compiler for FixedCompiler {
        fn compile(&self, _source: &str) -> Result<String, FitnessError> {
            Ok(self.0.to_string())
        }
    }

    struct BrokenScratch;

    impl Compiler for BrokenScratch {
        fn compile(&self, _source: &str) -> Result<String, FitnessError> {
            Err(FitnessError::ScratchFile(io::Error::other("disk full")))
        }
    }

    /// Fails for programs containing `poison`, scores the rest by length.
    struct Picky;

    impl Evaluator for Picky {
        fn evaluate(&self, program: &mut Program) -> Result<f64, FitnessError> {
            if program.contains_token("poison") {
                return Err(FitnessError::ScratchFile(io::Error::other("nope")));
            }
            let score = program.len() as f64;
            program.set_score(score);
            Ok(score)
        }
    }

    fn program(lines: &[&str]) -> Program {
        lines
            .iter()
            .map(|l| l.split_whitespace().collect::<Statement>())
            .collect()
    }

    #[test]
    fn test_clean_compile_score() {
        let evaluator = FitnessEvaluator::new(FixedCompiler(""), FitnessConfig::default());
        let mut p = program(&["x = 1 ;"]);
        let score = evaluator.evaluate(&mut p).unwrap();
        // 4 tokens, "intmain(){x=1}" is 14 chars, 7 distinct words.
        assert!((score - (4.0 + 1.4 + 14.0)).abs() < 1e-9);
        assert!((p.score() - score).abs() < f64::EPSILON);
        assert_eq!(p.diagnostic(), "");
    }

    #[test]
    fn test_diagnostic_words_are_penalized() {
        let evaluator = FitnessEvaluator::new(
            FixedCompiler("  main.cpp: error: bad\n\n   thing  \n"),
            FitnessConfig::default(),
        );
        let mut p = program(&["x = 1 ;"]);
        let score = evaluator.evaluate(&mut p).unwrap();
        assert!((score - (19.4 - 4.0)).abs() < 1e-9);
        assert_eq!(p.diagnostic(), "main.cpp: error: bad\nthing");
    }

    #[test]
    fn test_scratch_failure_leaves_program_untouched() {
        let evaluator = FitnessEvaluator::new(BrokenScratch, FitnessConfig::default());
        let mut p = program(&["x = 1 ;"]);
        p.set_score(7.5);
        assert!(evaluator.evaluate(&mut p).is_err());
        assert!((p.score() - 7.5).abs() < f64::EPSILON);
        assert_eq!(p.diagnostic(), NOT_COMPILED);
    }

    #[test]
    fn test_normalize_diagnostic() {
        assert_eq!(normalize_diagnostic(""), "");
        assert_eq!(normalize_diagnostic(" \n\t\n"), "");
        assert_eq!(normalize_diagnostic("a \n\n b"), "a\nb");
    }

    #[test]
    fn test_population_sorted_ascending() {
        let mut population = vec![program(&["a", "b", "c"]), program(&["a"]), program(&["a", "b"])];
        let summary = evaluate_population(&mut population, &Picky);
        assert_eq!(summary, EvaluationSummary { evaluated: 3, failures: 0 });
        let lens: Vec<usize> = population.iter().map(Program::len).collect();
        assert_eq!(lens, [1, 2, 3]);
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let mut poisoned = program(&["poison", "x", "y", "z", "w"]);
        poisoned.set_score(-1.0);
        let mut population = vec![program(&["a", "b"]), poisoned, program(&["a"])];

        let summary = evaluate_population(&mut population, &Picky);
        assert_eq!(summary.failures, 1);
        assert_eq!(summary.evaluated, 2);

        // The failed program kept its old score and sorts first.
        assert!(population[0].contains_token("poison"));
        assert!((population[0].score() + 1.0).abs() < f64::EPSILON);
        assert_eq!(population[0].diagnostic(), NOT_COMPILED);
        assert!((population[2].score() - 2.0).abs() < f64::EPSILON);
    }
}
