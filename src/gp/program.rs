//! Program representation: an ordered list of statements wrapped in `main`.
//!
//! A program also carries its fitness state (score and last compiler
//! diagnostic) and its own mutation and crossover probabilities.
//!
//! ```text
//! int main(){
//!    <statement 0>
//!    <statement 1>
//!    ...
//! }
//! ```

// Statement counts stay far below 2^52, so averaging through f64 is exact.
#![allow(clippy::cast_precision_loss)]

use crate::error::EmptyProgramError;
use crate::gp::grammar;
use crate::gp::statement::Statement;
use crate::gp::token::Token;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Diagnostic held by a program that has never been evaluated.
pub const NOT_COMPILED: &str = "not compiled yet";

/// A candidate program and its fitness state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    statements: Vec<Statement>,
    score: f64,
    diagnostic: String,
    mutation_probability: f64,
    crossover_probability: f64,
}

impl Default for Program {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl Program {
    /// Create an unevaluated program from statements.
    #[must_use]
    pub fn new(statements: Vec<Statement>) -> Self {
        Self {
            statements,
            score: 0.0,
            diagnostic: NOT_COMPILED.to_string(),
            mutation_probability: 1.0,
            crossover_probability: 1.0,
        }
    }

    /// Create a random program with exactly `k` statements.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R, k: usize) -> Self {
        grammar::make_random_program(rng, k)
    }

    /// Copy of the statements and operator probabilities with fresh fitness
    /// state.
    #[must_use]
    pub fn offspring(&self) -> Self {
        self.with_statements(self.statements.clone())
    }

    /// Unevaluated program holding `statements` and this program's operator
    /// probabilities.
    #[must_use]
    pub fn with_statements(&self, statements: Vec<Statement>) -> Self {
        Self {
            mutation_probability: self.mutation_probability,
            crossover_probability: self.crossover_probability,
            ..Self::new(statements)
        }
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.statements.len().saturating_sub(1))
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// Number of statements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the program has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// All statements in order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Consume the program, returning its statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }

    /// Statement at `index`, clamped into range.
    #[must_use]
    pub fn statement(&self, index: usize) -> Option<&Statement> {
        self.statements.get(self.clamp_index(index))
    }

    /// Mutable statement at `index`, clamped into range.
    pub fn statement_mut(&mut self, index: usize) -> Option<&mut Statement> {
        let index = self.clamp_index(index);
        self.statements.get_mut(index)
    }

    /// Copies of the statements in `[low, high)`, with both bounds clamped.
    #[must_use]
    pub fn range(&self, low: usize, high: usize) -> Vec<Statement> {
        let low = self.clamp_index(low);
        let high = high.min(self.statements.len());
        if low >= high {
            return Vec::new();
        }
        self.statements[low..high].to_vec()
    }

    // ------------------------------------------------------------------
    // Insertion
    // ------------------------------------------------------------------

    /// Append a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Insert a statement; out-of-range indices append.
    pub fn insert(&mut self, index: usize, statement: Statement) {
        let index = index.min(self.statements.len());
        self.statements.insert(index, statement);
    }

    /// Append several statements.
    pub fn extend<I: IntoIterator<Item = Statement>>(&mut self, statements: I) {
        self.statements.extend(statements);
    }

    /// Insert several statements at `index`; out-of-range indices append.
    pub fn insert_all<I: IntoIterator<Item = Statement>>(&mut self, index: usize, statements: I) {
        let index = index.min(self.statements.len());
        self.statements.splice(index..index, statements);
    }

    /// Insert one random grammar statement at a random position.
    pub fn insert_random_statement<R: Rng>(&mut self, rng: &mut R) {
        let index = rng.gen_range(0..=self.statements.len());
        let statement = grammar::random_statement(rng);
        self.statements.insert(index, statement);
    }

    /// Insert `n` random grammar statements, each at its own random position.
    pub fn insert_random_statements<R: Rng>(&mut self, rng: &mut R, n: usize) {
        for _ in 0..n {
            self.insert_random_statement(rng);
        }
    }

    // ------------------------------------------------------------------
    // Random extraction and filtering
    // ------------------------------------------------------------------

    /// A uniformly chosen statement.
    pub fn random_statement<R: Rng>(&self, rng: &mut R) -> Option<&Statement> {
        self.statements.choose(rng)
    }

    /// Copies of a contiguous run starting at a random index; may be empty.
    pub fn random_run<R: Rng>(&self, rng: &mut R) -> Vec<Statement> {
        if self.statements.is_empty() {
            return Vec::new();
        }
        let start = rng.gen_range(0..self.statements.len());
        let len = rng.gen_range(0..=self.statements.len() - start);
        self.statements[start..start + len].to_vec()
    }

    /// Statements kept independently with `probability`, in original order.
    pub fn random_subset<R: Rng>(&self, rng: &mut R, probability: f64) -> Vec<Statement> {
        let probability = probability.clamp(0.0, 1.0);
        self.statements
            .iter()
            .filter(|_| rng.r#gen::<f64>() < probability)
            .cloned()
            .collect()
    }

    /// Copies of the statements containing `token`.
    #[must_use]
    pub fn containing_token(&self, token: &str) -> Vec<Statement> {
        self.statements
            .iter()
            .filter(|s| s.contains(token))
            .cloned()
            .collect()
    }

    /// Copies of the statements containing at least one of `tokens`.
    #[must_use]
    pub fn containing_any_token(&self, tokens: &[&str]) -> Vec<Statement> {
        self.statements
            .iter()
            .filter(|s| tokens.iter().any(|t| s.contains(t)))
            .cloned()
            .collect()
    }

    /// Copies of the statements containing every one of `tokens`.
    #[must_use]
    pub fn containing_all_tokens(&self, tokens: &[&str]) -> Vec<Statement> {
        self.statements
            .iter()
            .filter(|s| tokens.iter().all(|t| s.contains(t)))
            .cloned()
            .collect()
    }

    /// Copies of the statements at even indices.
    #[must_use]
    pub fn even_statements(&self) -> Vec<Statement> {
        self.statements.iter().step_by(2).cloned().collect()
    }

    /// Copies of the statements at odd indices.
    #[must_use]
    pub fn odd_statements(&self) -> Vec<Statement> {
        self.statements.iter().skip(1).step_by(2).cloned().collect()
    }

    // ------------------------------------------------------------------
    // Length statistics
    // ------------------------------------------------------------------

    /// Statement with the most tokens; ties go to the first.
    #[must_use]
    pub fn longest_statement(&self) -> Option<&Statement> {
        self.statements
            .iter()
            .reduce(|best, s| if s.len() > best.len() { s } else { best })
    }

    /// Statement with the fewest tokens; ties go to the first.
    #[must_use]
    pub fn shortest_statement(&self) -> Option<&Statement> {
        self.statements
            .iter()
            .reduce(|best, s| if s.len() < best.len() { s } else { best })
    }

    /// Token count of the longest statement, 0 when empty.
    #[must_use]
    pub fn longest_statement_len(&self) -> usize {
        self.longest_statement().map_or(0, Statement::len)
    }

    /// Token count of the shortest statement, 0 when empty.
    #[must_use]
    pub fn shortest_statement_len(&self) -> usize {
        self.shortest_statement().map_or(0, Statement::len)
    }

    /// Mean tokens per statement, `None` when empty.
    #[must_use]
    pub fn average_statement_len(&self) -> Option<f64> {
        if self.statements.is_empty() {
            return None;
        }
        Some(self.token_count() as f64 / self.statements.len() as f64)
    }

    // ------------------------------------------------------------------
    // Removal and replacement
    // ------------------------------------------------------------------

    /// Remove the statement at `index`. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Statement> {
        (index < self.statements.len()).then(|| self.statements.remove(index))
    }

    /// Remove the first statement equal to `statement`.
    pub fn remove_statement(&mut self, statement: &Statement) -> Option<Statement> {
        let index = self.index_of_statement(statement)?;
        Some(self.statements.remove(index))
    }

    /// Remove the first occurrence of each listed statement.
    pub fn remove_statements(&mut self, statements: &[Statement]) {
        for statement in statements {
            self.remove_statement(statement);
        }
    }

    /// Remove the statements in `[low, high)`, with both bounds clamped.
    pub fn remove_range(&mut self, low: usize, high: usize) -> Vec<Statement> {
        let low = low.min(self.statements.len());
        let high = high.min(self.statements.len());
        if low >= high {
            return Vec::new();
        }
        self.statements.drain(low..high).collect()
    }

    /// Remove the first statement.
    pub fn remove_first(&mut self) -> Option<Statement> {
        self.remove(0)
    }

    /// Remove the last statement.
    pub fn remove_last(&mut self) -> Option<Statement> {
        self.statements.pop()
    }

    /// Remove a uniformly chosen statement.
    pub fn remove_random_statement<R: Rng>(&mut self, rng: &mut R) -> Option<Statement> {
        if self.statements.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.statements.len());
        Some(self.statements.remove(index))
    }

    /// Remove up to `n` random statements, stopping when empty.
    pub fn remove_random_statements<R: Rng>(&mut self, rng: &mut R, n: usize) {
        for _ in 0..n {
            if self.remove_random_statement(rng).is_none() {
                break;
            }
        }
    }

    /// Overwrite a random slot with a copy of a random statement.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyProgramError`] when there is nothing to copy.
    pub fn replace_random_statement<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), EmptyProgramError> {
        let copy = self.random_statement(rng).cloned().ok_or(EmptyProgramError)?;
        let index = rng.gen_range(0..self.statements.len());
        self.statements[index] = copy;
        Ok(())
    }

    /// Replace the first statement equal to `old` with `new`.
    ///
    /// Returns whether a replacement happened.
    pub fn replace_statement(&mut self, old: &Statement, new: Statement) -> bool {
        match self.index_of_statement(old) {
            Some(index) => {
                self.statements[index] = new;
                true
            }
            None => false,
        }
    }

    /// Insert a copy of a random statement directly after it.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyProgramError`] when there is nothing to duplicate.
    pub fn duplicate_random_statement<R: Rng>(
        &mut self,
        rng: &mut R,
    ) -> Result<(), EmptyProgramError> {
        if self.statements.is_empty() {
            return Err(EmptyProgramError);
        }
        let index = rng.gen_range(0..self.statements.len());
        let copy = self.statements[index].clone();
        self.statements.insert(index + 1, copy);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Reordering
    // ------------------------------------------------------------------

    /// Reverse the statement order.
    pub fn reverse(&mut self) {
        self.statements.reverse();
    }

    /// Shuffle the statement order.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.statements.shuffle(rng);
    }

    /// Rotate right by a random distance in `0..len`.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyProgramError`] on an empty program.
    pub fn rotate<R: Rng>(&mut self, rng: &mut R) -> Result<(), EmptyProgramError> {
        if self.statements.is_empty() {
            return Err(EmptyProgramError);
        }
        let distance = rng.gen_range(0..self.statements.len());
        self.statements.rotate_right(distance);
        Ok(())
    }

    /// Stable sort by token count, shortest first.
    pub fn sort_by_len(&mut self) {
        self.statements.sort_by(Statement::cmp_len);
    }

    /// Swap two statements by index, both clamped into range.
    pub fn swap(&mut self, first: usize, second: usize) {
        if self.statements.is_empty() {
            return;
        }
        let first = self.clamp_index(first);
        let second = self.clamp_index(second);
        self.statements.swap(first, second);
    }

    /// Swap two uniformly chosen statements (possibly the same one).
    ///
    /// # Errors
    ///
    /// Returns [`EmptyProgramError`] on an empty program.
    pub fn swap_random<R: Rng>(&mut self, rng: &mut R) -> Result<(), EmptyProgramError> {
        if self.statements.is_empty() {
            return Err(EmptyProgramError);
        }
        let first = rng.gen_range(0..self.statements.len());
        let second = rng.gen_range(0..self.statements.len());
        self.statements.swap(first, second);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Whether a statement with the same text is present.
    #[must_use]
    pub fn contains_statement(&self, statement: &Statement) -> bool {
        self.statements.contains(statement)
    }

    /// Whether any statement contains `token`.
    #[must_use]
    pub fn contains_token(&self, token: &str) -> bool {
        self.statements.iter().any(|s| s.contains(token))
    }

    /// Position of the first statement with the same text.
    #[must_use]
    pub fn index_of_statement(&self, statement: &Statement) -> Option<usize> {
        self.statements.iter().position(|s| s == statement)
    }

    /// Position of the first statement containing `token`.
    #[must_use]
    pub fn index_of_token(&self, token: &str) -> Option<usize> {
        self.statements.iter().position(|s| s.contains(token))
    }

    /// Total tokens across all statements.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.statements.iter().map(Statement::len).sum()
    }

    /// Total token characters across all statements.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.statements.iter().map(Statement::character_count).sum()
    }

    /// Occurrences of `token` across all statements.
    #[must_use]
    pub fn count(&self, token: &str) -> usize {
        self.statements.iter().map(|s| s.count(token)).sum()
    }

    /// Distinct tokens across all statements.
    #[must_use]
    pub fn distinct_tokens(&self) -> HashSet<&Token> {
        self.statements.iter().flat_map(Statement::tokens).collect()
    }

    /// Compare by statement count.
    #[must_use]
    pub fn cmp_len(&self, other: &Self) -> Ordering {
        self.len().cmp(&other.len())
    }

    /// Compare by score; total over all floats.
    #[must_use]
    pub fn cmp_score(&self, other: &Self) -> Ordering {
        self.score.total_cmp(&other.score)
    }

    // ------------------------------------------------------------------
    // Recombination
    // ------------------------------------------------------------------

    /// Alternate statements from two programs, then append the remainder of
    /// the longer one.
    #[must_use]
    pub fn interleave(first: &Self, second: &Self) -> Self {
        let shared = first.len().min(second.len());
        let mut statements = Vec::with_capacity(first.len() + second.len());
        for (a, b) in first.statements.iter().zip(&second.statements) {
            statements.push(a.clone());
            statements.push(b.clone());
        }
        statements.extend_from_slice(&first.statements[shared..]);
        statements.extend_from_slice(&second.statements[shared..]);
        Self::new(statements)
    }

    /// Split into two contiguous pieces at a random index in `0..len`.
    ///
    /// An empty program splits into two empty pieces.
    pub fn split<R: Rng>(program: &Self, rng: &mut R) -> (Self, Self) {
        if program.is_empty() {
            return (Self::default(), Self::default());
        }
        let cut = rng.gen_range(0..program.len());
        let (head, tail) = program.statements.split_at(cut);
        (Self::new(head.to_vec()), Self::new(tail.to_vec()))
    }

    // ------------------------------------------------------------------
    // Fitness state
    // ------------------------------------------------------------------

    /// Raw fitness score.
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Set the raw fitness score.
    pub fn set_score(&mut self, score: f64) {
        self.score = score;
    }

    /// Last compiler diagnostic, or [`NOT_COMPILED`].
    #[must_use]
    pub fn diagnostic(&self) -> &str {
        &self.diagnostic
    }

    /// Store a compiler diagnostic.
    pub fn set_diagnostic(&mut self, diagnostic: impl Into<String>) {
        self.diagnostic = diagnostic.into();
    }

    /// Whitespace-delimited words in the diagnostic.
    #[must_use]
    pub fn diagnostic_word_count(&self) -> usize {
        self.diagnostic.split_whitespace().count()
    }

    /// Score squashed into `(-1, 1)` by `tanh`.
    #[must_use]
    pub fn tanh_score(&self) -> f64 {
        self.score.tanh()
    }

    /// Score squashed into `(-π/2, π/2)` by `atan`.
    #[must_use]
    pub fn arctan_score(&self) -> f64 {
        self.score.atan()
    }

    /// Score squashed into `(0, 1)` by the logistic function.
    #[must_use]
    pub fn logistic_score(&self) -> f64 {
        1.0 / (1.0 + (-self.score).exp())
    }

    /// Negative scores clipped to 0.
    #[must_use]
    pub fn relu_score(&self) -> f64 {
        self.score.max(0.0)
    }

    /// 0 for negative scores, 1 otherwise.
    #[must_use]
    pub fn binary_score(&self) -> f64 {
        if self.score < 0.0 { 0.0 } else { 1.0 }
    }

    /// `e^(s-1)` for negative scores, the score itself otherwise.
    #[must_use]
    pub fn exponential_score(&self) -> f64 {
        if self.score < 0.0 {
            (self.score - 1.0).exp()
        } else {
            self.score
        }
    }

    // ------------------------------------------------------------------
    // Operator probabilities
    // ------------------------------------------------------------------

    /// Probability that mutation applies to this program.
    #[must_use]
    pub fn mutation_probability(&self) -> f64 {
        self.mutation_probability
    }

    /// Set the mutation probability, clamped to `[0, 1]`.
    pub fn set_mutation_probability(&mut self, probability: f64) {
        self.mutation_probability = probability.clamp(0.0, 1.0);
    }

    /// Draw a fresh mutation probability.
    pub fn randomize_mutation_probability<R: Rng>(&mut self, rng: &mut R) {
        self.mutation_probability = rng.r#gen();
    }

    /// Coin toss against the mutation probability.
    pub fn should_mutate<R: Rng>(&self, rng: &mut R) -> bool {
        rng.r#gen::<f64>() <= self.mutation_probability
    }

    /// Probability that crossover applies to this program.
    #[must_use]
    pub fn crossover_probability(&self) -> f64 {
        self.crossover_probability
    }

    /// Set the crossover probability, clamped to `[0, 1]`.
    pub fn set_crossover_probability(&mut self, probability: f64) {
        self.crossover_probability = probability.clamp(0.0, 1.0);
    }

    /// Draw a fresh crossover probability.
    pub fn randomize_crossover_probability<R: Rng>(&mut self, rng: &mut R) {
        self.crossover_probability = rng.r#gen();
    }

    /// Coin toss against the crossover probability.
    pub fn should_crossover<R: Rng>(&self, rng: &mut R) -> bool {
        rng.r#gen::<f64>() <= self.crossover_probability
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "int main(){{")?;
        for statement in &self.statements {
            writeln!(f, "   {statement}")?;
        }
        write!(f, "}}")
    }
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Program {}

impl FromIterator<Statement> for Program {
    fn from_iter<I: IntoIterator<Item = Statement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn stmt(text: &str) -> Statement {
        text.split_whitespace().collect()
    }

    fn program(lines: &[&str]) -> Program {
        lines.iter().map(|l| stmt(l)).collect()
    }

    fn texts(p: &Program) -> Vec<String> {
        p.statements().iter().map(|s| s.to_string().trim_end().to_string()).collect()
    }

    #[test]
    fn test_render() {
        let p = program(&["int x ;", "x = 1 ;"]);
        assert_eq!(p.to_string(), "int main(){\n   int x ; \n   x = 1 ; \n}");
        assert_eq!(Program::default().to_string(), "int main(){\n}");
    }

    #[test]
    fn test_equality_by_rendered_text() {
        let mut a = program(&["int x ;", "x = 1 ;"]);
        let tokens = |words: &[&str]| -> Vec<Token> {
            words.iter().copied().map(Token::from).collect()
        };
        let mut b = Program::new(vec![
            Statement::new(tokens(&["int", "x", ";"])),
            Statement::new(tokens(&["x", "=", "1", ";"])),
        ]);
        a.set_score(3.0);
        b.set_score(-7.5);
        b.set_diagnostic("error: x");
        assert_eq!(a, b);

        b.push(stmt("y ;"));
        assert_ne!(a, b);
    }

    #[test]
    fn test_new_program_is_unevaluated() {
        let p = Program::default();
        assert_eq!(p.diagnostic(), NOT_COMPILED);
        assert!(p.score().abs() < f64::EPSILON);
        assert!((p.mutation_probability() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_clone_is_deep() {
        let mut original = program(&["a = 1 ;", "b = 2 ;"]);
        original.set_score(4.5);
        original.set_diagnostic("warning");

        let mut copy = original.clone();
        assert_eq!(copy.to_string(), original.to_string());
        assert!((copy.score() - 4.5).abs() < f64::EPSILON);
        assert_eq!(copy.diagnostic(), "warning");

        if let Some(s) = copy.statement_mut(0) {
            s.push(Token::from("zz"));
        }
        copy.push(stmt("c"));
        assert_eq!(texts(&original), ["a = 1 ;", "b = 2 ;"]);
    }

    #[test]
    fn test_offspring_resets_fitness() {
        let mut p = program(&["a"]);
        p.set_score(9.0);
        p.set_diagnostic("error");
        p.set_crossover_probability(0.25);
        let child = p.offspring();
        assert!((child.crossover_probability() - 0.25).abs() < f64::EPSILON);
        assert_eq!(child.diagnostic(), NOT_COMPILED);
        assert!(child.score().abs() < f64::EPSILON);
        assert_eq!(texts(&child), ["a"]);
    }

    #[test]
    fn test_interleave_appends_remainder() {
        let p1 = program(&["s1", "s2", "s3"]);
        let p2 = program(&["t1"]);
        assert_eq!(texts(&Program::interleave(&p1, &p2)), ["s1", "t1", "s2", "s3"]);

        let p1 = program(&["s1", "s2"]);
        assert_eq!(texts(&Program::interleave(&p1, &p2)), ["s1", "t1", "s2"]);
        assert_eq!(texts(&Program::interleave(&p2, &p1)), ["t1", "s1", "s2"]);
    }

    #[test]
    fn test_split_is_contiguous() {
        let mut rng = SmallRng::seed_from_u64(3);
        let p = program(&["a", "b", "c", "d"]);
        for _ in 0..20 {
            let (head, tail) = Program::split(&p, &mut rng);
            assert!(!tail.is_empty());
            let mut joined = texts(&head);
            joined.extend(texts(&tail));
            assert_eq!(joined, ["a", "b", "c", "d"]);
        }
        let (head, tail) = Program::split(&Program::default(), &mut rng);
        assert!(head.is_empty() && tail.is_empty());
    }

    #[test]
    fn test_duplicate_inserts_after_source() {
        let mut rng = SmallRng::seed_from_u64(11);
        let mut p = program(&["a", "b", "c"]);
        p.duplicate_random_statement(&mut rng).unwrap();
        let t = texts(&p);
        assert_eq!(t.len(), 4);
        assert!(t.windows(2).any(|w| w[0] == w[1]));

        let mut single = program(&["only"]);
        single.duplicate_random_statement(&mut rng).unwrap();
        assert_eq!(texts(&single), ["only", "only"]);
    }

    #[test]
    fn test_random_edits_on_empty_program() {
        let mut rng = SmallRng::seed_from_u64(0);
        let mut p = Program::default();
        assert_eq!(p.duplicate_random_statement(&mut rng), Err(EmptyProgramError));
        assert_eq!(p.replace_random_statement(&mut rng), Err(EmptyProgramError));
        assert_eq!(p.rotate(&mut rng), Err(EmptyProgramError));
        assert_eq!(p.swap_random(&mut rng), Err(EmptyProgramError));
        assert!(p.random_statement(&mut rng).is_none());
        assert!(p.random_run(&mut rng).is_empty());
        assert!(p.remove_random_statement(&mut rng).is_none());

        p.insert_random_statement(&mut rng);
        assert_eq!(p.len(), 1);
    }

    #[test]
    fn test_clamped_access_and_insert() {
        let mut p = program(&["a", "b"]);
        assert_eq!(p.statement(50).map(ToString::to_string), Some("b ".to_string()));
        p.insert(50, stmt("c"));
        p.insert_all(0, vec![stmt("z")]);
        assert_eq!(texts(&p), ["z", "a", "b", "c"]);
        assert_eq!(p.range(1, 3).len(), 2);
        assert!(p.range(3, 1).is_empty());
    }

    #[test]
    fn test_filters() {
        let p = program(&["int x ;", "x = y ;", "y ++ ;", "return x ;"]);
        assert_eq!(p.containing_token("x").len(), 3);
        assert_eq!(p.containing_any_token(&["int", "++"]).len(), 2);
        assert_eq!(p.containing_all_tokens(&["x", "y"]).len(), 1);
        assert_eq!(p.even_statements().len(), 2);
        assert_eq!(texts(&Program::new(p.odd_statements())), ["x = y ;", "return x ;"]);
    }

    #[test]
    fn test_length_statistics() {
        let p = program(&["a b", "c", "d e", "f g h", "i"]);
        assert_eq!(p.longest_statement_len(), 3);
        assert_eq!(p.shortest_statement().map(ToString::to_string), Some("c ".to_string()));
        assert_eq!(p.longest_statement().map(ToString::to_string), Some("f g h ".to_string()));
        assert!((p.average_statement_len().unwrap() - 1.8).abs() < 1e-9);
        assert!(Program::default().average_statement_len().is_none());
        assert_eq!(Program::default().longest_statement_len(), 0);
    }

    #[test]
    fn test_sort_by_len_is_stable() {
        let mut p = program(&["a b", "c", "d e", "f"]);
        p.sort_by_len();
        assert_eq!(texts(&p), ["c", "f", "a b", "d e"]);
    }

    #[test]
    fn test_removal_and_replace() {
        let mut p = program(&["a", "b", "c", "d", "e"]);
        assert!(p.remove_statement(&stmt("c")).is_some());
        assert!(p.remove_statement(&stmt("q")).is_none());
        assert_eq!(p.remove_first().map(|s| s.to_string()), Some("a ".to_string()));
        assert_eq!(p.remove_last().map(|s| s.to_string()), Some("e ".to_string()));
        assert!(p.replace_statement(&stmt("b"), stmt("x")));
        assert_eq!(texts(&p), ["x", "d"]);
        p.remove_statements(&[stmt("x"), stmt("d")]);
        assert!(p.is_empty());

        let mut rng = SmallRng::seed_from_u64(5);
        let mut p = program(&["a", "b"]);
        p.remove_random_statements(&mut rng, 10);
        assert!(p.is_empty());
    }

    #[test]
    fn test_rotate_and_swap_keep_statements() {
        let mut rng = SmallRng::seed_from_u64(17);
        let mut p = program(&["a", "b", "c", "d"]);
        p.rotate(&mut rng).unwrap();
        p.swap_random(&mut rng).unwrap();
        p.replace_random_statement(&mut rng).unwrap();
        assert_eq!(p.len(), 4);
        p.swap(0, 99);
        p.reverse();
        p.shuffle(&mut rng);
        assert_eq!(p.len(), 4);
    }

    #[test]
    fn test_queries() {
        let p = program(&["int x ;", "x = x + 1 ;"]);
        assert!(p.contains_statement(&stmt("int x ;")));
        assert!(p.contains_token("+"));
        assert_eq!(p.index_of_token("="), Some(1));
        assert_eq!(p.index_of_statement(&stmt("x = x + 1 ;")), Some(1));
        assert_eq!(p.token_count(), 9);
        assert_eq!(p.character_count(), 11);
        assert_eq!(p.count("x"), 3);
        assert_eq!(p.distinct_tokens().len(), 6);
        assert_eq!(p.cmp_len(&program(&["a"])), Ordering::Greater);
    }

    #[test]
    fn test_score_views() {
        let mut p = Program::default();
        p.set_score(-2.0);
        assert!(p.binary_score().abs() < f64::EPSILON);
        assert!(p.relu_score().abs() < f64::EPSILON);
        assert!((p.exponential_score() - (-3.0f64).exp()).abs() < 1e-12);
        assert!((p.tanh_score() - (-2.0f64).tanh()).abs() < 1e-12);
        assert!(p.logistic_score() > 0.0 && p.logistic_score() < 0.5);

        p.set_score(3.0);
        assert!((p.binary_score() - 1.0).abs() < f64::EPSILON);
        assert!((p.exponential_score() - 3.0).abs() < f64::EPSILON);
        assert!((p.arctan_score() - 3.0f64.atan()).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_clamped() {
        let mut rng = SmallRng::seed_from_u64(2);
        let mut p = Program::default();
        p.set_mutation_probability(3.0);
        assert!((p.mutation_probability() - 1.0).abs() < f64::EPSILON);
        assert!(p.should_mutate(&mut rng));
        p.set_crossover_probability(-1.0);
        assert!(p.crossover_probability().abs() < f64::EPSILON);

        p.randomize_mutation_probability(&mut rng);
        p.randomize_crossover_probability(&mut rng);
        assert!((0.0..1.0).contains(&p.mutation_probability()));
        assert!((0.0..1.0).contains(&p.crossover_probability()));
    }

    #[test]
    fn test_diagnostic_word_count() {
        let mut p = Program::default();
        p.set_diagnostic("main.cpp:2:4: error: expected ';'\n  x");
        assert_eq!(p.diagnostic_word_count(), 5);
    }
}
