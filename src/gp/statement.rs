//! A statement: an ordered, editable sequence of tokens.
//!
//! Index arguments are clamped to the nearest valid position instead of
//! failing, so edit operators can be applied blindly by mutation code.

use crate::gp::grammar;
use crate::gp::token::Token;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Punctuation ignored by [`Statement::most_common_token`].
const STRUCTURAL: [&str; 7] = [";", "(", ")", "{", "}", "[", "]"];

/// One generated line or construct.
///
/// Equality and hashing use the rendered text, so two statements built from
/// different token values with the same text are equal.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statement {
    tokens: Vec<Token>,
}

impl Statement {
    /// Create a statement from tokens.
    #[must_use]
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Create a random top-level statement.
    #[must_use]
    pub fn random<R: Rng>(rng: &mut R) -> Self {
        grammar::random_statement(rng)
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the statement has no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Compare two statements by token count.
    #[must_use]
    pub fn cmp_len(&self, other: &Self) -> Ordering {
        self.len().cmp(&other.len())
    }

    /// All tokens in order.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Replace the whole token list.
    pub fn set_tokens(&mut self, tokens: Vec<Token>) {
        self.tokens = tokens;
    }

    /// Consume the statement, returning its tokens.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    fn clamp_index(&self, index: usize) -> usize {
        index.min(self.tokens.len().saturating_sub(1))
    }

    /// Token at `index`, clamped into range. `None` only when empty.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(self.clamp_index(index))
    }

    /// Overwrite the token at `index`, clamped into range.
    pub fn set(&mut self, index: usize, token: Token) {
        let index = self.clamp_index(index);
        if let Some(slot) = self.tokens.get_mut(index) {
            *slot = token;
        }
    }

    /// Copy of the tokens in `[low, high)`, with both bounds clamped.
    #[must_use]
    pub fn range(&self, low: usize, high: usize) -> Vec<Token> {
        let low = self.clamp_index(low);
        let high = high.min(self.tokens.len());
        if low >= high {
            return Vec::new();
        }
        self.tokens[low..high].to_vec()
    }

    /// Append one token.
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Insert one token; indices past the end append.
    pub fn insert(&mut self, index: usize, token: Token) {
        let index = index.min(self.tokens.len());
        self.tokens.insert(index, token);
    }

    /// Append several tokens.
    pub fn extend<I: IntoIterator<Item = Token>>(&mut self, tokens: I) {
        self.tokens.extend(tokens);
    }

    /// Insert several tokens at `index`; indices past the end append.
    pub fn insert_all<I: IntoIterator<Item = Token>>(&mut self, index: usize, tokens: I) {
        let index = index.min(self.tokens.len());
        self.tokens.splice(index..index, tokens);
    }

    /// Insert a random grammar token at a random position.
    pub fn insert_random_token<R: Rng>(&mut self, rng: &mut R) {
        let index = rng.gen_range(0..=self.tokens.len());
        let token = grammar::random_token(rng);
        self.tokens.insert(index, token);
    }

    /// Insert `n` random tokens.
    pub fn insert_random_tokens<R: Rng>(&mut self, rng: &mut R, n: usize) {
        for _ in 0..n {
            self.insert_random_token(rng);
        }
    }

    /// A uniformly chosen token.
    pub fn random_token<R: Rng>(&self, rng: &mut R) -> Option<&Token> {
        self.tokens.choose(rng)
    }

    /// `n` uniformly chosen tokens, with replacement.
    pub fn random_tokens<R: Rng>(&self, rng: &mut R, n: usize) -> Vec<Token> {
        (0..n)
            .filter_map(|_| self.tokens.choose(rng).cloned())
            .collect()
    }

    /// A random contiguous run `[min(i, j), max(i, j))`; may be empty.
    pub fn random_run<R: Rng>(&self, rng: &mut R) -> Vec<Token> {
        if self.tokens.is_empty() {
            return Vec::new();
        }
        let i = rng.gen_range(0..self.tokens.len());
        let j = rng.gen_range(0..self.tokens.len());
        self.tokens[i.min(j)..i.max(j)].to_vec()
    }

    /// Tokens kept independently with `probability`, in original order.
    pub fn random_subset<R: Rng>(&self, rng: &mut R, probability: f64) -> Vec<Token> {
        let probability = probability.clamp(0.0, 1.0);
        self.tokens
            .iter()
            .filter(|_| rng.r#gen::<f64>() < probability)
            .cloned()
            .collect()
    }

    /// Remove the token at `index`. Out-of-range indices are a no-op.
    pub fn remove(&mut self, index: usize) -> Option<Token> {
        (index < self.tokens.len()).then(|| self.tokens.remove(index))
    }

    /// Remove the tokens in `[low, high)`, with both bounds clamped.
    pub fn remove_range(&mut self, low: usize, high: usize) -> Vec<Token> {
        let low = low.min(self.tokens.len());
        let high = high.min(self.tokens.len());
        if low >= high {
            return Vec::new();
        }
        self.tokens.drain(low..high).collect()
    }

    /// Remove the first occurrence of each listed token.
    pub fn remove_all(&mut self, targets: &[Token]) {
        for target in targets {
            if let Some(index) = self.tokens.iter().position(|t| t == target) {
                self.tokens.remove(index);
            }
        }
    }

    /// Remove a uniformly chosen token.
    pub fn remove_random_token<R: Rng>(&mut self, rng: &mut R) -> Option<Token> {
        if self.tokens.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.tokens.len());
        Some(self.tokens.remove(index))
    }

    /// Remove up to `n` random tokens, stopping when empty.
    pub fn remove_random_tokens<R: Rng>(&mut self, rng: &mut R, n: usize) {
        for _ in 0..n {
            if self.remove_random_token(rng).is_none() {
                break;
            }
        }
    }

    /// Replace the first occurrence of `from` with `to`.
    pub fn replace_first(&mut self, from: &str, to: &Token) {
        if let Some(slot) = self.tokens.iter_mut().find(|t| t.as_str() == from) {
            *slot = to.clone();
        }
    }

    /// Replace every occurrence of `from` with `to`.
    pub fn replace_all(&mut self, from: &str, to: &Token) {
        for slot in self.tokens.iter_mut().filter(|t| t.as_str() == from) {
            *slot = to.clone();
        }
    }

    /// Whether any token equals `target` (surrounding whitespace ignored).
    #[must_use]
    pub fn contains(&self, target: &str) -> bool {
        let target = target.trim();
        self.tokens.iter().any(|t| t == target)
    }

    /// Position of the first token equal to `target`.
    #[must_use]
    pub fn index_of(&self, target: &str) -> Option<usize> {
        let target = target.trim();
        self.tokens.iter().position(|t| t == target)
    }

    /// Number of tokens equal to `target`.
    #[must_use]
    pub fn count(&self, target: &str) -> usize {
        let target = target.trim();
        self.tokens.iter().filter(|t| *t == target).count()
    }

    /// Total characters across all tokens.
    #[must_use]
    pub fn character_count(&self) -> usize {
        self.tokens.iter().map(Token::char_count).sum()
    }

    /// Most frequent non-punctuation token; ties go to the earliest.
    #[must_use]
    pub fn most_common_token(&self) -> Option<&Token> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for token in &self.tokens {
            if !STRUCTURAL.contains(&token.as_str()) {
                *counts.entry(token.as_str()).or_default() += 1;
            }
        }

        let mut best: Option<(&Token, usize)> = None;
        for token in &self.tokens {
            let Some(&count) = counts.get(token.as_str()) else {
                continue;
            };
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((token, count));
            }
        }
        best.map(|(token, _)| token)
    }

    /// Append copies of another statement's tokens.
    pub fn append(&mut self, other: &Self) {
        self.tokens.extend_from_slice(&other.tokens);
    }

    /// Prepend copies of another statement's tokens.
    pub fn prepend(&mut self, other: &Self) {
        self.tokens.splice(0..0, other.tokens.iter().cloned());
    }

    /// Insert copies of another statement's tokens at `index`; past-the-end appends.
    pub fn splice(&mut self, index: usize, other: &Self) {
        self.insert_all(index, other.tokens.iter().cloned());
    }

    /// Reverse the token order.
    pub fn reverse(&mut self) {
        self.tokens.reverse();
    }

    /// Shuffle the token order.
    pub fn shuffle<R: Rng>(&mut self, rng: &mut R) {
        self.tokens.shuffle(rng);
    }

    /// Swap two uniformly chosen tokens (possibly the same one).
    pub fn swap_random<R: Rng>(&mut self, rng: &mut R) {
        if self.tokens.is_empty() {
            return;
        }
        let i = rng.gen_range(0..self.tokens.len());
        let j = rng.gen_range(0..self.tokens.len());
        self.tokens.swap(i, j);
    }

    /// Perform `n` random swaps.
    pub fn swap_random_n<R: Rng>(&mut self, rng: &mut R, n: usize) {
        for _ in 0..n {
            self.swap_random(rng);
        }
    }

    /// Swap two tokens by index, both clamped into range.
    pub fn swap(&mut self, first: usize, second: usize) {
        if self.tokens.is_empty() {
            return;
        }
        let first = self.clamp_index(first);
        let second = self.clamp_index(second);
        self.tokens.swap(first, second);
    }

    /// Whether `()`, `{}` and `[]` pairs in the rendered text nest correctly.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        let mut stack = Vec::new();
        for c in self.tokens.iter().flat_map(|t| t.as_str().chars()) {
            match c {
                '(' | '{' | '[' => stack.push(c),
                ')' if stack.pop() != Some('(') => return false,
                '}' if stack.pop() != Some('{') => return false,
                ']' if stack.pop() != Some('[') => return false,
                _ => {}
            }
        }
        stack.is_empty()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.tokens {
            write!(f, "{token} ")?;
        }
        Ok(())
    }
}

impl PartialEq for Statement {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl Eq for Statement {}

impl Hash for Statement {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.to_string().hash(state);
    }
}

impl FromIterator<Token> for Statement {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<&'a str> for Statement {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        iter.into_iter().map(Token::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn statement(text: &str) -> Statement {
        text.split_whitespace().collect()
    }

    #[test]
    fn test_render_trailing_space() {
        assert_eq!(statement("int x ;").to_string(), "int x ; ");
        assert_eq!(Statement::default().to_string(), "");
    }

    #[test]
    fn test_balanced() {
        assert!(statement("{ ( a ) [ b ] }").is_balanced());
        assert!(!statement("{ ( a ] }").is_balanced());
        assert!(!statement("( a").is_balanced());
        assert!(!statement(") (").is_balanced());
        assert!(Statement::default().is_balanced());
    }

    #[test]
    fn test_clone_is_independent() {
        let original = statement("x = 1 ;");
        let mut copy = original.clone();
        assert_eq!(copy.to_string(), original.to_string());

        copy.set(0, Token::from("y"));
        copy.push(Token::from("z"));
        assert_eq!(original.to_string(), "x = 1 ; ");
    }

    #[test]
    fn test_clamped_access() {
        let mut s = statement("a b c");
        assert_eq!(s.get(100).map(Token::as_str), Some("c"));
        s.set(100, Token::from("d"));
        assert_eq!(s.to_string(), "a b d ");
        s.insert(100, Token::from("e"));
        assert_eq!(s.to_string(), "a b d e ");
        assert_eq!(s.range(1, 100).len(), 3);
        assert!(s.range(3, 1).is_empty());
        assert!(Statement::default().get(0).is_none());
    }

    #[test]
    fn test_insert_all_past_end_appends() {
        let mut s = statement("a b");
        s.insert_all(10, vec![Token::from("c"), Token::from("d")]);
        assert_eq!(s.to_string(), "a b c d ");
        s.insert_all(0, vec![Token::from("z")]);
        assert_eq!(s.to_string(), "z a b c d ");
    }

    #[test]
    fn test_queries() {
        let s = statement("x = x + 1 ;");
        assert!(s.contains(" x "));
        assert_eq!(s.count("x"), 2);
        assert_eq!(s.index_of("+"), Some(3));
        assert_eq!(s.index_of("y"), None);
        assert_eq!(s.character_count(), 6);
        assert_eq!(s.most_common_token().map(Token::as_str), Some("x"));
        assert!(statement("; { }").most_common_token().is_none());
    }

    #[test]
    fn test_append_prepend_splice_copy() {
        let mut s = statement("b");
        let other = statement("a");
        s.append(&other);
        s.prepend(&other);
        s.splice(1, &statement("x y"));
        assert_eq!(s.to_string(), "a x y b a ");
        s.splice(99, &other);
        assert_eq!(s.to_string(), "a x y b a a ");
        assert_eq!(other.to_string(), "a ");
    }

    #[test]
    fn test_removal() {
        let mut s = statement("a b c d e");
        assert_eq!(s.remove(10), None);
        assert_eq!(s.remove(0).map(String::from), Some("a".to_string()));
        assert_eq!(s.remove_range(1, 3).len(), 2);
        assert_eq!(s.to_string(), "b e ");
        s.remove_all(&[Token::from("e"), Token::from("q")]);
        assert_eq!(s.to_string(), "b ");

        let mut rng = SmallRng::seed_from_u64(1);
        s.remove_random_tokens(&mut rng, 5);
        assert!(s.is_empty());
    }

    #[test]
    fn test_replace() {
        let mut s = statement("x + x");
        s.replace_first("x", &Token::from("y"));
        assert_eq!(s.to_string(), "y + x ");
        s.replace_all("x", &Token::from("z"));
        assert_eq!(s.to_string(), "y + z ");
    }

    #[test]
    fn test_swap_and_reverse() {
        let mut s = statement("a b c");
        s.swap(0, 99);
        assert_eq!(s.to_string(), "c b a ");
        s.reverse();
        assert_eq!(s.to_string(), "a b c ");
    }

    #[test]
    fn test_random_edits_preserve_multiset() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut s = statement("a b c d e f");
        s.shuffle(&mut rng);
        s.swap_random_n(&mut rng, 10);
        let mut tokens: Vec<String> = s.tokens().iter().map(ToString::to_string).collect();
        tokens.sort();
        assert_eq!(tokens, ["a", "b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_random_extraction() {
        let mut rng = SmallRng::seed_from_u64(8);
        let s = statement("a b c d");
        assert!(s.random_token(&mut rng).is_some());
        assert_eq!(s.random_tokens(&mut rng, 3).len(), 3);
        assert!(s.random_run(&mut rng).len() < 4);
        assert_eq!(s.random_subset(&mut rng, 1.0).len(), 4);
        assert!(s.random_subset(&mut rng, -3.0).is_empty());

        let mut grown = s.clone();
        grown.insert_random_tokens(&mut rng, 3);
        assert_eq!(grown.len(), 7);
    }

    #[test]
    fn test_equality_by_text() {
        let a = statement("int x ;");
        let b: Statement = vec![Token::new("int"), Token::new("x"), Token::new(";")]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_eq!(a.cmp_len(&statement("x")), Ordering::Greater);
    }
}
