//! Immutable token values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Smallest textual unit of a generated program.
///
/// Keywords, operators, literals, identifiers and punctuation are all tokens.
/// The text is immutable, so clones share it freely without aliasing any
/// mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Token(Arc<str>);

impl Token {
    /// Create a token from any string-like value.
    #[must_use]
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(Arc::from(text.as_ref()))
    }

    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Number of characters in the token.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Token {
    fn from(text: &str) -> Self {
        Self(Arc::from(text))
    }
}

impl From<String> for Token {
    fn from(text: String) -> Self {
        Self(Arc::from(text))
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0.to_string()
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_display_and_compare() {
        let token = Token::from("while");
        assert_eq!(token.to_string(), "while");
        assert_eq!(token, "while");
        assert_eq!(token.char_count(), 5);
    }

    #[test]
    fn test_token_serializes_as_string() {
        let token = Token::new("'x'");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"'x'\"");

        let decoded: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, token);
    }
}
