//! The left-consumable token stream and command-line splitting

use crate::error::{DispatchError, Result};
use regex::Regex;
use tracing::debug;

/// Remaining unparsed words of a command line.
///
/// Pipeline stages only ever remove a prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<String>,
}

impl TokenStream {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Remove the first `count` tokens, shifting the rest left.
    ///
    /// Consuming more than the stream holds empties it.
    pub fn consume(&mut self, count: usize) -> Vec<String> {
        let count = count.min(self.tokens.len());
        debug!("Consuming {} of {} token(s)", count, self.tokens.len());
        self.tokens.drain(..count).collect()
    }
}

impl<S: Into<String>> FromIterator<S> for TokenStream {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Splits an interactive or scripted line into words, honoring quotes
pub struct LineSplitter {
    re_word: Regex,
}

impl LineSplitter {
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_word: Regex::new(r#""([^"]*)"|'([^']*)'|(\S+)"#)
                .map_err(|e| DispatchError::unknown(format!("Failed to compile regex: {e}")))?,
        })
    }

    /// Split `line` into tokens. Quoted words keep inner whitespace and lose their quotes.
    #[must_use]
    pub fn split(&self, line: &str) -> TokenStream {
        self.re_word
            .captures_iter(line)
            .filter_map(|cap| cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)))
            .map(|m| m.as_str().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consume_prefix() {
        let mut tokens = TokenStream::new(["image", "pull", "alpine"]);
        let taken = tokens.consume(2);
        assert_eq!(taken, vec!["image", "pull"]);
        assert_eq!(tokens.as_slice(), ["alpine"]);
        assert_eq!(tokens.len(), 1);
    }

    #[test]
    fn test_consume_past_end_empties() {
        let mut tokens = TokenStream::new(["a"]);
        tokens.consume(5);
        assert!(tokens.is_empty());
    }

    #[test]
    fn test_split_line_with_quotes() {
        let splitter = LineSplitter::new().unwrap();
        let tokens = splitter.split(r#"image build "my dir" --tag 'a b'"#);
        assert_eq!(
            tokens.as_slice(),
            ["image", "build", "my dir", "--tag", "a b"]
        );
    }

    #[test]
    fn test_split_blank_line() {
        let splitter = LineSplitter::new().unwrap();
        assert!(splitter.split("   \t ").is_empty());
    }
}
