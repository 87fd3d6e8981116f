//! Local tokenization for union and window encodings.

use std::collections::HashSet;

/// Splits text into the terms looked up one by one in the bitmap source.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Lowercases and splits on anything that is not alphanumeric or an
/// apostrophe. Apostrophes at the edges of a token are dropped.
///
/// ```
/// use retina_sdr_encoder::{SimpleTokenizer, Tokenizer};
///
/// let tokens = SimpleTokenizer::default().tokenize("Don't PANIC, it's fine!");
/// assert_eq!(tokens, vec!["don't", "panic", "it's", "fine"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleTokenizer {
    stopwords: HashSet<String>,
}

impl SimpleTokenizer {
    /// Tokenizer that also drops the given words (compared lowercased).
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|token| token.trim_matches('\''))
            .filter(|token| !token.is_empty() && !self.stopwords.contains(*token))
            .map(str::to_string)
            .collect()
    }
}
