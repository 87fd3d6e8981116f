//! Encoding value objects: per-token bitmaps, window encodings and the
//! canonical fingerprint record.

use serde::{Deserialize, Serialize};

use super::grid::Grid;
use super::positions::BitPositions;
use crate::error::SdrResult;

/// One source lookup result for a single token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBitmap {
    pub term: String,
    pub positions: BitPositions,
    /// Document frequency of the term in the service corpus.
    #[serde(rename = "df")]
    pub document_frequency: f64,
}

impl TokenBitmap {
    pub fn new(term: impl Into<String>, positions: BitPositions, document_frequency: f64) -> Self {
        Self {
            term: term.into(),
            positions,
            document_frequency,
        }
    }
}

/// Backward sliding-window union ending at one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowEncoding {
    /// Inclusive `[start, end]` token indices covered by the window.
    pub token_span: (usize, usize),
    pub positions: BitPositions,
    pub sparsity: f64,
}

impl WindowEncoding {
    /// The slice of `tokens` this window covers.
    ///
    /// Returns an empty slice if the span does not fit `tokens`.
    pub fn tokens<'a, T>(&self, tokens: &'a [T]) -> &'a [T] {
        let (start, end) = self.token_span;
        tokens.get(start..=end).unwrap_or(&[])
    }

    /// Number of tokens covered. An inverted span counts as one token.
    pub fn span_len(&self) -> usize {
        self.token_span.1.saturating_sub(self.token_span.0) + 1
    }
}

/// Wrapper matching the wire shape `"fingerprint": { "positions": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    pub positions: BitPositions,
}

/// Final output unit of encoding one text.
///
/// Field order follows the canonical wire shape:
///
/// ```text
/// { text, sparsity, df, height, width, score,
///   fingerprint: { positions: [sorted ints] }, pos_types: [] }
/// ```
///
/// `sparsity` is derived from `positions` and the grid; it is refreshed by
/// every constructor and by [`finish_encoding`](crate::finish_encoding).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncodingRecord {
    pub text: String,
    pub sparsity: f64,
    #[serde(default)]
    pub df: f64,
    pub height: usize,
    pub width: usize,
    #[serde(default)]
    pub score: f64,
    pub fingerprint: Fingerprint,
    #[serde(default)]
    pub pos_types: Vec<String>,
}

impl EncodingRecord {
    /// Build a record over `grid` with df and score zeroed.
    pub fn new(text: impl Into<String>, positions: BitPositions, grid: Grid) -> Self {
        let sparsity = grid.sparsity(positions.len());
        Self {
            text: text.into(),
            sparsity,
            df: 0.0,
            height: grid.height(),
            width: grid.width(),
            score: 0.0,
            fingerprint: Fingerprint { positions },
            pos_types: Vec::new(),
        }
    }

    /// Builder: set document frequency.
    #[must_use]
    pub fn with_df(mut self, df: f64) -> Self {
        self.df = df;
        self
    }

    /// Builder: set score.
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    pub fn grid(&self) -> Grid {
        Grid::new(self.width, self.height)
    }

    pub fn positions(&self) -> &BitPositions {
        &self.fingerprint.positions
    }

    /// Recompute `sparsity` from the current positions and grid.
    pub(crate) fn refresh_sparsity(&mut self) {
        self.sparsity = self.grid().sparsity(self.fingerprint.positions.len());
    }

    pub fn to_json(&self) -> SdrResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> SdrResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
