//! Deterministic bitmap source for development and tests.

use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use retina_sdr_core::{position_counts, BitPositions, Grid, TokenBitmap};
use tracing::trace;

use super::{CategoryBitmap, ScoredTerm, TokenBitmapSource};
use crate::error::{EncoderError, EncoderResult};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};

/// ON bits per stub bitmap on the 128x128 retina (~2%).
pub const DEFAULT_STUB_ON_BITS: usize = 328;

/// Stub bitmap source.
///
/// Bitmaps are derived by hashing the lowercased term, so the same term
/// always yields the same bitmap. Terms can be marked unencodable and
/// document encoding can be switched off to exercise fallback paths.
#[derive(Debug)]
pub struct StubBitmapSource {
    grid: Grid,
    on_bits: usize,
    fixed: HashMap<String, TokenBitmap>,
    unknown_terms: HashSet<String>,
    document_encoding: bool,
    vocabulary: Vec<String>,
    tokenizer: SimpleTokenizer,
    bitmap_calls: AtomicUsize,
    text_calls: AtomicUsize,
}

impl StubBitmapSource {
    /// Create a stub producing `on_bits` positions per bitmap on `grid`.
    pub fn new(grid: Grid, on_bits: usize) -> Self {
        Self {
            grid,
            on_bits: on_bits.min(grid.n()),
            fixed: HashMap::new(),
            unknown_terms: HashSet::new(),
            document_encoding: true,
            vocabulary: Vec::new(),
            tokenizer: SimpleTokenizer::default(),
            bitmap_calls: AtomicUsize::new(0),
            text_calls: AtomicUsize::new(0),
        }
    }

    /// Stub over the 128x128 retina.
    pub fn default_retina() -> Self {
        Self::new(Grid::square(128), DEFAULT_STUB_ON_BITS)
    }

    /// Terms for which `get_bitmap` reports `EncodingUnavailable`.
    #[must_use]
    pub fn with_unknown_terms<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.unknown_terms
            .extend(terms.into_iter().map(|t| normalize(t.as_ref())));
        self
    }

    /// Make `get_text_bitmap` report `EncodingUnavailable` for every text.
    #[must_use]
    pub fn without_document_encoding(mut self) -> Self {
        self.document_encoding = false;
        self
    }

    /// Pin the bitmap returned for `term`.
    #[must_use]
    pub fn with_fixed_bitmap(
        mut self,
        term: &str,
        positions: BitPositions,
        document_frequency: f64,
    ) -> Self {
        let key = normalize(term);
        self.fixed.insert(
            key.clone(),
            TokenBitmap::new(key, positions, document_frequency),
        );
        self
    }

    /// Terms considered by `bitmap_to_terms`.
    #[must_use]
    pub fn with_vocabulary<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary.extend(terms.into_iter().map(Into::into));
        self
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Number of `get_bitmap` calls served or refused so far.
    pub fn bitmap_calls(&self) -> usize {
        self.bitmap_calls.load(Ordering::Relaxed)
    }

    /// Number of `get_text_bitmap` calls served or refused so far.
    pub fn text_calls(&self) -> usize {
        self.text_calls.load(Ordering::Relaxed)
    }

    /// Deterministic bitmap for `key`.
    pub fn hashed_bitmap(&self, key: &str) -> BitPositions {
        let n = self.grid.n() as u64;
        let mut positions = BTreeSet::new();
        let mut round: u64 = 0;
        while positions.len() < self.on_bits {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            round.hash(&mut hasher);
            positions.insert((hasher.finish() % n) as usize);
            round += 1;
        }
        BitPositions::from_unsorted(positions)
    }

    fn hashed_frequency(key: &str) -> f64 {
        let mut hasher = DefaultHasher::new();
        "df".hash(&mut hasher);
        key.hash(&mut hasher);
        hasher.finish() as f64 / u64::MAX as f64
    }

    fn lookup(&self, term: &str) -> EncoderResult<TokenBitmap> {
        let key = normalize(term);
        if key.is_empty() {
            return Err(EncoderError::unavailable(term, "empty term"));
        }
        if self.unknown_terms.contains(&key) {
            return Err(EncoderError::unavailable(term, "term not in retina"));
        }
        if let Some(bitmap) = self.fixed.get(&key) {
            return Ok(bitmap.clone());
        }
        let positions = self.hashed_bitmap(&key);
        let df = Self::hashed_frequency(&key);
        Ok(TokenBitmap::new(key, positions, df))
    }
}

impl Default for StubBitmapSource {
    fn default() -> Self {
        Self::default_retina()
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

#[async_trait]
impl TokenBitmapSource for StubBitmapSource {
    async fn get_bitmap(&self, term: &str) -> EncoderResult<TokenBitmap> {
        self.bitmap_calls.fetch_add(1, Ordering::Relaxed);
        self.lookup(term)
    }

    async fn get_text_bitmap(&self, text: &str) -> EncoderResult<BitPositions> {
        self.text_calls.fetch_add(1, Ordering::Relaxed);
        if !self.document_encoding {
            return Err(EncoderError::unavailable(text, "document encoding disabled"));
        }
        let key = normalize(text);
        if key.is_empty() {
            return Err(EncoderError::unavailable(text, "empty document"));
        }
        Ok(self.hashed_bitmap(&key))
    }

    async fn bitmap_to_terms(
        &self,
        positions: &BitPositions,
        num_terms: usize,
    ) -> EncoderResult<Vec<ScoredTerm>> {
        if positions.is_empty() {
            return Ok(Vec::new());
        }

        let mut scored: Vec<ScoredTerm> = self
            .vocabulary
            .iter()
            .filter_map(|term| {
                let bitmap = self.lookup(term).ok()?;
                let overlap = bitmap.positions.overlap(positions);
                (overlap > 0).then(|| {
                    ScoredTerm::new(term.clone(), overlap as f64 / positions.len() as f64)
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.term.cmp(&b.term)));
        scored.truncate(num_terms);
        trace!(candidates = self.vocabulary.len(), returned = scored.len(), "stub decode");
        Ok(scored)
    }

    async fn tokenize(&self, text: &str) -> EncoderResult<Vec<String>> {
        Ok(text
            .split(['.', '!', '?'])
            .map(|sentence| self.tokenizer.tokenize(sentence).join(","))
            .filter(|sentence| !sentence.is_empty())
            .collect())
    }

    async fn create_classification(
        &self,
        label: &str,
        positives: &[BitPositions],
        negatives: &[BitPositions],
    ) -> EncoderResult<CategoryBitmap> {
        if positives.is_empty() {
            return Err(EncoderError::InvalidInput(format!(
                "category '{}' needs at least one positive example",
                label
            )));
        }

        // Majority of positives, minus anything seen in a negative.
        let excluded = negatives
            .iter()
            .fold(BitPositions::new(), |acc, bitmap| acc.union(bitmap));
        let positions = position_counts(positives)
            .into_iter()
            .filter(|&(position, count)| count * 2 > positives.len() && !excluded.contains(position))
            .map(|(position, _)| position)
            .collect();

        Ok(CategoryBitmap {
            category_name: label.to_string(),
            positions,
        })
    }
}
