//! Bitmap source contract.
//!
//! A [`TokenBitmapSource`] turns terms and documents into retina bitmaps.
//! It is the only suspending collaborator of the encoder; every other step
//! is pure.
//!
//! # Architecture
//!
//! ```text
//! TokenBitmapSource (trait)
//! ├── get_bitmap(&str) -> TokenBitmap              // one term + df
//! ├── get_bitmaps(&[String]) -> Vec<TokenBitmap>   // default: sequential
//! ├── get_text_bitmap(&str) -> BitPositions        // whole document
//! ├── bitmap_to_terms(&BitPositions, n) -> Vec<ScoredTerm>
//! ├── tokenize(&str) -> Vec<String>                // service-side tokens
//! └── create_classification(label, +, -) -> CategoryBitmap
//!
//! StubBitmapSource (struct)
//! └── deterministic hash-derived bitmaps, no network
//! ```
//!
//! Failures to produce a bitmap are reported as
//! [`EncoderError::EncodingUnavailable`](crate::EncoderError::EncodingUnavailable).
//! Dropping a returned future cancels the request.

mod stub;

use async_trait::async_trait;
use retina_sdr_core::{BitPositions, TokenBitmap};
use serde::{Deserialize, Serialize};

use crate::error::EncoderResult;

pub use stub::{StubBitmapSource, DEFAULT_STUB_ON_BITS};

/// A term returned when decoding a bitmap, with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTerm {
    pub term: String,
    pub score: f64,
}

impl ScoredTerm {
    pub fn new(term: impl Into<String>, score: f64) -> Self {
        Self {
            term: term.into(),
            score,
        }
    }
}

/// Bitmap describing a category learned from example bitmaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBitmap {
    pub category_name: String,
    pub positions: BitPositions,
}

/// Source of retina bitmaps for terms and documents.
#[async_trait]
pub trait TokenBitmapSource: Send + Sync {
    /// Bitmap and document frequency of a single term.
    async fn get_bitmap(&self, term: &str) -> EncoderResult<TokenBitmap>;

    /// Bitmaps for several terms, in input order.
    ///
    /// Default implementation calls `get_bitmap` for each term and stops at
    /// the first failure.
    async fn get_bitmaps(&self, terms: &[String]) -> EncoderResult<Vec<TokenBitmap>> {
        let mut results = Vec::with_capacity(terms.len());
        for term in terms {
            results.push(self.get_bitmap(term).await?);
        }
        Ok(results)
    }

    /// Bitmap of a whole document.
    async fn get_text_bitmap(&self, text: &str) -> EncoderResult<BitPositions>;

    /// The `num_terms` terms most similar to `positions`, best first.
    async fn bitmap_to_terms(
        &self,
        positions: &BitPositions,
        num_terms: usize,
    ) -> EncoderResult<Vec<ScoredTerm>>;

    /// Service-side tokenization.
    ///
    /// Each returned string is one sentence whose tokens are comma-separated.
    async fn tokenize(&self, text: &str) -> EncoderResult<Vec<String>>;

    /// Learn a category bitmap from positive and negative examples.
    async fn create_classification(
        &self,
        label: &str,
        positives: &[BitPositions],
        negatives: &[BitPositions],
    ) -> EncoderResult<CategoryBitmap>;
}
