//! Text to SDR encoder.
//!
//! [`SemanticEncoder`] routes a text through the configured
//! [`FingerprintType`], falls back to the configured substitute strategy when
//! the source cannot encode it, and finishes every record by rescaling it to
//! the configured grid.
//!
//! # Fallback chain
//!
//! ```text
//! primary (document | word | bitmap)
//!   └─ EncodingUnavailable → substitute (keyword union | least-frequent token)
//!        └─ EncodingUnavailable → Ok(None)
//! ```
//!
//! Any other error propagates unchanged.

mod fallback;

use std::fmt;
use std::sync::Arc;

use retina_sdr_core::{
    BitPositions, ComparisonMetrics, EncodingRecord, Grid, TokenBitmap, UnionAggregator,
    WindowBuilder, WindowEncoding,
};
use tracing::{debug, instrument, warn};

use crate::config::{EncoderConfig, FingerprintType};
use crate::error::{EncoderError, EncoderResult};
use crate::source::{CategoryBitmap, ScoredTerm, TokenBitmapSource};
use crate::tokenizer::{SimpleTokenizer, Tokenizer};

/// Terms returned by [`SemanticEncoder::decode`] when no count is given.
pub const DEFAULT_DECODE_TERMS: usize = 10;

/// Name reported by [`SemanticEncoder::description`].
pub const ENCODER_NAME: &str = "Semantic Encoder";

/// Encodes text into sparse retina fingerprints.
///
/// Configuration is fixed at construction; both grids are derived from it
/// once and never change.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use retina_sdr_encoder::{EncoderConfig, SemanticEncoder, StubBitmapSource};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let config = EncoderConfig::default().with_api_key("dev");
///     let encoder = SemanticEncoder::new(config, Arc::new(StubBitmapSource::default()))?;
///
///     if let Some(record) = encoder.encode("neurons fire together").await? {
///         assert_eq!((record.width, record.height), (128, 128));
///     }
///     Ok(())
/// }
/// ```
pub struct SemanticEncoder {
    config: EncoderConfig,
    source: Arc<dyn TokenBitmapSource>,
    tokenizer: Arc<dyn Tokenizer>,
    base_grid: Grid,
    grid: Grid,
}

impl fmt::Debug for SemanticEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticEncoder")
            .field("retina", &self.config.retina)
            .field("fingerprint_type", &self.config.fingerprint_type)
            .field("substitute", &self.config.substitute)
            .field("base_grid", &self.base_grid)
            .field("grid", &self.grid)
            .finish_non_exhaustive()
    }
}

impl SemanticEncoder {
    /// Create an encoder over `source`.
    ///
    /// # Errors
    /// - `ConfigurationMissing` if the config carries no api key
    /// - `ConfigError` / `InvalidConfiguration` if validation fails
    pub fn new(config: EncoderConfig, source: Arc<dyn TokenBitmapSource>) -> EncoderResult<Self> {
        config.require_api_key()?;
        config.validate()?;
        let base_grid = config.base_grid()?;
        let grid = config.grid()?;

        debug!(
            retina = %config.retina,
            fingerprint_type = %config.fingerprint_type,
            substitute = ?config.substitute,
            width = grid.width(),
            height = grid.height(),
            "semantic encoder created"
        );

        Ok(Self {
            config,
            source,
            tokenizer: Arc::new(SimpleTokenizer::default()),
            base_grid,
            grid,
        })
    }

    /// Replace the local tokenizer used for union encodings.
    #[must_use]
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    // ========================================================================
    // ENCODING
    // ========================================================================

    /// Encode `text` with the configured strategy.
    ///
    /// Returns `Ok(None)` when neither the primary nor the substitute
    /// strategy could encode the text.
    #[instrument(skip(self, text), fields(fingerprint_type = %self.config.fingerprint_type, text_len = text.len()))]
    pub async fn encode(&self, text: &str) -> EncoderResult<Option<EncodingRecord>> {
        let primary = match self.config.fingerprint_type {
            FingerprintType::Document => self.get_document_encoding(text).await,
            FingerprintType::Word => self.get_union_encoding(text).await,
            FingerprintType::Bitmap => self.get_term_encoding(text).await,
        };

        let raw = match primary {
            Ok(record) => Some(record),
            Err(err) if err.is_unavailable() => {
                warn!(
                    error = %err,
                    substitute = ?self.config.substitute,
                    "primary encoding unavailable, trying substitute"
                );
                self.substitute_encoding(text).await?
            }
            Err(err) => return Err(err),
        };

        raw.map(|record| self.finish_encoding(record)).transpose()
    }

    /// Whole-document fingerprint over the base grid, unscaled.
    pub async fn get_document_encoding(&self, text: &str) -> EncoderResult<EncodingRecord> {
        let positions = self.source.get_text_bitmap(text).await?;
        self.raw_record(text, positions)
    }

    /// Fingerprint of `text` taken as one term, unscaled.
    pub async fn get_term_encoding(&self, text: &str) -> EncoderResult<EncodingRecord> {
        let bitmap = self.source.get_bitmap(text).await?;
        Ok(self
            .raw_record(text, bitmap.positions)?
            .with_df(bitmap.document_frequency))
    }

    /// Sparsity-capped union of the token bitmaps of `text`, unscaled.
    pub async fn get_union_encoding(&self, text: &str) -> EncoderResult<EncodingRecord> {
        let tokens = self.tokenizer.tokenize(text);
        let bitmaps = self.token_positions(&tokens).await?;

        let aggregator = UnionAggregator::new(self.base_grid, self.config.union_sparsity)?;
        let union = aggregator.aggregate(&bitmaps);
        debug!(
            tokens = tokens.len(),
            on_bits = union.len(),
            cap = aggregator.cap(),
            "union encoding built"
        );

        self.raw_record(text, union)
    }

    /// Backward sliding-window encodings for `tokens`, one per token whose
    /// window sparsity exceeds `min_sparsity`.
    ///
    /// Windows stay on the base grid.
    ///
    /// # Errors
    /// - `InvalidConfiguration` if `min_sparsity` is not in `[0, 1]`
    /// - any source error for a token bitmap
    #[instrument(skip(self, tokens), fields(token_count = tokens.len()))]
    pub async fn get_window_encodings(
        &self,
        tokens: &[String],
        min_sparsity: f64,
    ) -> EncoderResult<Vec<WindowEncoding>> {
        if self.config.fingerprint_type != FingerprintType::Word {
            warn!(
                fingerprint_type = %self.config.fingerprint_type,
                "window encodings are built from word bitmaps"
            );
        }

        let builder = WindowBuilder::new(self.base_grid, self.config.union_sparsity, min_sparsity)?;
        let bitmaps = self.token_positions(tokens).await?;
        let windows = builder.build(&bitmaps);
        debug!(windows = windows.len(), "window encodings built");
        Ok(windows)
    }

    /// Rescale `record` to the configured grid and refresh its sparsity.
    pub fn finish_encoding(&self, record: EncodingRecord) -> EncoderResult<EncodingRecord> {
        Ok(retina_sdr_core::finish_encoding(
            record,
            self.config.retina_scaling,
        )?)
    }

    /// Encode `text` into a dense 0/1 buffer of length `n`.
    ///
    /// The buffer is zeroed first; returns whether an encoding was written.
    ///
    /// # Errors
    /// `InvalidInput` if `buffer.len()` differs from the scaled grid size.
    pub async fn encode_into_array(&self, text: &str, buffer: &mut [u8]) -> EncoderResult<bool> {
        if buffer.len() != self.grid.n() {
            return Err(EncoderError::InvalidInput(format!(
                "output buffer has length {}, encoder width is {}",
                buffer.len(),
                self.grid.n()
            )));
        }
        buffer.fill(0);

        let Some(record) = self.encode(text).await? else {
            return Ok(false);
        };
        for &position in record.positions() {
            let bit = buffer.get_mut(position).ok_or_else(|| {
                EncoderError::InvalidInput(format!(
                    "position {} outside {}-bit output",
                    position,
                    self.grid.n()
                ))
            })?;
            *bit = 1;
        }
        Ok(true)
    }

    // ========================================================================
    // DECODE / COMPARE / CLASSIFY
    // ========================================================================

    /// Terms most similar to `positions`, best first.
    ///
    /// `positions` must lie on [`grid`](Self::grid), the grid finished
    /// encodings are reported on. `num_terms` defaults to
    /// [`DEFAULT_DECODE_TERMS`].
    pub async fn decode(
        &self,
        positions: &[usize],
        num_terms: Option<usize>,
    ) -> EncoderResult<Vec<ScoredTerm>> {
        let positions = BitPositions::try_from_sorted(positions.to_vec())?;
        self.grid.check(&positions)?;
        self.source
            .bitmap_to_terms(&positions, num_terms.unwrap_or(DEFAULT_DECODE_TERMS))
            .await
    }

    /// Similarity metrics between two position sequences.
    pub fn compare(&self, left: &[usize], right: &[usize]) -> EncoderResult<ComparisonMetrics> {
        Ok(retina_sdr_core::compare(left, right)?)
    }

    /// Learn a category bitmap named `label`.
    ///
    /// # Errors
    /// `InvalidInput` for an empty label, no positive examples, or an example
    /// that is not strictly ascending.
    pub async fn create_category(
        &self,
        label: &str,
        positives: &[Vec<usize>],
        negatives: &[Vec<usize>],
    ) -> EncoderResult<CategoryBitmap> {
        if label.trim().is_empty() {
            return Err(EncoderError::InvalidInput(
                "category label must not be empty".to_string(),
            ));
        }
        if positives.is_empty() {
            return Err(EncoderError::InvalidInput(format!(
                "category '{}' needs at least one positive example",
                label
            )));
        }

        let positives = to_bitmaps(positives)?;
        let negatives = to_bitmaps(negatives)?;
        debug!(
            label,
            positives = positives.len(),
            negatives = negatives.len(),
            "creating category"
        );
        self.source
            .create_classification(label, &positives, &negatives)
            .await
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Native retina grid; raw encodings and windows live here.
    pub fn base_grid(&self) -> Grid {
        self.base_grid
    }

    /// Grid of finished encodings.
    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Total bits of a finished encoding.
    pub fn width(&self) -> usize {
        self.grid.n()
    }

    /// `(width, height)` of finished encodings.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.grid.width(), self.grid.height())
    }

    /// Name and bit offset of this encoder's field.
    pub fn description(&self) -> (&'static str, usize) {
        (ENCODER_NAME, 0)
    }

    // ========================================================================
    // HELPERS
    // ========================================================================

    fn raw_record(&self, text: &str, positions: BitPositions) -> EncoderResult<EncodingRecord> {
        self.base_grid.check(&positions)?;
        Ok(EncodingRecord::new(text, positions, self.base_grid))
    }

    async fn token_positions(&self, tokens: &[String]) -> EncoderResult<Vec<BitPositions>> {
        let bitmaps = self.source.get_bitmaps(tokens).await?;
        bitmaps
            .into_iter()
            .map(|TokenBitmap { positions, .. }| -> EncoderResult<BitPositions> {
                self.base_grid.check(&positions)?;
                Ok(positions)
            })
            .collect()
    }
}

fn to_bitmaps(examples: &[Vec<usize>]) -> EncoderResult<Vec<BitPositions>> {
    examples
        .iter()
        .map(|example| -> EncoderResult<BitPositions> {
            Ok(BitPositions::try_from_sorted(example.clone())?)
        })
        .collect()
}
