//! Retina SDR Encoder
//!
//! Turns text into sparse retina fingerprints by combining a
//! [`TokenBitmapSource`] with the pure algorithms of `retina-sdr-core`.
//!
//! # Components
//!
//! - [`EncoderConfig`]: retina, scaling, strategy selection (TOML + env)
//! - [`TokenBitmapSource`]: async bitmap provider contract
//! - [`StubBitmapSource`]: deterministic provider for development and tests
//! - [`Tokenizer`] / [`SimpleTokenizer`]: local tokenization for unions
//! - [`SemanticEncoder`]: encode, window, decode, compare, classify
//!
//! The library logs through `tracing` and never installs a subscriber.

pub mod config;
pub mod encoder;
pub mod error;
pub mod source;
pub mod tokenizer;

pub use config::{
    retina_spec, EncoderConfig, FingerprintType, RetinaSpec, SubstituteMethod, DEFAULT_RETINA,
    DEFAULT_UNION_SPARSITY, RETINAS,
};
pub use encoder::{SemanticEncoder, DEFAULT_DECODE_TERMS, ENCODER_NAME};
pub use error::{EncoderError, EncoderResult};
pub use source::{
    CategoryBitmap, ScoredTerm, StubBitmapSource, TokenBitmapSource, DEFAULT_STUB_ON_BITS,
};
pub use tokenizer::{SimpleTokenizer, Tokenizer};

// Core types that appear in this crate's public signatures.
pub use retina_sdr_core::{
    BitPositions, ComparisonMetrics, EncodingRecord, Grid, TokenBitmap, WindowEncoding,
};
