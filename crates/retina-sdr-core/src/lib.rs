//! Retina SDR Core Library
//!
//! Pure algorithms over sparse distributed representations (SDRs) expressed
//! as sorted ON-bit positions on a `width x height` retina grid.
//!
//! # Architecture
//!
//! - **UnionAggregator**: sparsity-capped union of many token bitmaps
//! - **WindowBuilder**: backward sliding-window unions under a sparsity budget
//! - **scale_positions**: remap positions onto a coarser grid
//! - **compare**: overlap, Jaccard, cosine and Euclidean metrics
//! - **finish_encoding**: rescale an `EncodingRecord` and refresh its sparsity
//!
//! Everything here is synchronous and side-effect free. Fetching bitmaps
//! from a semantic service lives in `retina-sdr-encoder`.
//!
//! # Example
//!
//! ```
//! use retina_sdr_core::{sparse_union, BitPositions, Grid};
//!
//! let grid = Grid::new(10, 10);
//! let a = BitPositions::from_unsorted([1, 2, 3]);
//! let b = BitPositions::from_unsorted([3, 4]);
//!
//! let union = sparse_union(&[a, b], grid, 0.03).unwrap();
//! // Position 3 is shared, then ties break toward lower positions.
//! assert_eq!(union.as_slice(), &[1, 2, 3]);
//! ```

pub mod assembly;
pub mod error;
pub mod scale;
pub mod similarity;
pub mod types;
pub mod union;
pub mod window;

// Re-exports for convenience
pub use assembly::finish_encoding;
pub use error::{SdrError, SdrResult};
pub use scale::scale_positions;
pub use similarity::{compare, compare_weighted, ComparisonMetrics, CompositeWeights};
pub use types::{
    validate_scale_factor, validate_sequence, validate_sparsity, BitPositions, EncodingRecord,
    Fingerprint, Grid, TokenBitmap, WindowEncoding,
};
pub use union::{position_counts, sparse_union, PositionCounts, UnionAggregator};
pub use window::WindowBuilder;
