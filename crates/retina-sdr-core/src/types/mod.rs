//! Value types shared by every SDR operation.
//!
//! - [`Grid`]: the retina coordinate space
//! - [`BitPositions`]: ascending, duplicate-free ON-bit positions
//! - [`TokenBitmap`], [`WindowEncoding`], [`EncodingRecord`]: encoding outputs
//!
//! All of these are plain values. Nothing here holds shared mutable state.

mod grid;
mod positions;
mod record;

pub use grid::{validate_scale_factor, validate_sparsity, Grid, FLOOR_TOLERANCE};
pub use positions::{validate_sequence, BitPositions};
pub(crate) use positions::intersection_count;
pub use record::{EncodingRecord, Fingerprint, TokenBitmap, WindowEncoding};
