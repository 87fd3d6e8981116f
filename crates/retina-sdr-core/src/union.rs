//! Sparsity-capped union of token bitmaps.
//!
//! Every position seen in any input bitmap is counted; the most frequent
//! positions survive, up to `floor(max_sparsity * n)` of them. Ties go to the
//! lower position so the result is reproducible.

use std::collections::HashMap;

use tracing::trace;

use crate::error::SdrResult;
use crate::types::{validate_sparsity, BitPositions, Grid};

/// Frequency of each position across a set of bitmaps.
pub type PositionCounts = HashMap<usize, usize>;

/// Count how many of `bitmaps` contain each position.
pub fn position_counts<'a, I>(bitmaps: I) -> PositionCounts
where
    I: IntoIterator<Item = &'a BitPositions>,
{
    let mut counts = PositionCounts::new();
    for bitmap in bitmaps {
        for &position in bitmap {
            *counts.entry(position).or_insert(0) += 1;
        }
    }
    counts
}

/// Merges token bitmaps into one sparsity-bounded union.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnionAggregator {
    grid: Grid,
    max_sparsity: f64,
}

impl UnionAggregator {
    /// # Errors
    /// `SdrError::InvalidConfiguration` if `max_sparsity` is not in `[0, 1]`.
    pub fn new(grid: Grid, max_sparsity: f64) -> SdrResult<Self> {
        validate_sparsity("max_sparsity", max_sparsity)?;
        Ok(Self { grid, max_sparsity })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn max_sparsity(&self) -> f64 {
        self.max_sparsity
    }

    /// Maximum number of positions in the output.
    pub fn cap(&self) -> usize {
        self.grid.sparsity_cap(self.max_sparsity)
    }

    /// Union of `bitmaps`, keeping the most frequent positions.
    pub fn aggregate(&self, bitmaps: &[BitPositions]) -> BitPositions {
        self.aggregate_counts(&position_counts(bitmaps))
    }

    /// Same as [`aggregate`](Self::aggregate) over precomputed counts.
    pub fn aggregate_counts(&self, counts: &PositionCounts) -> BitPositions {
        let cap = self.cap();

        let mut ranked: Vec<(usize, usize)> = counts
            .iter()
            .map(|(&position, &count)| (position, count))
            .collect();
        // Descending frequency, then ascending position.
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        ranked.truncate(cap);

        trace!(
            distinct = counts.len(),
            cap = cap,
            kept = ranked.len(),
            "Sparse union"
        );

        ranked.into_iter().map(|(position, _)| position).collect()
    }
}

/// One-shot [`UnionAggregator::aggregate`].
///
/// # Errors
/// `SdrError::InvalidConfiguration` if `max_sparsity` is not in `[0, 1]`.
pub fn sparse_union(
    bitmaps: &[BitPositions],
    grid: Grid,
    max_sparsity: f64,
) -> SdrResult<BitPositions> {
    Ok(UnionAggregator::new(grid, max_sparsity)?.aggregate(bitmaps))
}
