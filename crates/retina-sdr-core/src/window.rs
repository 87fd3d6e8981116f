//! Backward sliding-window encodings.
//!
//! The window for token `i` starts as `bitmap[i]` and absorbs predecessors
//! `i-1, i-2, ...` while
//!
//! ```text
//! sparsity(window) + sparsity(bitmap[j]) <= max_sparsity
//! ```
//!
//! The test sums the two sparsities independently instead of measuring the
//! merged union. Because the union collapses shared positions the bound is
//! conservative; this is the established behavior and is kept as is.
//!
//! Windows never look forward, and the window for token 0 is `bitmap[0]`.

use std::ops::ControlFlow;

use tracing::trace;

use crate::error::SdrResult;
use crate::types::{validate_sparsity, BitPositions, Grid, WindowEncoding};

/// Fold accumulator: the union so far and the earliest token merged into it.
struct Window {
    positions: BitPositions,
    start: usize,
}

/// Builds one backward window per token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowBuilder {
    grid: Grid,
    max_sparsity: f64,
    min_sparsity: f64,
}

impl WindowBuilder {
    /// # Arguments
    /// * `grid` - Grid the token bitmaps live in
    /// * `max_sparsity` - Budget for the summed sparsities of a window
    /// * `min_sparsity` - Windows must be strictly denser than this to be emitted
    ///
    /// # Errors
    /// `SdrError::InvalidConfiguration` if either bound is outside `[0, 1]`.
    pub fn new(grid: Grid, max_sparsity: f64, min_sparsity: f64) -> SdrResult<Self> {
        validate_sparsity("max_sparsity", max_sparsity)?;
        validate_sparsity("min_sparsity", min_sparsity)?;
        Ok(Self {
            grid,
            max_sparsity,
            min_sparsity,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    /// Window ending at token `index`, before the minimum-sparsity filter.
    ///
    /// Returns `None` if `index` is out of bounds.
    pub fn window_at(&self, bitmaps: &[BitPositions], index: usize) -> Option<WindowEncoding> {
        let seed = Window {
            positions: bitmaps.get(index)?.clone(),
            start: index,
        };

        // (w + b) / n > max  <=>  w + b > floor(max * n) for integer w + b.
        let cap = self.grid.sparsity_cap(self.max_sparsity);

        let walk = (0..index).rev().try_fold(seed, |window, j| {
            let next = &bitmaps[j];
            if window.positions.len() + next.len() > cap {
                ControlFlow::Break(window)
            } else {
                ControlFlow::Continue(Window {
                    positions: window.positions.union(next),
                    start: j,
                })
            }
        });
        let window = match walk {
            ControlFlow::Continue(window) | ControlFlow::Break(window) => window,
        };

        let sparsity = self.grid.sparsity(window.positions.len());
        trace!(
            index = index,
            start = window.start,
            on_bits = window.positions.len(),
            sparsity = sparsity,
            "Window built"
        );

        Some(WindowEncoding {
            token_span: (window.start, index),
            positions: window.positions,
            sparsity,
        })
    }

    /// All windows strictly denser than the minimum sparsity, in token order.
    pub fn build(&self, bitmaps: &[BitPositions]) -> Vec<WindowEncoding> {
        (0..bitmaps.len())
            .filter_map(|index| self.window_at(bitmaps, index))
            .filter(|window| window.sparsity > self.min_sparsity)
            .collect()
    }
}
