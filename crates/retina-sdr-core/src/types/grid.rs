//! Grid (retina) geometry.
//!
//! A [`Grid`] is the `width x height` coordinate space every bit position
//! lives in. Positions are linearized row-major: `pos = row * width + col`.

use serde::{Deserialize, Serialize};

use super::positions::BitPositions;
use crate::error::{SdrError, SdrResult};

/// Absolute slack added before flooring a sparsity cap, so that e.g.
/// `0.29 * 100` floors to 29 rather than 28. Grid scaling floors exactly.
pub const FLOOR_TOLERANCE: f64 = 1e-9;

/// Floors a non-negative product, absorbing binary representation error.
#[inline]
fn floor_tolerant(value: f64) -> usize {
    let floored = (value + FLOOR_TOLERANCE).floor();
    if floored <= 0.0 {
        0
    } else {
        floored as usize
    }
}

/// Coordinate space of an SDR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    /// Create a grid with the given dimensions.
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Create a `side x side` grid.
    pub const fn square(side: usize) -> Self {
        Self::new(side, side)
    }

    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Total number of bit positions, `width * height`.
    #[inline]
    pub const fn n(&self) -> usize {
        self.width * self.height
    }

    /// Whether `position` addresses a cell of this grid.
    #[inline]
    pub const fn contains(&self, position: usize) -> bool {
        position < self.n()
    }

    /// Fraction of ON bits for a bitmap with `on_bits` set positions.
    ///
    /// A zero-area grid has sparsity 0.
    #[inline]
    pub fn sparsity(&self, on_bits: usize) -> f64 {
        let n = self.n();
        if n == 0 {
            0.0
        } else {
            on_bits as f64 / n as f64
        }
    }

    /// Maximum number of ON bits permitted by `max_sparsity`,
    /// i.e. `floor(max_sparsity * n)`.
    #[inline]
    pub fn sparsity_cap(&self, max_sparsity: f64) -> usize {
        floor_tolerant(max_sparsity * self.n() as f64)
    }

    /// Split a linear position into `(row, col)`.
    #[inline]
    pub const fn coordinates(&self, position: usize) -> (usize, usize) {
        (position / self.width, position % self.width)
    }

    /// Ensure every position lies within this grid.
    ///
    /// # Errors
    /// `SdrError::InvalidInput` naming the first out-of-range position.
    pub fn check(&self, positions: &BitPositions) -> SdrResult<()> {
        // Positions are ascending, so the last one is the maximum.
        match positions.last() {
            Some(max) if !self.contains(max) => Err(SdrError::InvalidInput(format!(
                "position {} outside {}x{} grid (n = {})",
                max,
                self.width,
                self.height,
                self.n()
            ))),
            _ => Ok(()),
        }
    }

    /// Derive the grid obtained by scaling both dimensions by `factor`.
    ///
    /// # Errors
    /// - `SdrError::InvalidConfiguration` if `factor` is not in `(0, 1]`
    /// - `SdrError::InvalidConfiguration` if the scaled grid has no cells
    pub fn scaled(&self, factor: f64) -> SdrResult<Grid> {
        validate_scale_factor(factor)?;

        let scaled = Grid::new(
            (self.width as f64 * factor).floor() as usize,
            (self.height as f64 * factor).floor() as usize,
        );
        if scaled.n() == 0 {
            return Err(SdrError::InvalidConfiguration(format!(
                "scale factor {} collapses {}x{} grid to {}x{}",
                factor, self.width, self.height, scaled.width, scaled.height
            )));
        }
        Ok(scaled)
    }
}

/// Check that a scale factor lies in `(0, 1]`.
///
/// # Errors
/// `SdrError::InvalidConfiguration` otherwise (including NaN).
pub fn validate_scale_factor(factor: f64) -> SdrResult<()> {
    if factor > 0.0 && factor <= 1.0 {
        Ok(())
    } else {
        Err(SdrError::InvalidConfiguration(format!(
            "retina can only be scaled by values in (0, 1], got {}",
            factor
        )))
    }
}

/// Check that a sparsity bound lies in `[0, 1]`.
///
/// # Errors
/// `SdrError::InvalidConfiguration` otherwise (including NaN).
pub fn validate_sparsity(name: &str, value: f64) -> SdrResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SdrError::InvalidConfiguration(format!(
            "{} must be in [0, 1], got {}",
            name, value
        )))
    }
}
