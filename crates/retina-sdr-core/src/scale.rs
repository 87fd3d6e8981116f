//! Rescaling bit positions onto a coarser grid.

use tracing::trace;

use crate::error::SdrResult;
use crate::types::{BitPositions, Grid};

/// Map `positions` from `source` onto the grid scaled by `factor`.
///
/// Each position is split into `(row, col)`, both coordinates are scaled and
/// floored, clipped to the new grid, and re-linearized. Distinct source
/// positions may land on the same target cell; the result is deduplicated.
///
/// # Returns
/// The scaled positions and the new grid.
///
/// # Errors
/// - `SdrError::InvalidConfiguration` if `factor` is not in `(0, 1]` or the
///   scaled grid would be empty
/// - `SdrError::InvalidInput` if a position lies outside `source`
///
/// # Example
///
/// ```
/// use retina_sdr_core::{scale_positions, BitPositions, Grid};
///
/// let (scaled, grid) =
///     scale_positions(&BitPositions::from_unsorted([16383]), Grid::square(128), 0.5).unwrap();
/// assert_eq!(grid, Grid::square(64));
/// assert_eq!(scaled.as_slice(), &[4095]);
/// ```
pub fn scale_positions(
    positions: &BitPositions,
    source: Grid,
    factor: f64,
) -> SdrResult<(BitPositions, Grid)> {
    let target = source.scaled(factor)?;
    source.check(positions)?;

    let max_row = target.height() - 1;
    let max_col = target.width() - 1;

    let scaled: BitPositions = positions
        .iter()
        .map(|&position| {
            let (row, col) = source.coordinates(position);
            let row = ((row as f64 * factor).floor() as usize).min(max_row);
            let col = ((col as f64 * factor).floor() as usize).min(max_col);
            row * target.width() + col
        })
        .collect();

    trace!(
        factor = factor,
        before = positions.len(),
        after = scaled.len(),
        width = target.width(),
        height = target.height(),
        "Scaled positions"
    );

    Ok((scaled, target))
}
