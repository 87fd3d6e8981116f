//! Final assembly of an [`EncodingRecord`].

use crate::error::SdrResult;
use crate::scale::scale_positions;
use crate::types::EncodingRecord;

/// Rescale (if `scale_factor != 1`) and refresh the derived sparsity.
///
/// Scaling replaces the positions *and* the record's width/height, and only
/// then is sparsity recomputed, so the stored sparsity always refers to the
/// post-scaling grid.
///
/// # Errors
/// - `SdrError::InvalidConfiguration` if `scale_factor` is not in `(0, 1]`
/// - `SdrError::InvalidInput` if a position lies outside the record's grid
pub fn finish_encoding(mut record: EncodingRecord, scale_factor: f64) -> SdrResult<EncodingRecord> {
    if scale_factor != 1.0 {
        let (positions, grid) =
            scale_positions(&record.fingerprint.positions, record.grid(), scale_factor)?;
        record.fingerprint.positions = positions;
        record.width = grid.width();
        record.height = grid.height();
    }

    record.refresh_sparsity();
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SdrError;
    use crate::types::{BitPositions, Grid};

    #[test]
    fn test_unit_scale_keeps_positions() {
        let positions = BitPositions::from_unsorted([1, 500, 16383]);
        let mut record = EncodingRecord::new("text", positions.clone(), Grid::square(128));
        record.sparsity = 0.9; // stale value from the wire

        let finished = finish_encoding(record, 1.0).unwrap();
        assert_eq!(finished.positions(), &positions);
        assert_eq!((finished.width, finished.height), (128, 128));
        assert!((finished.sparsity - 3.0 / 16384.0).abs() < 1e-15);
    }

    #[test]
    fn test_half_scale_updates_grid_before_sparsity() {
        let positions = BitPositions::from_unsorted([0, 1, 128, 129, 16383]);
        let record = EncodingRecord::new("text", positions, Grid::square(128));

        let finished = finish_encoding(record, 0.5).unwrap();
        assert_eq!((finished.width, finished.height), (64, 64));
        assert_eq!(finished.positions().as_slice(), &[0, 4095]);
        // 2 ON bits over the 64x64 grid, not the 128x128 one.
        assert!((finished.sparsity - 2.0 / 4096.0).abs() < 1e-15);
    }

    #[test]
    fn test_preserves_metadata() {
        let record = EncodingRecord::new("t", BitPositions::from_unsorted([5]), Grid::square(128))
            .with_df(0.3)
            .with_score(2.5);
        let finished = finish_encoding(record, 0.25).unwrap();
        assert_eq!(finished.df, 0.3);
        assert_eq!(finished.score, 2.5);
        assert_eq!(finished.text, "t");
    }

    #[test]
    fn test_zero_area_record() {
        let record = EncodingRecord::new("t", BitPositions::new(), Grid::new(0, 0));
        let finished = finish_encoding(record, 1.0).unwrap();
        assert_eq!(finished.sparsity, 0.0);
    }

    #[test]
    fn test_invalid_scale() {
        let record = EncodingRecord::new("t", BitPositions::new(), Grid::square(128));
        assert!(matches!(
            finish_encoding(record, 1.5),
            Err(SdrError::InvalidConfiguration(_))
        ));
    }
}
