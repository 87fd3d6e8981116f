//! Property checks for the SDR algorithms over realistic retina-sized data.
//!
//! Bitmaps come from seeded generators so every run sees the same inputs.

use retina_sdr_core::{
    compare, finish_encoding, scale_positions, sparse_union, BitPositions, EncodingRecord, Grid,
    UnionAggregator, WindowBuilder,
};
use retina_sdr_test_utils::{run_bitmap, seeded_bitmap, seeded_bitmaps, RETINA_GRID};

// =============================================================================
// UNION
// =============================================================================

#[test]
fn test_union_never_exceeds_cap() {
    for (seed, sparsity) in [(1, 0.01), (2, 0.05), (3, 0.2), (4, 0.33)] {
        let bitmaps = seeded_bitmaps(seed * 100, 12, RETINA_GRID, 0.02);
        let aggregator = UnionAggregator::new(RETINA_GRID, sparsity).unwrap();
        let union = aggregator.aggregate(&bitmaps);
        assert!(
            union.len() <= aggregator.cap(),
            "union of {} bits exceeds cap {} at sparsity {}",
            union.len(),
            aggregator.cap(),
            sparsity
        );
        assert!(RETINA_GRID.check(&union).is_ok());
    }
}

#[test]
fn test_union_identity_for_single_token() {
    let bitmap = seeded_bitmap(42, RETINA_GRID, 328);
    let union = sparse_union(&[bitmap.clone()], RETINA_GRID, 0.2).unwrap();
    assert_eq!(union, bitmap);
}

#[test]
fn test_union_is_deterministic() {
    let bitmaps = seeded_bitmaps(9, 20, RETINA_GRID, 0.03);
    let first = sparse_union(&bitmaps, RETINA_GRID, 0.02).unwrap();
    let mut reversed = bitmaps.clone();
    reversed.reverse();
    let second = sparse_union(&reversed, RETINA_GRID, 0.02).unwrap();
    assert_eq!(first, second, "input order must not change the union");
}

#[test]
fn test_union_prefers_shared_positions() {
    let shared = run_bitmap(1000, 50);
    let bitmaps: Vec<BitPositions> = (0..5)
        .map(|i| shared.union(&seeded_bitmap(500 + i, RETINA_GRID, 200)))
        .collect();
    let union = sparse_union(&bitmaps, RETINA_GRID, 50.0 / 16384.0).unwrap();
    assert_eq!(union, shared);
}

// =============================================================================
// WINDOWS
// =============================================================================

#[test]
fn test_first_window_equals_first_bitmap() {
    let bitmaps = seeded_bitmaps(77, 8, RETINA_GRID, 0.02);
    let builder = WindowBuilder::new(RETINA_GRID, 0.2, 0.0).unwrap();
    let windows = builder.build(&bitmaps);
    assert_eq!(windows[0].token_span, (0, 0));
    assert_eq!(windows[0].positions, bitmaps[0]);
}

#[test]
fn test_windows_only_look_backward() {
    let bitmaps = seeded_bitmaps(5, 10, RETINA_GRID, 0.02);
    let builder = WindowBuilder::new(RETINA_GRID, 0.1, 0.0).unwrap();
    for (index, window) in builder.build(&bitmaps).iter().enumerate() {
        assert_eq!(window.token_span.1, index);
        assert!(window.token_span.0 <= index);
        // The window is exactly the union of its span.
        let covered = bitmaps[window.token_span.0..=index]
            .iter()
            .fold(BitPositions::new(), |acc, b| acc.union(b));
        assert_eq!(window.positions, covered);
    }
}

#[test]
fn test_window_sum_budget_bounds_true_sparsity() {
    let bitmaps = seeded_bitmaps(11, 15, RETINA_GRID, 0.03);
    let builder = WindowBuilder::new(RETINA_GRID, 0.1, 0.0).unwrap();
    for window in builder.build(&bitmaps) {
        // A window holding more than one token passed the summed test, so the
        // deduplicated union cannot exceed the budget.
        if window.span_len() > 1 {
            assert!(window.sparsity <= 0.1 + 1e-12);
        }
    }
}

// =============================================================================
// SCALING
// =============================================================================

#[test]
fn test_scaled_positions_within_new_grid() {
    let bitmap = seeded_bitmap(3, RETINA_GRID, 2000);
    for factor in [0.05, 0.1, 0.3, 0.5, 0.77, 1.0] {
        let (scaled, grid) = scale_positions(&bitmap, RETINA_GRID, factor).unwrap();
        assert!(scaled.iter().all(|&p| p < grid.n()));
        assert!(scaled.len() <= bitmap.len());
    }
}

#[test]
fn test_reference_corner_example() {
    let (scaled, grid) =
        scale_positions(&BitPositions::from_unsorted([16383]), RETINA_GRID, 0.5).unwrap();
    assert_eq!((grid.width(), grid.height(), grid.n()), (64, 64, 4096));
    assert_eq!(scaled.as_slice(), &[4095]);
}

// =============================================================================
// SIMILARITY
// =============================================================================

#[test]
fn test_self_similarity_on_random_bitmaps() {
    for seed in 0..5 {
        let bitmap = seeded_bitmap(seed, RETINA_GRID, 300);
        let metrics = compare(bitmap.as_slice(), bitmap.as_slice()).unwrap();
        assert_eq!(metrics.overlapping_all, bitmap.len());
        assert_eq!(metrics.jaccard_distance, 0.0);
        assert!((metrics.cosine_similarity - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_similarity_symmetry() {
    let a = seeded_bitmap(1, RETINA_GRID, 300);
    let b = seeded_bitmap(2, RETINA_GRID, 500);
    let ab = compare(a.as_slice(), b.as_slice()).unwrap();
    let ba = compare(b.as_slice(), a.as_slice()).unwrap();
    assert_eq!(ab.overlapping_all, ba.overlapping_all);
    assert_eq!(ab.cosine_similarity, ba.cosine_similarity);
    assert_eq!(ab.jaccard_distance, ba.jaccard_distance);
    assert_eq!(ab.overlapping_left_right, ba.overlapping_right_left);
    assert_eq!(ab.euclidean_distance, ba.euclidean_distance);
}

// =============================================================================
// ASSEMBLY
// =============================================================================

#[test]
fn test_finish_encoding_pipeline() {
    let bitmaps = seeded_bitmaps(21, 6, RETINA_GRID, 0.02);
    let union = sparse_union(&bitmaps, RETINA_GRID, 0.05).unwrap();
    let record = EncodingRecord::new("six tokens", union, RETINA_GRID);

    let finished = finish_encoding(record, 0.5).unwrap();
    let grid = Grid::new(finished.width, finished.height);
    assert_eq!(grid, Grid::square(64));
    assert!(grid.check(finished.positions()).is_ok());
    assert!(
        (finished.sparsity - finished.positions().len() as f64 / 4096.0).abs() < 1e-15
    );

    let json = finished.to_json().unwrap();
    let parsed = EncodingRecord::from_json(&json).unwrap();
    assert_eq!(parsed.positions(), finished.positions());
    assert_eq!((parsed.width, parsed.height), (64, 64));
}
