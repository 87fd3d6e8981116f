//! Bitmap fixtures for retina-sdr tests.
//!
//! Random generators draw uniformly from the grid, so their outputs always
//! satisfy the `BitPositions` invariants and lie within the grid.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use retina_sdr_core::{BitPositions, Grid};

/// The 128x128 retina used by the semantic service.
pub const RETINA_GRID: Grid = Grid::square(128);

/// Generate a random bitmap with exactly `on_bits` positions within `grid`.
///
/// # Panics
/// If `on_bits > grid.n()`.
pub fn random_bitmap(grid: Grid, on_bits: usize) -> BitPositions {
    random_bitmap_with(&mut rand::thread_rng(), grid, on_bits)
}

/// Same as [`random_bitmap`] but reproducible from `seed`.
pub fn seeded_bitmap(seed: u64, grid: Grid, on_bits: usize) -> BitPositions {
    random_bitmap_with(&mut StdRng::seed_from_u64(seed), grid, on_bits)
}

fn random_bitmap_with<R: Rng>(rng: &mut R, grid: Grid, on_bits: usize) -> BitPositions {
    assert!(
        on_bits <= grid.n(),
        "cannot set {} bits in a grid of {}",
        on_bits,
        grid.n()
    );
    let mut positions: HashSet<usize> = HashSet::with_capacity(on_bits);
    while positions.len() < on_bits {
        positions.insert(rng.gen_range(0..grid.n()));
    }
    BitPositions::from_unsorted(positions)
}

/// Generate `count` reproducible bitmaps with `sparsity` fraction of ON bits.
pub fn seeded_bitmaps(base_seed: u64, count: usize, grid: Grid, sparsity: f64) -> Vec<BitPositions> {
    let on_bits = (grid.n() as f64 * sparsity).round() as usize;
    (0..count)
        .map(|i| seeded_bitmap(base_seed + i as u64, grid, on_bits))
        .collect()
}

/// Contiguous run `start..start + len` as a bitmap.
pub fn run_bitmap(start: usize, len: usize) -> BitPositions {
    (start..start + len).collect()
}
