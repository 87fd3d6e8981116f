//! Sorted, duplicate-free sets of ON-bit positions.

use serde::{Deserialize, Serialize};

use crate::error::{SdrError, SdrResult};

/// The ON bits of an SDR, as strictly ascending linear positions.
///
/// # Invariants
/// - Strictly ascending (sorted, no duplicates)
/// - Range against a particular grid is checked with [`Grid::check`](super::Grid::check)
///
/// Serializes as a plain JSON array. Deserialization normalizes (sorts and
/// deduplicates) rather than rejecting, matching what the service returns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<usize>", into = "Vec<usize>")]
pub struct BitPositions(Vec<usize>);

impl BitPositions {
    /// Empty set.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Build from positions in any order, dropping duplicates.
    pub fn from_unsorted(positions: impl IntoIterator<Item = usize>) -> Self {
        let mut positions: Vec<usize> = positions.into_iter().collect();
        positions.sort_unstable();
        positions.dedup();
        Self(positions)
    }

    /// Adopt a vector that must already be strictly ascending.
    ///
    /// # Errors
    /// `SdrError::InvalidInput` if the sequence is unordered or has duplicates.
    pub fn try_from_sorted(positions: Vec<usize>) -> SdrResult<Self> {
        validate_sequence(&positions)?;
        Ok(Self(positions))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.0.iter()
    }

    /// Largest position, if any.
    #[inline]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    #[inline]
    pub fn contains(&self, position: usize) -> bool {
        self.0.binary_search(&position).is_ok()
    }

    pub fn into_vec(self) -> Vec<usize> {
        self.0
    }

    /// Set union, collapsing positions present in both.
    #[must_use]
    pub fn union(&self, other: &BitPositions) -> BitPositions {
        let (a, b) = (&self.0, &other.0);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                std::cmp::Ordering::Less => {
                    merged.push(a[i]);
                    i += 1;
                }
                std::cmp::Ordering::Greater => {
                    merged.push(b[j]);
                    j += 1;
                }
                std::cmp::Ordering::Equal => {
                    merged.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        merged.extend_from_slice(&a[i..]);
        merged.extend_from_slice(&b[j..]);
        BitPositions(merged)
    }

    /// Number of positions shared with `other`.
    pub fn overlap(&self, other: &BitPositions) -> usize {
        intersection_count(&self.0, &other.0)
    }

    /// Dense 0/1 representation of length `n`.
    ///
    /// Positions `>= n` are ignored; callers check range with `Grid::check`.
    pub fn to_dense(&self, n: usize) -> Vec<u8> {
        let mut dense = vec![0u8; n];
        for &position in self.0.iter().take_while(|&&p| p < n) {
            dense[position] = 1;
        }
        dense
    }
}

impl From<Vec<usize>> for BitPositions {
    fn from(positions: Vec<usize>) -> Self {
        Self::from_unsorted(positions)
    }
}

impl From<BitPositions> for Vec<usize> {
    fn from(positions: BitPositions) -> Self {
        positions.0
    }
}

impl FromIterator<usize> for BitPositions {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self::from_unsorted(iter)
    }
}

impl AsRef<[usize]> for BitPositions {
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a BitPositions {
    type Item = &'a usize;
    type IntoIter = std::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Check that `positions` is strictly ascending.
///
/// # Errors
/// `SdrError::InvalidInput` naming the offending index.
pub fn validate_sequence(positions: &[usize]) -> SdrResult<()> {
    if let Some(idx) = positions.windows(2).position(|w| w[0] >= w[1]) {
        return Err(SdrError::InvalidInput(format!(
            "bitmap must be strictly ascending: position {} at index {} is followed by {}",
            positions[idx],
            idx,
            positions[idx + 1]
        )));
    }
    Ok(())
}

/// `|a ∩ b|` for two strictly ascending slices.
pub(crate) fn intersection_count(a: &[usize], b: &[usize]) -> usize {
    let (mut i, mut j, mut count) = (0, 0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                count += 1;
                i += 1;
                j += 1;
            }
        }
    }
    count
}
