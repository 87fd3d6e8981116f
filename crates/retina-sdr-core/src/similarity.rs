//! Overlap-based distance and similarity metrics between two bitmaps.
//!
//! Inputs are plain position sequences (the form in which fingerprints are
//! stored and transmitted). When either side is empty every ratio metric is
//! defined as 0 instead of dividing by zero.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::SdrResult;
use crate::types::{intersection_count, validate_sequence};

/// Weights of the composite [`ComparisonMetrics::weighted_scoring`].
///
/// Defaults sum to 1.0, so identical non-empty bitmaps score 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    pub cosine: f64,
    pub left_right: f64,
    pub right_left: f64,
    pub jaccard: f64,
}

impl Default for CompositeWeights {
    fn default() -> Self {
        Self {
            cosine: 0.4,
            left_right: 0.2,
            right_left: 0.2,
            jaccard: 0.2,
        }
    }
}

/// Metrics record for a pair of bitmaps.
///
/// Serialized with the service's camelCase keys:
///
/// ```text
/// {
///   "cosineSimilarity": 0.666, "euclideanDistance": 2.449,
///   "jaccardDistance": 0.5, "overlappingAll": 6,
///   "overlappingLeftRight": 0.666, "overlappingRightLeft": 0.666,
///   "sizeLeft": 9, "sizeRight": 9, "weightedScoring": 0.633
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonMetrics {
    /// `|A∩B| / sqrt(|A|·|B|)`
    pub cosine_similarity: f64,
    /// Distance between the two binary vectors, `sqrt(|A| + |B| - 2|A∩B|)`.
    pub euclidean_distance: f64,
    /// `1 - |A∩B| / |A∪B|`
    pub jaccard_distance: f64,
    /// `|A∩B|`
    pub overlapping_all: usize,
    /// `|A∩B| / |A|`
    pub overlapping_left_right: f64,
    /// `|A∩B| / |B|`
    pub overlapping_right_left: f64,
    pub size_left: usize,
    pub size_right: usize,
    pub weighted_scoring: f64,
}

/// Compare two bitmaps with the default composite weights.
///
/// # Errors
/// `SdrError::InvalidInput` if either sequence is not strictly ascending.
///
/// # Example
///
/// ```
/// use retina_sdr_core::compare;
///
/// let metrics = compare(&[], &[1, 2, 3]).unwrap();
/// assert_eq!(metrics.overlapping_all, 0);
/// assert_eq!(metrics.cosine_similarity, 0.0);
/// ```
pub fn compare(left: &[usize], right: &[usize]) -> SdrResult<ComparisonMetrics> {
    compare_weighted(left, right, &CompositeWeights::default())
}

/// Compare two bitmaps with explicit composite weights.
///
/// # Errors
/// `SdrError::InvalidInput` if either sequence is not strictly ascending.
pub fn compare_weighted(
    left: &[usize],
    right: &[usize],
    weights: &CompositeWeights,
) -> SdrResult<ComparisonMetrics> {
    validate_sequence(left)?;
    validate_sequence(right)?;

    let size_left = left.len();
    let size_right = right.len();
    let overlap = intersection_count(left, right);
    let symmetric_difference = size_left + size_right - 2 * overlap;
    let euclidean_distance = (symmetric_difference as f64).sqrt();

    let metrics = if size_left == 0 || size_right == 0 {
        ComparisonMetrics {
            cosine_similarity: 0.0,
            euclidean_distance,
            jaccard_distance: 0.0,
            overlapping_all: 0,
            overlapping_left_right: 0.0,
            overlapping_right_left: 0.0,
            size_left,
            size_right,
            weighted_scoring: 0.0,
        }
    } else {
        let overlap_f = overlap as f64;
        let union = (size_left + size_right - overlap) as f64;
        let jaccard_similarity = overlap_f / union;
        let cosine_similarity = overlap_f / ((size_left * size_right) as f64).sqrt();
        let overlapping_left_right = overlap_f / size_left as f64;
        let overlapping_right_left = overlap_f / size_right as f64;

        let weighted_scoring = weights.cosine * cosine_similarity
            + weights.left_right * overlapping_left_right
            + weights.right_left * overlapping_right_left
            + weights.jaccard * jaccard_similarity;

        ComparisonMetrics {
            cosine_similarity,
            euclidean_distance,
            jaccard_distance: 1.0 - jaccard_similarity,
            overlapping_all: overlap,
            overlapping_left_right,
            overlapping_right_left,
            size_left,
            size_right,
            weighted_scoring,
        }
    };

    trace!(
        size_left = size_left,
        size_right = size_right,
        overlap = overlap,
        "Compared bitmaps"
    );

    Ok(metrics)
}
