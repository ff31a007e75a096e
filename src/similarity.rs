//! Similarity between encoded columns.

use crate::encoding::FeatureVector;

/// Cosine similarity of two unit vectors.
///
/// Encodings are normalized when built, so the dot product alone is the
/// cosine and lies in `[-1, 1]`.
pub fn similarity(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
