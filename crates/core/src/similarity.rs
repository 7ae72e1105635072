//! Vector similarity primitives for dense retrieval and MMR.
//!
//! Cosine similarity is undefined when either vector has zero norm; every
//! function here returns 0.0 in that case instead of dividing by zero.

/// Norms below this are treated as zero.
const ZERO_NORM: f32 = 1e-10;

/// Dot product of two equal-length slices.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean (L2) norm.
#[inline]
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Cosine similarity in [-1, 1]. Returns 0.0 if either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    cosine_prenorm(a, l2_norm(a), b, l2_norm(b))
}

/// Cosine similarity with precomputed norms.
///
/// Used on the hot path where document norms are cached in the index and the
/// query norm is computed once per call.
#[inline]
pub fn cosine_prenorm(a: &[f32], a_norm: f32, b: &[f32], b_norm: f32) -> f32 {
    let denom = a_norm * b_norm;
    if denom < ZERO_NORM {
        return 0.0;
    }
    dot(a, b) / denom
}
