//! Hybrid score fusion.
//!
//! Dense and lexical score vectors live on incomparable scales. Each is min-max
//! normalized to [0, 1] independently, then blended linearly:
//! `fused(d) = alpha * dense_norm(d) + (1 - alpha) * lexical_norm(d)`.

use crate::error::{Result, RetrievalError};
use crate::search::ranking::top_k;

/// Min-max normalization to [0, 1].
///
/// A degenerate sequence (all values equal) cannot be normalized without a
/// division by zero; it is returned unchanged. This means an all-equal
/// sequence keeps its raw magnitude in the blend.
pub fn min_max_normalize(scores: &[f32]) -> Vec<f32> {
    match min_max(scores) {
        Some((min, max)) if max > min => {
            let range = max - min;
            scores.iter().map(|&s| (s - min) / range).collect()
        }
        _ => scores.to_vec(),
    }
}

/// Fuses two per-document score vectors into one, in corpus order.
pub fn fuse(dense: &[f32], lexical: &[f32], alpha: f32) -> Result<Vec<f32>> {
    validate_weight("alpha", alpha)?;
    if dense.len() != lexical.len() {
        return Err(RetrievalError::IndexInconsistency {
            details: format!(
                "dense scores ({}) and lexical scores ({}) differ in length",
                dense.len(),
                lexical.len()
            ),
        });
    }

    let dense_norm = min_max_normalize(dense);
    let lexical_norm = min_max_normalize(lexical);

    Ok(dense_norm
        .iter()
        .zip(&lexical_norm)
        .map(|(d, l)| alpha * d + (1.0 - alpha) * l)
        .collect())
}

/// Linear fusion followed by ranking: the `k` best `(doc_id, fused_score)` pairs,
/// descending, ties in corpus order.
pub fn linear_fusion(
    dense: &[f32],
    lexical: &[f32],
    alpha: f32,
    k: usize,
) -> Result<Vec<(u32, f32)>> {
    let fused = fuse(dense, lexical, alpha)?;
    Ok(top_k(&fused, k))
}

/// Rejects weights outside [0, 1] (and NaN).
pub(crate) fn validate_weight(name: &str, value: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(RetrievalError::invalid_config(format!(
            "{name} must be within [0, 1], got {value}"
        )));
    }
    Ok(())
}

/// Single-pass min/max computation.
fn min_max(scores: &[f32]) -> Option<(f32, f32)> {
    if scores.is_empty() {
        return None;
    }
    let mut min = f32::MAX;
    let mut max = f32::MIN;
    for &s in scores {
        if s < min {
            min = s;
        }
        if s > max {
            max = s;
        }
    }
    Some((min, max))
}
