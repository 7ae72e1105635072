//! Top-k selection over per-document score vectors.
//!
//! Results are ordered by descending score; equal scores keep corpus order
//! (lower document ID first), so every ranking in the crate is deterministic.

use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

type RankKey = (OrderedFloat<f32>, Reverse<u32>);

/// Returns the `k` best `(doc_id, score)` pairs from `scores`, where the
/// position in `scores` is the document ID.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(u32, f32)> {
    top_k_of(scores.iter().enumerate().map(|(i, &s)| (i as u32, s)), k)
}

/// Returns the `k` best pairs of an arbitrary `(doc_id, score)` sequence.
pub fn top_k_of<I>(scored: I, k: usize) -> Vec<(u32, f32)>
where
    I: IntoIterator<Item = (u32, f32)>,
{
    if k == 0 {
        return Vec::new();
    }

    let scored = scored.into_iter();
    // Capacity is bounded by the input, not by the caller's k
    let (lower, upper) = scored.size_hint();
    let capacity = k.min(upper.unwrap_or(lower)).saturating_add(1);

    // Partial sort: O(n log k) via min-heap of size k
    let mut heap: BinaryHeap<Reverse<RankKey>> = BinaryHeap::with_capacity(capacity);
    for (id, score) in scored {
        heap.push(Reverse((OrderedFloat(score), Reverse(id))));
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut keys: Vec<RankKey> = heap.into_iter().map(|Reverse(key)| key).collect();
    keys.sort_unstable_by(|a, b| b.cmp(a));
    keys.into_iter()
        .map(|(score, Reverse(id))| (id, score.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_descending() {
        let ranked = top_k(&[0.1, 0.9, 0.5, 0.7], 4);
        let ids: Vec<u32> = ranked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 3, 2, 0]);
    }

    #[test]
    fn test_top_k_truncates() {
        let ranked = top_k(&[0.1, 0.9, 0.5, 0.7], 2);
        assert_eq!(ranked, vec![(1, 0.9), (3, 0.7)]);
    }

    #[test]
    fn test_top_k_ties_keep_corpus_order() {
        let ranked = top_k(&[0.5, 1.0, 0.5, 0.5, 1.0], 5);
        let ids: Vec<u32> = ranked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 4, 0, 2, 3]);
    }

    #[test]
    fn test_top_k_ties_at_cutoff_prefer_lower_ids() {
        let ranked = top_k(&[0.0, 0.0, 0.0, 0.0], 2);
        assert_eq!(ranked, vec![(0, 0.0), (1, 0.0)]);
    }

    #[test]
    fn test_top_k_larger_than_input() {
        assert_eq!(top_k(&[0.3, 0.2], 10).len(), 2);
        assert!(top_k(&[], 10).is_empty());
        assert!(top_k(&[1.0], 0).is_empty());
    }

    #[test]
    fn test_top_k_huge_k_returns_everything() {
        assert_eq!(top_k(&[0.1, 0.9], usize::MAX), vec![(1, 0.9), (0, 0.1)]);
        assert_eq!(top_k_of(vec![(4, 0.5)], 1 << 40), vec![(4, 0.5)]);
    }

    #[test]
    fn test_top_k_negative_scores() {
        let ranked = top_k(&[-0.5, -0.1, -0.9], 3);
        let ids: Vec<u32> = ranked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 0, 2]);
    }

    #[test]
    fn test_top_k_of_sparse_ids() {
        let ranked = top_k_of(vec![(7, 0.2), (3, 0.8), (5, 0.2)], 3);
        assert_eq!(ranked, vec![(3, 0.8), (5, 0.2), (7, 0.2)]);
    }
}
