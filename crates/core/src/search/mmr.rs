//! Maximum Marginal Relevance (MMR) selection.
//!
//! Greedily picks documents that are relevant to the query but not redundant
//! with what has already been picked:
//!
//! `mmr(d) = lambda * relevance(d) - (1 - lambda) * max_{s in selected} sim(d, s)`
//!
//! Relevance and redundancy are both cosine similarities over the cached
//! document embeddings. Each call starts from an empty selection and runs to
//! completion; the result holds at most `min(k, |pool|)` distinct documents.

use crate::index::RetrievalIndex;
use crate::similarity::{cosine_prenorm, l2_norm};

/// Selects up to `k` documents from `pool` by MMR.
///
/// Returns `(doc_id, mmr_score)` pairs in selection order. The first pick is the
/// most relevant document, scored `lambda * relevance`. Ties go to the candidate
/// that appears first in `pool`. Duplicate and out-of-range IDs in `pool` are
/// ignored. `lambda` is expected in [0, 1].
pub fn mmr_select(
    index: &RetrievalIndex,
    query_embedding: &[f32],
    pool: &[u32],
    lambda: f32,
    k: usize,
) -> Vec<(u32, f32)> {
    let candidates = dedup_pool(index, pool);
    let target = k.min(candidates.len());
    if target == 0 {
        return Vec::new();
    }

    let query_norm = l2_norm(query_embedding);
    let relevance: Vec<f32> = candidates
        .iter()
        .map(|&id| {
            cosine_prenorm(
                query_embedding,
                query_norm,
                index.embedding(id),
                index.norm(id),
            )
        })
        .collect();

    // Max similarity of each candidate to the selected set, maintained
    // incrementally as documents are selected.
    let mut penalty = vec![f32::NEG_INFINITY; candidates.len()];
    let mut taken = vec![false; candidates.len()];
    let mut selected = Vec::with_capacity(target);

    // First pick: highest relevance, first encountered on ties.
    let mut best = 0;
    for i in 1..candidates.len() {
        if relevance[i] > relevance[best] {
            best = i;
        }
    }
    take(
        index,
        &candidates,
        &mut penalty,
        &mut taken,
        &mut selected,
        best,
        lambda * relevance[best],
    );

    while selected.len() < target {
        let mut best: Option<(usize, f32)> = None;
        for (i, &is_taken) in taken.iter().enumerate() {
            if is_taken {
                continue;
            }
            let score = lambda * relevance[i] - (1.0 - lambda) * penalty[i];
            if best.map_or(true, |(_, b)| score > b) {
                best = Some((i, score));
            }
        }
        let Some((i, score)) = best else {
            break;
        };
        take(
            index,
            &candidates,
            &mut penalty,
            &mut taken,
            &mut selected,
            i,
            score,
        );
    }

    selected
}

/// Marks candidate `i` as selected and folds its similarity into the
/// penalties of the remaining candidates.
fn take(
    index: &RetrievalIndex,
    candidates: &[u32],
    penalty: &mut [f32],
    taken: &mut [bool],
    selected: &mut Vec<(u32, f32)>,
    i: usize,
    score: f32,
) {
    let chosen = candidates[i];
    taken[i] = true;
    selected.push((chosen, score));

    let chosen_emb = index.embedding(chosen);
    let chosen_norm = index.norm(chosen);
    for (j, &other) in candidates.iter().enumerate() {
        if taken[j] {
            continue;
        }
        let sim = cosine_prenorm(
            index.embedding(other),
            index.norm(other),
            chosen_emb,
            chosen_norm,
        );
        if sim > penalty[j] {
            penalty[j] = sim;
        }
    }
}

/// Keeps the first occurrence of every in-range ID, preserving pool order.
fn dedup_pool(index: &RetrievalIndex, pool: &[u32]) -> Vec<u32> {
    let mut seen = vec![false; index.len()];
    pool.iter()
        .copied()
        .filter(|&id| match seen.get_mut(id as usize) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            _ => false,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two near-duplicates of the query direction, and one distinct but
    /// still relevant document.
    fn index() -> RetrievalIndex {
        RetrievalIndex::from_embeddings(
            ["dup a", "dup b", "different", "unrelated"],
            vec![
                vec![1.0, 0.0, 0.0],
                vec![0.99, 0.05, 0.0],
                vec![0.6, 0.0, 0.8],
                vec![0.0, 1.0, 0.0],
            ],
        )
        .unwrap()
    }

    const QUERY: [f32; 3] = [1.0, 0.0, 0.3];

    #[test]
    fn test_first_pick_is_most_relevant() {
        let picked = mmr_select(&index(), &QUERY, &[0, 1, 2, 3], 0.5, 1);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].0, 0);
    }

    #[test]
    fn test_lambda_one_is_pure_relevance_ranking() {
        let picked = mmr_select(&index(), &QUERY, &[0, 1, 2, 3], 1.0, 4);
        let ids: Vec<u32> = picked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        // Scores are the plain relevance values, descending
        for pair in picked.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_low_lambda_skips_near_duplicate() {
        let picked = mmr_select(&index(), &QUERY, &[0, 1, 2, 3], 0.5, 2);
        let ids: Vec<u32> = picked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![0, 2], "near-duplicate of the first pick should be skipped");
    }

    #[test]
    fn test_never_selects_twice() {
        let picked = mmr_select(&index(), &QUERY, &[0, 1, 2, 3], 0.3, 10);
        let mut ids: Vec<u32> = picked.iter().map(|&(id, _)| id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), picked.len());
    }

    #[test]
    fn test_size_bounded_by_pool_and_k() {
        let idx = index();
        assert_eq!(mmr_select(&idx, &QUERY, &[0, 1, 2, 3], 0.7, 10).len(), 4);
        assert_eq!(mmr_select(&idx, &QUERY, &[2, 3], 0.7, 10).len(), 2);
        assert_eq!(mmr_select(&idx, &QUERY, &[0, 1, 2, 3], 0.7, 3).len(), 3);
        assert!(mmr_select(&idx, &QUERY, &[], 0.7, 3).is_empty());
        assert!(mmr_select(&idx, &QUERY, &[0, 1], 0.7, 0).is_empty());
    }

    #[test]
    fn test_pool_restricts_candidates() {
        let picked = mmr_select(&index(), &QUERY, &[3, 1], 0.7, 5);
        let ids: Vec<u32> = picked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_duplicate_and_out_of_range_ids_ignored() {
        let picked = mmr_select(&index(), &QUERY, &[2, 2, 99, 2], 0.7, 5);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].0, 2);
    }

    #[test]
    fn test_ties_go_to_first_in_pool() {
        let idx = RetrievalIndex::from_embeddings(
            ["a", "b", "c"],
            vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![1.0, 0.0]],
        )
        .unwrap();
        let picked = mmr_select(&idx, &[1.0, 0.0], &[2, 0, 1], 0.7, 3);
        let ids: Vec<u32> = picked.iter().map(|&(id, _)| id).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn test_first_score_is_lambda_times_relevance() {
        let picked = mmr_select(&index(), &[1.0, 0.0, 0.0], &[0, 1, 2, 3], 0.6, 1);
        assert!((picked[0].1 - 0.6).abs() < 1e-6);
    }
}
