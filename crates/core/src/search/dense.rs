//! Dense retrieval: cosine similarity between the query embedding and every
//! cached document embedding.

use crate::index::RetrievalIndex;
use crate::similarity::{cosine_prenorm, l2_norm};

/// Scores every document against `query_embedding`.
///
/// Returns one cosine similarity per document in corpus order. A zero-norm
/// query or document yields 0.0 for that pair.
pub fn dense_scores(index: &RetrievalIndex, query_embedding: &[f32]) -> Vec<f32> {
    let query_norm = l2_norm(query_embedding);
    (0..index.len() as u32)
        .map(|id| {
            cosine_prenorm(
                query_embedding,
                query_norm,
                index.embedding(id),
                index.norm(id),
            )
        })
        .collect()
}
