//! Scored document types for retrieval results.

use crate::document::Document;
use crate::index::RetrievalIndex;
use std::sync::Arc;

/// A document with an associated score from a retrieval call.
///
/// Every retrieval method returns this type. The `score` semantics depend on the method:
/// - **Dense**: cosine similarity to the query embedding
/// - **Sparse**: raw BM25 score
/// - **Hybrid**: fused score `alpha * dense_norm + (1 - alpha) * lexical_norm`
/// - **Diverse**: MMR score at the moment the document was selected
///
/// Scores from different methods are on different scales and are not comparable.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    /// The matched document (shared reference).
    pub document: Arc<Document>,
    /// Relevance score (interpretation depends on retrieval method).
    pub score: f32,
}

impl ScoredDocument {
    /// Corpus position of the document.
    pub fn id(&self) -> u32 {
        self.document.id
    }
}

/// Resolves ranked `(doc_id, score)` pairs against the index.
pub(crate) fn materialize(index: &RetrievalIndex, ranked: Vec<(u32, f32)>) -> Vec<ScoredDocument> {
    ranked
        .into_iter()
        .filter_map(|(id, score)| {
            index.document(id).map(|doc| ScoredDocument {
                document: Arc::clone(doc),
                score,
            })
        })
        .collect()
}

/// Drops scores at the presentation boundary, keeping rank order.
pub fn into_documents(results: Vec<ScoredDocument>) -> Vec<Arc<Document>> {
    results.into_iter().map(|r| r.document).collect()
}
