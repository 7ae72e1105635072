//! Immutable retrieval index over a closed corpus.
//!
//! A [`RetrievalIndex`] holds the documents, their cached embeddings and norms,
//! and the BM25 lexical index. It is built once, never mutated, and shared
//! read-only (typically behind an `Arc`) by every concurrent query.

use crate::bm25::LexicalIndex;
use crate::document::Document;
use crate::embedding::EmbeddingProvider;
use crate::error::{EmbeddingError, Result, RetrievalError};
use crate::similarity::l2_norm;
use std::sync::Arc;

/// Documents, embeddings and lexical statistics for one corpus.
#[derive(Debug, Clone)]
pub struct RetrievalIndex {
    documents: Vec<Arc<Document>>,
    embeddings: Vec<Vec<f32>>,
    norms: Vec<f32>,
    lexical: LexicalIndex,
    dimension: usize,
}

impl RetrievalIndex {
    /// Builds the index, embedding every document with one batched provider call.
    ///
    /// An empty corpus produces an empty index without calling the provider;
    /// retrieval against it fails with [`RetrievalError::EmptyCorpus`].
    pub fn build<I, S>(texts: I, provider: &dyn EmbeddingProvider) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        if texts.is_empty() {
            tracing::warn!(provider = provider.name(), "building index over an empty corpus");
            return Ok(Self::assemble(Vec::new(), Vec::new(), provider.dimension()));
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings = provider.embed_many(&refs)?;
        if embeddings.len() != texts.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: texts.len(),
                actual: embeddings.len(),
            }
            .into());
        }

        let index = Self::from_embeddings(texts, embeddings)?;
        tracing::info!(
            documents = index.len(),
            dimension = index.dimension,
            terms = index.lexical.inverted().index.len(),
            provider = provider.name(),
            "Retrieval index built"
        );
        Ok(index)
    }

    /// Builds the index from precomputed embeddings, one per text.
    ///
    /// All embeddings must share one dimension and contain only finite values.
    pub fn from_embeddings<I, S>(texts: I, embeddings: Vec<Vec<f32>>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let texts: Vec<String> = texts.into_iter().map(Into::into).collect();
        if texts.len() != embeddings.len() {
            return Err(RetrievalError::IndexInconsistency {
                details: format!(
                    "{} documents but {} embeddings",
                    texts.len(),
                    embeddings.len()
                ),
            });
        }

        let dimension = embeddings.first().map_or(0, Vec::len);
        for embedding in &embeddings {
            check_embedding(embedding, dimension)?;
        }

        let documents: Vec<Arc<Document>> = texts
            .into_iter()
            .enumerate()
            .map(|(position, text)| Arc::new(Document::new(position as u32, text)))
            .collect();

        Ok(Self::assemble(documents, embeddings, dimension))
    }

    fn assemble(documents: Vec<Arc<Document>>, embeddings: Vec<Vec<f32>>, dimension: usize) -> Self {
        let norms = embeddings.iter().map(|e| l2_norm(e)).collect();
        let lexical = LexicalIndex::build(documents.iter().map(|d| d.text.as_str()));
        Self {
            documents,
            embeddings,
            norms,
            lexical,
            dimension,
        }
    }

    /// Number of documents in the corpus.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Returns `true` if the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Embedding dimension shared by every document and every query.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// All documents in corpus order.
    pub fn documents(&self) -> &[Arc<Document>] {
        &self.documents
    }

    /// The document at corpus position `id`, if any.
    pub fn document(&self, id: u32) -> Option<&Arc<Document>> {
        self.documents.get(id as usize)
    }

    /// Cached embedding of document `id`.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn embedding(&self, id: u32) -> &[f32] {
        &self.embeddings[id as usize]
    }

    /// Cached L2 norm of document `id`'s embedding.
    ///
    /// # Panics
    /// If `id` is out of range.
    pub fn norm(&self, id: u32) -> f32 {
        self.norms[id as usize]
    }

    /// BM25 lexical index over the corpus.
    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    /// Checks that a query embedding is usable against this index.
    pub fn check_query_embedding(&self, embedding: &[f32]) -> Result<()> {
        check_embedding(embedding, self.dimension)
    }

    /// Validate internal invariants.
    ///
    /// Checks that all parallel arrays have consistent lengths, that document IDs
    /// equal their positions, and that the lexical index covers exactly the corpus.
    pub fn validate(&self) -> std::result::Result<(), String> {
        let n = self.documents.len();

        if self.embeddings.len() != n {
            return Err(format!("embeddings length {} != documents {}", self.embeddings.len(), n));
        }
        if self.norms.len() != n {
            return Err(format!("norms length {} != documents {}", self.norms.len(), n));
        }
        if self.lexical.len() != n {
            return Err(format!("lexical doc_count {} != documents {}", self.lexical.len(), n));
        }
        if self.lexical.inverted().doc_lengths.len() != n {
            return Err(format!(
                "lexical doc_lengths {} != documents {}",
                self.lexical.inverted().doc_lengths.len(),
                n
            ));
        }

        for (position, doc) in self.documents.iter().enumerate() {
            if doc.id as usize != position {
                return Err(format!("document at position {} has id {}", position, doc.id));
            }
        }

        for (position, embedding) in self.embeddings.iter().enumerate() {
            if embedding.len() != self.dimension {
                return Err(format!(
                    "embedding {} has dimension {} != {}",
                    position,
                    embedding.len(),
                    self.dimension
                ));
            }
        }

        for (term, postings) in &self.lexical.inverted().index {
            if let Some(p) = postings.iter().find(|p| p.doc_id as usize >= n) {
                return Err(format!("posting for '{}' points at doc {} >= {}", term, p.doc_id, n));
            }
        }

        Ok(())
    }
}

fn check_embedding(embedding: &[f32], dimension: usize) -> Result<()> {
    if embedding.len() != dimension {
        return Err(RetrievalError::DimensionMismatch {
            expected: dimension,
            actual: embedding.len(),
        });
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(RetrievalError::NonFiniteEmbedding);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;

    struct ShortBatch;

    impl EmbeddingProvider for ShortBatch {
        fn embed(&self, _text: &str) -> std::result::Result<Vec<f32>, EmbeddingError> {
            Ok(vec![1.0, 0.0])
        }

        fn embed_many(&self, _texts: &[&str]) -> std::result::Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(vec![vec![1.0, 0.0]])
        }

        fn dimension(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "short-batch"
        }
    }

    #[test]
    fn test_build_with_provider() {
        let idx = RetrievalIndex::build(["cat sat on mat", "dog ran"], &HashingEmbedder::new(64)).unwrap();
        assert_eq!(idx.len(), 2);
        assert_eq!(idx.dimension(), 64);
        assert_eq!(idx.document(1).unwrap().text, "dog ran");
        assert!((idx.norm(0) - 1.0).abs() < 1e-5);
        assert!(idx.validate().is_ok());
    }

    #[test]
    fn test_document_ids_are_positions() {
        let idx = RetrievalIndex::build(["a", "b", "c"], &HashingEmbedder::new(8)).unwrap();
        for (i, doc) in idx.documents().iter().enumerate() {
            assert_eq!(doc.id as usize, i);
        }
        assert!(idx.document(3).is_none());
    }

    #[test]
    fn test_build_empty_corpus() {
        let idx = RetrievalIndex::build(Vec::<String>::new(), &HashingEmbedder::new(16)).unwrap();
        assert!(idx.is_empty());
        assert_eq!(idx.dimension(), 16);
        assert!(idx.validate().is_ok());
    }

    #[test]
    fn test_build_rejects_short_batch() {
        let err = RetrievalIndex::build(["a", "b"], &ShortBatch).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::Provider(EmbeddingError::BatchSizeMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_from_embeddings_count_mismatch() {
        let err = RetrievalIndex::from_embeddings(["a", "b"], vec![vec![1.0]]).unwrap_err();
        assert!(matches!(err, RetrievalError::IndexInconsistency { .. }));
    }

    #[test]
    fn test_from_embeddings_dimension_mismatch() {
        let err =
            RetrievalIndex::from_embeddings(["a", "b"], vec![vec![1.0, 0.0], vec![1.0]]).unwrap_err();
        assert!(matches!(
            err,
            RetrievalError::DimensionMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_from_embeddings_rejects_nan() {
        let err = RetrievalIndex::from_embeddings(["a"], vec![vec![f32::NAN, 1.0]]).unwrap_err();
        assert!(matches!(err, RetrievalError::NonFiniteEmbedding));
    }

    #[test]
    fn test_check_query_embedding() {
        let idx = RetrievalIndex::from_embeddings(["a"], vec![vec![1.0, 0.0]]).unwrap();
        assert!(idx.check_query_embedding(&[0.5, 0.5]).is_ok());
        assert!(matches!(
            idx.check_query_embedding(&[0.5]),
            Err(RetrievalError::DimensionMismatch { .. })
        ));
        assert!(matches!(
            idx.check_query_embedding(&[f32::INFINITY, 0.0]),
            Err(RetrievalError::NonFiniteEmbedding)
        ));
    }

    #[test]
    fn test_lexical_index_reflects_corpus() {
        let idx = RetrievalIndex::from_embeddings(
            ["cat sat", "cat ran", "dog"],
            vec![vec![1.0], vec![1.0], vec![1.0]],
        )
        .unwrap();
        assert_eq!(idx.lexical().len(), 3);
        assert_eq!(idx.lexical().inverted().document_frequency("cat"), 2);
    }

    #[test]
    fn test_index_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RetrievalIndex>();
    }
}
