//! Embedding provider seam.
//!
//! Embedding inference is an external collaborator: anything that maps text to a
//! fixed-length vector can back a [`crate::index::RetrievalIndex`]. The batched
//! form is called once at corpus-load time; the single form once per query.

/// Deterministic feature-hashing embedder.
pub mod hashing;

pub use hashing::HashingEmbedder;

use crate::error::EmbeddingError;

/// Text → fixed-dimension vector.
///
/// Failures are not retried by callers; they abort the retrieval call that
/// needed the embedding.
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embed a batch of texts, returning one vector per input in input order.
    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// The dimensionality of embeddings produced by this provider.
    fn dimension(&self) -> usize;

    /// Human-readable provider name.
    fn name(&self) -> &str;
}
