//! Error types for retrieval and embedding.

/// Failure reported by an [`crate::embedding::EmbeddingProvider`].
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("embedding response malformed: {reason}")]
    MalformedResponse { reason: String },

    #[error("embedding provider returned {actual} vectors for {expected} inputs")]
    BatchSizeMismatch { expected: usize, actual: usize },
}

/// Retrieval subsystem errors.
///
/// An all-equal score sequence in the fuser is not an error: normalization is
/// skipped for it (see [`crate::search::hybrid::min_max_normalize`]).
#[derive(Debug, thiserror::Error)]
pub enum RetrievalError {
    /// The embedding provider failed; the whole retrieval call fails with it.
    #[error("embedding provider failure: {0}")]
    Provider(#[from] EmbeddingError),

    #[error("corpus is empty: no documents were loaded")]
    EmptyCorpus,

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding contains NaN or infinite values")]
    NonFiniteEmbedding,

    #[error("index inconsistency: {details}")]
    IndexInconsistency { details: String },
}

impl RetrievalError {
    pub(crate) fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// Result alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;
