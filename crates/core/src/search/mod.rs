//! Search primitives: ranking, dense scoring, hybrid fusion and MMR selection.

/// Dense (cosine) scoring against cached document embeddings.
pub mod dense;
/// Min-max normalization and linear score fusion.
pub mod hybrid;
/// Maximum Marginal Relevance selection.
pub mod mmr;
/// Heap-based top-k with deterministic tie-breaking.
pub mod ranking;
/// Scored result type shared by every retrieval method.
pub mod types;

pub use dense::dense_scores;
pub use hybrid::{fuse, linear_fusion, min_max_normalize};
pub use mmr::mmr_select;
pub use ranking::{top_k, top_k_of};
pub use types::{into_documents, ScoredDocument};
