//! # ragsearch-core
//!
//! In-memory hybrid retrieval over a closed corpus: BM25 lexical scoring, dense
//! cosine retrieval, min-max score fusion and Maximum Marginal Relevance
//! diversification, composed into a configurable two-stage pipeline.
//!
//! This is the core library crate with zero async dependencies. All index state
//! is built once and read-only afterwards, so a single [`RetrievalIndex`] can be
//! shared across threads behind an `Arc` without locking.
//!
//! ```no_run
//! use ragsearch_core::{HashingEmbedder, RetrievalConfig, RetrievalIndex, Retriever};
//!
//! let embedder = HashingEmbedder::default();
//! let index = RetrievalIndex::build(["cat sat on mat", "dog ran in park"], &embedder)?;
//! let retriever = Retriever::new(&index, &embedder);
//! let results = retriever.pipeline_retrieve("cat", &RetrievalConfig::default())?;
//! # Ok::<(), ragsearch_core::RetrievalError>(())
//! ```

/// BM25 lexical retrieval: inverted index, Okapi BM25 scoring, and whitespace tokenizer.
pub mod bm25;
/// Global configuration constants: scoring parameters, defaults and limits.
pub mod config;
/// Core document type.
pub mod document;
/// Embedding provider trait and the built-in hashing embedder.
pub mod embedding;
/// Error types.
pub mod error;
/// The immutable retrieval index.
pub mod index;
/// Pipeline configuration, presets and the two-stage orchestrator.
pub mod pipeline;
/// Public retrieval API.
pub mod retriever;
/// Search primitives: ranking, dense scoring, hybrid fusion and MMR.
pub mod search;
/// Cosine similarity and vector norms.
pub mod similarity;

pub use document::Document;
pub use embedding::{EmbeddingProvider, HashingEmbedder};
pub use error::{EmbeddingError, Result, RetrievalError};
pub use index::RetrievalIndex;
pub use pipeline::{MmrPool, RetrievalConfig, PRESET_NAMES};
pub use retriever::Retriever;
pub use search::{into_documents, ScoredDocument};
