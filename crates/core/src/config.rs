//! Global configuration constants for ragsearch.
//!
//! Scoring parameters, retrieval defaults and input validation limits are defined here.
//! These are compile-time constants; per-query configuration is carried by
//! [`crate::pipeline::RetrievalConfig`] and runtime options by the server CLI.

/// BM25 Okapi term frequency saturation parameter.
///
/// Controls how quickly term frequency saturates. Higher values allow TF to grow more.
pub const BM25_K1: f32 = 1.5;

/// BM25 Okapi document length normalization parameter.
///
/// 0.0 = no normalization, 1.0 = full normalization.
pub const BM25_B: f32 = 0.75;

/// Floor factor for negative IDF values.
///
/// Terms present in more than half of the corpus get a negative raw IDF; their IDF is
/// replaced by `BM25_EPSILON * average_idf`.
pub const BM25_EPSILON: f32 = 0.25;

/// Default dense weight for hybrid fusion (0.7 = 70% dense, 30% lexical).
pub const DEFAULT_HYBRID_ALPHA: f32 = 0.7;

/// Default relevance weight for MMR selection.
pub const DEFAULT_MMR_LAMBDA: f32 = 0.7;

/// Default number of fused candidates gathered before diversification.
pub const DEFAULT_INITIAL_CANDIDATES: usize = 10;

/// Default number of documents returned by the pipeline.
pub const DEFAULT_FINAL_RESULTS: usize = 5;

/// Default `top_k` for the single-stage retrieval methods.
pub const DEFAULT_TOP_K: usize = 10;

/// Default output dimension of the built-in hashing embedder.
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 384;

/// Maximum allowed embedding dimension.
pub const MAX_DIMENSION: usize = 4096;

/// Maximum number of results (`k`) per retrieval call.
pub const MAX_K: usize = 10_000;

/// Maximum length of a query in bytes.
pub const MAX_QUERY_LEN: usize = 10_000;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 3030;

/// Per-request timeout in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Global rate limit in requests per second.
pub const RATE_LIMIT_RPS: u64 = 100;

/// Maximum HTTP request body size in bytes (1 MB).
pub const MAX_REQUEST_BODY_BYTES: usize = 1024 * 1024;

/// Maximum number of concurrent in-flight requests.
pub const MAX_CONCURRENT_REQUESTS: usize = 512;

/// Timeout for a single call to a remote embedding endpoint, in seconds.
pub const EMBEDDING_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Maximum number of texts sent to a remote embedding endpoint in one request.
pub const EMBEDDING_BATCH_SIZE: usize = 256;
