//! ragsearch-server: HTTP and command-line front end for ragsearch.
//!
//! Provides the REST API, the terminal commands, corpus loading and the
//! remote embedding provider. Retrieval logic lives in `ragsearch-core`.

/// REST API layer: Axum router, HTTP handlers, models, metrics.
pub mod api;
/// Terminal output, method comparison and interactive search.
pub mod cli;
/// Corpus file loading and the built-in sample corpus.
pub mod corpus;
/// OpenAI-compatible HTTP embedding provider.
pub mod embedder;
