//! Request and response data transfer objects for the REST API.
//!
//! All types derive `Serialize` and/or `Deserialize` for JSON marshalling via Axum.

use ragsearch_core::config::{DEFAULT_HYBRID_ALPHA, DEFAULT_MMR_LAMBDA, DEFAULT_TOP_K};
use ragsearch_core::{RetrievalConfig, ScoredDocument};
use serde::{Deserialize, Serialize};

/// Request body for `POST /search/dense` and `POST /search/sparse`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Request body for `POST /search/hybrid`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HybridSearchRequest {
    pub query: String,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Request body for `POST /search/diverse`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiverseSearchRequest {
    pub query: String,
    #[serde(default = "default_lambda")]
    pub lambda: f32,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

/// Request body for `POST /search/pipeline`.
///
/// At most one of `preset` and `config` may be given; with neither, the
/// balanced defaults apply.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineSearchRequest {
    pub query: String,
    pub preset: Option<String>,
    pub config: Option<RetrievalConfig>,
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}
fn default_alpha() -> f32 {
    DEFAULT_HYBRID_ALPHA
}
fn default_lambda() -> f32 {
    DEFAULT_MMR_LAMBDA
}

/// One ranked result.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub rank: usize,
    pub id: u32,
    pub text: String,
    pub score: f32,
}

/// Response body for every `/search/*` route.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub method: String,
    pub query: String,
    pub results: Vec<SearchResult>,
    pub count: usize,
}

impl SearchResponse {
    pub fn new(method: &str, query: String, results: Vec<ScoredDocument>) -> Self {
        let results: Vec<SearchResult> = results
            .into_iter()
            .enumerate()
            .map(|(i, r)| SearchResult {
                rank: i + 1,
                id: r.document.id,
                text: r.document.text.clone(),
                score: r.score,
            })
            .collect();
        Self {
            method: method.to_string(),
            query,
            count: results.len(),
            results,
        }
    }
}

/// Response body for `GET /documents/:id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentResponse {
    pub id: u32,
    pub text: String,
}

/// One entry of `GET /presets`.
#[derive(Debug, Serialize, Deserialize)]
pub struct PresetInfo {
    pub name: String,
    pub config: RetrievalConfig,
}

/// Response body for `GET /health`.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub documents: usize,
    pub dimension: usize,
    pub embedding_provider: String,
}
