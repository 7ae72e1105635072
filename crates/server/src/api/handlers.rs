//! HTTP request handlers and shared application state.
//!
//! Retrieval is CPU-bound and may call a blocking embedding provider, so every
//! search runs on the blocking thread pool via `spawn_blocking`.

use crate::api::errors::ApiError;
use crate::api::metrics;
use crate::api::models::*;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{StatusCode, Uri};
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use ragsearch_core::{
    EmbeddingProvider, RetrievalConfig, RetrievalIndex, Retriever, ScoredDocument,
};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state passed to every handler via Axum's `State` extractor.
///
/// The index is built before the server starts and never changes afterwards.
#[derive(Clone)]
pub struct AppState {
    pub index: Arc<RetrievalIndex>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub prometheus_handle: PrometheusHandle,
    pub start_time: Instant,
}

/// Unwraps a JSON body, turning every extractor rejection into a 400.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Runs a retrieval call on the blocking pool and records its metrics.
async fn run_search<F>(
    state: &AppState,
    method: &'static str,
    search: F,
) -> Result<Vec<ScoredDocument>, ApiError>
where
    F: FnOnce(Retriever<'_>) -> ragsearch_core::Result<Vec<ScoredDocument>> + Send + 'static,
{
    let index = Arc::clone(&state.index);
    let embedder = Arc::clone(&state.embedder);
    let start = Instant::now();

    let outcome = tokio::task::spawn_blocking(move || {
        search(Retriever::new(&index, embedder.as_ref()))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("search task failed: {e}")))?;

    match outcome {
        Ok(results) => {
            metrics::record_search_operation(method, results.len(), start.elapsed());
            tracing::info!(method, results = results.len(), "Search completed");
            Ok(results)
        }
        Err(e) => {
            let err = ApiError::from(e);
            metrics::record_search_error(method, err.status().as_u16());
            tracing::warn!(method, error = ?err, "Search failed");
            Err(err)
        }
    }
}

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let empty = state.index.is_empty();
    let status_code = if empty {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: if empty { "empty_corpus" } else { "ok" }.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            documents: state.index.len(),
            dimension: state.index.dimension(),
            embedding_provider: state.embedder.name().to_string(),
        }),
    )
}

/// `GET /metrics`
pub async fn metrics_endpoint(State(state): State<AppState>) -> String {
    state.prometheus_handle.render()
}

/// `GET /presets`
pub async fn list_presets() -> Json<Vec<PresetInfo>> {
    Json(
        RetrievalConfig::presets()
            .into_iter()
            .map(|(name, config)| PresetInfo {
                name: name.to_string(),
                config,
            })
            .collect(),
    )
}

/// `GET /documents/:id`
pub async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<u32>,
) -> Result<Json<DocumentResponse>, ApiError> {
    let doc = state
        .index
        .document(id)
        .ok_or_else(|| ApiError::NotFound(format!("Document '{}' not found", id)))?;

    Ok(Json(DocumentResponse {
        id: doc.id,
        text: doc.text.clone(),
    }))
}

/// Fallback for paths that match no route.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("No route for '{}'", uri.path()))
}

/// `POST /search/dense`
pub async fn search_dense(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let req = body(payload)?;
    let query = req.query.clone();
    let results = run_search(&state, "dense", move |r| {
        r.dense_retrieve(&req.query, req.top_k)
    })
    .await?;
    Ok(Json(SearchResponse::new("dense", query, results)))
}

/// `POST /search/sparse`
pub async fn search_sparse(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let req = body(payload)?;
    let query = req.query.clone();
    let results = run_search(&state, "sparse", move |r| {
        r.sparse_retrieve(&req.query, req.top_k)
    })
    .await?;
    Ok(Json(SearchResponse::new("sparse", query, results)))
}

/// `POST /search/hybrid`
pub async fn search_hybrid(
    State(state): State<AppState>,
    payload: Result<Json<HybridSearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let req = body(payload)?;
    let query = req.query.clone();
    let results = run_search(&state, "hybrid", move |r| {
        r.hybrid_retrieve(&req.query, req.alpha, req.top_k)
    })
    .await?;
    Ok(Json(SearchResponse::new("hybrid", query, results)))
}

/// `POST /search/diverse`
pub async fn search_diverse(
    State(state): State<AppState>,
    payload: Result<Json<DiverseSearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let req = body(payload)?;
    let query = req.query.clone();
    let results = run_search(&state, "diverse", move |r| {
        r.diverse_retrieve(&req.query, req.lambda, req.top_k)
    })
    .await?;
    Ok(Json(SearchResponse::new("diverse", query, results)))
}

/// `POST /search/pipeline`
pub async fn search_pipeline(
    State(state): State<AppState>,
    payload: Result<Json<PipelineSearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let req = body(payload)?;
    let config = match (req.preset.as_deref(), req.config) {
        (Some(_), Some(_)) => {
            return Err(ApiError::BadRequest(
                "Specify at most one of preset or config".into(),
            ))
        }
        (Some(name), None) => RetrievalConfig::preset(name)?,
        (None, Some(config)) => config,
        (None, None) => RetrievalConfig::default(),
    };

    let query = req.query.clone();
    let results = run_search(&state, "pipeline", move |r| {
        r.pipeline_retrieve(&req.query, &config)
    })
    .await?;
    Ok(Json(SearchResponse::new("pipeline", query, results)))
}
