//! REST API layer built on Axum.
//!
//! Exposes the five retrieval methods over HTTP, plus health, metrics, preset
//! listing and document lookup. Includes middleware for rate limiting, request
//! timeouts, body size limits, metrics collection, and request ID tracing.

/// API error types mapped to HTTP status codes.
pub mod errors;
/// HTTP request handlers and application state.
pub mod handlers;
/// Prometheus metrics recording.
pub mod metrics;
/// Request and response data transfer objects.
pub mod models;

use axum::body::Body;
use axum::error_handling::HandleErrorLayer;
use axum::extract::{DefaultBodyLimit, MatchedPath};
use axum::http::{HeaderName, HeaderValue, Request, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use handlers::AppState;
use ragsearch_core::config;
use std::time::{Duration, Instant};
use tower::buffer::BufferLayer;
use tower::limit::{ConcurrencyLimitLayer, RateLimitLayer};
use tower::timeout::TimeoutLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

/// Metrics label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

const SECURITY_HEADERS: [(&str, &str); 3] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("referrer-policy", "no-referrer"),
];

/// Tags the request span and the response with a fresh `x-request-id`.
async fn request_id(req: Request<Body>, next: Next) -> Response {
    let id = uuid::Uuid::new_v4().to_string();
    let span = tracing::info_span!("request", request_id = %id);
    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }
    response
}

async fn security_headers(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    for (name, value) in SECURITY_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}

/// Records request count and latency, labelled by route template
/// (`/documents/:id`), never by the raw path.
async fn track_metrics(req: Request<Body>, next: Next) -> Response {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
    let method = req.method().clone();
    let start = Instant::now();

    let response = next.run(req).await;
    metrics::record_request(
        method.as_str(),
        &route,
        response.status().as_u16(),
        start.elapsed(),
    );
    response
}

/// Builds the Axum router with all routes and middleware layers.
///
/// Layers, outermost first: rate limit, concurrency limit, timeout, body limit,
/// CORS, compression, trace, security headers, request ID, metrics.
pub fn create_router(state: AppState) -> Router {
    let limits = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|err: tower::BoxError| async move {
            if err.is::<tower::timeout::error::Elapsed>() {
                StatusCode::REQUEST_TIMEOUT
            } else {
                StatusCode::TOO_MANY_REQUESTS
            }
        }))
        .layer(BufferLayer::new(1024))
        .layer(ConcurrencyLimitLayer::new(config::MAX_CONCURRENT_REQUESTS))
        .layer(RateLimitLayer::new(
            config::RATE_LIMIT_RPS,
            Duration::from_secs(1),
        ))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config::REQUEST_TIMEOUT_SECS,
        )));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/presets", get(handlers::list_presets))
        .route("/documents/:id", get(handlers::get_document))
        .route("/search/dense", post(handlers::search_dense))
        .route("/search/sparse", post(handlers::search_sparse))
        .route("/search/hybrid", post(handlers::search_hybrid))
        .route("/search/diverse", post(handlers::search_diverse))
        .route("/search/pipeline", post(handlers::search_pipeline))
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(track_metrics))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(security_headers))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(config::MAX_REQUEST_BODY_BYTES))
        .layer(limits)
        .with_state(state)
}
