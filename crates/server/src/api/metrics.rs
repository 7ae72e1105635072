//! Prometheus metrics recording.

use metrics::{counter, gauge, histogram};
use ragsearch_core::RetrievalIndex;
use std::time::Duration;

/// Records HTTP request metrics.
pub fn record_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];
    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Records a completed retrieval call.
pub fn record_search_operation(search_type: &str, results: usize, duration: Duration) {
    counter!("ragsearch_search_total", "type" => search_type.to_string()).increment(1);
    histogram!("ragsearch_search_results", "type" => search_type.to_string())
        .record(results as f64);
    histogram!("ragsearch_search_duration_seconds", "type" => search_type.to_string())
        .record(duration.as_secs_f64());
}

/// Records a failed retrieval call.
pub fn record_search_error(search_type: &str, status: u16) {
    counter!(
        "ragsearch_search_errors_total",
        "type" => search_type.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Sets corpus-level gauges. The corpus is fixed, so this runs once at startup.
pub fn update_corpus_metrics(index: &RetrievalIndex) {
    gauge!("ragsearch_documents_total").set(index.len() as f64);
    gauge!("ragsearch_embedding_dimension").set(index.dimension() as f64);
    gauge!("ragsearch_vocabulary_terms").set(index.lexical().inverted().index.len() as f64);
}
