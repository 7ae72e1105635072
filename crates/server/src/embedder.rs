//! Remote embedding provider for OpenAI-compatible `/v1/embeddings` endpoints.
//!
//! Uses the blocking `reqwest` client: the [`EmbeddingProvider`] trait is
//! synchronous, and the server calls it from `spawn_blocking` workers or before
//! the async runtime starts. Failures are reported once and never retried.

use ragsearch_core::config::{EMBEDDING_BATCH_SIZE, EMBEDDING_REQUEST_TIMEOUT_SECS};
use ragsearch_core::{EmbeddingError, EmbeddingProvider};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

/// Embedding provider backed by an HTTP endpoint.
pub struct HttpEmbedder {
    client: reqwest::blocking::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    dimension: usize,
}

impl std::fmt::Debug for HttpEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpEmbedder")
            .field("url", &self.url)
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl HttpEmbedder {
    /// Creates a provider posting to `url` with the given model name.
    ///
    /// `dimension` is the expected vector length; responses of another length
    /// are rejected when the index is built or the query is checked.
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(EMBEDDING_REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| EmbeddingError::RequestFailed {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            url: url.into(),
            model: model.into(),
            api_key,
            dimension,
        })
    }

    fn request(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut req = self.client.post(&self.url).json(&EmbedRequest {
            model: &self.model,
            input: texts,
        });
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().map_err(|e| EmbeddingError::RequestFailed {
            reason: format!("HTTP error: {e}"),
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(EmbeddingError::RequestFailed {
                reason: format!("endpoint returned {status}: {body}"),
            });
        }

        let parsed: EmbedResponse =
            response.json().map_err(|e| EmbeddingError::MalformedResponse {
                reason: format!("JSON parse error: {e}"),
            })?;

        if parsed.data.len() != texts.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: texts.len(),
                actual: parsed.data.len(),
            });
        }

        let vectors = order_by_index(parsed.data)?;
        tracing::debug!(texts = texts.len(), model = %self.model, "embedding batch received");
        Ok(vectors)
    }
}

/// Places each entry at its `index`. Without any indices, arrival order is kept;
/// otherwise the indices must be exactly a permutation of `0..n`.
fn order_by_index(data: Vec<EmbedData>) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    if data.iter().all(|d| d.index.is_none()) {
        return Ok(data.into_iter().map(|d| d.embedding).collect());
    }

    let n = data.len();
    let mut slots: Vec<Option<Vec<f32>>> = vec![None; n];
    for entry in data {
        let index = entry.index.ok_or_else(|| EmbeddingError::MalformedResponse {
            reason: "some entries are missing `index`".to_string(),
        })?;
        match slots.get_mut(index) {
            Some(slot @ None) => *slot = Some(entry.embedding),
            Some(Some(_)) => {
                return Err(EmbeddingError::MalformedResponse {
                    reason: format!("duplicate index {index}"),
                })
            }
            None => {
                return Err(EmbeddingError::MalformedResponse {
                    reason: format!("index {index} out of range for {n} inputs"),
                })
            }
        }
    }
    // n entries filled n distinct in-range slots, so none are empty.
    Ok(slots.into_iter().flatten().collect())
}

impl EmbeddingProvider for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.request(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::MalformedResponse {
                reason: "empty response".to_string(),
            })
    }

    fn embed_many(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut all = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(EMBEDDING_BATCH_SIZE) {
            all.extend(self.request(chunk)?);
        }
        Ok(all)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    /// Runs `router` on its own runtime thread and returns its base URL.
    /// The blocking client must not be driven from inside an async context.
    fn spawn_mock(router: Router) -> String {
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, router).await.unwrap();
            });
        });
        format!("http://{}", rx.recv().unwrap())
    }

    /// Embeds each input as `[len, position]` and returns entries in reverse order.
    async fn reversed(Json(body): Json<Value>) -> Json<Value> {
        let inputs = body["input"].as_array().cloned().unwrap_or_default();
        let data: Vec<Value> = inputs
            .iter()
            .enumerate()
            .rev()
            .map(|(i, t)| {
                let len = t.as_str().unwrap_or("").len() as f32;
                json!({ "index": i, "embedding": [len, i as f32] })
            })
            .collect();
        Json(json!({ "data": data, "model": body["model"] }))
    }

    async fn always_one(Json(_): Json<Value>) -> Json<Value> {
        Json(json!({ "data": [{ "index": 0, "embedding": [1.0, 0.0] }] }))
    }

    async fn server_error() -> (StatusCode, &'static str) {
        (StatusCode::INTERNAL_SERVER_ERROR, "model not loaded")
    }

    async fn not_json() -> &'static str {
        "hello"
    }

    fn mock() -> String {
        spawn_mock(
            Router::new()
                .route("/v1/embeddings", post(reversed))
                .route("/one", post(always_one))
                .route("/error", post(server_error))
                .route("/text", post(not_json)),
        )
    }

    #[test]
    fn test_embed_many_restores_input_order() {
        let base = mock();
        let embedder =
            HttpEmbedder::new(format!("{base}/v1/embeddings"), "test-model", None, 2).unwrap();
        let vectors = embedder.embed_many(&["a", "bbb", "cc"]).unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![3.0, 1.0], vec![2.0, 2.0]]);
    }

    #[test]
    fn test_embed_single() {
        let base = mock();
        let embedder =
            HttpEmbedder::new(format!("{base}/v1/embeddings"), "test-model", Some("k".into()), 2)
                .unwrap();
        assert_eq!(embedder.embed("abcd").unwrap(), vec![4.0, 0.0]);
        assert_eq!(embedder.name(), "test-model");
        assert_eq!(embedder.dimension(), 2);
    }

    #[test]
    fn test_wrong_count_is_batch_mismatch() {
        let base = mock();
        let embedder = HttpEmbedder::new(format!("{base}/one"), "m", None, 2).unwrap();
        let err = embedder.embed_many(&["a", "b", "c"]).unwrap_err();
        assert!(matches!(
            err,
            EmbeddingError::BatchSizeMismatch {
                expected: 3,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_non_success_status_fails() {
        let base = mock();
        let embedder = HttpEmbedder::new(format!("{base}/error"), "m", None, 2).unwrap();
        let err = embedder.embed("a").unwrap_err();
        assert!(matches!(err, EmbeddingError::RequestFailed { .. }));
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn test_malformed_body_fails() {
        let base = mock();
        let embedder = HttpEmbedder::new(format!("{base}/text"), "m", None, 2).unwrap();
        assert!(matches!(
            embedder.embed("a"),
            Err(EmbeddingError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_unreachable_endpoint_fails() {
        // Port 9 (discard) is not expected to run an HTTP server.
        let embedder = HttpEmbedder::new("http://127.0.0.1:9/v1/embeddings", "m", None, 2).unwrap();
        assert!(matches!(
            embedder.embed("a"),
            Err(EmbeddingError::RequestFailed { .. })
        ));
    }

    fn entry(index: Option<usize>, value: f32) -> EmbedData {
        EmbedData {
            index,
            embedding: vec![value],
        }
    }

    #[test]
    fn test_order_by_index_places_entries() {
        let ordered =
            order_by_index(vec![entry(Some(2), 2.0), entry(Some(0), 0.0), entry(Some(1), 1.0)])
                .unwrap();
        assert_eq!(ordered, vec![vec![0.0], vec![1.0], vec![2.0]]);

        let unindexed = order_by_index(vec![entry(None, 5.0), entry(None, 6.0)]).unwrap();
        assert_eq!(unindexed, vec![vec![5.0], vec![6.0]]);
    }

    #[test]
    fn test_order_by_index_rejects_bad_indices() {
        let cases = [
            vec![entry(Some(0), 0.0), entry(Some(0), 1.0), entry(Some(2), 2.0)],
            vec![entry(Some(0), 0.0), entry(Some(3), 1.0)],
            vec![entry(Some(0), 0.0), entry(None, 1.0)],
        ];
        for data in cases {
            assert!(matches!(
                order_by_index(data),
                Err(EmbeddingError::MalformedResponse { .. })
            ));
        }
    }

    async fn duplicate_indices(Json(_): Json<Value>) -> Json<Value> {
        Json(json!({ "data": [
            { "index": 0, "embedding": [1.0, 0.0] },
            { "index": 0, "embedding": [0.0, 1.0] }
        ] }))
    }

    #[test]
    fn test_duplicate_indices_from_endpoint_are_malformed() {
        let base = spawn_mock(Router::new().route("/dup", post(duplicate_indices)));
        let embedder = HttpEmbedder::new(format!("{base}/dup"), "m", None, 2).unwrap();
        assert!(matches!(
            embedder.embed_many(&["a", "b"]),
            Err(EmbeddingError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let embedder = HttpEmbedder::new("http://x", "m", Some("secret".into()), 2).unwrap();
        let dbg = format!("{embedder:?}");
        assert!(!dbg.contains("secret"));
        assert!(dbg.contains("<redacted>"));
    }
}
