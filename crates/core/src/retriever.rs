//! Public retrieval API.
//!
//! A [`Retriever`] pairs a shared [`RetrievalIndex`] with the embedding provider
//! used for queries. It is a cheap borrowed view; construct one per call site.
//! Every method validates its arguments, then checks the corpus, and only then
//! calls the provider, so invalid requests never cost an embedding call.

use crate::bm25::tokenize;
use crate::config::MAX_QUERY_LEN;
use crate::embedding::EmbeddingProvider;
use crate::error::{Result, RetrievalError};
use crate::index::RetrievalIndex;
use crate::pipeline::{self, validate_count, RetrievalConfig};
use crate::search::dense::dense_scores;
use crate::search::hybrid::{linear_fusion, validate_weight};
use crate::search::mmr::mmr_select;
use crate::search::ranking::top_k;
use crate::search::types::{materialize, ScoredDocument};
use std::time::Instant;

/// Retrieval entry point over one index and one query embedder.
#[derive(Clone, Copy)]
pub struct Retriever<'a> {
    index: &'a RetrievalIndex,
    embedder: &'a dyn EmbeddingProvider,
}

impl std::fmt::Debug for Retriever<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("documents", &self.index.len())
            .field("embedder", &self.embedder.name())
            .finish()
    }
}

impl<'a> Retriever<'a> {
    pub fn new(index: &'a RetrievalIndex, embedder: &'a dyn EmbeddingProvider) -> Self {
        Self { index, embedder }
    }

    pub fn index(&self) -> &'a RetrievalIndex {
        self.index
    }

    /// Ranks documents by cosine similarity to the query embedding.
    pub fn dense_retrieve(&self, query: &str, top_k_results: usize) -> Result<Vec<ScoredDocument>> {
        let start = Instant::now();
        check_query(query)?;
        validate_count("top_k", top_k_results)?;
        self.ensure_corpus()?;

        let embedding = self.embed_query(query)?;
        let ranked = top_k(&dense_scores(self.index, &embedding), top_k_results);
        Ok(self.finish("dense", ranked, start))
    }

    /// Ranks documents by BM25 score. Does not call the embedding provider.
    pub fn sparse_retrieve(&self, query: &str, top_k_results: usize) -> Result<Vec<ScoredDocument>> {
        let start = Instant::now();
        check_query(query)?;
        validate_count("top_k", top_k_results)?;
        self.ensure_corpus()?;

        let tokens = tokenize(query);
        if tokens.is_empty() {
            tracing::debug!("empty token list; every document scores zero");
        }
        let ranked = top_k(&self.index.lexical().score(&tokens), top_k_results);
        Ok(self.finish("sparse", ranked, start))
    }

    /// Ranks documents by the fused score `alpha * dense + (1 - alpha) * lexical`.
    pub fn hybrid_retrieve(
        &self,
        query: &str,
        alpha: f32,
        top_k_results: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let start = Instant::now();
        check_query(query)?;
        validate_weight("alpha", alpha)?;
        validate_count("top_k", top_k_results)?;
        self.ensure_corpus()?;

        let embedding = self.embed_query(query)?;
        let dense = dense_scores(self.index, &embedding);
        let lexical = self.index.lexical().score_text(query);
        let ranked = linear_fusion(&dense, &lexical, alpha, top_k_results)?;
        Ok(self.finish("hybrid", ranked, start))
    }

    /// Selects up to `top_k_results` documents from the whole corpus by MMR.
    ///
    /// Results are in selection order, each carrying its MMR score at the time
    /// of selection.
    pub fn diverse_retrieve(
        &self,
        query: &str,
        lambda: f32,
        top_k_results: usize,
    ) -> Result<Vec<ScoredDocument>> {
        let start = Instant::now();
        check_query(query)?;
        validate_weight("lambda", lambda)?;
        validate_count("top_k", top_k_results)?;
        self.ensure_corpus()?;

        let embedding = self.embed_query(query)?;
        let pool: Vec<u32> = (0..self.index.len() as u32).collect();
        let selected = mmr_select(self.index, &embedding, &pool, lambda, top_k_results);
        Ok(self.finish("diverse", selected, start))
    }

    /// Runs the two-stage fuse-then-diversify pipeline.
    pub fn pipeline_retrieve(
        &self,
        query: &str,
        config: &RetrievalConfig,
    ) -> Result<Vec<ScoredDocument>> {
        let start = Instant::now();
        check_query(query)?;
        self.ensure_corpus()?;

        let embedding = self.embed_query(query)?;
        let tokens = tokenize(query);
        let ranked = pipeline::run(self.index, &embedding, &tokens, config)?;
        Ok(self.finish("pipeline", ranked, start))
    }

    fn ensure_corpus(&self) -> Result<()> {
        if self.index.is_empty() {
            return Err(RetrievalError::EmptyCorpus);
        }
        Ok(())
    }

    fn embed_query(&self, query: &str) -> Result<Vec<f32>> {
        let embedding = self.embedder.embed(query).map_err(|e| {
            tracing::warn!(provider = self.embedder.name(), error = %e, "query embedding failed");
            RetrievalError::from(e)
        })?;
        self.index.check_query_embedding(&embedding)?;
        Ok(embedding)
    }

    fn finish(&self, method: &str, ranked: Vec<(u32, f32)>, start: Instant) -> Vec<ScoredDocument> {
        let results = materialize(self.index, ranked);
        tracing::debug!(
            method,
            results = results.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "retrieval complete"
        );
        results
    }
}

fn check_query(query: &str) -> Result<()> {
    if query.len() > MAX_QUERY_LEN {
        return Err(RetrievalError::invalid_config(format!(
            "query is {} bytes, maximum is {MAX_QUERY_LEN}",
            query.len()
        )));
    }
    Ok(())
}
