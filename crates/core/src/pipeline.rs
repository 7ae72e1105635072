//! Multi-stage retrieval pipeline.
//!
//! Stage one fuses dense and lexical scores over the whole corpus and keeps the
//! best `initial_candidates`. Stage two either diversifies with MMR down to
//! `final_results` or simply truncates the fused ranking.

use crate::bm25::Tokens;
use crate::config::{
    DEFAULT_FINAL_RESULTS, DEFAULT_HYBRID_ALPHA, DEFAULT_INITIAL_CANDIDATES, DEFAULT_MMR_LAMBDA,
    MAX_K,
};
use crate::error::{Result, RetrievalError};
use crate::index::RetrievalIndex;
use crate::search::dense::dense_scores;
use crate::search::hybrid::{linear_fusion, validate_weight};
use crate::search::mmr::mmr_select;
use serde::{Deserialize, Serialize};

/// Which documents MMR may choose from in the pipeline's second stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MmrPool {
    /// Only the fused top-`initial_candidates`.
    #[default]
    Candidates,
    /// Every document in the corpus.
    Corpus,
}

/// Validated pipeline configuration.
///
/// Fields are private so an instance is always valid: construct with
/// [`RetrievalConfig::new`], [`RetrievalConfig::preset`], [`Default`] or serde.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRetrievalConfig")]
pub struct RetrievalConfig {
    hybrid_alpha: f32,
    mmr_lambda: f32,
    initial_candidates: usize,
    final_results: usize,
    use_mmr: bool,
    mmr_pool: MmrPool,
}

/// Unvalidated wire form. Missing fields take the balanced defaults.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, default)]
struct RawRetrievalConfig {
    hybrid_alpha: f32,
    mmr_lambda: f32,
    initial_candidates: usize,
    final_results: usize,
    use_mmr: bool,
    mmr_pool: MmrPool,
}

impl Default for RawRetrievalConfig {
    fn default() -> Self {
        Self {
            hybrid_alpha: DEFAULT_HYBRID_ALPHA,
            mmr_lambda: DEFAULT_MMR_LAMBDA,
            initial_candidates: DEFAULT_INITIAL_CANDIDATES,
            final_results: DEFAULT_FINAL_RESULTS,
            use_mmr: true,
            mmr_pool: MmrPool::Candidates,
        }
    }
}

impl TryFrom<RawRetrievalConfig> for RetrievalConfig {
    type Error = RetrievalError;

    fn try_from(raw: RawRetrievalConfig) -> Result<Self> {
        Ok(Self::new(
            raw.hybrid_alpha,
            raw.mmr_lambda,
            raw.initial_candidates,
            raw.final_results,
        )?
        .with_use_mmr(raw.use_mmr)
        .with_mmr_pool(raw.mmr_pool))
    }
}

/// Names accepted by [`RetrievalConfig::preset`], in display order.
pub const PRESET_NAMES: [&str; 8] = [
    "balanced",
    "semantic_focus",
    "keyword_focus",
    "high_diversity",
    "e_commerce",
    "legal",
    "research",
    "customer_support",
];

impl RetrievalConfig {
    /// Creates a validated configuration with MMR enabled over the candidate pool.
    pub fn new(
        hybrid_alpha: f32,
        mmr_lambda: f32,
        initial_candidates: usize,
        final_results: usize,
    ) -> Result<Self> {
        validate_weight("hybrid_alpha", hybrid_alpha)?;
        validate_weight("mmr_lambda", mmr_lambda)?;
        validate_count("initial_candidates", initial_candidates)?;
        validate_count("final_results", final_results)?;
        if final_results > initial_candidates {
            tracing::warn!(
                initial_candidates,
                final_results,
                "final_results exceeds initial_candidates; results are bounded by the candidate pool"
            );
        }
        Ok(Self {
            hybrid_alpha,
            mmr_lambda,
            initial_candidates,
            final_results,
            use_mmr: true,
            mmr_pool: MmrPool::Candidates,
        })
    }

    /// Looks up a named preset.
    pub fn preset(name: &str) -> Result<Self> {
        let (alpha, lambda) = match name {
            "balanced" => (0.7, 0.7),
            "semantic_focus" => (0.9, 0.6),
            "keyword_focus" => (0.3, 0.8),
            "high_diversity" => (0.7, 0.5),
            "e_commerce" => (0.6, 0.6),
            "legal" => (0.3, 0.8),
            "research" => (0.8, 0.5),
            "customer_support" => (0.7, 0.7),
            other => {
                return Err(RetrievalError::invalid_config(format!(
                    "unknown preset '{other}', expected one of: {}",
                    PRESET_NAMES.join(", ")
                )))
            }
        };
        Self::new(alpha, lambda, DEFAULT_INITIAL_CANDIDATES, DEFAULT_FINAL_RESULTS)
    }

    /// Every named preset, in [`PRESET_NAMES`] order.
    pub fn presets() -> Vec<(&'static str, Self)> {
        PRESET_NAMES
            .iter()
            .filter_map(|&name| Self::preset(name).ok().map(|config| (name, config)))
            .collect()
    }

    /// Enables or disables the MMR stage.
    pub fn with_use_mmr(mut self, use_mmr: bool) -> Self {
        self.use_mmr = use_mmr;
        self
    }

    /// Chooses the MMR candidate pool.
    pub fn with_mmr_pool(mut self, mmr_pool: MmrPool) -> Self {
        self.mmr_pool = mmr_pool;
        self
    }

    pub fn hybrid_alpha(&self) -> f32 {
        self.hybrid_alpha
    }

    pub fn mmr_lambda(&self) -> f32 {
        self.mmr_lambda
    }

    pub fn initial_candidates(&self) -> usize {
        self.initial_candidates
    }

    pub fn final_results(&self) -> usize {
        self.final_results
    }

    pub fn use_mmr(&self) -> bool {
        self.use_mmr
    }

    pub fn mmr_pool(&self) -> MmrPool {
        self.mmr_pool
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            hybrid_alpha: DEFAULT_HYBRID_ALPHA,
            mmr_lambda: DEFAULT_MMR_LAMBDA,
            initial_candidates: DEFAULT_INITIAL_CANDIDATES,
            final_results: DEFAULT_FINAL_RESULTS,
            use_mmr: true,
            mmr_pool: MmrPool::Candidates,
        }
    }
}

/// Rejects result counts of zero or above [`MAX_K`].
pub(crate) fn validate_count(name: &str, value: usize) -> Result<()> {
    if value == 0 || value > MAX_K {
        return Err(RetrievalError::invalid_config(format!(
            "{name} must be within 1..={MAX_K}, got {value}"
        )));
    }
    Ok(())
}

/// Runs the pipeline for an already embedded and tokenized query.
///
/// Returns `(doc_id, score)` pairs: MMR scores when diversification ran, fused
/// scores otherwise. The caller validates the query embedding against the index.
pub fn run(
    index: &RetrievalIndex,
    query_embedding: &[f32],
    query_tokens: &Tokens,
    config: &RetrievalConfig,
) -> Result<Vec<(u32, f32)>> {
    let dense = dense_scores(index, query_embedding);
    let lexical = index.lexical().score(query_tokens);
    let mut candidates =
        linear_fusion(&dense, &lexical, config.hybrid_alpha, config.initial_candidates)?;

    tracing::debug!(
        candidates = candidates.len(),
        alpha = config.hybrid_alpha,
        "fusion stage complete"
    );

    if !config.use_mmr {
        candidates.truncate(config.final_results);
        return Ok(candidates);
    }

    let pool: Vec<u32> = match config.mmr_pool {
        MmrPool::Candidates => {
            // Corpus order, so MMR ties resolve the same way as everywhere else.
            let mut ids: Vec<u32> = candidates.iter().map(|&(id, _)| id).collect();
            ids.sort_unstable();
            ids
        }
        MmrPool::Corpus => (0..index.len() as u32).collect(),
    };

    let selected = mmr_select(
        index,
        query_embedding,
        &pool,
        config.mmr_lambda,
        config.final_results,
    );
    tracing::debug!(
        pool = pool.len(),
        selected = selected.len(),
        lambda = config.mmr_lambda,
        "diversity stage complete"
    );
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bm25::tokenize;

    /// Query embedding [1, 0]: docs 0 and 1 are exact matches, doc 2 is close,
    /// doc 3 is orthogonal.
    fn index() -> RetrievalIndex {
        RetrievalIndex::from_embeddings(
            ["first match", "second match", "close", "orthogonal"],
            vec![
                vec![1.0, 0.0],
                vec![1.0, 0.0],
                vec![0.8, 0.6],
                vec![0.0, 1.0],
            ],
        )
        .unwrap()
    }

    fn ids(ranked: &[(u32, f32)]) -> Vec<u32> {
        ranked.iter().map(|&(id, _)| id).collect()
    }

    #[test]
    fn test_default_is_balanced_preset() {
        assert_eq!(RetrievalConfig::default(), RetrievalConfig::preset("balanced").unwrap());
    }

    #[test]
    fn test_preset_values() {
        let legal = RetrievalConfig::preset("legal").unwrap();
        assert_eq!(legal.hybrid_alpha(), 0.3);
        assert_eq!(legal.mmr_lambda(), 0.8);
        assert_eq!(legal.initial_candidates(), 10);
        assert_eq!(legal.final_results(), 5);
        assert!(legal.use_mmr());
        assert_eq!(legal.mmr_pool(), MmrPool::Candidates);

        let research = RetrievalConfig::preset("research").unwrap();
        assert_eq!(research.hybrid_alpha(), 0.8);
        assert_eq!(research.mmr_lambda(), 0.5);
    }

    #[test]
    fn test_all_presets_listed() {
        let presets = RetrievalConfig::presets();
        assert_eq!(presets.len(), PRESET_NAMES.len());
        assert_eq!(presets[0].0, "balanced");
    }

    #[test]
    fn test_unknown_preset_rejected() {
        let err = RetrievalConfig::preset("aggressive").unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidConfig { .. }));
        assert!(err.to_string().contains("aggressive"));
    }

    #[test]
    fn test_new_rejects_out_of_range() {
        assert!(RetrievalConfig::new(1.1, 0.5, 10, 5).is_err());
        assert!(RetrievalConfig::new(0.5, -0.1, 10, 5).is_err());
        assert!(RetrievalConfig::new(f32::NAN, 0.5, 10, 5).is_err());
        assert!(RetrievalConfig::new(0.5, 0.5, 0, 5).is_err());
        assert!(RetrievalConfig::new(0.5, 0.5, 10, 0).is_err());
        assert!(RetrievalConfig::new(0.5, 0.5, MAX_K + 1, 5).is_err());
    }

    #[test]
    fn test_new_accepts_final_above_initial() {
        let config = RetrievalConfig::new(0.5, 0.5, 5, 10).unwrap();
        assert_eq!(config.final_results(), 10);
    }

    #[test]
    fn test_deserialize_partial_uses_defaults() {
        let config: RetrievalConfig =
            serde_json::from_str(r#"{"hybrid_alpha": 0.25, "use_mmr": false}"#).unwrap();
        assert_eq!(config.hybrid_alpha(), 0.25);
        assert!(!config.use_mmr());
        assert_eq!(config.mmr_lambda(), DEFAULT_MMR_LAMBDA);
        assert_eq!(config.final_results(), DEFAULT_FINAL_RESULTS);
    }

    #[test]
    fn test_deserialize_rejects_unknown_fields() {
        let result = serde_json::from_str::<RetrievalConfig>(r#"{"alpha": 0.5}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_deserialize_rejects_invalid_values() {
        let result = serde_json::from_str::<RetrievalConfig>(r#"{"mmr_lambda": 2.0}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("mmr_lambda"), "got: {err}");
    }

    #[test]
    fn test_deserialize_mmr_pool() {
        let config: RetrievalConfig = serde_json::from_str(r#"{"mmr_pool": "corpus"}"#).unwrap();
        assert_eq!(config.mmr_pool(), MmrPool::Corpus);
    }

    #[test]
    fn test_serialize_roundtrip_preserves_preset() {
        let config = RetrievalConfig::preset("keyword_focus").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        let back: RetrievalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_run_without_mmr_truncates_fusion() {
        let idx = index();
        let config = RetrievalConfig::new(1.0, 0.5, 4, 2).unwrap().with_use_mmr(false);
        let ranked = run(&idx, &[1.0, 0.0], &tokenize(""), &config).unwrap();
        assert_eq!(ids(&ranked), vec![0, 1]);
    }

    #[test]
    fn test_run_candidate_pool_restricts_mmr() {
        let idx = index();
        // Fused top-2 is {0, 1}; MMR must pick from those only.
        let config = RetrievalConfig::new(1.0, 0.3, 2, 2).unwrap();
        let ranked = run(&idx, &[1.0, 0.0], &tokenize(""), &config).unwrap();
        assert_eq!(ids(&ranked), vec![0, 1]);
    }

    #[test]
    fn test_run_corpus_pool_reaches_beyond_candidates() {
        let idx = index();
        // Low lambda: the orthogonal doc has no redundancy penalty and wins
        // the second slot once the whole corpus is eligible.
        let config = RetrievalConfig::new(1.0, 0.3, 2, 2)
            .unwrap()
            .with_mmr_pool(MmrPool::Corpus);
        let ranked = run(&idx, &[1.0, 0.0], &tokenize(""), &config).unwrap();
        assert_eq!(ids(&ranked), vec![0, 3]);
    }

    #[test]
    fn test_run_bounded_by_corpus_size() {
        let idx = index();
        let config = RetrievalConfig::new(0.5, 0.5, 5, 10).unwrap();
        let ranked = run(&idx, &[1.0, 0.0], &tokenize("match"), &config).unwrap();
        assert_eq!(ranked.len(), 4);
    }
}
