//! BM25 Okapi scoring engine.
//!
//! Scores every document of the corpus against a tokenized query. IDF values are
//! computed once at build time; terms whose raw IDF is negative are floored to
//! `epsilon * average_idf` (see [`crate::config`]).

use crate::bm25::inverted_index::InvertedIndex;
use crate::bm25::tokenizer::{tokenize, Tokens};
use crate::config;
use std::collections::HashMap;

/// BM25 Okapi parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    pub epsilon: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: config::BM25_K1,
            b: config::BM25_B,
            epsilon: config::BM25_EPSILON,
        }
    }
}

/// Read-only lexical index: inverted index plus precomputed IDF table.
#[derive(Debug, Clone)]
pub struct LexicalIndex {
    inverted: InvertedIndex,
    idf: HashMap<String, f32>,
    avgdl: f32,
    params: Bm25Params,
}

impl LexicalIndex {
    /// Builds the lexical index over the corpus with default parameters.
    pub fn build<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self::with_params(InvertedIndex::build(texts), Bm25Params::default())
    }

    /// Wraps an inverted index, computing the IDF table for `params`.
    pub fn with_params(inverted: InvertedIndex, params: Bm25Params) -> Self {
        let n = inverted.doc_count as f32;
        let mut idf = HashMap::with_capacity(inverted.index.len());
        let mut negative = Vec::new();

        for (term, postings) in &inverted.index {
            let df = postings.len() as f32;
            // IDF: ln((N - df + 0.5) / (df + 0.5))
            let value = ((n - df + 0.5) / (df + 0.5)).ln();
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term.clone(), value);
        }

        if !idf.is_empty() {
            // Summed in term order so the floor is identical across processes.
            let mut terms: Vec<&String> = idf.keys().collect();
            terms.sort_unstable();
            let idf_sum: f64 = terms.iter().map(|t| f64::from(idf[*t])).sum();
            let floor = params.epsilon * (idf_sum / idf.len() as f64) as f32;
            for term in negative {
                idf.insert(term, floor);
            }
        }

        let avgdl = inverted.average_doc_length();
        Self {
            inverted,
            idf,
            avgdl,
            params,
        }
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.inverted.doc_count as usize
    }

    /// Returns `true` if no documents are indexed.
    pub fn is_empty(&self) -> bool {
        self.inverted.doc_count == 0
    }

    /// The underlying inverted index.
    pub fn inverted(&self) -> &InvertedIndex {
        &self.inverted
    }

    /// IDF of `term`, or `None` if it does not occur in the corpus.
    pub fn idf(&self, term: &str) -> Option<f32> {
        self.idf.get(term).copied()
    }

    /// Scores a tokenized query against every document.
    ///
    /// Returns one score per document in corpus order. Documents sharing no term
    /// with the query score exactly 0.0. An empty query scores every document 0.0.
    pub fn score(&self, query: &Tokens) -> Vec<f32> {
        let mut scores = vec![0.0f32; self.len()];
        if query.is_empty() || self.is_empty() {
            return scores;
        }

        let Bm25Params { k1, b, .. } = self.params;

        for token in query.iter() {
            let (Some(postings), Some(&idf)) = (self.inverted.index.get(token), self.idf.get(token))
            else {
                continue;
            };

            for posting in postings {
                let dl = self.inverted.doc_lengths[posting.doc_id as usize] as f32;
                let length_ratio = if self.avgdl > 0.0 { dl / self.avgdl } else { 0.0 };
                let tf = posting.term_frequency as f32;

                // BM25 score for this term-document pair
                let tf_norm = (tf * (k1 + 1.0)) / (tf + k1 * (1.0 - b + b * length_ratio));
                scores[posting.doc_id as usize] += idf * tf_norm;
            }
        }

        scores
    }

    /// Tokenizes and scores a raw query string.
    pub fn score_text(&self, query: &str) -> Vec<f32> {
        self.score(&tokenize(query))
    }
}
