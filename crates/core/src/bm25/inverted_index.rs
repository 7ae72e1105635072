//! Inverted index for BM25 full-text search.
//!
//! Maps terms to postings lists (document ID + term frequency). Documents are
//! identified by their u32 corpus position. The index is built once from the
//! full corpus and never modified afterwards, so its statistics always reflect
//! exactly the loaded document set.

use crate::bm25::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single entry in a term's postings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// Corpus position of the document.
    pub doc_id: u32,
    /// Number of times the term appears in this document.
    pub term_frequency: u32,
}

/// Inverted index mapping terms to postings lists.
///
/// Postings are sorted by ascending `doc_id`. Document lengths are tracked for
/// BM25 length normalization.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    /// term → list of postings
    pub index: HashMap<String, Vec<Posting>>,
    /// doc_id → document length (number of tokens). Indexed by corpus position.
    pub doc_lengths: Vec<u32>,
    /// Total number of documents indexed
    pub doc_count: u32,
    /// Sum of all document lengths (for average calculation)
    pub total_doc_length: u64,
}

impl InvertedIndex {
    /// Builds the index over `texts`, assigning each text its position as ID.
    pub fn build<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut idx = Self::default();
        for (position, text) in texts.into_iter().enumerate() {
            idx.add_document(position as u32, text);
        }
        idx
    }

    /// Index a document's text. Documents must be added in corpus order.
    fn add_document(&mut self, doc_id: u32, text: &str) {
        let tokens = tokenize(text);
        let doc_len = tokens.len() as u32;

        debug_assert_eq!(doc_id as usize, self.doc_lengths.len());
        self.doc_lengths.push(doc_len);
        self.doc_count += 1;
        self.total_doc_length += doc_len as u64;

        // Count term frequencies for this doc
        let mut tf_map: HashMap<&str, u32> = HashMap::new();
        for token in tokens.iter() {
            *tf_map.entry(token).or_insert(0) += 1;
        }

        for (term, tf) in tf_map {
            self.index
                .entry(term.to_string())
                .or_default()
                .push(Posting {
                    doc_id,
                    term_frequency: tf,
                });
        }
    }

    /// Number of documents containing `term`.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.index.get(term).map_or(0, Vec::len)
    }

    /// Returns the average document length across all indexed documents.
    pub fn average_doc_length(&self) -> f32 {
        if self.doc_count == 0 {
            return 0.0;
        }
        self.total_doc_length as f32 / self.doc_count as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_indexes_every_token() {
        let idx = InvertedIndex::build(["the quick brown fox"]);
        assert_eq!(idx.doc_count, 1);
        assert!(idx.index.contains_key("the"));
        assert!(idx.index.contains_key("quick"));
        assert!(idx.index.contains_key("fox"));
    }

    #[test]
    fn test_term_frequency() {
        let idx = InvertedIndex::build(["hello hello hello world"]);
        let postings = idx.index.get("hello").unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].term_frequency, 3);
        assert_eq!(idx.index.get("world").unwrap()[0].term_frequency, 1);
    }

    #[test]
    fn test_postings_in_corpus_order() {
        let idx = InvertedIndex::build(["rust one", "python", "rust two", "rust three"]);
        let ids: Vec<u32> = idx.index["rust"].iter().map(|p| p.doc_id).collect();
        assert_eq!(ids, vec![0, 2, 3]);
        assert_eq!(idx.document_frequency("rust"), 3);
        assert_eq!(idx.document_frequency("java"), 0);
    }

    #[test]
    fn test_doc_lengths_and_average() {
        let idx = InvertedIndex::build(["a b c", "d", ""]);
        assert_eq!(idx.doc_lengths, vec![3, 1, 0]);
        assert_eq!(idx.doc_count, 3);
        assert_eq!(idx.total_doc_length, 4);
        assert!((idx.average_doc_length() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_index() {
        let idx = InvertedIndex::build(std::iter::empty());
        assert_eq!(idx.doc_count, 0);
        assert_eq!(idx.average_doc_length(), 0.0);
    }
}
