//! BM25 lexical retrieval.
//!
//! Implements Okapi BM25 scoring over an inverted index built once from the
//! corpus. Documents and queries are tokenized by lowercasing and splitting on
//! whitespace. No stemming or stop word removal is applied.

/// Inverted index data structure with postings lists.
pub mod inverted_index;
/// BM25 Okapi scoring over the whole corpus.
pub mod scorer;
/// Lowercasing whitespace tokenizer.
pub mod tokenizer;

pub use inverted_index::InvertedIndex;
pub use scorer::{Bm25Params, LexicalIndex};
pub use tokenizer::{tokenize, Tokens};
