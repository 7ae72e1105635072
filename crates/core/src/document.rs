//! Core document type for ragsearch.
//!
//! A `Document` is an immutable piece of text identified by its position in the
//! corpus. The corpus is loaded once and never mutated, so the position is a
//! stable identifier for the lifetime of a [`crate::index::RetrievalIndex`].

use serde::{Deserialize, Serialize};

/// A document of the closed corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Position of the document in the corpus (0-based).
    pub id: u32,
    /// Text content, indexed by BM25 and embedded once at load time.
    pub text: String,
}

impl Document {
    /// Creates a document at the given corpus position.
    pub fn new(id: u32, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}
