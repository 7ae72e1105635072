//! Corpus loading.
//!
//! Two file formats are recognized:
//! - **JSON Lines** (`.jsonl` / `.ndjson`): one object per line with a `text` field.
//! - **Plain text** (anything else): one document per non-empty line.
//!
//! Blank lines are skipped in both formats. Document IDs are assigned by
//! position after skipping, so they are dense and start at 0.

use serde::Deserialize;
use std::path::Path;

/// The built-in demo corpus used when no corpus file is given.
pub const SAMPLE_CORPUS: [&str; 15] = [
    "Machine learning algorithms are powerful tools for data analysis and prediction",
    "Deep learning neural networks can process complex patterns in data",
    "Python is a popular programming language for artificial intelligence",
    "Data science involves extracting insights from large datasets",
    "Natural language processing helps computers understand human language",
    "Computer vision enables machines to interpret and analyze visual information",
    "Supervised learning uses labeled data to train predictive models",
    "Unsupervised learning finds hidden patterns in unlabeled data",
    "Reinforcement learning trains agents through reward and punishment",
    "Big data analytics requires specialized tools and techniques",
    "Statistical analysis helps identify trends and patterns in data",
    "Database management systems store and organize large amounts of information",
    "Cloud computing provides scalable infrastructure for data processing",
    "API development enables communication between different software systems",
    "Web scraping extracts data from websites automatically",
];

/// Errors raised while reading a corpus file.
#[derive(Debug, thiserror::Error)]
pub enum CorpusError {
    #[error("failed to read corpus file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON on line {line} of '{path}': {source}")]
    Json {
        path: String,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct CorpusLine {
    text: String,
}

/// Returns the built-in sample corpus as owned strings.
pub fn sample_corpus() -> Vec<String> {
    SAMPLE_CORPUS.iter().map(|s| s.to_string()).collect()
}

/// Loads documents from `path`, choosing the format by file extension.
pub fn load_corpus(path: &Path) -> Result<Vec<String>, CorpusError> {
    let path_str = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| CorpusError::Io {
        path: path_str.clone(),
        source,
    })?;

    let is_jsonl = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("jsonl") | Some("ndjson")
    );

    let documents = if is_jsonl {
        parse_jsonl(&content, &path_str)?
    } else {
        parse_plain(&content)
    };

    tracing::info!(path = %path_str, documents = documents.len(), jsonl = is_jsonl, "Corpus loaded");
    Ok(documents)
}

fn parse_jsonl(content: &str, path: &str) -> Result<Vec<String>, CorpusError> {
    let mut documents = Vec::new();
    for (i, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let parsed: CorpusLine = serde_json::from_str(line).map_err(|source| CorpusError::Json {
            path: path.to_string(),
            line: i + 1,
            source,
        })?;
        if parsed.text.trim().is_empty() {
            continue;
        }
        documents.push(parsed.text);
    }
    Ok(documents)
}

fn parse_plain(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}
