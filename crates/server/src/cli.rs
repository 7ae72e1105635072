//! Terminal front end: one-shot queries, method comparison, interactive search
//! and preset listing.
//!
//! Everything writes to a caller-supplied `Write` so the binary can pass stdout
//! and tests can pass a buffer.

use ragsearch_core::{RetrievalConfig, Retriever, ScoredDocument, PRESET_NAMES};
use std::io::{self, BufRead, Write};

/// Retrieval method selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Method {
    Pipeline,
    Dense,
    Sparse,
    Hybrid,
    Diverse,
}

/// Hybrid weight and MMR lambda used by `compare`, matching the balanced preset.
const COMPARE_WEIGHT: f32 = 0.7;

const QUIT_WORDS: [&str; 3] = ["quit", "exit", "q"];

/// Prints a ranked list, one document per entry.
pub fn print_results<W: Write>(
    out: &mut W,
    title: &str,
    query: &str,
    results: &[ScoredDocument],
) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", title.to_uppercase())?;
    writeln!(out, "{}", "=".repeat(40))?;
    writeln!(out, "Query: '{query}'")?;
    if results.is_empty() {
        writeln!(out, "(no results)")?;
    }
    for (i, r) in results.iter().enumerate() {
        writeln!(out, "{}. Score: {:.3}", i + 1, r.score)?;
        writeln!(out, "   {}", r.document.text)?;
    }
    Ok(())
}

/// Runs one query with the chosen method and prints the results.
pub fn run_query<W: Write>(
    out: &mut W,
    retriever: &Retriever<'_>,
    query: &str,
    method: Method,
    config: &RetrievalConfig,
    top_k: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let results = match method {
        Method::Pipeline => retriever.pipeline_retrieve(query, config)?,
        Method::Dense => retriever.dense_retrieve(query, top_k)?,
        Method::Sparse => retriever.sparse_retrieve(query, top_k)?,
        Method::Hybrid => retriever.hybrid_retrieve(query, config.hybrid_alpha(), top_k)?,
        Method::Diverse => retriever.diverse_retrieve(query, config.mmr_lambda(), top_k)?,
    };
    let title = format!("{method:?} retrieval");
    print_results(out, &title, query, &results)?;
    Ok(())
}

/// Runs dense, sparse, hybrid and diverse retrieval side by side.
pub fn compare<W: Write>(
    out: &mut W,
    retriever: &Retriever<'_>,
    query: &str,
    top_k: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    writeln!(out)?;
    writeln!(out, "{}", "=".repeat(80))?;
    writeln!(out, "COMPARING ALL METHODS FOR: '{query}'")?;
    writeln!(out, "{}", "=".repeat(80))?;

    let dense = retriever.dense_retrieve(query, top_k)?;
    print_results(out, "Dense retrieval", query, &dense)?;
    let sparse = retriever.sparse_retrieve(query, top_k)?;
    print_results(out, "Sparse retrieval", query, &sparse)?;
    let hybrid = retriever.hybrid_retrieve(query, COMPARE_WEIGHT, top_k)?;
    print_results(out, "Hybrid retrieval", query, &hybrid)?;
    let diverse = retriever.diverse_retrieve(query, COMPARE_WEIGHT, top_k)?;
    print_results(out, "MMR retrieval", query, &diverse)?;
    Ok(())
}

/// Reads queries line by line until EOF or a quit word.
///
/// Retrieval failures are reported and the loop continues; only I/O errors end it.
pub fn interactive<R: BufRead, W: Write>(
    input: R,
    out: &mut W,
    retriever: &Retriever<'_>,
    config: &RetrievalConfig,
) -> io::Result<()> {
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "INTERACTIVE SEARCH")?;
    writeln!(out, "{}", "=".repeat(60))?;
    writeln!(out, "Type your queries (or 'quit' to exit)")?;

    let mut lines = input.lines();
    loop {
        write!(out, "\nEnter your search query: ")?;
        out.flush()?;

        let Some(line) = lines.next() else {
            writeln!(out)?;
            break;
        };
        let query = line?;
        let query = query.trim();

        if QUIT_WORDS.contains(&query.to_lowercase().as_str()) {
            writeln!(out, "Goodbye!")?;
            break;
        }
        if query.is_empty() {
            writeln!(out, "Please enter a valid query.")?;
            continue;
        }

        match retriever.pipeline_retrieve(query, config) {
            Ok(results) => {
                writeln!(out, "\nResults:")?;
                for (i, r) in results.iter().enumerate() {
                    writeln!(out, "{}. {}", i + 1, r.document.text)?;
                }
            }
            Err(e) => writeln!(out, "Error: {e}")?,
        }
    }
    Ok(())
}

/// Prints every named preset with its settings.
pub fn print_presets<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{:<18} {:>6} {:>7} {:>8} {:>6}", "preset", "alpha", "lambda", "initial", "final")?;
    for name in PRESET_NAMES {
        if let Ok(c) = RetrievalConfig::preset(name) {
            writeln!(
                out,
                "{:<18} {:>6.2} {:>7.2} {:>8} {:>6}",
                name,
                c.hybrid_alpha(),
                c.mmr_lambda(),
                c.initial_candidates(),
                c.final_results()
            )?;
        }
    }
    Ok(())
}
