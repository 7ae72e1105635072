use clap::{Parser, Subcommand, ValueEnum};
use ragsearch_core::config;
use ragsearch_core::{
    EmbeddingProvider, HashingEmbedder, RetrievalConfig, RetrievalIndex, Retriever,
};
use ragsearch_server::api::create_router;
use ragsearch_server::api::handlers::AppState;
use ragsearch_server::api::metrics;
use ragsearch_server::cli::{self, Method};
use ragsearch_server::corpus::{load_corpus, sample_corpus};
use ragsearch_server::embedder::HttpEmbedder;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ragsearch",
    version,
    about = "Hybrid dense + BM25 retrieval with MMR diversification"
)]
struct Args {
    /// Corpus file: JSON Lines with a `text` field, or plain text with one document per line.
    /// Defaults to the built-in sample corpus.
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Dimension of the built-in hashing embedder, or the expected dimension of the remote endpoint
    #[arg(long, global = true, default_value_t = config::DEFAULT_EMBEDDING_DIMENSION)]
    embedding_dim: usize,

    /// OpenAI-compatible embeddings endpoint (e.g. http://localhost:8080/v1/embeddings)
    #[arg(long, global = true)]
    embedding_url: Option<String>,

    /// Model name sent to the embeddings endpoint
    #[arg(long, global = true, default_value = "text-embedding-3-small")]
    embedding_model: String,

    /// Bearer token for the embeddings endpoint
    #[arg(long, global = true, env = "RAGSEARCH_EMBEDDING_API_KEY", hide_env_values = true)]
    embedding_api_key: Option<String>,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
        port: u16,

        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },
    /// Run a single query and print the results
    Query {
        query: String,

        /// Named configuration preset (see `presets`)
        #[arg(long, default_value = "balanced")]
        preset: String,

        /// Retrieval method
        #[arg(long, value_enum, default_value_t = Method::Pipeline)]
        method: Method,

        /// Number of results for the single-stage methods
        #[arg(long, default_value_t = config::DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Compare dense, sparse, hybrid and MMR retrieval for one query
    Compare {
        query: String,

        #[arg(long, default_value_t = config::DEFAULT_TOP_K)]
        top_k: usize,
    },
    /// Read queries from stdin and answer them with the pipeline
    Interactive {
        #[arg(long, default_value = "balanced")]
        preset: String,
    },
    /// List the named configuration presets
    Presets,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(args.log_format, matches!(args.command, Command::Serve { .. }))?;

    if let Command::Presets = args.command {
        cli::print_presets(&mut io::stdout().lock())?;
        return Ok(());
    }

    if args.embedding_dim == 0 || args.embedding_dim > config::MAX_DIMENSION {
        eprintln!("Error: embedding-dim must be 1-{}", config::MAX_DIMENSION);
        std::process::exit(1);
    }

    // Initialization barrier: the index is complete before any query runs.
    let embedder = build_embedder(&args)?;
    let documents = match &args.corpus {
        Some(path) => load_corpus(path)?,
        None => sample_corpus(),
    };
    let index = RetrievalIndex::build(documents, embedder.as_ref())?;
    index
        .validate()
        .map_err(|e| format!("index validation failed: {e}"))?;

    match args.command {
        Command::Serve { port, host } => serve(index, embedder, &host, port),
        Command::Query {
            query,
            preset,
            method,
            top_k,
        } => {
            let config = RetrievalConfig::preset(&preset)?;
            let retriever = Retriever::new(&index, embedder.as_ref());
            cli::run_query(&mut io::stdout().lock(), &retriever, &query, method, &config, top_k)
        }
        Command::Compare { query, top_k } => {
            let retriever = Retriever::new(&index, embedder.as_ref());
            cli::compare(&mut io::stdout().lock(), &retriever, &query, top_k)
        }
        Command::Interactive { preset } => {
            let config = RetrievalConfig::preset(&preset)?;
            let retriever = Retriever::new(&index, embedder.as_ref());
            let mut out = io::stdout().lock();
            writeln!(out, "Loaded {} documents", index.len())?;
            cli::interactive(io::stdin().lock(), &mut out, &retriever, &config)?;
            Ok(())
        }
        Command::Presets => Ok(()),
    }
}

fn init_tracing(format: LogFormat, serving: bool) -> Result<(), Box<dyn std::error::Error>> {
    // Terminal commands keep stdout for results and only log warnings.
    let level = if serving { "info" } else { "warn" };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("ragsearch_server={level}").parse()?)
        .add_directive(format!("ragsearch_core={level}").parse()?);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
    Ok(())
}

fn build_embedder(args: &Args) -> Result<Arc<dyn EmbeddingProvider>, Box<dyn std::error::Error>> {
    match &args.embedding_url {
        Some(url) => {
            tracing::info!(url = %url, model = %args.embedding_model, dimension = args.embedding_dim, "Using remote embeddings");
            Ok(Arc::new(HttpEmbedder::new(
                url.clone(),
                args.embedding_model.clone(),
                args.embedding_api_key.clone(),
                args.embedding_dim,
            )?))
        }
        None => {
            tracing::info!(dimension = args.embedding_dim, "Using hashing embeddings");
            Ok(Arc::new(HashingEmbedder::new(args.embedding_dim)))
        }
    }
}

fn serve(
    index: RetrievalIndex,
    embedder: Arc<dyn EmbeddingProvider>,
    host: &str,
    port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    if port == 0 {
        eprintln!("Error: port must be > 0");
        std::process::exit(1);
    }

    let prometheus_handle =
        metrics_exporter_prometheus::PrometheusBuilder::new().install_recorder()?;
    metrics::update_corpus_metrics(&index);

    let documents = index.len();
    let dimension = index.dimension();
    let provider = embedder.name().to_string();
    let state = AppState {
        index: Arc::new(index),
        embedder: Arc::clone(&embedder),
        prometheus_handle,
        start_time: Instant::now(),
    };

    let addr = format!("{host}:{port}");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let app = create_router(state);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        tracing::info!(
            version = env!("CARGO_PKG_VERSION"),
            addr = %addr,
            documents,
            dimension,
            embedding_provider = %provider,
            "ragsearch ready"
        );
        axum::serve(listener, app)
            .with_graceful_shutdown(wait_for_signal())
            .await?;
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    drop(runtime);

    // A blocking HTTP client must not be dropped inside the async runtime,
    // so the last reference is released here.
    drop(embedder);
    tracing::info!("Shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }

    tracing::info!("Shutting down gracefully, draining in-flight requests...");
}
