use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use docdex_core::{
    IngestPipeline, OpenAiEmbedder, PipelineConfig, QueryResult, Retriever, VectorIndex,
};

#[derive(Parser)]
#[command(name = "docdex")]
#[command(version)]
#[command(about = "Semantic search over API-reference docsets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a semantic index from a docset bundle.
    Ingest(IngestArgs),
    /// Query an index artifact.
    Query(QueryArgs),
    /// Print facts about an index artifact.
    Info(InfoArgs),
}

#[derive(Args)]
struct IngestArgs {
    /// Path to the .docset bundle directory.
    #[arg(long)]
    docset: PathBuf,
    /// Where to write the index artifact.
    #[arg(long)]
    output: PathBuf,
    /// Embedding model to build the index with.
    #[arg(long, default_value = "text-embedding-3-small")]
    model: String,
    /// Maximum tokens per chunk.
    #[arg(long, default_value_t = 500)]
    max_tokens: usize,
    /// Tokens shared between consecutive chunks.
    #[arg(long, default_value_t = 50)]
    overlap: usize,
    /// Texts per embedding request.
    #[arg(long, default_value_t = 50)]
    batch_size: usize,
    /// OpenAI API key; falls back to OPENAI_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
}

#[derive(Args)]
struct QueryArgs {
    /// Path to the index artifact.
    #[arg(long)]
    index: PathBuf,
    /// Question to search for.
    #[arg(long)]
    query: String,
    /// Number of results to return.
    #[arg(long, default_value_t = 5)]
    top_k: usize,
    /// Embedding model; must match the one the index was built with.
    #[arg(long, default_value = "text-embedding-3-small")]
    model: String,
    /// OpenAI API key; falls back to OPENAI_API_KEY.
    #[arg(long)]
    api_key: Option<String>,
    /// Print results as JSON instead of snippets.
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Path to the index artifact.
    #[arg(long)]
    index: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Ingest(args) => ingest_command(args),
        Command::Query(args) => query_command(args),
        Command::Info(args) => info_command(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_api_key(explicit: Option<String>) -> Result<String> {
    if let Some(key) = explicit {
        return Ok(key);
    }
    std::env::var("OPENAI_API_KEY").context("no API key: pass --api-key or set OPENAI_API_KEY")
}

fn ingest_command(args: IngestArgs) -> Result<()> {
    let config = PipelineConfig::builder()
        .max_tokens(args.max_tokens)
        .overlap(args.overlap)
        .batch_size(args.batch_size)
        .build()?;
    let api_key = resolve_api_key(args.api_key)?;
    let embedder = OpenAiEmbedder::new(api_key)
        .with_model(args.model.as_str())
        .with_batch_size(config.batch_size);

    let pipeline = IngestPipeline::new(&config, Box::new(embedder))?;
    let index = pipeline
        .ingest_docset(&args.docset)
        .with_context(|| format!("ingesting {}", args.docset.display()))?;
    index
        .save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;

    println!(
        "indexed {} chunks of dimension {} -> {}",
        index.len(),
        index.dimension(),
        args.output.display()
    );
    Ok(())
}

fn query_command(args: QueryArgs) -> Result<()> {
    let index = VectorIndex::load(&args.index)
        .with_context(|| format!("loading {}", args.index.display()))?;
    let api_key = resolve_api_key(args.api_key)?;
    let embedder = OpenAiEmbedder::new(api_key).with_model(args.model.as_str());

    let retriever = Retriever::new(index, Box::new(embedder));
    let results = retriever.retrieve(&args.query, args.top_k)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        print_snippets(&results);
    }
    Ok(())
}

fn print_snippets(results: &[QueryResult]) {
    for (i, result) in results.iter().enumerate() {
        println!("--- Snippet {} ---", i + 1);
        println!("Doc: {} (distance: {:.4})", result.name, result.distance);
        println!("{}", result.chunk);
        println!();
    }
}

fn info_command(args: InfoArgs) -> Result<()> {
    let index = VectorIndex::load(&args.index)
        .with_context(|| format!("loading {}", args.index.display()))?;
    let size = std::fs::metadata(&args.index)?.len();

    println!("path:      {}", args.index.display());
    println!("rows:      {}", index.len());
    println!("dimension: {}", index.dimension());
    println!("file size: {size} bytes");
    Ok(())
}
