//! ragd CLI
//!
//! Entry point for the local RAG daemon: serve the HTTP API, rebuild
//! the index, or query it directly from the terminal.

use clap::{Parser, Subcommand};
use ragd_core::{logging, AppResult, RagConfig};
use ragd_knowledge::OllamaEmbedder;
use ragd_llm::OllamaClient;

/// Local RAG over your own code and documents, backed by Ollama.
#[derive(Parser, Debug)]
#[command(name = "ragd")]
#[command(about = "Local RAG service backed by Ollama", long_about = None)]
#[command(version)]
struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve,

    /// Rebuild the vector index from the configured corpora
    Reindex,

    /// Ask a question against the current index
    Ask {
        /// The question to answer
        question: String,
    },

    /// Show the configured Ollama endpoint and models
    Models,
}

#[tokio::main]
async fn main() -> AppResult<()> {
    let cli = Cli::parse();

    let config = RagConfig::from_env()?;
    config.validate()?;

    logging::init_logging(cli.log_level.as_deref(), cli.no_color)?;

    let result = match cli.command {
        Commands::Serve => ragd_server::run_server(config).await,
        Commands::Reindex => reindex(&config).await,
        Commands::Ask { question } => ask(&config, &question).await,
        Commands::Models => models(&config),
    };

    if let Err(e) = &result {
        tracing::error!("Command failed: {}", e);
    }
    result
}

async fn reindex(config: &RagConfig) -> AppResult<()> {
    let embedder = OllamaEmbedder::new(
        &config.ollama_base_url,
        &config.embed_model,
        config.embedding_dim,
    )?;

    let summary = ragd_knowledge::reindex_all(config, &embedder).await?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn ask(config: &RagConfig, question: &str) -> AppResult<()> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ragd_core::AppError::Config(
            "question is required".to_string(),
        ));
    }

    let embedder = OllamaEmbedder::new(
        &config.ollama_base_url,
        &config.embed_model,
        config.embedding_dim,
    )?;
    let llm = OllamaClient::with_base_url(&config.ollama_base_url)?;

    let answer = ragd_knowledge::ask(config, &embedder, &llm, question).await?;

    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for source in &answer.sources {
            println!("  {}: {}", source.source, source.snippet);
        }
    }
    Ok(())
}

fn models(config: &RagConfig) -> AppResult<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "ollama_base_url": config.ollama_base_url,
            "llm_model": config.llm_model,
            "embed_model": config.embed_model,
        }))?
    );
    Ok(())
}
