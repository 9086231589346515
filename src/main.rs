use anyhow::Result;
use clap::{Parser, ValueEnum};
use colored::*;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use docrag_core::{EmbeddingClient, LanguageModel, VectorStore};
use docrag_ollama::{OllamaConfig, OllamaEmbedder, OllamaGenerator};
use docrag_rag::{
    HashEmbedder, InMemoryVectorStore, Pipeline, PipelineConfig, QdrantVectorStore, StoreConfig,
};

const DEFAULT_QUESTION: &str = "How many chapters in the Alice's Adventures in Wonderland?";

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StoreKind {
    /// Keep passages in process memory
    Memory,
    /// Use the Qdrant collection named by DOCRAG_INDEX_NAME
    Qdrant,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EmbedderKind {
    /// Ollama embedding model (DOCRAG_EMBEDDING_MODEL)
    Ollama,
    /// Offline feature hashing, no model server needed
    Hash,
}

#[derive(Parser)]
#[command(name = "docrag")]
#[command(about = "Answer a question from a single document with retrieval-augmented generation", long_about = None)]
struct Cli {
    /// Markdown or text file to index
    #[arg(short, long, default_value = "data.md")]
    file: PathBuf,

    /// Question to answer
    #[arg(short, long, default_value = DEFAULT_QUESTION)]
    question: String,

    /// Passages to retrieve (overrides DOCRAG_TOP_K)
    #[arg(short = 'k', long, value_parser = clap::value_parser!(u64).range(1..))]
    top_k: Option<u64>,

    /// Where indexed passages are stored
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    /// How passages and questions are embedded
    #[arg(long, value_enum, default_value_t = EmbedderKind::Ollama)]
    embedder: EmbedderKind,

    /// Print the assembled prompt before the answer
    #[arg(long)]
    show_prompt: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut config = PipelineConfig::from_env()?;
    if let Some(top_k) = cli.top_k {
        config = config.with_top_k(top_k as usize);
    }

    let ollama = OllamaConfig::from_env()?;

    let embedder: Arc<dyn EmbeddingClient> = match cli.embedder {
        EmbedderKind::Ollama => Arc::new(OllamaEmbedder::new(&ollama)?),
        EmbedderKind::Hash => Arc::new(HashEmbedder::default()),
    };
    let store: Arc<dyn VectorStore> = match cli.store {
        StoreKind::Memory => Arc::new(InMemoryVectorStore::new()),
        StoreKind::Qdrant => Arc::new(QdrantVectorStore::new(&StoreConfig::from_env()?)?),
    };
    let llm: Arc<dyn LanguageModel> = Arc::new(OllamaGenerator::new(&ollama)?);

    let pipeline = Pipeline::new(config, embedder, store, llm)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    info!(file = %cli.file.display(), top_k = pipeline.config().top_k, "starting run");
    println!("{} Indexing {}", "📄".blue(), cli.file.display());

    let answer = match pipeline.run_file(&cli.file, &cli.question, &cancel).await {
        Ok(answer) => answer,
        Err(e) if e.is_cancelled() => {
            warn!(stage = %e.stage, "run cancelled");
            println!("{} Cancelled while {}", "⏹️".yellow(), e.stage);
            return Ok(());
        }
        Err(e) => {
            error!(stage = %e.stage, error = %e, "run failed");
            return Err(e.into());
        }
    };

    println!(
        "{} Indexed {} chunks, retrieved {} passages",
        "✅".green(),
        answer.chunks_indexed,
        answer.passages.len()
    );

    if cli.show_prompt {
        println!("\n{}", "Prompt:".bold());
        println!("{}", answer.prompt.dimmed());
    }

    println!("\n{}", "Answer from the model:".bold().green());
    println!("{}", answer.completion);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_flag() {
        let cli = Cli::try_parse_from(["docrag", "--top-k", "3"]).unwrap();
        assert_eq!(cli.top_k, Some(3));

        let cli = Cli::try_parse_from(["docrag", "-k", "1"]).unwrap();
        assert_eq!(cli.top_k, Some(1));
    }

    #[test]
    fn test_top_k_flag_rejects_zero() {
        assert!(Cli::try_parse_from(["docrag", "--top-k", "0"]).is_err());
        assert!(Cli::try_parse_from(["docrag", "-k", "0"]).is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["docrag"]).unwrap();
        assert_eq!(cli.file, PathBuf::from("data.md"));
        assert_eq!(cli.question, DEFAULT_QUESTION);
        assert_eq!(cli.top_k, None);
    }
}
