//! DocQA CLI - Command-line interface
//!
//! Usage:
//!   docqa ingest <path>...
//!   docqa query <question> [--llm ollama] [--file <path>]...
//!
//! The default in-memory index lives only as long as the process, so
//! `query --file` ingests documents before asking. With a Qdrant store the
//! index persists across invocations.

use anyhow::Context;
use clap::{Parser, Subcommand};
use docqa_core::AppConfig;
use docqa_rag::RagPipeline;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about PDF documents")]
#[command(version)]
struct Cli {
    /// TOML configuration file; environment variables override it
    #[arg(short, long, global = true, env = "DOCQA_CONFIG")]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index PDF documents
    Ingest {
        /// PDF files to index
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Ask a question about the indexed documents
    Query {
        /// Question to ask
        question: String,

        /// Answering backend (gemini or ollama)
        #[arg(long)]
        llm: Option<String>,

        /// PDF files to index before asking
        #[arg(short, long = "file")]
        files: Vec<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

async fn ingest_paths(pipeline: &RagPipeline, paths: &[PathBuf], json: bool) -> anyhow::Result<()> {
    for path in paths {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let report = pipeline
            .ingest(filename, bytes)
            .await
            .with_context(|| format!("Failed to ingest {}", path.display()))?;

        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            println!(
                "{} processed and added to the database ({} chunks).",
                report.source_file, report.chunk_count
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).context("Invalid configuration")?;
    let pipeline = RagPipeline::from_config(&config)
        .await
        .context("Failed to initialize pipeline")?;

    match cli.command {
        Commands::Ingest { paths } => {
            ingest_paths(&pipeline, &paths, cli.json).await?;
        }
        Commands::Query {
            question,
            llm,
            files,
        } => {
            ingest_paths(&pipeline, &files, cli.json).await?;

            let answer = pipeline.ask(&question, llm.as_deref()).await?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&answer)?);
            } else {
                println!("{}", answer.text);
            }
        }
    }

    Ok(())
}
