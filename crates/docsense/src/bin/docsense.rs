//! DocSense command-line interface
//!
//! Run with: cargo run -p docsense -- analyze report.txt

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use docsense::structuring::preview;
use docsense::types::answer::SOFT_FAILURE_HINT;
use docsense::{AnswerOutcome, DocSenseConfig, DocumentPipeline, ModelHandles};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Document classification, structured extraction, and question answering
#[derive(Parser)]
#[command(name = "docsense")]
#[command(version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a document and print its structured extraction as JSON
    Analyze {
        /// Plain-text document
        file: PathBuf,
    },
    /// Answer a question from the content of a document
    Ask {
        /// Plain-text document
        file: PathBuf,
        /// Question to answer
        question: String,
    },
}

const PREVIEW_CHARS: usize = 1000;

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn read_document(path: &Path) -> anyhow::Result<String> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let text = text.trim().to_string();
    tracing::debug!("Document preview: {}", preview(&text, PREVIEW_CHARS));
    Ok(text)
}

async fn analyze(pipeline: &DocumentPipeline, text: &str) -> anyhow::Result<()> {
    let spinner = create_spinner("Analyzing document...");
    let result = pipeline.analyze(text).await;
    spinner.finish_and_clear();
    let analysis = result?;

    let classification = &analysis.classification;
    eprintln!(
        "{} Document type: {} ({:.2})",
        style("✓").green(),
        style(&classification.label).bold(),
        classification.confidence
    );

    if classification.is_low_confidence(pipeline.low_confidence_threshold()) {
        eprintln!(
            "{} Low confidence in classification. Alternatives:",
            style("!").yellow()
        );
        for prediction in &classification.all_predictions {
            eprintln!("    {} {:.2}", prediction.label, prediction.confidence);
        }
    }

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

async fn ask(pipeline: &DocumentPipeline, text: &str, question: &str) -> anyhow::Result<()> {
    let spinner = create_spinner("Generating answer...");
    let result = pipeline.ask(question, text).await;
    spinner.finish_and_clear();
    let answer = result?;

    println!("{}", answer);
    if AnswerOutcome::is_soft_failure(&answer) {
        eprintln!("{} {}", style("hint:").dim(), SOFT_FAILURE_HINT);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsense=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = DocSenseConfig::load(cli.config.as_deref())?;
    tracing::info!("Configuration loaded");
    tracing::info!("  - Embedding backend: {:?}", config.embeddings.backend);
    tracing::info!("  - LLM model: {}", config.llm.generate_model);
    tracing::info!("  - Zero-shot scorer: {:?}", config.classification.scorer);
    tracing::info!("  - NER backend: {:?}", config.ner.backend);

    let spinner = create_spinner("Loading models...");
    let handles = ModelHandles::from_config(&config).await;
    spinner.finish_and_clear();
    let pipeline = DocumentPipeline::new(&config, &handles?);

    match cli.command {
        Commands::Analyze { file } => {
            let text = read_document(&file)?;
            analyze(&pipeline, &text).await
        }
        Commands::Ask { file, question } => {
            let text = read_document(&file)?;
            ask(&pipeline, &text, &question).await
        }
    }
}
