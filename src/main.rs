//! estatebuddy - terminal entry point
//!
//! Thin glue: parse arguments, load config and dataset, construct the
//! pipeline once, run a single request, print. No pipeline logic lives
//! here.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use estatebuddy::cli::{Args, Commands};
use estatebuddy::config::Config;
use estatebuddy::embedding::EmbeddingClient;
use estatebuddy::generation::GenerationClient;
use estatebuddy::listings;
use estatebuddy::rag::pipeline::{PipelineConfig, RagPipeline};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(data) = &args.data {
        config.dataset.path = data.clone();
    }
    if let Some(top_k) = args.top_k {
        config.retrieval.top_k = top_k;
    }
    config.validate()?;

    if matches!(args.command, Some(Commands::Config)) {
        print!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    let records = listings::load_listings(&config.dataset.path, config.dataset.key.as_deref())
        .context("failed to load the listing corpus")?;

    let embedder = Arc::new(EmbeddingClient::new(
        config.backend.provider,
        config.backend.embed_model.clone(),
        config.backend.endpoint.clone(),
        config.backend.api_key.clone(),
    )?);
    let generator = Arc::new(GenerationClient::new(
        config.backend.provider,
        config.backend.chat_model.clone(),
        config.backend.endpoint.clone(),
        config.backend.api_key.clone(),
    )?);

    let progress = spinner("Embedding listings...");
    let pipeline = RagPipeline::build(records, embedder, generator, PipelineConfig::from(&config))
        .await
        .context("failed to build the similarity index")?;
    progress.finish_and_clear();
    println!(
        "{} {} listings indexed",
        "ready:".green().bold(),
        pipeline.corpus_len()
    );

    match args.command {
        Some(Commands::Search { query }) => {
            let results = pipeline.search(&query, args.top_k).await?;
            for (idx, result) in results.iter().enumerate() {
                println!(
                    "\n{}",
                    format!("#{} (distance {:.3})", idx + 1, result.distance).bold()
                );
                print!("{}", result.description);
            }
        }
        _ => {
            let query = args.query.context(
                "provide a query, e.g. estatebuddy \"2 bedroom house in Kumasi under 100000\"",
            )?;

            let progress = spinner("Thinking...");
            let answer = pipeline.answer(&query).await?;
            progress.finish_and_clear();

            println!("{} {}", "AI:".cyan().bold(), answer);
        }
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let default_filter = match verbosity {
        0 => "estatebuddy=info",
        1 => "estatebuddy=debug",
        _ => "estatebuddy=trace",
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn spinner(message: &'static str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    progress.set_style(ProgressStyle::default_spinner().template("{spinner} {msg}").unwrap());
    progress.set_message(message);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}
