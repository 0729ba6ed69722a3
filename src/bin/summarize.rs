use anyhow::{anyhow, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use podcast_summarizer::config;
use podcast_summarizer::db;
use podcast_summarizer::gemini::GeminiClient;
use podcast_summarizer::listennotes::ListenNotesClient;
use podcast_summarizer::summary::{SummaryOutcome, SummaryService};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Print the stored summary for an episode, generating and storing it first if missing"
)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Listen Notes episode id
    #[arg(long)]
    id: String,

    /// Only read the store; fail instead of generating
    #[arg(long)]
    cached_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let service = SummaryService::new(
        pool.clone(),
        Arc::new(ListenNotesClient::from_config(&cfg)?),
        Arc::new(GeminiClient::from_config(&cfg)?),
    );

    let summary = if args.cached_only {
        service
            .retrieve(&args.id)
            .await?
            .ok_or_else(|| anyhow!("no stored summary for {}", args.id))?
    } else {
        let outcome = service.retrieve_or_create(&args.id).await?;
        match &outcome {
            SummaryOutcome::Created(_) => info!(id = %args.id, "generated new summary"),
            SummaryOutcome::Cached(_) => info!(id = %args.id, "using stored summary"),
        }
        outcome.into_summary()
    };

    println!("{}", summary.summary);
    pool.close().await;
    Ok(())
}
