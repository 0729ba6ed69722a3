use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use podcast_summarizer::api::{self, AppState};
use podcast_summarizer::config;
use podcast_summarizer::db;
use podcast_summarizer::gemini::{GeminiClient, SummaryGenerator};
use podcast_summarizer::listennotes::{EpisodeSource, ListenNotesClient};
use podcast_summarizer::summary::SummaryService;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to YAML config file
    #[arg(long, default_value = "config.yaml")]
    config: PathBuf,

    /// Address to bind, overriding `app.listen_addr`
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();
    let cfg = config::load(Some(&args.config))?;
    cfg.ensure_dirs()?;

    let pool = db::init_pool(&cfg.database_url()).await?;
    db::run_migrations(&pool).await?;

    let episodes: Arc<dyn EpisodeSource> = Arc::new(ListenNotesClient::from_config(&cfg)?);
    let generator: Arc<dyn SummaryGenerator> = Arc::new(GeminiClient::from_config(&cfg)?);
    let state = AppState {
        summaries: SummaryService::new(pool.clone(), Arc::clone(&episodes), generator),
        episodes,
        page_size: cfg.app.page_size,
    };
    let app = api::create_router(state);

    let addr = args.listen.unwrap_or_else(|| cfg.app.listen_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "starting podcast summarizer");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool.close().await;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(?err, "failed to install ctrl-c handler");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested; draining requests");
}
