mod config;
mod db;
mod error;
mod fetcher;
mod normalizer;
mod pipeline;
mod rating;
mod types;

use std::time::Duration;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::SqliteContestStore;
use crate::error::Result;
use crate::fetcher::CodeforcesClient;
use crate::pipeline::Uploader;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Database setup ---
    let store = SqliteContestStore::connect(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    // --- Standings source ---
    let client = CodeforcesClient::new(&cfg)?;
    if client.is_authenticated() {
        info!("Codeforces API: signed requests enabled");
    } else {
        warn!("CF_API_KEY / CF_API_SECRET not both set, using anonymous requests");
    }

    let uploader = Uploader::new(
        client,
        store,
        cfg.division.clone(),
        Duration::from_millis(cfg.upload_delay_ms),
    );

    info!("📥 Fetching latest rated contests...");
    let summary = uploader.run_latest(cfg.contest_count).await?;
    let stored = uploader.store().count().await?;

    info!(
        skipped = summary.skipped,
        uploaded = summary.uploaded,
        failed = summary.failed,
        stored,
        "Backfill complete: {} uploaded, {} already present, {} failed ({stored} contests stored)",
        summary.uploaded,
        summary.skipped,
        summary.failed,
    );

    Ok(())
}
