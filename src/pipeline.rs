//! The crawl job: fetch, extract, rebuild the index.

use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;
use crate::crawler::{self, FetchError, FetchMode, Fetcher};
use crate::indexer::{Generation, IndexError, Indexer};

const SECS_PER_DAY: u64 = 86_400;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("crawl failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("index build failed: {0}")]
    Index(#[from] IndexError),
}

/// Runs one full crawl and replaces the index with its results.
pub async fn run_crawl(config: &Config, mode: FetchMode) -> Result<Generation, PipelineError> {
    let fetcher = Fetcher::new(mode, &config.fetch, &config.target)?;
    let records = crawler::crawl(&fetcher, &config.target).await?;

    let indexer = Indexer::new(&config.index);
    let generation = indexer.build_index(&records)?;
    Ok(generation)
}

/// Runs the crawl now and then once per `interval`, until Ctrl-C.
///
/// A failed run is logged and the next one still happens on schedule.
pub async fn run_schedule(config: &Config, mode: FetchMode, interval: Duration) {
    loop {
        info!("Running crawler...");
        match run_crawl(config, mode).await {
            Ok(generation) => info!(
                "Crawler completed successfully. Indexed {} research papers.",
                generation.documents
            ),
            Err(e) => error!("Crawler failed with error: {}", e),
        }

        info!(
            "Waiting for {} days before the next run...",
            interval.as_secs() / SECS_PER_DAY
        );
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping scheduler");
                return;
            }
        }
    }
}

pub fn days(count: u64) -> Duration {
    Duration::from_secs(count.saturating_mul(SECS_PER_DAY))
}
