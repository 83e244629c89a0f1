// src/main.rs

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};

use pubindex::config::Config;
use pubindex::crawler::FetchMode;
use pubindex::pipeline;
use pubindex::record::ResultRecord;
use pubindex::searcher::{SearchOutcome, Searcher};

/// Crawl a publication listing into a local search index and query it.
#[derive(Parser)]
#[command(name = "pubindex")]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON config file; built-in defaults apply to anything it leaves out
    #[arg(short, long, global = true, env = "PUBINDEX_CONFIG")]
    config: Option<PathBuf>,

    /// Index store directory (overrides the config file)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl the listing page and rebuild the index
    Crawl {
        /// Plain HTTP GET instead of a headless browser (no lazy-loaded entries)
        #[arg(long)]
        http: bool,
    },

    /// Search the index; an empty query lists everything up to the limit
    Search {
        query: Vec<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Crawl now and then again every interval
    Schedule {
        #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..=36500))]
        interval_days: u64,

        #[arg(long)]
        http: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(dir) = cli.index_dir {
        config.index.dir = dir;
    }

    match cli.command {
        Commands::Crawl { http } => run_crawl(&config, fetch_mode(http)).await,
        Commands::Search { query, limit, json } => {
            if let Some(limit) = limit {
                config.search.limit = limit;
            }
            config.validate()?;
            run_search(&config, &query.join(" "), json)
        }
        Commands::Schedule { interval_days, http } => {
            pipeline::run_schedule(&config, fetch_mode(http), pipeline::days(interval_days)).await;
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();
}

fn fetch_mode(http: bool) -> FetchMode {
    if http { FetchMode::Http } else { FetchMode::Browser }
}

async fn run_crawl(config: &Config, mode: FetchMode) -> Result<()> {
    println!("Crawling publications...");
    let generation = pipeline::run_crawl(config, mode)
        .await
        .context("Crawl job abandoned")?;
    println!("Indexed {} research papers.", generation.documents);
    Ok(())
}

fn run_search(config: &Config, query: &str, json: bool) -> Result<()> {
    let searcher = Searcher::new(&config.index, &config.search);

    let records = match searcher.search(query) {
        SearchOutcome::Hits(records) => records,
        SearchOutcome::NoMatches => Vec::new(),
        SearchOutcome::EngineUnavailable(reason) => {
            bail!("Search is unavailable: {reason}. Run `pubindex crawl` to build the index.")
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    println!("Found {} results:", records.len());
    for record in &records {
        print_record(record);
    }
    Ok(())
}

fn print_record(record: &ResultRecord) {
    println!("------------------------------------------------");
    println!("Title:    {}", record.title);
    println!("Link:     {}", record.link);
    println!("Date:     {}", record.date);
    if record.authors.is_empty() {
        println!("Authors:  -");
    }
    for (i, author) in record.authors.iter().enumerate() {
        let label = if i == 0 { "Authors:" } else { "" };
        println!("{:<9} {} <{}>", label, author.name, author.profile_link);
    }
    println!("Relevance: {:.4}", record.score);
}
