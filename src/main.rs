//! Sitegrab main entry point
//!
//! This is the command-line interface for the Sitegrab crawler.

use anyhow::Context;
use clap::Parser;
use sitegrab::config::{
    load_seed_list, merge_seeds, read_config_with_hash, validate, Config, ConfigOverrides,
};
use sitegrab::output::{load_statistics, print_statistics, print_summary};
use sitegrab::{Coordinator, JsonPageStore, SiteGrabError};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sitegrab: a polite same-origin web crawler
///
/// Sitegrab follows internal links from each seed URL, extracts the readable
/// text and title of every page it reaches, and appends them to one JSON
/// file per site.
#[derive(Parser, Debug)]
#[command(name = "sitegrab")]
#[command(version)]
#[command(about = "A polite same-origin web crawler", long_about = None)]
struct Cli {
    /// Seed URLs to crawl
    #[arg(value_name = "URL")]
    urls: Vec<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON seed list of the form {"urls": [...]}
    #[arg(short, long, value_name = "FILE")]
    seeds: Option<PathBuf>,

    /// Number of concurrent workers
    #[arg(short, long, value_name = "N")]
    workers: Option<u32>,

    /// Directory holding the per-site JSON stores
    #[arg(short = 'o', long, value_name = "DIR")]
    store_dir: Option<String>,

    /// Skip pages whose content is already stored for the site
    #[arg(long)]
    dedupe: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show record counts of the page store and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_effective_config(&cli)?;

    if cli.stats {
        return handle_stats(&config).await;
    }

    let seeds = collect_seeds(&cli, &config)?;

    if cli.dry_run {
        handle_dry_run(&config, &seeds);
        return Ok(());
    }

    handle_crawl(config, seeds).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitegrab=info,warn"),
            1 => EnvFilter::new("sitegrab=debug,info"),
            2 => EnvFilter::new("sitegrab=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the config file (if any), applies command-line overrides and
/// validates the result
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = read_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    ConfigOverrides {
        worker_count: cli.workers,
        store_dir: cli.store_dir.clone(),
        dedupe_content: cli.dedupe,
    }
    .apply(&mut config);

    validate(&config).context("invalid configuration")?;
    Ok(config)
}

/// Gathers seeds from the command line, the seed list and the config file
fn collect_seeds(cli: &Cli, config: &Config) -> Result<Vec<String>, SiteGrabError> {
    let from_file = match &cli.seeds {
        Some(path) => load_seed_list(path)?,
        None => Vec::new(),
    };

    let seeds = merge_seeds([
        cli.urls.as_slice(),
        from_file.as_slice(),
        config.seeds.as_slice(),
    ]);
    if seeds.is_empty() {
        return Err(SiteGrabError::NoSeeds);
    }
    Ok(seeds)
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Sitegrab Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Polite delay: {}ms", config.crawler.per_request_delay);
    println!("  Page timeout: {}ms", config.crawler.per_page_timeout);
    println!("  Renderer: {:?}", config.crawler.renderer);
    match config.crawler.deadline() {
        Some(deadline) => println!("  Run deadline: {}s", deadline.as_secs()),
        None => println!("  Run deadline: none"),
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Store directory: {}", config.output.store_dir);
    println!("  Content dedupe: {}", config.output.dedupe_content);

    println!("\nSeeds ({}):", seeds.len());
    for seed in seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would start crawling with {} seed URLs", seeds.len());
}

/// Handles the --stats mode: shows per-site record counts
async fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Store directory: {}\n", config.output.store_dir);

    let store = JsonPageStore::new(&config.output.store_dir);
    let stats = load_statistics(&store).await?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, seeds: Vec<String>) -> anyhow::Result<()> {
    let coordinator = Coordinator::new(config)?;
    let handle = coordinator.submit(seeds)?;

    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            token.cancel();
        }
    });

    let summary = handle.wait().await?;
    print_summary(&summary);

    Ok(())
}
