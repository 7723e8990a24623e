//! Attuario main entry point
//!
//! This is the command-line interface for the Attuario crawler and content scorer.

use anyhow::{bail, Context};
use attuario::config::{self, Config};
use attuario::output::{print_summary, write_reports};
use attuario::EvaluationPipeline;
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Attuario: a polite single-domain crawler and actuarial content scorer
///
/// Attuario crawls one website breadth-first while respecting robots.txt and
/// politeness delays, scores every page for actuarial content quality and
/// writes CSV and JSON reports.
#[derive(Parser, Debug)]
#[command(name = "attuario")]
#[command(version)]
#[command(about = "Crawl a domain and score its actuarial content", long_about = None)]
struct Cli {
    /// Starting URL; overrides base-url from the configuration file
    #[arg(value_name = "BASE_URL")]
    base_url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of pages to crawl
    #[arg(long, value_name = "N")]
    max_pages: Option<usize>,

    /// Maximum link depth from the seeds
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Politeness delay between requests, in seconds
    #[arg(long, value_name = "S")]
    delay: Option<f64>,

    /// Concurrent fetch workers (1 disables parallel crawling)
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Seed URL to start from instead of the base URL (repeatable)
    #[arg(long = "seed", value_name = "URL")]
    seeds: Vec<String>,

    /// Disable the in-memory HTTP response cache
    #[arg(long)]
    no_cache: bool,

    /// Directory receiving the reports
    #[arg(short, long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// JSON file with score weights
    #[arg(long, value_name = "FILE.json")]
    weights: Option<PathBuf>,

    /// Validate the configuration and show what would be crawled
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log_file.as_deref())?;

    let config = build_config(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.seeds);
        return Ok(());
    }

    handle_evaluation(&config, &cli.seeds).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("attuario=info,warn"),
            1 => EnvFilter::new("attuario=debug,info"),
            2 => EnvFilter::new("attuario=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Loads the configuration file, if any, and applies command-line overrides
fn build_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            config::parse_config(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        }
        None => Config::default(),
    };

    if let Some(base_url) = &cli.base_url {
        config.crawler.base_url = base_url.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawler.max_depth = max_depth;
    }
    if let Some(delay) = cli.delay {
        config.crawler.delay_seconds = delay;
    }
    if let Some(max_workers) = cli.max_workers {
        config.crawler.max_workers = max_workers;
    }
    if cli.no_cache {
        config.cache.enabled = false;
    }
    if let Some(dir) = &cli.output_dir {
        config.output.directory = dir.display().to_string();
    }
    if let Some(path) = &cli.weights {
        config.weights = config::load_weights(path)
            .with_context(|| format!("Failed to load weights from {}", path.display()))?;
    }

    if config.crawler.base_url.trim().is_empty() {
        bail!("No base URL given: pass BASE_URL or set crawler.base-url in the config file");
    }

    config::validate(&config).context("Invalid configuration")?;
    Ok(config)
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config, seeds: &[String]) {
    println!("=== Attuario Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Max depth: {}", config.crawler.max_depth);
    println!("  Delay: {}s", config.crawler.delay_seconds);
    println!("  Max workers: {}", config.crawler.max_workers);
    println!("  Timeout: {}s", config.crawler.timeout);
    println!("  User agent: {}", config.crawler.user_agent);

    println!("\nCache:");
    if config.cache.enabled {
        println!("  Enabled (expire after {}s)", config.cache.expire_after);
    } else {
        println!("  Disabled");
    }

    println!("\nWeights:");
    for (name, value) in config.weights.entries() {
        println!("  {}: {}", name, value);
    }

    println!("\nOutput:");
    println!("  Directory: {}", config.output.directory);

    println!("\nSeeds:");
    if seeds.is_empty() {
        println!("  * {}", config.crawler.base_url);
    }
    for seed in seeds {
        println!("  * {}", seed);
    }

    println!("\n✓ Configuration is valid");
}

/// Crawls, scores and writes the reports
async fn handle_evaluation(config: &Config, seeds: &[String]) -> anyhow::Result<()> {
    let pipeline = EvaluationPipeline::new(config)
        .await
        .context("Failed to initialize the evaluation pipeline")?;

    let seeds = (!seeds.is_empty()).then(|| seeds.to_vec());
    let results = pipeline.run(seeds).await.context("Evaluation failed")?;
    pipeline.close();

    let directory = Path::new(&config.output.directory);
    let summary = write_reports(&results, directory)
        .with_context(|| format!("Failed to write reports to {}", directory.display()))?;

    print_summary(&summary, &results);
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
