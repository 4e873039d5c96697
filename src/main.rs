//! Wayback-Capture main entry point
//!
//! This is the command-line interface for the Wayback-Capture archiver.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::EnvFilter;
use wayback_capture::capture::{coordinator_from_config, run_capture, RunOutcome};
use wayback_capture::config::{load_config_with_hash, Config};
use wayback_capture::output::print_statistics;
use wayback_capture::storage::{open_store, JsonFileStore, ProgressStore};

/// Exit status after an interrupted run, as for a shell-level SIGINT
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Wayback-Capture: archive URLs with Save Page Now
///
/// Reads URLs (one per line) from stdin, reuses recent Wayback Machine captures,
/// submits capture jobs for the rest and prints a capture link for every URL
/// that ends up archived. Interrupting a run with Ctrl-C saves its progress;
/// the next run picks it up.
#[derive(Parser, Debug)]
#[command(name = "wayback-capture")]
#[command(version)]
#[command(about = "Archive URLs with the Wayback Machine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Read URLs from this file instead of stdin
    #[arg(short, long, value_name = "FILE")]
    input: Option<PathBuf>,

    /// Progress snapshot path (overrides output.progress-path)
    #[arg(long, value_name = "PATH")]
    progress: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Discard saved progress from an interrupted run before starting
    #[arg(long, conflicts_with = "stats")]
    fresh: bool,

    /// Validate config and show what a run would use without contacting the archive
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show the saved progress of an interrupted run and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let progress_path = cli
        .progress
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.progress_path));
    let store = open_store(&progress_path);

    if cli.dry_run {
        handle_dry_run(&config, &store);
        Ok(())
    } else if cli.stats {
        handle_stats(&store)
    } else {
        handle_capture(&cli, &config, &store).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries only capture links.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wayback_capture=info,warn"),
            1 => EnvFilter::new("wayback_capture=debug,info"),
            2 => EnvFilter::new("wayback_capture=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the settings a run would use
fn handle_dry_run(config: &Config, store: &JsonFileStore) {
    println!("=== Wayback-Capture Dry Run ===\n");

    println!("Archive:");
    println!("  Base URL: {}", config.archive.base_url);
    println!("  User agent: {}", config.archive.user_agent);
    println!("  Timeout: {}s", config.archive.timeout_secs);

    println!("\nCapture:");
    println!(
        "  Reuse captures up to {} days old",
        config.capture.max_capture_age
    );
    println!(
        "  One request every {}s",
        config.capture.period_secs
    );
    println!(
        "  Status batch size: {}",
        config.capture.status_batch_size
    );
    println!("  Options:");
    for (key, value) in config.capture.form_options() {
        println!("    {} = {}", key, value);
    }

    println!("\nProgress:");
    println!("  Snapshot: {}", store.path().display());
    if store.exists() {
        println!("  ✓ A saved run will be resumed");
    } else {
        println!("  No saved run, starting fresh");
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows a saved snapshot without consuming it
fn handle_stats(store: &JsonFileStore) -> anyhow::Result<()> {
    println!("Snapshot: {}\n", store.path().display());

    match store.peek()? {
        Some(progress) => print_statistics(&progress),
        None => println!("No saved progress"),
    }

    Ok(())
}

/// Handles the main capture run
async fn handle_capture(cli: &Cli, config: &Config, store: &JsonFileStore) -> anyhow::Result<()> {
    if cli.fresh && store.discard()? {
        tracing::info!("Starting fresh (previous progress discarded)");
    }

    let coordinator = coordinator_from_config(config)?;

    let input: Box<dyn AsyncBufRead + Unpin> = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let mut out = std::io::stdout().lock();
    let outcome = run_capture(&coordinator, store, input, interrupted(), &mut out).await?;

    match outcome {
        RunOutcome::Completed(counts) => {
            tracing::info!("Finished: {}", counts);
            Ok(())
        }
        RunOutcome::Interrupted(_) => {
            tracing::info!(
                "Progress saved to {}; run again to resume",
                store.path().display()
            );
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }
}

/// Completes on Ctrl-C
///
/// If the signal handler can't be installed the run is simply not
/// interruptible, rather than interrupted immediately.
async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
