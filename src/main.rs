//! Wiki-Relay main entry point
//!
//! This is the command-line interface for the Wiki-Relay summary forwarder.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wiki_relay::config::{credentials_for, load_config_with_hash, Config};
use wiki_relay::pipeline::run_pipeline;
use wiki_relay::topics::load_topics;

/// Wiki-Relay: encyclopedia summaries, delivered to Telegram
///
/// Wiki-Relay reads a list of topics, fetches a short summary for each one
/// with bounded concurrency and retries, and forwards every summary found to
/// a Telegram chat.
#[derive(Parser, Debug)]
#[command(name = "wiki-relay")]
#[command(version)]
#[command(about = "Forward encyclopedia summaries to Telegram", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and list the topics without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        return handle_dry_run(&config);
    }

    let credentials = credentials_for(&config).context("telegram notifications need credentials")?;

    // Per-topic failures are logged, not turned into an exit status
    run_pipeline(&config, credentials)
        .await
        .context("failed to start pipeline")?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("wiki_relay=info,warn"),
            1 => EnvFilter::new("wiki_relay=debug,info"),
            2 => EnvFilter::new("wiki_relay=trace,debug"),
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

/// Handles the --dry-run mode: validates config and shows what would be fetched
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let topics = load_topics(&config.topics_file).with_context(|| {
        format!(
            "failed to read topics from {}",
            config.topics_file.display()
        )
    })?;

    println!("=== Wiki-Relay Dry Run ===\n");

    println!("Pipeline:");
    println!("  Topics file: {}", config.topics_file.display());
    println!("  Concurrency: {}", config.concurrency);
    println!("  Max retries: {}", config.max_retries);
    println!("  Summary API: {}", config.wiki_api_url);
    println!(
        "  Telegram: {}",
        if config.telegram_enabled {
            config.telegram_api_url.as_str()
        } else {
            "disabled"
        }
    );

    println!("\nTopics ({}):", topics.len());
    for topic in &topics {
        println!("  - {}", topic);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would fetch {} topics", topics.len());

    Ok(())
}
