//! Grabber main entry point
//!
//! This is the command-line interface for the declarative web grabber.

use anyhow::Context;
use clap::Parser;
use grabber::config::{load_rules_with_hash, GrabberConfig, DEFAULT_WORKERS};
use grabber::crawler::run_targets;
use grabber::output::StdoutSink;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Grabber: a declarative web grabber
///
/// Reads a rule file describing targets (a start page and a tree of query
/// actions), walks the matching pages, and prints, logs or downloads what
/// the queries find.
#[derive(Parser, Debug)]
#[command(name = "grabber")]
#[command(version)]
#[command(about = "A declarative web grabber", long_about = None)]
struct Cli {
    /// Path to the rule file (JSON, or TOML with a .toml extension)
    #[arg(value_name = "RULES")]
    rules: PathBuf,

    /// Number of downloaders
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    dls: usize,

    /// Log to stdout instead of stderr
    #[arg(short, long)]
    log: bool,

    /// Stop a follow chain after this many pages (0 = unlimited)
    #[arg(long, value_name = "PAGES", default_value_t = 0)]
    max_follow: usize,

    /// Accept invalid TLS certificates
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let started = Instant::now();
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log);

    tracing::info!("Loading rules from: {}", cli.rules.display());
    let (targets, hash) = load_rules_with_hash(&cli.rules)
        .with_context(|| format!("failed to load rules from {}", cli.rules.display()))?;
    tracing::info!("Loaded {} targets (hash: {})", targets.len(), hash);

    let config = GrabberConfig {
        workers: cli.dls,
        max_follow: cli.max_follow,
        accept_invalid_certs: cli.insecure,
        ..GrabberConfig::default()
    };

    let report = run_targets(targets, &config, Arc::new(StdoutSink)).await?;

    if report.failed > 0 {
        tracing::info!(
            "{} of {} targets stopped with an error",
            report.failed,
            report.failed + report.succeeded
        );
    }

    if let Some(summary) = &report.summary {
        tracing::info!("Download statistics: {}", summary);
    }

    tracing::info!("All done (took {:?}).", started.elapsed());

    Ok(())
}

/// Sets up the logging/tracing subscriber
///
/// `to_stdout` selects stdout instead of stderr as the log destination.
fn setup_logging(verbose: u8, quiet: bool, to_stdout: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("grabber=info,warn"),
            1 => EnvFilter::new("grabber=debug,info"),
            2 => EnvFilter::new("grabber=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let writer = if to_stdout {
        BoxMakeWriter::new(std::io::stdout)
    } else {
        BoxMakeWriter::new(std::io::stderr)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
