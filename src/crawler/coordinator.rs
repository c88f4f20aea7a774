//! Target runner - main orchestration logic
//!
//! This module ties a run together:
//! - Starting the download pool
//! - Processing every target in order, isolating per-target failures
//! - Closing the download queue and waiting for the pool to drain
//! - Reporting the final statistics

use crate::config::{validate_grabber_config, GrabberConfig, Target};
use crate::crawler::context::{GrabContext, TargetScope};
use crate::crawler::fetcher::build_http_client;
use crate::crawler::interpreter::Interpreter;
use crate::download::DownloadPool;
use crate::output::{DownloadStatistics, OutputSink, Stats};
use crate::GrabError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use url::Url;

/// Outcome of a complete run
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Targets processed without error
    pub succeeded: usize,

    /// Targets that stopped with an error
    pub failed: usize,

    /// Final download statistics
    pub stats: DownloadStatistics,

    /// Summary line for the downloads, `None` if nothing was downloaded
    pub summary: Option<String>,
}

/// Runs targets against a shared download pool
pub struct Coordinator {
    ctx: GrabContext,
    pool: DownloadPool,
}

impl Coordinator {
    /// Creates a coordinator and starts its download workers
    ///
    /// # Arguments
    ///
    /// * `config` - The run options
    /// * `sink` - Destination of `print` and `raw` results
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run targets
    /// * `Err(GrabError)` - Invalid options or HTTP client failure
    pub fn new(config: &GrabberConfig, sink: Arc<dyn OutputSink>) -> Result<Self, GrabError> {
        validate_grabber_config(config)?;

        let client = build_http_client(config)?;
        let (pool, queue) =
            DownloadPool::start(client.clone(), config.workers, Arc::new(Stats::new()));
        let ctx = GrabContext::new(client, queue, sink).with_max_follow(config.max_follow);

        tracing::debug!("Started {} downloaders", pool.size());

        Ok(Self { ctx, pool })
    }

    /// Processes one target
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The target's action tree completed
    /// * `Err(GrabError)` - Setup failed or the action tree stopped with an error
    pub async fn run_target(&self, target: &Target) -> Result<(), GrabError> {
        let destination = resolve_destination(&target.path)?;
        let start = Url::parse(&target.url)?;

        let Some(action) = &target.action else {
            tracing::warn!("Target {} has no actions, skipping", target.name);
            return Ok(());
        };

        let scope = TargetScope::new(target.name.clone(), target.bail_limit(), destination);
        let interpreter = Interpreter::new(&self.ctx, &scope);
        interpreter.process(start, action).await
    }

    /// Runs every target in order, then shuts the pool down
    ///
    /// A failing target is logged and does not affect the others.
    pub async fn run(self, targets: Vec<Target>) -> RunReport {
        let mut succeeded = 0;
        let mut failed = 0;

        tracing::info!("Executing...");
        for target in targets {
            let started = Instant::now();
            tracing::info!("Target: {}", target.name);

            match self.run_target(&target).await {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    tracing::error!("Target {} failed: {}", target.name, e);
                    failed += 1;
                }
            }

            tracing::info!(
                "Finished target: {} (took {:?})",
                target.name,
                started.elapsed()
            );
        }

        let stats = self.finish().await;

        RunReport {
            succeeded,
            failed,
            stats: stats.snapshot(),
            summary: stats.summary(),
        }
    }

    /// Closes the download queue and waits for the workers to drain it
    pub async fn finish(self) -> Arc<Stats> {
        let Self { ctx, pool } = self;
        drop(ctx);

        tracing::info!("Waiting for downloaders to finish...");
        let stats = pool.finish().await;
        if stats.is_empty() {
            tracing::debug!("No files were downloaded");
        }
        stats
    }
}

/// Absolute form of a target's destination, which must be an existing directory
fn resolve_destination(path: &str) -> Result<PathBuf, GrabError> {
    let absolute = std::path::absolute(Path::new(path))?;

    if !absolute.is_dir() {
        return Err(GrabError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("destination {} is not a directory", absolute.display()),
        )));
    }

    Ok(absolute)
}

/// Runs a complete grab
///
/// This function orchestrates the entire run:
///
/// 1. Validate the options and build the HTTP client
/// 2. Start the download pool
/// 3. Process each target in order
/// 4. Close the queue and wait for pending downloads
/// 5. Return the run report
///
/// # Example
///
/// ```no_run
/// use grabber::config::{load_rules, GrabberConfig};
/// use grabber::crawler::run_targets;
/// use grabber::output::StdoutSink;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let targets = load_rules(Path::new("rules.json"))?;
/// let report = run_targets(targets, &GrabberConfig::default(), Arc::new(StdoutSink)).await?;
/// if let Some(summary) = &report.summary {
///     println!("{}", summary);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_targets(
    targets: Vec<Target>,
    config: &GrabberConfig,
    sink: Arc<dyn OutputSink>,
) -> Result<RunReport, GrabError> {
    let coordinator = Coordinator::new(config, sink)?;
    Ok(coordinator.run(targets).await)
}
