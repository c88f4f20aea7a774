//! Run and target context passed through the interpreter
//!
//! Everything the interpreter and dispatcher share lives here instead of in
//! globals: one [`GrabContext`] per run, one [`TargetScope`] per target.

use crate::download::JobSender;
use crate::output::OutputSink;
use crate::state::BailCounter;
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;

/// Shared state of one run
pub struct GrabContext {
    /// HTTP client for page fetches
    pub client: Client,

    /// Download queue
    pub queue: JobSender,

    /// Destination of `print` and `raw` results
    pub sink: Arc<dyn OutputSink>,

    /// Maximum pages per follow chain (0 = unlimited)
    pub max_follow: usize,
}

impl GrabContext {
    /// Creates a context
    pub fn new(client: Client, queue: JobSender, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            client,
            queue,
            sink,
            max_follow: 0,
        }
    }

    /// Sets the follow chain cap
    pub fn with_max_follow(mut self, max_follow: usize) -> Self {
        self.max_follow = max_follow;
        self
    }
}

/// Per-target view used while a target is processed
#[derive(Debug, Clone)]
pub struct TargetScope {
    /// Target label
    pub name: String,

    /// Bail-out threshold (0 = unlimited)
    pub bail_limit: u32,

    /// Absolute destination directory
    pub destination: PathBuf,

    /// Already-seen counter shared with the download workers
    pub seen: BailCounter,
}

impl TargetScope {
    /// Creates a scope with a fresh bail counter
    pub fn new(name: impl Into<String>, bail_limit: u32, destination: PathBuf) -> Self {
        Self {
            name: name.into(),
            bail_limit,
            destination,
            seen: BailCounter::new(),
        }
    }
}
