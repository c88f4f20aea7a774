//! Bounded download worker pool
//!
//! A fixed number of tokio tasks share one bounded queue. The queue capacity
//! equals the worker count, so a saturated pool makes the interpreter wait
//! when it queues the next job.
//!
//! Shutdown is explicit: once every [`JobSender`] is dropped the workers drain
//! the remaining jobs and exit, and [`DownloadPool::finish`] waits for them.

use crate::crawler::fetch_to_file;
use crate::download::DownloadJob;
use crate::output::Stats;
use crate::url::file_name_for;
use crate::GrabError;
use reqwest::Client;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;

/// Sending half of the download queue
pub type JobSender = mpsc::Sender<DownloadJob>;

/// Receiving half of the download queue
pub type JobReceiver = mpsc::Receiver<DownloadJob>;

/// Creates the bounded download queue
pub fn download_queue(capacity: usize) -> (JobSender, JobReceiver) {
    mpsc::channel(capacity.max(1))
}

/// What a worker did with a job
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobOutcome {
    /// The file was transferred
    Downloaded { bytes: u64 },
    /// The destination file already existed
    AlreadyPresent,
}

/// Running pool of download workers
pub struct DownloadPool {
    workers: Vec<JoinHandle<()>>,
    stats: Arc<Stats>,
}

impl DownloadPool {
    /// Spawns `workers` download tasks
    ///
    /// # Returns
    ///
    /// The pool handle and the sender for queueing jobs.
    pub fn start(client: Client, workers: usize, stats: Arc<Stats>) -> (Self, JobSender) {
        let (sender, receiver) = download_queue(workers);
        let receiver = Arc::new(Mutex::new(receiver));

        let handles = (0..workers.max(1))
            .map(|id| {
                tokio::spawn(run_worker(
                    id,
                    Arc::clone(&receiver),
                    client.clone(),
                    Arc::clone(&stats),
                ))
            })
            .collect();

        (
            Self {
                workers: handles,
                stats,
            },
            sender,
        )
    }

    /// Number of worker tasks
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Waits for every worker to exit and returns the statistics
    ///
    /// Workers only exit once all senders are dropped and the queue is empty.
    pub async fn finish(self) -> Arc<Stats> {
        for worker in self.workers {
            if let Err(e) = worker.await {
                tracing::error!("Downloader task failed: {}", e);
            }
        }
        self.stats
    }
}

async fn run_worker(
    id: usize,
    receiver: Arc<Mutex<JobReceiver>>,
    client: Client,
    stats: Arc<Stats>,
) {
    tracing::debug!("Downloader {} started", id);

    loop {
        // The lock only covers the wait for the next job
        let job = receiver.lock().await.recv().await;
        let Some(job) = job else {
            break;
        };

        let url = job.url.to_string();
        if let Err(e) = handle_job(&client, &stats, job).await {
            tracing::error!("Downloader: {} ({})", e, url);
        }
    }

    tracing::debug!("Downloader {} finished", id);
}

/// Processes one job
///
/// An existing destination file is not transferred again; it bumps the
/// target's bail counter instead. Successful transfers update `stats`.
pub async fn handle_job(
    client: &Client,
    stats: &Stats,
    job: DownloadJob,
) -> Result<JobOutcome, GrabError> {
    let name = file_name_for(&job.url).ok_or_else(|| GrabError::NoFileName {
        url: job.url.to_string(),
    })?;
    let full_path = job.destination.join(name);

    if tokio::fs::try_exists(&full_path).await? {
        let seen = job.seen.increment();
        tracing::debug!("Already have {} (seen {})", full_path.display(), seen);
        return Ok(JobOutcome::AlreadyPresent);
    }

    tracing::info!("Downloading {}", full_path.display());
    let start = Instant::now();
    let bytes = fetch_to_file(client, job.url.as_str(), &full_path).await?;
    stats.update(bytes, start.elapsed());

    Ok(JobOutcome::Downloaded { bytes })
}
