//! Download module
//!
//! Resolved download URLs become [`DownloadJob`]s that a fixed-size
//! [`DownloadPool`] transfers to disk.

mod job;
mod pool;

pub use job::DownloadJob;
pub use pool::{download_queue, handle_job, DownloadPool, JobOutcome, JobReceiver, JobSender};
