use crate::state::BailCounter;
use std::path::PathBuf;
use url::Url;

/// A resolved download, handed to exactly one pool worker
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// Absolute URL to transfer
    pub url: Url,

    /// Directory the file is written to
    pub destination: PathBuf,

    /// Counter of the target that queued this job
    pub seen: BailCounter,
}

impl DownloadJob {
    /// Creates a job for `url` under `destination`
    pub fn new(url: Url, destination: PathBuf, seen: BailCounter) -> Self {
        Self {
            url,
            destination,
            seen,
        }
    }
}
