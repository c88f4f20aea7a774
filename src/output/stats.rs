//! Download statistics
//!
//! Shared by every download worker for the lifetime of one run and read once
//! by the runner when the pool has drained.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

const MIB: f64 = 1024.0 * 1024.0;

/// Totals of completed downloads
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DownloadStatistics {
    /// Number of files transferred
    pub count: u64,

    /// Bytes written to disk
    pub total_bytes: u64,

    /// Sum of the individual transfer times
    pub total_duration: Duration,
}

impl DownloadStatistics {
    /// Total size in MiB
    pub fn size_mib(&self) -> f64 {
        self.total_bytes as f64 / MIB
    }

    /// Average throughput in MiB per second of transfer time
    pub fn throughput_mib(&self) -> f64 {
        let seconds = self.total_duration.as_secs_f64();
        if seconds > 0.0 {
            self.size_mib() / seconds
        } else {
            0.0
        }
    }
}

impl fmt::Display for DownloadStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files for {:.2} MB with avg. dl. speed {:.3} MB/s",
            self.count,
            self.size_mib(),
            self.throughput_mib()
        )
    }
}

/// Thread-safe download statistics aggregator
#[derive(Debug, Default)]
pub struct Stats {
    inner: Mutex<DownloadStatistics>,
}

impl Stats {
    /// Creates empty statistics
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one completed download
    pub fn update(&self, bytes: u64, took: Duration) {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.count += 1;
        inner.total_bytes += bytes;
        inner.total_duration += took;
    }

    /// Returns true if no download ever completed
    pub fn is_empty(&self) -> bool {
        self.snapshot().count == 0
    }

    /// Copy of the current totals
    pub fn snapshot(&self) -> DownloadStatistics {
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Human-readable summary, or `None` if nothing was downloaded
    pub fn summary(&self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self.snapshot().to_string())
        }
    }
}
