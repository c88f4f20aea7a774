//! Output module for results and run statistics
//!
//! This module handles:
//! - Emitting extracted results (`print` and `raw` actions)
//! - Aggregating download statistics across workers

pub mod stats;
mod traits;

pub use stats::{DownloadStatistics, Stats};
pub use traits::{MemorySink, OutputSink, StdoutSink};
