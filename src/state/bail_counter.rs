use std::sync::{Arc, Mutex, PoisonError};

/// Per-target count of items already present on disk
///
/// Shared between the dispatcher, which reads it before queueing a download,
/// and the download workers, which bump it whenever a destination file
/// already exists. Starts at 1: the start page itself counts.
#[derive(Debug, Clone)]
pub struct BailCounter {
    seen: Arc<Mutex<u32>>,
}

impl BailCounter {
    /// Creates a counter for a fresh target
    pub fn new() -> Self {
        Self {
            seen: Arc::new(Mutex::new(1)),
        }
    }

    /// Current value
    pub fn get(&self) -> u32 {
        *self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Records one more already-present item, returning the new value
    pub fn increment(&self) -> u32 {
        let mut seen = self.seen.lock().unwrap_or_else(PoisonError::into_inner);
        *seen += 1;
        *seen
    }

    /// Returns true if the counter has reached `limit`
    ///
    /// A limit of 0 never trips.
    pub fn reached(&self, limit: u32) -> bool {
        limit > 0 && self.get() >= limit
    }
}

impl Default for BailCounter {
    fn default() -> Self {
        Self::new()
    }
}
