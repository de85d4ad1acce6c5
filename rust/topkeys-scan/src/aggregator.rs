//! Global merge point for per-worker results.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::top_k::{BoundedTopK, Entry};

/// Owns the process-wide [`BoundedTopK`] behind its own lock.
#[derive(Debug)]
pub struct Aggregator {
    global: Mutex<BoundedTopK>,
}

impl Aggregator {
    pub fn new(capacity: usize) -> Aggregator {
        Aggregator {
            global: Mutex::new(BoundedTopK::new(capacity)),
        }
    }

    /// Folds a worker's partial result into the global selection.
    pub fn merge_worker_result(&self, local: BoundedTopK) {
        self.lock().merge(local);
    }

    /// Drains the global selection, returning keys by descending count.
    ///
    /// Meant to be called once all workers have merged their results.
    pub fn report(&self) -> Vec<Vec<u8>> {
        self.report_ranked()
            .into_iter()
            .map(|entry| entry.key)
            .collect()
    }

    /// Same as [`Aggregator::report`], keeping the counts.
    pub fn report_ranked(&self) -> Vec<Entry> {
        self.lock().drain_descending()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // The selection stays valid across a panic; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, BoundedTopK> {
        self.global.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
