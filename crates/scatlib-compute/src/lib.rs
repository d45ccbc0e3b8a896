//! CPU execution helpers for the scatlib workspace.
//!
//! The heavy operations in `scatlib-core` — Gram-matrix construction and
//! basis-field accumulation — are embarrassingly parallel over an index
//! range, but the per-index cost varies (a Gram row `i` holds `i + 1`
//! overlap integrals). [`CpuPool`] hands indices to worker threads with
//! work stealing, so a slow unit does not stall the batch; each index is
//! processed by exactly one worker and results come back in index order,
//! making the output deterministic regardless of scheduling.

use rayon::prelude::*;

/// Facade over the shared-memory worker pool.
///
/// Wraps the global rayon pool; with a single hardware thread the pool
/// degenerates to plain sequential execution.
#[derive(Debug, Clone)]
pub struct CpuPool {
    num_threads: usize,
}

impl CpuPool {
    /// Pool over all available hardware threads.
    pub fn new() -> Self {
        Self {
            num_threads: rayon::current_num_threads(),
        }
    }

    /// Number of worker threads backing the pool.
    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    /// Map `f` over `0..count`, one fully-owned unit per claimed index.
    ///
    /// Results are returned in index order. The caller blocks until every
    /// unit has completed; there is no cancellation.
    pub fn map_indexed<T, F>(&self, count: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Send + Sync,
    {
        if self.num_threads <= 1 || count <= 1 {
            return (0..count).map(f).collect();
        }
        (0..count).into_par_iter().map(f).collect()
    }

    /// Fallible variant of [`map_indexed`](Self::map_indexed).
    ///
    /// On error the remaining units are abandoned and one of the observed
    /// errors is returned.
    pub fn try_map_indexed<T, E, F>(&self, count: usize, f: F) -> Result<Vec<T>, E>
    where
        T: Send,
        E: Send,
        F: Fn(usize) -> Result<T, E> + Send + Sync,
    {
        if self.num_threads <= 1 || count <= 1 {
            return (0..count).map(f).collect();
        }
        (0..count).into_par_iter().map(f).collect()
    }
}

impl Default for CpuPool {
    fn default() -> Self {
        Self::new()
    }
}
