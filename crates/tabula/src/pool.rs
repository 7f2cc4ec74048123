//! Bounded worker pool for row materialization

use std::ops::RangeInclusive;

use rayon::prelude::*;

/// Default number of worker threads
pub const DEFAULT_MAX_WORKERS: usize = 20;

/// Fixed-size pool that runs one task per row index.
///
/// Backed by a dedicated rayon pool rather than the global one. When the
/// pool cannot be built, tasks run on the calling thread.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
    threads: usize,
}

impl WorkerPool {
    /// Create a pool with `threads` workers (at least one)
    pub fn new(threads: usize) -> Self {
        let threads = threads.max(1);
        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("tabula-row-{}", i))
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                tracing::warn!(error = %e, threads, "worker pool unavailable, running inline");
                None
            }
        };
        Self { pool, threads }
    }

    /// Pool that always runs on the calling thread
    pub fn inline() -> Self {
        Self {
            pool: None,
            threads: 1,
        }
    }

    /// Configured worker count
    pub fn threads(&self) -> usize {
        self.threads
    }

    /// Check if tasks run on pool threads
    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Run `task` once for every index in `range`, returning when all are done.
    ///
    /// Completion order across indices is unspecified.
    pub fn for_each_index<F>(&self, range: RangeInclusive<u32>, task: F)
    where
        F: Fn(u32) + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| range.into_par_iter().for_each(&task)),
            None => range.for_each(task),
        }
    }
}

impl Default for WorkerPool {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_WORKERS)
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads)
            .field("parallel", &self.is_parallel())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn collect(pool: &WorkerPool, range: RangeInclusive<u32>) -> Vec<u32> {
        let seen = Mutex::new(Vec::new());
        pool.for_each_index(range, |i| seen.lock().push(i));
        let mut seen = seen.into_inner();
        seen.sort_unstable();
        seen
    }

    #[test]
    fn test_every_index_once() {
        let pool = WorkerPool::new(4);
        assert_eq!(collect(&pool, 1..=100), (1..=100).collect::<Vec<_>>());
    }

    #[test]
    fn test_inline() {
        let pool = WorkerPool::inline();
        assert!(!pool.is_parallel());
        assert_eq!(collect(&pool, 3..=5), vec![3, 4, 5]);
    }

    #[test]
    #[allow(clippy::reversed_empty_ranges)]
    fn test_empty_range() {
        let pool = WorkerPool::new(2);
        assert!(collect(&pool, 5..=4).is_empty());
    }

    #[test]
    fn test_zero_threads_clamped() {
        assert_eq!(WorkerPool::new(0).threads(), 1);
    }
}
