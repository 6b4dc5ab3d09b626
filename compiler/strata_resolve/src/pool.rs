//! Worker pool for file-parallel passes.

use rayon::prelude::*;
use strata_ir::ParsedFile;

use crate::ResolverConfig;

/// A bounded rayon pool, or the calling thread when parallelism is off or
/// the pool could not be built.
pub struct WorkerPool {
    pool: Option<rayon::ThreadPool>,
}

impl WorkerPool {
    pub fn new(config: &ResolverConfig) -> Self {
        if config.workers == 1 {
            return Self::sequential();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.workers)
            .stack_size(config.stack_size)
            .thread_name(|i| format!("strata-resolve-{i}"))
            .build();

        match pool {
            Ok(pool) => WorkerPool { pool: Some(pool) },
            Err(e) => {
                tracing::warn!("failed to create thread pool ({e}), running sequentially");
                Self::sequential()
            }
        }
    }

    pub fn sequential() -> Self {
        WorkerPool { pool: None }
    }

    /// Number of threads work is spread over.
    pub fn threads(&self) -> usize {
        self.pool
            .as_ref()
            .map_or(1, rayon::ThreadPool::current_num_threads)
    }

    /// Run `f` on every file, returning results in file order.
    ///
    /// Each invocation gets exclusive access to its own file; anything shared
    /// must be captured by shared reference.
    pub fn map_files<T, F>(&self, files: &mut [ParsedFile], f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(&mut ParsedFile) -> T + Sync + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(|| files.par_iter_mut().map(&f).collect()),
            None => files.iter_mut().map(f).collect(),
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("threads", &self.threads())
            .finish()
    }
}
