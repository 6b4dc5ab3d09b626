//! Resolver configuration.

/// Default worker stack size: 32 MiB.
///
/// Linearization recurses once per ancestor edge; `stacker` grows the stack
/// on demand, a large initial stack just makes growth rare.
pub const DEFAULT_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Knobs for one resolver instance.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResolverConfig {
    /// Worker threads for file-parallel passes (0 = rayon default,
    /// 1 = run sequentially on the calling thread).
    pub workers: usize,
    /// Stack size of each worker thread, in bytes.
    pub stack_size: usize,
    /// Run the consistency check after the last phase.
    pub run_sanity_check: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            workers: 0,
            stack_size: DEFAULT_STACK_SIZE,
            run_sanity_check: true,
        }
    }
}

impl ResolverConfig {
    /// Single-threaded configuration, used by tests and tooling.
    pub fn sequential() -> Self {
        ResolverConfig {
            workers: 1,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn with_stack_size(mut self, stack_size: usize) -> Self {
        self.stack_size = stack_size;
        self
    }

    #[must_use]
    pub fn with_sanity_check(mut self, enabled: bool) -> Self {
        self.run_sanity_check = enabled;
        self
    }
}
