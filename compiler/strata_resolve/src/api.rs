//! Public entry points.
//!
//! # Entry Points
//!
//! - **`Resolver::run`**: the full pipeline. Mutates the symbol table and
//!   every tree; may return `ResolveOutcome::Cancelled` between phases.
//! - **`Resolver::run_tree_passes`**: re-derives tree-local data (constant
//!   bindings, type member bounds, signatures) for trees whose definitions
//!   were already resolved by an earlier `run`. Reads the table only.
//! - **`Resolver::run_constant_resolution`**: constant resolution alone, for
//!   tooling that needs bound references without hierarchy or signatures.

use strata_diagnostic::{Diagnostic, DiagnosticQueue};
use strata_ir::{MethodSignature, ParsedFile, StringInterner, SymbolId, SymbolTable, TypeParam};

use crate::{
    ancestors, class_methods, constants, finalize, linearize, sanity, sigs, type_params,
    CancellationToken, ResolveError, ResolverConfig, WorkerPool,
};

/// Result of a full resolution run.
#[derive(Debug)]
pub enum ResolveOutcome {
    /// Every phase ran; the trees are fully resolved.
    Complete(Vec<ParsedFile>),
    /// Cancellation was observed at a phase boundary. The table holds the
    /// state of the last completed phase and should be discarded.
    Cancelled,
}

impl ResolveOutcome {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ResolveOutcome::Cancelled)
    }

    /// The resolved trees, unless the run was cancelled.
    pub fn into_files(self) -> Option<Vec<ParsedFile>> {
        match self {
            ResolveOutcome::Complete(files) => Some(files),
            ResolveOutcome::Cancelled => None,
        }
    }
}

/// The resolution stage.
///
/// # Example
///
/// ```text
/// let resolver = Resolver::new(ResolverConfig::default());
/// let outcome = resolver.run(&mut table, &interner, files, &mut diagnostics)?;
/// let files = outcome.into_files().unwrap_or_default();
/// ```
#[derive(Debug)]
pub struct Resolver {
    config: ResolverConfig,
    pool: WorkerPool,
    cancel: CancellationToken,
}

impl Resolver {
    pub fn new(config: ResolverConfig) -> Self {
        let pool = WorkerPool::new(&config);
        Resolver {
            config,
            pool,
            cancel: CancellationToken::new(),
        }
    }

    /// Use `token` for cooperative cancellation of `run`.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    /// Run every phase over the forest.
    ///
    /// ```text
    /// constants → ancestors → symbols → linearize → type params
    ///     → sigs → class methods → linearize singletons → sanity check
    /// ```
    ///
    /// User errors go to `diagnostics`; an `Err` means the resolver broke
    /// one of its own invariants.
    #[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
    pub fn run(
        &self,
        table: &mut SymbolTable,
        interner: &StringInterner,
        mut files: Vec<ParsedFile>,
        diagnostics: &mut DiagnosticQueue,
    ) -> Result<ResolveOutcome, ResolveError> {
        let (errors, _) = constants::resolve_constants(table, interner, &mut files);
        diagnostics.extend(errors);
        if self.cancel.is_cancelled() {
            return Ok(cancelled("constant resolution"));
        }

        diagnostics.extend(ancestors::finalize_ancestors(table, interner, &files));
        if self.cancel.is_cancelled() {
            return Ok(cancelled("ancestor finalization"));
        }

        finalize::finalize_symbols(table, interner);
        if self.cancel.is_cancelled() {
            return Ok(cancelled("symbol finalization"));
        }

        diagnostics.extend(linearize::linearize_instances(table, interner));
        if self.cancel.is_cancelled() {
            return Ok(cancelled("linearization"));
        }

        type_params::bind_type_members(table, &files);
        diagnostics.extend(type_params::check_redeclarations(table, interner));
        let bounds = type_params::resolve_bounds_parallel(table, interner, &mut files, &self.pool);
        let params = collect(bounds, diagnostics);
        type_params::apply_type_params(table, params);
        if self.cancel.is_cancelled() {
            return Ok(cancelled("type parameter resolution"));
        }

        let signatures = sigs::resolve_sigs_parallel(table, interner, &mut files, &self.pool);
        let signatures = collect(signatures, diagnostics);
        sigs::apply_sigs(table, signatures);
        if self.cancel.is_cancelled() {
            return Ok(cancelled("signature resolution"));
        }

        diagnostics.extend(class_methods::wire_class_methods(table, interner, &files));
        diagnostics.extend(linearize::linearize_singletons(table, interner));
        if self.cancel.is_cancelled() {
            return Ok(cancelled("class method wiring"));
        }

        if self.config.run_sanity_check {
            sanity::sanity_check(table, interner, &files)?;
        }

        tracing::debug!(
            symbols = table.len(),
            errors = diagnostics.error_count(),
            "resolution complete"
        );
        Ok(ResolveOutcome::Complete(files))
    }

    /// Re-derive tree-local data without touching the table.
    ///
    /// The caller guarantees the table already holds a completed `run` over
    /// the same definitions.
    #[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
    pub fn run_tree_passes(
        &self,
        table: &SymbolTable,
        interner: &StringInterner,
        mut files: Vec<ParsedFile>,
        diagnostics: &mut DiagnosticQueue,
    ) -> Vec<ParsedFile> {
        let bound = self.pool.map_files(&mut files, |file| {
            constants::bind_file_constants(table, interner, file)
        });
        diagnostics.extend(bound.into_iter().flatten());

        let bounds = type_params::resolve_bounds_parallel(table, interner, &mut files, &self.pool);
        let _: Vec<(SymbolId, TypeParam)> = collect(bounds, diagnostics);

        let signatures = sigs::resolve_sigs_parallel(table, interner, &mut files, &self.pool);
        let _: Vec<(SymbolId, MethodSignature)> = collect(signatures, diagnostics);

        tracing::debug!("tree passes complete");
        files
    }

    /// Constant resolution only.
    #[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
    pub fn run_constant_resolution(
        &self,
        table: &mut SymbolTable,
        interner: &StringInterner,
        mut files: Vec<ParsedFile>,
        diagnostics: &mut DiagnosticQueue,
    ) -> Vec<ParsedFile> {
        let (errors, _) = constants::resolve_constants(table, interner, &mut files);
        diagnostics.extend(errors);
        files
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

fn cancelled(after: &str) -> ResolveOutcome {
    tracing::debug!(after, "resolution cancelled");
    ResolveOutcome::Cancelled
}

/// Flatten per-file `(diagnostics, results)` pairs in file order.
fn collect<T>(per_file: Vec<(Vec<Diagnostic>, Vec<T>)>, diagnostics: &mut DiagnosticQueue) -> Vec<T> {
    let mut results = Vec::new();
    for (errors, items) in per_file {
        diagnostics.extend(errors);
        results.extend(items);
    }
    results
}

#[cfg(test)]
mod tests;
