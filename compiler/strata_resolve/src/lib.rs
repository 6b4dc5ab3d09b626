//! Strata Resolve - semantic resolution for the Strata type checker.
//!
//! Takes the forest of named-but-unresolved trees produced by the namer and
//! binds every constant reference, ancestor edge, type member and method
//! signature against the session's `SymbolTable`.
//!
//! # Architecture
//!
//! ```text
//! ParsedFile[] + SymbolTable
//!         │
//!         ▼
//! ┌─────────────────────┐
//! │ constants           │  fixpoint worklist over every ConstantRef
//! ├─────────────────────┤
//! │ ancestors           │  superclass / mixin edges from resolved refs
//! │ finalize            │  default superclass, singleton classes, extend
//! │ linearize           │  instance ancestor lists (memoized, cycle-safe)
//! ├─────────────────────┤
//! │ type_params         │  bind, redeclaration check, bounds (parallel)
//! │ sigs                │  signatures (parallel)
//! ├─────────────────────┤
//! │ class_methods       │  mixes_in_class_methods -> singleton includes
//! │ linearize           │  singleton ancestor lists
//! ├─────────────────────┤
//! │ sanity              │  fatal internal consistency check
//! └─────────────────────┘
//!         │
//!         ▼
//! ResolveOutcome::{Complete(ParsedFile[]), Cancelled} + diagnostics
//! ```
//!
//! Phases that reshape the table run sequentially on the calling thread.
//! Type member bounds and signatures only write to their own file's trees,
//! so they run on the `WorkerPool` against a table that is frozen for the
//! duration; their results are copied onto symbols afterwards.
//!
//! # Tracing
//!
//! Every phase is instrumented. Enable with `RUST_LOG=strata_resolve=debug`
//! after calling [`init_tracing`].

mod ancestors;
mod api;
mod cancel;
mod class_methods;
mod config;
mod constants;
mod error;
mod finalize;
mod linearize;
mod pool;
mod report;
mod sanity;
mod sigs;
mod stack;
mod type_expr;
mod type_params;

#[cfg(test)]
mod test_helpers;

pub use api::{ResolveOutcome, Resolver};
pub use cancel::CancellationToken;
pub use config::{ResolverConfig, DEFAULT_STACK_SIZE};
pub use error::{ResolveError, Violation};
pub use pool::WorkerPool;

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Only installs a subscriber when `RUST_LOG`
/// is set, e.g. `RUST_LOG=strata_resolve=debug` or `=trace` for per-pass
/// constant resolution progress.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // A test harness may have installed a subscriber already.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
