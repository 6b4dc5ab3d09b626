//! Fatal resolver errors.
//!
//! User program errors are diagnostics and never surface here; a
//! `ResolveError` means an earlier phase broke one of its own guarantees.

use std::fmt;

use thiserror::Error;

/// One broken invariant found by the consistency check.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Violation {
    /// What was being checked, e.g. `"constant reference"`.
    pub subject: &'static str,
    /// Where: a file path and span, or a fully-qualified symbol name.
    pub at: String,
    pub problem: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}: {}", self.subject, self.at, self.problem)
    }
}

#[derive(Clone, Eq, PartialEq, Hash, Debug, Error)]
pub enum ResolveError {
    #[error("resolver left inconsistent state ({} violation(s)); first: {}", .0.len(), first(.0))]
    InvariantViolation(Vec<Violation>),
}

impl ResolveError {
    pub fn violations(&self) -> &[Violation] {
        match self {
            ResolveError::InvariantViolation(violations) => violations,
        }
    }
}

fn first(violations: &[Violation]) -> String {
    violations
        .first()
        .map_or_else(|| "<none>".to_owned(), ToString::to_string)
}
