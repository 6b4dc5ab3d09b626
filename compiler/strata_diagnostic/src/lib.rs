//! Diagnostic system for resolver error reporting.
//!
//! - Error codes for searchability
//! - Clear messages (what went wrong)
//! - Primary location (where it went wrong, in which file)
//! - Context labels and notes (why it's wrong)
//!
//! Diagnostics carry a `Loc` rather than a bare span: the resolver works on
//! the whole forest at once, so every report must name its file.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};
