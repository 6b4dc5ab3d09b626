//! Shared fixtures for unit tests.

use strata_diagnostic::Diagnostic;
use strata_ir::{ParsedFile, StringInterner, SymbolId, SymbolTable};

use crate::{ancestors, constants, finalize, linearize};

/// Error codes of `diagnostics`, in order.
pub(crate) fn codes(diagnostics: &[Diagnostic]) -> Vec<&'static str> {
    diagnostics.iter().map(|d| d.code.as_str()).collect()
}

/// Fully-qualified names of `ids`.
pub(crate) fn names(table: &SymbolTable, interner: &StringInterner, ids: &[SymbolId]) -> Vec<String> {
    ids.iter().map(|&id| table.full_name(id, interner)).collect()
}

/// Linearized ancestors of `id` as names.
pub(crate) fn ancestor_names(table: &SymbolTable, interner: &StringInterner, id: SymbolId) -> Vec<String> {
    let ancestors = table
        .namespace(id)
        .map(|ns| ns.ancestors.clone())
        .unwrap_or_default();
    names(table, interner, &ancestors)
}

/// Run every phase up to and including instance linearization.
pub(crate) fn through_linearization(
    table: &mut SymbolTable,
    interner: &StringInterner,
    files: &mut [ParsedFile],
) -> Vec<Diagnostic> {
    let (mut diagnostics, _) = constants::resolve_constants(table, interner, files);
    diagnostics.extend(ancestors::finalize_ancestors(table, interner, files));
    finalize::finalize_symbols(table, interner);
    diagnostics.extend(linearize::linearize_instances(table, interner));
    diagnostics
}
