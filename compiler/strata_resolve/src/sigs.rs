//! Signature resolution.
//!
//! Turns each `SigDecl` into a `MethodSignature` stored on the declaration
//! (`MethodDecl::resolved_sig`). Runs file-parallel against a frozen table;
//! the caller copies the results onto method symbols afterwards, which is
//! the only place method signatures on the table are written.
//!
//! A signature whose parameters do not line up with the definition (by
//! name, position and kind) is reported and replaced with an untyped
//! fallback built from the definition's own parameters.

use rustc_hash::FxHashMap;
use strata_diagnostic::Diagnostic;
use strata_ir::{
    Decl, Loc, MethodDecl, MethodSignature, Name, ParsedFile, ResolutionState, SigDecl, SigParam,
    StringInterner, SymbolId, SymbolTable, Type,
};

use crate::report;
use crate::type_expr::TypeExprResolver;
use crate::WorkerPool;

/// Resolve the signatures of one file.
pub(crate) fn resolve_file_sigs(
    table: &SymbolTable,
    interner: &StringInterner,
    file: &mut ParsedFile,
) -> (Vec<Diagnostic>, Vec<(SymbolId, MethodSignature)>) {
    let mut diagnostics = Vec::new();
    let mut resolved = Vec::new();

    for index in 0..file.decls.len() {
        let Decl::Method(method) = &file.decls[index] else {
            continue;
        };
        let Some(sig) = &method.sig else {
            continue;
        };
        let signature = resolve_sig(table, interner, file, method, sig, &mut diagnostics);
        resolved.push((method.symbol, signature.clone()));
        if let Decl::Method(method) = &mut file.decls[index] {
            method.resolved_sig = Some(signature);
        }
    }
    (diagnostics, resolved)
}

fn untyped_fallback(method: &MethodDecl) -> MethodSignature {
    MethodSignature::untyped(
        method.params.iter().map(|p| (p.name, p.kind, p.has_default)),
        method.visibility,
    )
}

/// Check that signature parameters match the definition. Reports every
/// problem found; returns whether the signature is usable.
fn params_match(
    interner: &StringInterner,
    loc_of: impl Fn(strata_ir::Span) -> Loc,
    method: &MethodDecl,
    sig: &SigDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> bool {
    let mut ok = true;
    let positions: FxHashMap<Name, usize> = method
        .params
        .iter()
        .enumerate()
        .map(|(i, p)| (p.name, i))
        .collect();

    for param in &method.params {
        if !sig.params.iter().any(|s| s.name == param.name) {
            diagnostics.push(report::sig_param_missing(
                loc_of(sig.span),
                interner.lookup(param.name),
            ));
            ok = false;
        }
    }

    let mut matched = 0usize;
    for (found, sig_param) in sig.params.iter().enumerate() {
        let name = interner.lookup(sig_param.name);
        let Some(&expected) = positions.get(&sig_param.name) else {
            diagnostics.push(report::sig_param_unknown(loc_of(sig_param.span), name));
            ok = false;
            continue;
        };
        if expected != matched && ok {
            diagnostics.push(report::sig_param_order(
                loc_of(sig_param.span),
                name,
                expected + 1,
                found + 1,
            ));
            ok = false;
        }
        matched += 1;
        let declared = method.params[expected].kind;
        if let Some(kind) = sig_param.kind {
            if kind != declared {
                diagnostics.push(report::sig_param_kind(
                    loc_of(sig_param.span),
                    name,
                    declared,
                    kind,
                ));
                ok = false;
            }
        }
    }
    ok
}

fn resolve_sig(
    table: &SymbolTable,
    interner: &StringInterner,
    file: &ParsedFile,
    method: &MethodDecl,
    sig: &SigDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> MethodSignature {
    let loc_of = |span| Loc::new(file.file, span);
    if !params_match(interner, loc_of, method, sig, diagnostics) {
        return untyped_fallback(method);
    }

    let type_params: Vec<Name> = sig.type_params.iter().map(|&(name, _)| name).collect();
    let mut resolver = TypeExprResolver {
        table,
        interner,
        file,
        method_type_params: &type_params,
        diagnostics,
    };

    let params = method
        .params
        .iter()
        .map(|param| {
            let ty = sig
                .params
                .iter()
                .find(|s| s.name == param.name)
                .map_or(Type::Untyped, |s| resolver.resolve_or_untyped(&s.ty));
            SigParam {
                name: param.name,
                kind: param.kind,
                has_default: param.has_default,
                ty,
            }
        })
        .collect();
    let returns = match &sig.returns {
        Some(expr) => resolver.resolve_or_untyped(expr),
        None => Type::Void,
    };

    MethodSignature {
        params,
        returns,
        flags: sig.flags,
        visibility: method.visibility,
        type_params,
        is_fallback: false,
    }
}

/// File-parallel signature step; returns per-file results in file order.
#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub(crate) fn resolve_sigs_parallel(
    table: &SymbolTable,
    interner: &StringInterner,
    files: &mut [ParsedFile],
    pool: &WorkerPool,
) -> Vec<(Vec<Diagnostic>, Vec<(SymbolId, MethodSignature)>)> {
    pool.map_files(files, |file| resolve_file_sigs(table, interner, file))
}

/// Attach signatures to method symbols and settle every method.
pub(crate) fn apply_sigs(
    table: &mut SymbolTable,
    signatures: impl IntoIterator<Item = (SymbolId, MethodSignature)>,
) {
    let mut applied = 0usize;
    for (id, signature) in signatures {
        if let Some(data) = table[id].as_method_mut() {
            data.signature = Some(signature);
            data.signature_state = ResolutionState::Resolved;
            applied += 1;
        }
    }
    for id in table.ids().collect::<Vec<_>>() {
        if let Some(data) = table[id].as_method_mut() {
            if !data.signature_state.is_terminal() {
                data.signature_state = ResolutionState::Resolved;
            }
        }
    }
    tracing::debug!(applied, "signatures applied");
}

#[cfg(test)]
mod tests;
