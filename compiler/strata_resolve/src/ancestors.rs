//! Ancestor finalization.
//!
//! Turns the resolved superclass and mixin references of every namespace
//! declaration into edges on the namespace symbols. Runs once constant
//! resolution is complete; references that failed were already reported
//! and are skipped.

use strata_diagnostic::Diagnostic;
use strata_ir::{
    Loc, Mixin, MixinKind, NamespaceDecl, ParsedFile, StringInterner, SymbolId, SymbolTable,
};

use crate::report;

struct Finalizer<'a> {
    table: &'a mut SymbolTable,
    interner: &'a StringInterner,
    diagnostics: Vec<Diagnostic>,
}

#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub(crate) fn finalize_ancestors(
    table: &mut SymbolTable,
    interner: &StringInterner,
    files: &[ParsedFile],
) -> Vec<Diagnostic> {
    let mut finalizer = Finalizer {
        table,
        interner,
        diagnostics: Vec::new(),
    };
    for file in files {
        for decl in file.namespaces() {
            finalizer.superclass(file, decl);
            finalizer.mixins(file, decl);
        }
    }
    tracing::debug!(errors = finalizer.diagnostics.len(), "ancestor finalization complete");
    finalizer.diagnostics
}

impl Finalizer<'_> {
    fn name(&self, id: SymbolId) -> String {
        self.table.full_name(id, self.interner)
    }

    fn superclass(&mut self, file: &ParsedFile, decl: &NamespaceDecl) {
        let Some(reference) = decl.superclass else {
            return;
        };
        let constant = file.constant(reference);
        let loc = Loc::new(file.file, constant.span);
        let Some(target) = constant.resolution.symbol() else {
            return;
        };

        if !self.table[decl.symbol].is_class() {
            let diag = report::module_with_superclass(loc, &self.name(decl.symbol));
            self.diagnostics.push(diag);
            return;
        }

        let target_ok = self
            .table
            .get(target)
            .and_then(|sym| sym.as_namespace().map(|ns| sym.is_class() && !ns.is_singleton()))
            .unwrap_or(false);
        if !target_ok {
            let diag = report::superclass_not_class(
                loc,
                &self.name(decl.symbol),
                &self.name(target),
                self.table[target].kind(),
            );
            self.diagnostics.push(diag);
            return;
        }

        let previous = self.table.namespace(decl.symbol).and_then(|ns| ns.superclass);
        match previous {
            Some(previous) if previous != target => {
                let diag = report::parent_mismatch(
                    loc,
                    &self.name(decl.symbol),
                    &self.name(target),
                    &self.name(previous),
                );
                self.diagnostics.push(diag);
            }
            Some(_) => {}
            None => {
                if let Some(ns) = self.table.namespace_mut(decl.symbol) {
                    ns.superclass = Some(target);
                }
            }
        }
    }

    fn mixins(&mut self, file: &ParsedFile, decl: &NamespaceDecl) {
        for mixin in &decl.mixins {
            let constant = file.constant(mixin.target);
            let Some(target) = constant.resolution.symbol() else {
                continue;
            };
            let is_module = target != SymbolId::ROOT && self.table[target].is_module();
            if !is_module {
                let loc = Loc::new(file.file, constant.span);
                let found = self.table[target].kind();
                let diag = report::mixin_not_module(loc, mixin.kind, &self.name(target), found);
                self.diagnostics.push(diag);
                continue;
            }
            push_mixin(self.table, decl.symbol, mixin.kind, target);
        }
    }
}

/// Append a mixin edge unless the same edge already exists.
pub(crate) fn push_mixin(table: &mut SymbolTable, owner: SymbolId, kind: MixinKind, module: SymbolId) {
    let Some(ns) = table.namespace_mut(owner) else {
        return;
    };
    if ns.mixins.iter().any(|m| m.kind == kind && m.module == module) {
        return;
    }
    let order = u32::try_from(ns.mixins.len()).unwrap_or(u32::MAX);
    ns.mixins.push(Mixin {
        kind,
        module,
        order,
    });
}
