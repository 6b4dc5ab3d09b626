//! Mixin class-method wiring.
//!
//! ```text
//! module M
//!   mixes_in_class_methods(ClassMethods)
//! end
//! class C
//!   include M          # also: <Class:C> include ClassMethods
//! end
//! ```
//!
//! Runs after instance linearization (the include lists are final) and
//! before singleton linearization, which picks the new edges up.

use strata_diagnostic::Diagnostic;
use strata_ir::{Loc, MixinKind, ParsedFile, StringInterner, SymbolId, SymbolTable};

use crate::ancestors::push_mixin;
use crate::report;

#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub(crate) fn wire_class_methods(
    table: &mut SymbolTable,
    interner: &StringInterner,
    files: &[ParsedFile],
) -> Vec<Diagnostic> {
    let diagnostics = record_companions(table, interner, files);

    let mut wired = 0usize;
    for id in table.namespace_ids() {
        let Some(ns) = table.namespace(id) else {
            continue;
        };
        if ns.is_singleton() {
            continue;
        }
        let Some(singleton) = ns.singleton else {
            continue;
        };
        let companions: Vec<SymbolId> = ns
            .mixins_of(MixinKind::Include)
            .filter_map(|module| table.namespace(module))
            .flat_map(|module| module.class_method_companions.iter().copied())
            .collect();
        for companion in companions {
            push_mixin(table, singleton, MixinKind::Include, companion);
            wired += 1;
        }
    }
    tracing::debug!(wired, errors = diagnostics.len(), "class method wiring complete");
    diagnostics
}

/// Validate `mixes_in_class_methods` declarations and record the companions
/// on their modules.
fn record_companions(
    table: &mut SymbolTable,
    interner: &StringInterner,
    files: &[ParsedFile],
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for file in files {
        for decl in file.namespaces() {
            for &reference in &decl.class_method_companions {
                let constant = file.constant(reference);
                let loc = Loc::new(file.file, constant.span);
                let Some(target) = constant.resolution.symbol() else {
                    continue;
                };
                if !table[decl.symbol].is_module() {
                    let class = table.full_name(decl.symbol, interner);
                    diagnostics.push(report::companion_in_class(loc, &class));
                    continue;
                }
                if target == decl.symbol {
                    let module = table.full_name(decl.symbol, interner);
                    diagnostics.push(report::companion_is_self(loc, &module));
                    continue;
                }
                if !table[target].is_module() || target == SymbolId::ROOT {
                    let name = table.full_name(target, interner);
                    diagnostics.push(report::companion_not_module(loc, &name, table[target].kind()));
                    continue;
                }
                if let Some(ns) = table.namespace_mut(decl.symbol) {
                    if !ns.class_method_companions.contains(&target) {
                        ns.class_method_companions.push(target);
                    }
                }
            }
        }
    }
    diagnostics
}
