//! Consistency check.
//!
//! Verifies the resolver's own guarantees after the last phase. Anything
//! found here is a resolver defect, never a user error, so violations are
//! returned as a fatal `ResolveError` instead of diagnostics.

use rustc_hash::FxHashSet;
use strata_ir::{ParsedFile, StringInterner, SymbolData, SymbolId, SymbolTable};

use crate::{ResolveError, Violation};

/// Identity of a symbol within its owner. Methods and constants live in
/// separate namespaces; singleton classes are not members at all.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
enum Slot {
    Constant,
    Method,
    Singleton,
}

#[tracing::instrument(level = "debug", skip_all, fields(files = files.len(), symbols = table.len()))]
pub(crate) fn sanity_check(
    table: &SymbolTable,
    interner: &StringInterner,
    files: &[ParsedFile],
) -> Result<(), ResolveError> {
    let mut violations = Vec::new();
    check_trees(files, &mut violations);
    check_symbols(table, interner, &mut violations);

    if violations.is_empty() {
        tracing::debug!("sanity check passed");
        Ok(())
    } else {
        tracing::error!(count = violations.len(), "sanity check failed");
        Err(ResolveError::InvariantViolation(violations))
    }
}

fn check_trees(files: &[ParsedFile], violations: &mut Vec<Violation>) {
    for file in files {
        for (_, constant) in file.constants() {
            if !constant.resolution.is_terminal() {
                violations.push(Violation {
                    subject: "constant reference",
                    at: format!("{} {}", file.path, constant.span),
                    problem: format!("left in state {:?}", constant.resolution.state()),
                });
            }
        }
    }
}

fn check_symbols(table: &SymbolTable, interner: &StringInterner, violations: &mut Vec<Violation>) {
    let mut identities = FxHashSet::default();

    for (id, symbol) in table.iter() {
        let at = || table.full_name(id, interner);

        if id != SymbolId::ROOT {
            let slot = match &symbol.data {
                SymbolData::Method(_) => Slot::Method,
                SymbolData::Class(ns) if ns.is_singleton() => Slot::Singleton,
                _ => Slot::Constant,
            };
            if !identities.insert((symbol.owner, symbol.name, slot)) {
                violations.push(Violation {
                    subject: "symbol",
                    at: at(),
                    problem: "another symbol has the same fully-qualified name".to_owned(),
                });
            }
        }

        match &symbol.data {
            SymbolData::Class(ns) | SymbolData::Module(ns) => {
                if !ns.ancestors_state.is_terminal() {
                    violations.push(Violation {
                        subject: "ancestors",
                        at: at(),
                        problem: format!("left in state {:?}", ns.ancestors_state),
                    });
                    continue;
                }
                if !ns.ancestors.contains(&id) {
                    violations.push(Violation {
                        subject: "ancestors",
                        at: at(),
                        problem: "list does not contain the namespace itself".to_owned(),
                    });
                }
                let mut seen = FxHashSet::default();
                for &ancestor in &ns.ancestors {
                    if !table.contains(ancestor) {
                        violations.push(Violation {
                            subject: "ancestors",
                            at: at(),
                            problem: format!("unknown symbol {ancestor:?}"),
                        });
                    } else if !seen.insert(ancestor) {
                        violations.push(Violation {
                            subject: "ancestors",
                            at: at(),
                            problem: format!(
                                "duplicate entry `{}`",
                                table.full_name(ancestor, interner)
                            ),
                        });
                    }
                }
            }
            SymbolData::Method(method) => {
                if !method.signature_state.is_terminal() {
                    violations.push(Violation {
                        subject: "method signature",
                        at: at(),
                        problem: format!("left in state {:?}", method.signature_state),
                    });
                }
            }
            SymbolData::StaticField(field) => {
                if field.alias.is_some_and(|alias| !alias.is_terminal()) {
                    violations.push(Violation {
                        subject: "constant alias",
                        at: at(),
                        problem: "alias target never settled".to_owned(),
                    });
                }
            }
            SymbolData::TypeMember(member) => {
                if !member.state.is_terminal() || member.param.is_none() {
                    violations.push(Violation {
                        subject: "type member",
                        at: at(),
                        problem: format!("left in state {:?}", member.state),
                    });
                }
            }
        }
    }
}
