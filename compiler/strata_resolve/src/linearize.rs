//! Ancestor linearization.
//!
//! ```text
//! ancestors(C) = dedup_keep_first(
//!     ancestors(prepends(C) latest first)...
//!     ++ [C]
//!     ++ ancestors(includes(C) latest first)...
//!     ++ ancestors(superclass(C))
//! )
//! ```
//!
//! Results are memoized on the namespace through `ancestors_state`. A
//! namespace reached again while it is `InProgress` closes a cycle: every
//! namespace on that cycle gets the degenerate list `[self]` and state
//! `Error`, and composition resumes normally below the cycle's entry point.
//!
//! `extend` edges never appear here; symbol finalization moved them onto
//! singleton classes as includes.

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use strata_diagnostic::Diagnostic;
use strata_ir::{MixinKind, Namespace, ResolutionState, StringInterner, SymbolId, SymbolTable};

use crate::report;
use crate::stack::ensure_sufficient_stack;

struct Linearizer<'a> {
    table: &'a mut SymbolTable,
    interner: &'a StringInterner,
    /// Namespaces currently being composed, outermost first.
    stack: Vec<SymbolId>,
    report_cycles: bool,
    diagnostics: Vec<Diagnostic>,
}

/// Linearize every class and module except singleton classes.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn linearize_instances(table: &mut SymbolTable, interner: &StringInterner) -> Vec<Diagnostic> {
    linearize_where(table, interner, true, |ns| !ns.is_singleton())
}

/// Linearize singleton classes.
///
/// Singleton hierarchies mirror the instance hierarchies, so a cycle here
/// was already reported for the attached classes and is only contained.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn linearize_singletons(table: &mut SymbolTable, interner: &StringInterner) -> Vec<Diagnostic> {
    linearize_where(table, interner, false, Namespace::is_singleton)
}

fn linearize_where(
    table: &mut SymbolTable,
    interner: &StringInterner,
    report_cycles: bool,
    select: impl Fn(&Namespace) -> bool,
) -> Vec<Diagnostic> {
    let targets: Vec<SymbolId> = table
        .namespace_ids()
        .into_iter()
        .filter(|&id| table.namespace(id).is_some_and(&select))
        .collect();

    // Recomputation replaces previous lists wholesale.
    for &id in &targets {
        if let Some(ns) = table.namespace_mut(id) {
            ns.ancestors.clear();
            ns.ancestors_state = ResolutionState::Unresolved;
        }
    }

    let mut linearizer = Linearizer {
        table,
        interner,
        stack: Vec::new(),
        report_cycles,
        diagnostics: Vec::new(),
    };
    for &id in &targets {
        // Cycles are contained inside `ancestors`; the outermost call cannot
        // be on a cycle that was not closed below it.
        let _ = linearizer.ancestors(id);
    }
    tracing::debug!(
        namespaces = targets.len(),
        cycles = linearizer.diagnostics.len(),
        "linearization complete"
    );
    linearizer.diagnostics
}

impl Linearizer<'_> {
    /// Linearized ancestors of `id`, or `Err(head)` while unwinding a cycle
    /// that `head` closed.
    fn ancestors(&mut self, id: SymbolId) -> Result<Vec<SymbolId>, SymbolId> {
        ensure_sufficient_stack(|| self.ancestors_inner(id))
    }

    fn ancestors_inner(&mut self, id: SymbolId) -> Result<Vec<SymbolId>, SymbolId> {
        let Some(ns) = self.table.namespace(id) else {
            return Ok(Vec::new());
        };
        match ns.ancestors_state {
            ResolutionState::Resolved | ResolutionState::Error => return Ok(ns.ancestors.clone()),
            ResolutionState::InProgress => {
                self.report_cycle(id);
                return Err(id);
            }
            ResolutionState::Unresolved => {}
        }

        let prepends: SmallVec<[SymbolId; 4]> = ns.mixins_of(MixinKind::Prepend).collect();
        let includes: SmallVec<[SymbolId; 4]> = ns.mixins_of(MixinKind::Include).collect();
        let superclass = ns.superclass;

        self.set(id, Vec::new(), ResolutionState::InProgress);
        self.stack.push(id);
        let composed = self.compose(id, &prepends, &includes, superclass);
        self.stack.pop();

        match composed {
            Ok(list) => {
                self.set(id, list.clone(), ResolutionState::Resolved);
                Ok(list)
            }
            Err(head) => {
                self.set(id, vec![id], ResolutionState::Error);
                if head == id {
                    Ok(vec![id])
                } else {
                    Err(head)
                }
            }
        }
    }

    fn compose(
        &mut self,
        id: SymbolId,
        prepends: &[SymbolId],
        includes: &[SymbolId],
        superclass: Option<SymbolId>,
    ) -> Result<Vec<SymbolId>, SymbolId> {
        let mut list = Vec::new();
        for &module in prepends.iter().rev() {
            list.extend(self.ancestors(module)?);
        }
        list.push(id);
        for &module in includes.iter().rev() {
            list.extend(self.ancestors(module)?);
        }
        if let Some(parent) = superclass {
            list.extend(self.ancestors(parent)?);
        }
        Ok(dedup_keep_first(list))
    }

    fn set(&mut self, id: SymbolId, ancestors: Vec<SymbolId>, state: ResolutionState) {
        if let Some(ns) = self.table.namespace_mut(id) {
            ns.ancestors = ancestors;
            ns.ancestors_state = state;
        }
    }

    fn report_cycle(&mut self, head: SymbolId) {
        if !self.report_cycles {
            return;
        }
        let start = self.stack.iter().position(|&id| id == head).unwrap_or(0);
        let mut cycle: Vec<String> = self.stack[start..]
            .iter()
            .map(|&id| self.table.full_name(id, self.interner))
            .collect();
        let name = self.table.full_name(head, self.interner);
        cycle.push(name.clone());
        let loc = self.table[head].loc;
        self.diagnostics.push(report::cyclic_hierarchy(loc, &name, &cycle));
    }
}

/// Keep the first occurrence of every id, preserving order.
pub(crate) fn dedup_keep_first(list: Vec<SymbolId>) -> Vec<SymbolId> {
    let mut seen = FxHashSet::default();
    list.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests;
