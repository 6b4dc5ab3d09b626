//! Constant resolution.
//!
//! Binds every `ConstantRef` of the forest to a symbol or to a permanent
//! error. Static fields written as `A = B` are aliases: a path walking through
//! `A` continues at whatever `B` resolves to, which makes references depend on
//! each other across files.
//!
//! # Algorithm
//!
//! ```text
//! worklist = every non-terminal reference, in file order
//! loop:
//!     for node in worklist:
//!         lookup(node)
//!           Found    -> Resolved (and settle the alias it defines)
//!           NotFound -> Error, reported
//!           Poisoned -> Error, silent (walks through a failed alias)
//!           Pending  -> stays in the worklist for the next pass
//!     stop when the worklist is empty or a pass made no progress
//! leftovers sit on (or behind) alias cycles: Error, one report per cycle
//! ```
//!
//! While a node is being attempted it and the alias it defines are marked
//! `InProgress`, so `A = A` observes its own sentinel and defers.

use rustc_hash::{FxHashMap, FxHashSet};
use strata_diagnostic::Diagnostic;
use strata_ir::{
    ConstRefId, ConstantRef, Decl, Loc, ParsedFile, Resolution, StringInterner, SymbolId,
    SymbolTable,
};

use crate::report;

/// Outcome of walking one constant path against the table.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Lookup {
    Found(SymbolId),
    /// Path segment `index` is not a member of `scope` (or of any lexical
    /// scope, for the first segment, where `scope` is `None`).
    NotFound {
        index: usize,
        scope: Option<SymbolId>,
    },
    /// Blocked on an alias whose definition is not resolved yet.
    Pending(SymbolId),
    /// Walks through an alias that already failed.
    Poisoned,
}

/// Innermost-first lexical chain of `scope`, ending at the root.
pub(crate) fn lexical_scopes(
    table: &SymbolTable,
    scope: SymbolId,
) -> impl Iterator<Item = SymbolId> + '_ {
    let mut next = Some(scope);
    std::iter::from_fn(move || {
        let current = next?;
        next = match table.get(current) {
            Some(sym) if current != SymbolId::ROOT && sym.owner != current => Some(sym.owner),
            Some(_) if current != SymbolId::ROOT => Some(SymbolId::ROOT),
            _ => None,
        };
        Some(current)
    })
}

/// Follow one alias hop. Alias targets are stored fully dereferenced.
fn dereference(table: &SymbolTable, id: SymbolId) -> Result<SymbolId, Lookup> {
    match table[id].as_field().and_then(|field| field.alias) {
        None => Ok(id),
        Some(Resolution::Resolved(target)) => Ok(target),
        Some(Resolution::Error) => Err(Lookup::Poisoned),
        Some(Resolution::Unresolved | Resolution::InProgress) => Err(Lookup::Pending(id)),
    }
}

/// Walk a constant path: first segment through the lexical chain (or the
/// root when rooted), remaining segments as direct members.
pub(crate) fn lookup(table: &SymbolTable, constant: &ConstantRef) -> Lookup {
    let Some((&first, rest)) = constant.path.split_first() else {
        return Lookup::NotFound {
            index: 0,
            scope: None,
        };
    };

    let found = if constant.rooted {
        table.lookup_member(SymbolId::ROOT, first)
    } else {
        lexical_scopes(table, constant.scope).find_map(|scope| table.lookup_member(scope, first))
    };
    let Some(found) = found else {
        let scope = constant.rooted.then_some(SymbolId::ROOT);
        return Lookup::NotFound { index: 0, scope };
    };
    let mut current = match dereference(table, found) {
        Ok(id) => id,
        Err(blocked) => return blocked,
    };

    for (offset, &segment) in rest.iter().enumerate() {
        let Some(member) = table.lookup_member(current, segment) else {
            return Lookup::NotFound {
                index: offset + 1,
                scope: Some(current),
            };
        };
        current = match dereference(table, member) {
            Ok(id) => id,
            Err(blocked) => return blocked,
        };
    }
    Lookup::Found(current)
}

/// Diagnostic for a `NotFound` lookup.
pub(crate) fn not_found_diagnostic(
    table: &SymbolTable,
    interner: &StringInterner,
    loc: Loc,
    constant: &ConstantRef,
    index: usize,
    scope: Option<SymbolId>,
) -> Diagnostic {
    let path = report::constant_text(interner, constant);
    let missing = constant
        .path
        .get(index)
        .map_or("", |&name| interner.lookup(name));
    let scope = scope.map(|id| table.full_name(id, interner));
    report::undefined_constant(loc, &path, missing, scope.as_deref())
}

/// Address of one reference in the forest.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub(crate) struct NodeRef {
    pub file: usize,
    pub id: ConstRefId,
}

/// Counters reported by a resolution run.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub(crate) struct ConstantStats {
    /// Full passes over the worklist.
    pub passes: usize,
    pub resolved: usize,
    pub failed: usize,
}

struct ConstantResolver<'a> {
    table: &'a mut SymbolTable,
    interner: &'a StringInterner,
    files: &'a mut [ParsedFile],
    /// Alias field -> the reference on its right-hand side.
    alias_defs: FxHashMap<SymbolId, NodeRef>,
    /// Inverse of `alias_defs`.
    defines: FxHashMap<NodeRef, SymbolId>,
    /// Alias each deferred node waited on during its latest attempt.
    blocked_on: FxHashMap<NodeRef, SymbolId>,
    diagnostics: Vec<Diagnostic>,
    stats: ConstantStats,
}

/// Resolve every constant reference of `files` to a fixpoint.
#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub(crate) fn resolve_constants(
    table: &mut SymbolTable,
    interner: &StringInterner,
    files: &mut [ParsedFile],
) -> (Vec<Diagnostic>, ConstantStats) {
    let mut resolver = ConstantResolver::new(table, interner, files);
    let worklist = resolver.initial_worklist();
    let leftover = resolver.run_passes(worklist);
    resolver.fail_cycles(&leftover);
    resolver.fail_orphan_aliases();

    let ConstantResolver {
        mut diagnostics,
        stats,
        ..
    } = resolver;
    diagnostics.sort_by_key(Diagnostic::primary_loc);
    tracing::debug!(
        passes = stats.passes,
        resolved = stats.resolved,
        failed = stats.failed,
        "constant resolution complete"
    );
    (diagnostics, stats)
}

impl<'a> ConstantResolver<'a> {
    fn new(
        table: &'a mut SymbolTable,
        interner: &'a StringInterner,
        files: &'a mut [ParsedFile],
    ) -> Self {
        let mut alias_defs = FxHashMap::default();
        let mut defines = FxHashMap::default();
        for (file_idx, file) in files.iter().enumerate() {
            for decl in &file.decls {
                let Decl::ConstantAssign(assign) = decl else {
                    continue;
                };
                let Some(rhs) = assign.alias_of else {
                    continue;
                };
                if alias_defs.contains_key(&assign.symbol) {
                    continue;
                }
                let node = NodeRef {
                    file: file_idx,
                    id: rhs,
                };
                alias_defs.insert(assign.symbol, node);
                defines.insert(node, assign.symbol);
            }
        }

        for &field in alias_defs.keys() {
            if let Some(data) = table[field].as_field_mut() {
                if !data.alias.is_some_and(Resolution::is_terminal) {
                    data.alias = Some(Resolution::Unresolved);
                }
            }
        }

        ConstantResolver {
            table,
            interner,
            files,
            alias_defs,
            defines,
            blocked_on: FxHashMap::default(),
            diagnostics: Vec::new(),
            stats: ConstantStats::default(),
        }
    }

    fn initial_worklist(&self) -> Vec<NodeRef> {
        self.files
            .iter()
            .enumerate()
            .flat_map(|(file_idx, file)| {
                file.constants()
                    .filter(|(_, constant)| !constant.resolution.is_terminal())
                    .map(move |(id, _)| NodeRef { file: file_idx, id })
            })
            .collect()
    }

    /// Pass over the worklist until it empties or stalls; returns what is left.
    fn run_passes(&mut self, mut worklist: Vec<NodeRef>) -> Vec<NodeRef> {
        while !worklist.is_empty() {
            self.stats.passes += 1;
            let before = worklist.len();
            let mut deferred = Vec::with_capacity(before);
            for node in worklist {
                if !self.attempt(node) {
                    deferred.push(node);
                }
            }
            tracing::trace!(
                pass = self.stats.passes,
                settled = before - deferred.len(),
                deferred = deferred.len(),
                "constant pass"
            );
            worklist = deferred;
            if worklist.len() == before {
                break;
            }
        }
        worklist
    }

    fn set(&mut self, node: NodeRef, resolution: Resolution) {
        self.files[node.file].constant_mut(node.id).resolution = resolution;
        if let Some(&field) = self.defines.get(&node) {
            if let Some(data) = self.table[field].as_field_mut() {
                data.alias = Some(resolution);
            }
        }
    }

    fn loc(&self, node: NodeRef) -> Loc {
        let file = &self.files[node.file];
        Loc::new(file.file, file.constant(node.id).span)
    }

    /// Try to settle one node. Returns `false` when it has to wait.
    fn attempt(&mut self, node: NodeRef) -> bool {
        self.set(node, Resolution::InProgress);
        let outcome = lookup(self.table, self.files[node.file].constant(node.id));
        match outcome {
            Lookup::Found(target) => {
                self.set(node, Resolution::Resolved(target));
                self.stats.resolved += 1;
                true
            }
            Lookup::NotFound { index, scope } => {
                self.set(node, Resolution::Error);
                self.stats.failed += 1;
                let diag = not_found_diagnostic(
                    self.table,
                    self.interner,
                    self.loc(node),
                    self.files[node.file].constant(node.id),
                    index,
                    scope,
                );
                self.diagnostics.push(diag);
                true
            }
            Lookup::Poisoned => {
                self.set(node, Resolution::Error);
                self.stats.failed += 1;
                true
            }
            Lookup::Pending(alias) => {
                self.set(node, Resolution::Unresolved);
                self.blocked_on.insert(node, alias);
                false
            }
        }
    }

    /// Dependency chain starting at `node`: each entry is the definition of
    /// the alias the previous entry is blocked on. Returns the chain and the
    /// index where it loops back on itself, if it does.
    fn chain(&self, node: NodeRef, stalled: &FxHashSet<NodeRef>) -> (Vec<NodeRef>, Option<usize>) {
        let mut chain = vec![node];
        let mut current = node;
        loop {
            let next = self
                .blocked_on
                .get(&current)
                .and_then(|alias| self.alias_defs.get(alias))
                .copied();
            let Some(next) = next.filter(|next| stalled.contains(next)) else {
                return (chain, None);
            };
            if let Some(start) = chain.iter().position(|&seen| seen == next) {
                return (chain, Some(start));
            }
            chain.push(next);
            current = next;
        }
    }

    /// Fail everything a stalled pass left behind. Each cycle is reported
    /// once, at its first reference in file order; nodes that merely depend
    /// on a cycle fail silently.
    fn fail_cycles(&mut self, stalled: &[NodeRef]) {
        if stalled.is_empty() {
            return;
        }
        let stalled_set: FxHashSet<NodeRef> = stalled.iter().copied().collect();
        let mut ordered = stalled.to_vec();
        ordered.sort_by_key(|&node| self.loc(node));

        let mut reported: FxHashSet<NodeRef> = FxHashSet::default();
        let mut diagnostics = Vec::new();
        for &node in &ordered {
            let (chain, cycle_start) = self.chain(node, &stalled_set);
            match cycle_start {
                Some(start) => {
                    let cycle = &chain[start..];
                    let on_cycle = cycle.contains(&node);
                    if on_cycle && !cycle.iter().any(|n| reported.contains(n)) {
                        reported.extend(cycle.iter().copied());
                        diagnostics.push(self.cycle_diagnostic(node, cycle));
                    }
                }
                None => {
                    let alias = self.blocked_on.get(&node).copied();
                    if let Some(alias) = alias {
                        let path = report::constant_text(
                            self.interner,
                            self.files[node.file].constant(node.id),
                        );
                        let alias = self.table.full_name(alias, self.interner);
                        diagnostics.push(report::unresolvable_alias(self.loc(node), &path, &alias));
                    }
                }
            }
        }

        for &node in stalled {
            self.set(node, Resolution::Error);
            self.stats.failed += 1;
        }
        self.diagnostics.extend(diagnostics);
    }

    fn cycle_diagnostic(&self, node: NodeRef, cycle: &[NodeRef]) -> Diagnostic {
        let start = cycle.iter().position(|&n| n == node).unwrap_or(0);
        let mut names: Vec<String> = cycle[start..]
            .iter()
            .chain(&cycle[..start])
            .map(|n| report::constant_text(self.interner, self.files[n.file].constant(n.id)))
            .collect();
        if let Some(first) = names.first().cloned() {
            names.push(first);
        }
        let path = report::constant_text(self.interner, self.files[node.file].constant(node.id));
        report::cyclic_constant(self.loc(node), &path, &names)
    }

    /// Aliases the namer marked but whose definition never settled.
    fn fail_orphan_aliases(&mut self) {
        for id in self.table.ids().collect::<Vec<_>>() {
            if let Some(field) = self.table[id].as_field_mut() {
                if field.alias.is_some_and(|alias| !alias.is_terminal()) {
                    field.alias = Some(Resolution::Error);
                }
            }
        }
    }
}

/// Bind the references of one file with a single lookup each.
///
/// Used when the table is already final: an alias that is still pending can
/// no longer settle, so it fails the reference.
pub(crate) fn bind_file_constants(
    table: &SymbolTable,
    interner: &StringInterner,
    file: &mut ParsedFile,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let ids: Vec<ConstRefId> = file
        .constants()
        .filter(|(_, constant)| !constant.resolution.is_terminal())
        .map(|(id, _)| id)
        .collect();
    for id in ids {
        let constant = file.constant(id);
        let resolution = match lookup(table, constant) {
            Lookup::Found(target) => Resolution::Resolved(target),
            Lookup::NotFound { index, scope } => {
                let loc = Loc::new(file.file, constant.span);
                diagnostics.push(not_found_diagnostic(
                    table, interner, loc, constant, index, scope,
                ));
                Resolution::Error
            }
            Lookup::Pending(_) | Lookup::Poisoned => Resolution::Error,
        };
        file.constant_mut(id).resolution = resolution;
    }
    diagnostics
}
