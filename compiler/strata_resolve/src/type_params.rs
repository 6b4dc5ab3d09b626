//! Type parameter binding.
//!
//! Three steps:
//!
//! 1. **Bind** (sequential): attach an unbounded `TypeParam` to every
//!    declared type member symbol.
//! 2. **Redeclaration** (sequential): a subclass of a generic class must
//!    redeclare each of its parent's type members. Missing ones are reported
//!    and synthesized so generic arity stays consistent down the hierarchy.
//! 3. **Bounds** (file-parallel): resolve `lower:`/`upper:` bound expressions
//!    into the tree-local `TypeMemberDecl::resolved`. An unusable bound falls
//!    back to `Bottom`/`Top`. The results are then copied onto the symbols.
//!
//! Classes may only declare invariant type members; variance on a class
//! member is reported during the bounds step and reset to invariant.

use rustc_hash::FxHashSet;
use strata_diagnostic::Diagnostic;
use strata_ir::{
    Decl, Loc, Name, ParsedFile, ResolutionState, StringInterner, SymbolId, SymbolKind, SymbolTable,
    Type, TypeMemberDecl, TypeParam, Variance,
};

use crate::report;
use crate::type_expr::TypeExprResolver;
use crate::WorkerPool;

/// Variance a member actually gets: classes are always invariant.
fn effective_variance(table: &SymbolTable, decl: &TypeMemberDecl) -> Variance {
    if table[decl.owner].is_class() {
        Variance::Invariant
    } else {
        decl.variance
    }
}

#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub(crate) fn bind_type_members(table: &mut SymbolTable, files: &[ParsedFile]) {
    let mut bound = 0usize;
    for file in files {
        for decl in file.type_members() {
            let variance = effective_variance(table, decl);
            let name = table[decl.symbol].name;
            if let Some(data) = table[decl.symbol].as_type_member_mut() {
                data.param = Some(TypeParam::unbounded(name, variance, decl.owner));
                data.state = ResolutionState::Unresolved;
                bound += 1;
            }
        }
    }
    tracing::debug!(bound, "type member binding complete");
}

/// Report and synthesize type members a subclass failed to redeclare.
#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn check_redeclarations(
    table: &mut SymbolTable,
    interner: &StringInterner,
) -> Vec<Diagnostic> {
    let mut classes: Vec<(usize, SymbolId)> = table
        .iter()
        .filter_map(|(id, sym)| {
            let ns = sym.as_namespace()?;
            let eligible = sym.is_class()
                && !ns.is_singleton()
                && ns.ancestors_state == ResolutionState::Resolved;
            eligible.then_some((ns.ancestors.len(), id))
        })
        .collect();
    // Parents have strictly shorter ancestor lists than their subclasses.
    classes.sort_unstable();

    let mut diagnostics = Vec::new();
    for (_, class) in classes {
        let Some(parent) = table.namespace(class).and_then(|ns| ns.superclass) else {
            continue;
        };
        let inherited: Vec<SymbolId> = table
            .namespace(parent)
            .map(|ns| ns.type_members.clone())
            .unwrap_or_default();

        for &member in &inherited {
            let name = table[member].name;
            match table.lookup_member(class, name) {
                Some(own) if table[own].kind() == SymbolKind::TypeMember => continue,
                existing => {
                    let loc = table[class].loc;
                    diagnostics.push(report::missing_type_member(
                        loc,
                        &table.full_name(class, interner),
                        interner.lookup(name),
                        &table.full_name(parent, interner),
                    ));
                    if existing.is_none() {
                        synthesize(table, class, name, loc);
                    }
                }
            }
        }
        align_with_parent(table, class, &inherited);
    }
    tracing::debug!(errors = diagnostics.len(), "type member redeclaration check complete");
    diagnostics
}

fn synthesize(table: &mut SymbolTable, class: SymbolId, name: Name, loc: Loc) {
    let id = table.enter_type_member(class, name, loc);
    if let Some(data) = table[id].as_type_member_mut() {
        data.param = Some(TypeParam::unbounded(name, Variance::Invariant, class));
        data.state = ResolutionState::Resolved;
    }
}

/// Order `class`'s type members like its parent's, own additions last, so
/// `Child[X, Y]` binds arguments in the same positions as `Parent[X, Y]`.
fn align_with_parent(table: &mut SymbolTable, class: SymbolId, inherited: &[SymbolId]) {
    let Some(ns) = table.namespace(class) else {
        return;
    };
    let named = |name: Name| {
        ns.type_members
            .iter()
            .copied()
            .find(|&own| table[own].name == name)
    };
    let mut ordered: Vec<SymbolId> = inherited
        .iter()
        .filter_map(|&member| named(table[member].name))
        .collect();
    let additions: Vec<SymbolId> = ns
        .type_members
        .iter()
        .copied()
        .filter(|own| !ordered.contains(own))
        .collect();
    ordered.extend(additions);
    if let Some(ns) = table.namespace_mut(class) {
        ns.type_members = ordered;
    }
}

/// Resolve the bounds of one file's type members into their declarations.
pub(crate) fn resolve_file_bounds(
    table: &SymbolTable,
    interner: &StringInterner,
    file: &mut ParsedFile,
) -> (Vec<Diagnostic>, Vec<(SymbolId, TypeParam)>) {
    let mut diagnostics = Vec::new();
    let mut params = Vec::new();

    for index in 0..file.decls.len() {
        let Decl::TypeMember(decl) = &file.decls[index] else {
            continue;
        };
        let param = resolve_bounds(table, interner, file, decl, &mut diagnostics);
        params.push((decl.symbol, param.clone()));
        if let Decl::TypeMember(decl) = &mut file.decls[index] {
            decl.resolved = Some(param);
        }
    }
    (diagnostics, params)
}

fn resolve_bounds(
    table: &SymbolTable,
    interner: &StringInterner,
    file: &ParsedFile,
    decl: &TypeMemberDecl,
    diagnostics: &mut Vec<Diagnostic>,
) -> TypeParam {
    let name = table[decl.symbol].name;
    let variance = effective_variance(table, decl);
    if variance != decl.variance {
        let loc = Loc::new(file.file, decl.span);
        diagnostics.push(report::variance_on_class(loc, interner.lookup(name), decl.variance));
    }

    let mut resolver = TypeExprResolver {
        table,
        interner,
        file,
        method_type_params: &[],
        diagnostics,
    };
    let lower = decl
        .lower
        .as_ref()
        .and_then(|expr| resolver.resolve(expr))
        .unwrap_or(Type::Bottom);
    let upper = decl
        .upper
        .as_ref()
        .and_then(|expr| resolver.resolve(expr))
        .unwrap_or(Type::Top);

    TypeParam {
        name,
        variance,
        owner: decl.owner,
        lower,
        upper,
    }
}

/// File-parallel bounds step; returns per-file results in file order.
#[tracing::instrument(level = "debug", skip_all, fields(files = files.len()))]
pub(crate) fn resolve_bounds_parallel(
    table: &SymbolTable,
    interner: &StringInterner,
    files: &mut [ParsedFile],
    pool: &WorkerPool,
) -> Vec<(Vec<Diagnostic>, Vec<(SymbolId, TypeParam)>)> {
    pool.map_files(files, |file| resolve_file_bounds(table, interner, file))
}

/// Copy resolved parameters onto the symbols and settle every member.
pub(crate) fn apply_type_params(
    table: &mut SymbolTable,
    params: impl IntoIterator<Item = (SymbolId, TypeParam)>,
) {
    let mut applied = FxHashSet::default();
    for (id, param) in params {
        if let Some(data) = table[id].as_type_member_mut() {
            data.param = Some(param);
            data.state = ResolutionState::Resolved;
            applied.insert(id);
        }
    }

    for id in table.ids().collect::<Vec<_>>() {
        let name = table[id].name;
        let owner = table[id].owner;
        if let Some(data) = table[id].as_type_member_mut() {
            if !data.state.is_terminal() {
                data.param
                    .get_or_insert_with(|| TypeParam::unbounded(name, Variance::Invariant, owner));
                data.state = ResolutionState::Resolved;
            }
        }
    }
    tracing::debug!(applied = applied.len(), "type parameters applied");
}
