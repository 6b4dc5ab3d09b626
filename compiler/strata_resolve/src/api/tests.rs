use super::*;
use crate::test_helpers::{ancestor_names, codes};
use pretty_assertions::assert_eq;
use strata_ir::{Decl, FileId, ParamKind, ResolutionState, TreeBuilder, Variance};

/// Two files: a generic container with a typed method, and a user of it
/// with one undefined reference.
fn forest(table: &mut SymbolTable, interner: &StringInterner) -> Vec<ParsedFile> {
    let mut lib = TreeBuilder::new(table, interner, FileId::new(0), "lib.rb");
    lib.class(SymbolId::ROOT, "Integer");
    let bag = lib.class(SymbolId::ROOT, "Bag");
    lib.type_member(bag, "Elem", Variance::Covariant);
    let add = lib.method(bag, "add", &[("item", ParamKind::Positional)]);
    let item = lib.ty(bag, "Elem");
    let returns = lib.ty(bag, "Bag");
    lib.sig(add, vec![("item", item)], Some(returns));
    let lib = lib.finish();

    let mut app = TreeBuilder::new(table, interner, FileId::new(1), "app.rb");
    let numbers = app.class(SymbolId::ROOT, "Numbers");
    app.superclass(numbers, "Bag");
    app.type_member(numbers, "Elem", Variance::Invariant);
    let total = app.method(numbers, "total", &[]);
    let returns = app.ty(numbers, "Integer");
    app.sig(total, Vec::new(), Some(returns));
    app.constant(numbers, "Undefined");
    let app = app.finish();

    vec![lib, app]
}

fn sequential() -> Resolver {
    Resolver::new(ResolverConfig::sequential())
}

#[test]
fn full_run_completes() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let files = forest(&mut table, &interner);
    let mut diagnostics = DiagnosticQueue::new();

    let outcome = sequential().run(&mut table, &interner, files, &mut diagnostics);

    let files = match outcome {
        Ok(ResolveOutcome::Complete(files)) => files,
        other => panic!("unexpected outcome: {other:?}"),
    };
    assert_eq!(files.len(), 2);
    assert_eq!(codes(&diagnostics.flush()), vec!["E4007", "E4001"]);
    let numbers = table.lookup_member(SymbolId::ROOT, interner.intern("Numbers"));
    let Some(numbers) = numbers else {
        panic!("Numbers was not entered");
    };
    assert_eq!(
        ancestor_names(&table, &interner, numbers),
        vec!["Numbers", "Bag", "Object", "BasicObject"]
    );
    assert!(files
        .iter()
        .flat_map(ParsedFile::methods)
        .all(|m| m.resolved_sig.is_some()));
}

#[test]
fn cancellation_stops_at_the_next_boundary() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let files = forest(&mut table, &interner);
    let mut diagnostics = DiagnosticQueue::new();
    let token = CancellationToken::new();
    let resolver = sequential().with_cancellation(token.clone());
    token.cancel();

    let outcome = resolver.run(&mut table, &interner, files, &mut diagnostics);

    assert!(matches!(outcome, Ok(ResolveOutcome::Cancelled)));
    // Constant resolution ran; nothing after it did.
    assert!(diagnostics.has_errors());
    let bag = table.lookup_member(SymbolId::ROOT, interner.intern("Bag"));
    let state = bag.and_then(|id| table.namespace(id)).map(|ns| ns.ancestors_state);
    assert_eq!(state, Some(ResolutionState::Unresolved));
}

#[test]
fn constant_resolution_alone_leaves_hierarchy_untouched() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let files = forest(&mut table, &interner);
    let mut diagnostics = DiagnosticQueue::new();

    let files = sequential().run_constant_resolution(&mut table, &interner, files, &mut diagnostics);

    assert_eq!(codes(&diagnostics.flush()), vec!["E4001"]);
    assert!(files
        .iter()
        .all(|f| f.constants().all(|(_, c)| c.resolution.is_terminal())));
    let numbers = table.lookup_member(SymbolId::ROOT, interner.intern("Numbers"));
    let superclass = numbers.and_then(|id| table.namespace(id)).and_then(|ns| ns.superclass);
    assert_eq!(superclass, None);
}

#[test]
fn tree_passes_reproduce_the_full_run() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let files = forest(&mut table, &interner);
    let pristine = files.clone();
    let resolver = sequential();

    let mut full_diagnostics = DiagnosticQueue::new();
    let resolved = match resolver.run(&mut table, &interner, files, &mut full_diagnostics) {
        Ok(outcome) => outcome.into_files().unwrap_or_default(),
        Err(e) => panic!("{e}"),
    };
    let symbols = table.len();

    let mut tree_diagnostics = DiagnosticQueue::new();
    let rebuilt = resolver.run_tree_passes(&table, &interner, pristine, &mut tree_diagnostics);

    assert_eq!(table.len(), symbols);
    assert_eq!(tree_diagnostics.flush(), full_diagnostics.flush());
    for (full, tree) in resolved.iter().zip(&rebuilt) {
        let full_refs: Vec<_> = full.constants().map(|(_, c)| c.resolution).collect();
        let tree_refs: Vec<_> = tree.constants().map(|(_, c)| c.resolution).collect();
        assert_eq!(full_refs, tree_refs);
        for (a, b) in full.decls.iter().zip(&tree.decls) {
            match (a, b) {
                (Decl::Method(a), Decl::Method(b)) => assert_eq!(a.resolved_sig, b.resolved_sig),
                (Decl::TypeMember(a), Decl::TypeMember(b)) => assert_eq!(a.resolved, b.resolved),
                _ => {}
            }
        }
    }
}

#[test]
fn sanity_check_can_be_disabled() {
    let resolver = Resolver::new(ResolverConfig::sequential().with_sanity_check(false));
    assert!(!resolver.config().run_sanity_check);
    assert_eq!(resolver.pool().threads(), 1);
    assert!(!resolver.cancellation().is_cancelled());
}
