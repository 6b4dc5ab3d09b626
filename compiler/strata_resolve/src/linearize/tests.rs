use super::*;
use crate::test_helpers::{ancestor_names, codes, through_linearization};
use pretty_assertions::assert_eq;
use strata_ir::{FileId, TreeBuilder};

fn state_of(table: &SymbolTable, id: SymbolId) -> ResolutionState {
    table
        .namespace(id)
        .map_or(ResolutionState::Unresolved, |ns| ns.ancestors_state)
}

#[test]
fn plain_class_inherits_the_core_chain() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let plain = b.class(SymbolId::ROOT, "Plain");
    let mut files = vec![b.finish()];

    let diagnostics = through_linearization(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    assert_eq!(
        ancestor_names(&table, &interner, plain),
        vec!["Plain", "Object", "BasicObject"]
    );
    assert_eq!(state_of(&table, plain), ResolutionState::Resolved);
}

#[test]
fn later_includes_come_first() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.module(SymbolId::ROOT, "X");
    b.module(SymbolId::ROOT, "Y");
    b.class(SymbolId::ROOT, "B");
    let c = b.class(SymbolId::ROOT, "C");
    b.superclass(c, "B");
    b.include(c, "X");
    b.include(c, "Y");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);

    assert_eq!(
        ancestor_names(&table, &interner, c),
        vec!["C", "Y", "X", "B", "Object", "BasicObject"]
    );
}

#[test]
fn prepends_precede_the_class() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.module(SymbolId::ROOT, "Logged");
    b.module(SymbolId::ROOT, "Timed");
    b.module(SymbolId::ROOT, "Shared");
    let c = b.class(SymbolId::ROOT, "Service");
    b.prepend(c, "Logged");
    b.prepend(c, "Timed");
    b.include(c, "Shared");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);

    assert_eq!(
        ancestor_names(&table, &interner, c),
        vec!["Timed", "Logged", "Service", "Shared", "Object", "BasicObject"]
    );
}

#[test]
fn diamond_keeps_the_position_closest_to_the_class() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.module(SymbolId::ROOT, "Base");
    let left = b.module(SymbolId::ROOT, "Left");
    b.include(left, "Base");
    let right = b.module(SymbolId::ROOT, "Right");
    b.include(right, "Base");
    let c = b.class(SymbolId::ROOT, "C");
    b.include(c, "Left");
    b.include(c, "Right");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);

    assert_eq!(
        ancestor_names(&table, &interner, c),
        vec!["C", "Right", "Base", "Left", "Object", "BasicObject"]
    );
    assert_eq!(ancestor_names(&table, &interner, left), vec!["Left", "Base"]);
}

#[test]
fn module_both_prepended_and_included_stays_in_front() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.module(SymbolId::ROOT, "M");
    let c = b.class(SymbolId::ROOT, "C");
    b.include(c, "M");
    b.prepend(c, "M");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);

    assert_eq!(
        ancestor_names(&table, &interner, c),
        vec!["M", "C", "Object", "BasicObject"]
    );
}

#[test]
fn superclass_cycle_is_reported_once_and_contained() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let a = b.class(SymbolId::ROOT, "A");
    b.superclass(a, "B");
    let bb = b.class(SymbolId::ROOT, "B");
    b.superclass(bb, "A");
    let outside = b.class(SymbolId::ROOT, "Outside");
    let mut files = vec![b.finish()];

    let diagnostics = through_linearization(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4003"]);
    assert_eq!(diagnostics[0].notes, vec!["cycle: A -> B -> A".to_owned()]);
    assert_eq!(ancestor_names(&table, &interner, a), vec!["A"]);
    assert_eq!(ancestor_names(&table, &interner, bb), vec!["B"]);
    assert_eq!(state_of(&table, a), ResolutionState::Error);
    assert_eq!(state_of(&table, bb), ResolutionState::Error);
    assert_eq!(
        ancestor_names(&table, &interner, outside),
        vec!["Outside", "Object", "BasicObject"]
    );
}

#[test]
fn entry_point_below_a_cycle_still_composes() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let leaf = b.class(SymbolId::ROOT, "Leaf");
    b.include(leaf, "Ping");
    let ping = b.module(SymbolId::ROOT, "Ping");
    b.include(ping, "Pong");
    let pong = b.module(SymbolId::ROOT, "Pong");
    b.include(pong, "Ping");
    let mut files = vec![b.finish()];

    let diagnostics = through_linearization(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4003"]);
    assert_eq!(state_of(&table, leaf), ResolutionState::Resolved);
    assert_eq!(state_of(&table, ping), ResolutionState::Error);
    assert_eq!(state_of(&table, pong), ResolutionState::Error);
    assert_eq!(
        ancestor_names(&table, &interner, leaf),
        vec!["Leaf", "Ping", "Object", "BasicObject"]
    );
}

#[test]
fn singleton_ancestors_follow_the_metaclass_chain() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.module(SymbolId::ROOT, "Tools");
    let base = b.class(SymbolId::ROOT, "Base");
    b.extend(base, "Tools");
    let derived = b.class(SymbolId::ROOT, "Derived");
    b.superclass(derived, "Base");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);
    let diagnostics = linearize_singletons(&mut table, &interner);

    assert!(diagnostics.is_empty());
    let meta = table.namespace(derived).and_then(|ns| ns.singleton);
    let Some(meta) = meta else {
        panic!("Derived has no singleton class");
    };
    assert_eq!(
        ancestor_names(&table, &interner, meta),
        vec![
            "<Class:Derived>",
            "<Class:Base>",
            "Tools",
            "<Class:Object>",
            "<Class:BasicObject>",
            "Class",
            "Module",
            "Object",
            "BasicObject",
        ]
    );
}

#[test]
fn singleton_cycles_are_contained_silently() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let a = b.class(SymbolId::ROOT, "A");
    b.superclass(a, "B");
    let bb = b.class(SymbolId::ROOT, "B");
    b.superclass(bb, "A");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);
    let diagnostics = linearize_singletons(&mut table, &interner);

    assert!(diagnostics.is_empty());
    let meta = table.namespace(a).and_then(|ns| ns.singleton);
    let Some(meta) = meta else {
        panic!("A has no singleton class");
    };
    assert_eq!(state_of(&table, meta), ResolutionState::Error);
    assert_eq!(ancestor_names(&table, &interner, meta), vec!["<Class:A>"]);
}

#[test]
fn relinearizing_gives_identical_lists() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.module(SymbolId::ROOT, "M");
    let c = b.class(SymbolId::ROOT, "C");
    b.include(c, "M");
    let mut files = vec![b.finish()];

    through_linearization(&mut table, &interner, &mut files);
    let first = ancestor_names(&table, &interner, c);
    let diagnostics = linearize_instances(&mut table, &interner);

    assert!(diagnostics.is_empty());
    assert_eq!(ancestor_names(&table, &interner, c), first);
}

#[test]
fn deep_hierarchies_do_not_overflow() {
    const DEPTH: usize = 1_000;

    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "deep.rb");
    // Most derived first, so the first linearization recurses all the way.
    let mut deepest = None;
    for i in (1..DEPTH).rev() {
        let class = b.class(SymbolId::ROOT, &format!("K{i}"));
        b.superclass(class, &format!("K{}", i - 1));
        deepest.get_or_insert(class);
    }
    b.class(SymbolId::ROOT, "K0");
    let mut files = vec![b.finish()];
    let Some(last) = deepest else {
        panic!("empty hierarchy");
    };

    let diagnostics = through_linearization(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    let length = table.namespace(last).map_or(0, |ns| ns.ancestors.len());
    // K0..K999 plus Object and BasicObject.
    assert_eq!(length, DEPTH + 2);
}

#[test]
fn dedup_keeps_first_occurrence() {
    let ids: Vec<SymbolId> = [7, 3, 7, 9, 3, 1].into_iter().map(SymbolId::from_raw).collect();
    let expected: Vec<SymbolId> = [7, 3, 9, 1].into_iter().map(SymbolId::from_raw).collect();
    assert_eq!(dedup_keep_first(ids), expected);
}
