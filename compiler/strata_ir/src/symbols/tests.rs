use super::*;
use crate::{FileId, Span};
use pretty_assertions::assert_eq;

fn loc(start: u32) -> Loc {
    Loc::new(FileId::new(0), Span::new(start, start + 1))
}

#[test]
fn core_hierarchy_is_preallocated() {
    let table = SymbolTable::new();
    assert_eq!(table.len(), SymbolId::FIRST_USER as usize);
    assert!(table[SymbolId::OBJECT].is_class());
    assert_eq!(
        table.namespace(SymbolId::OBJECT).and_then(|ns| ns.superclass),
        Some(SymbolId::BASIC_OBJECT)
    );
    assert_eq!(
        table.namespace(SymbolId::CLASS).and_then(|ns| ns.superclass),
        Some(SymbolId::MODULE)
    );
    assert_eq!(
        table.namespace(SymbolId::BASIC_OBJECT).and_then(|ns| ns.superclass),
        None
    );
    assert_eq!(
        table.lookup_member(SymbolId::ROOT, Name::OBJECT),
        Some(SymbolId::OBJECT)
    );
}

#[test]
fn reopening_returns_existing_symbol() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let foo = interner.intern("Foo");

    let first = table.enter_class(SymbolId::ROOT, foo, loc(0));
    let second = table.enter_class(SymbolId::ROOT, foo, loc(10));
    assert_eq!(first, second);
    // First declaration keeps its location.
    assert_eq!(table[first].loc, loc(0));
}

#[test]
fn methods_do_not_shadow_constants() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let name = interner.intern("Foo");

    let class = table.enter_class(SymbolId::ROOT, name, loc(0));
    let method = table.enter_method(SymbolId::ROOT, name, loc(5));
    assert_ne!(class, method);
    assert_eq!(table.lookup_member(SymbolId::ROOT, name), Some(class));
    assert_eq!(table[method].kind(), SymbolKind::Method);
}

#[test]
fn type_members_keep_declaration_order() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let map = table.enter_class(SymbolId::ROOT, interner.intern("Map"), loc(0));
    let k = table.enter_type_member(map, interner.intern("K"), loc(1));
    let v = table.enter_type_member(map, interner.intern("V"), loc(2));
    // Re-entering does not duplicate.
    table.enter_type_member(map, interner.intern("K"), loc(3));

    let ns = table.namespace(map).map(|ns| ns.type_members.clone());
    assert_eq!(ns, Some(vec![k, v]));
}

#[test]
fn singleton_is_created_once() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let foo = table.enter_class(SymbolId::ROOT, interner.intern("Foo"), loc(0));
    let name = interner.intern("<Class:Foo>");

    let s1 = table.enter_singleton(foo, name);
    let s2 = table.enter_singleton(foo, name);
    assert_eq!(s1, s2);
    assert_eq!(table.namespace(s1).and_then(|ns| ns.attached), Some(foo));
    assert_eq!(table.namespace(foo).and_then(|ns| ns.singleton), Some(s1));
    // Singletons are not constants.
    assert_eq!(table.lookup_member(SymbolId::ROOT, name), None);
}

#[test]
fn full_name_joins_owners() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let a = table.enter_module(SymbolId::ROOT, interner.intern("A"), loc(0));
    let b = table.enter_class(a, interner.intern("B"), loc(1));
    let c = table.enter_static_field(b, interner.intern("C"), loc(2));

    assert_eq!(table.full_name(c, &interner), "A::B::C");
    assert_eq!(table.full_name(SymbolId::ROOT, &interner), "<root>");
}

#[test]
fn resolution_states() {
    assert!(Resolution::Resolved(SymbolId::OBJECT).is_terminal());
    assert!(Resolution::Error.is_terminal());
    assert!(!Resolution::InProgress.is_terminal());
    assert_eq!(Resolution::Unresolved.symbol(), None);
    assert_eq!(
        Resolution::Resolved(SymbolId::OBJECT).symbol(),
        Some(SymbolId::OBJECT)
    );
}
