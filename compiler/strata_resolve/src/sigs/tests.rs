use super::*;
use crate::test_helpers::{codes, through_linearization};
use crate::type_params::{apply_type_params, bind_type_members, resolve_bounds_parallel};
use pretty_assertions::assert_eq;
use strata_ir::{FileId, MethodFlags, ParamKind, Span, TreeBuilder, TypeExpr, Variance, Visibility};

/// Every phase a signature depends on, then the signature step itself.
fn resolve_all(table: &mut SymbolTable, interner: &StringInterner, files: &mut [ParsedFile]) -> Vec<Diagnostic> {
    let mut diagnostics = through_linearization(table, interner, files);
    let pool = WorkerPool::sequential();
    bind_type_members(table, files);
    let mut params = Vec::new();
    for (errors, resolved) in resolve_bounds_parallel(table, interner, files, &pool) {
        diagnostics.extend(errors);
        params.extend(resolved);
    }
    apply_type_params(table, params);

    let mut signatures = Vec::new();
    for (errors, resolved) in resolve_sigs_parallel(table, interner, files, &pool) {
        diagnostics.extend(errors);
        signatures.extend(resolved);
    }
    apply_sigs(table, signatures);
    diagnostics
}

fn signature(table: &SymbolTable, method: SymbolId) -> MethodSignature {
    match table[method].as_method().and_then(|data| data.signature.clone()) {
        Some(signature) => signature,
        None => panic!("{method:?} has no signature"),
    }
}

#[test]
fn signature_round_trips_definition_order() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let string = b.class(SymbolId::ROOT, "String");
    let integer = b.class(SymbolId::ROOT, "Integer");
    let store = b.class(SymbolId::ROOT, "Store");
    let fetch = b.method_with_defaults(
        store,
        "fetch",
        &[("key", ParamKind::Positional, false), ("fallback", ParamKind::Keyword, true)],
    );
    let key_ty = b.ty(store, "String");
    let fallback_ty = TypeExpr::Nilable(Box::new(b.ty(store, "Integer")));
    let returns = b.ty(store, "Integer");
    b.sig(fetch, vec![("key", key_ty), ("fallback", fallback_ty)], Some(returns));
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    let expected = MethodSignature {
        params: vec![
            SigParam {
                name: interner.intern("key"),
                kind: ParamKind::Positional,
                has_default: false,
                ty: Type::Class(string),
            },
            SigParam {
                name: interner.intern("fallback"),
                kind: ParamKind::Keyword,
                has_default: true,
                ty: Type::Nilable(Box::new(Type::Class(integer))),
            },
        ],
        returns: Type::Class(integer),
        flags: MethodFlags::empty(),
        visibility: Visibility::Public,
        type_params: Vec::new(),
        is_fallback: false,
    };
    assert_eq!(signature(&table, fetch), expected);
    let on_tree = files[0].methods().next().and_then(|m| m.resolved_sig.clone());
    assert_eq!(on_tree, Some(expected));
    assert_eq!(
        table[fetch].as_method().map(|data| data.signature_state),
        Some(ResolutionState::Resolved)
    );
}

#[test]
fn missing_return_means_void() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let logger = b.class(SymbolId::ROOT, "Logger");
    let flush = b.method(logger, "flush", &[]);
    b.sig(flush, Vec::new(), None);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    assert_eq!(signature(&table, flush).returns, Type::Void);
}

#[test]
fn flags_and_visibility_are_carried() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let base = b.class(SymbolId::ROOT, "Base");
    let hook = b.method(base, "hook", &[]);
    b.visibility(hook, Visibility::Protected);
    if let Some(sig) = b.sig(hook, Vec::new(), Some(TypeExpr::SelfType)) {
        sig.flags = MethodFlags::ABSTRACT | MethodFlags::OVERRIDABLE;
    }
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    let resolved = signature(&table, hook);
    assert_eq!(resolved.flags, MethodFlags::ABSTRACT | MethodFlags::OVERRIDABLE);
    assert_eq!(resolved.visibility, Visibility::Protected);
    assert_eq!(resolved.returns, Type::SelfType);
}

#[test]
fn method_without_sig_is_settled_untyped() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let plain = b.class(SymbolId::ROOT, "Plain");
    let call = b.method(plain, "call", &[("x", ParamKind::Positional)]);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    let data = table[call].as_method().cloned().unwrap_or_default();
    assert_eq!(data.signature, None);
    assert_eq!(data.signature_state, ResolutionState::Resolved);
}

// === Parameter mismatches ===

#[test]
fn missing_parameter_falls_back_to_untyped() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.class(SymbolId::ROOT, "Integer");
    let math = b.module(SymbolId::ROOT, "Math");
    let add = b.method(math, "add", &[("a", ParamKind::Positional), ("b", ParamKind::Positional)]);
    let a_ty = b.ty(math, "Integer");
    b.sig(add, vec![("a", a_ty)], None);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4008"]);
    assert_eq!(
        diagnostics[0].message,
        "signature is missing a type for parameter `b`"
    );
    let resolved = signature(&table, add);
    assert!(resolved.is_fallback);
    assert!(resolved.params.iter().all(|p| p.ty == Type::Untyped));
    assert_eq!(resolved.params.len(), 2);
    assert_eq!(resolved.returns, Type::Untyped);
}

#[test]
fn unknown_parameter_is_reported() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let util = b.module(SymbolId::ROOT, "Util");
    let run = b.method(util, "run", &[]);
    b.sig(run, vec![("ghost", TypeExpr::Untyped)], None);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4008"]);
    assert_eq!(diagnostics[0].message, "unknown parameter `ghost` in signature");
    assert!(signature(&table, run).is_fallback);
}

#[test]
fn out_of_order_parameters_are_reported() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let util = b.module(SymbolId::ROOT, "Util");
    let pair = b.method(util, "pair", &[("left", ParamKind::Positional), ("right", ParamKind::Positional)]);
    b.sig(pair, vec![("right", TypeExpr::Untyped), ("left", TypeExpr::Untyped)], None);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4008"]);
    assert_eq!(diagnostics[0].message, "parameter `right` is out of order in signature");
    assert_eq!(
        diagnostics[0].labels[0].message,
        "expected at position 2, found at 1"
    );
    assert!(signature(&table, pair).is_fallback);
}

#[test]
fn parameter_kind_must_match() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let util = b.module(SymbolId::ROOT, "Util");
    let each = b.method(util, "each", &[("blk", ParamKind::Block)]);
    if let Some(sig) = b.sig(each, vec![("blk", TypeExpr::Untyped)], None) {
        sig.params[0].kind = Some(ParamKind::Positional);
    }
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4008"]);
    assert_eq!(diagnostics[0].message, "parameter `blk` is a block parameter");
    assert_eq!(diagnostics[0].labels[0].message, "signature declares it as positional");
    assert!(signature(&table, each).is_fallback);
}

// === Type expressions ===

#[test]
fn method_type_parameters_must_be_declared() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let util = b.module(SymbolId::ROOT, "Util");
    let identity = b.method(util, "identity", &[("x", ParamKind::Positional)]);
    let t = b.name("T");
    let param_ty = b.type_param_ref("T");
    let return_ty = b.type_param_ref("U");
    if let Some(sig) = b.sig(identity, vec![("x", param_ty)], Some(return_ty)) {
        sig.type_params.push((t, Span::new(0, 1)));
    }
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4009"]);
    let resolved = signature(&table, identity);
    assert!(!resolved.is_fallback);
    assert_eq!(resolved.params[0].ty, Type::MethodTypeParam(t));
    assert_eq!(resolved.returns, Type::Untyped);
    assert_eq!(resolved.type_params, vec![t]);
}

#[test]
fn generic_arguments_are_checked_against_arity() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let integer = b.class(SymbolId::ROOT, "Integer");
    let list = b.module(SymbolId::ROOT, "List");
    b.type_member(list, "Elem", Variance::Covariant);
    let util = b.module(SymbolId::ROOT, "Util");
    let m = b.method(
        util,
        "m",
        &[("ok", ParamKind::Positional), ("extra", ParamKind::Positional), ("plain", ParamKind::Positional)],
    );
    let int_arg = b.ty(util, "Integer");
    let ok = b.generic(util, "List", vec![int_arg]);
    let extra_args = vec![b.ty(util, "Integer"), b.ty(util, "Integer")];
    let extra = b.generic(util, "List", extra_args);
    let plain_arg = b.ty(util, "Integer");
    let plain = b.generic(util, "Integer", vec![plain_arg]);
    b.sig(m, vec![("ok", ok), ("extra", extra), ("plain", plain)], None);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4006", "E4006"]);
    assert_eq!(diagnostics[0].labels[0].message, "expected 1, found 2");
    assert_eq!(diagnostics[1].message, "`Integer` is not generic");
    let resolved = signature(&table, m);
    let applied = Type::Applied {
        class: list,
        args: vec![Type::Class(integer)],
    };
    assert_eq!(resolved.params[0].ty, applied);
    assert_eq!(resolved.params[1].ty, applied);
    assert_eq!(resolved.params[2].ty, Type::Class(integer));
}

#[test]
fn non_type_constants_are_rejected() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    b.value_constant(SymbolId::ROOT, "DEFAULT");
    let util = b.module(SymbolId::ROOT, "Util");
    let m = b.method(util, "m", &[("x", ParamKind::Positional)]);
    let ty = TypeExpr::Union(vec![b.ty(util, "DEFAULT"), b.ty(util, "Util")]);
    b.sig(m, vec![("x", ty)], None);
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert_eq!(codes(&diagnostics), vec!["E4010"]);
    assert_eq!(diagnostics[0].labels[0].message, "`DEFAULT` is a constant");
    assert_eq!(
        signature(&table, m).params[0].ty,
        Type::Union(vec![Type::Untyped, Type::Class(util)])
    );
}

#[test]
fn type_members_resolve_inside_their_class() {
    let interner = StringInterner::new();
    let mut table = SymbolTable::new();
    let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
    let cell = b.class(SymbolId::ROOT, "Cell");
    let value = b.type_member(cell, "Value", Variance::Invariant);
    let get = b.method(cell, "get", &[]);
    let returns = b.ty(cell, "Value");
    b.sig(get, Vec::new(), Some(returns));
    let mut files = vec![b.finish()];

    let diagnostics = resolve_all(&mut table, &interner, &mut files);

    assert!(diagnostics.is_empty());
    assert_eq!(signature(&table, get).returns, Type::TypeMember(value));
}
