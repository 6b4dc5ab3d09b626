//! Diagnostic constructors for resolution errors.
//!
//! Every user-facing report the resolver emits is built here so codes and
//! wording stay consistent across phases.

use strata_diagnostic::{Diagnostic, ErrorCode};
use strata_ir::{ConstantRef, Loc, MixinKind, StringInterner, SymbolKind, Variance};

/// Source text of a constant path, e.g. `::A::B`.
pub(crate) fn constant_text(interner: &StringInterner, constant: &ConstantRef) -> String {
    let joined = constant
        .path
        .iter()
        .map(|&name| interner.lookup(name))
        .collect::<Vec<_>>()
        .join("::");
    if constant.rooted {
        format!("::{joined}")
    } else {
        joined
    }
}

/// `Unable to resolve constant` for a path whose segment is missing.
pub(crate) fn undefined_constant(loc: Loc, path: &str, missing: &str, scope: Option<&str>) -> Diagnostic {
    let diag = Diagnostic::error(ErrorCode::E4001)
        .with_message(format!("unable to resolve constant `{path}`"));
    match scope {
        Some(scope) => diag.with_label(loc, format!("`{scope}` has no constant `{missing}`")),
        None => diag.with_label(loc, "not found in any enclosing scope"),
    }
}

/// An alias chain that can never settle because it ends in a cycle.
pub(crate) fn unresolvable_alias(loc: Loc, path: &str, alias: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4001)
        .with_message(format!("unable to resolve constant `{path}`"))
        .with_label(loc, format!("`{alias}` never resolves to a definition"))
}

pub(crate) fn cyclic_constant(loc: Loc, path: &str, cycle: &[String]) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4002)
        .with_message(format!("cyclic definition of constant `{path}`"))
        .with_label(loc, "this reference depends on itself")
        .with_note(format!("cycle: {}", cycle.join(" -> ")))
}

pub(crate) fn cyclic_hierarchy(loc: Loc, name: &str, cycle: &[String]) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4003)
        .with_message(format!("`{name}` is its own ancestor"))
        .with_label(loc, "cyclic class hierarchy")
        .with_note(format!("cycle: {}", cycle.join(" -> ")))
}

pub(crate) fn superclass_not_class(loc: Loc, class: &str, target: &str, kind: SymbolKind) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4004)
        .with_message(format!("superclass of `{class}` must be a class"))
        .with_label(loc, format!("`{target}` is a {kind}"))
}

pub(crate) fn module_with_superclass(loc: Loc, module: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4004)
        .with_message(format!("module `{module}` cannot declare a superclass"))
        .with_label(loc, "only classes have superclasses")
}

pub(crate) fn mixin_not_module(loc: Loc, kind: MixinKind, target: &str, found: SymbolKind) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4005)
        .with_message(format!("only modules can be used with `{kind}`"))
        .with_label(loc, format!("`{target}` is a {found}"))
}

pub(crate) fn parent_mismatch(loc: Loc, class: &str, declared: &str, previous: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4013)
        .with_message(format!("parent of class `{class}` redefined"))
        .with_label(loc, format!("declared here as `{declared}`"))
        .with_note(format!("previously declared as `{previous}`"))
}

pub(crate) fn generic_arity(loc: Loc, generic: &str, expected: usize, found: usize) -> Diagnostic {
    let message = if expected == 0 {
        format!("`{generic}` is not generic")
    } else {
        format!("wrong number of type arguments for `{generic}`")
    };
    Diagnostic::error(ErrorCode::E4006)
        .with_message(message)
        .with_label(loc, format!("expected {expected}, found {found}"))
}

pub(crate) fn variance_on_class(loc: Loc, member: &str, variance: Variance) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4007)
        .with_message(format!("classes can only have invariant type members; `{member}` is {variance}"))
        .with_label(loc, "declared here")
        .with_suggestion("variance is only allowed on type members of modules")
}

pub(crate) fn missing_type_member(loc: Loc, class: &str, member: &str, parent: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4012)
        .with_message(format!("type member `{member}` of `{parent}` must be redeclared in `{class}`"))
        .with_label(loc, format!("`{class}` is declared here"))
}

pub(crate) fn sig_param_missing(loc: Loc, param: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4008)
        .with_message(format!("signature is missing a type for parameter `{param}`"))
        .with_label(loc, "in this signature")
}

pub(crate) fn sig_param_unknown(loc: Loc, param: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4008)
        .with_message(format!("unknown parameter `{param}` in signature"))
        .with_label(loc, "the method has no such parameter")
}

pub(crate) fn sig_param_order(loc: Loc, param: &str, expected: usize, found: usize) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4008)
        .with_message(format!("parameter `{param}` is out of order in signature"))
        .with_label(loc, format!("expected at position {expected}, found at {found}"))
}

pub(crate) fn sig_param_kind(
    loc: Loc,
    param: &str,
    declared: impl std::fmt::Display,
    signature: impl std::fmt::Display,
) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4008)
        .with_message(format!("parameter `{param}` is a {declared} parameter"))
        .with_label(loc, format!("signature declares it as {signature}"))
}

pub(crate) fn unknown_type_param(loc: Loc, name: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4009)
        .with_message(format!("unknown type parameter `{name}`"))
        .with_label(loc, "not declared with `type_parameters`")
}

pub(crate) fn not_a_type(loc: Loc, name: &str, kind: SymbolKind) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4010)
        .with_message(format!("constant `{name}` is not a type"))
        .with_label(loc, format!("`{name}` is a {kind}"))
}

pub(crate) fn companion_in_class(loc: Loc, class: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4011)
        .with_message("`mixes_in_class_methods` can only be declared inside a module")
        .with_label(loc, format!("`{class}` is a class"))
}

pub(crate) fn companion_not_module(loc: Loc, target: &str, kind: SymbolKind) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4011)
        .with_message("argument to `mixes_in_class_methods` must be a module")
        .with_label(loc, format!("`{target}` is a {kind}"))
}

pub(crate) fn companion_is_self(loc: Loc, module: &str) -> Diagnostic {
    Diagnostic::error(ErrorCode::E4011)
        .with_message(format!("`{module}` cannot name itself in `mixes_in_class_methods`"))
        .with_label(loc, "refers to the enclosing module")
}
