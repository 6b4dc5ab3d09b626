//! Resolved type vocabulary.
//!
//! These are the shapes signature and type-parameter resolution produce. They
//! only ever reference symbols by `SymbolId`, never by embedded ownership.

use bitflags::bitflags;

use crate::{Name, SymbolId};

/// A resolved type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum Type {
    /// Instances of a class or module.
    Class(SymbolId),
    /// A generic class applied to arguments, e.g. `Box[Integer]`.
    Applied { class: SymbolId, args: Vec<Type> },
    /// A type member of the enclosing generic class.
    TypeMember(SymbolId),
    /// A method-level type parameter, named by the signature.
    MethodTypeParam(Name),
    Union(Vec<Type>),
    /// `T | nil`.
    Nilable(Box<Type>),
    /// The receiver type.
    SelfType,
    /// The return type of a method whose result is discarded.
    Void,
    /// Opt-out of checking.
    Untyped,
    /// Supertype of everything. Default upper bound.
    Top,
    /// Subtype of everything. Default lower bound.
    Bottom,
}

impl Type {
    pub fn is_untyped(&self) -> bool {
        matches!(self, Type::Untyped)
    }
}

/// Declared variance of a type parameter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Variance {
    #[default]
    Invariant,
    Covariant,
    Contravariant,
}

impl std::fmt::Display for Variance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variance::Invariant => write!(f, "invariant"),
            Variance::Covariant => write!(f, "covariant"),
            Variance::Contravariant => write!(f, "contravariant"),
        }
    }
}

/// A bound type parameter (class type member).
///
/// Attached to the `TypeMember` symbol by the type-parameter binder and
/// immutable afterwards.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct TypeParam {
    pub name: Name,
    pub variance: Variance,
    /// Generic class or module that declares this parameter.
    pub owner: SymbolId,
    pub lower: Type,
    pub upper: Type,
}

impl TypeParam {
    /// An unconstrained parameter.
    pub fn unbounded(name: Name, variance: Variance, owner: SymbolId) -> Self {
        TypeParam {
            name,
            variance,
            owner,
            lower: Type::Bottom,
            upper: Type::Top,
        }
    }
}

/// How an argument is passed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParamKind {
    Positional,
    Keyword,
    /// `*rest`
    RestPositional,
    /// `**opts`
    RestKeyword,
    Block,
}

impl std::fmt::Display for ParamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParamKind::Positional => write!(f, "positional"),
            ParamKind::Keyword => write!(f, "keyword"),
            ParamKind::RestPositional => write!(f, "rest"),
            ParamKind::RestKeyword => write!(f, "keyword rest"),
            ParamKind::Block => write!(f, "block"),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

bitflags! {
    /// Modifiers declared on a signature.
    ///
    /// Recorded as written; consistency between parent and child methods is
    /// checked by a later phase.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct MethodFlags: u8 {
        const ABSTRACT = 1 << 0;
        const OVERRIDABLE = 1 << 1;
        const OVERRIDE = 1 << 2;
        const FINAL = 1 << 3;
    }
}

/// One parameter of a resolved signature.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct SigParam {
    pub name: Name,
    pub kind: ParamKind,
    pub has_default: bool,
    pub ty: Type,
}

/// A method's resolved contract.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MethodSignature {
    pub params: Vec<SigParam>,
    pub returns: Type,
    pub flags: MethodFlags,
    pub visibility: Visibility,
    pub type_params: Vec<Name>,
    /// Synthesized because the declared signature could not be used.
    pub is_fallback: bool,
}

impl MethodSignature {
    /// Signature accepting anything, built from the method's own parameters.
    pub fn untyped(
        params: impl IntoIterator<Item = (Name, ParamKind, bool)>,
        visibility: Visibility,
    ) -> Self {
        MethodSignature {
            params: params
                .into_iter()
                .map(|(name, kind, has_default)| SigParam {
                    name,
                    kind,
                    has_default,
                    ty: Type::Untyped,
                })
                .collect(),
            returns: Type::Untyped,
            flags: MethodFlags::empty(),
            visibility,
            type_params: Vec::new(),
            is_fallback: true,
        }
    }
}
