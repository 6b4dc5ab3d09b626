//! Per-file named trees.
//!
//! The namer hands the resolver one `ParsedFile` per source file. Declarations
//! are stored flat, in source order; nesting is expressed through the owning
//! `SymbolId` of each declaration. Every constant reference of the file lives
//! in the file's constant arena and is addressed by `ConstRefId`, so
//! whole-program passes can bind references without walking the tree.

use smallvec::SmallVec;

use crate::{
    FileId, MethodFlags, MethodSignature, Name, ParamKind, Resolution, Span, SymbolId, TypeParam,
    Variance, Visibility,
};

/// Index of a constant reference within its file.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(transparent)]
pub struct ConstRefId(u32);

impl ConstRefId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ConstRefId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// A literal constant path, e.g. `A::B` or `::A::B`.
#[derive(Clone, Debug)]
pub struct ConstantRef {
    /// Innermost lexical scope the reference appears in.
    pub scope: SymbolId,
    pub path: SmallVec<[Name; 2]>,
    /// Written with a leading `::`.
    pub rooted: bool,
    pub span: Span,
    pub resolution: Resolution,
}

/// An unresolved type expression from a signature or bound.
#[derive(Clone, Debug)]
pub enum TypeExpr {
    Constant(ConstRefId),
    /// `Base[Arg, ...]`
    Generic {
        base: ConstRefId,
        args: Vec<TypeExpr>,
        span: Span,
    },
    Nilable(Box<TypeExpr>),
    Union(Vec<TypeExpr>),
    /// Reference to a method type parameter by name.
    TypeParam { name: Name, span: Span },
    SelfType,
    Untyped,
}

/// A parameter as written in the method definition.
#[derive(Clone, Debug)]
pub struct ParamDecl {
    pub name: Name,
    pub kind: ParamKind,
    pub has_default: bool,
    pub span: Span,
}

/// A parameter as written in the signature block.
#[derive(Clone, Debug)]
pub struct SigParamDecl {
    pub name: Name,
    pub ty: TypeExpr,
    /// Kind implied by the signature form (`T.proc` for blocks, splats);
    /// `None` accepts whatever the definition declares.
    pub kind: Option<ParamKind>,
    pub span: Span,
}

/// A structured signature block attached to a method definition.
#[derive(Clone, Debug)]
pub struct SigDecl {
    pub span: Span,
    pub params: Vec<SigParamDecl>,
    /// `None` means the method returns `void`.
    pub returns: Option<TypeExpr>,
    pub flags: MethodFlags,
    /// Names introduced with `type_parameters(...)`.
    pub type_params: Vec<(Name, Span)>,
}

#[derive(Clone, Debug)]
pub struct MixinDecl {
    pub kind: crate::MixinKind,
    pub target: ConstRefId,
}

/// `class Foo < Bar` / `module Foo`, one per opening.
#[derive(Clone, Debug)]
pub struct NamespaceDecl {
    pub symbol: SymbolId,
    pub span: Span,
    pub superclass: Option<ConstRefId>,
    pub mixins: Vec<MixinDecl>,
    /// Companion modules named by `mixes_in_class_methods`.
    pub class_method_companions: Vec<ConstRefId>,
}

#[derive(Clone, Debug)]
pub struct MethodDecl {
    pub symbol: SymbolId,
    pub span: Span,
    pub params: Vec<ParamDecl>,
    pub visibility: Visibility,
    pub sig: Option<SigDecl>,
    /// Tree-local copy of the signature produced for this definition.
    pub resolved_sig: Option<MethodSignature>,
}

/// `Name = ...` at namespace level.
#[derive(Clone, Debug)]
pub struct ConstantAssignDecl {
    pub symbol: SymbolId,
    pub span: Span,
    /// Right-hand side when it is a bare constant path.
    pub alias_of: Option<ConstRefId>,
}

/// `Elem = type_member(:out, upper: Comparable)`
#[derive(Clone, Debug)]
pub struct TypeMemberDecl {
    pub symbol: SymbolId,
    pub owner: SymbolId,
    pub span: Span,
    pub variance: Variance,
    pub lower: Option<TypeExpr>,
    pub upper: Option<TypeExpr>,
    /// Tree-local copy of the bound parameter.
    pub resolved: Option<TypeParam>,
}

#[derive(Clone, Debug)]
pub enum Decl {
    Namespace(NamespaceDecl),
    Method(MethodDecl),
    ConstantAssign(ConstantAssignDecl),
    TypeMember(TypeMemberDecl),
}

/// One source file after naming.
#[derive(Clone, Debug)]
pub struct ParsedFile {
    pub file: FileId,
    pub path: String,
    pub decls: Vec<Decl>,
    constants: Vec<ConstantRef>,
}

impl ParsedFile {
    pub fn new(file: FileId, path: impl Into<String>) -> Self {
        ParsedFile {
            file,
            path: path.into(),
            decls: Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn push_constant(&mut self, constant: ConstantRef) -> ConstRefId {
        let raw = u32::try_from(self.constants.len())
            .unwrap_or_else(|_| panic!("constant arena exceeded u32::MAX entries"));
        self.constants.push(constant);
        ConstRefId(raw)
    }

    #[inline]
    pub fn constant(&self, id: ConstRefId) -> &ConstantRef {
        &self.constants[id.index()]
    }

    #[inline]
    pub fn constant_mut(&mut self, id: ConstRefId) -> &mut ConstantRef {
        &mut self.constants[id.index()]
    }

    pub fn constants(&self) -> impl Iterator<Item = (ConstRefId, &ConstantRef)> {
        (0u32..).map(ConstRefId).zip(self.constants.iter())
    }

    pub fn constants_mut(&mut self) -> impl Iterator<Item = (ConstRefId, &mut ConstantRef)> {
        (0u32..).map(ConstRefId).zip(self.constants.iter_mut())
    }

    pub fn constant_count(&self) -> usize {
        self.constants.len()
    }

    /// Resolution of a reference, `None` unless it is bound to a symbol.
    pub fn resolved(&self, id: ConstRefId) -> Option<SymbolId> {
        self.constant(id).resolution.symbol()
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn namespaces(&self) -> impl Iterator<Item = &NamespaceDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Namespace(ns) => Some(ns),
            _ => None,
        })
    }

    pub fn type_members(&self) -> impl Iterator<Item = &TypeMemberDecl> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::TypeMember(tm) => Some(tm),
            _ => None,
        })
    }
}
