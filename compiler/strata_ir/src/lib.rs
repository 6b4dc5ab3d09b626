//! Strata IR - shared data model of the resolver
//!
//! This crate contains the structures the resolution stage consumes and
//! produces:
//! - Spans and file-qualified locations
//! - Names for interned identifiers
//! - The global `SymbolTable` arena
//! - Per-file named trees (`ParsedFile`) with their constant references
//! - Resolved types, type parameters and method signatures
//! - `TreeBuilder`, the programmatic stand-in for the namer
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → Name(u32)
//! - **Index Everything**: symbols are `SymbolId(u32)`, constant references
//!   are `ConstRefId(u32)`; nothing embeds ownership of another symbol
//! - **Tagged States**: every resolvable slot carries an explicit
//!   `Resolution`, so unresolved and resolved payloads never share a shape

mod builder;
mod interner;
mod name;
mod span;
mod symbols;
mod tree;
mod types;

pub use builder::TreeBuilder;
pub use interner::StringInterner;
pub use name::Name;
pub use span::{FileId, Loc, Span};
pub use symbols::{
    FieldData, MethodData, Mixin, MixinKind, Namespace, Resolution, ResolutionState, Symbol,
    SymbolData, SymbolId, SymbolKind, SymbolTable, TypeMemberData,
};
pub use tree::{
    ConstRefId, ConstantAssignDecl, ConstantRef, Decl, MethodDecl, MixinDecl, NamespaceDecl,
    ParamDecl, ParsedFile, SigDecl, SigParamDecl, TypeExpr, TypeMemberDecl,
};
pub use types::{
    MethodFlags, MethodSignature, ParamKind, SigParam, Type, TypeParam, Variance, Visibility,
};
