//! Type expression resolution.
//!
//! Shared by bound resolution and signature resolution. Works on a frozen
//! table and a single file, so it is safe on worker threads. Constant
//! references inside the expression were bound by constant resolution; this
//! only classifies what they point at.

use strata_diagnostic::Diagnostic;
use strata_ir::{
    ConstRefId, Loc, Name, ParsedFile, Resolution, StringInterner, SymbolId, SymbolKind,
    SymbolTable, Type, TypeExpr,
};

use crate::report;

pub(crate) struct TypeExprResolver<'a> {
    pub table: &'a SymbolTable,
    pub interner: &'a StringInterner,
    pub file: &'a ParsedFile,
    /// Type parameters declared by the enclosing signature.
    pub method_type_params: &'a [Name],
    pub diagnostics: &'a mut Vec<Diagnostic>,
}

impl TypeExprResolver<'_> {
    /// Resolve `expr`. `None` means it could not be used and a report was
    /// made (or an earlier phase already made one). Failed components of a
    /// composite become `Untyped`.
    pub fn resolve(&mut self, expr: &TypeExpr) -> Option<Type> {
        match expr {
            TypeExpr::Constant(reference) => self.constant(*reference),
            TypeExpr::Generic { base, args, span } => {
                let loc = Loc::new(self.file.file, *span);
                self.generic(*base, args, loc)
            }
            TypeExpr::Nilable(inner) => {
                let inner = self.resolve_or_untyped(inner);
                Some(Type::Nilable(Box::new(inner)))
            }
            TypeExpr::Union(members) => {
                let members = members.iter().map(|m| self.resolve_or_untyped(m)).collect();
                Some(Type::Union(members))
            }
            TypeExpr::TypeParam { name, span } => {
                if self.method_type_params.contains(name) {
                    Some(Type::MethodTypeParam(*name))
                } else {
                    let loc = Loc::new(self.file.file, *span);
                    let diag = report::unknown_type_param(loc, self.interner.lookup(*name));
                    self.diagnostics.push(diag);
                    None
                }
            }
            TypeExpr::SelfType => Some(Type::SelfType),
            TypeExpr::Untyped => Some(Type::Untyped),
        }
    }

    pub fn resolve_or_untyped(&mut self, expr: &TypeExpr) -> Type {
        self.resolve(expr).unwrap_or(Type::Untyped)
    }

    /// The symbol a reference names, if it names a usable type.
    fn type_symbol(&mut self, reference: ConstRefId) -> Option<(SymbolId, SymbolKind)> {
        let constant = self.file.constant(reference);
        let Resolution::Resolved(target) = constant.resolution else {
            return None;
        };
        let symbol = self.table.get(target)?;
        let kind = symbol.kind();
        let usable = match kind {
            SymbolKind::Class | SymbolKind::Module => {
                symbol.as_namespace().is_some_and(|ns| !ns.is_singleton()) && target != SymbolId::ROOT
            }
            SymbolKind::TypeMember => true,
            SymbolKind::Method | SymbolKind::StaticField => false,
        };
        if usable {
            return Some((target, kind));
        }
        let loc = Loc::new(self.file.file, constant.span);
        let name = report::constant_text(self.interner, constant);
        self.diagnostics.push(report::not_a_type(loc, &name, kind));
        None
    }

    fn constant(&mut self, reference: ConstRefId) -> Option<Type> {
        let (target, kind) = self.type_symbol(reference)?;
        Some(match kind {
            SymbolKind::TypeMember => Type::TypeMember(target),
            _ => Type::Class(target),
        })
    }

    fn generic(&mut self, base: ConstRefId, args: &[TypeExpr], loc: Loc) -> Option<Type> {
        let (class, kind) = self.type_symbol(base)?;
        let args: Vec<Type> = args.iter().map(|arg| self.resolve_or_untyped(arg)).collect();
        if kind == SymbolKind::TypeMember {
            let name = self.table.full_name(class, self.interner);
            self.diagnostics.push(report::generic_arity(loc, &name, 0, args.len()));
            return Some(Type::TypeMember(class));
        }

        let arity = generic_arity(self.table, class);
        if arity == 0 {
            let name = self.table.full_name(class, self.interner);
            self.diagnostics.push(report::generic_arity(loc, &name, 0, args.len()));
            return Some(Type::Class(class));
        }
        let args = if args.len() == arity {
            args
        } else {
            let name = self.table.full_name(class, self.interner);
            self.diagnostics
                .push(report::generic_arity(loc, &name, arity, args.len()));
            fit_arity(args, arity)
        };
        Some(Type::Applied { class, args })
    }
}

/// Number of type members a generic class or module declares.
pub(crate) fn generic_arity(table: &SymbolTable, class: SymbolId) -> usize {
    table.namespace(class).map_or(0, |ns| ns.type_members.len())
}

/// Truncate or pad with `Untyped` so downstream phases see the declared arity.
fn fit_arity(mut args: Vec<Type>, arity: usize) -> Vec<Type> {
    args.resize(arity, Type::Untyped);
    args
}
