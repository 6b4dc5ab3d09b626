//! Programmatic construction of named trees.
//!
//! `TreeBuilder` does the namer's job for one file: it allocates symbols in
//! the shared table and appends the matching declaration nodes, with
//! monotonically increasing spans so declaration order equals source order.
//!
//! ```text
//! let mut b = TreeBuilder::new(&mut table, &interner, FileId::new(0), "a.rb");
//! let m = b.module(SymbolId::ROOT, "M");
//! let c = b.class(SymbolId::ROOT, "C");
//! b.include(c, "M");
//! let file = b.finish();
//! ```

use smallvec::SmallVec;

use crate::{
    ConstRefId, ConstantAssignDecl, ConstantRef, Decl, FileId, Loc, MethodDecl, MethodFlags,
    MixinDecl, MixinKind, Name, NamespaceDecl, ParamDecl, ParamKind, ParsedFile, Resolution,
    SigDecl, SigParamDecl, Span, StringInterner, SymbolId, SymbolTable, TypeExpr, TypeMemberDecl,
    Variance, Visibility,
};

/// Width given to every synthesized span.
const SPAN_WIDTH: u32 = 4;

pub struct TreeBuilder<'a> {
    table: &'a mut SymbolTable,
    interner: &'a StringInterner,
    file: ParsedFile,
    cursor: u32,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(
        table: &'a mut SymbolTable,
        interner: &'a StringInterner,
        file: FileId,
        path: impl Into<String>,
    ) -> Self {
        TreeBuilder {
            table,
            interner,
            file: ParsedFile::new(file, path),
            cursor: 0,
        }
    }

    fn next_span(&mut self) -> Span {
        let span = Span::new(self.cursor, self.cursor + SPAN_WIDTH);
        self.cursor += SPAN_WIDTH + 1;
        span
    }

    fn loc(&self, span: Span) -> Loc {
        Loc::new(self.file.file, span)
    }

    pub fn name(&self, text: &str) -> Name {
        self.interner.intern(text)
    }

    pub fn table(&self) -> &SymbolTable {
        self.table
    }

    /// Open (or reopen) a class.
    pub fn class(&mut self, scope: SymbolId, name: &str) -> SymbolId {
        let span = self.next_span();
        let (name, loc) = (self.interner.intern(name), self.loc(span));
        let id = self.table.enter_class(scope, name, loc);
        self.open_namespace(id, span);
        id
    }

    /// Open (or reopen) a module.
    pub fn module(&mut self, scope: SymbolId, name: &str) -> SymbolId {
        let span = self.next_span();
        let (name, loc) = (self.interner.intern(name), self.loc(span));
        let id = self.table.enter_module(scope, name, loc);
        self.open_namespace(id, span);
        id
    }

    fn open_namespace(&mut self, symbol: SymbolId, span: Span) {
        self.file.decls.push(Decl::Namespace(NamespaceDecl {
            symbol,
            span,
            superclass: None,
            mixins: Vec::new(),
            class_method_companions: Vec::new(),
        }));
    }

    /// Most recent opening of `symbol` in this file.
    fn namespace_decl(&mut self, symbol: SymbolId) -> Option<&mut NamespaceDecl> {
        self.file.decls.iter_mut().rev().find_map(|decl| match decl {
            Decl::Namespace(ns) if ns.symbol == symbol => Some(ns),
            _ => None,
        })
    }

    /// `class <symbol> < <path>`; the path is resolved in the class' owner.
    pub fn superclass(&mut self, class: SymbolId, path: &str) -> ConstRefId {
        let owner = self.table[class].owner;
        let target = self.constant(owner, path);
        if let Some(ns) = self.namespace_decl(class) {
            ns.superclass = Some(target);
        }
        target
    }

    pub fn include(&mut self, namespace: SymbolId, path: &str) -> ConstRefId {
        self.mixin(namespace, MixinKind::Include, path)
    }

    pub fn extend(&mut self, namespace: SymbolId, path: &str) -> ConstRefId {
        self.mixin(namespace, MixinKind::Extend, path)
    }

    pub fn prepend(&mut self, namespace: SymbolId, path: &str) -> ConstRefId {
        self.mixin(namespace, MixinKind::Prepend, path)
    }

    fn mixin(&mut self, namespace: SymbolId, kind: MixinKind, path: &str) -> ConstRefId {
        let target = self.constant(namespace, path);
        if let Some(ns) = self.namespace_decl(namespace) {
            ns.mixins.push(MixinDecl { kind, target });
        }
        target
    }

    /// `mixes_in_class_methods(<path>)` inside `namespace`.
    pub fn mixes_in_class_methods(&mut self, namespace: SymbolId, path: &str) -> ConstRefId {
        let target = self.constant(namespace, path);
        if let Some(ns) = self.namespace_decl(namespace) {
            ns.class_method_companions.push(target);
        }
        target
    }

    /// `Name = Target::Path`
    pub fn alias(&mut self, scope: SymbolId, name: &str, target: &str) -> SymbolId {
        let span = self.next_span();
        let (name, loc) = (self.interner.intern(name), self.loc(span));
        let id = self.table.enter_static_field(scope, name, loc);
        if let Some(field) = self.table[id].as_field_mut() {
            field.alias = Some(Resolution::Unresolved);
        }
        let rhs = self.constant(scope, target);
        self.file.decls.push(Decl::ConstantAssign(ConstantAssignDecl {
            symbol: id,
            span,
            alias_of: Some(rhs),
        }));
        id
    }

    /// `Name = <some value>`
    pub fn value_constant(&mut self, scope: SymbolId, name: &str) -> SymbolId {
        let span = self.next_span();
        let (name, loc) = (self.interner.intern(name), self.loc(span));
        let id = self.table.enter_static_field(scope, name, loc);
        self.file.decls.push(Decl::ConstantAssign(ConstantAssignDecl {
            symbol: id,
            span,
            alias_of: None,
        }));
        id
    }

    /// `Name = type_member(variance)`
    pub fn type_member(&mut self, owner: SymbolId, name: &str, variance: Variance) -> SymbolId {
        let span = self.next_span();
        let (name, loc) = (self.interner.intern(name), self.loc(span));
        let id = self.table.enter_type_member(owner, name, loc);
        self.file.decls.push(Decl::TypeMember(TypeMemberDecl {
            symbol: id,
            owner,
            span,
            variance,
            lower: None,
            upper: None,
            resolved: None,
        }));
        id
    }

    /// Attach bounds to the most recent declaration of a type member.
    pub fn type_member_bounds(
        &mut self,
        member: SymbolId,
        lower: Option<TypeExpr>,
        upper: Option<TypeExpr>,
    ) {
        let decl = self.file.decls.iter_mut().rev().find_map(|decl| match decl {
            Decl::TypeMember(tm) if tm.symbol == member => Some(tm),
            _ => None,
        });
        if let Some(decl) = decl {
            decl.lower = lower;
            decl.upper = upper;
        }
    }

    /// `def name(params)`
    pub fn method(&mut self, scope: SymbolId, name: &str, params: &[(&str, ParamKind)]) -> SymbolId {
        let params = params
            .iter()
            .map(|&(param, kind)| (param, kind, false))
            .collect::<Vec<_>>();
        self.method_with_defaults(scope, name, &params)
    }

    /// `def name(params)` where each parameter states whether it has a default.
    pub fn method_with_defaults(
        &mut self,
        scope: SymbolId,
        name: &str,
        params: &[(&str, ParamKind, bool)],
    ) -> SymbolId {
        let span = self.next_span();
        let (name, loc) = (self.interner.intern(name), self.loc(span));
        let id = self.table.enter_method(scope, name, loc);
        let params = params
            .iter()
            .map(|&(param, kind, has_default)| ParamDecl {
                name: self.interner.intern(param),
                kind,
                has_default,
                span,
            })
            .collect();
        self.file.decls.push(Decl::Method(MethodDecl {
            symbol: id,
            span,
            params,
            visibility: Visibility::Public,
            sig: None,
            resolved_sig: None,
        }));
        id
    }

    fn method_decl(&mut self, method: SymbolId) -> Option<&mut MethodDecl> {
        self.file.decls.iter_mut().rev().find_map(|decl| match decl {
            Decl::Method(m) if m.symbol == method => Some(m),
            _ => None,
        })
    }

    pub fn visibility(&mut self, method: SymbolId, visibility: Visibility) {
        if let Some(decl) = self.method_decl(method) {
            decl.visibility = visibility;
        }
    }

    /// Attach `sig { params(...).returns(...) }` to the latest definition of
    /// `method`. `returns: None` means `void`.
    pub fn sig(
        &mut self,
        method: SymbolId,
        params: Vec<(&str, TypeExpr)>,
        returns: Option<TypeExpr>,
    ) -> Option<&mut SigDecl> {
        let span = self.next_span();
        let params = params
            .into_iter()
            .map(|(name, ty)| SigParamDecl {
                name: self.interner.intern(name),
                ty,
                kind: None,
                span,
            })
            .collect();
        let decl = self.method_decl(method)?;
        decl.sig = Some(SigDecl {
            span,
            params,
            returns,
            flags: MethodFlags::empty(),
            type_params: Vec::new(),
        });
        decl.sig.as_mut()
    }

    /// A bare constant reference appearing in `scope`.
    pub fn constant(&mut self, scope: SymbolId, path: &str) -> ConstRefId {
        let span = self.next_span();
        let (rooted, segments) = match path.strip_prefix("::") {
            Some(rest) => (true, rest),
            None => (false, path),
        };
        let path: SmallVec<[Name; 2]> = segments
            .split("::")
            .map(|segment| self.interner.intern(segment))
            .collect();
        self.file.push_constant(ConstantRef {
            scope,
            path,
            rooted,
            span,
            resolution: Resolution::Unresolved,
        })
    }

    /// Type expression naming a constant.
    pub fn ty(&mut self, scope: SymbolId, path: &str) -> TypeExpr {
        TypeExpr::Constant(self.constant(scope, path))
    }

    /// `Base[args...]`
    pub fn generic(&mut self, scope: SymbolId, base: &str, args: Vec<TypeExpr>) -> TypeExpr {
        let base = self.constant(scope, base);
        let span = self.file.constant(base).span;
        TypeExpr::Generic { base, args, span }
    }

    /// `T.type_parameter(:name)`
    pub fn type_param_ref(&mut self, name: &str) -> TypeExpr {
        let span = self.next_span();
        TypeExpr::TypeParam {
            name: self.interner.intern(name),
            span,
        }
    }

    pub fn finish(self) -> ParsedFile {
        self.file
    }
}
