//! Global symbol table.
//!
//! One arena for every class, module, method, static field and type member
//! of the session. All cross references are `SymbolId` lookups, so the table
//! can be read from worker threads once structural mutation has finished.
//!
//! # Layout
//!
//! ```text
//! SymbolTable
//! └── symbols: Vec<Symbol>          (indexed by SymbolId)
//!     ├── name / owner / loc
//!     └── data: SymbolData
//!         ├── Class(Namespace) | Module(Namespace)
//!         │     members, methods, superclass, mixins,
//!         │     ancestors + state, singleton/attached,
//!         │     type members, class-method companions
//!         ├── Method(MethodData)        signature + state
//!         ├── StaticField(FieldData)    optional alias resolution
//!         └── TypeMember(TypeMemberData) bound parameter + state
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

use rustc_hash::FxHashMap;

use crate::{Loc, MethodSignature, Name, StringInterner, TypeParam};

/// Stable identity of a symbol.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Root namespace; owner of every top-level constant.
    pub const ROOT: SymbolId = SymbolId(0);
    pub const BASIC_OBJECT: SymbolId = SymbolId(1);
    pub const OBJECT: SymbolId = SymbolId(2);
    pub const MODULE: SymbolId = SymbolId(3);
    pub const CLASS: SymbolId = SymbolId(4);

    /// First id handed out for user symbols.
    pub const FIRST_USER: u32 = 5;

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        SymbolId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sym({})", self.0)
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Class,
    Module,
    Method,
    StaticField,
    TypeMember,
}

impl SymbolKind {
    pub fn is_namespace(self) -> bool {
        matches!(self, SymbolKind::Class | SymbolKind::Module)
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Class => write!(f, "class"),
            SymbolKind::Module => write!(f, "module"),
            SymbolKind::Method => write!(f, "method"),
            SymbolKind::StaticField => write!(f, "constant"),
            SymbolKind::TypeMember => write!(f, "type member"),
        }
    }
}

/// Progress of one resolvable field.
///
/// `Unresolved -> InProgress -> {Resolved, Error}`; the last two are
/// terminal. `InProgress` is only visible during a single resolution attempt.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum ResolutionState {
    #[default]
    Unresolved,
    InProgress,
    Resolved,
    Error,
}

impl ResolutionState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, ResolutionState::Resolved | ResolutionState::Error)
    }
}

/// Binding slot of a constant reference (or of an alias' right-hand side).
///
/// The payload exists only in the `Resolved` state.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum Resolution {
    #[default]
    Unresolved,
    InProgress,
    Resolved(SymbolId),
    Error,
}

impl Resolution {
    pub fn state(self) -> ResolutionState {
        match self {
            Resolution::Unresolved => ResolutionState::Unresolved,
            Resolution::InProgress => ResolutionState::InProgress,
            Resolution::Resolved(_) => ResolutionState::Resolved,
            Resolution::Error => ResolutionState::Error,
        }
    }

    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Resolution::Resolved(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.state().is_terminal()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum MixinKind {
    Include,
    Extend,
    Prepend,
}

impl fmt::Display for MixinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MixinKind::Include => write!(f, "include"),
            MixinKind::Extend => write!(f, "extend"),
            MixinKind::Prepend => write!(f, "prepend"),
        }
    }
}

/// A resolved mixin edge.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Mixin {
    pub kind: MixinKind,
    pub module: SymbolId,
    /// Position among all mixins of the namespace, across reopenings.
    pub order: u32,
}

/// Class or module payload.
#[derive(Clone, Debug, Default)]
pub struct Namespace {
    /// Constants: nested namespaces, static fields, type members.
    pub members: FxHashMap<Name, SymbolId>,
    pub methods: FxHashMap<Name, SymbolId>,
    pub superclass: Option<SymbolId>,
    pub mixins: Vec<Mixin>,
    /// Linearized lookup order, most specific first.
    pub ancestors: Vec<SymbolId>,
    pub ancestors_state: ResolutionState,
    pub singleton: Option<SymbolId>,
    /// For a singleton class, the class it belongs to.
    pub attached: Option<SymbolId>,
    /// Declared type members, in declaration order.
    pub type_members: Vec<SymbolId>,
    /// Modules whose methods are added to the singleton class of any
    /// namespace including this one.
    pub class_method_companions: Vec<SymbolId>,
}

impl Namespace {
    pub fn is_singleton(&self) -> bool {
        self.attached.is_some()
    }

    /// Mixins of one kind, in declaration order.
    pub fn mixins_of(&self, kind: MixinKind) -> impl Iterator<Item = SymbolId> + '_ {
        self.mixins
            .iter()
            .filter(move |m| m.kind == kind)
            .map(|m| m.module)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MethodData {
    pub signature: Option<MethodSignature>,
    pub signature_state: ResolutionState,
}

#[derive(Clone, Debug, Default)]
pub struct FieldData {
    /// `Some` when the field is `A = B`; holds the binding of `B`.
    pub alias: Option<Resolution>,
}

#[derive(Clone, Debug, Default)]
pub struct TypeMemberData {
    pub param: Option<TypeParam>,
    pub state: ResolutionState,
}

#[derive(Clone, Debug)]
pub enum SymbolData {
    Class(Namespace),
    Module(Namespace),
    Method(MethodData),
    StaticField(FieldData),
    TypeMember(TypeMemberData),
}

/// One entry of the table.
#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Name,
    /// Enclosing symbol; the root owns itself.
    pub owner: SymbolId,
    pub loc: Loc,
    pub data: SymbolData,
}

impl Symbol {
    pub fn kind(&self) -> SymbolKind {
        match self.data {
            SymbolData::Class(_) => SymbolKind::Class,
            SymbolData::Module(_) => SymbolKind::Module,
            SymbolData::Method(_) => SymbolKind::Method,
            SymbolData::StaticField(_) => SymbolKind::StaticField,
            SymbolData::TypeMember(_) => SymbolKind::TypeMember,
        }
    }

    pub fn as_namespace(&self) -> Option<&Namespace> {
        match &self.data {
            SymbolData::Class(ns) | SymbolData::Module(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_namespace_mut(&mut self) -> Option<&mut Namespace> {
        match &mut self.data {
            SymbolData::Class(ns) | SymbolData::Module(ns) => Some(ns),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodData> {
        match &self.data {
            SymbolData::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_method_mut(&mut self) -> Option<&mut MethodData> {
        match &mut self.data {
            SymbolData::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_field(&self) -> Option<&FieldData> {
        match &self.data {
            SymbolData::StaticField(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_field_mut(&mut self) -> Option<&mut FieldData> {
        match &mut self.data {
            SymbolData::StaticField(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_type_member(&self) -> Option<&TypeMemberData> {
        match &self.data {
            SymbolData::TypeMember(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_type_member_mut(&mut self) -> Option<&mut TypeMemberData> {
        match &mut self.data {
            SymbolData::TypeMember(t) => Some(t),
            _ => None,
        }
    }

    pub fn is_class(&self) -> bool {
        matches!(self.data, SymbolData::Class(_))
    }

    pub fn is_module(&self) -> bool {
        matches!(self.data, SymbolData::Module(_))
    }
}

/// The session-wide symbol arena.
#[derive(Clone, Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    /// Create a table holding the root namespace and the core hierarchy
    /// `BasicObject <- Object <- Module <- Class`.
    pub fn new() -> Self {
        let mut table = SymbolTable {
            symbols: Vec::with_capacity(64),
        };
        table.push(Name::ROOT, SymbolId::ROOT, SymbolData::Module(Namespace::default()));
        let core = [
            (Name::BASIC_OBJECT, None),
            (Name::OBJECT, Some(SymbolId::BASIC_OBJECT)),
            (Name::MODULE, Some(SymbolId::OBJECT)),
            (Name::CLASS, Some(SymbolId::MODULE)),
        ];
        for (name, superclass) in core {
            let id = table.enter_class(SymbolId::ROOT, name, Loc::NONE);
            if let Some(ns) = table[id].as_namespace_mut() {
                ns.superclass = superclass;
            }
        }
        debug_assert_eq!(table.symbols.len(), SymbolId::FIRST_USER as usize);
        table
    }

    fn push(&mut self, name: Name, owner: SymbolId, data: SymbolData) -> SymbolId {
        let raw = u32::try_from(self.symbols.len())
            .unwrap_or_else(|_| panic!("symbol table exceeded u32::MAX entries"));
        let id = SymbolId(raw);
        self.symbols.push(Symbol {
            name,
            owner,
            loc: Loc::NONE,
            data,
        });
        id
    }

    fn enter_member(
        &mut self,
        owner: SymbolId,
        name: Name,
        loc: Loc,
        make: impl FnOnce() -> SymbolData,
    ) -> SymbolId {
        if let Some(existing) = self.lookup_member(owner, name) {
            return existing;
        }
        let id = self.push(name, owner, make());
        self.symbols[id.index()].loc = loc;
        if let Some(ns) = self.symbols[owner.index()].as_namespace_mut() {
            ns.members.insert(name, id);
        }
        id
    }

    /// Enter (or reopen) a class owned by `owner`.
    pub fn enter_class(&mut self, owner: SymbolId, name: Name, loc: Loc) -> SymbolId {
        self.enter_member(owner, name, loc, || SymbolData::Class(Namespace::default()))
    }

    /// Enter (or reopen) a module owned by `owner`.
    pub fn enter_module(&mut self, owner: SymbolId, name: Name, loc: Loc) -> SymbolId {
        self.enter_member(owner, name, loc, || SymbolData::Module(Namespace::default()))
    }

    pub fn enter_static_field(&mut self, owner: SymbolId, name: Name, loc: Loc) -> SymbolId {
        self.enter_member(owner, name, loc, || {
            SymbolData::StaticField(FieldData::default())
        })
    }

    pub fn enter_type_member(&mut self, owner: SymbolId, name: Name, loc: Loc) -> SymbolId {
        let id = self.enter_member(owner, name, loc, || {
            SymbolData::TypeMember(TypeMemberData::default())
        });
        if let Some(ns) = self.symbols[owner.index()].as_namespace_mut() {
            if !ns.type_members.contains(&id) {
                ns.type_members.push(id);
            }
        }
        id
    }

    /// Enter (or reopen) a method. Methods live apart from constants.
    pub fn enter_method(&mut self, owner: SymbolId, name: Name, loc: Loc) -> SymbolId {
        let existing = self
            .namespace(owner)
            .and_then(|ns| ns.methods.get(&name).copied());
        if let Some(existing) = existing {
            return existing;
        }
        let id = self.push(name, owner, SymbolData::Method(MethodData::default()));
        self.symbols[id.index()].loc = loc;
        if let Some(ns) = self.symbols[owner.index()].as_namespace_mut() {
            ns.methods.insert(name, id);
        }
        id
    }

    /// Singleton class of `attached`, created on first request.
    pub fn enter_singleton(&mut self, attached: SymbolId, singleton_name: Name) -> SymbolId {
        if let Some(existing) = self.namespace(attached).and_then(|ns| ns.singleton) {
            return existing;
        }
        let owner = self[attached].owner;
        let loc = self[attached].loc;
        let id = self.push(
            singleton_name,
            owner,
            SymbolData::Class(Namespace {
                attached: Some(attached),
                ..Namespace::default()
            }),
        );
        self.symbols[id.index()].loc = loc;
        if let Some(ns) = self.symbols[attached.index()].as_namespace_mut() {
            ns.singleton = Some(id);
        }
        id
    }

    pub fn lookup_member(&self, scope: SymbolId, name: Name) -> Option<SymbolId> {
        self.namespace(scope)
            .and_then(|ns| ns.members.get(&name).copied())
    }

    #[inline]
    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    #[inline]
    pub fn contains(&self, id: SymbolId) -> bool {
        id.index() < self.symbols.len()
    }

    pub fn namespace(&self, id: SymbolId) -> Option<&Namespace> {
        self.get(id).and_then(Symbol::as_namespace)
    }

    pub fn namespace_mut(&mut self, id: SymbolId) -> Option<&mut Namespace> {
        self.symbols
            .get_mut(id.index())
            .and_then(Symbol::as_namespace_mut)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SymbolId> {
        (0..self.symbols.len()).map(|i| SymbolId(i as u32))
    }

    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.ids().zip(self.symbols.iter())
    }

    /// Ids of every class and module, in allocation order.
    pub fn namespace_ids(&self) -> Vec<SymbolId> {
        self.iter()
            .filter(|(_, sym)| sym.as_namespace().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// `A::B::C`; top-level symbols print without the root.
    pub fn full_name(&self, id: SymbolId, interner: &StringInterner) -> String {
        if id == SymbolId::ROOT {
            return interner.lookup(Name::ROOT).to_owned();
        }
        let mut parts = Vec::new();
        let mut current = id;
        while current != SymbolId::ROOT {
            let Some(sym) = self.get(current) else {
                break;
            };
            parts.push(interner.lookup(sym.name));
            if sym.owner == current {
                break;
            }
            current = sym.owner;
        }
        parts.reverse();
        parts.join("::")
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<SymbolId> for SymbolTable {
    type Output = Symbol;

    #[inline]
    fn index(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }
}

impl IndexMut<SymbolId> for SymbolTable {
    #[inline]
    fn index_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }
}

#[cfg(test)]
mod tests;
