//! Symbol finalization.
//!
//! Completes the structural shape of the table before linearization:
//! default superclasses, one singleton class per class or module, singleton
//! superclasses, and `extend` edges moved onto the singleton.
//!
//! ```text
//! class Foo < Bar            <Class:Foo>  superclass <Class:Bar>
//! class BasicObject          <Class:BasicObject> superclass Class
//! module M                   <Class:M>    superclass Module
//! Foo.extend(E)              <Class:Foo>  include E
//! ```

use strata_ir::{MixinKind, StringInterner, SymbolId, SymbolTable};

use crate::ancestors::push_mixin;

#[tracing::instrument(level = "debug", skip_all)]
pub(crate) fn finalize_symbols(table: &mut SymbolTable, interner: &StringInterner) {
    let namespaces: Vec<SymbolId> = table
        .namespace_ids()
        .into_iter()
        .filter(|&id| id != SymbolId::ROOT)
        .filter(|&id| table.namespace(id).is_some_and(|ns| !ns.is_singleton()))
        .collect();

    for &id in &namespaces {
        if !table[id].is_class() || id == SymbolId::BASIC_OBJECT {
            continue;
        }
        if let Some(ns) = table.namespace_mut(id) {
            ns.superclass.get_or_insert(SymbolId::OBJECT);
        }
    }

    for &id in &namespaces {
        let name = interner.intern(&format!("<Class:{}>", interner.lookup(table[id].name)));
        table.enter_singleton(id, name);
    }

    for &id in &namespaces {
        let Some(singleton) = table.namespace(id).and_then(|ns| ns.singleton) else {
            continue;
        };
        let superclass = if table[id].is_class() {
            match table.namespace(id).and_then(|ns| ns.superclass) {
                Some(parent) => table
                    .namespace(parent)
                    .and_then(|ns| ns.singleton)
                    .unwrap_or(SymbolId::CLASS),
                None => SymbolId::CLASS,
            }
        } else {
            SymbolId::MODULE
        };
        if let Some(ns) = table.namespace_mut(singleton) {
            ns.superclass = Some(superclass);
        }

        let extends: Vec<SymbolId> = table
            .namespace(id)
            .map(|ns| ns.mixins_of(MixinKind::Extend).collect())
            .unwrap_or_default();
        for module in extends {
            push_mixin(table, singleton, MixinKind::Include, module);
        }
    }

    tracing::debug!(namespaces = namespaces.len(), "symbol finalization complete");
}
