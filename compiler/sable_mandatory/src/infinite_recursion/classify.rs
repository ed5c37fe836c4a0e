//! Recursive-call classification.
//!
//! Direct calls are compared by name. Dynamically dispatched calls are
//! recursive only when the dispatch target is statically known to be the
//! enclosing function, which needs a [`CallTargetResolver`].

use sable_ir::{ApplySite, Callee, Function, Module, Name};

/// Resolves the targets of dynamically dispatched calls.
///
/// Implemented by [`Module`]; hosts with richer dispatch tables can
/// provide their own.
pub trait CallTargetResolver {
    /// `class` is defined in the module being compiled.
    fn is_class_local(&self, class: Name) -> bool;

    /// Every implementation of `method` reachable through `class` is
    /// visible to this compilation.
    fn callees_statically_knowable(&self, class: Name, method: Name) -> bool;

    /// Some subclass of `class` overrides `method`.
    fn is_overridden(&self, class: Name, method: Name) -> bool;

    /// The function `class`'s vtable dispatches `method` to.
    fn lookup_class_method(&self, class: Name, method: Name) -> Option<Name>;

    /// The witness for `method` in `conformance`'s witness table.
    fn lookup_witness_method(&self, conformance: Name, method: Name) -> Option<Name>;
}

impl CallTargetResolver for Module {
    fn is_class_local(&self, class: Name) -> bool {
        self.vtable(class).is_some_and(|table| table.is_local)
    }

    fn callees_statically_knowable(&self, class: Name, method: Name) -> bool {
        self.vtable(class)
            .is_some_and(|table| !table.is_open && table.entry(method).is_some())
    }

    fn is_overridden(&self, class: Name, method: Name) -> bool {
        self.vtable(class)
            .and_then(|table| table.entry(method))
            .map_or(true, |entry| entry.overridden)
    }

    fn lookup_class_method(&self, class: Name, method: Name) -> Option<Name> {
        self.vtable(class)?.entry(method).map(|entry| entry.implementation)
    }

    fn lookup_witness_method(&self, conformance: Name, method: Name) -> Option<Name> {
        self.lookup_witness(conformance, method)
    }
}

/// Is `site` a full call that provably lands in `function` itself?
pub fn is_recursive_call(
    site: &ApplySite,
    function: &Function,
    resolver: &dyn CallTargetResolver,
) -> bool {
    match site.callee {
        Callee::Function(name) => name == function.name,
        Callee::ClassMethod { class, method, .. } => {
            resolver.is_class_local(class)
                && resolver.callees_statically_knowable(class, method)
                && !resolver.is_overridden(class, method)
                && resolver.lookup_class_method(class, method) == Some(function.name)
        }
        Callee::WitnessMethod {
            conformance,
            method,
        } => resolver.lookup_witness_method(conformance, method) == Some(function.name),
        // Dynamic dispatch the resolver cannot see through.
        Callee::SuperMethod { .. } | Callee::ObjcMethod { .. } | Callee::Indirect(_) => false,
    }
}
