//! Compilation unit: function bodies plus the dispatch tables needed to
//! resolve class-method and witness-method calls.

use crate::{Function, Name};

/// One method slot in a class vtable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct VTableEntry {
    pub method: Name,
    /// The function implementing `method` for this class.
    pub implementation: Name,
    /// Some subclass overrides this method.
    pub overridden: bool,
}

/// Vtable of a class.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct VTable {
    pub class: Name,
    /// The class is declared in this module (not imported).
    pub is_local: bool,
    /// The class may be subclassed outside this module, so the set of
    /// overrides is not known here.
    pub is_open: bool,
    pub entries: Vec<VTableEntry>,
}

impl VTable {
    pub fn entry(&self, method: Name) -> Option<&VTableEntry> {
        self.entries.iter().find(|e| e.method == method)
    }
}

/// One requirement-to-witness mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct WitnessEntry {
    pub requirement: Name,
    pub witness: Name,
}

/// Witness table of a protocol conformance.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct WitnessTable {
    pub conformance: Name,
    pub entries: Vec<WitnessEntry>,
}

/// A module: the unit the pass manager runs over.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Module {
    pub name: Name,
    pub functions: Vec<Function>,
    pub vtables: Vec<VTable>,
    pub witness_tables: Vec<WitnessTable>,
}

impl Module {
    pub fn new(name: Name) -> Self {
        Module {
            name,
            ..Module::default()
        }
    }

    pub fn vtable(&self, class: Name) -> Option<&VTable> {
        self.vtables.iter().find(|t| t.class == class)
    }

    /// Look up the witness for `requirement` in `conformance`'s table.
    pub fn lookup_witness(&self, conformance: Name, requirement: Name) -> Option<Name> {
        self.witness_tables
            .iter()
            .find(|t| t.conformance == conformance)?
            .entries
            .iter()
            .find(|e| e.requirement == requirement)
            .map(|e| e.witness)
    }
}
