//! Per-block summaries for one hypothesis.

use std::iter;

use sable_ir::{Block, Function, Instr};

use super::classify::{is_recursive_call, CallTargetResolver};
use super::invariants::Invariants;
use crate::graph::ValueDefs;

/// What one block contributes to the analysis under one hypothesis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockInfo {
    /// Position of the recursive call that ends this block's scan.
    /// `body.len()` means the terminator.
    pub recursive_call: Option<usize>,
    /// Successor edges not (yet) known to reach a return.
    pub num_succs_not_reaching_return: usize,
    /// The terminator branches on an invariant condition.
    pub has_invariant_condition: bool,
    /// Some path from here avoids every recursive call and leaves the
    /// function. Under memory invariance a memory write counts as leaving.
    pub reaches_return: bool,
    /// Some path from the entry reaches here without passing a
    /// `reaches_return` block.
    pub reachable_from_entry: bool,
}

impl BlockInfo {
    /// Scan `block` (body, then terminator) under `invariants`.
    pub fn new(
        block: &Block,
        function: &Function,
        invariants: Invariants,
        defs: &ValueDefs<'_>,
        resolver: &dyn CallTargetResolver,
    ) -> Self {
        let term = &block.terminator;
        let mut info = BlockInfo {
            recursive_call: None,
            num_succs_not_reaching_return: term.successors().len(),
            has_invariant_condition: invariants.is_invariant(term, defs),
            reaches_return: false,
            reachable_from_entry: false,
        };

        let body = block
            .body
            .iter()
            .map(|instr| (instr.full_apply(), writes_memory(instr)));
        let terminator = iter::once((term.full_apply(), term.effects().may_write()));

        for (index, (site, writes)) in body.chain(terminator).enumerate() {
            if let Some(site) = site {
                // Assert-like abort: neither a recursion nor a return.
                if site.is_program_termination_point() {
                    return info;
                }
                if is_recursive_call(site, function, resolver)
                    && invariants.has_invariant_arguments(site, function, defs)
                {
                    info.recursive_call = Some(index);
                    return info;
                }
            }
            if invariants.is_memory_invariant() && writes {
                info.reaches_return = true;
                return info;
            }
        }

        if term.is_function_exiting() || term.is_program_terminating() {
            info.reaches_return = true;
        }
        info
    }
}

/// May `instr` write memory, for the purpose of breaking a recursion?
///
/// Loads and access markers never count, whatever their kind.
fn writes_memory(instr: &Instr) -> bool {
    match instr {
        Instr::Load { .. } | Instr::BeginAccess { .. } | Instr::EndAccess { .. } => false,
        _ => instr.effects().may_write(),
    }
}

#[cfg(test)]
mod tests;
