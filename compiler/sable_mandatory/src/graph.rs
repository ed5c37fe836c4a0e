//! Shared CFG facts for mandatory diagnostic passes.
//!
//! Computed once per function and borrowed by every analysis run on it:
//! per-edge predecessor lists and the use-def table mapping each value to
//! the place it is defined.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use sable_ir::{ApplySite, Block, BlockId, Function, Instr, ValueId};

/// Where a value is defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ValueDef<'f> {
    /// Formal parameter at this argument index.
    Param(usize),
    /// Parameter of a non-entry block.
    BlockParam(BlockId),
    /// Result of a body instruction.
    Instr(&'f Instr),
}

/// Use-def table for one function.
#[derive(Debug)]
pub struct ValueDefs<'f> {
    defs: FxHashMap<ValueId, ValueDef<'f>>,
}

impl<'f> ValueDefs<'f> {
    pub fn new(func: &'f Function) -> Self {
        let mut defs = FxHashMap::default();
        for (index, &param) in func.params.iter().enumerate() {
            defs.insert(param, ValueDef::Param(index));
        }
        for block in &func.blocks {
            for &param in &block.params {
                defs.insert(param, ValueDef::BlockParam(block.id));
            }
            for instr in &block.body {
                if let Some(dst) = instr.defined_value() {
                    defs.insert(dst, ValueDef::Instr(instr));
                }
            }
        }
        ValueDefs { defs }
    }

    #[inline]
    pub fn get(&self, value: ValueId) -> Option<ValueDef<'f>> {
        self.defs.get(&value).copied()
    }

    /// Look through `BeginAccess` wrappers to the accessed address.
    ///
    /// A chain of markers that loops back on itself never reaches an
    /// address; the walk stops after visiting every definition once.
    pub fn strip_access_markers(&self, mut value: ValueId) -> ValueId {
        for _ in 0..=self.defs.len() {
            match self.get(value) {
                Some(ValueDef::Instr(Instr::BeginAccess { addr, .. })) => value = *addr,
                _ => return value,
            }
        }
        value
    }
}

/// Facts about a function's CFG shared by all hypotheses of an analysis.
#[derive(Debug)]
pub struct CfgFacts<'f> {
    defs: ValueDefs<'f>,
    predecessors: Vec<SmallVec<[BlockId; 4]>>,
}

impl<'f> CfgFacts<'f> {
    pub fn new(func: &'f Function) -> Self {
        CfgFacts {
            defs: ValueDefs::new(func),
            predecessors: predecessor_edges(func),
        }
    }

    #[inline]
    pub fn defs(&self) -> &ValueDefs<'f> {
        &self.defs
    }

    /// Predecessor of every incoming edge of `block`, in block order.
    #[inline]
    pub fn predecessors(&self, block: BlockId) -> &[BlockId] {
        self.predecessors
            .get(block.index())
            .map_or(&[][..], SmallVec::as_slice)
    }
}

/// Compute the predecessor list for each block, one entry per edge.
///
/// A terminator naming the same successor twice contributes that block
/// twice, so each list has as many entries as the block has incoming
/// edges. Out-of-range successors are ignored.
pub(crate) fn predecessor_edges(func: &Function) -> Vec<SmallVec<[BlockId; 4]>> {
    let num_blocks = func.blocks.len();
    let mut predecessors: Vec<SmallVec<[BlockId; 4]>> = vec![SmallVec::new(); num_blocks];

    for block in &func.blocks {
        for succ in block.terminator.successors() {
            if let Some(preds) = predecessors.get_mut(succ.index()) {
                preds.push(block.id);
            }
        }
    }

    predecessors
}

/// Full calls of `block` in execution order, with their position.
///
/// The terminator's position is `body.len()`.
pub(crate) fn full_applies(block: &Block) -> impl Iterator<Item = (usize, &ApplySite)> {
    block
        .body
        .iter()
        .map(Instr::full_apply)
        .chain(std::iter::once(block.terminator.full_apply()))
        .enumerate()
        .filter_map(|(index, site)| site.map(|site| (index, site)))
}
