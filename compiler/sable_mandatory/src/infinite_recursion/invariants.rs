//! Invariance hypotheses.
//!
//! An [`Invariants`] value says what the analysis may assume is unchanged
//! from one activation of the function to the next recursive activation:
//! all of memory (or none of it), and each argument that every considered
//! recursive call forwards unchanged.

use std::fmt;

use rustc_hash::FxHashSet;
use smallvec::{smallvec, SmallVec};

use sable_ir::{ApplySite, Function, Terminator, ValueId};

use crate::graph::{ValueDef, ValueDefs};

const MEMORY_BIT: u32 = 0;
const FIRST_ARG_BIT: u32 = 1;

/// Highest argument index tracked. Later arguments are never invariant.
pub const MAX_ARG_INDEX: usize = 16;

/// Bitset hypothesis: bit 0 is memory, bit `i + 1` is argument `i`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Invariants(u32);

impl Invariants {
    /// Nothing is assumed invariant.
    #[inline]
    pub const fn empty() -> Self {
        Invariants(0)
    }

    /// Every argument `site` forwards unchanged from `function`'s own
    /// parameters, looking through access markers.
    pub fn from_forwarding_arguments(
        site: &ApplySite,
        function: &Function,
        defs: &ValueDefs<'_>,
    ) -> Self {
        let mut bits = 0;
        for (index, &arg) in site.args.iter().enumerate() {
            if index <= MAX_ARG_INDEX && is_forwarded(index, arg, function, defs) {
                bits |= arg_bit(index);
            }
        }
        Invariants(bits)
    }

    #[must_use]
    #[inline]
    pub const fn with_memory_invariant(self) -> Self {
        Invariants(self.0 | (1 << MEMORY_BIT))
    }

    #[inline]
    pub const fn is_memory_invariant(self) -> bool {
        self.0 & (1 << MEMORY_BIT) != 0
    }

    #[inline]
    pub fn is_argument_invariant(self, index: usize) -> bool {
        index <= MAX_ARG_INDEX && self.0 & arg_bit(index) != 0
    }

    /// Is `term` a conditional branch whose condition cannot change across
    /// recursive activations under this hypothesis?
    ///
    /// Branches on an address read the branched-on value from memory and so
    /// additionally need memory to be invariant.
    pub fn is_invariant(self, term: &Terminator, defs: &ValueDefs<'_>) -> bool {
        let condition = match term {
            Terminator::SwitchEnumAddr { addr, .. } => {
                if !self.is_memory_invariant() {
                    return false;
                }
                *addr
            }
            Terminator::CheckedCastAddr { src, .. } => {
                if !self.is_memory_invariant() {
                    return false;
                }
                *src
            }
            Terminator::Branch { cond, .. } => *cond,
            Terminator::SwitchValue { scrutinee, .. } | Terminator::SwitchEnum { scrutinee, .. } => {
                *scrutinee
            }
            Terminator::CheckedCast { operand, .. } => *operand,
            _ => return false,
        };
        self.is_invariant_value(condition, defs)
    }

    /// Does `site` forward every argument this hypothesis marks invariant?
    pub fn has_invariant_arguments(
        self,
        site: &ApplySite,
        function: &Function,
        defs: &ValueDefs<'_>,
    ) -> bool {
        site.args.iter().enumerate().all(|(index, &arg)| {
            !self.is_argument_invariant(index) || is_forwarded(index, arg, function, defs)
        })
    }

    /// Walk the use-defs of `value`. Every value reached must be an
    /// invariant parameter or an instruction that does not read memory
    /// (any instruction, if memory is invariant). Block parameters are
    /// never invariant.
    ///
    /// Each value is visited at most once per query.
    fn is_invariant_value(self, value: ValueId, defs: &ValueDefs<'_>) -> bool {
        let mut visited: FxHashSet<ValueId> = FxHashSet::default();
        let mut worklist: SmallVec<[ValueId; 8]> = smallvec![value];

        while let Some(value) = worklist.pop() {
            if !visited.insert(value) {
                continue;
            }
            match defs.get(value) {
                Some(ValueDef::Instr(instr)) => {
                    if !self.is_memory_invariant() && instr.effects().may_read() {
                        return false;
                    }
                    worklist.extend(instr.operands());
                }
                Some(ValueDef::Param(index)) => {
                    if !self.is_argument_invariant(index) {
                        return false;
                    }
                }
                Some(ValueDef::BlockParam(_)) | None => return false,
            }
        }
        true
    }
}

impl fmt::Debug for Invariants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: SmallVec<[usize; 4]> = (0..=MAX_ARG_INDEX)
            .filter(|&i| self.is_argument_invariant(i))
            .collect();
        f.debug_struct("Invariants")
            .field("memory", &self.is_memory_invariant())
            .field("args", &args.as_slice())
            .finish()
    }
}

#[inline]
fn arg_bit(index: usize) -> u32 {
    1 << (index + FIRST_ARG_BIT as usize)
}

/// Is actual argument `index` the function's own formal parameter `index`?
fn is_forwarded(index: usize, arg: ValueId, function: &Function, defs: &ValueDefs<'_>) -> bool {
    function.params.get(index) == Some(&defs.strip_access_markers(arg))
}

/// Ordered, duplicate-free set of hypotheses to try.
pub type InvariantsSet = SmallVec<[Invariants; 4]>;
