//! Basic-block IR: the control-flow graph that mandatory diagnostic passes
//! run on.
//!
//! # Architecture
//!
//! - **[`Function`]**: function body with formal parameters, blocks, spans
//! - **[`Block`]**: basic block with parameters, body instructions, terminator
//! - **[`Instr`]**: a single non-terminator instruction
//! - **[`Terminator`]**: block exit (return, branch, switch, try-apply, ...)
//!
//! Values are SSA-like and named by [`ValueId`]. A value is defined exactly
//! once: as a function parameter, a block parameter, or the `dst` of an
//! instruction. Control flow uses [`BlockId`] references between blocks.

use smallvec::{smallvec, SmallVec};

use crate::{MemoryEffects, Name, Span};

// ── ID newtypes ─────────────────────────────────────────────────────

/// SSA value ID within a single [`Function`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Basic block ID within a single [`Function`].
///
/// Block IDs equal the block's position in [`Function::blocks`], so they
/// double as dense indices for per-block analysis tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct BlockId(u32);

impl BlockId {
    #[inline]
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Get the index as `usize` (for indexing into `Vec`s).
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

// ── Primitive operations ────────────────────────────────────────────

/// Pure scalar operation. Never touches memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum PrimOp {
    Add,
    Sub,
    Mul,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
    Not,
}

// ── Calls ───────────────────────────────────────────────────────────

/// The target of a call.
///
/// Only [`Callee::Function`] names its target directly. Every other form is
/// dispatched at runtime and needs a resolver to say where it lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Callee {
    /// Statically referenced function.
    Function(Name),
    /// Vtable dispatch on `receiver`'s class.
    ClassMethod {
        class: Name,
        method: Name,
        receiver: ValueId,
    },
    /// Protocol requirement looked up in a witness table.
    WitnessMethod { conformance: Name, method: Name },
    /// Call to the superclass implementation of `method`.
    SuperMethod {
        class: Name,
        method: Name,
        receiver: ValueId,
    },
    /// Objective-C message send.
    ObjcMethod { method: Name, receiver: ValueId },
    /// Call through a closure or function value.
    Indirect(ValueId),
}

impl Callee {
    /// The value operand consumed by the callee itself, if any.
    pub fn operand(&self) -> Option<ValueId> {
        match *self {
            Callee::Function(_) | Callee::WitnessMethod { .. } => None,
            Callee::ClassMethod { receiver, .. }
            | Callee::SuperMethod { receiver, .. }
            | Callee::ObjcMethod { receiver, .. } => Some(receiver),
            Callee::Indirect(value) => Some(value),
        }
    }
}

/// Known semantics of a call's target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum CallSemantics {
    #[default]
    Normal,
    /// Assert-like intentional process abort (`fatal_error`, precondition
    /// failures). Excluded from recursion analysis.
    ProgramTerminationPoint,
}

/// A full call: control enters the callee and (maybe) comes back.
///
/// Shared by [`Instr::Apply`] and [`Terminator::TryApply`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplySite {
    pub callee: Callee,
    pub args: Vec<ValueId>,
    /// Memory effects of the callee.
    pub effects: MemoryEffects,
    pub semantics: CallSemantics,
}

impl ApplySite {
    /// An opaque call: may read and write any memory.
    pub fn new(callee: Callee, args: Vec<ValueId>) -> Self {
        ApplySite {
            callee,
            args,
            effects: MemoryEffects::READ_WRITE,
            semantics: CallSemantics::Normal,
        }
    }

    #[must_use]
    pub fn with_effects(mut self, effects: MemoryEffects) -> Self {
        self.effects = effects;
        self
    }

    #[must_use]
    pub fn with_semantics(mut self, semantics: CallSemantics) -> Self {
        self.semantics = semantics;
        self
    }

    /// The statically referenced callee, if the call is direct.
    pub fn referenced_function(&self) -> Option<Name> {
        match self.callee {
            Callee::Function(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_program_termination_point(&self) -> bool {
        self.semantics == CallSemantics::ProgramTerminationPoint
    }

    /// Callee operand followed by the arguments.
    pub fn operands(&self) -> Vec<ValueId> {
        let mut vars = Vec::with_capacity(1 + self.args.len());
        vars.extend(self.callee.operand());
        vars.extend_from_slice(&self.args);
        vars
    }
}

// ── Instructions ────────────────────────────────────────────────────

/// How a `Load` treats the loaded-from memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum LoadKind {
    /// Bitwise copy of a trivial value.
    #[default]
    Trivial,
    /// Copy, retaining the loaded reference.
    Copy,
    /// Move out, leaving the memory uninitialized.
    Take,
}

/// Kind of a formal access scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum AccessKind {
    Read,
    Modify,
    Init,
    Deinit,
}

/// A single instruction in a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Instr {
    /// Integer (or boolean) constant: `dst = value`.
    Literal { dst: ValueId, value: i64 },

    /// Pure scalar operation: `dst = op(args...)`.
    PrimOp {
        dst: ValueId,
        op: PrimOp,
        args: Vec<ValueId>,
    },

    /// Address of a global variable.
    GlobalAddr { dst: ValueId, global: Name },

    /// Field extraction from an aggregate value.
    Extract {
        dst: ValueId,
        value: ValueId,
        field: u32,
    },

    /// Read from memory: `dst = *addr`.
    Load {
        dst: ValueId,
        addr: ValueId,
        kind: LoadKind,
    },

    /// Write to memory: `*addr = src`.
    Store { src: ValueId, addr: ValueId },

    /// Begin a formal access to `addr`. `dst` is the accessed address.
    BeginAccess {
        dst: ValueId,
        addr: ValueId,
        kind: AccessKind,
    },

    /// End the access scope opened by `access` (a `BeginAccess` result).
    EndAccess { access: ValueId },

    /// Full call: `dst = callee(args...)`.
    Apply { dst: ValueId, site: ApplySite },

    /// Partial application: creates a closure, does not invoke `callee`.
    PartialApply {
        dst: ValueId,
        callee: Callee,
        args: Vec<ValueId>,
    },
}

impl Instr {
    /// Returns the value defined by this instruction, if any.
    pub fn defined_value(&self) -> Option<ValueId> {
        match self {
            Instr::Literal { dst, .. }
            | Instr::PrimOp { dst, .. }
            | Instr::GlobalAddr { dst, .. }
            | Instr::Extract { dst, .. }
            | Instr::Load { dst, .. }
            | Instr::BeginAccess { dst, .. }
            | Instr::Apply { dst, .. }
            | Instr::PartialApply { dst, .. } => Some(*dst),

            Instr::Store { .. } | Instr::EndAccess { .. } => None,
        }
    }

    /// Returns all values read by this instruction, in operand order.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Instr::Literal { .. } | Instr::GlobalAddr { .. } => vec![],
            Instr::PrimOp { args, .. } => args.clone(),
            Instr::Extract { value, .. } => vec![*value],
            Instr::Load { addr, .. } | Instr::BeginAccess { addr, .. } => vec![*addr],
            Instr::Store { src, addr } => vec![*src, *addr],
            Instr::EndAccess { access } => vec![*access],
            Instr::Apply { site, .. } => site.operands(),
            Instr::PartialApply { callee, args, .. } => {
                let mut vars = Vec::with_capacity(1 + args.len());
                vars.extend(callee.operand());
                vars.extend_from_slice(args);
                vars
            }
        }
    }

    /// What this instruction may do to memory.
    ///
    /// Copying and taking loads report a write: retaining the loaded value,
    /// or leaving the source uninitialized, is a side effect. Access markers
    /// report both, as they delimit exclusive-access scopes.
    pub fn effects(&self) -> MemoryEffects {
        match self {
            Instr::Literal { .. }
            | Instr::PrimOp { .. }
            | Instr::GlobalAddr { .. }
            | Instr::Extract { .. }
            | Instr::PartialApply { .. } => MemoryEffects::empty(),
            Instr::Load { kind, .. } => match kind {
                LoadKind::Trivial => MemoryEffects::READ,
                LoadKind::Copy | LoadKind::Take => MemoryEffects::READ_WRITE,
            },
            Instr::Store { .. } => MemoryEffects::WRITE,
            Instr::BeginAccess { .. } | Instr::EndAccess { .. } => MemoryEffects::READ_WRITE,
            Instr::Apply { site, .. } => site.effects,
        }
    }

    /// The full apply site, if this is a full call.
    pub fn full_apply(&self) -> Option<&ApplySite> {
        match self {
            Instr::Apply { site, .. } => Some(site),
            _ => None,
        }
    }
}

// ── Terminators ─────────────────────────────────────────────────────

/// Block terminator: how control leaves a basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum Terminator {
    /// Normal function return.
    Return { value: ValueId },

    /// Return by throwing an error.
    Throw { value: ValueId },

    /// Process termination after a call that never returns (`exit()`).
    Terminate,

    /// Statically unreachable point (e.g. after an exhaustive switch).
    Unreachable,

    /// Unconditional branch, passing `args` to the target's block params.
    Jump { target: BlockId, args: Vec<ValueId> },

    /// Two-way branch on a boolean.
    Branch {
        cond: ValueId,
        then_block: BlockId,
        else_block: BlockId,
    },

    /// Multi-way branch on an integer value.
    SwitchValue {
        scrutinee: ValueId,
        cases: Vec<(i64, BlockId)>,
        default: Option<BlockId>,
    },

    /// Multi-way branch on an enum value's case index.
    SwitchEnum {
        scrutinee: ValueId,
        cases: Vec<(u32, BlockId)>,
        default: Option<BlockId>,
    },

    /// Multi-way branch on the case of the enum stored at `addr`.
    SwitchEnumAddr {
        addr: ValueId,
        cases: Vec<(u32, BlockId)>,
        default: Option<BlockId>,
    },

    /// Dynamic cast of a value; branches on success.
    CheckedCast {
        operand: ValueId,
        target: Name,
        success: BlockId,
        failure: BlockId,
    },

    /// Dynamic cast of the value stored at `src` into `dest`.
    CheckedCastAddr {
        src: ValueId,
        dest: ValueId,
        target: Name,
        success: BlockId,
        failure: BlockId,
    },

    /// Full call that may throw. The result is passed to `normal`'s block
    /// parameter, the error to `error`'s.
    TryApply {
        site: ApplySite,
        normal: BlockId,
        error: BlockId,
    },
}

impl Terminator {
    /// Successor blocks in edge order. A block listed twice is two edges.
    pub fn successors(&self) -> SmallVec<[BlockId; 4]> {
        match self {
            Terminator::Return { .. }
            | Terminator::Throw { .. }
            | Terminator::Terminate
            | Terminator::Unreachable => SmallVec::new(),
            Terminator::Jump { target, .. } => smallvec![*target],
            Terminator::Branch {
                then_block,
                else_block,
                ..
            } => smallvec![*then_block, *else_block],
            Terminator::SwitchValue { cases, default, .. } => {
                let mut targets: SmallVec<[BlockId; 4]> = cases.iter().map(|&(_, b)| b).collect();
                targets.extend(*default);
                targets
            }
            Terminator::SwitchEnum { cases, default, .. }
            | Terminator::SwitchEnumAddr { cases, default, .. } => {
                let mut targets: SmallVec<[BlockId; 4]> = cases.iter().map(|&(_, b)| b).collect();
                targets.extend(*default);
                targets
            }
            Terminator::CheckedCast {
                success, failure, ..
            }
            | Terminator::CheckedCastAddr {
                success, failure, ..
            } => smallvec![*success, *failure],
            Terminator::TryApply { normal, error, .. } => smallvec![*normal, *error],
        }
    }

    /// Returns all values read by this terminator.
    pub fn operands(&self) -> Vec<ValueId> {
        match self {
            Terminator::Return { value } | Terminator::Throw { value } => vec![*value],
            Terminator::Terminate | Terminator::Unreachable => vec![],
            Terminator::Jump { args, .. } => args.clone(),
            Terminator::Branch { cond, .. } => vec![*cond],
            Terminator::SwitchValue { scrutinee, .. } | Terminator::SwitchEnum { scrutinee, .. } => {
                vec![*scrutinee]
            }
            Terminator::SwitchEnumAddr { addr, .. } => vec![*addr],
            Terminator::CheckedCast { operand, .. } => vec![*operand],
            Terminator::CheckedCastAddr { src, dest, .. } => vec![*src, *dest],
            Terminator::TryApply { site, .. } => site.operands(),
        }
    }

    /// Leaves the function normally (return or throw).
    pub fn is_function_exiting(&self) -> bool {
        matches!(self, Terminator::Return { .. } | Terminator::Throw { .. })
    }

    /// Ends the process without returning.
    pub fn is_program_terminating(&self) -> bool {
        matches!(self, Terminator::Terminate)
    }

    /// What this terminator may do to memory.
    pub fn effects(&self) -> MemoryEffects {
        match self {
            Terminator::SwitchEnumAddr { .. } => MemoryEffects::READ,
            Terminator::CheckedCastAddr { .. } => MemoryEffects::READ_WRITE,
            Terminator::TryApply { site, .. } => site.effects,
            _ => MemoryEffects::empty(),
        }
    }

    /// The full apply site, if this terminator is a call.
    pub fn full_apply(&self) -> Option<&ApplySite> {
        match self {
            Terminator::TryApply { site, .. } => Some(site),
            _ => None,
        }
    }
}

// ── Blocks ──────────────────────────────────────────────────────────

/// A basic block.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Block {
    /// This block's identifier. Equals its position in the function.
    pub id: BlockId,
    /// Block parameters: values passed in by predecessors.
    pub params: Vec<ValueId>,
    /// Sequential instructions executed in order.
    pub body: Vec<Instr>,
    /// How control leaves this block.
    pub terminator: Terminator,
}

impl Block {
    pub fn new(id: BlockId, body: Vec<Instr>, terminator: Terminator) -> Self {
        Block {
            id,
            params: Vec::new(),
            body,
            terminator,
        }
    }

    #[must_use]
    pub fn with_params(mut self, params: Vec<ValueId>) -> Self {
        self.params = params;
        self
    }
}

// ── Functions ───────────────────────────────────────────────────────

/// Where a function body came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub enum FunctionOrigin {
    /// Lowered from source in this compilation.
    #[default]
    Local,
    /// Loaded from another module's serialized IR. Already diagnosed when
    /// that module was compiled.
    Deserialized,
}

/// A function body.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cache", derive(serde::Serialize, serde::Deserialize))]
pub struct Function {
    /// The function's name. A direct call to this name is a self-call.
    pub name: Name,
    /// Formal parameters. Position in this list is the argument index.
    pub params: Vec<ValueId>,
    /// Basic blocks in definition order. `blocks[entry.index()]` is the entry.
    pub blocks: Vec<Block>,
    /// The entry block ID.
    pub entry: BlockId,
    /// Source spans indexed by `[block_index][instr_index]`. Each block has
    /// `body.len() + 1` slots; the last one is the terminator's.
    pub spans: Vec<Vec<Option<Span>>>,
    pub origin: FunctionOrigin,
}

impl Function {
    /// Build a local function with entry block 0 and no spans.
    pub fn new(name: Name, params: Vec<ValueId>, blocks: Vec<Block>) -> Self {
        let spans = blocks.iter().map(|b| vec![None; b.body.len() + 1]).collect();
        Function {
            name,
            params,
            blocks,
            entry: BlockId::new(0),
            spans,
            origin: FunctionOrigin::Local,
        }
    }

    #[inline]
    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.index()]
    }

    /// Was this body produced by cross-module deserialization?
    #[inline]
    pub fn was_deserialized(&self) -> bool {
        self.origin == FunctionOrigin::Deserialized
    }

    /// Span of instruction `index` in `block`. `index == body.len()` is the
    /// terminator.
    pub fn span(&self, block: BlockId, index: usize) -> Option<Span> {
        self.spans
            .get(block.index())
            .and_then(|spans| spans.get(index))
            .copied()
            .flatten()
    }

    /// Record the span of instruction `index` in `block`.
    ///
    /// Out-of-range positions are ignored.
    pub fn set_span(&mut self, block: BlockId, index: usize, span: Span) {
        if let Some(slot) = self
            .spans
            .get_mut(block.index())
            .and_then(|spans| spans.get_mut(index))
        {
            *slot = Some(span);
        }
    }

    /// Total number of instructions, terminators included.
    pub fn instruction_count(&self) -> usize {
        self.blocks.iter().map(|b| b.body.len() + 1).sum()
    }
}

#[cfg(test)]
mod tests;
