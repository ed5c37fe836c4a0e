//! Shared test utilities for mandatory passes.
//!
//! Factory shorthands for building small CFGs by hand. Only compiled in test
//! builds.

use sable_ir::{
    ApplySite, Block, BlockId, CallSemantics, Callee, Function, Instr, MemoryEffects, Module,
    Name, Span, Terminator, ValueId,
};

/// Name of the function built by [`make_func`].
pub(crate) const SELF: Name = Name::from_raw(1);

/// Name of a callee that is not the function under analysis.
pub(crate) const OTHER: Name = Name::from_raw(2);

/// Shorthand for `ValueId::new(n)`.
pub(crate) fn v(n: u32) -> ValueId {
    ValueId::new(n)
}

/// Shorthand for `BlockId::new(n)`.
pub(crate) fn b(n: u32) -> BlockId {
    BlockId::new(n)
}

/// Build a function named [`SELF`] taking params `%0..%num_params`.
///
/// Every instruction and terminator gets the span `block*100 + index`, so
/// tests can tell which instruction a diagnostic points at.
pub(crate) fn make_func(num_params: u32, blocks: Vec<Block>) -> Function {
    let mut func = Function::new(SELF, (0..num_params).map(v).collect(), blocks);
    for block in 0..func.blocks.len() {
        for index in 0..=func.blocks[block].body.len() {
            let at = span_at(block, index);
            func.set_span(BlockId::new(u32::try_from(block).unwrap_or(u32::MAX)), index, at);
        }
    }
    func
}

/// The span [`make_func`] assigns to instruction `index` of block `block`.
pub(crate) fn span_at(block: usize, index: usize) -> Span {
    let start = u32::try_from(block * 100 + index).unwrap_or(u32::MAX);
    Span::new(start, start + 1)
}

/// Block with no parameters.
pub(crate) fn block(id: u32, body: Vec<Instr>, terminator: Terminator) -> Block {
    Block::new(b(id), body, terminator)
}

/// Direct call to `callee` with opaque memory effects.
pub(crate) fn call(dst: u32, callee: Name, args: &[u32]) -> Instr {
    Instr::Apply {
        dst: v(dst),
        site: ApplySite::new(Callee::Function(callee), args.iter().copied().map(v).collect()),
    }
}

/// Direct self-call with opaque memory effects.
pub(crate) fn call_self(dst: u32, args: &[u32]) -> Instr {
    call(dst, SELF, args)
}

/// Direct self-call that touches no memory.
pub(crate) fn pure_call_self(dst: u32, args: &[u32]) -> Instr {
    Instr::Apply {
        dst: v(dst),
        site: ApplySite::new(Callee::Function(SELF), args.iter().copied().map(v).collect())
            .with_effects(MemoryEffects::empty()),
    }
}

/// Call to an assert-like abort (`fatal_error`).
pub(crate) fn fatal_error(dst: u32) -> Instr {
    Instr::Apply {
        dst: v(dst),
        site: ApplySite::new(Callee::Function(OTHER), vec![])
            .with_semantics(CallSemantics::ProgramTerminationPoint),
    }
}

pub(crate) fn ret(value: u32) -> Terminator {
    Terminator::Return { value: v(value) }
}

pub(crate) fn jump(target: u32) -> Terminator {
    Terminator::Jump {
        target: b(target),
        args: vec![],
    }
}

pub(crate) fn branch(cond: u32, then_block: u32, else_block: u32) -> Terminator {
    Terminator::Branch {
        cond: v(cond),
        then_block: b(then_block),
        else_block: b(else_block),
    }
}

/// A module with no dispatch tables: only direct self-calls are recursive.
pub(crate) fn empty_module() -> Module {
    Module::new(Name::from_raw(100))
}
