//! Host IR for the Sable compiler's mandatory diagnostic passes.
//!
//! This crate provides:
//!
//! - **Source locations and names** ([`Span`], [`Name`], [`StringInterner`]).
//!
//! - **Basic-block IR** ([`Function`], [`Block`], [`Instr`], [`Terminator`]):
//!   an SSA control-flow graph with explicit memory effects
//!   ([`MemoryEffects`]) and full/partial call sites ([`ApplySite`]).
//!
//! - **Modules** ([`Module`], [`VTable`], [`WitnessTable`]): function bodies
//!   plus the dispatch tables needed to resolve dynamic calls.
//!
//! - **Verification** ([`verify_function`]): structural CFG preconditions.
//!
//! - **IR cache** (`cache` feature): bincode encoding of modules;
//!   decoded functions are marked as deserialized.

#[cfg(feature = "cache")]
pub mod cache;
mod cfg;
mod effects;
mod interner;
mod module;
mod name;
mod span;
mod verify;

pub use cfg::{
    AccessKind, ApplySite, Block, BlockId, CallSemantics, Callee, Function, FunctionOrigin, Instr,
    LoadKind, PrimOp, Terminator, ValueId,
};
pub use effects::MemoryEffects;
pub use interner::{InternError, StringInterner};
pub use module::{Module, VTable, VTableEntry, WitnessEntry, WitnessTable};
pub use name::Name;
pub use span::{Span, SpanError};
pub use verify::{verify_function, VerifyError};
