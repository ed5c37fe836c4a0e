//! Structural CFG verification.
//!
//! Checks the preconditions every CFG pass relies on. Passes do not
//! re-validate these; the host runs [`verify_function`] once after lowering
//! (or the pass harness runs it when configured to).

use std::fmt;

use rustc_hash::FxHashSet;

use crate::{Block, BlockId, Function, Instr, Terminator, ValueId};

/// A structural defect in a function body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    /// The function has no blocks at all.
    NoBlocks,
    /// `entry` does not name a block of the function.
    EntryOutOfRange { entry: BlockId },
    /// Some block branches back to the entry block.
    EntryHasPredecessor { pred: BlockId },
    /// `blocks[position].id != position`.
    BlockIdMismatch { position: usize, id: BlockId },
    /// A terminator names a block that does not exist.
    SuccessorOutOfRange { block: BlockId, succ: BlockId },
    /// A non-exiting terminator with no successors (e.g. an empty switch).
    NoSuccessors { block: BlockId },
    /// `spans` does not have one row per block.
    SpanTableLength { blocks: usize, spans: usize },
    /// A `spans` row does not have one slot per instruction and terminator.
    SpanTableMismatch { block: BlockId },
    /// A value is defined more than once.
    DuplicateDefinition { value: ValueId },
    /// An instruction uses a value defined later in the same block.
    UseBeforeDefinition { block: BlockId, value: ValueId },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerifyError::NoBlocks => write!(f, "function has no blocks"),
            VerifyError::EntryOutOfRange { entry } => {
                write!(f, "entry block bb{} does not exist", entry.raw())
            }
            VerifyError::EntryHasPredecessor { pred } => {
                write!(f, "entry block has predecessor bb{}", pred.raw())
            }
            VerifyError::BlockIdMismatch { position, id } => {
                write!(f, "block at position {position} has id bb{}", id.raw())
            }
            VerifyError::SuccessorOutOfRange { block, succ } => write!(
                f,
                "bb{} branches to nonexistent block bb{}",
                block.raw(),
                succ.raw()
            ),
            VerifyError::NoSuccessors { block } => write!(
                f,
                "bb{} has no successors but does not exit the function",
                block.raw()
            ),
            VerifyError::SpanTableLength { blocks, spans } => {
                write!(f, "span table has {spans} rows for {blocks} blocks")
            }
            VerifyError::SpanTableMismatch { block } => {
                write!(f, "span table of bb{} does not match its body", block.raw())
            }
            VerifyError::DuplicateDefinition { value } => {
                write!(f, "value %{} is defined more than once", value.raw())
            }
            VerifyError::UseBeforeDefinition { block, value } => write!(
                f,
                "value %{} is used in bb{} before its definition",
                value.raw(),
                block.raw()
            ),
        }
    }
}

impl std::error::Error for VerifyError {}

/// Verify the structural invariants of `func`.
///
/// Returns the first defect found.
pub fn verify_function(func: &Function) -> Result<(), VerifyError> {
    let num_blocks = func.blocks.len();
    if num_blocks == 0 {
        return Err(VerifyError::NoBlocks);
    }
    if func.entry.index() >= num_blocks {
        return Err(VerifyError::EntryOutOfRange { entry: func.entry });
    }
    if func.spans.len() != num_blocks {
        return Err(VerifyError::SpanTableLength {
            blocks: num_blocks,
            spans: func.spans.len(),
        });
    }

    let mut defined: FxHashSet<ValueId> = FxHashSet::default();
    let mut define = |value: ValueId| {
        if defined.insert(value) {
            Ok(())
        } else {
            Err(VerifyError::DuplicateDefinition { value })
        }
    };
    for &param in &func.params {
        define(param)?;
    }

    for (position, block) in func.blocks.iter().enumerate() {
        if block.id.index() != position {
            return Err(VerifyError::BlockIdMismatch {
                position,
                id: block.id,
            });
        }
        if func.spans[position].len() != block.body.len() + 1 {
            return Err(VerifyError::SpanTableMismatch { block: block.id });
        }

        let succs = block.terminator.successors();
        if succs.is_empty() && !never_has_successors(&block.terminator) {
            return Err(VerifyError::NoSuccessors { block: block.id });
        }
        for succ in succs {
            if succ.index() >= num_blocks {
                return Err(VerifyError::SuccessorOutOfRange {
                    block: block.id,
                    succ,
                });
            }
            if succ == func.entry {
                return Err(VerifyError::EntryHasPredecessor { pred: block.id });
            }
        }

        for &param in &block.params {
            define(param)?;
        }
        for instr in &block.body {
            if let Some(dst) = instr.defined_value() {
                define(dst)?;
            }
        }
        check_local_order(block)?;
    }

    Ok(())
}

/// Values defined in `block`'s body must be defined before they are used.
fn check_local_order(block: &Block) -> Result<(), VerifyError> {
    let local: FxHashSet<ValueId> = block
        .body
        .iter()
        .filter_map(Instr::defined_value)
        .collect();
    let mut defined: FxHashSet<ValueId> = FxHashSet::default();
    for instr in &block.body {
        if let Some(value) = instr
            .operands()
            .into_iter()
            .find(|value| local.contains(value) && !defined.contains(value))
        {
            return Err(VerifyError::UseBeforeDefinition {
                block: block.id,
                value,
            });
        }
        defined.extend(instr.defined_value());
    }
    Ok(())
}

fn never_has_successors(term: &Terminator) -> bool {
    matches!(
        term,
        Terminator::Return { .. }
            | Terminator::Throw { .. }
            | Terminator::Terminate
            | Terminator::Unreachable
    )
}
