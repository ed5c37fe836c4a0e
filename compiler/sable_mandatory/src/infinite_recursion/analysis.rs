//! Return-reachability and entry-reachability propagation.
//!
//! # Algorithm
//!
//! For one hypothesis:
//!
//! 1. **Backward:** seed a worklist with every block that reaches a return
//!    on its own, and propagate `reaches_return` to predecessors. Blocks with
//!    a recursive call stop the propagation. A block branching on an
//!    invariant condition only reaches a return once *all* its successor
//!    edges do: if the recursing successor is taken once, it is taken on
//!    every activation.
//!
//! 2. **Forward:** if the entry block does not reach a return, walk forward
//!    from the entry through blocks that do not reach a return. Every
//!    recursive call hit is an infinite recursion and gets a warning.
//!
//! If no return is reachable but no recursive call is hit either, the
//! function ends in aborts or an infinite loop. Neither is reported here.

use smallvec::SmallVec;

use sable_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use sable_ir::{BlockId, Function, Span};

use super::block_info::BlockInfo;
use super::classify::CallTargetResolver;
use super::invariants::Invariants;
use crate::graph::CfgFacts;

/// Message of the infinite-recursion warning.
pub const INFINITE_RECURSION_MESSAGE: &str = "function call causes an infinite recursion";

/// Analysis state for one function. Block summaries are rebuilt for every
/// hypothesis tried.
pub struct InfiniteRecursionAnalysis<'a> {
    function: &'a Function,
    facts: &'a CfgFacts<'a>,
    resolver: &'a dyn CallTargetResolver,
    infos: Vec<BlockInfo>,
}

impl<'a> InfiniteRecursionAnalysis<'a> {
    pub fn new(
        function: &'a Function,
        facts: &'a CfgFacts<'a>,
        resolver: &'a dyn CallTargetResolver,
    ) -> Self {
        InfiniteRecursionAnalysis {
            function,
            facts,
            resolver,
            infos: Vec::with_capacity(function.blocks.len()),
        }
    }

    /// Block summaries from the last run, indexed by block.
    pub fn block_infos(&self) -> &[BlockInfo] {
        &self.infos
    }

    /// Run both phases under `invariants`. Returns `true` if at least one
    /// warning was emitted.
    pub fn analyze_and_diagnose(
        &mut self,
        invariants: Invariants,
        sink: &mut dyn DiagnosticSink,
    ) -> bool {
        if self.is_entry_reachable_from_return(invariants) {
            return false;
        }
        self.find_recursive_calls_and_diagnose(sink)
    }

    /// Build the block summaries for `invariants` and propagate
    /// `reaches_return` backward. Returns the entry block's flag.
    pub fn is_entry_reachable_from_return(&mut self, invariants: Invariants) -> bool {
        let function = self.function;
        let facts = self.facts;
        let defs = facts.defs();
        let resolver = self.resolver;

        let mut worklist: SmallVec<[BlockId; 32]> = SmallVec::new();
        self.infos.clear();
        for block in &function.blocks {
            let info = BlockInfo::new(block, function, invariants, defs, resolver);
            if info.reaches_return {
                worklist.push(block.id);
            }
            self.infos.push(info);
        }

        while let Some(block) = worklist.pop() {
            for &pred in facts.predecessors(block) {
                let pred_info = &mut self.infos[pred.index()];
                if pred_info.reaches_return || pred_info.recursive_call.is_some() {
                    continue;
                }

                debug_assert!(
                    pred_info.num_succs_not_reaching_return > 0,
                    "bb{} has more incoming return edges than successors",
                    pred.raw()
                );
                pred_info.num_succs_not_reaching_return =
                    pred_info.num_succs_not_reaching_return.saturating_sub(1);

                if pred_info.has_invariant_condition && pred_info.num_succs_not_reaching_return > 0 {
                    continue;
                }

                pred_info.reaches_return = true;
                worklist.push(pred);
            }
        }

        let reaches = self.infos[function.entry.index()].reaches_return;
        tracing::debug!(
            function = function.name.raw(),
            ?invariants,
            entry_reaches_return = reaches,
            "propagated return reachability"
        );
        if reaches {
            self.trace_block_infos();
        }
        reaches
    }

    /// Propagate `reachable_from_entry` forward and warn at every recursive
    /// call it reaches. Returns `true` if a warning was emitted.
    ///
    /// Only meaningful after [`Self::is_entry_reachable_from_return`]
    /// returned `false`.
    pub fn find_recursive_calls_and_diagnose(&mut self, sink: &mut dyn DiagnosticSink) -> bool {
        let function = self.function;
        let entry = function.entry;
        if self.infos.len() != function.blocks.len() {
            return false;
        }

        let mut worklist: SmallVec<[BlockId; 32]> = SmallVec::new();
        self.infos[entry.index()].reachable_from_entry = true;
        worklist.push(entry);

        let mut found = false;
        while let Some(block) = worklist.pop() {
            if let Some(index) = self.infos[block.index()].recursive_call {
                sink.emit(infinite_recursion_warning(
                    function.span(block, index).unwrap_or(Span::DUMMY),
                ));
                found = true;
                continue;
            }
            for succ in function.block(block).terminator.successors() {
                let succ_info = &mut self.infos[succ.index()];
                if !succ_info.reaches_return && !succ_info.reachable_from_entry {
                    succ_info.reachable_from_entry = true;
                    worklist.push(succ);
                }
            }
        }

        self.trace_block_infos();
        found
    }

    fn trace_block_infos(&self) {
        if !tracing::enabled!(tracing::Level::TRACE) {
            return;
        }
        for (index, info) in self.infos.iter().enumerate() {
            tracing::trace!(
                block = index,
                num_succs = info.num_succs_not_reaching_return,
                has_recursive_call = info.recursive_call.is_some(),
                has_invariant_condition = info.has_invariant_condition,
                reaches_return = info.reaches_return,
                reaches_recursive_call = info.reachable_from_entry,
                "block summary"
            );
        }
    }
}

fn infinite_recursion_warning(span: Span) -> Diagnostic {
    Diagnostic::warning(ErrorCode::W4001)
        .with_message(INFINITE_RECURSION_MESSAGE)
        .with_label(span, "this call never returns")
}
