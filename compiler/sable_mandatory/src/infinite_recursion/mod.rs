//! Infinite-recursion diagnosis.
//!
//! Warns at recursive calls of a function that can never return except by
//! recursing forever:
//!
//! ```text
//! func f(_ x: Int) {
//!   if x > 0 {   // invariant: `x` is forwarded unchanged
//!     f(x)       // warning: function call causes an infinite recursion
//!   }
//! }
//! ```
//!
//! # Hypotheses
//!
//! Whether a condition is invariant depends on what is assumed unchanged
//! across activations ([`Invariants`]). Assuming more makes more conditions
//! invariant, but recursive calls that do not forward an assumed argument
//! stop counting. No single hypothesis catches every case, so the driver
//! tries a few: no invariants, then what each recursive call forwards, each
//! with and without invariant memory. The first one that produces a warning
//! wins. A warning is sound under every hypothesis.

mod analysis;
mod block_info;
mod classify;
mod invariants;

use sable_diagnostic::DiagnosticSink;
use sable_ir::Function;

pub use analysis::{InfiniteRecursionAnalysis, INFINITE_RECURSION_MESSAGE};
pub use block_info::BlockInfo;
pub use classify::{is_recursive_call, CallTargetResolver};
pub use invariants::{Invariants, InvariantsSet, MAX_ARG_INDEX};

use crate::graph::{full_applies, CfgFacts, ValueDefs};
use crate::pass::{FunctionPass, PassContext, PassStatus};

/// Most hypotheses tried per function.
pub const MAX_INVARIANTS_TO_TRY: usize = 4;

/// Why [`diagnose_infinite_recursion`] stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecursionOutcome {
    /// The function was deserialized from another module.
    Skipped,
    /// The function contains no recursive call.
    NoRecursiveCalls,
    /// Every hypothesis was tried without a warning.
    NotDiagnosed,
    /// Warnings were emitted under this hypothesis.
    Diagnosed(Invariants),
}

/// Collect the hypotheses to try into `invariants_to_try`: no invariants
/// first, then the arguments forwarded by each recursive call in block and
/// instruction order, up to [`MAX_INVARIANTS_TO_TRY`].
///
/// Returns `true` if the function has at least one recursive call.
pub fn collect_invariants_to_try(
    function: &Function,
    defs: &ValueDefs<'_>,
    resolver: &dyn CallTargetResolver,
    invariants_to_try: &mut InvariantsSet,
) -> bool {
    insert_unique(invariants_to_try, Invariants::empty());

    let mut found = false;
    for block in &function.blocks {
        for (_, site) in full_applies(block) {
            if !is_recursive_call(site, function, resolver) {
                continue;
            }
            found = true;
            insert_unique(
                invariants_to_try,
                Invariants::from_forwarding_arguments(site, function, defs),
            );
            if invariants_to_try.len() >= MAX_INVARIANTS_TO_TRY {
                return true;
            }
        }
    }
    found
}

fn insert_unique(set: &mut InvariantsSet, invariants: Invariants) {
    if !set.contains(&invariants) {
        set.push(invariants);
    }
}

/// Diagnose infinite recursion in `function`, emitting warnings to `sink`.
pub fn diagnose_infinite_recursion(
    function: &Function,
    resolver: &dyn CallTargetResolver,
    sink: &mut dyn DiagnosticSink,
) -> RecursionOutcome {
    // Already diagnosed when its own module was compiled.
    if function.was_deserialized() {
        tracing::debug!(
            function = function.name.raw(),
            "skipping deserialized function"
        );
        return RecursionOutcome::Skipped;
    }

    let facts = CfgFacts::new(function);
    let mut invariants_to_try = InvariantsSet::new();
    if !collect_invariants_to_try(function, facts.defs(), resolver, &mut invariants_to_try) {
        tracing::debug!(function = function.name.raw(), "no recursive calls");
        return RecursionOutcome::NoRecursiveCalls;
    }

    tracing::debug!(
        function = function.name.raw(),
        hypotheses = invariants_to_try.len(),
        "diagnosing infinite recursion"
    );

    let mut analysis = InfiniteRecursionAnalysis::new(function, &facts, resolver);
    for &invariants in &invariants_to_try {
        for candidate in [invariants, invariants.with_memory_invariant()] {
            if analysis.analyze_and_diagnose(candidate, sink) {
                tracing::debug!(
                    function = function.name.raw(),
                    invariants = ?candidate,
                    "found infinite recursion"
                );
                return RecursionOutcome::Diagnosed(candidate);
            }
        }
    }
    RecursionOutcome::NotDiagnosed
}

/// Function pass wrapper around [`diagnose_infinite_recursion`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DiagnoseInfiniteRecursion;

impl FunctionPass for DiagnoseInfiniteRecursion {
    fn name(&self) -> &'static str {
        "diagnose-infinite-recursion"
    }

    fn run(&self, cx: &mut PassContext<'_>, func: &Function) -> PassStatus {
        match diagnose_infinite_recursion(func, cx.resolver, cx.sink) {
            RecursionOutcome::Skipped => PassStatus::Skipped,
            _ => PassStatus::Ran,
        }
    }
}
