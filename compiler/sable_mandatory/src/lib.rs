//! Mandatory diagnostic passes for the Sable compiler.
//!
//! This crate provides:
//!
//! - **Pass harness** ([`FunctionPass`], [`run_module`]): runs function
//!   passes over a [`Module`](sable_ir::Module), in parallel across
//!   functions, collecting diagnostics in module order.
//!
//! - **Infinite-recursion diagnosis** ([`diagnose_infinite_recursion`],
//!   [`DiagnoseInfiniteRecursion`]): warns at recursive calls of functions
//!   that can never return except by recursing forever.
//!
//! - **CFG facts** ([`CfgFacts`], [`ValueDefs`]): per-edge predecessors and
//!   use-def lookups shared by analyses.
//!
//! # Tracing
//!
//! Passes log through `tracing`. Call [`init_tracing`] once at startup and
//! set `RUST_LOG=sable_mandatory=debug` (or `trace` for per-block state).

mod graph;
pub mod infinite_recursion;
mod pass;
#[cfg(test)]
mod test_helpers;

use std::sync::Once;

pub use graph::{CfgFacts, ValueDef, ValueDefs};
pub use infinite_recursion::{
    collect_invariants_to_try, diagnose_infinite_recursion, is_recursive_call, BlockInfo,
    CallTargetResolver, DiagnoseInfiniteRecursion, InfiniteRecursionAnalysis, Invariants,
    InvariantsSet, RecursionOutcome,
};
pub use pass::{run_module, FunctionPass, PassConfig, PassContext, PassStatus};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
