//! Function-pass harness.
//!
//! Runs an ordered list of [`FunctionPass`]es over every function of a
//! [`Module`], optionally in parallel across functions. Diagnostics come
//! back in module function order regardless of scheduling.

use rayon::prelude::*;

use sable_diagnostic::{Diagnostic, DiagnosticSink};
use sable_ir::{verify_function, Function, Module};

use crate::infinite_recursion::CallTargetResolver;

/// Whether a pass did any work on a function.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PassStatus {
    Ran,
    Skipped,
}

/// What a pass may use while running on one function.
pub struct PassContext<'a> {
    pub resolver: &'a dyn CallTargetResolver,
    pub sink: &'a mut dyn DiagnosticSink,
}

impl<'a> PassContext<'a> {
    pub fn new(resolver: &'a dyn CallTargetResolver, sink: &'a mut dyn DiagnosticSink) -> Self {
        PassContext { resolver, sink }
    }
}

/// A pass run once per function.
///
/// Passes are shared across worker threads and must not keep per-function
/// state in `self`.
pub trait FunctionPass: Sync {
    fn name(&self) -> &'static str;

    fn run(&self, cx: &mut PassContext<'_>, func: &Function) -> PassStatus;
}

/// Configuration for [`run_module`].
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct PassConfig {
    /// Do not run passes on functions deserialized from other modules.
    pub skip_deserialized: bool,
    /// Verify each function's CFG first and skip functions that fail.
    pub verify_cfg: bool,
    /// Run functions on the rayon thread pool.
    pub parallel: bool,
}

impl Default for PassConfig {
    fn default() -> Self {
        PassConfig {
            skip_deserialized: true,
            verify_cfg: cfg!(debug_assertions),
            parallel: true,
        }
    }
}

/// Run `passes` in order on every function of `module`.
pub fn run_module(
    module: &Module,
    passes: &[&dyn FunctionPass],
    config: &PassConfig,
) -> Vec<Diagnostic> {
    let run_one = |func: &Function| run_function(module, func, passes, config);

    let per_function: Vec<Vec<Diagnostic>> = if config.parallel {
        module.functions.par_iter().map(run_one).collect()
    } else {
        module.functions.iter().map(run_one).collect()
    };

    let diagnostics: Vec<Diagnostic> = per_function.into_iter().flatten().collect();
    tracing::debug!(
        module = module.name.raw(),
        functions = module.functions.len(),
        diagnostics = diagnostics.len(),
        "ran function passes"
    );
    diagnostics
}

fn run_function(
    module: &Module,
    func: &Function,
    passes: &[&dyn FunctionPass],
    config: &PassConfig,
) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();

    if config.skip_deserialized && func.was_deserialized() {
        tracing::debug!(function = func.name.raw(), "skipping deserialized function");
        return diagnostics;
    }
    if config.verify_cfg {
        if let Err(err) = verify_function(func) {
            tracing::warn!(
                function = func.name.raw(),
                %err,
                "skipping function with malformed CFG"
            );
            return diagnostics;
        }
    }

    let mut cx = PassContext::new(module, &mut diagnostics);
    for pass in passes {
        let status = pass.run(&mut cx, func);
        tracing::trace!(function = func.name.raw(), pass = pass.name(), ?status, "ran pass");
    }

    diagnostics
}

#[cfg(test)]
mod tests;
