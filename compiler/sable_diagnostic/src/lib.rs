//! Diagnostic reporting for the Sable compiler's mandatory passes.
//!
//! Passes build [`Diagnostic`]s and hand them to a [`DiagnosticSink`]. A
//! plain `Vec<Diagnostic>` collects everything; a [`DiagnosticQueue`] applies
//! the warning limit and deduplication from [`DiagnosticConfig`] and returns
//! the survivors in source order.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue, DiagnosticSink};
