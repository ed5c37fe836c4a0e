//! Collecting, limiting, and ordering diagnostics.

use rustc_hash::FxHashSet;
use sable_ir::Span;

use crate::{Diagnostic, ErrorCode};

/// Destination for diagnostics emitted by a pass.
pub trait DiagnosticSink {
    fn emit(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Configuration for diagnostic processing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DiagnosticConfig {
    /// Maximum number of warnings kept (0 = unlimited). Errors are never
    /// dropped.
    pub warning_limit: usize,
    /// Drop a diagnostic whose code and primary span match one already queued.
    pub deduplicate: bool,
}

impl Default for DiagnosticConfig {
    fn default() -> Self {
        DiagnosticConfig {
            warning_limit: 100,
            deduplicate: true,
        }
    }
}

impl DiagnosticConfig {
    /// Create a config with no limits (for testing).
    pub fn unlimited() -> Self {
        DiagnosticConfig {
            warning_limit: 0,
            deduplicate: false,
        }
    }
}

/// Queue for collecting, deduplicating, and sorting diagnostics.
///
/// ```text
/// let mut queue = DiagnosticQueue::new();
/// queue.add(diagnostic);
/// // ... add more diagnostics
/// let sorted = queue.flush();
/// ```
#[derive(Debug, Default)]
pub struct DiagnosticQueue {
    diagnostics: Vec<Diagnostic>,
    warning_count: usize,
    seen: FxHashSet<(ErrorCode, Option<Span>)>,
    config: DiagnosticConfig,
}

impl DiagnosticQueue {
    /// Create a new diagnostic queue with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a diagnostic queue with custom configuration.
    pub fn with_config(config: DiagnosticConfig) -> Self {
        DiagnosticQueue {
            config,
            ..Self::default()
        }
    }

    /// Add a diagnostic to the queue.
    ///
    /// Returns `true` if the diagnostic was added, `false` if it was filtered.
    pub fn add(&mut self, diag: Diagnostic) -> bool {
        let is_error = diag.is_error();
        if !is_error && self.limit_reached() {
            return false;
        }

        if self.config.deduplicate && !self.seen.insert((diag.code, diag.primary_span())) {
            return false;
        }

        if !is_error {
            self.warning_count += 1;
        }
        self.diagnostics.push(diag);
        true
    }

    /// Check if the warning limit has been reached.
    pub fn limit_reached(&self) -> bool {
        self.config.warning_limit > 0 && self.warning_count >= self.config.warning_limit
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Take all queued diagnostics, sorted by primary span, and reset the
    /// queue.
    ///
    /// The sort is stable; diagnostics without a primary span come last in
    /// insertion order.
    pub fn flush(&mut self) -> Vec<Diagnostic> {
        let mut result = std::mem::take(&mut self.diagnostics);
        result.sort_by_key(|d| {
            let span = d.primary_span();
            (span.is_none(), span)
        });

        self.warning_count = 0;
        self.seen.clear();

        result
    }
}

impl DiagnosticSink for DiagnosticQueue {
    fn emit(&mut self, diagnostic: Diagnostic) {
        self.add(diagnostic);
    }
}
