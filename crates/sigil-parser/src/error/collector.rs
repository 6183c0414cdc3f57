//! Collector for accumulating diagnostics across scanning passes.

use crate::error::Diagnostic;

/// A collector for accumulating diagnostics.
///
/// Declarations and notes are scanned in separate passes; the collector
/// merges their warnings back into source order.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Emit a diagnostic to this collector.
    pub fn emit(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Finish collection and return the diagnostics ordered by position.
    ///
    /// The sort is stable, so diagnostics at the same offset keep their
    /// emission order.
    pub fn finish(mut self) -> Vec<Diagnostic> {
        self.diagnostics
            .sort_by_key(|diag| diag.primary_span().map_or(usize::MAX, |span| span.start()));
        self.diagnostics
    }
}
