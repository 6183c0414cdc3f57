//! The terminal artifact of a pipeline run.

use crate::candidate::CandidateCode;

/// Final program text plus anything that still needs human attention.
///
/// A run always produces a program. Callers check
/// [`unresolved_issues`](Self::unresolved_issues) to learn whether the
/// program failed automated repair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineResult {
    program: String,
    unresolved_issues: Vec<String>,
    notes: Vec<String>,
    candidates: Vec<CandidateCode>,
}

impl PipelineResult {
    pub fn new(program: impl Into<String>, unresolved_issues: Vec<String>) -> Self {
        Self {
            program: program.into(),
            unresolved_issues,
            notes: Vec::new(),
            candidates: Vec::new(),
        }
    }

    /// Attaches the synthesizer notes collected during the run.
    pub fn with_notes(mut self, notes: Vec<String>) -> Self {
        self.notes = notes;
        self
    }

    /// Attaches the per-declaration candidates, in declaration order.
    pub fn with_candidates(mut self, candidates: Vec<CandidateCode>) -> Self {
        self.candidates = candidates;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn unresolved_issues(&self) -> &[String] {
        &self.unresolved_issues
    }

    /// Returns `true` if the run ended without a successful repair.
    pub fn has_unresolved_issues(&self) -> bool {
        !self.unresolved_issues.is_empty()
    }

    /// Synthesizer notes to persist alongside the program.
    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn candidates(&self) -> &[CandidateCode] {
        &self.candidates
    }
}
