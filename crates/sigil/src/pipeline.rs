//! The compilation pipeline.
//!
//! A run moves a parsed document through fixed stages:
//!
//! 1. **Synthesize** each declaration into a candidate, carrying notes
//!    forward ([`synthesize`])
//! 2. **Assemble** the candidates into one program ([`assemble`])
//! 3. **Refine** and then **review** the whole program ([`refine`],
//!    [`review`])
//! 4. **Analyze** the program and **correct** reported issues, re-analyzing
//!    once after a successful fix ([`correct`])
//!
//! Stages never fail the run. Model and analyzer failures degrade into
//! sentinel code, an unchanged program, or unresolved issues in the
//! [`PipelineResult`].

mod assemble;
mod correct;
mod rewrite;
mod synthesize;

pub use assemble::assemble;
pub use correct::{Correction, correct};
pub use rewrite::{refine, review};
pub use synthesize::synthesize;

use log::{info, warn};

use sigil_core::{candidate::NoteSet, result::PipelineResult, source::SourceDocument};

use crate::{
    analyzer::{self, Issue, StaticAnalyzer},
    config::{AppConfig, Stage},
    model::{CodeModel, CompletionRequest, Message, ResponseFormat},
    prompt::PromptSet,
};

/// Everything a model-backed stage needs for one call.
pub struct StageContext<'a> {
    model: &'a dyn CodeModel,
    config: &'a AppConfig,
    prompts: PromptSet,
}

impl<'a> StageContext<'a> {
    /// Create a context using the configured prompts for the configured
    /// language.
    pub fn new(model: &'a dyn CodeModel, config: &'a AppConfig) -> Self {
        let prompts =
            PromptSet::for_language(config.language()).with_overrides(config.prompts());
        Self {
            model,
            config,
            prompts,
        }
    }

    pub fn model(&self) -> &'a dyn CodeModel {
        self.model
    }

    pub fn config(&self) -> &'a AppConfig {
        self.config
    }

    pub fn prompts(&self) -> &PromptSet {
        &self.prompts
    }

    /// Build the request for `stage`: system prompt, then the note context
    /// when there is any, then `payload`.
    pub fn request(
        &self,
        stage: Stage,
        response_format: ResponseFormat,
        notes: &NoteSet,
        payload: impl Into<String>,
    ) -> CompletionRequest {
        let mut request = CompletionRequest::new(self.config.model_for(stage), response_format)
            .with_temperature(self.config.temperature(stage))
            .with_timeout(self.config.model().timeout())
            .with_message(Message::system(self.prompts.get(stage)));

        if !notes.is_empty() {
            request = request.with_message(Message::user(format!(
                "These are notes the user left:\n{}",
                notes.context()
            )));
        }

        request.with_message(Message::user(payload))
    }
}

/// Runs every stage over a document.
pub struct Pipeline<'a> {
    context: StageContext<'a>,
    analyzer: &'a dyn StaticAnalyzer,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: &'a AppConfig,
        model: &'a dyn CodeModel,
        analyzer: &'a dyn StaticAnalyzer,
    ) -> Self {
        Self {
            context: StageContext::new(model, config),
            analyzer,
        }
    }

    /// Compile `document` into a program.
    ///
    /// A document with no declarations yields an empty program without
    /// calling the model.
    pub fn run(&self, document: &SourceDocument) -> PipelineResult {
        let declarations = document.declarations();
        if declarations.is_empty() {
            warn!("No declarations found, nothing to compile");
            return PipelineResult::default();
        }

        info!(declarations = declarations.len(); "Starting synthesis");
        let mut notes = NoteSet::new(document.note_texts());
        let mut candidates = Vec::with_capacity(declarations.len());

        for (index, declaration) in declarations.iter().enumerate() {
            info!(
                index = index + 1,
                total = declarations.len(),
                name = declaration.name();
                "Synthesizing declaration"
            );
            let candidate = synthesize(&self.context, declaration, &notes);
            notes.push_generated(candidate.notes());
            candidates.push(candidate);
        }

        let program = assemble(candidates.iter().map(|candidate| candidate.text()));

        info!("Refining program");
        let program = refine(&self.context, program, &notes);

        info!("Reviewing program");
        let program = review(&self.context, program, &notes);

        info!("Checking program");
        let (program, unresolved) = self.repair(program, &notes);

        if unresolved.is_empty() {
            info!("Compilation finished");
        } else {
            warn!(issues = unresolved.len(); "Compilation finished with unresolved issues");
        }

        PipelineResult::new(program, unresolved)
            .with_notes(notes.generated().to_vec())
            .with_candidates(candidates)
    }

    /// Analyze, correct, and re-check a corrected program once.
    fn repair(&self, program: String, notes: &NoteSet) -> (String, Vec<String>) {
        let issues = analyzer::analyze(self.analyzer, &program);
        if issues.is_empty() {
            return (program, Vec::new());
        }
        log_issues(&issues);

        let fixed = match correct(&self.context, &program, &issues, notes) {
            Correction::Resolved { code, .. } => code,
            Correction::Exhausted { code, issues, .. } => return (code, messages(&issues)),
        };

        let regressions = analyzer::analyze(self.analyzer, &fixed);
        if regressions.is_empty() {
            return (fixed, Vec::new());
        }
        info!("Corrected program still has issues, correcting again");
        log_issues(&regressions);

        match correct(&self.context, &fixed, &regressions, notes) {
            Correction::Resolved { code, .. } => (code, Vec::new()),
            Correction::Exhausted { code, issues, .. } => (code, messages(&issues)),
        }
    }
}

fn log_issues(issues: &[Issue]) {
    warn!(count = issues.len(); "Static analysis reported issues");
    for issue in issues {
        warn!(issue = issue.message(); "Issue");
    }
}

fn messages(issues: &[Issue]) -> Vec<String> {
    issues.iter().map(|issue| issue.message().to_string()).collect()
}
