//! System prompts for the model-backed stages.

use sigil_core::language::TargetLanguage;

use crate::config::{PromptOverrides, Stage};

/// The system prompt of every stage for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    synthesis: String,
    refinement: String,
    review: String,
    correction: String,
}

impl PromptSet {
    /// Built-in prompts for `language`.
    pub fn for_language(language: TargetLanguage) -> Self {
        let lang = language.display_name();
        let unit = language.unit_noun();
        let run_hint = language.run_hint();
        let shared = "Include necessary imports and handle edge cases. \
                      Do not include any unnecessary code or comments.\n\
                      Readability is not a concern. Focus on correctness and completeness.";

        Self {
            synthesis: format!(
                "You convert {unit} signatures into working {lang} code.\n\
                 Given a {unit} signature, write the complete {unit} implementation in {lang}.\n\
                 The code must be syntactically correct and follow best practices.\n\
                 {shared}\n\
                 The user input is always a {unit} signature.\n\
                 Do NOT add TODOs or placeholders.\n\
                 The code must work the way the user intended.\n\
                 Unless told otherwise, everything lives in one file that works by {run_hint}.\n\
                 Set raised_exception to true only if you could not implement the {unit}.\n\
                 Use notes for anything later {unit}s need to know; leave them blank otherwise."
            ),
            refinement: format!(
                "Review the following {lang} program and fix any issues or improve its quality.\n\
                 Make sure it follows best practices and performs well.\n\
                 {shared}\n\
                 Return the complete program."
            ),
            review: format!(
                "Check the following {lang} program for errors or improvements.\n\
                 Make sure it follows best practices and performs well.\n\
                 {shared}\n\
                 If the program is correct and you cannot spot any errors, return empty code."
            ),
            correction: format!(
                "You fix errors in {lang} code.\n\
                 Given the errors and the code, return a corrected version of the whole program.\n\
                 Every error must be resolved and the code must follow best practices.\n\
                 {shared}\n\
                 Set success to false if you could not fix the errors."
            ),
        }
    }

    /// Replace built-in prompts with the configured overrides.
    pub fn with_overrides(mut self, overrides: &PromptOverrides) -> Self {
        for stage in [
            Stage::Synthesis,
            Stage::Refinement,
            Stage::Review,
            Stage::Correction,
        ] {
            if let Some(text) = overrides.get(stage) {
                *self.slot_mut(stage) = text.to_string();
            }
        }
        self
    }

    /// The system prompt for `stage`.
    pub fn get(&self, stage: Stage) -> &str {
        match stage {
            Stage::Synthesis => &self.synthesis,
            Stage::Refinement => &self.refinement,
            Stage::Review => &self.review,
            Stage::Correction => &self.correction,
        }
    }

    fn slot_mut(&mut self, stage: Stage) -> &mut String {
        match stage {
            Stage::Synthesis => &mut self.synthesis,
            Stage::Refinement => &mut self.refinement,
            Stage::Review => &mut self.review,
            Stage::Correction => &mut self.correction,
        }
    }
}
