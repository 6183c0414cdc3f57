//! Whole-program rewriting stages: refinement and review.
//!
//! Both stages send the full program and keep it unless the model returns
//! non-blank replacement code. For review an empty answer is the normal
//! "no issues found" outcome.

use log::{debug, info, warn};

use sigil_core::candidate::NoteSet;

use super::StageContext;
use crate::{
    config::Stage,
    model::{self, GeneratedCode, OutputShape},
};

/// Ask the model to improve `program`.
pub fn refine(context: &StageContext<'_>, program: String, notes: &NoteSet) -> String {
    rewrite(context, Stage::Refinement, program, notes)
}

/// Ask the model for a final correctness pass over `program`.
pub fn review(context: &StageContext<'_>, program: String, notes: &NoteSet) -> String {
    rewrite(context, Stage::Review, program, notes)
}

fn rewrite(
    context: &StageContext<'_>,
    stage: Stage,
    program: String,
    notes: &NoteSet,
) -> String {
    let request = context.request(
        stage,
        GeneratedCode::response_format(),
        notes,
        program.as_str(),
    );

    match model::call::<GeneratedCode>(context.model(), &request) {
        Ok(GeneratedCode {
            code: Some(code), ..
        }) if !code.trim().is_empty() => {
            debug!(stage = stage.name(), bytes = code.len(); "Program replaced");
            code
        }
        Ok(_) if stage == Stage::Review => {
            info!("Review found no issues");
            program
        }
        Ok(_) => {
            info!(stage = stage.name(); "Model returned no code, keeping program");
            program
        }
        Err(err) => {
            warn!(stage = stage.name(), err:%; "Model call failed, keeping program");
            program
        }
    }
}
