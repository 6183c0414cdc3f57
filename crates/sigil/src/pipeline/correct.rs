//! Bounded error correction.

use log::{debug, info, warn};

use sigil_core::candidate::NoteSet;

use super::StageContext;
use crate::{
    analyzer::Issue,
    config::Stage,
    model::{self, FixAttempt, OutputShape},
};

/// Terminal state of the correction loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Correction {
    /// The model reported success with non-blank code.
    Resolved { code: String, attempts: u32 },
    /// Every attempt failed; `code` and `issues` are the loop's inputs.
    Exhausted {
        code: String,
        issues: Vec<Issue>,
        attempts: u32,
    },
}

impl Correction {
    /// Model calls made by the loop.
    pub fn attempts(&self) -> u32 {
        match self {
            Correction::Resolved { attempts, .. } | Correction::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }
}

/// Ask the model to fix `issues` in `code`.
///
/// Makes at most `max_retries + 1` calls. Each retry re-sends the original
/// code and issues; a failed attempt never changes what is sent next.
pub fn correct(
    context: &StageContext<'_>,
    code: &str,
    issues: &[Issue],
    notes: &NoteSet,
) -> Correction {
    let max_attempts = context.config().correction().max_retries().saturating_add(1);
    let request = context.request(
        Stage::Correction,
        FixAttempt::response_format(),
        notes,
        correction_payload(code, issues),
    );

    for attempt in 1..=max_attempts {
        info!(attempt, max_attempts, issues = issues.len(); "Requesting correction");
        match model::call::<FixAttempt>(context.model(), &request) {
            Ok(FixAttempt {
                fixed_code: Some(fixed),
                success: true,
            }) if !fixed.trim().is_empty() => {
                debug!(attempt; "Correction resolved");
                return Correction::Resolved {
                    code: fixed,
                    attempts: attempt,
                };
            }
            Ok(_) => debug!(attempt; "Model could not fix the program"),
            Err(err) => warn!(attempt, err:%; "Correction attempt failed"),
        }
    }

    warn!(attempts = max_attempts; "Correction attempts exhausted");
    Correction::Exhausted {
        code: code.to_string(),
        issues: issues.to_vec(),
        attempts: max_attempts,
    }
}

fn correction_payload(code: &str, issues: &[Issue]) -> String {
    let errors = issues
        .iter()
        .map(|issue| format!("- {issue}"))
        .collect::<Vec<_>>()
        .join("\n");
    format!("Errors:\n{errors}\n\nCode:\n{code}")
}
