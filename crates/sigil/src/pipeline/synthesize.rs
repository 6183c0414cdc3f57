//! Per-declaration code synthesis.

use log::{debug, warn};

use sigil_core::{
    candidate::{CandidateCode, NoteSet},
    language::TargetLanguage,
    source::Declaration,
};

use super::StageContext;
use crate::{
    config::Stage,
    model::{self, GeneratedCode, ModelError, OutputShape},
};

/// Why synthesis fell back to a marker instead of code.
enum Fallback<'e> {
    TimedOut,
    Failed(&'e ModelError),
    NothingReturned,
}

/// Generate code for one declaration.
///
/// The request carries the declaration text verbatim. When the model times
/// out, fails, or returns blank code, the candidate is a comment in the
/// target language that embeds the signature, with `raised_exception` set.
pub fn synthesize(
    context: &StageContext<'_>,
    declaration: &Declaration,
    notes: &NoteSet,
) -> CandidateCode {
    let language = context.config().language();
    let signature = declaration.text();
    let request = context.request(
        Stage::Synthesis,
        GeneratedCode::response_format(),
        notes,
        signature,
    );

    match model::call::<GeneratedCode>(context.model(), &request) {
        Ok(generated) => {
            let returned_notes = generated.notes.unwrap_or_default();
            match generated.code {
                Some(code) if !code.trim().is_empty() => {
                    debug!(
                        name = declaration.name(),
                        raised_exception = generated.raised_exception;
                        "Declaration synthesized"
                    );
                    CandidateCode::new(code, generated.raised_exception, returned_notes)
                }
                _ => {
                    warn!(name = declaration.name(); "Model returned no code for declaration");
                    CandidateCode::new(
                        fallback_marker(language, &Fallback::NothingReturned, signature),
                        true,
                        returned_notes,
                    )
                }
            }
        }
        Err(ModelError::Timeout(timeout)) => {
            warn!(name = declaration.name(), timeout:?; "Synthesis timed out");
            CandidateCode::new(
                fallback_marker(language, &Fallback::TimedOut, signature),
                true,
                "",
            )
        }
        Err(err) => {
            warn!(name = declaration.name(), err:%; "Synthesis failed");
            CandidateCode::new(
                fallback_marker(language, &Fallback::Failed(&err), signature),
                true,
                "",
            )
        }
    }
}

/// Deterministic marker text for a declaration that produced no code.
fn fallback_marker(language: TargetLanguage, fallback: &Fallback<'_>, signature: &str) -> String {
    let unit = language.unit_noun();
    let text = match fallback {
        Fallback::TimedOut => {
            format!("Error: API request timed out for {unit} signature: {signature}")
        }
        Fallback::Failed(err) => format!(
            "Error during compilation! Errored {unit} signature: {signature} Error: {err}"
        ),
        Fallback::NothingReturned => {
            // Java output puts the signature on its own comment line.
            let separator = match language {
                TargetLanguage::Python => " ",
                TargetLanguage::Java => "\n",
            };
            format!(
                "Error during compilation! LLM did not return anything!{separator}\
                 Errored {unit} signature: {signature}"
            )
        }
    };
    language.comment(&text)
}
