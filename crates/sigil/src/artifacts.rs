//! Writing a run's results to disk.
//!
//! Next to the program file `out/app.py` a run may leave:
//!
//! - `out/app_notes.txt` - synthesizer notes, separated by blank lines
//! - `out/app_errors.txt` - unresolved issues, one per line
//!
//! Side files are only written when they would be non-empty.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::{debug, info};

use sigil_core::{language::TargetLanguage, result::PipelineResult, source::SourceDocument};

/// Paths written by [`write_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenArtifacts {
    program: PathBuf,
    notes: Option<PathBuf>,
    errors: Option<PathBuf>,
}

impl WrittenArtifacts {
    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn notes(&self) -> Option<&Path> {
        self.notes.as_deref()
    }

    pub fn errors(&self) -> Option<&Path> {
        self.errors.as_deref()
    }
}

/// Path of the `<stem>_<suffix>.txt` file beside `output`.
pub fn side_artifact_path(output: &Path, suffix: &str) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    output.with_file_name(format!("{stem}_{suffix}.txt"))
}

/// Write the program and its non-empty side artifacts.
///
/// Notes are written whether or not the run left unresolved issues.
///
/// # Errors
///
/// Returns any I/O error from creating the output directory or writing a
/// file.
pub fn write_artifacts(output: &Path, result: &PipelineResult) -> io::Result<WrittenArtifacts> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    fs::write(output, result.program())?;
    info!(path:? = output; "Program written");

    let notes = write_side(output, "notes", &result.notes().join("\n\n"))?;
    let errors = write_side(output, "errors", &result.unresolved_issues().join("\n"))?;

    Ok(WrittenArtifacts {
        program: output.to_path_buf(),
        notes,
        errors,
    })
}

fn write_side(output: &Path, suffix: &str, contents: &str) -> io::Result<Option<PathBuf>> {
    if contents.is_empty() {
        return Ok(None);
    }
    let path = side_artifact_path(output, suffix);
    fs::write(&path, contents)?;
    info!(path:?; "Side artifact written");
    Ok(Some(path))
}

/// Write every per-declaration candidate to `dir` as
/// `<index>_<name>.<extension>`, with 1-based indices.
///
/// # Errors
///
/// Returns any I/O error from creating `dir` or writing a file.
pub fn write_candidates(
    dir: &Path,
    document: &SourceDocument,
    result: &PipelineResult,
    language: TargetLanguage,
) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(result.candidates().len());
    for (index, (declaration, candidate)) in document
        .declarations()
        .iter()
        .zip(result.candidates())
        .enumerate()
    {
        let path = dir.join(format!(
            "{}_{}.{}",
            index + 1,
            declaration.name(),
            language.extension()
        ));
        fs::write(&path, candidate.text())?;
        debug!(path:?; "Candidate written");
        written.push(path);
    }
    Ok(written)
}
