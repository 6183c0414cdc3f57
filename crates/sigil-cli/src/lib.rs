//! Sigil CLI library
//!
//! This module contains the core CLI logic for the Sigil compiler.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use log::{info, warn};

use sigil::{
    Compiler, SigilError,
    artifacts::{self, WrittenArtifacts},
    language::TargetLanguage,
    model::CodeModel,
    source::SourceDocument,
};

use error_adapter::{render, warning_reportables};

/// What a successful run did.
#[derive(Debug)]
pub enum Outcome {
    /// `--parse-only` listed the document without calling the model.
    Parsed { declarations: usize, notes: usize },
    /// The pipeline ran and its artifacts were written.
    Compiled {
        artifacts: WrittenArtifacts,
        unresolved_issues: Vec<String>,
    },
}

impl Outcome {
    /// Whether the program still needs manual review.
    pub fn has_unresolved_issues(&self) -> bool {
        match self {
            Outcome::Parsed { .. } => false,
            Outcome::Compiled {
                unresolved_issues, ..
            } => !unresolved_issues.is_empty(),
        }
    }
}

/// Run the Sigil CLI application
///
/// Loads configuration, parses the input file and, unless `--parse-only`
/// is set, compiles it with the configured OpenAI-compatible model.
///
/// # Errors
///
/// Returns `SigilError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - A missing model API key
pub fn run(args: &Args) -> Result<Outcome, SigilError> {
    info!(
        input_path = args.input,
        output_path:? = args.output;
        "Processing declarations"
    );

    let compiler = build_compiler(args)?;

    if args.parse_only {
        return parse_only(args, &compiler, &mut io::stdout().lock());
    }

    let model = compiler.model_client()?;
    compile_with(args, &compiler, &model)
}

/// Load the configuration for `args` and apply command-line overrides.
///
/// # Errors
///
/// Returns `SigilError::Config` if a configuration file is missing or
/// invalid.
pub fn build_compiler(args: &Args) -> Result<Compiler, SigilError> {
    let mut app_config = config::load_config(args.config.as_ref())?;

    if let Some(language) = args.language {
        app_config = app_config.with_language(language);
    }
    if let Some(model) = &args.model {
        app_config = app_config.with_model_name(model);
    }

    Ok(Compiler::new(app_config))
}

/// Compile the input of `args` with `model` and write the artifacts.
///
/// # Errors
///
/// Returns `SigilError::Io` if the input cannot be read or an artifact
/// cannot be written.
pub fn compile_with(
    args: &Args,
    compiler: &Compiler,
    model: &dyn CodeModel,
) -> Result<Outcome, SigilError> {
    let source = fs::read_to_string(&args.input)?;
    let parsed = compiler.parse(&source);
    report_warnings(&source, parsed.warnings());

    let analyzer = compiler.analyzer();
    let result = compiler.compile(parsed.document(), model, analyzer.as_ref());

    let language = compiler.config().language();
    let output = output_path(args, language);
    let artifacts = artifacts::write_artifacts(&output, &result)?;

    if let Some(dir) = &args.emit_candidates {
        let written =
            artifacts::write_candidates(Path::new(dir), parsed.document(), &result, language)?;
        info!(dir, count = written.len(); "Candidates written");
    }

    if result.has_unresolved_issues() {
        warn!(
            issues = result.unresolved_issues().len(),
            output_file:? = artifacts.program();
            "Program written with unresolved issues, manual review required"
        );
    } else {
        info!(output_file:? = artifacts.program(); "Program written successfully");
    }

    Ok(Outcome::Compiled {
        artifacts,
        unresolved_issues: result.unresolved_issues().to_vec(),
    })
}

/// Parse the input of `args` and list its blocks to `out`.
fn parse_only(
    args: &Args,
    compiler: &Compiler,
    out: &mut impl Write,
) -> Result<Outcome, SigilError> {
    let source = fs::read_to_string(&args.input)?;
    let parsed = compiler.parse(&source);
    report_warnings(&source, parsed.warnings());

    write_listing(out, parsed.document())?;

    Ok(Outcome::Parsed {
        declarations: parsed.document().declarations().len(),
        notes: parsed.document().notes().len(),
    })
}

fn write_listing(out: &mut impl Write, document: &SourceDocument) -> io::Result<()> {
    writeln!(out, "declarations ({}):", document.declarations().len())?;
    for (index, declaration) in document.declarations().iter().enumerate() {
        writeln!(out, "  {}. {}: {}", index + 1, declaration.name(), declaration.text())?;
    }
    writeln!(out, "notes ({}):", document.notes().len())?;
    for note in document.notes() {
        writeln!(out, "  - {}", note.text().trim())?;
    }
    Ok(())
}

fn report_warnings(source: &str, warnings: &[sigil::Diagnostic]) {
    for reportable in warning_reportables(warnings, source) {
        warn!("{}", render(&reportable));
    }
}

/// The output path: `--output`, else the input path with the language
/// extension. Never the input file itself.
fn output_path(args: &Args, language: TargetLanguage) -> PathBuf {
    if let Some(output) = &args.output {
        return PathBuf::from(output);
    }

    let input = Path::new(&args.input);
    let output = input.with_extension(language.extension());
    if output == input {
        input.with_extension(format!("out.{}", language.extension()))
    } else {
        output
    }
}

#[cfg(test)]
mod tests {
    use sigil::{source::Declaration, span::Span};

    use super::*;

    fn args(input: &str, output: Option<&str>) -> Args {
        Args {
            input: input.to_string(),
            output: output.map(str::to_string),
            config: None,
            language: None,
            model: None,
            emit_candidates: None,
            parse_only: false,
            log_level: "off".to_string(),
        }
    }

    #[test]
    fn test_output_path_defaults_to_language_extension() {
        assert_eq!(
            output_path(&args("demos/adder.sig", None), TargetLanguage::Python),
            PathBuf::from("demos/adder.py")
        );
        assert_eq!(
            output_path(&args("Main.sig", None), TargetLanguage::Java),
            PathBuf::from("Main.java")
        );
        assert_eq!(
            output_path(&args("in.sig", Some("out/prog.py")), TargetLanguage::Java),
            PathBuf::from("out/prog.py")
        );
    }

    #[test]
    fn test_output_path_never_overwrites_input() {
        assert_eq!(
            output_path(&args("script.py", None), TargetLanguage::Python),
            PathBuf::from("script.out.py")
        );
    }

    #[test]
    fn test_write_listing() {
        let document = SourceDocument::new(
            vec![Declaration::new(
                "add",
                "!func name=add[adds]",
                Span::new(0..20),
            )],
            vec![sigil::source::Note::new(" stdlib only ", Span::new(21..40))],
        );

        let mut out = Vec::new();
        write_listing(&mut out, &document).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "declarations (1):\n  1. add: !func name=add[adds]\nnotes (1):\n  - stdlib only\n"
        );
    }

    #[test]
    fn test_overrides_apply_to_config() {
        let mut args = args("in.sig", None);
        args.language = Some(TargetLanguage::Java);
        args.model = Some("gpt-4o".to_string());

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.toml");
        fs::write(&config_path, "[model]\nname = \"gpt-4o-mini\"\n").unwrap();
        args.config = Some(config_path.to_string_lossy().to_string());

        let compiler = build_compiler(&args).unwrap();

        assert_eq!(compiler.config().language(), TargetLanguage::Java);
        assert_eq!(compiler.config().model().name(), "gpt-4o");
    }
}
