use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::{TempDir, tempdir};

use sigil::model::{CodeModel, CompletionRequest, ModelError};
use sigil_cli::{Args, Outcome, build_compiler, compile_with, run};

/// Stand-in model: implements each declaration as a stub function, keeps
/// the program on refinement and review, and never manages a fix.
struct StubModel;

impl CodeModel for StubModel {
    fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        if request.response_format().name() == "error_fix" {
            return Ok(r#"{"fixed_code": "", "success": false}"#.to_string());
        }

        let payload = request
            .messages()
            .last()
            .map(|message| message.content())
            .unwrap_or_default();

        match declared_name(payload) {
            Some(name) => Ok(format!(
                r#"{{"code": "def {name}(*args):\n    return None", "raised_exception": false, "notes": "{name} is a stub"}}"#
            )),
            None => Ok(r#"{"code": "", "raised_exception": false, "notes": ""}"#.to_string()),
        }
    }
}

/// The `name=` attribute of a declaration payload.
fn declared_name(payload: &str) -> Option<&str> {
    if !payload.starts_with('!') {
        return None;
    }
    let rest = &payload[payload.find("name=")? + "name=".len()..];
    let end = rest.find('[')?;
    Some(&rest[..end])
}

/// Collects all .sig files from a directory
fn collect_sig_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("sig")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn demos_path() -> PathBuf {
    // Demos are at workspace root, relative to workspace not the crate
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

/// Writes a config file into `dir` and returns its path.
fn write_config(dir: &TempDir, contents: &str) -> String {
    let path = dir.path().join("config.toml");
    fs::write(&path, contents).expect("Failed to write config");
    path.to_string_lossy().to_string()
}

fn args(input: &Path, output: PathBuf, config: String) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: Some(output.to_string_lossy().to_string()),
        config: Some(config),
        language: None,
        model: None,
        emit_candidates: None,
        parse_only: false,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(&temp_dir, "[analyzer]\nenabled = false\n");

    let demos = collect_sig_files(demos_path());
    assert!(!demos.is_empty(), "No demos found in demos/");

    let mut failed = Vec::new();

    for demo in &demos {
        let stem = demo.file_stem().unwrap().to_string_lossy().to_string();
        let output = temp_dir.path().join(format!("{stem}.py"));
        let args = args(demo, output.clone(), config.clone());

        let compiler = build_compiler(&args).expect("Failed to build compiler");
        match compile_with(&args, &compiler, &StubModel) {
            Ok(outcome) => {
                assert!(!outcome.has_unresolved_issues(), "{stem}: unexpected issues");

                let program = fs::read_to_string(&output).expect("Program not written");
                let source = fs::read_to_string(demo).unwrap();
                let parsed = compiler.parse(&source);
                for declaration in parsed.document().declarations() {
                    assert!(
                        program.contains(&format!("def {}(", declaration.name())),
                        "{stem}: missing {}",
                        declaration.name()
                    );
                }

                let notes = temp_dir.path().join(format!("{stem}_notes.txt"));
                let notes = fs::read_to_string(notes).expect("Notes not written");
                assert_eq!(
                    notes.split("\n\n").count(),
                    parsed.document().declarations().len()
                );
                assert!(!temp_dir.path().join(format!("{stem}_errors.txt")).exists());
            }
            Err(e) => failed.push((demo.clone(), e)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }

    println!("✅ All {} demos passed", demos.len());
}

#[test]
fn e2e_emit_candidates() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(&temp_dir, "[analyzer]\nenabled = false\n");
    let demo = demos_path().join("calculator.sig");
    let candidates = temp_dir.path().join("candidates");

    let mut args = args(&demo, temp_dir.path().join("calculator.py"), config);
    args.emit_candidates = Some(candidates.to_string_lossy().to_string());

    let compiler = build_compiler(&args).unwrap();
    compile_with(&args, &compiler, &StubModel).expect("compile failed");

    let mut written: Vec<_> = fs::read_dir(&candidates)
        .unwrap()
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    written.sort();
    assert_eq!(written, ["1_add.py", "2_divide.py", "3_main.py"]);
}

#[cfg(unix)]
#[test]
fn e2e_unresolved_issues_are_reported() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(
        &temp_dir,
        r#"
[correction]
max_retries = 1

[analyzer]
command = ["sh", "-c", "echo 'line 1: broken' >&2; exit 1"]
"#,
    );
    let demo = demos_path().join("calculator.sig");
    let output = temp_dir.path().join("calculator.py");
    let args = args(&demo, output.clone(), config);

    let compiler = build_compiler(&args).unwrap();
    let outcome = compile_with(&args, &compiler, &StubModel).expect("compile failed");

    assert!(outcome.has_unresolved_issues());
    match outcome {
        Outcome::Compiled {
            artifacts,
            unresolved_issues,
        } => {
            assert_eq!(unresolved_issues, ["line 1: broken"]);
            let errors = fs::read_to_string(artifacts.errors().unwrap()).unwrap();
            assert_eq!(errors, "line 1: broken");
            // Notes survive a run that ends with issues.
            assert!(artifacts.notes().is_some());
        }
        Outcome::Parsed { .. } => panic!("Expected Compiled"),
    }
    assert!(output.exists());
}

#[test]
fn e2e_parse_only_needs_no_model() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(&temp_dir, "[model]\napi_key_env = \"SIGIL_E2E_KEY_NEVER_SET\"\n");
    let output = temp_dir.path().join("never.py");

    let mut args = args(&demos_path().join("csv_report.sig"), output.clone(), config);
    args.parse_only = true;

    match run(&args).expect("parse-only failed") {
        Outcome::Parsed {
            declarations,
            notes,
        } => {
            assert_eq!(declarations, 3);
            assert_eq!(notes, 2);
        }
        Outcome::Compiled { .. } => panic!("Expected Parsed"),
    }
    assert!(!output.exists());
}

#[test]
fn e2e_missing_api_key_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(&temp_dir, "[model]\napi_key_env = \"SIGIL_E2E_KEY_NEVER_SET\"\n");
    let args = args(
        &demos_path().join("calculator.sig"),
        temp_dir.path().join("calculator.py"),
        config,
    );

    let err = run(&args).unwrap_err();
    assert!(err.to_string().contains("SIGIL_E2E_KEY_NEVER_SET"));
}

#[test]
fn e2e_missing_input_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(&temp_dir, "[analyzer]\nenabled = false\n");
    let args = args(
        &temp_dir.path().join("absent.sig"),
        temp_dir.path().join("absent.py"),
        config,
    );

    let compiler = build_compiler(&args).unwrap();
    assert!(compile_with(&args, &compiler, &StubModel).is_err());
}

#[test]
fn e2e_notes_only_input_writes_empty_program() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_config(&temp_dir, "[analyzer]\nenabled = false\n");
    let input = temp_dir.path().join("notes_only.sig");
    fs::write(&input, "!notes[prefer the standard library]\n").unwrap();
    let output = temp_dir.path().join("notes_only.py");
    let args = args(&input, output.clone(), config);

    let compiler = build_compiler(&args).unwrap();
    let outcome = compile_with(&args, &compiler, &StubModel).expect("compile failed");

    assert!(!outcome.has_unresolved_issues());
    assert_eq!(fs::read_to_string(&output).unwrap(), "");
    assert!(!temp_dir.path().join("notes_only_notes.txt").exists());
    assert!(!temp_dir.path().join("notes_only_errors.txt").exists());
}
