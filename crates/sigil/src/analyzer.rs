//! The static-analysis capability.
//!
//! A [`StaticAnalyzer`] inspects a whole program and reports [`Issue`]s. The
//! pipeline treats an empty report as "clean". [`CommandAnalyzer`] runs an
//! external checker such as `python3 -m py_compile` or `javac`;
//! [`DisabledAnalyzer`] reports nothing.

use std::{
    fmt,
    fs::{self, File},
    io::{self, Read, Seek, SeekFrom},
    path::Path,
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use log::{debug, warn};
use thiserror::Error;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// One problem reported by static analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    message: String,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Errors raised when an analyzer could not produce a report.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    #[error("analyzer command is empty")]
    EmptyCommand,

    #[error("failed to start `{program}`: {source}")]
    Spawn { program: String, source: io::Error },

    #[error("analyzer did not finish within {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("analyzer I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A checker that reports issues in a whole program.
pub trait StaticAnalyzer {
    /// Analyze `source` and return every issue found; empty means clean.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyzerError`] when the analysis itself could not run.
    fn analyze_source(&self, source: &str) -> Result<Vec<Issue>, AnalyzerError>;
}

/// Analyzer that never reports issues.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAnalyzer;

impl StaticAnalyzer for DisabledAnalyzer {
    fn analyze_source(&self, _source: &str) -> Result<Vec<Issue>, AnalyzerError> {
        Ok(Vec::new())
    }
}

/// Analyzer that runs an external command on the program.
///
/// The program is written to `program.<extension>` in a fresh temporary
/// directory. In the command, `{file}` expands to that path and `{dir}` to
/// the directory. A zero exit status means clean; otherwise the command's
/// stderr (or stdout when stderr is empty) becomes a single issue.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    command: Vec<String>,
    extension: String,
    timeout: Duration,
}

impl CommandAnalyzer {
    pub fn new(command: Vec<String>, extension: impl Into<String>, timeout: Duration) -> Self {
        Self {
            command,
            extension: extension.into(),
            timeout,
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }
}

impl StaticAnalyzer for CommandAnalyzer {
    fn analyze_source(&self, source: &str) -> Result<Vec<Issue>, AnalyzerError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(AnalyzerError::EmptyCommand)?;

        let workspace = tempfile::tempdir()?;
        let file = workspace.path().join(format!("program.{}", self.extension));
        fs::write(&file, source)?;

        let mut stdout = tempfile::tempfile()?;
        let mut stderr = tempfile::tempfile()?;

        debug!(program, file:? = file; "Running static analyzer");
        let mut child = Command::new(expand(program, &file, workspace.path()))
            .args(args.iter().map(|arg| expand(arg, &file, workspace.path())))
            .current_dir(workspace.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout.try_clone()?))
            .stderr(Stdio::from(stderr.try_clone()?))
            .spawn()
            .map_err(|source| AnalyzerError::Spawn {
                program: program.clone(),
                source,
            })?;

        let status = wait_with_deadline(&mut child, self.timeout)?;
        if status.success() {
            return Ok(Vec::new());
        }

        let report = match read_back(&mut stderr)? {
            text if !text.trim().is_empty() => text,
            _ => read_back(&mut stdout)?,
        };
        let message = match report.trim() {
            "" => format!("analyzer exited with {status}"),
            text => text.to_string(),
        };
        Ok(vec![Issue::new(message)])
    }
}

fn expand(arg: &str, file: &Path, dir: &Path) -> String {
    arg.replace("{file}", &file.to_string_lossy())
        .replace("{dir}", &dir.to_string_lossy())
}

fn wait_with_deadline(child: &mut Child, timeout: Duration) -> Result<ExitStatus, AnalyzerError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if Instant::now() >= deadline {
            // Best effort; the process may have exited in the meantime.
            let _ = child.kill();
            let _ = child.wait();
            return Err(AnalyzerError::Timeout(timeout));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn read_back(file: &mut File) -> io::Result<String> {
    let mut bytes = Vec::new();
    file.seek(SeekFrom::Start(0))?;
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Run `analyzer` on `program` for the pipeline.
///
/// An analyzer that cannot run is logged and treated as reporting no
/// issues, so a broken toolchain never blocks the run.
pub fn analyze(analyzer: &dyn StaticAnalyzer, program: &str) -> Vec<Issue> {
    match analyzer.analyze_source(program) {
        Ok(issues) => {
            debug!(issues = issues.len(); "Static analysis finished");
            issues
        }
        Err(err) => {
            warn!(err:%; "Static analysis failed, continuing without issues");
            Vec::new()
        }
    }
}
