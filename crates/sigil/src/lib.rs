//! Sigil - signature-driven program synthesis.
//!
//! Sigil reads a declaration file of signature blocks and author notes,
//! asks a language model to implement each signature, assembles the
//! results into one program, and then refines, reviews and repairs that
//! program with static analysis in the loop.

pub mod analyzer;
pub mod artifacts;
pub mod config;
pub mod model;
pub mod pipeline;
pub mod prompt;

mod error;

pub use sigil_core::{candidate, language, result, source, span};
pub use sigil_parser::{ParseOutput, error::Diagnostic};

pub use error::SigilError;

use std::{fs, path::Path};

use log::{debug, info, trace};

use analyzer::{CommandAnalyzer, DisabledAnalyzer, StaticAnalyzer};
use config::AppConfig;
use model::{CodeModel, openai::OpenAiClient};
use pipeline::Pipeline;
use result::PipelineResult;
use source::SourceDocument;

/// Entry point for parsing and compiling Sigil declaration files.
///
/// # Examples
///
/// ```rust,no_run
/// use sigil::{Compiler, config::AppConfig};
///
/// let compiler = Compiler::new(AppConfig::default());
///
/// let output = compiler.parse("!func name=add[adds two integers]");
/// let model = compiler.model_client().expect("API key is set");
/// let analyzer = compiler.analyzer();
///
/// let result = compiler.compile(output.document(), &model, analyzer.as_ref());
/// println!("{}", result.program());
/// ```
#[derive(Debug, Default)]
pub struct Compiler {
    config: AppConfig,
}

impl Compiler {
    /// Create a compiler with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Parse declaration source text.
    ///
    /// Parsing never fails; malformed blocks come back as warnings.
    pub fn parse(&self, source: &str) -> ParseOutput {
        info!("Parsing declarations");
        let output = sigil_parser::parse(source);
        debug!(
            declarations = output.document().declarations().len(),
            notes = output.document().notes().len(),
            warnings = output.warnings().len();
            "Declarations parsed"
        );
        output
    }

    /// Read and parse a declaration file.
    ///
    /// # Errors
    ///
    /// Returns [`SigilError::Io`] if the file cannot be read.
    pub fn parse_file(&self, path: &Path) -> Result<ParseOutput, SigilError> {
        info!(path:?; "Reading declaration file");
        let source = fs::read_to_string(path)?;
        trace!(source; "Declaration source");
        Ok(self.parse(&source))
    }

    /// Run the full pipeline over `document`.
    ///
    /// Always produces a program; check
    /// [`PipelineResult::has_unresolved_issues`] for issues automated repair
    /// could not fix.
    pub fn compile(
        &self,
        document: &SourceDocument,
        model: &dyn CodeModel,
        analyzer: &dyn StaticAnalyzer,
    ) -> PipelineResult {
        info!(
            language = self.config.language().display_name(),
            model = self.config.model().name();
            "Compiling program"
        );
        Pipeline::new(&self.config, model, analyzer).run(document)
    }

    /// The static analyzer configured for the target language.
    pub fn analyzer(&self) -> Box<dyn StaticAnalyzer> {
        let settings = self.config.analyzer();
        let language = self.config.language();

        let command = settings
            .command_for(language)
            .filter(|command| settings.enabled() && !command.is_empty());
        match command {
            Some(command) => {
                debug!(command:?; "Using command analyzer");
                Box::new(CommandAnalyzer::new(
                    command,
                    language.extension(),
                    settings.timeout(),
                ))
            }
            None => {
                debug!(language = language.display_name(); "Static analysis disabled");
                Box::new(DisabledAnalyzer)
            }
        }
    }

    /// An OpenAI-compatible client for the configured endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`SigilError::Model`] when the API key variable is not set.
    pub fn model_client(&self) -> Result<OpenAiClient, SigilError> {
        let settings = self.config.model();
        let client = OpenAiClient::from_env(settings.endpoint(), settings.api_key_env())?;
        debug!(
            endpoint = settings.endpoint(),
            timeout_secs = settings.timeout().as_secs();
            "Model client ready"
        );
        Ok(client)
    }
}
