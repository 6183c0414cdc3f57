//! Configuration types for Sigil runs.
//!
//! This module provides configuration structures that control which model
//! is called, how each pipeline stage talks to it, and how generated code
//! is checked. All types implement [`serde::Deserialize`] for loading from
//! external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining every section.
//! - [`ModelConfig`] - Model name, endpoint, credentials and timeout.
//! - [`StagesConfig`] - Per-stage temperature and model overrides.
//! - [`CorrectionConfig`] - Retry bound for the error-correction loop.
//! - [`AnalyzerConfig`] - External static-analysis command.
//! - [`PromptOverrides`] - Optional replacements for the system prompts.
//!
//! # Example
//!
//! ```
//! # use sigil::config::{AppConfig, Stage};
//! let config = AppConfig::default();
//! assert_eq!(config.model().name(), "gpt-4o-mini");
//! assert_eq!(config.temperature(Stage::Synthesis), 0.8);
//! assert_eq!(config.correction().max_retries(), 3);
//! ```

use std::time::Duration;

use serde::Deserialize;

use sigil_core::language::TargetLanguage;

use crate::model::openai::DEFAULT_ENDPOINT;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// A pipeline stage that calls the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Synthesis,
    Refinement,
    Review,
    Correction,
}

impl Stage {
    /// Stage name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Synthesis => "synthesis",
            Stage::Refinement => "refinement",
            Stage::Review => "review",
            Stage::Correction => "correction",
        }
    }

    /// Sampling temperature used when the configuration sets none.
    pub fn default_temperature(&self) -> f32 {
        match self {
            Stage::Synthesis => 0.8,
            Stage::Refinement | Stage::Correction => 0.7,
            Stage::Review => 0.6,
        }
    }
}

/// Top-level configuration for a Sigil run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Language of the generated program.
    #[serde(default)]
    language: TargetLanguage,

    /// Model connection section.
    #[serde(default)]
    model: ModelConfig,

    /// Per-stage sampling section.
    #[serde(default)]
    stages: StagesConfig,

    /// Error-correction section.
    #[serde(default)]
    correction: CorrectionConfig,

    /// Static-analysis section.
    #[serde(default)]
    analyzer: AnalyzerConfig,

    /// System prompt overrides.
    #[serde(default)]
    prompts: PromptOverrides,
}

impl AppConfig {
    /// Returns the target language.
    pub fn language(&self) -> TargetLanguage {
        self.language
    }

    /// Returns the model connection settings.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// Returns the per-stage settings.
    pub fn stages(&self) -> &StagesConfig {
        &self.stages
    }

    /// Returns the error-correction settings.
    pub fn correction(&self) -> &CorrectionConfig {
        &self.correction
    }

    /// Returns the static-analysis settings.
    pub fn analyzer(&self) -> &AnalyzerConfig {
        &self.analyzer
    }

    /// Returns the system prompt overrides.
    pub fn prompts(&self) -> &PromptOverrides {
        &self.prompts
    }

    /// Model identifier for `stage`: the stage override, else the default model.
    pub fn model_for(&self, stage: Stage) -> &str {
        self.stages
            .get(stage)
            .model
            .as_deref()
            .unwrap_or(&self.model.name)
    }

    /// Sampling temperature for `stage`.
    pub fn temperature(&self, stage: Stage) -> f32 {
        self.stages
            .get(stage)
            .temperature
            .unwrap_or_else(|| stage.default_temperature())
    }

    /// Replaces the target language.
    pub fn with_language(mut self, language: TargetLanguage) -> Self {
        self.language = language;
        self
    }

    /// Replaces the default model name.
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model.name = name.into();
        self
    }

    /// Replaces the retry bound of the error-correction loop.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.correction.max_retries = max_retries;
        self
    }
}

/// Connection settings for the code-generation model.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Default model identifier.
    name: String,

    /// Chat-completions endpoint URL.
    endpoint: String,

    /// Environment variable holding the API key.
    api_key_env: String,

    /// Timeout applied to every model call, in seconds.
    timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ModelConfig {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key_env(&self) -> &str {
        &self.api_key_env
    }

    /// Timeout applied to every model call.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Sampling settings for one stage. Unset fields fall back to defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageSettings {
    temperature: Option<f32>,
    model: Option<String>,
}

/// Per-stage settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    synthesis: StageSettings,
    refinement: StageSettings,
    review: StageSettings,
    correction: StageSettings,
}

impl StagesConfig {
    fn get(&self, stage: Stage) -> &StageSettings {
        match stage {
            Stage::Synthesis => &self.synthesis,
            Stage::Refinement => &self.refinement,
            Stage::Review => &self.review,
            Stage::Correction => &self.correction,
        }
    }
}

/// Settings for the error-correction loop.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Retries after the first failed attempt.
    max_retries: u32,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl CorrectionConfig {
    /// Retries after the first failed attempt; the loop makes at most
    /// `max_retries + 1` model calls.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Settings for the external static analyzer.
///
/// The command is an argument vector. `{file}` is replaced with the path of
/// the program under analysis and `{dir}` with its directory.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    enabled: bool,
    command: Option<Vec<String>>,
    timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalyzerConfig {
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// The analyzer command for `language`.
    ///
    /// Returns the configured command, else the language default. Python
    /// defaults to `python3 -m py_compile {file}`; Java has no default.
    pub fn command_for(&self, language: TargetLanguage) -> Option<Vec<String>> {
        if let Some(command) = &self.command {
            return Some(command.clone());
        }
        match language {
            TargetLanguage::Python => Some(
                ["python3", "-m", "py_compile", "{file}"]
                    .iter()
                    .map(|arg| arg.to_string())
                    .collect(),
            ),
            TargetLanguage::Java => None,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Optional replacements for the built-in system prompts.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PromptOverrides {
    synthesis: Option<String>,
    refinement: Option<String>,
    review: Option<String>,
    correction: Option<String>,
}

impl PromptOverrides {
    /// Returns the override for `stage`, if any.
    pub fn get(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::Synthesis => self.synthesis.as_deref(),
            Stage::Refinement => self.refinement.as_deref(),
            Stage::Review => self.review.as_deref(),
            Stage::Correction => self.correction.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.language(), TargetLanguage::Python);
        assert_eq!(config.model().endpoint(), DEFAULT_ENDPOINT);
        assert_eq!(config.model().api_key_env(), "OPENAI_API_KEY");
        assert_eq!(config.model().timeout(), Duration::from_secs(30));
        assert_eq!(config.model_for(Stage::Correction), "gpt-4o-mini");
        assert_eq!(config.temperature(Stage::Review), 0.6);
        assert!(config.analyzer().enabled());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: AppConfig = toml::from_str(
            r#"
            language = "java"

            [model]
            name = "gpt-4o"

            [stages.correction]
            model = "gpt-4o-error-fixer"

            [stages.review]
            temperature = 0.2

            [correction]
            max_retries = 1
            "#,
        )
        .expect("valid config");

        assert_eq!(config.language(), TargetLanguage::Java);
        assert_eq!(config.model().name(), "gpt-4o");
        assert_eq!(config.model().timeout(), Duration::from_secs(30));
        assert_eq!(config.model_for(Stage::Synthesis), "gpt-4o");
        assert_eq!(config.model_for(Stage::Correction), "gpt-4o-error-fixer");
        assert_eq!(config.temperature(Stage::Review), 0.2);
        assert_eq!(config.temperature(Stage::Correction), 0.7);
        assert_eq!(config.correction().max_retries(), 1);
    }

    #[test]
    fn test_analyzer_command_defaults() {
        let analyzer = AnalyzerConfig::default();

        let python = analyzer
            .command_for(TargetLanguage::Python)
            .expect("python has a default analyzer");
        assert_eq!(python, ["python3", "-m", "py_compile", "{file}"]);
        assert!(analyzer.command_for(TargetLanguage::Java).is_none());
    }

    #[test]
    fn test_analyzer_command_override() {
        let config: AppConfig = toml::from_str(
            r#"
            language = "java"
            [analyzer]
            command = ["javac", "-d", "{dir}", "{file}"]
            timeout_secs = 5
            "#,
        )
        .expect("valid config");

        assert_eq!(
            config.analyzer().command_for(TargetLanguage::Java),
            Some(vec![
                "javac".to_string(),
                "-d".to_string(),
                "{dir}".to_string(),
                "{file}".to_string()
            ])
        );
        assert_eq!(config.analyzer().timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_from_builder_methods() {
        let config = AppConfig::default()
            .with_language(TargetLanguage::Java)
            .with_model_name("local-model")
            .with_max_retries(0);

        assert_eq!(config.language(), TargetLanguage::Java);
        assert_eq!(config.model_for(Stage::Refinement), "local-model");
        assert_eq!(config.correction().max_retries(), 0);
    }

    #[test]
    fn test_prompt_overrides() {
        let config: AppConfig = toml::from_str(
            r#"
            [prompts]
            review = "Only report real bugs."
            "#,
        )
        .expect("valid config");

        assert_eq!(
            config.prompts().get(Stage::Review),
            Some("Only report real bugs.")
        );
        assert!(config.prompts().get(Stage::Synthesis).is_none());
    }
}
