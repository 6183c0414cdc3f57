//! Output languages supported by the pipeline.

use std::{fmt, str::FromStr};

use serde::Deserialize;
use thiserror::Error;

/// Error returned when a language name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown target language `{0}` (expected `python` or `java`)")]
pub struct UnknownLanguage(pub String);

/// The language the generated program is written in.
///
/// The language drives prompt wording, the comment syntax used for
/// failure sentinels, and the file extension of written artifacts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    #[default]
    Python,
    Java,
}

impl TargetLanguage {
    /// Human-readable language name used in prompts.
    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "Python",
            TargetLanguage::Java => "Java",
        }
    }

    /// What a single declaration is called in this language.
    pub fn unit_noun(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "function",
            TargetLanguage::Java => "method",
        }
    }

    /// File extension for source files, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "py",
            TargetLanguage::Java => "java",
        }
    }

    /// Line comment prefix.
    pub fn line_comment(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "#",
            TargetLanguage::Java => "//",
        }
    }

    /// How a finished program is started, used in prompts.
    pub fn run_hint(&self) -> &'static str {
        match self {
            TargetLanguage::Python => "running it with Python",
            TargetLanguage::Java => "compiling it with Java",
        }
    }

    /// Renders `text` as a block of line comments.
    ///
    /// Every line is prefixed so multi-line text stays inert in the
    /// generated program.
    pub fn comment(&self, text: &str) -> String {
        let prefix = self.line_comment();
        text.lines()
            .map(|line| {
                if line.is_empty() {
                    prefix.to_string()
                } else {
                    format!("{prefix} {line}")
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetLanguage::Python => write!(f, "python"),
            TargetLanguage::Java => write!(f, "java"),
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "python" | "py" => Ok(TargetLanguage::Python),
            "java" => Ok(TargetLanguage::Java),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}
