//! Command-line argument definitions for the Sigil CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, configuration file
//! selection, model and language overrides, and logging verbosity.

use clap::Parser;

use sigil::language::TargetLanguage;

/// Command-line arguments for the Sigil compiler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input declaration file
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output program [default: input name with the language extension]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Target language (python, java), overriding the configuration
    #[arg(long)]
    pub language: Option<TargetLanguage>,

    /// Model name, overriding the configuration
    #[arg(long)]
    pub model: Option<String>,

    /// Also write each synthesized declaration to this directory
    #[arg(long, value_name = "DIR")]
    pub emit_candidates: Option<String>,

    /// Print the parsed declarations and notes without calling the model
    #[arg(long)]
    pub parse_only: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
