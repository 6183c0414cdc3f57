//! Sigil Core Types
//!
//! This crate provides the data model shared by the Sigil parser, pipeline
//! and command-line tool. It includes:
//!
//! - **Spans**: Byte ranges into a source document ([`span::Span`])
//! - **Source**: Parsed declarations and notes ([`source`] module)
//! - **Candidates**: Generated code and accumulated notes ([`candidate`] module)
//! - **Results**: The terminal artifact of a run ([`result::PipelineResult`])
//! - **Languages**: Supported output languages ([`language::TargetLanguage`])

pub mod candidate;
pub mod language;
pub mod result;
pub mod source;
pub mod span;
