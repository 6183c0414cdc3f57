//! Diagnostic system for the Sigil parser.
//!
//! Malformed blocks never stop parsing; they are skipped. This module
//! describes *why* a block was skipped so tools can point at it:
//! - Warning codes for documentation and searchability
//! - Labeled spans for source context
//! - A collector that orders diagnostics by source position
//!
//! # Example
//!
//! ```
//! # use sigil_parser::error::{Diagnostic, ErrorCode};
//! # use sigil_parser::Span;
//!
//! let diag = Diagnostic::warning("declaration is missing a `name=<identifier>` attribute")
//!     .with_code(ErrorCode::W001)
//!     .with_label(Span::new(0..5), "missing name attribute")
//!     .with_help("write the declaration as `!func name=my_function[...]`");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
