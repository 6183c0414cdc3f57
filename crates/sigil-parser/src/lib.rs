//! # Sigil Parser
//!
//! Parser for Sigil declaration files. A declaration file is free text with
//! embedded signature blocks and author notes:
//!
//! ```text
//! !notes[Keep everything in one module.]
//!
//! !func name=add[adds two integers and returns the sum]
//! !method name=parse_csv[reads a CSV file into a list of rows]
//! ```
//!
//! ## Usage
//!
//! ```
//! # use sigil_parser::parse;
//!
//! let output = parse("!func name=add[adds two integers]");
//! assert_eq!(output.document().declarations().len(), 1);
//! assert!(output.warnings().is_empty());
//! ```

pub mod error;
mod parser;

pub use sigil_core::span::Span;

use log::{debug, trace};

use sigil_core::source::SourceDocument;

use error::{Diagnostic, DiagnosticCollector};

/// Result of scanning a source file.
///
/// Parsing never fails: malformed blocks are left out of the
/// [`SourceDocument`] and described by warning diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ParseOutput {
    document: SourceDocument,
    warnings: Vec<Diagnostic>,
}

impl ParseOutput {
    /// The declarations and notes that were extracted.
    pub fn document(&self) -> &SourceDocument {
        &self.document
    }

    /// Warnings for skipped blocks, in source order.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Split into the document and its warnings.
    pub fn into_parts(self) -> (SourceDocument, Vec<Diagnostic>) {
        (self.document, self.warnings)
    }
}

/// Parse source text into declarations and notes.
///
/// This is the main entry point of the crate. It runs two independent
/// scans over the text:
///
/// 1. **Declarations** - `!func` / `!function` / `!method` / `!meth` blocks
/// 2. **Notes** - `!notes` blocks
///
/// Both sequences keep document order. The function is pure.
///
/// # Example
///
/// ```
/// # use sigil_parser::parse;
///
/// let source = "!notes[use the standard library]\n!func name=add[adds two integers]";
/// let output = parse(source);
/// let doc = output.document();
///
/// assert_eq!(doc.declarations()[0].name(), "add");
/// assert_eq!(doc.notes()[0].text(), "use the standard library");
/// ```
pub fn parse(source: &str) -> ParseOutput {
    let mut diagnostics = DiagnosticCollector::new();

    let declarations = parser::scan_declarations(source, &mut diagnostics);
    let notes = parser::scan_notes(source, &mut diagnostics);

    debug!(
        declarations = declarations.len(),
        notes = notes.len();
        "Source scanned"
    );
    trace!(declarations:?, notes:?; "Scanned blocks");

    ParseOutput {
        document: SourceDocument::new(declarations, notes),
        warnings: diagnostics.finish(),
    }
}
