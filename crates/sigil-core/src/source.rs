//! Parsed source document types.
//!
//! A [`SourceDocument`] is the immutable result of scanning a Sigil source
//! file: the ordered [`Declaration`] blocks to synthesize and the ordered
//! author [`Note`] blocks that accompany the whole run.

use crate::span::Span;

/// One signature block naming a unit of code to synthesize.
///
/// The pipeline treats the text as opaque and passes it through verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    name: String,
    text: String,
    span: Span,
}

impl Declaration {
    /// Creates a declaration from its `name=` identifier, the full block
    /// text, and the location the block was found at.
    pub fn new(name: impl Into<String>, text: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            span,
        }
    }

    /// Returns the identifier from the `name=` attribute.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the verbatim block text, marker and body included.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the source span of the whole block.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// A free-form author note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    text: String,
    span: Span,
}

impl Note {
    /// Creates a note from its bracketed body.
    pub fn new(text: impl Into<String>, span: Span) -> Self {
        Self {
            text: text.into(),
            span,
        }
    }

    /// Returns the note body.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the source span of the whole `!notes[...]` block.
    pub fn span(&self) -> Span {
        self.span
    }
}

/// Declarations and notes extracted from one source file, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    declarations: Vec<Declaration>,
    notes: Vec<Note>,
}

impl SourceDocument {
    pub fn new(declarations: Vec<Declaration>, notes: Vec<Note>) -> Self {
        Self {
            declarations,
            notes,
        }
    }

    pub fn declarations(&self) -> &[Declaration] {
        &self.declarations
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Returns the note bodies as plain strings.
    pub fn note_texts(&self) -> Vec<String> {
        self.notes.iter().map(|note| note.text().to_string()).collect()
    }

    /// Returns `true` when the document has no declarations to synthesize.
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
