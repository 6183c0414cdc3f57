//! Labeled source spans for diagnostic messages.

use crate::Span;

/// How a label is rendered relative to the others on a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Emphasis {
    /// The skipped block itself.
    Primary,
    /// Supporting context, such as where an unterminated body was opened.
    Secondary,
}

/// A message attached to a span of the source text.
#[derive(Debug, Clone)]
pub struct Label {
    span: Span,
    message: String,
    emphasis: Emphasis,
}

impl Label {
    fn with_emphasis(span: Span, message: impl Into<String>, emphasis: Emphasis) -> Self {
        Self {
            span,
            message: message.into(),
            emphasis,
        }
    }

    /// Label marking the block a warning is about.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self::with_emphasis(span, message, Emphasis::Primary)
    }

    /// Label adding context to a warning.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self::with_emphasis(span, message, Emphasis::Secondary)
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.emphasis == Emphasis::Primary
    }

    pub fn is_secondary(&self) -> bool {
        self.emphasis == Emphasis::Secondary
    }
}
