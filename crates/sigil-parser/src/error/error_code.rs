//! Warning codes for the Sigil diagnostic system.
//!
//! - `W00x` - Skipped declaration and note blocks

use std::fmt;

/// Codes for categorizing parser warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Declaration without a name.
    ///
    /// A declaration marker (`!func`, `!function`, `!method`, `!meth`) was not
    /// followed by whitespace and a `name=<identifier>` attribute.
    W001,

    /// Declaration without a body.
    ///
    /// The `name=` attribute was not immediately followed by `[`.
    W002,

    /// Unterminated declaration body.
    ///
    /// A declaration body was opened with `[` but never closed.
    W003,

    /// Note without a body.
    ///
    /// A `!notes` marker was not immediately followed by `[`.
    W004,

    /// Unterminated note body.
    ///
    /// A note body was opened with `[` but never closed.
    W005,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "W001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::W001 => "W001",
            ErrorCode::W002 => "W002",
            ErrorCode::W003 => "W003",
            ErrorCode::W004 => "W004",
            ErrorCode::W005 => "W005",
        }
    }

    /// Returns a short description of what this code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::W001 => "missing name attribute",
            ErrorCode::W002 => "missing declaration body",
            ErrorCode::W003 => "unterminated declaration body",
            ErrorCode::W004 => "missing note body",
            ErrorCode::W005 => "unterminated note body",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::W001.to_string(), "W001");
        assert_eq!(ErrorCode::W005.to_string(), "W005");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(ErrorCode::W001.description(), "missing name attribute");
        assert_eq!(ErrorCode::W003.description(), "unterminated declaration body");
        assert_eq!(ErrorCode::W004.description(), "missing note body");
    }
}
