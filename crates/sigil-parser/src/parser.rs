//! Block scanner for Sigil source text.
//!
//! A source file is free text with two kinds of embedded blocks:
//!
//! - declarations: `!func name=<identifier>[<signature>]` (the marker may also
//!   be `!function`, `!method` or `!meth`)
//! - notes: `!notes[<free text>]`
//!
//! Each kind is found by its own left-to-right scan, so the two never
//! interfere. A scan tries its block parser at every `!`; on success it
//! continues after the block, otherwise it moves one character forward.
//! Bodies end at the first `]` and may span lines. Blocks that start with a
//! recognised marker but are malformed are skipped and reported as warnings.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, not, peek, preceded, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, one_of, take_until, take_while},
};

use sigil_core::source::{Declaration, Note};

use crate::{
    Span,
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
};

/// Why a block that began with a valid marker was skipped.
///
/// Attached to winnow errors via `.context()`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct BlockIssue {
    code: ErrorCode,
    message: &'static str,
    help: &'static str,
    /// Span of the block marker.
    marker: Span,
    /// Position of an opening bracket that was never closed.
    opened_at: Option<Span>,
}

impl BlockIssue {
    fn new(code: ErrorCode, marker: Span) -> Self {
        let (message, help) = match code {
            ErrorCode::W001 => (
                "declaration is missing a `name=<identifier>` attribute",
                "write the declaration as `!func name=my_function[...]`",
            ),
            ErrorCode::W002 => (
                "declaration is missing its `[...]` body",
                "put the signature in brackets right after the name: `name=add[adds two integers]`",
            ),
            ErrorCode::W003 => ("unterminated declaration body", "add closing `]`"),
            ErrorCode::W004 => (
                "note is missing its `[...]` body",
                "write notes as `!notes[...]`",
            ),
            ErrorCode::W005 => ("unterminated note body", "add closing `]`"),
        };
        Self {
            code,
            message,
            help,
            marker,
            opened_at: None,
        }
    }

    fn opened_at(mut self, position: usize) -> Self {
        self.opened_at = Some(Span::new(position..position + 1));
        self
    }

    fn into_diagnostic(self) -> Diagnostic {
        let mut diag = Diagnostic::warning(self.message)
            .with_code(self.code)
            .with_label(self.marker, self.code.description())
            .with_help(self.help);
        if let Some(open) = self.opened_at {
            diag = diag.with_secondary_label(open, "body opened here");
        }
        diag
    }
}

type Input<'a> = LocatingSlice<&'a str>;
type PResult<O> = ModalResult<O, ContextError<BlockIssue>>;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Parse a declaration marker keyword with word boundary checking.
fn declaration_marker<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    preceded(
        '!',
        terminated(
            alt((
                literal("function"),
                literal("func"),
                literal("method"),
                literal("meth"),
            )),
            peek(not(one_of(is_identifier_char))),
        ),
    )
    .parse_next(input)
}

/// Parse the note marker with word boundary checking.
fn note_marker<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    terminated(literal("!notes"), peek(not(one_of(is_identifier_char)))).parse_next(input)
}

/// Parse `<whitespace>name=<identifier>`.
fn name_attribute<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    preceded(
        (take_while(1.., char::is_whitespace), literal("name=")),
        take_while(1.., is_identifier_char),
    )
    .parse_next(input)
}

/// Parse a body up to and including the first `]`, returning its content.
fn body_rest<'a>(input: &mut Input<'a>) -> PResult<&'a str> {
    terminated(take_until(0.., "]"), ']').parse_next(input)
}

/// Parse a full declaration block starting at `!`.
fn declaration<'a>(input: &mut Input<'a>, source: &'a str) -> PResult<Declaration> {
    let start = input.current_token_start();
    declaration_marker.parse_next(input)?;
    let marker = Span::new(start..input.current_token_start());

    let name = cut_err(name_attribute)
        .context(BlockIssue::new(ErrorCode::W001, marker))
        .parse_next(input)?;

    let open = input.current_token_start();
    cut_err('[')
        .context(BlockIssue::new(ErrorCode::W002, marker))
        .parse_next(input)?;

    cut_err(body_rest)
        .context(BlockIssue::new(ErrorCode::W003, marker).opened_at(open))
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Declaration::new(
        name,
        &source[start..end],
        Span::new(start..end),
    ))
}

/// Parse a full note block starting at `!`.
fn note<'a>(input: &mut Input<'a>) -> PResult<Note> {
    let start = input.current_token_start();
    note_marker.parse_next(input)?;
    let marker = Span::new(start..input.current_token_start());

    let open = input.current_token_start();
    cut_err('[')
        .context(BlockIssue::new(ErrorCode::W004, marker))
        .parse_next(input)?;

    let body = cut_err(body_rest)
        .context(BlockIssue::new(ErrorCode::W005, marker).opened_at(open))
        .parse_next(input)?;

    let end = input.current_token_start();
    Ok(Note::new(body, Span::new(start..end)))
}

/// Scan `source` for non-overlapping blocks accepted by `block`.
///
/// Committed failures are reported to `diagnostics`; in every failure case
/// the scan resumes one character after the `!` that started the attempt.
fn scan<'a, O>(
    source: &'a str,
    diagnostics: &mut DiagnosticCollector,
    mut block: impl FnMut(&mut Input<'a>) -> PResult<O>,
) -> Vec<O> {
    let mut input = LocatingSlice::new(source);
    let mut found = Vec::new();

    while !input.is_empty() {
        if !input.starts_with('!') {
            input.next_token();
            continue;
        }

        let checkpoint = input.checkpoint();
        match block(&mut input) {
            Ok(item) => found.push(item),
            Err(err) => {
                if let ErrMode::Cut(ctx) = err {
                    if let Some(issue) = ctx.context().next() {
                        diagnostics.emit(issue.clone().into_diagnostic());
                    }
                }
                input.reset(&checkpoint);
                input.next_token();
            }
        }
    }

    found
}

/// Scan for declaration blocks, in document order.
pub(crate) fn scan_declarations(
    source: &str,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<Declaration> {
    scan(source, diagnostics, |input| declaration(input, source))
}

/// Scan for note blocks, in document order.
pub(crate) fn scan_notes(source: &str, diagnostics: &mut DiagnosticCollector) -> Vec<Note> {
    scan(source, diagnostics, note)
}
