//! Generated code and the notes that accumulate during a run.

/// One generated implementation for a single declaration.
///
/// `raised_exception` is an advisory flag: the synthesizer sets it when its
/// own generation ran into trouble. The pipeline records it but does not
/// branch on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateCode {
    text: String,
    raised_exception: bool,
    notes: String,
}

impl CandidateCode {
    pub fn new(text: impl Into<String>, raised_exception: bool, notes: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            raised_exception,
            notes: notes.into(),
        }
    }

    /// Returns the generated source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the advisory failure flag.
    pub fn raised_exception(&self) -> bool {
        self.raised_exception
    }

    /// Returns the notes emitted alongside the code, possibly blank.
    pub fn notes(&self) -> &str {
        &self.notes
    }
}

/// Ordered, append-only notes for a single run.
///
/// Author notes come from the source document; generated notes are the
/// non-blank `notes` returned by the synthesizer, in declaration order.
/// Both are injected as context into every later model call. Entries are
/// never pruned, truncated or deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteSet {
    author: Vec<String>,
    generated: Vec<String>,
}

impl NoteSet {
    /// Creates a note set seeded with the author notes of a document.
    pub fn new(author: Vec<String>) -> Self {
        Self {
            author,
            generated: Vec::new(),
        }
    }

    /// Appends a synthesizer note. Blank notes are skipped.
    ///
    /// Returns `true` if the note was recorded.
    pub fn push_generated(&mut self, note: &str) -> bool {
        if note.trim().is_empty() {
            return false;
        }
        self.generated.push(note.to_string());
        true
    }

    pub fn author(&self) -> &[String] {
        &self.author
    }

    pub fn generated(&self) -> &[String] {
        &self.generated
    }

    /// Iterates over every note, author notes first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.author
            .iter()
            .chain(self.generated.iter())
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_empty() && self.generated.is_empty()
    }

    /// Joins every note with a newline, the form injected into model calls.
    pub fn context(&self) -> String {
        self.iter().collect::<Vec<_>>().join("\n")
    }
}
