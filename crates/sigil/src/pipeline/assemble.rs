//! Joins candidate texts into one program.

/// Join `texts` in order, separated by a blank line.
///
/// An empty sequence yields an empty program.
///
/// ```
/// # use sigil::pipeline::assemble;
/// assert_eq!(assemble(["a", "b", "c"]), "a\n\nb\n\nc");
/// assert_eq!(assemble(Vec::<&str>::new()), "");
/// ```
pub fn assemble<'a>(texts: impl IntoIterator<Item = &'a str>) -> String {
    texts.into_iter().collect::<Vec<_>>().join("\n\n")
}
