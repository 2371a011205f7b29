/// Describes where a program came from.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub enum SourceKind {
    /// Text handed over directly (tests, embedding).
    #[default]
    Inline,
    /// Input read from stdin.
    Stdin,
    /// A file with its path.
    File(String),
}

impl SourceKind {
    /// Returns the display name for diagnostics.
    pub fn display_name(&self) -> &str {
        match self {
            SourceKind::Inline => "<program>",
            SourceKind::Stdin => "<stdin>",
            SourceKind::File(path) => path,
        }
    }
}
