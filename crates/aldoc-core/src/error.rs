use std::fmt;
use std::io;

/// Error kinds for the failures that can escape a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// An `include::path[]` target could not be read.
    Include,
    /// The input file itself could not be read.
    Io,
}

/// An error raised while constructing a document.
///
/// Parsing itself never fails; structural problems degrade best-effort.
/// Only the file reads performed for `include::` expansion (and for
/// `parse_file` itself) can fail and escape.
#[derive(Debug)]
pub struct ParseError {
    message: String,
    kind: ParseErrorKind,
    source: Option<io::Error>,
}

impl ParseError {
    /// An include target failed to resolve.
    pub fn include(path: &str, source: io::Error) -> Self {
        Self {
            message: format!("failed to include '{}'", path),
            kind: ParseErrorKind::Include,
            source: Some(source),
        }
    }

    /// The input file failed to read.
    pub fn io(path: &str, source: io::Error) -> Self {
        Self {
            message: format!("failed to read '{}'", path),
            kind: ParseErrorKind::Io,
            source: Some(source),
        }
    }

    /// Error categorization.
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(source) = &self.source {
            write!(f, ": {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}
