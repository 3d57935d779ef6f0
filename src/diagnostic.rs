//! Non-fatal findings collected while scanning and patching.

use std::fmt;

/// Which condition produced a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// A container body ended with `,` that was not followed by `...`.
    MissingEllipsis,
    /// A container name failed the well-formedness check and the container was skipped.
    InvalidTypeName,
    /// No `Entropic` impl for a container was found in the patched file.
    AnchorNotFound,
}

/// A single warning with the 1-based line it refers to (0 when no line applies).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub line: usize,
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    pub fn new(line: usize, kind: WarningKind, message: impl Into<String>) -> Self {
        Warning {
            line,
            kind,
            message: message.into(),
        }
    }

    /// Emit through `tracing` so the binary shows one line per warning.
    pub(crate) fn emit(&self) {
        tracing::warn!(kind = ?self.kind, line = self.line, "{}", self.message);
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(f, "{}: warning: {}", self.line, self.message)
        } else {
            write!(f, "warning: {}", self.message)
        }
    }
}

/// 1-based line number of a byte offset.
pub(crate) fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}
