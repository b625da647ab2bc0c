use std::fmt;
use std::ops::Range;

use rowan::TextRange;

/// What went wrong, as recovery recorded it in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    /// Recovery inserted a zero-width token.
    MissingToken,
    /// Recovery skipped or abandoned input.
    UnexpectedToken,
    /// Input ended while a construct was still open.
    UnexpectedEnd,
}

impl DiagnosticKind {
    /// Message without detail.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::MissingToken => "missing token",
            Self::UnexpectedToken => "unexpected token",
            Self::UnexpectedEnd => "unexpected end of input",
        }
    }

    /// `detail` names the missing terminal or quotes the skipped text.
    pub fn message(&self, detail: Option<&str>) -> String {
        match (self, detail) {
            (Self::MissingToken, Some(name)) => format!("missing `{name}`"),
            (Self::UnexpectedToken, Some(text)) => format!("unexpected `{text}`"),
            _ => self.fallback_message().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    /// The range shown to the user (underlined in output).
    pub(crate) range: TextRange,
    pub(crate) message: String,
}

impl DiagnosticMessage {
    pub(crate) fn new(kind: DiagnosticKind, range: TextRange, detail: Option<&str>) -> Self {
        Self {
            kind,
            range,
            message: kind.message(detail),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn range(&self) -> Range<usize> {
        self.range.start().into()..self.range.end().into()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error at {}..{}: {}",
            u32::from(self.range.start()),
            u32::from(self.range.end()),
            self.message
        )
    }
}
