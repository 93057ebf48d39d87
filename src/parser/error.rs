use std::error;
use std::fmt::{self, Display, Formatter};

/// A positioned failure raised while parsing a header value.
///
/// Parsing is all-or-nothing: the first syntax violation aborts the whole
/// parse and surfaces here, carrying the offending 0-based byte position
/// and the original input text so callers can render caret-style
/// diagnostics. There is no partial result and no local recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    position: usize,
    input: String,
}

/// What went wrong, per the grammar error taxonomy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A character appeared where the active grammar state forbids it.
    InvalidCharacter(char),
    /// A required token was zero-length where at least one character
    /// was required. Carries a short label of what was expected.
    MissingToken(&'static str),
    /// End-of-text was reached inside an unclosed construct.
    Unterminated(&'static str),
    /// A parameter appeared on a value that does not permit one.
    UnexpectedParameter(String),
    /// A syntactically valid value failed a range check
    /// (e.g. a `Content-Range` upper bound below its lower bound).
    RangeViolation(String),
}

impl ParseError {
    pub(crate) fn new(kind: ErrorKind, position: usize, input: impl Into<String>) -> Self {
        Self {
            kind,
            position,
            input: input.into(),
        }
    }

    pub(crate) fn invalid_character(c: char, position: usize, input: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCharacter(c), position, input)
    }

    pub(crate) fn missing(what: &'static str, position: usize, input: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingToken(what), position, input)
    }

    pub(crate) fn unterminated(
        what: &'static str,
        position: usize,
        input: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::Unterminated(what), position, input)
    }

    pub(crate) fn unexpected_parameter(
        name: impl Into<String>,
        position: usize,
        input: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::UnexpectedParameter(name.into()), position, input)
    }

    pub(crate) fn range_violation(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::RangeViolation(message.into()), position, input)
    }

    /// The error classification.
    #[must_use]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// 0-based byte offset of the offending character within [`Self::input`].
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    /// The original text handed to the parse entry point.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Translate an error raised against a sub-slice into one positioned
    /// within the enclosing text.
    ///
    /// Nested parses (a quality value inside a parameter, an RFC 5987
    /// encoded text inside a `filename*`) run against the sub-slice and
    /// report positions relative to it; the outer parser re-wraps the
    /// error with the slice's base offset and the full original input.
    #[must_use]
    pub fn at_offset(mut self, base: usize, input: impl Into<String>) -> Self {
        self.position += base;
        self.input = input.into();
        self
    }

    /// Render a two-line `input` + caret diagnostic pointing at the
    /// offending character.
    #[must_use]
    pub fn caret_diagnostic(&self) -> String {
        let col = self.input[..self.position.min(self.input.len())]
            .chars()
            .count();
        let mut out = String::with_capacity(self.input.len() * 2 + 2);
        out.push_str(&self.input);
        out.push('\n');
        for _ in 0..col {
            out.push(' ');
        }
        out.push('^');
        out
    }
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::InvalidCharacter(c) => {
                write!(f, "invalid character {c:?} at position {}", self.position)
            }
            ErrorKind::MissingToken(what) => {
                write!(f, "missing {what} at position {}", self.position)
            }
            ErrorKind::Unterminated(what) => {
                write!(f, "missing closing {what} at position {}", self.position)
            }
            ErrorKind::UnexpectedParameter(name) => {
                write!(
                    f,
                    "parameter {name:?} not permitted at position {}",
                    self.position
                )
            }
            ErrorKind::RangeViolation(message) => {
                write!(f, "{message} at position {}", self.position)
            }
        }
    }
}

impl error::Error for ParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_character() {
        let err = ParseError::invalid_character('!', 3, "abc!def");
        assert_eq!(err.to_string(), "invalid character '!' at position 3");
    }

    #[test]
    fn caret_points_at_offender() {
        let err = ParseError::invalid_character('!', 3, "abc!def");
        assert_eq!(err.caret_diagnostic(), "abc!def\n   ^");
    }

    #[test]
    fn at_offset_translates_position_and_swaps_input() {
        let inner = ParseError::missing("digit", 2, "0.");
        let outer = inner.at_offset(10, "gzip; q=0.");
        assert_eq!(outer.position(), 12);
        assert_eq!(outer.input(), "gzip; q=0.");
    }
}
