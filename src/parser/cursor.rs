use super::chars::{self, CharClass};
use super::error::ParseError;

/// The source text of one parse pass plus the scan position.
///
/// Owned exclusively by one parser invocation; created, scanned once and
/// discarded. Invariant: `0 <= pos <= text.len()` and `pos` always sits
/// on a UTF-8 character boundary.
#[derive(Debug)]
pub(crate) struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    pub(crate) fn text(&self) -> &'a str {
        self.text
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    /// Step past the current character. No-op at end of text.
    pub(crate) fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    /// Consume `expected` or fail with a positioned error.
    pub(crate) fn expect(&mut self, expected: char) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.invalid_character(c)),
            None => Err(ParseError::missing("text", self.pos, self.text)),
        }
    }

    /// Consume the maximal (possibly empty) run of characters matching
    /// `class`. The caller decides whether an empty run is an error.
    pub(crate) fn token(&mut self, class: &CharClass) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !class.matches(c) {
                break;
            }
            self.advance();
        }
        &self.text[start..self.pos]
    }

    /// Consume a token that must be at least one character long.
    pub(crate) fn required_token(
        &mut self,
        class: &CharClass,
        what: &'static str,
    ) -> Result<&'a str, ParseError> {
        let token = self.token(class);
        if token.is_empty() {
            Err(ParseError::missing(what, self.pos, self.text))
        } else {
            Ok(token)
        }
    }

    /// Consume a DQUOTE-delimited string, returning its unescaped content.
    ///
    /// The cursor must sit on the opening quote. With `escaping` enabled a
    /// backslash takes the following character literally; without it a
    /// backslash is subject to `class` like any other character. Reaching
    /// end of text before the closing quote is an unterminated-construct
    /// error positioned there.
    pub(crate) fn quoted_text(
        &mut self,
        class: &CharClass,
        escaping: bool,
    ) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut content = String::new();
        loop {
            match self.peek() {
                None => return Err(ParseError::unterminated("quote", self.pos, self.text)),
                Some('"') => {
                    self.advance();
                    return Ok(content);
                }
                Some('\\') if escaping => {
                    self.advance();
                    match self.peek() {
                        None => {
                            return Err(ParseError::unterminated("quote", self.pos, self.text));
                        }
                        Some(escaped) if chars::ASCII_PRINTABLE.matches(escaped)
                            || !escaped.is_ascii() =>
                        {
                            content.push(escaped);
                            self.advance();
                        }
                        Some(other) => return Err(self.invalid_character(other)),
                    }
                }
                Some(c) if class.matches(c) => {
                    content.push(c);
                    self.advance();
                }
                Some(c) => return Err(self.invalid_character(c)),
            }
        }
    }

    /// Skip SP, HTAB and the obsolete CRLF-prefixed fold (`CRLF 1*(SP / HTAB)`).
    ///
    /// A bare CR not opening a fold is left in place for the caller to
    /// reject.
    pub(crate) fn skip_whitespace(&mut self) {
        loop {
            match self.peek() {
                Some(c) if chars::WHITESPACE.matches(c) => self.advance(),
                Some('\r') => {
                    let rest = self.text[self.pos..].as_bytes();
                    if rest.len() >= 3 && rest[1] == b'\n' && (rest[2] == b' ' || rest[2] == b'\t')
                    {
                        self.pos += 2;
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    pub(crate) fn invalid_character(&self, c: char) -> ParseError {
        ParseError::invalid_character(c, self.pos, self.text)
    }

    pub(crate) fn missing(&self, what: &'static str) -> ParseError {
        ParseError::missing(what, self.pos, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::error::ErrorKind;

    #[test]
    fn token_is_maximal_run() {
        let mut cursor = Cursor::new("gzip;q=1");
        assert_eq!(cursor.token(&chars::RFC2045_TOKEN), "gzip");
        assert_eq!(cursor.position(), 4);
        assert_eq!(cursor.peek(), Some(';'));
    }

    #[test]
    fn token_may_be_empty() {
        let mut cursor = Cursor::new(";rest");
        assert_eq!(cursor.token(&chars::RFC2045_TOKEN), "");
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn quoted_text_unescapes() {
        let mut cursor = Cursor::new(r#""a \"b\" c" tail"#);
        let content = cursor.quoted_text(&chars::QUOTED_TEXT, true).unwrap();
        assert_eq!(content, r#"a "b" c"#);
        assert_eq!(cursor.peek(), Some(' '));
    }

    #[test]
    fn quoted_text_without_escaping_takes_backslash_literally() {
        let mut cursor = Cursor::new(r#""a\b""#);
        let content = cursor.quoted_text(&chars::QUOTED_TEXT, false).unwrap();
        assert_eq!(content, r"a\b");
    }

    #[test]
    fn unterminated_quote_positions_at_end_of_text() {
        let mut cursor = Cursor::new("\"abc");
        let err = cursor.quoted_text(&chars::QUOTED_TEXT, true).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Unterminated("quote"));
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn skip_whitespace_handles_obsolete_fold() {
        let mut cursor = Cursor::new("  \r\n gzip");
        cursor.skip_whitespace();
        assert_eq!(cursor.peek(), Some('g'));
    }

    #[test]
    fn bare_cr_is_not_whitespace() {
        let mut cursor = Cursor::new("\rx");
        cursor.skip_whitespace();
        assert_eq!(cursor.position(), 0);
    }
}
