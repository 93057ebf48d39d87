use super::chars;
use super::cursor::Cursor;
use super::error::ParseError;

/// Scanner state while consuming a parenthesized comment.
///
/// Quote characters inside a comment are comment-local: they do not open
/// HTTP quoted-strings, but while one is open a backslash escapes exactly
/// the next character. The `*Escaped` states are one-shot and return to
/// their owning state unconditionally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    TextEscaped,
    SingleQuotes,
    SingleQuotesEscaped,
    DoubleQuotes,
    DoubleQuotesEscaped,
    Finished,
}

/// Consume an RFC 7230 `comment` and discard its content.
///
/// The cursor must sit on the opening `(`; on success it sits just past
/// the matching unescaped `)`. Nested parentheses open nested comments.
/// Reaching end of text first is an unterminated-construct error: a
/// missing closing parenthesis at top level, a missing closing quote
/// while inside either quote style.
pub(crate) fn consume_comment(cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
    cursor.expect('(')?;

    let mut state = State::Text;
    let mut depth = 1usize;

    while state != State::Finished {
        let Some(c) = cursor.peek() else {
            let what = match state {
                State::SingleQuotes
                | State::SingleQuotesEscaped
                | State::DoubleQuotes
                | State::DoubleQuotesEscaped => "quote",
                _ => "parenthesis",
            };
            return Err(ParseError::unterminated(
                what,
                cursor.position(),
                cursor.text(),
            ));
        };

        if !chars::COMMENT_TEXT.matches(c) && c != '\t' {
            return Err(cursor.invalid_character(c));
        }

        state = match state {
            State::Text => match c {
                '\\' => State::TextEscaped,
                '\'' => State::SingleQuotes,
                '"' => State::DoubleQuotes,
                '(' => {
                    depth += 1;
                    State::Text
                }
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        State::Finished
                    } else {
                        State::Text
                    }
                }
                _ => State::Text,
            },
            State::TextEscaped => State::Text,
            State::SingleQuotes => match c {
                '\\' => State::SingleQuotesEscaped,
                '\'' => State::Text,
                _ => State::SingleQuotes,
            },
            State::SingleQuotesEscaped => State::SingleQuotes,
            State::DoubleQuotes => match c {
                '\\' => State::DoubleQuotesEscaped,
                '"' => State::Text,
                _ => State::DoubleQuotes,
            },
            State::DoubleQuotesEscaped => State::DoubleQuotes,
            State::Finished => State::Finished,
        };

        cursor.advance();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::error::ErrorKind;

    fn consume(text: &str) -> Result<usize, ParseError> {
        let mut cursor = Cursor::new(text);
        consume_comment(&mut cursor)?;
        Ok(cursor.position())
    }

    #[test]
    fn plain_comment() {
        assert_eq!(consume("(abc) tail").unwrap(), 5);
    }

    #[test]
    fn empty_comment() {
        assert_eq!(consume("()x").unwrap(), 2);
    }

    #[test]
    fn escaped_parentheses_do_not_close() {
        assert_eq!(consume(r"(a \(nested\) comment) tail").unwrap(), 22);
    }

    #[test]
    fn nested_comment() {
        assert_eq!(consume("(a (b (c)) d)x").unwrap(), 13);
    }

    #[test]
    fn close_paren_inside_quotes_is_text() {
        assert_eq!(consume(r#"(a ") still open" done)"#).unwrap(), 23);
        assert_eq!(consume("(a ') still open' done)").unwrap(), 23);
    }

    #[test]
    fn escaped_quote_inside_quotes() {
        assert_eq!(consume(r#"(say "hi \" there")!"#).unwrap(), 19);
    }

    #[test]
    fn missing_closing_parenthesis() {
        let err = consume("(abc").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Unterminated("parenthesis"));
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn missing_closing_quote() {
        let err = consume(r#"(abc "def"#).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Unterminated("quote"));
        assert_eq!(err.position(), 9);
    }

    #[test]
    fn control_character_is_invalid() {
        let err = consume("(a\u{1}b)").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('\u{1}'));
        assert_eq!(err.position(), 2);
    }
}
