use super::cursor::Cursor;
use super::error::ParseError;

/// Per-grammar lexical event hooks.
///
/// [`run`] classifies the current character and dispatches to exactly one
/// hook, which must consume at least one character (or fail) before
/// returning. Every hook defaults to rejecting its event as an invalid
/// character, so a grammar opts in only to the events its syntax allows.
pub(crate) trait TokenEvents {
    /// SP, HTAB or an obsolete fold.
    fn whitespace(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// `;`
    fn token_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// `=`
    fn key_value_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// `,`
    fn multi_value_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// `*`
    fn wildcard(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// `/`
    fn slash(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// Opening DQUOTE.
    fn quoted(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// Opening parenthesis.
    fn comment(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// Any other character; grammars typically consume a token run here.
    fn token(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        reject(cursor)
    }

    /// End of input; close out the value under construction.
    fn end_of_text(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError>;
}

fn reject(cursor: &Cursor<'_>) -> Result<(), ParseError> {
    match cursor.peek() {
        Some(c) => Err(cursor.invalid_character(c)),
        None => Err(cursor.missing("text")),
    }
}

/// Drive `events` over the whole input.
pub(crate) fn run<E: TokenEvents>(events: &mut E, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
    loop {
        let Some(c) = cursor.peek() else {
            return events.end_of_text(cursor);
        };
        match c {
            ' ' | '\t' | '\r' => events.whitespace(cursor)?,
            ';' => events.token_separator(cursor)?,
            '=' => events.key_value_separator(cursor)?,
            ',' => events.multi_value_separator(cursor)?,
            '*' => events.wildcard(cursor)?,
            '/' => events.slash(cursor)?,
            '"' => events.quoted(cursor)?,
            '(' => events.comment(cursor)?,
            _ => events.token(cursor)?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::chars;
    use crate::parser::error::ErrorKind;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TokenEvents for Recorder {
        fn whitespace(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
            cursor.skip_whitespace();
            self.events.push("ws".into());
            Ok(())
        }

        fn token_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
            cursor.advance();
            self.events.push(";".into());
            Ok(())
        }

        fn token(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
            let token = cursor.required_token(&chars::RFC2045_TOKEN, "token")?;
            self.events.push(format!("t:{token}"));
            Ok(())
        }

        fn end_of_text(&mut self, _cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
            self.events.push("eot".into());
            Ok(())
        }
    }

    #[test]
    fn dispatches_by_character_class() {
        let mut recorder = Recorder::default();
        let mut cursor = Cursor::new("gzip ; br");
        run(&mut recorder, &mut cursor).unwrap();
        assert_eq!(recorder.events, ["t:gzip", "ws", ";", "ws", "t:br", "eot"]);
    }

    #[test]
    fn unhandled_event_is_an_invalid_character() {
        let mut recorder = Recorder::default();
        let mut cursor = Cursor::new("gzip=1");
        let err = run(&mut recorder, &mut cursor).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('='));
        assert_eq!(err.position(), 4);
    }
}
