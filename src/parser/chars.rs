use std::fmt;

/// A named character-membership predicate.
///
/// Classifiers are pure and allocation-free; composed classes are plain
/// functions calling into the member classes, coerced to `fn` pointers in
/// `const` items.
#[derive(Clone, Copy)]
pub(crate) struct CharClass {
    name: &'static str,
    test: fn(char) -> bool,
}

impl CharClass {
    pub(crate) const fn new(name: &'static str, test: fn(char) -> bool) -> Self {
        Self { name, test }
    }

    pub(crate) fn matches(&self, c: char) -> bool {
        (self.test)(c)
    }
}

impl fmt::Debug for CharClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// RFC 2045 `tspecials`.
pub(crate) const RFC2045_SPECIAL: CharClass = CharClass::new("rfc2045 special", |c| {
    matches!(
        c,
        '(' | ')' | '<' | '>' | '@' | ',' | ';' | ':' | '\\' | '"' | '/' | '[' | ']' | '?' | '='
    )
});

/// RFC 2045 token character: any printable US-ASCII except SP, CTLs
/// and `tspecials`.
pub(crate) const RFC2045_TOKEN: CharClass = CharClass::new("rfc2045 token", |c| {
    c.is_ascii() && !c.is_ascii_control() && c != ' ' && !RFC2045_SPECIAL.matches(c)
});

pub(crate) const DIGIT: CharClass = CharClass::new("digit", |c| c.is_ascii_digit());

/// SP and HTAB. The CRLF-prefixed obsolete fold is recognized by the
/// cursor's whitespace scan, not here, since it spans three characters.
pub(crate) const WHITESPACE: CharClass = CharClass::new("whitespace", |c| c == ' ' || c == '\t');

/// Printable US-ASCII, SP included.
pub(crate) const ASCII_PRINTABLE: CharClass =
    CharClass::new("ascii printable", |c| matches!(c, ' '..='~'));

/// Characters legal inside a quoted-string without escaping: printable
/// US-ASCII except DQUOTE, plus obs-text.
pub(crate) const QUOTED_TEXT: CharClass = CharClass::new("quoted text", |c| {
    (ASCII_PRINTABLE.matches(c) && c != '"') || !c.is_ascii()
});

/// Characters legal as bare comment text: printable US-ASCII plus
/// obs-text. Parentheses, backslash and quotes are handled by the
/// comment state machine itself.
pub(crate) const COMMENT_TEXT: CharClass =
    CharClass::new("comment text", |c| ASCII_PRINTABLE.matches(c) || !c.is_ascii());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_accepts_tchar() {
        for c in ['a', 'Z', '0', '-', '.', '+', '!', '#', '~'] {
            assert!(RFC2045_TOKEN.matches(c), "{c:?}");
        }
    }

    #[test]
    fn token_rejects_specials_and_controls() {
        for c in ['(', ')', '/', ';', '=', '"', ' ', '\t', '\u{0}', '\u{80}'] {
            assert!(!RFC2045_TOKEN.matches(c), "{c:?}");
        }
    }

    #[test]
    fn quoted_text_excludes_dquote() {
        assert!(QUOTED_TEXT.matches('a'));
        assert!(QUOTED_TEXT.matches(' '));
        assert!(!QUOTED_TEXT.matches('"'));
        assert!(!QUOTED_TEXT.matches('\u{1}'));
    }

    #[test]
    fn debug_prints_name() {
        assert_eq!(format!("{DIGIT:?}"), "digit");
    }
}
