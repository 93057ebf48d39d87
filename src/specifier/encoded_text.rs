use std::fmt;
use std::str::FromStr;

use crate::parser::chars::CharClass;
use crate::parser::{Cursor, ParseError};

/// A MIME charset name inside an RFC 5987 encoded value.
///
/// Only the two charsets RFC 8187 keeps are decodable here; anything else
/// is carried as [`Charset::Ext`], syntactically valid but opaque.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Iso8859_1,
    Ext(String),
}

impl Charset {
    fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("utf-8") {
            Self::Utf8
        } else if token.eq_ignore_ascii_case("iso-8859-1") {
            Self::Iso8859_1
        } else {
            Self::Ext(token.to_owned())
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => f.write_str("UTF-8"),
            Self::Iso8859_1 => f.write_str("ISO-8859-1"),
            Self::Ext(name) => f.write_str(name),
        }
    }
}

/// An RFC 5987 encoded text: `charset "'" [ language ] "'" value-chars`,
/// where value-chars intermix literal attribute characters and `%HH`
/// percent-escapes standing for raw bytes of the named charset.
///
/// # ABNF
///
/// ```text
/// ext-value   = charset "'" [ language ] "'" value-chars
/// charset     = "UTF-8" / "ISO-8859-1" / mime-charset
/// value-chars = *( pct-encoded / attr-char )
/// attr-char   = ALPHA / DIGIT
///             / "!" / "#" / "$" / "&" / "+" / "-" / "."
///             / "^" / "_" / "`" / "|" / "~"
/// ```
///
/// # Example values
///
/// * `UTF-8''%e2%82%ac%20rates` (`€ rates`)
/// * `iso-8859-1'en'%A3%20rates` (`£ rates`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtendedValue {
    charset: Charset,
    language: Option<String>,
    bytes: Vec<u8>,
}

const MIME_CHARSET: CharClass = CharClass::new("mime charset", |c| {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '%' | '&' | '+' | '-' | '^' | '_' | '`' | '{' | '}' | '~'
        )
});

const LANGUAGE: CharClass =
    CharClass::new("language tag", |c| c.is_ascii_alphanumeric() || c == '-');

pub(crate) const ATTR_CHAR: CharClass = CharClass::new("attr char", |c| {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#' | '$' | '&' | '+' | '-' | '.' | '^' | '_' | '`' | '|' | '~'
        )
});

impl ExtendedValue {
    /// Encode `text` as UTF-8 with no language tag, the common case.
    #[must_use]
    pub fn utf8(text: &str) -> Self {
        Self {
            charset: Charset::Utf8,
            language: None,
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[must_use]
    pub fn new(charset: Charset, language: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            charset,
            language,
            bytes,
        }
    }

    #[must_use]
    pub fn charset(&self) -> &Charset {
        &self.charset
    }

    #[must_use]
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The raw bytes after percent-decoding, before charset decoding.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Reinterpret the decoded bytes in the named charset.
    ///
    /// Fails for [`Charset::Ext`] charsets (the syntax was valid but the
    /// bytes are opaque) and for byte sequences that are not valid in the
    /// named charset.
    pub fn decode_text(&self) -> Result<String, crate::Error> {
        match &self.charset {
            Charset::Utf8 => {
                String::from_utf8(self.bytes.clone()).map_err(|_| crate::Error::invalid())
            }
            Charset::Iso8859_1 => Ok(self.bytes.iter().map(|&b| char::from(b)).collect()),
            Charset::Ext(_) => Err(crate::Error::invalid()),
        }
    }
}

impl FromStr for ExtendedValue {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);

        let charset = cursor.required_token(&MIME_CHARSET, "charset")?;
        let charset = Charset::from_token(charset);
        cursor.expect('\'')?;

        let language = cursor.token(&LANGUAGE);
        let language = (!language.is_empty()).then(|| language.to_owned());
        cursor.expect('\'')?;

        let mut bytes = Vec::new();
        loop {
            match cursor.peek() {
                None => break,
                Some('%') => {
                    cursor.advance();
                    let high = hex_digit(&mut cursor)?;
                    let low = hex_digit(&mut cursor)?;
                    bytes.push(high << 4 | low);
                }
                Some(c) if ATTR_CHAR.matches(c) => {
                    bytes.push(c as u8);
                    cursor.advance();
                }
                Some(c) => return Err(cursor.invalid_character(c)),
            }
        }

        Ok(Self {
            charset,
            language,
            bytes,
        })
    }
}

fn hex_digit(cursor: &mut Cursor<'_>) -> Result<u8, ParseError> {
    match cursor.peek() {
        Some(c) => match c.to_digit(16) {
            Some(digit) => {
                cursor.advance();
                #[allow(clippy::cast_possible_truncation)]
                Ok(digit as u8)
            }
            None => Err(cursor.invalid_character(c)),
        },
        None => Err(cursor.missing("hex digit")),
    }
}

/// Canonical text form; every byte outside `attr-char` is re-encoded as
/// an uppercase percent-escape.
impl fmt::Display for ExtendedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}'", self.charset)?;
        if let Some(language) = &self.language {
            f.write_str(language)?;
        }
        f.write_str("'")?;
        for &b in &self.bytes {
            let c = char::from(b);
            if ATTR_CHAR.matches(c) {
                write!(f, "{c}")?;
            } else {
                write!(f, "%{b:02X}")?;
            }
        }
        Ok(())
    }
}
