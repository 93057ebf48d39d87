use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::chars::CharClass;
use crate::parser::{Cursor, ParseError};
use crate::typed_header::{decode_one, encode_display};
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// `etagc` per RFC 7232: `%x21 / %x23-7E / obs-text`. Everything
/// printable except DQUOTE; no backslash escaping exists inside a tag.
const ETAGC: CharClass = CharClass::new("etag content", |c| {
    c == '!' || ('#'..='~').contains(&c) || !c.is_ascii()
});

/// An entity tag, defined in
/// [RFC7232](https://datatracker.ietf.org/doc/html/rfc7232#section-2.3).
///
/// # ABNF
///
/// ```text
/// entity-tag = [ weak ] opaque-tag
/// weak       = %x57.2F ; "W/", case-sensitive
/// opaque-tag = DQUOTE *etagc DQUOTE
/// etagc      = %x21 / %x23-7E / obs-text
/// ```
///
/// Comparison comes in two flavors: strong comparison requires both tags
/// to be strong, weak comparison ignores the weakness marker.
///
/// # Example values
///
/// * `"xyzzy"`
/// * `W/"xyzzy"`
/// * `""`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityTag {
    weak: bool,
    opaque: String,
}

impl EntityTag {
    /// A strong tag; `opaque` must hold only `etagc` characters.
    pub fn strong(opaque: impl Into<String>) -> Result<Self, ParseError> {
        Self::build(false, opaque.into())
    }

    /// A weak tag; `opaque` must hold only `etagc` characters.
    pub fn weak(opaque: impl Into<String>) -> Result<Self, ParseError> {
        Self::build(true, opaque.into())
    }

    fn build(weak: bool, opaque: String) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(&opaque);
        if cursor.token(&ETAGC).len() != opaque.len() {
            return Err(cursor.invalid_character(
                // token() stopped on the offender
                cursor.peek().unwrap_or('"'),
            ));
        }
        Ok(Self { weak, opaque })
    }

    #[must_use]
    pub fn is_weak(&self) -> bool {
        self.weak
    }

    /// The opaque content between the quotes.
    #[must_use]
    pub fn opaque(&self) -> &str {
        &self.opaque
    }

    /// Strong comparison: equal opaque tags, neither marked weak.
    #[must_use]
    pub fn strong_eq(&self, other: &Self) -> bool {
        !self.weak && !other.weak && self.opaque == other.opaque
    }

    /// Weak comparison: equal opaque tags, weakness ignored.
    #[must_use]
    pub fn weak_eq(&self, other: &Self) -> bool {
        self.opaque == other.opaque
    }
}

impl FromStr for EntityTag {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);
        let weak = text.starts_with("W/");
        if weak {
            cursor.advance();
            cursor.advance();
        }
        cursor.expect('"')?;
        let opaque = cursor.token(&ETAGC).to_owned();
        match cursor.peek() {
            Some('"') => cursor.advance(),
            Some(c) => return Err(cursor.invalid_character(c)),
            None => {
                return Err(ParseError::unterminated(
                    "quote",
                    cursor.position(),
                    text,
                ));
            }
        }
        match cursor.peek() {
            None => Ok(Self { weak, opaque }),
            Some(c) => Err(cursor.invalid_character(c)),
        }
    }
}

impl fmt::Display for EntityTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.weak {
            f.write_str("W/")?;
        }
        write!(f, "\"{}\"", self.opaque)
    }
}

/// `ETag` header, defined in
/// [RFC7232](https://datatracker.ietf.org/doc/html/rfc7232#section-2.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ETag(pub EntityTag);

impl FromStr for ETag {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        text.parse().map(Self)
    }
}

impl fmt::Display for ETag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl TypedHeader for ETag {
    fn name() -> &'static HeaderName {
        &http::header::ETAG
    }
}

impl HeaderDecode for ETag {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        decode_one(values)
    }
}

impl HeaderEncode for ETag {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}
