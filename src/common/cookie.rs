use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::chars::{self, CharClass};
use crate::parser::{Cursor, ParseError};
use crate::typed_header::{decode_one, encode_display};
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// `cookie-octet` per RFC 6265: printable US-ASCII except DQUOTE, comma,
/// semicolon and backslash.
const COOKIE_OCTET: CharClass = CharClass::new("cookie octet", |c| {
    ('!'..='~').contains(&c) && !matches!(c, '"' | ',' | ';' | '\\')
});

/// `Cookie` request header, defined in
/// [RFC6265](https://datatracker.ietf.org/doc/html/rfc6265#section-5.4).
///
/// # ABNF
///
/// ```text
/// cookie-header = "Cookie:" OWS cookie-string OWS
/// cookie-string = cookie-pair *( ";" SP cookie-pair )
/// cookie-pair   = cookie-name "=" cookie-value
/// cookie-name   = token
/// cookie-value  = *cookie-octet / ( DQUOTE *cookie-octet DQUOTE )
/// ```
///
/// Pairs keep their written order and may repeat; [`Cookie::get`] returns
/// the first match. Names compare exactly, not case-insensitively, per
/// RFC 6265. A DQUOTE-wrapped value is read without the quotes and
/// serialized bare.
///
/// # Example values
///
/// * `SID=31d4d96e407aad42`
/// * `SID=31d4d96e407aad42; lang=en-US`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cookie {
    pairs: Vec<(String, String)>,
}

impl Cookie {
    /// An empty pair list; invalid as header text until a pair is added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Functional update: returns a copy with `name=value` appended.
    /// The name must be a token and the value all cookie-octets.
    pub fn with(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        let value = value.into();
        let mut cursor = Cursor::new(&name);
        if cursor.token(&chars::RFC2045_TOKEN).len() != name.len() || name.is_empty() {
            return Err(cursor.missing("cookie name"));
        }
        let mut cursor = Cursor::new(&value);
        if cursor.token(&COOKIE_OCTET).len() != value.len() {
            let c = cursor.peek().unwrap_or(' ');
            return Err(cursor.invalid_character(c));
        }
        self.pairs.push((name, value));
        Ok(self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// The first value written under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(pair_name, _)| pair_name == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl FromStr for Cookie {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);
        let mut pairs = Vec::new();
        loop {
            cursor.skip_whitespace();
            let name = cursor
                .required_token(&chars::RFC2045_TOKEN, "cookie name")?
                .to_owned();
            cursor.expect('=')?;
            let value = if cursor.peek() == Some('"') {
                // wrapped form, no escaping exists inside
                cursor.quoted_text(&COOKIE_OCTET, false)?
            } else {
                cursor.token(&COOKIE_OCTET).to_owned()
            };
            pairs.push((name, value));
            cursor.skip_whitespace();
            match cursor.peek() {
                None => break,
                Some(';') => cursor.advance(),
                Some(c) => return Err(cursor.invalid_character(c)),
            }
        }
        Ok(Self { pairs })
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut pairs = self.pairs.iter();
        if let Some((name, value)) = pairs.next() {
            write!(f, "{name}={value}")?;
        }
        for (name, value) in pairs {
            write!(f, "; {name}={value}")?;
        }
        Ok(())
    }
}

impl TypedHeader for Cookie {
    fn name() -> &'static HeaderName {
        &http::header::COOKIE
    }
}

impl HeaderDecode for Cookie {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        decode_one(values)
    }
}

impl HeaderEncode for Cookie {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;

    #[test]
    fn single_pair() {
        let cookie: Cookie = "SID=31d4d96e407aad42".parse().unwrap();
        assert_eq!(cookie.get("SID"), Some("31d4d96e407aad42"));
        assert_eq!(cookie.len(), 1);
    }

    #[test]
    fn multiple_pairs() {
        let cookie: Cookie = "SID=31d4d96e407aad42; lang=en-US".parse().unwrap();
        assert_eq!(cookie.get("SID"), Some("31d4d96e407aad42"));
        assert_eq!(cookie.get("lang"), Some("en-US"));
    }

    #[test]
    fn names_compare_exactly() {
        let cookie: Cookie = "SID=1".parse().unwrap();
        assert_eq!(cookie.get("sid"), None);
    }

    #[test]
    fn first_match_wins_on_repeats() {
        let cookie: Cookie = "a=1; a=2".parse().unwrap();
        assert_eq!(cookie.get("a"), Some("1"));
        assert_eq!(cookie.len(), 2);
    }

    #[test]
    fn empty_value_is_legal() {
        let cookie: Cookie = "a=".parse().unwrap();
        assert_eq!(cookie.get("a"), Some(""));
    }

    #[test]
    fn quoted_value_is_read_without_the_quotes() {
        let cookie: Cookie = "a=\"b\"; c=d".parse().unwrap();
        assert_eq!(cookie.get("a"), Some("b"));
        assert_eq!(cookie.to_string(), "a=b; c=d");
    }

    #[test]
    fn missing_name_or_equals_is_rejected() {
        let err = "=1".parse::<Cookie>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("cookie name"));
        let err = "a".parse::<Cookie>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("text"));
        let err = "a=1;".parse::<Cookie>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("cookie name"));
    }

    #[test]
    fn value_stops_at_forbidden_octets() {
        let err = "a=b c".parse::<Cookie>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('c'));
        let err = "a=b\\c".parse::<Cookie>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('\\'));
    }

    #[test]
    fn builder_validates() {
        let cookie = Cookie::new().with("a", "1").unwrap().with("b", "2").unwrap();
        assert_eq!(cookie.to_string(), "a=1; b=2");
        assert!(Cookie::new().with("two words", "1").is_err());
        assert!(Cookie::new().with("a", "two words").is_err());
    }

    #[test]
    fn round_trip() {
        for text in ["SID=31d4d96e407aad42", "SID=31d4d96e407aad42; lang=en-US", "a="] {
            let cookie: Cookie = text.parse().unwrap();
            assert_eq!(cookie.to_string(), text);
            assert_eq!(cookie.to_string().parse::<Cookie>().unwrap(), cookie);
        }
    }
}
