use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::{Cursor, ParseError, chars};
use crate::typed_header::{decode_one, encode_display};
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

use super::range::RangeUnit;

/// `Content-Range` header, defined in
/// [RFC7233](https://datatracker.ietf.org/doc/html/rfc7233#section-4.2).
///
/// # ABNF
///
/// ```text
/// Content-Range       = byte-content-range / other-content-range
/// byte-content-range  = bytes-unit SP ( byte-range-resp / unsatisfied-range )
/// byte-range-resp     = byte-range "/" ( complete-length / "*" )
/// byte-range          = first-byte-pos "-" last-byte-pos
/// unsatisfied-range   = "*/" complete-length
/// ```
///
/// Bounds are validated: `last` must not precede `first`, and a concrete
/// complete length must exceed `last`.
///
/// # Example values
///
/// * `bytes 500-999/1000`
/// * `bytes 0-499/*`
/// * `bytes */1000`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRange {
    unit: RangeUnit,
    /// `None` is the unsatisfied-range wildcard (`*`).
    range: Option<(u64, u64)>,
    /// `None` is the unknown-length wildcard (`*`).
    complete_length: Option<u64>,
}

impl ContentRange {
    /// A satisfied byte range with a known complete length, e.g.
    /// `bytes 500-999/1000`.
    pub fn bytes(first: u64, last: u64, complete_length: u64) -> Result<Self, ParseError> {
        Self::build(RangeUnit::Bytes, Some((first, last)), Some(complete_length))
    }

    /// A satisfied byte range against an unknown length, e.g.
    /// `bytes 0-499/*`.
    pub fn bytes_unknown_length(first: u64, last: u64) -> Result<Self, ParseError> {
        Self::build(RangeUnit::Bytes, Some((first, last)), None)
    }

    /// The unsatisfied form, e.g. `bytes */1000`.
    #[must_use]
    pub fn unsatisfied_bytes(complete_length: u64) -> Self {
        Self {
            unit: RangeUnit::Bytes,
            range: None,
            complete_length: Some(complete_length),
        }
    }

    fn build(
        unit: RangeUnit,
        range: Option<(u64, u64)>,
        complete_length: Option<u64>,
    ) -> Result<Self, ParseError> {
        let candidate = Self {
            unit,
            range,
            complete_length,
        };
        let text = candidate.to_string();
        validate(range, complete_length, text.len(), &text)?;
        Ok(candidate)
    }

    #[must_use]
    pub fn unit(&self) -> &RangeUnit {
        &self.unit
    }

    /// The satisfied `(first, last)` byte positions, `None` for `*`.
    #[must_use]
    pub fn range(&self) -> Option<(u64, u64)> {
        self.range
    }

    /// The complete representation length, `None` for `*`.
    #[must_use]
    pub fn complete_length(&self) -> Option<u64> {
        self.complete_length
    }
}

fn validate(
    range: Option<(u64, u64)>,
    complete_length: Option<u64>,
    position: usize,
    text: &str,
) -> Result<(), ParseError> {
    if let Some((first, last)) = range {
        if last < first {
            return Err(ParseError::range_violation(
                "range end is before range start",
                position,
                text,
            ));
        }
        if let Some(complete) = complete_length
            && complete <= last
        {
            return Err(ParseError::range_violation(
                "complete length does not exceed range end",
                position,
                text,
            ));
        }
    }
    Ok(())
}

fn parse_u64(cursor: &mut Cursor<'_>, what: &'static str) -> Result<u64, ParseError> {
    let digits = cursor.required_token(&chars::DIGIT, what)?;
    digits.parse().map_err(|_| {
        ParseError::range_violation(
            "number too large",
            cursor.position() - digits.len(),
            cursor.text(),
        )
    })
}

impl FromStr for ContentRange {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);

        let unit: RangeUnit = cursor
            .required_token(&chars::RFC2045_TOKEN, "range unit")?
            .parse()?;
        cursor.expect(' ')?;

        let range = if cursor.peek() == Some('*') {
            cursor.advance();
            None
        } else {
            let first = parse_u64(&mut cursor, "range start")?;
            cursor.expect('-')?;
            let last = parse_u64(&mut cursor, "range end")?;
            Some((first, last))
        };

        cursor.expect('/')?;

        let complete_length = if cursor.peek() == Some('*') {
            cursor.advance();
            None
        } else {
            Some(parse_u64(&mut cursor, "complete length")?)
        };

        if let Some(c) = cursor.peek() {
            return Err(cursor.invalid_character(c));
        }

        // * / * carries no information at all
        if range.is_none() && complete_length.is_none() {
            return Err(ParseError::missing("complete length", text.len(), text));
        }

        validate(range, complete_length, cursor.position(), text)?;

        Ok(Self {
            unit,
            range,
            complete_length,
        })
    }
}

impl fmt::Display for ContentRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.unit)?;
        match self.range {
            Some((first, last)) => write!(f, "{first}-{last}")?,
            None => f.write_str("*")?,
        }
        match self.complete_length {
            Some(complete) => write!(f, "/{complete}"),
            None => f.write_str("/*"),
        }
    }
}

impl TypedHeader for ContentRange {
    fn name() -> &'static HeaderName {
        &http::header::CONTENT_RANGE
    }
}

impl HeaderDecode for ContentRange {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        decode_one(values)
    }
}

impl HeaderEncode for ContentRange {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;

    #[test]
    fn satisfied_range_with_length() {
        let range: ContentRange = "bytes 500-999/1000".parse().unwrap();
        assert_eq!(*range.unit(), RangeUnit::Bytes);
        assert_eq!(range.range(), Some((500, 999)));
        assert_eq!(range.complete_length(), Some(1000));
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = "bytes 999-500/1000".parse::<ContentRange>().unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::RangeViolation(_)));
    }

    #[test]
    fn length_must_exceed_range_end() {
        let err = "bytes 500-999/999".parse::<ContentRange>().unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::RangeViolation(_)));
        assert!("bytes 500-999/1000".parse::<ContentRange>().is_ok());
    }

    #[test]
    fn unknown_length() {
        let range: ContentRange = "bytes 0-499/*".parse().unwrap();
        assert_eq!(range.range(), Some((0, 499)));
        assert_eq!(range.complete_length(), None);
    }

    #[test]
    fn unsatisfied_range() {
        let range: ContentRange = "bytes */1000".parse().unwrap();
        assert_eq!(range.range(), None);
        assert_eq!(range.complete_length(), Some(1000));
    }

    #[test]
    fn star_slash_star_is_rejected() {
        assert!("bytes */*".parse::<ContentRange>().is_err());
    }

    #[test]
    fn syntax_errors_are_positioned() {
        let err = "bytes 500-999".parse::<ContentRange>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("text"));
        assert_eq!(err.position(), 13);

        let err = "bytes 500x999/1000".parse::<ContentRange>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('x'));
        assert_eq!(err.position(), 9);
    }

    #[test]
    fn other_units_are_carried() {
        let range: ContentRange = "pages 1-2/10".parse().unwrap();
        assert_eq!(range.unit().as_str(), "pages");
    }

    #[test]
    fn round_trip() {
        for text in ["bytes 500-999/1000", "bytes 0-499/*", "bytes */1000"] {
            let range: ContentRange = text.parse().unwrap();
            assert_eq!(range.to_string(), text);
            assert_eq!(range.to_string().parse::<ContentRange>().unwrap(), range);
        }
    }

    #[test]
    fn constructors_validate() {
        assert!(ContentRange::bytes(500, 999, 1000).is_ok());
        assert!(ContentRange::bytes(999, 500, 1000).is_err());
        assert!(ContentRange::bytes(500, 999, 999).is_err());
    }
}
