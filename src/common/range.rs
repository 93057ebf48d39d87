use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::{Cursor, ParseError, chars};
use crate::typed_header::{decode_one, encode_display};
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// A range unit: `bytes` or a registered extension token.
#[derive(Debug, Clone)]
pub enum RangeUnit {
    Bytes,
    Named(String),
}

impl RangeUnit {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bytes => "bytes",
            Self::Named(name) => name,
        }
    }
}

impl PartialEq for RangeUnit {
    fn eq(&self, other: &Self) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl Eq for RangeUnit {}

impl FromStr for RangeUnit {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text.eq_ignore_ascii_case("bytes") {
            return Ok(Self::Bytes);
        }
        let mut cursor = Cursor::new(text);
        let token = cursor.token(&chars::RFC2045_TOKEN);
        if token.len() != text.len() || text.is_empty() {
            return Err(cursor.missing("range unit"));
        }
        Ok(Self::Named(text.to_owned()))
    }
}

impl fmt::Display for RangeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One byte-range specifier within a `Range` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRangeSpec {
    /// `first-last`, both inclusive.
    Bounded(u64, u64),
    /// `first-`: from `first` through the end.
    From(u64),
    /// `-suffix`: the final `suffix` bytes.
    Suffix(u64),
}

impl fmt::Display for ByteRangeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bounded(first, last) => write!(f, "{first}-{last}"),
            Self::From(first) => write!(f, "{first}-"),
            Self::Suffix(suffix) => write!(f, "-{suffix}"),
        }
    }
}

/// `Range` request header, defined in
/// [RFC7233](https://datatracker.ietf.org/doc/html/rfc7233#section-3.1).
///
/// # ABNF
///
/// ```text
/// Range           = byte-ranges-specifier / other-ranges-specifier
/// byte-ranges-specifier = bytes-unit "=" byte-range-set
/// byte-range-set  = 1#( byte-range-spec / suffix-byte-range-spec )
/// byte-range-spec = first-byte-pos "-" [ last-byte-pos ]
/// suffix-byte-range-spec = "-" suffix-length
/// ```
///
/// Besides the wire grammar, bounded specs must be well ordered
/// (`last >= first`) and the absolute specs must not overlap each other.
///
/// # Example values
///
/// * `bytes=0-499`
/// * `bytes=0-499, 500-999`
/// * `bytes=-500`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    unit: RangeUnit,
    specs: Vec<ByteRangeSpec>,
}

impl Range {
    /// Build a validated range; `specs` must be non-empty, well ordered
    /// and non-overlapping.
    pub fn new(unit: RangeUnit, specs: Vec<ByteRangeSpec>) -> Result<Self, ParseError> {
        let candidate = Self { unit, specs };
        let text = candidate.to_string();
        if candidate.specs.is_empty() {
            return Err(ParseError::missing("range", text.len(), text));
        }
        validate_specs(&candidate.specs, text.len(), &text)?;
        Ok(candidate)
    }

    /// `bytes=first-last`.
    pub fn bytes(first: u64, last: u64) -> Result<Self, ParseError> {
        Self::new(RangeUnit::Bytes, vec![ByteRangeSpec::Bounded(first, last)])
    }

    #[must_use]
    pub fn unit(&self) -> &RangeUnit {
        &self.unit
    }

    #[must_use]
    pub fn specs(&self) -> &[ByteRangeSpec] {
        &self.specs
    }
}

fn validate_specs(specs: &[ByteRangeSpec], position: usize, text: &str) -> Result<(), ParseError> {
    for spec in specs {
        if let ByteRangeSpec::Bounded(first, last) = spec
            && last < first
        {
            return Err(ParseError::range_violation(
                "range end is before range start",
                position,
                text,
            ));
        }
    }
    // absolute spans must not intersect; suffix spans cannot be checked
    // without knowing the representation length
    for (i, a) in specs.iter().enumerate() {
        for b in &specs[i + 1..] {
            let overlapping = match (a, b) {
                (ByteRangeSpec::Bounded(a0, a1), ByteRangeSpec::Bounded(b0, b1)) => {
                    a0 <= b1 && b0 <= a1
                }
                (ByteRangeSpec::Bounded(_, a1), ByteRangeSpec::From(b0)) => b0 <= a1,
                (ByteRangeSpec::From(a0), ByteRangeSpec::Bounded(_, b1)) => a0 <= b1,
                (ByteRangeSpec::From(_), ByteRangeSpec::From(_)) => true,
                _ => false,
            };
            if overlapping {
                return Err(ParseError::range_violation(
                    "overlapping ranges",
                    position,
                    text,
                ));
            }
        }
    }
    Ok(())
}

impl FromStr for Range {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);

        let unit: RangeUnit = cursor
            .required_token(&chars::RFC2045_TOKEN, "range unit")?
            .parse()?;
        cursor.expect('=')?;

        let mut specs = Vec::new();
        loop {
            cursor.skip_whitespace();
            let spec = if cursor.peek() == Some('-') {
                cursor.advance();
                ByteRangeSpec::Suffix(parse_u64(&mut cursor, "suffix length")?)
            } else {
                let first = parse_u64(&mut cursor, "range start")?;
                cursor.expect('-')?;
                if matches!(cursor.peek(), Some(c) if chars::DIGIT.matches(c)) {
                    ByteRangeSpec::Bounded(first, parse_u64(&mut cursor, "range end")?)
                } else {
                    ByteRangeSpec::From(first)
                }
            };
            specs.push(spec);
            cursor.skip_whitespace();
            match cursor.peek() {
                None => break,
                Some(',') => cursor.advance(),
                Some(c) => return Err(cursor.invalid_character(c)),
            }
        }

        validate_specs(&specs, cursor.position(), text)?;

        Ok(Self { unit, specs })
    }
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

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}=", self.unit)?;
        let mut specs = self.specs.iter();
        if let Some(spec) = specs.next() {
            write!(f, "{spec}")?;
        }
        for spec in specs {
            write!(f, ", {spec}")?;
        }
        Ok(())
    }
}

impl TypedHeader for Range {
    fn name() -> &'static HeaderName {
        &http::header::RANGE
    }
}

impl HeaderDecode for Range {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        decode_one(values)
    }
}

impl HeaderEncode for Range {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;

    #[test]
    fn single_bounded_range() {
        let range: Range = "bytes=0-499".parse().unwrap();
        assert_eq!(*range.unit(), RangeUnit::Bytes);
        assert_eq!(range.specs(), [ByteRangeSpec::Bounded(0, 499)]);
    }

    #[test]
    fn multiple_specs_with_open_and_suffix() {
        let range: Range = "bytes=0-499, 600-, -100".parse().unwrap();
        assert_eq!(
            range.specs(),
            [
                ByteRangeSpec::Bounded(0, 499),
                ByteRangeSpec::From(600),
                ByteRangeSpec::Suffix(100),
            ]
        );
    }

    #[test]
    fn end_before_start_is_rejected() {
        let err = "bytes=499-0".parse::<Range>().unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::RangeViolation(_)));
    }

    #[test]
    fn overlapping_ranges_are_rejected() {
        for text in [
            "bytes=0-499, 400-599",
            "bytes=0-499, 300-",
            "bytes=500-, 600-",
        ] {
            let err = text.parse::<Range>().unwrap_err();
            assert!(
                matches!(*err.kind(), ErrorKind::RangeViolation(_)),
                "{text}"
            );
        }
        assert!("bytes=0-499, 500-999".parse::<Range>().is_ok());
    }

    #[test]
    fn suffix_specs_are_not_overlap_checked() {
        assert!("bytes=0-499, -100".parse::<Range>().is_ok());
    }

    #[test]
    fn missing_spec_is_rejected() {
        let err = "bytes=".parse::<Range>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("range start"));
        let err = "bytes=0-499,".parse::<Range>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("range start"));
    }

    #[test]
    fn unit_is_case_insensitive() {
        let range: Range = "BYTES=0-1".parse().unwrap();
        assert_eq!(*range.unit(), RangeUnit::Bytes);
    }

    #[test]
    fn round_trip() {
        for text in ["bytes=0-499", "bytes=0-499, 600-, -100", "pages=1-2"] {
            let range: Range = text.parse().unwrap();
            assert_eq!(range.to_string(), text);
            assert_eq!(range.to_string().parse::<Range>().unwrap(), range);
        }
    }
}
