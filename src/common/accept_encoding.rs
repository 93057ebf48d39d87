use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::{Cursor, ParameterizedGrammar, ParseError, ValuePolicy, chars, parse_parameterized};
use crate::specifier::{ParameterName, Quality, QualityValue, sort_by_quality_descending};
use crate::typed_header::encode_display;
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// A content coding, either the wildcard `*` or a named coding such as
/// `gzip`.
#[derive(Debug, Clone)]
pub enum ContentCoding {
    Wildcard,
    Named(String),
}

impl ContentCoding {
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Self::Wildcard)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Wildcard => "*",
            Self::Named(name) => name,
        }
    }

    /// Whether this coding covers `coding`. The wildcard covers
    /// everything; named codings compare case-insensitively.
    #[must_use]
    pub fn matches(&self, coding: &str) -> bool {
        match self {
            Self::Wildcard => true,
            Self::Named(name) => name.eq_ignore_ascii_case(coding),
        }
    }
}

impl PartialEq for ContentCoding {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Wildcard, Self::Wildcard) => true,
            (Self::Named(a), Self::Named(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

impl Eq for ContentCoding {}

impl FromStr for ContentCoding {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        if text == "*" {
            return Ok(Self::Wildcard);
        }
        let mut cursor = Cursor::new(text);
        let token = cursor.token(&chars::RFC2045_TOKEN);
        if token.len() != text.len() || text.is_empty() {
            return Err(cursor.missing("content coding"));
        }
        Ok(Self::Named(text.to_owned()))
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Accept-Encoding` header, defined in
/// [RFC7231](https://datatracker.ietf.org/doc/html/rfc7231#section-5.3.4).
///
/// # ABNF
///
/// ```text
/// Accept-Encoding = #( codings [ weight ] )
/// codings         = content-coding / "identity" / "*"
/// weight          = OWS ";" OWS "q=" qvalue
/// ```
///
/// Codings are held sorted by descending weight; equal weights keep their
/// written order. Only the `q` parameter is permitted. Parenthesized
/// comments are skipped at whitespace boundaries, per the older RFC 2616
/// grammar still seen in the wild.
///
/// # Example values
///
/// * `gzip`
/// * `br, gzip; q=0.8`
/// * `*; q=0.5`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AcceptEncoding {
    codings: Vec<QualityValue<ContentCoding>>,
}

struct Grammar;

impl ParameterizedGrammar for Grammar {
    fn allows_multiple_values(&self) -> bool {
        true
    }

    fn allows_wildcard(&self) -> bool {
        true
    }

    fn allows_comments(&self) -> bool {
        true
    }

    fn parameter_value_policy(&self, _name: &ParameterName) -> ValuePolicy {
        ValuePolicy::Token(chars::RFC2045_TOKEN)
    }
}

impl AcceptEncoding {
    /// Build from weighted codings; sorts by descending weight.
    #[must_use]
    pub fn new(mut codings: Vec<QualityValue<ContentCoding>>) -> Self {
        sort_by_quality_descending(&mut codings, |coding| coding.quality);
        Self { codings }
    }

    /// Weighted codings, highest weight first.
    #[must_use]
    pub fn codings(&self) -> &[QualityValue<ContentCoding>] {
        &self.codings
    }

    /// The weight assigned to `coding`: a named entry wins over the
    /// wildcard, `None` when nothing covers it.
    #[must_use]
    pub fn quality_of(&self, coding: &str) -> Option<Quality> {
        self.codings
            .iter()
            .find(|qv| matches!(&qv.value, ContentCoding::Named(name) if name.eq_ignore_ascii_case(coding)))
            .or_else(|| self.codings.iter().find(|qv| qv.value.is_wildcard()))
            .map(|qv| qv.quality)
    }

    /// Whether `coding` is acceptable: covered by a named entry or the
    /// wildcard, with a non-zero weight. `*;q=0` matches nothing.
    #[must_use]
    pub fn accepts(&self, coding: &str) -> bool {
        self.quality_of(coding).is_some_and(|q| !q.is_zero())
    }
}

impl FromStr for AcceptEncoding {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let raw = parse_parameterized(&Grammar, text)?;
        let mut codings = Vec::with_capacity(raw.len());
        for value in raw {
            let mut quality = Quality::default();
            for entry in value.params.entries() {
                if *entry.name() == *"q" {
                    quality = Quality::parse(entry.value())
                        .map_err(|err| err.at_offset(entry.position(), text))?;
                } else {
                    return Err(ParseError::unexpected_parameter(
                        entry.name().as_str(),
                        entry.position(),
                        text,
                    ));
                }
            }
            let coding = if value.wildcard {
                ContentCoding::Wildcard
            } else {
                ContentCoding::Named(value.text)
            };
            codings.push(QualityValue::new(coding, quality));
        }
        Ok(Self::new(codings))
    }
}

impl fmt::Display for AcceptEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codings = self.codings.iter();
        if let Some(coding) = codings.next() {
            write!(f, "{coding}")?;
        }
        for coding in codings {
            write!(f, ", {coding}")?;
        }
        Ok(())
    }
}

impl TypedHeader for AcceptEncoding {
    fn name() -> &'static HeaderName {
        &http::header::ACCEPT_ENCODING
    }
}

impl HeaderDecode for AcceptEncoding {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        let mut codings = Vec::new();
        let mut seen = false;
        for value in values {
            seen = true;
            let text = value.to_str().map_err(|_| Error::invalid())?;
            codings.extend(text.parse::<Self>().map_err(Error::from)?.codings);
        }
        if !seen {
            return Err(Error::invalid());
        }
        Ok(Self::new(codings))
    }
}

impl HeaderEncode for AcceptEncoding {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}
