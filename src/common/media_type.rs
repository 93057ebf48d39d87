use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::{Cursor, ParseError, chars};
use crate::specifier::{ParameterName, Parameters, Quality, sort_by_quality_descending};
use crate::typed_header::{decode_one, encode_display};
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// A media type (`type/subtype` plus parameters), defined in
/// [RFC7231](https://datatracker.ietf.org/doc/html/rfc7231#section-3.1.1.1).
///
/// # ABNF
///
/// ```text
/// media-type = type "/" subtype *( OWS ";" OWS parameter )
/// type       = token
/// subtype    = token
/// parameter  = token "=" ( token / quoted-string )
/// ```
///
/// Wildcards are accepted where `Accept` media ranges allow them: `*/*`
/// and `type/*`; `*/subtype` is a syntax error. Type, subtype and
/// parameter names compare case-insensitively.
///
/// # Example values
///
/// * `text/html; charset=utf-8`
/// * `multipart/form-data; boundary=abc123`
/// * `image/*`
#[derive(Debug, Clone)]
pub struct MediaType {
    ty: String,
    subtype: String,
    parameters: Parameters,
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.ty.eq_ignore_ascii_case(&other.ty)
            && self.subtype.eq_ignore_ascii_case(&other.subtype)
            && self.parameters == other.parameters
    }
}

impl Eq for MediaType {}

/// Scan mode while reading the `type "/" subtype` prefix; the parameter
/// tail has its own loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Type,
    Subtype,
    ParameterSeparator,
    ParameterName,
    ParameterEquals,
    ParameterValue,
}

impl MediaType {
    /// Parse exactly one media type; a `,` anywhere is a syntax error.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(text);
        let media_type = Self::parse_at(&mut cursor)?;
        match cursor.peek() {
            None => Ok(media_type),
            Some(c) => Err(cursor.invalid_character(c)),
        }
    }

    /// Parse a comma-separated media type list, stable-sorted by
    /// descending `q` parameter.
    pub fn parse_list(text: &str) -> Result<Vec<Self>, ParseError> {
        let mut cursor = Cursor::new(text);
        let mut list = Vec::new();
        loop {
            list.push(Self::parse_at(&mut cursor)?);
            match cursor.peek() {
                None => break,
                Some(',') => cursor.advance(),
                Some(c) => return Err(cursor.invalid_character(c)),
            }
        }
        sort_by_quality_descending(&mut list, Self::quality);
        Ok(list)
    }

    /// Scan one media type, stopping before a top-level `,` or at end of
    /// text.
    fn parse_at(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.skip_whitespace();

        let mut mode = Mode::Type;
        let mut ty = "";
        let mut subtype = "";
        let mut parameters = Parameters::new();
        let mut pending_name: Option<ParameterName> = None;

        loop {
            match mode {
                Mode::Type => {
                    ty = if cursor.peek() == Some('*') {
                        cursor.advance();
                        "*"
                    } else {
                        cursor.required_token(&chars::RFC2045_TOKEN, "media type")?
                    };
                    cursor.expect('/')?;
                    mode = Mode::Subtype;
                }
                Mode::Subtype => {
                    subtype = if cursor.peek() == Some('*') {
                        cursor.advance();
                        "*"
                    } else if ty == "*" {
                        // only */* is a legal wildcard range
                        return Err(match cursor.peek() {
                            Some(c) => cursor.invalid_character(c),
                            None => cursor.missing("media subtype"),
                        });
                    } else {
                        cursor.required_token(&chars::RFC2045_TOKEN, "media subtype")?
                    };
                    cursor.skip_whitespace();
                    mode = Mode::ParameterSeparator;
                }
                Mode::ParameterSeparator => match cursor.peek() {
                    None | Some(',') => break,
                    Some(';') => {
                        cursor.advance();
                        cursor.skip_whitespace();
                        mode = Mode::ParameterName;
                    }
                    Some(c) => return Err(cursor.invalid_character(c)),
                },
                Mode::ParameterName => {
                    let name = cursor.required_token(&chars::RFC2045_TOKEN, "parameter name")?;
                    pending_name = Some(ParameterName::new_unchecked(name));
                    cursor.skip_whitespace();
                    mode = Mode::ParameterEquals;
                }
                Mode::ParameterEquals => {
                    cursor.expect('=')?;
                    cursor.skip_whitespace();
                    mode = Mode::ParameterValue;
                }
                Mode::ParameterValue => {
                    let position = cursor.position();
                    let value = if cursor.peek() == Some('"') {
                        cursor.quoted_text(&chars::QUOTED_TEXT, true)?
                    } else {
                        cursor
                            .required_token(&chars::RFC2045_TOKEN, "parameter value")?
                            .to_owned()
                    };
                    let Some(name) = pending_name.take() else {
                        return Err(cursor.missing("parameter name"));
                    };
                    if name == *"q" {
                        Quality::parse(&value)
                            .map_err(|err| err.at_offset(position, cursor.text()))?;
                    }
                    parameters.insert(name, value, position);
                    cursor.skip_whitespace();
                    mode = Mode::ParameterSeparator;
                }
            }
        }

        Ok(Self {
            ty: ty.to_owned(),
            subtype: subtype.to_owned(),
            parameters,
        })
    }

    /// Build a media type programmatically; both parts must be tokens or
    /// a legal wildcard combination.
    pub fn new(ty: impl Into<String>, subtype: impl Into<String>) -> Result<Self, ParseError> {
        let ty = ty.into();
        let subtype = subtype.into();
        Self::parse(&format!("{ty}/{subtype}"))
    }

    #[must_use]
    pub fn type_(&self) -> &str {
        &self.ty
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Case-insensitive parameter lookup.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }

    /// Functional update: returns a copy with the parameter set.
    #[must_use]
    pub fn with_parameter(mut self, name: ParameterName, value: impl Into<String>) -> Self {
        self.parameters.set(name, value.into());
        self
    }

    #[must_use]
    pub fn is_wildcard_type(&self) -> bool {
        self.ty == "*"
    }

    #[must_use]
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == "*"
    }

    /// The `q` parameter weight, 1 when absent.
    #[must_use]
    pub fn quality(&self) -> Quality {
        self.parameter("q")
            .and_then(|value| Quality::parse(value).ok())
            .unwrap_or_default()
    }

    /// Wildcard-aware range test: does this (possibly wildcard) range
    /// include `other`?
    #[must_use]
    pub fn includes(&self, other: &Self) -> bool {
        (self.is_wildcard_type() || self.ty.eq_ignore_ascii_case(&other.ty))
            && (self.is_wildcard_subtype() || self.subtype.eq_ignore_ascii_case(&other.subtype))
    }
}

impl FromStr for MediaType {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}{}", self.ty, self.subtype, self.parameters)
    }
}

/// `Content-Type` header, defined in
/// [RFC7231](https://datatracker.ietf.org/doc/html/rfc7231#section-3.1.1.5).
///
/// # Example values
///
/// * `text/html; charset=utf-8`
/// * `application/json`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType(MediaType);

impl ContentType {
    #[must_use]
    pub fn new(media_type: MediaType) -> Self {
        Self(media_type)
    }

    #[must_use]
    pub fn media_type(&self) -> &MediaType {
        &self.0
    }

    #[must_use]
    pub fn into_media_type(self) -> MediaType {
        self.0
    }
}

impl TypedHeader for ContentType {
    fn name() -> &'static HeaderName {
        &http::header::CONTENT_TYPE
    }
}

impl HeaderDecode for ContentType {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        decode_one(values).map(Self)
    }
}

impl HeaderEncode for ContentType {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(&self.0, values);
    }
}

/// `Accept` header, defined in
/// [RFC7231](https://datatracker.ietf.org/doc/html/rfc7231#section-5.3.2):
/// a media-range list ordered by descending `q` weight.
///
/// # Example values
///
/// * `audio/*; q=0.2, audio/basic`
/// * `text/plain; q=0.5, text/html`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accept(pub Vec<MediaType>);

impl TypedHeader for Accept {
    fn name() -> &'static HeaderName {
        &http::header::ACCEPT
    }
}

impl HeaderDecode for Accept {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        let mut ranges = Vec::new();
        let mut any = false;
        for value in values {
            any = true;
            let text = value.to_str().map_err(|_| Error::invalid())?;
            ranges.extend(MediaType::parse_list(text).map_err(Error::from)?);
        }
        if !any {
            return Err(Error::invalid());
        }
        sort_by_quality_descending(&mut ranges, MediaType::quality);
        Ok(Self(ranges))
    }
}

impl HeaderEncode for Accept {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        let text = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if let Ok(value) = HeaderValue::from_str(&text) {
            values.extend(std::iter::once(value));
        }
    }
}
