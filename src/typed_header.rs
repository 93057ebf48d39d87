use http::{HeaderName, HeaderValue};

use std::error;
use std::fmt::{self, Display, Formatter};

use crate::parser::ParseError;

/// Identification of a typed header: its field name.
pub trait TypedHeader {
    /// The name of this header.
    fn name() -> &'static HeaderName;
}

/// Decoding of a typed header from raw [`HeaderValue`]s.
pub trait HeaderDecode: TypedHeader + Sized {
    /// Decode this type from an iterator of [`HeaderValue`]s.
    fn decode<'i, I>(values: &mut I) -> Result<Self, Error>
    where
        I: Iterator<Item = &'i HeaderValue>;
}

/// Encoding of a typed header into raw [`HeaderValue`]s.
pub trait HeaderEncode: TypedHeader {
    /// Encode this type to a [`HeaderValue`], and add it to a container
    /// which has [`HeaderValue`] type as each element.
    ///
    /// This function should be infallible. Any errors converting to a
    /// `HeaderValue` should have been caught when parsing or constructing
    /// this value.
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E);

    /// Encode this header to a single [`HeaderValue`].
    fn encode_to_value(&self) -> HeaderValue {
        let mut container = ExtendOnce(None);
        self.encode(&mut container);
        match container.0 {
            Some(value) => value,
            // encode() always extends with exactly one value
            None => HeaderValue::from_static(""),
        }
    }
}

struct ExtendOnce(Option<HeaderValue>);

impl Extend<HeaderValue> for ExtendOnce {
    fn extend<T: IntoIterator<Item = HeaderValue>>(&mut self, iter: T) {
        self.0 = iter.into_iter().next();
    }
}

/// Errors trying to decode a header.
///
/// Deliberately opaque at this boundary; the positioned detail is logged
/// at debug level where the decode happened.
#[derive(Debug)]
pub struct Error {
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Invalid,
}

impl Error {
    /// Create an 'invalid' Error.
    #[must_use]
    pub fn invalid() -> Self {
        Self {
            kind: Kind::Invalid,
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        tracing::debug!("failed to parse header value: {err}");
        Self::invalid()
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.kind {
            Kind::Invalid => f.write_str("invalid HTTP header"),
        }
    }
}

impl error::Error for Error {}

/// Decode a single-valued header through its `FromStr` grammar.
pub(crate) fn decode_one<'i, I, T>(values: &mut I) -> Result<T, Error>
where
    I: Iterator<Item = &'i HeaderValue>,
    T: std::str::FromStr<Err = ParseError>,
{
    let value = values.next().ok_or_else(Error::invalid)?;
    if values.next().is_some() {
        tracing::debug!("more than one header value where a single one is expected");
        return Err(Error::invalid());
    }
    let text = value.to_str().map_err(|_| {
        tracing::debug!("header value is not visible ASCII");
        Error::invalid()
    })?;
    text.parse().map_err(Error::from)
}

/// Encode any `Display` value as a header value.
///
/// The canonical text of every value type in this crate is valid header
/// text by construction.
pub(crate) fn encode_display<T: fmt::Display, E: Extend<HeaderValue>>(value: &T, values: &mut E) {
    let text = value.to_string();
    match HeaderValue::from_str(&text) {
        Ok(value) => values.extend(std::iter::once(value)),
        Err(err) => {
            tracing::debug!("failed to encode header text {text:?}: {err}");
        }
    }
}
