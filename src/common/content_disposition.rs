use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::chars::{self, CharClass};
use crate::parser::{ParameterizedGrammar, ParseError, ValuePolicy, parse_parameterized};
use crate::specifier::{ExtendedValue, ParameterName, Parameters};
use crate::typed_header::{decode_one, encode_display};
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// The disposition type at the front of a `Content-Disposition` value.
#[derive(Debug, Clone)]
pub enum DispositionType {
    Inline,
    Attachment,
    FormData,
    Ext(String),
}

impl DispositionType {
    fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("inline") {
            Self::Inline
        } else if token.eq_ignore_ascii_case("attachment") {
            Self::Attachment
        } else if token.eq_ignore_ascii_case("form-data") {
            Self::FormData
        } else {
            Self::Ext(token.to_owned())
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Inline => "inline",
            Self::Attachment => "attachment",
            Self::FormData => "form-data",
            Self::Ext(token) => token,
        }
    }
}

impl PartialEq for DispositionType {
    fn eq(&self, other: &Self) -> bool {
        self.as_str().eq_ignore_ascii_case(other.as_str())
    }
}

impl Eq for DispositionType {}

impl fmt::Display for DispositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `Content-Disposition` header, defined in
/// [RFC6266](https://datatracker.ietf.org/doc/html/rfc6266) (response
/// usage) and [RFC2183](https://datatracker.ietf.org/doc/html/rfc2183).
///
/// # ABNF
///
/// ```text
/// content-disposition = disposition-type *( ";" disposition-parm )
/// disposition-type    = "inline" / "attachment" / disp-ext-type
/// disposition-parm    = filename-parm / disp-ext-parm
/// filename-parm       = "filename" "=" value
///                     / "filename*" "=" ext-value
/// ```
///
/// `filename` takes a token or quoted string, `filename*` (and any other
/// `*`-suffixed parameter) an RFC 5987 [`ExtendedValue`], and `size`
/// digits only.
///
/// # Example values
///
/// * `inline`
/// * `attachment; filename="genome.jpeg"`
/// * `form-data; name=field; filename*=UTF-8''n%C3%A6ste.txt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentDisposition {
    disposition_type: DispositionType,
    parameters: Parameters,
}

const EXT_VALUE: CharClass = CharClass::new("rfc5987 ext value", |c| {
    chars::RFC2045_TOKEN.matches(c) && c != '*'
});

struct Grammar;

impl ParameterizedGrammar for Grammar {
    fn parameter_value_policy(&self, name: &ParameterName) -> ValuePolicy {
        if name.is_extended() {
            ValuePolicy::Token(EXT_VALUE)
        } else if *name == *"size" {
            ValuePolicy::Digits
        } else {
            ValuePolicy::TokenOrQuoted(chars::RFC2045_TOKEN)
        }
    }
}

impl ContentDisposition {
    #[must_use]
    pub fn inline() -> Self {
        Self {
            disposition_type: DispositionType::Inline,
            parameters: Parameters::new(),
        }
    }

    #[must_use]
    pub fn attachment() -> Self {
        Self {
            disposition_type: DispositionType::Attachment,
            parameters: Parameters::new(),
        }
    }

    #[must_use]
    pub fn form_data() -> Self {
        Self {
            disposition_type: DispositionType::FormData,
            parameters: Parameters::new(),
        }
    }

    /// Functional update: returns a copy carrying a `filename` parameter.
    #[must_use]
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.parameters
            .set(ParameterName::new_unchecked("filename"), filename.into());
        self
    }

    /// Functional update: returns a copy carrying a `filename*`
    /// parameter for names beyond US-ASCII.
    #[must_use]
    pub fn with_extended_filename(mut self, filename: &ExtendedValue) -> Self {
        self.parameters.set(
            ParameterName::new_unchecked("filename*"),
            filename.to_string(),
        );
        self
    }

    #[must_use]
    pub fn disposition_type(&self) -> &DispositionType {
        &self.disposition_type
    }

    #[must_use]
    pub fn is_attachment(&self) -> bool {
        self.disposition_type == DispositionType::Attachment
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// The plain `filename` parameter.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.parameters.get("filename")
    }

    /// The `filename*` parameter, decoded.
    #[must_use]
    pub fn extended_filename(&self) -> Option<ExtendedValue> {
        self.parameters
            .get("filename*")
            .and_then(|value| value.parse().ok())
    }

    /// The `size` parameter (approximate decoded size in bytes).
    #[must_use]
    pub fn size(&self) -> Option<u64> {
        self.parameters
            .get("size")
            .and_then(|value| value.parse().ok())
    }
}

impl FromStr for ContentDisposition {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut values = parse_parameterized(&Grammar, text)?;
        // single-value grammar: the machine rejects commas already
        let Some(raw) = values.pop() else {
            return Err(ParseError::missing("disposition type", 0, text));
        };

        // extended parameters must hold well-formed RFC 5987 text
        for entry in raw.params.entries() {
            if entry.name().is_extended() {
                entry
                    .value()
                    .parse::<ExtendedValue>()
                    .map_err(|err| err.at_offset(entry.position(), text))?;
            }
        }

        Ok(Self {
            disposition_type: DispositionType::from_token(&raw.text),
            parameters: raw.params,
        })
    }
}

impl fmt::Display for ContentDisposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.disposition_type, self.parameters)
    }
}

impl TypedHeader for ContentDisposition {
    fn name() -> &'static HeaderName {
        &http::header::CONTENT_DISPOSITION
    }
}

impl HeaderDecode for ContentDisposition {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        decode_one(values)
    }
}

impl HeaderEncode for ContentDisposition {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;
    use crate::specifier::Charset;

    #[test]
    fn bare_disposition_type() {
        let cd: ContentDisposition = "inline".parse().unwrap();
        assert_eq!(*cd.disposition_type(), DispositionType::Inline);
        assert!(cd.parameters().is_empty());
    }

    #[test]
    fn attachment_with_quoted_filename() {
        let cd: ContentDisposition = "attachment; filename=\"genome.jpeg\"".parse().unwrap();
        assert!(cd.is_attachment());
        assert_eq!(cd.filename(), Some("genome.jpeg"));
    }

    #[test]
    fn unterminated_filename_is_positioned_at_end_of_text() {
        let text = "attachment; filename=\"abc";
        let err = text.parse::<ContentDisposition>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::Unterminated("quote"));
        assert_eq!(err.position(), text.len());
    }

    #[test]
    fn extended_filename_is_validated_and_decoded() {
        let cd: ContentDisposition = "attachment; filename*=UTF-8''n%C3%A6ste.txt"
            .parse()
            .unwrap();
        let extended = cd.extended_filename().unwrap();
        assert_eq!(*extended.charset(), Charset::Utf8);
        assert_eq!(extended.decode_text().unwrap(), "næste.txt");
    }

    #[test]
    fn broken_extended_filename_is_positioned_absolutely() {
        let text = "attachment; filename*=UTF-8''n%ZZ";
        let err = text.parse::<ContentDisposition>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('Z'));
        assert_eq!(err.position(), 31);
        assert_eq!(err.input(), text);
    }

    #[test]
    fn size_accepts_digits_only() {
        let cd: ContentDisposition = "attachment; size=1024".parse().unwrap();
        assert_eq!(cd.size(), Some(1024));
        assert!("attachment; size=big".parse::<ContentDisposition>().is_err());
    }

    #[test]
    fn multiple_values_are_rejected() {
        let err = "inline, attachment".parse::<ContentDisposition>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter(','));
    }

    #[test]
    fn disposition_type_compares_case_insensitively() {
        let cd: ContentDisposition = "Attachment".parse().unwrap();
        assert!(cd.is_attachment());
    }

    #[test]
    fn round_trip() {
        for text in [
            "inline",
            "attachment; filename=genome.jpeg",
            "attachment; filename=\"two words.txt\"",
            "form-data; name=field; filename*=UTF-8''n%C3%A6ste.txt",
        ] {
            let cd: ContentDisposition = text.parse().unwrap();
            assert_eq!(cd.to_string(), text);
            assert_eq!(cd.to_string().parse::<ContentDisposition>().unwrap(), cd);
        }
    }

    #[test]
    fn builders_round_trip() {
        let cd = ContentDisposition::attachment()
            .with_extended_filename(&ExtendedValue::utf8("næste.txt"));
        assert_eq!(
            cd.to_string(),
            "attachment; filename*=UTF-8''n%C3%A6ste.txt"
        );
        assert_eq!(cd.to_string().parse::<ContentDisposition>().unwrap(), cd);
    }
}
