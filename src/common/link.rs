use std::fmt;
use std::str::FromStr;

use http::{HeaderName, HeaderValue};

use crate::parser::chars::{self, CharClass};
use crate::parser::{Cursor, ParseError};
use crate::specifier::{ExtendedValue, ParameterName, Parameters};
use crate::typed_header::encode_display;
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

use super::media_type::MediaType;

/// Characters legal inside the `<...>` target: a URI-reference carries no
/// whitespace, control characters or angle brackets.
const URI_REFERENCE: CharClass = CharClass::new("uri reference", |c| {
    c.is_ascii() && c > ' ' && c != '<' && c != '>' && c != '"'
});

/// One link-value of a `Link` header: an angle-bracketed target URI plus
/// its parameters.
///
/// The relation list (`rel`) is a space-separated list of relation types,
/// written as a bare token when it is a single token and quoted otherwise.
/// `title*` carries an RFC 5987 [`ExtendedValue`] for internationalized
/// titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkValue {
    target: String,
    params: Parameters,
}

impl LinkValue {
    /// Build a link to `target`, validating it as a URI-reference.
    pub fn new(target: impl Into<String>) -> Result<Self, ParseError> {
        let target = target.into();
        let mut cursor = Cursor::new(&target);
        let uri = cursor.token(&URI_REFERENCE);
        if uri.len() != target.len() || target.is_empty() {
            return Err(cursor.missing("link target"));
        }
        Ok(Self {
            target,
            params: Parameters::new(),
        })
    }

    /// Functional update: returns a copy with the relation list set.
    #[must_use]
    pub fn with_rel(mut self, rel: impl Into<String>) -> Self {
        self.params.set(ParameterName::new_unchecked("rel"), rel.into());
        self
    }

    /// Functional update: returns a copy with a `title` parameter.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.params
            .set(ParameterName::new_unchecked("title"), title.into());
        self
    }

    /// Functional update: returns a copy with a `title*` parameter.
    #[must_use]
    pub fn with_extended_title(mut self, title: &ExtendedValue) -> Self {
        self.params
            .set(ParameterName::new_unchecked("title*"), title.to_string());
        self
    }

    /// Functional update: returns a copy with a `type` parameter.
    #[must_use]
    pub fn with_media_type(mut self, media_type: &MediaType) -> Self {
        self.params
            .set(ParameterName::new_unchecked("type"), media_type.to_string());
        self
    }

    /// Functional update: returns a copy with an `anchor` parameter.
    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.params
            .set(ParameterName::new_unchecked("anchor"), anchor.into());
        self
    }

    /// The target URI-reference, without the angle brackets.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    #[must_use]
    pub fn parameters(&self) -> &Parameters {
        &self.params
    }

    /// The relation types of the `rel` parameter, split on spaces.
    #[must_use]
    pub fn rel(&self) -> Vec<&str> {
        self.params
            .get("rel")
            .map(|rel| rel.split(' ').filter(|part| !part.is_empty()).collect())
            .unwrap_or_default()
    }

    /// Whether `relation` appears in the relation list (case-insensitive,
    /// per RFC 8288 registered relation types).
    #[must_use]
    pub fn has_rel(&self, relation: &str) -> bool {
        self.rel()
            .iter()
            .any(|rel| rel.eq_ignore_ascii_case(relation))
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.params.get("title")
    }

    /// The `title*` parameter, decoded.
    #[must_use]
    pub fn extended_title(&self) -> Option<ExtendedValue> {
        self.params
            .get("title*")
            .and_then(|title| title.parse().ok())
    }

    /// The `type` parameter as a media type.
    #[must_use]
    pub fn media_type(&self) -> Option<MediaType> {
        self.params.get("type").and_then(|ty| ty.parse().ok())
    }

    #[must_use]
    pub fn anchor(&self) -> Option<&str> {
        self.params.get("anchor")
    }

    /// Scan one link-value, stopping before a top-level `,` or at end of
    /// text.
    fn parse_at(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.skip_whitespace();
        cursor.expect('<')?;
        let target = cursor.token(&URI_REFERENCE).to_owned();
        cursor.expect('>')?;

        let mut params = Parameters::new();
        loop {
            cursor.skip_whitespace();
            if cursor.peek() != Some(';') {
                break;
            }
            cursor.advance();
            cursor.skip_whitespace();
            let name = cursor.required_token(&chars::RFC2045_TOKEN, "parameter name")?;
            let name = ParameterName::new_unchecked(name);
            cursor.skip_whitespace();
            cursor.expect('=')?;
            cursor.skip_whitespace();
            let position = cursor.position();
            let value = if cursor.peek() == Some('"') {
                cursor.quoted_text(&chars::QUOTED_TEXT, true)?
            } else {
                cursor
                    .required_token(&chars::RFC2045_TOKEN, "parameter value")?
                    .to_owned()
            };
            if name.is_extended() {
                value
                    .parse::<ExtendedValue>()
                    .map_err(|err| err.at_offset(position, cursor.text()))?;
            }
            params.insert(name, value, position);
        }

        Ok(Self { target, params })
    }
}

impl FromStr for LinkValue {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);
        let link = Self::parse_at(&mut cursor)?;
        match cursor.peek() {
            None => Ok(link),
            Some(c) => Err(cursor.invalid_character(c)),
        }
    }
}

impl fmt::Display for LinkValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>{}", self.target, self.params)
    }
}

/// `Link` header, defined in
/// [RFC8288](https://datatracker.ietf.org/doc/html/rfc8288) (previously
/// RFC 5988).
///
/// # ABNF
///
/// ```text
/// Link       = #link-value
/// link-value = "<" URI-Reference ">" *( OWS ";" OWS link-param )
/// link-param = token BWS "=" BWS ( token / quoted-string )
/// ```
///
/// # Example values
///
/// * `<http://example.com/TheBook/chapter2>; rel=previous`
/// * `</TheBook/chapter2>; rel=previous, </TheBook/chapter4>; rel=next`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Link {
    links: Vec<LinkValue>,
}

impl Link {
    #[must_use]
    pub fn new(links: Vec<LinkValue>) -> Self {
        Self { links }
    }

    #[must_use]
    pub fn links(&self) -> &[LinkValue] {
        &self.links
    }

    /// The first link carrying `relation` in its relation list.
    #[must_use]
    pub fn by_rel(&self, relation: &str) -> Option<&LinkValue> {
        self.links.iter().find(|link| link.has_rel(relation))
    }
}

impl FromStr for Link {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);
        let mut links = Vec::new();
        loop {
            links.push(LinkValue::parse_at(&mut cursor)?);
            match cursor.peek() {
                None => break,
                Some(',') => cursor.advance(),
                Some(c) => return Err(cursor.invalid_character(c)),
            }
        }
        Ok(Self { links })
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut links = self.links.iter();
        if let Some(link) = links.next() {
            write!(f, "{link}")?;
        }
        for link in links {
            write!(f, ", {link}")?;
        }
        Ok(())
    }
}

impl TypedHeader for Link {
    fn name() -> &'static HeaderName {
        &http::header::LINK
    }
}

impl HeaderDecode for Link {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        let mut links = Vec::new();
        for value in values {
            let text = value.to_str().map_err(|_| Error::invalid())?;
            links.extend(text.parse::<Self>().map_err(Error::from)?.links);
        }
        if links.is_empty() {
            return Err(Error::invalid());
        }
        Ok(Self { links })
    }
}

impl HeaderEncode for Link {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        encode_display(self, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;

    #[test]
    fn rfc8288_single_link() {
        let link: Link = r#"<http://example.com/TheBook/chapter2>; rel=previous; title="previous chapter""#
            .parse()
            .unwrap();
        assert_eq!(link.links().len(), 1);
        let value = &link.links()[0];
        assert_eq!(value.target(), "http://example.com/TheBook/chapter2");
        assert_eq!(value.rel(), ["previous"]);
        assert_eq!(value.title(), Some("previous chapter"));
    }

    #[test]
    fn multiple_links() {
        let link: Link = "</TheBook/chapter2>; rel=previous, </TheBook/chapter4>; rel=next"
            .parse()
            .unwrap();
        assert_eq!(link.links().len(), 2);
        assert_eq!(link.by_rel("next").unwrap().target(), "/TheBook/chapter4");
        assert_eq!(
            link.by_rel("PREVIOUS").unwrap().target(),
            "/TheBook/chapter2"
        );
        assert!(link.by_rel("last").is_none());
    }

    #[test]
    fn quoted_relation_list_is_split_on_spaces() {
        let link: Link = r#"<http://example.org/>; rel="start http://example.net/relation/other""#
            .parse()
            .unwrap();
        let value = &link.links()[0];
        assert_eq!(
            value.rel(),
            ["start", "http://example.net/relation/other"]
        );
        assert!(value.has_rel("start"));
    }

    #[test]
    fn extended_title_is_validated_and_decoded() {
        let link: Link =
            "</TheBook/chapter2>; rel=previous; title*=UTF-8'de'letztes%20Kapitel"
                .parse()
                .unwrap();
        let title = link.links()[0].extended_title().unwrap();
        assert_eq!(title.language(), Some("de"));
        assert_eq!(title.decode_text().unwrap(), "letztes Kapitel");
    }

    #[test]
    fn broken_extended_title_is_positioned_absolutely() {
        let text = "</x>; title*=UTF-8''%zz";
        let err = text.parse::<Link>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('z'));
        assert_eq!(err.position(), 21);
    }

    #[test]
    fn media_type_parameter() {
        let link: Link = "</style.css>; rel=stylesheet; type=\"text/css\""
            .parse()
            .unwrap();
        let ty = link.links()[0].media_type().unwrap();
        assert_eq!(ty.type_(), "text");
        assert_eq!(ty.subtype(), "css");
    }

    #[test]
    fn target_must_be_angle_bracketed() {
        let err = "http://example.com/".parse::<Link>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('h'));
        assert_eq!(err.position(), 0);

        let err = "*".parse::<Link>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('*'));
    }

    #[test]
    fn unterminated_target_is_rejected() {
        let err = "<http://example.com/".parse::<Link>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("text"));
        assert_eq!(err.position(), 20);
    }

    #[test]
    fn whitespace_inside_target_is_rejected() {
        let err = "<two words>".parse::<Link>().unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter(' '));
        assert_eq!(err.position(), 4);
    }

    #[test]
    fn round_trip() {
        for text in [
            "<http://example.com/TheBook/chapter2>; rel=previous",
            "</chapter2>; rel=previous, </chapter4>; rel=next",
            "</>; rel=\"start other\"; title=\"the start\"",
            "</x>; title*=UTF-8'de'letztes%20Kapitel",
        ] {
            let link: Link = text.parse().unwrap();
            assert_eq!(link.to_string(), text);
            assert_eq!(link.to_string().parse::<Link>().unwrap(), link);
        }
    }

    #[test]
    fn builders_produce_canonical_text() {
        let link = Link::new(vec![
            LinkValue::new("/chapter4")
                .unwrap()
                .with_rel("next")
                .with_title("next chapter"),
        ]);
        assert_eq!(link.to_string(), "</chapter4>; rel=next; title=\"next chapter\"");
        assert!(LinkValue::new("two words").is_err());
    }
}
