use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use http::{HeaderName, HeaderValue};

use crate::parser::{Cursor, ParseError, chars};
use crate::specifier::write_parameter_value;
use crate::{Error, HeaderDecode, HeaderEncode, TypedHeader};

/// `Cache-Control` header, defined in
/// [RFC7234](https://tools.ietf.org/html/rfc7234#section-5.2) with
/// extensions in [RFC8246](https://www.rfc-editor.org/rfc/rfc8246).
///
/// # ABNF
///
/// ```text
/// Cache-Control   = 1#cache-directive
/// cache-directive = token [ "=" ( token / quoted-string ) ]
/// ```
///
/// Known directive names carry a parameter policy: `max-age` requires a
/// seconds value, `max-stale` may carry one, `no-cache` and `private` may
/// carry a quoted field-name list, and the boolean directives forbid any
/// parameter. Unknown names are accepted as vendor extensions with an
/// optional token-or-quoted parameter.
///
/// # Example values
///
/// * `no-cache`
/// * `private, community="UCI"`
/// * `max-age=30`
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CacheControl {
    directives: Vec<CacheControlDirective>,
}

/// One named, optionally parameterized directive.
#[derive(Debug, Clone)]
pub struct CacheControlDirective {
    name: String,
    argument: Option<DirectiveArgument>,
}

/// The parameter attached to a directive.
///
/// Extension arguments keep their wire form: a bare token stays bare and
/// a quoted string stays quoted, so the canonical text reproduces the
/// parsed input exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectiveArgument {
    /// A delta-seconds value, e.g. `max-age=30`.
    Seconds(u64),
    /// A quoted field-name list, e.g. `no-cache="set-cookie"`.
    /// Always serialized quoted.
    FieldNames(String),
    /// A bare token extension argument, e.g. `community=UCI`.
    Token(String),
    /// A quoted extension argument, e.g. `community="UCI"`.
    Quoted(String),
}

/// What a directive's `=` part may look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParameterPolicy {
    Forbidden,
    RequiredSeconds,
    OptionalSeconds,
    OptionalFieldList,
    Extension,
}

fn parameter_policy(name: &str) -> ParameterPolicy {
    if name.eq_ignore_ascii_case("max-age")
        || name.eq_ignore_ascii_case("s-maxage")
        || name.eq_ignore_ascii_case("min-fresh")
    {
        ParameterPolicy::RequiredSeconds
    } else if name.eq_ignore_ascii_case("max-stale") {
        ParameterPolicy::OptionalSeconds
    } else if name.eq_ignore_ascii_case("no-cache") || name.eq_ignore_ascii_case("private") {
        ParameterPolicy::OptionalFieldList
    } else if [
        "no-store",
        "no-transform",
        "only-if-cached",
        "public",
        "must-revalidate",
        "proxy-revalidate",
        "immutable",
        "must-understand",
    ]
    .iter()
    .any(|known| name.eq_ignore_ascii_case(known))
    {
        ParameterPolicy::Forbidden
    } else {
        ParameterPolicy::Extension
    }
}

impl CacheControlDirective {
    /// A bare directive with no argument. The name must be a token and
    /// must not require one (`max-age` alone is invalid header text).
    pub fn new(name: impl Into<String>) -> Result<Self, ParseError> {
        let name = name.into();
        Self::build(name, None)
    }

    /// A delta-seconds directive, e.g. `max-age=30`.
    pub fn with_seconds(name: impl Into<String>, seconds: u64) -> Result<Self, ParseError> {
        Self::build(name.into(), Some(DirectiveArgument::Seconds(seconds)))
    }

    /// A quoted field-name list directive, e.g. `no-cache="set-cookie"`.
    pub fn with_field_names(
        name: impl Into<String>,
        field_names: impl Into<String>,
    ) -> Result<Self, ParseError> {
        Self::build(
            name.into(),
            Some(DirectiveArgument::FieldNames(field_names.into())),
        )
    }

    fn build(name: String, argument: Option<DirectiveArgument>) -> Result<Self, ParseError> {
        let directive = Self { name, argument };
        // reuse the parser as the single source of validation truth
        directive.to_string().parse()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn argument(&self) -> Option<&DirectiveArgument> {
        self.argument.as_ref()
    }

    #[must_use]
    pub fn seconds(&self) -> Option<u64> {
        match self.argument {
            Some(DirectiveArgument::Seconds(seconds)) => Some(seconds),
            _ => None,
        }
    }

    /// Scan one directive, stopping before a top-level `,` or at end of
    /// text.
    fn parse_at(cursor: &mut Cursor<'_>) -> Result<Self, ParseError> {
        cursor.skip_whitespace();
        let name = cursor
            .required_token(&chars::RFC2045_TOKEN, "directive")?
            .to_owned();
        let policy = parameter_policy(&name);
        cursor.skip_whitespace();

        if cursor.peek() != Some('=') {
            if policy == ParameterPolicy::RequiredSeconds {
                return Err(cursor.missing("directive parameter"));
            }
            return Ok(Self {
                name,
                argument: None,
            });
        }

        let equals_position = cursor.position();
        cursor.advance();
        cursor.skip_whitespace();

        let argument = match policy {
            ParameterPolicy::Forbidden => {
                return Err(ParseError::unexpected_parameter(
                    &name,
                    equals_position,
                    cursor.text(),
                ));
            }
            ParameterPolicy::RequiredSeconds | ParameterPolicy::OptionalSeconds => {
                DirectiveArgument::Seconds(parse_seconds(cursor)?)
            }
            ParameterPolicy::OptionalFieldList => {
                if cursor.peek() != Some('"') {
                    // only a quoted field-name list is permitted here
                    return Err(ParseError::unexpected_parameter(
                        &name,
                        cursor.position(),
                        cursor.text(),
                    ));
                }
                DirectiveArgument::FieldNames(cursor.quoted_text(&chars::QUOTED_TEXT, true)?)
            }
            ParameterPolicy::Extension => {
                if cursor.peek() == Some('"') {
                    DirectiveArgument::Quoted(cursor.quoted_text(&chars::QUOTED_TEXT, true)?)
                } else {
                    let text = cursor.required_token(&chars::RFC2045_TOKEN, "directive parameter")?;
                    if text.bytes().all(|b| b.is_ascii_digit()) {
                        DirectiveArgument::Seconds(parse_number(text, cursor)?)
                    } else {
                        DirectiveArgument::Token(text.to_owned())
                    }
                }
            }
        };

        Ok(Self {
            name,
            argument: Some(argument),
        })
    }
}

fn parse_seconds(cursor: &mut Cursor<'_>) -> Result<u64, ParseError> {
    let digits = cursor.required_token(&chars::DIGIT, "directive parameter")?;
    parse_number(digits, cursor)
}

fn parse_number(digits: &str, cursor: &Cursor<'_>) -> Result<u64, ParseError> {
    digits.parse().map_err(|_| {
        ParseError::range_violation(
            "seconds value too large",
            cursor.position() - digits.len(),
            cursor.text(),
        )
    })
}

impl PartialEq for CacheControlDirective {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name) && self.argument == other.argument
    }
}

impl Eq for CacheControlDirective {}

impl FromStr for CacheControlDirective {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::new(text);
        let directive = Self::parse_at(&mut cursor)?;
        cursor.skip_whitespace();
        match cursor.peek() {
            None => Ok(directive),
            Some(c) => Err(cursor.invalid_character(c)),
        }
    }
}

impl fmt::Display for CacheControlDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        match &self.argument {
            None => Ok(()),
            Some(DirectiveArgument::Seconds(seconds)) => write!(f, "={seconds}"),
            Some(DirectiveArgument::FieldNames(text)) | Some(DirectiveArgument::Quoted(text)) => {
                f.write_str("=\"")?;
                for c in text.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{c}")?;
                }
                f.write_str("\"")
            }
            Some(DirectiveArgument::Token(text)) => {
                f.write_str("=")?;
                write_parameter_value(f, text)
            }
        }
    }
}

impl CacheControl {
    /// An empty directive list; invalid as header text until at least
    /// one directive is added.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a comma-separated directive list.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut cursor = Cursor::new(text);
        let mut directives = Vec::new();
        loop {
            directives.push(CacheControlDirective::parse_at(&mut cursor)?);
            cursor.skip_whitespace();
            match cursor.peek() {
                None => break,
                Some(',') => cursor.advance(),
                Some(c) => return Err(cursor.invalid_character(c)),
            }
        }
        Ok(Self { directives })
    }

    /// Functional update: returns a copy with `directive` appended.
    #[must_use]
    pub fn with(mut self, directive: CacheControlDirective) -> Self {
        self.directives.push(directive);
        self
    }

    #[must_use]
    pub fn directives(&self) -> &[CacheControlDirective] {
        &self.directives
    }

    /// Case-insensitive directive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&CacheControlDirective> {
        self.directives
            .iter()
            .find(|directive| directive.name.eq_ignore_ascii_case(name))
    }

    /// Check if the `no-cache` directive is set.
    #[must_use]
    pub fn no_cache(&self) -> bool {
        self.get("no-cache").is_some()
    }

    /// Check if the `no-store` directive is set.
    #[must_use]
    pub fn no_store(&self) -> bool {
        self.get("no-store").is_some()
    }

    /// Check if the `public` directive is set.
    #[must_use]
    pub fn public(&self) -> bool {
        self.get("public").is_some()
    }

    /// Check if the `private` directive is set.
    #[must_use]
    pub fn private(&self) -> bool {
        self.get("private").is_some()
    }

    /// Check if the `immutable` directive is set.
    #[must_use]
    pub fn immutable(&self) -> bool {
        self.get("immutable").is_some()
    }

    /// Check if the `must-revalidate` directive is set.
    #[must_use]
    pub fn must_revalidate(&self) -> bool {
        self.get("must-revalidate").is_some()
    }

    /// Get the value of the `max-age` directive if set.
    #[must_use]
    pub fn max_age(&self) -> Option<Duration> {
        self.get("max-age")
            .and_then(CacheControlDirective::seconds)
            .map(Duration::from_secs)
    }

    /// Get the value of the `s-maxage` directive if set.
    #[must_use]
    pub fn s_max_age(&self) -> Option<Duration> {
        self.get("s-maxage")
            .and_then(CacheControlDirective::seconds)
            .map(Duration::from_secs)
    }

    /// Get the value of the `min-fresh` directive if set.
    #[must_use]
    pub fn min_fresh(&self) -> Option<Duration> {
        self.get("min-fresh")
            .and_then(CacheControlDirective::seconds)
            .map(Duration::from_secs)
    }

    /// Get the value of the `max-stale` directive if set with a value.
    #[must_use]
    pub fn max_stale(&self) -> Option<Duration> {
        self.get("max-stale")
            .and_then(CacheControlDirective::seconds)
            .map(Duration::from_secs)
    }
}

impl FromStr for CacheControl {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for CacheControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut directives = self.directives.iter();
        if let Some(directive) = directives.next() {
            write!(f, "{directive}")?;
        }
        for directive in directives {
            write!(f, ", {directive}")?;
        }
        Ok(())
    }
}

impl TypedHeader for CacheControl {
    fn name() -> &'static HeaderName {
        &http::header::CACHE_CONTROL
    }
}

impl HeaderDecode for CacheControl {
    fn decode<'i, I: Iterator<Item = &'i HeaderValue>>(values: &mut I) -> Result<Self, Error> {
        let mut directives = Vec::new();
        for value in values {
            let text = value.to_str().map_err(|_| Error::invalid())?;
            directives.extend(Self::parse(text).map_err(Error::from)?.directives);
        }
        if directives.is_empty() {
            return Err(Error::invalid());
        }
        Ok(Self { directives })
    }
}

impl HeaderEncode for CacheControl {
    fn encode<E: Extend<HeaderValue>>(&self, values: &mut E) {
        crate::typed_header::encode_display(self, values);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;

    #[test]
    fn numeric_directive() {
        let cc = CacheControl::parse("max-age=100").unwrap();
        assert_eq!(cc.max_age(), Some(Duration::from_secs(100)));
        assert_eq!(cc.get("MAX-AGE").unwrap().seconds(), Some(100));
    }

    #[test]
    fn missing_required_parameter() {
        let err = CacheControl::parse("max-age").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("directive parameter"));
        assert_eq!(err.position(), 7);
    }

    #[test]
    fn parameter_not_permitted() {
        let err = CacheControl::parse("no-cache=1").unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::UnexpectedParameter(_)));

        let err = CacheControl::parse("public=1").unwrap_err();
        assert_eq!(
            *err.kind(),
            ErrorKind::UnexpectedParameter("public".to_owned())
        );
        assert_eq!(err.position(), 6);
    }

    #[test]
    fn quoted_field_list_on_no_cache() {
        let cc = CacheControl::parse(r#"no-cache="set-cookie, authorization""#).unwrap();
        assert!(cc.no_cache());
        assert_eq!(
            *cc.get("no-cache").unwrap().argument().unwrap(),
            DirectiveArgument::FieldNames("set-cookie, authorization".to_owned())
        );
    }

    #[test]
    fn directive_list_with_extensions() {
        let cc = CacheControl::parse("private, community=\"UCI\", retries=3").unwrap();
        assert!(cc.private());
        assert_eq!(
            *cc.get("community").unwrap().argument().unwrap(),
            DirectiveArgument::Quoted("UCI".to_owned())
        );
        assert_eq!(cc.get("retries").unwrap().seconds(), Some(3));
    }

    #[test]
    fn extension_argument_keeps_its_wire_form() {
        let cc = CacheControl::parse("community=\"UCI\"").unwrap();
        assert_eq!(
            *cc.get("community").unwrap().argument().unwrap(),
            DirectiveArgument::Quoted("UCI".to_owned())
        );
        assert_eq!(cc.to_string(), "community=\"UCI\"");

        let cc = CacheControl::parse("community=UCI").unwrap();
        assert_eq!(
            *cc.get("community").unwrap().argument().unwrap(),
            DirectiveArgument::Token("UCI".to_owned())
        );
        assert_eq!(cc.to_string(), "community=UCI");
    }

    #[test]
    fn max_stale_parameter_is_optional() {
        assert!(CacheControl::parse("max-stale").is_ok());
        let cc = CacheControl::parse("max-stale=60").unwrap();
        assert_eq!(cc.max_stale(), Some(Duration::from_secs(60)));
    }

    #[test]
    fn non_numeric_seconds_are_rejected() {
        let err = CacheControl::parse("max-age=abc").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("directive parameter"));
    }

    #[test]
    fn overflowing_seconds_are_rejected() {
        let err = CacheControl::parse("max-age=99999999999999999999").unwrap_err();
        assert!(matches!(*err.kind(), ErrorKind::RangeViolation(_)));
        assert_eq!(err.position(), 8);
    }

    #[test]
    fn round_trip() {
        for text in [
            "no-cache",
            "max-age=30",
            "private, community=\"UCI\"",
            "no-cache=\"set-cookie\", max-age=0",
            "max-stale",
        ] {
            let cc = CacheControl::parse(text).unwrap();
            assert_eq!(cc.to_string(), text);
            assert_eq!(CacheControl::parse(&cc.to_string()).unwrap(), cc);
        }
    }

    #[test]
    fn builders_validate_through_the_grammar() {
        assert!(CacheControlDirective::new("no-cache").is_ok());
        assert!(CacheControlDirective::new("max-age").is_err());
        assert!(CacheControlDirective::with_seconds("max-age", 30).is_ok());
        assert!(CacheControlDirective::with_field_names("no-cache", "set-cookie").is_ok());
        assert!(CacheControlDirective::with_seconds("public", 1).is_err());
    }

    #[test]
    fn empty_value_is_rejected() {
        let err = CacheControl::parse("").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("directive"));
        let err = CacheControl::parse("no-cache,").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("directive"));
    }
}
