use std::fmt;
use std::hash::{Hash, Hasher};

use crate::parser::{Cursor, ParseError, chars};

/// A parameter name attached to a header value, e.g. the `charset` in
/// `text/html; charset=utf-8`.
///
/// Names are RFC 2045 tokens and compare case-insensitively; the original
/// spelling is kept for text reproduction.
#[derive(Debug, Clone, Eq)]
pub struct ParameterName {
    name: String,
}

impl ParameterName {
    /// Validate `name` as a token.
    pub fn new(name: impl Into<String>) -> Result<Self, ParseError> {
        let name = name.into();
        let mut cursor = Cursor::new(&name);
        let token = cursor.token(&chars::RFC2045_TOKEN);
        if token.len() != name.len() || name.is_empty() {
            return Err(ParseError::missing(
                "parameter name",
                cursor.position(),
                &name,
            ));
        }
        Ok(Self { name })
    }

    pub(crate) fn new_unchecked(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// Whether this is an RFC 5987 extended-parameter name (`name*`).
    #[must_use]
    pub fn is_extended(&self) -> bool {
        self.name.ends_with('*')
    }
}

impl PartialEq for ParameterName {
    fn eq(&self, other: &Self) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl PartialEq<str> for ParameterName {
    fn eq(&self, other: &str) -> bool {
        self.name.eq_ignore_ascii_case(other)
    }
}

impl Hash for ParameterName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.name.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Parameter {
    name: ParameterName,
    value: String,
    /// Byte offset of the value within the text it was parsed from.
    /// Zero for programmatically built parameters. Excluded from
    /// equality, it only serves error-position translation.
    position: usize,
}

impl Parameter {
    pub(crate) fn name(&self) -> &ParameterName {
        &self.name
    }

    pub(crate) fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn position(&self) -> usize {
        self.position
    }
}

/// An ordered parameter list with case-insensitive name lookup.
///
/// Iteration order is insertion order, which is also the canonical text
/// order. Inserting an existing name replaces its value in place.
#[derive(Debug, Clone, Default)]
pub struct Parameters {
    entries: Vec<Parameter>,
}

impl Parameters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Case-insensitive lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entry(name).map(Parameter::value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParameterName, &str)> {
        self.entries
            .iter()
            .map(|entry| (&entry.name, entry.value.as_str()))
    }

    /// Functional update: returns a copy with `name` set to `value`.
    #[must_use]
    pub fn with(mut self, name: ParameterName, value: impl Into<String>) -> Self {
        self.insert(name, value.into(), 0);
        self
    }

    pub fn set(&mut self, name: ParameterName, value: impl Into<String>) {
        self.insert(name, value.into(), 0);
    }

    pub(crate) fn insert(&mut self, name: ParameterName, value: String, position: usize) {
        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.name == name) {
            existing.value = value;
            existing.position = position;
        } else {
            self.entries.push(Parameter {
                name,
                value,
                position,
            });
        }
    }

    pub(crate) fn entry(&self, name: &str) -> Option<&Parameter> {
        self.entries.iter().find(|entry| entry.name == *name)
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.iter()
    }
}

impl PartialEq for Parameters {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.name == b.name && a.value == b.value)
    }
}

impl Eq for Parameters {}

/// Canonical text form: `; name=value` per parameter, values quoted when
/// they are not valid tokens.
impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            write!(f, "; {}=", entry.name)?;
            write_parameter_value(f, &entry.value)?;
        }
        Ok(())
    }
}

pub(crate) fn is_token(text: &str) -> bool {
    !text.is_empty() && text.chars().all(|c| chars::RFC2045_TOKEN.matches(c))
}

pub(crate) fn write_parameter_value(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    if is_token(value) {
        f.write_str(value)
    } else {
        f.write_str("\"")?;
        for c in value.chars() {
            if c == '"' || c == '\\' {
                f.write_str("\\")?;
            }
            write!(f, "{c}")?;
        }
        f.write_str("\"")
    }
}
