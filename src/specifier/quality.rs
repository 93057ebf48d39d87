use std::cmp::Reverse;
use std::fmt;

use crate::parser::ParseError;

/// An RFC 7231 quality value (`q=...`), stored in thousandths.
///
/// The wire grammar allows at most three decimals in `[0, 1]`, so
/// thousandths represent every expressible weight exactly; `500` is
/// `q=0.5`. Absent means [`Quality::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u16);

impl Quality {
    /// `q=0`: explicitly not acceptable.
    pub const MIN: Self = Self(0);
    /// `q=1`, the default weight.
    pub const MAX: Self = Self(1000);

    /// Build from thousandths, `None` above 1000.
    #[must_use]
    pub fn from_thousandths(thousandths: u16) -> Option<Self> {
        (thousandths <= 1000).then_some(Self(thousandths))
    }

    #[must_use]
    pub fn as_thousandths(self) -> u16 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Parse the `qvalue` grammar:
    ///
    /// ```text
    /// qvalue = ( "0" [ "." 0*3DIGIT ] )
    ///        / ( "1" [ "." 0*3("0") ] )
    /// ```
    ///
    /// Errors are positioned relative to `text`; callers re-wrap them
    /// with [`ParseError::at_offset`].
    pub(crate) fn parse(text: &str) -> Result<Self, ParseError> {
        let mut bytes = text.bytes().enumerate();
        let whole = match bytes.next() {
            Some((_, b'0')) => 0u16,
            Some((_, b'1')) => 1,
            Some((i, b)) => return Err(ParseError::invalid_character(char::from(b), i, text)),
            None => return Err(ParseError::missing("quality value", 0, text)),
        };
        match bytes.next() {
            None => return Ok(Self(whole * 1000)),
            Some((_, b'.')) => {}
            Some((i, b)) => return Err(ParseError::invalid_character(char::from(b), i, text)),
        }
        let mut thousandths = whole * 1000;
        let mut scale = 100u16;
        for (i, b) in bytes {
            if !b.is_ascii_digit() || scale == 0 {
                return Err(ParseError::invalid_character(char::from(b), i, text));
            }
            thousandths += u16::from(b - b'0') * scale;
            scale /= 10;
            if thousandths > 1000 {
                return Err(ParseError::range_violation(
                    "quality value greater than 1",
                    i,
                    text,
                ));
            }
        }
        Ok(Self(thousandths))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

/// Clamping conversion from thousandths.
impl From<u16> for Quality {
    fn from(thousandths: u16) -> Self {
        Self(thousandths.min(1000))
    }
}

/// Canonical shortest text: `1`, `0`, `0.5`, `0.125`.
impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 % 1000 == 0 {
            return write!(f, "{}", self.0 / 1000);
        }
        let mut fraction = self.0 % 1000;
        let mut digits: usize = 3;
        while fraction % 10 == 0 {
            fraction /= 10;
            digits -= 1;
        }
        write!(f, "{}.{fraction:0digits$}", self.0 / 1000)
    }
}

/// A header value together with its quality weight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityValue<T> {
    pub value: T,
    pub quality: Quality,
}

impl<T> QualityValue<T> {
    pub fn new(value: T, quality: Quality) -> Self {
        Self { value, quality }
    }

    /// Wrap with the default weight of 1.
    pub fn new_value(value: T) -> Self {
        Self::new(value, Quality::default())
    }
}

impl<T> From<T> for QualityValue<T> {
    fn from(value: T) -> Self {
        Self::new_value(value)
    }
}

/// Canonical text: the value, then `; q=...` unless the weight is 1.
impl<T: fmt::Display> fmt::Display for QualityValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)?;
        if self.quality != Quality::MAX {
            write!(f, "; q={}", self.quality)?;
        }
        Ok(())
    }
}

/// Stable sort, highest quality first; equal weights keep input order.
pub fn sort_by_quality_descending<T>(items: &mut [T], quality: impl Fn(&T) -> Quality) {
    items.sort_by_key(|item| Reverse(quality(item)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ErrorKind;

    #[test]
    fn parse_accepts_qvalue_grammar() {
        assert_eq!(Quality::parse("1").unwrap(), Quality::MAX);
        assert_eq!(Quality::parse("1.000").unwrap(), Quality::MAX);
        assert_eq!(Quality::parse("0").unwrap(), Quality::MIN);
        assert_eq!(Quality::parse("0.5").unwrap(), Quality(500));
        assert_eq!(Quality::parse("0.125").unwrap(), Quality(125));
        assert_eq!(Quality::parse("0.").unwrap(), Quality(0));
    }

    #[test]
    fn parse_rejects_out_of_grammar_text() {
        assert!(matches!(
            *Quality::parse("2").unwrap_err().kind(),
            ErrorKind::InvalidCharacter('2')
        ));
        assert!(matches!(
            *Quality::parse("0.1234").unwrap_err().kind(),
            ErrorKind::InvalidCharacter('4')
        ));
        assert!(matches!(
            *Quality::parse("1.5").unwrap_err().kind(),
            ErrorKind::RangeViolation(_)
        ));
        assert!(matches!(
            *Quality::parse("").unwrap_err().kind(),
            ErrorKind::MissingToken(_)
        ));
        assert!(matches!(
            *Quality::parse("0.5x").unwrap_err().kind(),
            ErrorKind::InvalidCharacter('x')
        ));
    }

    #[test]
    fn display_is_shortest_form() {
        assert_eq!(Quality::MAX.to_string(), "1");
        assert_eq!(Quality::MIN.to_string(), "0");
        assert_eq!(Quality(500).to_string(), "0.5");
        assert_eq!(Quality(50).to_string(), "0.05");
        assert_eq!(Quality(125).to_string(), "0.125");
    }

    #[test]
    fn sort_is_stable_descending() {
        let mut items = vec![("a", Quality(200)), ("b", Quality(900)), ("c", Quality::MAX), ("d", Quality(900))];
        sort_by_quality_descending(&mut items, |item| item.1);
        let order: Vec<_> = items.iter().map(|item| item.0).collect();
        assert_eq!(order, ["c", "b", "d", "a"]);
    }
}
