use crate::specifier::{ParameterName, Parameters};

use super::chars::{self, CharClass};
use super::comment::consume_comment;
use super::cursor::Cursor;
use super::error::ParseError;
use super::lexer::{self, TokenEvents};

/// How a parameter value may be written, selected per parameter name.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ValuePolicy {
    /// A bare token of the given class, or a quoted string with
    /// backslash escaping.
    TokenOrQuoted(CharClass),
    /// A bare token of the given class only.
    Token(CharClass),
    /// Decimal digits only.
    Digits,
}

/// Syntax switches for one grammar built on the common
/// `value *(";" name "=" value) *("," ...)` shape.
pub(crate) trait ParameterizedGrammar {
    fn allows_multiple_values(&self) -> bool {
        false
    }

    fn allows_wildcard(&self) -> bool {
        false
    }

    fn allows_comments(&self) -> bool {
        false
    }

    /// Character class of the primary value token.
    fn value_class(&self) -> CharClass {
        chars::RFC2045_TOKEN
    }

    fn parameter_value_policy(&self, name: &ParameterName) -> ValuePolicy;
}

/// One value group as scanned, before grammar-specific conversion.
#[derive(Debug)]
pub(crate) struct RawValue {
    pub(crate) text: String,
    pub(crate) wildcard: bool,
    /// Byte offset of the value's first character in the input.
    pub(crate) position: usize,
    pub(crate) params: Parameters,
}

/// What the scan expects next. One variant per juncture; whitespace is
/// legal only in the `*Whitespace` states (and the two expect-states
/// that follow a separator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Leading whitespace, a value is expected.
    Whitespace,
    /// A value token was just read.
    Value,
    ValueWhitespace,
    /// A `;` was read, a parameter name is expected.
    ParameterSeparatorWhitespace,
    /// A parameter name was just read.
    ParameterName,
    ParameterNameWhitespace,
    /// A `=` was read, a parameter value is expected.
    ParameterEquals,
    ParameterEqualsWhitespace,
    /// A parameter value was just read.
    ParameterValue,
    ParameterValueWhitespace,
    /// A `,` was read, the next value is expected.
    Separator,
}

impl State {
    fn expects_value(self) -> bool {
        matches!(self, Self::Whitespace | Self::Separator)
    }

    fn expects_parameter_value(self) -> bool {
        matches!(self, Self::ParameterEquals | Self::ParameterEqualsWhitespace)
    }

    /// A completed value (possibly with parameters) sits to the left.
    fn value_complete(self) -> bool {
        matches!(
            self,
            Self::Value
                | Self::ValueWhitespace
                | Self::ParameterValue
                | Self::ParameterValueWhitespace
        )
    }

    /// Comments ride at whitespace boundaries, never adjacent to a token.
    fn at_whitespace_boundary(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::ValueWhitespace
                | Self::ParameterSeparatorWhitespace
                | Self::ParameterNameWhitespace
                | Self::ParameterEqualsWhitespace
                | Self::ParameterValueWhitespace
                | Self::Separator
        )
    }
}

/// The accumulator for the value group under construction; owned by the
/// single parse call and drained into `out` at each completion.
#[derive(Debug, Default)]
struct Accumulator {
    text: String,
    wildcard: bool,
    position: usize,
    params: Parameters,
    pending_name: Option<ParameterName>,
}

struct Machine<'g, G> {
    grammar: &'g G,
    state: State,
    acc: Accumulator,
    out: Vec<RawValue>,
}

impl<G: ParameterizedGrammar> Machine<'_, G> {
    fn complete_value(&mut self) {
        let acc = std::mem::take(&mut self.acc);
        self.out.push(RawValue {
            text: acc.text,
            wildcard: acc.wildcard,
            position: acc.position,
            params: acc.params,
        });
    }

    fn reject(&self, cursor: &Cursor<'_>) -> ParseError {
        match cursor.peek() {
            Some(c) => cursor.invalid_character(c),
            None => cursor.missing("value"),
        }
    }
}

impl<G: ParameterizedGrammar> TokenEvents for Machine<'_, G> {
    fn whitespace(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        self.state = match self.state {
            State::Value => State::ValueWhitespace,
            State::ParameterName => State::ParameterNameWhitespace,
            State::ParameterEquals => State::ParameterEqualsWhitespace,
            State::ParameterValue => State::ParameterValueWhitespace,
            other => other,
        };
        // a bare CR that is not an obsolete fold must not be skipped
        let before = cursor.position();
        cursor.skip_whitespace();
        if cursor.position() == before {
            return Err(self.reject(cursor));
        }
        Ok(())
    }

    fn token(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if self.state.expects_value() {
            self.acc.position = cursor.position();
            let class = self.grammar.value_class();
            self.acc.text = cursor.required_token(&class, "value")?.to_owned();
            self.state = State::Value;
            return Ok(());
        }
        if self.state == State::ParameterSeparatorWhitespace {
            let name = cursor.required_token(&chars::RFC2045_TOKEN, "parameter name")?;
            self.acc.pending_name = Some(ParameterName::new_unchecked(name));
            self.state = State::ParameterName;
            return Ok(());
        }
        if self.state.expects_parameter_value() {
            let Some(name) = self.acc.pending_name.take() else {
                return Err(self.reject(cursor));
            };
            let position = cursor.position();
            let value = match self.grammar.parameter_value_policy(&name) {
                ValuePolicy::Digits => {
                    cursor.required_token(&chars::DIGIT, "parameter value")?
                }
                ValuePolicy::Token(class) | ValuePolicy::TokenOrQuoted(class) => {
                    cursor.required_token(&class, "parameter value")?
                }
            };
            self.acc.params.insert(name, value.to_owned(), position);
            self.state = State::ParameterValue;
            return Ok(());
        }
        Err(self.reject(cursor))
    }

    fn wildcard(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if !(self.grammar.allows_wildcard() && self.state.expects_value()) {
            return Err(self.reject(cursor));
        }
        self.acc.position = cursor.position();
        cursor.advance();
        self.acc.text.push('*');
        self.acc.wildcard = true;
        self.state = State::Value;
        Ok(())
    }

    fn quoted(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if !self.state.expects_parameter_value() {
            return Err(self.reject(cursor));
        }
        let Some(name) = self.acc.pending_name.take() else {
            return Err(self.reject(cursor));
        };
        let ValuePolicy::TokenOrQuoted(_) = self.grammar.parameter_value_policy(&name) else {
            return Err(self.reject(cursor));
        };
        let position = cursor.position();
        let value = cursor.quoted_text(&chars::QUOTED_TEXT, true)?;
        self.acc.params.insert(name, value, position);
        self.state = State::ParameterValue;
        Ok(())
    }

    fn token_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if !self.state.value_complete() {
            return Err(self.reject(cursor));
        }
        cursor.advance();
        self.state = State::ParameterSeparatorWhitespace;
        Ok(())
    }

    fn key_value_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if !matches!(
            self.state,
            State::ParameterName | State::ParameterNameWhitespace
        ) {
            return Err(self.reject(cursor));
        }
        cursor.advance();
        self.state = State::ParameterEquals;
        Ok(())
    }

    fn multi_value_separator(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if !(self.grammar.allows_multiple_values() && self.state.value_complete()) {
            return Err(self.reject(cursor));
        }
        self.complete_value();
        cursor.advance();
        self.state = State::Separator;
        Ok(())
    }

    fn comment(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if !(self.grammar.allows_comments() && self.state.at_whitespace_boundary()) {
            return Err(self.reject(cursor));
        }
        consume_comment(cursor)
    }

    fn end_of_text(&mut self, cursor: &mut Cursor<'_>) -> Result<(), ParseError> {
        if self.state.value_complete() {
            self.complete_value();
            return Ok(());
        }
        let what = match self.state {
            State::Whitespace | State::Separator => "value",
            State::ParameterSeparatorWhitespace => "parameter name",
            _ => "parameter value",
        };
        Err(cursor.missing(what))
    }
}

/// Scan `text` as one or more parameterized value groups.
pub(crate) fn parse_parameterized<G: ParameterizedGrammar>(
    grammar: &G,
    text: &str,
) -> Result<Vec<RawValue>, ParseError> {
    let mut machine = Machine {
        grammar,
        state: State::Whitespace,
        acc: Accumulator::default(),
        out: Vec::new(),
    };
    let mut cursor = Cursor::new(text);
    lexer::run(&mut machine, &mut cursor)?;
    Ok(machine.out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::error::ErrorKind;

    struct Codings;

    impl ParameterizedGrammar for Codings {
        fn allows_multiple_values(&self) -> bool {
            true
        }

        fn allows_wildcard(&self) -> bool {
            true
        }

        fn allows_comments(&self) -> bool {
            true
        }

        fn parameter_value_policy(&self, name: &ParameterName) -> ValuePolicy {
            if *name == *"size" {
                ValuePolicy::Digits
            } else {
                ValuePolicy::TokenOrQuoted(chars::RFC2045_TOKEN)
            }
        }
    }

    struct Single;

    impl ParameterizedGrammar for Single {
        fn parameter_value_policy(&self, _name: &ParameterName) -> ValuePolicy {
            ValuePolicy::TokenOrQuoted(chars::RFC2045_TOKEN)
        }
    }

    #[test]
    fn single_value_without_parameters() {
        let values = parse_parameterized(&Codings, "gzip").unwrap();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].text, "gzip");
        assert!(!values[0].wildcard);
        assert!(values[0].params.is_empty());
    }

    #[test]
    fn values_with_parameters_and_whitespace() {
        let values = parse_parameterized(&Codings, " gzip ; q=0.5 , br;q=1 ").unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0].text, "gzip");
        assert_eq!(values[0].params.get("q"), Some("0.5"));
        assert_eq!(values[1].text, "br");
        assert_eq!(values[1].params.get("q"), Some("1"));
    }

    #[test]
    fn quoted_parameter_value() {
        let values = parse_parameterized(&Codings, "x; note=\"a, b\"").unwrap();
        assert_eq!(values[0].params.get("note"), Some("a, b"));
    }

    #[test]
    fn digits_policy_rejects_quoted_and_non_digits() {
        let err = parse_parameterized(&Codings, "x; size=\"1\"").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('"'));
        let err = parse_parameterized(&Codings, "x; size=big").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("parameter value"));
    }

    #[test]
    fn wildcard_value() {
        let values = parse_parameterized(&Codings, "*;q=0").unwrap();
        assert!(values[0].wildcard);
        assert_eq!(values[0].params.get("q"), Some("0"));
    }

    #[test]
    fn wildcard_rejected_when_grammar_forbids_it() {
        let err = parse_parameterized(&Single, "*").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('*'));
        assert_eq!(err.position(), 0);
    }

    #[test]
    fn multiple_values_rejected_for_single_value_grammar() {
        let err = parse_parameterized(&Single, "a, b").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter(','));
        assert_eq!(err.position(), 1);
    }

    #[test]
    fn whitespace_is_illegal_mid_parameter() {
        // between '=' and the value is fine...
        assert!(parse_parameterized(&Codings, "x; q = 0.5").is_ok());
        // ...but a second token after the value is not
        let err = parse_parameterized(&Codings, "x; q=0.5 junk").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('j'));
    }

    #[test]
    fn comment_at_whitespace_boundary_is_skipped() {
        let values = parse_parameterized(&Codings, r"token (a \(nested\) comment) ;q=0.5").unwrap();
        assert_eq!(values[0].text, "token");
        assert_eq!(values[0].params.get("q"), Some("0.5"));

        let plain = parse_parameterized(&Codings, "token ;q=0.5").unwrap();
        assert_eq!(plain[0].text, values[0].text);
        assert_eq!(plain[0].params.get("q"), values[0].params.get("q"));
    }

    #[test]
    fn comment_adjacent_to_token_is_rejected() {
        let err = parse_parameterized(&Codings, "token(c) ;q=0.5").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('('));
        assert_eq!(err.position(), 5);
    }

    #[test]
    fn comment_rejected_when_grammar_forbids_it() {
        let err = parse_parameterized(&Single, "a (c)").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::InvalidCharacter('('));
    }

    #[test]
    fn end_of_text_mid_construct_is_missing_token() {
        let err = parse_parameterized(&Codings, "").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("value"));
        let err = parse_parameterized(&Codings, "gzip,").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("value"));
        let err = parse_parameterized(&Codings, "gzip;").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("parameter name"));
        let err = parse_parameterized(&Codings, "gzip; q=").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("parameter value"));
        let err = parse_parameterized(&Codings, "gzip; q").unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::MissingToken("parameter value"));
    }

    #[test]
    fn value_positions_are_recorded() {
        let values = parse_parameterized(&Codings, "  gzip, br").unwrap();
        assert_eq!(values[0].position, 2);
        assert_eq!(values[1].position, 8);
    }
}
