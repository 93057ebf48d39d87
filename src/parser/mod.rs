//! The header-value tokenizer/parser framework.
//!
//! Raw header text enters a concrete grammar parser built on these pieces:
//! character classifiers, a scan cursor over the source text, a comment
//! consumer, the generic lexical-event loop and the shared
//! parameterized-value state machine. Every failure surfaces as one
//! [`ParseError`] carrying the offending position and the original text;
//! nothing in this layer recovers or returns partial results.

pub(crate) mod chars;
mod comment;
mod cursor;
mod error;
mod lexer;
mod parameterized;

pub use error::{ErrorKind, ParseError};

pub(crate) use cursor::Cursor;
pub(crate) use parameterized::{ParameterizedGrammar, ValuePolicy, parse_parameterized};
