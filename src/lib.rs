//! # Typed HTTP Header Values
//!
//! Typed, immutable representations of HTTP header values together with
//! strict RFC-grammar parsers that convert raw header text into these
//! values and back. An HTTP stack built on this crate works with
//! structured header data instead of raw strings.
//!
//! # Why Typed?
//!
//! Or, why not stringly-typed? Types give the following advantages:
//!
//! - More difficult to typo, since typos in types should be caught by the compiler
//! - Parsing to a proper type by default
//!
//! Every value type exposes a canonical text form through [`Display`];
//! re-parsing that text yields an equal value. Parsing is all-or-nothing:
//! the first syntax violation aborts the whole parse with a positioned
//! [`ParseError`] pointing into the original input, with no partial result.
//!
//! # Parsing and serializing directly
//!
//! Each grammar is reachable through `FromStr`:
//!
//! ```
//! use http_header_values::MediaType;
//!
//! let media_type: MediaType = "text/html; charset=utf-8".parse()?;
//! assert_eq!(media_type.type_(), "text");
//! assert_eq!(media_type.parameter("charset"), Some("utf-8"));
//! assert_eq!(media_type.to_string(), "text/html; charset=utf-8");
//! # Ok::<_, http_header_values::ParseError>(())
//! ```
//!
//! # Working with a `HeaderMap`
//!
//! [`HeaderMapExt`] adds typed accessors to [`http::HeaderMap`]:
//!
//! ```
//! use http_header_values::{AcceptEncoding, HeaderMapExt};
//!
//! let mut headers = http::HeaderMap::new();
//! headers.insert(
//!     http::header::ACCEPT_ENCODING,
//!     http::HeaderValue::from_static("br, gzip; q=0.8"),
//! );
//!
//! let accept: AcceptEncoding = headers.typed_get().unwrap();
//! assert!(accept.accepts("br"));
//! ```
//!
//! [`Display`]: std::fmt::Display

#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]
#![cfg_attr(not(test), warn(clippy::print_stdout, clippy::dbg_macro))]

mod typed_header;
#[doc(inline)]
pub use typed_header::{Error, HeaderDecode, HeaderEncode, TypedHeader};

pub mod parser;
pub use parser::{ErrorKind, ParseError};

pub mod specifier;

mod common;
mod map_ext;

pub use self::common::*;
pub use self::map_ext::HeaderMapExt;
