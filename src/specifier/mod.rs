//! Specifiers that can be used as part of header values.
//!
//! Examples are the [`QualityValue`] weight carried by `Accept-Encoding`
//! entries, the [`Parameters`] list shared by every parameterized header
//! and the RFC 5987 [`ExtendedValue`] behind `filename*` and `title*`.

mod encoded_text;
mod parameter;
mod quality;

pub use encoded_text::{Charset, ExtendedValue};
pub use parameter::{ParameterName, Parameters};
pub use quality::{Quality, QualityValue, sort_by_quality_descending};

pub(crate) use parameter::write_parameter_value;
