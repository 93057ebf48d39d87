//! The typed header values themselves, one module per grammar.

mod accept_encoding;
mod cache_control;
mod content_disposition;
mod content_range;
mod cookie;
mod etag;
mod link;
mod media_type;
mod range;

pub use accept_encoding::{AcceptEncoding, ContentCoding};
pub use cache_control::{CacheControl, CacheControlDirective, DirectiveArgument};
pub use content_disposition::{ContentDisposition, DispositionType};
pub use content_range::ContentRange;
pub use cookie::Cookie;
pub use etag::{ETag, EntityTag};
pub use link::{Link, LinkValue};
pub use media_type::{Accept, ContentType, MediaType};
pub use range::{ByteRangeSpec, Range, RangeUnit};
