#![doc(html_root_url = "https://docs.rs/millstream/0.1.0")]
#![doc = include_str!("../README.md")]

// Re-export the bytes crate for use with parse_buf and write_value.
pub use bytes;

pub mod arena;
mod array;
mod error;
mod handler;
mod number;
mod object;
mod options;
mod parse_into;
mod parser;
mod scan;
mod ser;
mod stream;
mod value;
mod view;

pub use crate::arena::{Arena, ArenaVec, SharedArena};
pub use crate::array::Array;
pub use crate::error::{Error, ErrorKind};
pub use crate::handler::Handler;
pub use crate::number::DoubleFormat;
pub use crate::object::Object;
pub use crate::options::{NonFinite, NumberMode, ParseOptions, SerializeOptions};
pub use crate::parse_into::{
    parse_into, parse_into_with_options, BuildHandler, Event, FromParse, IntoParser, MapLike, Step,
};
pub use crate::parser::Parser;
pub use crate::ser::{
    to_string, to_string_with_options, to_vec, to_vec_with_options, write_value,
    write_value_with_options, Serializer,
};
pub use crate::stream::{parse, parse_buf, parse_buf_with_options, parse_with_options, StreamParser};
pub use crate::value::{Kind, Value};
pub use crate::view::{ArraySource, AsView, ObjectSource, ValueView};

/// Formats a double outside of document serialization.
///
/// Exposes the number codec's extra formats: fixed precision and the
/// hexadecimal significand form.
pub fn format_double(v: f64, format: DoubleFormat) -> String {
    let mut out = Vec::new();
    number::format_double(v, format, &mut out);
    debug_assert!(core::str::from_utf8(&out).is_ok());
    // The formatter emits ASCII only.
    unsafe { String::from_utf8_unchecked(out) }
}
