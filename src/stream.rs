//! Building a value tree from parse events.
//!
//! [`StreamParser`] couples the incremental [`Parser`] with a builder
//! handler that assembles values on a record stack: scalars push a
//! finished record, string segments accumulate in a byte scratch, and a
//! container-end event pops its `n` newest records into a freshly
//! allocated array or object. The free functions [`parse`],
//! [`parse_with_options`], and [`parse_buf`] are the one-shot wrappers
//! with entire-buffer semantics.

use bytes::Buf;

use crate::arena::Arena;
use crate::array::Array;
use crate::error::{Error, ErrorKind};
use crate::handler::Handler;
use crate::object::Object;
use crate::options::ParseOptions;
use crate::parser::Parser;
use crate::scan;
use crate::value::Value;

enum Record<'arena> {
    Value(Value<'arena>),
    Key(&'arena str),
}

struct ValueBuilder<'arena> {
    arena: &'arena Arena,
    stack: Vec<Record<'arena>>,
    chars: Vec<u8>,
}

impl<'arena> ValueBuilder<'arena> {
    fn new(arena: &'arena Arena) -> ValueBuilder<'arena> {
        ValueBuilder {
            arena,
            stack: Vec::new(),
            chars: Vec::new(),
        }
    }

    /// Copies accumulated bytes plus `last` into the arena as a string.
    ///
    /// Input is already validated unless the parse allowed invalid
    /// UTF-8; what remains invalid is replaced rather than dropped.
    fn materialize(&mut self, last: &[u8]) -> &'arena str {
        let bytes: &[u8] = if self.chars.is_empty() {
            last
        } else {
            self.chars.extend_from_slice(last);
            &self.chars
        };
        let s = match core::str::from_utf8(bytes) {
            Ok(s) => self.arena.alloc_str(s),
            Err(_) => self.arena.alloc_str(&String::from_utf8_lossy(bytes)),
        };
        self.chars.clear();
        s
    }

    fn take_root(&mut self) -> Option<Value<'arena>> {
        if self.stack.len() == 1 {
            match self.stack.pop() {
                Some(Record::Value(v)) => Some(v),
                _ => None,
            }
        } else {
            None
        }
    }
}

impl<'arena> Handler for ValueBuilder<'arena> {
    fn on_document_begin(&mut self) -> Result<(), ErrorKind> {
        self.stack.clear();
        self.chars.clear();
        Ok(())
    }

    fn on_object_end(&mut self, n: usize) -> Result<(), ErrorKind> {
        let mut obj = Object::with_capacity_in(n, self.arena);
        let base = self.stack.len() - 2 * n;
        let mut key = None;
        for rec in self.stack.drain(base..) {
            match rec {
                Record::Key(k) => key = Some(k),
                Record::Value(v) => {
                    // duplicate keys: the last write wins
                    obj.insert_or_assign(key.take().expect("key record"), v);
                }
            }
        }
        self.stack.push(Record::Value(Value::Object(obj)));
        Ok(())
    }

    fn on_array_end(&mut self, n: usize) -> Result<(), ErrorKind> {
        let mut arr = Array::with_capacity_in(n, self.arena);
        let base = self.stack.len() - n;
        for rec in self.stack.drain(base..) {
            match rec {
                Record::Value(v) => arr.push(v),
                Record::Key(_) => unreachable!("key record in array"),
            }
        }
        self.stack.push(Record::Value(Value::Array(arr)));
        Ok(())
    }

    fn on_key_part(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.chars.extend_from_slice(part);
        Ok(())
    }

    fn on_key(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        let s = self.materialize(part);
        self.stack.push(Record::Key(s));
        Ok(())
    }

    fn on_string_part(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.chars.extend_from_slice(part);
        Ok(())
    }

    fn on_string(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        let s = self.materialize(part);
        self.stack.push(Record::Value(Value::String(s)));
        Ok(())
    }

    fn on_int64(&mut self, v: i64) -> Result<(), ErrorKind> {
        self.stack.push(Record::Value(Value::Int64(v)));
        Ok(())
    }

    fn on_uint64(&mut self, v: u64) -> Result<(), ErrorKind> {
        self.stack.push(Record::Value(Value::Uint64(v)));
        Ok(())
    }

    fn on_double(&mut self, v: f64) -> Result<(), ErrorKind> {
        self.stack.push(Record::Value(Value::Double(v)));
        Ok(())
    }

    fn on_bool(&mut self, v: bool) -> Result<(), ErrorKind> {
        self.stack.push(Record::Value(Value::Bool(v)));
        Ok(())
    }

    fn on_null(&mut self) -> Result<(), ErrorKind> {
        self.stack.push(Record::Value(Value::Null));
        Ok(())
    }
}

/// An incremental parser that builds a [`Value`] tree.
///
/// Feed bytes with [`write`](StreamParser::write) (or
/// [`write_some`](StreamParser::write_some) for explicit end-of-input
/// control), then call [`finish`](StreamParser::finish) to obtain the
/// value. Dropping the parser mid-document discards all partial records;
/// their arena storage is reclaimed with the arena.
///
/// # Examples
///
/// ```
/// use millstream::{Arena, StreamParser};
///
/// let arena = Arena::new();
/// let mut p = StreamParser::new(&arena);
/// p.write(b"[").unwrap();
/// p.write(b"1,").unwrap();
/// p.write(b"2]").unwrap();
/// let doc = p.finish().unwrap();
/// assert_eq!(doc.as_array().unwrap().len(), 2);
/// ```
pub struct StreamParser<'arena> {
    parser: Parser,
    builder: ValueBuilder<'arena>,
}

impl<'arena> StreamParser<'arena> {
    /// Creates a parser building into `arena` with default options.
    pub fn new(arena: &'arena Arena) -> StreamParser<'arena> {
        StreamParser::with_options(arena, ParseOptions::default())
    }

    /// Creates a parser building into `arena` with the given options.
    pub fn with_options(arena: &'arena Arena, opts: ParseOptions) -> StreamParser<'arena> {
        StreamParser {
            parser: Parser::with_options(opts),
            builder: ValueBuilder::new(arena),
        }
    }

    /// The arena the document is built in.
    pub fn arena(&self) -> &'arena Arena {
        self.builder.arena
    }

    /// True once a complete document has been parsed.
    pub fn is_done(&self) -> bool {
        self.parser.is_done()
    }

    /// Feeds bytes, expecting more input later. Returns bytes consumed.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.parser.write_some(true, data, &mut self.builder)
    }

    /// Feeds bytes with explicit end-of-input control. See
    /// [`Parser::write_some`].
    pub fn write_some(&mut self, more: bool, data: &[u8]) -> Result<usize, Error> {
        self.parser.write_some(more, data, &mut self.builder)
    }

    /// Signals end of input and returns the parsed value.
    pub fn finish(mut self) -> Result<Value<'arena>, Error> {
        if !self.parser.is_done() {
            self.parser.write_some(false, b"", &mut self.builder)?;
        }
        self.builder
            .take_root()
            .ok_or_else(|| Error::new(ErrorKind::Incomplete, self.parser.total_consumed()))
    }
}

/// Parses a complete document with default options.
///
/// The whole input must be one JSON document; bytes after the document
/// (other than whitespace) are an [`ErrorKind::ExtraData`] error.
pub fn parse<'arena>(data: &[u8], arena: &'arena Arena) -> Result<Value<'arena>, Error> {
    parse_with_options(data, arena, ParseOptions::default())
}

/// Parses a complete document with the given options.
pub fn parse_with_options<'arena>(
    data: &[u8],
    arena: &'arena Arena,
    opts: ParseOptions,
) -> Result<Value<'arena>, Error> {
    let mut p = StreamParser::with_options(arena, opts);
    let n = p.write_some(false, data)?;
    if n < data.len() {
        return Err(Error::new(ErrorKind::ExtraData, n as u64));
    }
    p.finish()
}

/// Parses a complete document from a (possibly non-contiguous) buffer.
///
/// Each chunk of the buffer is fed through the incremental parser, so
/// chained buffers parse identically to a single contiguous slice.
pub fn parse_buf<'arena, B: Buf>(buf: B, arena: &'arena Arena) -> Result<Value<'arena>, Error> {
    parse_buf_with_options(buf, arena, ParseOptions::default())
}

/// [`parse_buf`] with explicit options.
pub fn parse_buf_with_options<'arena, B: Buf>(
    mut buf: B,
    arena: &'arena Arena,
    opts: ParseOptions,
) -> Result<Value<'arena>, Error> {
    let mut p = StreamParser::with_options(arena, opts);
    while buf.has_remaining() {
        let chunk = buf.chunk();
        let chunk_len = chunk.len();
        let more = buf.remaining() > chunk_len;
        let n = p.write_some(more, chunk)?;
        buf.advance(n);
        if p.is_done() {
            // only whitespace may follow the document
            while buf.has_remaining() {
                let chunk = buf.chunk();
                let chunk_len = chunk.len();
                let ws = scan::count_whitespace(chunk);
                if ws < chunk_len {
                    return Err(Error::new(
                        ErrorKind::ExtraData,
                        p.parser.total_consumed() + ws as u64,
                    ));
                }
                buf.advance(chunk_len);
            }
            break;
        }
        debug_assert_eq!(n, chunk_len);
    }
    p.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Kind;

    #[test]
    fn parse_array_of_ints() {
        let arena = Arena::new();
        let v = parse(b"[1,2,3,4,5]", &arena).unwrap();
        let a = v.as_array().unwrap();
        assert_eq!(a.len(), 5);
        for i in 0..5 {
            assert_eq!(a[i], Value::Int64(i as i64 + 1));
        }
    }

    #[test]
    fn parse_object_members() {
        let arena = Arena::new();
        let v = parse(br#"{"a":1,"b":null,"c":"hello"}"#, &arena).unwrap();
        assert_eq!(v.kind(), Kind::Object);
        assert_eq!(v.get("a"), Some(&Value::Int64(1)));
        assert!(v.get("b").unwrap().is_null());
        assert_eq!(v.get("c").unwrap().as_str(), Some("hello"));
    }

    #[test]
    fn duplicate_keys_keep_last_value() {
        let arena = Arena::new();
        let v = parse(br#"{"x":1,"x":2}"#, &arena).unwrap();
        let o = v.as_object().unwrap();
        assert_eq!(o.len(), 1);
        assert_eq!(o.get("x"), Some(&Value::Int64(2)));
    }

    #[test]
    fn surrogate_pair_string() {
        let arena = Arena::new();
        let v = parse("\"😀\"".as_bytes(), &arena).unwrap();
        assert_eq!(v.as_str(), Some("\u{1f600}"));
        assert_eq!(v.as_str().unwrap().as_bytes(), [0xf0, 0x9f, 0x98, 0x80]);
    }

    #[test]
    fn split_writes_match_one_shot() {
        let arena = Arena::new();
        let whole = parse(b"[1,2]", &arena).unwrap();

        let mut p = StreamParser::new(&arena);
        p.write(b"[").unwrap();
        p.write(b"1,").unwrap();
        p.write_some(false, b"2]").unwrap();
        let split = p.finish().unwrap();
        assert_eq!(split, whole);
    }

    #[test]
    fn every_split_point_parses_identically() {
        let input = br#"{"k":"va\nl","a":[1,2.5,null,true],"z":{}}"#;
        let arena = Arena::new();
        let whole = parse(input, &arena).unwrap();
        for split in 1..input.len() {
            let arena2 = Arena::new();
            let mut p = StreamParser::new(&arena2);
            p.write(&input[..split]).unwrap();
            p.write_some(false, &input[split..]).unwrap();
            let v = p.finish().unwrap();
            assert_eq!(v, whole, "split at {split}");
        }
    }

    #[test]
    fn extra_data_is_an_error() {
        let arena = Arena::new();
        let err = parse(b"[1] [2]", &arena).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtraData);
        assert_eq!(err.offset(), 4);
        // trailing whitespace is fine
        parse(b"[1]  \n", &arena).unwrap();
    }

    #[test]
    fn parse_from_chained_buffers() {
        let arena = Arena::new();
        let head = &b"[1,2,"[..];
        let tail = &b"3]"[..];
        let v = parse_buf(head.chain(tail), &arena).unwrap();
        assert_eq!(v, parse(b"[1,2,3]", &arena).unwrap());
    }

    #[test]
    fn deep_nesting_within_limit() {
        let arena = Arena::new();
        let mut input = Vec::new();
        for _ in 0..32 {
            input.push(b'[');
        }
        for _ in 0..32 {
            input.push(b']');
        }
        parse(&input, &arena).unwrap();

        input.insert(0, b'[');
        input.push(b']');
        let err = parse(&input, &arena).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooDeep);
    }

    #[test]
    fn abandoned_parse_discards_partial_state() {
        let arena = Arena::new();
        let mut p = StreamParser::new(&arena);
        p.write(br#"{"partial":[1,2,3"#).unwrap();
        drop(p);
        // arena is still usable
        let v = parse(b"[]", &arena).unwrap();
        assert_eq!(v.kind(), Kind::Array);
    }

    #[test]
    fn finish_without_input_is_incomplete() {
        let arena = Arena::new();
        let p = StreamParser::new(&arena);
        let err = p.finish().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Incomplete);
    }
}
