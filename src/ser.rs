//! The streaming serializer.
//!
//! [`Serializer`] mirrors the parser's suspend/resume discipline in the
//! other direction: [`read`](Serializer::read) fills as much of the
//! caller's buffer as it can and stops, resuming mid-string or
//! mid-number on the next call. A frame stack tracks the position inside
//! each open container; a small pending buffer carries punctuation,
//! formatted numbers, and escape sequences across buffer boundaries.
//!
//! Output is compact: no inter-token whitespace, entries in stored
//! order.

use bytes::BufMut;

use crate::number;
use crate::object::Object;
use crate::options::{NonFinite, SerializeOptions};
use crate::scan;
use crate::value::Value;

const HEX: &[u8; 16] = b"0123456789abcdef";

enum Frame<'s, 'arena> {
    Array {
        items: &'s [Value<'arena>],
        idx: usize,
    },
    Object {
        obj: &'s Object<'arena>,
        idx: usize,
        vpend: bool,
    },
}

#[derive(Clone, Copy)]
enum Close {
    /// Closing quote then `:` (object key position).
    Key,
    /// Closing quote only.
    Val,
}

struct StrCur<'s> {
    bytes: &'s [u8],
    pos: usize,
    close: Close,
}

enum Act<'s, 'arena> {
    Elem { v: &'s Value<'arena>, comma: bool },
    Key { k: &'s str, comma: bool },
    Close(u8),
    Finish,
}

/// Serializes one value into caller-provided buffers.
///
/// # Examples
///
/// ```
/// use millstream::{Arena, Serializer};
///
/// let arena = Arena::new();
/// let doc = millstream::parse(b"[1,2,3]", &arena).unwrap();
/// let mut ser = Serializer::new(&doc);
/// let mut buf = [0u8; 4];
/// let mut out = Vec::new();
/// while !ser.is_done() {
///     let n = ser.read(&mut buf);
///     out.extend_from_slice(&buf[..n]);
/// }
/// assert_eq!(out, b"[1,2,3]");
/// ```
pub struct Serializer<'s, 'arena> {
    root: Option<&'s Value<'arena>>,
    stack: Vec<Frame<'s, 'arena>>,
    str_cur: Option<StrCur<'s>>,
    lit: Vec<u8>,
    lit_pos: usize,
    opts: SerializeOptions,
    done: bool,
}

impl<'s, 'arena> Serializer<'s, 'arena> {
    /// Creates a serializer for `value` with default options.
    pub fn new(value: &'s Value<'arena>) -> Serializer<'s, 'arena> {
        Serializer::with_options(value, SerializeOptions::default())
    }

    /// Creates a serializer for `value` with the given options.
    pub fn with_options(
        value: &'s Value<'arena>,
        opts: SerializeOptions,
    ) -> Serializer<'s, 'arena> {
        Serializer {
            root: Some(value),
            stack: Vec::new(),
            str_cur: None,
            lit: Vec::new(),
            lit_pos: 0,
            opts,
            done: false,
        }
    }

    /// True once the whole document has been emitted.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Emits up to `out.len()` bytes, returning the count written.
    ///
    /// Returns 0 only when the document is complete. The concatenation
    /// of all reads is identical regardless of the buffer sizes used.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let mut w = 0;
        loop {
            // drain pending bytes first
            while self.lit_pos < self.lit.len() && w < out.len() {
                out[w] = self.lit[self.lit_pos];
                w += 1;
                self.lit_pos += 1;
            }
            if self.lit_pos < self.lit.len() {
                return w;
            }
            self.lit.clear();
            self.lit_pos = 0;

            if self.done {
                return w;
            }

            // stream an active string body straight into the output
            if self.str_cur.is_some() {
                let mut finished = false;
                let mut escape = None;
                if let Some(cur) = self.str_cur.as_mut() {
                    loop {
                        if cur.pos == cur.bytes.len() {
                            finished = true;
                            break;
                        }
                        if w == out.len() {
                            break;
                        }
                        let rest = &cur.bytes[cur.pos..];
                        let run = scan::count_unescaped(rest);
                        if run == 0 {
                            escape = Some(rest[0]);
                            cur.pos += 1;
                            break;
                        }
                        let n = run.min(out.len() - w);
                        out[w..w + n].copy_from_slice(&rest[..n]);
                        w += n;
                        cur.pos += n;
                    }
                }
                if let Some(b) = escape {
                    match scan::ESCAPE[b as usize] {
                        b'u' => self.lit.extend_from_slice(&[
                            b'\\',
                            b'u',
                            b'0',
                            b'0',
                            HEX[(b >> 4) as usize],
                            HEX[(b & 0xf) as usize],
                        ]),
                        e => self.lit.extend_from_slice(&[b'\\', e]),
                    }
                    continue;
                }
                if finished {
                    if let Some(cur) = self.str_cur.take() {
                        match cur.close {
                            Close::Key => self.lit.extend_from_slice(b"\":"),
                            Close::Val => self.lit.push(b'"'),
                        }
                    }
                    continue;
                }
                // output full mid-string
                return w;
            }

            self.step();
        }
    }

    /// Advances the structural state by one action: the next element or
    /// key of the innermost open container, its closing bracket, or the
    /// end of the document.
    fn step(&mut self) {
        let act = match self.stack.last_mut() {
            None => match self.root.take() {
                Some(v) => Act::Elem { v, comma: false },
                None => Act::Finish,
            },
            Some(Frame::Array { items, idx }) => {
                let items: &'s [Value<'arena>] = *items;
                if *idx < items.len() {
                    let v = &items[*idx];
                    let comma = *idx > 0;
                    *idx += 1;
                    Act::Elem { v, comma }
                } else {
                    Act::Close(b']')
                }
            }
            Some(Frame::Object { obj, idx, vpend }) => {
                let obj: &'s Object<'arena> = *obj;
                if *vpend {
                    *vpend = false;
                    match obj.entry(*idx - 1) {
                        Some((_, v)) => Act::Elem { v, comma: false },
                        None => unreachable!("object entry disappeared"),
                    }
                } else if *idx < obj.len() {
                    let comma = *idx > 0;
                    match obj.entry(*idx) {
                        Some((k, _)) => {
                            *idx += 1;
                            *vpend = true;
                            Act::Key { k, comma }
                        }
                        None => unreachable!("object entry disappeared"),
                    }
                } else {
                    Act::Close(b'}')
                }
            }
        };
        match act {
            Act::Elem { v, comma } => {
                if comma {
                    self.lit.push(b',');
                }
                self.emit_value(v);
            }
            Act::Key { k, comma } => {
                if comma {
                    self.lit.push(b',');
                }
                self.lit.push(b'"');
                self.str_cur = Some(StrCur {
                    bytes: k.as_bytes(),
                    pos: 0,
                    close: Close::Key,
                });
            }
            Act::Close(c) => {
                self.lit.push(c);
                self.stack.pop();
            }
            Act::Finish => self.done = true,
        }
    }

    fn emit_value(&mut self, v: &'s Value<'arena>) {
        match v {
            Value::Null => self.lit.extend_from_slice(b"null"),
            Value::Bool(true) => self.lit.extend_from_slice(b"true"),
            Value::Bool(false) => self.lit.extend_from_slice(b"false"),
            Value::Int64(i) => number::emit_i64(*i, &mut self.lit),
            Value::Uint64(u) => number::emit_u64(*u, &mut self.lit),
            Value::Double(d) => {
                if d.is_finite() {
                    number::emit_f64(*d, &mut self.lit);
                } else {
                    match self.opts.non_finite {
                        NonFinite::Null => self.lit.extend_from_slice(b"null"),
                        NonFinite::Token => {
                            if d.is_nan() {
                                self.lit.extend_from_slice(b"NaN");
                            } else if *d < 0.0 {
                                self.lit.extend_from_slice(b"-Infinity");
                            } else {
                                self.lit.extend_from_slice(b"Infinity");
                            }
                        }
                    }
                }
            }
            Value::String(s) => {
                self.lit.push(b'"');
                self.str_cur = Some(StrCur {
                    bytes: s.as_bytes(),
                    pos: 0,
                    close: Close::Val,
                });
            }
            Value::Array(a) => {
                self.lit.push(b'[');
                self.stack.push(Frame::Array {
                    items: a.as_slice(),
                    idx: 0,
                });
            }
            Value::Object(o) => {
                self.lit.push(b'{');
                self.stack.push(Frame::Object {
                    obj: o,
                    idx: 0,
                    vpend: false,
                });
            }
        }
    }
}

/// Serializes `value` to a byte vector with default options.
pub fn to_vec(value: &Value<'_>) -> Vec<u8> {
    to_vec_with_options(value, SerializeOptions::default())
}

/// Serializes `value` to a byte vector.
pub fn to_vec_with_options(value: &Value<'_>, opts: SerializeOptions) -> Vec<u8> {
    let mut out = Vec::new();
    write_value_with_options(&mut out, value, opts);
    out
}

/// Serializes `value` to a string with default options.
pub fn to_string(value: &Value<'_>) -> String {
    to_string_with_options(value, SerializeOptions::default())
}

/// Serializes `value` to a string.
pub fn to_string_with_options(value: &Value<'_>, opts: SerializeOptions) -> String {
    let bytes = to_vec_with_options(value, opts);
    debug_assert!(core::str::from_utf8(&bytes).is_ok());
    // Escapes are ASCII and string payloads are `str`, so output is UTF-8.
    unsafe { String::from_utf8_unchecked(bytes) }
}

/// Serializes `value` into any [`BufMut`], growing it as needed.
///
/// Works with `Vec<u8>`, `bytes::BytesMut`, and the arena's own
/// [`crate::ArenaVec`] for output that lives with the document.
pub fn write_value<B: BufMut>(buf: &mut B, value: &Value<'_>) {
    write_value_with_options(buf, value, SerializeOptions::default())
}

/// [`write_value`] with explicit options.
pub fn write_value_with_options<B: BufMut>(buf: &mut B, value: &Value<'_>, opts: SerializeOptions) {
    let mut ser = Serializer::with_options(value, opts);
    let mut chunk = [0u8; 512];
    while !ser.is_done() {
        let n = ser.read(&mut chunk);
        if n == 0 {
            break;
        }
        buf.put_slice(&chunk[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::stream::parse;

    fn roundtrip(input: &[u8]) -> Vec<u8> {
        let arena = Arena::new();
        let v = parse(input, &arena).unwrap();
        to_vec(&v)
    }

    #[test]
    fn canonical_documents_round_trip_byte_identical() {
        for doc in [
            &br#"[1,2,3,4,5]"#[..],
            br#"{"a":1,"b":null,"c":"hello"}"#,
            br#"{"nested":{"arr":[true,false,null]},"n":-42}"#,
            br#""""#,
            br#"[[[]]]"#,
            br#"{}"#,
        ] {
            assert_eq!(roundtrip(doc), doc);
        }
    }

    #[test]
    fn string_escapes_are_byte_exact() {
        let arena = Arena::new();
        let v = Value::string_in(&arena, "q\" b\\ \u{8}\u{c}\n\r\t \u{1} /slash é");
        assert_eq!(
            to_string(&v),
            "\"q\\\" b\\\\ \\b\\f\\n\\r\\t \\u0001 /slash é\""
        );
    }

    #[test]
    fn output_is_identical_for_any_buffer_size() {
        let arena = Arena::new();
        let v = parse(
            br#"{"key with spaces":"value\nwith\tescapes","nums":[1,-2.5,1e100],"deep":{"x":[{}]}}"#,
            &arena,
        )
        .unwrap();
        let whole = to_vec(&v);
        for size in 1..=7 {
            let mut ser = Serializer::new(&v);
            let mut buf = vec![0u8; size];
            let mut out = Vec::new();
            while !ser.is_done() {
                let n = ser.read(&mut buf);
                out.extend_from_slice(&buf[..n]);
            }
            assert_eq!(out, whole, "buffer size {size}");
        }
    }

    #[test]
    fn numbers_emit_shortest_forms() {
        assert_eq!(to_string(&Value::Int64(0)), "0");
        assert_eq!(to_string(&Value::Int64(-7)), "-7");
        assert_eq!(to_string(&Value::Uint64(u64::MAX)), "18446744073709551615");
        assert_eq!(to_string(&Value::Double(1.5)), "1.5");
        assert_eq!(to_string(&Value::Double(-0.0)), "-0.0");
        assert_eq!(to_string(&Value::Double(1e100)), "1e100");
    }

    #[test]
    fn non_finite_policy() {
        assert_eq!(to_string(&Value::Double(f64::NAN)), "null");
        let opts = SerializeOptions {
            non_finite: NonFinite::Token,
        };
        assert_eq!(to_string_with_options(&Value::Double(f64::NAN), opts), "NaN");
        assert_eq!(
            to_string_with_options(&Value::Double(f64::INFINITY), opts),
            "Infinity"
        );
        assert_eq!(
            to_string_with_options(&Value::Double(f64::NEG_INFINITY), opts),
            "-Infinity"
        );
    }

    #[test]
    fn write_into_arena_memory() {
        let arena = Arena::new();
        let v = parse(br#"{"a":[1,2]}"#, &arena).unwrap();
        let mut out = arena.new_vec_with_capacity::<u8>(64);
        write_value(&mut out, &v);
        assert_eq!(out.freeze(), br#"{"a":[1,2]}"#);
    }

    #[test]
    fn display_uses_serializer() {
        let arena = Arena::new();
        let v = parse(br#"{"a":1}"#, &arena).unwrap();
        assert_eq!(v.to_string(), r#"{"a":1}"#);
    }
}
