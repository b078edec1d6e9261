//! The incremental JSON parser.
//!
//! [`Parser`] is a resumable state machine: [`Parser::write_some`] consumes
//! a prefix of the bytes it is given, fires [`Handler`] events for every
//! production it completes, and when input runs out mid-document it saves
//! just enough state on a small stack to pick up exactly where it stopped
//! on the next call. The handler-event sequence is identical no matter how
//! the input is sliced.
//!
//! Every production is a small function that either completes, fails with
//! an error, or pushes its state and returns "partial". Resuming pops
//! states outermost-first and descends back to the suspension point.

use crate::error::{Error, ErrorKind};
use crate::handler::Handler;
use crate::number;
use crate::options::{NumberMode, ParseOptions};
use crate::scan;

/// Capacity of the escape scratch buffer. The slow string path flushes a
/// part-segment every time the buffer fills.
const SCRATCH_SIZE: usize = 2048;

/// Fast-path window for numbers: 16 integer digits, a point, and 16
/// fraction digits can be scanned without per-byte end checks.
const NUMBER_FAST_WINDOW: usize = 33;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Ele1,
    Ele2,
    Ele3,
    Nul1,
    Nul2,
    Nul3,
    Tru1,
    Tru2,
    Tru3,
    Fal1,
    Fal2,
    Fal3,
    Fal4,
    Str1,
    Str2,
    Str3,
    Str4,
    Str5,
    Str6,
    Str7,
    Sur1,
    Sur2,
    Sur3,
    Sur4,
    Sur5,
    Sur6,
    Obj1,
    Obj2,
    Obj3,
    Obj4,
    Obj5,
    Obj6,
    Obj7,
    Arr1,
    Arr2,
    Arr3,
    Arr4,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Exp1,
    Exp2,
    Exp3,
    Inf1,
    Inf2,
    Inf3,
    Inf4,
    Inf5,
    Inf6,
    Inf7,
    Nan1,
    Nan2,
    Ws0,
    Cm1,
    CmL,
    CmB,
    CmB2,
    UKy1,
}

/// Partial-number scratch record, saved whole across suspension.
#[derive(Clone, Copy, Debug, Default)]
struct Num {
    mant: u64,
    exp: i32,
    bias: i32,
    neg: bool,
    exp_neg: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Status {
    Done,
    Partial,
}

type R = Result<Status, Error>;

struct Cursor<'b> {
    buf: &'b [u8],
    pos: usize,
    base: u64,
}

impl<'b> Cursor<'b> {
    #[inline]
    fn peek(&self) -> Option<u8> {
        self.buf.get(self.pos).copied()
    }

    #[inline]
    fn bump(&mut self) {
        self.pos += 1;
    }

    #[inline]
    fn skip(&mut self, n: usize) {
        self.pos += n;
    }

    #[inline]
    fn rest(&self) -> &'b [u8] {
        &self.buf[self.pos..]
    }

    #[inline]
    fn span(&self, start: usize) -> &'b [u8] {
        &self.buf[start..self.pos]
    }

    /// Absolute offset across all `write_some` calls.
    #[inline]
    fn offset(&self) -> u64 {
        self.base + self.pos as u64
    }
}

#[inline]
fn is_e(c: u8) -> bool {
    (c | 32) == b'e'
}

/// The streaming SAX parser.
///
/// Feed input with [`write_some`](Parser::write_some), passing `more =
/// true` while further input is expected. The parser suspends at end of
/// input and resumes on the next call; a document is complete when
/// [`is_done`](Parser::is_done) reports true.
///
/// After an error the parser is not reusable until [`reset`](Parser::reset).
///
/// # Examples
///
/// ```
/// use millstream::{Handler, Parser};
///
/// #[derive(Default)]
/// struct Count(usize);
/// impl Handler for Count {
///     fn on_int64(&mut self, _: i64) -> Result<(), millstream::ErrorKind> {
///         self.0 += 1;
///         Ok(())
///     }
/// }
///
/// let mut h = Count::default();
/// let mut p = Parser::new();
/// p.write_some(true, b"[1,2,", &mut h).unwrap();
/// p.write_some(false, b"3]", &mut h).unwrap();
/// assert!(p.is_done());
/// assert_eq!(h.0, 3);
/// ```
pub struct Parser {
    opts: ParseOptions,
    st: Vec<State>,
    counts: Vec<usize>,
    num: Num,
    u1: u16,
    u2: u16,
    is_key: bool,
    more: bool,
    done: bool,
    depth: u32,
    consumed: u64,
    temp: Vec<u8>,
    num_text: Vec<u8>,
    utf8: scan::Utf8Check,
}

impl Parser {
    /// Creates a parser with default options.
    pub fn new() -> Parser {
        Parser::with_options(ParseOptions::default())
    }

    /// Creates a parser with the given options.
    pub fn with_options(opts: ParseOptions) -> Parser {
        Parser {
            opts,
            st: Vec::new(),
            counts: Vec::new(),
            num: Num::default(),
            u1: 0,
            u2: 0,
            is_key: false,
            more: true,
            done: false,
            depth: 0,
            consumed: 0,
            temp: Vec::with_capacity(SCRATCH_SIZE),
            num_text: Vec::new(),
            utf8: scan::Utf8Check::new(),
        }
    }

    /// The options this parser was created with.
    pub fn options(&self) -> &ParseOptions {
        &self.opts
    }

    /// True once a complete document has been parsed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Total bytes consumed across all `write_some` calls.
    pub fn total_consumed(&self) -> u64 {
        self.consumed
    }

    /// Discards all state so the parser can read a new document.
    pub fn reset(&mut self) {
        self.st.clear();
        self.counts.clear();
        self.temp.clear();
        self.num_text.clear();
        self.done = false;
        self.more = true;
        self.is_key = false;
        self.depth = 0;
        self.consumed = 0;
        self.utf8.reset();
    }

    /// Parses some of `data`, firing handler events.
    ///
    /// Returns the number of bytes consumed. With `more = true` the parser
    /// consumes the whole slice, suspending internally if the document is
    /// unfinished; the next call resumes. With `more = false` an
    /// unfinished document is an [`ErrorKind::Incomplete`] error, except
    /// that a value which is already complete at end of input (for
    /// example a bare number with no trailing whitespace) is accepted.
    ///
    /// Once the document is complete, trailing whitespace is consumed and
    /// remaining bytes are left unconsumed; the count tells the caller
    /// where the document ended.
    pub fn write_some<H: Handler>(
        &mut self,
        more: bool,
        data: &[u8],
        h: &mut H,
    ) -> Result<usize, Error> {
        if self.done {
            return Ok(0);
        }
        self.more = more;
        let mut cs = Cursor {
            buf: data,
            pos: 0,
            base: self.consumed,
        };
        if self.st.is_empty() {
            // first call
            self.depth = 0;
            self.is_key = false;
            h.on_document_begin().map_err(|k| self.err(&cs, k))?;
        }
        let r = self.parse_element(&mut cs, h);
        match r {
            Ok(Status::Done) => {
                self.done = true;
                h.on_document_end().map_err(|k| self.err(&cs, k))?;
            }
            Ok(Status::Partial) => {
                if !self.more {
                    let e = self.err(&cs, ErrorKind::Incomplete);
                    self.consumed += cs.pos as u64;
                    return Err(e);
                }
                debug_assert_eq!(cs.pos, data.len());
            }
            Err(e) => {
                self.consumed += cs.pos as u64;
                return Err(e);
            }
        }
        self.consumed += cs.pos as u64;
        Ok(cs.pos)
    }

    #[inline]
    fn err(&self, cs: &Cursor, kind: ErrorKind) -> Error {
        Error::new(kind, cs.offset())
    }

    /// Suspends the current production if further input is expected.
    #[inline]
    fn stall(&mut self, st: State) -> R {
        if self.more {
            self.st.push(st);
        }
        Ok(Status::Partial)
    }

    /// Suspends a container production together with its element count.
    #[inline]
    fn stall_n(&mut self, st: State, n: usize) -> R {
        if self.more {
            self.counts.push(n);
            self.st.push(st);
        }
        Ok(Status::Partial)
    }

    /// Pops the resume state if the top of the stack belongs to `filter`.
    #[inline]
    fn resume_in(&mut self, filter: impl Fn(State) -> bool) -> Option<State> {
        match self.st.last() {
            Some(&s) if filter(s) => {
                self.st.pop();
                Some(s)
            }
            _ => None,
        }
    }

    fn parse_element<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let mut st = self
            .resume_in(|s| matches!(s, State::Ele1 | State::Ele2 | State::Ele3))
            .unwrap_or(State::Ele1);
        loop {
            match st {
                State::Ele1 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall(State::Ele1);
                    }
                    st = State::Ele2;
                }
                State::Ele2 => {
                    if self.parse_value(cs, h)? == Status::Partial {
                        return self.stall(State::Ele2);
                    }
                    st = State::Ele3;
                }
                State::Ele3 => {
                    if self.parse_filler(cs, h)? == Status::Partial && self.more {
                        return self.stall(State::Ele3);
                    }
                    // end of input with no more expected: trailing
                    // whitespace is optional
                    return Ok(Status::Done);
                }
                _ => unreachable!(),
            }
        }
    }

    /// Skips whitespace and (when enabled) comments.
    ///
    /// Returns `Done` positioned at a non-filler byte, `Partial` when the
    /// input ran out between tokens. Only a partially-read comment saves
    /// state; plain whitespace resumes from scratch.
    fn parse_filler<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let mut st = self
            .resume_in(|s| matches!(s, State::Cm1 | State::CmL | State::CmB | State::CmB2))
            .unwrap_or(State::Ws0);
        let mut start = cs.pos;
        loop {
            match st {
                // whitespace between tokens
                State::Ws0 => loop {
                    cs.skip(scan::count_whitespace(cs.rest()));
                    match cs.peek() {
                        None => return Ok(Status::Partial),
                        Some(b'/') if self.opts.allow_comments => {
                            start = cs.pos;
                            cs.bump();
                            st = State::Cm1;
                            break;
                        }
                        Some(_) => return Ok(Status::Done),
                    }
                },
                // after '/'
                State::Cm1 => match cs.peek() {
                    None => {
                        if self.more {
                            h.on_comment_part(cs.span(start))
                                .map_err(|k| self.err(cs, k))?;
                            return self.stall(State::Cm1);
                        }
                        return Err(self.err(cs, ErrorKind::Incomplete));
                    }
                    Some(b'/') => {
                        cs.bump();
                        st = State::CmL;
                    }
                    Some(b'*') => {
                        cs.bump();
                        st = State::CmB;
                    }
                    Some(_) => return Err(self.err(cs, ErrorKind::Syntax)),
                },
                // line comment body
                State::CmL => loop {
                    match cs.peek() {
                        None => {
                            if self.more {
                                h.on_comment_part(cs.span(start))
                                    .map_err(|k| self.err(cs, k))?;
                                return self.stall(State::CmL);
                            }
                            // a line comment may be ended by end of input
                            h.on_comment(cs.span(start)).map_err(|k| self.err(cs, k))?;
                            return Ok(Status::Partial);
                        }
                        Some(b'\n') | Some(b'\r') => {
                            h.on_comment(cs.span(start)).map_err(|k| self.err(cs, k))?;
                            st = State::Ws0;
                            break;
                        }
                        Some(_) => cs.bump(),
                    }
                },
                // block comment body
                State::CmB => loop {
                    match cs.peek() {
                        None => {
                            if self.more {
                                h.on_comment_part(cs.span(start))
                                    .map_err(|k| self.err(cs, k))?;
                                return self.stall(State::CmB);
                            }
                            return Err(self.err(cs, ErrorKind::Incomplete));
                        }
                        Some(b'*') => {
                            cs.bump();
                            st = State::CmB2;
                            break;
                        }
                        Some(_) => cs.bump(),
                    }
                },
                // block comment, just saw '*'
                State::CmB2 => match cs.peek() {
                    None => {
                        if self.more {
                            h.on_comment_part(cs.span(start))
                                .map_err(|k| self.err(cs, k))?;
                            return self.stall(State::CmB2);
                        }
                        return Err(self.err(cs, ErrorKind::Incomplete));
                    }
                    Some(b'/') => {
                        cs.bump();
                        h.on_comment(cs.span(start)).map_err(|k| self.err(cs, k))?;
                        st = State::Ws0;
                    }
                    Some(b'*') => {
                        cs.bump();
                    }
                    Some(_) => {
                        cs.bump();
                        st = State::CmB;
                    }
                },
                _ => unreachable!(),
            }
        }
    }

    fn parse_value<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        if let Some(&top) = self.st.last() {
            return match top {
                State::Nul1 | State::Nul2 | State::Nul3 => self.parse_null(cs, h),
                State::Tru1 | State::Tru2 | State::Tru3 => self.parse_true(cs, h),
                State::Fal1 | State::Fal2 | State::Fal3 | State::Fal4 => self.parse_false(cs, h),
                State::Str1
                | State::Str2
                | State::Str3
                | State::Str4
                | State::Str5
                | State::Str6
                | State::Str7
                | State::Sur1
                | State::Sur2
                | State::Sur3
                | State::Sur4
                | State::Sur5
                | State::Sur6 => self.parse_string(cs, h),
                State::Obj1
                | State::Obj2
                | State::Obj3
                | State::Obj4
                | State::Obj5
                | State::Obj6
                | State::Obj7 => self.parse_object(cs, h),
                State::Arr1 | State::Arr2 | State::Arr3 | State::Arr4 => self.parse_array(cs, h),
                State::Num1
                | State::Num2
                | State::Num3
                | State::Num4
                | State::Num5
                | State::Num6
                | State::Num7
                | State::Num8
                | State::Exp1
                | State::Exp2
                | State::Exp3 => self.parse_number(cs, h),
                State::Inf1
                | State::Inf2
                | State::Inf3
                | State::Inf4
                | State::Inf5
                | State::Inf6
                | State::Inf7 => self.parse_infinity(cs, h),
                State::Nan1 | State::Nan2 => self.parse_nan(cs, h),
                _ => unreachable!("bad resume state"),
            };
        }
        let Some(b) = cs.peek() else {
            return Ok(Status::Partial);
        };
        match b {
            b'n' => {
                cs.bump();
                self.parse_null(cs, h)
            }
            b't' => {
                cs.bump();
                self.parse_true(cs, h)
            }
            b'f' => {
                cs.bump();
                self.parse_false(cs, h)
            }
            b'"' => self.parse_string(cs, h),
            b'{' => self.parse_object(cs, h),
            b'[' => self.parse_array(cs, h),
            b'I' if self.opts.allow_infinity_and_nan => {
                if self.opts.numbers == NumberMode::None {
                    return Err(self.err(cs, ErrorKind::Syntax));
                }
                cs.bump();
                self.num.neg = false;
                self.parse_infinity(cs, h)
            }
            b'N' if self.opts.allow_infinity_and_nan => {
                if self.opts.numbers == NumberMode::None {
                    return Err(self.err(cs, ErrorKind::Syntax));
                }
                cs.bump();
                self.parse_nan(cs, h)
            }
            b'-' | b'0'..=b'9' => {
                if self.opts.numbers == NumberMode::None {
                    return Err(self.err(cs, ErrorKind::Syntax));
                }
                self.parse_number(cs, h)
            }
            _ => Err(self.err(cs, ErrorKind::Syntax)),
        }
    }

    fn parse_literal<H: Handler>(
        &mut self,
        cs: &mut Cursor,
        h: &mut H,
        chars: &[u8],
        states: &[State],
        fail: ErrorKind,
        emit: fn(&mut H) -> Result<(), ErrorKind>,
    ) -> R {
        let mut idx = match self.resume_in(|s| states.contains(&s)) {
            Some(s) => states.iter().position(|&x| x == s).unwrap_or(0),
            None => 0,
        };
        while idx < chars.len() {
            match cs.peek() {
                Some(c) if c == chars[idx] => {
                    cs.bump();
                    idx += 1;
                }
                Some(_) => return Err(self.err(cs, fail)),
                None => return self.stall(states[idx]),
            }
        }
        emit(h).map_err(|k| self.err(cs, k))?;
        Ok(Status::Done)
    }

    fn parse_null<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        self.parse_literal(
            cs,
            h,
            b"ull",
            &[State::Nul1, State::Nul2, State::Nul3],
            ErrorKind::Syntax,
            |h| h.on_null(),
        )
    }

    fn parse_true<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        self.parse_literal(
            cs,
            h,
            b"rue",
            &[State::Tru1, State::Tru2, State::Tru3],
            ErrorKind::Syntax,
            |h| h.on_bool(true),
        )
    }

    fn parse_false<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        self.parse_literal(
            cs,
            h,
            b"alse",
            &[State::Fal1, State::Fal2, State::Fal3, State::Fal4],
            ErrorKind::ExpectedFalse,
            |h| h.on_bool(false),
        )
    }

    fn parse_infinity<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let emit: fn(&mut H) -> Result<(), ErrorKind> = if self.num.neg {
            |h| h.on_double(f64::NEG_INFINITY)
        } else {
            |h| h.on_double(f64::INFINITY)
        };
        self.parse_literal(
            cs,
            h,
            b"nfinity",
            &[
                State::Inf1,
                State::Inf2,
                State::Inf3,
                State::Inf4,
                State::Inf5,
                State::Inf6,
                State::Inf7,
            ],
            ErrorKind::Syntax,
            emit,
        )
    }

    fn parse_nan<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        self.parse_literal(
            cs,
            h,
            b"aN",
            &[State::Nan1, State::Nan2],
            ErrorKind::Syntax,
            |h| h.on_double(f64::NAN),
        )
    }

    #[inline]
    fn deliver_part<H: Handler>(&self, cs: &Cursor, h: &mut H, part: &[u8]) -> Result<(), Error> {
        if part.is_empty() {
            return Ok(());
        }
        if self.is_key {
            h.on_key_part(part).map_err(|k| self.err(cs, k))
        } else {
            h.on_string_part(part).map_err(|k| self.err(cs, k))
        }
    }

    #[inline]
    fn deliver_final<H: Handler>(
        &mut self,
        cs: &Cursor,
        h: &mut H,
        part: &[u8],
    ) -> Result<(), Error> {
        let r = if self.is_key {
            h.on_key(part)
        } else {
            h.on_string(part)
        };
        self.is_key = false;
        r.map_err(|k| Error::new(k, cs.offset()))
    }

    /// Validates a raw string segment when UTF-8 checking is on.
    #[inline]
    fn check_utf8(&mut self, cs: &Cursor, seg: &[u8]) -> Result<(), Error> {
        if !self.opts.allow_invalid_utf8 && !self.utf8.feed(seg) {
            return Err(Error::new(ErrorKind::InvalidUtf8, cs.offset()));
        }
        Ok(())
    }

    /// A codepoint may not be split by an escape or the closing quote.
    #[inline]
    fn check_utf8_boundary(&mut self, cs: &Cursor) -> Result<(), Error> {
        if !self.opts.allow_invalid_utf8 && !self.utf8.is_boundary() {
            return Err(Error::new(ErrorKind::InvalidUtf8, cs.offset()));
        }
        Ok(())
    }

    /// Flushes the scratch buffer as a part-segment once it fills.
    #[inline]
    fn scratch_flush_if_full<H: Handler>(&mut self, cs: &Cursor, h: &mut H) -> Result<(), Error> {
        if self.temp.len() >= SCRATCH_SIZE {
            let r = if self.is_key {
                h.on_key_part(&self.temp)
            } else {
                h.on_string_part(&self.temp)
            };
            r.map_err(|k| Error::new(k, cs.offset()))?;
            self.temp.clear();
        }
        Ok(())
    }

    fn parse_string<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let mut st = match self.resume_in(|s| {
            matches!(
                s,
                State::Str1
                    | State::Str2
                    | State::Str3
                    | State::Str4
                    | State::Str5
                    | State::Str6
                    | State::Str7
                    | State::Sur1
                    | State::Sur2
                    | State::Sur3
                    | State::Sur4
                    | State::Sur5
                    | State::Sur6
            )
        }) {
            Some(s) => s,
            None => {
                debug_assert_eq!(cs.peek(), Some(b'"'));
                cs.bump();
                self.utf8.reset();
                self.temp.clear();
                State::Str1
            }
        };
        let start = cs.pos;
        loop {
            match st {
                // zero-copy unescaped run
                State::Str1 => {
                    let run = scan::count_unescaped(cs.rest());
                    let seg = &cs.rest()[..run];
                    self.check_utf8(cs, seg)?;
                    cs.skip(run);
                    match cs.peek() {
                        None => {
                            let span = cs.span(start);
                            self.deliver_part(cs, h, span)?;
                            return self.stall(State::Str1);
                        }
                        Some(b'"') => {
                            self.check_utf8_boundary(cs)?;
                            let span = cs.span(start);
                            self.deliver_final(cs, h, span)?;
                            cs.bump();
                            return Ok(Status::Done);
                        }
                        Some(b'\\') => {
                            self.check_utf8_boundary(cs)?;
                            let span = cs.span(start);
                            self.deliver_part(cs, h, span)?;
                            cs.bump();
                            st = State::Str3;
                        }
                        Some(_) => {
                            // control character
                            return Err(self.err(cs, ErrorKind::Syntax));
                        }
                    }
                }
                // escaped string assembled in the scratch buffer
                State::Str2 => loop {
                    match cs.peek() {
                        None => {
                            if !self.temp.is_empty() {
                                let r = if self.is_key {
                                    h.on_key_part(&self.temp)
                                } else {
                                    h.on_string_part(&self.temp)
                                };
                                r.map_err(|k| Error::new(k, cs.offset()))?;
                                self.temp.clear();
                            }
                            return self.stall(State::Str2);
                        }
                        Some(b'"') => {
                            self.check_utf8_boundary(cs)?;
                            let temp = core::mem::take(&mut self.temp);
                            let r = self.deliver_final(cs, h, &temp);
                            self.temp = temp;
                            self.temp.clear();
                            r?;
                            cs.bump();
                            return Ok(Status::Done);
                        }
                        Some(b'\\') => {
                            self.check_utf8_boundary(cs)?;
                            cs.bump();
                            st = State::Str3;
                            break;
                        }
                        Some(c) if c < 0x20 => {
                            return Err(self.err(cs, ErrorKind::Syntax));
                        }
                        Some(c) => {
                            self.check_utf8(cs, &[c])?;
                            self.temp.push(c);
                            self.scratch_flush_if_full(cs, h)?;
                            cs.bump();
                        }
                    }
                },
                // escape opener
                State::Str3 => match cs.peek() {
                    None => return self.stall(State::Str3),
                    Some(c) => {
                        let decoded = match c {
                            b'"' => b'"',
                            b'\\' => b'\\',
                            b'/' => b'/',
                            b'b' => 0x08,
                            b'f' => 0x0c,
                            b'n' => 0x0a,
                            b'r' => 0x0d,
                            b't' => 0x09,
                            b'u' => {
                                cs.bump();
                                st = State::Str4;
                                continue;
                            }
                            _ => return Err(self.err(cs, ErrorKind::Syntax)),
                        };
                        self.temp.push(decoded);
                        self.scratch_flush_if_full(cs, h)?;
                        cs.bump();
                        st = State::Str2;
                    }
                },
                // \uXXXX
                State::Str4 | State::Str5 | State::Str6 | State::Str7 => match cs.peek() {
                    None => return self.stall(st),
                    Some(c) => {
                        let d = scan::hex_digit(c);
                        if d < 0 {
                            return Err(self.err(cs, ErrorKind::ExpectedHexDigit));
                        }
                        cs.bump();
                        let d = d as u16;
                        st = match st {
                            State::Str4 => {
                                self.u1 = d << 12;
                                State::Str5
                            }
                            State::Str5 => {
                                self.u1 += d << 8;
                                State::Str6
                            }
                            State::Str6 => {
                                self.u1 += d << 4;
                                State::Str7
                            }
                            _ => {
                                self.u1 += d;
                                if !(0xd800..=0xdfff).contains(&self.u1) {
                                    scan::append_utf8(&mut self.temp, self.u1 as u32);
                                    self.scratch_flush_if_full(cs, h)?;
                                    State::Str2
                                } else if self.u1 > 0xdbff {
                                    return Err(self.err(cs, ErrorKind::IllegalLeadingSurrogate));
                                } else {
                                    State::Sur1
                                }
                            }
                        };
                    }
                },
                // low surrogate: expect "\u" then four hex digits
                State::Sur1 => match cs.peek() {
                    None => return self.stall(State::Sur1),
                    Some(b'\\') => {
                        cs.bump();
                        st = State::Sur2;
                    }
                    Some(_) => return Err(self.err(cs, ErrorKind::Syntax)),
                },
                State::Sur2 => match cs.peek() {
                    None => return self.stall(State::Sur2),
                    Some(b'u') => {
                        cs.bump();
                        st = State::Sur3;
                    }
                    Some(_) => return Err(self.err(cs, ErrorKind::Syntax)),
                },
                State::Sur3 | State::Sur4 | State::Sur5 | State::Sur6 => match cs.peek() {
                    None => return self.stall(st),
                    Some(c) => {
                        let d = scan::hex_digit(c);
                        if d < 0 {
                            return Err(self.err(cs, ErrorKind::ExpectedHexDigit));
                        }
                        cs.bump();
                        let d = d as u16;
                        st = match st {
                            State::Sur3 => {
                                self.u2 = d << 12;
                                State::Sur4
                            }
                            State::Sur4 => {
                                self.u2 += d << 8;
                                State::Sur5
                            }
                            State::Sur5 => {
                                self.u2 += d << 4;
                                State::Sur6
                            }
                            _ => {
                                self.u2 += d;
                                if !(0xdc00..=0xdfff).contains(&self.u2) {
                                    return Err(self.err(cs, ErrorKind::IllegalTrailingSurrogate));
                                }
                                let cp = 0x10000
                                    + (((self.u1 as u32) - 0xd800) << 10)
                                    + ((self.u2 as u32) - 0xdc00);
                                scan::append_utf8(&mut self.temp, cp);
                                self.scratch_flush_if_full(cs, h)?;
                                State::Str2
                            }
                        };
                    }
                },
                _ => unreachable!(),
            }
        }
    }

    /// Unquoted key: `[A-Za-z_$][A-Za-z0-9_$]*`, extension mode only.
    fn parse_unquoted_key<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        fn ident_cont(c: u8) -> bool {
            c.is_ascii_alphanumeric() || c == b'_' || c == b'$'
        }
        let _ = self.resume_in(|s| s == State::UKy1);
        let start = cs.pos;
        loop {
            match cs.peek() {
                None => {
                    let span = cs.span(start);
                    self.deliver_part(cs, h, span)?;
                    return self.stall(State::UKy1);
                }
                Some(c) if ident_cont(c) => cs.bump(),
                Some(_) => {
                    let span = cs.span(start);
                    self.deliver_final(cs, h, span)?;
                    return Ok(Status::Done);
                }
            }
        }
    }

    /// Dispatches a key: quoted string, or an identifier when enabled.
    fn parse_key<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        if let Some(&top) = self.st.last() {
            if top == State::UKy1 {
                return self.parse_unquoted_key(cs, h);
            }
            return self.parse_string(cs, h);
        }
        match cs.peek() {
            Some(b'"') => self.parse_string(cs, h),
            Some(c)
                if self.opts.allow_unquoted_keys
                    && (c.is_ascii_alphabetic() || c == b'_' || c == b'$') =>
            {
                self.parse_unquoted_key(cs, h)
            }
            Some(_) => Err(self.err(cs, ErrorKind::Syntax)),
            None => Ok(Status::Partial),
        }
    }

    fn parse_object<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let mut n;
        let mut st = match self.resume_in(|s| {
            matches!(
                s,
                State::Obj1
                    | State::Obj2
                    | State::Obj3
                    | State::Obj4
                    | State::Obj5
                    | State::Obj6
                    | State::Obj7
            )
        }) {
            Some(s) => {
                n = self.counts.pop().expect("count stack underflow");
                s
            }
            None => {
                debug_assert_eq!(cs.peek(), Some(b'{'));
                if self.depth >= self.opts.max_depth {
                    return Err(self.err(cs, ErrorKind::TooDeep));
                }
                self.depth += 1;
                h.on_object_begin().map_err(|k| self.err(cs, k))?;
                cs.bump();
                n = 0;
                State::Obj1
            }
        };
        loop {
            match st {
                State::Obj1 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Obj1, n);
                    }
                    if cs.peek() == Some(b'}') {
                        h.on_object_end(n).map_err(|k| self.err(cs, k))?;
                        self.depth -= 1;
                        cs.bump();
                        return Ok(Status::Done);
                    }
                    self.is_key = true;
                    st = State::Obj2;
                }
                State::Obj2 => {
                    match self.parse_key(cs, h)? {
                        Status::Partial => return self.stall_n(State::Obj2, n),
                        Status::Done => {}
                    }
                    st = State::Obj3;
                }
                State::Obj3 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Obj3, n);
                    }
                    if cs.peek() != Some(b':') {
                        return Err(self.err(cs, ErrorKind::Syntax));
                    }
                    cs.bump();
                    st = State::Obj4;
                }
                State::Obj4 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Obj4, n);
                    }
                    st = State::Obj5;
                }
                State::Obj5 => {
                    match self.parse_value(cs, h)? {
                        Status::Partial => return self.stall_n(State::Obj5, n),
                        Status::Done => n += 1,
                    }
                    st = State::Obj6;
                }
                State::Obj6 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Obj6, n);
                    }
                    match cs.peek() {
                        Some(b',') => {
                            cs.bump();
                            st = State::Obj7;
                        }
                        Some(b'}') => {
                            h.on_object_end(n).map_err(|k| self.err(cs, k))?;
                            self.depth -= 1;
                            cs.bump();
                            return Ok(Status::Done);
                        }
                        _ => return Err(self.err(cs, ErrorKind::Syntax)),
                    }
                }
                State::Obj7 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Obj7, n);
                    }
                    if cs.peek() == Some(b'}') && self.opts.allow_trailing_commas {
                        h.on_object_end(n).map_err(|k| self.err(cs, k))?;
                        self.depth -= 1;
                        cs.bump();
                        return Ok(Status::Done);
                    }
                    self.is_key = true;
                    st = State::Obj2;
                }
                _ => unreachable!(),
            }
        }
    }

    fn parse_array<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let mut n;
        let mut st = match self
            .resume_in(|s| matches!(s, State::Arr1 | State::Arr2 | State::Arr3 | State::Arr4))
        {
            Some(s) => {
                n = self.counts.pop().expect("count stack underflow");
                s
            }
            None => {
                debug_assert_eq!(cs.peek(), Some(b'['));
                if self.depth >= self.opts.max_depth {
                    return Err(self.err(cs, ErrorKind::TooDeep));
                }
                self.depth += 1;
                h.on_array_begin().map_err(|k| self.err(cs, k))?;
                cs.bump();
                n = 0;
                State::Arr1
            }
        };
        loop {
            match st {
                State::Arr1 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Arr1, n);
                    }
                    if cs.peek() == Some(b']') {
                        h.on_array_end(n).map_err(|k| self.err(cs, k))?;
                        self.depth -= 1;
                        cs.bump();
                        return Ok(Status::Done);
                    }
                    st = State::Arr2;
                }
                State::Arr2 => {
                    match self.parse_value(cs, h)? {
                        Status::Partial => return self.stall_n(State::Arr2, n),
                        Status::Done => n += 1,
                    }
                    st = State::Arr3;
                }
                State::Arr3 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Arr3, n);
                    }
                    match cs.peek() {
                        Some(b',') => {
                            cs.bump();
                            st = State::Arr4;
                        }
                        Some(b']') => {
                            h.on_array_end(n).map_err(|k| self.err(cs, k))?;
                            self.depth -= 1;
                            cs.bump();
                            return Ok(Status::Done);
                        }
                        _ => return Err(self.err(cs, ErrorKind::Syntax)),
                    }
                }
                State::Arr4 => {
                    if self.parse_filler(cs, h)? == Status::Partial {
                        return self.stall_n(State::Arr4, n);
                    }
                    if cs.peek() == Some(b']') && self.opts.allow_trailing_commas {
                        h.on_array_end(n).map_err(|k| self.err(cs, k))?;
                        self.depth -= 1;
                        cs.bump();
                        return Ok(Status::Done);
                    }
                    st = State::Arr2;
                }
                _ => unreachable!(),
            }
        }
    }

    /// Suspends a number production, saving the partial record and, in
    /// precise mode, the raw text consumed so far.
    #[inline]
    fn stall_num(&mut self, cs: &Cursor, num_start: usize, st: State, num: Num) -> R {
        if self.opts.numbers == NumberMode::Precise {
            self.num_text.extend_from_slice(cs.span(num_start));
        }
        self.num = num;
        self.stall(st)
    }

    fn finish_int<H: Handler>(&mut self, cs: &Cursor, h: &mut H, num: Num) -> R {
        let r = if num.neg {
            h.on_int64(num.mant.wrapping_neg() as i64)
        } else if num.mant <= i64::MAX as u64 {
            h.on_int64(num.mant as i64)
        } else {
            h.on_uint64(num.mant)
        };
        r.map_err(|k| self.err(cs, k))?;
        Ok(Status::Done)
    }

    fn finish_double<H: Handler>(
        &mut self,
        cs: &Cursor,
        h: &mut H,
        num_start: usize,
        num: Num,
    ) -> R {
        let d = if self.opts.numbers == NumberMode::Precise {
            self.num_text.extend_from_slice(cs.span(num_start));
            let text = core::mem::take(&mut self.num_text);
            h.on_number_part(&text).map_err(|k| self.err(cs, k))?;
            let d = number::parse_precise(&text);
            self.num_text = text;
            self.num_text.clear();
            d
        } else {
            let e = num.bias as i64
                + if num.exp_neg {
                    -(num.exp as i64)
                } else {
                    num.exp as i64
                };
            number::dec_to_double(num.mant, e.clamp(-400, 400) as i32, num.neg)
        };
        h.on_double(d).map_err(|k| self.err(cs, k))?;
        Ok(Status::Done)
    }

    fn parse_number<H: Handler>(&mut self, cs: &mut Cursor, h: &mut H) -> R {
        let num_start = cs.pos;
        let mut num = Num::default();
        let mut st = State::Num1;
        match self.resume_in(|s| {
            matches!(
                s,
                State::Num1
                    | State::Num2
                    | State::Num3
                    | State::Num4
                    | State::Num5
                    | State::Num6
                    | State::Num7
                    | State::Num8
                    | State::Exp1
                    | State::Exp2
                    | State::Exp3
            )
        }) {
            Some(s) => {
                num = self.num;
                st = s;
            }
            None => {
                self.num_text.clear();
                if cs.peek() == Some(b'-') {
                    cs.bump();
                    num.neg = true;
                    if cs.peek() == Some(b'I') && self.opts.allow_infinity_and_nan {
                        cs.bump();
                        self.num = num;
                        return self.parse_infinity(cs, h);
                    }
                }
                // fast path: enough lookahead that no end-of-input checks
                // are needed for `digits . digits`
                let rest = cs.rest();
                if rest.len() >= NUMBER_FAST_WINDOW {
                    let n1;
                    if rest[0] != b'0' {
                        n1 = scan::count_digits(rest);
                        if n1 == 0 {
                            return Err(self.err(cs, ErrorKind::ExpectedMantissa));
                        }
                        num.mant = scan::parse_digits(0, &rest[..n1]);
                        cs.skip(n1);
                    } else {
                        n1 = 0;
                        num.mant = 0;
                        cs.bump();
                    }
                    if n1 == 16 {
                        st = State::Num2;
                    } else if cs.peek() != Some(b'.') {
                        st = State::Num6;
                    } else {
                        cs.bump();
                        let frac = cs.rest();
                        let n2 = scan::count_digits(frac);
                        if n2 == 0 {
                            return Err(self.err(cs, ErrorKind::ExpectedFraction));
                        }
                        if n1 + n2 >= 19 {
                            // possible precision overflow; the
                            // significant-fraction loop caps the mantissa
                            // at 2^53-1
                            st = State::Num8;
                        } else {
                            num.mant = scan::parse_digits(num.mant, &frac[..n2]);
                            num.bias -= n2 as i32;
                            cs.skip(n2);
                            match cs.peek() {
                                Some(c) if is_e(c) => {
                                    cs.bump();
                                    st = State::Exp1;
                                }
                                Some(c) if c.is_ascii_digit() => st = State::Num8,
                                _ => return self.finish_double(cs, h, num_start, num),
                            }
                        }
                    }
                }
            }
        }
        loop {
            match st {
                // first digit
                State::Num1 => match cs.peek() {
                    Some(c @ b'1'..=b'9') => {
                        cs.bump();
                        num.mant = (c - b'0') as u64;
                        st = State::Num2;
                    }
                    Some(b'0') => {
                        cs.bump();
                        num.mant = 0;
                        st = State::Num6;
                    }
                    // "-Infinity" resuming right after the sign
                    Some(b'I') if num.neg && self.opts.allow_infinity_and_nan => {
                        cs.bump();
                        self.num = num;
                        return self.parse_infinity(cs, h);
                    }
                    Some(_) => return Err(self.err(cs, ErrorKind::ExpectedMantissa)),
                    None => return self.stall_num(cs, num_start, State::Num1, num),
                },
                // significant digits left of the decimal point
                State::Num2 => {
                    // last digit of i64::MIN is '8', of u64::MAX is '5'
                    let limit = if num.neg { (i64::MAX as u64) / 10 } else { u64::MAX / 10 };
                    let last = if num.neg { b'8' } else { b'5' };
                    loop {
                        match cs.peek() {
                            Some(c) if c.is_ascii_digit() => {
                                cs.bump();
                                if num.mant > limit || (num.mant == limit && c > last) {
                                    num.bias += 1;
                                    st = State::Num3;
                                    break;
                                }
                                num.mant = 10 * num.mant + (c - b'0') as u64;
                            }
                            Some(_) => {
                                st = State::Num6;
                                break;
                            }
                            None => {
                                if self.more {
                                    return self.stall_num(cs, num_start, State::Num2, num);
                                }
                                return self.finish_int(cs, h, num);
                            }
                        }
                    }
                }
                // non-significant digits left of the decimal point
                State::Num3 => loop {
                    match cs.peek() {
                        Some(c) if c.is_ascii_digit() => {
                            cs.bump();
                            num.bias += 1;
                        }
                        Some(b'.') => {
                            cs.bump();
                            st = State::Num4;
                            break;
                        }
                        Some(c) if is_e(c) => {
                            cs.bump();
                            st = State::Exp1;
                            break;
                        }
                        Some(_) => return self.finish_double(cs, h, num_start, num),
                        None => {
                            if self.more {
                                return self.stall_num(cs, num_start, State::Num3, num);
                            }
                            return self.finish_double(cs, h, num_start, num);
                        }
                    }
                },
                // first (non-significant) digit right of the point
                State::Num4 => match cs.peek() {
                    Some(c) if c.is_ascii_digit() => {
                        cs.bump();
                        st = State::Num5;
                    }
                    Some(_) => return Err(self.err(cs, ErrorKind::ExpectedFraction)),
                    None => return self.stall_num(cs, num_start, State::Num4, num),
                },
                // non-significant fraction digits
                State::Num5 => loop {
                    match cs.peek() {
                        Some(c) if c.is_ascii_digit() => cs.bump(),
                        Some(c) if is_e(c) => {
                            cs.bump();
                            st = State::Exp1;
                            break;
                        }
                        Some(_) => return self.finish_double(cs, h, num_start, num),
                        None => {
                            if self.more {
                                return self.stall_num(cs, num_start, State::Num5, num);
                            }
                            return self.finish_double(cs, h, num_start, num);
                        }
                    }
                },
                // [.eE] after a complete integer mantissa
                State::Num6 => match cs.peek() {
                    Some(b'.') => {
                        cs.bump();
                        st = State::Num7;
                    }
                    Some(c) if is_e(c) => {
                        cs.bump();
                        st = State::Exp1;
                    }
                    Some(_) => return self.finish_int(cs, h, num),
                    None => {
                        if self.more {
                            return self.stall_num(cs, num_start, State::Num6, num);
                        }
                        return self.finish_int(cs, h, num);
                    }
                },
                // first significant fraction digit (check only)
                State::Num7 => match cs.peek() {
                    Some(c) if c.is_ascii_digit() => st = State::Num8,
                    Some(_) => return Err(self.err(cs, ErrorKind::ExpectedFraction)),
                    None => return self.stall_num(cs, num_start, State::Num7, num),
                },
                // significant fraction digits
                State::Num8 => loop {
                    match cs.peek() {
                        Some(c) if c.is_ascii_digit() => {
                            cs.bump();
                            if num.mant <= 9007199254740991 {
                                // 2^53-1
                                num.bias -= 1;
                                num.mant = 10 * num.mant + (c - b'0') as u64;
                            } else {
                                st = State::Num5;
                                break;
                            }
                        }
                        Some(c) if is_e(c) => {
                            cs.bump();
                            st = State::Exp1;
                            break;
                        }
                        Some(_) => return self.finish_double(cs, h, num_start, num),
                        None => {
                            if self.more {
                                return self.stall_num(cs, num_start, State::Num8, num);
                            }
                            return self.finish_double(cs, h, num_start, num);
                        }
                    }
                },
                // optional exponent sign
                State::Exp1 => match cs.peek() {
                    Some(b'+') => {
                        cs.bump();
                        st = State::Exp2;
                    }
                    Some(b'-') => {
                        cs.bump();
                        num.exp_neg = true;
                        st = State::Exp2;
                    }
                    Some(_) => st = State::Exp2,
                    None => return self.stall_num(cs, num_start, State::Exp1, num),
                },
                // first exponent digit
                State::Exp2 => match cs.peek() {
                    Some(c) if c.is_ascii_digit() => {
                        cs.bump();
                        num.exp = (c - b'0') as i32;
                        st = State::Exp3;
                    }
                    Some(_) => return Err(self.err(cs, ErrorKind::ExpectedExponent)),
                    None => return self.stall_num(cs, num_start, State::Exp2, num),
                },
                // subsequent exponent digits
                State::Exp3 => loop {
                    match cs.peek() {
                        Some(c) if c.is_ascii_digit() => {
                            if num.exp > 214748364 || (num.exp == 214748364 && c > b'7') {
                                return Err(self.err(cs, ErrorKind::ExponentOverflow));
                            }
                            cs.bump();
                            num.exp = 10 * num.exp + (c - b'0') as i32;
                        }
                        Some(_) => return self.finish_double(cs, h, num_start, num),
                        None => {
                            if self.more {
                                return self.stall_num(cs, num_start, State::Exp3, num);
                            }
                            return self.finish_double(cs, h, num_start, num);
                        }
                    }
                },
                _ => unreachable!(),
            }
        }
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Ev {
        DocB,
        DocE,
        ObjB,
        ObjE(usize),
        ArrB,
        ArrE(usize),
        KeyPart(Vec<u8>),
        Key(Vec<u8>),
        StrPart(Vec<u8>),
        Str(Vec<u8>),
        I(i64),
        U(u64),
        D(u64), // f64 bits, for exact comparison
        B(bool),
        Null,
    }

    use Ev::*;

    /// Records the event sequence for comparison.
    #[derive(Default)]
    struct Record {
        events: Vec<Ev>,
    }

    impl Handler for Record {
        fn on_document_begin(&mut self) -> Result<(), ErrorKind> {
            self.events.push(DocB);
            Ok(())
        }
        fn on_document_end(&mut self) -> Result<(), ErrorKind> {
            self.events.push(DocE);
            Ok(())
        }
        fn on_object_begin(&mut self) -> Result<(), ErrorKind> {
            self.events.push(ObjB);
            Ok(())
        }
        fn on_object_end(&mut self, n: usize) -> Result<(), ErrorKind> {
            self.events.push(ObjE(n));
            Ok(())
        }
        fn on_array_begin(&mut self) -> Result<(), ErrorKind> {
            self.events.push(ArrB);
            Ok(())
        }
        fn on_array_end(&mut self, n: usize) -> Result<(), ErrorKind> {
            self.events.push(ArrE(n));
            Ok(())
        }
        fn on_key_part(&mut self, p: &[u8]) -> Result<(), ErrorKind> {
            self.events.push(KeyPart(p.to_vec()));
            Ok(())
        }
        fn on_key(&mut self, p: &[u8]) -> Result<(), ErrorKind> {
            self.events.push(Key(p.to_vec()));
            Ok(())
        }
        fn on_string_part(&mut self, p: &[u8]) -> Result<(), ErrorKind> {
            self.events.push(StrPart(p.to_vec()));
            Ok(())
        }
        fn on_string(&mut self, p: &[u8]) -> Result<(), ErrorKind> {
            self.events.push(Str(p.to_vec()));
            Ok(())
        }
        fn on_int64(&mut self, v: i64) -> Result<(), ErrorKind> {
            self.events.push(I(v));
            Ok(())
        }
        fn on_uint64(&mut self, v: u64) -> Result<(), ErrorKind> {
            self.events.push(U(v));
            Ok(())
        }
        fn on_double(&mut self, v: f64) -> Result<(), ErrorKind> {
            self.events.push(D(v.to_bits()));
            Ok(())
        }
        fn on_bool(&mut self, v: bool) -> Result<(), ErrorKind> {
            self.events.push(B(v));
            Ok(())
        }
        fn on_null(&mut self) -> Result<(), ErrorKind> {
            self.events.push(Null);
            Ok(())
        }
    }

    fn key(s: &str) -> Ev {
        Key(s.as_bytes().to_vec())
    }

    fn string(s: &str) -> Ev {
        Str(s.as_bytes().to_vec())
    }

    fn d(v: f64) -> Ev {
        D(v.to_bits())
    }

    /// Merges part-segments into their final event so event sequences can
    /// be compared across different input slicings.
    fn coalesce(evs: Vec<Ev>) -> Vec<Ev> {
        let mut out = Vec::new();
        let mut buf: Vec<u8> = Vec::new();
        for e in evs {
            match e {
                StrPart(p) | KeyPart(p) => buf.extend_from_slice(&p),
                Str(p) => {
                    buf.extend_from_slice(&p);
                    out.push(Str(core::mem::take(&mut buf)));
                }
                Key(p) => {
                    buf.extend_from_slice(&p);
                    out.push(Key(core::mem::take(&mut buf)));
                }
                other => out.push(other),
            }
        }
        out
    }

    fn events_oneshot(input: &[u8]) -> Vec<Ev> {
        let mut h = Record::default();
        let mut p = Parser::new();
        p.write_some(false, input, &mut h).unwrap();
        assert!(p.is_done());
        h.events
    }

    #[test]
    fn scalar_events() {
        assert_eq!(events_oneshot(b"null"), [DocB, Null, DocE]);
        assert_eq!(events_oneshot(b"true"), [DocB, B(true), DocE]);
        assert_eq!(events_oneshot(b"false"), [DocB, B(false), DocE]);
        assert_eq!(events_oneshot(b" -12 "), [DocB, I(-12), DocE]);
        assert_eq!(
            events_oneshot(b"18446744073709551615"),
            [DocB, U(u64::MAX), DocE]
        );
        assert_eq!(events_oneshot(b"1.5"), [DocB, d(1.5), DocE]);
        assert_eq!(events_oneshot(b"-0.0"), [DocB, d(-0.0), DocE]);
    }

    #[test]
    fn structure_events() {
        assert_eq!(
            events_oneshot(br#"{"a":[1,2],"b":null}"#),
            [
                DocB,
                ObjB,
                key("a"),
                ArrB,
                I(1),
                I(2),
                ArrE(2),
                key("b"),
                Null,
                ObjE(2),
                DocE
            ]
        );
    }

    #[test]
    fn escapes_decode() {
        assert_eq!(
            coalesce(events_oneshot(br#""a\n\t\"\\Ab""#)),
            [DocB, string("a\n\t\"\\Ab"), DocE]
        );
    }

    #[test]
    fn event_sequence_is_slice_independent() {
        let input = r#"{"name":"millér","tags":[1,2.5,true,null],"n":-3}"#.as_bytes();
        let whole = coalesce(events_oneshot(input));
        for split in 1..input.len() {
            let mut h = Record::default();
            let mut p = Parser::new();
            p.write_some(true, &input[..split], &mut h).unwrap();
            p.write_some(false, &input[split..], &mut h).unwrap();
            assert!(p.is_done(), "split at {split}");
            assert_eq!(coalesce(h.events), whole, "split at {split}");
        }
    }

    #[test]
    fn bare_scalar_without_trailing_whitespace() {
        let mut h = Record::default();
        let mut p = Parser::new();
        // incremental feed, then signal end with no further bytes
        p.write_some(true, b"12", &mut h).unwrap();
        assert!(!p.is_done());
        p.write_some(false, b"", &mut h).unwrap();
        assert!(p.is_done());
        assert_eq!(h.events, [DocB, I(12), DocE]);
    }

    #[test]
    fn depth_limit() {
        let opts = ParseOptions {
            max_depth: 3,
            ..ParseOptions::default()
        };
        let mut p = Parser::with_options(opts);
        let err = p
            .write_some(false, b"[[[[0]]]]", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TooDeep);
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn incomplete_reported_when_no_more_input() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, b"[1,2", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Incomplete);
    }

    #[test]
    fn surrogate_pair_decodes_to_utf8() {
        assert_eq!(
            events_oneshot("\"😀\"".as_bytes()),
            [DocB, string("\u{1f600}"), DocE]
        );
    }

    #[test]
    fn lone_surrogates_are_errors() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, br#""\uDE00""#, &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalLeadingSurrogate);

        let mut p = Parser::new();
        let err = p
            .write_some(false, br#""\uD83DA""#, &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalTrailingSurrogate);
    }

    #[test]
    fn hex_escape_requires_hex() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, br#""\uD8ZZ""#, &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExpectedHexDigit);
    }

    #[test]
    fn invalid_utf8_rejected_by_default() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, b"\"\xc0\xaf\"", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUtf8);

        let opts = ParseOptions {
            allow_invalid_utf8: true,
            ..ParseOptions::default()
        };
        let mut p = Parser::with_options(opts);
        p.write_some(false, b"\"\xc0\xaf\"", &mut Record::default())
            .unwrap();
        assert!(p.is_done());
    }

    #[test]
    fn comments_only_when_enabled() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, b"[1, // x\n 2]", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let opts = ParseOptions {
            allow_comments: true,
            ..ParseOptions::default()
        };
        let mut h = Record::default();
        let mut p = Parser::with_options(opts);
        p.write_some(false, b"[1, /* mid */ 2] // tail", &mut h)
            .unwrap();
        assert!(p.is_done());
        assert_eq!(h.events, [DocB, ArrB, I(1), I(2), ArrE(2), DocE]);
    }

    #[test]
    fn trailing_commas_only_when_enabled() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, b"[1,2,]", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let opts = ParseOptions {
            allow_trailing_commas: true,
            ..ParseOptions::default()
        };
        let mut h = Record::default();
        let mut p = Parser::with_options(opts);
        p.write_some(false, br#"{"a":1,}"#, &mut h).unwrap();
        assert_eq!(h.events, [DocB, ObjB, key("a"), I(1), ObjE(1), DocE]);
    }

    #[test]
    fn unquoted_keys_extension() {
        let opts = ParseOptions {
            allow_unquoted_keys: true,
            ..ParseOptions::default()
        };
        let mut h = Record::default();
        let mut p = Parser::with_options(opts);
        p.write_some(false, b"{a_1:1,$b:2}", &mut h).unwrap();
        assert_eq!(
            h.events,
            [DocB, ObjB, key("a_1"), I(1), key("$b"), I(2), ObjE(2), DocE]
        );
    }

    #[test]
    fn non_finite_tokens_extension() {
        let opts = ParseOptions {
            allow_infinity_and_nan: true,
            ..ParseOptions::default()
        };
        let mut h = Record::default();
        let mut p = Parser::with_options(opts);
        p.write_some(false, b"[Infinity,-Infinity,NaN]", &mut h)
            .unwrap();
        assert_eq!(
            h.events,
            [
                DocB,
                ArrB,
                d(f64::INFINITY),
                d(f64::NEG_INFINITY),
                d(f64::NAN),
                ArrE(3),
                DocE
            ]
        );

        let mut p = Parser::new();
        let err = p
            .write_some(false, b"Infinity", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        // the sign and the token may arrive in separate buffers
        let mut h = Record::default();
        let mut p = Parser::with_options(opts);
        p.write_some(true, b"-", &mut h).unwrap();
        p.write_some(false, b"Infinity", &mut h).unwrap();
        assert_eq!(h.events, [DocB, d(f64::NEG_INFINITY), DocE]);
    }

    #[test]
    fn numbers_mode_none_rejects_numbers() {
        let opts = ParseOptions {
            numbers: NumberMode::None,
            ..ParseOptions::default()
        };
        let mut p = Parser::with_options(opts);
        let err = p
            .write_some(false, b"[1]", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
    }

    #[test]
    fn exponent_overflow() {
        let mut p = Parser::new();
        let err = p
            .write_some(false, b"1e99999999999", &mut Record::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExponentOverflow);
    }

    #[test]
    fn huge_integer_becomes_double() {
        let evs = events_oneshot(b"123456789012345678901234567890");
        assert_eq!(evs.len(), 3);
        let bits = match &evs[1] {
            D(b) => *b,
            other => panic!("expected double, got {other:?}"),
        };
        let v = f64::from_bits(bits);
        let expect = 123456789012345678901234567890f64;
        assert!((v - expect).abs() <= expect * 1e-15);
    }

    #[test]
    fn min_int64_is_signed() {
        assert_eq!(
            events_oneshot(b"-9223372036854775808"),
            [DocB, I(i64::MIN), DocE]
        );
        // one past the signed range goes to double
        let evs = events_oneshot(b"-9223372036854775809");
        assert!(matches!(evs[1], D(_)));
    }

    #[test]
    fn precise_mode_is_correctly_rounded() {
        let opts = ParseOptions {
            numbers: NumberMode::Precise,
            ..ParseOptions::default()
        };
        let mut h = Record::default();
        let mut p = Parser::with_options(opts);
        p.write_some(false, b"2.2250738585072011e-308", &mut h)
            .unwrap();
        assert_eq!(h.events[1], d(2.2250738585072011e-308));
    }

    #[test]
    fn precise_mode_survives_suspension() {
        let opts = ParseOptions {
            numbers: NumberMode::Precise,
            ..ParseOptions::default()
        };
        let input = b"2.2250738585072011e-308";
        for split in 1..input.len() {
            let mut h = Record::default();
            let mut p = Parser::with_options(opts);
            p.write_some(true, &input[..split], &mut h).unwrap();
            p.write_some(false, &input[split..], &mut h).unwrap();
            assert!(p.is_done());
            assert_eq!(*h.events.last().unwrap(), DocE);
            assert_eq!(h.events[h.events.len() - 2], d(2.2250738585072011e-308));
        }
    }

    #[test]
    fn error_offsets_are_absolute() {
        let mut p = Parser::new();
        let mut h = Record::default();
        p.write_some(true, b"[1,", &mut h).unwrap();
        let err = p.write_some(true, b"2,x", &mut h).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert_eq!(err.offset(), 5);
    }

    #[test]
    fn zero_copy_single_event_for_clean_strings() {
        let mut h = Record::default();
        let mut p = Parser::new();
        p.write_some(false, br#""plain string""#, &mut h).unwrap();
        assert_eq!(h.events, [DocB, string("plain string"), DocE]);
        // exactly one string event, no parts
        assert!(!h.events.iter().any(|e| matches!(e, StrPart(_))));
    }
}
