//! Parsing directly into user types.
//!
//! [`parse_into`] builds a `T` straight from parse events, with no value
//! tree in between. Every target type carries a builder
//! ([`FromParse::Builder`]) that consumes [`Event`]s; composite builders
//! own their element builders by value, so the whole stack is dispatched
//! statically, with its shape mirroring the target type's shape.
//!
//! Provided targets: `bool`, fixed-width integers (range checked),
//! floats (integers convert lossily), `String`, `Vec<T>`, `[T; N]`,
//! tuples to arity four, `Option<T>` (JSON `null` maps to `None`),
//! `BTreeMap<String, V>` / `HashMap<String, V>`, and any struct
//! described with [`reflect!`](crate::reflect).

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, ErrorKind};
use crate::handler::Handler;
use crate::options::ParseOptions;
use crate::parser::Parser;

/// One parse event, routed down the builder stack.
#[derive(Clone, Copy, Debug)]
pub enum Event<'a> {
    Null,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    StringPart(&'a [u8]),
    String(&'a [u8]),
    KeyPart(&'a [u8]),
    Key(&'a [u8]),
    ArrayBegin,
    ArrayEnd(usize),
    ObjectBegin,
    ObjectEnd(usize),
}

/// Whether a builder completed its value with the event it was given.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    More,
    Done,
}

/// An event sink producing one value of type `Output`.
pub trait BuildHandler: Default {
    type Output;

    /// The error reported when an event has the wrong shape for the
    /// target.
    fn expected(&self) -> ErrorKind;

    /// Consumes one event; `Step::Done` means the value is complete.
    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind>;

    /// Takes the completed value out of the builder.
    fn finish(&mut self) -> Result<Self::Output, ErrorKind>;
}

/// A type that can be built directly from parse events.
pub trait FromParse: Sized {
    type Builder: BuildHandler<Output = Self>;
}

// ---------------------------------------------------------------------
// scalars

#[derive(Default)]
pub struct BoolBuilder {
    v: Option<bool>,
}

impl BuildHandler for BoolBuilder {
    type Output = bool;

    fn expected(&self) -> ErrorKind {
        ErrorKind::ExpectedBool
    }

    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
        match ev {
            Event::Bool(v) => {
                self.v = Some(v);
                Ok(Step::Done)
            }
            _ => Err(self.expected()),
        }
    }

    fn finish(&mut self) -> Result<bool, ErrorKind> {
        self.v.take().ok_or(ErrorKind::ExpectedBool)
    }
}

impl FromParse for bool {
    type Builder = BoolBuilder;
}

macro_rules! int_from_parse {
    ($($ty:ty => $name:ident,)+) => {$(
        #[derive(Default)]
        pub struct $name {
            v: Option<$ty>,
        }

        impl BuildHandler for $name {
            type Output = $ty;

            fn expected(&self) -> ErrorKind {
                ErrorKind::ExpectedInt
            }

            fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
                let v = match ev {
                    Event::Int64(v) => {
                        <$ty>::try_from(v).map_err(|_| ErrorKind::NumberOutOfRange)?
                    }
                    Event::Uint64(v) => {
                        <$ty>::try_from(v).map_err(|_| ErrorKind::NumberOutOfRange)?
                    }
                    _ => return Err(self.expected()),
                };
                self.v = Some(v);
                Ok(Step::Done)
            }

            fn finish(&mut self) -> Result<$ty, ErrorKind> {
                self.v.take().ok_or(ErrorKind::ExpectedInt)
            }
        }

        impl FromParse for $ty {
            type Builder = $name;
        }
    )+};
}

int_from_parse! {
    i8 => I8Builder,
    i16 => I16Builder,
    i32 => I32Builder,
    i64 => I64Builder,
    isize => IsizeBuilder,
    u8 => U8Builder,
    u16 => U16Builder,
    u32 => U32Builder,
    u64 => U64Builder,
    usize => UsizeBuilder,
}

macro_rules! float_from_parse {
    ($($ty:ty => $name:ident,)+) => {$(
        #[derive(Default)]
        pub struct $name {
            v: Option<$ty>,
        }

        impl BuildHandler for $name {
            type Output = $ty;

            fn expected(&self) -> ErrorKind {
                ErrorKind::ExpectedNumber
            }

            fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
                // integers convert, possibly losing precision
                let v = match ev {
                    Event::Int64(v) => v as $ty,
                    Event::Uint64(v) => v as $ty,
                    Event::Double(v) => v as $ty,
                    _ => return Err(self.expected()),
                };
                self.v = Some(v);
                Ok(Step::Done)
            }

            fn finish(&mut self) -> Result<$ty, ErrorKind> {
                self.v.take().ok_or(ErrorKind::ExpectedNumber)
            }
        }

        impl FromParse for $ty {
            type Builder = $name;
        }
    )+};
}

float_from_parse! {
    f32 => F32Builder,
    f64 => F64Builder,
}

#[derive(Default)]
pub struct StringBuilder {
    buf: Vec<u8>,
    v: Option<String>,
}

impl BuildHandler for StringBuilder {
    type Output = String;

    fn expected(&self) -> ErrorKind {
        ErrorKind::ExpectedString
    }

    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
        match ev {
            Event::StringPart(p) => {
                self.buf.extend_from_slice(p);
                Ok(Step::More)
            }
            Event::String(p) => {
                self.buf.extend_from_slice(p);
                let bytes = core::mem::take(&mut self.buf);
                let s = String::from_utf8(bytes).map_err(|_| ErrorKind::InvalidUtf8)?;
                self.v = Some(s);
                Ok(Step::Done)
            }
            _ => Err(self.expected()),
        }
    }

    fn finish(&mut self) -> Result<String, ErrorKind> {
        self.v.take().ok_or(ErrorKind::ExpectedString)
    }
}

impl FromParse for String {
    type Builder = StringBuilder;
}

// ---------------------------------------------------------------------
// option

pub struct OptionBuilder<T: FromParse> {
    inner: Option<T::Builder>,
    v: Option<Option<T>>,
}

impl<T: FromParse> Default for OptionBuilder<T> {
    fn default() -> Self {
        OptionBuilder {
            inner: None,
            v: None,
        }
    }
}

impl<T: FromParse> BuildHandler for OptionBuilder<T> {
    type Output = Option<T>;

    fn expected(&self) -> ErrorKind {
        T::Builder::default().expected()
    }

    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
        match ev {
            Event::Null if self.inner.is_none() => {
                self.v = Some(None);
                Ok(Step::Done)
            }
            ev => {
                let step = self
                    .inner
                    .get_or_insert_with(Default::default)
                    .on_event(ev)?;
                if let Step::Done = step {
                    let v = match self.inner.as_mut() {
                        Some(b) => b.finish()?,
                        None => return Err(ErrorKind::Syntax),
                    };
                    self.inner = None;
                    self.v = Some(Some(v));
                    return Ok(Step::Done);
                }
                Ok(Step::More)
            }
        }
    }

    fn finish(&mut self) -> Result<Option<T>, ErrorKind> {
        self.v.take().ok_or_else(|| self.expected())
    }
}

impl<T: FromParse> FromParse for Option<T> {
    type Builder = OptionBuilder<T>;
}

// ---------------------------------------------------------------------
// sequences

pub struct VecBuilder<T: FromParse> {
    out: Vec<T>,
    inner: Option<T::Builder>,
    open: bool,
    done: bool,
}

impl<T: FromParse> Default for VecBuilder<T> {
    fn default() -> Self {
        VecBuilder {
            out: Vec::new(),
            inner: None,
            open: false,
            done: false,
        }
    }
}

impl<T: FromParse> VecBuilder<T> {
    fn absorb(&mut self, step: Step) -> Result<Step, ErrorKind> {
        if let Step::Done = step {
            let v = match self.inner.as_mut() {
                Some(b) => b.finish()?,
                None => return Err(ErrorKind::Syntax),
            };
            self.inner = None;
            self.out.push(v);
        }
        Ok(Step::More)
    }
}

impl<T: FromParse> BuildHandler for VecBuilder<T> {
    type Output = Vec<T>;

    fn expected(&self) -> ErrorKind {
        ErrorKind::ExpectedArray
    }

    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
        match ev {
            Event::ArrayBegin if !self.open => {
                self.open = true;
                Ok(Step::More)
            }
            _ if !self.open => Err(self.expected()),
            Event::ArrayEnd(_) if self.inner.is_none() => {
                self.done = true;
                Ok(Step::Done)
            }
            ev => {
                let step = self
                    .inner
                    .get_or_insert_with(Default::default)
                    .on_event(ev)?;
                self.absorb(step)
            }
        }
    }

    fn finish(&mut self) -> Result<Vec<T>, ErrorKind> {
        if !self.done {
            return Err(self.expected());
        }
        self.done = false;
        self.open = false;
        Ok(core::mem::take(&mut self.out))
    }
}

impl<T: FromParse> FromParse for Vec<T> {
    type Builder = VecBuilder<T>;
}

/// Fixed-size arrays: the element count must match exactly.
pub struct ArrayBuilder<T: FromParse, const N: usize> {
    seq: VecBuilder<T>,
}

impl<T: FromParse, const N: usize> Default for ArrayBuilder<T, N> {
    fn default() -> Self {
        ArrayBuilder {
            seq: VecBuilder::default(),
        }
    }
}

impl<T: FromParse, const N: usize> BuildHandler for ArrayBuilder<T, N> {
    type Output = [T; N];

    fn expected(&self) -> ErrorKind {
        ErrorKind::ExpectedArray
    }

    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
        let step = self.seq.on_event(ev)?;
        if self.seq.out.len() > N {
            return Err(ErrorKind::InvalidArraySize);
        }
        Ok(step)
    }

    fn finish(&mut self) -> Result<[T; N], ErrorKind> {
        self.seq
            .finish()?
            .try_into()
            .map_err(|_| ErrorKind::InvalidArraySize)
    }
}

impl<T: FromParse, const N: usize> FromParse for [T; N] {
    type Builder = ArrayBuilder<T, N>;
}

// ---------------------------------------------------------------------
// maps

/// A map the builder can emplace into. The first value written for a
/// key is kept.
pub trait MapLike: Default {
    type Val;

    fn put(&mut self, key: String, val: Self::Val);
}

impl<V> MapLike for BTreeMap<String, V> {
    type Val = V;

    fn put(&mut self, key: String, val: V) {
        self.entry(key).or_insert(val);
    }
}

impl<V> MapLike for HashMap<String, V> {
    type Val = V;

    fn put(&mut self, key: String, val: V) {
        self.entry(key).or_insert(val);
    }
}

pub struct MapBuilder<M: MapLike>
where
    M::Val: FromParse,
{
    out: M,
    key: Vec<u8>,
    have_key: bool,
    inner: Option<<M::Val as FromParse>::Builder>,
    open: bool,
    done: bool,
}

impl<M: MapLike> Default for MapBuilder<M>
where
    M::Val: FromParse,
{
    fn default() -> Self {
        MapBuilder {
            out: M::default(),
            key: Vec::new(),
            have_key: false,
            inner: None,
            open: false,
            done: false,
        }
    }
}

impl<M: MapLike> MapBuilder<M>
where
    M::Val: FromParse,
{
    fn absorb(&mut self, step: Step) -> Result<Step, ErrorKind> {
        if let Step::Done = step {
            let v = match self.inner.as_mut() {
                Some(b) => b.finish()?,
                None => return Err(ErrorKind::Syntax),
            };
            self.inner = None;
            let key = String::from_utf8(core::mem::take(&mut self.key))
                .map_err(|_| ErrorKind::InvalidUtf8)?;
            self.have_key = false;
            self.out.put(key, v);
        }
        Ok(Step::More)
    }
}

impl<M: MapLike> BuildHandler for MapBuilder<M>
where
    M::Val: FromParse,
{
    type Output = M;

    fn expected(&self) -> ErrorKind {
        ErrorKind::ExpectedObject
    }

    fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
        match ev {
            Event::ObjectBegin if !self.open => {
                self.open = true;
                Ok(Step::More)
            }
            _ if !self.open => Err(self.expected()),
            ev if self.inner.is_some() => {
                let step = match self.inner.as_mut() {
                    Some(b) => b.on_event(ev)?,
                    None => return Err(ErrorKind::Syntax),
                };
                self.absorb(step)
            }
            Event::KeyPart(p) => {
                self.key.extend_from_slice(p);
                Ok(Step::More)
            }
            Event::Key(p) => {
                self.key.extend_from_slice(p);
                self.have_key = true;
                Ok(Step::More)
            }
            Event::ObjectEnd(_) => {
                self.done = true;
                Ok(Step::Done)
            }
            ev if self.have_key => {
                let step = self
                    .inner
                    .get_or_insert_with(Default::default)
                    .on_event(ev)?;
                self.absorb(step)
            }
            _ => Err(self.expected()),
        }
    }

    fn finish(&mut self) -> Result<M, ErrorKind> {
        if !self.done {
            return Err(self.expected());
        }
        self.done = false;
        self.open = false;
        Ok(core::mem::take(&mut self.out))
    }
}

impl<V: FromParse> FromParse for BTreeMap<String, V> {
    type Builder = MapBuilder<BTreeMap<String, V>>;
}

impl<V: FromParse> FromParse for HashMap<String, V> {
    type Builder = MapBuilder<HashMap<String, V>>;
}

// ---------------------------------------------------------------------
// tuples

macro_rules! tuple_from_parse {
    ($name:ident; $arity:expr; $(($i:expr, $T:ident, $b:ident)),+) => {
        pub struct $name<$($T: FromParse),+> {
            open: bool,
            idx: usize,
            $($b: Option<$T::Builder>,)+
        }

        impl<$($T: FromParse),+> Default for $name<$($T),+> {
            fn default() -> Self {
                $name {
                    open: false,
                    idx: 0,
                    $($b: None,)+
                }
            }
        }

        impl<$($T: FromParse),+> $name<$($T),+> {
            /// True while the element at the current index is mid-build.
            fn engaged(&self) -> bool {
                $( if self.idx == $i { return self.$b.is_some(); } )+
                false
            }
        }

        impl<$($T: FromParse),+> BuildHandler for $name<$($T),+> {
            type Output = ($($T,)+);

            fn expected(&self) -> ErrorKind {
                ErrorKind::ExpectedArray
            }

            fn on_event(&mut self, ev: Event<'_>) -> Result<Step, ErrorKind> {
                match ev {
                    Event::ArrayBegin if !self.open => {
                        self.open = true;
                        Ok(Step::More)
                    }
                    _ if !self.open => Err(self.expected()),
                    Event::ArrayEnd(_) if !self.engaged() => {
                        if self.idx == $arity {
                            Ok(Step::Done)
                        } else {
                            Err(ErrorKind::InvalidArraySize)
                        }
                    }
                    ev => {
                        $(
                            if self.idx == $i {
                                let step = self
                                    .$b
                                    .get_or_insert_with(Default::default)
                                    .on_event(ev)?;
                                if let Step::Done = step {
                                    self.idx += 1;
                                }
                                return Ok(Step::More);
                            }
                        )+
                        Err(ErrorKind::InvalidArraySize)
                    }
                }
            }

            fn finish(&mut self) -> Result<Self::Output, ErrorKind> {
                self.open = false;
                self.idx = 0;
                Ok((
                    $(
                        match self.$b.as_mut() {
                            Some(b) => b.finish()?,
                            None => return Err(ErrorKind::InvalidArraySize),
                        },
                    )+
                ))
            }
        }

        impl<$($T: FromParse),+> FromParse for ($($T,)+) {
            type Builder = $name<$($T),+>;
        }
    };
}

tuple_from_parse!(Tuple1Builder; 1; (0, T0, b0));
tuple_from_parse!(Tuple2Builder; 2; (0, T0, b0), (1, T1, b1));
tuple_from_parse!(Tuple3Builder; 3; (0, T0, b0), (1, T1, b1), (2, T2, b2));
tuple_from_parse!(Tuple4Builder; 4; (0, T0, b0), (1, T1, b1), (2, T2, b2), (3, T3, b3));

// ---------------------------------------------------------------------
// described structs

/// Describes a struct's members so it can be parsed with
/// [`parse_into`] and viewed with [`crate::ValueView`].
///
/// The caller names the generated builder type and repeats the field
/// list; absent members take their `Default` value, unknown keys fail
/// with [`ErrorKind::InvalidMemberName`].
///
/// # Examples
///
/// ```
/// use millstream::{parse_into, reflect};
///
/// #[derive(Debug, Default, PartialEq)]
/// pub struct Point {
///     x: f64,
///     y: f64,
/// }
/// reflect!(Point, PointBuilder { x: f64, y: f64 });
///
/// let p: Point = parse_into(br#"{"x":1.5,"y":-2.0}"#).unwrap();
/// assert_eq!(p, Point { x: 1.5, y: -2.0 });
/// ```
#[macro_export]
macro_rules! reflect {
    ($name:ident, $builder:ident { $($field:ident : $ty:ty),+ $(,)? }) => {
        pub struct $builder {
            __open: bool,
            __done: bool,
            __key: ::std::vec::Vec<u8>,
            __cur: ::core::option::Option<&'static str>,
            $($field: ::core::option::Option<<$ty as $crate::FromParse>::Builder>,)+
        }

        impl ::core::default::Default for $builder {
            fn default() -> Self {
                $builder {
                    __open: false,
                    __done: false,
                    __key: ::std::vec::Vec::new(),
                    __cur: ::core::option::Option::None,
                    $($field: ::core::option::Option::None,)+
                }
            }
        }

        impl $crate::BuildHandler for $builder {
            type Output = $name;

            fn expected(&self) -> $crate::ErrorKind {
                $crate::ErrorKind::ExpectedObject
            }

            fn on_event(
                &mut self,
                ev: $crate::Event<'_>,
            ) -> ::core::result::Result<$crate::Step, $crate::ErrorKind> {
                match ev {
                    $crate::Event::ObjectBegin if !self.__open => {
                        self.__open = true;
                        ::core::result::Result::Ok($crate::Step::More)
                    }
                    _ if !self.__open => {
                        ::core::result::Result::Err($crate::BuildHandler::expected(self))
                    }
                    ev if self.__cur.is_some() => {
                        let active = match self.__cur {
                            ::core::option::Option::Some(k) => k,
                            ::core::option::Option::None => {
                                return ::core::result::Result::Err($crate::ErrorKind::Syntax)
                            }
                        };
                        $(
                            if active == ::core::stringify!($field) {
                                let step = self
                                    .$field
                                    .get_or_insert_with(::core::default::Default::default)
                                    .on_event(ev)?;
                                if let $crate::Step::Done = step {
                                    self.__cur = ::core::option::Option::None;
                                }
                                return ::core::result::Result::Ok($crate::Step::More);
                            }
                        )+
                        ::core::result::Result::Err($crate::ErrorKind::Syntax)
                    }
                    $crate::Event::KeyPart(p) => {
                        self.__key.extend_from_slice(p);
                        ::core::result::Result::Ok($crate::Step::More)
                    }
                    $crate::Event::Key(p) => {
                        self.__key.extend_from_slice(p);
                        let key = ::core::mem::take(&mut self.__key);
                        $(
                            if key == ::core::stringify!($field).as_bytes() {
                                self.__cur =
                                    ::core::option::Option::Some(::core::stringify!($field));
                                return ::core::result::Result::Ok($crate::Step::More);
                            }
                        )+
                        ::core::result::Result::Err($crate::ErrorKind::InvalidMemberName)
                    }
                    $crate::Event::ObjectEnd(_) => {
                        self.__done = true;
                        ::core::result::Result::Ok($crate::Step::Done)
                    }
                    _ => ::core::result::Result::Err($crate::ErrorKind::Syntax),
                }
            }

            fn finish(
                &mut self,
            ) -> ::core::result::Result<Self::Output, $crate::ErrorKind> {
                if !self.__done {
                    return ::core::result::Result::Err($crate::BuildHandler::expected(self));
                }
                self.__done = false;
                self.__open = false;
                ::core::result::Result::Ok($name {
                    $(
                        $field: match self.$field.as_mut() {
                            ::core::option::Option::Some(b) => $crate::BuildHandler::finish(b)?,
                            ::core::option::Option::None => ::core::default::Default::default(),
                        },
                    )+
                })
            }
        }

        impl $crate::FromParse for $name {
            type Builder = $builder;
        }

        impl $crate::AsView for $name {
            fn view(&self) -> $crate::ValueView<'_> {
                $crate::ValueView::object(self)
            }
        }

        impl<'a> $crate::ObjectSource<'a> for $name {
            fn len(&self) -> usize {
                [$(::core::stringify!($field)),+].len()
            }

            fn get(&'a self, key: &str) -> ::core::option::Option<$crate::ValueView<'a>> {
                $(
                    if key == ::core::stringify!($field) {
                        return ::core::option::Option::Some($crate::AsView::view(&self.$field));
                    }
                )+
                ::core::option::Option::None
            }

            fn visit(
                &'a self,
                f: &mut dyn FnMut(&str, $crate::ValueView<'a>) -> bool,
            ) -> bool {
                $(
                    if !f(::core::stringify!($field), $crate::AsView::view(&self.$field)) {
                        return false;
                    }
                )+
                true
            }
        }
    };
}

// ---------------------------------------------------------------------
// root handler and entry points

struct RootHandler<T: FromParse> {
    builder: T::Builder,
    complete: bool,
}

impl<T: FromParse> RootHandler<T> {
    fn new() -> RootHandler<T> {
        RootHandler {
            builder: T::Builder::default(),
            complete: false,
        }
    }

    fn feed(&mut self, ev: Event<'_>) -> Result<(), ErrorKind> {
        if self.complete {
            return Err(ErrorKind::ExtraData);
        }
        if let Step::Done = self.builder.on_event(ev)? {
            self.complete = true;
        }
        Ok(())
    }
}

impl<T: FromParse> Handler for RootHandler<T> {
    fn on_object_begin(&mut self) -> Result<(), ErrorKind> {
        self.feed(Event::ObjectBegin)
    }

    fn on_object_end(&mut self, n: usize) -> Result<(), ErrorKind> {
        self.feed(Event::ObjectEnd(n))
    }

    fn on_array_begin(&mut self) -> Result<(), ErrorKind> {
        self.feed(Event::ArrayBegin)
    }

    fn on_array_end(&mut self, n: usize) -> Result<(), ErrorKind> {
        self.feed(Event::ArrayEnd(n))
    }

    fn on_key_part(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.feed(Event::KeyPart(part))
    }

    fn on_key(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.feed(Event::Key(part))
    }

    fn on_string_part(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.feed(Event::StringPart(part))
    }

    fn on_string(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.feed(Event::String(part))
    }

    fn on_int64(&mut self, v: i64) -> Result<(), ErrorKind> {
        self.feed(Event::Int64(v))
    }

    fn on_uint64(&mut self, v: u64) -> Result<(), ErrorKind> {
        self.feed(Event::Uint64(v))
    }

    fn on_double(&mut self, v: f64) -> Result<(), ErrorKind> {
        self.feed(Event::Double(v))
    }

    fn on_bool(&mut self, v: bool) -> Result<(), ErrorKind> {
        self.feed(Event::Bool(v))
    }

    fn on_null(&mut self) -> Result<(), ErrorKind> {
        self.feed(Event::Null)
    }
}

/// An incremental parser producing a `T` directly.
///
/// The typed mirror of [`crate::StreamParser`]: feed bytes, then
/// [`finish`](IntoParser::finish).
pub struct IntoParser<T: FromParse> {
    parser: Parser,
    root: RootHandler<T>,
}

impl<T: FromParse> IntoParser<T> {
    pub fn new() -> IntoParser<T> {
        IntoParser::with_options(ParseOptions::default())
    }

    pub fn with_options(opts: ParseOptions) -> IntoParser<T> {
        IntoParser {
            parser: Parser::with_options(opts),
            root: RootHandler::new(),
        }
    }

    pub fn is_done(&self) -> bool {
        self.parser.is_done()
    }

    /// Feeds bytes, expecting more input later. Returns bytes consumed.
    pub fn write(&mut self, data: &[u8]) -> Result<usize, Error> {
        self.parser.write_some(true, data, &mut self.root)
    }

    /// Feeds bytes with explicit end-of-input control.
    pub fn write_some(&mut self, more: bool, data: &[u8]) -> Result<usize, Error> {
        self.parser.write_some(more, data, &mut self.root)
    }

    /// Signals end of input and returns the built value.
    pub fn finish(mut self) -> Result<T, Error> {
        if !self.parser.is_done() {
            self.parser.write_some(false, b"", &mut self.root)?;
        }
        let at = self.parser.total_consumed();
        if !self.root.complete {
            return Err(Error::new(ErrorKind::Incomplete, at));
        }
        self.root.builder.finish().map_err(|k| Error::new(k, at))
    }
}

impl<T: FromParse> Default for IntoParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses a complete document directly into a `T`.
pub fn parse_into<T: FromParse>(data: &[u8]) -> Result<T, Error> {
    parse_into_with_options(data, ParseOptions::default())
}

/// [`parse_into`] with explicit options.
pub fn parse_into_with_options<T: FromParse>(data: &[u8], opts: ParseOptions) -> Result<T, Error> {
    let mut p = IntoParser::<T>::with_options(opts);
    let n = p.write_some(false, data)?;
    if n < data.len() {
        return Err(Error::new(ErrorKind::ExtraData, n as u64));
    }
    p.finish()
}
