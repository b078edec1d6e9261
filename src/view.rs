//! Read-only, type-erased views over JSON-shaped data.
//!
//! A [`ValueView`] offers the value tree's read interface over foreign
//! containers without owning or copying them. Container access goes
//! through two object-safe traits, [`ArraySource`] and [`ObjectSource`];
//! a view holds a fat pointer to the source, so adapting a `Vec`, a map,
//! or a described struct costs nothing until the view is traversed.
//!
//! Adaptors are provided for the crate's own [`Value`]/[`Array`]/
//! [`Object`], scalars, strings, `Option`, slices, `Vec`, fixed arrays,
//! tuples, and string-keyed maps; [`crate::reflect!`] adds described
//! structs. [`ValueView::to_value`] materializes any view into an arena.

use std::collections::{BTreeMap, HashMap};

use crate::arena::Arena;
use crate::array::Array;
use crate::object::Object;
use crate::value::{Kind, Value};

/// Type-erased read access to an array-shaped container.
pub trait ArraySource<'a> {
    fn len(&self) -> usize;

    fn at(&'a self, idx: usize) -> Option<ValueView<'a>>;

    /// Calls `f` for each element until it returns false.
    fn visit(&'a self, f: &mut dyn FnMut(ValueView<'a>) -> bool) -> bool;
}

/// Type-erased read access to an object-shaped container.
pub trait ObjectSource<'a> {
    fn len(&self) -> usize;

    fn get(&'a self, key: &str) -> Option<ValueView<'a>>;

    /// Calls `f` for each entry until it returns false.
    fn visit(&'a self, f: &mut dyn FnMut(&str, ValueView<'a>) -> bool) -> bool;
}

/// Converts a borrow of a value-shaped type into a [`ValueView`].
pub trait AsView {
    fn view(&self) -> ValueView<'_>;
}

#[derive(Clone, Copy)]
enum Repr<'a> {
    Null,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    Str(&'a str),
    Array(&'a dyn ArraySource<'a>),
    Object(&'a dyn ObjectSource<'a>),
}

/// A non-owning, read-only JSON value.
///
/// # Examples
///
/// ```
/// use millstream::{Arena, AsView};
///
/// let native = vec![(1i32, "one".to_string()), (2, "two".to_string())];
/// let view = native.view();
/// assert_eq!(view.len(), 2);
/// assert_eq!(view.at(0).unwrap().at(1).unwrap().as_str(), Some("one"));
///
/// let arena = Arena::new();
/// let value = view.to_value(&arena);
/// assert_eq!(millstream::to_string(&value), r#"[[1,"one"],[2,"two"]]"#);
/// ```
#[derive(Clone, Copy)]
pub struct ValueView<'a>(Repr<'a>);

impl<'a> ValueView<'a> {
    pub fn null() -> ValueView<'a> {
        ValueView(Repr::Null)
    }

    pub fn array(src: &'a dyn ArraySource<'a>) -> ValueView<'a> {
        ValueView(Repr::Array(src))
    }

    pub fn object(src: &'a dyn ObjectSource<'a>) -> ValueView<'a> {
        ValueView(Repr::Object(src))
    }

    pub fn kind(&self) -> Kind {
        match self.0 {
            Repr::Null => Kind::Null,
            Repr::Bool(_) => Kind::Bool,
            Repr::Int64(_) => Kind::Int64,
            Repr::Uint64(_) => Kind::Uint64,
            Repr::Double(_) => Kind::Double,
            Repr::Str(_) => Kind::String,
            Repr::Array(_) => Kind::Array,
            Repr::Object(_) => Kind::Object,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self.0, Repr::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.0 {
            Repr::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.0 {
            Repr::Int64(v) => Some(v),
            Repr::Uint64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self.0 {
            Repr::Uint64(v) => Some(v),
            Repr::Int64(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.0 {
            Repr::Double(v) => Some(v),
            Repr::Int64(v) => Some(v as f64),
            Repr::Uint64(v) => Some(v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self.0 {
            Repr::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Element or entry count; 0 for scalars.
    pub fn len(&self) -> usize {
        match self.0 {
            Repr::Array(src) => src.len(),
            Repr::Object(src) => src.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Array element access.
    pub fn at(&self, idx: usize) -> Option<ValueView<'a>> {
        match self.0 {
            Repr::Array(src) => src.at(idx),
            _ => None,
        }
    }

    /// Object member access.
    pub fn get(&self, key: &str) -> Option<ValueView<'a>> {
        match self.0 {
            Repr::Object(src) => src.get(key),
            _ => None,
        }
    }

    /// Visits array elements until `f` returns false; true if this is an
    /// array and every element was visited.
    pub fn visit_elements(&self, f: &mut dyn FnMut(ValueView<'a>) -> bool) -> bool {
        match self.0 {
            Repr::Array(src) => src.visit(f),
            _ => false,
        }
    }

    /// Visits object entries until `f` returns false; true if this is an
    /// object and every entry was visited.
    pub fn visit_members(&self, f: &mut dyn FnMut(&str, ValueView<'a>) -> bool) -> bool {
        match self.0 {
            Repr::Object(src) => src.visit(f),
            _ => false,
        }
    }

    /// Materializes the viewed data as an owned value in `arena`.
    pub fn to_value<'arena>(&self, arena: &'arena Arena) -> Value<'arena> {
        match self.0 {
            Repr::Null => Value::Null,
            Repr::Bool(b) => Value::Bool(b),
            Repr::Int64(v) => Value::Int64(v),
            Repr::Uint64(v) => Value::Uint64(v),
            Repr::Double(v) => Value::Double(v),
            Repr::Str(s) => Value::String(arena.alloc_str(s)),
            Repr::Array(src) => {
                let mut arr = Array::with_capacity_in(src.len(), arena);
                src.visit(&mut |v| {
                    arr.push(v.to_value(arena));
                    true
                });
                Value::Array(arr)
            }
            Repr::Object(src) => {
                let mut obj = Object::with_capacity_in(src.len(), arena);
                src.visit(&mut |k, v| {
                    obj.insert(k, v.to_value(arena));
                    true
                });
                Value::Object(obj)
            }
        }
    }
}

impl<'a> core::fmt::Debug for ValueView<'a> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.0 {
            Repr::Null => f.write_str("null"),
            Repr::Bool(b) => b.fmt(f),
            Repr::Int64(v) => v.fmt(f),
            Repr::Uint64(v) => v.fmt(f),
            Repr::Double(v) => v.fmt(f),
            Repr::Str(s) => s.fmt(f),
            Repr::Array(_) => write!(f, "array(len={})", self.len()),
            Repr::Object(_) => write!(f, "object(len={})", self.len()),
        }
    }
}

// ---------------------------------------------------------------------
// scalar adaptors

impl AsView for bool {
    fn view(&self) -> ValueView<'_> {
        ValueView(Repr::Bool(*self))
    }
}

macro_rules! int_as_view {
    ($($ty:ty),+ => $repr:ident as $as:ty) => {$(
        impl AsView for $ty {
            fn view(&self) -> ValueView<'_> {
                ValueView(Repr::$repr(*self as $as))
            }
        }
    )+};
}

int_as_view!(i8, i16, i32, i64, isize => Int64 as i64);
int_as_view!(u8, u16, u32 => Int64 as i64);
int_as_view!(u64, usize => Uint64 as u64);

impl AsView for f32 {
    fn view(&self) -> ValueView<'_> {
        ValueView(Repr::Double(*self as f64))
    }
}

impl AsView for f64 {
    fn view(&self) -> ValueView<'_> {
        ValueView(Repr::Double(*self))
    }
}

impl AsView for str {
    fn view(&self) -> ValueView<'_> {
        ValueView(Repr::Str(self))
    }
}

impl AsView for String {
    fn view(&self) -> ValueView<'_> {
        ValueView(Repr::Str(self))
    }
}

impl<T: AsView + ?Sized> AsView for &T {
    fn view(&self) -> ValueView<'_> {
        (**self).view()
    }
}

impl<T: AsView> AsView for Option<T> {
    fn view(&self) -> ValueView<'_> {
        match self {
            Some(v) => v.view(),
            None => ValueView::null(),
        }
    }
}

// ---------------------------------------------------------------------
// sequence adaptors

impl<'a, T: AsView + 'a> ArraySource<'a> for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn at(&'a self, idx: usize) -> Option<ValueView<'a>> {
        self.as_slice().get(idx).map(|t| t.view())
    }

    fn visit(&'a self, f: &mut dyn FnMut(ValueView<'a>) -> bool) -> bool {
        for t in self {
            if !f(t.view()) {
                return false;
            }
        }
        true
    }
}

impl<T: AsView> AsView for Vec<T> {
    fn view(&self) -> ValueView<'_> {
        ValueView::array(self)
    }
}

impl<'a, T: AsView + 'a, const N: usize> ArraySource<'a> for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn at(&'a self, idx: usize) -> Option<ValueView<'a>> {
        self.as_slice().get(idx).map(|t| t.view())
    }

    fn visit(&'a self, f: &mut dyn FnMut(ValueView<'a>) -> bool) -> bool {
        for t in self {
            if !f(t.view()) {
                return false;
            }
        }
        true
    }
}

impl<T: AsView, const N: usize> AsView for [T; N] {
    fn view(&self) -> ValueView<'_> {
        ValueView::array(self)
    }
}

macro_rules! tuple_as_view {
    ($len:expr; $(($i:tt, $T:ident)),+) => {
        impl<'a, $($T: AsView + 'a),+> ArraySource<'a> for ($($T,)+) {
            fn len(&self) -> usize {
                $len
            }

            fn at(&'a self, idx: usize) -> Option<ValueView<'a>> {
                match idx {
                    $($i => Some(self.$i.view()),)+
                    _ => None,
                }
            }

            fn visit(&'a self, f: &mut dyn FnMut(ValueView<'a>) -> bool) -> bool {
                $(
                    if !f(self.$i.view()) {
                        return false;
                    }
                )+
                true
            }
        }

        impl<$($T: AsView),+> AsView for ($($T,)+) {
            fn view(&self) -> ValueView<'_> {
                ValueView::array(self)
            }
        }
    };
}

tuple_as_view!(1; (0, T0));
tuple_as_view!(2; (0, T0), (1, T1));
tuple_as_view!(3; (0, T0), (1, T1), (2, T2));
tuple_as_view!(4; (0, T0), (1, T1), (2, T2), (3, T3));

// ---------------------------------------------------------------------
// map adaptors

macro_rules! map_source {
    ($map:ident) => {
        impl<'a, V: AsView + 'a> ObjectSource<'a> for $map<String, V> {
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn get(&'a self, key: &str) -> Option<ValueView<'a>> {
                $map::get(self, key).map(|v| v.view())
            }

            fn visit(&'a self, f: &mut dyn FnMut(&str, ValueView<'a>) -> bool) -> bool {
                for (k, v) in self.iter() {
                    if !f(k, v.view()) {
                        return false;
                    }
                }
                true
            }
        }

        impl<V: AsView> AsView for $map<String, V> {
            fn view(&self) -> ValueView<'_> {
                ValueView::object(self)
            }
        }
    };
}

map_source!(BTreeMap);
map_source!(HashMap);

// ---------------------------------------------------------------------
// the library's own types

impl<'arena> AsView for Value<'arena> {
    fn view(&self) -> ValueView<'_> {
        match self {
            Value::Null => ValueView::null(),
            Value::Bool(b) => ValueView(Repr::Bool(*b)),
            Value::Int64(v) => ValueView(Repr::Int64(*v)),
            Value::Uint64(v) => ValueView(Repr::Uint64(*v)),
            Value::Double(v) => ValueView(Repr::Double(*v)),
            Value::String(s) => ValueView(Repr::Str(s)),
            Value::Array(a) => ValueView::array(a),
            Value::Object(o) => ValueView::object(o),
        }
    }
}

impl<'a, 'arena: 'a> ArraySource<'a> for Array<'arena> {
    fn len(&self) -> usize {
        Array::len(self)
    }

    fn at(&'a self, idx: usize) -> Option<ValueView<'a>> {
        self.get(idx).map(|v| v.view())
    }

    fn visit(&'a self, f: &mut dyn FnMut(ValueView<'a>) -> bool) -> bool {
        for v in self.iter() {
            if !f(v.view()) {
                return false;
            }
        }
        true
    }
}

impl<'arena> AsView for Array<'arena> {
    fn view(&self) -> ValueView<'_> {
        ValueView::array(self)
    }
}

impl<'a, 'arena: 'a> ObjectSource<'a> for Object<'arena> {
    fn len(&self) -> usize {
        Object::len(self)
    }

    fn get(&'a self, key: &str) -> Option<ValueView<'a>> {
        Object::get(self, key).map(|v| v.view())
    }

    fn visit(&'a self, f: &mut dyn FnMut(&str, ValueView<'a>) -> bool) -> bool {
        for (k, v) in self.iter() {
            if !f(k, v.view()) {
                return false;
            }
        }
        true
    }
}

impl<'arena> AsView for Object<'arena> {
    fn view(&self) -> ValueView<'_> {
        ValueView::object(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_views() {
        assert_eq!(true.view().as_bool(), Some(true));
        assert_eq!(7i32.view().as_i64(), Some(7));
        assert_eq!(7u64.view().as_u64(), Some(7));
        assert_eq!(1.5f64.view().as_f64(), Some(1.5));
        assert_eq!("hi".view().as_str(), Some("hi"));
        assert!(Option::<i32>::None.view().is_null());
        assert_eq!(Some(3i64).view().as_i64(), Some(3));
    }

    #[test]
    fn sequence_views() {
        let v = vec![1i32, 2, 3];
        let view = v.view();
        assert_eq!(view.kind(), Kind::Array);
        assert_eq!(view.len(), 3);
        assert_eq!(view.at(1).unwrap().as_i64(), Some(2));
        assert!(view.at(3).is_none());

        let arr = [[1u8, 2], [3, 4]];
        assert_eq!(arr.view().at(1).unwrap().at(0).unwrap().as_i64(), Some(3));
    }

    #[test]
    fn tuple_views_are_heterogeneous() {
        let t = (1i32, "two", 3.0f64);
        let view = t.view();
        assert_eq!(view.len(), 3);
        assert_eq!(view.at(0).unwrap().as_i64(), Some(1));
        assert_eq!(view.at(1).unwrap().as_str(), Some("two"));
        assert_eq!(view.at(2).unwrap().as_f64(), Some(3.0));
    }

    #[test]
    fn map_views() {
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), vec![1i64]);
        m.insert("b".to_string(), vec![2, 3]);
        let view = m.view();
        assert_eq!(view.kind(), Kind::Object);
        assert_eq!(view.len(), 2);
        assert_eq!(view.get("b").unwrap().len(), 2);
        assert!(view.get("c").is_none());

        let mut seen = Vec::new();
        view.visit_members(&mut |k, v| {
            seen.push((k.to_string(), v.len()));
            true
        });
        assert_eq!(seen, [("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn views_over_own_values() {
        let arena = Arena::new();
        let doc = crate::parse(br#"{"xs":[1,2],"s":"t"}"#, &arena).unwrap();
        let view = doc.view();
        assert_eq!(view.get("xs").unwrap().at(0).unwrap().as_i64(), Some(1));
        assert_eq!(view.get("s").unwrap().as_str(), Some("t"));
    }

    #[test]
    fn to_value_materializes_foreign_data() {
        let arena = Arena::new();
        let native = vec![(1i32, true), (2, false)];
        let value = native.view().to_value(&arena);
        assert_eq!(crate::to_string(&value), "[[1,true],[2,false]]");
    }
}
