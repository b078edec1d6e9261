//! The JSON value tree.

use crate::arena::Arena;
use crate::array::Array;
use crate::object::Object;

/// The kind of a [`Value`], readable without touching its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Bool,
    Int64,
    Uint64,
    Double,
    String,
    Array,
    Object,
}

/// A JSON value: a tagged sum over exactly eight kinds.
///
/// Scalars are stored inline; strings, arrays, and objects borrow from
/// the [`Arena`] they were built in. Moving a value within its arena is a
/// plain Rust move; transferring it to another arena is always a
/// [`deep_copy`](Value::deep_copy).
///
/// # Examples
///
/// ```
/// use millstream::{Arena, Kind, Value};
///
/// let arena = Arena::new();
/// let doc = millstream::parse(br#"{"a":1,"b":null}"#, &arena).unwrap();
/// assert_eq!(doc.kind(), Kind::Object);
/// let obj = doc.as_object().unwrap();
/// assert!(obj.get("b").unwrap().is_null());
/// ```
#[derive(Debug)]
pub enum Value<'arena> {
    Null,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    String(&'arena str),
    Array(Array<'arena>),
    Object(Object<'arena>),
}

impl<'arena> Value<'arena> {
    /// Copies `s` into the arena and wraps it as a string value.
    pub fn string_in(arena: &'arena Arena, s: &str) -> Value<'arena> {
        Value::String(arena.alloc_str(s))
    }

    /// The tag of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Bool,
            Value::Int64(_) => Kind::Int64,
            Value::Uint64(_) => Kind::Uint64,
            Value::Double(_) => Kind::Double,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    /// The arena of a structured value; scalars carry none.
    pub(crate) fn arena(&self) -> Option<&'arena Arena> {
        match self {
            Value::Array(a) => Some(a.arena()),
            Value::Object(o) => Some(o.arena()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The value as an `i64`, if it is an integer in range.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(v) => Some(*v),
            Value::Uint64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as a `u64`, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Uint64(v) => Some(*v),
            Value::Int64(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// The value as an `f64`; integers convert (possibly losing
    /// precision), other kinds do not.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Int64(v) => Some(*v as f64),
            Value::Uint64(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'arena str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Array<'arena>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_array_mut(&mut self) -> Option<&mut Array<'arena>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object<'arena>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object<'arena>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Object member access; `None` for non-objects and missing keys.
    pub fn get(&self, key: &str) -> Option<&Value<'arena>> {
        self.as_object().and_then(|o| o.get(key))
    }

    /// Array element access; `None` for non-arrays and out-of-range.
    pub fn at(&self, index: usize) -> Option<&Value<'arena>> {
        self.as_array().and_then(|a| a.get(index))
    }

    /// Recursively copies this value into `arena`.
    ///
    /// The copy shares no storage with the original; mutating one never
    /// affects the other.
    pub fn deep_copy<'b>(&self, arena: &'b Arena) -> Value<'b> {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int64(v) => Value::Int64(*v),
            Value::Uint64(v) => Value::Uint64(*v),
            Value::Double(v) => Value::Double(*v),
            Value::String(s) => Value::String(arena.alloc_str(s)),
            Value::Array(a) => {
                let mut out = Array::with_capacity_in(a.len(), arena);
                for v in a.iter() {
                    out.push(v.deep_copy(arena));
                }
                Value::Array(out)
            }
            Value::Object(o) => {
                let mut out = Object::with_capacity_in(o.len(), arena);
                for (k, v) in o.iter() {
                    out.insert(k, v.deep_copy(arena));
                }
                Value::Object(out)
            }
        }
    }
}

/// Structural equality: same kind, same contents, object entries in the
/// same order. Doubles compare by IEEE equality, so `NaN != NaN`.
impl<'arena> PartialEq for Value<'arena> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl<'arena> From<bool> for Value<'arena> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl<'arena> From<i64> for Value<'arena> {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl<'arena> From<u64> for Value<'arena> {
    fn from(v: u64) -> Self {
        Value::Uint64(v)
    }
}

impl<'arena> From<f64> for Value<'arena> {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl<'arena> From<&'arena str> for Value<'arena> {
    fn from(v: &'arena str) -> Self {
        Value::String(v)
    }
}

impl<'arena> From<Array<'arena>> for Value<'arena> {
    fn from(v: Array<'arena>) -> Self {
        Value::Array(v)
    }
}

impl<'arena> From<Object<'arena>> for Value<'arena> {
    fn from(v: Object<'arena>) -> Self {
        Value::Object(v)
    }
}

/// Renders the value as JSON text.
impl<'arena> core::fmt::Display for Value<'arena> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&crate::ser::to_string(self))
    }
}
