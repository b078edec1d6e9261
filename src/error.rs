//! Parse, serialize, and conversion errors.

use core::fmt;

/// The set of conditions that can fail a parse or a typed conversion.
///
/// This is a closed enumeration: every failure the library reports maps to
/// exactly one of these kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The input does not match the JSON grammar.
    Syntax,
    /// An `f` was not followed by `alse`.
    ExpectedFalse,
    /// A number is missing its integer digits.
    ExpectedMantissa,
    /// A decimal point is not followed by a digit.
    ExpectedFraction,
    /// An `e`/`E` is not followed by an exponent digit.
    ExpectedExponent,
    /// A `\u` escape contains a non-hex character.
    ExpectedHexDigit,
    /// A `\u` escape encodes an unpaired or out-of-order leading surrogate.
    IllegalLeadingSurrogate,
    /// The second half of a surrogate pair is not a trailing surrogate.
    IllegalTrailingSurrogate,
    /// A string contains bytes that are not valid UTF-8.
    InvalidUtf8,
    /// Nesting exceeded the configured maximum depth.
    TooDeep,
    /// A number's exponent is too large to represent.
    ExponentOverflow,
    /// A parsed number does not fit the target integer type.
    NumberOutOfRange,
    /// Input ended before the document was complete.
    Incomplete,
    /// Non-whitespace input remains after a complete document.
    ExtraData,
    /// The target expected a boolean.
    ExpectedBool,
    /// The target expected an integer.
    ExpectedInt,
    /// The target expected a number.
    ExpectedNumber,
    /// The target expected a string.
    ExpectedString,
    /// The target expected an array.
    ExpectedArray,
    /// The target expected an object.
    ExpectedObject,
    /// An array has the wrong number of elements for the target.
    InvalidArraySize,
    /// An object key does not name a member of the target.
    InvalidMemberName,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax error",
            ErrorKind::ExpectedFalse => "expected 'false'",
            ErrorKind::ExpectedMantissa => "expected mantissa digit",
            ErrorKind::ExpectedFraction => "expected fraction digit",
            ErrorKind::ExpectedExponent => "expected exponent digit",
            ErrorKind::ExpectedHexDigit => "expected hex digit",
            ErrorKind::IllegalLeadingSurrogate => "illegal leading surrogate",
            ErrorKind::IllegalTrailingSurrogate => "illegal trailing surrogate",
            ErrorKind::InvalidUtf8 => "string is not valid UTF-8",
            ErrorKind::TooDeep => "maximum nesting depth exceeded",
            ErrorKind::ExponentOverflow => "exponent too large",
            ErrorKind::NumberOutOfRange => "number out of range",
            ErrorKind::Incomplete => "incomplete document",
            ErrorKind::ExtraData => "extra data after document",
            ErrorKind::ExpectedBool => "expected bool",
            ErrorKind::ExpectedInt => "expected integer",
            ErrorKind::ExpectedNumber => "expected number",
            ErrorKind::ExpectedString => "expected string",
            ErrorKind::ExpectedArray => "expected array",
            ErrorKind::ExpectedObject => "expected object",
            ErrorKind::InvalidArraySize => "invalid array size",
            ErrorKind::InvalidMemberName => "unknown member name",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// An error from parsing or typed conversion.
///
/// Carries the [`ErrorKind`] and the absolute byte offset at which the
/// condition was detected. The offset counts from the first byte ever
/// handed to the parser, across all `write_some` calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    offset: u64,
}

impl Error {
    /// Creates a new error of the given kind at the given byte offset.
    pub fn new(kind: ErrorKind, offset: u64) -> Error {
        Error { kind, offset }
    }

    /// Returns the kind of this error.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the absolute byte offset at which the error was detected.
    #[inline]
    pub fn offset(&self) -> u64 {
        self.offset
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.kind, self.offset)
    }
}

impl std::error::Error for Error {}
