//! Parse and serialize configuration.

/// How the parser converts JSON numbers that need a floating-point result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NumberMode {
    /// Fast conversion via a power-of-ten table. May be off by a few ULP
    /// for extreme inputs.
    #[default]
    Imprecise,
    /// Correctly rounded conversion. The parser retains the raw number
    /// text and finishes through the standard library's decimal parser.
    Precise,
    /// Numbers are rejected entirely.
    None,
}

/// Options controlling a parse.
///
/// The defaults accept strict RFC 8259 JSON. Each extension is opt-in.
///
/// # Examples
///
/// ```
/// use millstream::{Arena, ParseOptions};
///
/// let opts = ParseOptions {
///     allow_comments: true,
///     allow_trailing_commas: true,
///     ..ParseOptions::default()
/// };
/// let arena = Arena::new();
/// let doc = millstream::parse_with_options(b"[1, 2, /*three*/ 3,]", &arena, opts).unwrap();
/// assert_eq!(doc.as_array().unwrap().len(), 3);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParseOptions {
    /// Maximum nesting depth. Opening a container beyond this depth fails
    /// with [`crate::ErrorKind::TooDeep`].
    pub max_depth: u32,
    /// Floating-point conversion mode.
    pub numbers: NumberMode,
    /// Accept `//` line comments and `/* */` block comments.
    pub allow_comments: bool,
    /// Accept a trailing comma before `]` and `}`.
    pub allow_trailing_commas: bool,
    /// Skip UTF-8 validation of string contents.
    pub allow_invalid_utf8: bool,
    /// Accept the tokens `Infinity`, `-Infinity`, and `NaN` as numbers.
    pub allow_infinity_and_nan: bool,
    /// Accept unquoted object keys matching `[A-Za-z_$][A-Za-z0-9_$]*`.
    pub allow_unquoted_keys: bool,
}

impl Default for ParseOptions {
    fn default() -> ParseOptions {
        ParseOptions {
            max_depth: 32,
            numbers: NumberMode::default(),
            allow_comments: false,
            allow_trailing_commas: false,
            allow_invalid_utf8: false,
            allow_infinity_and_nan: false,
            allow_unquoted_keys: false,
        }
    }
}

/// How the serializer writes doubles that have no JSON representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NonFinite {
    /// Emit `null`.
    #[default]
    Null,
    /// Emit the tokens `Infinity`, `-Infinity`, and `NaN`. Such output is
    /// only re-readable with
    /// [`ParseOptions::allow_infinity_and_nan`] set.
    Token,
}

/// Options controlling serialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Policy for NaN and infinities.
    pub non_finite: NonFinite,
}
