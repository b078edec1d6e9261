//! Decimal/binary number conversion and emission.
//!
//! Parsing accumulates a mantissa/exponent record in the parser's state
//! machine; this module finishes the conversion to a double and formats
//! numbers on the way out. Integer output goes through `itoa`, shortest
//! round-trip double output through `ryu`. All paths are locale
//! independent.

use std::fmt::Write as _;

/// Exact powers of ten. 1e22 is the largest power of ten exactly
/// representable in an IEEE binary64.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16,
    1e17, 1e18, 1e19, 1e20, 1e21, 1e22,
];

#[inline]
fn pow10(e: i32) -> f64 {
    match e {
        0..=22 => POW10[e as usize],
        -22..=-1 => 1.0 / POW10[(-e) as usize],
        _ => 10f64.powi(e),
    }
}

/// Fast decimal-to-double conversion: `mant * 10^exp`, negated if `neg`.
///
/// Exact when both the mantissa and the scaled power of ten are exactly
/// representable; otherwise within a few ULP. The precise mode re-parses
/// the retained source text instead of calling this.
#[inline]
pub fn dec_to_double(mant: u64, exp: i32, neg: bool) -> f64 {
    let d = mant as f64 * pow10(exp);
    if neg {
        -d
    } else {
        d
    }
}

/// Correctly rounded conversion of raw JSON number text.
///
/// The text has already been validated against the number grammar, which
/// is a subset of what `f64::from_str` accepts.
#[inline]
pub fn parse_precise(text: &[u8]) -> f64 {
    debug_assert!(text.is_ascii());
    let s = unsafe { core::str::from_utf8_unchecked(text) };
    s.parse::<f64>().unwrap_or(f64::INFINITY)
}

/// Appends the shortest decimal form of `v`.
#[inline]
pub fn emit_i64(v: i64, out: &mut Vec<u8>) {
    let mut buf = itoa::Buffer::new();
    out.extend_from_slice(buf.format(v).as_bytes());
}

/// Appends the shortest decimal form of `v`.
#[inline]
pub fn emit_u64(v: u64, out: &mut Vec<u8>) {
    let mut buf = itoa::Buffer::new();
    out.extend_from_slice(buf.format(v).as_bytes());
}

/// Appends the shortest round-trip decimal form of a finite `v`.
///
/// Scientific notation is used when the exponent falls outside ryu's
/// fixed-notation band. The sign of negative zero is preserved.
#[inline]
pub fn emit_f64(v: f64, out: &mut Vec<u8>) {
    debug_assert!(v.is_finite());
    let mut buf = ryu::Buffer::new();
    out.extend_from_slice(buf.format_finite(v).as_bytes());
}

/// Output format selector for [`format_double`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoubleFormat {
    /// Shortest round-trip decimal; scientific outside the fixed band.
    General,
    /// Scientific with an explicit digit count after the point.
    Precision(usize),
    /// Hexadecimal significand with a binary exponent (C `%a` style).
    Hex,
}

/// Formats `v` per `format`, appending to `out`.
///
/// Non-finite values take their textual names (`inf`, `-inf`, `NaN`);
/// JSON output never reaches this path for non-finite values, the
/// serializer applies its policy first.
pub fn format_double(v: f64, format: DoubleFormat, out: &mut Vec<u8>) {
    if v.is_nan() {
        out.extend_from_slice(b"NaN");
        return;
    }
    if v.is_infinite() {
        out.extend_from_slice(if v < 0.0 { b"-inf" } else { b"inf" });
        return;
    }
    match format {
        DoubleFormat::General => emit_f64(v, out),
        DoubleFormat::Precision(digits) => {
            let mut s = String::new();
            // core::fmt is locale independent.
            let _ = write!(s, "{:.*e}", digits, v);
            out.extend_from_slice(s.as_bytes());
        }
        DoubleFormat::Hex => emit_hex(v, out),
    }
}

fn emit_hex(v: f64, out: &mut Vec<u8>) {
    let bits = v.to_bits();
    if bits >> 63 != 0 {
        out.push(b'-');
    }
    let biased = ((bits >> 52) & 0x7ff) as i32;
    let mant = bits & 0x000f_ffff_ffff_ffff;
    if biased == 0 && mant == 0 {
        out.extend_from_slice(b"0x0p+0");
        return;
    }
    let (lead, exp) = if biased == 0 {
        (b'0', -1022)
    } else {
        (b'1', biased - 1023)
    };
    out.extend_from_slice(b"0x");
    out.push(lead);
    if mant != 0 {
        out.push(b'.');
        let mut m = mant << 12; // left-align the 52 mantissa bits
        while m != 0 {
            let digit = (m >> 60) as usize;
            out.push(b"0123456789abcdef"[digit]);
            m <<= 4;
        }
    }
    out.push(b'p');
    if exp >= 0 {
        out.push(b'+');
    }
    let mut buf = itoa::Buffer::new();
    out.extend_from_slice(buf.format(exp).as_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hex_of(v: f64) -> String {
        let mut out = Vec::new();
        emit_hex(v, &mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn fast_conversion_on_easy_values() {
        assert_eq!(dec_to_double(15, -1, false), 1.5);
        assert_eq!(dec_to_double(25, 1, true), -250.0);
        assert_eq!(dec_to_double(1, 100, false), 1e100);
        assert_eq!(dec_to_double(0, 0, true), 0.0);
        assert!(dec_to_double(0, 0, true).is_sign_negative());
    }

    #[test]
    fn precise_conversion_is_correctly_rounded() {
        // 1 ULP above the halfway point of 2^-1074
        assert_eq!(parse_precise(b"2.470328229206232721e-324"), 5e-324);
        assert_eq!(parse_precise(b"123456789012345678901234567890"), 1.2345678901234568e29);
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let mut out = Vec::new();
        emit_f64(-0.0, &mut out);
        assert_eq!(out, b"-0.0");
    }

    #[test]
    fn hex_format() {
        assert_eq!(hex_of(1.0), "0x1p+0");
        assert_eq!(hex_of(-2.0), "-0x1p+1");
        assert_eq!(hex_of(0.0), "0x0p+0");
        assert_eq!(hex_of(1.5), "0x1.8p+0");
        assert_eq!(hex_of(f64::MIN_POSITIVE / 2.0), "0x0.8p-1022");
    }

    #[test]
    fn precision_format() {
        let mut out = Vec::new();
        format_double(1234.56, DoubleFormat::Precision(3), &mut out);
        assert_eq!(out, b"1.235e3");
        out.clear();
        format_double(0.25, DoubleFormat::Precision(1), &mut out);
        assert_eq!(out, b"2.5e-1");
    }

    proptest! {
        #[test]
        fn shortest_output_round_trips(bits: u64) {
            let v = f64::from_bits(bits);
            prop_assume!(v.is_finite());
            let mut out = Vec::new();
            emit_f64(v, &mut out);
            let back = parse_precise(&out);
            prop_assert_eq!(back.to_bits(), v.to_bits());
        }
    }
}
