//! Parse/serialize round-trip properties.

use millstream::{parse, parse_with_options, to_string, to_vec, Arena, ParseOptions, Value};
use proptest::prelude::*;

/// Documents already in canonical form must re-serialize byte-identical.
#[test]
fn canonical_fixtures_round_trip() {
    let fixtures: &[&[u8]] = &[
        br#"[1,2,3,4,5]"#,
        br#"{"a":1,"b":null,"c":"hello"}"#,
        br#"null"#,
        br#"true"#,
        br#"-17"#,
        br#"18446744073709551615"#,
        br#""""#,
        br#"{}"#,
        br#"[]"#,
        br#"[[],{},[{}],{"k":[]}]"#,
        br#"{"menu":{"id":"file","popup":{"items":[{"value":"New"},{"value":"Open"}]}}}"#,
        "{\"unicode\":\"héllo wörld 😀\"}".as_bytes(),
    ];
    for doc in fixtures {
        let arena = Arena::new();
        let v = parse(doc, &arena).unwrap();
        assert_eq!(&to_vec(&v), doc, "{}", String::from_utf8_lossy(doc));
    }
}

#[test]
fn parse_serialize_parse_is_structurally_stable() {
    let inputs: &[&[u8]] = &[
        b" { \"a\" : [ 1 , 2.5 , \"x\\ty\" ] , \"b\" : { \"c\" : null } } ",
        r#"["Aé😀"]"#.as_bytes(),
        b"[1e3,-0.0,0.1,123456789012345678901234567890]",
    ];
    for input in inputs {
        let arena = Arena::new();
        let first = parse(input, &arena).unwrap();
        let text = to_vec(&first);
        let second = parse(&text, &arena).unwrap();
        assert_eq!(first, second);
        // serialization is a fixed point after one pass
        assert_eq!(to_vec(&second), text);
    }
}

#[test]
fn scenario_object_is_byte_identical_and_b_is_null() {
    let arena = Arena::new();
    let input = br#"{"a":1,"b":null,"c":"hello"}"#;
    let v = parse(input, &arena).unwrap();
    assert_eq!(to_vec(&v), input);
    assert!(v.get("b").unwrap().is_null());
}

#[test]
fn big_decimal_is_close_to_its_double() {
    let arena = Arena::new();
    let v = parse(b"123456789012345678901234567890", &arena).unwrap();
    let d = v.as_f64().unwrap();
    let expect = 123456789012345678901234567890f64;
    // within 1 ulp
    let ulp = (expect.to_bits() as i64 - d.to_bits() as i64).abs();
    assert!(ulp <= 1, "off by {ulp} ulp");
}

proptest! {
    /// Every finite double survives serialize → parse bitwise, in
    /// precise mode.
    #[test]
    fn doubles_round_trip_bitwise(bits: u64) {
        let v = f64::from_bits(bits);
        prop_assume!(v.is_finite());
        let arena = Arena::new();
        let text = to_string(&Value::Double(v));
        let opts = ParseOptions {
            numbers: millstream::NumberMode::Precise,
            ..ParseOptions::default()
        };
        let back = parse_with_options(text.as_bytes(), &arena, opts).unwrap();
        let d = back.as_f64().unwrap();
        prop_assert_eq!(d.to_bits(), v.to_bits(), "text {}", text);
    }

    /// Arbitrary strings survive escape → unescape.
    #[test]
    fn strings_round_trip(s in "\\PC*") {
        let arena = Arena::new();
        let v = Value::string_in(&arena, &s);
        let text = to_vec(&v);
        let back = parse(&text, &arena).unwrap();
        prop_assert_eq!(back.as_str(), Some(s.as_str()));
    }

    /// Integers keep their kind and value.
    #[test]
    fn integers_round_trip(v: i64) {
        let arena = Arena::new();
        let text = to_vec(&Value::Int64(v));
        let back = parse(&text, &arena).unwrap();
        prop_assert_eq!(back, Value::Int64(v));
    }
}
