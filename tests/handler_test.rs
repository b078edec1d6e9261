//! Driving the SAX parser with custom handlers.

use millstream::{ErrorKind, Handler, Parser};
use std::ops::Range;

/// Checks that clean strings arrive as exactly one borrowed view into
/// the input buffer.
struct ZeroCopyCheck {
    input: Range<usize>,
    strings: usize,
    parts: usize,
    borrowed: bool,
}

impl Handler for ZeroCopyCheck {
    fn on_string_part(&mut self, _part: &[u8]) -> Result<(), ErrorKind> {
        self.parts += 1;
        Ok(())
    }

    fn on_string(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.strings += 1;
        let addr = part.as_ptr() as usize;
        self.borrowed = self.input.contains(&addr);
        Ok(())
    }
}

#[test]
fn unescaped_strings_are_zero_copy() {
    let input = br#""no escapes here, just plain text""#;
    let mut h = ZeroCopyCheck {
        input: input.as_ptr() as usize..input.as_ptr() as usize + input.len(),
        strings: 0,
        parts: 0,
        borrowed: false,
    };
    let mut p = Parser::new();
    p.write_some(false, input, &mut h).unwrap();
    assert_eq!(h.strings, 1);
    assert_eq!(h.parts, 0);
    assert!(h.borrowed, "view must refer to the input buffer");
}

/// A handler abort stops the parse with the handler's error kind.
struct AbortAfter {
    remaining: usize,
}

impl Handler for AbortAfter {
    fn on_int64(&mut self, _: i64) -> Result<(), ErrorKind> {
        if self.remaining == 0 {
            return Err(ErrorKind::NumberOutOfRange);
        }
        self.remaining -= 1;
        Ok(())
    }
}

#[test]
fn handler_abort_surfaces_its_error() {
    let mut h = AbortAfter { remaining: 2 };
    let mut p = Parser::new();
    let err = p.write_some(false, b"[1,2,3,4]", &mut h).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NumberOutOfRange);
    assert_eq!(err.offset(), 6);
}

/// Events observed with no DOM: count array elements of a large doc.
#[derive(Default)]
struct CountValues {
    scalars: usize,
    max_array: usize,
}

impl Handler for CountValues {
    fn on_int64(&mut self, _: i64) -> Result<(), ErrorKind> {
        self.scalars += 1;
        Ok(())
    }

    fn on_null(&mut self) -> Result<(), ErrorKind> {
        self.scalars += 1;
        Ok(())
    }

    fn on_array_end(&mut self, n: usize) -> Result<(), ErrorKind> {
        self.max_array = self.max_array.max(n);
        Ok(())
    }
}

#[test]
fn sax_only_traversal() {
    let mut h = CountValues::default();
    let mut p = Parser::new();
    p.write_some(false, b"[[1,2,3],[4,null],[5,6,7,8]]", &mut h)
        .unwrap();
    assert!(p.is_done());
    assert_eq!(h.scalars, 9);
    assert_eq!(h.max_array, 4);
}

/// Comment callbacks receive the comment text including delimiters.
#[derive(Default)]
struct Comments {
    seen: Vec<String>,
}

impl Handler for Comments {
    fn on_comment(&mut self, part: &[u8]) -> Result<(), ErrorKind> {
        self.seen.push(String::from_utf8_lossy(part).into_owned());
        Ok(())
    }
}

#[test]
fn comment_callbacks() {
    let opts = millstream::ParseOptions {
        allow_comments: true,
        ..Default::default()
    };
    let mut h = Comments::default();
    let mut p = Parser::with_options(opts);
    p.write_some(false, b"[1, /* inner */ 2] // trailing", &mut h)
        .unwrap();
    assert_eq!(h.seen, ["/* inner */", "// trailing"]);
}
