//! Code point ranges for the classes JavaScript cannot spell
//!
//! JavaScript regexps without the `u` flag know neither `\p{...}` property
//! escapes nor POSIX `[:name:]` classes. Both are expanded here into explicit
//! ranges over the Basic Multilingual Plane, rendered the way a JavaScript
//! class expects them: ASCII letters and digits literally, everything else as
//! `\uXXXX`.
//!
//! The Letter table comes from `regex-syntax`, so it follows the Unicode
//! version that crate ships.

use std::fmt::Write;

use regex_syntax::hir::{Class, HirKind};

/// Inclusive code point ranges, sorted and non-overlapping
pub(crate) type Ranges = Vec<(u32, u32)>;

/// Highest code point a `\uXXXX` escape can express
const BMP_MAX: u32 = 0xFFFF;

/// Property names that can be expanded
const SUPPORTED_PROPERTIES: [&str; 1] = ["L"];

/// A `\p` or `\P` escape found in a pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertyEscape<'a> {
    /// Length of the escape in bytes, backslash included
    pub len: usize,
    /// Property name, without braces or `^`
    pub name: &'a str,
    /// Whether the escape matches the complement of the property
    pub negated: bool,
}

/// Parse the property escape at the start of `s`, if there is one
///
/// `s` must start with a backslash. Accepts `\pL`, `\p{L}`, `\p{^L}` and their
/// `\P` forms; `\P{^L}` cancels out to the plain property. A brace without
/// its closing `}` is not an escape.
pub(crate) fn parse_property_escape(s: &str) -> Option<PropertyEscape<'_>> {
    let mut negated = match s.as_bytes().get(..2)? {
        b"\\p" => false,
        b"\\P" => true,
        _ => return None,
    };

    let rest = &s[2..];
    if let Some(braced) = rest.strip_prefix('{') {
        let close = braced.find('}')?;
        let (inner, len) = (&braced[..close], 2 + 1 + close + 1);
        let name = match inner.strip_prefix('^') {
            Some(name) => {
                negated = !negated;
                name
            }
            None => inner,
        };
        return Some(PropertyEscape { len, name, negated });
    }

    let name_len = rest.chars().next().map_or(0, char::len_utf8);
    Some(PropertyEscape {
        len: 2 + name_len,
        name: &rest[..name_len],
        negated,
    })
}

/// BMP ranges of a supported Unicode property
pub(crate) fn property_ranges(name: &str) -> Option<Ranges> {
    if !SUPPORTED_PROPERTIES.contains(&name) {
        return None;
    }

    let hir = regex_syntax::Parser::new()
        .parse(&format!("\\p{{{}}}", name))
        .ok()?;
    let HirKind::Class(Class::Unicode(class)) = hir.kind() else {
        return None;
    };

    Some(
        class
            .ranges()
            .iter()
            .map(|range| (range.start() as u32, range.end() as u32))
            .filter(|(start, _)| *start <= BMP_MAX)
            .map(|(start, end)| (start, end.min(BMP_MAX)))
            .collect(),
    )
}

/// ASCII ranges of a POSIX class name such as `alpha` or `xdigit`
pub(crate) fn posix_ranges(name: &str) -> Option<Ranges> {
    let ranges: &[(u8, u8)] = match name {
        "alnum" => &[(b'0', b'9'), (b'A', b'Z'), (b'a', b'z')],
        "alpha" => &[(b'A', b'Z'), (b'a', b'z')],
        "ascii" => &[(0x00, 0x7F)],
        "blank" => &[(b'\t', b'\t'), (b' ', b' ')],
        "cntrl" => &[(0x00, 0x1F), (0x7F, 0x7F)],
        "digit" => &[(b'0', b'9')],
        "graph" => &[(0x21, 0x7E)],
        "lower" => &[(b'a', b'z')],
        "print" => &[(0x20, 0x7E)],
        "punct" => &[(0x21, 0x2F), (0x3A, 0x40), (0x5B, 0x60), (0x7B, 0x7E)],
        "space" => &[(0x09, 0x0D), (b' ', b' ')],
        "upper" => &[(b'A', b'Z')],
        "word" => &[(b'0', b'9'), (b'A', b'Z'), (b'_', b'_'), (b'a', b'z')],
        "xdigit" => &[(b'0', b'9'), (b'A', b'F'), (b'a', b'f')],
        _ => return None,
    };
    Some(
        ranges
            .iter()
            .map(|&(start, end)| (u32::from(start), u32::from(end)))
            .collect(),
    )
}

/// Everything in the BMP that `ranges` does not cover
pub(crate) fn complement(ranges: &[(u32, u32)]) -> Ranges {
    let mut result = Vec::with_capacity(ranges.len() + 1);
    let mut next = 0;
    for &(start, end) in ranges {
        if start > next {
            result.push((next, start - 1));
        }
        next = end + 1;
    }
    if next <= BMP_MAX {
        result.push((next, BMP_MAX));
    }
    result
}

/// Render ranges as the content of a JavaScript character class
pub(crate) fn render_ranges(ranges: &[(u32, u32)]) -> String {
    let mut out = String::with_capacity(ranges.len() * 13);
    for &(start, end) in ranges {
        push_code_point(start, &mut out);
        if end > start {
            out.push('-');
            push_code_point(end, &mut out);
        }
    }
    out
}

fn push_code_point(cp: u32, out: &mut String) {
    match char::from_u32(cp) {
        Some(c) if c.is_ascii_alphanumeric() => out.push(c),
        _ => {
            let _ = write!(out, "\\u{:04X}", cp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_escape() {
        assert_eq!(
            parse_property_escape("\\pL00"),
            Some(PropertyEscape { len: 3, name: "L", negated: false })
        );
        assert_eq!(
            parse_property_escape("\\p{L}x"),
            Some(PropertyEscape { len: 5, name: "L", negated: false })
        );
        assert_eq!(
            parse_property_escape("\\p{^L}"),
            Some(PropertyEscape { len: 6, name: "L", negated: true })
        );
        assert_eq!(
            parse_property_escape("\\PL"),
            Some(PropertyEscape { len: 3, name: "L", negated: true })
        );
        assert_eq!(
            parse_property_escape("\\P{^L}"),
            Some(PropertyEscape { len: 6, name: "L", negated: false })
        );
        assert_eq!(parse_property_escape("\\p{Lu"), None);
        assert_eq!(parse_property_escape("\\d"), None);
    }

    #[test]
    fn test_letter_ranges() {
        let ranges = property_ranges("L").unwrap();
        assert_eq!(ranges[0], (u32::from(b'A'), u32::from(b'Z')));
        assert_eq!(ranges[1], (u32::from(b'a'), u32::from(b'z')));
        assert!(ranges.contains(&(0xC0, 0xD6)));
        assert!(ranges.iter().all(|&(start, end)| start <= end && end <= BMP_MAX));
        assert!(ranges.windows(2).all(|pair| pair[0].1 + 1 < pair[1].0));
    }

    #[test]
    fn test_unsupported_properties() {
        assert_eq!(property_ranges("Lu"), None);
        assert_eq!(property_ranges("Greek"), None);
        assert_eq!(property_ranges(""), None);
    }

    #[test]
    fn test_posix_ranges() {
        assert_eq!(render_ranges(&posix_ranges("alpha").unwrap()), "A-Za-z");
        assert_eq!(render_ranges(&posix_ranges("xdigit").unwrap()), "0-9A-Fa-f");
        assert_eq!(render_ranges(&posix_ranges("space").unwrap()), "\\u0009-\\u000D\\u0020");
        assert_eq!(posix_ranges("foo"), None);
    }

    #[test]
    fn test_complement() {
        assert_eq!(
            complement(&[(0x41, 0x5A), (0x61, 0x7A)]),
            vec![(0x00, 0x40), (0x5B, 0x60), (0x7B, 0xFFFF)]
        );
        assert_eq!(complement(&[(0x00, 0xFFFF)]), vec![]);
        assert_eq!(complement(&[]), vec![(0x00, 0xFFFF)]);
    }

    #[test]
    fn test_render_ranges() {
        assert_eq!(render_ranges(&[(0x41, 0x5A), (0xAA, 0xAA), (0xC0, 0xD6)]), "A-Z\\u00AA\\u00C0-\\u00D6");
        assert_eq!(render_ranges(&[(0x2D, 0x2D), (0x5D, 0x5E)]), "\\u002D\\u005D-\\u005E");
    }
}
