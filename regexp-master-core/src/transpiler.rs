//! PCRE to JavaScript transpiler
//!
//! The transpiler walks the token list produced by the tokenizer and the
//! literal text between tokens, rewriting what JavaScript spells differently
//! and rejecting what it cannot express at all:
//!
//! - named groups become plain capturing groups, with the names reported in a
//!   separate map from name to group number, and named or relative
//!   backreferences (`\k<name>`, `\g{-1}`) become numbered ones
//! - atomic groups and possessive quantifiers lose their backtracking
//!   guarantees and become `(?:` and plain quantifiers
//! - `\pL` and POSIX classes are expanded into explicit ranges
//! - `.` under the `s` modifier becomes `[\s\S]`
//! - lookbehind assertions and inline options are errors
//!
//! The result is always delimited with `/`, and every `/` in the output body
//! is escaped exactly once.

use std::collections::HashMap;

use log::debug;

use crate::error::{RegexpError, Result, SyntaxErrorKind, UnsupportedKind};
use crate::tokenizer::{NonCapturingSubtype, TokenKind, parse_regexp};
use crate::unicode::{self, PropertyEscape, Ranges};

/// Named capture groups and their 1-based group numbers
pub type NamedCaptureMap = HashMap<String, usize>;

/// Transpile a delimited PCRE pattern into a JavaScript regexp literal
///
/// # Example
/// ```
/// use regexp_master_core::pcre_to_js;
///
/// let (js, map) = pcre_to_js("#x(?<foo>[0-9]+)x#i").unwrap();
/// assert_eq!(js, "/x([0-9]+)x/i");
/// assert_eq!(map["foo"], 1);
/// ```
///
/// # Modifiers
/// Only `i` and `m` are carried over to the literal. `s` is applied to the
/// body instead, by rewriting `.` to `[\s\S]`. `u`, `D`, `S`, `X` and `J` are
/// dropped, and every other modifier is rejected.
///
/// # Errors
/// Any error from [`parse_regexp`], plus [`RegexpError::Unsupported`] for
/// lookbehind assertions, inline options, Unicode properties other than `L`,
/// unknown POSIX classes, backreferences to groups that do not exist yet and
/// modifiers with no JavaScript counterpart. An unclosed `\p{` is a
/// [`RegexpError::Syntax`] error.
pub fn pcre_to_js(pattern: &str) -> Result<(String, NamedCaptureMap)> {
    let parsed = parse_regexp(pattern)?;
    let modifiers_offset = pattern.len() - parsed.modifiers.len();
    let flags = js_flags(&parsed.modifiers, modifiers_offset)?;

    let mut transpiler = Transpiler {
        body: &parsed.regexp,
        dot_all: parsed.modifiers.contains('s'),
        out: String::with_capacity(parsed.regexp.len() + 2),
        captures: 0,
        names: NamedCaptureMap::new(),
    };

    let mut position = 0;
    for token in &parsed.tokens {
        transpiler.literal(position, token.pos)?;
        transpiler.token(token.pos, &token.kind)?;
        position = token.pos + token.len;
    }
    transpiler.literal(position, parsed.regexp.len())?;

    let js = format!("/{}/{}", escape_slashes(&transpiler.out), flags);
    debug!("transpiled {:?} to {:?}", pattern, js);
    Ok((js, transpiler.names))
}

/// Keep the modifiers JavaScript shares, drop the ones that do not change
/// what matches, reject the rest
fn js_flags(modifiers: &str, offset: usize) -> Result<String> {
    let mut flags = String::new();
    for (i, modifier) in modifiers.char_indices() {
        match modifier {
            'i' | 'm' => {
                if !flags.contains(modifier) {
                    flags.push(modifier);
                }
            }
            // `s` is applied to the body instead
            's' | 'u' | 'D' | 'S' | 'X' | 'J' => {}
            other => {
                return Err(RegexpError::unsupported(
                    offset + i,
                    UnsupportedKind::Modifier(other),
                ));
            }
        }
    }
    Ok(flags)
}

/// Escape every `/` that is not already preceded by an odd run of backslashes
fn escape_slashes(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut backslashes = 0;
    for c in body.chars() {
        if c == '/' && backslashes % 2 == 0 {
            out.push('\\');
        }
        if c == '\\' {
            backslashes += 1;
        } else {
            backslashes = 0;
        }
        out.push(c);
    }
    out
}

/// Drop the possessive `+` from a quantifier such as `++` or `{2}+`
fn strip_possessive(quantifiers: &str) -> &str {
    match quantifiers.strip_suffix('+') {
        Some(base) if !base.is_empty() => base,
        _ => quantifiers,
    }
}

/// Length of a `{n}`, `{n,}` or `{n,m}` quantifier at the start of `s`
fn counted_quantifier_len(s: &[u8]) -> Option<usize> {
    let mut i = 1;
    let digits = |mut i: usize| {
        while s.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        i
    };
    let end = digits(i);
    if end == i {
        return None;
    }
    i = end;
    if s.get(i) == Some(&b',') {
        i = digits(i + 1);
    }
    (s.get(i) == Some(&b'}')).then_some(i + 1)
}

struct Transpiler<'a> {
    body: &'a str,
    dot_all: bool,
    out: String,
    captures: usize,
    names: NamedCaptureMap,
}

impl Transpiler<'_> {
    fn token(&mut self, pos: usize, kind: &TokenKind) -> Result<()> {
        match kind {
            TokenKind::CharacterClass { content, quantifiers } => {
                self.out.push('[');
                self.class_content(content, pos + 1)?;
                self.out.push(']');
                self.out.push_str(strip_possessive(quantifiers));
            }
            TokenKind::CapturingSubpatternStart { name, .. } => {
                self.captures += 1;
                if let Some(name) = name {
                    self.names.insert(name.clone(), self.captures);
                }
                self.out.push('(');
            }
            TokenKind::NonCapturingSubpatternStart { subtype, .. } => match subtype {
                NonCapturingSubtype::Options(_) => {
                    return Err(RegexpError::unsupported(pos, UnsupportedKind::SubpatternOptions));
                }
                NonCapturingSubtype::Atomic => {
                    debug!("atomic group at {} downgraded to a plain group", pos);
                    self.out.push_str("(?:");
                }
                NonCapturingSubtype::Plain => self.out.push_str("(?:"),
            },
            TokenKind::LookaheadAssertionStart { .. } => self.out.push_str("(?="),
            TokenKind::NegativeLookaheadAssertionStart { .. } => self.out.push_str("(?!"),
            TokenKind::LookbehindAssertionStart { .. } => {
                return Err(RegexpError::unsupported(pos, UnsupportedKind::Lookbehind));
            }
            TokenKind::NegativeLookbehindAssertionStart { .. } => {
                return Err(RegexpError::unsupported(pos, UnsupportedKind::NegativeLookbehind));
            }
            TokenKind::Option { .. } => {
                return Err(RegexpError::unsupported(pos, UnsupportedKind::Options));
            }
            TokenKind::CapturingSubpatternEnd { quantifiers }
            | TokenKind::NonCapturingSubpatternEnd { quantifiers }
            | TokenKind::LookaheadAssertionEnd { quantifiers }
            | TokenKind::NegativeLookaheadAssertionEnd { quantifiers }
            | TokenKind::LookbehindAssertionEnd { quantifiers }
            | TokenKind::NegativeLookbehindAssertionEnd { quantifiers } => {
                self.out.push(')');
                self.out.push_str(strip_possessive(quantifiers));
            }
        }
        Ok(())
    }

    /// Copy the literal text in `body[from..to]`, rewriting as needed
    fn literal(&mut self, from: usize, to: usize) -> Result<()> {
        let text = &self.body[from..to];
        let bytes = text.as_bytes();
        let mut i = 0;

        while i < text.len() {
            match bytes[i] {
                b'\\' => {
                    if let Some(escape) = property_escape(&text[i..], from + i)? {
                        let ranges = property_ranges(escape.name, from + i)?;
                        self.out.push_str(if escape.negated { "[^" } else { "[" });
                        self.out.push_str(&unicode::render_ranges(&ranges));
                        self.out.push(']');
                        i += escape.len;
                    } else if matches!(bytes.get(i + 1).copied(), Some(b'k' | b'g')) {
                        let (len, group) = self.backreference(&text[i..], from + i)?;
                        // `\1` followed by a digit would read as another group
                        if bytes.get(i + len).is_some_and(u8::is_ascii_digit) {
                            self.out.push_str(&format!("(?:\\{})", group));
                        } else {
                            self.out.push_str(&format!("\\{}", group));
                        }
                        i += len;
                    } else {
                        let len = 1 + text[i + 1..].chars().next().map_or(0, char::len_utf8);
                        self.out.push_str(&text[i..i + len]);
                        i += len;
                    }
                    continue;
                }
                b'.' => {
                    self.out.push_str(if self.dot_all { "[\\s\\S]" } else { "." });
                    i += 1;
                    continue;
                }
                b'*' | b'+' | b'?' => {
                    self.out.push(char::from(bytes[i]));
                    i += 1;
                }
                b'{' => match counted_quantifier_len(&bytes[i..]) {
                    Some(len) => {
                        self.out.push_str(&text[i..i + len]);
                        i += len;
                    }
                    None => {
                        self.out.push('{');
                        i += 1;
                        continue;
                    }
                },
                _ => {
                    let len = text[i..].chars().next().map_or(1, char::len_utf8);
                    self.out.push_str(&text[i..i + len]);
                    i += len;
                    continue;
                }
            }

            // Only quantifiers reach this point
            if bytes.get(i) == Some(&b'+') {
                i += 1;
            }
        }
        Ok(())
    }

    /// Resolve the `\k` or `\g` backreference at the start of `s` to a group
    /// number, returning its length in bytes and the number
    fn backreference(&self, s: &str, position: usize) -> Result<(usize, usize)> {
        let unresolved = |text: &str| {
            RegexpError::unsupported(position, UnsupportedKind::Backreference(text.to_string()))
        };
        let (len, reference) = parse_backreference(s).ok_or_else(|| unresolved(&s[..2]))?;

        let group = match reference {
            Reference::Name(name) => self.names.get(name).copied(),
            Reference::Absolute(group) => Some(group).filter(|&group| group > 0),
            Reference::Relative(back) => (self.captures + 1).checked_sub(back).filter(|&group| {
                back > 0 && group > 0
            }),
        };
        let group = group.ok_or_else(|| unresolved(&s[..len]))?;
        debug!("backreference {:?} at {} resolved to group {}", &s[..len], position, group);
        Ok((len, group))
    }

    /// Copy the content of a character class starting at body offset `offset`
    fn class_content(&mut self, content: &str, offset: usize) -> Result<()> {
        let bytes = content.as_bytes();
        let mut i = 0;

        while i < content.len() {
            let rest = &content[i..];
            if let Some(escape) = property_escape(rest, offset + i)? {
                let mut ranges = property_ranges(escape.name, offset + i)?;
                if escape.negated {
                    ranges = unicode::complement(&ranges);
                }
                self.out.push_str(&unicode::render_ranges(&ranges));
                i += escape.len;
            } else if bytes[i] == b'\\' {
                let len = 1 + content[i + 1..].chars().next().map_or(0, char::len_utf8);
                self.out.push_str(&content[i..i + len]);
                i += len;
            } else if let Some(len) = posix_class_len(rest) {
                let ranges = posix_class_ranges(&rest[..len], offset + i)?;
                self.out.push_str(&unicode::render_ranges(&ranges));
                i += len;
            } else {
                let len = rest.chars().next().map_or(1, char::len_utf8);
                self.out.push_str(&rest[..len]);
                i += len;
            }
        }
        Ok(())
    }
}

/// A backreference target as written in the pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reference<'a> {
    Name(&'a str),
    Absolute(usize),
    /// `\g{-N}`: the Nth group opened before the reference
    Relative(usize),
}

/// Parse `\k<name>`, `\k'name'`, `\k{name}`, `\g{name}`, `\g{N}`, `\g{-N}`,
/// `\gN` or `\g-N` at the start of `s`
fn parse_backreference(s: &str) -> Option<(usize, Reference<'_>)> {
    let rest = s.strip_prefix('\\')?;
    let (inner, close) = if let Some(inner) = rest.strip_prefix("k<") {
        (inner, '>')
    } else if let Some(inner) = rest.strip_prefix("k'") {
        (inner, '\'')
    } else if let Some(inner) = rest.strip_prefix("k{").or_else(|| rest.strip_prefix("g{")) {
        (inner, '}')
    } else {
        let unbraced = rest.strip_prefix('g')?;
        let digits_start = usize::from(unbraced.starts_with('-'));
        let digits = unbraced[digits_start..]
            .bytes()
            .take_while(u8::is_ascii_digit)
            .count();
        let target = &unbraced[..digits_start + digits];
        return Some((2 + target.len(), numbered_reference(target)?));
    };

    let end = inner.find(close)?;
    let target = &inner[..end];
    let reference = if is_group_name(target) {
        Reference::Name(target)
    } else if rest.starts_with('g') {
        numbered_reference(target)?
    } else {
        return None;
    };
    Some((s.len() - inner.len() + end + 1, reference))
}

/// `N` or `-N` with at least one digit
fn numbered_reference(target: &str) -> Option<Reference<'_>> {
    let (digits, relative) = match target.strip_prefix('-') {
        Some(digits) => (digits, true),
        None => (target, false),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let number = digits.parse().ok()?;
    Some(if relative { Reference::Relative(number) } else { Reference::Absolute(number) })
}

fn is_group_name(name: &str) -> bool {
    let mut bytes = name.bytes();
    bytes
        .next()
        .is_some_and(|b| b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// The property escape at the start of `s`, if any; an unclosed `\p{` is an error
fn property_escape(s: &str, position: usize) -> Result<Option<PropertyEscape<'_>>> {
    match unicode::parse_property_escape(s) {
        Some(escape) => Ok(Some(escape)),
        None if s.starts_with("\\p{") || s.starts_with("\\P{") => Err(RegexpError::syntax(
            position,
            SyntaxErrorKind::UnclosedUnicodeProperty,
        )),
        None => Ok(None),
    }
}

fn property_ranges(name: &str, position: usize) -> Result<Ranges> {
    unicode::property_ranges(name).ok_or_else(|| {
        RegexpError::unsupported(position, UnsupportedKind::UnicodeProperty(name.to_string()))
    })
}

/// Length of a `[:name:]` or `[:^name:]` at the start of `s`
fn posix_class_len(s: &str) -> Option<usize> {
    let inner = s.strip_prefix("[:")?;
    let close = inner.find(":]")?;
    let name = inner[..close].strip_prefix('^').unwrap_or(&inner[..close]);
    (!name.is_empty() && name.bytes().all(|b| b.is_ascii_alphabetic())).then_some(close + 4)
}

/// Ranges for a whole `[:name:]` class
fn posix_class_ranges(class: &str, position: usize) -> Result<Ranges> {
    let name = &class[2..class.len() - 2];
    let (name, negated) = match name.strip_prefix('^') {
        Some(name) => (name, true),
        None => (name, false),
    };
    let ranges = unicode::posix_ranges(name).ok_or_else(|| {
        RegexpError::unsupported(position, UnsupportedKind::PosixClass(name.to_string()))
    })?;
    Ok(if negated { unicode::complement(&ranges) } else { ranges })
}
