//! Tokenizer for delimited PCRE patterns
//!
//! This module splits a pattern such as `#(?<id>[0-9]+)x#i` into its
//! delimiter, modifiers and body, then scans the body once, left to right,
//! recording every structural construct: character classes, groups,
//! assertions and inline options. Literal text between constructs is not
//! tokenized; consumers read it from the body using the token offsets.

use std::fmt;

use log::{debug, trace};

use crate::error::{RegexpError, Result, SyntaxErrorKind};

/// Letters allowed in `(?i)` and `(?i-s:` option strings
const OPTION_LETTERS: &[u8] = b"imnsxUXJ";

/// A delimited pattern split into its parts
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ParsedPattern {
    /// The opening and closing delimiter
    pub delimiter: char,
    /// Everything after the closing delimiter
    pub modifiers: String,
    /// The body, without delimiters
    pub regexp: String,
    /// Structural tokens, in source order
    pub tokens: Vec<Token>,
}

/// A structural unit of a pattern body
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Token {
    /// Byte offset in the body
    pub pos: usize,
    /// Length in bytes, trailing quantifiers included
    pub len: usize,
    /// What kind of construct this is
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: TokenKind,
}

/// The kind of a token, with the fields relevant to that kind
///
/// Every `*Start` variant carries `end_token`, the index of its matching
/// `*End` token in the token list. Every `*End` variant and character
/// classes carry the quantifiers that follow them verbatim (`"+"`, `"{2,}?"`,
/// `"++"`, or empty).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")
)]
pub enum TokenKind {
    /// `[...]`
    CharacterClass { content: String, quantifiers: String },
    /// `(`, `(?<name>`, `(?P<name>` or `(?'name'`
    CapturingSubpatternStart {
        #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
        name: Option<String>,
        end_token: usize,
    },
    CapturingSubpatternEnd { quantifiers: String },
    /// `(?:`, `(?i:` or `(?>`
    NonCapturingSubpatternStart { subtype: NonCapturingSubtype, end_token: usize },
    NonCapturingSubpatternEnd { quantifiers: String },
    /// `(?=`
    LookaheadAssertionStart { end_token: usize },
    LookaheadAssertionEnd { quantifiers: String },
    /// `(?!`
    NegativeLookaheadAssertionStart { end_token: usize },
    NegativeLookaheadAssertionEnd { quantifiers: String },
    /// `(?<=`
    LookbehindAssertionStart { end_token: usize },
    LookbehindAssertionEnd { quantifiers: String },
    /// `(?<!`
    NegativeLookbehindAssertionStart { end_token: usize },
    NegativeLookbehindAssertionEnd { quantifiers: String },
    /// `(?i)`: an option setting that applies to the rest of the enclosing group
    Option { options: String },
}

/// Flavours of non-capturing groups
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum NonCapturingSubtype {
    /// `(?:`
    Plain,
    /// `(?i:` and friends, holding the option letters
    Options(String),
    /// `(?>`
    Atomic,
}

impl TokenKind {
    /// The camelCase type name used in reports
    pub fn type_name(&self) -> &'static str {
        match self {
            TokenKind::CharacterClass { .. } => "characterClass",
            TokenKind::CapturingSubpatternStart { .. } => "capturingSubpatternStart",
            TokenKind::CapturingSubpatternEnd { .. } => "capturingSubpatternEnd",
            TokenKind::NonCapturingSubpatternStart { .. } => "nonCapturingSubpatternStart",
            TokenKind::NonCapturingSubpatternEnd { .. } => "nonCapturingSubpatternEnd",
            TokenKind::LookaheadAssertionStart { .. } => "lookaheadAssertionStart",
            TokenKind::LookaheadAssertionEnd { .. } => "lookaheadAssertionEnd",
            TokenKind::NegativeLookaheadAssertionStart { .. } => "negativeLookaheadAssertionStart",
            TokenKind::NegativeLookaheadAssertionEnd { .. } => "negativeLookaheadAssertionEnd",
            TokenKind::LookbehindAssertionStart { .. } => "lookbehindAssertionStart",
            TokenKind::LookbehindAssertionEnd { .. } => "lookbehindAssertionEnd",
            TokenKind::NegativeLookbehindAssertionStart { .. } => {
                "negativeLookbehindAssertionStart"
            }
            TokenKind::NegativeLookbehindAssertionEnd { .. } => "negativeLookbehindAssertionEnd",
            TokenKind::Option { .. } => "option",
        }
    }

    /// Index of the matching end token, for start tokens
    pub fn end_token(&self) -> Option<usize> {
        match self {
            TokenKind::CapturingSubpatternStart { end_token, .. }
            | TokenKind::NonCapturingSubpatternStart { end_token, .. }
            | TokenKind::LookaheadAssertionStart { end_token }
            | TokenKind::NegativeLookaheadAssertionStart { end_token }
            | TokenKind::LookbehindAssertionStart { end_token }
            | TokenKind::NegativeLookbehindAssertionStart { end_token } => Some(*end_token),
            _ => None,
        }
    }

    /// Trailing quantifiers, for end tokens and character classes
    pub fn quantifiers(&self) -> Option<&str> {
        match self {
            TokenKind::CharacterClass { quantifiers, .. }
            | TokenKind::CapturingSubpatternEnd { quantifiers }
            | TokenKind::NonCapturingSubpatternEnd { quantifiers }
            | TokenKind::LookaheadAssertionEnd { quantifiers }
            | TokenKind::NegativeLookaheadAssertionEnd { quantifiers }
            | TokenKind::LookbehindAssertionEnd { quantifiers }
            | TokenKind::NegativeLookbehindAssertionEnd { quantifiers } => Some(quantifiers),
            _ => None,
        }
    }

    fn set_end_token(&mut self, index: usize) {
        match self {
            TokenKind::CapturingSubpatternStart { end_token, .. }
            | TokenKind::NonCapturingSubpatternStart { end_token, .. }
            | TokenKind::LookaheadAssertionStart { end_token }
            | TokenKind::NegativeLookaheadAssertionStart { end_token }
            | TokenKind::LookbehindAssertionStart { end_token }
            | TokenKind::NegativeLookbehindAssertionStart { end_token } => *end_token = index,
            _ => {}
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())?;
        match self {
            TokenKind::CharacterClass { content, .. } => write!(f, " [{}]", content)?,
            TokenKind::CapturingSubpatternStart { name: Some(name), .. } => {
                write!(f, " <{}>", name)?
            }
            TokenKind::NonCapturingSubpatternStart { subtype, .. } => match subtype {
                NonCapturingSubtype::Plain => {}
                NonCapturingSubtype::Options(options) => write!(f, " options={}", options)?,
                NonCapturingSubtype::Atomic => write!(f, " atomic")?,
            },
            TokenKind::Option { options } => write!(f, " {}", options)?,
            _ => {}
        }
        if let Some(end_token) = self.end_token() {
            write!(f, " -> #{}", end_token)?;
        }
        match self.quantifiers() {
            Some(quantifiers) if !quantifiers.is_empty() => write!(f, " quantifiers={}", quantifiers),
            _ => Ok(()),
        }
    }
}

/// Group kinds tracked on the open-group stack
#[derive(Debug, Clone, Copy)]
enum Group {
    Capturing,
    NonCapturing,
    Lookahead,
    NegativeLookahead,
    Lookbehind,
    NegativeLookbehind,
}

impl Group {
    fn start(self, name: Option<String>, subtype: NonCapturingSubtype) -> TokenKind {
        let end_token = 0;
        match self {
            Group::Capturing => TokenKind::CapturingSubpatternStart { name, end_token },
            Group::NonCapturing => TokenKind::NonCapturingSubpatternStart { subtype, end_token },
            Group::Lookahead => TokenKind::LookaheadAssertionStart { end_token },
            Group::NegativeLookahead => TokenKind::NegativeLookaheadAssertionStart { end_token },
            Group::Lookbehind => TokenKind::LookbehindAssertionStart { end_token },
            Group::NegativeLookbehind => TokenKind::NegativeLookbehindAssertionStart { end_token },
        }
    }

    fn end(self, quantifiers: String) -> TokenKind {
        match self {
            Group::Capturing => TokenKind::CapturingSubpatternEnd { quantifiers },
            Group::NonCapturing => TokenKind::NonCapturingSubpatternEnd { quantifiers },
            Group::Lookahead => TokenKind::LookaheadAssertionEnd { quantifiers },
            Group::NegativeLookahead => TokenKind::NegativeLookaheadAssertionEnd { quantifiers },
            Group::Lookbehind => TokenKind::LookbehindAssertionEnd { quantifiers },
            Group::NegativeLookbehind => TokenKind::NegativeLookbehindAssertionEnd { quantifiers },
        }
    }
}

/// What an opening parenthesis turned out to be
enum Opening {
    Group(Group, Option<String>, NonCapturingSubtype),
    Option(String),
}

/// Parse a delimited PCRE pattern
///
/// # Example
/// ```
/// use regexp_master_core::{parse_regexp, TokenKind};
///
/// let parsed = parse_regexp("#[a-z]+#i").unwrap();
/// assert_eq!(parsed.delimiter, '#');
/// assert_eq!(parsed.modifiers, "i");
/// assert_eq!(parsed.regexp, "[a-z]+");
/// assert_eq!(
///     parsed.tokens[0].kind,
///     TokenKind::CharacterClass { content: "a-z".into(), quantifiers: "+".into() }
/// );
/// ```
///
/// # Errors
/// Returns [`RegexpError::Syntax`] when the delimiters cannot be found, a
/// class or a group is not closed, a `)` has no opening counterpart, or a
/// `(?...)` construct is not supported.
pub fn parse_regexp(pattern: &str) -> Result<ParsedPattern> {
    let (delimiter, body, modifiers) = split_delimiters(pattern)?;
    let tokens = Tokenizer::new(body).tokenize()?;
    debug!(
        "parsed regexp {:?}: {} tokens, modifiers {:?}",
        body,
        tokens.len(),
        modifiers
    );

    Ok(ParsedPattern {
        delimiter,
        modifiers: modifiers.to_string(),
        regexp: body.to_string(),
        tokens,
    })
}

/// Split a pattern into delimiter, body and modifiers
fn split_delimiters(pattern: &str) -> Result<(char, &str, &str)> {
    let error = || RegexpError::syntax(0, SyntaxErrorKind::Delimiter);

    let delimiter = pattern.chars().next().ok_or_else(error)?;
    if delimiter.is_alphanumeric() || delimiter.is_whitespace() || delimiter == '\\' {
        return Err(error());
    }

    let rest = &pattern[delimiter.len_utf8()..];
    let mut chars = rest.char_indices();
    let mut end = None;
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == delimiter {
            end = Some(i);
            break;
        }
    }

    let end = end.ok_or_else(error)?;
    let modifiers = &rest[end + delimiter.len_utf8()..];
    if !modifiers.bytes().all(|b| b.is_ascii_alphabetic()) {
        return Err(error());
    }

    Ok((delimiter, &rest[..end], modifiers))
}

/// Single-pass scanner over a pattern body
struct Tokenizer<'a> {
    body: &'a str,
    bytes: &'a [u8],
    position: usize,
    tokens: Vec<Token>,
    /// Open groups: index of the start token and its kind
    open: Vec<(usize, Group)>,
}

impl<'a> Tokenizer<'a> {
    fn new(body: &'a str) -> Self {
        Tokenizer {
            body,
            bytes: body.as_bytes(),
            position: 0,
            tokens: Vec::new(),
            open: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        while let Some(&byte) = self.bytes.get(self.position) {
            match byte {
                // An escape consumes the next character, whatever it is
                b'\\' => self.position += 2,
                b'[' => self.character_class()?,
                b'(' => self.open_group()?,
                b')' => self.close_group()?,
                _ => self.position += 1,
            }
        }

        if let Some(&(index, _)) = self.open.first() {
            return Err(RegexpError::syntax(
                self.tokens[index].pos,
                SyntaxErrorKind::UnmatchedLeftParen,
            ));
        }

        Ok(self.tokens)
    }

    fn push(&mut self, token: Token) -> usize {
        trace!("token #{} at {}: {}", self.tokens.len(), token.pos, token.kind);
        self.tokens.push(token);
        self.tokens.len() - 1
    }

    fn byte_at(&self, at: usize) -> Option<u8> {
        self.bytes.get(at).copied()
    }

    fn character_class(&mut self) -> Result<()> {
        let start = self.position;
        let mut i = start + 1;
        if self.byte_at(i) == Some(b'^') {
            i += 1;
        }
        // A `]` right after the opening bracket is a literal
        if self.byte_at(i) == Some(b']') {
            i += 1;
        }

        let close = loop {
            match self.byte_at(i) {
                None => {
                    return Err(RegexpError::syntax(
                        start,
                        SyntaxErrorKind::UnclosedCharacterClass,
                    ));
                }
                Some(b'\\') => i += 2,
                Some(b'[') => i += self.posix_class_len(i).unwrap_or(1),
                Some(b']') => break i,
                Some(_) => i += 1,
            }
        };

        let end = close + 1;
        let quantifiers = self.quantifiers_at(end);
        self.push(Token {
            pos: start,
            len: end + quantifiers.len() - start,
            kind: TokenKind::CharacterClass {
                content: self.body[start + 1..close].to_string(),
                quantifiers: quantifiers.to_string(),
            },
        });
        self.position = end + quantifiers.len();
        Ok(())
    }

    /// Length of a POSIX class such as `[:alpha:]` or `[:^digit:]` starting at `at`
    fn posix_class_len(&self, at: usize) -> Option<usize> {
        if self.byte_at(at + 1) != Some(b':') {
            return None;
        }
        let mut i = at + 2;
        if self.byte_at(i) == Some(b'^') {
            i += 1;
        }
        let name_start = i;
        while self.byte_at(i).is_some_and(|b| b.is_ascii_alphabetic()) {
            i += 1;
        }
        if i > name_start && self.bytes.get(i..i + 2) == Some(b":]".as_slice()) {
            Some(i + 2 - at)
        } else {
            None
        }
    }

    /// The quantifier starting at `at`, with its lazy or possessive suffix
    fn quantifiers_at(&self, at: usize) -> &'a str {
        let mut len = match self.byte_at(at) {
            Some(b'*' | b'+' | b'?') => 1,
            Some(b'{') => {
                let mut i = at + 1;
                let digits = i;
                while self.byte_at(i).is_some_and(|b| b.is_ascii_digit()) {
                    i += 1;
                }
                if i == digits {
                    return "";
                }
                if self.byte_at(i) == Some(b',') {
                    i += 1;
                    while self.byte_at(i).is_some_and(|b| b.is_ascii_digit()) {
                        i += 1;
                    }
                }
                if self.byte_at(i) != Some(b'}') {
                    return "";
                }
                i + 1 - at
            }
            _ => return "",
        };
        if matches!(self.byte_at(at + len), Some(b'+' | b'?')) {
            len += 1;
        }
        &self.body[at..at + len]
    }

    fn open_group(&mut self) -> Result<()> {
        let start = self.position;
        let (len, opening) = self.classify_group(start)?;

        match opening {
            Opening::Group(group, name, subtype) => {
                let index = self.push(Token {
                    pos: start,
                    len,
                    kind: group.start(name, subtype),
                });
                self.open.push((index, group));
            }
            Opening::Option(options) => {
                self.push(Token {
                    pos: start,
                    len,
                    kind: TokenKind::Option { options },
                });
            }
        }

        self.position = start + len;
        Ok(())
    }

    /// Work out what the `(` at `start` opens, and how long its opening is
    fn classify_group(&self, start: usize) -> Result<(usize, Opening)> {
        let plain = |group| Opening::Group(group, None, NonCapturingSubtype::Plain);

        if self.byte_at(start + 1) != Some(b'?') {
            return Ok((1, plain(Group::Capturing)));
        }

        let opening = match self.byte_at(start + 2) {
            Some(b':') => (3, plain(Group::NonCapturing)),
            Some(b'>') => (
                3,
                Opening::Group(Group::NonCapturing, None, NonCapturingSubtype::Atomic),
            ),
            Some(b'=') => (3, plain(Group::Lookahead)),
            Some(b'!') => (3, plain(Group::NegativeLookahead)),
            Some(b'<') => match self.byte_at(start + 3) {
                Some(b'=') => (4, plain(Group::Lookbehind)),
                Some(b'!') => (4, plain(Group::NegativeLookbehind)),
                _ => self.named_group(start, 3, b'>')?,
            },
            Some(b'P') if self.byte_at(start + 3) == Some(b'<') => {
                self.named_group(start, 4, b'>')?
            }
            Some(b'\'') => self.named_group(start, 3, b'\'')?,
            _ => self.option_group(start)?,
        };

        Ok(opening)
    }

    /// `(?<name>`, `(?P<name>` or `(?'name'`, with the name starting at `start + offset`
    fn named_group(&self, start: usize, offset: usize, terminator: u8) -> Result<(usize, Opening)> {
        let name_start = start + offset;
        let mut i = name_start;
        while self
            .byte_at(i)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_')
        {
            i += 1;
        }

        let valid = i > name_start && !self.bytes[name_start].is_ascii_digit();
        if !valid || self.byte_at(i) != Some(terminator) {
            return Err(RegexpError::syntax(start, SyntaxErrorKind::UnsupportedSubpattern));
        }

        let name = self.body[name_start..i].to_string();
        Ok((
            i + 1 - start,
            Opening::Group(Group::Capturing, Some(name), NonCapturingSubtype::Plain),
        ))
    }

    /// `(?i:` option groups and `(?i)` option settings
    ///
    /// Only the PCRE option letters are accepted; `(?R)`, `(?C)` and an option
    /// string ending in `-` are unsupported subpatterns.
    fn option_group(&self, start: usize) -> Result<(usize, Opening)> {
        let letters = |mut i: usize| {
            while self.byte_at(i).is_some_and(|b| OPTION_LETTERS.contains(&b)) {
                i += 1;
            }
            i
        };

        let mut i = letters(start + 2);
        if self.byte_at(i) == Some(b'-') {
            i = letters(i + 1);
        }

        let options = &self.body[start + 2..i];
        let unsupported = || RegexpError::syntax(start, SyntaxErrorKind::UnsupportedSubpattern);
        if options.is_empty() || options.ends_with('-') {
            return Err(unsupported());
        }

        let subtype = NonCapturingSubtype::Options(options.to_string());
        match self.byte_at(i) {
            Some(b':') => Ok((
                i + 1 - start,
                Opening::Group(Group::NonCapturing, None, subtype),
            )),
            Some(b')') => Ok((i + 1 - start, Opening::Option(options.to_string()))),
            _ => Err(unsupported()),
        }
    }

    fn close_group(&mut self) -> Result<()> {
        let pos = self.position;
        let (start_index, group) = self
            .open
            .pop()
            .ok_or_else(|| RegexpError::syntax(pos, SyntaxErrorKind::UnmatchedRightParen))?;

        let quantifiers = self.quantifiers_at(pos + 1);
        let end_index = self.push(Token {
            pos,
            len: 1 + quantifiers.len(),
            kind: group.end(quantifiers.to_string()),
        });
        self.tokens[start_index].kind.set_end_token(end_index);

        self.position = pos + 1 + quantifiers.len();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(pattern: &str) -> ParsedPattern {
        parse_regexp(pattern).unwrap()
    }

    fn error_of(pattern: &str) -> RegexpError {
        parse_regexp(pattern).unwrap_err()
    }

    fn token(pos: usize, len: usize, kind: TokenKind) -> Token {
        Token { pos, len, kind }
    }

    fn end_q(quantifiers: &str) -> String {
        quantifiers.to_string()
    }

    #[test]
    fn test_plain_regexp() {
        assert_eq!(
            parse("#foo#"),
            ParsedPattern {
                delimiter: '#',
                modifiers: String::new(),
                regexp: "foo".to_string(),
                tokens: vec![],
            }
        );
    }

    #[test]
    fn test_modifiers() {
        let parsed = parse("#foo#iD");
        assert_eq!(parsed.modifiers, "iD");
        assert_eq!(parsed.regexp, "foo");
    }

    #[test]
    fn test_delimiter_errors() {
        for pattern in ["#foo/iD", "", "afooa", "#foo#i x", "#foo\\#"] {
            let err = error_of(pattern);
            assert_eq!(
                err,
                RegexpError::syntax(0, SyntaxErrorKind::Delimiter),
                "pattern {:?}",
                pattern
            );
        }
        assert!(error_of("#foo/iD").to_string().contains("Could not parse regexp delimiters"));
    }

    #[test]
    fn test_escaped_delimiter_in_body() {
        let parsed = parse("/a\\/b/i");
        assert_eq!(parsed.delimiter, '/');
        assert_eq!(parsed.regexp, "a\\/b");
        assert_eq!(parsed.modifiers, "i");
    }

    #[test]
    fn test_character_class() {
        assert_eq!(
            parse("#[a-z]#").tokens,
            vec![token(
                0,
                5,
                TokenKind::CharacterClass { content: "a-z".into(), quantifiers: end_q("") }
            )]
        );
    }

    #[test]
    fn test_character_class_with_quantifiers() {
        assert_eq!(
            parse("#[a-z]+#").tokens,
            vec![token(
                0,
                6,
                TokenKind::CharacterClass { content: "a-z".into(), quantifiers: end_q("+") }
            )]
        );
        assert_eq!(
            parse("#[a-z]{2,5}?#").tokens[0].kind.quantifiers(),
            Some("{2,5}?")
        );
        assert_eq!(parse("#[a-z]{,5}#").tokens[0].kind.quantifiers(), Some(""));
    }

    #[test]
    fn test_character_class_with_escaped_bracket() {
        assert_eq!(
            parse("#[a-z\\]]#").tokens,
            vec![token(
                0,
                7,
                TokenKind::CharacterClass { content: "a-z\\]".into(), quantifiers: end_q("") }
            )]
        );
    }

    #[test]
    fn test_character_class_leading_bracket() {
        let parsed = parse("#[]a][^]b]#");
        assert_eq!(
            parsed.tokens,
            vec![
                token(0, 4, TokenKind::CharacterClass { content: "]a".into(), quantifiers: end_q("") }),
                token(4, 5, TokenKind::CharacterClass { content: "^]b".into(), quantifiers: end_q("") }),
            ]
        );
    }

    #[test]
    fn test_character_class_posix() {
        let parsed = parse("#[[:alpha:]_]+#");
        assert_eq!(
            parsed.tokens,
            vec![token(
                0,
                13,
                TokenKind::CharacterClass {
                    content: "[:alpha:]_".into(),
                    quantifiers: end_q("+"),
                }
            )]
        );
    }

    #[test]
    fn test_unclosed_character_class() {
        let err = error_of("#[a-z)#");
        assert_eq!(err, RegexpError::syntax(0, SyntaxErrorKind::UnclosedCharacterClass));
        assert_eq!(err.to_string(), "Could not find matching bracket from pos 0");
    }

    #[test]
    fn test_escaped_brackets_and_parens() {
        assert!(parse("#\\[x\\]#").tokens.is_empty());
        assert!(parse("#\\(x\\)#").tokens.is_empty());
    }

    #[test]
    fn test_non_capturing_subpattern() {
        assert_eq!(
            parse("#(?:x+)#").tokens,
            vec![
                token(
                    0,
                    3,
                    TokenKind::NonCapturingSubpatternStart {
                        subtype: NonCapturingSubtype::Plain,
                        end_token: 1,
                    }
                ),
                token(5, 1, TokenKind::NonCapturingSubpatternEnd { quantifiers: end_q("") }),
            ]
        );
    }

    #[test]
    fn test_atomic_subpattern() {
        assert_eq!(
            parse("#(?>x+)#").tokens,
            vec![
                token(
                    0,
                    3,
                    TokenKind::NonCapturingSubpatternStart {
                        subtype: NonCapturingSubtype::Atomic,
                        end_token: 1,
                    }
                ),
                token(5, 1, TokenKind::NonCapturingSubpatternEnd { quantifiers: end_q("") }),
            ]
        );
    }

    #[test]
    fn test_non_capturing_subpattern_with_quantifiers() {
        assert_eq!(
            parse("#(?:x+)++#").tokens[1],
            token(5, 3, TokenKind::NonCapturingSubpatternEnd { quantifiers: end_q("++") })
        );
    }

    #[test]
    fn test_non_capturing_subpattern_with_options() {
        assert_eq!(
            parse("#(?i:x+)#").tokens,
            vec![
                token(
                    0,
                    4,
                    TokenKind::NonCapturingSubpatternStart {
                        subtype: NonCapturingSubtype::Options("i".into()),
                        end_token: 1,
                    }
                ),
                token(6, 1, TokenKind::NonCapturingSubpatternEnd { quantifiers: end_q("") }),
            ]
        );
        assert_eq!(
            parse("#(?i-s:x)#").tokens[0].kind,
            TokenKind::NonCapturingSubpatternStart {
                subtype: NonCapturingSubtype::Options("i-s".into()),
                end_token: 1,
            }
        );
    }

    #[test]
    fn test_option_setting() {
        assert_eq!(
            parse("#(?i)abc#").tokens,
            vec![token(0, 4, TokenKind::Option { options: "i".into() })]
        );
        assert_eq!(
            parse("#(?-i)abc#").tokens,
            vec![token(0, 5, TokenKind::Option { options: "-i".into() })]
        );
        assert_eq!(
            parse("#(?imsxUJ)#").tokens[0].kind,
            TokenKind::Option { options: "imsxUJ".into() }
        );
    }

    #[test]
    fn test_named_subpatterns() {
        let expected = |len: usize, end: usize| {
            vec![
                token(
                    0,
                    len,
                    TokenKind::CapturingSubpatternStart { name: Some("foo".into()), end_token: 1 },
                ),
                token(end, 1, TokenKind::CapturingSubpatternEnd { quantifiers: end_q("") }),
            ]
        };
        assert_eq!(parse("#(?<foo>x+)#").tokens, expected(7, 9));
        assert_eq!(parse("#(?P<foo>x+)#").tokens, expected(8, 10));
        assert_eq!(parse("#(?'foo'x+)#").tokens, expected(7, 9));
    }

    #[test]
    fn test_capturing_subpatterns() {
        let parsed = parse("/(x+)(abc\\d+)/");
        assert_eq!(parsed.delimiter, '/');
        assert_eq!(
            parsed.tokens,
            vec![
                token(0, 1, TokenKind::CapturingSubpatternStart { name: None, end_token: 1 }),
                token(3, 1, TokenKind::CapturingSubpatternEnd { quantifiers: end_q("") }),
                token(4, 1, TokenKind::CapturingSubpatternStart { name: None, end_token: 3 }),
                token(11, 1, TokenKind::CapturingSubpatternEnd { quantifiers: end_q("") }),
            ]
        );
    }

    #[test]
    fn test_nested_subpatterns() {
        let tokens = parse("#((?:a)[b])*#").tokens;
        let names: Vec<_> = tokens.iter().map(|t| t.kind.type_name()).collect();
        assert_eq!(
            names,
            vec![
                "capturingSubpatternStart",
                "nonCapturingSubpatternStart",
                "nonCapturingSubpatternEnd",
                "characterClass",
                "capturingSubpatternEnd",
            ]
        );
        assert_eq!(tokens[0].kind.end_token(), Some(4));
        assert_eq!(tokens[1].kind.end_token(), Some(2));
        assert_eq!(tokens[4].kind.quantifiers(), Some("*"));
    }

    #[test]
    fn test_unmatched_right_paren() {
        let err = error_of("#a-z)#");
        assert_eq!(err, RegexpError::syntax(3, SyntaxErrorKind::UnmatchedRightParen));
        assert_eq!(
            err.to_string(),
            "Could not find matching pattern start for right parenthesis at pos 3"
        );
    }

    #[test]
    fn test_unmatched_left_paren() {
        let err = error_of("#(a-z#");
        assert_eq!(err, RegexpError::syntax(0, SyntaxErrorKind::UnmatchedLeftParen));
        assert_eq!(
            err.to_string(),
            "Could not find matching pattern end for left parenthesis at pos 0"
        );
        assert_eq!(
            error_of("#x((a)#"),
            RegexpError::syntax(1, SyntaxErrorKind::UnmatchedLeftParen)
        );
    }

    #[test]
    fn test_unsupported_subpatterns() {
        for pattern in [
            "#(?(condition)yes-pattern|no-pattern)#",
            "#(?#comment)#",
            "#(?<1a>x)#",
            "#(?)#",
            "#(?R)#",
            "#(?C)#",
            "#(?i-)#",
            "#(?i-:x)#",
            "#(?-)#",
            "#(?ia)#",
        ] {
            let err = error_of(pattern);
            assert_eq!(
                err,
                RegexpError::syntax(0, SyntaxErrorKind::UnsupportedSubpattern),
                "pattern {:?}",
                pattern
            );
        }
        assert_eq!(
            error_of("#(?(condition)yes-pattern|no-pattern)#").to_string(),
            "Unsupported subpattern type at pos 0"
        );
    }

    #[test]
    fn test_assertions() {
        let cases = [
            ("#(?=foo)#", 3, "lookaheadAssertionStart", "lookaheadAssertionEnd"),
            ("#(?!foo)#", 3, "negativeLookaheadAssertionStart", "negativeLookaheadAssertionEnd"),
            ("#(?<=foo)#", 4, "lookbehindAssertionStart", "lookbehindAssertionEnd"),
            ("#(?<!foo)#", 4, "negativeLookbehindAssertionStart", "negativeLookbehindAssertionEnd"),
        ];
        for (pattern, len, start, end) in cases {
            let tokens = parse(pattern).tokens;
            assert_eq!(tokens.len(), 2);
            assert_eq!((tokens[0].pos, tokens[0].len), (0, len));
            assert_eq!(tokens[0].kind.type_name(), start);
            assert_eq!(tokens[0].kind.end_token(), Some(1));
            assert_eq!((tokens[1].pos, tokens[1].len), (len + 3, 1));
            assert_eq!(tokens[1].kind.type_name(), end);
        }
    }

    #[test]
    fn test_multibyte_offsets() {
        let parsed = parse("#é(ü)[ß]#");
        let positions: Vec<_> = parsed.tokens.iter().map(|t| (t.pos, t.len)).collect();
        assert_eq!(positions, vec![(2, 1), (5, 1), (6, 4)]);
    }

    #[test]
    fn test_display() {
        let tokens = parse("#(?<id>x)[a-z]+#").tokens;
        assert_eq!(tokens[0].kind.to_string(), "capturingSubpatternStart <id> -> #1");
        assert_eq!(tokens[2].kind.to_string(), "characterClass [a-z] quantifiers=+");
    }
}
