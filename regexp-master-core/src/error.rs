//! Error types for the regexp compiler
//!
//! This module provides error handling using the `thiserror` crate.
//! Errors are categorized by their source: word list validation, pattern
//! syntax, constructs that JavaScript cannot express, or option handling.

use thiserror::Error;

/// The main error type for the regexp compiler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegexpError {
    /// A word passed to the list builder is not well-formed UTF-8
    #[error("Invalid UTF-8 string (word {word})")]
    InvalidUtf8 {
        /// Index of the offending word in the input list
        word: usize,
    },

    /// The pattern could not be tokenized
    #[error("{kind} {} pos {position}", preposition(.kind))]
    Syntax {
        /// Byte offset in the pattern body where the error occurred
        position: usize,
        /// The specific kind of syntax error
        kind: SyntaxErrorKind,
    },

    /// The pattern uses a construct with no JavaScript equivalent
    #[error("{kind} at pos {position}")]
    Unsupported {
        /// Byte offset in the pattern body where the construct starts, or in
        /// the whole pattern for a rejected modifier
        position: usize,
        /// The construct that was rejected
        kind: UnsupportedKind,
    },

    /// `ListOptions::set_option` was given a name it does not know
    #[error("Option '{0}' does not exist")]
    UnknownOption(String),

    /// `ListOptions::set_option` was given a value of the wrong type
    #[error("Option '{name}' expects {expected}")]
    InvalidOptionValue {
        /// The option name
        name: String,
        /// Description of the expected value type
        expected: &'static str,
    },
}

/// Specific kinds of pattern syntax errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// No valid closing delimiter, or garbage after it
    #[error("Could not parse regexp delimiters")]
    Delimiter,

    /// `[` without a matching unescaped `]`
    #[error("Could not find matching bracket")]
    UnclosedCharacterClass,

    /// `)` with no open group
    #[error("Could not find matching pattern start for right parenthesis")]
    UnmatchedRightParen,

    /// A group opened but never closed
    #[error("Could not find matching pattern end for left parenthesis")]
    UnmatchedLeftParen,

    /// A `(?...)` construct outside of the recognized set
    #[error("Unsupported subpattern type")]
    UnsupportedSubpattern,

    /// `\p{` or `\P{` without a closing brace
    #[error("Could not find closing brace of Unicode property")]
    UnclosedUnicodeProperty,
}

/// Constructs rejected by the JavaScript transpiler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnsupportedKind {
    /// Global inline option setting such as `(?i)`
    #[error("Regexp options are not supported")]
    Options,

    /// Inline-option group such as `(?i:...)`
    #[error("Subpattern options are not supported")]
    SubpatternOptions,

    /// `(?<=...)`
    #[error("Lookbehind assertions are not supported")]
    Lookbehind,

    /// `(?<!...)`
    #[error("Negative lookbehind assertions are not supported")]
    NegativeLookbehind,

    /// `\p{...}` with a property other than Letter
    #[error("Unsupported Unicode property '{0}'")]
    UnicodeProperty(String),

    /// `\k<name>` or `\g{-N}` pointing at no group opened so far
    #[error("Unresolved backreference '{0}'")]
    Backreference(String),

    /// `[:name:]` with an unknown or unexpandable name
    #[error("Unsupported POSIX class '{0}'")]
    PosixClass(String),

    /// A pattern modifier that changes matching in a way JavaScript cannot
    #[error("Unsupported modifier '{0}'")]
    Modifier(char),
}

/// An unclosed class is reported from where the search started
fn preposition(kind: &SyntaxErrorKind) -> &'static str {
    match kind {
        SyntaxErrorKind::UnclosedCharacterClass => "from",
        _ => "at",
    }
}

impl RegexpError {
    /// Build a syntax error
    pub fn syntax(position: usize, kind: SyntaxErrorKind) -> Self {
        RegexpError::Syntax { position, kind }
    }

    /// Build an unsupported-construct error
    pub fn unsupported(position: usize, kind: UnsupportedKind) -> Self {
        RegexpError::Unsupported { position, kind }
    }

    /// The offending position in the pattern body, when there is one
    pub fn position(&self) -> Option<usize> {
        match self {
            RegexpError::Syntax { position, .. } | RegexpError::Unsupported { position, .. } => {
                Some(*position)
            }
            _ => None,
        }
    }
}

/// Result type alias for regexp operations
pub type Result<T> = std::result::Result<T, RegexpError>;
