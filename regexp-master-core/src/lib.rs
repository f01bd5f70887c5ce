//! Regexp Master Core Library
//!
//! Three independent regexp utilities:
//!
//! - [`build_regexp_from_list`] compiles a list of words into one compact
//!   regexp that matches exactly those words
//! - [`parse_regexp`] tokenizes a delimited PCRE pattern into its structural
//!   constructs
//! - [`pcre_to_js`] transpiles a PCRE pattern into a JavaScript regexp literal

pub mod builder;
pub mod error;
pub mod options;
pub mod tokenizer;
pub mod transpiler;
mod unicode;

pub use builder::build_regexp_from_list;
pub use error::{RegexpError, Result, SyntaxErrorKind, UnsupportedKind};
pub use options::{ListOptions, OptionValue, SpecialCharsMap};
pub use tokenizer::{NonCapturingSubtype, ParsedPattern, Token, TokenKind, parse_regexp};
pub use transpiler::{NamedCaptureMap, pcre_to_js};
