//! Options for building a regexp from a word list
//!
//! Options are plain struct fields with builder-style setters. Callers that
//! receive options by name (configuration files, the CLI) go through
//! [`ListOptions::set_option`], which dispatches through a fixed table of
//! typed setters.

use std::collections::HashMap;

use crate::error::{RegexpError, Result};

/// Mapping from a literal substring to the raw regex fragment that replaces it
pub type SpecialCharsMap = HashMap<String, String>;

/// Options accepted by [`build_regexp_from_list`](crate::build_regexp_from_list)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Substrings that are spliced in as raw regex fragments instead of being escaped
    pub special_chars: SpecialCharsMap,
    /// Never prepend the leading lookahead assertion
    pub disable_lookahead: bool,
}

/// A dynamically typed option value, as received by [`ListOptions::set_option`]
#[derive(Debug, Clone, PartialEq)]
pub enum OptionValue {
    Bool(bool),
    Map(SpecialCharsMap),
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<SpecialCharsMap> for OptionValue {
    fn from(value: SpecialCharsMap) -> Self {
        OptionValue::Map(value)
    }
}

type Setter = fn(&mut ListOptions, OptionValue) -> Result<()>;

/// Option names and their setters
const SETTERS: &[(&str, Setter)] = &[
    ("specialChars", set_special_chars as Setter),
    ("disableLookahead", set_disable_lookahead as Setter),
];

fn set_special_chars(options: &mut ListOptions, value: OptionValue) -> Result<()> {
    match value {
        OptionValue::Map(map) => {
            options.special_chars = map;
            Ok(())
        }
        OptionValue::Bool(_) => Err(RegexpError::InvalidOptionValue {
            name: "specialChars".to_string(),
            expected: "a map of strings",
        }),
    }
}

fn set_disable_lookahead(options: &mut ListOptions, value: OptionValue) -> Result<()> {
    match value {
        OptionValue::Bool(yes) => {
            options.disable_lookahead = yes;
            Ok(())
        }
        OptionValue::Map(_) => Err(RegexpError::InvalidOptionValue {
            name: "disableLookahead".to_string(),
            expected: "a boolean",
        }),
    }
}

impl ListOptions {
    /// Create options with every default
    pub fn new() -> Self {
        Self::default()
    }

    /// Splice `fragment` in verbatim wherever `literal` occurs in a word
    pub fn special_char(mut self, literal: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.special_chars.insert(literal.into(), fragment.into());
        self
    }

    /// Enable or disable the leading lookahead assertion
    pub fn disable_lookahead(mut self, yes: bool) -> Self {
        self.disable_lookahead = yes;
        self
    }

    /// Set an option by name
    ///
    /// # Errors
    /// Returns [`RegexpError::UnknownOption`] for names outside of
    /// [`ListOptions::option_names`] and [`RegexpError::InvalidOptionValue`]
    /// when the value has the wrong type.
    pub fn set_option(&mut self, name: &str, value: impl Into<OptionValue>) -> Result<()> {
        let (_, setter) = SETTERS
            .iter()
            .find(|(option, _)| *option == name)
            .ok_or_else(|| RegexpError::UnknownOption(name.to_string()))?;
        setter(self, value.into())
    }

    /// Names accepted by [`ListOptions::set_option`]
    pub fn option_names() -> impl Iterator<Item = &'static str> {
        SETTERS.iter().map(|(name, _)| *name)
    }
}
