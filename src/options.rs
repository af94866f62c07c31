use std::fmt;

use crate::constants::DEFAULT_INDENT;

/// Delimiter character used to separate row and inline-array values.
///
/// # Examples
/// ```
/// use toon_codec::Delimiter;
///
/// assert_eq!(Delimiter::Pipe.as_char(), '|');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delimiter {
    #[default]
    Comma,
    Tab,
    Pipe,
}

impl Delimiter {
    pub fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
            Delimiter::Pipe => '|',
        }
    }

    /// Parse a delimiter from its character.
    ///
    /// # Examples
    /// ```
    /// use toon_codec::Delimiter;
    ///
    /// assert_eq!(Delimiter::from_char('|'), Some(Delimiter::Pipe));
    /// assert_eq!(Delimiter::from_char('x'), None);
    /// ```
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ',' => Some(Delimiter::Comma),
            '\t' => Some(Delimiter::Tab),
            '|' => Some(Delimiter::Pipe),
            _ => None,
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Indentation step for nested structures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indent {
    Spaces(usize),
}

impl Indent {
    pub fn get_spaces(self) -> usize {
        match self {
            Indent::Spaces(count) => count,
        }
    }
}

impl Default for Indent {
    fn default() -> Self {
        Indent::Spaces(DEFAULT_INDENT)
    }
}

/// Call-scoped codec configuration.
///
/// The same options must be used for a matching encode/decode pair; a
/// delimiter or indent mismatch between producer and consumer is a caller
/// error, not a codec defect.
///
/// # Examples
/// ```
/// use toon_codec::{Delimiter, ToonOptions};
///
/// let opts = ToonOptions::new()
///     .with_delimiter(Delimiter::Pipe)
///     .with_length_marker(true);
/// assert!(opts.strict);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToonOptions {
    pub indent: Indent,
    pub delimiter: Delimiter,
    pub length_marker: bool,
    pub strict: bool,
}

impl Default for ToonOptions {
    fn default() -> Self {
        Self {
            indent: Indent::default(),
            delimiter: Delimiter::default(),
            length_marker: false,
            strict: true,
        }
    }
}

impl ToonOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    /// Set indentation to a specific number of spaces.
    pub fn with_spaces(mut self, count: usize) -> Self {
        self.indent = Indent::Spaces(count);
        self
    }

    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Prefix declared array counts with `#` (cosmetic).
    pub fn with_length_marker(mut self, length_marker: bool) -> Self {
        self.length_marker = length_marker;
        self
    }

    /// Enable or disable strict decoding (count checks, indentation
    /// checks, blank-line placement).
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
