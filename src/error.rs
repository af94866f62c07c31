use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// All failures the codec can report.
///
/// Every decode-side error carries the 1-based source line it was detected
/// on. Decoding is atomic: an error means no partial tree was produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    /// Malformed whitespace: tab indentation or an indent width that is not
    /// a multiple of the configured step.
    #[error("scan error at line {line}: {message}")]
    Scan { line: usize, message: String },

    /// Structural violation: count mismatch against a declared array
    /// header, an illegal depth jump, unexpected content after a block.
    #[error("structure error at line {line}: {message}")]
    Structure { line: usize, message: String },

    /// Unterminated quoted region or an unknown escape sequence.
    #[error("quoting error at line {line}: {message}")]
    Quoting { line: usize, message: String },

    /// The normalizer cannot represent a host value; `path` points at the
    /// offending location in dot/bracket notation.
    #[error("unsupported value at {path}: {message}")]
    UnsupportedValue { path: String, message: String },

    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("io error: {0}")]
    Io(String),
}

impl Error {
    pub fn scan(line: usize, message: impl Into<String>) -> Self {
        Error::Scan {
            line,
            message: message.into(),
        }
    }

    pub fn structure(line: usize, message: impl Into<String>) -> Self {
        Error::Structure {
            line,
            message: message.into(),
        }
    }

    pub fn quoting(line: usize, message: impl Into<String>) -> Self {
        Error::Quoting {
            line,
            message: message.into(),
        }
    }

    pub fn unsupported(path: impl Into<String>, message: impl Into<String>) -> Self {
        Error::UnsupportedValue {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn serialize(message: impl Into<String>) -> Self {
        Error::Serialize(message.into())
    }

    pub fn deserialize(message: impl Into<String>) -> Self {
        Error::Deserialize(message.into())
    }

    pub fn io(message: impl Into<String>) -> Self {
        Error::Io(message.into())
    }

    /// Source line the error was reported on, when the error is tied to a
    /// location in the input text.
    pub fn line(&self) -> Option<usize> {
        match self {
            Error::Scan { line, .. }
            | Error::Structure { line, .. }
            | Error::Quoting { line, .. } => Some(*line),
            _ => None,
        }
    }
}
