//! Error types for request spec parsing and decoding.

use thiserror::Error;

/// Result type for parse-and-decode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Structural error in the document text.
///
/// Parsing never recovers: the first of these aborts the whole document.
/// Every variant tied to a physical line carries its 1-based line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input bytes are not valid UTF-8.
    #[error("line {0}: invalid UTF-8")]
    InvalidUtf8(usize),

    /// No content lines after comments and blank lines are removed.
    #[error("empty document")]
    EmptyDocument,

    /// Indentation is not a multiple of two spaces.
    #[error("line {0}: indentation must use multiples of 2 spaces")]
    OddIndent(usize),

    /// A nested block opened at the wrong depth.
    #[error("line {line}: expected indent {expected}, got {actual}")]
    ExpectedIndent {
        line: usize,
        expected: usize,
        actual: usize,
    },

    /// A line is indented deeper than its block allows.
    #[error("line {0}: unexpected indentation")]
    UnexpectedIndent(usize),

    /// A mapping line has no unquoted colon or an empty key.
    #[error("line {0}: expected key: value pair")]
    ExpectedKeyValue(usize),

    /// Lines remain after the root block ended.
    #[error("unexpected trailing content at line {0}")]
    TrailingContent(usize),

    /// The document root is a sequence.
    #[error("root must be a mapping")]
    RootNotMapping,

    /// Unknown or truncated backslash escape in a double-quoted string.
    #[error("line {line}: invalid escape sequence \"\\{escape}\" in quoted string")]
    BadEscape { line: usize, escape: String },

    /// Bare double quote inside a double-quoted string.
    #[error("line {0}: unescaped quote in quoted string")]
    StrayQuote(usize),

    /// Unbalanced brackets or an unterminated quote inside `[...]`.
    #[error("line {0}: malformed inline list")]
    MalformedInlineList(usize),
}

/// A field's generic value has the wrong kind for its typed slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} must be {expected}")]
pub struct DecodeError {
    /// Dotted field path, with list indices (`request.messages[1].text`).
    pub field: String,
    /// Article and kind name, e.g. `a string`.
    pub expected: &'static str,
}

impl DecodeError {
    pub(crate) fn new(field: impl Into<String>, expected: &'static str) -> Self {
        Self {
            field: field.into(),
            expected,
        }
    }
}

/// Failure of the parse-then-decode pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("parse request document: {0}")]
    Parse(#[from] ParseError),

    #[error("decode request schema: {0}")]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_cite_line_numbers() {
        assert_eq!(
            ParseError::OddIndent(3).to_string(),
            "line 3: indentation must use multiples of 2 spaces"
        );
        assert_eq!(
            ParseError::BadEscape {
                line: 7,
                escape: "q".into()
            }
            .to_string(),
            "line 7: invalid escape sequence \"\\q\" in quoted string"
        );
    }

    #[test]
    fn test_pipeline_error_prefixes() {
        let err: Error = DecodeError::new("request.url", "a string").into();
        assert_eq!(
            err.to_string(),
            "decode request schema: request.url must be a string"
        );
        let err: Error = ParseError::RootNotMapping.into();
        assert_eq!(
            err.to_string(),
            "parse request document: root must be a mapping"
        );
    }
}
