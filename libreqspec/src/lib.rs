//! Request spec front end.
//!
//! A request file describes one HTTP or WebSocket interaction in a small
//! indentation-based format. This crate turns the text into a typed,
//! checked [`Spec`] and fills in `{{name}}` placeholders.
//!
//! # Pipeline
//!
//! 1. **Scanner**: strips comments and blank lines and measures
//!    indentation.
//!
//! 2. **Block parser**: builds a generic [`Value`] tree whose root is a
//!    [`Map`].
//!
//! 3. **Decoder**: projects the tree onto [`Spec`], failing on the first
//!    field with the wrong kind.
//!
//! 4. **Validator**: reports missing or invalid fields and keys the schema
//!    does not know, as [`Issue`]s.
//!
//! 5. **Interpolation**: substitutes variables from [`resolve_variables`]
//!    into every string of the spec.
//!
//! [`load_file`] runs steps 1 to 4 and splits the issues into blocking
//! errors and warnings.

mod decode;
mod encode;
mod error;
mod interpolate;
mod load;
mod parser;
mod scanner;
mod schema;
mod spec;
mod validate;
mod value;
mod vars;

pub use decode::decode_spec;
pub use encode::{encode, encode_map};
pub use error::{DecodeError, Error, ParseError, Result};
pub use interpolate::{
    interpolate_in_place, interpolate_string, Interpolate, UnresolvedVariableError, Vars,
};
pub use load::{load_file, load_str, LoadError, LoadOptions, LoadResult, REQUEST_FILE_SUFFIX};
pub use parser::parse_document;
pub use scanner::{scan, ParsedLine};
pub use schema::{SchemaNode, REQUEST_FILE};
pub use spec::{Body, BodyMode, Kind, MessageType, Request, Spec, UnknownName, WsMessage};
pub use validate::{validate, Issue, Severity, ValidationError};
pub use value::{Map, Value};
pub use vars::{
    generated_vars, parse_assignment, parse_env_file, resolve_variables, ResolveOptions, VarsError,
};

/// Parse and decode a request document.
///
/// Returns the typed spec together with the raw tree it was decoded from;
/// pass both to [`validate`].
///
/// # Example
///
/// ```
/// use libreqspec::{parse, validate};
///
/// let (spec, raw) = parse("version: 1\nkind: ws\nname: echo\nrequest:\n  url: wss://x.test\n").unwrap();
/// assert_eq!(spec.name, "echo");
/// assert!(validate(&spec, &raw, true).is_empty());
/// ```
pub fn parse(input: &str) -> Result<(Spec, Map)> {
    let raw = parser::parse_document(input)?;
    let spec = decode::decode_spec(&raw)?;
    tracing::trace!(name = %spec.name, kind = %spec.kind, "decoded request spec");
    Ok((spec, raw))
}

/// Like [`parse`], for raw bytes that must be UTF-8.
pub fn parse_bytes(input: &[u8]) -> Result<(Spec, Map)> {
    let text = std::str::from_utf8(input).map_err(|e| {
        let line = input[..e.valid_up_to()]
            .iter()
            .filter(|&&b| b == b'\n')
            .count()
            + 1;
        ParseError::InvalidUtf8(line)
    })?;
    parse(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bytes_reports_bad_utf8_line() {
        let err = parse_bytes(b"name: ok\nkind: \xff\n").unwrap_err();
        assert_eq!(err, Error::Parse(ParseError::InvalidUtf8(2)));
    }

    #[test]
    fn test_parse_stops_at_decode_errors() {
        let err = parse("name: [a]\n").unwrap_err();
        assert_eq!(err.to_string(), "decode request schema: name must be a string");
    }
}
