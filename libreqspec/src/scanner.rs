//! Phase 1: Line preprocessor
//!
//! The scanner converts raw source text into parsed lines. It performs:
//! - Comment stripping (a `#` outside quotes runs to end of line)
//! - Blank line removal
//! - Indentation counting and validation (multiples of two spaces)

use crate::error::ParseError;

/// A single content line after preprocessing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    /// One-based line number in the source, for diagnostics.
    pub number: usize,
    /// Number of leading spaces.
    pub indent: usize,
    /// Content with comment and surrounding whitespace removed.
    pub text: String,
}

/// Quote tracking shared by comment stripping, key splitting, and inline
/// list splitting, so all three agree on what is "inside quotes".
///
/// Single quotes toggle outside double quotes. Backslash escapes are only
/// recognized inside double quotes.
#[derive(Debug, Default)]
pub(crate) struct QuoteState {
    in_single: bool,
    in_double: bool,
    escaped: bool,
}

impl QuoteState {
    /// Feed one character. Returns `true` when the character is plain text
    /// outside of any quotes (quote delimiters themselves return `false`).
    pub(crate) fn step(&mut self, c: char) -> bool {
        if c == '\\' && self.in_double && !self.escaped {
            self.escaped = true;
            return false;
        }
        let outside = match c {
            '\'' if !self.in_double => {
                self.in_single = !self.in_single;
                false
            }
            '"' if !self.in_single && !self.escaped => {
                self.in_double = !self.in_double;
                false
            }
            _ => !self.in_single && !self.in_double,
        };
        self.escaped = false;
        outside
    }

    /// Whether a quote opened and never closed.
    pub(crate) fn is_open(&self) -> bool {
        self.in_single || self.in_double
    }
}

/// Scan source text into content lines.
pub fn scan(source: &str) -> Result<Vec<ParsedLine>, ParseError> {
    let mut lines = Vec::new();

    for (i, raw) in source.split('\n').enumerate() {
        let number = i + 1;
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        let line = strip_comment(raw);

        if line.trim().is_empty() {
            continue;
        }

        let indent = count_indent(line);
        if indent % 2 != 0 {
            return Err(ParseError::OddIndent(number));
        }

        lines.push(ParsedLine {
            number,
            indent,
            text: line.trim().to_string(),
        });
    }

    Ok(lines)
}

/// Remove a trailing comment that starts at an unquoted `#`.
fn strip_comment(line: &str) -> &str {
    let mut quotes = QuoteState::default();
    for (i, c) in line.char_indices() {
        if quotes.step(c) && c == '#' {
            return &line[..i];
        }
    }
    line
}

/// Count the number of leading spaces in a line.
fn count_indent(line: &str) -> usize {
    line.bytes().take_while(|&b| b == b' ').count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_indent() {
        assert_eq!(count_indent(""), 0);
        assert_eq!(count_indent("hello"), 0);
        assert_eq!(count_indent("  hello"), 2);
        assert_eq!(count_indent("    hello"), 4);
    }

    #[test]
    fn test_scan_simple() {
        let lines = scan("name: ping").unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "name: ping");
        assert_eq!(lines[0].indent, 0);
        assert_eq!(lines[0].number, 1);
    }

    #[test]
    fn test_scan_skips_blank_and_comment_lines() {
        let lines = scan("# header\n\nkind: http\n   \n  # indented comment\nname: x\n").unwrap();
        let numbers: Vec<usize> = lines.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![3, 6]);
    }

    #[test]
    fn test_strip_trailing_comment() {
        assert_eq!(strip_comment("url: x # note"), "url: x ");
        assert_eq!(strip_comment("a: \"#not\" # yes"), "a: \"#not\" ");
        assert_eq!(strip_comment("a: '#not'"), "a: '#not'");
        assert_eq!(strip_comment("a: \"say \\\"#\\\"\""), "a: \"say \\\"#\\\"\"");
    }

    #[test]
    fn test_backslash_is_literal_in_single_quotes() {
        assert_eq!(strip_comment(r"a: 'c:\' # x"), r"a: 'c:\' ");
    }

    #[test]
    fn test_odd_indent_error() {
        let err = scan("request:\n   url: x").unwrap_err();
        assert_eq!(err, ParseError::OddIndent(2));
    }

    #[test]
    fn test_crlf_line_endings() {
        let lines = scan("a: 1\r\n  b: 2\r\n").unwrap();
        assert_eq!(lines[0].text, "a: 1");
        assert_eq!(lines[1].indent, 2);
        assert_eq!(lines[1].text, "b: 2");
    }
}
