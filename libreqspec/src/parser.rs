//! Phase 2: Block parser
//!
//! The block parser recursively consumes scanned lines to build a [`Value`]
//! tree. Each recursion level expects an exact indentation:
//! - Mapping: `key: scalar` or `key:` followed by a nested block two
//!   columns deeper than the key
//! - Sequence: `- item` lines; an item containing an unquoted colon starts
//!   an inline mapping whose remaining keys line up with the first key
//! - Scalars: flow lists, quoted strings, keywords, integers, bare text

use crate::error::ParseError;
use crate::scanner::{self, ParsedLine, QuoteState};
use crate::value::{Map, Value};

type Result<T> = std::result::Result<T, ParseError>;

/// Parse a document whose root must be a mapping.
pub fn parse_document(input: &str) -> Result<Map> {
    let lines = scanner::scan(input)?;
    let first = lines.first().ok_or(ParseError::EmptyDocument)?;

    let (value, next) = parse_block(&lines, 0, first.indent)?;
    if let Some(line) = lines.get(next) {
        return Err(ParseError::TrailingContent(line.number));
    }

    match value {
        Value::Map(map) => Ok(map),
        _ => Err(ParseError::RootNotMapping),
    }
}

// ============================================================================
// Block Parsing
// ============================================================================

/// Parse the block starting at line `i`, which must sit at `indent`.
fn parse_block(lines: &[ParsedLine], i: usize, indent: usize) -> Result<(Value, usize)> {
    let line = &lines[i];
    if line.indent != indent {
        return Err(ParseError::ExpectedIndent {
            line: line.number,
            expected: indent,
            actual: line.indent,
        });
    }

    if item_text(&line.text).is_some() {
        let (items, next) = parse_sequence(lines, i, indent)?;
        return Ok((Value::List(items), next));
    }

    let (map, next) = parse_entries(lines, i, indent, Map::new())?;
    Ok((Value::Map(map), next))
}

/// Parse `key: value` lines at exactly `indent` into `map`.
///
/// Stops at the first shallower line or at a sequence item on the same
/// level. Also used for the trailing keys of an inline mapping item.
fn parse_entries(
    lines: &[ParsedLine],
    mut i: usize,
    indent: usize,
    mut map: Map,
) -> Result<(Map, usize)> {
    while let Some(line) = lines.get(i) {
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(ParseError::UnexpectedIndent(line.number));
        }
        if item_text(&line.text).is_some() {
            break;
        }

        let (key, rest) =
            split_key_value(&line.text).ok_or(ParseError::ExpectedKeyValue(line.number))?;
        let (value, next) = parse_entry_value(lines, i, indent, rest)?;
        map.insert(key, value);
        i = next;
    }

    Ok((map, i))
}

/// Parse the value of the entry on line `i` whose key starts at `column`.
fn parse_entry_value(
    lines: &[ParsedLine],
    i: usize,
    column: usize,
    rest: &str,
) -> Result<(Value, usize)> {
    if !rest.is_empty() {
        let value = parse_scalar(rest, lines[i].number)?;
        return Ok((value, i + 1));
    }
    parse_nested(lines, i + 1, column + 2)
}

/// Parse a nested block expected at `indent`, or yield null when the next
/// line does not reach that depth.
fn parse_nested(lines: &[ParsedLine], i: usize, indent: usize) -> Result<(Value, usize)> {
    match lines.get(i) {
        Some(next) if next.indent >= indent => parse_block(lines, i, indent),
        _ => Ok((Value::Null, i)),
    }
}

/// Parse `- item` lines at exactly `indent`.
fn parse_sequence(lines: &[ParsedLine], mut i: usize, indent: usize) -> Result<(Vec<Value>, usize)> {
    let mut items = Vec::new();

    while let Some(line) = lines.get(i) {
        if line.indent < indent {
            break;
        }
        if line.indent > indent {
            return Err(ParseError::UnexpectedIndent(line.number));
        }
        let Some(text) = item_text(&line.text) else {
            break;
        };

        let (item, next) = parse_item(lines, i, indent, text)?;
        items.push(item);
        i = next;
    }

    Ok((items, i))
}

/// Parse one sequence item whose marker sits at `indent`.
fn parse_item(lines: &[ParsedLine], i: usize, indent: usize, text: &str) -> Result<(Value, usize)> {
    if text.is_empty() {
        return parse_nested(lines, i + 1, indent + 2);
    }

    if let Some((key, rest)) = split_key_value(text) {
        // The item's content column is two past the dash.
        let column = indent + 2;
        let (first, next) = parse_entry_value(lines, i, column, rest)?;
        let mut map = Map::new();
        map.insert(key, first);
        let (map, next) = parse_entries(lines, next, column, map)?;
        return Ok((Value::Map(map), next));
    }

    let value = parse_scalar(text, lines[i].number)?;
    Ok((value, i + 1))
}

/// Content of a sequence item line, or `None` if the line is not an item.
fn item_text(text: &str) -> Option<&str> {
    if text == "-" {
        return Some("");
    }
    text.strip_prefix("- ").map(str::trim)
}

/// Split on the first unquoted colon into key and trimmed remainder.
fn split_key_value(text: &str) -> Option<(String, &str)> {
    let mut quotes = QuoteState::default();
    for (i, c) in text.char_indices() {
        if quotes.step(c) && c == ':' {
            let key = text[..i].trim();
            if key.is_empty() {
                return None;
            }
            return Some((parse_key_name(key), text[i + 1..].trim()));
        }
    }
    None
}

/// Extract the key name, handling quoted keys.
fn parse_key_name(s: &str) -> String {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        let inner = &s[1..s.len() - 1];
        return inner.replace("\\\"", "\"").replace("\\\\", "\\");
    }
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        return s[1..s.len() - 1].replace("''", "'");
    }
    s.to_string()
}

// ============================================================================
// Scalar Parsing
// ============================================================================

/// Parse a scalar value from trimmed text found on `line`.
pub(crate) fn parse_scalar(text: &str, line: usize) -> Result<Value> {
    if text.is_empty() {
        return Ok(Value::String(String::new()));
    }

    // Inline list
    if let Some(inner) = text.strip_prefix('[').and_then(|t| t.strip_suffix(']')) {
        return parse_inline_list(inner, line).map(Value::List);
    }

    if text.len() >= 2 {
        if text.starts_with('"') && text.ends_with('"') {
            return parse_double_quoted(&text[1..text.len() - 1], line).map(Value::String);
        }
        if text.starts_with('\'') && text.ends_with('\'') {
            return Ok(Value::String(text[1..text.len() - 1].replace("''", "'")));
        }
    }

    if let Some(v) = parse_keyword(text) {
        return Ok(v);
    }

    if let Ok(n) = text.parse::<i64>() {
        return Ok(Value::Int(n));
    }

    Ok(Value::String(text.to_string()))
}

/// Check if text is a keyword and return its value.
fn parse_keyword(text: &str) -> Option<Value> {
    match text {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        "null" | "~" => Some(Value::Null),
        _ => None,
    }
}

/// Split the inside of `[...]` on top-level unquoted commas and parse each
/// segment as a scalar. Empty segments are skipped.
fn parse_inline_list(inner: &str, line: usize) -> Result<Vec<Value>> {
    let mut items = Vec::new();
    let mut quotes = QuoteState::default();
    let mut depth = 0usize;
    let mut start = 0;

    for (i, c) in inner.char_indices() {
        if !quotes.step(c) {
            continue;
        }
        match c {
            '[' => depth += 1,
            ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or(ParseError::MalformedInlineList(line))?
            }
            ',' if depth == 0 => {
                push_segment(&mut items, &inner[start..i], line)?;
                start = i + 1;
            }
            _ => {}
        }
    }

    if depth != 0 || quotes.is_open() {
        return Err(ParseError::MalformedInlineList(line));
    }
    push_segment(&mut items, &inner[start..], line)?;

    Ok(items)
}

fn push_segment(items: &mut Vec<Value>, segment: &str, line: usize) -> Result<()> {
    let segment = segment.trim();
    if !segment.is_empty() {
        items.push(parse_scalar(segment, line)?);
    }
    Ok(())
}

/// Decode the content between double quotes.
fn parse_double_quoted(inner: &str, line: usize) -> Result<String> {
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push(parse_escape_sequence(&mut chars, line)?),
            '"' => return Err(ParseError::StrayQuote(line)),
            c => out.push(c),
        }
    }

    Ok(out)
}

/// Decode the escape following a backslash.
fn parse_escape_sequence(chars: &mut std::str::Chars<'_>, line: usize) -> Result<char> {
    let bad = |escape: String| ParseError::BadEscape { line, escape };

    let Some(esc) = chars.next() else {
        return Err(bad(String::new()));
    };

    let c = match esc {
        '"' => '"',
        '\\' => '\\',
        '/' => '/',
        '\'' => '\'',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0C',
        'n' => '\n',
        'r' => '\r',
        't' => '\t',
        'v' => '\x0B',
        '0' => '\0',
        'x' => parse_hex_escape(chars, 2, 'x', line)?,
        'u' => parse_hex_escape(chars, 4, 'u', line)?,
        'U' => parse_hex_escape(chars, 8, 'U', line)?,
        other => return Err(bad(other.to_string())),
    };

    Ok(c)
}

/// Decode exactly `digits` hex digits into a code point.
fn parse_hex_escape(
    chars: &mut std::str::Chars<'_>,
    digits: usize,
    marker: char,
    line: usize,
) -> Result<char> {
    let hex: String = chars.by_ref().take(digits).collect();
    let bad = || ParseError::BadEscape {
        line,
        escape: format!("{}{}", marker, hex),
    };

    if hex.len() != digits || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(bad());
    }
    let code = u32::from_str_radix(&hex, 16).map_err(|_| bad())?;
    // \x is a single byte; only the ASCII half maps onto a char.
    if marker == 'x' && code > 0x7F {
        return Err(bad());
    }
    char::from_u32(code).ok_or_else(bad)
}
