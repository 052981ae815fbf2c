//! Render a spec back into request-file text.
//!
//! [`Spec::to_value`] rebuilds the document tree from the typed fields,
//! omitting fields that are absent or empty. [`encode`] prints that tree in
//! the block grammar the parser reads: strings are always double-quoted,
//! lists of scalars are written inline, everything else as nested blocks.

use crate::spec::{Body, Request, Spec, WsMessage};
use crate::value::{Map, Value};

impl Spec {
    /// Document tree for this spec.
    pub fn to_value(&self) -> Value {
        Value::Map(self.to_map())
    }

    /// Root mapping of [`Spec::to_value`].
    pub fn to_map(&self) -> Map {
        let mut map = Map::new();
        if let Some(version) = self.version {
            map.insert("version", Value::Int(version));
        }
        put_str(&mut map, "kind", &self.kind);
        put_str(&mut map, "name", &self.name);
        if let Some(description) = &self.description {
            map.insert("description", Value::from(description.as_str()));
        }
        if !self.tags.is_empty() {
            let tags = self.tags.iter().map(|t| Value::from(t.as_str())).collect();
            map.insert("tags", Value::List(tags));
        }
        if let Some(request) = &self.request {
            map.insert("request", request.to_value());
        }
        put_map(&mut map, "expect", self.expect.as_ref());
        put_map(&mut map, "hooks", self.hooks.as_ref());
        map
    }
}

impl Request {
    fn to_value(&self) -> Value {
        let mut map = Map::new();
        put_str(&mut map, "method", &self.method);
        put_str(&mut map, "url", &self.url);
        put_map(&mut map, "query", Some(&self.query));
        put_map(&mut map, "headers", Some(&self.headers));
        if let Some(body) = &self.body {
            map.insert("body", body.to_value());
        }
        if let Some(ms) = self.timeout_ms {
            map.insert("timeout_ms", Value::Int(ms));
        }
        if let Some(follow) = self.follow_redirects {
            map.insert("follow_redirects", Value::Bool(follow));
        }
        if let Some(ms) = self.connect_timeout_ms {
            map.insert("connect_timeout_ms", Value::Int(ms));
        }
        if let Some(ms) = self.ping_interval_ms {
            map.insert("ping_interval_ms", Value::Int(ms));
        }
        if !self.messages.is_empty() {
            let messages = self.messages.iter().map(WsMessage::to_value).collect();
            map.insert("messages", Value::List(messages));
        }
        Value::Map(map)
    }
}

impl Body {
    fn to_value(&self) -> Value {
        let mut map = Map::new();
        put_str(&mut map, "mode", &self.mode);
        put_str(&mut map, "content_type", &self.content_type);
        if let Some(json) = &self.json {
            map.insert("json", json.clone());
        }
        put_str(&mut map, "raw", &self.raw);
        put_str(&mut map, "path", &self.path);
        put_map(&mut map, "form", Some(&self.form));
        if !self.multipart.is_empty() {
            map.insert("multipart", Value::List(self.multipart.clone()));
        }
        Value::Map(map)
    }
}

impl WsMessage {
    fn to_value(&self) -> Value {
        let mut map = Map::new();
        put_str(&mut map, "type", &self.message_type);
        if let Some(json) = &self.json {
            map.insert("json", json.clone());
        }
        put_str(&mut map, "text", &self.text);
        put_str(&mut map, "path", &self.path);
        Value::Map(map)
    }
}

fn put_str(map: &mut Map, key: &str, value: &str) {
    if !value.is_empty() {
        map.insert(key, Value::from(value));
    }
}

/// Empty maps are omitted: the grammar has no spelling for them.
fn put_map(map: &mut Map, key: &str, value: Option<&Map>) {
    if let Some(value) = value.filter(|m| !m.is_empty()) {
        map.insert(key, Value::Map(value.clone()));
    }
}

// =============================================================================
// Text rendering
// =============================================================================

/// Render a spec as request-file text.
pub fn encode(spec: &Spec) -> String {
    encode_map(&spec.to_map())
}

/// Render a mapping as a document root. The output ends with a newline
/// unless the map is empty.
pub fn encode_map(map: &Map) -> String {
    let mut out = String::new();
    write_map(&mut out, map, 0);
    out
}

fn write_map(out: &mut String, map: &Map, indent: usize) {
    let pad = "  ".repeat(indent);
    for (key, value) in map.iter() {
        out.push_str(&pad);
        out.push_str(&encode_key(key));
        out.push(':');
        if is_flow(value) {
            out.push(' ');
            out.push_str(&encode_flow(value));
            out.push('\n');
        } else {
            out.push('\n');
            write_block(out, value, indent + 1);
        }
    }
}

fn write_list(out: &mut String, items: &[Value], indent: usize) {
    let pad = "  ".repeat(indent);
    for item in items {
        match item {
            Value::Map(map) if !map.is_empty() => {
                // The first key shares the dash line; the rest align under it.
                let mut nested = String::new();
                write_map(&mut nested, map, indent + 1);
                out.push_str(&pad);
                out.push_str("- ");
                out.push_str(&nested[pad.len() + 2..]);
            }
            _ if is_flow(item) => {
                out.push_str(&pad);
                out.push_str("- ");
                out.push_str(&encode_flow(item));
                out.push('\n');
            }
            _ => {
                out.push_str(&pad);
                out.push_str("-\n");
                write_block(out, item, indent + 1);
            }
        }
    }
}

fn write_block(out: &mut String, value: &Value, indent: usize) {
    match value {
        Value::Map(map) => write_map(out, map, indent),
        Value::List(items) => write_list(out, items, indent),
        _ => {}
    }
}

/// Scalars and lists made only of flow values fit on one line.
fn is_flow(value: &Value) -> bool {
    match value {
        Value::Map(_) => false,
        Value::List(items) => items.iter().all(is_flow),
        _ => true,
    }
}

fn encode_flow(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::String(s) => encode_string(s),
        Value::List(items) => {
            let items: Vec<String> = items.iter().map(encode_flow).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Map(_) => String::new(),
    }
}

fn encode_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 2);
    result.push('"');
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            '\x08' => result.push_str("\\b"),
            '\x0c' => result.push_str("\\f"),
            c if c.is_control() => result.push_str(&format!("\\u{:04X}", c as u32)),
            c => result.push(c),
        }
    }
    result.push('"');
    result
}

fn encode_key(key: &str) -> String {
    let bare = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '-' || c == '.');
    if bare {
        key.to_string()
    } else {
        format!("\"{}\"", key.replace('\\', "\\\\").replace('"', "\\\""))
    }
}
