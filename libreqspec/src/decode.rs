//! Phase 3: Schema decoder
//!
//! Projects the generic value tree onto [`Spec`]. Each recognized key is
//! checked for its required kind; the first mismatch aborts decoding with
//! the dotted path of the offending field. Unrecognized keys are left for
//! the validator.

use crate::error::DecodeError;
use crate::spec::{Body, Request, Spec, WsMessage};
use crate::value::{Map, Value};

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode the document root into a spec.
pub fn decode_spec(raw: &Map) -> Result<Spec> {
    let mut spec = Spec::default();

    if let Some(v) = raw.get("version") {
        spec.version = Some(as_int(v, "version")?);
    }
    if let Some(v) = raw.get("kind") {
        spec.kind = as_string(v, "kind")?;
    }
    if let Some(v) = raw.get("name") {
        spec.name = as_string(v, "name")?;
    }
    if let Some(v) = raw.get("description") {
        spec.description = Some(as_string(v, "description")?);
    }
    if let Some(v) = raw.get("tags") {
        spec.tags = as_string_list(v, "tags")?;
    }
    if let Some(v) = raw.get("request") {
        spec.request = Some(decode_request(as_map(v, "request")?)?);
    }
    if let Some(v) = raw.get("expect") {
        spec.expect = Some(as_map(v, "expect")?.clone());
    }
    if let Some(v) = raw.get("hooks") {
        spec.hooks = Some(as_map(v, "hooks")?.clone());
    }

    Ok(spec)
}

fn decode_request(raw: &Map) -> Result<Request> {
    let mut req = Request::default();

    if let Some(v) = raw.get("method") {
        req.method = as_string(v, "request.method")?;
    }
    if let Some(v) = raw.get("url") {
        req.url = as_string(v, "request.url")?;
    }
    if let Some(v) = raw.get("query") {
        req.query = as_map(v, "request.query")?.clone();
    }
    if let Some(v) = raw.get("headers") {
        req.headers = as_map(v, "request.headers")?.clone();
    }
    if let Some(v) = raw.get("body") {
        req.body = Some(decode_body(as_map(v, "request.body")?)?);
    }
    if let Some(v) = raw.get("timeout_ms") {
        req.timeout_ms = Some(as_int(v, "request.timeout_ms")?);
    }
    if let Some(v) = raw.get("follow_redirects") {
        req.follow_redirects = Some(as_bool(v, "request.follow_redirects")?);
    }
    if let Some(v) = raw.get("connect_timeout_ms") {
        req.connect_timeout_ms = Some(as_int(v, "request.connect_timeout_ms")?);
    }
    if let Some(v) = raw.get("ping_interval_ms") {
        req.ping_interval_ms = Some(as_int(v, "request.ping_interval_ms")?);
    }
    if let Some(v) = raw.get("messages") {
        let items = as_list(v, "request.messages")?;
        req.messages = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let prefix = format!("request.messages[{}]", i);
                decode_message(as_map(item, &prefix)?, &prefix)
            })
            .collect::<Result<_>>()?;
    }

    Ok(req)
}

fn decode_body(raw: &Map) -> Result<Body> {
    let mut body = Body::default();

    if let Some(v) = raw.get("mode") {
        body.mode = as_string(v, "request.body.mode")?;
    }
    if let Some(v) = raw.get("json") {
        body.json = payload(v);
    }
    if let Some(v) = raw.get("raw") {
        body.raw = as_string(v, "request.body.raw")?;
    }
    if let Some(v) = raw.get("path") {
        body.path = as_string(v, "request.body.path")?;
    }
    if let Some(v) = raw.get("content_type") {
        body.content_type = as_string(v, "request.body.content_type")?;
    }
    if let Some(v) = raw.get("form") {
        body.form = as_map(v, "request.body.form")?.clone();
    }
    if let Some(v) = raw.get("multipart") {
        body.multipart = as_list(v, "request.body.multipart")?.to_vec();
    }

    Ok(body)
}

fn decode_message(raw: &Map, prefix: &str) -> Result<WsMessage> {
    let mut msg = WsMessage::default();
    let field = |name: &str| format!("{}.{}", prefix, name);

    if let Some(v) = raw.get("type") {
        msg.message_type = as_string(v, &field("type"))?;
    }
    if let Some(v) = raw.get("json") {
        msg.json = payload(v);
    }
    if let Some(v) = raw.get("text") {
        msg.text = as_string(v, &field("text"))?;
    }
    if let Some(v) = raw.get("path") {
        msg.path = as_string(v, &field("path"))?;
    }

    Ok(msg)
}

/// Free-form payloads accept any kind; null means absent.
fn payload(value: &Value) -> Option<Value> {
    (!value.is_null()).then(|| value.clone())
}

// ============================================================================
// Kind assertions
// ============================================================================

fn as_map<'a>(value: &'a Value, field: &str) -> Result<&'a Map> {
    value.as_map().ok_or_else(|| DecodeError::new(field, "a map"))
}

fn as_list<'a>(value: &'a Value, field: &str) -> Result<&'a [Value]> {
    value.as_list().ok_or_else(|| DecodeError::new(field, "a list"))
}

fn as_string(value: &Value, field: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| DecodeError::new(field, "a string"))
}

fn as_int(value: &Value, field: &str) -> Result<i64> {
    value
        .as_int()
        .ok_or_else(|| DecodeError::new(field, "an integer"))
}

fn as_bool(value: &Value, field: &str) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| DecodeError::new(field, "a boolean"))
}

fn as_string_list(value: &Value, field: &str) -> Result<Vec<String>> {
    as_list(value, field)?
        .iter()
        .enumerate()
        .map(|(i, item)| as_string(item, &format!("{}[{}]", field, i)))
        .collect()
}
