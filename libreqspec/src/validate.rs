//! Phase 4: Validator
//!
//! Checks a decoded [`Spec`] against the structural rules and walks the raw
//! document against [`REQUEST_FILE`] to find keys nobody reads. Every rule
//! reports into one accumulator; nothing here stops early.

use std::fmt;

use crate::schema::{SchemaNode, REQUEST_FILE};
use crate::spec::{Body, BodyMode, Kind, MessageType, Spec, WsMessage};
use crate::value::{Map, Value};

const KIND_HINT: &str = "expected one of [http, ws]";
const BODY_MODE_HINT: &str = "expected one of [json, raw, file, form, multipart]";
const MESSAGE_TYPE_HINT: &str = "expected one of [json, text, file]";
const UNKNOWN_FIELD_HINT: &str = "remove field or run without --strict";

/// How much an issue blocks loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// One validation finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub severity: Severity,
    /// Dotted path of the offending field, e.g. `request.body.mode`.
    pub field: String,
    pub message: String,
    pub hint: Option<String>,
}

impl Issue {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Blocking issues found in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Source label, empty when unknown.
    pub path: String,
    pub issues: Vec<Issue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str("validation error")?;
        } else {
            write!(f, "validation error in {}", self.path)?;
        }
        for issue in &self.issues {
            write!(f, "\n- {}: {}", issue.field, issue.message)?;
            if let Some(hint) = &issue.hint {
                write!(f, " (hint: {})", hint)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Accumulator shared by every rule.
#[derive(Debug, Default)]
struct Issues(Vec<Issue>);

impl Issues {
    fn add(&mut self, severity: Severity, field: impl Into<String>, message: &str, hint: &str) {
        self.0.push(Issue {
            severity,
            field: field.into(),
            message: message.to_string(),
            hint: (!hint.is_empty()).then(|| hint.to_string()),
        });
    }

    fn error(&mut self, field: impl Into<String>, message: &str, hint: &str) {
        self.add(Severity::Error, field, message, hint);
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Validate a decoded spec and the raw document it came from.
///
/// Structural issues come first, then unknown-field issues in document
/// order. Unknown fields are warnings unless `strict` is set.
pub fn validate(spec: &Spec, raw: &Map, strict: bool) -> Vec<Issue> {
    let mut issues = Issues::default();

    match spec.version {
        None => issues.error("version", "missing required field", "set version: 1"),
        Some(1) => {}
        Some(_) => issues.error(
            "version",
            "unsupported version",
            "version: 1 is currently supported",
        ),
    }

    if is_blank(&spec.kind) {
        issues.error("kind", "missing required field", KIND_HINT);
    } else if spec.kind().is_none() {
        issues.error("kind", "invalid kind", KIND_HINT);
    }

    if is_blank(&spec.name) {
        issues.error("name", "missing required field", "set a stable request name");
    }

    match &spec.request {
        None => issues.error("request", "missing required field", "define request block"),
        Some(request) => {
            if is_blank(&request.url) {
                issues.error("request.url", "missing required field", "set a request URL");
            }
            if spec.kind() == Some(Kind::Http) && is_blank(&request.method) {
                issues.error(
                    "request.method",
                    "missing required field",
                    "kind=http requires request.method",
                );
            }
            if let Some(body) = &request.body {
                validate_body(body, &mut issues);
            }
            validate_messages(&request.messages, &mut issues);
        }
    }

    walk_unknown_fields(raw, &REQUEST_FILE, "", strict, &mut issues);

    let issues = issues.0;
    tracing::debug!(
        errors = issues.iter().filter(|i| i.is_error()).count(),
        warnings = issues.iter().filter(|i| !i.is_error()).count(),
        strict,
        "validated request spec"
    );
    issues
}

fn validate_body(body: &Body, issues: &mut Issues) {
    if is_blank(&body.mode) {
        issues.error("request.body.mode", "missing required field", BODY_MODE_HINT);
        return;
    }
    let Some(mode) = body.mode() else {
        issues.error("request.body.mode", "invalid body mode", BODY_MODE_HINT);
        return;
    };

    match mode {
        BodyMode::Json if body.json.is_none() => issues.error(
            "request.body.json",
            "missing payload for json mode",
            "set request.body.json",
        ),
        BodyMode::Raw if is_blank(&body.raw) => issues.error(
            "request.body.raw",
            "missing payload for raw mode",
            "set request.body.raw",
        ),
        BodyMode::File if is_blank(&body.path) => issues.error(
            "request.body.path",
            "missing file path for file mode",
            "set request.body.path",
        ),
        BodyMode::Form if body.form.is_empty() => issues.error(
            "request.body.form",
            "missing fields for form mode",
            "set request.body.form",
        ),
        BodyMode::Multipart if body.multipart.is_empty() => issues.error(
            "request.body.multipart",
            "missing parts for multipart mode",
            "set request.body.multipart",
        ),
        _ => {}
    }
}

fn validate_messages(messages: &[WsMessage], issues: &mut Issues) {
    for (i, msg) in messages.iter().enumerate() {
        let prefix = format!("request.messages[{}]", i);

        if is_blank(&msg.message_type) {
            issues.error(
                format!("{}.type", prefix),
                "missing required field",
                MESSAGE_TYPE_HINT,
            );
            continue;
        }
        let Some(kind) = msg.kind() else {
            issues.error(
                format!("{}.type", prefix),
                "invalid message type",
                MESSAGE_TYPE_HINT,
            );
            continue;
        };

        let (field, missing, message) = match kind {
            MessageType::Json => ("json", msg.json.is_none(), "missing payload for json message"),
            MessageType::Text => ("text", is_blank(&msg.text), "missing payload for text message"),
            MessageType::File => ("path", is_blank(&msg.path), "missing file path for file message"),
        };
        if missing {
            let field = format!("{}.{}", prefix, field);
            let hint = format!("set {}", field);
            issues.error(field, message, &hint);
        }
    }
}

// ============================================================================
// Unknown-field walk
// ============================================================================

fn join_path(base: &str, segment: &str) -> String {
    if base.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", base, segment)
    }
}

fn walk_unknown_fields(map: &Map, schema: &SchemaNode, path: &str, strict: bool, issues: &mut Issues) {
    let severity = if strict {
        Severity::Error
    } else {
        Severity::Warning
    };

    for (key, value) in map.iter() {
        let field = join_path(path, key);
        match schema.child(key) {
            Some(child) => walk_value(value, child, &field, strict, issues),
            None => {
                tracing::trace!(field = %field, %severity, "unknown field");
                issues.add(severity, field, "unknown field", UNKNOWN_FIELD_HINT);
            }
        }
    }
}

fn walk_value(value: &Value, schema: &SchemaNode, path: &str, strict: bool, issues: &mut Issues) {
    if *schema == SchemaNode::Any {
        return;
    }
    match (value, schema) {
        (Value::Map(map), _) => walk_unknown_fields(map, schema, path, strict, issues),
        (Value::List(items), SchemaNode::Sequence(elem)) => {
            for (i, item) in items.iter().enumerate() {
                walk_value(item, elem, &format!("{}[{}]", path, i), strict, issues);
            }
        }
        _ => {}
    }
}
