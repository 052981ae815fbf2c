//! Typed request specification.
//!
//! Enumerated fields (`kind`, `body.mode`, `messages[].type`) keep the
//! document text so that an unrecognized value decodes cleanly and is
//! reported by the validator. The typed accessors map that text onto the
//! closed enums.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::value::{Map, Value};

/// A name that is not one of an enum's document spellings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {what} {name:?}")]
pub struct UnknownName {
    pub what: &'static str,
    pub name: String,
}

/// Interaction kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Http,
    Ws,
}

impl Kind {
    pub const ALL: [Kind; 2] = [Kind::Http, Kind::Ws];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::Http => "http",
            Kind::Ws => "ws",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

/// How a request body is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyMode {
    Json,
    Raw,
    File,
    Form,
    Multipart,
}

impl BodyMode {
    pub const ALL: [BodyMode; 5] = [
        BodyMode::Json,
        BodyMode::Raw,
        BodyMode::File,
        BodyMode::Form,
        BodyMode::Multipart,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BodyMode::Json => "json",
            BodyMode::Raw => "raw",
            BodyMode::File => "file",
            BodyMode::Form => "form",
            BodyMode::Multipart => "multipart",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

/// Payload type of a WebSocket message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    Json,
    Text,
    File,
}

impl MessageType {
    pub const ALL: [MessageType; 3] = [MessageType::Json, MessageType::Text, MessageType::File];

    pub fn as_str(self) -> &'static str {
        match self {
            MessageType::Json => "json",
            MessageType::Text => "text",
            MessageType::File => "file",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

macro_rules! name_traits {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = UnknownName;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::from_name(s).ok_or_else(|| UnknownName {
                    what: $what,
                    name: s.to_string(),
                })
            }
        }
    };
}

name_traits!(Kind, "kind");
name_traits!(BodyMode, "body mode");
name_traits!(MessageType, "message type");

/// A request spec document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spec {
    pub version: Option<i64>,
    pub kind: String,
    pub name: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub request: Option<Request>,
    pub expect: Option<Map>,
    pub hooks: Option<Map>,
}

impl Spec {
    /// The interaction kind, if `kind` names one.
    pub fn kind(&self) -> Option<Kind> {
        Kind::from_name(&self.kind)
    }
}

/// The `request` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    pub method: String,
    pub url: String,
    pub query: Map,
    pub headers: Map,
    pub body: Option<Body>,
    pub timeout_ms: Option<i64>,
    pub follow_redirects: Option<bool>,
    pub connect_timeout_ms: Option<i64>,
    pub ping_interval_ms: Option<i64>,
    pub messages: Vec<WsMessage>,
}

/// The `request.body` block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Body {
    pub mode: String,
    /// Free-form payload for `json` mode; `None` when absent or null.
    pub json: Option<Value>,
    pub raw: String,
    pub path: String,
    pub content_type: String,
    pub form: Map,
    pub multipart: Vec<Value>,
}

impl Body {
    pub fn mode(&self) -> Option<BodyMode> {
        BodyMode::from_name(&self.mode)
    }
}

/// One entry of `request.messages`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WsMessage {
    /// Document key `type`.
    pub message_type: String,
    pub json: Option<Value>,
    pub text: String,
    pub path: String,
}

impl WsMessage {
    pub fn kind(&self) -> Option<MessageType> {
        MessageType::from_name(&self.message_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_names_round_trip() {
        for kind in Kind::ALL {
            assert_eq!(Kind::from_name(kind.as_str()), Some(kind));
        }
        for mode in BodyMode::ALL {
            assert_eq!(BodyMode::from_name(&mode.to_string()), Some(mode));
        }
        for t in MessageType::ALL {
            assert_eq!(MessageType::from_name(t.as_str()), Some(t));
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert_eq!(Kind::from_name("HTTP"), None);
        assert_eq!(BodyMode::from_name("jsno"), None);
        assert_eq!(MessageType::from_name(""), None);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("multipart".parse::<BodyMode>(), Ok(BodyMode::Multipart));
        let err = "grpc".parse::<Kind>().unwrap_err();
        assert_eq!(err.to_string(), "unknown kind \"grpc\"");
    }

    #[test]
    fn test_typed_accessors() {
        let spec = Spec {
            kind: "ws".into(),
            ..Spec::default()
        };
        assert_eq!(spec.kind(), Some(Kind::Ws));

        let body = Body {
            mode: "form".into(),
            ..Body::default()
        };
        assert_eq!(body.mode(), Some(BodyMode::Form));

        let msg = WsMessage {
            message_type: "binary".into(),
            ..WsMessage::default()
        };
        assert_eq!(msg.kind(), None);
    }
}
