//! Declarative description of the keys a request file may contain.
//!
//! Used by the validator's unknown-field walk. The table mirrors the typed
//! [`Spec`](crate::Spec) model; free-form payloads are [`SchemaNode::Any`].

/// Permitted shape at one position of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaNode {
    /// A mapping with a fixed set of keys.
    Fields(&'static [(&'static str, SchemaNode)]),
    /// A sequence whose elements all share one schema.
    Sequence(&'static SchemaNode),
    /// A leaf value; nothing below it is checked.
    Scalar,
    /// Free-form content; nothing below it is checked.
    Any,
}

impl SchemaNode {
    /// Schema for `key` if this node declares it.
    pub fn child(&self, key: &str) -> Option<&'static SchemaNode> {
        match *self {
            SchemaNode::Fields(fields) => fields.iter().find(|(k, _)| *k == key).map(|(_, n)| n),
            _ => None,
        }
    }
}

const MESSAGE: SchemaNode = SchemaNode::Fields(&[
    ("type", SchemaNode::Scalar),
    ("json", SchemaNode::Any),
    ("text", SchemaNode::Scalar),
    ("path", SchemaNode::Scalar),
]);

const BODY: SchemaNode = SchemaNode::Fields(&[
    ("mode", SchemaNode::Scalar),
    ("json", SchemaNode::Any),
    ("raw", SchemaNode::Scalar),
    ("path", SchemaNode::Scalar),
    ("content_type", SchemaNode::Scalar),
    ("form", SchemaNode::Any),
    ("multipart", SchemaNode::Sequence(&SchemaNode::Any)),
]);

const REQUEST: SchemaNode = SchemaNode::Fields(&[
    ("method", SchemaNode::Scalar),
    ("url", SchemaNode::Scalar),
    ("query", SchemaNode::Any),
    ("headers", SchemaNode::Any),
    ("body", BODY),
    ("timeout_ms", SchemaNode::Scalar),
    ("follow_redirects", SchemaNode::Scalar),
    ("connect_timeout_ms", SchemaNode::Scalar),
    ("ping_interval_ms", SchemaNode::Scalar),
    ("messages", SchemaNode::Sequence(&MESSAGE)),
]);

/// Root of a request file.
pub static REQUEST_FILE: SchemaNode = SchemaNode::Fields(&[
    ("version", SchemaNode::Scalar),
    ("kind", SchemaNode::Scalar),
    ("name", SchemaNode::Scalar),
    ("description", SchemaNode::Scalar),
    ("tags", SchemaNode::Sequence(&SchemaNode::Scalar)),
    ("request", REQUEST),
    ("expect", SchemaNode::Any),
    ("hooks", SchemaNode::Any),
]);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_lookup() {
        let request = REQUEST_FILE.child("request").unwrap();
        let body = request.child("body").unwrap();
        assert_eq!(body.child("json"), Some(&SchemaNode::Any));
        assert_eq!(body.child("nope"), None);
        assert_eq!(REQUEST_FILE.child("expect"), Some(&SchemaNode::Any));
    }

    #[test]
    fn test_messages_are_a_sequence() {
        let messages = REQUEST_FILE
            .child("request")
            .and_then(|r| r.child("messages"))
            .unwrap();
        match messages {
            SchemaNode::Sequence(elem) => assert!(elem.child("type").is_some()),
            other => panic!("expected sequence, got {:?}", other),
        }
    }

    #[test]
    fn test_leaves_have_no_children() {
        assert_eq!(SchemaNode::Scalar.child("x"), None);
        assert_eq!(SchemaNode::Any.child("x"), None);
    }
}
