//! Indirect objects: the numbered units of a PDF file.

use super::value::{render_into, Value};
use std::fmt;

/// Identifier of a registered indirect object. Generation is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Create an identifier from its object number.
    pub fn new(number: u32) -> Self {
        Self(number)
    }

    /// Get the object number.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An indirect object: a content value plus an optional raw stream.
///
/// The identifier is unset until a [`Document`](super::Document) registers
/// the object, and never changes afterwards. The content may still be edited
/// after registration.
#[derive(Debug, Clone, PartialEq)]
pub struct IndirectObject {
    id: Option<ObjectId>,
    /// Object content (a dictionary for every object this crate writes).
    pub content: Value,
    /// Raw stream bytes, present only for stream objects.
    pub stream: Option<Vec<u8>>,
}

impl IndirectObject {
    /// Create a plain object.
    pub fn new(content: impl Into<Value>) -> Self {
        Self {
            id: None,
            content: content.into(),
            stream: None,
        }
    }

    /// Create a stream object. The caller sets `/Length` in `content`.
    pub fn with_stream(content: impl Into<Value>, stream: Vec<u8>) -> Self {
        Self {
            id: None,
            content: content.into(),
            stream: Some(stream),
        }
    }

    /// Get the identifier, if registered.
    pub fn id(&self) -> Option<ObjectId> {
        self.id
    }

    /// Check whether the object has been registered.
    pub fn is_registered(&self) -> bool {
        self.id.is_some()
    }

    /// Check whether this is a stream object.
    pub fn is_stream(&self) -> bool {
        self.stream.is_some()
    }

    pub(crate) fn assign_id(&mut self, id: ObjectId) {
        debug_assert!(self.id.is_none(), "object registered twice");
        self.id = Some(id);
    }

    /// Render the full `obj ... endobj` definition.
    ///
    /// An unregistered object renders with number 0, which no reference can
    /// point at.
    pub fn render(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.render_into(&mut buf);
        buf
    }

    /// Render the definition, appending to an existing buffer.
    pub fn render_into(&self, buf: &mut Vec<u8>) {
        let number = self.id.map_or(0, ObjectId::get);
        buf.extend_from_slice(format!("{} 0 obj ", number).as_bytes());
        render_into(buf, &self.content, 1);
        match &self.stream {
            Some(stream) => {
                buf.extend_from_slice(b"\nstream\n");
                buf.extend_from_slice(stream);
                buf.extend_from_slice(b"\nendstream\nendobj\n");
            }
            None => buf.extend_from_slice(b" endobj\n"),
        }
    }
}
