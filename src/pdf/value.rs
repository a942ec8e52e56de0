//! PDF value model and its textual serialization.
//!
//! Every value the writer emits goes through [`render`]. The output is fully
//! deterministic: dictionary keys are kept in a sorted map, so rendering the
//! same value twice always yields the same bytes.

use super::object::ObjectId;
use std::collections::BTreeMap;
use std::fmt;

/// Number of spaces per nesting level inside a dictionary.
const INDENT_WIDTH: usize = 4;

/// A PDF value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Integer, rendered in decimal.
    Integer(i64),
    /// Real number, rendered with exactly four fractional digits.
    Real(f64),
    /// Name or literal string, already in PDF syntax (e.g. `/Type`, `(Title)`).
    /// Written out unchanged.
    Literal(Vec<u8>),
    /// Ordered sequence of values.
    Array(Vec<Value>),
    /// Name-keyed mapping.
    Dictionary(Dictionary),
    /// Reference to an indirect object, rendered as `<id> 0 R`.
    Reference(ObjectId),
}

impl Value {
    /// Build a PDF name (`/name`) from its bare text.
    pub fn name(name: &str) -> Self {
        let mut bytes = Vec::with_capacity(name.len() + 1);
        bytes.push(b'/');
        bytes.extend_from_slice(name.as_bytes());
        Value::Literal(bytes)
    }

    /// Build a literal string `( ... )`, escaping the characters that would
    /// otherwise end or corrupt it.
    pub fn text_string(text: &str) -> Self {
        Value::Literal(escape_text_string(text))
    }

    /// Wrap raw, pre-formatted PDF syntax.
    pub fn literal(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Literal(bytes.into())
    }

    /// Get the dictionary if this value is one.
    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            _ => None,
        }
    }

    /// Get the array if this value is one.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Get the integer if this value is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the referenced object id if this value is a reference.
    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Value::Reference(id) => Some(*id),
            _ => None,
        }
    }

    /// Render at the top nesting level.
    pub fn to_bytes(&self) -> Vec<u8> {
        render(self, 1)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Integer(i64::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Integer(value as i64)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<ObjectId> for Value {
    fn from(id: ObjectId) -> Self {
        Value::Reference(id)
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Value::Dictionary(dict)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

/// A PDF dictionary with keys kept in byte order.
///
/// Keys are stored in PDF name syntax, including the leading slash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: BTreeMap<Vec<u8>, Value>,
}

impl Dictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry. The key must include its leading slash.
    pub fn insert(&mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Builder form of [`Dictionary::insert`].
    pub fn with(mut self, key: impl Into<Vec<u8>>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Get an entry by key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key.as_bytes())
    }

    /// Check whether a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key.as_bytes())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in sorted key order.
    pub fn iter(&self) -> impl Iterator<Item = (&[u8], &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_slice(), v))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.to_bytes()))
    }
}

/// Render a value into PDF object syntax.
///
/// `indent` is the nesting depth of the value: dictionary entries are
/// indented by `4 * indent` spaces and the closing `>>` by one level less.
pub fn render(value: &Value, indent: usize) -> Vec<u8> {
    let mut buf = Vec::new();
    render_into(&mut buf, value, indent);
    buf
}

/// Render a value, appending to an existing buffer.
pub fn render_into(buf: &mut Vec<u8>, value: &Value, indent: usize) {
    match value {
        Value::Integer(i) => buf.extend_from_slice(i.to_string().as_bytes()),
        Value::Real(r) => buf.extend_from_slice(format_real(*r).as_bytes()),
        Value::Literal(bytes) => buf.extend_from_slice(bytes),
        Value::Reference(id) => buf.extend_from_slice(format!("{} 0 R", id).as_bytes()),
        Value::Array(items) => {
            buf.extend_from_slice(b"[ ");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    buf.push(b' ');
                }
                render_into(buf, item, indent);
            }
            buf.extend_from_slice(b" ]");
        }
        Value::Dictionary(dict) => {
            buf.extend_from_slice(b"<<\n");
            for (i, (key, item)) in dict.iter().enumerate() {
                if i > 0 {
                    buf.push(b'\n');
                }
                pad(buf, indent);
                buf.extend_from_slice(key);
                buf.push(b' ');
                render_into(buf, item, indent + 1);
            }
            buf.push(b'\n');
            pad(buf, indent.saturating_sub(1));
            buf.extend_from_slice(b">>");
        }
    }
}

fn pad(buf: &mut Vec<u8>, level: usize) {
    buf.resize(buf.len() + INDENT_WIDTH * level, b' ');
}

/// Format a real number with exactly four fractional digits.
///
/// PDF has no syntax for infinities or NaN; those are written as zero.
pub fn format_real(value: f64) -> String {
    if value.is_finite() {
        format!("{:.4}", value)
    } else {
        "0.0000".to_string()
    }
}

/// Escape text into a PDF literal string, parentheses included.
pub fn escape_text_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for &b in text.as_bytes() {
        match b {
            b'\\' | b'(' | b')' => {
                out.push(b'\\');
                out.push(b);
            }
            b'\r' => out.extend_from_slice(b"\\r"),
            _ => out.push(b),
        }
    }
    out.push(b')');
    out
}
