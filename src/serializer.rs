//! Response body serialization by content type.

use crate::media::{self, MediaFamily};
use serde_json::Value;
use thiserror::Error;

/// Root element wrapping XML bodies.
pub const XML_ROOT: &str = "xml";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerializationError {
    #[error("Cannot serialize a complex object as {content_type}")]
    UnserializableComplexObject { content_type: String },

    #[error("No serializer found for content type {content_type:?}")]
    NoSerializerFound { content_type: String },
}

impl SerializationError {
    pub fn tag(&self) -> &'static str {
        match self {
            SerializationError::UnserializableComplexObject { .. } => "UNSERIALIZABLE_COMPLEX_OBJECT",
            SerializationError::NoSerializerFound { .. } => "NO_SERIALIZER_FOUND",
        }
    }
}

/// Serialize an engine body for the given outgoing content type.
///
/// Returns `None` when no body should be sent.
pub fn serialize(
    body: Option<&Value>,
    content_type: Option<&str>,
) -> Result<Option<String>, SerializationError> {
    let content_type = content_type.map(str::trim).filter(|ct| !ct.is_empty());

    let Some(content_type) = content_type else {
        if body.map_or(true, is_falsy) {
            return Ok(None);
        }
        return passthrough(body, "");
    };

    match media::classify(content_type) {
        Some(MediaFamily::Json) => Ok(body.map(Value::to_string)),
        Some(MediaFamily::Xml) => Ok(body.map(|value| match value {
            Value::String(s) => s.clone(),
            other => to_xml(other),
        })),
        Some(MediaFamily::Text) => match body {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(SerializationError::UnserializableComplexObject {
                content_type: content_type.to_string(),
            }),
        },
        None => passthrough(body, content_type),
    }
}

/// Strings pass through untouched; anything else has no codec.
fn passthrough(body: Option<&Value>, content_type: &str) -> Result<Option<String>, SerializationError> {
    match body {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SerializationError::NoSerializerFound {
            content_type: content_type.to_string(),
        }),
    }
}

/// JavaScript-style falsiness, which decides whether a body without a
/// content type is worth sending.
pub fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Render a JSON value as XML under the [`XML_ROOT`] element.
///
/// Object members become child elements; array items repeat the enclosing
/// element name.
pub fn to_xml(value: &Value) -> String {
    let mut out = String::new();
    write_element(&mut out, XML_ROOT, value);
    out
}

fn write_element(out: &mut String, name: &str, value: &Value) {
    match value {
        Value::Array(items) => {
            for item in items {
                write_element(out, name, item);
            }
        }
        Value::Object(map) => wrap(out, name, |out| {
            for (key, child) in map {
                write_element(out, key, child);
            }
        }),
        Value::String(s) => wrap(out, name, |out| escape_into(out, s)),
        Value::Null => wrap(out, name, |_| {}),
        scalar => wrap(out, name, |out| out.push_str(&scalar.to_string())),
    }
}

fn wrap(out: &mut String, name: &str, inner: impl FnOnce(&mut String)) {
    out.push('<');
    out.push_str(name);
    out.push('>');
    inner(out);
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

fn escape_into(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}
