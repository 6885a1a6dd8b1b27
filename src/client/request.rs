//! Request entities and path encoding.

use bytes::Bytes;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

use crate::errors::{MaileonError, MaileonResult};
use crate::xml::XmlElement;

/// Characters escaped inside a resource path. `/` is kept as the segment
/// separator.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'|')
    .add(b'\\')
    .add(b'^')
    .add(b'[')
    .add(b']')
    .add(b'&')
    .add(b'+')
    .add(b'=')
    .add(b';')
    .add(b',');

/// Request entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// Explicitly empty entity.
    #[default]
    Empty,
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// XML document, serialized with a declaration.
    Xml(XmlElement),
    /// JSON document.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Serializes the entity.
    pub fn into_bytes(self) -> MaileonResult<Bytes> {
        match self {
            RequestBody::Empty => Ok(Bytes::new()),
            RequestBody::Text(text) => Ok(Bytes::from(text)),
            RequestBody::Bytes(bytes) => Ok(bytes),
            RequestBody::Xml(element) => Ok(Bytes::from(element.to_document_string())),
            RequestBody::Json(value) => serde_json::to_vec(&value)
                .map(Bytes::from)
                .map_err(|e| MaileonError::client_with_source("Failed to serialize JSON body", e)),
        }
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        RequestBody::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(bytes))
    }
}

impl From<XmlElement> for RequestBody {
    fn from(element: XmlElement) -> Self {
        RequestBody::Xml(element)
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Percent-encodes a resource path relative to the API base.
///
/// Segment boundaries are kept. Paths containing `.` or `..` segments are
/// rejected because they would resolve outside the API base path.
pub fn encode_path(path: &str) -> MaileonResult<String> {
    let trimmed = path.trim_start_matches('/');

    if trimmed.split('/').any(|segment| segment == "." || segment == "..") {
        return Err(path_error(path));
    }

    Ok(utf8_percent_encode(trimmed, PATH_ENCODE_SET).to_string())
}

/// Reverses [`encode_path`].
pub fn decode_path(encoded: &str) -> MaileonResult<String> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| MaileonError::client_with_source(format!("path cannot be decoded: '{}'", encoded), e))
}

pub(crate) fn path_error(path: &str) -> MaileonError {
    MaileonError::client(format!("path cannot be encoded: path='{}'", path))
}
