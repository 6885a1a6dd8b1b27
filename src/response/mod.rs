//! Buffered snapshot of a completed HTTP exchange.

use bytes::Bytes;
use mime::Mime;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::errors::{MaileonError, MaileonResult};
use crate::transport::HttpResponse;
use crate::xml::{self, XmlElement};

/// Immutable view of one HTTP response.
///
/// The entity is read fully before the wrapper is created, so the body can be
/// accessed any number of times and in any representation.
#[derive(Debug, Clone)]
pub struct ResponseWrapper {
    status: StatusCode,
    reason_phrase: String,
    headers: HeaderMap,
    content_type: Option<Mime>,
    body: Option<Bytes>,
}

impl ResponseWrapper {
    /// Creates a wrapper from the parts of a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<Mime>().ok());

        Self {
            status,
            reason_phrase: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            content_type,
            body: if body.is_empty() { None } else { Some(body) },
        }
    }

    /// Numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status.as_u16()
    }

    /// Status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Replaces the canonical reason phrase with the one the server sent.
    pub fn with_reason_phrase(mut self, reason_phrase: impl Into<String>) -> Self {
        self.reason_phrase = reason_phrase.into();
        self
    }

    /// Reason phrase as sent by the server when known, otherwise the canonical
    /// phrase of the status. Empty for non-standard codes.
    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// All response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid text.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// All textual values of a header in arrival order.
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .get_all(name)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect()
    }

    /// Parsed `Content-Type`, if one was sent and is well formed.
    pub fn content_type(&self) -> Option<&Mime> {
        self.content_type.as_ref()
    }

    /// Returns true for 2xx responses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns true when the response carried a non-empty entity.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Raw entity bytes.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Entity decoded as UTF-8. Invalid sequences are replaced.
    pub fn body_as_string(&self) -> Option<String> {
        self.body
            .as_ref()
            .map(|body| String::from_utf8_lossy(body).into_owned())
    }

    /// Entity parsed as an XML document.
    pub fn body_as_xml(&self) -> MaileonResult<Option<XmlElement>> {
        match self.body_as_string() {
            Some(text) => xml::parse_document(&text).map(Some),
            None => Ok(None),
        }
    }

    /// Entity deserialized from JSON.
    pub fn body_as_json<T: DeserializeOwned>(&self) -> MaileonResult<Option<T>> {
        match &self.body {
            Some(body) => serde_json::from_slice(body).map(Some).map_err(|e| {
                MaileonError::client_with_source("Failed to parse JSON response body", e)
            }),
            None => Ok(None),
        }
    }
}

impl From<HttpResponse> for ResponseWrapper {
    fn from(response: HttpResponse) -> Self {
        let wrapper = Self::new(response.status, response.headers, response.body);
        match response.reason_phrase {
            Some(reason_phrase) => wrapper.with_reason_phrase(reason_phrase),
            None => wrapper,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn wrapper(body: &'static str) -> ResponseWrapper {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/vnd.maileon.api+xml; charset=utf-8"),
        );
        headers.append("x-tag", HeaderValue::from_static("a"));
        headers.append("x-tag", HeaderValue::from_static("b"));
        ResponseWrapper::new(StatusCode::OK, headers, Bytes::from_static(body.as_bytes()))
    }

    #[test]
    fn test_body_is_readable_repeatedly() {
        let response = wrapper("<count>7</count>");

        assert_eq!(response.body(), Some(&b"<count>7</count>"[..]));
        assert_eq!(response.body_as_string().as_deref(), Some("<count>7</count>"));
        let first = response.body_as_xml().unwrap().unwrap();
        let second = response.body_as_xml().unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.text(), Some("7"));
        assert_eq!(response.body_as_string().as_deref(), Some("<count>7</count>"));
    }

    #[test]
    fn test_empty_body_is_absent() {
        let response = wrapper("");

        assert!(!response.has_body());
        assert_eq!(response.body(), None);
        assert_eq!(response.body_as_string(), None);
        assert!(response.body_as_xml().unwrap().is_none());
    }

    #[test]
    fn test_json_body() {
        #[derive(Deserialize)]
        struct Count {
            count: u32,
        }

        let response = wrapper(r#"{"count": 3}"#);
        let count: Count = response.body_as_json().unwrap().unwrap();
        assert_eq!(count.count, 3);

        let invalid = wrapper("not json");
        assert!(matches!(
            invalid.body_as_json::<Count>(),
            Err(MaileonError::Client { .. })
        ));
    }

    #[test]
    fn test_headers_and_status() {
        let response = wrapper("x");

        assert_eq!(response.status_code(), 200);
        assert_eq!(response.reason_phrase(), "OK");
        assert!(response.is_success());
        assert_eq!(response.header("X-Tag"), Some("a"));
        assert_eq!(response.header_values("x-tag"), vec!["a", "b"]);
        assert_eq!(
            response.content_type().map(|m| m.essence_str()),
            Some("application/vnd.maileon.api+xml")
        );
    }

    #[test]
    fn test_server_reason_phrase_is_kept() {
        let response = ResponseWrapper::from(HttpResponse {
            status: StatusCode::BAD_REQUEST,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            reason_phrase: Some("Invalid Contact".to_string()),
        });
        assert_eq!(response.reason_phrase(), "Invalid Contact");

        let canonical = ResponseWrapper::from(HttpResponse {
            status: StatusCode::BAD_REQUEST,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            reason_phrase: None,
        });
        assert_eq!(canonical.reason_phrase(), "Bad Request");
    }

    #[test]
    fn test_nonstandard_status_has_empty_reason() {
        let response = ResponseWrapper::new(
            StatusCode::from_u16(299).unwrap(),
            HeaderMap::new(),
            Bytes::new(),
        );

        assert_eq!(response.reason_phrase(), "");
        assert!(response.content_type().is_none());
    }
}
