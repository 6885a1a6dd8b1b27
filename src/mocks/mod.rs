//! Mock HTTP transport for testing.
//!
//! [`MockTransport`] replays queued responses and records every request it
//! receives, so tests can assert on the exact URL, headers and entity the
//! client produced.

use std::collections::VecDeque;

use bytes::Bytes;
use parking_lot::Mutex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::errors::TransportError;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::xml::error_xml;

/// Mock HTTP response.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: Vec<(String, String)>,
    /// Response body.
    pub body: Bytes,
    /// Reason phrase overriding the canonical one.
    pub reason_phrase: Option<String>,
}

impl MockResponse {
    /// Create a successful response with empty body.
    pub fn ok() -> Self {
        Self::new(200, Bytes::new())
    }

    /// Create a successful response with body.
    pub fn ok_with_body(body: impl Into<Bytes>) -> Self {
        Self::new(200, body)
    }

    /// Create an error response.
    pub fn error(status: u16, body: impl Into<Bytes>) -> Self {
        Self::new(status, body)
    }

    fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
            reason_phrase: None,
        }
    }

    /// Create a Maileon XML error response carrying `message`.
    pub fn xml_error(status: u16, message: &str) -> Self {
        Self::error(status, error_xml(message))
            .with_header(CONTENT_TYPE.as_str(), "application/vnd.maileon.api+xml; charset=utf-8")
    }

    /// Add a header to the response. Repeated names are kept.
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Set a custom reason phrase.
    pub fn with_reason_phrase(mut self, reason_phrase: impl Into<String>) -> Self {
        self.reason_phrase = Some(reason_phrase.into());
        self
    }

    fn into_http_response(self) -> Result<HttpResponse, TransportError> {
        let status = StatusCode::from_u16(self.status)
            .map_err(|e| TransportError::Http(format!("Invalid mock status: {}", e)))?;

        let mut headers = HeaderMap::new();
        for (name, value) in self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::Http(format!("Invalid mock header name: {}", e)))?;
            let value = HeaderValue::from_str(&value)
                .map_err(|e| TransportError::Http(format!("Invalid mock header value: {}", e)))?;
            headers.append(name, value);
        }

        Ok(HttpResponse {
            status,
            headers,
            body: self.body,
            reason_phrase: self.reason_phrase,
        })
    }
}

enum MockOutcome {
    Response(MockResponse),
    Error(TransportError),
}

/// Mock HTTP transport for testing.
pub struct MockTransport {
    /// Queue of outcomes to return.
    outcomes: Mutex<VecDeque<MockOutcome>>,
    /// Recorded requests.
    requests: Mutex<Vec<HttpRequest>>,
    /// Default response if nothing is queued.
    default_response: Option<MockResponse>,
}

impl MockTransport {
    /// Create a new mock transport with no responses.
    pub fn new() -> Self {
        Self {
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: None,
        }
    }

    /// Create a mock transport with queued responses.
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        let transport = Self::new();
        transport
            .outcomes
            .lock()
            .extend(responses.into_iter().map(MockOutcome::Response));
        transport
    }

    /// Create a mock transport with a default response.
    pub fn with_default(response: MockResponse) -> Self {
        Self {
            default_response: Some(response),
            ..Self::new()
        }
    }

    /// Create a mock transport whose first call fails without a response.
    pub fn with_error(error: TransportError) -> Self {
        let transport = Self::new();
        transport.outcomes.lock().push_back(MockOutcome::Error(error));
        transport
    }

    /// Queue a response to return.
    pub fn queue_response(&self, response: MockResponse) {
        self.outcomes.lock().push_back(MockOutcome::Response(response));
    }

    /// Get all recorded requests.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Get the number of requests made.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Get the last request made.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpTransport for MockTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().push(request);

        let outcome = self.outcomes.lock().pop_front();
        match outcome {
            Some(MockOutcome::Response(mock)) => mock.into_http_response(),
            Some(MockOutcome::Error(error)) => Err(error),
            None => match &self.default_response {
                Some(mock) => mock.clone().into_http_response(),
                None => Err(TransportError::Connection(
                    "No mock response available".to_string(),
                )),
            },
        }
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued_outcomes", &self.outcomes.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}
