//! Error types for the Maileon client.
//!
//! Every failure a caller can observe is a [`MaileonError`]. Errors raised for a
//! completed HTTP exchange carry the buffered [`ResponseWrapper`] so the status
//! code, reason phrase and raw body stay available for diagnostics. Transport
//! failures (no response at all) are reported separately as
//! [`MaileonError::Network`].

pub mod mapping;

use thiserror::Error;

use crate::response::ResponseWrapper;

pub use mapping::{classify, parse_error_message};

/// Result type alias for Maileon operations.
pub type MaileonResult<T> = Result<T, MaileonError>;

/// Boxed error source used for local failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Top-level error type for Maileon client operations.
#[derive(Debug, Error)]
pub enum MaileonError {
    /// Local failure while preparing a request or interpreting a response
    /// (invalid path, invalid configuration, undecodable payload).
    #[error("Client error: {message}")]
    Client {
        /// Description of the failure.
        message: String,
        /// Underlying cause, if any.
        #[source]
        source: Option<BoxError>,
    },

    /// Caller-fixable request problem (HTTP 400, other 4xx with a message, 503).
    #[error("Bad request: {}", describe(.message, .response))]
    BadRequest {
        /// Message reported by the API.
        message: Option<String>,
        /// The response that triggered the error.
        response: Option<Box<ResponseWrapper>>,
    },

    /// Credentials were rejected (HTTP 401).
    #[error("Authorization failed: {}", describe(.message, .response))]
    Authorization {
        /// Message reported by the API.
        message: Option<String>,
        /// The response that triggered the error.
        response: Option<Box<ResponseWrapper>>,
    },

    /// Credentials are valid but lack the required privilege (HTTP 403).
    #[error("Access denied: {}", describe(.message, .response))]
    AccessControl {
        /// Message reported by the API.
        message: Option<String>,
        /// The response that triggered the error.
        response: Option<Box<ResponseWrapper>>,
    },

    /// The resource does not exist (HTTP 404), or an identifier was rejected
    /// locally before any request was sent.
    #[error("Not found: {}", describe(.message, .response))]
    NotFound {
        /// Message reported by the API or by local validation.
        message: Option<String>,
        /// The response that triggered the error.
        response: Option<Box<ResponseWrapper>>,
    },

    /// Upstream failure (5xx other than 500 and 503).
    #[error("Server error: {}", describe(.message, .response))]
    Server {
        /// Message reported by the API.
        message: Option<String>,
        /// The response that triggered the error.
        response: Option<Box<ResponseWrapper>>,
    },

    /// Unclassified failure (HTTP 500, unexpected status families).
    #[error("Maileon error: {}", describe(.message, .response))]
    Generic {
        /// Message describing the failure.
        message: Option<String>,
        /// The response that triggered the error.
        response: Option<Box<ResponseWrapper>>,
    },

    /// The request never produced an HTTP response.
    #[error("Network error: {0}")]
    Network(#[from] TransportError),
}

fn describe(message: &Option<String>, response: &Option<Box<ResponseWrapper>>) -> String {
    match (message, response) {
        (Some(message), _) => message.clone(),
        (None, Some(response)) => {
            format!("HTTP {} {}", response.status_code(), response.reason_phrase())
                .trim_end()
                .to_string()
        }
        (None, None) => "no details available".to_string(),
    }
}

impl MaileonError {
    /// Creates a client error without an underlying cause.
    pub fn client(message: impl Into<String>) -> Self {
        MaileonError::Client {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a client error wrapping an underlying cause.
    pub fn client_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        MaileonError::Client {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates a bad request error that was detected locally.
    pub fn bad_request(message: impl Into<String>) -> Self {
        MaileonError::BadRequest {
            message: Some(message.into()),
            response: None,
        }
    }

    /// Creates a not found error that was detected locally, e.g. for a blank
    /// email address or a non-positive identifier.
    pub fn not_found(message: impl Into<String>) -> Self {
        MaileonError::NotFound {
            message: Some(message.into()),
            response: None,
        }
    }

    /// Returns the error message, if one is available.
    pub fn message(&self) -> Option<&str> {
        match self {
            MaileonError::Client { message, .. } => Some(message.as_str()),
            MaileonError::BadRequest { message, .. }
            | MaileonError::Authorization { message, .. }
            | MaileonError::AccessControl { message, .. }
            | MaileonError::NotFound { message, .. }
            | MaileonError::Server { message, .. }
            | MaileonError::Generic { message, .. } => message.as_deref(),
            MaileonError::Network(_) => None,
        }
    }

    /// Returns the response that caused this error, if any.
    pub fn response(&self) -> Option<&ResponseWrapper> {
        match self {
            MaileonError::BadRequest { response, .. }
            | MaileonError::Authorization { response, .. }
            | MaileonError::AccessControl { response, .. }
            | MaileonError::NotFound { response, .. }
            | MaileonError::Server { response, .. }
            | MaileonError::Generic { response, .. } => response.as_deref(),
            MaileonError::Client { .. } | MaileonError::Network(_) => None,
        }
    }

    /// Returns the HTTP status code of the response that caused this error.
    pub fn status_code(&self) -> Option<u16> {
        self.response().map(ResponseWrapper::status_code)
    }

    /// Returns the HTTP reason phrase of the response that caused this error.
    pub fn reason_phrase(&self) -> Option<&str> {
        self.response().map(ResponseWrapper::reason_phrase)
    }
}

/// Errors raised by an [`HttpTransport`](crate::transport::HttpTransport)
/// when no HTTP response could be obtained.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The connection could not be established.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// TLS negotiation failed.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Any other protocol-level failure, including reading the body.
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if is_tls_failure(&err) {
            TransportError::Tls(err.to_string())
        } else if err.is_connect() {
            TransportError::Connection(err.to_string())
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

fn is_tls_failure(err: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        if is_tls_message(&cause.to_string()) {
            return true;
        }
        source = cause.source();
    }
    false
}

/// Wording used by rustls and native-tls for handshake and certificate failures.
const TLS_FAILURE_MARKERS: &[&str] = &[
    "invalid peer certificate",
    "certificate verify failed",
    "unknownissuer",
    "unknown issuer",
    "self signed certificate",
    "self-signed certificate",
    "certificate has expired",
    "handshakefailure",
    "handshake failure",
    "tls handshake",
    "ssl routines",
];

fn is_tls_message(text: &str) -> bool {
    let text = text.to_ascii_lowercase();
    TLS_FAILURE_MARKERS.iter().any(|marker| text.contains(marker))
}

impl From<url::ParseError> for MaileonError {
    fn from(err: url::ParseError) -> Self {
        MaileonError::client_with_source(format!("Invalid URL: {}", err), err)
    }
}
