//! HTTP transport layer for Maileon requests.
//!
//! [`HttpTransport`] is the seam between the request pipeline and the network.
//! [`ReqwestTransport`] is the production implementation on top of the
//! blocking reqwest client; tests substitute
//! [`MockTransport`](crate::mocks::MockTransport).

use std::fmt;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use url::Url;

use crate::config::{MaileonConfig, ProxyAddress};
use crate::errors::{MaileonError, MaileonResult, TransportError};

/// HTTP methods used by the Maileon API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Returns the method name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Returns true for methods that always carry an entity.
    pub fn requires_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// HTTP request to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Fully resolved request URL.
    pub url: Url,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body. `None` sends no entity at all.
    pub body: Option<Bytes>,
}

impl HttpRequest {
    /// Create a new HTTP request.
    pub fn new(method: HttpMethod, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// HTTP response received, with the entity fully buffered.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
    /// Reason phrase sent by the server, when the transport exposes it.
    pub reason_phrase: Option<String>,
}

impl HttpResponse {
    /// Get a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// HTTP transport trait for making requests.
///
/// Implementations must execute the request exactly once and read the whole
/// entity before returning.
pub trait HttpTransport: Send + Sync {
    /// Send an HTTP request and return the response.
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Default HTTP transport using the blocking reqwest client.
pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    /// Builds a transport from the client configuration.
    ///
    /// Certificate and hostname verification are disabled only when
    /// [`MaileonConfig::ignore_tls_errors`] is true, which requires debug mode.
    pub fn from_config(config: &MaileonConfig) -> MaileonResult<Self> {
        let mut builder = reqwest::blocking::Client::builder().user_agent(config.user_agent());

        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        if let Some(proxy) = config.proxy() {
            if let Some(address) = &proxy.http {
                builder = builder.proxy(build_proxy(address, reqwest::Proxy::http)?);
            }
            if let Some(address) = &proxy.https {
                builder = builder.proxy(build_proxy(address, reqwest::Proxy::https)?);
            }
        }

        if config.ignore_tls_errors() {
            tracing::info!(
                target: "maileon",
                "TLS certificate and hostname verification disabled (debug mode)"
            );
            #[cfg(any(feature = "rustls-tls", feature = "native-tls"))]
            {
                builder = builder.danger_accept_invalid_certs(true);
            }
            #[cfg(feature = "native-tls")]
            {
                builder = builder.danger_accept_invalid_hostnames(true);
            }
        }

        let client = builder.build().map_err(|e| {
            MaileonError::client_with_source("Failed to create HTTP client", e)
        })?;

        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

fn build_proxy(
    address: &ProxyAddress,
    make: fn(String) -> reqwest::Result<reqwest::Proxy>,
) -> MaileonResult<reqwest::Proxy> {
    make(format!("http://{}:{}", address.host, address.port)).map_err(|e| {
        MaileonError::client_with_source(format!("Invalid proxy address {}", address), e)
    })
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send()?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .map_err(|e| TransportError::Http(format!("Failed to read response body: {}", e)))?;

        // The blocking client does not expose the received reason phrase.
        Ok(HttpResponse {
            status,
            headers,
            body,
            reason_phrase: None,
        })
    }
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_names() {
        assert_eq!(HttpMethod::Get.to_string(), "GET");
        assert_eq!(HttpMethod::Delete.as_str(), "DELETE");
        assert_eq!(reqwest::Method::from(HttpMethod::Put), reqwest::Method::PUT);
    }

    #[test]
    fn test_body_requirement() {
        assert!(HttpMethod::Post.requires_body());
        assert!(HttpMethod::Put.requires_body());
        assert!(!HttpMethod::Get.requires_body());
        assert!(!HttpMethod::Delete.requires_body());
    }

    #[test]
    fn test_transport_from_config() {
        let config = MaileonConfig::builder()
            .api_key("secret")
            .http_proxy("localhost", 3128)
            .debug(true)
            .ignore_tls_errors(true)
            .build()
            .unwrap();

        assert!(ReqwestTransport::from_config(&config).is_ok());
    }
}
