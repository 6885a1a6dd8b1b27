//! Maileon API client implementation.

use std::sync::Arc;

use mime::Mime;

use crate::config::MaileonConfig;
use crate::errors::MaileonResult;
use crate::media::MAILEON_XML;
use crate::response::ResponseWrapper;
use crate::services::PingService;
use crate::transport::{HttpMethod, HttpTransport, ReqwestTransport};

mod executor;
mod query;
mod request;

pub use executor::RequestExecutor;
pub use query::QueryParameters;
pub use request::{decode_path, encode_path, RequestBody};

/// Maileon API client.
///
/// This is the entry point for calling the Maileon REST API. Resource
/// services borrow the client; clones share the same transport.
///
/// # Example
///
/// ```no_run
/// use maileon::{MaileonClient, MaileonConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = MaileonConfig::builder().api_key("my-api-key").build()?;
/// let client = MaileonClient::new(config)?;
///
/// let response = client.ping().check_retrieve()?;
/// assert!(response.is_success());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MaileonClient {
    executor: Arc<RequestExecutor>,
}

impl MaileonClient {
    /// Creates a client backed by the blocking reqwest transport.
    ///
    /// The transport is built once, here, from the configuration.
    pub fn new(config: MaileonConfig) -> MaileonResult<Self> {
        let transport = Arc::new(ReqwestTransport::from_config(&config)?);
        Self::with_transport(config, transport)
    }

    /// Creates a client using the given transport.
    pub fn with_transport(
        config: MaileonConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> MaileonResult<Self> {
        Ok(Self {
            executor: Arc::new(RequestExecutor::new(config, transport)?),
        })
    }

    /// Client configuration.
    pub fn config(&self) -> &MaileonConfig {
        self.executor.config()
    }

    /// Access the ping service.
    pub fn ping(&self) -> PingService<'_> {
        PingService::new(self)
    }

    /// Executes a request with full control over query, media type and body.
    ///
    /// POST and PUT without a body send an empty entity.
    pub fn execute(
        &self,
        method: HttpMethod,
        path: &str,
        query: Option<&QueryParameters>,
        media_type: &Mime,
        body: Option<RequestBody>,
    ) -> MaileonResult<ResponseWrapper> {
        self.executor.execute(method, path, query, media_type, body)
    }

    /// GET with the default media type.
    pub fn get(&self, path: &str) -> MaileonResult<ResponseWrapper> {
        self.get_with(path, None, &MAILEON_XML)
    }

    /// GET with query parameters and media type.
    pub fn get_with(
        &self,
        path: &str,
        query: Option<&QueryParameters>,
        media_type: &Mime,
    ) -> MaileonResult<ResponseWrapper> {
        self.execute(HttpMethod::Get, path, query, media_type, None)
    }

    /// POST with the default media type.
    pub fn post(&self, path: &str, body: Option<RequestBody>) -> MaileonResult<ResponseWrapper> {
        self.post_with(path, None, &MAILEON_XML, body)
    }

    /// POST with query parameters and media type.
    pub fn post_with(
        &self,
        path: &str,
        query: Option<&QueryParameters>,
        media_type: &Mime,
        body: Option<RequestBody>,
    ) -> MaileonResult<ResponseWrapper> {
        self.execute(HttpMethod::Post, path, query, media_type, body)
    }

    /// PUT with the default media type.
    pub fn put(&self, path: &str, body: Option<RequestBody>) -> MaileonResult<ResponseWrapper> {
        self.put_with(path, None, &MAILEON_XML, body)
    }

    /// PUT with query parameters and media type.
    pub fn put_with(
        &self,
        path: &str,
        query: Option<&QueryParameters>,
        media_type: &Mime,
        body: Option<RequestBody>,
    ) -> MaileonResult<ResponseWrapper> {
        self.execute(HttpMethod::Put, path, query, media_type, body)
    }

    /// DELETE with the default media type.
    pub fn delete(&self, path: &str) -> MaileonResult<ResponseWrapper> {
        self.delete_with(path, None, &MAILEON_XML)
    }

    /// DELETE with query parameters and media type.
    pub fn delete_with(
        &self,
        path: &str,
        query: Option<&QueryParameters>,
        media_type: &Mime,
    ) -> MaileonResult<ResponseWrapper> {
        self.execute(HttpMethod::Delete, path, query, media_type, None)
    }
}

impl std::fmt::Debug for MaileonClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaileonClient")
            .field("config", self.config())
            .finish_non_exhaustive()
    }
}
