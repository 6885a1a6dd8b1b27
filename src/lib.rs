//! Maileon Integration Module
//!
//! Blocking client for the Maileon email-marketing REST API.
//!
//! # Features
//!
//! - **Request pipeline**: HTTP Basic auth, path and query encoding, XML, JSON,
//!   text or raw entities
//! - **Error taxonomy**: every non-2xx status maps to a typed [`MaileonError`]
//!   that keeps the buffered response
//! - **Compression**: optional gzip for responses and request bodies
//! - **Debug mode**: full exchange logging through `tracing`, with credentials
//!   masked
//! - **Pagination**: `X-Items` / `X-Pages` header handling
//!
//! # Quick Start
//!
//! ```rust,no_run
//! fn main() -> Result<(), maileon::MaileonError> {
//!     // Reads MAILEON_API_KEY and friends
//!     let client = maileon::create_client_from_env()?;
//!
//!     let response = client.get("contacts/count")?;
//!     if let Some(body) = response.body_as_xml()? {
//!         println!("{} contacts", body.text().unwrap_or("0"));
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod errors;
pub mod media;
pub mod mocks;
pub mod observability;
pub mod pagination;
pub mod response;
pub mod services;
pub mod transport;
pub mod xml;

// Re-export main types at crate root
pub use client::{MaileonClient, QueryParameters, RequestBody};
pub use config::{MaileonConfig, MaileonConfigBuilder, ProxyAddress, ProxyConfig};
pub use errors::{MaileonError, MaileonResult, TransportError};
pub use media::{MAILEON_JSON, MAILEON_XML};
pub use pagination::Page;
pub use response::ResponseWrapper;
pub use services::PingService;
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
pub use xml::XmlElement;

/// Create a new Maileon client from environment variables.
///
/// See [`MaileonConfig::from_env`] for the variables that are read.
pub fn create_client_from_env() -> MaileonResult<MaileonClient> {
    MaileonClient::new(MaileonConfig::from_env()?)
}

/// Create a new Maileon client with explicit configuration.
///
/// # Example
///
/// ```rust,no_run
/// use maileon::MaileonConfig;
///
/// let config = MaileonConfig::builder()
///     .api_key("my-api-key")
///     .debug(true)
///     .build()?;
///
/// let client = maileon::create_client(config)?;
/// # Ok::<(), maileon::MaileonError>(())
/// ```
pub fn create_client(config: MaileonConfig) -> MaileonResult<MaileonClient> {
    MaileonClient::new(config)
}

/// Commonly used types.
pub mod prelude {
    pub use crate::client::{MaileonClient, QueryParameters, RequestBody};
    pub use crate::config::MaileonConfig;
    pub use crate::errors::{MaileonError, MaileonResult};
    pub use crate::media::{MAILEON_JSON, MAILEON_XML};
    pub use crate::pagination::Page;
    pub use crate::response::ResponseWrapper;
    pub use crate::transport::HttpMethod;
    pub use crate::xml::XmlElement;
}
