//! Configuration module for the Maileon client.
//!
//! Holds the API endpoint, credentials, proxy settings and the debug switches
//! that control exchange logging, compression and TLS verification.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::errors::{MaileonError, MaileonResult};
use crate::xml::parse_boolean;

/// Default base URL of the Maileon REST API.
pub const DEFAULT_BASE_URL: &str = "https://api.maileon.com/1.0";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "MAILEON_API_KEY";
/// Environment variable overriding the base URL.
pub const ENV_BASE_URL: &str = "MAILEON_BASE_URL";
/// Environment variable enabling debug mode.
pub const ENV_DEBUG: &str = "MAILEON_DEBUG";
/// Environment variable holding the request timeout in seconds.
pub const ENV_TIMEOUT: &str = "MAILEON_TIMEOUT";

/// Host and port of a proxy server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyAddress {
    /// Proxy host name or address.
    pub host: String,
    /// Proxy port.
    pub port: u16,
}

impl ProxyAddress {
    /// Creates a proxy address.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Per-protocol proxy settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProxyConfig {
    /// Proxy for plain HTTP requests.
    pub http: Option<ProxyAddress>,
    /// Proxy for HTTPS requests.
    pub https: Option<ProxyAddress>,
}

impl ProxyConfig {
    fn is_empty(&self) -> bool {
        self.http.is_none() && self.https.is_none()
    }
}

/// Configuration for the Maileon client.
#[derive(Clone)]
pub struct MaileonConfig {
    base_url: Url,
    api_key: SecretString,
    proxy: Option<ProxyConfig>,
    debug: bool,
    ignore_tls_errors: bool,
    compression_enabled: bool,
    request_compression_enabled: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: String,
}

impl MaileonConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> MaileonConfigBuilder {
        MaileonConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MAILEON_API_KEY` (required): API key for authentication
    /// - `MAILEON_BASE_URL` (optional): Custom base URL
    /// - `MAILEON_DEBUG` (optional): `true`, `yes` or `1` enables debug mode
    /// - `MAILEON_TIMEOUT` (optional): Request timeout in seconds
    pub fn from_env() -> MaileonResult<Self> {
        let api_key = std::env::var(ENV_API_KEY).map_err(|_| {
            MaileonError::client(format!("{} environment variable not set", ENV_API_KEY))
        })?;

        let mut builder = MaileonConfigBuilder::new().api_key(api_key);

        if let Ok(base_url) = std::env::var(ENV_BASE_URL) {
            builder = builder.base_url(base_url);
        }

        if let Ok(debug) = std::env::var(ENV_DEBUG) {
            builder = builder.debug(parse_boolean(Some(&debug)));
        }

        if let Ok(timeout_str) = std::env::var(ENV_TIMEOUT) {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            }
        }

        builder.build()
    }

    /// Base URL all resource paths are resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the API key (exposing the secret).
    pub(crate) fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Proxy settings, if any.
    pub fn proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref()
    }

    /// Returns true when debug mode is on.
    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Enables or disables debug mode.
    pub fn set_debug(&mut self, debug: bool) -> &mut Self {
        self.debug = debug;
        self
    }

    /// Effective TLS bypass: true only when debug mode is on and the bypass
    /// was requested.
    pub fn ignore_tls_errors(&self) -> bool {
        self.debug && self.ignore_tls_errors
    }

    /// Requests TLS verification to be skipped. Has no effect outside debug
    /// mode.
    pub fn set_ignore_tls_errors(&mut self, ignore: bool) -> &mut Self {
        self.ignore_tls_errors = ignore;
        self
    }

    /// Returns true when responses should be requested gzip encoded.
    pub fn response_compression_active(&self) -> bool {
        !self.debug && self.compression_enabled
    }

    /// Returns true when request bodies should be gzip encoded.
    pub fn request_compression_active(&self) -> bool {
        self.response_compression_active() && self.request_compression_enabled
    }

    /// Request timeout, if one is configured.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Connect timeout, if one is configured.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }

    /// User agent sent with every request.
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl fmt::Debug for MaileonConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaileonConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("proxy", &self.proxy)
            .field("debug", &self.debug)
            .field("ignore_tls_errors", &self.ignore_tls_errors)
            .field("compression_enabled", &self.compression_enabled)
            .field("request_compression_enabled", &self.request_compression_enabled)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Builder for `MaileonConfig`.
pub struct MaileonConfigBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
    proxy: ProxyConfig,
    debug: bool,
    ignore_tls_errors: bool,
    compression_enabled: bool,
    request_compression_enabled: bool,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for MaileonConfigBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            proxy: ProxyConfig::default(),
            debug: false,
            ignore_tls_errors: false,
            compression_enabled: true,
            request_compression_enabled: false,
            timeout: None,
            connect_timeout: None,
            user_agent: None,
        }
    }
}

impl MaileonConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the API key.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Routes plain HTTP requests through a proxy.
    pub fn http_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy.http = Some(ProxyAddress::new(host, port));
        self
    }

    /// Routes HTTPS requests through a proxy.
    pub fn https_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy.https = Some(ProxyAddress::new(host, port));
        self
    }

    /// Replaces the proxy settings.
    pub fn proxy(mut self, proxy: ProxyConfig) -> Self {
        self.proxy = proxy;
        self
    }

    /// Enables debug mode.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Requests TLS verification to be skipped in debug mode.
    pub fn ignore_tls_errors(mut self, ignore: bool) -> Self {
        self.ignore_tls_errors = ignore;
        self
    }

    /// Enables gzip negotiation for responses. On by default.
    pub fn compression(mut self, enabled: bool) -> Self {
        self.compression_enabled = enabled;
        self
    }

    /// Enables gzip encoding of request bodies. Off by default.
    pub fn request_compression(mut self, enabled: bool) -> Self {
        self.request_compression_enabled = enabled;
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Overrides the user agent.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> MaileonResult<MaileonConfig> {
        let api_key = self
            .api_key
            .ok_or_else(|| MaileonError::client("API key is required"))?;

        if api_key.trim().is_empty() {
            return Err(MaileonError::client("API key cannot be empty"));
        }

        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = Url::parse(base_url).map_err(|e| {
            MaileonError::client_with_source(format!("Invalid base URL '{}'", base_url), e)
        })?;

        if base_url.scheme() != "http" && base_url.scheme() != "https" {
            return Err(MaileonError::client(
                "Base URL must start with http:// or https://",
            ));
        }

        for address in [&self.proxy.http, &self.proxy.https].into_iter().flatten() {
            if address.host.trim().is_empty() || address.port == 0 {
                return Err(MaileonError::client(format!(
                    "Invalid proxy address '{}'",
                    address
                )));
            }
        }

        Ok(MaileonConfig {
            base_url,
            api_key: SecretString::new(api_key),
            proxy: if self.proxy.is_empty() {
                None
            } else {
                Some(self.proxy)
            },
            debug: self.debug,
            ignore_tls_errors: self.ignore_tls_errors,
            compression_enabled: self.compression_enabled,
            request_compression_enabled: self.request_compression_enabled,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            user_agent: self.user_agent.unwrap_or_else(|| {
                format!("maileon-rust-client/{}", env!("CARGO_PKG_VERSION"))
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MaileonConfig {
        MaileonConfig::builder().api_key("test-key").build().unwrap()
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = config();

        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.api_key(), "test-key");
        assert!(config.proxy().is_none());
        assert!(!config.is_debug());
        assert!(!config.ignore_tls_errors());
        assert!(config.response_compression_active());
        assert!(!config.request_compression_active());
        assert!(config.user_agent().starts_with("maileon-rust-client/"));
    }

    #[test]
    fn test_config_builder_missing_api_key() {
        assert!(MaileonConfig::builder().build().is_err());
    }

    #[test]
    fn test_config_builder_empty_api_key() {
        assert!(MaileonConfig::builder().api_key("  ").build().is_err());
    }

    #[test]
    fn test_config_builder_invalid_base_url() {
        let result = MaileonConfig::builder()
            .api_key("test-key")
            .base_url("invalid-url")
            .build();
        assert!(result.is_err());

        let result = MaileonConfig::builder()
            .api_key("test-key")
            .base_url("ftp://api.maileon.com")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_builder_invalid_proxy() {
        let result = MaileonConfig::builder()
            .api_key("test-key")
            .https_proxy("proxy.local", 0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_proxy_settings() {
        let config = MaileonConfig::builder()
            .api_key("test-key")
            .http_proxy("proxy.local", 3128)
            .build()
            .unwrap();

        let proxy = config.proxy().unwrap();
        assert_eq!(proxy.http, Some(ProxyAddress::new("proxy.local", 3128)));
        assert_eq!(proxy.https, None);
    }

    #[test]
    fn test_tls_bypass_requires_debug() {
        let mut config = MaileonConfig::builder()
            .api_key("test-key")
            .ignore_tls_errors(true)
            .build()
            .unwrap();
        assert!(!config.ignore_tls_errors());

        config.set_debug(true);
        assert!(config.ignore_tls_errors());

        config.set_ignore_tls_errors(false);
        assert!(!config.ignore_tls_errors());
    }

    #[test]
    fn test_debug_disables_compression() {
        let mut config = MaileonConfig::builder()
            .api_key("test-key")
            .request_compression(true)
            .build()
            .unwrap();
        assert!(config.request_compression_active());

        config.set_debug(true);
        assert!(!config.response_compression_active());
        assert!(!config.request_compression_active());
    }

    #[test]
    fn test_debug_output_redacts_key() {
        let output = format!("{:?}", config());

        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains("test-key"));
    }
}
